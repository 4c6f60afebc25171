//! Wire formats shared by request and response bodies.

use std::fmt::Display;
use std::str::FromStr;

// Module name shadows the `serde` crate; use `::serde` for the external crate.
use ::serde::{Deserialize, Deserializer, Serializer, de};
use chrono::{DateTime, SecondsFormat, Utc};
use rust_decimal::{Decimal, RoundingStrategy};

/// Serialize `DateTime<Utc>` as RFC 3339 with 3-digit fractional seconds.
pub fn to_rfc3339_ms<S>(dt: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    s.serialize_str(&dt.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Serialize a money amount as a string with exactly two decimal places, `"120000.00"`.
pub fn to_money<S>(amount: &Decimal, s: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let mut amount = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    amount.rescale(2);
    s.collect_str(&amount)
}

/// Deserialize an optional query value through `FromStr`; `key=` counts as absent.
///
/// Use with `#[serde(default, deserialize_with = "blank_as_none")]`.
pub fn blank_as_none<'de, D, T>(d: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    match Option::<String>::deserialize(d)? {
        Some(raw) if !raw.trim().is_empty() => {
            raw.trim().parse().map(Some).map_err(de::Error::custom)
        }
        _ => Ok(None),
    }
}
