//! Environment lookups used by the service configs.

use std::str::FromStr;

use anyhow::Context;

/// Read a variable that must be present and non-empty.
pub fn required(name: &str) -> anyhow::Result<String> {
    let value = std::env::var(name).with_context(|| format!("{name} must be set"))?;
    if value.trim().is_empty() {
        anyhow::bail!("{name} must not be empty");
    }
    Ok(value)
}

/// Read an optional variable, falling back to `default` when absent.
pub fn string_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_owned())
}

/// Read and parse an optional variable; absent or unparsable values use `default`.
pub fn parsed_or<T: FromStr>(name: &str, default: T) -> T {
    parse_or(std::env::var(name).ok(), default)
}

fn parse_or<T: FromStr>(raw: Option<String>, default: T) -> T {
    raw.and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}
