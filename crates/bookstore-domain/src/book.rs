//! Book catalog enumerations.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A code outside the closed set of an enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{code}'")]
pub struct UnknownCode {
    pub kind: &'static str,
    pub code: String,
}

/// Language a book is written in, stored as a two-letter code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Vi,
    En,
    Fr,
    De,
    Ja,
    Ko,
    Zh,
}

impl Language {
    pub const ALL: [Language; 7] = [
        Self::Vi,
        Self::En,
        Self::Fr,
        Self::De,
        Self::Ja,
        Self::Ko,
        Self::Zh,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Self::Vi => "vi",
            Self::En => "en",
            Self::Fr => "fr",
            Self::De => "de",
            Self::Ja => "ja",
            Self::Ko => "ko",
            Self::Zh => "zh",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|lang| lang.code() == code)
    }

}

impl FromStr for Language {
    type Err = UnknownCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s).ok_or_else(|| UnknownCode {
            kind: "language",
            code: s.to_owned(),
        })
    }
}

impl Default for Language {
    fn default() -> Self {
        Self::Vi
    }
}

/// Circulation status of a book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookStatus {
    Available,
    Borrowed,
    Reserved,
    Maintenance,
}

impl BookStatus {
    pub fn code(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Borrowed => "borrowed",
            Self::Reserved => "reserved",
            Self::Maintenance => "maintenance",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "available" => Some(Self::Available),
            "borrowed" => Some(Self::Borrowed),
            "reserved" => Some(Self::Reserved),
            "maintenance" => Some(Self::Maintenance),
            _ => None,
        }
    }
}

impl FromStr for BookStatus {
    type Err = UnknownCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s).ok_or_else(|| UnknownCode {
            kind: "status",
            code: s.to_owned(),
        })
    }
}

impl Default for BookStatus {
    fn default() -> Self {
        Self::Available
    }
}
