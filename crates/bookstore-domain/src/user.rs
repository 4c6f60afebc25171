//! User domain types.

use serde::{Deserialize, Serialize};

/// Account type.
///
/// Wire format in access tokens: `u8` (0 = Customer, 1 = Staff, 2 = Admin).
/// JSON format: lower-case name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Customer = 0,
    Staff = 1,
    Admin = 2,
}

impl UserRole {
    /// Convert from `u8` wire value. Returns `None` for unknown values.
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(Self::Customer),
            1 => Some(Self::Staff),
            2 => Some(Self::Admin),
            _ => None,
        }
    }

    /// Convert to `u8` wire value.
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Staff => "staff",
            Self::Admin => "admin",
        }
    }

    pub fn from_code(s: &str) -> Option<Self> {
        match s {
            "customer" => Some(Self::Customer),
            "staff" => Some(Self::Staff),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }

    /// Staff and admin accounts are staff members.
    pub fn is_staff_member(self) -> bool {
        matches!(self, Self::Staff | Self::Admin)
    }
}

impl Default for UserRole {
    fn default() -> Self {
        Self::Customer
    }
}
