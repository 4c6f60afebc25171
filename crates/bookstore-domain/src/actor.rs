//! The identity performing a request.

use uuid::Uuid;

use crate::user::UserRole;

/// An authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Uuid,
    pub role: UserRole,
}

impl Identity {
    pub fn new(user_id: Uuid, role: UserRole) -> Self {
        Self { user_id, role }
    }

    pub fn is_staff_member(&self) -> bool {
        self.role.is_staff_member()
    }
}

/// Either an authenticated identity or nobody.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Actor {
    #[default]
    Anonymous,
    User(Identity),
}

impl Actor {
    pub fn user(user_id: Uuid, role: UserRole) -> Self {
        Self::User(Identity::new(user_id, role))
    }

    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Self::Anonymous => None,
            Self::User(identity) => Some(identity),
        }
    }

    pub fn user_id(&self) -> Option<Uuid> {
        self.identity().map(|i| i.user_id)
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::User(_))
    }

    pub fn is_staff_member(&self) -> bool {
        self.identity().is_some_and(Identity::is_staff_member)
    }

    /// True for the account owner and for staff members.
    pub fn is_self_or_staff(&self, user_id: Uuid) -> bool {
        match self {
            Self::Anonymous => false,
            Self::User(identity) => identity.user_id == user_id || identity.is_staff_member(),
        }
    }
}
