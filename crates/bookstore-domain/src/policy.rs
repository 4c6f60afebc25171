//! Authorization policy.
//!
//! Every (resource, action) pair maps to a [`Rule`]: the access level required and the
//! view shape the response uses. Handlers look the rule up and call [`can_act`] before
//! touching the store.

use uuid::Uuid;

use crate::actor::Actor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Category,
    Author,
    Book,
    Review,
    Account,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    List,
    Retrieve,
    Create,
    Update,
    Delete,
}

/// Who may perform an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Anyone, including anonymous callers.
    Public,
    /// Any authenticated caller.
    Authenticated,
    /// The review author or a staff member.
    OwnerOrStaff,
    /// The account holder or a staff member.
    SelfOrStaff,
}

/// Response shape selected for an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Summary,
    Detail,
    /// Account view; full or public depending on [`account_view`].
    Account,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule {
    pub access: Access,
    pub view: View,
}

const fn rule_of(access: Access, view: View) -> Rule {
    Rule { access, view }
}

/// Dispatch table.
pub fn rule(resource: Resource, action: Action) -> Rule {
    use Access::*;
    use Action::*;
    use Resource::*;

    match (resource, action) {
        (Category | Author | Book, List) => rule_of(Public, View::Summary),
        (Category | Author | Book, Retrieve) => rule_of(Public, View::Detail),
        (Category | Author | Book, Create | Update | Delete) => {
            rule_of(Authenticated, View::Detail)
        }

        (Review, List | Retrieve) => rule_of(Public, View::Detail),
        (Review, Create) => rule_of(Authenticated, View::Detail),
        (Review, Update | Delete) => rule_of(OwnerOrStaff, View::Detail),

        (Account, List | Retrieve) => rule_of(Public, View::Account),
        (Account, Create) => rule_of(Public, View::Account),
        (Account, Update | Delete) => rule_of(SelfOrStaff, View::Account),
    }
}

/// The entity an action is aimed at, as far as ownership is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// No particular entity (collections, creation) or an entity without an owner.
    Unowned,
    /// An entity owned by the given user (a review's author, an account's holder).
    OwnedBy(Uuid),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    AuthenticationRequired,
    NotOwner,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    pub fn is_allowed(self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// Decide whether `actor` may perform `action` on `resource`.
///
/// Ownership rules require [`Target::OwnedBy`]; an unowned target only passes them for
/// staff members.
pub fn can_act(actor: &Actor, resource: Resource, action: Action, target: Target) -> Decision {
    let access = rule(resource, action).access;
    if access == Access::Public {
        return Decision::Allow;
    }

    let Some(identity) = actor.identity() else {
        return Decision::Deny(DenyReason::AuthenticationRequired);
    };

    match access {
        Access::Public | Access::Authenticated => Decision::Allow,
        Access::OwnerOrStaff | Access::SelfOrStaff => {
            let owns = matches!(target, Target::OwnedBy(owner) if owner == identity.user_id);
            if owns || identity.is_staff_member() {
                Decision::Allow
            } else {
                Decision::Deny(DenyReason::NotOwner)
            }
        }
    }
}

/// Which reviews an actor may see through the review collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewVisibility {
    All,
    OwnOnly(Uuid),
    Nothing,
}

pub fn review_visibility(actor: &Actor) -> ReviewVisibility {
    match actor.identity() {
        None => ReviewVisibility::Nothing,
        Some(identity) if identity.is_staff_member() => ReviewVisibility::All,
        Some(identity) => ReviewVisibility::OwnOnly(identity.user_id),
    }
}

impl ReviewVisibility {
    pub fn permits(self, author_id: Uuid) -> bool {
        match self {
            Self::All => true,
            Self::OwnOnly(user_id) => user_id == author_id,
            Self::Nothing => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountView {
    Full,
    Public,
}

/// Account holders and staff members see the full account; everyone else the public profile.
pub fn account_view(actor: &Actor, account_id: Uuid) -> AccountView {
    if actor.is_self_or_staff(account_id) {
        AccountView::Full
    } else {
        AccountView::Public
    }
}
