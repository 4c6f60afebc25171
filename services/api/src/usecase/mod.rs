pub mod account;
pub mod author;
pub mod book;
pub mod category;
pub mod review;
pub mod search;
pub mod statistics;

use bookstore_domain::actor::{Actor, Identity};
use bookstore_domain::policy::{Action, Decision, Resource, Target, can_act};

use crate::domain::slug::{is_slug, slugify};
use crate::domain::validation;
use crate::error::ServiceError;

/// Check the policy table for `actor` and log the denial.
pub fn authorize(
    actor: &Actor,
    resource: Resource,
    action: Action,
    target: Target,
) -> Result<(), ServiceError> {
    match can_act(actor, resource, action, target) {
        Decision::Allow => Ok(()),
        Decision::Deny(reason) => {
            tracing::warn!(
                ?resource,
                ?action,
                user_id = ?actor.user_id(),
                ?reason,
                "action denied"
            );
            Err(reason.into())
        }
    }
}

/// The caller's identity, or `AuthenticationRequired` for anonymous callers.
pub fn require_identity(actor: &Actor) -> Result<&Identity, ServiceError> {
    actor.identity().ok_or(ServiceError::AuthenticationRequired)
}

/// Use the client's slug when it is already in slug form, otherwise derive one from `source`.
/// Either way the slug must fit in `max` characters.
pub fn resolve_slug(
    requested: Option<&str>,
    source: &str,
    max: usize,
) -> Result<String, ServiceError> {
    let slug = match requested.map(str::trim).filter(|s| !s.is_empty()) {
        Some(slug) if is_slug(slug) => slug.to_owned(),
        Some(_) => {
            return Err(ServiceError::validation(
                "slug may contain only letters, digits, hyphens and underscores",
            ));
        }
        None => slugify(source)
            .ok_or_else(|| ServiceError::validation("cannot derive a slug from this name"))?,
    };
    validation::slug(&slug, max)?;
    Ok(slug)
}
