use bytes::Bytes;
use chrono::NaiveDate;
use uuid::Uuid;

use bookstore_domain::actor::Actor;
use bookstore_domain::pagination::PageRequest;
use bookstore_domain::policy::{AccountView, Action, Resource, Target, account_view};
use bookstore_domain::user::UserRole;

use crate::domain::query::ReviewQuery;
use crate::domain::repository::{BlobStore, CredentialPort, ReviewRepository, UserRepository};
use crate::domain::types::{ImageFormat, NewUser, ProfileChanges, ReviewRecord, User};
use crate::domain::validation;
use crate::error::{Entity, ServiceError};
use crate::usecase::{authorize, require_identity};

pub const INVALID_CREDENTIALS: &str = "invalid credentials";
pub const ACCOUNT_DISABLED: &str = "account is disabled";
pub const DUPLICATE_USERNAME: &str = "a user with that username already exists";

/// An account together with the view the caller is entitled to.
#[derive(Debug, Clone)]
pub struct AccountRecord {
    pub user: User,
    pub view: AccountView,
    pub reviews_count: u64,
}

async fn find_user<U: UserRepository>(users: &U, id: Uuid) -> Result<User, ServiceError> {
    users
        .find_by_id(id)
        .await?
        .ok_or(ServiceError::NotFound(Entity::User))
}

/// Active account by username; deactivated accounts are not found.
async fn find_active_user<U: UserRepository>(
    users: &U,
    username: &str,
) -> Result<User, ServiceError> {
    users
        .find_by_username(username)
        .await?
        .filter(|u| u.is_active)
        .ok_or(ServiceError::NotFound(Entity::User))
}

fn validate_profile(changes: &ProfileChanges) -> Result<(), ServiceError> {
    if let Some(first_name) = &changes.first_name {
        validation::person_name("first_name", first_name)?;
    }
    if let Some(last_name) = &changes.last_name {
        validation::person_name("last_name", last_name)?;
    }
    if let Some(phone) = &changes.phone_number {
        validation::phone_number(phone)?;
    }
    Ok(())
}

// ── Register ─────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct RegisterInput {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub address: String,
    pub date_of_birth: Option<NaiveDate>,
    pub bio: String,
}

pub struct RegisterUseCase<U: UserRepository, C: CredentialPort> {
    pub users: U,
    pub credentials: C,
}

impl<U: UserRepository, C: CredentialPort> RegisterUseCase<U, C> {
    /// New accounts are active, unverified customers.
    pub async fn execute(&self, input: RegisterInput) -> Result<User, ServiceError> {
        let username = input.username.trim().to_owned();
        let email = input.email.trim().to_owned();
        validation::username(&username)?;
        validation::email(&email)?;
        validation::password_confirmation(&input.password, &input.password_confirm)?;
        validation::password_strength(&input.password)?;
        validation::person_name("first_name", &input.first_name)?;
        validation::person_name("last_name", &input.last_name)?;
        validation::phone_number(&input.phone_number)?;

        if self.users.find_by_username(&username).await?.is_some() {
            return Err(ServiceError::Duplicate(DUPLICATE_USERNAME));
        }
        let credential = self.credentials.hash_and_store(&input.password)?;

        let user = self
            .users
            .create(&NewUser {
                id: Uuid::now_v7(),
                username,
                email,
                credential,
                first_name: input.first_name,
                last_name: input.last_name,
                phone_number: input.phone_number,
                address: input.address,
                date_of_birth: input.date_of_birth,
                bio: input.bio,
                role: UserRole::Customer,
                is_verified: false,
            })
            .await?;
        tracing::info!(user_id = %user.id, username = %user.username, "user registered");
        Ok(user)
    }
}

// ── Login ────────────────────────────────────────────────────────────────────

pub struct LoginUseCase<U: UserRepository, C: CredentialPort> {
    pub users: U,
    pub credentials: C,
}

impl<U: UserRepository, C: CredentialPort> LoginUseCase<U, C> {
    pub async fn execute(&self, username: &str, password: &str) -> Result<User, ServiceError> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(ServiceError::validation(
                "username and password are required",
            ));
        }

        let user = self.users.find_by_username(username.trim()).await?;
        let verified = match &user {
            Some(user) => self.credentials.verify(&user.credential, password)?,
            None => false,
        };
        let user = match user {
            Some(user) if verified => user,
            _ => {
                tracing::warn!(username = %username.trim(), "login failed");
                return Err(ServiceError::Authentication(INVALID_CREDENTIALS));
            }
        };
        if !user.is_active {
            tracing::warn!(user_id = %user.id, "login to disabled account");
            return Err(ServiceError::Authentication(ACCOUNT_DISABLED));
        }
        tracing::info!(user_id = %user.id, "user logged in");
        Ok(user)
    }
}

// ── GetMe ────────────────────────────────────────────────────────────────────

pub struct GetMeUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> GetMeUseCase<U> {
    pub async fn execute(&self, actor: &Actor) -> Result<User, ServiceError> {
        let identity = require_identity(actor)?;
        find_user(&self.users, identity.user_id).await
    }
}

// ── UpdateProfile ────────────────────────────────────────────────────────────

pub struct UpdateProfileUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> UpdateProfileUseCase<U> {
    pub async fn execute(
        &self,
        actor: &Actor,
        changes: ProfileChanges,
    ) -> Result<User, ServiceError> {
        let identity = require_identity(actor)?;
        validate_profile(&changes)?;
        let user = self.users.update_profile(identity.user_id, &changes).await?;
        tracing::info!(user_id = %user.id, "profile updated");
        Ok(user)
    }
}

// ── SetAvatar ────────────────────────────────────────────────────────────────

pub struct SetAvatarUseCase<U: UserRepository, B: BlobStore> {
    pub users: U,
    pub blobs: B,
}

impl<U: UserRepository, B: BlobStore> SetAvatarUseCase<U, B> {
    pub async fn execute(&self, actor: &Actor, image: Bytes) -> Result<User, ServiceError> {
        let identity = require_identity(actor)?;
        if ImageFormat::sniff(&image).is_none() {
            return Err(ServiceError::validation(
                "upload a valid image (png, jpeg, gif or webp)",
            ));
        }
        let reference = self.blobs.store_blob(image).await?;
        let user = self.users.set_avatar(identity.user_id, &reference).await?;
        tracing::info!(user_id = %user.id, avatar = %reference, "avatar stored");
        Ok(user)
    }
}

// ── ChangePassword ───────────────────────────────────────────────────────────

pub struct ChangePasswordInput {
    pub old_password: String,
    pub new_password: String,
    pub new_password_confirm: String,
}

pub struct ChangePasswordUseCase<U: UserRepository, C: CredentialPort> {
    pub users: U,
    pub credentials: C,
}

impl<U: UserRepository, C: CredentialPort> ChangePasswordUseCase<U, C> {
    pub async fn execute(
        &self,
        actor: &Actor,
        input: ChangePasswordInput,
    ) -> Result<(), ServiceError> {
        let identity = require_identity(actor)?;
        let user = find_user(&self.users, identity.user_id).await?;
        if !self.credentials.verify(&user.credential, &input.old_password)? {
            return Err(ServiceError::validation("old password is incorrect"));
        }
        validation::password_confirmation(&input.new_password, &input.new_password_confirm)?;
        validation::password_strength(&input.new_password)?;

        let credential = self.credentials.hash_and_store(&input.new_password)?;
        self.users.set_credential(user.id, &credential).await?;
        tracing::info!(user_id = %user.id, "password changed");
        Ok(())
    }
}

// ── ListUsers ────────────────────────────────────────────────────────────────

pub struct ListUsersUseCase<U: UserRepository, R: ReviewRepository> {
    pub users: U,
    pub reviews: R,
}

impl<U: UserRepository, R: ReviewRepository> ListUsersUseCase<U, R> {
    /// Newest accounts first; each shown in the view the caller may see.
    pub async fn execute(
        &self,
        actor: &Actor,
        page: Option<PageRequest>,
    ) -> Result<Vec<AccountRecord>, ServiceError> {
        authorize(actor, Resource::Account, Action::List, Target::Unowned)?;
        let users = self.users.list(page).await?;
        let ids: Vec<Uuid> = users.iter().map(|u| u.id).collect();
        let counts = self.reviews.counts_by_users(&ids).await?;
        Ok(users
            .into_iter()
            .map(|user| AccountRecord {
                view: account_view(actor, user.id),
                reviews_count: counts.get(&user.id).copied().unwrap_or(0),
                user,
            })
            .collect())
    }
}

// ── GetUser ──────────────────────────────────────────────────────────────────

pub struct GetUserUseCase<U: UserRepository, R: ReviewRepository> {
    pub users: U,
    pub reviews: R,
}

impl<U: UserRepository, R: ReviewRepository> GetUserUseCase<U, R> {
    pub async fn execute(&self, actor: &Actor, id: Uuid) -> Result<AccountRecord, ServiceError> {
        authorize(actor, Resource::Account, Action::Retrieve, Target::OwnedBy(id))?;
        let user = find_user(&self.users, id).await?;
        let reviews_count = self.reviews.count_by_user(id).await?;
        Ok(AccountRecord {
            view: account_view(actor, id),
            user,
            reviews_count,
        })
    }
}

// ── UpdateUser ───────────────────────────────────────────────────────────────

pub struct UpdateUserUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> UpdateUserUseCase<U> {
    pub async fn execute(
        &self,
        actor: &Actor,
        id: Uuid,
        changes: ProfileChanges,
    ) -> Result<User, ServiceError> {
        authorize(actor, Resource::Account, Action::Update, Target::OwnedBy(id))?;
        validate_profile(&changes)?;
        let user = self.users.update_profile(id, &changes).await?;
        tracing::info!(user_id = %id, updated_by = ?actor.user_id(), "account updated");
        Ok(user)
    }
}

// ── DeleteUser ───────────────────────────────────────────────────────────────

pub struct DeleteUserUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> DeleteUserUseCase<U> {
    /// Removes the account and its reviews.
    pub async fn execute(&self, actor: &Actor, id: Uuid) -> Result<(), ServiceError> {
        authorize(actor, Resource::Account, Action::Delete, Target::OwnedBy(id))?;
        if !self.users.delete(id).await? {
            return Err(ServiceError::NotFound(Entity::User));
        }
        tracing::info!(user_id = %id, deleted_by = ?actor.user_id(), "account deleted");
        Ok(())
    }
}

// ── PublicProfile ────────────────────────────────────────────────────────────

pub struct PublicProfileUseCase<U: UserRepository, R: ReviewRepository> {
    pub users: U,
    pub reviews: R,
}

impl<U: UserRepository, R: ReviewRepository> PublicProfileUseCase<U, R> {
    pub async fn execute(&self, username: &str) -> Result<AccountRecord, ServiceError> {
        let user = find_active_user(&self.users, username).await?;
        let reviews_count = self.reviews.count_by_user(user.id).await?;
        Ok(AccountRecord {
            user,
            view: AccountView::Public,
            reviews_count,
        })
    }
}

// ── UserReviews ──────────────────────────────────────────────────────────────

pub struct UserReviewsUseCase<U: UserRepository, R: ReviewRepository> {
    pub users: U,
    pub reviews: R,
}

impl<U: UserRepository, R: ReviewRepository> UserReviewsUseCase<U, R> {
    pub async fn execute(
        &self,
        username: &str,
        page: Option<PageRequest>,
    ) -> Result<Vec<ReviewRecord>, ServiceError> {
        let user = find_active_user(&self.users, username).await?;
        let query = ReviewQuery {
            page,
            ..ReviewQuery::for_user(user.id)
        };
        self.reviews.list(&query).await
    }
}
