use anyhow::Context as _;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, TransactionTrait,
};
use uuid::Uuid;

use bookstore_domain::pagination::PageRequest;
use bookstore_schema::{reviews, users};

use crate::domain::repository::UserRepository;
use crate::domain::types::{NewUser, ProfileChanges, User};
use crate::error::{Entity, ServiceError};
use crate::infra::db::{user_from_model, write_error};

#[derive(Clone)]
pub struct DbUserRepository {
    pub db: DatabaseConnection,
}

impl UserRepository for DbUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, ServiceError> {
        let model = users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find user by id")?;
        Ok(model.map(user_from_model))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, ServiceError> {
        let model = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.db)
            .await
            .context("find user by username")?;
        Ok(model.map(user_from_model))
    }

    async fn list(&self, page: Option<PageRequest>) -> Result<Vec<User>, ServiceError> {
        let mut select = users::Entity::find()
            .order_by_desc(users::Column::DateJoined)
            .order_by_asc(users::Column::Id);
        if let Some(page) = page {
            select = select.offset(page.offset()).limit(page.limit());
        }
        let models = select.all(&self.db).await.context("list users")?;
        Ok(models.into_iter().map(user_from_model).collect())
    }

    async fn create(&self, user: &NewUser) -> Result<User, ServiceError> {
        let now = Utc::now();
        let model = users::ActiveModel {
            id: Set(user.id),
            username: Set(user.username.clone()),
            email: Set(user.email.clone()),
            password: Set(user.credential.clone()),
            first_name: Set(user.first_name.clone()),
            last_name: Set(user.last_name.clone()),
            phone_number: Set(user.phone_number.clone()),
            address: Set(user.address.clone()),
            date_of_birth: Set(user.date_of_birth),
            avatar: Set(None),
            bio: Set(user.bio.clone()),
            role: Set(i16::from(user.role.as_u8())),
            is_active: Set(true),
            is_verified: Set(user.is_verified),
            email_verified: Set(false),
            date_joined: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await
        .map_err(|e| write_error(e, Entity::User, "create user"))?;
        Ok(user_from_model(model))
    }

    async fn update_profile(
        &self,
        id: Uuid,
        changes: &ProfileChanges,
    ) -> Result<User, ServiceError> {
        let mut am = users::ActiveModel {
            id: Set(id),
            ..Default::default()
        };
        if let Some(first_name) = &changes.first_name {
            am.first_name = Set(first_name.clone());
        }
        if let Some(last_name) = &changes.last_name {
            am.last_name = Set(last_name.clone());
        }
        if let Some(phone_number) = &changes.phone_number {
            am.phone_number = Set(phone_number.clone());
        }
        if let Some(address) = &changes.address {
            am.address = Set(address.clone());
        }
        if let Some(date_of_birth) = changes.date_of_birth {
            am.date_of_birth = Set(date_of_birth);
        }
        if let Some(bio) = &changes.bio {
            am.bio = Set(bio.clone());
        }
        am.updated_at = Set(Utc::now());
        let model = am
            .update(&self.db)
            .await
            .map_err(|e| write_error(e, Entity::User, "update user profile"))?;
        Ok(user_from_model(model))
    }

    async fn set_credential(&self, id: Uuid, credential: &str) -> Result<(), ServiceError> {
        users::ActiveModel {
            id: Set(id),
            password: Set(credential.to_owned()),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .map_err(|e| write_error(e, Entity::User, "set user credential"))?;
        Ok(())
    }

    async fn set_avatar(&self, id: Uuid, avatar: &str) -> Result<User, ServiceError> {
        let model = users::ActiveModel {
            id: Set(id),
            avatar: Set(Some(avatar.to_owned())),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .map_err(|e| write_error(e, Entity::User, "set user avatar"))?;
        Ok(user_from_model(model))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ServiceError> {
        let txn = self.db.begin().await.context("begin delete user")?;
        reviews::Entity::delete_many()
            .filter(reviews::Column::UserId.eq(id))
            .exec(&txn)
            .await
            .context("delete user reviews")?;
        let result = users::Entity::delete_by_id(id)
            .exec(&txn)
            .await
            .context("delete user")?;
        txn.commit().await.context("commit delete user")?;
        Ok(result.rows_affected > 0)
    }
}
