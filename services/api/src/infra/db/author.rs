use std::collections::HashMap;

use anyhow::Context as _;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, sea_query::Expr,
};

use bookstore_core::sea_ext::contains_ci;
use bookstore_schema::{authors, books};

use crate::domain::query::{ListParams, NamedSortField};
use crate::domain::repository::AuthorRepository;
use crate::domain::types::{Author, AuthorChanges, NewAuthor};
use crate::error::{Entity, ServiceError};
use crate::infra::db::category::order;
use crate::infra::db::{author_from_model, write_error};

#[derive(Clone)]
pub struct DbAuthorRepository {
    pub db: DatabaseConnection,
}

impl AuthorRepository for DbAuthorRepository {
    async fn list(&self, params: &ListParams) -> Result<Vec<Author>, ServiceError> {
        let mut select = authors::Entity::find();
        if let Some(term) = params.search_term() {
            select = select.filter(
                Condition::any()
                    .add(contains_ci(Expr::col(authors::Column::Name), term))
                    .add(contains_ci(Expr::col(authors::Column::Bio), term))
                    .add(contains_ci(Expr::col(authors::Column::Email), term)),
            );
        }
        let (field, direction) = params.ordering;
        let column = match field {
            NamedSortField::Name => authors::Column::Name,
            NamedSortField::CreatedAt => authors::Column::CreatedAt,
        };
        select = select
            .order_by(column, order(direction))
            .order_by_asc(authors::Column::Id);
        if let Some(page) = params.page {
            select = select.offset(page.offset()).limit(page.limit());
        }

        let models = select.all(&self.db).await.context("list authors")?;
        Ok(models.into_iter().map(author_from_model).collect())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Author>, ServiceError> {
        let model = authors::Entity::find()
            .filter(authors::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .context("find author by slug")?;
        Ok(model.map(author_from_model))
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Author>, ServiceError> {
        let model = authors::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find author by id")?;
        Ok(model.map(author_from_model))
    }

    async fn create(&self, author: &NewAuthor) -> Result<Author, ServiceError> {
        let now = Utc::now();
        let model = authors::ActiveModel {
            name: Set(author.name.clone()),
            bio: Set(author.bio.clone()),
            email: Set(author.email.clone()),
            website: Set(author.website.clone()),
            photo: Set(None),
            slug: Set(author.slug.clone()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(|e| write_error(e, Entity::Author, "create author"))?;
        Ok(author_from_model(model))
    }

    async fn update(&self, id: i32, changes: &AuthorChanges) -> Result<Author, ServiceError> {
        let mut am = authors::ActiveModel {
            id: Set(id),
            ..Default::default()
        };
        if let Some(name) = &changes.name {
            am.name = Set(name.clone());
        }
        if let Some(bio) = &changes.bio {
            am.bio = Set(bio.clone());
        }
        if let Some(email) = &changes.email {
            am.email = Set(email.clone());
        }
        if let Some(website) = &changes.website {
            am.website = Set(website.clone());
        }
        am.updated_at = Set(Utc::now());
        let model = am
            .update(&self.db)
            .await
            .map_err(|e| write_error(e, Entity::Author, "update author"))?;
        Ok(author_from_model(model))
    }

    async fn set_photo(&self, id: i32, photo: &str) -> Result<Author, ServiceError> {
        let model = authors::ActiveModel {
            id: Set(id),
            photo: Set(Some(photo.to_owned())),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .map_err(|e| write_error(e, Entity::Author, "set author photo"))?;
        Ok(author_from_model(model))
    }

    async fn delete(&self, id: i32) -> Result<bool, ServiceError> {
        let result = authors::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete author")?;
        Ok(result.rows_affected > 0)
    }

    async fn books_counts(&self, ids: &[i32]) -> Result<HashMap<i32, u64>, ServiceError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows: Vec<(i32, i64)> = books::Entity::find()
            .select_only()
            .column(books::Column::AuthorId)
            .column_as(books::Column::Id.count(), "books_count")
            .filter(books::Column::AuthorId.is_in(ids.to_vec()))
            .group_by(books::Column::AuthorId)
            .into_tuple()
            .all(&self.db)
            .await
            .context("count books per author")?;
        Ok(rows
            .into_iter()
            .map(|(id, count)| (id, count.max(0) as u64))
            .collect())
    }
}
