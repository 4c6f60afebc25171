use std::collections::HashMap;

use anyhow::Context as _;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select,
};
use uuid::Uuid;

use bookstore_domain::policy::ReviewVisibility;
use bookstore_schema::reviews;

use crate::domain::query::{ReviewQuery, ReviewSortField};
use crate::domain::repository::ReviewRepository;
use crate::domain::types::{NewReview, Review, ReviewChanges, ReviewRecord};
use crate::error::{Entity, ServiceError};
use crate::infra::db::category::order;
use crate::infra::db::{review_from_model, review_records, write_error};

fn planned(query: &ReviewQuery) -> Select<reviews::Entity> {
    let mut select = reviews::Entity::find();
    if let Some(book_id) = query.book_id {
        select = select.filter(reviews::Column::BookId.eq(book_id));
    }
    if let Some(user_id) = query.user_id {
        select = select.filter(reviews::Column::UserId.eq(user_id));
    }
    if let Some(rating) = query.rating {
        select = select.filter(reviews::Column::Rating.eq(rating));
    }
    if let ReviewVisibility::OwnOnly(user_id) = query.visibility {
        select = select.filter(reviews::Column::UserId.eq(user_id));
    }
    for (field, direction) in &query.ordering {
        let column = match field {
            ReviewSortField::Rating => reviews::Column::Rating,
            ReviewSortField::CreatedAt => reviews::Column::CreatedAt,
        };
        select = select.order_by(column, order(*direction));
    }
    select = select.order_by_asc(reviews::Column::Id);
    if let Some(page) = query.page {
        select = select.offset(page.offset()).limit(page.limit());
    }
    select
}

#[derive(Clone)]
pub struct DbReviewRepository {
    pub db: DatabaseConnection,
}

impl ReviewRepository for DbReviewRepository {
    async fn list(&self, query: &ReviewQuery) -> Result<Vec<ReviewRecord>, ServiceError> {
        if query.visibility == ReviewVisibility::Nothing {
            return Ok(Vec::new());
        }
        let models = planned(query)
            .all(&self.db)
            .await
            .context("list reviews")?;
        review_records(&self.db, models).await
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<ReviewRecord>, ServiceError> {
        let model = reviews::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find review by id")?;
        Ok(review_records(&self.db, model.into_iter().collect())
            .await?
            .pop())
    }

    async fn find_by_book_and_user(
        &self,
        book_id: i32,
        user_id: Uuid,
    ) -> Result<Option<Review>, ServiceError> {
        let model = reviews::Entity::find()
            .filter(reviews::Column::BookId.eq(book_id))
            .filter(reviews::Column::UserId.eq(user_id))
            .one(&self.db)
            .await
            .context("find review by book and user")?;
        Ok(model.map(review_from_model))
    }

    async fn create(&self, review: &NewReview) -> Result<Review, ServiceError> {
        let now = Utc::now();
        let model = reviews::ActiveModel {
            book_id: Set(review.book_id),
            user_id: Set(review.user_id),
            rating: Set(review.rating),
            comment: Set(review.comment.clone()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(|e| write_error(e, Entity::Review, "create review"))?;
        Ok(review_from_model(model))
    }

    async fn update(&self, id: i32, changes: &ReviewChanges) -> Result<Review, ServiceError> {
        let mut am = reviews::ActiveModel {
            id: Set(id),
            ..Default::default()
        };
        if let Some(rating) = changes.rating {
            am.rating = Set(rating);
        }
        if let Some(comment) = &changes.comment {
            am.comment = Set(comment.clone());
        }
        am.updated_at = Set(Utc::now());
        let model = am
            .update(&self.db)
            .await
            .map_err(|e| write_error(e, Entity::Review, "update review"))?;
        Ok(review_from_model(model))
    }

    async fn delete(&self, id: i32) -> Result<bool, ServiceError> {
        let result = reviews::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete review")?;
        Ok(result.rows_affected > 0)
    }

    async fn count_by_user(&self, user_id: Uuid) -> Result<u64, ServiceError> {
        let count = reviews::Entity::find()
            .filter(reviews::Column::UserId.eq(user_id))
            .count(&self.db)
            .await
            .context("count reviews by user")?;
        Ok(count)
    }

    async fn counts_by_users(
        &self,
        user_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, u64>, ServiceError> {
        if user_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows: Vec<(Uuid, i64)> = reviews::Entity::find()
            .select_only()
            .column(reviews::Column::UserId)
            .column_as(reviews::Column::Id.count(), "reviews_count")
            .filter(reviews::Column::UserId.is_in(user_ids.to_vec()))
            .group_by(reviews::Column::UserId)
            .into_tuple()
            .all(&self.db)
            .await
            .context("count reviews per user")?;
        Ok(rows
            .into_iter()
            .map(|(id, count)| (id, count.max(0) as u64))
            .collect())
    }
}
