use std::collections::HashMap;

use anyhow::Context as _;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, DatabaseConnection, EntityTrait,
    Order, QueryFilter, QueryOrder, QuerySelect, sea_query::Expr,
};

use bookstore_core::sea_ext::contains_ci;
use bookstore_domain::pagination::Sort;
use bookstore_schema::{books, categories};

use crate::domain::query::{ListParams, NamedSortField};
use crate::domain::repository::CategoryRepository;
use crate::domain::types::{Category, CategoryChanges, NewCategory};
use crate::error::{Entity, ServiceError};
use crate::infra::db::{category_from_model, write_error};

pub(crate) fn order(sort: Sort) -> Order {
    match sort {
        Sort::Asc => Order::Asc,
        Sort::Desc => Order::Desc,
    }
}

#[derive(Clone)]
pub struct DbCategoryRepository {
    pub db: DatabaseConnection,
}

impl CategoryRepository for DbCategoryRepository {
    async fn list(&self, params: &ListParams) -> Result<Vec<Category>, ServiceError> {
        let mut select = categories::Entity::find();
        if let Some(term) = params.search_term() {
            select = select.filter(
                Condition::any()
                    .add(contains_ci(Expr::col(categories::Column::Name), term))
                    .add(contains_ci(Expr::col(categories::Column::Description), term)),
            );
        }
        let (field, direction) = params.ordering;
        select = match field {
            NamedSortField::Name => select.order_by(categories::Column::Name, order(direction)),
            NamedSortField::CreatedAt => {
                select.order_by(categories::Column::CreatedAt, order(direction))
            }
        }
        .order_by_asc(categories::Column::Id);
        if let Some(page) = params.page {
            select = select.offset(page.offset()).limit(page.limit());
        }

        let models = select.all(&self.db).await.context("list categories")?;
        Ok(models.into_iter().map(category_from_model).collect())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, ServiceError> {
        let model = categories::Entity::find()
            .filter(categories::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .context("find category by slug")?;
        Ok(model.map(category_from_model))
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Category>, ServiceError> {
        let model = categories::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find category by id")?;
        Ok(model.map(category_from_model))
    }

    async fn create(&self, category: &NewCategory) -> Result<Category, ServiceError> {
        let now = Utc::now();
        let model = categories::ActiveModel {
            name: Set(category.name.clone()),
            description: Set(category.description.clone()),
            slug: Set(category.slug.clone()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(|e| write_error(e, Entity::Category, "create category"))?;
        Ok(category_from_model(model))
    }

    async fn update(&self, id: i32, changes: &CategoryChanges) -> Result<Category, ServiceError> {
        let mut am = categories::ActiveModel {
            id: Set(id),
            ..Default::default()
        };
        if let Some(name) = &changes.name {
            am.name = Set(name.clone());
        }
        if let Some(description) = &changes.description {
            am.description = Set(description.clone());
        }
        am.updated_at = Set(Utc::now());
        let model = am
            .update(&self.db)
            .await
            .map_err(|e| write_error(e, Entity::Category, "update category"))?;
        Ok(category_from_model(model))
    }

    async fn delete(&self, id: i32) -> Result<bool, ServiceError> {
        let result = categories::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete category")?;
        Ok(result.rows_affected > 0)
    }

    async fn books_counts(&self, ids: &[i32]) -> Result<HashMap<i32, u64>, ServiceError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows: Vec<(i32, i64)> = books::Entity::find()
            .select_only()
            .column(books::Column::CategoryId)
            .column_as(books::Column::Id.count(), "books_count")
            .filter(books::Column::CategoryId.is_in(ids.to_vec()))
            .group_by(books::Column::CategoryId)
            .into_tuple()
            .all(&self.db)
            .await
            .context("count books per category")?;
        Ok(rows
            .into_iter()
            .map(|(id, count)| (id, count.max(0) as u64))
            .collect())
    }
}
