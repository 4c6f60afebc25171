use anyhow::Context as _;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, DatabaseConnection, EntityTrait,
    JoinType, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Select,
    sea_query::Expr,
};

use bookstore_core::sea_ext::contains_ci;
use bookstore_schema::{authors, books, categories};

use crate::domain::query::{BookPredicate, BookQuery, BookSortField};
use crate::domain::repository::BookRepository;
use crate::domain::types::{Book, BookChanges, BookRecord, NewBook};
use crate::error::{Entity, ServiceError};
use crate::infra::db::category::order;
use crate::infra::db::{book_from_model, book_records, write_error};

/// Average rating per book with reviewless books as 0, usable in ORDER BY.
const AVERAGE_RATING: &str =
    r#"COALESCE((SELECT AVG("reviews"."rating") FROM "reviews" WHERE "reviews"."book_id" = "books"."id"), 0)"#;

fn text_condition(term: &str) -> Condition {
    Condition::any()
        .add(contains_ci(Expr::col((books::Entity, books::Column::Title)), term))
        .add(contains_ci(
            Expr::col((books::Entity, books::Column::Description)),
            term,
        ))
        .add(contains_ci(Expr::col((authors::Entity, authors::Column::Name)), term))
        .add(contains_ci(
            Expr::col((categories::Entity, categories::Column::Name)),
            term,
        ))
        .add(contains_ci(Expr::col((books::Entity, books::Column::Isbn)), term))
}

/// Translate the plan's predicates into a filtered `SELECT` on books.
pub(crate) fn filtered(query: &BookQuery) -> Select<books::Entity> {
    let mut select = books::Entity::find();
    if query
        .predicates()
        .iter()
        .any(|p| matches!(p, BookPredicate::Text(_)))
    {
        select = select
            .join(JoinType::InnerJoin, books::Relation::Author.def())
            .join(JoinType::InnerJoin, books::Relation::Category.def());
    }
    for predicate in query.predicates() {
        select = match predicate {
            BookPredicate::Text(term) => select.filter(text_condition(term)),
            BookPredicate::MinPrice(min) => select.filter(books::Column::Price.gte(*min)),
            BookPredicate::MaxPrice(max) => select.filter(books::Column::Price.lte(*max)),
            BookPredicate::Language(language) => {
                select.filter(books::Column::Language.eq(language.code()))
            }
            BookPredicate::Status(status) => select.filter(books::Column::Status.eq(status.code())),
            BookPredicate::InStock => select.filter(books::Column::StockQuantity.gt(0)),
            BookPredicate::Category(id) => select.filter(books::Column::CategoryId.eq(*id)),
            BookPredicate::Author(id) => select.filter(books::Column::AuthorId.eq(*id)),
            BookPredicate::Publisher(publisher) => {
                select.filter(books::Column::Publisher.eq(publisher.as_str()))
            }
            BookPredicate::PublishedOnOrAfter(date) => {
                select.filter(books::Column::PublicationDate.gte(*date))
            }
        };
    }
    select
}

/// The full plan: predicates, ordering with `id ASC` last, and the offset/limit window.
pub(crate) fn planned(query: &BookQuery) -> Result<Select<books::Entity>, ServiceError> {
    let mut select = filtered(query);
    for (field, direction) in query.sort_fields()? {
        let direction = order(direction);
        select = match field {
            BookSortField::Title => select.order_by(books::Column::Title, direction),
            BookSortField::Price => select.order_by(books::Column::Price, direction),
            BookSortField::PublicationDate => {
                select.order_by(books::Column::PublicationDate, direction)
            }
            BookSortField::CreatedAt => select.order_by(books::Column::CreatedAt, direction),
            BookSortField::UpdatedAt => select.order_by(books::Column::UpdatedAt, direction),
            BookSortField::AverageRating => select.order_by(Expr::cust(AVERAGE_RATING), direction),
            BookSortField::StockQuantity => {
                select.order_by(books::Column::StockQuantity, direction)
            }
            BookSortField::Pages => select.order_by(books::Column::Pages, direction),
            BookSortField::Id => select.order_by(books::Column::Id, direction),
        };
    }
    select = select.order_by_asc(books::Column::Id);

    let (offset, take) = query.window();
    if offset > 0 {
        select = select.offset(offset);
    }
    if let Some(take) = take {
        select = select.limit(take);
    }
    Ok(select)
}

#[derive(Clone)]
pub struct DbBookRepository {
    pub db: DatabaseConnection,
}

impl BookRepository for DbBookRepository {
    async fn query(&self, query: &BookQuery) -> Result<Vec<BookRecord>, ServiceError> {
        let models = planned(query)?
            .all(&self.db)
            .await
            .context("query books")?;
        book_records(&self.db, models).await
    }

    async fn count(&self, query: &BookQuery) -> Result<u64, ServiceError> {
        let count = filtered(query)
            .count(&self.db)
            .await
            .context("count books")?;
        Ok(count)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<BookRecord>, ServiceError> {
        let model = books::Entity::find()
            .filter(books::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .context("find book by slug")?;
        Ok(book_records(&self.db, model.into_iter().collect())
            .await?
            .pop())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<BookRecord>, ServiceError> {
        let model = books::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find book by id")?;
        Ok(book_records(&self.db, model.into_iter().collect())
            .await?
            .pop())
    }

    async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<BookRecord>, ServiceError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut models = books::Entity::find()
            .filter(books::Column::Id.is_in(ids.to_vec()))
            .all(&self.db)
            .await
            .context("find books by ids")?;
        models.sort_by_key(|m| ids.iter().position(|id| *id == m.id));
        book_records(&self.db, models).await
    }

    async fn create(&self, book: &NewBook) -> Result<Book, ServiceError> {
        let now = Utc::now();
        let model = books::ActiveModel {
            title: Set(book.title.clone()),
            slug: Set(book.slug.clone()),
            author_id: Set(book.author_id),
            category_id: Set(book.category_id),
            description: Set(book.description.clone()),
            isbn: Set(book.isbn.clone()),
            publication_date: Set(book.publication_date),
            publisher: Set(book.publisher.clone()),
            language: Set(book.language.code().to_owned()),
            pages: Set(book.pages),
            price: Set(book.price),
            cover_image: Set(None),
            status: Set(book.status.code().to_owned()),
            stock_quantity: Set(book.stock_quantity),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(|e| write_error(e, Entity::Book, "create book"))?;
        tracing::debug!(book_id = model.id, "book row inserted");
        Ok(book_from_model(model))
    }

    async fn update(&self, id: i32, changes: &BookChanges) -> Result<Book, ServiceError> {
        let mut am = books::ActiveModel {
            id: Set(id),
            ..Default::default()
        };
        if let Some(title) = &changes.title {
            am.title = Set(title.clone());
        }
        if let Some(author_id) = changes.author_id {
            am.author_id = Set(author_id);
        }
        if let Some(category_id) = changes.category_id {
            am.category_id = Set(category_id);
        }
        if let Some(description) = &changes.description {
            am.description = Set(description.clone());
        }
        if let Some(isbn) = &changes.isbn {
            am.isbn = Set(isbn.clone());
        }
        if let Some(date) = changes.publication_date {
            am.publication_date = Set(date);
        }
        if let Some(publisher) = &changes.publisher {
            am.publisher = Set(publisher.clone());
        }
        if let Some(language) = changes.language {
            am.language = Set(language.code().to_owned());
        }
        if let Some(pages) = changes.pages {
            am.pages = Set(pages);
        }
        if let Some(price) = changes.price {
            am.price = Set(price);
        }
        if let Some(status) = changes.status {
            am.status = Set(status.code().to_owned());
        }
        if let Some(stock) = changes.stock_quantity {
            am.stock_quantity = Set(stock);
        }
        am.updated_at = Set(Utc::now());
        let model = am
            .update(&self.db)
            .await
            .map_err(|e| write_error(e, Entity::Book, "update book"))?;
        Ok(book_from_model(model))
    }

    async fn set_cover(&self, id: i32, cover: &str) -> Result<Book, ServiceError> {
        let model = books::ActiveModel {
            id: Set(id),
            cover_image: Set(Some(cover.to_owned())),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .map_err(|e| write_error(e, Entity::Book, "set book cover"))?;
        Ok(book_from_model(model))
    }

    async fn delete(&self, id: i32) -> Result<bool, ServiceError> {
        let result = books::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete book")?;
        Ok(result.rows_affected > 0)
    }
}
