pub mod author;
pub mod book;
pub mod category;
pub mod review;
pub mod statistics;
pub mod user;

use std::collections::HashMap;

use anyhow::Context as _;
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QuerySelect};

use bookstore_core::sea_ext::{ConstraintViolation, constraint_violation};
use bookstore_domain::book::{BookStatus, Language};
use bookstore_domain::user::UserRole;
use bookstore_schema::{authors, books, categories, reviews, users};

use crate::domain::types::{
    Author, Book, BookRecord, Category, RatingSummary, Review, ReviewRecord, User,
};
use crate::error::{Entity, ServiceError};

/// Messages for the named unique indexes.
const UNIQUE_INDEXES: &[(&str, &str)] = &[
    ("uq_books_isbn", "a book with this isbn already exists"),
    ("uq_books_slug", "a book with this slug already exists"),
    ("uq_reviews_book_user", "you have already reviewed this book"),
    ("uq_users_username", "a user with that username already exists"),
    ("uq_categories_name", "a category with this name already exists"),
    ("uq_categories_slug", "a category with this slug already exists"),
    ("uq_authors_slug", "an author with this slug already exists"),
];

/// Translate a failed write. Constraint violations become client errors; a missing row
/// becomes `NotFound`; anything else is internal.
pub(crate) fn write_error(err: DbErr, entity: Entity, context: &'static str) -> ServiceError {
    if matches!(err, DbErr::RecordNotUpdated | DbErr::RecordNotFound(_)) {
        return ServiceError::NotFound(entity);
    }
    match constraint_violation(&err) {
        Some(violation) => violation_error(&violation),
        None => ServiceError::Internal(anyhow::Error::new(err).context(context)),
    }
}

fn violation_error(violation: &ConstraintViolation) -> ServiceError {
    match violation {
        ConstraintViolation::Unique(_) => ServiceError::Duplicate(
            UNIQUE_INDEXES
                .iter()
                .find(|(index, _)| violation.names(index))
                .map(|(_, message)| *message)
                .unwrap_or("a record with these values already exists"),
        ),
        ConstraintViolation::ForeignKey(_) => {
            ServiceError::validation("a referenced record does not exist")
        }
        ConstraintViolation::OutOfRange(_) => {
            ServiceError::validation("a value is too long or out of range for its field")
        }
    }
}

// ── Model conversions ────────────────────────────────────────────────────────

pub(crate) fn category_from_model(model: categories::Model) -> Category {
    Category {
        id: model.id,
        name: model.name,
        description: model.description,
        slug: model.slug,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

pub(crate) fn author_from_model(model: authors::Model) -> Author {
    Author {
        id: model.id,
        name: model.name,
        bio: model.bio,
        email: model.email,
        website: model.website,
        photo: model.photo,
        slug: model.slug,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

pub(crate) fn book_from_model(model: books::Model) -> Book {
    Book {
        id: model.id,
        title: model.title,
        slug: model.slug,
        author_id: model.author_id,
        category_id: model.category_id,
        description: model.description,
        isbn: model.isbn,
        publication_date: model.publication_date,
        publisher: model.publisher,
        language: Language::from_code(&model.language).unwrap_or_default(),
        pages: model.pages,
        price: model.price,
        cover_image: model.cover_image,
        status: BookStatus::from_code(&model.status).unwrap_or_default(),
        stock_quantity: model.stock_quantity,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

pub(crate) fn review_from_model(model: reviews::Model) -> Review {
    Review {
        id: model.id,
        book_id: model.book_id,
        user_id: model.user_id,
        rating: model.rating,
        comment: model.comment,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

pub(crate) fn user_from_model(model: users::Model) -> User {
    User {
        id: model.id,
        username: model.username,
        email: model.email,
        credential: model.password,
        first_name: model.first_name,
        last_name: model.last_name,
        phone_number: model.phone_number,
        address: model.address,
        date_of_birth: model.date_of_birth,
        avatar: model.avatar,
        bio: model.bio,
        role: u8::try_from(model.role)
            .ok()
            .and_then(UserRole::from_u8)
            .unwrap_or_default(),
        is_active: model.is_active,
        is_verified: model.is_verified,
        email_verified: model.email_verified,
        date_joined: model.date_joined,
        updated_at: model.updated_at,
    }
}

// ── Record loading ───────────────────────────────────────────────────────────

fn distinct<T: Copy + Eq + std::hash::Hash>(ids: impl Iterator<Item = T>) -> Vec<T> {
    let mut seen = std::collections::HashSet::new();
    ids.filter(|id| seen.insert(*id)).collect()
}

/// Review count and rating sum per book id.
pub(crate) async fn rating_summaries<C: ConnectionTrait>(
    db: &C,
    book_ids: Option<&[i32]>,
) -> Result<HashMap<i32, RatingSummary>, ServiceError> {
    let mut select = reviews::Entity::find()
        .select_only()
        .column(reviews::Column::BookId)
        .column_as(reviews::Column::Id.count(), "reviews")
        .column_as(reviews::Column::Rating.sum(), "rating_sum")
        .group_by(reviews::Column::BookId);
    if let Some(ids) = book_ids {
        select = select.filter(reviews::Column::BookId.is_in(ids.to_vec()));
    }
    let rows: Vec<(i32, i64, Option<i64>)> = select
        .into_tuple()
        .all(db)
        .await
        .context("load rating summaries")?;
    Ok(rows
        .into_iter()
        .map(|(book_id, count, sum)| {
            (
                book_id,
                RatingSummary {
                    count: count.max(0) as u64,
                    sum: sum.unwrap_or(0),
                },
            )
        })
        .collect())
}

/// Attach authors, categories and rating summaries to book rows, keeping their order.
pub(crate) async fn book_records<C: ConnectionTrait>(
    db: &C,
    models: Vec<books::Model>,
) -> Result<Vec<BookRecord>, ServiceError> {
    if models.is_empty() {
        return Ok(Vec::new());
    }
    let author_ids = distinct(models.iter().map(|m| m.author_id));
    let category_ids = distinct(models.iter().map(|m| m.category_id));
    let book_ids: Vec<i32> = models.iter().map(|m| m.id).collect();

    let authors: HashMap<i32, Author> = authors::Entity::find()
        .filter(authors::Column::Id.is_in(author_ids))
        .all(db)
        .await
        .context("load book authors")?
        .into_iter()
        .map(|m| (m.id, author_from_model(m)))
        .collect();
    let categories: HashMap<i32, Category> = categories::Entity::find()
        .filter(categories::Column::Id.is_in(category_ids))
        .all(db)
        .await
        .context("load book categories")?
        .into_iter()
        .map(|m| (m.id, category_from_model(m)))
        .collect();
    let ratings = rating_summaries(db, Some(&book_ids)).await?;

    models
        .into_iter()
        .map(|model| -> Result<BookRecord, ServiceError> {
            let author = authors
                .get(&model.author_id)
                .cloned()
                .with_context(|| format!("author {} of book {} missing", model.author_id, model.id))?;
            let category = categories.get(&model.category_id).cloned().with_context(|| {
                format!("category {} of book {} missing", model.category_id, model.id)
            })?;
            let rating = ratings.get(&model.id).copied().unwrap_or_default();
            Ok(BookRecord {
                book: book_from_model(model),
                author,
                category,
                rating,
            })
        })
        .collect()
}

/// Attach usernames and book titles to review rows, keeping their order.
pub(crate) async fn review_records<C: ConnectionTrait>(
    db: &C,
    models: Vec<reviews::Model>,
) -> Result<Vec<ReviewRecord>, ServiceError> {
    if models.is_empty() {
        return Ok(Vec::new());
    }
    let user_ids = distinct(models.iter().map(|m| m.user_id));
    let book_ids = distinct(models.iter().map(|m| m.book_id));

    let usernames: HashMap<uuid::Uuid, String> = users::Entity::find()
        .select_only()
        .column(users::Column::Id)
        .column(users::Column::Username)
        .filter(users::Column::Id.is_in(user_ids))
        .into_tuple::<(uuid::Uuid, String)>()
        .all(db)
        .await
        .context("load review usernames")?
        .into_iter()
        .collect();
    let titles: HashMap<i32, String> = books::Entity::find()
        .select_only()
        .column(books::Column::Id)
        .column(books::Column::Title)
        .filter(books::Column::Id.is_in(book_ids))
        .into_tuple::<(i32, String)>()
        .all(db)
        .await
        .context("load review book titles")?
        .into_iter()
        .collect();

    Ok(models
        .into_iter()
        .map(|model| ReviewRecord {
            username: usernames.get(&model.user_id).cloned().unwrap_or_default(),
            book_title: titles.get(&model.book_id).cloned().unwrap_or_default(),
            review: review_from_model(model),
        })
        .collect())
}
