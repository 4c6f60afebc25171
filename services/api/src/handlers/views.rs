//! Response shapes.
//!
//! The shape is picked by the policy's [`View`] for the (resource, action) pair and, for
//! accounts, by [`AccountView`]. No response carries fields the caller is not entitled to.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use bookstore_core::serde::{to_money, to_rfc3339_ms};
use bookstore_domain::book::{BookStatus, Language};
use bookstore_domain::policy::{AccountView, View};
use bookstore_domain::user::UserRole;

use crate::domain::repository::BlobStore;
use crate::domain::types::{AuthorRecord, BookRecord, CategoryRecord, ReviewRecord, User};
use crate::usecase::account::AccountRecord;
use crate::usecase::statistics::Statistics;

fn url<B: BlobStore>(blobs: &B, reference: Option<&str>) -> Option<String> {
    reference.map(|r| blobs.url_for(r))
}

// ── Category ─────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct CategoryView {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub slug: String,
    #[serde(serialize_with = "to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "to_rfc3339_ms")]
    pub updated_at: DateTime<Utc>,
    pub books_count: u64,
}

impl From<CategoryRecord> for CategoryView {
    fn from(record: CategoryRecord) -> Self {
        let c = record.category;
        Self {
            id: c.id,
            name: c.name,
            description: c.description,
            slug: c.slug,
            created_at: c.created_at,
            updated_at: c.updated_at,
            books_count: record.books_count,
        }
    }
}

// ── Author ───────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct AuthorView {
    pub id: i32,
    pub name: String,
    pub bio: String,
    pub email: String,
    pub website: String,
    pub photo: Option<String>,
    pub photo_url: Option<String>,
    pub slug: String,
    #[serde(serialize_with = "to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "to_rfc3339_ms")]
    pub updated_at: DateTime<Utc>,
    pub books_count: u64,
}

impl AuthorView {
    pub fn new<B: BlobStore>(record: AuthorRecord, blobs: &B) -> Self {
        let a = record.author;
        Self {
            photo_url: url(blobs, a.photo.as_deref()),
            id: a.id,
            name: a.name,
            bio: a.bio,
            email: a.email,
            website: a.website,
            photo: a.photo,
            slug: a.slug,
            created_at: a.created_at,
            updated_at: a.updated_at,
            books_count: record.books_count,
        }
    }
}

// ── Book ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct BookSummaryView {
    pub id: i32,
    pub title: String,
    pub slug: String,
    pub author_name: String,
    pub category_name: String,
    pub isbn: String,
    pub publication_date: NaiveDate,
    pub publisher: String,
    pub language: Language,
    #[serde(serialize_with = "to_money")]
    pub price: Decimal,
    pub cover_url: Option<String>,
    pub status: BookStatus,
    pub stock_quantity: i32,
    pub is_available: bool,
    #[serde(serialize_with = "to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
}

impl BookSummaryView {
    pub fn new<B: BlobStore>(record: BookRecord, blobs: &B) -> Self {
        let is_available = record.book.is_available();
        let b = record.book;
        Self {
            cover_url: url(blobs, b.cover_image.as_deref()),
            id: b.id,
            title: b.title,
            slug: b.slug,
            author_name: record.author.name,
            category_name: record.category.name,
            isbn: b.isbn,
            publication_date: b.publication_date,
            publisher: b.publisher,
            language: b.language,
            price: b.price,
            status: b.status,
            stock_quantity: b.stock_quantity,
            is_available,
            created_at: b.created_at,
        }
    }
}

/// Nested author and category carry no book counts.
#[derive(Debug, Serialize)]
pub struct BookAuthorView {
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub photo_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BookCategoryView {
    pub id: i32,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Serialize)]
pub struct BookDetailView {
    pub id: i32,
    pub title: String,
    pub slug: String,
    pub author: BookAuthorView,
    pub category: BookCategoryView,
    pub description: String,
    pub isbn: String,
    pub publication_date: NaiveDate,
    pub publisher: String,
    pub language: Language,
    pub pages: i32,
    #[serde(serialize_with = "to_money")]
    pub price: Decimal,
    pub cover_image: Option<String>,
    pub cover_url: Option<String>,
    pub status: BookStatus,
    pub stock_quantity: i32,
    pub is_available: bool,
    pub average_rating: f64,
    pub reviews_count: u64,
    #[serde(serialize_with = "to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "to_rfc3339_ms")]
    pub updated_at: DateTime<Utc>,
}

impl BookDetailView {
    pub fn new<B: BlobStore>(record: BookRecord, blobs: &B) -> Self {
        let is_available = record.book.is_available();
        let BookRecord {
            book: b,
            author,
            category,
            rating,
        } = record;
        Self {
            cover_url: url(blobs, b.cover_image.as_deref()),
            author: BookAuthorView {
                photo_url: url(blobs, author.photo.as_deref()),
                id: author.id,
                name: author.name,
                slug: author.slug,
            },
            category: BookCategoryView {
                id: category.id,
                name: category.name,
                slug: category.slug,
            },
            id: b.id,
            title: b.title,
            slug: b.slug,
            description: b.description,
            isbn: b.isbn,
            publication_date: b.publication_date,
            publisher: b.publisher,
            language: b.language,
            pages: b.pages,
            price: b.price,
            cover_image: b.cover_image,
            status: b.status,
            stock_quantity: b.stock_quantity,
            is_available,
            average_rating: rating.average(),
            reviews_count: rating.count,
            created_at: b.created_at,
            updated_at: b.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum BookView {
    Summary(BookSummaryView),
    Detail(BookDetailView),
}

impl BookView {
    pub fn new<B: BlobStore>(view: View, record: BookRecord, blobs: &B) -> Self {
        match view {
            View::Summary => Self::Summary(BookSummaryView::new(record, blobs)),
            View::Detail | View::Account => Self::Detail(BookDetailView::new(record, blobs)),
        }
    }
}

// ── Review ───────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ReviewView {
    pub id: i32,
    pub book: i32,
    pub book_title: String,
    pub user: Uuid,
    pub user_username: String,
    pub rating: i16,
    pub comment: String,
    #[serde(serialize_with = "to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "to_rfc3339_ms")]
    pub updated_at: DateTime<Utc>,
}

impl From<ReviewRecord> for ReviewView {
    fn from(record: ReviewRecord) -> Self {
        let r = record.review;
        Self {
            id: r.id,
            book: r.book_id,
            book_title: record.book_title,
            user: r.user_id,
            user_username: record.username,
            rating: r.rating,
            comment: r.comment,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

// ── Accounts ─────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct UserAccountView {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub phone_number: String,
    pub address: String,
    pub date_of_birth: Option<NaiveDate>,
    pub avatar: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: String,
    pub role: UserRole,
    pub is_active: bool,
    pub is_verified: bool,
    pub email_verified: bool,
    #[serde(serialize_with = "to_rfc3339_ms")]
    pub date_joined: DateTime<Utc>,
    #[serde(serialize_with = "to_rfc3339_ms")]
    pub updated_at: DateTime<Utc>,
    pub reviews_count: u64,
}

impl UserAccountView {
    pub fn new<B: BlobStore>(user: User, reviews_count: u64, blobs: &B) -> Self {
        Self {
            full_name: user.full_name(),
            avatar_url: url(blobs, user.avatar.as_deref()),
            id: user.id,
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            phone_number: user.phone_number,
            address: user.address,
            date_of_birth: user.date_of_birth,
            avatar: user.avatar,
            bio: user.bio,
            role: user.role,
            is_active: user.is_active,
            is_verified: user.is_verified,
            email_verified: user.email_verified,
            date_joined: user.date_joined,
            updated_at: user.updated_at,
            reviews_count,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserProfileView {
    pub id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub avatar_url: Option<String>,
    pub bio: String,
    pub role: UserRole,
    pub is_verified: bool,
    #[serde(serialize_with = "to_rfc3339_ms")]
    pub date_joined: DateTime<Utc>,
    pub reviews_count: u64,
}

impl UserProfileView {
    pub fn new<B: BlobStore>(user: User, reviews_count: u64, blobs: &B) -> Self {
        Self {
            full_name: user.full_name(),
            avatar_url: url(blobs, user.avatar.as_deref()),
            id: user.id,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            bio: user.bio,
            role: user.role,
            is_verified: user.is_verified,
            date_joined: user.date_joined,
            reviews_count,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum UserView {
    Account(UserAccountView),
    Profile(UserProfileView),
}

impl UserView {
    pub fn new<B: BlobStore>(record: AccountRecord, blobs: &B) -> Self {
        match record.view {
            AccountView::Full => {
                Self::Account(UserAccountView::new(record.user, record.reviews_count, blobs))
            }
            AccountView::Public => {
                Self::Profile(UserProfileView::new(record.user, record.reviews_count, blobs))
            }
        }
    }
}

// ── Statistics ───────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct CategoryStatView {
    pub name: String,
    pub book_count: u64,
}

#[derive(Debug, Serialize)]
pub struct LanguageStatView {
    pub language: Language,
    pub count: u64,
}

#[derive(Debug, Serialize)]
pub struct TopRatedBookView {
    #[serde(flatten)]
    pub book: BookSummaryView,
    pub average_rating: f64,
    pub reviews_count: u64,
}

#[derive(Debug, Serialize)]
pub struct StatisticsView {
    pub total_books: u64,
    pub available_books: u64,
    pub total_authors: u64,
    pub total_categories: u64,
    pub category_stats: Vec<CategoryStatView>,
    pub language_stats: Vec<LanguageStatView>,
    pub top_rated_books: Vec<TopRatedBookView>,
}

impl StatisticsView {
    pub fn new<B: BlobStore>(stats: Statistics, blobs: &B) -> Self {
        Self {
            total_books: stats.total_books,
            available_books: stats.available_books,
            total_authors: stats.total_authors,
            total_categories: stats.total_categories,
            category_stats: stats
                .per_category
                .into_iter()
                .map(|c| CategoryStatView {
                    name: c.name,
                    book_count: c.book_count,
                })
                .collect(),
            language_stats: stats
                .per_language
                .into_iter()
                .map(|l| LanguageStatView {
                    language: l.language,
                    count: l.count,
                })
                .collect(),
            top_rated_books: stats
                .top_rated
                .into_iter()
                .map(|record| {
                    let rating = record.rating;
                    TopRatedBookView {
                        book: BookSummaryView::new(record, blobs),
                        average_rating: rating.average(),
                        reviews_count: rating.count,
                    }
                })
                .collect(),
        }
    }
}
