use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use bookstore_domain::book::{BookStatus, Language};
use bookstore_domain::user::UserRole;

// ── Category ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A category with the number of books filed under it.
#[derive(Debug, Clone)]
pub struct CategoryRecord {
    pub category: Category,
    pub books_count: u64,
}

#[derive(Debug, Clone)]
pub struct NewCategory {
    pub name: String,
    pub description: String,
    pub slug: String,
}

#[derive(Debug, Clone, Default)]
pub struct CategoryChanges {
    pub name: Option<String>,
    pub description: Option<String>,
}

// ── Author ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Author {
    pub id: i32,
    pub name: String,
    pub bio: String,
    pub email: String,
    pub website: String,
    pub photo: Option<String>,
    pub slug: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct AuthorRecord {
    pub author: Author,
    pub books_count: u64,
}

#[derive(Debug, Clone)]
pub struct NewAuthor {
    pub name: String,
    pub bio: String,
    pub email: String,
    pub website: String,
    pub slug: String,
}

#[derive(Debug, Clone, Default)]
pub struct AuthorChanges {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
}

// ── Book ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub slug: String,
    pub author_id: i32,
    pub category_id: i32,
    pub description: String,
    pub isbn: String,
    pub publication_date: NaiveDate,
    pub publisher: String,
    pub language: Language,
    pub pages: i32,
    pub price: Decimal,
    pub cover_image: Option<String>,
    pub status: BookStatus,
    pub stock_quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Book {
    /// On the shelf and in stock.
    pub fn is_available(&self) -> bool {
        self.status == BookStatus::Available && self.stock_quantity > 0
    }
}

/// Count and sum of a book's review ratings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RatingSummary {
    pub count: u64,
    pub sum: i64,
}

impl RatingSummary {
    pub fn has_reviews(self) -> bool {
        self.count > 0
    }

    /// Mean rating; 0 for a book nobody has reviewed.
    pub fn average(self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum as f64 / self.count as f64
        }
    }

    /// Compare averages exactly as `sum / count` fractions. Reviewless summaries rank as 0.
    pub fn cmp_average(self, other: Self) -> Ordering {
        match (self.count, other.count) {
            (0, 0) => Ordering::Equal,
            (0, _) => 0i128.cmp(&i128::from(other.sum)),
            (_, 0) => i128::from(self.sum).cmp(&0),
            (a, b) => {
                (i128::from(self.sum) * i128::from(b)).cmp(&(i128::from(other.sum) * i128::from(a)))
            }
        }
    }
}

/// A book with the author, category and rating summary its views need.
#[derive(Debug, Clone)]
pub struct BookRecord {
    pub book: Book,
    pub author: Author,
    pub category: Category,
    pub rating: RatingSummary,
}

#[derive(Debug, Clone)]
pub struct NewBook {
    pub title: String,
    pub slug: String,
    pub author_id: i32,
    pub category_id: i32,
    pub description: String,
    pub isbn: String,
    pub publication_date: NaiveDate,
    pub publisher: String,
    pub language: Language,
    pub pages: i32,
    pub price: Decimal,
    pub status: BookStatus,
    pub stock_quantity: i32,
}

#[derive(Debug, Clone, Default)]
pub struct BookChanges {
    pub title: Option<String>,
    pub author_id: Option<i32>,
    pub category_id: Option<i32>,
    pub description: Option<String>,
    pub isbn: Option<String>,
    pub publication_date: Option<NaiveDate>,
    pub publisher: Option<String>,
    pub language: Option<Language>,
    pub pages: Option<i32>,
    pub price: Option<Decimal>,
    pub status: Option<BookStatus>,
    pub stock_quantity: Option<i32>,
}

// ── Review ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Review {
    pub id: i32,
    pub book_id: i32,
    pub user_id: Uuid,
    pub rating: i16,
    pub comment: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A review with the names its view shows.
#[derive(Debug, Clone)]
pub struct ReviewRecord {
    pub review: Review,
    pub username: String,
    pub book_title: String,
}

#[derive(Debug, Clone)]
pub struct NewReview {
    pub book_id: i32,
    pub user_id: Uuid,
    pub rating: i16,
    pub comment: String,
}

#[derive(Debug, Clone, Default)]
pub struct ReviewChanges {
    pub rating: Option<i16>,
    pub comment: Option<String>,
}

// ── User ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    /// Credential handle from the `CredentialPort`.
    pub credential: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub address: String,
    pub date_of_birth: Option<NaiveDate>,
    pub avatar: Option<String>,
    pub bio: String,
    pub role: UserRole,
    pub is_active: bool,
    pub is_verified: bool,
    pub email_verified: bool,
    pub date_joined: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// "First Last" when both are set, otherwise the username.
    pub fn full_name(&self) -> String {
        if !self.first_name.is_empty() && !self.last_name.is_empty() {
            format!("{} {}", self.first_name, self.last_name)
        } else {
            self.username.clone()
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub credential: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub address: String,
    pub date_of_birth: Option<NaiveDate>,
    pub bio: String,
    pub role: UserRole,
    pub is_verified: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    /// `Some(None)` clears the date.
    pub date_of_birth: Option<Option<NaiveDate>>,
    pub bio: Option<String>,
}

impl ProfileChanges {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.phone_number.is_none()
            && self.address.is_none()
            && self.date_of_birth.is_none()
            && self.bio.is_none()
    }
}

// ── Statistics ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryBookCount {
    pub name: String,
    pub book_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageBookCount {
    pub language: Language,
    pub count: u64,
}

/// Raw figures read from the store in one consistent pass.
#[derive(Debug, Clone, Default)]
pub struct StatisticsSnapshot {
    pub total_books: u64,
    pub available_books: u64,
    pub total_authors: u64,
    pub total_categories: u64,
    pub per_category: Vec<CategoryBookCount>,
    pub per_language: Vec<LanguageBookCount>,
    /// Rating summary of every reviewed book, keyed by book id.
    pub ratings: Vec<(i32, RatingSummary)>,
}

// ── Images ───────────────────────────────────────────────────────────────────

/// Image formats accepted for covers, photos and avatars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Webp,
}

impl ImageFormat {
    /// Detect the format from the file's magic bytes.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        match bytes {
            [0x89, b'P', b'N', b'G', ..] => Some(Self::Png),
            [0xFF, 0xD8, 0xFF, ..] => Some(Self::Jpeg),
            [b'G', b'I', b'F', b'8', ..] => Some(Self::Gif),
            [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => Some(Self::Webp),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Gif => "gif",
            Self::Webp => "webp",
        }
    }
}
