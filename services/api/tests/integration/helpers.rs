use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use bytes::Bytes;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use bookstore_api::domain::query::{BookQuery, ListParams, NamedSortField, ReviewQuery};
use bookstore_api::domain::repository::{
    AuthorRepository, BlobStore, BookRepository, CategoryRepository, CredentialPort,
    ReviewRepository, StatisticsPort, UserRepository,
};
use bookstore_api::domain::types::{
    Author, AuthorChanges, Book, BookChanges, BookRecord, Category, CategoryBookCount,
    CategoryChanges, LanguageBookCount, NewAuthor, NewBook, NewCategory, NewReview, NewUser,
    ProfileChanges, RatingSummary, Review, ReviewChanges, ReviewRecord, StatisticsSnapshot, User,
};
use bookstore_api::error::{Entity, ServiceError};
use bookstore_api::usecase::account::{RegisterInput, RegisterUseCase};
use bookstore_api::usecase::author::{CreateAuthorInput, CreateAuthorUseCase};
use bookstore_api::usecase::book::{CreateBookInput, CreateBookUseCase};
use bookstore_api::usecase::category::{CreateCategoryInput, CreateCategoryUseCase};
use bookstore_domain::actor::Actor;
use bookstore_domain::book::{BookStatus, Language};
use bookstore_domain::pagination::{PageRequest, Sort};
use bookstore_domain::user::UserRole;

pub const PASSWORD: &str = "correct-horse-42";

// ── MemoryStore ──────────────────────────────────────────────────────────────

/// In-memory entity store with the same uniqueness and cascade rules as the database.
#[derive(Default)]
pub struct Tables {
    next_id: i32,
    pub categories: Vec<Category>,
    pub authors: Vec<Author>,
    pub books: Vec<Book>,
    pub reviews: Vec<Review>,
    pub users: Vec<User>,
}

impl Tables {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }

    fn rating(&self, book_id: i32) -> RatingSummary {
        self.reviews
            .iter()
            .filter(|r| r.book_id == book_id)
            .fold(RatingSummary::default(), |acc, r| RatingSummary {
                count: acc.count + 1,
                sum: acc.sum + i64::from(r.rating),
            })
    }

    fn book_record(&self, book: &Book) -> Option<BookRecord> {
        Some(BookRecord {
            book: book.clone(),
            author: self.authors.iter().find(|a| a.id == book.author_id)?.clone(),
            category: self
                .categories
                .iter()
                .find(|c| c.id == book.category_id)?
                .clone(),
            rating: self.rating(book.id),
        })
    }

    fn book_records(&self) -> Vec<BookRecord> {
        self.books
            .iter()
            .filter_map(|b| self.book_record(b))
            .collect()
    }

    fn review_record(&self, review: &Review) -> Option<ReviewRecord> {
        Some(ReviewRecord {
            review: review.clone(),
            username: self
                .users
                .iter()
                .find(|u| u.id == review.user_id)?
                .username
                .clone(),
            book_title: self
                .books
                .iter()
                .find(|b| b.id == review.book_id)?
                .title
                .clone(),
        })
    }

    fn drop_books_where(&mut self, doomed: impl Fn(&Book) -> bool) {
        let ids: Vec<i32> = self
            .books
            .iter()
            .filter(|b| doomed(b))
            .map(|b| b.id)
            .collect();
        self.books.retain(|b| !ids.contains(&b.id));
        self.reviews.retain(|r| !ids.contains(&r.book_id));
    }

    fn books_counts(&self, ids: &[i32], key: impl Fn(&Book) -> i32) -> HashMap<i32, u64> {
        let mut counts = HashMap::new();
        for book in &self.books {
            let id = key(book);
            if ids.contains(&id) {
                *counts.entry(id).or_insert(0) += 1;
            }
        }
        counts
    }
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap()
    }

    pub fn categories(&self) -> MemCategories {
        MemCategories(self.clone())
    }

    pub fn authors(&self) -> MemAuthors {
        MemAuthors(self.clone())
    }

    pub fn books(&self) -> MemBooks {
        MemBooks(self.clone())
    }

    pub fn reviews(&self) -> MemReviews {
        MemReviews(self.clone())
    }

    pub fn users(&self) -> MemUsers {
        MemUsers(self.clone())
    }

    pub fn statistics(&self) -> MemStatistics {
        MemStatistics(self.clone())
    }
}

fn window<T>(rows: Vec<T>, page: Option<PageRequest>) -> Vec<T> {
    match page {
        Some(page) => rows
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect(),
        None => rows,
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn named_order(
    ordering: (NamedSortField, Sort),
    a: (&str, chrono::DateTime<Utc>, i32),
    b: (&str, chrono::DateTime<Utc>, i32),
) -> Ordering {
    let o = match ordering.0 {
        NamedSortField::Name => a.0.cmp(b.0),
        NamedSortField::CreatedAt => a.1.cmp(&b.1),
    };
    let o = match ordering.1 {
        Sort::Asc => o,
        Sort::Desc => o.reverse(),
    };
    o.then(a.2.cmp(&b.2))
}

// ── Categories ───────────────────────────────────────────────────────────────

pub struct MemCategories(MemoryStore);

impl CategoryRepository for MemCategories {
    async fn list(&self, params: &ListParams) -> Result<Vec<Category>, ServiceError> {
        let tables = self.0.tables();
        let mut rows: Vec<Category> = tables
            .categories
            .iter()
            .filter(|c| {
                params.search_term().is_none_or(|term| {
                    contains_ci(&c.name, term) || contains_ci(&c.description, term)
                })
            })
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            named_order(
                params.ordering,
                (&a.name, a.created_at, a.id),
                (&b.name, b.created_at, b.id),
            )
        });
        Ok(window(rows, params.page))
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, ServiceError> {
        Ok(self
            .0
            .tables()
            .categories
            .iter()
            .find(|c| c.slug == slug)
            .cloned())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Category>, ServiceError> {
        Ok(self
            .0
            .tables()
            .categories
            .iter()
            .find(|c| c.id == id)
            .cloned())
    }

    async fn create(&self, category: &NewCategory) -> Result<Category, ServiceError> {
        let mut tables = self.0.tables();
        if tables.categories.iter().any(|c| c.name == category.name) {
            return Err(ServiceError::Duplicate("a category with this name already exists"));
        }
        if tables.categories.iter().any(|c| c.slug == category.slug) {
            return Err(ServiceError::Duplicate("a category with this slug already exists"));
        }
        let now = Utc::now();
        let row = Category {
            id: tables.next_id(),
            name: category.name.clone(),
            description: category.description.clone(),
            slug: category.slug.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.categories.push(row.clone());
        Ok(row)
    }

    async fn update(&self, id: i32, changes: &CategoryChanges) -> Result<Category, ServiceError> {
        let mut tables = self.0.tables();
        if let Some(name) = &changes.name {
            if tables.categories.iter().any(|c| c.id != id && &c.name == name) {
                return Err(ServiceError::Duplicate("a category with this name already exists"));
            }
        }
        let row = tables
            .categories
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(ServiceError::NotFound(Entity::Category))?;
        if let Some(name) = &changes.name {
            row.name = name.clone();
        }
        if let Some(description) = &changes.description {
            row.description = description.clone();
        }
        row.updated_at = Utc::now();
        Ok(row.clone())
    }

    async fn delete(&self, id: i32) -> Result<bool, ServiceError> {
        let mut tables = self.0.tables();
        let before = tables.categories.len();
        tables.categories.retain(|c| c.id != id);
        let deleted = tables.categories.len() < before;
        tables.drop_books_where(|b| b.category_id == id);
        Ok(deleted)
    }

    async fn books_counts(&self, ids: &[i32]) -> Result<HashMap<i32, u64>, ServiceError> {
        Ok(self.0.tables().books_counts(ids, |b| b.category_id))
    }
}

// ── Authors ──────────────────────────────────────────────────────────────────

pub struct MemAuthors(MemoryStore);

impl AuthorRepository for MemAuthors {
    async fn list(&self, params: &ListParams) -> Result<Vec<Author>, ServiceError> {
        let tables = self.0.tables();
        let mut rows: Vec<Author> = tables
            .authors
            .iter()
            .filter(|a| {
                params.search_term().is_none_or(|term| {
                    contains_ci(&a.name, term)
                        || contains_ci(&a.bio, term)
                        || contains_ci(&a.email, term)
                })
            })
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            named_order(
                params.ordering,
                (&a.name, a.created_at, a.id),
                (&b.name, b.created_at, b.id),
            )
        });
        Ok(window(rows, params.page))
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Author>, ServiceError> {
        Ok(self
            .0
            .tables()
            .authors
            .iter()
            .find(|a| a.slug == slug)
            .cloned())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Author>, ServiceError> {
        Ok(self
            .0
            .tables()
            .authors
            .iter()
            .find(|a| a.id == id)
            .cloned())
    }

    async fn create(&self, author: &NewAuthor) -> Result<Author, ServiceError> {
        let mut tables = self.0.tables();
        if tables.authors.iter().any(|a| a.slug == author.slug) {
            return Err(ServiceError::Duplicate("an author with this slug already exists"));
        }
        let now = Utc::now();
        let row = Author {
            id: tables.next_id(),
            name: author.name.clone(),
            bio: author.bio.clone(),
            email: author.email.clone(),
            website: author.website.clone(),
            photo: None,
            slug: author.slug.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.authors.push(row.clone());
        Ok(row)
    }

    async fn update(&self, id: i32, changes: &AuthorChanges) -> Result<Author, ServiceError> {
        let mut tables = self.0.tables();
        let row = tables
            .authors
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(ServiceError::NotFound(Entity::Author))?;
        if let Some(name) = &changes.name {
            row.name = name.clone();
        }
        if let Some(bio) = &changes.bio {
            row.bio = bio.clone();
        }
        if let Some(email) = &changes.email {
            row.email = email.clone();
        }
        if let Some(website) = &changes.website {
            row.website = website.clone();
        }
        row.updated_at = Utc::now();
        Ok(row.clone())
    }

    async fn set_photo(&self, id: i32, photo: &str) -> Result<Author, ServiceError> {
        let mut tables = self.0.tables();
        let row = tables
            .authors
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(ServiceError::NotFound(Entity::Author))?;
        row.photo = Some(photo.to_owned());
        row.updated_at = Utc::now();
        Ok(row.clone())
    }

    async fn delete(&self, id: i32) -> Result<bool, ServiceError> {
        let mut tables = self.0.tables();
        let before = tables.authors.len();
        tables.authors.retain(|a| a.id != id);
        let deleted = tables.authors.len() < before;
        tables.drop_books_where(|b| b.author_id == id);
        Ok(deleted)
    }

    async fn books_counts(&self, ids: &[i32]) -> Result<HashMap<i32, u64>, ServiceError> {
        Ok(self.0.tables().books_counts(ids, |b| b.author_id))
    }
}

// ── Books ────────────────────────────────────────────────────────────────────

pub struct MemBooks(MemoryStore);

impl MemBooks {
    fn check_unique(
        tables: &Tables,
        id: Option<i32>,
        isbn: Option<&str>,
        slug: Option<&str>,
    ) -> Result<(), ServiceError> {
        let others = || tables.books.iter().filter(move |b| Some(b.id) != id);
        if let Some(isbn) = isbn {
            if others().any(|b| b.isbn == isbn) {
                return Err(ServiceError::Duplicate("a book with this isbn already exists"));
            }
        }
        if let Some(slug) = slug {
            if others().any(|b| b.slug == slug) {
                return Err(ServiceError::Duplicate("a book with this slug already exists"));
            }
        }
        Ok(())
    }

    fn check_references(
        tables: &Tables,
        author_id: Option<i32>,
        category_id: Option<i32>,
    ) -> Result<(), ServiceError> {
        let author_missing = author_id.is_some_and(|id| !tables.authors.iter().any(|a| a.id == id));
        let category_missing =
            category_id.is_some_and(|id| !tables.categories.iter().any(|c| c.id == id));
        if author_missing || category_missing {
            return Err(ServiceError::validation("a referenced record does not exist"));
        }
        Ok(())
    }
}

impl BookRepository for MemBooks {
    async fn query(&self, query: &BookQuery) -> Result<Vec<BookRecord>, ServiceError> {
        let records = self.0.tables().book_records();
        query.evaluate(records)
    }

    async fn count(&self, query: &BookQuery) -> Result<u64, ServiceError> {
        Ok(self
            .0
            .tables()
            .book_records()
            .iter()
            .filter(|r| query.matches(r))
            .count() as u64)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<BookRecord>, ServiceError> {
        let tables = self.0.tables();
        Ok(tables
            .books
            .iter()
            .find(|b| b.slug == slug)
            .and_then(|b| tables.book_record(b)))
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<BookRecord>, ServiceError> {
        let tables = self.0.tables();
        Ok(tables
            .books
            .iter()
            .find(|b| b.id == id)
            .and_then(|b| tables.book_record(b)))
    }

    async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<BookRecord>, ServiceError> {
        let tables = self.0.tables();
        Ok(ids
            .iter()
            .filter_map(|id| tables.books.iter().find(|b| b.id == *id))
            .filter_map(|b| tables.book_record(b))
            .collect())
    }

    async fn create(&self, book: &NewBook) -> Result<Book, ServiceError> {
        let mut tables = self.0.tables();
        Self::check_unique(&tables, None, Some(&book.isbn), Some(&book.slug))?;
        Self::check_references(&tables, Some(book.author_id), Some(book.category_id))?;
        let now = Utc::now();
        let row = Book {
            id: tables.next_id(),
            title: book.title.clone(),
            slug: book.slug.clone(),
            author_id: book.author_id,
            category_id: book.category_id,
            description: book.description.clone(),
            isbn: book.isbn.clone(),
            publication_date: book.publication_date,
            publisher: book.publisher.clone(),
            language: book.language,
            pages: book.pages,
            price: book.price,
            cover_image: None,
            status: book.status,
            stock_quantity: book.stock_quantity,
            created_at: now,
            updated_at: now,
        };
        tables.books.push(row.clone());
        Ok(row)
    }

    async fn update(&self, id: i32, changes: &BookChanges) -> Result<Book, ServiceError> {
        let mut tables = self.0.tables();
        Self::check_unique(&tables, Some(id), changes.isbn.as_deref(), None)?;
        Self::check_references(&tables, changes.author_id, changes.category_id)?;
        let row = tables
            .books
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or(ServiceError::NotFound(Entity::Book))?;
        if let Some(v) = &changes.title {
            row.title = v.clone();
        }
        if let Some(v) = changes.author_id {
            row.author_id = v;
        }
        if let Some(v) = changes.category_id {
            row.category_id = v;
        }
        if let Some(v) = &changes.description {
            row.description = v.clone();
        }
        if let Some(v) = &changes.isbn {
            row.isbn = v.clone();
        }
        if let Some(v) = changes.publication_date {
            row.publication_date = v;
        }
        if let Some(v) = &changes.publisher {
            row.publisher = v.clone();
        }
        if let Some(v) = changes.language {
            row.language = v;
        }
        if let Some(v) = changes.pages {
            row.pages = v;
        }
        if let Some(v) = changes.price {
            row.price = v;
        }
        if let Some(v) = changes.status {
            row.status = v;
        }
        if let Some(v) = changes.stock_quantity {
            row.stock_quantity = v;
        }
        row.updated_at = Utc::now();
        Ok(row.clone())
    }

    async fn set_cover(&self, id: i32, cover: &str) -> Result<Book, ServiceError> {
        let mut tables = self.0.tables();
        let row = tables
            .books
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or(ServiceError::NotFound(Entity::Book))?;
        row.cover_image = Some(cover.to_owned());
        row.updated_at = Utc::now();
        Ok(row.clone())
    }

    async fn delete(&self, id: i32) -> Result<bool, ServiceError> {
        let mut tables = self.0.tables();
        let before = tables.books.len();
        tables.drop_books_where(|b| b.id == id);
        Ok(tables.books.len() < before)
    }
}

// ── Reviews ──────────────────────────────────────────────────────────────────

pub struct MemReviews(MemoryStore);

impl ReviewRepository for MemReviews {
    async fn list(&self, query: &ReviewQuery) -> Result<Vec<ReviewRecord>, ServiceError> {
        let tables = self.0.tables();
        let mut rows: Vec<&Review> = tables.reviews.iter().filter(|r| query.matches(r)).collect();
        rows.sort_by(|a, b| query.compare(a, b));
        let records = rows
            .into_iter()
            .filter_map(|r| tables.review_record(r))
            .collect();
        Ok(window(records, query.page))
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<ReviewRecord>, ServiceError> {
        let tables = self.0.tables();
        Ok(tables
            .reviews
            .iter()
            .find(|r| r.id == id)
            .and_then(|r| tables.review_record(r)))
    }

    async fn find_by_book_and_user(
        &self,
        book_id: i32,
        user_id: Uuid,
    ) -> Result<Option<Review>, ServiceError> {
        Ok(self
            .0
            .tables()
            .reviews
            .iter()
            .find(|r| r.book_id == book_id && r.user_id == user_id)
            .cloned())
    }

    async fn create(&self, review: &NewReview) -> Result<Review, ServiceError> {
        let mut tables = self.0.tables();
        if tables
            .reviews
            .iter()
            .any(|r| r.book_id == review.book_id && r.user_id == review.user_id)
        {
            return Err(ServiceError::Duplicate("you have already reviewed this book"));
        }
        if !tables.books.iter().any(|b| b.id == review.book_id)
            || !tables.users.iter().any(|u| u.id == review.user_id)
        {
            return Err(ServiceError::validation("a referenced record does not exist"));
        }
        let now = Utc::now();
        let row = Review {
            id: tables.next_id(),
            book_id: review.book_id,
            user_id: review.user_id,
            rating: review.rating,
            comment: review.comment.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.reviews.push(row.clone());
        Ok(row)
    }

    async fn update(&self, id: i32, changes: &ReviewChanges) -> Result<Review, ServiceError> {
        let mut tables = self.0.tables();
        let row = tables
            .reviews
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(ServiceError::NotFound(Entity::Review))?;
        if let Some(rating) = changes.rating {
            row.rating = rating;
        }
        if let Some(comment) = &changes.comment {
            row.comment = comment.clone();
        }
        row.updated_at = Utc::now();
        Ok(row.clone())
    }

    async fn delete(&self, id: i32) -> Result<bool, ServiceError> {
        let mut tables = self.0.tables();
        let before = tables.reviews.len();
        tables.reviews.retain(|r| r.id != id);
        Ok(tables.reviews.len() < before)
    }

    async fn count_by_user(&self, user_id: Uuid) -> Result<u64, ServiceError> {
        Ok(self
            .0
            .tables()
            .reviews
            .iter()
            .filter(|r| r.user_id == user_id)
            .count() as u64)
    }

    async fn counts_by_users(
        &self,
        user_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, u64>, ServiceError> {
        let mut counts = HashMap::new();
        for review in self.0.tables().reviews.iter() {
            if user_ids.contains(&review.user_id) {
                *counts.entry(review.user_id).or_insert(0) += 1;
            }
        }
        Ok(counts)
    }
}

// ── Users ────────────────────────────────────────────────────────────────────

pub struct MemUsers(MemoryStore);

impl MemUsers {
    fn modify(&self, id: Uuid, apply: impl FnOnce(&mut User)) -> Result<User, ServiceError> {
        let mut tables = self.0.tables();
        let row = tables
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(ServiceError::NotFound(Entity::User))?;
        apply(row);
        row.updated_at = Utc::now();
        Ok(row.clone())
    }
}

impl UserRepository for MemUsers {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, ServiceError> {
        Ok(self.0.tables().users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, ServiceError> {
        Ok(self
            .0
            .tables()
            .users
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn list(&self, page: Option<PageRequest>) -> Result<Vec<User>, ServiceError> {
        let mut rows = self.0.tables().users.clone();
        rows.sort_by(|a, b| b.date_joined.cmp(&a.date_joined).then(a.id.cmp(&b.id)));
        Ok(window(rows, page))
    }

    async fn create(&self, user: &NewUser) -> Result<User, ServiceError> {
        let mut tables = self.0.tables();
        if tables.users.iter().any(|u| u.username == user.username) {
            return Err(ServiceError::Duplicate("a user with that username already exists"));
        }
        let now = Utc::now();
        let row = User {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            credential: user.credential.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            phone_number: user.phone_number.clone(),
            address: user.address.clone(),
            date_of_birth: user.date_of_birth,
            avatar: None,
            bio: user.bio.clone(),
            role: user.role,
            is_active: true,
            is_verified: user.is_verified,
            email_verified: false,
            date_joined: now,
            updated_at: now,
        };
        tables.users.push(row.clone());
        Ok(row)
    }

    async fn update_profile(
        &self,
        id: Uuid,
        changes: &ProfileChanges,
    ) -> Result<User, ServiceError> {
        self.modify(id, |u| {
            if let Some(v) = &changes.first_name {
                u.first_name = v.clone();
            }
            if let Some(v) = &changes.last_name {
                u.last_name = v.clone();
            }
            if let Some(v) = &changes.phone_number {
                u.phone_number = v.clone();
            }
            if let Some(v) = &changes.address {
                u.address = v.clone();
            }
            if let Some(v) = changes.date_of_birth {
                u.date_of_birth = v;
            }
            if let Some(v) = &changes.bio {
                u.bio = v.clone();
            }
        })
    }

    async fn set_credential(&self, id: Uuid, credential: &str) -> Result<(), ServiceError> {
        self.modify(id, |u| u.credential = credential.to_owned())
            .map(|_| ())
    }

    async fn set_avatar(&self, id: Uuid, avatar: &str) -> Result<User, ServiceError> {
        self.modify(id, |u| u.avatar = Some(avatar.to_owned()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ServiceError> {
        let mut tables = self.0.tables();
        let before = tables.users.len();
        tables.users.retain(|u| u.id != id);
        tables.reviews.retain(|r| r.user_id != id);
        Ok(tables.users.len() < before)
    }
}

// ── Statistics ───────────────────────────────────────────────────────────────

pub struct MemStatistics(MemoryStore);

impl StatisticsPort for MemStatistics {
    async fn snapshot(&self) -> Result<StatisticsSnapshot, ServiceError> {
        let tables = self.0.tables();
        let per_category = tables
            .categories
            .iter()
            .map(|c| CategoryBookCount {
                name: c.name.clone(),
                book_count: tables.books.iter().filter(|b| b.category_id == c.id).count() as u64,
            })
            .collect();
        let mut languages: HashMap<Language, u64> = HashMap::new();
        for book in &tables.books {
            *languages.entry(book.language).or_insert(0) += 1;
        }
        let ratings = tables
            .books
            .iter()
            .map(|b| (b.id, tables.rating(b.id)))
            .filter(|(_, summary)| summary.has_reviews())
            .collect();
        Ok(StatisticsSnapshot {
            total_books: tables.books.len() as u64,
            available_books: tables.books.iter().filter(|b| b.is_available()).count() as u64,
            total_authors: tables.authors.len() as u64,
            total_categories: tables.categories.len() as u64,
            per_category,
            per_language: languages
                .into_iter()
                .map(|(language, count)| LanguageBookCount { language, count })
                .collect(),
            ratings,
        })
    }
}

// ── Collaborators ────────────────────────────────────────────────────────────

/// Stores passwords in the clear with a marker prefix; hashing is covered by the unit tests.
#[derive(Clone, Default)]
pub struct PlainCredentials;

impl CredentialPort for PlainCredentials {
    fn hash_and_store(&self, password: &str) -> Result<String, ServiceError> {
        Ok(format!("plain${password}"))
    }

    fn verify(&self, credential: &str, password: &str) -> Result<bool, ServiceError> {
        Ok(credential.strip_prefix("plain$") == Some(password))
    }
}

/// Remembers stored blobs in memory.
#[derive(Clone, Default)]
pub struct MemoryBlobs {
    pub stored: Arc<Mutex<Vec<String>>>,
}

impl BlobStore for MemoryBlobs {
    async fn store_blob(&self, _bytes: Bytes) -> Result<String, ServiceError> {
        let mut stored = self.stored.lock().unwrap();
        let reference = format!("blob-{}.png", stored.len() + 1);
        stored.push(reference.clone());
        Ok(reference)
    }

    fn url_for(&self, reference: &str) -> String {
        format!("/media/{reference}")
    }
}

pub const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];

// ── Fixtures ─────────────────────────────────────────────────────────────────

pub fn staff() -> Actor {
    Actor::user(Uuid::now_v7(), UserRole::Staff)
}

pub fn actor_for(user: &User) -> Actor {
    Actor::user(user.id, user.role)
}

pub async fn register(store: &MemoryStore, username: &str) -> User {
    RegisterUseCase {
        users: store.users(),
        credentials: PlainCredentials,
    }
    .execute(RegisterInput {
        username: username.into(),
        email: format!("{username}@example.com"),
        password: PASSWORD.into(),
        password_confirm: PASSWORD.into(),
        ..RegisterInput::default()
    })
    .await
    .unwrap()
}

pub async fn category(store: &MemoryStore, name: &str) -> Category {
    CreateCategoryUseCase {
        repo: store.categories(),
    }
    .execute(
        &staff(),
        CreateCategoryInput {
            name: name.into(),
            description: String::new(),
            slug: None,
        },
    )
    .await
    .unwrap()
    .category
}

pub async fn author(store: &MemoryStore, name: &str) -> Author {
    CreateAuthorUseCase {
        repo: store.authors(),
    }
    .execute(
        &staff(),
        CreateAuthorInput {
            name: name.into(),
            bio: String::new(),
            email: String::new(),
            website: String::new(),
            slug: None,
        },
    )
    .await
    .unwrap()
    .author
}

/// Field values for a valid book; tests override what they care about.
pub fn book_input(title: &str, isbn: &str, author: &Author, category: &Category) -> CreateBookInput {
    CreateBookInput {
        title: title.into(),
        slug: None,
        author_id: author.id,
        category_id: category.id,
        description: String::new(),
        isbn: isbn.into(),
        publication_date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
        publisher: "NXB Trẻ".into(),
        language: None,
        pages: Some(200),
        price: Decimal::new(100_000, 0),
        status: None,
        stock_quantity: None,
    }
}

pub async fn create_book(store: &MemoryStore, input: CreateBookInput) -> BookRecord {
    CreateBookUseCase {
        books: store.books(),
        authors: store.authors(),
        categories: store.categories(),
    }
    .execute(&staff(), input)
    .await
    .unwrap()
}

/// Shortcut for books whose only interesting fields are price, language and status.
pub async fn shelve(
    store: &MemoryStore,
    title: &str,
    isbn: &str,
    price: i64,
    language: Language,
    status: BookStatus,
    stock: i32,
) -> BookRecord {
    let (author, category) = {
        let tables = store.tables();
        (tables.authors.first().cloned(), tables.categories.first().cloned())
    };
    let author = match author {
        Some(a) => a,
        None => self::author(store, "Nguyễn Nhật Ánh").await,
    };
    let category = match category {
        Some(c) => c,
        None => self::category(store, "Văn học").await,
    };
    create_book(
        store,
        CreateBookInput {
            price: Decimal::new(price, 0),
            language: Some(language),
            status: Some(status),
            stock_quantity: Some(stock),
            ..book_input(title, isbn, &author, &category)
        },
    )
    .await
}
