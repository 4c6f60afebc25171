#![allow(async_fn_in_trait)]

use std::collections::HashMap;

use bytes::Bytes;
use uuid::Uuid;

use bookstore_domain::pagination::PageRequest;

use crate::domain::query::{BookQuery, ListParams, ReviewQuery};
use crate::domain::types::{
    Author, AuthorChanges, Book, BookChanges, BookRecord, Category, CategoryChanges, NewAuthor,
    NewBook, NewCategory, NewReview, NewUser, ProfileChanges, Review, ReviewChanges,
    ReviewRecord, StatisticsSnapshot, User,
};
use crate::error::ServiceError;

/// Repository for categories.
pub trait CategoryRepository: Send + Sync {
    async fn list(&self, params: &ListParams) -> Result<Vec<Category>, ServiceError>;
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, ServiceError>;
    async fn find_by_id(&self, id: i32) -> Result<Option<Category>, ServiceError>;
    async fn create(&self, category: &NewCategory) -> Result<Category, ServiceError>;
    /// Apply `changes` and refresh `updated_at`. The slug never changes.
    async fn update(&self, id: i32, changes: &CategoryChanges) -> Result<Category, ServiceError>;
    /// Delete the category and, through the cascade, its books. Returns `true` if a row was deleted.
    async fn delete(&self, id: i32) -> Result<bool, ServiceError>;
    /// Number of books per category id; ids without books are absent.
    async fn books_counts(&self, ids: &[i32]) -> Result<HashMap<i32, u64>, ServiceError>;
}

/// Repository for authors.
pub trait AuthorRepository: Send + Sync {
    async fn list(&self, params: &ListParams) -> Result<Vec<Author>, ServiceError>;
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Author>, ServiceError>;
    async fn find_by_id(&self, id: i32) -> Result<Option<Author>, ServiceError>;
    async fn create(&self, author: &NewAuthor) -> Result<Author, ServiceError>;
    async fn update(&self, id: i32, changes: &AuthorChanges) -> Result<Author, ServiceError>;
    async fn set_photo(&self, id: i32, photo: &str) -> Result<Author, ServiceError>;
    async fn delete(&self, id: i32) -> Result<bool, ServiceError>;
    async fn books_counts(&self, ids: &[i32]) -> Result<HashMap<i32, u64>, ServiceError>;
}

/// Repository for books.
pub trait BookRepository: Send + Sync {
    /// Run a query plan. Unknown sort fields fail with `Validation`.
    async fn query(&self, query: &BookQuery) -> Result<Vec<BookRecord>, ServiceError>;
    /// Count the rows the plan's predicates match, ignoring ordering and window.
    async fn count(&self, query: &BookQuery) -> Result<u64, ServiceError>;
    async fn find_by_slug(&self, slug: &str) -> Result<Option<BookRecord>, ServiceError>;
    async fn find_by_id(&self, id: i32) -> Result<Option<BookRecord>, ServiceError>;
    /// Records for the given ids, in the order of `ids`; missing ids are skipped.
    async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<BookRecord>, ServiceError>;
    async fn create(&self, book: &NewBook) -> Result<Book, ServiceError>;
    async fn update(&self, id: i32, changes: &BookChanges) -> Result<Book, ServiceError>;
    async fn set_cover(&self, id: i32, cover: &str) -> Result<Book, ServiceError>;
    /// Delete the book and its reviews. Returns `true` if a row was deleted.
    async fn delete(&self, id: i32) -> Result<bool, ServiceError>;
}

/// Repository for reviews.
pub trait ReviewRepository: Send + Sync {
    async fn list(&self, query: &ReviewQuery) -> Result<Vec<ReviewRecord>, ServiceError>;
    async fn find_by_id(&self, id: i32) -> Result<Option<ReviewRecord>, ServiceError>;
    async fn find_by_book_and_user(
        &self,
        book_id: i32,
        user_id: Uuid,
    ) -> Result<Option<Review>, ServiceError>;
    /// Insert a review. A concurrent duplicate for the same (book, user) fails with `Duplicate`.
    async fn create(&self, review: &NewReview) -> Result<Review, ServiceError>;
    async fn update(&self, id: i32, changes: &ReviewChanges) -> Result<Review, ServiceError>;
    async fn delete(&self, id: i32) -> Result<bool, ServiceError>;
    async fn count_by_user(&self, user_id: Uuid) -> Result<u64, ServiceError>;
    /// Review counts for many users at once; users without reviews are absent.
    async fn counts_by_users(&self, user_ids: &[Uuid])
    -> Result<HashMap<Uuid, u64>, ServiceError>;
}

/// Repository for user accounts.
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, ServiceError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, ServiceError>;
    /// Newest accounts first.
    async fn list(&self, page: Option<PageRequest>) -> Result<Vec<User>, ServiceError>;
    async fn create(&self, user: &NewUser) -> Result<User, ServiceError>;
    async fn update_profile(&self, id: Uuid, changes: &ProfileChanges)
    -> Result<User, ServiceError>;
    async fn set_credential(&self, id: Uuid, credential: &str) -> Result<(), ServiceError>;
    async fn set_avatar(&self, id: Uuid, avatar: &str) -> Result<User, ServiceError>;
    /// Delete the account and its reviews. Returns `true` if a row was deleted.
    async fn delete(&self, id: Uuid) -> Result<bool, ServiceError>;
}

/// Read-only aggregate figures, taken from one consistent view of the store.
pub trait StatisticsPort: Send + Sync {
    async fn snapshot(&self) -> Result<StatisticsSnapshot, ServiceError>;
}

/// Password hashing collaborator.
pub trait CredentialPort: Send + Sync {
    /// Hash `password` into an opaque credential handle.
    fn hash_and_store(&self, password: &str) -> Result<String, ServiceError>;
    fn verify(&self, credential: &str, password: &str) -> Result<bool, ServiceError>;
}

/// Image storage collaborator.
pub trait BlobStore: Send + Sync {
    /// Persist `bytes` and return a reference for [`BlobStore::url_for`].
    async fn store_blob(&self, bytes: Bytes) -> Result<String, ServiceError>;
    fn url_for(&self, reference: &str) -> String;
}
