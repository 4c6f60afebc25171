use bytes::Bytes;
use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;

use bookstore_domain::actor::Actor;
use bookstore_domain::book::{BookStatus, Language};
use bookstore_domain::pagination::PageRequest;
use bookstore_domain::policy::{Action, Resource, Target};

use crate::domain::query::{BookPredicate, BookQuery, SortKey, validate_public_ordering};
use crate::domain::repository::{AuthorRepository, BlobStore, BookRepository, CategoryRepository};
use crate::domain::types::{BookChanges, BookRecord, ImageFormat, NewBook};
use crate::domain::validation;
use crate::error::{Entity, ServiceError};
use crate::usecase::author::find_author;
use crate::usecase::category::find_category;
use crate::usecase::{authorize, resolve_slug};

pub const BEST_SELLERS_LIMIT: u64 = 10;
pub const NEW_RELEASES_LIMIT: u64 = 10;
pub const NEW_RELEASE_WINDOW_DAYS: u64 = 30;

/// A page of books; `total` is set when the caller asked for a page.
#[derive(Debug)]
pub struct BookPage {
    pub books: Vec<BookRecord>,
    pub total: Option<u64>,
}

async fn run_query<R: BookRepository>(repo: &R, query: BookQuery) -> Result<BookPage, ServiceError> {
    let books = repo.query(&query).await?;
    let total = match query.page() {
        Some(_) => Some(repo.count(&query.unpaged()).await?),
        None => None,
    };
    Ok(BookPage { books, total })
}

pub(crate) async fn find_book<R: BookRepository>(
    repo: &R,
    slug: &str,
) -> Result<BookRecord, ServiceError> {
    repo.find_by_slug(slug)
        .await?
        .ok_or(ServiceError::NotFound(Entity::Book))
}

async fn load_record<R: BookRepository>(repo: &R, id: i32) -> Result<BookRecord, ServiceError> {
    repo.find_by_id(id)
        .await?
        .ok_or(ServiceError::NotFound(Entity::Book))
}

// ── ListBooks ────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct BookFilters {
    pub category: Option<i32>,
    pub author: Option<i32>,
    pub language: Option<Language>,
    pub status: Option<BookStatus>,
    pub publisher: Option<String>,
    pub search: Option<String>,
    pub ordering: Vec<SortKey>,
    pub page: Option<PageRequest>,
}

impl BookFilters {
    fn into_query(self) -> Result<BookQuery, ServiceError> {
        validate_public_ordering(&self.ordering)?;
        let query = BookQuery::new()
            .with_opt(self.category.map(BookPredicate::Category))
            .with_opt(self.author.map(BookPredicate::Author))
            .with_opt(self.language.map(BookPredicate::Language))
            .with_opt(self.status.map(BookPredicate::Status))
            .with_opt(
                self.publisher
                    .filter(|p| !p.trim().is_empty())
                    .map(BookPredicate::Publisher),
            )
            .with_text(self.search.as_deref().unwrap_or_default())
            .with_ordering(self.ordering);
        Ok(match self.page {
            Some(page) => query.with_page(page),
            None => query,
        })
    }
}

pub struct ListBooksUseCase<R: BookRepository> {
    pub repo: R,
}

impl<R: BookRepository> ListBooksUseCase<R> {
    pub async fn execute(&self, filters: BookFilters) -> Result<BookPage, ServiceError> {
        run_query(&self.repo, filters.into_query()?).await
    }
}

// ── CategoryBooks / AuthorBooks ──────────────────────────────────────────────

pub struct CategoryBooksUseCase<C: CategoryRepository, R: BookRepository> {
    pub categories: C,
    pub books: R,
}

impl<C: CategoryRepository, R: BookRepository> CategoryBooksUseCase<C, R> {
    pub async fn execute(
        &self,
        slug: &str,
        page: Option<PageRequest>,
    ) -> Result<BookPage, ServiceError> {
        let category = find_category(&self.categories, slug).await?;
        let filters = BookFilters {
            category: Some(category.id),
            page,
            ..BookFilters::default()
        };
        run_query(&self.books, filters.into_query()?).await
    }
}

pub struct AuthorBooksUseCase<A: AuthorRepository, R: BookRepository> {
    pub authors: A,
    pub books: R,
}

impl<A: AuthorRepository, R: BookRepository> AuthorBooksUseCase<A, R> {
    pub async fn execute(
        &self,
        slug: &str,
        page: Option<PageRequest>,
    ) -> Result<BookPage, ServiceError> {
        let author = find_author(&self.authors, slug).await?;
        let filters = BookFilters {
            author: Some(author.id),
            page,
            ..BookFilters::default()
        };
        run_query(&self.books, filters.into_query()?).await
    }
}

// ── GetBook ──────────────────────────────────────────────────────────────────

pub struct GetBookUseCase<R: BookRepository> {
    pub repo: R,
}

impl<R: BookRepository> GetBookUseCase<R> {
    pub async fn execute(&self, slug: &str) -> Result<BookRecord, ServiceError> {
        find_book(&self.repo, slug).await
    }
}

// ── CreateBook ───────────────────────────────────────────────────────────────

pub struct CreateBookInput {
    pub title: String,
    pub slug: Option<String>,
    pub author_id: i32,
    pub category_id: i32,
    pub description: String,
    pub isbn: String,
    pub publication_date: NaiveDate,
    pub publisher: String,
    pub language: Option<Language>,
    pub pages: Option<i32>,
    pub price: Decimal,
    pub status: Option<BookStatus>,
    pub stock_quantity: Option<i32>,
}

pub struct CreateBookUseCase<R: BookRepository, A: AuthorRepository, C: CategoryRepository> {
    pub books: R,
    pub authors: A,
    pub categories: C,
}

async fn check_references<A: AuthorRepository, C: CategoryRepository>(
    authors: &A,
    categories: &C,
    author_id: Option<i32>,
    category_id: Option<i32>,
) -> Result<(), ServiceError> {
    if let Some(id) = author_id {
        if authors.find_by_id(id).await?.is_none() {
            return Err(ServiceError::validation(format!("author {id} does not exist")));
        }
    }
    if let Some(id) = category_id {
        if categories.find_by_id(id).await?.is_none() {
            return Err(ServiceError::validation(format!("category {id} does not exist")));
        }
    }
    Ok(())
}

impl<R: BookRepository, A: AuthorRepository, C: CategoryRepository> CreateBookUseCase<R, A, C> {
    pub async fn execute(
        &self,
        actor: &Actor,
        input: CreateBookInput,
    ) -> Result<BookRecord, ServiceError> {
        authorize(actor, Resource::Book, Action::Create, Target::Unowned)?;

        let title = input.title.trim().to_owned();
        let pages = input.pages.unwrap_or(0);
        let stock_quantity = input.stock_quantity.unwrap_or(1);
        validation::book_title(&title)?;
        validation::isbn(&input.isbn)?;
        validation::publisher(&input.publisher)?;
        validation::price(input.price)?;
        validation::pages(pages)?;
        validation::stock_quantity(stock_quantity)?;
        let slug = resolve_slug(input.slug.as_deref(), &title, validation::BOOK_SLUG_MAX)?;

        check_references(
            &self.authors,
            &self.categories,
            Some(input.author_id),
            Some(input.category_id),
        )
        .await?;

        let book = self
            .books
            .create(&NewBook {
                title,
                slug,
                author_id: input.author_id,
                category_id: input.category_id,
                description: input.description,
                isbn: input.isbn,
                publication_date: input.publication_date,
                publisher: input.publisher.trim().to_owned(),
                language: input.language.unwrap_or_default(),
                pages,
                price: input.price,
                status: input.status.unwrap_or_default(),
                stock_quantity,
            })
            .await?;
        tracing::info!(book_id = book.id, slug = %book.slug, isbn = %book.isbn, "book created");
        load_record(&self.books, book.id).await
    }
}

// ── UpdateBook ───────────────────────────────────────────────────────────────

pub struct UpdateBookUseCase<R: BookRepository, A: AuthorRepository, C: CategoryRepository> {
    pub books: R,
    pub authors: A,
    pub categories: C,
}

fn validate_changes(changes: &mut BookChanges) -> Result<(), ServiceError> {
    if let Some(title) = changes.title.as_mut() {
        *title = title.trim().to_owned();
        validation::book_title(title)?;
    }
    if let Some(isbn) = &changes.isbn {
        validation::isbn(isbn)?;
    }
    if let Some(publisher) = changes.publisher.as_mut() {
        *publisher = publisher.trim().to_owned();
        validation::publisher(publisher)?;
    }
    if let Some(price) = changes.price {
        validation::price(price)?;
    }
    if let Some(pages) = changes.pages {
        validation::pages(pages)?;
    }
    if let Some(stock) = changes.stock_quantity {
        validation::stock_quantity(stock)?;
    }
    Ok(())
}

impl<R: BookRepository, A: AuthorRepository, C: CategoryRepository> UpdateBookUseCase<R, A, C> {
    pub async fn execute(
        &self,
        actor: &Actor,
        slug: &str,
        mut changes: BookChanges,
    ) -> Result<BookRecord, ServiceError> {
        authorize(actor, Resource::Book, Action::Update, Target::Unowned)?;
        validate_changes(&mut changes)?;

        let record = find_book(&self.books, slug).await?;
        check_references(
            &self.authors,
            &self.categories,
            changes.author_id,
            changes.category_id,
        )
        .await?;
        let book = self.books.update(record.book.id, &changes).await?;
        tracing::info!(book_id = book.id, "book updated");
        load_record(&self.books, book.id).await
    }
}

// ── DeleteBook ───────────────────────────────────────────────────────────────

pub struct DeleteBookUseCase<R: BookRepository> {
    pub repo: R,
}

impl<R: BookRepository> DeleteBookUseCase<R> {
    pub async fn execute(&self, actor: &Actor, slug: &str) -> Result<(), ServiceError> {
        authorize(actor, Resource::Book, Action::Delete, Target::Unowned)?;
        let record = find_book(&self.repo, slug).await?;
        if !self.repo.delete(record.book.id).await? {
            return Err(ServiceError::NotFound(Entity::Book));
        }
        tracing::info!(book_id = record.book.id, "book deleted");
        Ok(())
    }
}

// ── SetBookCover ─────────────────────────────────────────────────────────────

pub struct SetBookCoverUseCase<R: BookRepository, B: BlobStore> {
    pub repo: R,
    pub blobs: B,
}

impl<R: BookRepository, B: BlobStore> SetBookCoverUseCase<R, B> {
    pub async fn execute(
        &self,
        actor: &Actor,
        slug: &str,
        image: Bytes,
    ) -> Result<BookRecord, ServiceError> {
        authorize(actor, Resource::Book, Action::Update, Target::Unowned)?;
        if ImageFormat::sniff(&image).is_none() {
            return Err(ServiceError::validation(
                "upload a valid image (png, jpeg, gif or webp)",
            ));
        }
        let record = find_book(&self.repo, slug).await?;
        let reference = self.blobs.store_blob(image).await?;
        self.repo.set_cover(record.book.id, &reference).await?;
        tracing::info!(book_id = record.book.id, cover = %reference, "book cover stored");
        load_record(&self.repo, record.book.id).await
    }
}

// ── AvailableBooks ───────────────────────────────────────────────────────────

pub struct AvailableBooksUseCase<R: BookRepository> {
    pub repo: R,
}

impl<R: BookRepository> AvailableBooksUseCase<R> {
    /// Books on the shelf with stock left.
    pub async fn execute(&self, page: Option<PageRequest>) -> Result<BookPage, ServiceError> {
        let query = BookQuery::new()
            .with(BookPredicate::Status(BookStatus::Available))
            .with(BookPredicate::InStock);
        let query = match page {
            Some(page) => query.with_page(page),
            None => query,
        };
        run_query(&self.repo, query).await
    }
}

// ── BestSellers ──────────────────────────────────────────────────────────────

pub struct BestSellersUseCase<R: BookRepository> {
    pub repo: R,
}

impl<R: BookRepository> BestSellersUseCase<R> {
    /// Available books with the least stock left, at most ten.
    pub async fn execute(&self) -> Result<Vec<BookRecord>, ServiceError> {
        let query = BookQuery::new()
            .with(BookPredicate::Status(BookStatus::Available))
            .with_ordering(vec![SortKey::asc("stock_quantity")])
            .with_limit(BEST_SELLERS_LIMIT);
        self.repo.query(&query).await
    }
}

// ── NewReleases ──────────────────────────────────────────────────────────────

pub struct NewReleasesUseCase<R: BookRepository> {
    pub repo: R,
}

impl<R: BookRepository> NewReleasesUseCase<R> {
    /// Books published in the 30 days up to `today`, newest first, at most ten.
    pub async fn execute(&self, today: NaiveDate) -> Result<Vec<BookRecord>, ServiceError> {
        let since = today
            .checked_sub_days(Days::new(NEW_RELEASE_WINDOW_DAYS))
            .unwrap_or(NaiveDate::MIN);
        let query = BookQuery::new()
            .with(BookPredicate::PublishedOnOrAfter(since))
            .with_ordering(vec![SortKey::desc("publication_date")])
            .with_limit(NEW_RELEASES_LIMIT);
        self.repo.query(&query).await
    }
}
