use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;

use bookstore_core::serde::blank_as_none;
use bookstore_auth_types::identity::CurrentActor;
use bookstore_domain::book::{BookStatus, Language};
use bookstore_domain::pagination::PageRequest;
use bookstore_domain::policy::{Action, Resource, View, rule};

use crate::domain::query::parse_ordering;
use crate::domain::repository::BlobStore;
use crate::domain::types::{BookChanges, BookRecord};
use crate::error::ServiceError;
use crate::handlers::views::BookView;
use crate::handlers::{PageQuery, ValidJson, ValidPath, ValidQuery, list_response};
use crate::state::AppState;
use crate::usecase::book::{
    AvailableBooksUseCase, BestSellersUseCase, BookFilters, BookPage, CreateBookInput,
    CreateBookUseCase, DeleteBookUseCase, GetBookUseCase, ListBooksUseCase, NewReleasesUseCase,
    SetBookCoverUseCase, UpdateBookUseCase,
};

fn views<B: BlobStore>(view: View, records: Vec<BookRecord>, blobs: &B) -> Vec<BookView> {
    records
        .into_iter()
        .map(|r| BookView::new(view, r, blobs))
        .collect()
}

/// Book collections render the list view, with `x-total-count` when paged.
pub(crate) fn book_list_response<B: BlobStore>(page: BookPage, blobs: &B) -> Response {
    let view = rule(Resource::Book, Action::List).view;
    list_response(views(view, page.books, blobs), page.total)
}

fn detail<B: BlobStore>(action: Action, record: BookRecord, blobs: &B) -> Json<BookView> {
    Json(BookView::new(rule(Resource::Book, action).view, record, blobs))
}

// ── GET /books/ ──────────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
pub struct BookListQuery {
    #[serde(default, deserialize_with = "blank_as_none")]
    pub category: Option<i32>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub author: Option<i32>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub language: Option<Language>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub status: Option<BookStatus>,
    pub publisher: Option<String>,
    pub search: Option<String>,
    pub ordering: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub page: Option<u32>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub page_size: Option<u32>,
}

pub async fn list_books(
    State(state): State<AppState>,
    ValidQuery(query): ValidQuery<BookListQuery>,
) -> Result<Response, ServiceError> {
    let usecase = ListBooksUseCase {
        repo: state.book_repo(),
    };
    let page = usecase
        .execute(BookFilters {
            category: query.category,
            author: query.author,
            language: query.language,
            status: query.status,
            publisher: query.publisher,
            search: query.search,
            ordering: parse_ordering(query.ordering.as_deref().unwrap_or_default()),
            page: PageRequest::requested(query.page, query.page_size),
        })
        .await?;
    Ok(book_list_response(page, &state.blobs))
}

// ── POST /books/ ─────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateBookRequest {
    pub title: String,
    pub slug: Option<String>,
    #[serde(alias = "author_id")]
    pub author: i32,
    #[serde(alias = "category_id")]
    pub category: i32,
    #[serde(default)]
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

pub async fn create_book(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
    ValidJson(body): ValidJson<CreateBookRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let usecase = CreateBookUseCase {
        books: state.book_repo(),
        authors: state.author_repo(),
        categories: state.category_repo(),
    };
    let record = usecase
        .execute(
            &actor,
            CreateBookInput {
                title: body.title,
                slug: body.slug,
                author_id: body.author,
                category_id: body.category,
                description: body.description,
                isbn: body.isbn,
                publication_date: body.publication_date,
                publisher: body.publisher,
                language: body.language,
                pages: body.pages,
                price: body.price,
                status: body.status,
                stock_quantity: body.stock_quantity,
            },
        )
        .await?;
    Ok((
        StatusCode::CREATED,
        detail(Action::Create, record, &state.blobs),
    ))
}

// ── GET /books/{slug}/ ───────────────────────────────────────────────────────

pub async fn get_book(
    State(state): State<AppState>,
    ValidPath(slug): ValidPath<String>,
) -> Result<Json<BookView>, ServiceError> {
    let usecase = GetBookUseCase {
        repo: state.book_repo(),
    };
    let record = usecase.execute(&slug).await?;
    Ok(detail(Action::Retrieve, record, &state.blobs))
}

// ── PUT|PATCH /books/{slug}/ ─────────────────────────────────────────────────

#[derive(Deserialize, Default)]
pub struct UpdateBookRequest {
    pub title: Option<String>,
    #[serde(alias = "author_id")]
    pub author: Option<i32>,
    #[serde(alias = "category_id")]
    pub category: Option<i32>,
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

pub async fn update_book(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
    ValidPath(slug): ValidPath<String>,
    ValidJson(body): ValidJson<UpdateBookRequest>,
) -> Result<Json<BookView>, ServiceError> {
    let usecase = UpdateBookUseCase {
        books: state.book_repo(),
        authors: state.author_repo(),
        categories: state.category_repo(),
    };
    let record = usecase
        .execute(
            &actor,
            &slug,
            BookChanges {
                title: body.title,
                author_id: body.author,
                category_id: body.category,
                description: body.description,
                isbn: body.isbn,
                publication_date: body.publication_date,
                publisher: body.publisher,
                language: body.language,
                pages: body.pages,
                price: body.price,
                status: body.status,
                stock_quantity: body.stock_quantity,
            },
        )
        .await?;
    Ok(detail(Action::Update, record, &state.blobs))
}

// ── DELETE /books/{slug}/ ────────────────────────────────────────────────────

pub async fn delete_book(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
    ValidPath(slug): ValidPath<String>,
) -> Result<StatusCode, ServiceError> {
    let usecase = DeleteBookUseCase {
        repo: state.book_repo(),
    };
    usecase.execute(&actor, &slug).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── PUT /books/{slug}/cover/ ─────────────────────────────────────────────────

pub async fn set_book_cover(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
    ValidPath(slug): ValidPath<String>,
    image: Bytes,
) -> Result<Json<BookView>, ServiceError> {
    let usecase = SetBookCoverUseCase {
        repo: state.book_repo(),
        blobs: state.blobs.clone(),
    };
    let record = usecase.execute(&actor, &slug, image).await?;
    Ok(detail(Action::Update, record, &state.blobs))
}

// ── GET /books/available/ ────────────────────────────────────────────────────

pub async fn available_books(
    State(state): State<AppState>,
    ValidQuery(query): ValidQuery<PageQuery>,
) -> Result<Response, ServiceError> {
    let usecase = AvailableBooksUseCase {
        repo: state.book_repo(),
    };
    let page = usecase.execute(query.page()).await?;
    Ok(book_list_response(page, &state.blobs))
}

// ── GET /books/best_sellers/ ─────────────────────────────────────────────────

pub async fn best_sellers(State(state): State<AppState>) -> Result<Json<Vec<BookView>>, ServiceError> {
    let usecase = BestSellersUseCase {
        repo: state.book_repo(),
    };
    let records = usecase.execute().await?;
    let view = rule(Resource::Book, Action::List).view;
    Ok(Json(views(view, records, &state.blobs)))
}

// ── GET /books/new_releases/ ─────────────────────────────────────────────────

pub async fn new_releases(
    State(state): State<AppState>,
) -> Result<Json<Vec<BookView>>, ServiceError> {
    let usecase = NewReleasesUseCase {
        repo: state.book_repo(),
    };
    let records = usecase.execute(Utc::now().date_naive()).await?;
    let view = rule(Resource::Book, Action::List).view;
    Ok(Json(views(view, records, &state.blobs)))
}
