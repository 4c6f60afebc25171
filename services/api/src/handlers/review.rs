use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use uuid::Uuid;

use bookstore_core::serde::blank_as_none;
use bookstore_auth_types::identity::CurrentActor;
use bookstore_domain::pagination::PageRequest;

use crate::domain::query::ReviewQuery;
use crate::domain::types::ReviewChanges;
use crate::error::ServiceError;
use crate::handlers::views::ReviewView;
use crate::handlers::{PageQuery, ValidJson, ValidPath, ValidQuery};
use crate::state::AppState;
use crate::usecase::review::{
    BookRef, BookReviewsUseCase, CreateReviewInput, CreateReviewUseCase, DeleteReviewUseCase,
    GetReviewUseCase, ListReviewsUseCase, ReviewFilters, UpdateReviewUseCase,
};

// ── GET /reviews/ ────────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
pub struct ReviewListQuery {
    #[serde(default, deserialize_with = "blank_as_none")]
    pub book: Option<i32>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub user: Option<Uuid>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub rating: Option<i16>,
    pub ordering: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub page: Option<u32>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub page_size: Option<u32>,
}

pub async fn list_reviews(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
    ValidQuery(query): ValidQuery<ReviewListQuery>,
) -> Result<Json<Vec<ReviewView>>, ServiceError> {
    let ordering = match query.ordering.as_deref() {
        Some(ordering) => ReviewQuery::parse_ordering(ordering)?,
        None => Vec::new(),
    };
    let usecase = ListReviewsUseCase {
        repo: state.review_repo(),
    };
    let records = usecase
        .execute(
            &actor,
            ReviewFilters {
                book_id: query.book,
                user_id: query.user,
                rating: query.rating,
                ordering,
                page: PageRequest::requested(query.page, query.page_size),
            },
        )
        .await?;
    Ok(Json(records.into_iter().map(ReviewView::from).collect()))
}

// ── POST /reviews/ ───────────────────────────────────────────────────────────

/// Any `user` field in the body is ignored; reviews belong to the caller.
#[derive(Deserialize)]
pub struct CreateReviewRequest {
    #[serde(alias = "book_id")]
    pub book: i32,
    pub rating: i16,
    #[serde(default)]
    pub comment: String,
}

pub async fn create_review(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
    ValidJson(body): ValidJson<CreateReviewRequest>,
) -> Result<(StatusCode, Json<ReviewView>), ServiceError> {
    let usecase = CreateReviewUseCase {
        reviews: state.review_repo(),
        books: state.book_repo(),
    };
    let record = usecase
        .execute(
            &actor,
            CreateReviewInput {
                book: BookRef::Id(body.book),
                rating: body.rating,
                comment: body.comment,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(record.into())))
}

// ── GET /reviews/{id}/ ───────────────────────────────────────────────────────

pub async fn get_review(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
    ValidPath(id): ValidPath<i32>,
) -> Result<Json<ReviewView>, ServiceError> {
    let usecase = GetReviewUseCase {
        repo: state.review_repo(),
    };
    Ok(Json(usecase.execute(&actor, id).await?.into()))
}

// ── PUT|PATCH /reviews/{id}/ ─────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateReviewRequest {
    pub rating: Option<i16>,
    pub comment: Option<String>,
}

pub async fn update_review(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
    ValidPath(id): ValidPath<i32>,
    ValidJson(body): ValidJson<UpdateReviewRequest>,
) -> Result<Json<ReviewView>, ServiceError> {
    let usecase = UpdateReviewUseCase {
        repo: state.review_repo(),
    };
    let record = usecase
        .execute(
            &actor,
            id,
            ReviewChanges {
                rating: body.rating,
                comment: body.comment,
            },
        )
        .await?;
    Ok(Json(record.into()))
}

// ── DELETE /reviews/{id}/ ────────────────────────────────────────────────────

pub async fn delete_review(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
    ValidPath(id): ValidPath<i32>,
) -> Result<StatusCode, ServiceError> {
    let usecase = DeleteReviewUseCase {
        repo: state.review_repo(),
    };
    usecase.execute(&actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── GET /books/{slug}/reviews/ ───────────────────────────────────────────────

pub async fn book_reviews(
    State(state): State<AppState>,
    ValidPath(slug): ValidPath<String>,
    ValidQuery(query): ValidQuery<PageQuery>,
) -> Result<Json<Vec<ReviewView>>, ServiceError> {
    let usecase = BookReviewsUseCase {
        books: state.book_repo(),
        reviews: state.review_repo(),
    };
    let records = usecase.execute(&slug, query.page()).await?;
    Ok(Json(records.into_iter().map(ReviewView::from).collect()))
}

// ── POST /books/{slug}/add_review/ ───────────────────────────────────────────

#[derive(Deserialize)]
pub struct AddReviewRequest {
    pub rating: i16,
    #[serde(default)]
    pub comment: String,
}

pub async fn add_review(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
    ValidPath(slug): ValidPath<String>,
    ValidJson(body): ValidJson<AddReviewRequest>,
) -> Result<(StatusCode, Json<ReviewView>), ServiceError> {
    let usecase = CreateReviewUseCase {
        reviews: state.review_repo(),
        books: state.book_repo(),
    };
    let record = usecase
        .execute(
            &actor,
            CreateReviewInput {
                book: BookRef::Slug(slug),
                rating: body.rating,
                comment: body.comment,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(record.into())))
}
