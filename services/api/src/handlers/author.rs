use axum::{Json, body::Bytes, extract::State, http::StatusCode, response::Response};
use serde::Deserialize;

use bookstore_auth_types::identity::CurrentActor;

use crate::domain::types::AuthorChanges;
use crate::error::ServiceError;
use crate::handlers::book::book_list_response;
use crate::handlers::views::AuthorView;
use crate::handlers::{NamedListQuery, PageQuery, ValidJson, ValidPath, ValidQuery};
use crate::state::AppState;
use crate::usecase::author::{
    CreateAuthorInput, CreateAuthorUseCase, DeleteAuthorUseCase, GetAuthorUseCase,
    ListAuthorsUseCase, SetAuthorPhotoUseCase, UpdateAuthorUseCase,
};
use crate::usecase::book::AuthorBooksUseCase;

// ── GET /authors/ ────────────────────────────────────────────────────────────

pub async fn list_authors(
    State(state): State<AppState>,
    ValidQuery(query): ValidQuery<NamedListQuery>,
) -> Result<Json<Vec<AuthorView>>, ServiceError> {
    let usecase = ListAuthorsUseCase {
        repo: state.author_repo(),
    };
    let records = usecase.execute(&query.into_params()?).await?;
    Ok(Json(
        records
            .into_iter()
            .map(|r| AuthorView::new(r, &state.blobs))
            .collect(),
    ))
}

// ── POST /authors/ ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateAuthorRequest {
    pub name: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub website: String,
    pub slug: Option<String>,
}

pub async fn create_author(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
    ValidJson(body): ValidJson<CreateAuthorRequest>,
) -> Result<(StatusCode, Json<AuthorView>), ServiceError> {
    let usecase = CreateAuthorUseCase {
        repo: state.author_repo(),
    };
    let record = usecase
        .execute(
            &actor,
            CreateAuthorInput {
                name: body.name,
                bio: body.bio,
                email: body.email,
                website: body.website,
                slug: body.slug,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(AuthorView::new(record, &state.blobs))))
}

// ── GET /authors/{slug}/ ─────────────────────────────────────────────────────

pub async fn get_author(
    State(state): State<AppState>,
    ValidPath(slug): ValidPath<String>,
) -> Result<Json<AuthorView>, ServiceError> {
    let usecase = GetAuthorUseCase {
        repo: state.author_repo(),
    };
    let record = usecase.execute(&slug).await?;
    Ok(Json(AuthorView::new(record, &state.blobs)))
}

// ── PUT|PATCH /authors/{slug}/ ───────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateAuthorRequest {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
}

pub async fn update_author(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
    ValidPath(slug): ValidPath<String>,
    ValidJson(body): ValidJson<UpdateAuthorRequest>,
) -> Result<Json<AuthorView>, ServiceError> {
    let usecase = UpdateAuthorUseCase {
        repo: state.author_repo(),
    };
    let record = usecase
        .execute(
            &actor,
            &slug,
            AuthorChanges {
                name: body.name,
                bio: body.bio,
                email: body.email,
                website: body.website,
            },
        )
        .await?;
    Ok(Json(AuthorView::new(record, &state.blobs)))
}

// ── DELETE /authors/{slug}/ ──────────────────────────────────────────────────

pub async fn delete_author(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
    ValidPath(slug): ValidPath<String>,
) -> Result<StatusCode, ServiceError> {
    let usecase = DeleteAuthorUseCase {
        repo: state.author_repo(),
    };
    usecase.execute(&actor, &slug).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── PUT /authors/{slug}/photo/ ───────────────────────────────────────────────

pub async fn set_author_photo(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
    ValidPath(slug): ValidPath<String>,
    image: Bytes,
) -> Result<Json<AuthorView>, ServiceError> {
    let usecase = SetAuthorPhotoUseCase {
        repo: state.author_repo(),
        blobs: state.blobs.clone(),
    };
    let record = usecase.execute(&actor, &slug, image).await?;
    Ok(Json(AuthorView::new(record, &state.blobs)))
}

// ── GET /authors/{slug}/books/ ───────────────────────────────────────────────

pub async fn author_books(
    State(state): State<AppState>,
    ValidPath(slug): ValidPath<String>,
    ValidQuery(query): ValidQuery<PageQuery>,
) -> Result<Response, ServiceError> {
    let usecase = AuthorBooksUseCase {
        authors: state.author_repo(),
        books: state.book_repo(),
    };
    let page = usecase.execute(&slug, query.page()).await?;
    Ok(book_list_response(page, &state.blobs))
}
