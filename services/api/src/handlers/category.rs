use axum::{Json, extract::State, http::StatusCode, response::Response};
use serde::Deserialize;

use bookstore_auth_types::identity::CurrentActor;

use crate::domain::types::CategoryChanges;
use crate::error::ServiceError;
use crate::handlers::book::book_list_response;
use crate::handlers::views::CategoryView;
use crate::handlers::{NamedListQuery, PageQuery, ValidJson, ValidPath, ValidQuery};
use crate::state::AppState;
use crate::usecase::book::CategoryBooksUseCase;
use crate::usecase::category::{
    CreateCategoryInput, CreateCategoryUseCase, DeleteCategoryUseCase, GetCategoryUseCase,
    ListCategoriesUseCase, UpdateCategoryUseCase,
};

// ── GET /categories/ ─────────────────────────────────────────────────────────

pub async fn list_categories(
    State(state): State<AppState>,
    ValidQuery(query): ValidQuery<NamedListQuery>,
) -> Result<Json<Vec<CategoryView>>, ServiceError> {
    let usecase = ListCategoriesUseCase {
        repo: state.category_repo(),
    };
    let records = usecase.execute(&query.into_params()?).await?;
    Ok(Json(records.into_iter().map(CategoryView::from).collect()))
}

// ── POST /categories/ ────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub slug: Option<String>,
}

pub async fn create_category(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
    ValidJson(body): ValidJson<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<CategoryView>), ServiceError> {
    let usecase = CreateCategoryUseCase {
        repo: state.category_repo(),
    };
    let record = usecase
        .execute(
            &actor,
            CreateCategoryInput {
                name: body.name,
                description: body.description,
                slug: body.slug,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(record.into())))
}

// ── GET /categories/{slug}/ ──────────────────────────────────────────────────

pub async fn get_category(
    State(state): State<AppState>,
    ValidPath(slug): ValidPath<String>,
) -> Result<Json<CategoryView>, ServiceError> {
    let usecase = GetCategoryUseCase {
        repo: state.category_repo(),
    };
    Ok(Json(usecase.execute(&slug).await?.into()))
}

// ── PUT|PATCH /categories/{slug}/ ────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

pub async fn update_category(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
    ValidPath(slug): ValidPath<String>,
    ValidJson(body): ValidJson<UpdateCategoryRequest>,
) -> Result<Json<CategoryView>, ServiceError> {
    let usecase = UpdateCategoryUseCase {
        repo: state.category_repo(),
    };
    let record = usecase
        .execute(
            &actor,
            &slug,
            CategoryChanges {
                name: body.name,
                description: body.description,
            },
        )
        .await?;
    Ok(Json(record.into()))
}

// ── DELETE /categories/{slug}/ ───────────────────────────────────────────────

pub async fn delete_category(
    CurrentActor(actor): CurrentActor,
    State(state): State<AppState>,
    ValidPath(slug): ValidPath<String>,
) -> Result<StatusCode, ServiceError> {
    let usecase = DeleteCategoryUseCase {
        repo: state.category_repo(),
    };
    usecase.execute(&actor, &slug).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── GET /categories/{slug}/books/ ────────────────────────────────────────────

pub async fn category_books(
    State(state): State<AppState>,
    ValidPath(slug): ValidPath<String>,
    ValidQuery(query): ValidQuery<PageQuery>,
) -> Result<Response, ServiceError> {
    let usecase = CategoryBooksUseCase {
        categories: state.category_repo(),
        books: state.book_repo(),
    };
    let page = usecase.execute(&slug, query.page()).await?;
    Ok(book_list_response(page, &state.blobs))
}
