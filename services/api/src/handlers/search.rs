use axum::{Json, extract::State};
use rust_decimal::Decimal;
use serde::Deserialize;

use bookstore_core::serde::blank_as_none;
use bookstore_domain::book::Language;
use bookstore_domain::pagination::PageRequest;
use bookstore_domain::policy::{Action, Resource, rule};

use crate::domain::query::parse_ordering;
use crate::error::ServiceError;
use crate::handlers::views::BookView;
use crate::handlers::ValidQuery;
use crate::state::AppState;
use crate::usecase::search::{SearchBooksUseCase, SearchInput};

// ── GET /search/ ─────────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
pub struct SearchQuery {
    pub q: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub min_price: Option<Decimal>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub max_price: Option<Decimal>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub language: Option<Language>,
    pub ordering: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub page: Option<u32>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub page_size: Option<u32>,
}

pub async fn search_books(
    State(state): State<AppState>,
    ValidQuery(query): ValidQuery<SearchQuery>,
) -> Result<Json<Vec<BookView>>, ServiceError> {
    let usecase = SearchBooksUseCase {
        repo: state.book_repo(),
    };
    let records = usecase
        .execute(SearchInput {
            q: query.q,
            min_price: query.min_price,
            max_price: query.max_price,
            language: query.language,
            ordering: parse_ordering(query.ordering.as_deref().unwrap_or_default()),
            page: PageRequest::requested(query.page, query.page_size),
        })
        .await?;
    let view = rule(Resource::Book, Action::List).view;
    Ok(Json(
        records
            .into_iter()
            .map(|r| BookView::new(view, r, &state.blobs))
            .collect(),
    ))
}
