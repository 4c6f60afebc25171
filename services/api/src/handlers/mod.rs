pub mod account;
pub mod author;
pub mod book;
pub mod category;
pub mod review;
pub mod search;
pub mod statistics;
pub mod views;

use axum::extract::{FromRequest, FromRequestParts};
use axum::http::{HeaderName, HeaderValue};
use axum::response::{AppendHeaders, IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};

use bookstore_core::serde::blank_as_none;
use bookstore_domain::pagination::PageRequest;

use crate::domain::query::ListParams;
use crate::error::ServiceError;

pub const X_TOTAL_COUNT: &str = "x-total-count";

/// Upload limit for image bodies.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// `Json` whose rejection renders as a validation error.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ServiceError))]
pub struct ValidJson<T>(pub T);

/// `Query` whose rejection renders as a validation error.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ServiceError))]
pub struct ValidQuery<T>(pub T);

/// `Path` whose rejection renders as a validation error.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ServiceError))]
pub struct ValidPath<T>(pub T);

/// Query string shared by the category and author collections.
#[derive(Deserialize, Default)]
pub struct NamedListQuery {
    pub search: Option<String>,
    pub ordering: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub page: Option<u32>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub page_size: Option<u32>,
}

impl NamedListQuery {
    pub fn into_params(self) -> Result<ListParams, ServiceError> {
        Ok(ListParams {
            ordering: ListParams::parse_ordering(self.ordering.as_deref())?,
            page: PageRequest::requested(self.page, self.page_size),
            search: self.search,
        })
    }
}

/// Query string carrying only a page.
#[derive(Deserialize, Default)]
pub struct PageQuery {
    #[serde(default, deserialize_with = "blank_as_none")]
    pub page: Option<u32>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub page_size: Option<u32>,
}

impl PageQuery {
    pub fn page(&self) -> Option<PageRequest> {
        PageRequest::requested(self.page, self.page_size)
    }
}

/// JSON list body, with `x-total-count` when the total is known.
pub(crate) fn list_response<T: Serialize>(items: Vec<T>, total: Option<u64>) -> Response {
    match total {
        Some(total) => (
            AppendHeaders([(
                HeaderName::from_static(X_TOTAL_COUNT),
                HeaderValue::from(total),
            )]),
            Json(items),
        )
            .into_response(),
        None => Json(items).into_response(),
    }
}

/// Body of the plain acknowledgement responses.
#[derive(Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}
