use rust_decimal::Decimal;

use bookstore_domain::book::Language;
use bookstore_domain::pagination::PageRequest;

use crate::domain::query::{BookPredicate, BookQuery, SortKey, validate_public_ordering};
use crate::domain::repository::BookRepository;
use crate::domain::types::BookRecord;
use crate::error::ServiceError;

#[derive(Debug, Default)]
pub struct SearchInput {
    pub q: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub language: Option<Language>,
    /// Defaults to `-created_at` when empty.
    pub ordering: Vec<SortKey>,
    pub page: Option<PageRequest>,
}

fn non_negative(field: &str, value: Option<Decimal>) -> Result<(), ServiceError> {
    match value {
        Some(v) if v.is_sign_negative() && !v.is_zero() => Err(ServiceError::validation(
            format!("{field} must not be negative"),
        )),
        _ => Ok(()),
    }
}

/// Build the search plan. Inverted price bounds are allowed and simply match nothing.
pub fn search_query(input: SearchInput) -> Result<BookQuery, ServiceError> {
    non_negative("min_price", input.min_price)?;
    non_negative("max_price", input.max_price)?;
    validate_public_ordering(&input.ordering)?;

    let query = BookQuery::new()
        .with_text(input.q.as_deref().unwrap_or_default())
        .with_opt(input.min_price.map(BookPredicate::MinPrice))
        .with_opt(input.max_price.map(BookPredicate::MaxPrice))
        .with_opt(input.language.map(BookPredicate::Language))
        .with_ordering(input.ordering);
    Ok(match input.page {
        Some(page) => query.with_page(page),
        None => query,
    })
}

// ── SearchBooks ──────────────────────────────────────────────────────────────

pub struct SearchBooksUseCase<R: BookRepository> {
    pub repo: R,
}

impl<R: BookRepository> SearchBooksUseCase<R> {
    pub async fn execute(&self, input: SearchInput) -> Result<Vec<BookRecord>, ServiceError> {
        let query = search_query(input)?;
        self.repo.query(&query).await
    }
}
