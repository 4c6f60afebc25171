//! Query plans handed to the store.
//!
//! A [`BookQuery`] is an immutable value: predicates (AND-combined), sort keys and an
//! optional limit/page. It is assembled with consuming `with_*` methods and passed to
//! [`BookRepository::query`](crate::domain::repository::BookRepository::query) once.
//! [`BookQuery::matches`] and [`BookQuery::evaluate`] state the same semantics in
//! memory, so a plan can be checked without a database.

use std::cmp::Ordering;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

use bookstore_domain::book::{BookStatus, Language};
use bookstore_domain::pagination::{PageRequest, Sort};
use bookstore_domain::policy::ReviewVisibility;

use crate::domain::types::{BookRecord, Review};
use crate::error::ServiceError;

// ── Book predicates ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum BookPredicate {
    /// Case-insensitive substring of title, description, author name, category name or isbn.
    Text(String),
    MinPrice(Decimal),
    MaxPrice(Decimal),
    Language(Language),
    Status(BookStatus),
    /// `stock_quantity > 0`.
    InStock,
    Category(i32),
    Author(i32),
    /// Exact publisher name.
    Publisher(String),
    PublishedOnOrAfter(NaiveDate),
}

impl BookPredicate {
    pub fn matches(&self, record: &BookRecord) -> bool {
        let book = &record.book;
        match self {
            Self::Text(term) => {
                let term = term.to_lowercase();
                [
                    book.title.as_str(),
                    book.description.as_str(),
                    record.author.name.as_str(),
                    record.category.name.as_str(),
                    book.isbn.as_str(),
                ]
                .iter()
                .any(|field| field.to_lowercase().contains(&term))
            }
            Self::MinPrice(min) => book.price >= *min,
            Self::MaxPrice(max) => book.price <= *max,
            Self::Language(language) => book.language == *language,
            Self::Status(status) => book.status == *status,
            Self::InStock => book.stock_quantity > 0,
            Self::Category(id) => book.category_id == *id,
            Self::Author(id) => book.author_id == *id,
            Self::Publisher(publisher) => book.publisher == *publisher,
            Self::PublishedOnOrAfter(date) => book.publication_date >= *date,
        }
    }
}

// ── Sorting ──────────────────────────────────────────────────────────────────

/// A literal sort field and its direction, as requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub field: String,
    pub direction: Sort,
}

impl SortKey {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Sort::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Sort::Desc,
        }
    }

    /// `price` → ascending, `-price` → descending. Blank tokens yield `None`.
    pub fn parse(token: &str) -> Option<Self> {
        let token = token.trim();
        match token.strip_prefix('-') {
            Some(field) if !field.is_empty() => Some(Self::desc(field)),
            Some(_) => None,
            None if token.is_empty() => None,
            None => Some(Self::asc(token)),
        }
    }
}

/// Parse a comma-separated ordering such as `-price,title`. Field names are not checked.
pub fn parse_ordering(ordering: &str) -> Vec<SortKey> {
    ordering.split(',').filter_map(SortKey::parse).collect()
}

/// Orderings the HTTP surface accepts from clients.
pub const PUBLIC_SORT_FIELDS: [&str; 5] = [
    "title",
    "price",
    "publication_date",
    "created_at",
    "average_rating",
];

/// Reject client orderings outside [`PUBLIC_SORT_FIELDS`].
pub fn validate_public_ordering(keys: &[SortKey]) -> Result<(), ServiceError> {
    match keys
        .iter()
        .find(|key| !PUBLIC_SORT_FIELDS.contains(&key.field.as_str()))
    {
        Some(key) => Err(ServiceError::validation(format!(
            "invalid ordering field: {}",
            key.field
        ))),
        None => Ok(()),
    }
}

/// Book columns the store knows how to sort by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookSortField {
    Title,
    Price,
    PublicationDate,
    CreatedAt,
    UpdatedAt,
    /// Reviewless books sort as 0.
    AverageRating,
    StockQuantity,
    Pages,
    Id,
}

impl BookSortField {
    pub fn from_literal(field: &str) -> Option<Self> {
        Some(match field {
            "title" => Self::Title,
            "price" => Self::Price,
            "publication_date" => Self::PublicationDate,
            "created_at" => Self::CreatedAt,
            "updated_at" => Self::UpdatedAt,
            "average_rating" => Self::AverageRating,
            "stock_quantity" => Self::StockQuantity,
            "pages" => Self::Pages,
            "id" => Self::Id,
            _ => return None,
        })
    }

    fn compare(self, a: &BookRecord, b: &BookRecord) -> Ordering {
        match self {
            Self::Title => a.book.title.cmp(&b.book.title),
            Self::Price => a.book.price.cmp(&b.book.price),
            Self::PublicationDate => a.book.publication_date.cmp(&b.book.publication_date),
            Self::CreatedAt => a.book.created_at.cmp(&b.book.created_at),
            Self::UpdatedAt => a.book.updated_at.cmp(&b.book.updated_at),
            Self::AverageRating => a.rating.cmp_average(b.rating),
            Self::StockQuantity => a.book.stock_quantity.cmp(&b.book.stock_quantity),
            Self::Pages => a.book.pages.cmp(&b.book.pages),
            Self::Id => a.book.id.cmp(&b.book.id),
        }
    }
}

fn directed(ordering: Ordering, direction: Sort) -> Ordering {
    match direction {
        Sort::Asc => ordering,
        Sort::Desc => ordering.reverse(),
    }
}

// ── BookQuery ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookQuery {
    predicates: Vec<BookPredicate>,
    ordering: Vec<SortKey>,
    limit: Option<u64>,
    page: Option<PageRequest>,
}

impl BookQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, predicate: BookPredicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    /// Add a predicate when one is given.
    pub fn with_opt(self, predicate: Option<BookPredicate>) -> Self {
        match predicate {
            Some(p) => self.with(p),
            None => self,
        }
    }

    /// Free-text filter; a blank term adds nothing.
    pub fn with_text(self, term: &str) -> Self {
        let term = term.trim();
        if term.is_empty() {
            self
        } else {
            self.with(BookPredicate::Text(term.to_owned()))
        }
    }

    pub fn with_ordering(mut self, keys: Vec<SortKey>) -> Self {
        self.ordering = keys;
        self
    }

    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_page(mut self, page: PageRequest) -> Self {
        self.page = Some(PageRequest::new(page.page, page.page_size));
        self
    }

    pub fn predicates(&self) -> &[BookPredicate] {
        &self.predicates
    }

    /// Requested ordering, or newest first when none was given.
    pub fn ordering(&self) -> Vec<SortKey> {
        if self.ordering.is_empty() {
            vec![SortKey::desc("created_at")]
        } else {
            self.ordering.clone()
        }
    }

    pub fn limit(&self) -> Option<u64> {
        self.limit
    }

    pub fn page(&self) -> Option<PageRequest> {
        self.page
    }

    /// Same predicates without ordering, limit or page; for counting.
    pub fn unpaged(&self) -> Self {
        Self {
            predicates: self.predicates.clone(),
            ..Self::default()
        }
    }

    /// Resolve sort keys to known fields. Unknown fields are a validation error.
    pub fn sort_fields(&self) -> Result<Vec<(BookSortField, Sort)>, ServiceError> {
        self.ordering()
            .into_iter()
            .map(|key| {
                BookSortField::from_literal(&key.field)
                    .map(|field| (field, key.direction))
                    .ok_or_else(|| {
                        ServiceError::validation(format!("cannot sort by '{}'", key.field))
                    })
            })
            .collect()
    }

    /// Rows to skip and take after ordering; `None` take means unbounded.
    pub fn window(&self) -> (u64, Option<u64>) {
        let (offset, page_take) = match self.page {
            Some(page) => (page.offset(), Some(page.limit())),
            None => (0, None),
        };
        let take = match (page_take, self.limit) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        (offset, take)
    }

    pub fn matches(&self, record: &BookRecord) -> bool {
        self.predicates.iter().all(|p| p.matches(record))
    }

    /// Run the plan over an in-memory set, with `id ASC` as the final tie-break.
    pub fn evaluate(&self, records: Vec<BookRecord>) -> Result<Vec<BookRecord>, ServiceError> {
        let fields = self.sort_fields()?;
        let mut rows: Vec<BookRecord> = records.into_iter().filter(|r| self.matches(r)).collect();
        rows.sort_by(|a, b| {
            fields
                .iter()
                .map(|(field, direction)| directed(field.compare(a, b), *direction))
                .find(|o| o.is_ne())
                .unwrap_or_else(|| a.book.id.cmp(&b.book.id))
        });
        let (offset, take) = self.window();
        let rows = rows.into_iter().skip(offset as usize);
        Ok(match take {
            Some(n) => rows.take(n as usize).collect(),
            None => rows.collect(),
        })
    }
}

// ── Categories and authors ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamedSortField {
    Name,
    CreatedAt,
}

/// List parameters for categories and authors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListParams {
    pub search: Option<String>,
    pub ordering: (NamedSortField, Sort),
    pub page: Option<PageRequest>,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            search: None,
            ordering: (NamedSortField::Name, Sort::Asc),
            page: None,
        }
    }
}

impl ListParams {
    /// `name` (default) or `created_at`, optionally `-` prefixed.
    pub fn parse_ordering(ordering: Option<&str>) -> Result<(NamedSortField, Sort), ServiceError> {
        let Some(key) = ordering.and_then(SortKey::parse) else {
            return Ok((NamedSortField::Name, Sort::Asc));
        };
        let field = match key.field.as_str() {
            "name" => NamedSortField::Name,
            "created_at" => NamedSortField::CreatedAt,
            other => {
                return Err(ServiceError::validation(format!(
                    "invalid ordering field: {other}"
                )));
            }
        };
        Ok((field, key.direction))
    }

    pub fn search_term(&self) -> Option<&str> {
        self.search.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

// ── Reviews ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewSortField {
    Rating,
    CreatedAt,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewQuery {
    pub book_id: Option<i32>,
    pub user_id: Option<Uuid>,
    pub rating: Option<i16>,
    pub visibility: ReviewVisibility,
    pub ordering: Vec<(ReviewSortField, Sort)>,
    pub page: Option<PageRequest>,
}

impl Default for ReviewQuery {
    fn default() -> Self {
        Self {
            book_id: None,
            user_id: None,
            rating: None,
            visibility: ReviewVisibility::All,
            ordering: vec![(ReviewSortField::CreatedAt, Sort::Desc)],
            page: None,
        }
    }
}

impl ReviewQuery {
    pub fn for_book(book_id: i32) -> Self {
        Self {
            book_id: Some(book_id),
            ..Self::default()
        }
    }

    pub fn for_user(user_id: Uuid) -> Self {
        Self {
            user_id: Some(user_id),
            ..Self::default()
        }
    }

    /// `rating` and `created_at`, optionally `-` prefixed; blank keeps `-created_at`.
    pub fn parse_ordering(
        ordering: &str,
    ) -> Result<Vec<(ReviewSortField, Sort)>, ServiceError> {
        let keys = parse_ordering(ordering);
        if keys.is_empty() {
            return Ok(vec![(ReviewSortField::CreatedAt, Sort::Desc)]);
        }
        keys.into_iter()
            .map(|key| match key.field.as_str() {
                "rating" => Ok((ReviewSortField::Rating, key.direction)),
                "created_at" => Ok((ReviewSortField::CreatedAt, key.direction)),
                other => Err(ServiceError::validation(format!(
                    "invalid ordering field: {other}"
                ))),
            })
            .collect()
    }

    pub fn matches(&self, review: &Review) -> bool {
        self.book_id.is_none_or(|id| review.book_id == id)
            && self.user_id.is_none_or(|id| review.user_id == id)
            && self.rating.is_none_or(|r| review.rating == r)
            && self.visibility.permits(review.user_id)
    }

    pub fn compare(&self, a: &Review, b: &Review) -> Ordering {
        self.ordering
            .iter()
            .map(|(field, direction)| {
                let o = match field {
                    ReviewSortField::Rating => a.rating.cmp(&b.rating),
                    ReviewSortField::CreatedAt => a.created_at.cmp(&b.created_at),
                };
                directed(o, *direction)
            })
            .find(|o| o.is_ne())
            .unwrap_or_else(|| a.id.cmp(&b.id))
    }
}
