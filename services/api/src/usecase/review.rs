use uuid::Uuid;

use bookstore_domain::actor::Actor;
use bookstore_domain::pagination::{PageRequest, Sort};
use bookstore_domain::policy::{Action, Resource, ReviewVisibility, Target, review_visibility};

use crate::domain::query::{ReviewQuery, ReviewSortField};
use crate::domain::repository::{BookRepository, ReviewRepository};
use crate::domain::types::{NewReview, ReviewChanges, ReviewRecord};
use crate::domain::validation;
use crate::error::{Entity, ServiceError};
use crate::usecase::book::find_book;
use crate::usecase::{authorize, require_identity};

pub const DUPLICATE_REVIEW: &str = "you have already reviewed this book";

async fn find_review<R: ReviewRepository>(repo: &R, id: i32) -> Result<ReviewRecord, ServiceError> {
    repo.find_by_id(id)
        .await?
        .ok_or(ServiceError::NotFound(Entity::Review))
}

// ── ListReviews ──────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct ReviewFilters {
    pub book_id: Option<i32>,
    pub user_id: Option<Uuid>,
    pub rating: Option<i16>,
    /// Empty keeps the default `-created_at`.
    pub ordering: Vec<(ReviewSortField, Sort)>,
    pub page: Option<PageRequest>,
}

pub struct ListReviewsUseCase<R: ReviewRepository> {
    pub repo: R,
}

impl<R: ReviewRepository> ListReviewsUseCase<R> {
    /// Staff see every review, other callers only their own, anonymous callers nothing.
    pub async fn execute(
        &self,
        actor: &Actor,
        filters: ReviewFilters,
    ) -> Result<Vec<ReviewRecord>, ServiceError> {
        authorize(actor, Resource::Review, Action::List, Target::Unowned)?;
        let visibility = review_visibility(actor);
        if visibility == ReviewVisibility::Nothing {
            return Ok(Vec::new());
        }

        let mut query = ReviewQuery {
            book_id: filters.book_id,
            user_id: filters.user_id,
            rating: filters.rating,
            visibility,
            page: filters.page,
            ..ReviewQuery::default()
        };
        if !filters.ordering.is_empty() {
            query.ordering = filters.ordering;
        }
        self.repo.list(&query).await
    }
}

// ── GetReview ────────────────────────────────────────────────────────────────

pub struct GetReviewUseCase<R: ReviewRepository> {
    pub repo: R,
}

impl<R: ReviewRepository> GetReviewUseCase<R> {
    /// A review hidden from the caller is reported as not found.
    pub async fn execute(&self, actor: &Actor, id: i32) -> Result<ReviewRecord, ServiceError> {
        authorize(actor, Resource::Review, Action::Retrieve, Target::Unowned)?;
        let record = find_review(&self.repo, id).await?;
        if !review_visibility(actor).permits(record.review.user_id) {
            return Err(ServiceError::NotFound(Entity::Review));
        }
        Ok(record)
    }
}

// ── CreateReview ─────────────────────────────────────────────────────────────

/// How the reviewed book is named by the request.
#[derive(Debug, Clone)]
pub enum BookRef {
    /// Book id from a request body; an unknown id is a validation error.
    Id(i32),
    /// Book slug from the URL; an unknown slug is not found.
    Slug(String),
}

pub struct CreateReviewInput {
    pub book: BookRef,
    pub rating: i16,
    pub comment: String,
}

pub struct CreateReviewUseCase<R: ReviewRepository, B: BookRepository> {
    pub reviews: R,
    pub books: B,
}

impl<R: ReviewRepository, B: BookRepository> CreateReviewUseCase<R, B> {
    /// The review always belongs to the caller; a second review of the same book is a duplicate.
    pub async fn execute(
        &self,
        actor: &Actor,
        input: CreateReviewInput,
    ) -> Result<ReviewRecord, ServiceError> {
        authorize(actor, Resource::Review, Action::Create, Target::Unowned)?;
        let identity = require_identity(actor)?;
        validation::rating(input.rating)?;

        let book_id = match input.book {
            BookRef::Id(id) => self
                .books
                .find_by_id(id)
                .await?
                .ok_or_else(|| ServiceError::validation(format!("book {id} does not exist")))?
                .book
                .id,
            BookRef::Slug(slug) => find_book(&self.books, &slug).await?.book.id,
        };

        if self
            .reviews
            .find_by_book_and_user(book_id, identity.user_id)
            .await?
            .is_some()
        {
            return Err(ServiceError::Duplicate(DUPLICATE_REVIEW));
        }

        let review = self
            .reviews
            .create(&NewReview {
                book_id,
                user_id: identity.user_id,
                rating: input.rating,
                comment: input.comment,
            })
            .await?;
        tracing::info!(
            review_id = review.id,
            book_id,
            user_id = %identity.user_id,
            rating = review.rating,
            "review created"
        );
        find_review(&self.reviews, review.id).await
    }
}

// ── UpdateReview ─────────────────────────────────────────────────────────────

pub struct UpdateReviewUseCase<R: ReviewRepository> {
    pub repo: R,
}

impl<R: ReviewRepository> UpdateReviewUseCase<R> {
    pub async fn execute(
        &self,
        actor: &Actor,
        id: i32,
        changes: ReviewChanges,
    ) -> Result<ReviewRecord, ServiceError> {
        require_identity(actor)?;
        if let Some(rating) = changes.rating {
            validation::rating(rating)?;
        }
        let record = find_review(&self.repo, id).await?;
        authorize(
            actor,
            Resource::Review,
            Action::Update,
            Target::OwnedBy(record.review.user_id),
        )?;

        self.repo.update(id, &changes).await?;
        tracing::info!(review_id = id, "review updated");
        find_review(&self.repo, id).await
    }
}

// ── DeleteReview ─────────────────────────────────────────────────────────────

pub struct DeleteReviewUseCase<R: ReviewRepository> {
    pub repo: R,
}

impl<R: ReviewRepository> DeleteReviewUseCase<R> {
    pub async fn execute(&self, actor: &Actor, id: i32) -> Result<(), ServiceError> {
        require_identity(actor)?;
        let record = find_review(&self.repo, id).await?;
        authorize(
            actor,
            Resource::Review,
            Action::Delete,
            Target::OwnedBy(record.review.user_id),
        )?;

        if !self.repo.delete(id).await? {
            return Err(ServiceError::NotFound(Entity::Review));
        }
        tracing::info!(review_id = id, "review deleted");
        Ok(())
    }
}

// ── BookReviews ──────────────────────────────────────────────────────────────

pub struct BookReviewsUseCase<B: BookRepository, R: ReviewRepository> {
    pub books: B,
    pub reviews: R,
}

impl<B: BookRepository, R: ReviewRepository> BookReviewsUseCase<B, R> {
    /// Every review of the book, newest first.
    pub async fn execute(
        &self,
        slug: &str,
        page: Option<PageRequest>,
    ) -> Result<Vec<ReviewRecord>, ServiceError> {
        let record = find_book(&self.books, slug).await?;
        let query = ReviewQuery {
            page,
            ..ReviewQuery::for_book(record.book.id)
        };
        self.reviews.list(&query).await
    }
}
