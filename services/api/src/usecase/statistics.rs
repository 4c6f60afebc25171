use crate::domain::repository::{BookRepository, StatisticsPort};
use crate::domain::types::{BookRecord, CategoryBookCount, LanguageBookCount, RatingSummary};
use crate::error::ServiceError;

pub const TOP_RATED_LIMIT: usize = 5;

#[derive(Debug)]
pub struct Statistics {
    pub total_books: u64,
    pub available_books: u64,
    pub total_authors: u64,
    pub total_categories: u64,
    /// Every category, zero-count ones included, by name.
    pub per_category: Vec<CategoryBookCount>,
    /// Most common language first.
    pub per_language: Vec<LanguageBookCount>,
    pub top_rated: Vec<BookRecord>,
}

/// Ids of the best-rated books. Reviewless books never rank; equal averages go by id.
pub fn rank_top_rated(ratings: &[(i32, RatingSummary)], limit: usize) -> Vec<i32> {
    let mut ranked: Vec<(i32, RatingSummary)> = ratings
        .iter()
        .copied()
        .filter(|(_, summary)| summary.has_reviews())
        .collect();
    ranked.sort_by(|(a_id, a), (b_id, b)| b.cmp_average(*a).then(a_id.cmp(b_id)));
    ranked.into_iter().take(limit).map(|(id, _)| id).collect()
}

/// Count descending, then language code ascending.
pub fn order_languages(mut counts: Vec<LanguageBookCount>) -> Vec<LanguageBookCount> {
    counts.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.language.code().cmp(b.language.code()))
    });
    counts
}

// ── GetStatistics ────────────────────────────────────────────────────────────

pub struct GetStatisticsUseCase<S: StatisticsPort, R: BookRepository> {
    pub stats: S,
    pub books: R,
}

impl<S: StatisticsPort, R: BookRepository> GetStatisticsUseCase<S, R> {
    /// Recomputed on every call.
    pub async fn execute(&self) -> Result<Statistics, ServiceError> {
        let snapshot = self.stats.snapshot().await?;
        let top_ids = rank_top_rated(&snapshot.ratings, TOP_RATED_LIMIT);
        let top_rated = if top_ids.is_empty() {
            Vec::new()
        } else {
            self.books.find_by_ids(&top_ids).await?
        };

        let mut per_category = snapshot.per_category;
        per_category.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(Statistics {
            total_books: snapshot.total_books,
            available_books: snapshot.available_books,
            total_authors: snapshot.total_authors,
            total_categories: snapshot.total_categories,
            per_category,
            per_language: order_languages(snapshot.per_language),
            top_rated,
        })
    }
}
