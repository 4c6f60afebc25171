use anyhow::Context as _;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, JoinType, PaginatorTrait, QueryFilter,
    QuerySelect, RelationTrait, TransactionTrait,
};

use bookstore_domain::book::{BookStatus, Language};
use bookstore_schema::{authors, books, categories};

use crate::domain::repository::StatisticsPort;
use crate::domain::types::{CategoryBookCount, LanguageBookCount, StatisticsSnapshot};
use crate::error::ServiceError;
use crate::infra::db::rating_summaries;

#[derive(Clone)]
pub struct DbStatisticsPort {
    pub db: DatabaseConnection,
}

impl StatisticsPort for DbStatisticsPort {
    async fn snapshot(&self) -> Result<StatisticsSnapshot, ServiceError> {
        let txn = self.db.begin().await.context("begin statistics snapshot")?;

        let total_books = books::Entity::find()
            .count(&txn)
            .await
            .context("count books")?;
        let available_books = books::Entity::find()
            .filter(books::Column::Status.eq(BookStatus::Available.code()))
            .filter(books::Column::StockQuantity.gt(0))
            .count(&txn)
            .await
            .context("count available books")?;
        let total_authors = authors::Entity::find()
            .count(&txn)
            .await
            .context("count authors")?;
        let total_categories = categories::Entity::find()
            .count(&txn)
            .await
            .context("count categories")?;

        let per_category: Vec<(String, i64)> = categories::Entity::find()
            .select_only()
            .column(categories::Column::Name)
            .column_as(books::Column::Id.count(), "book_count")
            .join(JoinType::LeftJoin, categories::Relation::Books.def())
            .group_by(categories::Column::Id)
            .group_by(categories::Column::Name)
            .into_tuple()
            .all(&txn)
            .await
            .context("count books per category")?;
        let per_language: Vec<(String, i64)> = books::Entity::find()
            .select_only()
            .column(books::Column::Language)
            .column_as(books::Column::Id.count(), "book_count")
            .group_by(books::Column::Language)
            .into_tuple()
            .all(&txn)
            .await
            .context("count books per language")?;
        let ratings = rating_summaries(&txn, None).await?;

        txn.commit().await.context("commit statistics snapshot")?;

        Ok(StatisticsSnapshot {
            total_books,
            available_books,
            total_authors,
            total_categories,
            per_category: per_category
                .into_iter()
                .map(|(name, count)| CategoryBookCount {
                    name,
                    book_count: count.max(0) as u64,
                })
                .collect(),
            per_language: per_language
                .into_iter()
                .filter_map(|(code, count)| {
                    Some(LanguageBookCount {
                        language: Language::from_code(&code)?,
                        count: count.max(0) as u64,
                    })
                })
                .collect(),
            ratings: ratings.into_iter().collect(),
        })
    }
}
