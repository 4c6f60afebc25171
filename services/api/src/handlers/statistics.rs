use axum::{Json, extract::State};

use crate::error::ServiceError;
use crate::handlers::views::StatisticsView;
use crate::state::AppState;
use crate::usecase::statistics::GetStatisticsUseCase;

// ── GET /statistics/ ─────────────────────────────────────────────────────────

pub async fn get_statistics(
    State(state): State<AppState>,
) -> Result<Json<StatisticsView>, ServiceError> {
    let usecase = GetStatisticsUseCase {
        stats: state.statistics(),
        books: state.book_repo(),
    };
    let stats = usecase.execute().await?;
    Ok(Json(StatisticsView::new(stats, &state.blobs)))
}
