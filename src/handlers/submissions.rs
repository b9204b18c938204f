use crate::{error::AppError, handlers::save::AppState, store::Submission};
use axum::{extract::State, Json};

/// Handle GET /api/submissions
/// Returns every persisted submission, most recent first.
pub async fn list_submissions(
    State(state): State<AppState>,
) -> Result<Json<Vec<Submission>>, AppError> {
    let rows = state.store.list_all().await?;
    tracing::debug!(count = rows.len(), "Listing submissions");
    Ok(Json(rows))
}
