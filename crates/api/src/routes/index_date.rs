//! Search index date endpoint handler.

use axum::extract::State;

use crate::app::AppState;

/// Date of the search index the answers are generated from.
///
/// GET /azureindexdate
pub async fn azure_index_date(State(state): State<AppState>) -> String {
    state.config.feedback.index_date.clone()
}
