//! Public read API

use axum::{
    Json, Router,
    extract::State,
    routing::get,
};
use schoolcal_core::{Event, EventFilter, EventHistory, EventQuery};

use crate::routes::{ApiQuery, AppError};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/events", get(list_events))
        .route("/api/history", get(list_history))
}

/// GET /api/events - List events, optionally filtered
async fn list_events(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<EventQuery>,
) -> Result<Json<Vec<Event>>, AppError> {
    let filter = EventFilter::from_query(&query)?;
    let events = state.store().list(&filter).await?;
    Ok(Json(events))
}

/// GET /api/history - Revision history of every event
async fn list_history(State(state): State<AppState>) -> Result<Json<Vec<EventHistory>>, AppError> {
    Ok(Json(state.store().history().await?))
}
