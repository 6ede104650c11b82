pub mod admin;
pub mod events;

use axum::{
    Json, Router,
    extract::{
        FromRequestParts, Query,
        rejection::{QueryRejection, StringRejection},
    },
    http::{Method, StatusCode, header},
    response::{Html, IntoResponse, Response},
};
use schoolcal_core::CalendarError;
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};

use crate::state::AppState;
use crate::views;

/// All routes, with state and CORS attached
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(events::router())
        .merge(admin::router())
        .with_state(state)
        .layer(cors())
}

/// Browsers on any origin may read the API and submit admin forms
fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

/// Query string extractor that reports rejections as JSON errors
#[derive(FromRequestParts)]
#[from_request(via(Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);

/// Query string extractor that reports rejections as admin error pages
#[derive(FromRequestParts)]
#[from_request(via(Query), rejection(AdminError))]
pub struct AdminQuery<T>(pub T);

/// Standard API error response
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Status and client-facing message for an error. Server-side failures
/// are logged here and hidden behind a generic message.
fn classify(err: &anyhow::Error) -> (StatusCode, String) {
    if let Some(rejection) = err.downcast_ref::<QueryRejection>() {
        return (rejection.status(), rejection.body_text());
    }
    if let Some(rejection) = err.downcast_ref::<StringRejection>() {
        return (rejection.status(), rejection.body_text());
    }

    match err.downcast_ref::<CalendarError>() {
        Some(e) if e.is_validation() => (StatusCode::BAD_REQUEST, e.to_string()),
        Some(e @ CalendarError::EventNotFound(_)) => (StatusCode::NOT_FOUND, e.to_string()),
        _ => {
            tracing::error!(error = %format!("{err:#}"), "request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Server error, please try again later".to_string(),
            )
        }
    }
}

/// Convert errors to JSON responses
pub struct AppError(anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = classify(&self.0);
        (status, Json(ErrorResponse { error })).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

/// Convert errors to HTML pages for the admin interface
pub struct AdminError(anyhow::Error);

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        let (status, message) = classify(&self.0);
        (status, Html(views::message_page(&message))).into_response()
    }
}

impl<E> From<E> for AdminError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
