//! Admin pages and form endpoints

use axum::{
    Router,
    extract::State,
    http::{StatusCode, header},
    response::{Html, IntoResponse},
    routing::{get, post},
};
use schoolcal_core::{CalendarError, EventFilter, EventQuery, EventSort, export};
use serde::Deserialize;

use crate::form::{FormFields, parse_id};
use crate::routes::{AdminError, AdminQuery};
use crate::state::AppState;
use crate::views::{self, AdminView, Page};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin", get(admin_page))
        .route("/admin/add", post(add_event))
        .route("/admin/update", get(edit_page).post(update_event))
        .route("/admin/update/save", post(update_event))
        .route("/admin/delete", post(delete_event))
        .route("/admin/clear", post(clear_events))
        .route("/admin/export.csv", get(export_csv))
}

#[derive(Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

#[derive(Deserialize)]
pub struct IdQuery {
    pub id: Option<String>,
}

/// GET /admin - Filterable, paginated event list with the add form
async fn admin_page(
    State(state): State<AppState>,
    AdminQuery(query): AdminQuery<EventQuery>,
    AdminQuery(page): AdminQuery<PageQuery>,
) -> Result<Html<String>, AdminError> {
    let filter = EventFilter::from_query(&query)?.sorted_by(EventSort::StartDate);
    let events = state.store().list(&filter).await?;

    let requested = page.page.as_deref().and_then(|p| p.trim().parse().ok());
    let page = Page::new(requested, events.len());

    Ok(Html(views::admin_page(&AdminView {
        events: page.slice(&events),
        query: &query,
        page,
    })))
}

/// POST /admin/add - Create an event
async fn add_event(
    State(state): State<AppState>,
    form: FormFields,
) -> Result<impl IntoResponse, AdminError> {
    let draft = form.event_input().validate()?;
    let event = state.store().create(&draft).await?;
    tracing::info!(id = event.id, title = %event.title.zh, "event created");

    Ok((
        StatusCode::CREATED,
        Html(views::message_page("事件新增成功！請重新整理頁面以查看更新。")),
    ))
}

/// GET /admin/update?id= - Edit form for one event
async fn edit_page(
    State(state): State<AppState>,
    AdminQuery(query): AdminQuery<IdQuery>,
) -> Result<Html<String>, AdminError> {
    let id = parse_id(query.id.as_deref())?;
    let event = state
        .store()
        .get(id)
        .await?
        .ok_or(CalendarError::EventNotFound(id))?;
    Ok(Html(views::edit_page(&event)))
}

/// POST /admin/update, /admin/update/save - Replace an event's fields
async fn update_event(
    State(state): State<AppState>,
    form: FormFields,
) -> Result<Html<String>, AdminError> {
    let id = form.id()?;
    let draft = form.event_input().validate()?;
    let event = state.store().update(id, &draft).await?;
    tracing::info!(id = event.id, "event updated");

    Ok(Html(views::message_page("事件更新成功！")))
}

/// POST /admin/delete - Delete one event
async fn delete_event(
    State(state): State<AppState>,
    form: FormFields,
) -> Result<Html<String>, AdminError> {
    let id = form.id()?;
    let event = state.store().delete(id).await?;
    tracing::info!(id = event.id, "event deleted");

    Ok(Html(views::message_page(&format!(
        "已刪除事件：{}",
        event.title.zh
    ))))
}

/// POST /admin/clear - Delete every event and restart ids
async fn clear_events(State(state): State<AppState>) -> Result<Html<String>, AdminError> {
    state.store().clear().await?;
    tracing::info!("all events cleared");

    Ok(Html(views::message_page("已清除所有事件。")))
}

/// GET /admin/export.csv - Filtered events as CSV, by start date
async fn export_csv(
    State(state): State<AppState>,
    AdminQuery(query): AdminQuery<EventQuery>,
) -> Result<impl IntoResponse, AdminError> {
    let filter = EventFilter::from_query(&query)?.sorted_by(EventSort::StartDate);
    let events = state.store().list(&filter).await?;
    let csv = export::to_csv(&events)?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"events.csv\"",
            ),
        ],
        csv,
    ))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use crate::routes::test_support::{get, get_json, post_form, test_app};

    const OPENING: &str =
        "start=2025-09-01&title_zh=%E9%96%8B%E5%AD%B8%E5%85%B8%E7%A6%AE&type=school-activity";

    #[tokio::test]
    async fn add_returns_created_page() {
        let app = test_app().await;
        let (status, body) = post_form(&app, "/admin/add", OPENING).await;
        assert_eq!(status, StatusCode::CREATED);
        assert!(body.contains("事件新增成功"));
        assert!(body.contains("href=\"/admin\""));
    }

    #[tokio::test]
    async fn add_rejects_invalid_input() {
        let app = test_app().await;
        for body in [
            "title_zh=%E6%AE%B5%E8%80%83",
            "start=2025-09-01",
            "start=2025-09-01&title_zh=+++",
            "start=2025-09-02&end=2025-09-01&title_zh=x",
            "start=2025-09-01&title_zh=x&grade=grade-9",
            "start=2025-09-01&title_zh=x&type=party",
        ] {
            let (status, page) = post_form(&app, "/admin/add", body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{body} should be rejected");
            assert!(page.contains("href=\"/admin\""));
        }
        assert_eq!(get_json(&app, "/api/events").await, serde_json::json!([]));
    }

    #[tokio::test]
    async fn add_accepts_multiple_grades() {
        let app = test_app().await;
        post_form(
            &app,
            "/admin/add",
            "start=2025-09-01&title_zh=x&grade%5B%5D=grade-3&grade%5B%5D=grade-1",
        )
        .await;
        let events = get_json(&app, "/api/events").await;
        assert_eq!(events[0]["grade"], serde_json::json!(["grade-1", "grade-3"]));
    }

    #[tokio::test]
    async fn update_replaces_event() {
        let app = test_app().await;
        post_form(&app, "/admin/add", OPENING).await;

        let (status, _) = post_form(
            &app,
            "/admin/update/save",
            "id=1&start=2025-09-02&end=2025-09-03&title_zh=%E9%96%8B%E5%AD%B8&title_en=Opening&type=announcement&grade=grade-1&link=https%3A%2F%2Fexample.com",
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let events = get_json(&app, "/api/events").await;
        assert_eq!(events[0]["start"], "2025-09-02");
        assert_eq!(events[0]["end"], "2025-09-03");
        assert_eq!(events[0]["title"]["en"], "Opening");
        assert_eq!(events[0]["type"], "announcement");
        assert_eq!(events[0]["link"], "https://example.com");
    }

    #[tokio::test]
    async fn update_unknown_id_is_not_found() {
        let app = test_app().await;
        let (status, _) =
            post_form(&app, "/admin/update", "id=99&start=2025-09-01&title_zh=x").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn update_validates_fields() {
        let app = test_app().await;
        post_form(&app, "/admin/add", OPENING).await;

        let (status, _) = post_form(
            &app,
            "/admin/update",
            "id=1&start=2025-09-05&end=2025-09-01&title_zh=x",
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = post_form(&app, "/admin/update", "start=2025-09-01&title_zh=x").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn delete_contract() {
        let app = test_app().await;
        post_form(&app, "/admin/add", OPENING).await;

        let (status, _) = post_form(&app, "/admin/delete", "").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = post_form(&app, "/admin/delete", "id=2").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = post_form(&app, "/admin/delete", "id=1").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("開學典禮"));
        assert_eq!(get_json(&app, "/api/events").await, serde_json::json!([]));

        let (status, _) = post_form(&app, "/admin/delete", "id=1").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn clear_restarts_ids() {
        let app = test_app().await;
        post_form(&app, "/admin/add", OPENING).await;
        post_form(&app, "/admin/add", OPENING).await;

        let (status, _) = post_form(&app, "/admin/clear", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(get_json(&app, "/api/events").await, serde_json::json!([]));

        post_form(&app, "/admin/add", OPENING).await;
        let events = get_json(&app, "/api/events").await;
        assert_eq!(events[0]["id"], 1);
    }

    #[tokio::test]
    async fn admin_page_lists_by_start_date() {
        let app = test_app().await;
        post_form(&app, "/admin/add", "start=2025-12-01&title_zh=LATER").await;
        post_form(&app, "/admin/add", "start=2025-09-01&title_zh=EARLIER").await;

        let (status, html) = get(&app, "/admin").await;
        assert_eq!(status, StatusCode::OK);
        let earlier = html.find("EARLIER").unwrap();
        let later = html.find("LATER").unwrap();
        assert!(earlier < later);
        assert!(html.contains("action=\"/admin/add\""));
    }

    #[tokio::test]
    async fn admin_page_paginates_and_filters() {
        let app = test_app().await;
        for day in 1..=25 {
            post_form(
                &app,
                "/admin/add",
                &format!("start=2025-10-{day:02}&title_zh=EVENT-{day:02}"),
            )
            .await;
        }

        let (_, first) = get(&app, "/admin").await;
        assert!(first.contains("EVENT-20"));
        assert!(!first.contains("EVENT-21"));
        assert!(first.contains("page=2"));

        let (_, second) = get(&app, "/admin?page=2").await;
        assert!(second.contains("EVENT-21"));
        assert!(!second.contains("EVENT-20"));

        let (_, filtered) = get(&app, "/admin?search=event-07").await;
        assert!(filtered.contains("EVENT-07"));
        assert!(!filtered.contains("EVENT-08"));

        let (status, _) = get(&app, "/admin?start=2025-10-05&end=2025-10-01").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn malformed_query_is_an_html_error() {
        let app = test_app().await;
        for uri in ["/admin?page=1&page=2", "/admin/export.csv?type=a&type=b"] {
            let (status, body) = get(&app, uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert!(body.contains("href=\"/admin\""), "{uri}");
        }
    }

    #[tokio::test]
    async fn edit_page_contract() {
        let app = test_app().await;
        post_form(&app, "/admin/add", OPENING).await;

        let (status, html) = get(&app, "/admin/update?id=1").await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("value=\"開學典禮\""));

        let (status, _) = get(&app, "/admin/update?id=5").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = get(&app, "/admin/update").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn export_csv_includes_filtered_events() {
        let app = test_app().await;
        post_form(&app, "/admin/add", "start=2025-12-01&title_zh=LATER&type=holiday").await;
        post_form(&app, "/admin/add", "start=2025-09-01&title_zh=EARLIER").await;

        let (status, csv) = get(&app, "/admin/export.csv").await;
        assert_eq!(status, StatusCode::OK);
        let lines: Vec<&str> = csv.trim_start_matches('\u{feff}').lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("id,start,end"));
        assert!(lines[1].contains("EARLIER"));
        assert!(lines[2].contains("LATER"));

        let (_, holidays) = get(&app, "/admin/export.csv?type=holiday").await;
        assert_eq!(holidays.lines().count(), 2);
    }
}
