//! Behaviour every `EventStore` adapter must share. Each adapter's test
//! module calls these against its own instance.

use super::EventStore;
use crate::error::CalendarError;
use crate::event::{EventType, FIRST_EVENT_ID, Grades};
use crate::filter::{EventFilter, EventQuery, EventSort};
use crate::history::RevisionAction;
use crate::input::{EventDraft, EventInput};

pub fn draft(title: &str, start: &str) -> EventDraft {
    EventInput {
        start: Some(start.to_string()),
        title_zh: Some(title.to_string()),
        ..Default::default()
    }
    .validate()
    .unwrap()
}

pub async fn create_then_list(store: &dyn EventStore) {
    let first = store.create(&draft("開學典禮", "2025-09-01")).await.unwrap();
    let second = store.create(&draft("段考", "2025-10-14")).await.unwrap();

    assert_eq!(first.id, FIRST_EVENT_ID);
    assert_eq!(second.id, FIRST_EVENT_ID + 1);

    let events = store.list(&EventFilter::all()).await.unwrap();
    assert_eq!(events, vec![first.clone(), second]);
    assert_eq!(events[0].title.en, "");
    assert_eq!(events[0].grade, Grades::all());

    assert_eq!(store.get(first.id).await.unwrap(), Some(first.clone()));

    let history = store.history().await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].event_id, first.id);
    assert_eq!(history[0].revisions[0].action, RevisionAction::Create);
    assert_eq!(history[0].revisions[0].details, "Created: 開學典禮");
}

pub async fn update_replaces_fields(store: &dyn EventStore) {
    let created = store.create(&draft("段考", "2025-10-14")).await.unwrap();

    let replacement = EventInput {
        start: Some("2025-10-15".to_string()),
        end: Some("2025-10-16".to_string()),
        title_zh: Some("第一次段考".to_string()),
        title_en: Some("First Midterm".to_string()),
        kind: Some("important-exam".to_string()),
        grade: vec!["grade-1".to_string(), "grade-2".to_string()],
        link: Some("https://example.com/exam".to_string()),
        ..Default::default()
    }
    .validate()
    .unwrap();

    let updated = store.update(created.id, &replacement).await.unwrap();
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.title.zh, "第一次段考");
    assert_eq!(updated.kind, EventType::ImportantExam);
    assert_eq!(updated.grade.to_joined(), "grade-1,grade-2");

    assert_eq!(store.get(created.id).await.unwrap(), Some(updated));

    let history = store.history().await.unwrap();
    let revisions = &history[0].revisions;
    assert_eq!(revisions.len(), 2);
    assert_eq!(revisions[1].action, RevisionAction::Update);
    assert_eq!(
        revisions[1].details,
        "Updated: start, end, title.zh, title.en, type, grade, link"
    );
}

pub async fn unknown_ids_are_not_found(store: &dyn EventStore) {
    assert!(matches!(
        store.update(42, &draft("段考", "2025-10-14")).await,
        Err(CalendarError::EventNotFound(42))
    ));
    assert!(matches!(
        store.delete(42).await,
        Err(CalendarError::EventNotFound(42))
    ));
    assert_eq!(store.get(42).await.unwrap(), None);
    assert!(store.history().await.unwrap().is_empty());
}

pub async fn delete_removes_event_but_keeps_history(store: &dyn EventStore) {
    let keep = store.create(&draft("開學典禮", "2025-09-01")).await.unwrap();
    let gone = store.create(&draft("段考", "2025-10-14")).await.unwrap();

    let removed = store.delete(gone.id).await.unwrap();
    assert_eq!(removed, gone);

    let events = store.list(&EventFilter::all()).await.unwrap();
    assert_eq!(events, vec![keep]);

    let history = store.history().await.unwrap();
    let gone_history = history.iter().find(|h| h.event_id == gone.id).unwrap();
    let actions: Vec<_> = gone_history.revisions.iter().map(|r| r.action).collect();
    assert_eq!(actions, [RevisionAction::Create, RevisionAction::Delete]);
}

pub async fn ids_are_not_reused_after_delete(store: &dyn EventStore) {
    let first = store.create(&draft("開學典禮", "2025-09-01")).await.unwrap();
    store.delete(first.id).await.unwrap();

    let next = store.create(&draft("段考", "2025-10-14")).await.unwrap();
    assert_eq!(next.id, first.id + 1);
}

pub async fn clear_resets_ids_and_history(store: &dyn EventStore) {
    store.create(&draft("開學典禮", "2025-09-01")).await.unwrap();
    store.create(&draft("段考", "2025-10-14")).await.unwrap();

    store.clear().await.unwrap();
    assert!(store.list(&EventFilter::all()).await.unwrap().is_empty());
    assert!(store.history().await.unwrap().is_empty());

    let next = store.create(&draft("寒假", "2026-01-20")).await.unwrap();
    assert_eq!(next.id, FIRST_EVENT_ID);
}

pub async fn list_filters_and_sorts(store: &dyn EventStore) {
    let winter = EventInput {
        start: Some("2026-01-20".to_string()),
        end: Some("2026-02-10".to_string()),
        title_zh: Some("寒假".to_string()),
        title_en: Some("Winter Break".to_string()),
        kind: Some("holiday".to_string()),
        ..Default::default()
    }
    .validate()
    .unwrap();
    let exam = EventInput {
        start: Some("2025-10-14".to_string()),
        title_zh: Some("段考".to_string()),
        kind: Some("exam".to_string()),
        grade: vec!["grade-3".to_string()],
        ..Default::default()
    }
    .validate()
    .unwrap();

    let winter = store.create(&winter).await.unwrap();
    let exam = store.create(&exam).await.unwrap();

    let by_type = EventFilter::from_query(&EventQuery {
        kind: Some("holiday".to_string()),
        ..Default::default()
    })
    .unwrap();
    assert_eq!(store.list(&by_type).await.unwrap(), vec![winter.clone()]);

    let by_keyword = EventFilter::from_query(&EventQuery {
        search: Some("winter".to_string()),
        ..Default::default()
    })
    .unwrap();
    assert_eq!(store.list(&by_keyword).await.unwrap(), vec![winter.clone()]);

    let by_grade = EventFilter::from_query(&EventQuery {
        grade: Some("grade-3".to_string()),
        ..Default::default()
    })
    .unwrap();
    assert_eq!(store.list(&by_grade).await.unwrap(), vec![exam.clone()]);

    let by_range = EventFilter::from_query(&EventQuery {
        start: Some("2026-02-01".to_string()),
        end: Some("2026-02-28".to_string()),
        ..Default::default()
    })
    .unwrap();
    assert_eq!(store.list(&by_range).await.unwrap(), vec![winter.clone()]);

    let insertion = store.list(&EventFilter::all()).await.unwrap();
    assert_eq!(insertion, vec![winter.clone(), exam.clone()]);

    let by_start = EventFilter::all().sorted_by(EventSort::StartDate);
    assert_eq!(store.list(&by_start).await.unwrap(), vec![exam, winter]);
}
