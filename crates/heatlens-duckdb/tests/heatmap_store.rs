use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;

use heatlens_artifacts::NullArtifactLocator;
use heatlens_core::event::{CapturedEvent, PageUrl};
use heatlens_core::heatmap::HeatmapQuery;
use heatlens_core::search::{EventCriterion, SearchSpec, SessionFilter};
use heatlens_core::session::{SessionRecord, ISSUE_MOB_FILE_NOT_FOUND};
use heatlens_core::store::HeatmapStore;
use heatlens_core::HeatmapService;
use heatlens_duckdb::DuckDbStore;

const PROJECT: u32 = 42;
const WINDOW_START: i64 = 1_700_000_000_000;
const WINDOW_END: i64 = 1_700_003_600_000;

fn pricing_page() -> PageUrl {
    PageUrl::parse("https://shop.example.com/pricing").expect("url")
}

fn session_record(session_id: u64, duration: i64, events_count: i64) -> SessionRecord {
    SessionRecord {
        project_id: PROJECT,
        session_id,
        platform: "desktop".to_string(),
        start_ts: WINDOW_START,
        duration,
        events_count,
    }
}

/// Seed a session row plus one LOCATION event so the normalized search
/// spec's match-any location criterion is satisfiable.
async fn seed_session(db: &DuckDbStore, session_id: u64, duration: i64, platform: &str) {
    let mut record = session_record(session_id, duration, 5);
    record.platform = platform.to_string();
    db.insert_sessions(&[record]).await.expect("session");
    db.insert_events(&[CapturedEvent::location(
        PROJECT,
        session_id,
        1_000 + session_id,
        WINDOW_START + 1,
        &pricing_page(),
    )])
    .await
    .expect("location event");
}

fn pricing_click(
    session_id: u64,
    message_id: u64,
    timestamp: i64,
    selector: &str,
    x: Option<f64>,
    y: Option<f64>,
) -> CapturedEvent {
    CapturedEvent::click(
        PROJECT,
        session_id,
        message_id,
        timestamp,
        &pricing_page(),
        selector,
        x,
        y,
    )
}

#[tokio::test]
async fn pricing_scenario_points_and_selectors() {
    let db = DuckDbStore::open_in_memory().expect("db");
    db.insert_sessions(&[session_record(1, 60_000, 5)])
        .await
        .expect("session");
    db.insert_events(&[
        pricing_click(1, 1, WINDOW_START + 10, "button.buy", Some(0.1), Some(0.2)),
        pricing_click(1, 2, WINDOW_START + 20, "button.buy", Some(0.5), Some(0.5)),
        pricing_click(1, 3, WINDOW_START + 30, "button.buy", None, Some(0.3)),
        pricing_click(1, 4, WINDOW_START + 40, "a.nav", Some(0.9), Some(0.9)),
        pricing_click(1, 5, WINDOW_START + 50, "a.nav", Some(0.5), Some(0.5)),
    ])
    .await
    .expect("events");

    let points = db
        .click_points(
            PROJECT,
            &HeatmapQuery::new("/pricing", WINDOW_START, WINDOW_END),
        )
        .await
        .expect("points");
    assert_eq!(points.len(), 4, "null-x click excluded");

    let frequencies = db
        .selector_frequencies(PROJECT, 1, "/pricing")
        .await
        .expect("selectors");
    assert_eq!(frequencies[0].selector, "button.buy");
    assert_eq!(frequencies[0].count, 3);
    let total: i64 = frequencies.iter().map(|f| f.count).sum();
    assert_eq!(total, 5, "count sum equals matching clicks");
    for pair in frequencies.windows(2) {
        assert!(pair[0].count >= pair[1].count, "non-increasing by count");
    }
}

#[tokio::test]
async fn windowed_points_are_capped_at_500() {
    let db = DuckDbStore::open_in_memory().expect("db");
    db.insert_sessions(&[session_record(1, 60_000, 520)])
        .await
        .expect("session");
    let events: Vec<CapturedEvent> = (0..520)
        .map(|i| pricing_click(1, i, WINDOW_START + i as i64, "button.buy", Some(0.5), Some(0.5)))
        .collect();
    db.insert_events(&events).await.expect("events");

    let points = db
        .click_points(
            PROJECT,
            &HeatmapQuery::new("/pricing", WINDOW_START, WINDOW_END),
        )
        .await
        .expect("points");
    assert_eq!(points.len(), 500);
}

#[tokio::test]
async fn url_matches_hostpath_or_path() {
    let db = DuckDbStore::open_in_memory().expect("db");
    db.insert_sessions(&[session_record(1, 60_000, 1)])
        .await
        .expect("session");
    db.insert_events(&[pricing_click(1, 1, WINDOW_START, "button.buy", Some(0.5), Some(0.5))])
        .await
        .expect("events");

    for url in ["/pricing", "shop.example.com/pricing"] {
        let points = db
            .click_points(PROJECT, &HeatmapQuery::new(url, WINDOW_START, WINDOW_END))
            .await
            .expect("points");
        assert_eq!(points.len(), 1, "match via either representation: {url}");
    }

    let points = db
        .click_points(
            PROJECT,
            &HeatmapQuery::new("/other", WINDOW_START, WINDOW_END),
        )
        .await
        .expect("points");
    assert!(points.is_empty());
}

#[tokio::test]
async fn window_bounds_are_inclusive() {
    let db = DuckDbStore::open_in_memory().expect("db");
    db.insert_sessions(&[session_record(1, 60_000, 4)])
        .await
        .expect("session");
    db.insert_events(&[
        pricing_click(1, 1, WINDOW_START - 1, "a", Some(0.1), Some(0.1)),
        pricing_click(1, 2, WINDOW_START, "a", Some(0.2), Some(0.2)),
        pricing_click(1, 3, WINDOW_END, "a", Some(0.3), Some(0.3)),
        pricing_click(1, 4, WINDOW_END + 1, "a", Some(0.4), Some(0.4)),
    ])
    .await
    .expect("events");

    let points = db
        .click_points(
            PROJECT,
            &HeatmapQuery::new("/pricing", WINDOW_START, WINDOW_END),
        )
        .await
        .expect("points");
    assert_eq!(points.len(), 2, "boundary timestamps included, outside excluded");
}

#[tokio::test]
async fn click_rage_keeps_issueless_sessions_and_rage_sessions() {
    let db = DuckDbStore::open_in_memory().expect("db");
    for sid in 1..=4u64 {
        db.insert_sessions(&[session_record(sid, 60_000, 2)])
            .await
            .expect("session");
        db.insert_events(&[pricing_click(sid, 1, WINDOW_START + 5, "a", Some(0.5), Some(0.5))])
            .await
            .expect("click");
    }

    let rage_issue = uuid::Uuid::new_v4().to_string();
    let dead_issue = uuid::Uuid::new_v4().to_string();
    let late_rage_issue = uuid::Uuid::new_v4().to_string();
    db.insert_issue(PROJECT, &rage_issue, "click_rage")
        .await
        .expect("issue");
    db.insert_issue(PROJECT, &dead_issue, "dead_click")
        .await
        .expect("issue");
    db.insert_issue(PROJECT, &late_rage_issue, "click_rage")
        .await
        .expect("issue");

    // Session 1: no issue data. Session 2: click-rage inside the window.
    // Session 3: a different issue kind. Session 4: click-rage outside the
    // window.
    db.insert_events(&[
        CapturedEvent::issue(PROJECT, 2, 10, WINDOW_START + 6, &rage_issue),
        CapturedEvent::issue(PROJECT, 3, 11, WINDOW_START + 7, &dead_issue),
        CapturedEvent::issue(PROJECT, 4, 12, WINDOW_END + 500, &late_rage_issue),
    ])
    .await
    .expect("issues");

    let plain = db
        .click_points(
            PROJECT,
            &HeatmapQuery::new("/pricing", WINDOW_START, WINDOW_END),
        )
        .await
        .expect("points");
    assert_eq!(plain.len(), 4);

    let raged = db
        .click_points(
            PROJECT,
            &HeatmapQuery::new("/pricing", WINDOW_START, WINDOW_END).with_click_rage(),
        )
        .await
        .expect("points");
    assert_eq!(
        raged.len(),
        2,
        "no-issue session passes, in-window click-rage passes, others drop"
    );
}

#[tokio::test]
async fn session_scoped_points_ignore_time_window() {
    let db = DuckDbStore::open_in_memory().expect("db");
    db.insert_sessions(&[session_record(1, 60_000, 1)])
        .await
        .expect("session");
    // Click recorded long before the heatmap window.
    db.insert_events(&[pricing_click(1, 1, WINDOW_START - 86_400_000, "a", Some(0.5), Some(0.5))])
        .await
        .expect("events");

    let windowed = db
        .click_points(
            PROJECT,
            &HeatmapQuery::new("/pricing", WINDOW_START, WINDOW_END),
        )
        .await
        .expect("points");
    assert!(windowed.is_empty());

    let scoped = db
        .click_points_for_session(PROJECT, 1, "/pricing")
        .await
        .expect("points");
    assert_eq!(scoped.len(), 1);
}

#[tokio::test]
async fn selector_frequencies_skip_selectorless_clicks() {
    let db = DuckDbStore::open_in_memory().expect("db");
    db.insert_sessions(&[session_record(1, 60_000, 2)])
        .await
        .expect("session");
    let mut anonymous = pricing_click(1, 1, WINDOW_START, "placeholder", Some(0.5), Some(0.5));
    anonymous.selector = None;
    db.insert_events(&[
        anonymous,
        pricing_click(1, 2, WINDOW_START + 1, "button.buy", Some(0.5), Some(0.5)),
    ])
    .await
    .expect("events");

    let frequencies = db
        .selector_frequencies(PROJECT, 1, "/pricing")
        .await
        .expect("selectors");
    assert_eq!(frequencies.len(), 1);
    assert_eq!(frequencies[0].selector, "button.buy");
}

fn selection_spec() -> SearchSpec {
    SearchSpec::new(WINDOW_START - 1_000, WINDOW_END).normalized_for_selection()
}

#[tokio::test]
async fn search_defaults_to_desktop_platform() {
    let db = DuckDbStore::open_in_memory().expect("db");
    seed_session(&db, 1, 60_000, "desktop").await;
    seed_session(&db, 2, 90_000, "mobile").await;

    let sessions = db
        .search_sessions(&selection_spec(), PROJECT, 7, 20, &HashSet::new())
        .await
        .expect("search");
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].session_id, 1);
}

#[tokio::test]
async fn search_honours_explicit_platform_filter() {
    let db = DuckDbStore::open_in_memory().expect("db");
    seed_session(&db, 1, 60_000, "desktop").await;
    seed_session(&db, 2, 90_000, "mobile").await;

    let mut spec = SearchSpec::new(WINDOW_START - 1_000, WINDOW_END);
    spec.filters.push(SessionFilter::platform(&["mobile"]));
    let sessions = db
        .search_sessions(
            &spec.normalized_for_selection(),
            PROJECT,
            7,
            20,
            &HashSet::new(),
        )
        .await
        .expect("search");
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].session_id, 2);
}

#[tokio::test]
async fn search_excludes_zero_event_sessions() {
    let db = DuckDbStore::open_in_memory().expect("db");
    seed_session(&db, 1, 60_000, "desktop").await;
    // Session row claims zero interaction events.
    let mut empty = session_record(2, 90_000, 0);
    empty.platform = "desktop".to_string();
    db.insert_sessions(&[empty]).await.expect("session");
    db.insert_events(&[CapturedEvent::location(
        PROJECT,
        2,
        1_002,
        WINDOW_START + 1,
        &pricing_page(),
    )])
    .await
    .expect("location");

    let sessions = db
        .search_sessions(&selection_spec(), PROJECT, 7, 20, &HashSet::new())
        .await
        .expect("search");
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].session_id, 1);
}

#[tokio::test]
async fn search_location_criterion_filters_by_path() {
    let db = DuckDbStore::open_in_memory().expect("db");
    seed_session(&db, 1, 60_000, "desktop").await; // /pricing
    let mut other = session_record(2, 90_000, 5);
    other.platform = "desktop".to_string();
    db.insert_sessions(&[other]).await.expect("session");
    db.insert_events(&[CapturedEvent::location(
        PROJECT,
        2,
        1_002,
        WINDOW_START + 1,
        &PageUrl::parse("https://shop.example.com/home").expect("url"),
    )])
    .await
    .expect("location");

    let mut spec = SearchSpec::new(WINDOW_START - 1_000, WINDOW_END);
    spec.events.push(EventCriterion::location_is(&["/pricing"]));
    let sessions = db
        .search_sessions(
            &spec.normalized_for_selection(),
            PROJECT,
            7,
            20,
            &HashSet::new(),
        )
        .await
        .expect("search");
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].session_id, 1);

    let mut contains = SearchSpec::new(WINDOW_START - 1_000, WINDOW_END);
    contains.events.push(EventCriterion {
        kind: heatlens_core::search::CriterionType::Location,
        values: vec!["ome".to_string()],
        operator: heatlens_core::search::CriterionOperator::Contains,
    });
    let sessions = db
        .search_sessions(
            &contains.normalized_for_selection(),
            PROJECT,
            7,
            20,
            &HashSet::new(),
        )
        .await
        .expect("search");
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].session_id, 2);
}

#[tokio::test]
async fn search_skips_excluded_sessions() {
    let db = DuckDbStore::open_in_memory().expect("db");
    seed_session(&db, 1, 60_000, "desktop").await;
    seed_session(&db, 2, 90_000, "desktop").await;

    let excluded: HashSet<u64> = [2u64].into_iter().collect();
    let sessions = db
        .search_sessions(&selection_spec(), PROJECT, 7, 20, &excluded)
        .await
        .expect("search");
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].session_id, 1);
}

#[tokio::test]
async fn search_orders_by_duration_desc_and_limits() {
    let db = DuckDbStore::open_in_memory().expect("db");
    for sid in 1..=25u64 {
        seed_session(&db, sid, sid as i64 * 1_000, "desktop").await;
    }

    let sessions = db
        .search_sessions(&selection_spec(), PROJECT, 7, 20, &HashSet::new())
        .await
        .expect("search");
    assert_eq!(sessions.len(), 20);
    assert_eq!(sessions[0].session_id, 25, "longest first");
    for pair in sessions.windows(2) {
        assert!(pair[0].duration >= pair[1].duration);
    }
    // The five shortest sessions fall outside the candidate window.
    assert!(sessions.iter().all(|s| s.session_id > 5));
}

#[tokio::test]
async fn search_bookmarked_scopes_to_user() {
    let db = DuckDbStore::open_in_memory().expect("db");
    seed_session(&db, 1, 60_000, "desktop").await;
    seed_session(&db, 2, 90_000, "desktop").await;
    db.add_bookmark(7, PROJECT, 2).await.expect("bookmark");

    let mut spec = SearchSpec::new(WINDOW_START - 1_000, WINDOW_END);
    spec.bookmarked = true;
    let sessions = db
        .search_sessions(
            &spec.normalized_for_selection(),
            PROJECT,
            7,
            20,
            &HashSet::new(),
        )
        .await
        .expect("search");
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].session_id, 2);

    // A different user has no bookmarks.
    let sessions = db
        .search_sessions(
            &spec.normalized_for_selection(),
            PROJECT,
            8,
            20,
            &HashSet::new(),
        )
        .await
        .expect("search");
    assert!(sessions.is_empty());
}

#[tokio::test]
async fn search_respects_time_range() {
    let db = DuckDbStore::open_in_memory().expect("db");
    seed_session(&db, 1, 60_000, "desktop").await;

    let mut spec = SearchSpec::new(WINDOW_START + 10_000, WINDOW_END);
    spec = spec.normalized_for_selection();
    let sessions = db
        .search_sessions(&spec, PROJECT, 7, 20, &HashSet::new())
        .await
        .expect("search");
    assert!(sessions.is_empty(), "session started before the range");
}

#[tokio::test]
async fn navigation_events_ordered_by_timestamp_then_message_id() {
    let db = DuckDbStore::open_in_memory().expect("db");
    db.insert_sessions(&[session_record(1, 60_000, 3)])
        .await
        .expect("session");
    let page = pricing_page();
    db.insert_events(&[
        CapturedEvent::location(PROJECT, 1, 2, WINDOW_START + 100, &page),
        CapturedEvent::location(PROJECT, 1, 1, WINDOW_START + 100, &page),
        CapturedEvent::location(PROJECT, 1, 9, WINDOW_START + 50, &page),
    ])
    .await
    .expect("locations");

    let events = db.navigation_events(1).await.expect("events");
    let ids: Vec<u64> = events.iter().map(|e| e.message_id).collect();
    assert_eq!(ids, vec![9, 1, 2]);
    assert!(events.iter().all(|e| e.event_type == "LOCATION"));
    assert!(events.iter().all(|e| e.value == e.path && e.url == e.path));
    assert_eq!(events[0].host, "shop.example.com");
}

#[tokio::test]
async fn session_by_id_round_trip() {
    let db = DuckDbStore::open_in_memory().expect("db");
    seed_session(&db, 1, 60_000, "desktop").await;

    let found = db.session_by_id(PROJECT, 1).await.expect("lookup");
    let summary = found.expect("present");
    assert_eq!(summary.project_id, PROJECT);
    assert_eq!(summary.start_ts, WINDOW_START);
    assert_eq!(summary.duration, 60_000);

    assert!(db.session_by_id(PROJECT, 99).await.expect("lookup").is_none());
    assert!(db.session_by_id(7, 1).await.expect("lookup").is_none());
}

#[tokio::test]
async fn service_end_to_end_degrades_without_artifacts() {
    let db = Arc::new(DuckDbStore::open_in_memory().expect("db"));
    let now = Utc::now().timestamp_millis();
    for sid in 1..=2u64 {
        let record = SessionRecord {
            project_id: PROJECT,
            session_id: sid,
            platform: "desktop".to_string(),
            start_ts: now - 60_000,
            duration: sid as i64 * 30_000,
            events_count: 3,
        };
        db.insert_sessions(&[record]).await.expect("session");
        db.insert_events(&[CapturedEvent::location(
            PROJECT,
            sid,
            1,
            now - 59_000,
            &pricing_page(),
        )])
        .await
        .expect("location");
    }

    let service = HeatmapService::new(db.clone(), Arc::new(NullArtifactLocator));
    let spec = SearchSpec::new(now - 3_600_000, now);

    let enriched = service
        .select_representative_session(&spec, PROJECT, 7, true, &HashSet::new(), 1)
        .await
        .expect("select")
        .expect("degraded success");
    assert!(enriched.dom_urls.is_empty());
    assert!(enriched.issue.is_none());
    assert!(!enriched.events.is_empty());

    let selected = service
        .selected_session(PROJECT, enriched.session.session_id)
        .await
        .expect("lookup")
        .expect("present");
    assert_eq!(selected.issue.as_deref(), Some(ISSUE_MOB_FILE_NOT_FOUND));

    // Unchanged backend: identical result on repeat.
    let again = service
        .selected_session(PROJECT, enriched.session.session_id)
        .await
        .expect("lookup");
    assert_eq!(Some(selected), again);
}
