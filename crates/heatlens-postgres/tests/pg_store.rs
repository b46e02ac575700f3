//! Live-database smoke tests.
//!
//! Run with a throwaway PostgreSQL instance:
//! `HEATLENS_TEST_DATABASE_URL=postgres://... cargo test -p heatlens-postgres -- --ignored`
//!
//! Each test uses a random project id (and session ids derived from it) so
//! repeated runs against the same database do not interfere.

use std::collections::HashSet;

use heatlens_core::event::{CapturedEvent, PageUrl};
use heatlens_core::heatmap::HeatmapQuery;
use heatlens_core::search::SearchSpec;
use heatlens_core::session::SessionRecord;
use heatlens_core::store::HeatmapStore;
use heatlens_postgres::PgStore;

const WINDOW_START: i64 = 1_700_000_000_000;
const WINDOW_END: i64 = 1_700_003_600_000;

async fn connect() -> PgStore {
    let url = std::env::var("HEATLENS_TEST_DATABASE_URL")
        .expect("HEATLENS_TEST_DATABASE_URL must point at a throwaway database");
    let store = PgStore::connect(&url).await.expect("connect");
    store.ensure_schema().await.expect("schema");
    store
}

fn random_project() -> u32 {
    // uuid's random bytes double as a cheap unique project id source.
    let bytes = *uuid::Uuid::new_v4().as_bytes();
    u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) % 1_000_000 + 1_000
}

fn pricing_page() -> PageUrl {
    PageUrl::parse("https://shop.example.com/pricing").expect("url")
}

/// Session ids are globally unique in the schema, so derive them from the
/// random project id to keep reruns against a shared database clean.
fn session_base(project: u32) -> u64 {
    project as u64 * 100
}

#[tokio::test]
#[ignore]
async fn pricing_scenario_round_trip() {
    let store = connect().await;
    let project = random_project();
    let session = session_base(project) + 1;

    store
        .insert_sessions(&[SessionRecord {
            project_id: project,
            session_id: session,
            platform: "desktop".to_string(),
            start_ts: WINDOW_START,
            duration: 60_000,
            events_count: 5,
        }])
        .await
        .expect("session");

    let page = pricing_page();
    let clicks: Vec<CapturedEvent> = [
        (1u64, "button.buy", Some(0.1), Some(0.2)),
        (2, "button.buy", Some(0.5), Some(0.5)),
        (3, "button.buy", None, Some(0.3)),
        (4, "a.nav", Some(0.9), Some(0.9)),
        (5, "a.nav", Some(0.5), Some(0.5)),
    ]
    .into_iter()
    .map(|(mid, selector, x, y)| {
        CapturedEvent::click(
            project,
            session,
            mid,
            WINDOW_START + mid as i64,
            &page,
            selector,
            x,
            y,
        )
    })
    .collect();
    store.insert_events(&clicks).await.expect("events");

    let points = store
        .click_points(
            project,
            &HeatmapQuery::new("/pricing", WINDOW_START, WINDOW_END),
        )
        .await
        .expect("points");
    assert_eq!(points.len(), 4);

    let frequencies = store
        .selector_frequencies(project, session, "/pricing")
        .await
        .expect("selectors");
    assert_eq!(frequencies[0].selector, "button.buy");
    assert_eq!(frequencies[0].count, 3);
}

#[tokio::test]
#[ignore]
async fn normalized_search_and_lookup_round_trip() {
    let store = connect().await;
    let project = random_project();
    let base = session_base(project);
    let page = pricing_page();

    for offset in 1..=2u64 {
        let sid = base + offset;
        store
            .insert_sessions(&[SessionRecord {
                project_id: project,
                session_id: sid,
                platform: if offset == 1 { "desktop" } else { "mobile" }.to_string(),
                start_ts: WINDOW_START,
                duration: offset as i64 * 30_000,
                events_count: 3,
            }])
            .await
            .expect("session");
        store
            .insert_events(&[CapturedEvent::location(
                project,
                sid,
                1,
                WINDOW_START + 1,
                &page,
            )])
            .await
            .expect("location");
    }

    let spec = SearchSpec::new(WINDOW_START - 1_000, WINDOW_END).normalized_for_selection();
    let sessions = store
        .search_sessions(&spec, project, 7, 20, &HashSet::new())
        .await
        .expect("search");
    assert_eq!(sessions.len(), 1, "default platform filter keeps desktop only");
    assert_eq!(sessions[0].session_id, base + 1);

    let found = store
        .session_by_id(project, base + 1)
        .await
        .expect("lookup")
        .expect("present");
    assert_eq!(found.duration, 30_000);

    let events = store.navigation_events(base + 1).await.expect("events");
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event_type, "LOCATION");
    assert_eq!(events[0].path, "/pricing");
}
