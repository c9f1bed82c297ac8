//! Tests for the occurrence endpoints.

use std::sync::Arc;
use std::time::Duration;

use almanac_engine::CalendarContext;
use almanac_service::feed::HttpFeed;
use salvo::http::StatusCode;
use salvo::test::{ResponseExt, TestClient};
use serde_json::{Value, json};

use crate::app::api::routes;
use crate::calendar_handler::CalendarHandler;

const URL: &str = "http://127.0.0.1:5800/api/schedule/occurrences";

// 2026-01-05 00:00 UTC in milliseconds
const DAY_MS: i64 = 1_767_571_200_000;

fn service(feed: Option<HttpFeed>) -> salvo::Router {
    salvo::Router::new()
        .hoop(CalendarHandler {
            context: Arc::new(CalendarContext::default()),
            feed: feed.map(Arc::new),
        })
        .push(routes().expect("routes build"))
}

fn unreachable_feed() -> HttpFeed {
    HttpFeed::new("http://127.0.0.1:1/events", Duration::from_secs(2)).expect("valid feed")
}

#[test_log::test(tokio::test)]
async fn post_computes_collapsed_entries() {
    let from = DAY_MS / 1_000 + 10 * 3_600;
    let body = json!({
        "events": [
            {
                "eventId": 3,
                "fromDt": from,
                "toDt": from + 900,
                "recurringEvent": true,
                "recurrenceType": "Minute",
                "recurrenceDetail": 30,
                "campaign": "Menu",
                "displayGroupList": "Lobby",
            },
            {"eventId": "broken"},
        ],
        "start": DAY_MS,
        "end": DAY_MS + 3 * 86_400_000,
        "granularity": "month",
    });

    let mut content = TestClient::post(URL).json(&body).send(service(None)).await;
    assert_eq!(content.status_code, Some(StatusCode::OK));

    let entries: Vec<Value> = content.take_json().await.expect("json array");
    assert_eq!(entries.len(), 3);
    assert!(entries.iter().all(|entry| entry["highFrequency"] == true));
    assert_eq!(entries[0]["title"], "Menu on Lobby (Repeats every 30 minutes)");
    assert_eq!(entries[0]["url"], "/schedule/form/edit/3");
}

#[test_log::test(tokio::test)]
async fn post_defaults_to_month_granularity() {
    let body = json!({"events": [], "start": DAY_MS, "end": DAY_MS + 1});

    let mut content = TestClient::post(URL).json(&body).send(service(None)).await;
    assert_eq!(content.status_code, Some(StatusCode::OK));
    let entries: Vec<Value> = content.take_json().await.expect("json array");
    assert!(entries.is_empty());
}

#[test_log::test(tokio::test)]
async fn post_rejects_empty_window() {
    let body = json!({"events": [], "start": DAY_MS, "end": DAY_MS});

    let content = TestClient::post(URL).json(&body).send(service(None)).await;
    assert_eq!(content.status_code, Some(StatusCode::BAD_REQUEST));
}

#[test_log::test(tokio::test)]
async fn post_rejects_unknown_granularity() {
    let body = json!({"events": [], "start": 0, "end": 1, "granularity": "agendaWeek"});

    let content = TestClient::post(URL).json(&body).send(service(None)).await;
    assert_eq!(content.status_code, Some(StatusCode::BAD_REQUEST));
}

#[test_log::test(tokio::test)]
async fn get_without_feed_is_unavailable() {
    let content = TestClient::get(format!("{URL}?start=0&end=1000"))
        .send(service(None))
        .await;
    assert_eq!(content.status_code, Some(StatusCode::SERVICE_UNAVAILABLE));
}

#[test_log::test(tokio::test)]
async fn get_requires_window_bounds() {
    let content = TestClient::get(format!("{URL}?start=0"))
        .send(service(Some(unreachable_feed())))
        .await;
    assert_eq!(content.status_code, Some(StatusCode::BAD_REQUEST));

    let content = TestClient::get(format!("{URL}?start=0&end=1000&granularity=fortnight"))
        .send(service(Some(unreachable_feed())))
        .await;
    assert_eq!(content.status_code, Some(StatusCode::BAD_REQUEST));
}

#[test_log::test(tokio::test)]
async fn get_reports_upstream_failure() {
    let content = TestClient::get(format!("{URL}?start=0&end=1000&granularity=week"))
        .send(service(Some(unreachable_feed())))
        .await;
    assert_eq!(content.status_code, Some(StatusCode::BAD_GATEWAY));
}

#[test_log::test(tokio::test)]
async fn missing_context_is_a_server_error() {
    let router = salvo::Router::new().push(routes().expect("routes build"));
    let body = json!({"events": [], "start": 0, "end": 1});

    let content = TestClient::post(URL).json(&body).send(router).await;
    assert_eq!(content.status_code, Some(StatusCode::INTERNAL_SERVER_ERROR));
}
