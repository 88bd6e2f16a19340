mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use chrono::{Duration, Utc};
use common::{AuthHeaders, TestApp};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn parse_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn create_event_at(app: &TestApp, auth: &AuthHeaders, title: &str, days_from_now: i64) -> String {
    let start = Utc::now() + Duration::days(days_from_now);
    let res = app.router.clone().oneshot(
        Request::builder().method("POST").uri("/api/v1/events")
            .header(header::COOKIE, format!("access_token={}", auth.access_token))
            .header("X-CSRF-Token", &auth.csrf_token)
            .header("Content-Type", "application/json")
            .body(Body::from(json!({
                "title": title,
                "start_at": start.to_rfc3339(),
                "end_at": (start + Duration::hours(3)).to_rfc3339(),
            }).to_string())).unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    parse_body(res).await["id"].as_str().unwrap().to_string()
}

async fn submit_rsvp(app: &TestApp, auth: &AuthHeaders, event_id: &str, rsvp: &str) -> axum::response::Response {
    app.router.clone().oneshot(
        Request::builder().method("POST").uri("/api/v1/rsvps")
            .header(header::COOKIE, format!("access_token={}", auth.access_token))
            .header("X-CSRF-Token", &auth.csrf_token)
            .header("Content-Type", "application/json")
            .body(Body::from(json!({ "event_id": event_id, "rsvp": rsvp }).to_string())).unwrap()
    ).await.unwrap()
}

#[tokio::test]
async fn test_rsvp_upsert_never_duplicates() {
    let app = TestApp::new().await;
    let (host, _) = app.onboard("+1000", "Host").await;
    let event_id = create_event_at(&app, &host, "Meetup", 5).await;
    let (guest, body) = app.onboard("+1555", "Ada").await;
    let user_id = body["user"]["id"].as_str().unwrap().to_string();

    let first = submit_rsvp(&app, &guest, &event_id, "maybe").await;
    assert_eq!(first.status(), StatusCode::OK);
    let first_body = parse_body(first).await;
    assert_eq!(first_body["rsvp"], "maybe");

    let second = submit_rsvp(&app, &guest, &event_id, "accepted").await;
    assert_eq!(second.status(), StatusCode::OK);
    let second_body = parse_body(second).await;
    assert_eq!(second_body["rsvp"], "accepted");
    assert_eq!(second_body["id"], first_body["id"]);

    let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM guests WHERE user_id = ? AND event_id = ?")
        .bind(&user_id)
        .bind(&event_id)
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(rows, 1);
}

#[tokio::test]
async fn test_rsvp_cancel_and_status() {
    let app = TestApp::new().await;
    let (host, _) = app.onboard("+1000", "Host").await;
    let event_id = create_event_at(&app, &host, "Meetup", 5).await;
    let (guest, _) = app.onboard("+1555", "Ada").await;

    submit_rsvp(&app, &guest, &event_id, "accepted").await;

    let cancel = app.router.clone().oneshot(
        Request::builder().method("DELETE").uri("/api/v1/rsvps")
            .header(header::COOKIE, format!("access_token={}", guest.access_token))
            .header("X-CSRF-Token", &guest.csrf_token)
            .header("Content-Type", "application/json")
            .body(Body::from(json!({ "event_id": event_id }).to_string())).unwrap()
    ).await.unwrap();
    assert_eq!(cancel.status(), StatusCode::OK);
    assert_eq!(parse_body(cancel).await["rsvp"], "no_response");

    let status = app.router.clone().oneshot(
        Request::builder().method("GET").uri(format!("/api/v1/rsvps/{}", event_id))
            .header(header::COOKIE, format!("access_token={}", guest.access_token))
            .body(Body::empty()).unwrap()
    ).await.unwrap();
    assert_eq!(status.status(), StatusCode::OK);
    assert_eq!(parse_body(status).await["rsvp"], "no_response");
}

#[tokio::test]
async fn test_rsvp_rejected_for_started_event() {
    let app = TestApp::new().await;
    let (host, _) = app.onboard("+1000", "Host").await;
    let event_id = create_event_at(&app, &host, "Started", -1).await;
    let (guest, _) = app.onboard("+1555", "Ada").await;

    let res = submit_rsvp(&app, &guest, &event_id, "accepted").await;
    assert_eq!(res.status(), StatusCode::GONE);
}

#[tokio::test]
async fn test_rsvp_unknown_event_not_found() {
    let app = TestApp::new().await;
    let (_, _) = app.onboard("+1000", "Host").await;
    let (guest, _) = app.onboard("+1555", "Ada").await;

    let res = submit_rsvp(&app, &guest, "missing-event", "accepted").await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_my_rsvps_excludes_no_response() {
    let app = TestApp::new().await;
    let (host, _) = app.onboard("+1000", "Host").await;
    let event_a = create_event_at(&app, &host, "First", 3).await;
    let event_b = create_event_at(&app, &host, "Second", 6).await;
    let event_c = create_event_at(&app, &host, "Third", 9).await;
    let (guest, _) = app.onboard("+1555", "Ada").await;

    submit_rsvp(&app, &guest, &event_a, "accepted").await;
    submit_rsvp(&app, &guest, &event_b, "declined").await;
    submit_rsvp(&app, &guest, &event_c, "accepted").await;

    // Cancelling drops the event from the list.
    app.router.clone().oneshot(
        Request::builder().method("DELETE").uri("/api/v1/rsvps")
            .header(header::COOKIE, format!("access_token={}", guest.access_token))
            .header("X-CSRF-Token", &guest.csrf_token)
            .header("Content-Type", "application/json")
            .body(Body::from(json!({ "event_id": event_c }).to_string())).unwrap()
    ).await.unwrap();

    let res = app.router.clone().oneshot(
        Request::builder().method("GET").uri("/api/v1/rsvps/mine")
            .header(header::COOKIE, format!("access_token={}", guest.access_token))
            .body(Body::empty()).unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body = parse_body(res).await;
    let rsvps = body["rsvps"].as_array().unwrap();
    assert_eq!(rsvps.len(), 2);
    // Ordered by event start time.
    assert_eq!(rsvps[0]["event_title"], "First");
    assert_eq!(rsvps[1]["event_title"], "Second");
}
