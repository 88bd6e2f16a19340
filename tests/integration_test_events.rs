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

async fn create_event(app: &TestApp, auth: &AuthHeaders, title: &str) -> Value {
    let start = Utc::now() + Duration::days(30);
    let res = app.router.clone().oneshot(
        Request::builder().method("POST").uri("/api/v1/events")
            .header(header::COOKIE, format!("access_token={}", auth.access_token))
            .header("X-CSRF-Token", &auth.csrf_token)
            .header("Content-Type", "application/json")
            .body(Body::from(json!({
                "title": title,
                "location": "Hall A",
                "invite_message": "Join us!",
                "start_at": start.to_rfc3339(),
                "end_at": (start + Duration::hours(2)).to_rfc3339(),
            }).to_string())).unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    parse_body(res).await
}

#[tokio::test]
async fn test_event_crud() {
    let app = TestApp::new().await;
    let (host, _) = app.onboard("+1000", "Host").await;

    let event = create_event(&app, &host, "Annual Gala").await;
    let event_id = event["id"].as_str().unwrap();
    assert_eq!(event["title"], "Annual Gala");
    assert_eq!(event["location"], "Hall A");

    let res = app.router.clone().oneshot(
        Request::builder().method("PUT").uri(format!("/api/v1/events/{}", event_id))
            .header(header::COOKIE, format!("access_token={}", host.access_token))
            .header("X-CSRF-Token", &host.csrf_token)
            .header("Content-Type", "application/json")
            .body(Body::from(json!({ "title": "Annual Gala 2.0" }).to_string())).unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(parse_body(res).await["title"], "Annual Gala 2.0");

    let res = app.router.clone().oneshot(
        Request::builder().method("DELETE").uri(format!("/api/v1/events/{}", event_id))
            .header(header::COOKIE, format!("access_token={}", host.access_token))
            .header("X-CSRF-Token", &host.csrf_token)
            .body(Body::empty()).unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = app.router.clone().oneshot(
        Request::builder().method("GET").uri(format!("/api/v1/events/{}", event_id))
            .header(header::COOKIE, format!("access_token={}", host.access_token))
            .body(Body::empty()).unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_event_rejects_inverted_window() {
    let app = TestApp::new().await;
    let (host, _) = app.onboard("+1000", "Host").await;

    let start = Utc::now() + Duration::days(30);
    let res = app.router.clone().oneshot(
        Request::builder().method("POST").uri("/api/v1/events")
            .header(header::COOKIE, format!("access_token={}", host.access_token))
            .header("X-CSRF-Token", &host.csrf_token)
            .header("Content-Type", "application/json")
            .body(Body::from(json!({
                "title": "Backwards",
                "start_at": start.to_rfc3339(),
                "end_at": (start - Duration::hours(2)).to_rfc3339(),
            }).to_string())).unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_forbidden_for_non_host() {
    let app = TestApp::new().await;
    let (host, _) = app.onboard("+1000", "Host").await;
    let (outsider, _) = app.onboard("+1001", "Outsider").await;

    let event = create_event(&app, &host, "Private Party").await;
    let event_id = event["id"].as_str().unwrap();

    let res = app.router.clone().oneshot(
        Request::builder().method("PUT").uri(format!("/api/v1/events/{}", event_id))
            .header(header::COOKIE, format!("access_token={}", outsider.access_token))
            .header("X-CSRF-Token", &outsider.csrf_token)
            .header("Content-Type", "application/json")
            .body(Body::from(json!({ "title": "Hijacked" }).to_string())).unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_cohost_management_and_roles() {
    let app = TestApp::new().await;
    let (host, _) = app.onboard("+1000", "Host").await;
    let (_, cohost_body) = app.onboard("+1001", "Cohost").await;
    let cohost_id = cohost_body["user"]["id"].as_str().unwrap();

    let event = create_event(&app, &host, "Summit").await;
    let event_id = event["id"].as_str().unwrap();

    let res = app.router.clone().oneshot(
        Request::builder().method("POST").uri(format!("/api/v1/events/{}/cohosts", event_id))
            .header(header::COOKIE, format!("access_token={}", host.access_token))
            .header("X-CSRF-Token", &host.csrf_token)
            .header("Content-Type", "application/json")
            .body(Body::from(json!({ "user_id": cohost_id }).to_string())).unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let (cohost, _) = app.login("+1001").await;
    let res = app.router.clone().oneshot(
        Request::builder().method("GET").uri("/api/v1/events")
            .header(header::COOKIE, format!("access_token={}", cohost.access_token))
            .body(Body::empty()).unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = parse_body(res).await;
    let events = body.as_array().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["user_role"], "cohost");

    // And the host still sees it as host.
    let res = app.router.clone().oneshot(
        Request::builder().method("GET").uri("/api/v1/events")
            .header(header::COOKIE, format!("access_token={}", host.access_token))
            .body(Body::empty()).unwrap()
    ).await.unwrap();
    let body = parse_body(res).await;
    assert_eq!(body[0]["user_role"], "host");
}

#[tokio::test]
async fn test_profile_picture_upload_uses_storage() {
    let app = TestApp::new().await;
    let (auth, _) = app.onboard("+1000", "Ada").await;

    let res = app.router.clone().oneshot(
        Request::builder().method("POST").uri("/api/v1/profile/picture")
            .header(header::COOKIE, format!("access_token={}", auth.access_token))
            .header("X-CSRF-Token", &auth.csrf_token)
            .header("Content-Type", "application/json")
            .body(Body::from(json!({
                "filename": "avatar.png",
                "content_base64": "aGVsbG8=",
            }).to_string())).unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body = parse_body(res).await;
    let url = body["profile_pic"].as_str().unwrap();
    assert!(url.starts_with("http://storage.local/mock/"));
    assert!(url.ends_with("avatar.png"));
}
