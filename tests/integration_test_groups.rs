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

async fn create_event(app: &TestApp, auth: &AuthHeaders, title: &str) -> String {
    let res = app.router.clone().oneshot(
        Request::builder().method("POST").uri("/api/v1/events")
            .header(header::COOKIE, format!("access_token={}", auth.access_token))
            .header("X-CSRF-Token", &auth.csrf_token)
            .header("Content-Type", "application/json")
            .body(Body::from(json!({
                "title": title,
                "start_at": (Utc::now() + Duration::days(14)).to_rfc3339(),
                "end_at": (Utc::now() + Duration::days(14) + Duration::hours(6)).to_rfc3339(),
            }).to_string())).unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    parse_body(res).await["id"].as_str().unwrap().to_string()
}

async fn create_group(app: &TestApp, auth: &AuthHeaders, event_id: &str, name: &str) -> String {
    let res = app.router.clone().oneshot(
        Request::builder().method("POST").uri(format!("/api/v1/events/{}/groups", event_id))
            .header(header::COOKIE, format!("access_token={}", auth.access_token))
            .header("X-CSRF-Token", &auth.csrf_token)
            .header("Content-Type", "application/json")
            .body(Body::from(json!({ "name": name }).to_string())).unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    parse_body(res).await["id"].as_str().unwrap().to_string()
}

async fn add_member(app: &TestApp, auth: &AuthHeaders, event_id: &str, group_id: &str, phone: &str) -> axum::response::Response {
    app.router.clone().oneshot(
        Request::builder().method("POST").uri(format!("/api/v1/events/{}/groups/{}/members", event_id, group_id))
            .header(header::COOKIE, format!("access_token={}", auth.access_token))
            .header("X-CSRF-Token", &auth.csrf_token)
            .header("Content-Type", "application/json")
            .body(Body::from(json!({ "phone": phone }).to_string())).unwrap()
    ).await.unwrap()
}

async fn attach(app: &TestApp, auth: &AuthHeaders, event_id: &str, group_id: &str) -> Value {
    let res = app.router.clone().oneshot(
        Request::builder().method("POST").uri(format!("/api/v1/events/{}/groups/{}/attach", event_id, group_id))
            .header(header::COOKIE, format!("access_token={}", auth.access_token))
            .header("X-CSRF-Token", &auth.csrf_token)
            .body(Body::empty()).unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    parse_body(res).await
}

async fn guest_list(app: &TestApp, auth: &AuthHeaders, event_id: &str) -> Value {
    let res = app.router.clone().oneshot(
        Request::builder().method("GET").uri(format!("/api/v1/events/{}/guests", event_id))
            .header(header::COOKIE, format!("access_token={}", auth.access_token))
            .header("X-CSRF-Token", &auth.csrf_token)
            .body(Body::empty()).unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    parse_body(res).await
}

#[tokio::test]
async fn test_group_creation_requires_host() {
    let app = TestApp::new().await;
    let (host, _) = app.onboard("+1000", "Host").await;
    let (outsider, _) = app.onboard("+1001", "Outsider").await;
    let event_id = create_event(&app, &host, "Launch").await;

    let res = app.router.clone().oneshot(
        Request::builder().method("POST").uri(format!("/api/v1/events/{}/groups", event_id))
            .header(header::COOKIE, format!("access_token={}", outsider.access_token))
            .header("X-CSRF-Token", &outsider.csrf_token)
            .header("Content-Type", "application/json")
            .body(Body::from(json!({ "name": "Crashers" }).to_string())).unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let group_id = create_group(&app, &host, &event_id, "Colleagues").await;
    assert!(!group_id.is_empty());
}

#[tokio::test]
async fn test_add_member_creates_placeholder_and_rejects_duplicates() {
    let app = TestApp::new().await;
    let (host, _) = app.onboard("+1000", "Host").await;
    let event_id = create_event(&app, &host, "Offsite").await;
    let group_id = create_group(&app, &host, &event_id, "Team").await;

    let res = add_member(&app, &host, &event_id, &group_id, "+1555").await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = parse_body(res).await;
    assert_eq!(body["user"]["verification_status"], "unverified");
    assert_eq!(body["user"]["phone"], "+1555");

    let duplicate = add_member(&app, &host, &event_id, &group_id, "+1555").await;
    assert_eq!(duplicate.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_attach_group_is_idempotent() {
    let app = TestApp::new().await;
    let (host, _) = app.onboard("+1000", "Host").await;
    let event_id = create_event(&app, &host, "Retreat").await;
    let group_id = create_group(&app, &host, &event_id, "Squad").await;

    for phone in ["+1555", "+1556", "+1557"] {
        let res = add_member(&app, &host, &event_id, &group_id, phone).await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    let first = attach(&app, &host, &event_id, &group_id).await;
    assert_eq!(first["count"], 3);

    let second = attach(&app, &host, &event_id, &group_id).await;
    assert_eq!(second["count"], 0);

    let list = guest_list(&app, &host, &event_id).await;
    assert_eq!(list["linked"].as_array().unwrap().len(), 3);
    for guest in list["linked"].as_array().unwrap() {
        assert_eq!(guest["rsvp"], "no_response");
        assert_eq!(guest["count"], 1);
    }
}

#[tokio::test]
async fn test_remove_member_detaches_grouping_but_keeps_attendance() {
    let app = TestApp::new().await;
    let (host, _) = app.onboard("+1000", "Host").await;
    let event_id = create_event(&app, &host, "Dinner").await;
    let group_id = create_group(&app, &host, &event_id, "Table 1").await;

    add_member(&app, &host, &event_id, &group_id, "+1555").await;
    attach(&app, &host, &event_id, &group_id).await;

    let res = app.router.clone().oneshot(
        Request::builder().method("DELETE").uri(format!("/api/v1/events/{}/groups/{}/members", event_id, group_id))
            .header(header::COOKIE, format!("access_token={}", host.access_token))
            .header("X-CSRF-Token", &host.csrf_token)
            .header("Content-Type", "application/json")
            .body(Body::from(json!({ "phone": "+1555" }).to_string())).unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let list = guest_list(&app, &host, &event_id).await;
    let linked = list["linked"].as_array().unwrap();
    assert_eq!(linked.len(), 1);
    assert!(linked[0]["group_id"].is_null());
}

#[tokio::test]
async fn test_group_deletion_cascade() {
    let app = TestApp::new().await;
    let (host, _) = app.onboard("+1000", "Host").await;

    let event_a = create_event(&app, &host, "Ceremony").await;
    let event_b = create_event(&app, &host, "After Party").await;
    let group_id = create_group(&app, &host, &event_a, "Everyone").await;

    for phone in ["+1555", "+1556", "+1557"] {
        add_member(&app, &host, &event_a, &group_id, phone).await;
    }

    attach(&app, &host, &event_a, &group_id).await;
    attach(&app, &host, &event_b, &group_id).await;

    let res = app.router.clone().oneshot(
        Request::builder().method("DELETE").uri(format!("/api/v1/events/{}/groups/{}", event_a, group_id))
            .header(header::COOKIE, format!("access_token={}", host.access_token))
            .header("X-CSRF-Token", &host.csrf_token)
            .body(Body::empty()).unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // No dangling join rows survive the cascade.
    let memberships: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM group_members WHERE group_id = ?")
        .bind(&group_id)
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(memberships, 0);

    let associations: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM event_guest_groups WHERE group_id = ?")
        .bind(&group_id)
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(associations, 0);

    // Attendance rows are retained with the grouping nulled out.
    for event_id in [&event_a, &event_b] {
        let list = guest_list(&app, &host, event_id).await;
        let linked = list["linked"].as_array().unwrap();
        assert_eq!(linked.len(), 3);
        for guest in linked {
            assert!(guest["group_id"].is_null());
        }
    }

    let res = app.router.clone().oneshot(
        Request::builder().method("GET").uri(format!("/api/v1/events/{}/groups/{}", event_a, group_id))
            .header(header::COOKIE, format!("access_token={}", host.access_token))
            .header("X-CSRF-Token", &host.csrf_token)
            .body(Body::empty()).unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invite_link_requires_association() {
    let app = TestApp::new().await;
    let (host, _) = app.onboard("+1000", "Host").await;
    let event_a = create_event(&app, &host, "Main").await;
    let event_b = create_event(&app, &host, "Other").await;
    let group_id = create_group(&app, &host, &event_a, "Guests").await;

    let res = app.router.clone().oneshot(
        Request::builder().method("POST").uri(format!("/api/v1/events/{}/groups/{}/invite-link", event_b, group_id))
            .header(header::COOKIE, format!("access_token={}", host.access_token))
            .header("X-CSRF-Token", &host.csrf_token)
            .body(Body::empty()).unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = app.router.clone().oneshot(
        Request::builder().method("POST").uri(format!("/api/v1/events/{}/groups/{}/invite-link", event_a, group_id))
            .header(header::COOKIE, format!("access_token={}", host.access_token))
            .header("X-CSRF-Token", &host.csrf_token)
            .body(Body::empty()).unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = parse_body(res).await;
    let link = body["invite_link"].as_str().unwrap();
    assert!(link.ends_with(&format!("/invite/{}", group_id)));
}
