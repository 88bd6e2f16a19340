mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use common::{TestApp, TEST_OTP_CODE};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn parse_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_verify_unknown_phone_requires_onboarding() {
    let app = TestApp::new().await;

    let res = app.router.clone().oneshot(
        Request::builder().method("POST").uri("/api/v1/auth/otp/verify")
            .header("Content-Type", "application/json")
            .body(Body::from(json!({ "phone": "+1555", "code": TEST_OTP_CODE }).to_string())).unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body = parse_body(res).await;
    assert_eq!(body["needs_onboarding"], true);
    assert!(body["csrf_token"].is_null());
}

#[tokio::test]
async fn test_wrong_code_is_rejected() {
    let app = TestApp::new().await;

    let res = app.router.clone().oneshot(
        Request::builder().method("POST").uri("/api/v1/auth/otp/verify")
            .header("Content-Type", "application/json")
            .body(Body::from(json!({ "phone": "+1555", "code": "999999" }).to_string())).unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_onboarding_requires_prior_verification() {
    let app = TestApp::new().await;

    let res = app.router.clone().oneshot(
        Request::builder().method("POST").uri("/api/v1/auth/onboard")
            .header("Content-Type", "application/json")
            .body(Body::from(json!({ "phone": "+1555", "name": "Ada" }).to_string())).unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_onboarding_twice_conflicts() {
    let app = TestApp::new().await;
    app.onboard("+1555", "Ada").await;

    // Verify again, then attempt a second onboarding for the same phone.
    app.router.clone().oneshot(
        Request::builder().method("POST").uri("/api/v1/auth/otp/verify")
            .header("Content-Type", "application/json")
            .body(Body::from(json!({ "phone": "+1555", "code": TEST_OTP_CODE }).to_string())).unwrap()
    ).await.unwrap();

    let res = app.router.clone().oneshot(
        Request::builder().method("POST").uri("/api/v1/auth/onboard")
            .header("Content-Type", "application/json")
            .body(Body::from(json!({ "phone": "+1555", "name": "Imposter" }).to_string())).unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_onboarded_user_is_verified() {
    let app = TestApp::new().await;
    let (_, body) = app.onboard("+1555", "Ada").await;

    assert_eq!(body["user"]["verification_status"], "verified");
    assert_eq!(body["user"]["phone"], "+1555");
    assert_eq!(body["reconciliation"]["linked_count"], 0);
    assert_eq!(body["reconciliation"]["message"], "No previous RSVPs found");
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = TestApp::new().await;

    let res = app.router.clone().oneshot(
        Request::builder().method("GET").uri("/api/v1/profile")
            .body(Body::empty()).unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_mutations_require_csrf_header() {
    let app = TestApp::new().await;
    let (auth, _) = app.onboard("+1555", "Ada").await;

    let res = app.router.clone().oneshot(
        Request::builder().method("POST").uri("/api/v1/events")
            .header(header::COOKIE, format!("access_token={}", auth.access_token))
            .header("Content-Type", "application/json")
            .body(Body::from(json!({
                "title": "No CSRF",
                "start_at": "2030-01-01T10:00:00Z",
                "end_at": "2030-01-01T12:00:00Z",
            }).to_string())).unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_refresh_and_logout() {
    let app = TestApp::new().await;
    app.onboard("+1555", "Ada").await;

    // The onboard helper drops the refresh cookie, so re-login to capture it.
    let res = app.router.clone().oneshot(
        Request::builder().method("POST").uri("/api/v1/auth/otp/verify")
            .header("Content-Type", "application/json")
            .body(Body::from(json!({ "phone": "+1555", "code": TEST_OTP_CODE }).to_string())).unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let cookies: Vec<String> = res.headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|h| h.to_str().unwrap().to_string())
        .collect();
    let refresh_cookie = cookies.iter().find(|c| c.contains("refresh_token=")).unwrap();
    let start = refresh_cookie.find("refresh_token=").unwrap() + 14;
    let end = refresh_cookie[start..].find(';').unwrap_or(refresh_cookie.len() - start);
    let refresh_token = &refresh_cookie[start..start + end];

    let res = app.router.clone().oneshot(
        Request::builder().method("POST").uri("/api/v1/auth/refresh")
            .header(header::COOKIE, format!("refresh_token={}", refresh_token))
            .body(Body::empty()).unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = parse_body(res).await;
    assert!(body["csrf_token"].is_string());

    // The rotated-out token is no longer accepted.
    let res = app.router.clone().oneshot(
        Request::builder().method("POST").uri("/api/v1/auth/refresh")
            .header(header::COOKIE, format!("refresh_token={}", refresh_token))
            .body(Body::empty()).unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}
