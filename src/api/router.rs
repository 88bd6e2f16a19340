use axum::{
    body::Body,
    extract::Request,
    routing::{get, post, delete},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use crate::state::AppState;
use crate::api::handlers::{auth, event, group, health, invite, profile, rsvp};
use tower_http::{
    trace::TraceLayer,
    classify::ServerErrorsFailureClass,
};
use tower_cookies::CookieManagerLayer;
use tracing::{info_span, Span, error, info};
use uuid::Uuid;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))

        // Auth & Onboarding
        .route("/api/v1/auth/otp/send", post(auth::send_otp))
        .route("/api/v1/auth/otp/verify", post(auth::verify_otp))
        .route("/api/v1/auth/onboard", post(auth::onboard))
        .route("/api/v1/auth/refresh", post(auth::refresh))
        .route("/api/v1/auth/logout", post(auth::logout))

        // Profile
        .route("/api/v1/profile", get(profile::get_profile).put(profile::update_profile))
        .route("/api/v1/profile/picture", post(profile::upload_profile_picture))

        // Events
        .route("/api/v1/events", post(event::create_event).get(event::list_events))
        .route("/api/v1/events/{event_id}", get(event::get_event).put(event::update_event).delete(event::delete_event))
        .route("/api/v1/events/{event_id}/cohosts", post(event::add_cohost))
        .route("/api/v1/events/{event_id}/cohosts/{user_id}", delete(event::remove_cohost))

        // Guest Groups
        .route("/api/v1/events/{event_id}/groups", post(group::create_group).get(group::list_groups))
        .route("/api/v1/events/{event_id}/groups/{group_id}", get(group::get_group).put(group::update_group).delete(group::delete_group))
        .route("/api/v1/events/{event_id}/groups/{group_id}/members", post(group::add_member).delete(group::remove_member))
        .route("/api/v1/events/{event_id}/groups/{group_id}/attach", post(group::attach_group))
        .route("/api/v1/events/{event_id}/groups/{group_id}/invite-link", post(group::generate_invite_link).get(group::list_invite_links))

        // Bulk Invites & Host Reporting
        .route("/api/v1/events/{event_id}/invites", get(invite::list_invites))
        .route("/api/v1/events/{event_id}/invites/bulk", post(invite::bulk_invites))
        .route("/api/v1/events/{event_id}/guests", get(invite::guest_list))
        .route("/api/v1/events/{event_id}/rsvp-summary", get(invite::rsvp_summary))

        // Public Invite Flow (optional auth)
        .route("/api/v1/invites/{group_id}", get(invite::get_invite_details))
        .route("/api/v1/invites/{group_id}/rsvp", post(invite::submit_rsvp))

        // Direct RSVP (app channel)
        .route("/api/v1/rsvps", post(rsvp::submit).delete(rsvp::cancel))
        .route("/api/v1/rsvps/mine", get(invite::my_rsvps))
        .route("/api/v1/rsvps/{event_id}", get(rsvp::status))

        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = Uuid::new_v4().to_string();
                    info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        version = ?request.version(),
                        user_id = tracing::field::Empty,
                    )
                })
                .on_request(|request: &Request<Body>, _span: &Span| {
                    info!("started processing request: {} {}", request.method(), request.uri().path());
                })
                .on_response(|response: &axum::http::Response<Body>, latency: Duration, _span: &Span| {
                    info!(
                        status = response.status().as_u16(),
                        latency_ms = latency.as_millis(),
                        "finished processing request"
                    );
                })
                .on_failure(|error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                    error!("request failed: {:?}", error);
                })
        )
        .layer(CookieManagerLayer::new())
        .with_state(state)
}
