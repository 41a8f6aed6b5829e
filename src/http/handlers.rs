//! Request handlers for the contact endpoint.

use std::net::SocketAddr;

use axum::extract::rejection::{FormRejection, JsonRejection};
use axum::extract::{ConnectInfo, Form, FromRequest, Json, Request, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::{error, info};

use crate::mail::ContactSubmission;

use super::client_ip::client_ip;
use super::server::AppState;

/// Response body for the throttled case, mirrors the 24-hour window.
const RATE_LIMIT_MESSAGE: &str = "Rate limit exceeded. Please try again after 24 hours.";

/// A contact submission that passed binding and field validation.
///
/// Extraction accepts JSON or URL-encoded form bodies and rejects missing
/// or blank fields with a 400 before the rate limiter is ever consulted.
pub struct ValidSubmission(pub ContactSubmission);

impl<S> FromRequest<S> for ValidSubmission
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();

        let submission = if content_type.starts_with("application/json") {
            let Json(submission) = Json::<ContactSubmission>::from_request(req, state)
                .await
                .map_err(|rejection: JsonRejection| bad_request(rejection.body_text()))?;
            submission
        } else {
            let Form(submission) = Form::<ContactSubmission>::from_request(req, state)
                .await
                .map_err(|rejection: FormRejection| bad_request(rejection.body_text()))?;
            submission
        };

        if submission.name.trim().is_empty()
            || submission.email.trim().is_empty()
            || submission.message.trim().is_empty()
        {
            return Err(bad_request(
                "name, email and message are required".to_string(),
            ));
        }

        Ok(Self(submission))
    }
}

fn bad_request(message: String) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
}

/// Handle `POST /api/contact`.
///
/// Validation happens during extraction, so a malformed submission never
/// consumes a quota slot. An admitted submission consumes its slot whether
/// or not the relay ultimately succeeds.
pub async fn submit_contact(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    ValidSubmission(submission): ValidSubmission,
) -> Response {
    let identifier = client_ip(peer, &headers, &state.trusted_proxies).to_string();

    if !state.limiter.allow(&identifier) {
        info!(identifier, "Submission rejected by rate limiter");
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({ "error": RATE_LIMIT_MESSAGE })),
        )
            .into_response();
    }

    match state.relay.deliver(&submission).await {
        Ok(()) => (StatusCode::OK, Json(json!({ "message": "Email sent" }))).into_response(),
        Err(error) => {
            error!(%error, identifier, "Failed to relay contact submission");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "failed to send message" })),
            )
                .into_response()
        }
    }
}
