//! # Webhook Gateway Handlers
//!
//! Inbound ad-platform webhooks. Callers authenticate with the shared
//! `x-auth-token` secret (never a user bearer token); Meta payloads are
//! additionally signature-checked when an app secret is configured. Valid
//! payloads are forwarded to the backend and the upstream status and body
//! are relayed verbatim.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use serde_json::Value as JsonValue;

use crate::error::{ApiError, not_found, unauthorized, validation_error};
use crate::models::IntegrationProvider;
use crate::server::AppState;
use crate::webhook_verification::{self, VerificationError};

fn verification_error_response(error: VerificationError) -> ApiError {
    match error {
        VerificationError::NotConfigured => ApiError::new(
            StatusCode::SERVICE_UNAVAILABLE,
            "SERVICE_UNAVAILABLE",
            "Webhook gateway is not configured",
        ),
        VerificationError::MissingHeader { .. }
        | VerificationError::InvalidHeaderFormat { .. }
        | VerificationError::VerificationFailed => {
            tracing::warn!(error = %error, "Webhook verification failed");
            unauthorized(Some("Webhook verification failed"))
        }
    }
}

/// Receive an ad-platform webhook and forward it to the backend
#[utoipa::path(
    post,
    path = "/api/integrations/{provider}/webhook",
    params(
        ("provider" = String, Path, description = "Webhook source: meta, tiktok or wordpress"),
        ("x-auth-token" = String, Header, description = "Shared gateway secret")
    ),
    responses(
        (status = 200, description = "Upstream response relayed verbatim"),
        (status = 400, description = "Body is not valid JSON", body = ApiError),
        (status = 401, description = "Missing or wrong shared secret or signature", body = ApiError),
        (status = 404, description = "Unknown source", body = ApiError),
        (status = 502, description = "Backend unreachable", body = ApiError)
    ),
    tag = "gateway"
)]
pub async fn receive_webhook(
    State(state): State<AppState>,
    Path(source): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    // Unknown sources are 404 before any verification output can differ.
    let provider = IntegrationProvider::from_slug(&source).ok_or_else(|| not_found("Source"))?;

    webhook_verification::verify_shared_token(&headers, &state.config)
        .map_err(verification_error_response)?;

    if provider == IntegrationProvider::Meta {
        webhook_verification::verify_meta_signature(&headers, &body, &state.config)
            .map_err(verification_error_response)?;
    }

    let payload: JsonValue = serde_json::from_slice(&body).map_err(|e| {
        validation_error(
            "Webhook body must be valid JSON",
            serde_json::json!({ "error": e.to_string() }),
        )
    })?;

    metrics::counter!("gateway_webhooks_received_total").increment(1);

    let forwarded = state.gateway.forward(provider.as_slug(), &payload).await?;

    let mut response = Response::builder().status(forwarded.status);
    if let Some(content_type) = forwarded.content_type {
        response = response.header(CONTENT_TYPE, content_type);
    }

    response
        .body(axum::body::Body::from(forwarded.body))
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to build relayed response");
            ApiError::from(crate::error::ErrorType::InternalServerError)
        })
        .map(IntoResponse::into_response)
}
