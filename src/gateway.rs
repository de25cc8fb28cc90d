//! # Webhook Gateway Client
//!
//! Stateless forwarding of ad-platform webhook payloads to the configured
//! backend. One POST per inbound webhook with a fixed timeout and no retry;
//! the upstream status and body are relayed to the caller verbatim. Only
//! transport failures (connect, timeout) are translated into a 502.

use std::time::Duration;

use axum::http::StatusCode;
use serde_json::Value as JsonValue;
use url::Url;

use crate::config::GatewayConfig;
use crate::error::{ApiError, upstream_error};

/// Response captured from the backend, relayed as-is to the caller.
#[derive(Debug, Clone)]
pub struct ForwardedResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

/// HTTP client for the gateway backend.
#[derive(Debug, Clone)]
pub struct GatewayClient {
    http: reqwest::Client,
    backend_url: Option<Url>,
    backend_token: Option<String>,
}

impl GatewayClient {
    /// Build the client from gateway configuration. The timeout covers the
    /// whole forwarded request.
    pub fn from_config(config: &GatewayConfig) -> Result<Self, anyhow::Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        let backend_url = config
            .backend_url
            .as_deref()
            .map(Url::parse)
            .transpose()?;

        Ok(Self {
            http,
            backend_url,
            backend_token: config.backend_token.clone(),
        })
    }

    /// Whether a backend is configured at all.
    pub fn is_configured(&self) -> bool {
        self.backend_url.is_some()
    }

    /// Forward a webhook payload for `source` to the backend and capture the
    /// upstream response.
    pub async fn forward(
        &self,
        source: &str,
        payload: &JsonValue,
    ) -> Result<ForwardedResponse, ApiError> {
        let Some(base) = &self.backend_url else {
            return Err(ApiError::new(
                StatusCode::SERVICE_UNAVAILABLE,
                "SERVICE_UNAVAILABLE",
                "Webhook gateway backend is not configured",
            ));
        };

        let target = base.join(source).map_err(|e| {
            tracing::error!(source, error = %e, "Failed to build gateway target URL");
            upstream_error(source, Some(e.to_string()))
        })?;

        let mut request = self.http.post(target).json(payload);
        if let Some(token) = &self.backend_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            tracing::warn!(source, error = %e, "Gateway forward failed before a response");
            metrics::counter!("gateway_forward_errors_total").increment(1);
            upstream_error(source, Some(e.to_string()))
        })?;

        let status = StatusCode::from_u16(response.status().as_u16())
            .unwrap_or(StatusCode::BAD_GATEWAY);
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body = response.bytes().await.map_err(|e| {
            tracing::warn!(source, error = %e, "Gateway forward failed reading the response body");
            metrics::counter!("gateway_forward_errors_total").increment(1);
            upstream_error(source, Some(e.to_string()))
        })?;

        metrics::counter!("gateway_forwards_total").increment(1);
        tracing::info!(source, status = status.as_u16(), "Forwarded webhook payload");

        Ok(ForwardedResponse {
            status,
            content_type,
            body: body.to_vec(),
        })
    }
}
