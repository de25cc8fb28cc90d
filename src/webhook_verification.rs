//! # Webhook Verification
//!
//! Authentication for the webhook gateway: every call must present the
//! shared `x-auth-token` secret (compared in constant time), and Meta
//! payloads are additionally verified against the `X-Hub-Signature-256`
//! HMAC-SHA256 header when an app secret is configured.

use axum::http::HeaderMap;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::config::AppConfig;

type HmacSha256 = Hmac<Sha256>;

/// Errors that can occur during webhook verification
#[derive(Debug, thiserror::Error)]
pub enum VerificationError {
    #[error("missing required header: {header}")]
    MissingHeader { header: String },

    #[error("invalid header format: {header}")]
    InvalidHeaderFormat { header: String },

    #[error("verification failed")]
    VerificationFailed,

    #[error("webhook verification not configured")]
    NotConfigured,
}

/// Verify the gateway shared secret presented in `x-auth-token`.
pub fn verify_shared_token(
    headers: &HeaderMap,
    config: &AppConfig,
) -> Result<(), VerificationError> {
    let Some(expected) = config.gateway.shared_secret.as_deref() else {
        return Err(VerificationError::NotConfigured);
    };

    let provided = headers
        .get("x-auth-token")
        .ok_or_else(|| VerificationError::MissingHeader {
            header: "x-auth-token".to_string(),
        })?
        .to_str()
        .map_err(|_| VerificationError::InvalidHeaderFormat {
            header: "x-auth-token".to_string(),
        })?;

    if ConstantTimeEq::ct_eq(provided.as_bytes(), expected.as_bytes()).into() {
        Ok(())
    } else {
        Err(VerificationError::VerificationFailed)
    }
}

/// Verify a Meta `X-Hub-Signature-256` header over the raw body. A no-op
/// unless an app secret is configured.
pub fn verify_meta_signature(
    headers: &HeaderMap,
    body: &[u8],
    config: &AppConfig,
) -> Result<(), VerificationError> {
    let Some(secret) = config.meta_app_secret.as_deref() else {
        return Ok(());
    };

    let header = headers
        .get("X-Hub-Signature-256")
        .ok_or_else(|| VerificationError::MissingHeader {
            header: "X-Hub-Signature-256".to_string(),
        })?
        .to_str()
        .map_err(|_| VerificationError::InvalidHeaderFormat {
            header: "X-Hub-Signature-256".to_string(),
        })?;

    let signature_hex =
        header
            .strip_prefix("sha256=")
            .ok_or_else(|| VerificationError::InvalidHeaderFormat {
                header: "X-Hub-Signature-256".to_string(),
            })?;

    let provided =
        hex::decode(signature_hex).map_err(|_| VerificationError::InvalidHeaderFormat {
            header: "X-Hub-Signature-256".to_string(),
        })?;

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| VerificationError::VerificationFailed)?;
    mac.update(body);
    let expected = mac.finalize().into_bytes();

    if ConstantTimeEq::ct_eq(provided.as_slice(), expected.as_slice()).into() {
        Ok(())
    } else {
        Err(VerificationError::VerificationFailed)
    }
}
