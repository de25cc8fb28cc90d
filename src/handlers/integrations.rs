//! # Integration Settings Handlers
//!
//! Per-user ad-platform and Twilio credentials. Secrets are encrypted before
//! they reach the repository and are never echoed back in responses.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::crypto;
use crate::error::{ApiError, not_found};
use crate::models::IntegrationProvider;
use crate::models::integration::Model as IntegrationModel;
use crate::models::twilio_setting::Model as TwilioModel;
use crate::repositories::{
    IntegrationRepository, UpsertIntegrationRequest, UpsertTwilioRequest,
};
use crate::server::AppState;

/// Integration representation returned by the API (credentials omitted)
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct IntegrationDto {
    pub id: Uuid,
    pub provider: IntegrationProvider,
    pub settings: Option<JsonValue>,
    /// Creation timestamp (ISO 8601)
    pub created_at: String,
    /// Last update timestamp (ISO 8601)
    pub updated_at: String,
}

impl From<IntegrationModel> for IntegrationDto {
    fn from(integration: IntegrationModel) -> Self {
        Self {
            id: integration.id,
            provider: integration.provider,
            settings: integration.settings,
            created_at: integration.created_at.to_rfc3339(),
            updated_at: integration.updated_at.to_rfc3339(),
        }
    }
}

/// Request payload for storing ad-platform credentials
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpsertIntegrationDto {
    /// Opaque credential object (tokens, secrets); stored encrypted
    pub credentials: JsonValue,
    /// Non-secret provider settings (page ids, form ids, site URL)
    pub settings: Option<JsonValue>,
}

/// Twilio settings representation (auth token omitted)
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TwilioSettingsDto {
    pub account_sid: String,
    pub phone_number: Option<String>,
    /// Last update timestamp (ISO 8601)
    pub updated_at: String,
}

impl From<TwilioModel> for TwilioSettingsDto {
    fn from(settings: TwilioModel) -> Self {
        Self {
            account_sid: settings.account_sid,
            phone_number: settings.phone_number,
            updated_at: settings.updated_at.to_rfc3339(),
        }
    }
}

/// Request payload for storing Twilio settings
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpsertTwilioDto {
    #[schema(example = "ACxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxx")]
    pub account_sid: String,
    /// Twilio auth token; stored encrypted
    pub auth_token: String,
    #[schema(example = "+15005550006")]
    pub phone_number: Option<String>,
}

/// List the requester's integrations
#[utoipa::path(
    get,
    path = "/api/integrations",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "The requester's integrations", body = [IntegrationDto]),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError)
    ),
    tag = "integrations"
)]
pub async fn list_integrations(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<IntegrationDto>>, ApiError> {
    let repo = IntegrationRepository::new(&state.db);
    let integrations = repo.list_for_user(user.id).await?;

    Ok(Json(
        integrations.into_iter().map(IntegrationDto::from).collect(),
    ))
}

/// Store credentials for an ad platform
#[utoipa::path(
    put,
    path = "/api/integrations/{provider}",
    security(("bearer_auth" = [])),
    params(("provider" = String, Path, description = "Provider slug: meta, tiktok or wordpress")),
    request_body = UpsertIntegrationDto,
    responses(
        (status = 200, description = "Credentials stored", body = IntegrationDto),
        (status = 404, description = "Unknown provider", body = ApiError)
    ),
    tag = "integrations"
)]
pub async fn upsert_integration(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(provider): Path<String>,
    Json(request): Json<UpsertIntegrationDto>,
) -> Result<Json<IntegrationDto>, ApiError> {
    let provider =
        IntegrationProvider::from_slug(&provider).ok_or_else(|| not_found("Provider"))?;

    let plaintext = serde_json::to_vec(&request.credentials).map_err(|e| {
        crate::error::validation_error(
            "Credentials must be a JSON object",
            serde_json::json!({ "error": e.to_string() }),
        )
    })?;

    let ciphertext =
        crypto::encrypt_credential(&state.crypto_key, user.id, provider.as_slug(), &plaintext)
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to encrypt integration credentials");
                ApiError::from(crate::error::ErrorType::InternalServerError)
            })?;

    let repo = IntegrationRepository::new(&state.db);
    let integration = repo
        .upsert(UpsertIntegrationRequest {
            user_id: user.id,
            provider,
            credentials_ciphertext: ciphertext,
            settings: request.settings,
        })
        .await?;

    Ok(Json(IntegrationDto::from(integration)))
}

/// Get the requester's Twilio settings
#[utoipa::path(
    get,
    path = "/api/integrations/twilio",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Twilio settings", body = TwilioSettingsDto),
        (status = 404, description = "No Twilio settings stored", body = ApiError)
    ),
    tag = "integrations"
)]
pub async fn get_twilio_settings(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<TwilioSettingsDto>, ApiError> {
    let repo = IntegrationRepository::new(&state.db);
    let settings = repo
        .find_twilio_for_user(user.id)
        .await?
        .ok_or_else(|| not_found("Twilio settings"))?;

    Ok(Json(TwilioSettingsDto::from(settings)))
}

/// Store the requester's Twilio settings
#[utoipa::path(
    put,
    path = "/api/integrations/twilio",
    security(("bearer_auth" = [])),
    request_body = UpsertTwilioDto,
    responses(
        (status = 200, description = "Twilio settings stored", body = TwilioSettingsDto),
        (status = 400, description = "Validation failed", body = ApiError)
    ),
    tag = "integrations"
)]
pub async fn upsert_twilio_settings(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(request): Json<UpsertTwilioDto>,
) -> Result<Json<TwilioSettingsDto>, ApiError> {
    if request.auth_token.trim().is_empty() {
        return Err(crate::error::validation_error(
            "Auth token cannot be empty",
            serde_json::json!({ "auth_token": "required" }),
        ));
    }

    let ciphertext = crypto::encrypt_credential(
        &state.crypto_key,
        user.id,
        "twilio",
        request.auth_token.trim().as_bytes(),
    )
    .map_err(|e| {
        tracing::error!(error = %e, "Failed to encrypt Twilio auth token");
        ApiError::from(crate::error::ErrorType::InternalServerError)
    })?;

    let repo = IntegrationRepository::new(&state.db);
    let settings = repo
        .upsert_twilio(UpsertTwilioRequest {
            user_id: user.id,
            account_sid: request.account_sid,
            auth_token_ciphertext: ciphertext,
            phone_number: request.phone_number,
        })
        .await?;

    Ok(Json(TwilioSettingsDto::from(settings)))
}
