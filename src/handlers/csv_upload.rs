//! # CSV Upload Handlers
//!
//! Multipart uploads with a `csvFile` field. Lead uploads and spend uploads
//! share the per-row error reporting shape; neither is transactional across
//! the file.

use axum::{
    extract::{Multipart, State},
    response::Json,
};

use crate::auth::CurrentUser;
use crate::error::{ApiError, validation_error};
use crate::ingest::{self, ImportSummary};
use crate::server::AppState;

/// Pull the `csvFile` part out of a multipart body.
async fn read_csv_file(multipart: &mut Multipart) -> Result<Vec<u8>, ApiError> {
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        validation_error(
            "Malformed multipart body",
            serde_json::json!({ "error": e.to_string() }),
        )
    })? {
        if field.name() == Some("csvFile") {
            let bytes = field.bytes().await.map_err(|e| {
                validation_error(
                    "Failed to read uploaded file",
                    serde_json::json!({ "error": e.to_string() }),
                )
            })?;
            return Ok(bytes.to_vec());
        }
    }

    Err(validation_error(
        "Missing file field",
        serde_json::json!({ "csvFile": "multipart field is required" }),
    ))
}

/// Import leads from a CSV file
#[utoipa::path(
    post,
    path = "/api/csv-upload/leads",
    security(("bearer_auth" = [])),
    request_body(content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Import summary with per-row errors", body = ImportSummary),
        (status = 400, description = "Malformed upload or CSV", body = ApiError),
        (status = 403, description = "Role not permitted", body = ApiError)
    ),
    tag = "csv-upload"
)]
pub async fn upload_leads(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    mut multipart: Multipart,
) -> Result<Json<ImportSummary>, ApiError> {
    let data = read_csv_file(&mut multipart).await?;

    let summary = ingest::import_leads(&state.db, &data, state.config.csv_max_rows).await?;

    tracing::info!(
        user_id = %user.id,
        imported = summary.imported,
        duplicates = summary.duplicates,
        errors = summary.errors.len(),
        "Lead CSV import finished"
    );

    Ok(Json(summary))
}

/// Import ad spend from a CSV file
#[utoipa::path(
    post,
    path = "/api/csv-upload/spend",
    security(("bearer_auth" = [])),
    request_body(content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Import summary with per-row errors", body = ImportSummary),
        (status = 400, description = "Malformed upload or CSV", body = ApiError),
        (status = 403, description = "Role not permitted", body = ApiError)
    ),
    tag = "csv-upload"
)]
pub async fn upload_spend(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    mut multipart: Multipart,
) -> Result<Json<ImportSummary>, ApiError> {
    let data = read_csv_file(&mut multipart).await?;

    let summary = ingest::import_spend(&state.db, &data, state.config.csv_max_rows).await?;

    tracing::info!(
        user_id = %user.id,
        imported = summary.imported,
        errors = summary.errors.len(),
        "Spend CSV import finished"
    );

    Ok(Json(summary))
}
