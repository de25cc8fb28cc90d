//! # CSV Ingestion
//!
//! Parses lead and ad-spend CSV uploads and persists one record per valid
//! row. Failures are collected per row; nothing is transactional across the
//! file. Duplicate leads (matching phone or email of an existing lead) are
//! counted and logged but still imported.

use axum::http::StatusCode;
use chrono::NaiveDate;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::models::LeadSource;
use crate::repositories::{
    AdSpendRepository, CampaignRepository, CreateLeadRequest, LeadRepository, RepositoryError,
};

/// One failed row and the reason it was rejected.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RowError {
    /// 1-based data row number (the header row is not counted)
    pub row: usize,
    pub message: String,
}

/// Outcome of a CSV import.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ImportSummary {
    /// Rows persisted
    pub imported: usize,
    /// Rows that matched an existing lead by phone or email; these are
    /// imported anyway and reported here
    pub duplicates: usize,
    /// Rows rejected with the reason
    pub errors: Vec<RowError>,
}

/// File-level ingestion failures. Row-level problems land in the summary.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("malformed CSV: {0}")]
    InvalidCsv(String),
    #[error("missing required column '{0}'")]
    MissingColumn(&'static str),
    #[error("CSV exceeds the row limit of {limit}")]
    TooManyRows { limit: usize },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<IngestError> for ApiError {
    fn from(error: IngestError) -> Self {
        match error {
            IngestError::Repository(repo_err) => repo_err.into(),
            other => ApiError::new(
                StatusCode::BAD_REQUEST,
                "VALIDATION_FAILED".to_string(),
                other.to_string(),
            ),
        }
    }
}

#[derive(Debug, Deserialize)]
struct LeadCsvRow {
    #[serde(default)]
    full_name: String,
    #[serde(default)]
    phone: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    country: String,
    #[serde(default)]
    city: String,
    #[serde(default)]
    language: String,
    #[serde(default)]
    source: String,
    #[serde(default)]
    campaign_name: String,
    #[serde(default)]
    utm_source: String,
    #[serde(default)]
    utm_medium: String,
    #[serde(default)]
    utm_campaign: String,
}

#[derive(Debug, Deserialize)]
struct SpendCsvRow {
    #[serde(rename = "Date", default)]
    date: String,
    #[serde(rename = "Campaign", default)]
    campaign: String,
    #[serde(rename = "Spend", default)]
    spend: String,
    #[serde(rename = "Currency", default)]
    currency: String,
}

fn reader_for(data: &[u8]) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(data)
}

fn require_column(headers: &csv::StringRecord, name: &'static str) -> Result<(), IngestError> {
    if headers.iter().any(|h| h == name) {
        Ok(())
    } else {
        Err(IngestError::MissingColumn(name))
    }
}

/// Map the CSV `source` column onto a lead source; anything unrecognized
/// (including blank) counts as a CSV import.
fn parse_source(value: &str) -> LeadSource {
    match value.to_ascii_lowercase().as_str() {
        "meta" | "facebook" => LeadSource::Meta,
        "tiktok" => LeadSource::Tiktok,
        "wordpress" => LeadSource::Wordpress,
        "manual" => LeadSource::Manual,
        _ => LeadSource::CsvImport,
    }
}

/// Parse a money amount like "1234.56" (commas tolerated) into integer
/// cents without going through floating point.
pub fn parse_amount_to_cents(value: &str) -> Option<i64> {
    let cleaned = value.trim().replace(',', "");
    if cleaned.is_empty() {
        return None;
    }

    let (whole, frac) = match cleaned.split_once('.') {
        Some((whole, frac)) => (whole, frac),
        None => (cleaned.as_str(), ""),
    };

    if whole.is_empty() || !whole.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    if frac.len() > 2 || !frac.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let whole: i64 = whole.parse().ok()?;
    let frac_cents: i64 = match frac.len() {
        0 => 0,
        1 => frac.parse::<i64>().ok()? * 10,
        _ => frac.parse().ok()?,
    };

    whole.checked_mul(100)?.checked_add(frac_cents)
}

/// Import leads from a CSV upload.
///
/// Per-row rules: `full_name` required; a row missing both phone and email is
/// an error row; a non-empty `campaign_name` must resolve to an existing
/// campaign. Duplicates are detected by phone/email equality against existing
/// leads and imported anyway.
pub async fn import_leads(
    db: &DatabaseConnection,
    data: &[u8],
    max_rows: usize,
) -> Result<ImportSummary, IngestError> {
    let mut reader = reader_for(data);
    let headers = reader
        .headers()
        .map_err(|e| IngestError::InvalidCsv(e.to_string()))?
        .clone();
    require_column(&headers, "full_name")?;

    let leads = LeadRepository::new(db);
    let campaigns = CampaignRepository::new(db);
    let mut summary = ImportSummary::default();

    for (index, record) in reader.deserialize::<LeadCsvRow>().enumerate() {
        let row_number = index + 1;
        if row_number > max_rows {
            return Err(IngestError::TooManyRows { limit: max_rows });
        }

        let row = match record {
            Ok(row) => row,
            Err(e) => {
                summary.errors.push(RowError {
                    row: row_number,
                    message: format!("unreadable row: {}", e),
                });
                continue;
            }
        };

        if row.full_name.is_empty() {
            summary.errors.push(RowError {
                row: row_number,
                message: "full_name is required".to_string(),
            });
            continue;
        }

        if row.phone.is_empty() && row.email.is_empty() {
            summary.errors.push(RowError {
                row: row_number,
                message: "row must have a phone or an email".to_string(),
            });
            continue;
        }

        let campaign_id = if row.campaign_name.is_empty() {
            None
        } else {
            match campaigns.find_by_name(&row.campaign_name).await? {
                Some(campaign) => Some(campaign.id),
                None => {
                    summary.errors.push(RowError {
                        row: row_number,
                        message: format!("unknown campaign '{}'", row.campaign_name),
                    });
                    continue;
                }
            }
        };

        let phone = (!row.phone.is_empty()).then(|| row.phone.clone());
        let email = (!row.email.is_empty()).then(|| row.email.clone());

        if leads
            .find_duplicate(phone.as_deref(), email.as_deref())
            .await?
            .is_some()
        {
            // Duplicates are reported but still imported.
            tracing::info!(row = row_number, "CSV lead row duplicates an existing lead");
            summary.duplicates += 1;
        }

        let utm = (!row.utm_source.is_empty()
            || !row.utm_medium.is_empty()
            || !row.utm_campaign.is_empty())
        .then(|| {
            json!({
                "utm_source": row.utm_source,
                "utm_medium": row.utm_medium,
                "utm_campaign": row.utm_campaign,
            })
        });

        let raw_payload = json!({
            "full_name": row.full_name,
            "phone": row.phone,
            "email": row.email,
            "country": row.country,
            "city": row.city,
            "language": row.language,
            "source": row.source,
            "campaign_name": row.campaign_name,
        });

        let request = CreateLeadRequest {
            full_name: row.full_name.clone(),
            phone,
            email,
            country: (!row.country.is_empty()).then(|| row.country.clone()),
            city: (!row.city.is_empty()).then(|| row.city.clone()),
            language: (!row.language.is_empty()).then(|| row.language.clone()),
            source: parse_source(&row.source),
            owner_user_id: None,
            team_id: None,
            campaign_id,
            utm,
            raw_payload: Some(raw_payload),
        };

        match leads.create(request).await {
            Ok(_) => summary.imported += 1,
            Err(RepositoryError::Validation(message)) => {
                summary.errors.push(RowError {
                    row: row_number,
                    message,
                });
            }
            Err(other) => return Err(other.into()),
        }
    }

    metrics::counter!("csv_leads_imported_total").increment(summary.imported as u64);
    metrics::counter!("csv_lead_duplicates_total").increment(summary.duplicates as u64);

    Ok(summary)
}

/// Import ad-spend records from a CSV upload with columns
/// `Date, Campaign, Spend, Currency`.
pub async fn import_spend(
    db: &DatabaseConnection,
    data: &[u8],
    max_rows: usize,
) -> Result<ImportSummary, IngestError> {
    let mut reader = reader_for(data);
    let headers = reader
        .headers()
        .map_err(|e| IngestError::InvalidCsv(e.to_string()))?
        .clone();
    // Header names for spend files follow the upload template exactly.
    for column in ["Date", "Campaign", "Spend", "Currency"] {
        require_column(&headers, column)?;
    }

    let campaigns = CampaignRepository::new(db);
    let spend = AdSpendRepository::new(db);
    let mut summary = ImportSummary::default();

    for (index, record) in reader.deserialize::<SpendCsvRow>().enumerate() {
        let row_number = index + 1;
        if row_number > max_rows {
            return Err(IngestError::TooManyRows { limit: max_rows });
        }

        let row = match record {
            Ok(row) => row,
            Err(e) => {
                summary.errors.push(RowError {
                    row: row_number,
                    message: format!("unreadable row: {}", e),
                });
                continue;
            }
        };

        let Ok(date) = NaiveDate::parse_from_str(&row.date, "%Y-%m-%d") else {
            summary.errors.push(RowError {
                row: row_number,
                message: format!("invalid date '{}', expected YYYY-MM-DD", row.date),
            });
            continue;
        };

        let campaign = match campaigns.find_by_name(&row.campaign).await? {
            Some(campaign) => campaign,
            None => {
                summary.errors.push(RowError {
                    row: row_number,
                    message: format!("unknown campaign '{}'", row.campaign),
                });
                continue;
            }
        };

        let Some(amount_cents) = parse_amount_to_cents(&row.spend) else {
            summary.errors.push(RowError {
                row: row_number,
                message: format!("invalid spend amount '{}'", row.spend),
            });
            continue;
        };

        if row.currency.is_empty() {
            summary.errors.push(RowError {
                row: row_number,
                message: "Currency is required".to_string(),
            });
            continue;
        }

        match spend
            .create(campaign.id, date, amount_cents, &row.currency)
            .await
        {
            Ok(_) => summary.imported += 1,
            Err(RepositoryError::Validation(message)) => {
                summary.errors.push(RowError {
                    row: row_number,
                    message,
                });
            }
            Err(other) => return Err(other.into()),
        }
    }

    metrics::counter!("csv_spend_imported_total").increment(summary.imported as u64);

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amounts_parse_to_cents() {
        assert_eq!(parse_amount_to_cents("0"), Some(0));
        assert_eq!(parse_amount_to_cents("12"), Some(1200));
        assert_eq!(parse_amount_to_cents("12.3"), Some(1230));
        assert_eq!(parse_amount_to_cents("12.34"), Some(1234));
        assert_eq!(parse_amount_to_cents("1,234.56"), Some(123_456));
        assert_eq!(parse_amount_to_cents(" 7.00 "), Some(700));
    }

    #[test]
    fn malformed_amounts_are_rejected() {
        assert_eq!(parse_amount_to_cents(""), None);
        assert_eq!(parse_amount_to_cents("abc"), None);
        assert_eq!(parse_amount_to_cents("12.345"), None);
        assert_eq!(parse_amount_to_cents("-5"), None);
        assert_eq!(parse_amount_to_cents("."), None);
        assert_eq!(parse_amount_to_cents("12."), Some(1200));
    }

    #[test]
    fn sources_fall_back_to_csv_import() {
        assert_eq!(parse_source("meta"), LeadSource::Meta);
        assert_eq!(parse_source("Facebook"), LeadSource::Meta);
        assert_eq!(parse_source("TIKTOK"), LeadSource::Tiktok);
        assert_eq!(parse_source("wordpress"), LeadSource::Wordpress);
        assert_eq!(parse_source("manual"), LeadSource::Manual);
        assert_eq!(parse_source(""), LeadSource::CsvImport);
        assert_eq!(parse_source("billboard"), LeadSource::CsvImport);
    }
}
