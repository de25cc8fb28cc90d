//! Shared helpers for integration tests: an in-memory database with the full
//! migration set applied, an app router, fixtures and request plumbing.

#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use jsonwebtoken::{EncodingKey, Header, encode, get_current_timestamp};
use sea_orm::{Database, DatabaseConnection};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use crm::auth::Claims;
use crm::config::AppConfig;
use crm::migration::{Migrator, MigratorTrait};
use crm::models::{LeadSource, Role};
use crm::repositories::{
    CreateDealRequest, CreateLeadRequest, CreatePipelineRequest, CreateUserRequest,
    DealRepository, LeadRepository, PipelineRepository, TeamRepository, UserRepository,
};
use crm::server::{AppState, create_app};

pub const TEST_JWT_SECRET: &str = "test-jwt-secret";

/// Test application: router plus the state behind it.
pub struct TestApp {
    pub app: Router,
    pub state: AppState,
}

/// Configuration for tests: sqlite-friendly, all secrets set.
pub fn test_config() -> AppConfig {
    AppConfig {
        profile: "test".to_string(),
        jwt_secret: Some(TEST_JWT_SECRET.to_string()),
        crypto_key: Some(vec![7u8; 32]),
        ..Default::default()
    }
}

/// Fresh in-memory database with all migrations applied.
pub async fn test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory database");
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    db
}

/// Build the app with the default test configuration.
pub async fn setup_app() -> TestApp {
    setup_app_with_config(test_config()).await
}

/// Build the app with a caller-provided configuration (e.g. gateway settings
/// pointing at a wiremock server).
pub async fn setup_app_with_config(config: AppConfig) -> TestApp {
    let db = test_db().await;
    let state = AppState::new(config, db).expect("Failed to build app state");
    let app = create_app(state.clone());
    TestApp { app, state }
}

/// Mint a bearer token for a user id, valid for an hour.
pub fn token_for(user_id: Uuid) -> String {
    let claims = Claims {
        sub: user_id,
        exp: get_current_timestamp() as usize + 3600,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
    )
    .expect("Failed to encode test token")
}

/// Perform one JSON request against the router and decode the response.
pub async fn request(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    (status, json)
}

/// Perform a multipart upload with a single `csvFile` part.
pub async fn upload_csv(
    app: &Router,
    uri: &str,
    token: &str,
    csv: &str,
) -> (StatusCode, Value) {
    const BOUNDARY: &str = "test-boundary";
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"csvFile\"; filename=\"upload.csv\"\r\nContent-Type: text/csv\r\n\r\n{csv}\r\n--{b}--\r\n",
        b = BOUNDARY,
        csv = csv
    );

    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

    (status, json)
}

// ---- fixtures ----

pub async fn create_team(db: &DatabaseConnection, name: &str) -> Uuid {
    TeamRepository::new(db).create(name).await.unwrap().id
}

pub async fn create_user(db: &DatabaseConnection, role: Role, team_id: Option<Uuid>) -> Uuid {
    UserRepository::new(db)
        .create(CreateUserRequest {
            email: format!("{}@example.com", Uuid::new_v4()),
            full_name: "Test User".to_string(),
            role,
            team_id,
        })
        .await
        .unwrap()
        .id
}

pub async fn create_lead(
    db: &DatabaseConnection,
    owner_user_id: Option<Uuid>,
    team_id: Option<Uuid>,
) -> Uuid {
    LeadRepository::new(db)
        .create(CreateLeadRequest {
            full_name: "Ada Lovelace".to_string(),
            phone: Some(format!("+1555{}", &Uuid::new_v4().simple().to_string()[..7])),
            email: Some(format!("{}@lead.example.com", Uuid::new_v4())),
            country: None,
            city: None,
            language: None,
            source: LeadSource::Manual,
            owner_user_id,
            team_id,
            campaign_id: None,
            utm: None,
            raw_payload: None,
        })
        .await
        .unwrap()
        .id
}

/// Create a pipeline with two stages; returns (pipeline_id, first_stage_id).
pub async fn create_pipeline(db: &DatabaseConnection) -> (Uuid, Uuid) {
    let (pipeline, stages) = PipelineRepository::new(db)
        .create(CreatePipelineRequest {
            name: "Test Pipeline".to_string(),
            stages: vec!["New".to_string(), "Closed".to_string()],
        })
        .await
        .unwrap();
    (pipeline.id, stages[0].id)
}

pub async fn create_deal(
    db: &DatabaseConnection,
    lead_id: Uuid,
    pipeline_id: Uuid,
    stage_id: Uuid,
    created_by: Uuid,
) -> Uuid {
    DealRepository::new(db)
        .create(CreateDealRequest {
            lead_id,
            pipeline_id,
            stage_id,
            title: "Test Deal".to_string(),
            amount_cents: Some(50_000),
            currency: Some("USD".to_string()),
            created_by,
        })
        .await
        .unwrap()
        .id
}
