//! # Server Configuration
//!
//! This module contains the application state, router assembly and server
//! startup for the CRM API.

use std::sync::Arc;

use axum::{
    Router,
    extract::Request,
    handler::Handler,
    middleware::{Next, from_fn, from_fn_with_state},
    routing::{get, post, put},
};
use sea_orm::DatabaseConnection;
use tokio_util::sync::CancellationToken;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::auth::{auth_middleware, authorize_roles};
use crate::config::AppConfig;
use crate::crypto::CryptoKey;
use crate::gateway::GatewayClient;
use crate::handlers::{
    self, campaigns, csv_upload, deals, gateway, integrations, leads, notes, pipelines,
};
use crate::models::Role;
use crate::telemetry;

/// Role allow-lists per route group. Admins are on every list.
const ADMIN_ONLY: &[Role] = &[Role::SuperAdmin, Role::Admin];
const CAMPAIGN_WRITERS: &[Role] = &[Role::SuperAdmin, Role::Admin, Role::Manager, Role::Marketing];
const LEAD_UPLOADERS: &[Role] = &[Role::SuperAdmin, Role::Admin, Role::Manager, Role::Marketing];
const SPEND_UPLOADERS: &[Role] = &[Role::SuperAdmin, Role::Admin, Role::Marketing];

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: DatabaseConnection,
    pub crypto_key: CryptoKey,
    pub gateway: GatewayClient,
}

impl AppState {
    /// Build the application state from configuration and a live database
    /// connection.
    pub fn new(config: AppConfig, db: DatabaseConnection) -> anyhow::Result<Self> {
        let crypto_key = CryptoKey::new(
            config
                .crypto_key
                .clone()
                .ok_or_else(|| anyhow::anyhow!("crypto key is not configured"))?,
        )
        .map_err(|e| anyhow::anyhow!("invalid crypto key: {}", e))?;

        let gateway = GatewayClient::from_config(&config.gateway)?;

        Ok(Self {
            config: Arc::new(config),
            db,
            crypto_key,
            gateway,
        })
    }
}

/// Creates and configures the Axum application router
pub fn create_app(state: AppState) -> Router {
    // Gateway webhooks and service endpoints are not behind bearer auth.
    let public = Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route(
            "/api/integrations/{provider}/webhook",
            post(gateway::receive_webhook),
        );

    let protected = Router::new()
        .route(
            "/api/leads",
            get(leads::list_leads).post(leads::create_lead),
        )
        .route(
            "/api/leads/{id}",
            get(leads::get_lead).patch(leads::update_lead).delete(
                leads::delete_lead
                    .layer(from_fn(|req: Request, next: Next| authorize_roles(req, next, ADMIN_ONLY))),
            ),
        )
        .route(
            "/api/leads/{lead_id}/notes",
            get(notes::list_notes).post(notes::create_note),
        )
        .route(
            "/api/deals",
            get(deals::list_deals).post(deals::create_deal),
        )
        .route(
            "/api/deals/{id}",
            get(deals::get_deal)
                .patch(deals::update_deal)
                .delete(deals::delete_deal),
        )
        .route(
            "/api/pipelines",
            get(pipelines::list_pipelines).post(
                pipelines::create_pipeline
                    .layer(from_fn(|req: Request, next: Next| authorize_roles(req, next, ADMIN_ONLY))),
            ),
        )
        .route(
            "/api/pipelines/{id}",
            axum::routing::delete(
                pipelines::delete_pipeline
                    .layer(from_fn(|req: Request, next: Next| authorize_roles(req, next, ADMIN_ONLY))),
            ),
        )
        .route(
            "/api/campaigns",
            get(campaigns::list_campaigns).post(campaigns::create_campaign.layer(from_fn(
                |req: Request, next: Next| authorize_roles(req, next, CAMPAIGN_WRITERS),
            ))),
        )
        .route(
            "/api/campaigns/{id}/spend",
            get(campaigns::list_campaign_spend),
        )
        .route(
            "/api/integrations",
            get(integrations::list_integrations),
        )
        .route(
            "/api/integrations/twilio",
            get(integrations::get_twilio_settings).put(integrations::upsert_twilio_settings),
        )
        .route(
            "/api/integrations/{provider}",
            put(integrations::upsert_integration),
        )
        .route(
            "/api/csv-upload/leads",
            post(
                csv_upload::upload_leads
                    .layer(from_fn(|req: Request, next: Next| authorize_roles(req, next, LEAD_UPLOADERS))),
            ),
        )
        .route(
            "/api/csv-upload/spend",
            post(
                csv_upload::upload_spend
                    .layer(from_fn(|req: Request, next: Next| authorize_roles(req, next, SPEND_UPLOADERS))),
            ),
        )
        .layer(from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public)
        .merge(protected)
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
        .layer(from_fn(telemetry::trace_context_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Starts the server with the given state.
pub async fn run_server(state: AppState) -> anyhow::Result<()> {
    let addr = state
        .config
        .bind_addr()
        .map_err(|e| anyhow::anyhow!("Invalid server address: {}", e))?;

    let profile = state.config.profile.clone();
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, profile, "Server listening");

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutdown signal received");
            signal_token.cancel();
        }
    });

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await?;

    Ok(())
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::root,
        crate::handlers::health,
        crate::handlers::leads::list_leads,
        crate::handlers::leads::create_lead,
        crate::handlers::leads::get_lead,
        crate::handlers::leads::update_lead,
        crate::handlers::leads::delete_lead,
        crate::handlers::notes::list_notes,
        crate::handlers::notes::create_note,
        crate::handlers::deals::list_deals,
        crate::handlers::deals::create_deal,
        crate::handlers::deals::get_deal,
        crate::handlers::deals::update_deal,
        crate::handlers::deals::delete_deal,
        crate::handlers::pipelines::list_pipelines,
        crate::handlers::pipelines::create_pipeline,
        crate::handlers::pipelines::delete_pipeline,
        crate::handlers::campaigns::list_campaigns,
        crate::handlers::campaigns::create_campaign,
        crate::handlers::campaigns::list_campaign_spend,
        crate::handlers::integrations::list_integrations,
        crate::handlers::integrations::upsert_integration,
        crate::handlers::integrations::get_twilio_settings,
        crate::handlers::integrations::upsert_twilio_settings,
        crate::handlers::csv_upload::upload_leads,
        crate::handlers::csv_upload::upload_spend,
        crate::handlers::gateway::receive_webhook,
    ),
    components(
        schemas(
            crate::models::ServiceInfo,
            crate::models::Role,
            crate::models::LeadSource,
            crate::models::LeadStatus,
            crate::models::IntegrationProvider,
            crate::models::deal::DealState,
            crate::error::ApiError,
            crate::handlers::HealthResponse,
            crate::handlers::leads::LeadDto,
            crate::handlers::leads::CreateLeadDto,
            crate::handlers::leads::UpdateLeadDto,
            crate::handlers::notes::NoteDto,
            crate::handlers::notes::CreateNoteDto,
            crate::handlers::deals::DealDto,
            crate::handlers::deals::CreateDealDto,
            crate::handlers::deals::UpdateDealDto,
            crate::handlers::pipelines::PipelineDto,
            crate::handlers::pipelines::StageDto,
            crate::handlers::pipelines::CreatePipelineDto,
            crate::handlers::campaigns::CampaignDto,
            crate::handlers::campaigns::CreateCampaignDto,
            crate::handlers::campaigns::AdSpendDto,
            crate::handlers::integrations::IntegrationDto,
            crate::handlers::integrations::UpsertIntegrationDto,
            crate::handlers::integrations::TwilioSettingsDto,
            crate::handlers::integrations::UpsertTwilioDto,
            crate::ingest::ImportSummary,
            crate::ingest::RowError,
        )
    ),
    info(
        title = "CRM API",
        description = "Multi-tenant CRM backend: leads, deals, pipelines, campaigns, integrations",
        version = env!("CARGO_PKG_VERSION"),
    )
)]
pub struct ApiDoc;
