use crate::config::Config;
use crate::errors::AppError;
use crate::export::{to_csv, CSV_FILE_NAME};
use crate::lead_search::LeadSearcher;
use crate::models::*;
use crate::session::SessionStore;
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

/// Shared application state injected into handlers.
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// Lead search workflow bound to the configured provider.
    pub searcher: LeadSearcher,
    /// Per-session map pin and lead table.
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, AppError> {
        let searcher = LeadSearcher::new(&config)?;
        Ok(Self {
            config,
            searcher,
            sessions: SessionStore::new(),
        })
    }
}

/// Application routes without the network-facing middleware.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/v1/industries", get(list_industries))
        .route("/api/v1/sessions", post(create_session))
        .route("/api/v1/sessions/:id", get(get_session))
        .route("/api/v1/sessions/:id/location", post(resolve_location))
        .route("/api/v1/sessions/:id/leads/search", post(search_leads))
        .route("/api/v1/sessions/:id/leads.csv", get(download_leads_csv))
        .with_state(state)
}

/// Health check endpoint.
///
/// Returns the service status, version and the active lead provider.
pub async fn health(State(state): State<Arc<AppState>>) -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "warehouse-leads-api",
            "version": env!("CARGO_PKG_VERSION"),
            "provider": state.searcher.provider_kind(),
            "default_lead_count": state.config.lead_count,
        })),
    )
}

/// GET /api/v1/industries
///
/// Lists the target industries accepted by the search form.
pub async fn list_industries() -> Json<Vec<&'static str>> {
    Json(TargetIndustry::ALL.iter().map(|i| i.label()).collect())
}

/// POST /api/v1/sessions
pub async fn create_session(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<SessionView>) {
    let session = state.sessions.create().await;
    (StatusCode::CREATED, Json(session.view()))
}

/// GET /api/v1/sessions/:id
pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    let session = state.sessions.get(id).await?;
    Ok(Json(session.view()))
}

/// POST /api/v1/sessions/:id/location
///
/// Resolves a pasted map link or "lat, lng" text into the session's map pin.
/// Text without coordinates leaves the previous pin in place and returns a
/// warning with `success = false`.
pub async fn resolve_location(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<LocationRequest>,
) -> Result<Json<LocationOutcome>, AppError> {
    let (session, resolved) = state
        .sessions
        .update(id, |session| session.apply_location_text(&payload.text))
        .await?;

    match resolved {
        Ok(point) => {
            tracing::info!(
                "Session {} location set to ({}, {})",
                id,
                point.latitude,
                point.longitude
            );
            Ok(Json(LocationOutcome {
                success: true,
                message: "Location updated".to_string(),
                location: Some(point),
            }))
        }
        Err(e @ AppError::ExtractionFailed(_)) => {
            tracing::warn!("Session {} location unchanged: {}", id, e);
            Ok(Json(LocationOutcome {
                success: false,
                message: format!(
                    "Could not find coordinates in the text. Paste a map link containing @lat,lng or a \"lat, lng\" pair. ({})",
                    e
                ),
                location: session.location,
            }))
        }
        Err(e) => Err(e),
    }
}

/// POST /api/v1/sessions/:id/leads/search
///
/// Runs a lead search for the submitted warehouse form. Provider failures
/// return `success = false` and the session's previous leads. Only the lead
/// table of the stored session is replaced once the provider has answered.
pub async fn search_leads(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(request): Json<LeadSearchRequest>,
) -> Result<Json<LeadSearchOutcome>, AppError> {
    state.sessions.get(id).await?;

    let result = state.searcher.run(&request).await;
    let (_, outcome) = state
        .sessions
        .update(id, |session| state.searcher.apply(session, result))
        .await?;

    Ok(Json(outcome?))
}

/// GET /api/v1/sessions/:id/leads.csv
///
/// Downloads the session's current leads as CSV.
pub async fn download_leads_csv(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let session = state.sessions.get(id).await?;
    if session.leads.is_empty() {
        return Err(AppError::NotFound(
            "No leads to export yet, run a search first".to_string(),
        ));
    }

    let body = to_csv(&session.leads)?;
    tracing::info!("Session {} exported {} leads", id, session.leads.len());

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", CSV_FILE_NAME),
            ),
        ],
        body,
    )
        .into_response())
}
