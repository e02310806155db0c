/// Lead search workflow shared by the HTTP handlers and tests
///
/// Steps for one search action:
/// 1. Validate the warehouse form
/// 2. Use mock rows when no provider is configured
/// 3. Serve the provider payload from the response cache, or call the
///    provider through the circuit breaker and cache the result
/// 4. Normalize into contact records
/// 5. Swap the session's lead table, or keep it and report a warning
///
/// Steps 1-4 ([`LeadSearcher::run`]) never touch a session, so callers can
/// await the provider without holding session state and apply the result
/// ([`LeadSearcher::apply`]) to the current stored entry afterwards.
use failsafe::futures::CircuitBreaker;
use moka::future::Cache;
use std::time::Duration;

use crate::cache_validator::ValidatedCacheEntry;
use crate::circuit_breaker::{create_provider_circuit_breaker, ProviderCircuitBreaker};
use crate::config::Config;
use crate::errors::{AppError, ResultExt};
use crate::mock::generate_mock;
use crate::models::{ContactRecord, LeadSearchOutcome, LeadSearchRequest, ProviderKind};
use crate::normalizer::{Normalizer, ProviderPayload};
use crate::services::{LeadProvider, RemoteProvider};
use crate::session::LeadSession;

/// Largest number of leads a single search may ask for.
pub const MAX_LEADS_PER_SEARCH: usize = 50;

/// Runs lead searches against the configured provider.
pub struct LeadSearcher {
    provider: LeadProvider,
    normalizer: Normalizer,
    default_count: usize,
    /// Provider payloads keyed by [`RemoteProvider::request_key`] (1 hour TTL).
    response_cache: Cache<String, ValidatedCacheEntry>,
    breaker: ProviderCircuitBreaker,
}

impl LeadSearcher {
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let provider = LeadProvider::from_config(config)?;
        Ok(Self::with_provider(provider, config))
    }

    pub fn with_provider(provider: LeadProvider, config: &Config) -> Self {
        Self {
            provider,
            normalizer: Normalizer::new(config.default_phone_region),
            default_count: config.lead_count,
            response_cache: Cache::builder()
                .time_to_live(Duration::from_secs(3600))
                .max_capacity(1_000)
                .build(),
            breaker: create_provider_circuit_breaker(),
        }
    }

    pub fn provider_kind(&self) -> ProviderKind {
        self.provider.kind()
    }

    /// Runs one search and updates `session` on success.
    ///
    /// Upstream failures and empty results are not errors: the outcome carries
    /// `success = false`, a warning message, and the session's previous leads.
    /// Invalid form input is returned as `BadRequest`.
    pub async fn search(
        &self,
        session: &mut LeadSession,
        request: &LeadSearchRequest,
    ) -> Result<LeadSearchOutcome, AppError> {
        let result = self.run(request).await;
        self.apply(session, result)
    }

    /// Fetches and normalizes leads for `request` without touching any session.
    pub async fn run(&self, request: &LeadSearchRequest) -> Result<Vec<ContactRecord>, AppError> {
        let count = self.validate(request)?;
        let kind = self.provider.kind();

        tracing::info!(
            "Lead search: provider={}, industry='{}', city='{}', count={}",
            kind,
            request.warehouse.target_industry,
            request.warehouse.city,
            count
        );

        match &self.provider {
            LeadProvider::Mock => Ok(generate_mock(count)),
            LeadProvider::Remote(remote) => self
                .fetch_leads(remote, request, count)
                .await
                .with_context(|| format!("{} lead search", kind)),
        }
    }

    /// Folds the result of [`LeadSearcher::run`] into `session`.
    ///
    /// Success replaces the lead table in one step; upstream failures leave it
    /// untouched and are reported in the outcome. Other errors are returned.
    pub fn apply(
        &self,
        session: &mut LeadSession,
        result: Result<Vec<ContactRecord>, AppError>,
    ) -> Result<LeadSearchOutcome, AppError> {
        let kind = self.provider.kind();
        match result {
            Ok(leads) => {
                let message = if kind == ProviderKind::Mock {
                    format!(
                        "Generated {} sample leads (no provider API key configured)",
                        leads.len()
                    )
                } else {
                    format!("Generated {} leads", leads.len())
                };
                tracing::info!("Session {}: {}", session.id, message);
                session.replace_leads(leads, kind);
                Ok(LeadSearchOutcome {
                    success: true,
                    message,
                    provider: kind,
                    leads: session.leads.clone(),
                })
            }
            Err(e) if e.is_upstream() => {
                tracing::warn!("Session {} keeps previous leads: {}", session.id, e);
                Ok(LeadSearchOutcome {
                    success: false,
                    message: e.root().to_string(),
                    provider: kind,
                    leads: session.leads.clone(),
                })
            }
            Err(e) => Err(e),
        }
    }

    fn validate(&self, request: &LeadSearchRequest) -> Result<usize, AppError> {
        let warehouse = &request.warehouse;
        if warehouse.city.trim().is_empty() {
            return Err(AppError::BadRequest("City is required".to_string()));
        }
        if warehouse.state.trim().is_empty() {
            return Err(AppError::BadRequest("State is required".to_string()));
        }

        let count = request.count.unwrap_or(self.default_count);
        if count == 0 || count > MAX_LEADS_PER_SEARCH {
            return Err(AppError::BadRequest(format!(
                "count must be between 1 and {}",
                MAX_LEADS_PER_SEARCH
            )));
        }
        Ok(count)
    }

    async fn fetch_leads(
        &self,
        remote: &RemoteProvider,
        request: &LeadSearchRequest,
        count: usize,
    ) -> Result<Vec<ContactRecord>, AppError> {
        let payload = self.fetch_payload(remote, request, count).await?;
        if payload.items().is_empty() {
            return Err(AppError::EmptyResultSet);
        }

        let mut leads = self.normalizer.normalize(&payload);
        leads.truncate(count);
        Ok(leads)
    }

    async fn fetch_payload(
        &self,
        remote: &RemoteProvider,
        request: &LeadSearchRequest,
        count: usize,
    ) -> Result<ProviderPayload, AppError> {
        let cache_key = remote.request_key(&request.warehouse, count);

        if let Some(entry) = self.response_cache.get(&cache_key).await {
            if let Some(payload) = entry.into_payload() {
                tracing::debug!("Provider cache HIT (validated): {}", cache_key);
                return Ok(payload);
            }
            tracing::warn!("Cache validation failed for {}, refetching", cache_key);
        }

        tracing::info!("Provider cache MISS: {}", cache_key);
        let payload = self
            .breaker
            .call(remote.fetch(&request.warehouse, count))
            .await
            .map_err(|e| match e {
                failsafe::Error::Inner(inner) => inner,
                failsafe::Error::Rejected => AppError::UpstreamUnavailable(
                    "provider paused after repeated failures, try again shortly".to_string(),
                ),
            })?;

        if !payload.items().is_empty() {
            if let Some(entry) = ValidatedCacheEntry::from_payload(&payload) {
                self.response_cache.insert(cache_key, entry).await;
            }
        }
        Ok(payload)
    }
}
