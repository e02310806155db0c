use chrono::{DateTime, Utc};
use moka::future::Cache;
use moka::ops::compute::Op;
use std::time::Duration;
use uuid::Uuid;

use crate::errors::AppError;
use crate::location;
use crate::models::{ContactRecord, LocationPoint, ProviderKind, SessionView};

/// State owned by one interactive session: the current map pin and the
/// current lead table.
#[derive(Debug, Clone)]
pub struct LeadSession {
    pub id: Uuid,
    pub location: Option<LocationPoint>,
    pub leads: Vec<ContactRecord>,
    /// Provider that produced `leads`.
    pub provider: Option<ProviderKind>,
    pub updated_at: DateTime<Utc>,
}

impl LeadSession {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            location: None,
            leads: Vec::new(),
            provider: None,
            updated_at: Utc::now(),
        }
    }

    /// Resolves `text` and stores the pin on success.
    ///
    /// On failure the previously stored pin stays in place.
    pub fn apply_location_text(&mut self, text: &str) -> Result<LocationPoint, AppError> {
        let point = location::resolve(text)?;
        self.location = Some(point);
        self.updated_at = Utc::now();
        Ok(point)
    }

    /// Replaces the whole lead table in one step.
    pub fn replace_leads(&mut self, leads: Vec<ContactRecord>, provider: ProviderKind) {
        self.leads = leads;
        self.provider = Some(provider);
        self.updated_at = Utc::now();
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            session_id: self.id,
            location: self.location,
            provider: self.provider,
            leads: self.leads.clone(),
            updated_at: self.updated_at,
        }
    }
}

impl Default for LeadSession {
    fn default() -> Self {
        Self::new()
    }
}

/// In-memory session registry.
///
/// Writes go through [`SessionStore::update`], which applies a change to the
/// stored entry under the cache's per-key lock. A slow lead search therefore
/// never writes back a stale copy over a location set in the meantime.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Cache<Uuid, LeadSession>,
}

impl SessionStore {
    /// Sessions idle for 24 hours are dropped; at most 10k are kept.
    pub fn new() -> Self {
        Self::with_limits(Duration::from_secs(86_400), 10_000)
    }

    pub fn with_limits(time_to_idle: Duration, max_capacity: u64) -> Self {
        Self {
            sessions: Cache::builder()
                .time_to_idle(time_to_idle)
                .max_capacity(max_capacity)
                .build(),
        }
    }

    pub async fn create(&self) -> LeadSession {
        let session = LeadSession::new();
        self.sessions.insert(session.id, session.clone()).await;
        tracing::info!("Created session {}", session.id);
        session
    }

    pub async fn get(&self, id: Uuid) -> Result<LeadSession, AppError> {
        self.sessions
            .get(&id)
            .await
            .ok_or_else(|| AppError::NotFound(format!("Session {} not found", id)))
    }

    /// Applies `change` to the current stored session and returns the updated
    /// session together with the closure's result.
    pub async fn update<F, R>(&self, id: Uuid, change: F) -> Result<(LeadSession, R), AppError>
    where
        F: FnOnce(&mut LeadSession) -> R,
    {
        let mut updated = None;
        self.sessions
            .entry(id)
            .and_compute_with(|current| {
                let op = match current {
                    Some(entry) => {
                        let mut session = entry.into_value();
                        let output = change(&mut session);
                        updated = Some((session.clone(), output));
                        Op::Put(session)
                    }
                    None => Op::Nop,
                };
                std::future::ready(op)
            })
            .await;

        updated.ok_or_else(|| AppError::NotFound(format!("Session {} not found", id)))
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
