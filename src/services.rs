use crate::config::Config;
use crate::errors::AppError;
use crate::models::{ProviderKind, WarehouseProfile};
use crate::normalizer::{extract_generative_items, ProviderPayload};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

/// Builds the shared HTTP client used by every provider.
pub fn build_http_client() -> Result<Client, AppError> {
    Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .map_err(|e| AppError::InternalError(format!("Failed to create HTTP client: {}", e)))
}

/// Prompt asking a generative model for `count` tenant prospects.
pub fn build_lead_prompt(profile: &WarehouseProfile, count: usize) -> String {
    format!(
        r#"Act as a professional industrial lead researcher.
Provide {count} real-world companies in the '{industry}' industry located in or near {city}, {state}.

Format the output as a JSON object with a "leads" list whose items have these exact keys:
"Company Name", "Address", "Person Name", "Person Mail ID", "Person LinkedIn Profile ID", "Contact Number", "Match Score"

Rules:
- Person Name should be a likely Manager or Director.
- Person Mail ID must be a professional text format (e.g., info@company.com).
- Person LinkedIn Profile ID must be a plain text URL.
- Address must be a physical location in {city}.
- Match Score should be a percentage (e.g., 95%) based on need for {area} sq ft space."#,
        count = count,
        industry = profile.target_industry,
        city = profile.city.trim(),
        state = profile.state.trim(),
        area = format_area(profile.area_sqft),
    )
}

/// Query text sent to the search providers.
pub fn build_search_query(profile: &WarehouseProfile) -> String {
    format!(
        "{} companies near {}, {}",
        profile.target_industry,
        profile.city.trim(),
        profile.state.trim()
    )
}

fn format_area(area: u32) -> String {
    let digits = area.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Reads an error body and turns a non-success response into an error.
async fn ensure_success(
    response: reqwest::Response,
    provider: &str,
) -> Result<reqwest::Response, AppError> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let error_text = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    tracing::error!("{} returned error {}: {}", provider, status, error_text);
    Err(AppError::UpstreamUnavailable(format!(
        "{} returned status {}",
        provider, status
    )))
}

// ============ OpenAI ============

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Asks a chat-completion model to write lead rows as JSON.
#[derive(Clone)]
pub struct OpenAiLeadService {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiLeadService {
    pub fn new(client: Client, config: &Config) -> Result<Self, AppError> {
        let api_key = config.openai_api_key.clone().ok_or_else(|| {
            AppError::UpstreamUnavailable("OPENAI_API_KEY is not configured".to_string())
        })?;
        Ok(Self {
            client,
            base_url: config.openai_base_url.clone(),
            api_key,
            model: config.openai_model.clone(),
        })
    }

    pub async fn generate_leads(
        &self,
        profile: &WarehouseProfile,
        count: usize,
    ) -> Result<Vec<Value>, AppError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = json!({
            "model": self.model,
            "messages": [{"role": "user", "content": build_lead_prompt(profile, count)}],
            "response_format": {"type": "json_object"}
        });

        tracing::info!(
            "Requesting {} '{}' leads from {} for {}, {}",
            count,
            profile.target_industry,
            self.model,
            profile.city,
            profile.state
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::UpstreamUnavailable(format!("OpenAI request failed: {}", e)))?;

        let response = ensure_success(response, "OpenAI").await?;

        let completion: ChatCompletionResponse = response.json().await.map_err(|e| {
            AppError::UpstreamUnavailable(format!("Failed to parse OpenAI response: {}", e))
        })?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                AppError::UpstreamUnavailable("OpenAI response had no message content".to_string())
            })?;

        let items = extract_generative_items(&content)?;
        tracing::info!("OpenAI returned {} lead items", items.len());
        Ok(items)
    }
}

// ============ Serper (web search and places) ============

/// Google search via the Serper API: organic web results and local places.
#[derive(Clone)]
pub struct SerperService {
    client: Client,
    base_url: String,
    api_key: String,
}

impl SerperService {
    pub fn new(client: Client, config: &Config) -> Result<Self, AppError> {
        let api_key = config.serper_api_key.clone().ok_or_else(|| {
            AppError::UpstreamUnavailable("SERPER_API_KEY is not configured".to_string())
        })?;
        Ok(Self {
            client,
            base_url: config.serper_base_url.clone(),
            api_key,
        })
    }

    /// Organic web results (`organic` array).
    pub async fn search_web(&self, query: &str, count: usize) -> Result<Vec<Value>, AppError> {
        self.post("search", "organic", query, count).await
    }

    /// Local business listings (`places` array).
    pub async fn search_places(&self, query: &str, count: usize) -> Result<Vec<Value>, AppError> {
        self.post("places", "places", query, count).await
    }

    async fn post(
        &self,
        endpoint: &str,
        result_key: &str,
        query: &str,
        count: usize,
    ) -> Result<Vec<Value>, AppError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        tracing::info!("Serper /{} query: {}", endpoint, query);

        let response = self
            .client
            .post(&url)
            .header("X-API-KEY", &self.api_key)
            .json(&json!({"q": query, "num": count}))
            .send()
            .await
            .map_err(|e| AppError::UpstreamUnavailable(format!("Serper request failed: {}", e)))?;

        let response = ensure_success(response, "Serper").await?;

        let mut data: Value = response.json().await.map_err(|e| {
            AppError::UpstreamUnavailable(format!("Failed to parse Serper response: {}", e))
        })?;

        let items = match data.get_mut(result_key).map(Value::take) {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        };
        tracing::info!("Serper /{} returned {} items", endpoint, items.len());
        Ok(items)
    }
}

// ============ SerpApi ============

/// Google results through the SerpApi wrapper service.
#[derive(Clone)]
pub struct SerpApiService {
    client: Client,
    base_url: String,
    api_key: String,
}

impl SerpApiService {
    pub fn new(client: Client, config: &Config) -> Result<Self, AppError> {
        let api_key = config.serpapi_api_key.clone().ok_or_else(|| {
            AppError::UpstreamUnavailable("SERPAPI_API_KEY is not configured".to_string())
        })?;
        Ok(Self {
            client,
            base_url: config.serpapi_base_url.clone(),
            api_key,
        })
    }

    /// Local results when Google shows a map pack, organic results otherwise.
    pub async fn search(&self, query: &str, count: usize) -> Result<Vec<Value>, AppError> {
        let num = count.to_string();
        // Build URL with proper parameter encoding
        let url = reqwest::Url::parse_with_params(
            &format!("{}/search.json", self.base_url),
            &[
                ("engine", "google"),
                ("q", query),
                ("num", num.as_str()),
                ("api_key", self.api_key.as_str()),
            ],
        )
        .map_err(|e| AppError::InternalError(format!("Failed to build URL: {}", e)))?;

        tracing::info!("SerpApi query: {}", query);
        // Redact key from logs
        tracing::debug!(
            "SerpApi URL: {}/search.json?engine=google&api_key=[REDACTED]",
            self.base_url
        );

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::UpstreamUnavailable(format!("SerpApi request failed: {}", e)))?;

        let response = ensure_success(response, "SerpApi").await?;

        let data: Value = response.json().await.map_err(|e| {
            AppError::UpstreamUnavailable(format!("Failed to parse SerpApi response: {}", e))
        })?;

        let items = serpapi_items(data);
        tracing::info!("SerpApi returned {} items", items.len());
        Ok(items)
    }
}

/// Picks the result list out of a SerpApi response.
fn serpapi_items(mut data: Value) -> Vec<Value> {
    let local = data.get_mut("local_results").map(Value::take);
    match local {
        Some(Value::Object(mut local)) => {
            if let Some(Value::Array(places)) = local.remove("places") {
                return places;
            }
        }
        Some(Value::Array(places)) => return places,
        _ => {}
    }
    match data.get_mut("organic_results").map(Value::take) {
        Some(Value::Array(items)) => items,
        _ => Vec::new(),
    }
}

// ============ Provider selection ============

/// An upstream service that returns raw lead items.
#[derive(Clone)]
pub enum RemoteProvider {
    OpenAi(OpenAiLeadService),
    WebSearch(SerperService),
    LocalBusiness(SerperService),
    SerpApi(SerpApiService),
}

impl RemoteProvider {
    pub fn kind(&self) -> ProviderKind {
        match self {
            RemoteProvider::OpenAi(_) => ProviderKind::OpenAi,
            RemoteProvider::WebSearch(_) => ProviderKind::WebSearch,
            RemoteProvider::LocalBusiness(_) => ProviderKind::LocalBusiness,
            RemoteProvider::SerpApi(_) => ProviderKind::SerpApi,
        }
    }

    /// Key identifying one provider request, used for response caching.
    pub fn request_key(&self, profile: &WarehouseProfile, count: usize) -> String {
        match self {
            RemoteProvider::OpenAi(_) => format!(
                "{}:{}:{}:{}",
                self.kind(),
                count,
                profile.area_sqft,
                build_search_query(profile).to_lowercase()
            ),
            _ => format!(
                "{}:{}:{}",
                self.kind(),
                count,
                build_search_query(profile).to_lowercase()
            ),
        }
    }

    /// Calls the external provider once.
    pub async fn fetch(
        &self,
        profile: &WarehouseProfile,
        count: usize,
    ) -> Result<ProviderPayload, AppError> {
        let query = build_search_query(profile);
        let payload = match self {
            RemoteProvider::OpenAi(service) => {
                ProviderPayload::Generative(service.generate_leads(profile, count).await?)
            }
            RemoteProvider::WebSearch(service) => {
                ProviderPayload::WebSearch(service.search_web(&query, count).await?)
            }
            RemoteProvider::LocalBusiness(service) => {
                ProviderPayload::LocalBusiness(service.search_places(&query, count).await?)
            }
            RemoteProvider::SerpApi(service) => {
                ProviderPayload::SearchEngine(service.search(&query, count).await?)
            }
        };
        Ok(payload)
    }
}

/// The configured source of leads.
#[derive(Clone)]
pub enum LeadProvider {
    Remote(RemoteProvider),
    /// Placeholder rows, used when no credential is configured.
    Mock,
}

impl LeadProvider {
    /// Builds the provider chosen by [`Config::resolve_provider`].
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        let kind = config.resolve_provider().map_err(|e| {
            AppError::InternalError(format!("Invalid provider configuration: {}", e))
        })?;

        let remote = match kind {
            ProviderKind::Mock => return Ok(LeadProvider::Mock),
            ProviderKind::OpenAi => {
                RemoteProvider::OpenAi(OpenAiLeadService::new(build_http_client()?, config)?)
            }
            ProviderKind::WebSearch => {
                RemoteProvider::WebSearch(SerperService::new(build_http_client()?, config)?)
            }
            ProviderKind::LocalBusiness => {
                RemoteProvider::LocalBusiness(SerperService::new(build_http_client()?, config)?)
            }
            ProviderKind::SerpApi => {
                RemoteProvider::SerpApi(SerpApiService::new(build_http_client()?, config)?)
            }
        };
        Ok(LeadProvider::Remote(remote))
    }

    pub fn kind(&self) -> ProviderKind {
        match self {
            LeadProvider::Remote(remote) => remote.kind(),
            LeadProvider::Mock => ProviderKind::Mock,
        }
    }
}
