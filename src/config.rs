use phonenumber::country::Id as CountryId;

use crate::contact_validation::parse_region;
use crate::models::ProviderKind;

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";
pub const DEFAULT_SERPER_BASE_URL: &str = "https://google.serper.dev";
pub const DEFAULT_SERPAPI_BASE_URL: &str = "https://serpapi.com";

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Explicit provider choice; `None` picks the first configured credential.
    pub lead_provider: Option<ProviderKind>,
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub openai_model: String,
    pub serper_api_key: Option<String>,
    pub serper_base_url: String,
    pub serpapi_api_key: Option<String>,
    pub serpapi_base_url: String,
    /// Leads requested per search when the request does not say.
    pub lead_count: usize,
    /// Region used to read phone numbers written without a country prefix.
    pub default_phone_region: CountryId,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            lead_provider: None,
            openai_api_key: None,
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            openai_model: DEFAULT_OPENAI_MODEL.to_string(),
            serper_api_key: None,
            serper_base_url: DEFAULT_SERPER_BASE_URL.to_string(),
            serpapi_api_key: None,
            serpapi_base_url: DEFAULT_SERPAPI_BASE_URL.to_string(),
            lead_count: 10,
            default_phone_region: CountryId::IN,
        }
    }
}

fn optional_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn base_url_var(name: &str, default: &str) -> anyhow::Result<String> {
    match optional_var(name) {
        None => Ok(default.to_string()),
        Some(url) => {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                anyhow::bail!("{} must start with http:// or https://", name);
            }
            Ok(url.trim_end_matches('/').to_string())
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            lead_provider: optional_var("LEAD_PROVIDER")
                .map(|p| {
                    p.parse::<ProviderKind>()
                        .map_err(|e| anyhow::anyhow!("LEAD_PROVIDER: {}", e))
                })
                .transpose()?,
            openai_api_key: optional_var("OPENAI_API_KEY"),
            openai_base_url: base_url_var("OPENAI_BASE_URL", DEFAULT_OPENAI_BASE_URL)?,
            openai_model: optional_var("OPENAI_MODEL")
                .unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            serper_api_key: optional_var("SERPER_API_KEY"),
            serper_base_url: base_url_var("SERPER_BASE_URL", DEFAULT_SERPER_BASE_URL)?,
            serpapi_api_key: optional_var("SERPAPI_API_KEY"),
            serpapi_base_url: base_url_var("SERPAPI_BASE_URL", DEFAULT_SERPAPI_BASE_URL)?,
            lead_count: optional_var("LEAD_COUNT")
                .unwrap_or_else(|| "10".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("LEAD_COUNT must be a positive number"))
                .and_then(|count: usize| {
                    if count == 0 || count > 50 {
                        anyhow::bail!("LEAD_COUNT must be between 1 and 50");
                    }
                    Ok(count)
                })?,
            default_phone_region: optional_var("DEFAULT_PHONE_REGION")
                .map(|code| {
                    parse_region(&code).ok_or_else(|| {
                        anyhow::anyhow!("DEFAULT_PHONE_REGION '{}' is not a known region", code)
                    })
                })
                .transpose()?
                .unwrap_or(CountryId::IN),
        };

        let provider = config.resolve_provider()?;

        // Log successful configuration load (without sensitive values)
        tracing::info!("Configuration loaded successfully");
        tracing::info!("Lead provider: {}", provider);
        if provider == ProviderKind::Mock {
            tracing::warn!("No provider API key configured, searches will return mock leads");
        }
        tracing::debug!("OpenAI Base URL: {}", config.openai_base_url);
        tracing::debug!("Serper Base URL: {}", config.serper_base_url);
        tracing::debug!("SerpApi Base URL: {}", config.serpapi_base_url);
        tracing::debug!("Server Port: {}", config.port);

        Ok(config)
    }

    /// Decides which provider serves lead searches.
    ///
    /// An explicit choice must have its credential; otherwise the first
    /// configured key wins (OpenAI, Serper places, SerpApi) and no key at all
    /// selects the mock provider.
    pub fn resolve_provider(&self) -> anyhow::Result<ProviderKind> {
        match self.lead_provider {
            Some(ProviderKind::OpenAi) if self.openai_api_key.is_none() => {
                anyhow::bail!("LEAD_PROVIDER=openai requires OPENAI_API_KEY")
            }
            Some(ProviderKind::WebSearch | ProviderKind::LocalBusiness)
                if self.serper_api_key.is_none() =>
            {
                anyhow::bail!("Serper providers require SERPER_API_KEY")
            }
            Some(ProviderKind::SerpApi) if self.serpapi_api_key.is_none() => {
                anyhow::bail!("LEAD_PROVIDER=serpapi requires SERPAPI_API_KEY")
            }
            Some(kind) => Ok(kind),
            None => Ok(if self.openai_api_key.is_some() {
                ProviderKind::OpenAi
            } else if self.serper_api_key.is_some() {
                ProviderKind::LocalBusiness
            } else if self.serpapi_api_key.is_some() {
                ProviderKind::SerpApi
            } else {
                ProviderKind::Mock
            }),
        }
    }
}
