use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::errors::AppError;

/// Text substituted for any field the upstream data did not provide.
pub const NOT_AVAILABLE: &str = "Not Available";

// ============ Core Models ============

/// A single map pin resolved from free text.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationPoint {
    /// Latitude in degrees, within [-90, 90].
    pub latitude: f64,
    /// Longitude in degrees, within [-180, 180].
    pub longitude: f64,
}

/// One normalized lead row.
///
/// Field order is the column order used by every table and CSV export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactRecord {
    pub company_name: String,
    pub address: String,
    pub person_name: String,
    pub person_email: String,
    #[serde(rename = "personLinkedIn")]
    pub person_linked_in: String,
    pub contact_number: String,
    /// Percentage string such as `"93%"`.
    pub match_score: String,
}

impl ContactRecord {
    /// Display labels for the export header, in column order.
    pub const COLUMNS: [&'static str; 7] = [
        "Company Name",
        "Address",
        "Person Name",
        "Person Mail ID",
        "Person LinkedIn Profile ID",
        "Contact Number",
        "Match Score",
    ];

    /// Field values in column order.
    pub fn to_row(&self) -> [&str; 7] {
        [
            &self.company_name,
            &self.address,
            &self.person_name,
            &self.person_email,
            &self.person_linked_in,
            &self.contact_number,
            &self.match_score,
        ]
    }

    /// Builds a record from values in column order.
    pub fn from_row<S: AsRef<str>>(row: &[S]) -> Option<Self> {
        match row {
            [company, address, person, email, linked_in, phone, score] => Some(Self {
                company_name: company.as_ref().to_string(),
                address: address.as_ref().to_string(),
                person_name: person.as_ref().to_string(),
                person_email: email.as_ref().to_string(),
                person_linked_in: linked_in.as_ref().to_string(),
                contact_number: phone.as_ref().to_string(),
                match_score: score.as_ref().to_string(),
            }),
            _ => None,
        }
    }
}

// ============ Warehouse Form ============

/// Industries a warehouse owner can target for promotion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetIndustry {
    #[serde(rename = "FMCG & Consumer Goods")]
    FmcgConsumerGoods,
    #[serde(rename = "Pharma Distribution & Cold Chain Support")]
    PharmaColdChain,
    #[serde(rename = "E-Commerce Fulfilment")]
    ECommerceFulfilment,
    #[serde(rename = "Industrial Raw Materials Storage")]
    IndustrialRawMaterials,
    #[serde(rename = "Agri & Food Grains Warehousing")]
    AgriFoodGrains,
    #[serde(rename = "Automobile Parts, Electronics, Packaging Goods")]
    AutoPartsElectronicsPackaging,
    #[serde(rename = "Third-Party Logistics (3PL)")]
    ThirdPartyLogistics,
    #[serde(rename = "Commodity")]
    Commodity,
    #[serde(rename = "Small Manufacture")]
    SmallManufacture,
    #[serde(rename = "Tire Industries")]
    TireIndustries,
    #[serde(rename = "Lubricant Automobile")]
    LubricantAutomobile,
    #[serde(rename = "Any Government Agencies")]
    GovernmentAgencies,
}

impl TargetIndustry {
    pub const ALL: [TargetIndustry; 12] = [
        TargetIndustry::FmcgConsumerGoods,
        TargetIndustry::PharmaColdChain,
        TargetIndustry::ECommerceFulfilment,
        TargetIndustry::IndustrialRawMaterials,
        TargetIndustry::AgriFoodGrains,
        TargetIndustry::AutoPartsElectronicsPackaging,
        TargetIndustry::ThirdPartyLogistics,
        TargetIndustry::Commodity,
        TargetIndustry::SmallManufacture,
        TargetIndustry::TireIndustries,
        TargetIndustry::LubricantAutomobile,
        TargetIndustry::GovernmentAgencies,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            TargetIndustry::FmcgConsumerGoods => "FMCG & Consumer Goods",
            TargetIndustry::PharmaColdChain => "Pharma Distribution & Cold Chain Support",
            TargetIndustry::ECommerceFulfilment => "E-Commerce Fulfilment",
            TargetIndustry::IndustrialRawMaterials => "Industrial Raw Materials Storage",
            TargetIndustry::AgriFoodGrains => "Agri & Food Grains Warehousing",
            TargetIndustry::AutoPartsElectronicsPackaging => {
                "Automobile Parts, Electronics, Packaging Goods"
            }
            TargetIndustry::ThirdPartyLogistics => "Third-Party Logistics (3PL)",
            TargetIndustry::Commodity => "Commodity",
            TargetIndustry::SmallManufacture => "Small Manufacture",
            TargetIndustry::TireIndustries => "Tire Industries",
            TargetIndustry::LubricantAutomobile => "Lubricant Automobile",
            TargetIndustry::GovernmentAgencies => "Any Government Agencies",
        }
    }
}

impl Default for TargetIndustry {
    fn default() -> Self {
        TargetIndustry::FmcgConsumerGoods
    }
}

impl fmt::Display for TargetIndustry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

fn default_area_sqft() -> u32 {
    21_000
}

/// Warehouse attributes collected by the search form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WarehouseProfile {
    /// Warehouse name.
    #[serde(default)]
    pub name: String,
    /// Street address.
    #[serde(default)]
    pub address: String,
    /// City the leads should be near.
    pub city: String,
    /// State or province.
    pub state: String,
    /// Industry to target.
    #[serde(default)]
    pub target_industry: TargetIndustry,
    /// Floor area offered, in square feet.
    #[serde(default = "default_area_sqft")]
    pub area_sqft: u32,
}

impl Default for WarehouseProfile {
    fn default() -> Self {
        Self {
            name: "Bhoodevi Warehouse".to_string(),
            address: "Road No. 6, Nandur Industrial Area".to_string(),
            city: "Kalaburagi".to_string(),
            state: "Karnataka".to_string(),
            target_industry: TargetIndustry::default(),
            area_sqft: default_area_sqft(),
        }
    }
}

// ============ Providers ============

/// External source of raw lead data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// Generative-text API (OpenAI chat completions).
    #[serde(rename = "openai")]
    OpenAi,
    /// Generic web search (Serper organic results).
    WebSearch,
    /// Local-business search (Serper places).
    LocalBusiness,
    /// Search-engine wrapper service (SerpApi).
    #[serde(rename = "serpapi")]
    SerpApi,
    /// Deterministic placeholder rows.
    Mock,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::WebSearch => "web_search",
            ProviderKind::LocalBusiness => "local_business",
            ProviderKind::SerpApi => "serpapi",
            ProviderKind::Mock => "mock",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" | "generative" => Ok(ProviderKind::OpenAi),
            "web_search" | "serper" => Ok(ProviderKind::WebSearch),
            "local_business" | "places" => Ok(ProviderKind::LocalBusiness),
            "serpapi" | "search_engine" => Ok(ProviderKind::SerpApi),
            "mock" => Ok(ProviderKind::Mock),
            other => Err(AppError::BadRequest(format!(
                "Unknown lead provider '{}'",
                other
            ))),
        }
    }
}

// ============ API Request/Response Models ============

/// Request payload for a lead search.
#[derive(Debug, Clone, Deserialize)]
pub struct LeadSearchRequest {
    /// The warehouse being promoted.
    #[serde(flatten)]
    pub warehouse: WarehouseProfile,
    /// Number of leads wanted; falls back to the configured default.
    #[serde(default)]
    pub count: Option<usize>,
}

/// Result of a lead search action.
#[derive(Debug, Clone, Serialize)]
pub struct LeadSearchOutcome {
    /// Whether new leads replaced the session's table.
    pub success: bool,
    /// User-facing status or warning text.
    pub message: String,
    /// Provider that was queried.
    pub provider: ProviderKind,
    /// The leads now held by the session (previous ones on failure).
    pub leads: Vec<ContactRecord>,
}

/// Request payload for resolving a pasted map link or coordinate pair.
#[derive(Debug, Clone, Deserialize)]
pub struct LocationRequest {
    pub text: String,
}

/// Result of a location resolve action.
#[derive(Debug, Clone, Serialize)]
pub struct LocationOutcome {
    /// Whether the pin was updated.
    pub success: bool,
    /// User-facing status or warning text.
    pub message: String,
    /// The pin now held by the session (previous one on failure).
    pub location: Option<LocationPoint>,
}

/// Snapshot of a session returned by the API.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub session_id: Uuid,
    pub location: Option<LocationPoint>,
    pub provider: Option<ProviderKind>,
    pub leads: Vec<ContactRecord>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contact_record_json_keys() {
        let record = ContactRecord {
            company_name: "Acme".into(),
            address: "Plot 4".into(),
            person_name: "R. Rao".into(),
            person_email: "rao@acme.in".into(),
            person_linked_in: "https://www.linkedin.com/in/rrao".into(),
            contact_number: "+919845012345".into(),
            match_score: "92%".into(),
        };

        let value = serde_json::to_value(&record).unwrap();
        let keys: Vec<&str> = value
            .as_object()
            .unwrap()
            .keys()
            .map(|k| k.as_str())
            .collect();
        for key in [
            "companyName",
            "address",
            "personName",
            "personEmail",
            "personLinkedIn",
            "contactNumber",
            "matchScore",
        ] {
            assert!(keys.contains(&key), "missing key {}", key);
        }
    }

    #[test]
    fn test_row_conversion() {
        let row = ["A", "B", "C", "D", "E", "F", "90%"];
        let record = ContactRecord::from_row(&row).unwrap();
        assert_eq!(record.to_row(), row);
        assert!(ContactRecord::from_row(&row[..6]).is_none());
    }

    #[test]
    fn test_industry_labels_roundtrip_through_serde() {
        for industry in TargetIndustry::ALL {
            let json = serde_json::to_string(&industry).unwrap();
            assert_eq!(json, format!("\"{}\"", industry.label()));
            let back: TargetIndustry = serde_json::from_str(&json).unwrap();
            assert_eq!(back, industry);
        }
    }

    #[test]
    fn test_provider_kind_parse() {
        assert_eq!("OpenAI".parse::<ProviderKind>().unwrap(), ProviderKind::OpenAi);
        assert_eq!("places".parse::<ProviderKind>().unwrap(), ProviderKind::LocalBusiness);
        assert!("bing".parse::<ProviderKind>().is_err());
        assert_eq!(
            serde_json::to_string(&ProviderKind::SerpApi).unwrap(),
            "\"serpapi\""
        );
    }

    #[test]
    fn test_search_request_defaults() {
        let req: LeadSearchRequest =
            serde_json::from_str(r#"{"city": "Kalaburagi", "state": "Karnataka"}"#).unwrap();
        assert_eq!(req.warehouse.area_sqft, 21_000);
        assert_eq!(req.warehouse.target_industry, TargetIndustry::FmcgConsumerGoods);
        assert_eq!(req.count, None);
    }
}
