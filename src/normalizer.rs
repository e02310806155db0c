//! Maps heterogeneous provider results onto the fixed [`ContactRecord`] schema.
//!
//! Each provider shape is one [`ProviderPayload`] variant with its own table of
//! alternative key names per field. Missing or blank values become
//! [`NOT_AVAILABLE`], so every record is fully populated.

use phonenumber::country::Id as CountryId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::contact_validation::{find_email, is_valid_email, validate_phone};
use crate::errors::AppError;
use crate::models::{ContactRecord, NOT_AVAILABLE};

/// Raw items returned by one provider, tagged by shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ProviderPayload {
    /// Objects written by a generative model using the display-label keys.
    Generative(Vec<Value>),
    /// Organic web search results (`title`, `link`, `snippet`).
    WebSearch(Vec<Value>),
    /// Local-business listings (`title`, `address`, `phoneNumber`, `website`).
    LocalBusiness(Vec<Value>),
    /// Search-engine wrapper results, local or organic.
    SearchEngine(Vec<Value>),
}

impl ProviderPayload {
    pub fn items(&self) -> &[Value] {
        match self {
            ProviderPayload::Generative(items)
            | ProviderPayload::WebSearch(items)
            | ProviderPayload::LocalBusiness(items)
            | ProviderPayload::SearchEngine(items) => items,
        }
    }

    fn mapping(&self) -> &'static FieldMapping {
        match self {
            ProviderPayload::Generative(_) => &GENERATIVE,
            ProviderPayload::WebSearch(_) => &WEB_SEARCH,
            ProviderPayload::LocalBusiness(_) => &LOCAL_BUSINESS,
            ProviderPayload::SearchEngine(_) => &SEARCH_ENGINE,
        }
    }
}

/// Alternative source keys per output field, in lookup order.
struct FieldMapping {
    company_name: &'static [&'static str],
    address: &'static [&'static str],
    person_name: &'static [&'static str],
    person_email: &'static [&'static str],
    person_linked_in: &'static [&'static str],
    contact_number: &'static [&'static str],
    /// Empty when the provider never scores its results.
    match_score: &'static [&'static str],
    /// Free-text and URL fields scanned for emails and LinkedIn links.
    free_text: &'static [&'static str],
}

static GENERATIVE: FieldMapping = FieldMapping {
    company_name: &["Company Name", "companyName", "company_name", "company", "name"],
    address: &["Address", "address", "location"],
    person_name: &["Person Name", "personName", "person_name", "contact_person", "contact"],
    person_email: &["Person Mail ID", "personEmail", "email", "person_email"],
    person_linked_in: &[
        "Person LinkedIn Profile ID",
        "personLinkedIn",
        "linkedin",
        "linkedin_url",
    ],
    contact_number: &["Contact Number", "contactNumber", "phone", "contact_number"],
    match_score: &["Match Score", "matchScore", "match_score", "score"],
    free_text: &["website", "notes"],
};

static WEB_SEARCH: FieldMapping = FieldMapping {
    company_name: &["title", "name"],
    address: &["address", "snippet", "description"],
    person_name: &["author", "contact"],
    person_email: &["email"],
    person_linked_in: &["linkedin"],
    contact_number: &["phoneNumber", "phone"],
    match_score: &[],
    free_text: &["snippet", "link", "description"],
};

static LOCAL_BUSINESS: FieldMapping = FieldMapping {
    company_name: &["title", "name"],
    address: &["address", "formatted_address", "category"],
    person_name: &["owner", "contact"],
    person_email: &["email"],
    person_linked_in: &["linkedin"],
    contact_number: &["phoneNumber", "phone", "formatted_phone_number"],
    match_score: &[],
    free_text: &["website", "description"],
};

static SEARCH_ENGINE: FieldMapping = FieldMapping {
    company_name: &["title", "name"],
    address: &["address", "snippet"],
    person_name: &["owner", "contact"],
    person_email: &["email"],
    person_linked_in: &["linkedin"],
    contact_number: &["phone", "phoneNumber"],
    match_score: &[],
    free_text: &["snippet", "link", "website", "description"],
};

/// Synthesized score for the item at `index`: a cyclic 90-94%.
///
/// This value carries no relevance signal.
pub fn match_score(index: usize) -> String {
    format!("{}%", 90 + index % 5)
}

/// Converts provider payloads into contact records.
#[derive(Debug, Clone, Copy)]
pub struct Normalizer {
    phone_region: CountryId,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(CountryId::IN)
    }
}

impl Normalizer {
    pub fn new(phone_region: CountryId) -> Self {
        Self { phone_region }
    }

    /// Normalizes every item, preserving input order and length.
    pub fn normalize(&self, payload: &ProviderPayload) -> Vec<ContactRecord> {
        let mapping = payload.mapping();
        payload
            .items()
            .iter()
            .enumerate()
            .map(|(index, item)| self.normalize_item(item, mapping, index))
            .collect()
    }

    fn normalize_item(&self, item: &Value, mapping: &FieldMapping, index: usize) -> ContactRecord {
        let empty = Map::new();
        let fields = item.as_object().unwrap_or(&empty);

        let person_email = lookup(fields, mapping.person_email)
            .filter(|email| is_valid_email(email))
            .or_else(|| {
                mapping
                    .free_text
                    .iter()
                    .filter_map(|key| lookup(fields, std::slice::from_ref(key)))
                    .find_map(|text| find_email(&text))
            });

        let person_linked_in = lookup(fields, mapping.person_linked_in).or_else(|| {
            mapping
                .free_text
                .iter()
                .filter_map(|key| lookup(fields, std::slice::from_ref(key)))
                .find(|url| url.contains("linkedin.com"))
        });

        let contact_number = lookup(fields, mapping.contact_number).map(|raw| {
            let (valid, normalized) = validate_phone(&raw, self.phone_region);
            if valid {
                normalized
            } else {
                raw
            }
        });

        let score = lookup(fields, mapping.match_score)
            .and_then(|raw| as_percentage(&raw))
            .unwrap_or_else(|| match_score(index));

        ContactRecord {
            company_name: or_placeholder(lookup(fields, mapping.company_name)),
            address: or_placeholder(lookup(fields, mapping.address)),
            person_name: or_placeholder(lookup(fields, mapping.person_name)),
            person_email: or_placeholder(person_email),
            person_linked_in: or_placeholder(person_linked_in),
            contact_number: or_placeholder(contact_number),
            match_score: score,
        }
    }
}

/// Normalizes with the default phone region.
pub fn normalize(payload: &ProviderPayload) -> Vec<ContactRecord> {
    Normalizer::default().normalize(payload)
}

/// First non-blank value among `keys`, rendered as a string.
fn lookup(fields: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| fields.get(*key))
        .filter_map(scalar_text)
        .find(|text| !text.is_empty())
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn or_placeholder(value: Option<String>) -> String {
    value.unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// `"95"`, `"95%"` and `"95.5 %"` become percentages; anything else is `None`.
fn as_percentage(raw: &str) -> Option<String> {
    let number = raw.trim().trim_end_matches('%').trim_end();
    number
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .map(|_| format!("{}%", number))
}

/// Extracts lead objects from the JSON text a generative model returned.
///
/// Accepts a top-level array, an object holding a `leads` array, an object
/// whose first list of objects (in document order) holds the leads, or a
/// single lead object. Lists of plain values such as notes or assumptions are
/// only used when no list of objects exists.
pub fn extract_generative_items(content: &str) -> Result<Vec<Value>, AppError> {
    let data: Value = serde_json::from_str(content).map_err(|e| {
        AppError::UpstreamUnavailable(format!("Model returned invalid JSON: {}", e))
    })?;

    match data {
        Value::Array(items) => Ok(items),
        Value::Object(map) => {
            if let Some(Value::Array(items)) = map.get("leads") {
                return Ok(items.clone());
            }
            let first_list = map
                .values()
                .filter_map(Value::as_array)
                .find(|items| !items.is_empty() && items.iter().all(Value::is_object))
                .or_else(|| map.values().find_map(Value::as_array))
                .cloned();
            match first_list {
                Some(items) => Ok(items),
                None if map.is_empty() => Ok(Vec::new()),
                None => Ok(vec![Value::Object(map)]),
            }
        }
        other => Err(AppError::UpstreamUnavailable(format!(
            "Model returned unexpected JSON type: {}",
            other
        ))),
    }
}
