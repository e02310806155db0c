/// Property-based tests using proptest
/// Tests invariants that should hold for all inputs
use proptest::prelude::*;
use serde_json::{json, Value};
use warehouse_leads_api::contact_validation::{is_valid_email, validate_phone};
use warehouse_leads_api::export::{from_csv, to_csv};
use warehouse_leads_api::location::resolve;
use warehouse_leads_api::models::ContactRecord;
use warehouse_leads_api::normalizer::{normalize, ProviderPayload};

use phonenumber::country::Id as CountryId;

fn arb_item() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        "\\PC{0,20}".prop_map(Value::String),
        (
            proptest::option::of("\\PC{0,30}"),
            proptest::option::of("\\PC{0,30}"),
            proptest::option::of("[0-9 +()-]{0,15}"),
        )
            .prop_map(|(title, snippet, phone)| {
                json!({"title": title, "snippet": snippet, "phone": phone})
            }),
    ]
}

fn arb_record() -> impl Strategy<Value = ContactRecord> {
    proptest::collection::vec("\\PC{0,24}", 7)
        .prop_map(|fields| ContactRecord::from_row(&fields).expect("seven fields"))
}

// Property: the resolver never panics and only returns in-range points
proptest! {
    #[test]
    fn resolve_never_panics(text in "\\PC*") {
        if let Ok(point) = resolve(&text) {
            prop_assert!((-90.0..=90.0).contains(&point.latitude));
            prop_assert!((-180.0..=180.0).contains(&point.longitude));
        }
    }

    #[test]
    fn map_links_resolve_exactly(
        lat in -90.0f64..=90.0,
        lng in -180.0f64..=180.0,
        zoom in 1u8..=21u8
    ) {
        let lat_text = format!("{:.4}", lat);
        let lng_text = format!("{:.4}", lng);
        let url = format!("https://maps.google.com/@{},{},{}z", lat_text, lng_text, zoom);

        let point = resolve(&url).unwrap();
        prop_assert_eq!(point.latitude, lat_text.parse::<f64>().unwrap());
        prop_assert_eq!(point.longitude, lng_text.parse::<f64>().unwrap());
    }

    #[test]
    fn bare_pairs_resolve_exactly(lat in -90.0f64..=90.0, lng in -180.0f64..=180.0) {
        let lat_text = format!("{:.5}", lat);
        let lng_text = format!("{:.5}", lng);
        let point = resolve(&format!("{}, {}", lat_text, lng_text)).unwrap();
        prop_assert_eq!(point.latitude, lat_text.parse::<f64>().unwrap());
        prop_assert_eq!(point.longitude, lng_text.parse::<f64>().unwrap());
    }

    #[test]
    fn text_without_digits_never_resolves(text in "[a-zA-Z @,./:]*") {
        prop_assert!(resolve(&text).is_err());
    }
}

// Property: normalization is total and preserves length
proptest! {
    #[test]
    fn normalize_is_total(items in proptest::collection::vec(arb_item(), 0..12)) {
        let len = items.len();
        for payload in [
            ProviderPayload::WebSearch(items.clone()),
            ProviderPayload::LocalBusiness(items.clone()),
            ProviderPayload::SearchEngine(items.clone()),
            ProviderPayload::Generative(items.clone()),
        ] {
            let records = normalize(&payload);
            prop_assert_eq!(records.len(), len);
            for (i, record) in records.iter().enumerate() {
                for field in record.to_row() {
                    prop_assert!(!field.is_empty());
                }
                if !matches!(payload, ProviderPayload::Generative(_)) {
                    prop_assert_eq!(&record.match_score, &format!("{}%", 90 + i % 5));
                }
            }
        }
    }
}

// Property: CSV export is lossless
proptest! {
    #[test]
    fn csv_roundtrip(records in proptest::collection::vec(arb_record(), 0..8)) {
        let csv = to_csv(&records).unwrap();
        let parsed = from_csv(&csv).unwrap();
        prop_assert_eq!(parsed, records);
    }
}

// Property: validation helpers never panic
proptest! {
    #[test]
    fn email_validation_never_panics(email in "\\PC*") {
        let _ = is_valid_email(&email);
    }

    #[test]
    fn phone_validation_never_panics(phone in "\\PC*") {
        let _ = validate_phone(&phone, CountryId::IN);
    }

    #[test]
    fn short_phones_always_invalid(phone in "[0-9]{0,6}") {
        let (valid, _) = validate_phone(&phone, CountryId::IN);
        prop_assert!(!valid, "Very short phone should be invalid: {}", phone);
    }

    #[test]
    fn valid_phones_are_e164(number in "[6-9][0-9]{9}") {
        let (valid, normalized) = validate_phone(&number, CountryId::IN);
        if valid {
            prop_assert!(normalized.starts_with("+91"));
            prop_assert!(normalized[1..].chars().all(|c| c.is_ascii_digit()));
        }
    }
}
