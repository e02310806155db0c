//! Placeholder leads used when no provider credential is configured.

use crate::models::ContactRecord;
use crate::normalizer::match_score;

/// Deterministically builds `count` records numbered `1..=count`.
pub fn generate_mock(count: usize) -> Vec<ContactRecord> {
    (1..=count)
        .map(|n| ContactRecord {
            company_name: format!("Sample Logistics Company {}", n),
            address: format!("Plot {}, Industrial Area", n),
            person_name: format!("Contact Person {}", n),
            person_email: format!("contact{}@samplelogistics{}.example", n, n),
            person_linked_in: format!("https://www.linkedin.com/in/contact-person-{}", n),
            contact_number: format!("+91 90000 {:05}", n),
            match_score: match_score(n - 1),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_count() {
        assert!(generate_mock(0).is_empty());
    }

    #[test]
    fn test_first_record() {
        let records = generate_mock(1);
        assert_eq!(records[0].company_name, "Sample Logistics Company 1");
        assert_eq!(records[0].contact_number, "+91 90000 00001");
        assert_eq!(records[0].match_score, "90%");
    }
}
