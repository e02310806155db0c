//! CSV export of the lead table.
//!
//! The header row uses the display labels from [`ContactRecord::COLUMNS`] and
//! every row keeps the same column order, so [`from_csv`] reads back exactly
//! what [`to_csv`] wrote.

use csv::{ReaderBuilder, Writer};
use tracing::debug;

use crate::errors::AppError;
use crate::models::ContactRecord;

/// File name offered for the CSV download.
pub const CSV_FILE_NAME: &str = "warehouse_leads.csv";

/// Serializes records to CSV with a header row of display labels.
pub fn to_csv(records: &[ContactRecord]) -> Result<Vec<u8>, AppError> {
    debug!("Exporting {} leads to CSV", records.len());

    let mut wtr = Writer::from_writer(Vec::new());
    wtr.write_record(ContactRecord::COLUMNS)?;

    for record in records {
        wtr.write_record(record.to_row())?;
    }

    wtr.into_inner()
        .map_err(|e| AppError::InternalError(format!("Failed to flush CSV writer: {}", e)))
}

/// Parses CSV produced by [`to_csv`] back into records.
pub fn from_csv(data: &[u8]) -> Result<Vec<ContactRecord>, AppError> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(data);

    let headers = rdr.headers()?.clone();
    if headers.iter().ne(ContactRecord::COLUMNS) {
        return Err(AppError::BadRequest(format!(
            "Unexpected CSV header: {:?}",
            headers
        )));
    }

    let mut records = Vec::new();
    for (line, row) in rdr.records().enumerate() {
        let row = row?;
        let fields: Vec<&str> = row.iter().collect();
        let record = ContactRecord::from_row(&fields).ok_or_else(|| {
            AppError::BadRequest(format!(
                "CSV row {} has {} columns, expected {}",
                line + 1,
                fields.len(),
                ContactRecord::COLUMNS.len()
            ))
        })?;
        records.push(record);
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::generate_mock;

    #[test]
    fn test_header_row() {
        let csv = to_csv(&[]).unwrap();
        let text = String::from_utf8(csv).unwrap();
        assert_eq!(
            text,
            "Company Name,Address,Person Name,Person Mail ID,Person LinkedIn Profile ID,Contact Number,Match Score\n"
        );
    }

    #[test]
    fn test_comma_is_quoted() {
        let mut records = generate_mock(1);
        records[0].company_name = "Acme, Inc.".to_string();
        let text = String::from_utf8(to_csv(&records).unwrap()).unwrap();
        assert!(text.contains("\"Acme, Inc.\""));
    }

    #[test]
    fn test_wrong_header_rejected() {
        let err = from_csv(b"a,b\n1,2\n").unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
