//! CSV import of South African postal codes

use serde::{Deserialize, Serialize};
use std::io::Read;

use super::BackfillReport;
use crate::upstream::SupabaseClient;
use crate::{Result, StorefrontError};

pub const POSTAL_TABLE: &str = "postal_codes";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostalCodeRow {
    pub postal_code: String,
    pub suburb: String,
    pub city: String,
    #[serde(default)]
    pub province: Option<String>,
}

impl PostalCodeRow {
    /// Trims fields and zero-pads the code to four digits.
    fn normalized(self) -> std::result::Result<Self, String> {
        let code = self.postal_code.trim();
        if code.is_empty() || code.len() > 4 || !code.chars().all(|c| c.is_ascii_digit()) {
            return Err(format!("invalid postal code '{}'", self.postal_code));
        }
        let suburb = self.suburb.trim().to_string();
        if suburb.is_empty() {
            return Err(format!("postal code {code} has no suburb"));
        }
        Ok(Self {
            postal_code: format!("{code:0>4}"),
            suburb,
            city: self.city.trim().to_string(),
            province: self.province.map(|p| p.trim().to_string()).filter(|p| !p.is_empty()),
        })
    }
}

/// Reads and normalizes rows. Bad rows are logged and counted as failed.
pub fn read_rows<R: Read>(reader: R, report: &mut BackfillReport) -> Result<Vec<PostalCodeRow>> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut rows = Vec::new();
    for (line, record) in rdr.deserialize::<PostalCodeRow>().enumerate() {
        let outcome = record.map_err(|e| e.to_string()).and_then(PostalCodeRow::normalized);
        match outcome {
            Ok(row) => rows.push(row),
            Err(e) => report.record::<(), _>(&format!("line {}", line + 2), Err(e)),
        }
    }
    Ok(rows)
}

/// Inserts rows in batches, one request at a time. A failed batch counts all its rows as failed.
pub async fn import_postal_codes<R: Read>(supabase: &SupabaseClient, reader: R, batch_size: usize) -> Result<BackfillReport> {
    if batch_size == 0 {
        return Err(StorefrontError::bad_request("batch size must be at least 1"));
    }
    let mut report = BackfillReport::default();
    let rows = read_rows(reader, &mut report)?;
    tracing::info!(rows = rows.len(), rejected = report.failed, "postal codes parsed");

    for (index, batch) in rows.chunks(batch_size).enumerate() {
        report.attempted += batch.len();
        match supabase.insert_ignore_duplicates(POSTAL_TABLE, batch).await {
            Ok(()) => {
                report.succeeded += batch.len();
                tracing::debug!(batch = index + 1, rows = batch.len(), "batch inserted");
            }
            Err(e) => {
                report.failed += batch.len();
                tracing::error!(batch = index + 1, error = %e, "batch insert failed");
            }
        }
    }
    Ok(report)
}
