use crate::utils::error::{ErrorCategory, EtlError};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Catalog {
    Elements,
    Components,
}

impl fmt::Display for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Catalog::Elements => f.write_str("elements"),
            Catalog::Components => f.write_str("components"),
        }
    }
}

/// A catalog item that produced no rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemFailure {
    /// 1-based position in the catalog list.
    pub position: usize,
    pub key: Option<String>,
    pub reason: String,
    pub category: ErrorCategory,
}

/// Per-catalog outcome of one extraction run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub catalog: Catalog,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    /// Items shown in the list when the run started.
    pub listed: usize,
    /// Records extracted; component variants count individually.
    pub extracted: usize,
    pub rows: usize,
    pub failures: Vec<ItemFailure>,
}

impl RunReport {
    pub fn new(catalog: Catalog, listed: usize) -> Self {
        Self {
            catalog,
            started_at: Utc::now(),
            finished_at: None,
            listed,
            extracted: 0,
            rows: 0,
            failures: Vec::new(),
        }
    }

    pub fn record_success(&mut self, records: usize, rows: usize) {
        self.extracted += records;
        self.rows += rows;
    }

    /// Records and logs a skipped item. Every skipped item goes through here.
    pub fn record_failure(&mut self, index: usize, key: Option<String>, error: &EtlError) {
        let position = index + 1;
        tracing::error!(
            catalog = %self.catalog,
            position,
            category = ?error.category(),
            "Error processing {} '{}' at {}: {}",
            self.catalog,
            key.as_deref().unwrap_or("Unknown"),
            position,
            error
        );
        self.failures.push(ItemFailure {
            position,
            key,
            reason: error.to_string(),
            category: error.category(),
        });
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
        tracing::info!(
            "Finished scraping {}: {} records, {} rows, {} failed of {} listed",
            self.catalog,
            self.extracted,
            self.rows,
            self.failures.len(),
            self.listed
        );
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }
}
