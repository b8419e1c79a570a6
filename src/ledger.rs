// src/ledger.rs
// =============================================================================
// The result ledger: an append-only list of everything the walk found.
//
// Each record is either
// - a keyword match ("keyword X appears on page Y"), or
// - an error ("page Y could not be fetched because ...").
//
// Records are kept in the order they were discovered. Nothing is ever
// reordered or removed while a walk is running.
// =============================================================================

use chrono::{DateTime, Local};
use serde::Serialize;

/// Format used for record timestamps in exports and tables
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// What kind of outcome a record describes.
// Using an enum means a record can never carry both an error and a keyword.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum RecordKind {
    /// The page could not be processed; holds the error text
    Error(String),
    /// A keyword was found on the page
    Match(String),
}

/// One logged outcome tied to a URL and a point in time
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultRecord {
    pub timestamp: DateTime<Local>,
    #[serde(flatten)]
    pub kind: RecordKind,
    pub url: String,
}

impl ResultRecord {
    pub fn error(timestamp: DateTime<Local>, error: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            timestamp,
            kind: RecordKind::Error(error.into()),
            url: url.into(),
        }
    }

    pub fn matched(timestamp: DateTime<Local>, keyword: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            timestamp,
            kind: RecordKind::Match(keyword.into()),
            url: url.into(),
        }
    }

    /// Error text, or "" for match records
    pub fn error_text(&self) -> &str {
        match &self.kind {
            RecordKind::Error(text) => text,
            RecordKind::Match(_) => "",
        }
    }

    /// Matched keyword, or "" for error records
    pub fn keyword(&self) -> &str {
        match &self.kind {
            RecordKind::Match(keyword) => keyword,
            RecordKind::Error(_) => "",
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.kind, RecordKind::Error(_))
    }

    pub fn formatted_timestamp(&self) -> String {
        self.timestamp.format(TIMESTAMP_FORMAT).to_string()
    }
}

/// Append-only collection of result records
#[derive(Debug, Default, Clone)]
pub struct ResultLedger {
    records: Vec<ResultRecord>,
}

impl ResultLedger {
    pub fn append(&mut self, record: ResultRecord) {
        self.records.push(record);
    }

    pub fn push_error(&mut self, error: impl Into<String>, url: &str) {
        self.append(ResultRecord::error(Local::now(), error, url));
    }

    /// Records one match per keyword, all stamped with the same time
    pub fn push_matches<'a, I>(&mut self, keywords: I, url: &str)
    where
        I: IntoIterator<Item = &'a str>,
    {
        let now = Local::now();
        for keyword in keywords {
            self.append(ResultRecord::matched(now, keyword, url));
        }
    }

    pub fn all(&self) -> &[ResultRecord] {
        &self.records
    }

    /// Empties the ledger. Must not be called while a walk is appending to it.
    /// The crawl engine starts every walk with a fresh ledger, so only
    /// longer-lived owners of a ledger need this.
    #[allow(dead_code)]
    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn into_records(self) -> Vec<ResultRecord> {
        self.records
    }
}
