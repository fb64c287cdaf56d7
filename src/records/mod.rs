//! Log records exported from the API gateway
//!
//! This module provides:
//! - The [`LogRecord`] row type the analysis pipeline consumes
//! - [`LogField`], the logical column names and their export aliases
//! - Header validation against the required column set
//! - A `csv`-backed [`CsvSource`] that turns an export file into records

mod source;

pub use source::CsvSource;

use crate::error::{ErrlensError, Result};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// HTTP responses counted as client errors
pub const CLIENT_ERRORS: RangeInclusive<u16> = 400..=499;

/// Logical columns of a gateway log export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogField {
    Response,
    ErrorCode,
    OperationType,
    ErrorMessage,
    ClientString,
    Product,
    Timestamp,
    AppId,
}

impl LogField {
    /// Columns that must be present in every export, in reporting order
    pub const REQUIRED: [LogField; 7] = [
        LogField::Response,
        LogField::ErrorCode,
        LogField::OperationType,
        LogField::ErrorMessage,
        LogField::ClientString,
        LogField::Product,
        LogField::Timestamp,
    ];

    /// Logical field name, used in error messages
    pub fn name(self) -> &'static str {
        match self {
            LogField::Response => "response",
            LogField::ErrorCode => "error_code",
            LogField::OperationType => "operation_type",
            LogField::ErrorMessage => "error_message",
            LogField::ClientString => "client_string",
            LogField::Product => "product",
            LogField::Timestamp => "timestamp",
            LogField::AppId => "app_id",
        }
    }

    /// Header spellings accepted for this field
    ///
    /// Gateway exports name the client column `x-stream-client` and the
    /// timestamp column `@timestamp`.
    pub fn headers(self) -> &'static [&'static str] {
        match self {
            LogField::ClientString => &["client_string", "x-stream-client"],
            LogField::Timestamp => &["timestamp", "@timestamp"],
            LogField::Response => &["response"],
            LogField::ErrorCode => &["error_code"],
            LogField::OperationType => &["operation_type"],
            LogField::ErrorMessage => &["error_message"],
            LogField::Product => &["product"],
            LogField::AppId => &["app_id"],
        }
    }

    /// Resolve a raw header to the field it names, if any
    pub fn from_header(header: &str) -> Option<LogField> {
        let header = header.trim();
        Self::REQUIRED
            .iter()
            .chain(std::iter::once(&LogField::AppId))
            .copied()
            .find(|field| field.headers().contains(&header))
    }
}

/// Check a header row against the required column set
///
/// Every missing column is reported, not just the first one.
pub fn validate_headers<S: AsRef<str>>(headers: &[S]) -> Result<()> {
    let missing: Vec<String> = LogField::REQUIRED
        .iter()
        .filter(|field| {
            !headers
                .iter()
                .any(|h| field.headers().contains(&h.as_ref().trim()))
        })
        .map(|field| field.name().to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ErrlensError::Schema { missing })
    }
}

/// One row of a gateway log export
///
/// Values are kept as the strings the export carried. Empty cells are
/// stored as `None` so that "absent" and "blank" read the same way.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    pub response: Option<String>,
    pub error_code: Option<String>,
    pub operation_type: Option<String>,
    pub error_message: Option<String>,
    pub client_string: Option<String>,
    pub product: Option<String>,
    pub timestamp: Option<String>,
    pub app_id: Option<String>,
}

impl LogRecord {
    /// Build a record from `(header, value)` pairs
    ///
    /// Unknown headers are ignored.
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: AsRef<str>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut record = Self::default();
        for (header, value) in pairs {
            let value = value.into();
            // A blank alias column must not clear a value read earlier
            if value.trim().is_empty() {
                continue;
            }
            if let Some(field) = LogField::from_header(header.as_ref()) {
                record.set(field, value);
            }
        }
        record
    }

    /// Value of a field, `None` when absent or blank
    pub fn get(&self, field: LogField) -> Option<&str> {
        let slot = match field {
            LogField::Response => &self.response,
            LogField::ErrorCode => &self.error_code,
            LogField::OperationType => &self.operation_type,
            LogField::ErrorMessage => &self.error_message,
            LogField::ClientString => &self.client_string,
            LogField::Product => &self.product,
            LogField::Timestamp => &self.timestamp,
            LogField::AppId => &self.app_id,
        };
        slot.as_deref()
    }

    fn set(&mut self, field: LogField, value: String) {
        let value = Some(value);
        match field {
            LogField::Response => self.response = value,
            LogField::ErrorCode => self.error_code = value,
            LogField::OperationType => self.operation_type = value,
            LogField::ErrorMessage => self.error_message = value,
            LogField::ClientString => self.client_string = value,
            LogField::Product => self.product = value,
            LogField::Timestamp => self.timestamp = value,
            LogField::AppId => self.app_id = value,
        }
    }

    /// HTTP response code, if the cell holds an integer
    pub fn response_code(&self) -> Option<u16> {
        self.response.as_deref().and_then(|r| r.trim().parse().ok())
    }

    /// Response code of a client error row, `None` for every other row
    pub fn client_error_code(&self) -> Option<u16> {
        self.response_code().filter(|code| CLIENT_ERRORS.contains(code))
    }

    /// Application id with thousands separators removed
    pub fn app_id_number(&self) -> Option<u64> {
        self.app_id
            .as_deref()
            .and_then(|id| id.replace(',', "").trim().parse().ok())
    }
}

/// Records together with the header row they were read under
#[derive(Debug, Clone, Default)]
pub struct RecordSet {
    pub headers: Vec<String>,
    pub records: Vec<LogRecord>,
}

impl RecordSet {
    /// Record set read from a tabular source with its own header row
    pub fn with_headers(headers: Vec<String>, records: Vec<LogRecord>) -> Self {
        Self { headers, records }
    }

    /// Record set built in code; typed records carry every column
    pub fn from_records(records: Vec<LogRecord>) -> Self {
        let headers = LogField::REQUIRED
            .iter()
            .map(|field| field.name().to_string())
            .collect();
        Self { headers, records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
