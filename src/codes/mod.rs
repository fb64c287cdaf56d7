//! Static error-code lookup
//!
//! Maps application error codes to a human-readable name and description.
//! The gateway's documented codes ship as the built-in table; a TOML file
//! with `[[code]]` entries can extend or replace it.

use crate::error::{ErrlensError, Result};
use ahash::HashMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Placeholder used for both name and description of unlisted codes
pub const UNKNOWN_ERROR_CODE: &str = "Unknown error code";

/// Name and description of one error code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorCodeInfo {
    pub name: String,
    pub description: String,
}

impl ErrorCodeInfo {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }

    /// Placeholder for codes missing from the table
    pub fn unknown() -> Self {
        Self::new(UNKNOWN_ERROR_CODE, UNKNOWN_ERROR_CODE)
    }
}

/// One `[[code]]` entry of an error code file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeEntryConfig {
    pub code: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Error code file structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CodeTableConfig {
    #[serde(default)]
    pub code: Vec<CodeEntryConfig>,
}

/// Documented gateway error codes: (code, name, description)
const BUILTIN_CODES: &[(i64, &str, &str)] = &[
    (-1, "Internal System Error", "Something went wrong inside the API"),
    (2, "Access Key Error", "Access key is invalid"),
    (4, "Input Error", "Wrong data or parameter was sent to the API"),
    (5, "Authentication Error", "Unauthenticated, problem with authentication"),
    (
        6,
        "Duplicate Username Error",
        "Duplicate username sent while unique usernames are enforced",
    ),
    (9, "Rate Limit Error", "Too many requests in a certain time frame"),
    (16, "Does Not Exist Error", "Resource not found"),
    (17, "Not Allowed Error", "Unauthorised or forbidden to make the request"),
    (18, "Event Not Supported Error", "Event is not supported"),
    (
        19,
        "Channel Feature Not Supported Error",
        "The feature is disabled for this channel type",
    ),
    (20, "Message Too Long Error", "Message is too long"),
    (
        21,
        "Multiple Nesting Level Error",
        "Replies are only supported one level deep",
    ),
    (22, "Payload Too Big Error", "Payload too big"),
    (23, "Request Timeout Error", "Request timed out"),
    (24, "Max Header Size Exceeded Error", "Request headers are too large"),
    (40, "Auth Token Expired", "Unauthenticated, token expired"),
    (41, "Auth Token Not Valid Yet", "Unauthenticated, token not valid yet"),
    (
        42,
        "Auth Token Used Before Issued At",
        "Unauthenticated, token date incorrect",
    ),
    (
        43,
        "Auth Token Signature Invalid",
        "Unauthenticated, token signature invalid",
    ),
    (
        44,
        "Custom Command Endpoint Missing",
        "Custom command handler URL has not been set",
    ),
    (
        45,
        "Custom Command Endpoint Call Error",
        "Custom command handler returned an error",
    ),
    (
        60,
        "Cooldown Error",
        "User tried to post a message during the cooldown period",
    ),
    (99, "App Suspended Error", "App is suspended"),
];

/// Error code lookup table
#[derive(Debug, Clone, Default)]
pub struct ErrorCodeTable {
    codes: HashMap<i64, ErrorCodeInfo>,
}

impl ErrorCodeTable {
    /// Table with no entries; every lookup yields the placeholder
    pub fn empty() -> Self {
        Self::default()
    }

    /// Table of the gateway's documented codes
    pub fn builtin() -> Self {
        let codes = BUILTIN_CODES
            .iter()
            .map(|(code, name, description)| (*code, ErrorCodeInfo::new(*name, *description)))
            .collect();
        Self { codes }
    }

    /// Build a table from a parsed code file
    pub fn from_config(config: CodeTableConfig) -> Result<Self> {
        let mut table = Self::empty();
        table.extend(config)?;
        Ok(table)
    }

    /// Load a code file from disk
    pub fn from_file(path: &Path) -> Result<Self> {
        Self::from_config(Self::read_config(path)?)
    }

    /// Read and parse a code file without building a table
    pub fn read_config(path: &Path) -> Result<CodeTableConfig> {
        let content = std::fs::read_to_string(path).map_err(|e| ErrlensError::Io {
            source: e,
            context: format!("Failed to read error code table: {:?}", path),
        })?;
        let config: CodeTableConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Add or overwrite entries from a parsed code file
    pub fn extend(&mut self, config: CodeTableConfig) -> Result<()> {
        for entry in config.code {
            if entry.name.trim().is_empty() {
                return Err(ErrlensError::CodeTable(format!(
                    "Code {} has an empty name",
                    entry.code
                )));
            }
            let description = if entry.description.is_empty() {
                entry.name.clone()
            } else {
                entry.description
            };
            self.insert(entry.code, ErrorCodeInfo::new(entry.name, description));
        }
        Ok(())
    }

    pub fn insert(&mut self, code: i64, info: ErrorCodeInfo) {
        self.codes.insert(code, info);
    }

    /// Look up a code, falling back to the placeholder
    pub fn lookup(&self, code: i64) -> ErrorCodeInfo {
        self.codes
            .get(&code)
            .cloned()
            .unwrap_or_else(ErrorCodeInfo::unknown)
    }

    pub fn contains(&self, code: i64) -> bool {
        self.codes.contains_key(&code)
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}
