// Shared types for error grouping
use serde::{Deserialize, Serialize};

/// Per-operation statistics inside an error group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationTypeStat {
    /// Operation name as logged by the gateway
    #[serde(rename = "type")]
    pub operation_type: String,
    pub count: usize,
    /// Message of the first row seen for this operation
    pub example_message: String,
    /// Distinct client identifiers, ascending
    pub clients: Vec<String>,
}

/// Rows sharing one (response code, error code) pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorGroup {
    #[serde(with = "display_string")]
    pub response_code: u16,
    #[serde(with = "display_string")]
    pub error_code: i64,
    pub count: usize,
    pub name: String,
    pub description: String,
    /// Operations ordered by count, descending
    pub operation_types: Vec<OperationTypeStat>,
}

impl ErrorGroup {
    /// Sum of the per-operation counts; equals `count`
    pub fn operation_total(&self) -> usize {
        self.operation_types.iter().map(|op| op.count).sum()
    }
}

/// Rows dropped from grouping during one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkipStats {
    /// 4xx row missing `error_code` or `operation_type`
    pub missing_fields: usize,
    /// `response` present but not an integer
    pub invalid_response: usize,
    /// 4xx row whose `error_code` is not an integer
    pub invalid_error_code: usize,
}

impl SkipStats {
    pub fn total(&self) -> usize {
        self.missing_fields + self.invalid_response + self.invalid_error_code
    }

    pub fn merge(self, other: Self) -> Self {
        Self {
            missing_fields: self.missing_fields + other.missing_fields,
            invalid_response: self.invalid_response + other.invalid_response,
            invalid_error_code: self.invalid_error_code + other.invalid_error_code,
        }
    }
}

/// Numbers carried as decimal strings on the wire
mod display_string {
    use serde::{de, Deserialize, Deserializer, Serializer};
    use std::fmt::Display;
    use std::str::FromStr;

    pub fn serialize<T: Display, S: Serializer>(value: &T, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<T, D::Error>
    where
        T: FromStr,
        T::Err: Display,
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}
