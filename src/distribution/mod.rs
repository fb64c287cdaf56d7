//! Count and percentage breakdowns of the 4xx rows
//!
//! Three dimensions are tracked over rows whose response lies in 400..=499:
//! response code, client category, and client category × raw error code.
//! Percentages are relative to the number of those rows, never to the whole
//! dataset.

use crate::classify::{classify, ClientCategory};
use crate::records::{LogField, LogRecord};
use ahash::{HashMap, HashMapExt, HashSet, HashSetExt};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Error-code key for rows without an error code
pub const UNKNOWN_CODE_KEY: &str = "Unknown";

/// One slice of a distribution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionEntry {
    pub name: String,
    pub value: usize,
    /// Share of all 4xx rows, rounded to one decimal
    pub percentage: f64,
}

impl DistributionEntry {
    fn new(name: String, value: usize, total: usize) -> Self {
        Self {
            name,
            value,
            percentage: percentage(value, total),
        }
    }
}

/// Error code counts for one client category, flattened for charting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SdkErrorRow {
    pub sdk_type: ClientCategory,
    #[serde(flatten)]
    pub counts: BTreeMap<String, usize>,
}

/// Finished distributions of one run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Distributions {
    pub total_errors: usize,
    pub unique_error_codes: usize,
    pub error_distribution: Vec<DistributionEntry>,
    pub client_type_distribution: Vec<DistributionEntry>,
    pub sdk_error_distribution: Vec<SdkErrorRow>,
}

#[derive(Debug, Clone)]
struct CategoryCounts {
    first_seen: usize,
    count: usize,
    codes: BTreeMap<String, usize>,
}

/// Accumulates distribution counters over a sequence of records
#[derive(Debug, Clone)]
pub struct DistributionCounter {
    total: usize,
    by_response: BTreeMap<u16, usize>,
    by_category: HashMap<ClientCategory, CategoryCounts>,
    error_codes: HashSet<String>,
}

impl Default for DistributionCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl DistributionCounter {
    pub fn new() -> Self {
        Self {
            total: 0,
            by_response: BTreeMap::new(),
            by_category: HashMap::new(),
            error_codes: HashSet::new(),
        }
    }

    /// Count one record; rows outside 400..=499 are ignored
    pub fn observe(&mut self, position: usize, record: &LogRecord) {
        let Some(response) = record.client_error_code() else {
            return;
        };

        self.total += 1;
        *self.by_response.entry(response).or_insert(0) += 1;

        let code = record.get(LogField::ErrorCode).map(str::trim);
        if let Some(code) = code {
            self.error_codes.insert(code.to_string());
        }

        let category = classify(record.get(LogField::ClientString));
        let counts = self
            .by_category
            .entry(category)
            .or_insert_with(|| CategoryCounts {
                first_seen: position,
                count: 0,
                codes: BTreeMap::new(),
            });
        counts.count += 1;
        *counts
            .codes
            .entry(code.unwrap_or(UNKNOWN_CODE_KEY).to_string())
            .or_insert(0) += 1;
    }

    /// Combine with a counter built over another shard
    pub fn merge(mut self, other: Self) -> Self {
        self.total += other.total;
        for (response, count) in other.by_response {
            *self.by_response.entry(response).or_insert(0) += count;
        }
        for (category, theirs) in other.by_category {
            match self.by_category.get_mut(&category) {
                None => {
                    self.by_category.insert(category, theirs);
                }
                Some(ours) => {
                    ours.first_seen = ours.first_seen.min(theirs.first_seen);
                    ours.count += theirs.count;
                    for (code, count) in theirs.codes {
                        *ours.codes.entry(code).or_insert(0) += count;
                    }
                }
            }
        }
        self.error_codes.extend(other.error_codes);
        self
    }

    /// Produce the distributions
    ///
    /// Response codes ascend; categories keep first-seen order. With no 4xx
    /// rows every distribution is empty.
    pub fn finish(self) -> Distributions {
        let total = self.total;
        if total == 0 {
            return Distributions::default();
        }

        let error_distribution = self
            .by_response
            .into_iter()
            .map(|(response, count)| {
                DistributionEntry::new(format!("{} Error", response), count, total)
            })
            .collect();

        let mut categories: Vec<(ClientCategory, CategoryCounts)> =
            self.by_category.into_iter().collect();
        categories.sort_by_key(|(_, counts)| counts.first_seen);

        let client_type_distribution = categories
            .iter()
            .map(|(category, counts)| {
                DistributionEntry::new(category.label().to_string(), counts.count, total)
            })
            .collect();

        let sdk_error_distribution = categories
            .into_iter()
            .map(|(sdk_type, counts)| SdkErrorRow {
                sdk_type,
                counts: counts.codes,
            })
            .collect();

        Distributions {
            total_errors: total,
            unique_error_codes: self.error_codes.len(),
            error_distribution,
            client_type_distribution,
            sdk_error_distribution,
        }
    }
}

/// `value / total` as a percentage rounded to one decimal
pub fn percentage(value: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (value as f64 / total as f64 * 1000.0).round() / 10.0
}

/// Compute all distributions in one pass
pub fn compute<'r, I>(records: I) -> Distributions
where
    I: IntoIterator<Item = &'r LogRecord>,
{
    let mut counter = DistributionCounter::new();
    for (position, record) in records.into_iter().enumerate() {
        counter.observe(position, record);
    }
    counter.finish()
}
