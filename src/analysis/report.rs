// Consolidated analysis report and run statistics
use serde::{Deserialize, Serialize};

use super::window::TimeWindow;
use crate::distribution::{DistributionEntry, SdkErrorRow};
use crate::grouping::{ErrorGroup, SkipStats};
use crate::versions::LatestVersions;

/// Error-analysis report for one log export
///
/// Field names are consumed by the presentation layer and serialize in
/// camelCase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    /// Earliest and latest parseable timestamp, `null` when none parse
    pub time_window: Option<TimeWindow>,
    /// Rows with a response in 400..=499
    pub total_errors: usize,
    /// Distinct error codes among those rows
    pub unique_error_codes: usize,
    pub error_distribution: Vec<DistributionEntry>,
    pub client_type_distribution: Vec<DistributionEntry>,
    pub sdk_error_distribution: Vec<SdkErrorRow>,
    /// Latest SDK version per client category, over all rows
    pub sdk_versions: LatestVersions,
    pub error_groups: Vec<ErrorGroup>,
}

impl AnalysisReport {
    /// Report of a dataset without rows
    pub fn empty() -> Self {
        Self {
            time_window: None,
            total_errors: 0,
            unique_error_codes: 0,
            error_distribution: Vec::new(),
            client_type_distribution: Vec::new(),
            sdk_error_distribution: Vec::new(),
            sdk_versions: LatestVersions::new(),
            error_groups: Vec::new(),
        }
    }

    /// Rows that made it into an error group
    pub fn grouped_errors(&self) -> usize {
        self.error_groups.iter().map(|g| g.count).sum()
    }
}

/// Statistics from one analysis run
#[derive(Debug, Clone, Default)]
pub struct RunStats {
    /// Rows handed to the run
    pub input_rows: usize,
    /// Rows left after the product filter
    pub analysed_rows: usize,
    /// Rows dropped from grouping
    pub skipped: SkipStats,
    /// Rows without a readable timestamp
    pub unparsed_timestamps: usize,
    /// Distinct application ids among analysed rows
    pub distinct_apps: usize,
    /// Whether the run was sharded across threads
    pub sharded: bool,
    /// Total processing time in milliseconds
    pub processing_time_ms: u64,
}
