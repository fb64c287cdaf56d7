//! Analysis orchestration
//!
//! This module turns a [`RecordSet`] into one [`AnalysisReport`]:
//!
//! 1. **Validate**: every required column must be present, otherwise the run
//!    fails with a schema error and nothing else happens
//! 2. **Select**: an optional product filter narrows the rows
//! 3. **Accumulate**: one pass feeds the time window, the version reduction,
//!    the error groups, and the distributions
//! 4. **Assemble**: the finished parts become the report
//!
//! With the `parallel` feature, step 3 can run over shards on the `rayon`
//! pool; partial accumulators merge into the same result as one pass.

mod report;
mod window;

pub use report::{AnalysisReport, RunStats};
pub use window::{parse_timestamp, TimeWindow, WindowAccumulator};

use crate::codes::ErrorCodeTable;
use crate::distribution::DistributionCounter;
use crate::error::{ErrlensError, Result};
use crate::grouping::GroupAccumulator;
use crate::records::{validate_headers, LogField, LogRecord, RecordSet};
use crate::versions::LatestVersions;
use ahash::{HashSet, HashSetExt};
use std::time::Instant;

/// Options for one analysis run
#[derive(Debug, Clone)]
pub struct AnalysisOptions {
    /// Keep only rows whose `product` equals this value
    pub product: Option<String>,
    /// Minimum row count before a run is sharded (`parallel` feature only)
    pub parallel_min_rows: usize,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            product: None,
            parallel_min_rows: 50_000,
        }
    }
}

/// Everything one pass over the rows accumulates
#[derive(Debug, Clone)]
struct RunAccumulator<'a> {
    groups: GroupAccumulator<'a>,
    distributions: DistributionCounter,
    versions: LatestVersions,
    window: WindowAccumulator,
    apps: HashSet<u64>,
}

impl<'a> RunAccumulator<'a> {
    fn new(codes: &'a ErrorCodeTable) -> Self {
        Self {
            groups: GroupAccumulator::new(codes),
            distributions: DistributionCounter::new(),
            versions: LatestVersions::new(),
            window: WindowAccumulator::default(),
            apps: HashSet::new(),
        }
    }

    fn observe(&mut self, position: usize, record: &LogRecord) {
        self.window.observe(record.get(LogField::Timestamp));
        if let Some(client) = record.get(LogField::ClientString) {
            self.versions.observe_client(client);
        }
        if let Some(app) = record.app_id_number() {
            self.apps.insert(app);
        }
        self.groups.observe(position, record);
        self.distributions.observe(position, record);
    }

    #[cfg(feature = "parallel")]
    fn merge(mut self, other: Self) -> Self {
        self.groups = self.groups.merge(other.groups);
        self.distributions = self.distributions.merge(other.distributions);
        self.versions = self.versions.merge(other.versions);
        self.window = self.window.merge(other.window);
        self.apps.extend(other.apps);
        self
    }

    fn finish(self, stats: &mut RunStats) -> AnalysisReport {
        stats.unparsed_timestamps = self.window.unparsed();
        stats.distinct_apps = self.apps.len();

        let (error_groups, skipped) = self.groups.finish();
        stats.skipped = skipped;

        let distributions = self.distributions.finish();

        AnalysisReport {
            time_window: self.window.finish(),
            total_errors: distributions.total_errors,
            unique_error_codes: distributions.unique_error_codes,
            error_distribution: distributions.error_distribution,
            client_type_distribution: distributions.client_type_distribution,
            sdk_error_distribution: distributions.sdk_error_distribution,
            sdk_versions: self.versions,
            error_groups,
        }
    }
}

/// Analysis pipeline bound to an error code table
pub struct Analyzer {
    codes: ErrorCodeTable,
    options: AnalysisOptions,
}

impl Analyzer {
    /// Create an analyzer
    ///
    /// # Arguments
    /// * `codes` - Lookup for error group names and descriptions
    /// * `options` - Product filter and sharding threshold
    pub fn new(codes: ErrorCodeTable, options: AnalysisOptions) -> Self {
        Self { codes, options }
    }

    /// Analyze a record set
    ///
    /// # Returns
    /// Tuple of (report, statistics). The report is only produced whole; a
    /// schema or selection failure returns an error and no report.
    pub fn run(&self, set: &RecordSet) -> Result<(AnalysisReport, RunStats)> {
        let start = Instant::now();

        validate_headers(&set.headers)?;

        let rows = self.select(set)?;
        let mut stats = RunStats {
            input_rows: set.len(),
            analysed_rows: rows.len(),
            ..RunStats::default()
        };

        let accumulator = if self.should_shard(rows.len()) {
            stats.sharded = true;
            self.accumulate_sharded(&rows)
        } else {
            self.accumulate(&rows)
        };

        let report = accumulator.finish(&mut stats);
        stats.processing_time_ms = start.elapsed().as_millis() as u64;

        if stats.skipped.total() > 0 {
            tracing::warn!(
                missing_fields = stats.skipped.missing_fields,
                invalid_response = stats.skipped.invalid_response,
                invalid_error_code = stats.skipped.invalid_error_code,
                "Rows skipped while grouping errors"
            );
        }
        tracing::info!(
            rows = stats.analysed_rows,
            total_errors = report.total_errors,
            groups = report.error_groups.len(),
            elapsed_ms = stats.processing_time_ms,
            "Analysis complete"
        );

        Ok((report, stats))
    }

    fn select<'s>(&self, set: &'s RecordSet) -> Result<Vec<&'s LogRecord>> {
        let Some(product) = self.options.product.as_deref() else {
            return Ok(set.records.iter().collect());
        };

        let rows: Vec<&LogRecord> = set
            .records
            .iter()
            .filter(|r| r.get(LogField::Product) == Some(product))
            .collect();

        if rows.is_empty() {
            return Err(ErrlensError::NoMatchingProduct {
                product: product.to_string(),
            });
        }
        tracing::debug!(
            product,
            kept = rows.len(),
            dropped = set.len() - rows.len(),
            "Applied product filter"
        );
        Ok(rows)
    }

    fn accumulate<'s>(&'s self, rows: &[&LogRecord]) -> RunAccumulator<'s> {
        let mut accumulator = RunAccumulator::new(&self.codes);
        for (position, record) in rows.iter().enumerate() {
            accumulator.observe(position, record);
        }
        accumulator
    }

    #[cfg(feature = "parallel")]
    fn should_shard(&self, rows: usize) -> bool {
        rows >= self.options.parallel_min_rows
    }

    #[cfg(not(feature = "parallel"))]
    fn should_shard(&self, _rows: usize) -> bool {
        false
    }

    #[cfg(feature = "parallel")]
    fn accumulate_sharded<'s>(&'s self, rows: &[&LogRecord]) -> RunAccumulator<'s> {
        use rayon::prelude::*;

        rows.par_iter()
            .enumerate()
            .fold(
                || RunAccumulator::new(&self.codes),
                |mut acc, (position, record)| {
                    acc.observe(position, record);
                    acc
                },
            )
            .reduce(|| RunAccumulator::new(&self.codes), RunAccumulator::merge)
    }

    #[cfg(not(feature = "parallel"))]
    fn accumulate_sharded<'s>(&'s self, rows: &[&LogRecord]) -> RunAccumulator<'s> {
        self.accumulate(rows)
    }
}

/// Analyze a record set with default options
pub fn analyze(set: &RecordSet, codes: &ErrorCodeTable) -> Result<AnalysisReport> {
    let analyzer = Analyzer::new(codes.clone(), AnalysisOptions::default());
    analyzer.run(set).map(|(report, _)| report)
}

/// Analyze a record set over the `rayon` pool regardless of its size
#[cfg(feature = "parallel")]
pub fn analyze_parallel(set: &RecordSet, codes: &ErrorCodeTable) -> Result<AnalysisReport> {
    let options = AnalysisOptions {
        parallel_min_rows: 1,
        ..AnalysisOptions::default()
    };
    Analyzer::new(codes.clone(), options)
        .run(set)
        .map(|(report, _)| report)
}
