//! errlens - Error analysis for API gateway log exports
//!
//! Reads tabular gateway logs, classifies the client SDK behind every
//! request, tracks the latest deployed SDK versions, and groups client-side
//! failures (HTTP 4xx) by response and application error code into a single
//! JSON-serializable report.

pub mod analysis;
pub mod classify;
pub mod cli;
pub mod codes;
pub mod config;
pub mod distribution;
pub mod error;
pub mod grouping;
pub mod logging;
pub mod records;
pub mod versions;

pub use analysis::{analyze, AnalysisOptions, AnalysisReport, Analyzer, RunStats};
#[cfg(feature = "parallel")]
pub use analysis::analyze_parallel;
pub use classify::{classify, ClientCategory};
pub use codes::ErrorCodeTable;
pub use error::{ErrlensError, Result};
pub use records::{CsvSource, LogRecord, RecordSet};
