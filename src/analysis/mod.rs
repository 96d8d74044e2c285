//! Analysis orchestration and history.
//!
//! The aggregator runs the analyzer units per clause; the history log keeps
//! a record of every run for later analytics.

pub mod aggregator;
pub mod history;

pub use aggregator::{BatchSummary, ClauseAnalyzer};
pub use history::{HistoryLog, HistoryStats};
