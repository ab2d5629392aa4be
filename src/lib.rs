//! Report builder for per-run population simulation exports.
//!
//! The pipeline is strictly sequential: [`loader`] reads the raw BehaviorSpace
//! files, [`stepwise`] and [`outcome`] aggregate them, [`key_points`] and
//! [`compare`] derive the paper tables, [`charts`] renders the figures and
//! [`report`] drives the whole batch.

pub mod charts;
pub mod cli;
pub mod compare;
pub mod config;
pub mod error;
pub mod key_points;
pub mod loader;
pub mod outcome;
pub mod report;
pub mod scenario;
pub mod stats;
pub mod stepwise;
pub mod tables;

pub use error::ReportError;
