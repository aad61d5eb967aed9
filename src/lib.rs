//! Data profiling and clustering engine for delimited tabular datasets.
//!
//! Profiles a CSV, applies declarative cleaning plans, evaluates candidate
//! cluster counts via the elbow method, and runs deterministic k-means over
//! two numeric columns. The surrounding API layer supplies file paths,
//! column names, and cleaning choices; this crate returns the structured
//! JSON results it persists.

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod services;

pub use config::Config;
pub use error::EngineError;
pub use services::engine::AnalysisEngine;

/// Common result type used throughout the engine
pub type Result<T, E = EngineError> = std::result::Result<T, E>;
