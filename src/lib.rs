//! Verdict - benchmark scoring library for browser end-to-end test
//! telemetry.
//!
//! Verdict turns per-attempt telemetry (network counters, console and
//! page errors, accessibility findings) into a deterministic benchmark
//! report: scored and tiered per test, per browser group, and overall.
//!
//! The pipeline is strictly one way: raw attempts are collected into
//! immutable [`core::TestUnitRecord`]s, aggregated and scored, and
//! assembled into one [`report::RunSummary`] for presentation layers.
//!
//! # Example
//!
//! ```
//! use chrono::Utc;
//! use verdict::collect::{collect, RawAttempt};
//! use verdict::config::Thresholds;
//! use verdict::report::build_run_summary;
//!
//! let raw: RawAttempt = serde_json::from_str(
//!     r#"{"id":"t1","title":"chromium > login","status":"passed","durationMs":1200}"#,
//! ).unwrap();
//! let record = collect(raw).unwrap();
//! let summary = build_run_summary("run-1", Utc::now(), vec![record], &Thresholds::default());
//! assert_eq!(summary.overall.total_tests, 1);
//! ```

pub mod aggregate;
pub mod cli;
pub mod collect;
pub mod config;
pub mod core;
pub mod output;
pub mod report;
pub mod scoring;
pub mod stats;

pub use core::{Error, Result};
