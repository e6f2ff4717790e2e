//! Catgate core library.
//!
//! This crate exposes programmatic APIs for running the AppCat analyzer
//! against candidate projects, normalizing its YAML findings into keyed
//! incident sets, and diffing them against stored baselines for regression
//! gating.
//!
//! High-level modules:
//! - `cli`: CLI argument parsing (binary uses this).
//! - `config`: Discovery and effective configuration resolution.
//! - `models`: Raw analyzer document types and the normalized incident.
//! - `parse`: Document parsing, incident keying, audit persistence.
//! - `diff`: Baseline differ producing matched/new/missing/changed keys.
//! - `aggregate`: Cross-project rule × project count matrix.
//! - `runner`: Per-project pipeline and analyzer invocation.
//! - `report`: CSV and Markdown rendering.
//! - `output`: Human/JSON printers for analyze/validate.
//! - `utils`: Supporting helpers.
pub mod aggregate;
pub mod cli;
pub mod config;
pub mod diff;
pub mod models;
pub mod output;
pub mod parse;
pub mod report;
pub mod runner;
pub mod utils;
