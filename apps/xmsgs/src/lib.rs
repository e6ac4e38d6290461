//! xmsgs core library.
//!
//! This crate reads the `.xmsgs` message logs written by Xilinx ISE, folds
//! repeated diagnostics together, and compares two builds.
//!
//! High-level modules:
//! - `reader`: `.xmsgs` XML parsing into raw messages.
//! - `normalize`: Path/line extraction, dedup keys, and policy filtering.
//! - `corpus`: Deduplication and per-type counts for one build.
//! - `diff`: Added/removed messages between two builds.
//! - `models`: Records, counts, results, and the filter policy.
//! - `config`: Discovery and effective configuration resolution.
//! - `output`: Human/JSON printers for print/diff.
//! - `cli`: CLI argument parsing (binary uses this).
//! - `error`, `logging`, `utils`: Supporting pieces.
pub mod cli;
pub mod config;
pub mod corpus;
pub mod diff;
pub mod error;
pub mod logging;
pub mod models;
pub mod normalize;
pub mod output;
pub mod reader;
pub mod utils;
