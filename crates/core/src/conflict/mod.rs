//! Merge conflict prediction.
//!
//! The conflict subsystem is responsible for:
//! 1. **Running** -- a dry-run three-way merge between two branches.
//! 2. **Parsing** -- turning git's output into per-file conflict details.
//! 3. **Reporting** -- ranking severity and suggesting remediation.

pub mod analyzer;
pub mod parser;
pub mod report;

pub use analyzer::ConflictAnalyzer;
pub use report::{ConflictDetail, ConflictReport, ConflictType, Severity};
