//
// lib.rs
// valrun
//
// Library entry that re-exports modules so the binary and the integration tests can reach the comparator, line filter, run staging and the validation driver.
//
// Thales Matheus Mendonça Santos - October 2026
//
// Public crate interface: re-export modules used by the binary and tests.
pub mod cli;
pub mod compare;
pub mod error;
pub mod filter;
pub mod launcher;
pub mod plugin;
pub mod utils;
pub mod validate;
pub mod workspace;

pub use cli::{build_compare_options, build_run_config, Args, Command, RunConfig};
pub use compare::{compare_files, compare_text, CompareOptions, Comparison, Mismatch, Tolerance};
pub use error::{Result, ValidationError};
pub use filter::LineFilter;
pub use plugin::OutputCategory;
pub use validate::{compare_categories, run_validation, CategoryOutcome, ValidationSummary};
pub use workspace::{RunKind, RunWorkspace};
