//! CLI support for lens-formula
//!
//! Provides programmatic access to the `formula` inspection commands so
//! they can be embedded in other tools.

mod check;
mod docs;

pub use check::{execute_check, execute_substitute, CheckOptions, CheckResult, SubstituteOptions};
pub use docs::{get_functions_doc, get_functions_overview, DocCategory};

use std::io;

use thiserror::Error;

/// Errors that can occur during CLI operations
#[derive(Debug, Error)]
pub enum CliError {
    /// Formula could not be parsed
    #[error("Syntax error in formula: {0}")]
    Syntax(#[from] crate::SyntaxError),
    /// Formula parsed but could not be substituted
    #[error("Substitution error: {0}")]
    Formula(#[from] crate::FormulaError),
    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    /// No formula provided
    #[error("No formula provided. Pass it as an argument or pipe it to stdin.")]
    NoInput,
    /// Unknown documentation category
    #[error("Unknown category: '{0}'\nRun 'formula functions' to see available categories.")]
    UnknownCategory(String),
}
