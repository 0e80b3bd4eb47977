//! Parse and substitute formulas for inspection

use std::collections::HashMap;

use super::CliError;
use crate::{parse, substitute};

/// Options for the check command
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// The formula to parse
    pub formula: String,
    /// Only validate syntax, don't print the outcome
    pub syntax_only: bool,
}

/// Result of a check operation
#[derive(Debug)]
pub enum CheckResult {
    /// Syntax validation passed
    SyntaxValid,
    /// Formula parsed; the outcome as JSON
    Success(serde_json::Value),
}

/// Options for the substitute command
#[derive(Debug, Clone)]
pub struct SubstituteOptions {
    /// The formula to parse
    pub formula: String,
    /// Identifier prefix; aggregation `i` becomes `<prefix><i>`
    pub prefix: String,
}

impl Default for SubstituteOptions {
    fn default() -> Self {
        SubstituteOptions {
            formula: String::new(),
            prefix: "col-".to_string(),
        }
    }
}

/// Execute a formula check operation
pub fn execute_check(options: &CheckOptions) -> Result<CheckResult, CliError> {
    let formula = &options.formula;
    if formula.trim().is_empty() {
        return Err(CliError::NoInput);
    }

    // Spans refer to the formula exactly as given
    let outcome = parse(formula)?;

    if options.syntax_only {
        return Ok(CheckResult::SyntaxValid);
    }

    Ok(CheckResult::Success(serde_json::to_value(&outcome)?))
}

/// Parse a formula and substitute generated identifiers into its tree
pub fn execute_substitute(options: &SubstituteOptions) -> Result<serde_json::Value, CliError> {
    let formula = &options.formula;
    if formula.trim().is_empty() {
        return Err(CliError::NoInput);
    }

    // Spans refer to the formula exactly as given
    let outcome = parse(formula)?;
    let identifiers: HashMap<usize, String> = (0..outcome.aggregations.len())
        .map(|index| (index, format!("{}{}", options.prefix, index)))
        .collect();

    Ok(substitute(&outcome, &identifiers)?)
}
