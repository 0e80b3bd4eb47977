//! Compiler for dashboard formula expressions.
//!
//! A formula such as `count(kql="status:error") / count() * 100` is parsed
//! into the aggregations it queries, the pipeline operations wrapping them,
//! and an arithmetic tree whose aggregation leaves are later replaced with
//! column identifiers.
//!
//! ```
//! use std::collections::HashMap;
//!
//! let outcome = lens_formula::parse("derivative(sum(bytes))").unwrap();
//! assert_eq!(outcome.aggregations[0].field.as_deref(), Some("bytes"));
//! assert_eq!(outcome.pipeline_ops[0].operation_kind.as_str(), "differences");
//! assert_eq!(outcome.pipeline_ops[0].inner_index, 0);
//!
//! let outcome = lens_formula::parse("count()").unwrap();
//! let tree = lens_formula::substitute(&outcome, &HashMap::from([(0, "col-X0")])).unwrap();
//! assert_eq!(tree, "col-X0");
//! ```
pub mod ast;
pub mod cache;
#[cfg(feature = "cli")]
pub mod cli;
pub mod error;
pub mod extract;
pub mod functions;
pub mod lexer;
pub mod outcome;
pub mod parser;
pub mod substitute;

pub use ast::{BinOp, Expr, Token};
pub use cache::FormulaCache;
pub use error::{FormulaError, Position, SyntaxError};
pub use functions::{AggregationKind, FunctionClass, FunctionTable, PipelineKind};
pub use lexer::Lexer;
pub use outcome::{AggregationRef, ParseOutcome, PipelineRef, Span};
pub use parser::Parser;
pub use substitute::substitute;

/// Parse a formula with the standard function table.
pub fn parse(text: &str) -> Result<ParseOutcome, SyntaxError> {
    Parser::new(Lexer::new(text))?.parse_formula()
}
