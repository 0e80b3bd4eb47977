//! # Formula Language - Abstract Syntax Tree
//!
//! This module defines the tokens and the typed expression tree for dashboard
//! formulas: small arithmetic expressions over aggregations that define a
//! derived metric.
//!
//! ## Architecture Overview
//!
//! - **[tokens]** - Lexical tokens produced by the lexer
//! - **[expressions]** - Expression nodes (literals, aggregations, pipelines, operators, calls)
//! - **[operators]** - Binary operators and the functions they lower to
//! - **[arguments]** - The closed, typed set of named arguments
//!
//! ## Quick Start
//!
//! ```text
//! count(kql="status:error") / count() * 100
//! ```
//!
//! The error percentage: two `count` aggregations combined with arithmetic.
//!
//! ## Core Concepts
//!
//! ### Three kinds of function
//!
//! - **Aggregations** - `count()`, `sum(bytes)`, `avg(field='cpu.usage')` query data
//! - **Pipelines** - `derivative(sum(bytes))` transform exactly one aggregation
//! - **Math** - `round(...)`, `abs(...)`, `ifelse(...)` combine resolved values
//!
//! ### Precedence
//!
//! From tightest to loosest: unary `-`, then `*` `/`, then `+` `-`, then the
//! comparisons `>` `<` `>=` `<=` `==`.
//!
//! ### Named arguments
//!
//! ```text
//! percentile(bytes, percentile=95, shift='1d')
//! moving_average(avg(cpu), window=5)
//! ```
//!
//! ## Examples
//!
//! ```text
//! 42                                  // literal formula
//! counter_rate(max(field))            // pipeline over an aggregation
//! round(abs(sum(a) - sum(b)))         // math over arithmetic
//! ifelse(count() > 100, 1, 0)         // comparison inside a condition
//! ```
pub mod arguments;
pub mod expressions;
pub mod operators;
pub mod tokens;

pub use arguments::{AggregationArgs, ArgValue, FilterLanguage, NamedArg, PipelineArgs};
pub use expressions::{AggregationCall, Expr, PipelineCall};
pub use operators::BinOp;
pub use tokens::{SpannedToken, Token};
