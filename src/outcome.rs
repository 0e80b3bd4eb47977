//! The compiler's output model.
//!
//! A [`ParseOutcome`] is produced in full by one parse call and is not
//! changed afterwards. The surrounding dashboard compiler assigns an
//! identifier to every [`AggregationRef`] and [`PipelineRef`], builds one
//! helper column per reference, and then calls
//! [`substitute`](crate::substitute()) to obtain the final arithmetic tree.

use serde::Serialize;

use crate::ast::{Expr, FilterLanguage};
use crate::functions::{AggregationKind, PipelineKind};

/// Half-open range of character offsets into the formula text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Span { start, end }
    }

    /// Smallest span covering both `self` and `other`.
    pub fn to(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// The characters this span covers.
    pub fn slice(self, source: &[char]) -> String {
        let end = self.end.min(source.len());
        let start = self.start.min(end);
        source[start..end].iter().collect()
    }
}

/// One leaf aggregation found in the formula.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregationRef {
    /// Name as typed, e.g. `avg`
    pub written_name: String,
    /// Canonical kind after alias resolution, e.g. `average`
    pub operation_kind: AggregationKind,
    pub field: Option<String>,
    pub filter: Option<String>,
    pub filter_language: Option<FilterLanguage>,
    pub percentile: Option<f64>,
    pub rank_value: Option<f64>,
    pub time_shift: Option<String>,
    pub reduced_time_range: Option<String>,
    pub span: Span,
    pub matched_text: String,
}

/// One pipeline operation found in the formula.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineRef {
    pub written_name: String,
    pub operation_kind: PipelineKind,
    /// Index into [`ParseOutcome::aggregations`] of the wrapped aggregation
    pub inner_index: usize,
    pub window: Option<u32>,
    pub unit: Option<String>,
    pub span: Span,
    pub matched_text: String,
}

/// Everything a parse produces.
///
/// `aggregations` and `pipeline_ops` are ordered by first left-to-right
/// occurrence; identical text always yields an identical outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseOutcome {
    pub aggregations: Vec<AggregationRef>,
    pub pipeline_ops: Vec<PipelineRef>,
    /// The tree before identifier substitution. For a literal formula this
    /// is the literal itself.
    #[serde(serialize_with = "crate::substitute::serialize_raw")]
    pub raw_ast: Expr,
    pub source_text: String,
    pub is_literal: bool,
}

impl ParseOutcome {
    /// The literal value of a constant formula.
    pub fn literal_value(&self) -> Option<f64> {
        match self.raw_ast {
            Expr::Integer(n) if self.is_literal => Some(n as f64),
            Expr::Float(n) if self.is_literal => Some(n),
            _ => None,
        }
    }
}
