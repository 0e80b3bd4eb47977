use crate::ast::{AggregationArgs, BinOp, PipelineArgs};
use crate::functions::{AggregationKind, PipelineKind};
use crate::outcome::Span;

/// Typed expression tree produced by the parser.
///
/// Aggregation leaves carry no index; indices are assigned by the order in
/// which the reference extractor meets them.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    // Literals
    /// Literal integer
    ///
    /// # Example
    /// ```text
    /// 100
    /// ```
    Integer(i64),

    /// Literal floating point number
    ///
    /// # Example
    /// ```text
    /// 0.5
    /// ```
    Float(f64),

    /// Leaf aggregation call
    ///
    /// # Examples
    /// ```text
    /// count()
    /// avg(field='cpu.usage')
    /// count(kql='status:error', shift='1w')
    /// ```
    Aggregation(Box<AggregationCall>),

    /// Pipeline operation wrapping one aggregation
    ///
    /// # Example
    /// ```text
    /// derivative(sum(bytes))
    /// ```
    Pipeline(Box<PipelineCall>),

    /// Arithmetic or comparison operator
    BinaryOp {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
        span: Span,
    },

    /// Math function call (or any function the table does not know)
    ///
    /// # Examples
    /// ```text
    /// round(sum(bytes))
    /// ifelse(count() > 100, 1, 0)
    /// ```
    Call {
        name: String,
        args: Vec<Expr>,
        span: Span,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct AggregationCall {
    /// Name as typed, e.g. `avg`
    pub written_name: String,
    pub kind: AggregationKind,
    pub args: AggregationArgs,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineCall {
    /// Name as typed, e.g. `derivative`
    pub written_name: String,
    pub kind: PipelineKind,
    pub inner: AggregationCall,
    pub args: PipelineArgs,
    pub span: Span,
}

impl Expr {
    pub fn is_literal(&self) -> bool {
        matches!(self, Expr::Integer(_) | Expr::Float(_))
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            Expr::Integer(_) | Expr::Float(_) => None,
            Expr::Aggregation(call) => Some(call.span),
            Expr::Pipeline(call) => Some(call.span),
            Expr::BinaryOp { span, .. } | Expr::Call { span, .. } => Some(*span),
        }
    }
}
