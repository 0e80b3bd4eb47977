//! Reference extraction: the first walk over a parsed formula.
//!
//! Aggregations and pipeline operations are recorded in evaluation order
//! (left operand before right, arguments left to right, a pipeline's inner
//! aggregation before the pipeline itself). No deduplication is done.

use crate::{
    ast::{AggregationCall, Expr, PipelineCall},
    outcome::{AggregationRef, PipelineRef},
};

/// The condition of an `ifelse` whose aggregations are registered twice.
///
/// When the first argument of `ifelse` is a comparison, its aggregations are
/// recorded once for the condition and once more for the comparison itself.
/// The tree's leaves refer to the second registration. Substitution relies
/// on this function to skip the first one.
///
/// The condition pass itself never duplicates again: an `ifelse` nested in a
/// condition is registered once there, and once more (with its own
/// duplicate) when the comparison is walked normally.
pub(crate) fn shadowed_condition<'e>(name: &str, args: &'e [Expr]) -> Option<&'e Expr> {
    if name != "ifelse" {
        return None;
    }
    args.first()
        .filter(|condition| matches!(condition, Expr::BinaryOp { op, .. } if op.is_comparison()))
}

/// Number of (aggregation, pipeline) registrations the condition pass over
/// `expr` makes, i.e. one per leaf.
pub(crate) fn count_references(expr: &Expr) -> (usize, usize) {
    match expr {
        Expr::Integer(_) | Expr::Float(_) => (0, 0),
        Expr::Aggregation(_) => (1, 0),
        Expr::Pipeline(_) => (1, 1),
        Expr::BinaryOp { left, right, .. } => {
            let (la, lp) = count_references(left);
            let (ra, rp) = count_references(right);
            (la + ra, lp + rp)
        }
        Expr::Call { args, .. } => args
            .iter()
            .map(count_references)
            .fold((0, 0), |(a, p), (ca, cp)| (a + ca, p + cp)),
    }
}

struct Extractor<'s> {
    source: &'s [char],
    aggregations: Vec<AggregationRef>,
    pipeline_ops: Vec<PipelineRef>,
    in_condition: bool,
}

impl Extractor<'_> {
    fn visit(&mut self, expr: &Expr) {
        match expr {
            Expr::Integer(_) | Expr::Float(_) => {}
            Expr::Aggregation(call) => {
                self.record_aggregation(call);
            }
            Expr::Pipeline(call) => self.record_pipeline(call),
            Expr::BinaryOp { left, right, .. } => {
                self.visit(left);
                self.visit(right);
            }
            Expr::Call { name, args, .. } => {
                if !self.in_condition
                    && let Some(condition) = shadowed_condition(name, args)
                {
                    self.visit_condition(condition);
                }
                for arg in args {
                    self.visit(arg);
                }
            }
        }
    }

    fn visit_condition(&mut self, condition: &Expr) {
        if let Expr::BinaryOp { op, left, right, .. } = condition {
            log::trace!("registering '{}' condition operands", op.symbol());
            self.in_condition = true;
            self.visit(left);
            self.visit(right);
            self.in_condition = false;
        }
    }

    fn record_aggregation(&mut self, call: &AggregationCall) -> usize {
        let index = self.aggregations.len();
        let args = &call.args;

        self.aggregations.push(AggregationRef {
            written_name: call.written_name.clone(),
            operation_kind: call.kind,
            field: args.field.clone(),
            filter: args.filter.clone(),
            filter_language: args.filter_language,
            percentile: args.percentile,
            rank_value: args.rank_value,
            time_shift: args.time_shift.clone(),
            reduced_time_range: args.reduced_time_range.clone(),
            span: call.span,
            matched_text: call.span.slice(self.source),
        });
        index
    }

    fn record_pipeline(&mut self, call: &PipelineCall) {
        let inner_index = self.record_aggregation(&call.inner);

        self.pipeline_ops.push(PipelineRef {
            written_name: call.written_name.clone(),
            operation_kind: call.kind,
            inner_index,
            window: call.args.window,
            unit: call.args.unit.clone(),
            span: call.span,
            matched_text: call.span.slice(self.source),
        });
    }
}

/// Walk `expr` once and collect its references, in encounter order.
pub fn extract_references(expr: &Expr, source: &[char]) -> (Vec<AggregationRef>, Vec<PipelineRef>) {
    let mut extractor = Extractor {
        source,
        aggregations: vec![],
        pipeline_ops: vec![],
        in_condition: false,
    };
    extractor.visit(expr);
    (extractor.aggregations, extractor.pipeline_ops)
}
