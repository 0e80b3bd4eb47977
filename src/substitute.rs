//! AST substitution: the second walk over a parsed formula.
//!
//! The walk mirrors [`extract_references`](crate::extract::extract_references)
//! so that the n-th aggregation leaf met here is the n-th
//! [`AggregationRef`](crate::AggregationRef). Leaves are replaced with the
//! caller's identifiers; operators and math calls become function nodes:
//!
//! ```text
//! count() / 100   →   {"kind": "function", "name": "divide", "args": ["col-X0", 100]}
//! ```

use std::collections::HashMap;

use serde::{Serialize, Serializer};
use serde_json::{Map, Value, json};

use crate::{
    ast::{AggregationCall, Expr, PipelineCall},
    error::FormulaError,
    extract::{count_references, shadowed_condition},
    outcome::ParseOutcome,
};

/// Decides what an aggregation or pipeline leaf becomes in the output tree.
trait LeafResolver {
    fn aggregation(&self, index: usize, call: &AggregationCall) -> Result<Value, FormulaError>;

    fn pipeline(
        &self,
        index: usize,
        inner_index: usize,
        call: &PipelineCall,
    ) -> Result<Value, FormulaError>;
}

/// Leaves become the identifiers supplied by the caller.
struct Identifiers<'m, S> {
    by_index: &'m HashMap<usize, S>,
}

impl<S: AsRef<str>> LeafResolver for Identifiers<'_, S> {
    fn aggregation(&self, index: usize, _call: &AggregationCall) -> Result<Value, FormulaError> {
        self.by_index
            .get(&index)
            .map(|id| Value::String(id.as_ref().to_string()))
            .ok_or(FormulaError::MissingIdentifier { index })
    }

    fn pipeline(
        &self,
        index: usize,
        _inner_index: usize,
        call: &PipelineCall,
    ) -> Result<Value, FormulaError> {
        Err(FormulaError::UnresolvedPipeline {
            name: call.written_name.clone(),
            index,
        })
    }
}

/// Leaves are rendered as indexed placeholders, for inspection output.
struct Placeholders;

impl LeafResolver for Placeholders {
    fn aggregation(&self, index: usize, call: &AggregationCall) -> Result<Value, FormulaError> {
        Ok(json!({
            "kind": "aggregation",
            "index": index,
            "name": call.kind.as_str(),
        }))
    }

    fn pipeline(
        &self,
        index: usize,
        inner_index: usize,
        call: &PipelineCall,
    ) -> Result<Value, FormulaError> {
        let inner = self.aggregation(inner_index, &call.inner)?;
        Ok(json!({
            "kind": "pipeline",
            "index": index,
            "name": call.kind.as_str(),
            "args": [inner],
        }))
    }
}

struct Walker<'r, R> {
    resolver: &'r R,
    next_aggregation: usize,
    next_pipeline: usize,
}

impl<R: LeafResolver> Walker<'_, R> {
    fn take_aggregation(&mut self) -> usize {
        let index = self.next_aggregation;
        self.next_aggregation += 1;
        index
    }

    fn walk(&mut self, expr: &Expr) -> Result<Value, FormulaError> {
        match expr {
            Expr::Integer(n) => Ok(json!(n)),
            Expr::Float(n) => Ok(float_value(*n)),
            Expr::Aggregation(call) => {
                let index = self.take_aggregation();
                self.resolver.aggregation(index, call)
            }
            Expr::Pipeline(call) => {
                let inner_index = self.take_aggregation();
                let index = self.next_pipeline;
                self.next_pipeline += 1;
                self.resolver.pipeline(index, inner_index, call)
            }
            Expr::BinaryOp {
                op, left, right, ..
            } => {
                let args = vec![self.walk(left)?, self.walk(right)?];
                Ok(function_node(op.function_name(), args))
            }
            Expr::Call { name, args, .. } => {
                if let Some(condition) = shadowed_condition(name, args) {
                    let (aggregations, pipelines) = count_references(condition);
                    self.next_aggregation += aggregations;
                    self.next_pipeline += pipelines;
                }
                let args = args
                    .iter()
                    .map(|arg| self.walk(arg))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(function_node(name, args))
            }
        }
    }
}

fn float_value(n: f64) -> Value {
    serde_json::Number::from_f64(n)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

fn function_node(name: &str, args: Vec<Value>) -> Value {
    let mut node = Map::new();
    node.insert("kind".to_string(), Value::String("function".to_string()));
    node.insert("name".to_string(), Value::String(name.to_string()));
    node.insert("args".to_string(), Value::Array(args));
    Value::Object(node)
}

fn render<R: LeafResolver>(expr: &Expr, resolver: &R) -> Result<Value, FormulaError> {
    let mut walker = Walker {
        resolver,
        next_aggregation: 0,
        next_pipeline: 0,
    };
    walker.walk(expr)
}

/// Replace every aggregation leaf with the identifier assigned to its index.
///
/// A literal formula returns its literal unchanged. Pipeline operations are
/// not substituted and yield [`FormulaError::UnresolvedPipeline`].
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use serde_json::json;
///
/// let outcome = lens_formula::parse("count() / 100").unwrap();
/// let ids = HashMap::from([(0, "col-X0")]);
///
/// let tree = lens_formula::substitute(&outcome, &ids).unwrap();
/// assert_eq!(tree, json!({"kind": "function", "name": "divide", "args": ["col-X0", 100]}));
/// ```
pub fn substitute<S: AsRef<str>>(
    outcome: &ParseOutcome,
    identifiers: &HashMap<usize, S>,
) -> Result<Value, FormulaError> {
    if outcome.is_literal {
        return render(&outcome.raw_ast, &Placeholders);
    }
    render(&outcome.raw_ast, &Identifiers { by_index: identifiers })
}

/// The tree with indexed placeholders in place of identifiers.
pub fn raw_json(expr: &Expr) -> Value {
    // Placeholders never fail
    render(expr, &Placeholders).unwrap_or(Value::Null)
}

pub(crate) fn serialize_raw<S: Serializer>(expr: &Expr, serializer: S) -> Result<S::Ok, S::Error> {
    raw_json(expr).serialize(serializer)
}
