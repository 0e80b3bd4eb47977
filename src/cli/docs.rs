//! Function reference for the formula CLI

use std::collections::BTreeMap;

use super::CliError;
use crate::functions::{FunctionClass, FunctionTable};

/// Available documentation categories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocCategory {
    Aggregations,
    Pipelines,
    Math,
    Operators,
}

impl DocCategory {
    /// Parse category name from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "aggregations" | "aggregation" | "aggs" => Some(Self::Aggregations),
            "pipelines" | "pipeline" | "full_reference" => Some(Self::Pipelines),
            "math" | "functions" => Some(Self::Math),
            "operators" | "ops" => Some(Self::Operators),
            _ => None,
        }
    }
}

/// Get the overview (category listing)
pub fn get_functions_overview() -> &'static str {
    r#"FORMULA FUNCTIONS

A formula combines aggregations, pipeline operations and arithmetic into a
single derived metric, e.g.

  count(kql="status:error") / count() * 100

CATEGORIES

  aggregations      Leaf computations over the data (count, sum, average, ...)
  pipelines         Transforms wrapping exactly one aggregation (differences, ...)
  math              Pure functions over resolved values (round, abs, ifelse, ...)
  operators         Arithmetic and comparison operators and their precedence

NAMED ARGUMENTS

  field='x'              Field of an aggregation (or pass it positionally)
  kql='q' / lucene='q'   Filter applied to an aggregation
  percentile=95          Percentile to compute
  value=10               Rank value for percentile_rank
  shift='1d'             Time shift
  reducedTimeRange='1h'  Reduced time range
  window=5               Moving-average window
  unit='s'               Normalization unit

Run 'formula functions <category>' for the functions in a category.
"#
}

const OPERATORS_DOC: &str = r#"OPERATORS

From tightest to loosest binding:

  -x        Negation                 lowers to subtract(0, x)
  *  /      Multiply, divide         multiply, divide
  +  -      Add, subtract            add, subtract
  >  <      Greater, less            gt, lt
  >= <=     Greater/less or equal    gte, lte
  ==        Equal                    eq

Comparisons do not chain: `a > b > c` is a syntax error.
"#;

/// Get documentation for a specific category
pub fn get_functions_doc(name: &str) -> Result<String, CliError> {
    let category =
        DocCategory::from_str(name).ok_or_else(|| CliError::UnknownCategory(name.to_string()))?;

    if category == DocCategory::Operators {
        return Ok(OPERATORS_DOC.to_string());
    }

    // canonical kind -> written names
    let mut groups: BTreeMap<String, Vec<&str>> = BTreeMap::new();
    for (written, class) in FunctionTable::standard().entries() {
        let canonical = match (category, class) {
            (DocCategory::Aggregations, FunctionClass::Aggregation(kind)) => kind.as_str(),
            (DocCategory::Pipelines, FunctionClass::Pipeline(kind)) => kind.as_str(),
            (DocCategory::Math, FunctionClass::Math) => written,
            _ => continue,
        };
        groups.entry(canonical.to_string()).or_default().push(written);
    }

    let title = match category {
        DocCategory::Aggregations => "AGGREGATIONS",
        DocCategory::Pipelines => "PIPELINE OPERATIONS",
        _ => "MATH FUNCTIONS",
    };

    let mut doc = format!("{}\n\n", title);
    for (canonical, written) in groups {
        let aliases: Vec<&str> = written.into_iter().filter(|w| *w != canonical).collect();
        if aliases.is_empty() {
            doc.push_str(&format!("  {}\n", canonical));
        } else {
            doc.push_str(&format!("  {:<20} aliases: {}\n", canonical, aliases.join(", ")));
        }
    }
    Ok(doc)
}
