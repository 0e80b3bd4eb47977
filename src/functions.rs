//! Function classification and alias resolution.
//!
//! Every function name a formula may call is looked up in a [`FunctionTable`]
//! which says whether the call is a leaf aggregation, a pipeline operation
//! wrapping one aggregation, or a pure math function, and resolves written
//! aliases (`avg`, `derivative`, ...) to their canonical operation kind.
//!
//! The standard table is built once per process and shared read-only.
//! Adding a synonym is one line in [`STANDARD_FUNCTIONS`].

use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use serde::Serialize;

/// Canonical kind of a leaf aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationKind {
    Count,
    Sum,
    Average,
    Max,
    Min,
    Median,
    Percentile,
    PercentileRank,
    UniqueCount,
    LastValue,
    StandardDeviation,
}

impl AggregationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AggregationKind::Count => "count",
            AggregationKind::Sum => "sum",
            AggregationKind::Average => "average",
            AggregationKind::Max => "max",
            AggregationKind::Min => "min",
            AggregationKind::Median => "median",
            AggregationKind::Percentile => "percentile",
            AggregationKind::PercentileRank => "percentile_rank",
            AggregationKind::UniqueCount => "unique_count",
            AggregationKind::LastValue => "last_value",
            AggregationKind::StandardDeviation => "standard_deviation",
        }
    }
}

impl fmt::Display for AggregationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical kind of a pipeline (full-reference) operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineKind {
    CounterRate,
    CumulativeSum,
    Differences,
    MovingAverage,
    Normalize,
    OverallSum,
    OverallMin,
    OverallMax,
    OverallAverage,
}

impl PipelineKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PipelineKind::CounterRate => "counter_rate",
            PipelineKind::CumulativeSum => "cumulative_sum",
            PipelineKind::Differences => "differences",
            PipelineKind::MovingAverage => "moving_average",
            PipelineKind::Normalize => "normalize",
            PipelineKind::OverallSum => "overall_sum",
            PipelineKind::OverallMin => "overall_min",
            PipelineKind::OverallMax => "overall_max",
            PipelineKind::OverallAverage => "overall_average",
        }
    }
}

impl fmt::Display for PipelineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a function name means to the compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionClass {
    /// Leaf computation over the underlying data
    Aggregation(AggregationKind),
    /// Post-aggregation transform wrapping exactly one aggregation
    Pipeline(PipelineKind),
    /// Pure function over already-resolved values
    Math,
}

use AggregationKind as A;
use FunctionClass::{Aggregation, Math, Pipeline};
use PipelineKind as P;

/// Written name → classification, aliases included.
pub const STANDARD_FUNCTIONS: &[(&str, FunctionClass)] = &[
    // Aggregations
    ("count", Aggregation(A::Count)),
    ("sum", Aggregation(A::Sum)),
    ("average", Aggregation(A::Average)),
    ("avg", Aggregation(A::Average)),
    ("mean", Aggregation(A::Average)),
    ("max", Aggregation(A::Max)),
    ("min", Aggregation(A::Min)),
    ("median", Aggregation(A::Median)),
    ("percentile", Aggregation(A::Percentile)),
    ("percentile_rank", Aggregation(A::PercentileRank)),
    ("unique_count", Aggregation(A::UniqueCount)),
    ("distinct_count", Aggregation(A::UniqueCount)),
    ("count_distinct", Aggregation(A::UniqueCount)),
    ("cardinality", Aggregation(A::UniqueCount)),
    ("last_value", Aggregation(A::LastValue)),
    ("last", Aggregation(A::LastValue)),
    ("standard_deviation", Aggregation(A::StandardDeviation)),
    ("std_deviation", Aggregation(A::StandardDeviation)),
    // Pipelines
    ("counter_rate", Pipeline(P::CounterRate)),
    ("cumulative_sum", Pipeline(P::CumulativeSum)),
    ("differences", Pipeline(P::Differences)),
    ("derivative", Pipeline(P::Differences)),
    ("moving_average", Pipeline(P::MovingAverage)),
    ("moving_avg", Pipeline(P::MovingAverage)),
    ("normalize", Pipeline(P::Normalize)),
    ("normalize_by_unit", Pipeline(P::Normalize)),
    ("overall_sum", Pipeline(P::OverallSum)),
    ("overall_min", Pipeline(P::OverallMin)),
    ("overall_max", Pipeline(P::OverallMax)),
    ("overall_average", Pipeline(P::OverallAverage)),
    // Math
    ("abs", Math),
    ("sqrt", Math),
    ("cbrt", Math),
    ("pow", Math),
    ("ceil", Math),
    ("floor", Math),
    ("round", Math),
    ("log", Math),
    ("exp", Math),
    ("clamp", Math),
    ("mod", Math),
    ("ifelse", Math),
    ("pick_max", Math),
    ("pick_min", Math),
    ("defaults", Math),
    ("square", Math),
    ("cube", Math),
    ("fix", Math),
    ("add", Math),
    ("subtract", Math),
    ("multiply", Math),
    ("divide", Math),
    ("eq", Math),
    ("gt", Math),
    ("gte", Math),
    ("lt", Math),
    ("lte", Math),
];

static STANDARD_TABLE: LazyLock<FunctionTable> =
    LazyLock::new(|| FunctionTable::from_entries(STANDARD_FUNCTIONS));

/// Immutable lookup from written function name to [`FunctionClass`].
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionTable {
    entries: HashMap<String, FunctionClass>,
}

impl FunctionTable {
    /// The process-wide standard table.
    pub fn standard() -> &'static FunctionTable {
        &STANDARD_TABLE
    }

    /// Start a custom table from the standard entries.
    pub fn builder() -> FunctionTableBuilder {
        FunctionTableBuilder {
            entries: STANDARD_TABLE.entries.clone(),
        }
    }

    fn from_entries(entries: &[(&str, FunctionClass)]) -> Self {
        FunctionTable {
            entries: entries
                .iter()
                .map(|(name, class)| (name.to_string(), *class))
                .collect(),
        }
    }

    /// Classify a written name. `None` means the name is unknown.
    pub fn classify(&self, name: &str) -> Option<FunctionClass> {
        self.entries.get(name).copied()
    }

    /// All entries, sorted by written name.
    pub fn entries(&self) -> Vec<(&str, FunctionClass)> {
        let mut entries: Vec<_> = self
            .entries
            .iter()
            .map(|(name, class)| (name.as_str(), *class))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }
}

/// Builder for tables that extend or trim the standard one.
///
/// ```
/// use lens_formula::functions::{AggregationKind, FunctionClass, FunctionTable};
///
/// let table = FunctionTable::builder()
///     .aggregation("total", AggregationKind::Sum)
///     .build();
/// assert_eq!(
///     table.classify("total"),
///     Some(FunctionClass::Aggregation(AggregationKind::Sum))
/// );
/// ```
#[derive(Debug, Clone)]
pub struct FunctionTableBuilder {
    entries: HashMap<String, FunctionClass>,
}

impl FunctionTableBuilder {
    pub fn aggregation(mut self, name: &str, kind: AggregationKind) -> Self {
        self.entries.insert(name.to_string(), Aggregation(kind));
        self
    }

    pub fn pipeline(mut self, name: &str, kind: PipelineKind) -> Self {
        self.entries.insert(name.to_string(), Pipeline(kind));
        self
    }

    pub fn math(mut self, name: &str) -> Self {
        self.entries.insert(name.to_string(), Math);
        self
    }

    pub fn remove(mut self, name: &str) -> Self {
        self.entries.remove(name);
        self
    }

    pub fn build(self) -> FunctionTable {
        FunctionTable {
            entries: self.entries,
        }
    }
}
