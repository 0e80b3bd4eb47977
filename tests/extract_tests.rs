// tests/extract_tests.rs

use lens_formula::ast::FilterLanguage;
use lens_formula::functions::{AggregationKind, FunctionTable, PipelineKind};
use lens_formula::{parse, Lexer, ParseOutcome, Parser};

fn outcome(formula: &str) -> ParseOutcome {
    parse(formula).unwrap_or_else(|e| panic!("Failed to parse {:?}: {}", formula, e))
}

// ============================================================================
// Aggregations
// ============================================================================

#[test]
fn test_filtered_ratio() {
    let outcome = outcome("count(kql=\"status:error\") / count() * 100");

    assert_eq!(outcome.aggregations.len(), 2);
    assert!(outcome.pipeline_ops.is_empty());
    assert!(!outcome.is_literal);

    let first = &outcome.aggregations[0];
    assert_eq!(first.operation_kind, AggregationKind::Count);
    assert_eq!(first.field, None);
    assert_eq!(first.filter.as_deref(), Some("status:error"));
    assert_eq!(first.filter_language, Some(FilterLanguage::Kql));
    assert_eq!(first.matched_text, "count(kql=\"status:error\")");
    assert_eq!((first.span.start, first.span.end), (0, 25));

    let second = &outcome.aggregations[1];
    assert_eq!(second.filter, None);
    assert_eq!(second.filter_language, None);
    assert_eq!(second.matched_text, "count()");
    assert_eq!((second.span.start, second.span.end), (28, 35));
}

#[test]
fn test_written_and_canonical_names() {
    let outcome = outcome("avg(cpu) + mean(cpu) + last(host.name) + cardinality(user.id)");
    let names: Vec<(&str, AggregationKind)> = outcome
        .aggregations
        .iter()
        .map(|a| (a.written_name.as_str(), a.operation_kind))
        .collect();

    assert_eq!(
        names,
        vec![
            ("avg", AggregationKind::Average),
            ("mean", AggregationKind::Average),
            ("last", AggregationKind::LastValue),
            ("cardinality", AggregationKind::UniqueCount),
        ]
    );
}

#[test]
fn test_encounter_order() {
    let outcome = outcome("round(abs(sum(a) - sum(b))) / max(c)");
    let fields: Vec<Option<&str>> = outcome
        .aggregations
        .iter()
        .map(|a| a.field.as_deref())
        .collect();
    assert_eq!(fields, vec![Some("a"), Some("b"), Some("c")]);
}

#[test]
fn test_no_deduplication() {
    let outcome = outcome("count() + count()");
    assert_eq!(outcome.aggregations.len(), 2);
    assert_eq!(outcome.aggregations[0].matched_text, outcome.aggregations[1].matched_text);
    assert_ne!(outcome.aggregations[0].span, outcome.aggregations[1].span);
}

#[test]
fn test_percentile_arguments() {
    let outcome = outcome("percentile(bytes, percentile=95) - percentile_rank(bytes, value=1024)");

    assert_eq!(outcome.aggregations[0].operation_kind, AggregationKind::Percentile);
    assert_eq!(outcome.aggregations[0].percentile, Some(95.0));
    assert_eq!(outcome.aggregations[0].rank_value, None);

    assert_eq!(outcome.aggregations[1].operation_kind, AggregationKind::PercentileRank);
    assert_eq!(outcome.aggregations[1].rank_value, Some(1024.0));
    assert_eq!(outcome.aggregations[1].percentile, None);
}

#[test]
fn test_time_arguments() {
    let outcome = outcome("sum(bytes, shift='1d') / sum(bytes, reducedTimeRange=\"1h\")");

    assert_eq!(outcome.aggregations[0].time_shift.as_deref(), Some("1d"));
    assert_eq!(outcome.aggregations[0].reduced_time_range, None);
    assert_eq!(outcome.aggregations[1].time_shift, None);
    assert_eq!(outcome.aggregations[1].reduced_time_range.as_deref(), Some("1h"));
}

#[test]
fn test_lucene_filter() {
    let outcome = outcome("count(lucene='response:[500 TO 599]')");
    assert_eq!(outcome.aggregations[0].filter.as_deref(), Some("response:[500 TO 599]"));
    assert_eq!(outcome.aggregations[0].filter_language, Some(FilterLanguage::Lucene));
}

#[test]
fn test_field_less_and_named_field() {
    let outcome = outcome("count() + sum(field='bytes')");
    assert_eq!(outcome.aggregations[0].field, None);
    assert_eq!(outcome.aggregations[1].field.as_deref(), Some("bytes"));
}

// ============================================================================
// Pipelines
// ============================================================================

#[test]
fn test_counter_rate() {
    let outcome = outcome("counter_rate(max(field))");

    assert_eq!(outcome.aggregations.len(), 1);
    assert_eq!(outcome.aggregations[0].operation_kind, AggregationKind::Max);
    assert_eq!(outcome.aggregations[0].field.as_deref(), Some("field"));
    assert_eq!(outcome.aggregations[0].matched_text, "max(field)");

    let pipeline = &outcome.pipeline_ops[0];
    assert_eq!(pipeline.operation_kind, PipelineKind::CounterRate);
    assert_eq!(pipeline.inner_index, 0);
    assert_eq!(pipeline.matched_text, "counter_rate(max(field))");
    assert_eq!((pipeline.span.start, pipeline.span.end), (0, 24));
}

#[test]
fn test_multiple_pipelines() {
    let outcome = outcome("count() + differences(sum(a)) + cumulative_sum(count())");

    assert_eq!(outcome.aggregations.len(), 3);
    assert_eq!(outcome.pipeline_ops.len(), 2);
    assert_eq!(outcome.pipeline_ops[0].operation_kind, PipelineKind::Differences);
    assert_eq!(outcome.pipeline_ops[0].inner_index, 1);
    assert_eq!(outcome.pipeline_ops[1].operation_kind, PipelineKind::CumulativeSum);
    assert_eq!(outcome.pipeline_ops[1].inner_index, 2);
}

#[test]
fn test_pipeline_arguments() {
    let outcome =
        outcome("moving_avg(avg(cpu), window=7) + normalize_by_unit(sum(bytes), unit='s')");

    assert_eq!(outcome.pipeline_ops[0].written_name, "moving_avg");
    assert_eq!(outcome.pipeline_ops[0].operation_kind, PipelineKind::MovingAverage);
    assert_eq!(outcome.pipeline_ops[0].window, Some(7));
    assert_eq!(outcome.pipeline_ops[1].operation_kind, PipelineKind::Normalize);
    assert_eq!(outcome.pipeline_ops[1].unit.as_deref(), Some("s"));
}

#[test]
fn test_pipeline_inside_math() {
    let outcome = outcome("abs(derivative(sum(bytes)) * 2)");
    assert_eq!(outcome.pipeline_ops.len(), 1);
    assert_eq!(outcome.pipeline_ops[0].inner_index, 0);
}

// ============================================================================
// Conditions
// ============================================================================

#[test]
fn test_condition_aggregation_recorded_twice() {
    // A comparison used as an ifelse condition registers its aggregations
    // once for the condition and once for the comparison.
    let outcome = outcome("ifelse(count() > 100, 1, 0)");

    assert_eq!(outcome.aggregations.len(), 2);
    assert_eq!(outcome.aggregations[0].matched_text, "count()");
    assert_eq!(outcome.aggregations[1].matched_text, "count()");
    assert_eq!(outcome.aggregations[0].span, outcome.aggregations[1].span);
    assert_eq!(
        (outcome.aggregations[0].span.start, outcome.aggregations[0].span.end),
        (7, 14)
    );
}

#[test]
fn test_condition_duplicates_precede_branches() {
    let outcome = outcome("ifelse(count() > 100, sum(bytes), 0)");
    let kinds: Vec<AggregationKind> =
        outcome.aggregations.iter().map(|a| a.operation_kind).collect();
    assert_eq!(
        kinds,
        vec![AggregationKind::Count, AggregationKind::Count, AggregationKind::Sum]
    );
}

#[test]
fn test_nested_condition_recorded_once_per_level() {
    let outcome = outcome("ifelse(ifelse(count() > 1, 1, 0) > 1, 1, 0)");

    assert_eq!(outcome.aggregations.len(), 3);
    assert!(outcome.aggregations.iter().all(|a| a.matched_text == "count()"));
    assert!(outcome.aggregations.iter().all(|a| a.span == outcome.aggregations[0].span));
}

#[test]
fn test_condition_registrations_grow_linearly() {
    let mut formula = "count()".to_string();
    for depth in 1..=20 {
        formula = format!("ifelse({} > 1, 1, 0)", formula);
        assert_eq!(outcome(&formula).aggregations.len(), depth + 1, "depth {}", depth);
    }
}

#[test]
fn test_non_comparison_condition_recorded_once() {
    assert_eq!(outcome("ifelse(count(), 1, 0)").aggregations.len(), 1);
    assert_eq!(outcome("pick_max(count() > 1, 0)").aggregations.len(), 1);
}

// ============================================================================
// Custom tables
// ============================================================================

#[test]
fn test_custom_alias() {
    let table = FunctionTable::builder()
        .aggregation("total", AggregationKind::Sum)
        .pipeline("delta", PipelineKind::Differences)
        .build();

    let mut parser = Parser::with_table(Lexer::new("delta(total(bytes))"), &table).unwrap();
    let outcome = parser.parse_formula().unwrap();

    assert_eq!(outcome.aggregations[0].written_name, "total");
    assert_eq!(outcome.aggregations[0].operation_kind, AggregationKind::Sum);
    assert_eq!(outcome.pipeline_ops[0].written_name, "delta");
    assert_eq!(outcome.pipeline_ops[0].operation_kind, PipelineKind::Differences);
}
