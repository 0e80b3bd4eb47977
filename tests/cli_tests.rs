// tests/cli_tests.rs

#![cfg(feature = "cli")]

use lens_formula::cli::{
    execute_check, execute_substitute, get_functions_doc, get_functions_overview, CheckOptions,
    CheckResult, CliError, SubstituteOptions,
};
use serde_json::json;

#[test]
fn test_check_syntax_only() {
    let options = CheckOptions {
        formula: "count() / 100".to_string(),
        syntax_only: true,
    };
    assert!(matches!(execute_check(&options).unwrap(), CheckResult::SyntaxValid));
}

#[test]
fn test_check_prints_outcome() {
    let options = CheckOptions {
        formula: "derivative(sum(bytes))\n".to_string(),
        syntax_only: false,
    };

    match execute_check(&options).unwrap() {
        CheckResult::Success(value) => {
            assert_eq!(value["aggregations"][0]["field"], "bytes");
            assert_eq!(value["pipelineOps"][0]["operationKind"], "differences");
            assert_eq!(value["sourceText"], "derivative(sum(bytes))\n");
        }
        other => panic!("Expected outcome, got {:?}", other),
    }
}

#[test]
fn test_check_spans_refer_to_input_as_given() {
    let options = CheckOptions {
        formula: "  count() + 1".to_string(),
        syntax_only: false,
    };

    match execute_check(&options).unwrap() {
        CheckResult::Success(value) => {
            assert_eq!(value["sourceText"], "  count() + 1");
            assert_eq!(value["aggregations"][0]["span"], json!({"start": 2, "end": 9}));
            assert_eq!(value["aggregations"][0]["matchedText"], "count()");
        }
        other => panic!("Expected outcome, got {:?}", other),
    }
}

#[test]
fn test_check_reports_syntax_error() {
    let options = CheckOptions {
        formula: "count(()".to_string(),
        syntax_only: true,
    };
    let err = execute_check(&options).unwrap_err();
    assert!(matches!(err, CliError::Syntax(_)));
    assert!(err.to_string().starts_with("Syntax error in formula:"));
}

#[test]
fn test_empty_formula() {
    let options = CheckOptions {
        formula: "  \n".to_string(),
        syntax_only: false,
    };
    assert!(matches!(execute_check(&options), Err(CliError::NoInput)));
}

#[test]
fn test_substitute_with_prefix() {
    let options = SubstituteOptions {
        formula: "count(kql='a') / count()".to_string(),
        prefix: "metric_".to_string(),
    };
    assert_eq!(
        execute_substitute(&options).unwrap(),
        json!({"kind": "function", "name": "divide", "args": ["metric_0", "metric_1"]})
    );
}

#[test]
fn test_substitute_default_prefix() {
    let options = SubstituteOptions {
        formula: "sum(bytes)".to_string(),
        ..Default::default()
    };
    assert_eq!(execute_substitute(&options).unwrap(), json!("col-0"));
}

#[test]
fn test_substitute_pipeline_fails() {
    let options = SubstituteOptions {
        formula: "cumulative_sum(count())".to_string(),
        ..Default::default()
    };
    assert!(matches!(execute_substitute(&options), Err(CliError::Formula(_))));
}

#[test]
fn test_functions_docs() {
    assert!(get_functions_overview().contains("aggregations"));

    let aggregations = get_functions_doc("aggregations").unwrap();
    assert!(aggregations.contains("average"));
    assert!(aggregations.contains("avg"));

    let pipelines = get_functions_doc("pipelines").unwrap();
    assert!(pipelines.contains("differences"));
    assert!(pipelines.contains("derivative"));

    assert!(get_functions_doc("math").unwrap().contains("ifelse"));
    assert!(get_functions_doc("ops").unwrap().contains("gte"));
}

#[test]
fn test_unknown_category() {
    assert!(matches!(
        get_functions_doc("widgets"),
        Err(CliError::UnknownCategory(name)) if name == "widgets"
    ));
}
