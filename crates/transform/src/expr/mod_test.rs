//! Tests for expression evaluation

use super::*;

fn vars(pairs: &[(&str, Value)]) -> Variables {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

fn eval(expr: &str, variables: &Variables) -> EvalResult<bool> {
    ExprEvaluator::new().evaluate(expr, variables)
}

#[test]
fn test_numeric_comparisons() {
    let v = vars(&[("value", Value::Number(120.0))]);

    assert!(eval("value > 100", &v).unwrap());
    assert!(eval("value >= 120", &v).unwrap());
    assert!(!eval("value < 100", &v).unwrap());
    assert!(eval("value <= 120.0", &v).unwrap());
    assert!(eval("value == 120", &v).unwrap());
    assert!(eval("value != 121", &v).unwrap());
}

#[test]
fn test_string_equality_and_ordering() {
    let v = vars(&[("name", Value::from("ib_recv")), ("type", Value::from("node"))]);

    assert!(eval("name == 'ib_recv'", &v).unwrap());
    assert!(eval("name != \"ib_xmit\"", &v).unwrap());
    assert!(eval("type < 'socket'", &v).unwrap());
}

#[test]
fn test_cross_type_equality_is_false() {
    let v = vars(&[("value", Value::Number(1.0))]);

    assert!(!eval("value == '1'", &v).unwrap());
    assert!(eval("value != true", &v).unwrap());
}

#[test]
fn test_logical_operators() {
    let v = vars(&[
        ("value", Value::Number(50.0)),
        ("type", Value::from("node")),
    ]);

    assert!(eval("type == 'node' && value > 10", &v).unwrap());
    assert!(eval("type == 'socket' || value > 10", &v).unwrap());
    assert!(!eval("!(value > 10)", &v).unwrap());
    assert!(eval("(value > 100 || value < 60) && type == 'node'", &v).unwrap());
}

#[test]
fn test_short_circuit_skips_undefined_variable() {
    let v = vars(&[("value", Value::Number(1.0))]);

    assert!(!eval("value > 5 && missing > 1", &v).unwrap());
    assert!(eval("value < 5 || missing > 1", &v).unwrap());
}

#[test]
fn test_arithmetic() {
    let v = vars(&[("rx", Value::Number(30.0)), ("tx", Value::Number(12.0))]);

    assert!(eval("rx + tx == 42", &v).unwrap());
    assert!(eval("rx - tx * 2 == 6", &v).unwrap());
    assert!(eval("rx / 3 == 10", &v).unwrap());
    assert!(eval("rx % 7 == 2", &v).unwrap());
    assert!(eval("-rx < 0", &v).unwrap());
}

#[test]
fn test_string_concatenation() {
    let v = vars(&[("host", Value::from("n01"))]);
    assert!(eval("host + '.cluster' == 'n01.cluster'", &v).unwrap());
}

#[test]
fn test_regex_match() {
    let v = vars(&[("name", Value::from("ib_recv"))]);

    assert!(eval("name =~ '^ib_'", &v).unwrap());
    assert!(!eval("name !~ 'recv$'", &v).unwrap());
}

#[test]
fn test_dynamic_regex_pattern() {
    let v = vars(&[
        ("name", Value::from("ib_recv")),
        ("pattern", Value::from("^ib")),
    ]);
    assert!(eval("name =~ pattern", &v).unwrap());
}

#[test]
fn test_in_operator() {
    let v = vars(&[("type", Value::from("socket"))]);

    assert!(eval("type in ('node', 'socket')", &v).unwrap());
    assert!(!eval("type in ('node', 'cpu')", &v).unwrap());
    assert!(!eval("type in ()", &v).unwrap());
}

#[test]
fn test_escaped_identifier() {
    let v = vars(&[("cpu-load", Value::Number(0.9))]);
    assert!(eval("[cpu-load] > 0.5", &v).unwrap());
}

#[test]
fn test_bool_variable() {
    let v = vars(&[("up", Value::Bool(true))]);
    assert!(eval("up", &v).unwrap());
    assert!(eval("up == true", &v).unwrap());
}

#[test]
fn test_malformed_expression_errors() {
    let v = vars(&[("value", Value::Number(2.0))]);

    let err = eval("value >>> 1", &v).unwrap_err();
    assert!(matches!(err, EvalError::Parse { .. }));
}

#[test]
fn test_undefined_variable_errors() {
    let err = eval("missing > 1", &Variables::new()).unwrap_err();
    assert_eq!(err, EvalError::UndefinedVariable("missing".into()));
}

#[test]
fn test_type_mismatch_errors() {
    let v = vars(&[("name", Value::from("x")), ("value", Value::Number(1.0))]);

    assert!(matches!(
        eval("name > 1", &v).unwrap_err(),
        EvalError::TypeMismatch { operator: ">", .. }
    ));
    assert!(matches!(
        eval("value && true", &v).unwrap_err(),
        EvalError::TypeMismatch { operator: "&&", .. }
    ));
    assert!(matches!(
        eval("value =~ 'x'", &v).unwrap_err(),
        EvalError::TypeMismatch { operator: "=~", .. }
    ));
}

#[test]
fn test_non_boolean_result_errors() {
    let v = vars(&[("value", Value::Number(1.0))]);
    assert_eq!(
        eval("value + 1", &v).unwrap_err(),
        EvalError::NotBoolean("number")
    );
    assert_eq!(eval("'text'", &v).unwrap_err(), EvalError::NotBoolean("string"));
}

#[test]
fn test_division_by_zero_follows_float_rules() {
    let v = vars(&[("value", Value::Number(1.0))]);
    assert!(eval("value / 0 > 1", &v).unwrap());
    assert!(eval("-value / 0 < -1", &v).unwrap());
    // NaN compares unequal to everything, itself included
    assert!(!eval("value % 0 == value % 0", &v).unwrap());
    assert!(!eval("0 / 0 > 0", &v).unwrap());
}

#[test]
fn test_expression_eval_returns_value() {
    let expr = Expression::parse("value * 2").unwrap();
    let v = vars(&[("value", Value::Number(21.0))]);

    assert_eq!(expr.source(), "value * 2");
    assert_eq!(expr.eval(&v).unwrap(), Value::Number(42.0));
}

#[test]
fn test_evaluator_caches_parses() {
    let evaluator = ExprEvaluator::new();
    let v = vars(&[("value", Value::Number(1.0))]);

    evaluator.evaluate("value > 0", &v).unwrap();
    evaluator.evaluate("value > 0", &v).unwrap();
    let _ = evaluator.evaluate("value >>> 0", &v);
    let _ = evaluator.evaluate("value >>> 0", &v);

    assert_eq!(evaluator.cached_count(), 2);
}

#[test]
fn test_evaluator_validate() {
    let evaluator = ExprEvaluator::new();
    assert!(evaluator.validate("a == 'b' && c > 1").is_ok());
    assert!(evaluator.validate("a ==").is_err());
}
