mod cases;

use cases::{Arg, Script, run};
use pretty_assertions::assert_eq;
use slat::{Value, render_diagnostics_to_string_no_color};

fn value_of(text: &'static str) -> Value {
    let evaluator = run(Script::new().set("v", Arg::Expr(text)));
    evaluator.session().variable("v")
}

#[test]
fn test_arithmetic() {
    assert_eq!(value_of("1 + 2 * 3"), Value::Integer(7));
    assert_eq!(value_of("(1 + 2) * 3"), Value::Integer(9));
    assert_eq!(value_of("7 / 2"), Value::Float(3.5));
    assert_eq!(value_of("-7 % 3"), Value::Integer(2));
    assert_eq!(value_of("2 ** 0.5 ** 2"), Value::Float(2f64.powf(0.25)));
}

#[test]
fn test_math_and_numpy() {
    assert_eq!(value_of("math.floor(2.7)"), Value::Integer(2));
    assert_eq!(value_of("numpy.log(1)"), Value::Float(0.0));
    assert_eq!(value_of("math.pi / math.pi"), Value::Float(1.0));
}

#[test]
fn test_variables_are_not_visible_to_expressions() {
    let evaluator = run(Script::new()
        .set("x", Arg::Float(2.0))
        .set("y", Arg::Expr("x * 2")));
    assert_eq!(evaluator.session().variable("y"), Value::Undefined);
    assert!(
        evaluator
            .diagnostics()
            .iter()
            .any(|d| d.code == Some("E006"))
    );
}

#[test]
fn test_sandbox_rejects_unknown_names() {
    for text in ["open(1)", "__import__(1)", "os.getcwd()", "math.nothing(1)"] {
        let evaluator = run(Script::new().set("v", Arg::Expr(text)));
        let errors: Vec<_> = evaluator
            .diagnostics()
            .iter()
            .filter(|d| d.code == Some("E006"))
            .collect();
        assert_eq!(errors.len(), 1, "{} was not rejected", text);
        assert_eq!(errors[0].source.as_deref(), Some(text));
        assert!(!evaluator.session().variables.contains_key("v"));
    }
}

#[test]
fn test_expression_errors_render_with_source() {
    let evaluator = run(Script::new().set("v", Arg::Expr("1 + math.sqrt(-1)")));
    let errors: Vec<_> = evaluator
        .diagnostics()
        .iter()
        .filter(|d| d.code == Some("E006"))
        .cloned()
        .collect();
    let output = render_diagnostics_to_string_no_color(&errors);

    assert!(output.contains("E006"));
    assert!(output.contains("1 + math.sqrt(-1)"));
    assert!(output.contains("in command: set v $(1 + math.sqrt(-1))"));
}

#[test]
fn test_later_commands_still_run_after_expression_error() {
    let evaluator = run(Script::new()
        .set("a", Arg::Expr("1 / 0"))
        .set("b", Arg::Expr("1 / 4")));
    assert_eq!(evaluator.session().variable("b"), Value::Float(0.25));
    assert!(evaluator.stack().is_clear());
}
