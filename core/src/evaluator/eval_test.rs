//! Unit tests for the command evaluator.

use super::*;
use crate::{
    Value,
    api::{EvaluatorOptions, Severity},
    engine::{
        EngineCall, FunctionFamily, FunctionHandle, LognormalOptions, MuParam, RecordingEngine,
        SdParam,
    },
    session::{AtSpec, Category, Destination, IntegrationMethod, RelationshipType},
};
use pretty_assertions::assert_eq;

// ============================================================================
// Event builders
// ============================================================================

fn node(production: Production, children: Vec<Vec<Event>>) -> Vec<Event> {
    let mut events = vec![Event::Enter(production.clone())];
    events.extend(children.into_iter().flatten());
    events.push(Event::Exit(production));
    events
}

fn leaf(production: Production) -> Vec<Event> {
    node(production, vec![])
}

fn command(text: &str, children: Vec<Vec<Event>>) -> Vec<Event> {
    node(
        Production::Command {
            text: text.to_string(),
        },
        children,
    )
}

fn float(f: f64) -> Vec<Event> {
    leaf(Production::NumericalScalar(NumericToken::Float(f)))
}

fn param(f: f64) -> Vec<Event> {
    leaf(Production::Parameter(Literal::Float(f)))
}

fn params(values: &[f64]) -> Vec<Event> {
    node(
        Production::ParameterArray,
        values.iter().map(|&v| param(v)).collect(),
    )
}

fn pair(mu: f64, sd: f64) -> Vec<Event> {
    node(Production::Scalar2, vec![float(mu), float(sd)])
}

fn options(mu: Option<MuParam>, sd: Option<SdParam>) -> Vec<Event> {
    leaf(Production::LognormalOptions { mu, sd })
}

fn detfn(id: &str, family: FunctionFamily, values: &[f64]) -> Vec<Event> {
    command(
        &format!("detfn {}", id),
        vec![node(
            Production::Detfn {
                id: id.to_string(),
                family,
            },
            vec![params(values)],
        )],
    )
}

fn probfn(id: &str, mu: &str, sd: &str) -> Vec<Event> {
    command(
        &format!("probfn {}", id),
        vec![node(
            Production::Probfn {
                id: id.to_string(),
                mu_function: mu.to_string(),
                sd_function: sd.to_string(),
            },
            vec![options(None, None)],
        )],
    )
}

fn recorder(id: &str, kind: Option<RelationshipType>, at: Option<Vec<f64>>) -> Vec<Event> {
    let mut children = vec![];
    if let Some(kind) = kind {
        children.push(leaf(Production::RecorderType(kind)));
    }
    let has_at = at.is_some();
    if let Some(values) = at {
        children.push(leaf(Production::RecorderAt(AtToken::Values(values))));
    }
    command(
        &format!("recorder {}", id),
        vec![node(
            Production::Recorder {
                id: id.to_string(),
                has_type: kind.is_some(),
                has_at,
                has_cols: false,
                has_options: false,
            },
            children,
        )],
    )
}

fn analyze() -> Vec<Event> {
    command("analyze", vec![leaf(Production::Analyze)])
}

fn evaluator() -> Evaluator<RecordingEngine> {
    Evaluator::new(RecordingEngine::new())
}

fn codes(evaluator: &Evaluator<RecordingEngine>) -> Vec<&'static str> {
    evaluator
        .diagnostics()
        .iter()
        .filter_map(|d| d.code)
        .collect()
}

// ============================================================================
// Values
// ============================================================================

#[test]
fn test_set_then_var_ref_pushes_value() {
    let mut ev = evaluator();
    ev.walk(command(
        "set x 3.5",
        vec![node(Production::Set { id: "x".into() }, vec![float(3.5)])],
    ));
    ev.exit(&Production::VarRef { id: "x".into() });
    assert_eq!(ev.stack().operands(), &[Value::Float(3.5)]);
}

#[test]
fn test_missing_variable_pushes_undefined_with_warning() {
    let mut ev = evaluator();
    ev.exit(&Production::VarRef { id: "nope".into() });
    assert_eq!(ev.stack().operands(), &[Value::Undefined]);
    assert_eq!(codes(&ev), vec!["W004"]);
}

#[test]
fn test_parameter_dictionary_last_key_wins() {
    let mut ev = evaluator();
    let entry = |key: &str, value: f64| {
        node(
            Production::DictionaryEntry { key: key.into() },
            vec![param(value)],
        )
    };
    ev.walk(node(
        Production::ParameterDictionary,
        vec![entry("mu", 1.0), entry("sd", 0.5), entry("mu", 2.0)],
    ));
    assert_eq!(
        ev.stack().operands(),
        &[Value::dictionary([
            ("mu", Value::Float(2.0)),
            ("sd", Value::Float(0.5)),
        ])]
    );
}

#[test]
fn test_scalar3_extends_pair() {
    let mut ev = evaluator();
    ev.walk(node(Production::Scalar3, vec![pair(1.0, 2.0), float(3.0)]));
    assert_eq!(
        ev.stack().operands(),
        &[Value::array([
            Value::Float(1.0),
            Value::Float(2.0),
            Value::Float(3.0)
        ])]
    );
}

#[test]
fn test_string_scalar() {
    let mut ev = evaluator();
    ev.exit(&Production::Scalar {
        string: Some("mean_x".into()),
    });
    assert_eq!(ev.stack().operands(), &[Value::string("mean_x")]);
}

#[test]
fn test_expression_result_is_pushed() {
    let mut ev = evaluator();
    ev.walk(command(
        "set y $(math.sqrt(16) + 1)",
        vec![node(
            Production::Set { id: "y".into() },
            vec![node(
                Production::NumericalScalar(NumericToken::Nested),
                vec![leaf(Production::Expression {
                    text: "math.sqrt(16) + 1".into(),
                })],
            )],
        )],
    ));
    assert_eq!(ev.session().variable("y"), Value::Float(5.0));
}

#[test]
fn test_expression_error_is_reported_with_span() {
    let mut ev = evaluator();
    ev.walk(command(
        "set y $(os.system(1))",
        vec![node(
            Production::Set { id: "y".into() },
            vec![leaf(Production::Expression {
                text: "os.system(1)".into(),
            })],
        )],
    ));
    let diagnostic = ev
        .diagnostics()
        .iter()
        .find(|d| d.code == Some("E006"))
        .expect("expression error reported");
    assert_eq!(diagnostic.source.as_deref(), Some("os.system(1)"));
    assert!(diagnostic.span.is_some());
    assert_eq!(diagnostic.command.as_deref(), Some("set y $(os.system(1))"));
    assert!(!ev.session().variables.contains_key("y"));
    assert!(ev.stack().is_clear());
}

// ============================================================================
// Command boundary
// ============================================================================

#[test]
fn test_well_formed_commands_leave_stack_clear() {
    let mut ev = evaluator();
    ev.walk(detfn("f1", FunctionFamily::PowerLaw, &[0.1, 1.5]));
    assert!(ev.stack().is_clear());
    assert!(!codes(&ev).contains(&"W008"));
}

#[test]
fn test_residual_operands_are_reported_and_cleared() {
    let mut ev = evaluator();
    ev.walk(command("stray", vec![float(1.0)]));
    assert_eq!(codes(&ev), vec!["W008"]);
    assert!(ev.stack().is_clear());
}

#[test]
fn test_unclosed_scope_is_reported_and_cleared() {
    let mut ev = evaluator();
    ev.walk([
        Event::Enter(Production::Command {
            text: "broken".into(),
        }),
        Event::Enter(Production::ParameterArray),
        Event::Exit(Production::Command {
            text: "broken".into(),
        }),
    ]);
    assert_eq!(codes(&ev), vec!["W008"]);
    assert_eq!(ev.stack().scope_depth(), 0);
}

#[test]
fn test_stack_underflow_is_recovered() {
    let mut ev = evaluator();
    ev.walk(command(
        "bad pair",
        vec![node(Production::Scalar2, vec![float(1.0)])],
    ));
    ev.walk(command(
        "set x 2",
        vec![node(Production::Set { id: "x".into() }, vec![float(2.0)])],
    ));
    assert_eq!(codes(&ev), vec!["E001"]);
    assert_eq!(ev.session().variable("x"), Value::Float(2.0));
}

#[test]
fn test_scope_overflow_is_recovered() {
    let options = EvaluatorOptions {
        max_scope_depth: 1,
        ..Default::default()
    };
    let mut ev = Evaluator::with_options(RecordingEngine::new(), options);
    ev.walk(command(
        "nested",
        vec![node(
            Production::ParameterArray,
            vec![node(Production::ParameterArray, vec![param(1.0)])],
        )],
    ));
    assert_eq!(codes(&ev), vec!["E003"]);
    assert!(ev.stack().is_clear());
}

#[test]
fn test_first_error_skips_rest_of_command() {
    let mut ev = evaluator();
    // Scalar2 underflows; Set must not run on the leftovers.
    ev.walk(command(
        "set x (1)",
        vec![node(
            Production::Set { id: "x".into() },
            vec![node(Production::Scalar2, vec![float(1.0)])],
        )],
    ));
    assert_eq!(codes(&ev), vec!["E001"]);
    assert!(!ev.session().variables.contains_key("x"));
}

// ============================================================================
// Entities
// ============================================================================

#[test]
fn test_probfn_resolves_both_references_to_same_handle() {
    let mut ev = evaluator();
    ev.walk(detfn("f1", FunctionFamily::PowerLaw, &[0.1, 1.5]));
    ev.walk(probfn("p1", "f1", "f1"));

    let f1 = ev.session().detfns.get("f1").unwrap();
    let p1 = ev.session().probfns.get("p1").unwrap();
    assert_eq!(
        ev.engine().calls()[1],
        EngineCall::ProbabilisticFunction {
            mu_function: f1,
            mu: MuParam::MeanLnX,
            sd_function: f1,
            sd: SdParam::SdLnX,
            handle: p1,
        }
    );
}

#[test]
fn test_detfn_arity_failure_binds_undefined() {
    let mut ev = evaluator();
    ev.walk(detfn("f1", FunctionFamily::PowerLaw, &[0.1, 1.5]));
    ev.walk(detfn("f1", FunctionFamily::Hyperbolic, &[1.0]));
    assert_eq!(codes(&ev), vec!["E007"]);
    assert!(ev.session().detfns.is_undefined("f1"));

    // The stale handle is not reachable any more.
    ev.walk(probfn("p1", "f1", "f1"));
    assert_eq!(codes(&ev), vec!["E007", "W004", "W004", "E007"]);
    assert!(ev.session().probfns.is_undefined("p1"));
}

#[test]
fn test_failed_parameter_binds_undefined() {
    let mut ev = evaluator();
    ev.walk(detfn("f1", FunctionFamily::PowerLaw, &[0.1, 1.5]));
    ev.walk(command(
        "detfn f1 powerlaw [$(1/0), 1.5]",
        vec![node(
            Production::Detfn {
                id: "f1".to_string(),
                family: FunctionFamily::PowerLaw,
            },
            vec![node(
                Production::ParameterArray,
                vec![
                    leaf(Production::Expression {
                        text: "1/0".to_string(),
                    }),
                    param(1.5),
                ],
            )],
        )],
    ));
    assert_eq!(codes(&ev), vec!["E006"]);
    assert!(ev.session().detfns.is_undefined("f1"));
    assert_eq!(ev.session().detfns.get("f1"), None);
    assert_eq!(ev.engine().calls().len(), 1);
    assert!(ev.stack().is_clear());
}

#[test]
fn test_redeclaration_overwrites() {
    let mut ev = evaluator();
    ev.walk(detfn("f1", FunctionFamily::PowerLaw, &[0.1, 1.5]));
    ev.walk(detfn("f1", FunctionFamily::Hyperbolic, &[1.0, 2.0, 3.0]));
    assert_eq!(ev.session().detfns.get("f1"), Some(FunctionHandle::new(2)));
    assert_eq!(ev.session().detfns.len(), 1);
}

#[test]
fn test_probfn_option_record_must_have_mu_and_sd() {
    let mut ev = evaluator();
    ev.walk(detfn("f1", FunctionFamily::PowerLaw, &[0.1, 1.5]));
    let entry = node(
        Production::DictionaryEntry { key: "mu".into() },
        vec![leaf(Production::Parameter(Literal::String("mean_x".into())))],
    );
    ev.walk(command(
        "probfn p1",
        vec![node(
            Production::Probfn {
                id: "p1".into(),
                mu_function: "f1".into(),
                sd_function: "f1".into(),
            },
            vec![node(Production::ParameterDictionary, vec![entry])],
        )],
    ));
    assert_eq!(codes(&ev), vec!["E005"]);
    assert!(ev.session().probfns.is_undefined("p1"));
}

#[test]
fn test_im_and_edp() {
    let mut ev = evaluator();
    ev.walk(detfn("f1", FunctionFamily::PowerLaw, &[0.1, 1.5]));
    ev.walk(probfn("p1", "f1", "f1"));
    ev.walk(command(
        "im IM1 f1",
        vec![leaf(Production::Im {
            id: "IM1".into(),
            function: "f1".into(),
        })],
    ));
    ev.walk(command(
        "edp EDP1 IM1 p1",
        vec![leaf(Production::Edp {
            id: "EDP1".into(),
            im: "IM1".into(),
            probfn: "p1".into(),
        })],
    ));
    assert!(ev.session().ims.get("IM1").is_some());
    assert!(ev.session().edps.get("EDP1").is_some());
    assert!(ev.diagnostics().iter().all(|d| d.severity == Severity::Info));
}

#[test]
fn test_user_defined_fragfn_expands_states() {
    let mut ev = evaluator();
    ev.walk(command(
        "fragfn FRAG1",
        vec![node(
            Production::Fragfn {
                id: "FRAG1".into(),
                form: FragfnForm::UserDefined,
            },
            vec![
                node(
                    Production::Scalar2Sequence,
                    vec![pair(0.0062, 0.4), pair(0.0230, 0.4)],
                ),
                options(Some(MuParam::MedianX), None),
            ],
        )],
    ));
    let options = LognormalOptions {
        mu: MuParam::MedianX,
        sd: SdParam::SdLnX,
    };
    assert!(matches!(
        &ev.engine().calls()[0],
        EngineCall::FragilityFunction { states, .. }
            if *states == vec![options.state(0.0062, 0.4), options.state(0.0230, 0.4)]
    ));
    assert!(ev.session().fragfns.get("FRAG1").is_some());
}

#[test]
fn test_database_fragfn_uses_default_database() {
    let engine = RecordingEngine::new().with_fragility(DEFAULT_DATABASE, "B1041.001a", vec![
        LognormalOptions::default().state(0.5, 0.3),
    ]);
    let mut ev = Evaluator::new(engine);
    ev.walk(command(
        "fragfn FRAG2 [B1041.001a]",
        vec![node(
            Production::Fragfn {
                id: "FRAG2".into(),
                form: FragfnForm::Database,
            },
            vec![leaf(Production::FragfnDbParams {
                key: "B1041.001a".into(),
                database: None,
            })],
        )],
    ));
    assert_eq!(codes(&ev), Vec::<&str>::new());
    assert!(matches!(
        &ev.engine().calls()[0],
        EngineCall::FragilityLookup { database, .. } if database == DEFAULT_DATABASE
    ));
}

#[test]
fn test_lossfn_from_simple_loss() {
    let mut ev = evaluator();
    ev.walk(command(
        "lossfn LOSS1",
        vec![node(
            Production::Lossfn { id: "LOSS1".into() },
            vec![node(
                Production::SimpleLoss,
                vec![
                    node(Production::Scalar2Sequence, vec![pair(0.03, 0.4)]),
                    options(Some(MuParam::MeanX), Some(SdParam::SdX)),
                ],
            )],
        )],
    ));
    assert!(ev.session().lossfns.get("LOSS1").is_some());
    assert!(matches!(
        &ev.engine().calls()[0],
        EngineCall::LossFunction { states, .. } if states.len() == 1 && states[0].mu == 0.03
    ));
}

#[test]
fn test_compgroup_with_unresolved_references() {
    let mut ev = evaluator();
    ev.walk(command(
        "compgroup C1 EDP1 FRAG1 LOSS1 20",
        vec![leaf(Production::Compgroup {
            id: "C1".into(),
            edp: "EDP1".into(),
            fragfn: "FRAG1".into(),
            lossfn: "LOSS1".into(),
            count: 20,
        })],
    ));
    assert_eq!(codes(&ev), vec!["W004", "W004", "W004", "E007"]);
    assert!(ev.session().compgroups.is_undefined("C1"));
}

// ============================================================================
// Effects
// ============================================================================

#[test]
fn test_title() {
    let mut ev = evaluator();
    ev.walk(command(
        "title 'Example'",
        vec![leaf(Production::Title {
            title: "Example".into(),
        })],
    ));
    assert_eq!(ev.session().title.as_deref(), Some("Example"));
}

#[test]
fn test_print_unresolved_entity_yields_undefined_marker() {
    let mut ev = evaluator();
    ev.walk(command(
        "print detfn unknownName",
        vec![leaf(Production::Print {
            target: PrintTarget::Entity {
                category: Category::DetFn,
                id: "unknownName".into(),
            },
            has_options: false,
        })],
    ));
    assert_eq!(
        ev.outputs(),
        &[PrintDirective {
            subject: PrintSubject::Undefined {
                category: Category::DetFn,
                id: "unknownName".into(),
            },
            destination: None,
        }]
    );
    assert_eq!(
        ev.outputs()[0].to_string(),
        "print <undefined DETFN 'unknownName'> to standard output"
    );
    assert_eq!(codes(&ev), vec!["W004"]);
}

#[test]
fn test_print_message_to_file() {
    let mut ev = evaluator();
    ev.walk(command(
        "print message 'hello' file.txt --append",
        vec![node(
            Production::Print {
                target: PrintTarget::Message,
                has_options: true,
            },
            vec![
                leaf(Production::PrintMessage(MessageToken::String("hello".into()))),
                leaf(Production::PrintOptions {
                    filename: Some("file.txt".into()),
                    append: true,
                }),
            ],
        )],
    ));
    assert_eq!(
        ev.outputs(),
        &[PrintDirective {
            subject: PrintSubject::Message(Value::string("hello")),
            destination: Some(Destination {
                filename: "file.txt".into(),
                append: true,
            }),
        }]
    );
}

#[test]
fn test_print_defined_entity() {
    let mut ev = evaluator();
    ev.walk(detfn("f1", FunctionFamily::PowerLaw, &[0.1, 1.5]));
    ev.walk(command(
        "print detfn f1",
        vec![leaf(Production::Print {
            target: PrintTarget::Entity {
                category: Category::DetFn,
                id: "f1".into(),
            },
            has_options: false,
        })],
    ));
    assert_eq!(
        ev.outputs()[0].to_string(),
        "print the <deterministic function #1> known as f1 to standard output"
    );
}

#[test]
fn test_integration_pops_iterations_before_precision() {
    let mut ev = evaluator();
    ev.walk(command(
        "integration maq 1E-6 $(10 * 100)",
        vec![node(
            Production::Integration {
                method: IntegrationMethod::Maq,
                iterations: None,
            },
            vec![
                float(1e-6),
                node(
                    Production::NumericalScalar(NumericToken::Nested),
                    vec![leaf(Production::Expression {
                        text: "10 * 100".into(),
                    })],
                ),
            ],
        )],
    ));
    let settings = ev.session().integration.as_ref().expect("settings stored");
    assert_eq!(settings.tolerance, 1e-6);
    assert_eq!(settings.max_evaluations, 1000);
}

#[test]
fn test_unknown_integration_method_is_not_fatal() {
    let mut ev = evaluator();
    ev.walk(command(
        "integration simpson 0.01 100",
        vec![node(
            Production::Integration {
                method: IntegrationMethod::Unknown("simpson".into()),
                iterations: Some(100),
            },
            vec![float(0.01)],
        )],
    ));
    assert_eq!(codes(&ev), vec!["W009"]);
    let settings = ev.session().integration.as_ref().expect("settings stored");
    assert_eq!(settings.method.to_string(), "<unknown>");
}

#[test]
fn test_recorder_at_clause() {
    let mut ev = evaluator();
    ev.walk(recorder(
        "IM1",
        Some(RelationshipType::ImRate),
        Some(vec![0.0, 0.01, 1.0]),
    ));
    assert_eq!(ev.session().recorders.len(), 1);
    assert_eq!(
        ev.session().recorders[0].at,
        Some(AtSpec {
            from: 0.0,
            to: 1.0,
            by: 0.01
        })
    );
    assert_eq!(ev.session().recorders[0].kind, RelationshipType::ImRate);
}

#[test]
fn test_recorder_at_needs_exactly_three_values() {
    for values in [vec![0.0, 1.0], vec![0.0, 0.1, 0.5, 1.0]] {
        let mut ev = evaluator();
        ev.walk(recorder("IM1", None, Some(values)));
        assert_eq!(codes(&ev), vec!["E005"]);
        assert!(ev.session().recorders.is_empty());
        assert!(ev.stack().is_clear());
    }
}

#[test]
fn test_recorder_defaults_to_ds_rate() {
    let mut ev = evaluator();
    ev.walk(recorder("C1", None, None));
    assert_eq!(ev.session().recorders[0].kind, RelationshipType::DsRate);
    assert_eq!(ev.session().recorders[0].destination, None);
}

#[test]
fn test_recorder_columns() {
    let mut ev = evaluator();
    ev.walk(command(
        "recorder edpim EDP1 cols mean_x, 0.5",
        vec![node(
            Production::Recorder {
                id: "EDP1".into(),
                has_type: true,
                has_at: false,
                has_cols: true,
                has_options: false,
            },
            vec![
                leaf(Production::RecorderType(RelationshipType::EdpIm)),
                node(
                    Production::RecorderCols,
                    vec![
                        leaf(Production::ColSpec(ColumnToken::Placement("mean_x".into()))),
                        node(
                            Production::ColSpec(ColumnToken::Scalar),
                            vec![float(0.5)],
                        ),
                    ],
                ),
            ],
        )],
    ));
    assert_eq!(
        ev.session().recorders[0].columns,
        Some(vec![Value::string("mean_x"), Value::Float(0.5)])
    );
}

#[test]
fn test_analyze_twice_reruns_all_recorders() {
    let mut ev = evaluator();
    ev.walk(detfn("f1", FunctionFamily::PowerLaw, &[0.1, 1.5]));
    ev.walk(command(
        "im IM1 f1",
        vec![leaf(Production::Im {
            id: "IM1".into(),
            function: "f1".into(),
        })],
    ));
    ev.walk(recorder("IM1", Some(RelationshipType::ImRate), None));
    ev.walk(recorder("f1", Some(RelationshipType::DetFn), None));
    ev.walk(analyze());
    ev.walk(analyze());

    let runs: Vec<&str> = ev
        .engine()
        .recorder_runs()
        .map(|r| r.target.as_str())
        .collect();
    assert_eq!(runs, vec!["IM1", "f1", "IM1", "f1"]);
    assert_eq!(ev.session().recorders.len(), 2);
}

#[test]
fn test_analyze_continues_past_failing_recorder() {
    let mut ev = evaluator();
    ev.walk(detfn("f1", FunctionFamily::PowerLaw, &[0.1, 1.5]));
    ev.walk(recorder("missing", Some(RelationshipType::EdpIm), None));
    ev.walk(recorder("f1", Some(RelationshipType::DetFn), None));
    ev.walk(analyze());

    assert_eq!(codes(&ev), vec!["W004", "E007"]);
    assert_eq!(ev.engine().recorder_runs().count(), 1);
}
