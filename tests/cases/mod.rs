//! Script builder shared by the integration tests.
//!
//! Each builder method appends the enter/exit events a parser would report
//! for one command, in walk order.

#![allow(dead_code)]

use std::fmt;

use slat::{
    Evaluator, Severity,
    engine::{FunctionFamily, MuParam, RecordingEngine, SdParam},
    evaluator::{
        AtToken, Event, FragfnForm, Literal, MessageToken, NumericToken, PrintTarget, Production,
    },
    render_diagnostics_to_string_no_color,
    session::{Category, IntegrationMethod, RelationshipType},
};

/// A scalar operand as written in a script.
#[derive(Debug, Clone)]
pub enum Arg {
    Float(f64),
    Int(i64),
    Var(&'static str),
    Expr(&'static str),
}

impl Arg {
    fn events(&self) -> Vec<Event> {
        match self {
            Arg::Float(f) => leaf(Production::NumericalScalar(NumericToken::Float(*f))),
            Arg::Int(i) => leaf(Production::NumericalScalar(NumericToken::Integer(*i))),
            Arg::Var(id) => leaf(Production::VarRef { id: id.to_string() }),
            Arg::Expr(text) => node(
                Production::NumericalScalar(NumericToken::Nested),
                vec![leaf(Production::Expression {
                    text: text.to_string(),
                })],
            ),
        }
    }
}

impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Float(v) => write!(f, "{}", v),
            Arg::Int(v) => write!(f, "{}", v),
            Arg::Var(id) => write!(f, "${}", id),
            Arg::Expr(text) => write!(f, "$({})", text),
        }
    }
}

/// `--append` / `--new` destination flags for print and recorder.
pub type Output = Option<(&'static str, bool)>;

#[derive(Default)]
pub struct Script {
    events: Vec<Event>,
}

impl Script {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an arbitrary command body, for shapes no builder covers.
    pub fn command(mut self, text: &str, body: Vec<Vec<Event>>) -> Self {
        self.events.extend(node(
            Production::Command {
                text: text.to_string(),
            },
            body,
        ));
        self
    }

    pub fn title(self, title: &str) -> Self {
        self.command(
            &format!("title '{}'", title),
            vec![leaf(Production::Title {
                title: title.to_string(),
            })],
        )
    }

    pub fn set(self, id: &str, value: Arg) -> Self {
        self.command(
            &format!("set {} {}", id, value),
            vec![node(Production::Set { id: id.to_string() }, vec![value.events()])],
        )
    }

    pub fn detfn(self, id: &str, family: FunctionFamily, params: &[f64]) -> Self {
        let params = node(
            Production::ParameterArray,
            params
                .iter()
                .map(|p| leaf(Production::Parameter(Literal::Float(*p))))
                .collect(),
        );
        self.command(
            &format!("detfn {} {}", id, family),
            vec![node(
                Production::Detfn {
                    id: id.to_string(),
                    family,
                },
                vec![params],
            )],
        )
    }

    pub fn probfn(
        self,
        id: &str,
        mu_function: &str,
        sd_function: &str,
        mu: Option<MuParam>,
        sd: Option<SdParam>,
    ) -> Self {
        self.command(
            &format!("probfn {} lognormal {}, {}", id, mu_function, sd_function),
            vec![node(
                Production::Probfn {
                    id: id.to_string(),
                    mu_function: mu_function.to_string(),
                    sd_function: sd_function.to_string(),
                },
                vec![leaf(Production::LognormalOptions { mu, sd })],
            )],
        )
    }

    pub fn im(self, id: &str, function: &str) -> Self {
        self.command(
            &format!("im {} {}", id, function),
            vec![leaf(Production::Im {
                id: id.to_string(),
                function: function.to_string(),
            })],
        )
    }

    pub fn edp(self, id: &str, im: &str, probfn: &str) -> Self {
        self.command(
            &format!("edp {} {} {}", id, im, probfn),
            vec![leaf(Production::Edp {
                id: id.to_string(),
                im: im.to_string(),
                probfn: probfn.to_string(),
            })],
        )
    }

    pub fn fragfn_db(self, id: &str, key: &str, database: Option<&str>) -> Self {
        self.command(
            &format!("fragfn {} [{}]", id, key),
            vec![node(
                Production::Fragfn {
                    id: id.to_string(),
                    form: FragfnForm::Database,
                },
                vec![leaf(Production::FragfnDbParams {
                    key: key.to_string(),
                    database: database.map(str::to_string),
                })],
            )],
        )
    }

    pub fn fragfn(
        self,
        id: &str,
        states: &[(f64, f64)],
        mu: Option<MuParam>,
        sd: Option<SdParam>,
    ) -> Self {
        self.command(
            &format!("fragfn {}", id),
            vec![node(
                Production::Fragfn {
                    id: id.to_string(),
                    form: FragfnForm::UserDefined,
                },
                vec![pairs(states), leaf(Production::LognormalOptions { mu, sd })],
            )],
        )
    }

    pub fn lossfn(
        self,
        id: &str,
        states: &[(f64, f64)],
        mu: Option<MuParam>,
        sd: Option<SdParam>,
    ) -> Self {
        self.command(
            &format!("lossfn {} simple", id),
            vec![node(
                Production::Lossfn { id: id.to_string() },
                vec![node(
                    Production::SimpleLoss,
                    vec![pairs(states), leaf(Production::LognormalOptions { mu, sd })],
                )],
            )],
        )
    }

    pub fn compgroup(self, id: &str, edp: &str, fragfn: &str, lossfn: &str, count: i64) -> Self {
        self.command(
            &format!("compgroup {} {} {} {} {}", id, edp, fragfn, lossfn, count),
            vec![leaf(Production::Compgroup {
                id: id.to_string(),
                edp: edp.to_string(),
                fragfn: fragfn.to_string(),
                lossfn: lossfn.to_string(),
                count,
            })],
        )
    }

    pub fn print_message(self, message: &str, output: Output) -> Self {
        let token = if message.is_empty() {
            MessageToken::Blank
        } else {
            MessageToken::String(message.to_string())
        };
        let mut body = vec![leaf(Production::PrintMessage(token))];
        body.extend(print_options(output));
        self.command(
            &format!("print message '{}'", message),
            vec![node(
                Production::Print {
                    target: PrintTarget::Message,
                    has_options: output.is_some(),
                },
                body,
            )],
        )
    }

    pub fn print_entity(self, category: Category, id: &str, output: Output) -> Self {
        self.command(
            &format!("print {} {}", category, id),
            vec![node(
                Production::Print {
                    target: PrintTarget::Entity {
                        category,
                        id: id.to_string(),
                    },
                    has_options: output.is_some(),
                },
                print_options(output).into_iter().collect(),
            )],
        )
    }

    pub fn integration(self, method: IntegrationMethod, precision: Arg, iterations: Arg) -> Self {
        let (token, mut body) = match iterations {
            Arg::Int(i) => (Some(i), vec![]),
            other => (None, vec![other.events()]),
        };
        body.insert(0, precision.events());
        self.command(
            "integration",
            vec![node(
                Production::Integration {
                    method,
                    iterations: token,
                },
                body,
            )],
        )
    }

    pub fn recorder(
        self,
        id: &str,
        kind: Option<RelationshipType>,
        at: Option<[f64; 3]>,
        output: Output,
    ) -> Self {
        let mut body = vec![];
        if let Some(kind) = kind {
            body.push(leaf(Production::RecorderType(kind)));
        }
        if let Some(at) = at {
            body.push(leaf(Production::RecorderAt(AtToken::Values(at.to_vec()))));
        }
        body.extend(print_options(output));
        self.command(
            &format!("recorder {}", id),
            vec![node(
                Production::Recorder {
                    id: id.to_string(),
                    has_type: kind.is_some(),
                    has_at: at.is_some(),
                    has_cols: false,
                    has_options: output.is_some(),
                },
                body,
            )],
        )
    }

    pub fn analyze(self) -> Self {
        self.command("analyze", vec![leaf(Production::Analyze)])
    }

    pub fn events(self) -> Vec<Event> {
        self.events
    }
}

pub fn node(production: Production, children: Vec<Vec<Event>>) -> Vec<Event> {
    let mut events = vec![Event::Enter(production.clone())];
    events.extend(children.into_iter().flatten());
    events.push(Event::Exit(production));
    events
}

pub fn leaf(production: Production) -> Vec<Event> {
    node(production, vec![])
}

fn pairs(states: &[(f64, f64)]) -> Vec<Event> {
    node(
        Production::Scalar2Sequence,
        states
            .iter()
            .map(|(mu, sd)| {
                node(
                    Production::Scalar2,
                    vec![Arg::Float(*mu).events(), Arg::Float(*sd).events()],
                )
            })
            .collect(),
    )
}

fn print_options(output: Output) -> Option<Vec<Event>> {
    output.map(|(filename, append)| {
        leaf(Production::PrintOptions {
            filename: Some(filename.to_string()),
            append,
        })
    })
}

pub fn run(script: Script) -> Evaluator<RecordingEngine> {
    run_with(RecordingEngine::new(), script)
}

pub fn run_with(engine: RecordingEngine, script: Script) -> Evaluator<RecordingEngine> {
    let mut evaluator = Evaluator::new(engine);
    evaluator.walk(script.events());
    evaluator
}

/// Print directives, one per line.
pub fn outputs(evaluator: &Evaluator<RecordingEngine>) -> String {
    evaluator
        .outputs()
        .iter()
        .map(|directive| format!("{}\n", directive))
        .collect()
}

/// Warnings and errors, rendered without color.
pub fn problems(evaluator: &Evaluator<RecordingEngine>) -> String {
    let problems: Vec<_> = evaluator
        .diagnostics()
        .iter()
        .filter(|d| d.severity > Severity::Info)
        .cloned()
        .collect();
    render_diagnostics_to_string_no_color(&problems)
}

/// Run a script and compare its print directives and problems.
#[macro_export]
macro_rules! script_case {
    (
        $name:ident,
        script: $script:expr,
        outputs: $outputs:expr,
        problems: $problems:expr $(,)?
    ) => {
        #[test]
        fn $name() {
            let evaluator = $crate::cases::run($script);
            pretty_assertions::assert_eq!($crate::cases::outputs(&evaluator), $outputs);
            pretty_assertions::assert_eq!($crate::cases::problems(&evaluator), $problems);
            assert!(evaluator.stack().is_clear());
        }
    };
}
