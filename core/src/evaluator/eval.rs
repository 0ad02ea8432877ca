//! The event loop: command boundaries, recovery, and dispatch.

use tracing::{Span, debug, error, info, info_span, trace, warn};

use crate::{
    Value,
    api::{Diagnostic, EvaluatorOptions},
    engine::{EngineError, ModelEngine},
    evaluator::{
        EvalError, Event, PrintDirective, Production, error::RESIDUAL_STATE,
    },
    session::{Category, Session},
    stdlib::Namespace,
    vm::OperandStack,
};

/// State of the command currently being evaluated.
struct CommandState {
    text: String,
    /// Set by the first error; the rest of the command is skipped.
    poisoned: bool,
    /// Entity being declared, bound as undefined if the command is abandoned.
    entity: Option<(Category, String)>,
    span: Span,
}

/// Stack-based evaluator for one script.
///
/// Feed it the host parser's enter/exit events in walk order, either one at
/// a time with [`enter`](Self::enter)/[`exit`](Self::exit) or all at once
/// with [`walk`](Self::walk). Errors never escape: each is reported as a
/// [`Diagnostic`] and evaluation resumes at the next command.
pub struct Evaluator<E: ModelEngine> {
    pub(super) options: EvaluatorOptions,
    pub(super) namespace: Namespace,
    pub(super) engine: E,
    pub(super) session: Session,
    pub(super) stack: OperandStack,
    pub(super) outputs: Vec<PrintDirective>,
    diagnostics: Vec<Diagnostic>,
    command: Option<CommandState>,
    commands_seen: usize,
}

impl<E: ModelEngine> Evaluator<E> {
    pub fn new(engine: E) -> Self {
        Self::with_options(engine, EvaluatorOptions::default())
    }

    pub fn with_options(engine: E, options: EvaluatorOptions) -> Self {
        let stack = OperandStack::new(options.max_scope_depth);
        Self {
            options,
            namespace: Namespace::standard(),
            engine,
            session: Session::new(),
            stack,
            outputs: Vec::new(),
            diagnostics: Vec::new(),
            command: None,
            commands_seen: 0,
        }
    }

    /// Replace the packages visible to inline expressions.
    pub fn with_namespace(mut self, namespace: Namespace) -> Self {
        self.namespace = namespace;
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn stack(&self) -> &OperandStack {
        &self.stack
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        core::mem::take(&mut self.diagnostics)
    }

    /// Print directives, in the order the script issued them.
    pub fn outputs(&self) -> &[PrintDirective] {
        &self.outputs
    }

    pub fn take_outputs(&mut self) -> Vec<PrintDirective> {
        core::mem::take(&mut self.outputs)
    }

    pub fn into_parts(self) -> (Session, E) {
        (self.session, self.engine)
    }

    pub fn walk(&mut self, events: impl IntoIterator<Item = Event>) {
        for event in events {
            self.handle(&event);
        }
    }

    pub fn handle(&mut self, event: &Event) {
        match event {
            Event::Enter(production) => self.enter(production),
            Event::Exit(production) => self.exit(production),
        }
    }

    pub fn enter(&mut self, production: &Production) {
        if let Production::Command { text } = production {
            self.begin_command(text);
            return;
        }
        let span = self.current_span();
        let _guard = span.enter();
        if self.is_poisoned() {
            trace!(production = production.name(), "skipped");
            return;
        }
        if let (Some((category, id)), Some(command)) = (production.entity(), &mut self.command) {
            command.entity = Some((category, id.to_string()));
        }
        if production.is_scoped() {
            let result = self
                .stack
                .open_scope()
                .map_err(|e| EvalError::stack(production.name(), e));
            self.recover(result);
        }
    }

    pub fn exit(&mut self, production: &Production) {
        if let Production::Command { .. } = production {
            self.end_command();
            return;
        }
        let span = self.current_span();
        let _guard = span.enter();
        if self.is_poisoned() {
            trace!(production = production.name(), "skipped");
            return;
        }
        if let (Some(_), Some(command)) = (production.entity(), &mut self.command) {
            // The entity handler binds its own outcome.
            command.entity = None;
        }
        let result = self.dispatch(production);
        self.recover(result);
    }

    fn dispatch(&mut self, production: &Production) -> Result<(), EvalError> {
        trace!(production = production.name(), depth = self.stack.len(), "exit");
        match production {
            Production::Command { .. } => Ok(()),
            Production::Title { title } => self.title(title),

            // Value construction
            Production::Scalar { string } => self.scalar(string.as_deref()),
            Production::Scalar2 => self.scalar2(),
            Production::Scalar3 => self.scalar3(),
            Production::VarRef { id } => self.var_ref(id),
            Production::NumericalScalar(token) => self.numerical_scalar(token),
            Production::Parameter(literal) => self.parameter(literal),
            Production::ParameterArray => self.parameter_array(),
            Production::ParameterDictionary => self.parameter_dictionary(),
            Production::DictionaryEntry { key } => self.dictionary_entry(key),
            Production::LognormalOptions { mu, sd } => self.lognormal_options(*mu, *sd),
            Production::FragfnDbParams { key, database } => {
                self.fragfn_db_params(key, database.as_deref())
            }
            Production::Scalar2Sequence => self.scalar2_sequence(),
            Production::SimpleLoss => self.simple_loss(),
            Production::PrintOptions { filename, append } => {
                self.print_options(filename.as_deref(), *append)
            }
            Production::PrintMessage(token) => self.print_message(token),
            Production::RecorderType(kind) => self.recorder_type(*kind),
            Production::RecorderAt(token) => self.recorder_at(token),
            Production::FloatArray { values } => self.float_array(values),
            Production::ColSpec(token) => self.col_spec(token),
            Production::RecorderCols => self.recorder_cols(),
            Production::Expression { text } => self.expression(text),

            // Entities
            Production::Detfn { id, family } => self.detfn(id, *family),
            Production::Probfn {
                id,
                mu_function,
                sd_function,
            } => self.probfn(id, mu_function, sd_function),
            Production::Im { id, function } => self.im(id, function),
            Production::Edp { id, im, probfn } => self.edp(id, im, probfn),
            Production::Fragfn { id, form } => self.fragfn(id, *form),
            Production::Lossfn { id } => self.lossfn(id),
            Production::Compgroup {
                id,
                edp,
                fragfn,
                lossfn,
                count,
            } => self.compgroup(id, edp, fragfn, lossfn, *count),

            // Effects
            Production::Set { id } => self.set(id),
            Production::Print {
                target,
                has_options,
            } => self.print(target, *has_options),
            Production::Integration { method, iterations } => {
                self.integration(method, *iterations)
            }
            Production::Recorder {
                id,
                has_type,
                has_at,
                has_cols,
                has_options,
            } => self.recorder(id, *has_type, *has_at, *has_cols, *has_options),
            Production::Analyze => self.analyze(),
        }
    }

    // ========================================================================
    // Command boundaries
    // ========================================================================

    fn begin_command(&mut self, text: &str) {
        // State pushed by events outside any command.
        self.check_boundary();
        self.commands_seen += 1;
        let span = info_span!("command", index = self.commands_seen, text = %text);
        span.in_scope(|| info!("command started"));
        self.command = Some(CommandState {
            text: text.to_string(),
            poisoned: false,
            entity: None,
            span,
        });
    }

    fn end_command(&mut self) {
        let span = self.current_span();
        let _guard = span.enter();
        self.check_boundary();
        self.command = None;
    }

    /// Empty the operand and scope stacks, reporting anything left behind.
    fn check_boundary(&mut self) {
        let residue = self.stack.reset();
        if residue.is_empty() {
            return;
        }
        if self.is_poisoned() {
            debug!(?residue, "discarded state of abandoned command");
            return;
        }
        if !residue.operands.is_empty() {
            let operands = Value::Array(residue.operands);
            warn!(%operands, "operand stack not empty at end of command");
            self.report(
                Diagnostic::warning(format!(
                    "operand stack not empty at end of command: {}",
                    operands
                ))
                .with_code(RESIDUAL_STATE),
            );
        }
        if !residue.scopes.is_empty() {
            let scopes = Value::array(residue.scopes.into_iter().map(Value::Array));
            warn!(%scopes, "scope stack not empty at end of command");
            self.report(
                Diagnostic::warning(format!(
                    "scope stack not empty at end of command: {}",
                    scopes
                ))
                .with_code(RESIDUAL_STATE),
            );
        }
    }

    fn current_span(&self) -> Span {
        self.command
            .as_ref()
            .map(|command| command.span.clone())
            .unwrap_or_else(Span::none)
    }

    fn is_poisoned(&self) -> bool {
        self.command.as_ref().is_some_and(|command| command.poisoned)
    }

    // ========================================================================
    // Reporting
    // ========================================================================

    fn recover(&mut self, result: Result<(), EvalError>) {
        let Err(err) = result else {
            return;
        };
        error!(code = err.code(), "{}", err);
        self.report(err.to_diagnostic());
        let Some(command) = &mut self.command else {
            return;
        };
        command.poisoned = true;
        if let Some((category, id)) = command.entity.take() {
            debug!(%category, id = %id, "abandoned declaration bound as undefined");
            self.session.bind_undefined(category, &id);
        }
    }

    pub(super) fn report(&mut self, diagnostic: Diagnostic) {
        let command = self.command.as_ref().map(|command| command.text.as_str());
        let diagnostic = diagnostic.with_command(command);
        self.diagnostics.push(diagnostic);
    }

    /// Log and record a progress line.
    pub(super) fn describe(&mut self, message: String) {
        info!("{}", message);
        self.report(Diagnostic::info(message));
    }

    /// Report a condition that does not abandon the command.
    pub(super) fn warn(&mut self, err: EvalError) {
        warn!(code = err.code(), "{}", err);
        self.report(err.to_diagnostic());
    }

    pub(super) fn unresolved(&mut self, category: Category, id: &str) {
        self.warn(EvalError::UnresolvedReference {
            category,
            id: id.to_string(),
        });
    }

    /// Report an engine failure that does not abandon the command.
    pub(super) fn engine_failure(&mut self, operation: &'static str, source: EngineError) {
        let err = EvalError::Adapter { operation, source };
        error!(code = err.code(), "{}", err);
        self.report(err.to_diagnostic());
    }

    // ========================================================================
    // Stack helpers
    // ========================================================================

    pub(super) fn pop(&mut self, production: &'static str) -> Result<Value, EvalError> {
        self.stack
            .pop()
            .map_err(|e| EvalError::stack(production, e))
    }

    pub(super) fn close_scope(&mut self, production: &'static str) -> Result<Vec<Value>, EvalError> {
        self.stack
            .close_scope()
            .map_err(|e| EvalError::stack(production, e))
    }
}

/// Wrap an engine error with the operation that produced it.
pub(super) fn adapter(operation: &'static str) -> impl FnOnce(EngineError) -> EvalError {
    move |source| EvalError::Adapter { operation, source }
}
