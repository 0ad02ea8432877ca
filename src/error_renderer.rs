//! Diagnostic rendering using ariadne
//!
//! Diagnostics that carry expression source text and a span are rendered as
//! annotated snippets. Everything else is a single header line, followed by
//! the command it was reported in.

use crate::{Diagnostic, Severity};
use ariadne::{ColorGenerator, Label, Report, ReportKind, Source};
use std::io::Write;

const SOURCE_ID: &str = "<expression>";

/// Render diagnostics to stderr.
///
/// # Example
/// ```no_run
/// use slat::{Evaluator, Severity, engine::RecordingEngine, render_diagnostics};
///
/// let mut evaluator = Evaluator::new(RecordingEngine::new());
/// // ... feed parser events ...
/// let problems: Vec<_> = evaluator
///     .diagnostics()
///     .iter()
///     .filter(|d| d.severity > Severity::Info)
///     .cloned()
///     .collect();
/// render_diagnostics(&problems);
/// ```
pub fn render_diagnostics(diagnostics: &[Diagnostic]) {
    render_to_writer(diagnostics, &mut std::io::stderr(), true).ok();
}

/// Render diagnostics to a specific writer.
pub fn render_diagnostics_to(
    diagnostics: &[Diagnostic],
    writer: &mut dyn Write,
) -> std::io::Result<()> {
    render_to_writer(diagnostics, writer, true)
}

/// Render diagnostics to a String.
pub fn render_diagnostics_to_string(diagnostics: &[Diagnostic]) -> String {
    let mut buf = Vec::new();
    render_to_writer(diagnostics, &mut buf, true).ok();
    String::from_utf8_lossy(&buf).to_string()
}

/// Render diagnostics to a String without color codes (useful for tests).
pub fn render_diagnostics_to_string_no_color(diagnostics: &[Diagnostic]) -> String {
    let mut buf = Vec::new();
    render_to_writer(diagnostics, &mut buf, false).ok();
    String::from_utf8_lossy(&buf).to_string()
}

fn render_to_writer(
    diagnostics: &[Diagnostic],
    writer: &mut dyn Write,
    use_color: bool,
) -> std::io::Result<()> {
    for diag in diagnostics {
        match (&diag.source, &diag.span) {
            (Some(source), Some(span)) => {
                render_snippet(diag, source, span.0.clone(), writer, use_color)?
            }
            _ => writeln!(writer, "{}", diag)?,
        }
        if let Some(command) = &diag.command {
            writeln!(writer, "  in command: {}", command)?;
        }
    }
    Ok(())
}

fn render_snippet(
    diag: &Diagnostic,
    source: &str,
    span: std::ops::Range<usize>,
    writer: &mut dyn Write,
    use_color: bool,
) -> std::io::Result<()> {
    let mut colors = ColorGenerator::new();
    colors.next(); // Skip the first color.

    let kind = match diag.severity {
        Severity::Error => ReportKind::Error,
        Severity::Warning => ReportKind::Warning,
        Severity::Info => ReportKind::Advice,
    };

    let mut report = Report::build(kind, (SOURCE_ID, span.clone()))
        .with_message(&diag.message)
        .with_config(ariadne::Config::default().with_color(use_color));

    if let Some(code) = diag.code {
        report = report.with_code(code);
    }

    report = report.with_label(
        Label::new((SOURCE_ID, span))
            .with_message(&diag.message)
            .with_color(colors.next()),
    );

    report
        .finish()
        .write((SOURCE_ID, Source::from(source)), &mut *writer)
}
