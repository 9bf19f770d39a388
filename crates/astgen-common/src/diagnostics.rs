//! Rendering pipeline errors as annotated source reports.
//!
//! Every stage's error type implements [`Diagnostic`]; the driver renders
//! whichever error aborted the run through [`report`] without needing to
//! know which stage produced it.

use ariadne::{Label, Report, ReportKind, Source};

use crate::span::Span;

/// Anything that can be rendered as a source-anchored diagnostic.
pub trait Diagnostic {
    /// The human-readable message, already fully interpolated.
    fn message(&self) -> String;

    /// The primary span to underline, if the error has source provenance.
    fn span(&self) -> Option<Span>;
}

/// Render `err` against `source` (read from `file_name`) to stderr.
///
/// Errors without a span (e.g. a missing `--output` combination) are
/// printed as a plain one-line message instead.
pub fn report<E: Diagnostic>(err: &E, file_name: &str, source: &str) {
    let Some(span) = err.span() else {
        eprintln!("error: {}", err.message());
        return;
    };

    let range = span.range();
    let range = if range.end <= range.start {
        range.start..range.start + 1
    } else {
        range
    };

    let _ = Report::<(String, std::ops::Range<usize>)>::build(
        ReportKind::Error,
        (file_name.to_string(), range.clone()),
    )
    .with_message(err.message())
    .with_label(Label::new((file_name.to_string(), range)).with_message(err.message()))
    .finish()
    .eprint((file_name.to_string(), Source::from(source)));
}
