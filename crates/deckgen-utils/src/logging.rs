//! Logging infrastructure for deckgen.
//!
//! Structured logging via `tracing`, with a compact human format by default
//! and a verbose format carrying slide/operation fields for debugging.

use tracing::{Level, span};
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use crate::types::SlideId;

/// Initialize the tracing subscriber for structured logging.
///
/// `RUST_LOG` takes precedence when set; otherwise the default filter keeps
/// deckgen's own events at info (or debug with `verbose`) and silences the
/// HTTP stack below warn.
///
/// # Arguments
/// * `verbose` - If true, use verbose format with targets and span close events
pub fn init_tracing(verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| {
            if verbose {
                EnvFilter::try_new("deckgen=debug,info")
            } else {
                EnvFilter::try_new("deckgen=info,warn")
            }
        })
        .unwrap_or_else(|_| EnvFilter::new("info"));

    if verbose {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_thread_names(false)
                    .with_line_number(false)
                    .with_file(false)
                    .with_span_events(FmtSpan::CLOSE)
                    .compact(),
            )
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_thread_names(false)
                    .with_line_number(false)
                    .with_file(false)
                    .compact(),
            )
            .try_init()?;
    }

    Ok(())
}

/// Create a span covering one slide operation (generation, refinement, image).
///
/// # Arguments
/// * `operation` - Short operation name, e.g. `"generate"` or `"refine"`
/// * `slide` - The slide the operation targets
pub fn slide_span(operation: &str, slide: SlideId) -> tracing::Span {
    span!(
        Level::INFO,
        "slide_operation",
        operation = %operation,
        slide = %slide,
    )
}
