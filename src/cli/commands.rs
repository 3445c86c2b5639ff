//! Command implementations for the deckgen CLI
//!
//! Each `execute_*_command` function prints its own user-facing output and
//! returns `anyhow::Result<()>`; errors bubble to [`super::run`] which maps
//! them onto exit codes.

use anyhow::Result;
use camino::Utf8Path;

use deckgen_config::{Config, load_outline, sample_outline_toml};
use deckgen_engine::DeckOrchestrator;
use deckgen_export::export_to_file;
use deckgen_utils::atomic_write::write_text_atomic;
use deckgen_utils::types::GenerationStatus;

/// Starter configuration written by `deckgen init`.
const SAMPLE_CONFIG: &str = r#"# deckgen configuration
#
# Every value here can be overridden by CLI flags; the provider can also be
# overridden with the DECKGEN_PROVIDER environment variable. The API key is
# never stored in this file. It is read from the environment variable named
# by `api_key_env`.

[deck]
# Outline file describing the fixed slide structure.
outline = "deck.toml"

[collaborator]
provider = "gemini"
model = "gemini-2.5-flash"
image_model = "imagen-4.0-generate-001"
api_key_env = "GEMINI_API_KEY"
timeout_seconds = 120
concurrency = 4

[export]
output = "presentation.pdf"
"#;

/// Marker glyph for a generation status, used in slide listings.
pub(super) fn status_mark(status: GenerationStatus) -> &'static str {
    match status {
        GenerationStatus::Uninitialized => "·",
        GenerationStatus::Pending => "…",
        GenerationStatus::Ready => "✓",
        GenerationStatus::Failed => "✗",
    }
}

/// Load the outline and stand up an orchestrator for the configured provider.
pub(super) fn load_orchestrator(config: &Config) -> Result<DeckOrchestrator> {
    let outline = load_outline(&config.outline_path())?;
    Ok(DeckOrchestrator::from_config(config, outline)?)
}

/// Write starter `deckgen.toml` and `deck.toml` files into the current directory.
pub fn execute_init_command(force: bool) -> Result<()> {
    let wrote_config = write_starter_file(Utf8Path::new("deckgen.toml"), SAMPLE_CONFIG, force)?;
    let wrote_outline =
        write_starter_file(Utf8Path::new("deck.toml"), &sample_outline_toml(), force)?;

    if wrote_config || wrote_outline {
        println!();
        println!("Next steps:");
        println!("  deckgen outline            # inspect the sample outline");
        println!("  deckgen build --dry-run    # export a placeholder deck offline");
        println!("  deckgen session            # author slides interactively");
    }
    Ok(())
}

fn write_starter_file(path: &Utf8Path, content: &str, force: bool) -> Result<bool> {
    if path.exists() && !force {
        println!("  {path} already exists (use --force to overwrite)");
        return Ok(false);
    }
    write_text_atomic(path, content)?;
    println!("✓ Wrote {path}");
    Ok(true)
}

/// Print the resolved deck outline.
pub fn execute_outline_command(config: &Config) -> Result<()> {
    let outline = load_outline(&config.outline_path())?;

    println!("Deck: {} ({} slides)", outline.title, outline.slides.len());
    println!();
    println!("  {:>3}  {:<8}  TITLE", "ID", "KIND");
    for slide in &outline.slides {
        println!("  {:>3}  {:<8}  {}", slide.id, slide.kind, slide.title);
        println!("       {:<8}  {}", "", slide.topic);
    }
    Ok(())
}

/// Draft every slide concurrently, then export the deck as a PDF.
pub async fn execute_build_command(config: &Config, force: bool, with_images: bool) -> Result<()> {
    let orchestrator = load_orchestrator(config)?;
    let total = orchestrator.slide_ids().len();

    println!(
        "Building \"{}\" ({} slides, provider {}, concurrency {})",
        orchestrator.deck_title(),
        total,
        config.provider(),
        config.concurrency()
    );

    let report = orchestrator.build(force, with_images).await?;

    let snapshot = orchestrator.snapshot();
    for slide in &snapshot {
        println!(
            "  {} {:>2}  {}",
            status_mark(slide.text_status),
            slide.descriptor.id,
            slide.descriptor.title
        );
    }
    println!();
    println!("{report}");

    let output = config.output_path();
    let exported = export_to_file(&snapshot, &orchestrator.deck_title(), &output)?;
    println!(
        "✓ Exported {} slides ({} pages) to {}",
        exported.slides, exported.pages, output
    );
    if exported.skipped > 0 {
        println!("  {} slide(s) without content were left out", exported.skipped);
    }
    Ok(())
}
