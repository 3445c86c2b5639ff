//! Interactive authoring session
//!
//! A line-oriented REPL over the orchestrator: move through the deck slide
//! by slide, regenerate or refine text, render illustrations, curate media
//! galleries, and export at any point. Selecting a slide that has never been
//! generated triggers generation, the same reconciliation that runs during
//! `build`.
//!
//! Command errors are printed and the session keeps going; only I/O failures
//! on stdin/stdout end it early.

use std::io::{self, BufRead, Write};

use anyhow::Result;
use camino::{Utf8Path, Utf8PathBuf};

use deckgen_config::Config;
use deckgen_engine::DeckOrchestrator;
use deckgen_export::export_to_file;
use deckgen_utils::error::DeckError;
use deckgen_utils::types::{
    GenerationStatus, MediaEntry, SlideContent, SlideId, SlideKind, SlideState,
};

use super::commands::{load_orchestrator, status_mark};
use super::media;

const HELP: &str = "Commands:
  goto <id>                 jump to a slide by id
  next / prev               move through the deck
  show                      print the current slide again
  regen                     regenerate the current slide from scratch
  refine <instruction>      rework the current slide's text
  image                     render an illustration for the current slide
  add url <URL> <label>     add a link or video to a media slide
  add photo <PATH> <label>  add a local photo to a media slide
  remove <n>                remove media entry n from the current slide
  status                    show every slide's generation state
  export [PATH]             export ready slides as a PDF
  quit                      leave the session";

/// Run the interactive session until `quit` or end of input.
pub async fn execute_session_command(config: &Config) -> Result<()> {
    let orchestrator = load_orchestrator(config)?;
    let ids = orchestrator.slide_ids();
    let total = ids.len();
    if total == 0 {
        println!("The outline has no slides.");
        return Ok(());
    }

    println!("Deck: {} ({} slides)", orchestrator.deck_title(), total);
    println!("Type 'help' for the command list, 'quit' to leave.");
    println!();

    let mut current = 0usize;
    select_slide(&orchestrator, ids[current], current, total).await;

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("deckgen> ");
        io::stdout().flush()?;
        let Some(line) = lines.next() else { break };
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let mut parts = trimmed.split_whitespace();
        let Some(verb) = parts.next() else { continue };
        let target = ids[current];

        match verb {
            "quit" | "exit" | "q" => break,
            "help" | "?" => println!("{HELP}"),

            "goto" => match parts.next().and_then(|raw| raw.parse::<u32>().ok()) {
                Some(n) => match ids.iter().position(|slide_id| slide_id.0 == n) {
                    Some(position) => {
                        current = position;
                        select_slide(&orchestrator, ids[current], current, total).await;
                    }
                    None => println!("No slide with id {n} in this deck"),
                },
                None => println!("Usage: goto <slide-id>"),
            },

            "next" => {
                if current + 1 < total {
                    current += 1;
                    select_slide(&orchestrator, ids[current], current, total).await;
                } else {
                    println!("Already on the last slide");
                }
            }

            "prev" => {
                if current > 0 {
                    current -= 1;
                    select_slide(&orchestrator, ids[current], current, total).await;
                } else {
                    println!("Already on the first slide");
                }
            }

            "show" => print_current(&orchestrator, target, current, total),

            "regen" => {
                println!("Regenerating slide {target}...");
                if let Err(e) = orchestrator.regenerate(target).await {
                    eprintln!("{}", e.display_for_user());
                }
                print_current(&orchestrator, target, current, total);
            }

            "refine" => {
                let instruction = parts.collect::<Vec<_>>().join(" ");
                if instruction.is_empty() {
                    println!("Usage: refine <instruction>");
                    continue;
                }
                println!("Refining slide {target}...");
                match orchestrator.refine(target, &instruction).await {
                    Ok(()) => print_current(&orchestrator, target, current, total),
                    Err(e) => {
                        eprintln!("{}", e.display_for_user());
                        println!("The previous content is still in place.");
                    }
                }
            }

            "image" => {
                println!("Rendering illustration for slide {target}...");
                if let Err(e) = orchestrator.generate_image(target).await {
                    eprintln!("{}", e.display_for_user());
                }
                print_current(&orchestrator, target, current, total);
            }

            "add" => match parts.next() {
                Some("url") => {
                    let Some(raw) = parts.next() else {
                        println!("Usage: add url <URL> <label>");
                        continue;
                    };
                    let label = parts.collect::<Vec<_>>().join(" ");
                    match media::entry_from_url(raw, &label) {
                        Ok(entry) => add_entry(&orchestrator, target, entry),
                        Err(e) => eprintln!("{}", DeckError::from(e).display_for_user()),
                    }
                }
                Some("photo") => {
                    let Some(raw) = parts.next() else {
                        println!("Usage: add photo <PATH> <label>");
                        continue;
                    };
                    let label = parts.collect::<Vec<_>>().join(" ");
                    match media::entry_from_photo(Utf8Path::new(raw), &label) {
                        Ok(entry) => add_entry(&orchestrator, target, entry),
                        Err(e) => eprintln!("{}", DeckError::from(e).display_for_user()),
                    }
                }
                _ => println!("Usage: add url <URL> <label>  or  add photo <PATH> <label>"),
            },

            "remove" => match parts.next().and_then(|raw| raw.parse::<usize>().ok()) {
                Some(0) | None => println!("Usage: remove <entry-number>"),
                Some(n) => match orchestrator.remove_media(target, n - 1) {
                    Ok(true) => {
                        println!("✓ Removed media entry {n}");
                        print_current(&orchestrator, target, current, total);
                    }
                    Ok(false) => println!("No media entry {n} on this slide"),
                    Err(e) => eprintln!("{}", e.display_for_user()),
                },
            },

            "status" => print_status_table(&orchestrator.snapshot()),

            "export" => {
                let path = parts
                    .next()
                    .map(Utf8PathBuf::from)
                    .unwrap_or_else(|| config.output_path());
                let snapshot = orchestrator.snapshot();
                match export_to_file(&snapshot, &orchestrator.deck_title(), &path) {
                    Ok(exported) => {
                        println!(
                            "✓ Exported {} slides ({} pages) to {path}",
                            exported.slides, exported.pages
                        );
                        if exported.skipped > 0 {
                            println!(
                                "  {} slide(s) without content were left out",
                                exported.skipped
                            );
                        }
                    }
                    Err(e) => eprintln!("{}", e.display_for_user()),
                }
            }

            _ => println!("Unknown command '{verb}' (type 'help' for the command list)"),
        }
    }

    println!("Session closed.");
    Ok(())
}

/// Select a slide: generate it if it was never touched, then print it.
async fn select_slide(orchestrator: &DeckOrchestrator, id: SlideId, position: usize, total: usize) {
    if let Err(e) = orchestrator.ensure_ready(id).await {
        eprintln!("{}", e.display_for_user());
    }
    print_current(orchestrator, id, position, total);
}

fn print_current(orchestrator: &DeckOrchestrator, id: SlideId, position: usize, total: usize) {
    match orchestrator.slide(id) {
        Ok(state) => print_slide(&state, position, total),
        Err(e) => eprintln!("{}", e.display_for_user()),
    }
}

fn add_entry(orchestrator: &DeckOrchestrator, id: SlideId, entry: MediaEntry) {
    match orchestrator.add_media(id, entry) {
        Ok(count) => println!("✓ Added media entry ({count} in gallery)"),
        Err(e) => eprintln!("{}", e.display_for_user()),
    }
}

fn print_slide(state: &SlideState, position: usize, total: usize) {
    let descriptor = &state.descriptor;
    println!(
        "Slide {}/{}: {} ({})",
        position + 1,
        total,
        descriptor.title,
        descriptor.kind
    );
    match descriptor.kind {
        SlideKind::Content => println!(
            "  text {} {}   image {} {}",
            status_mark(state.text_status),
            state.text_status,
            status_mark(state.image_status),
            state.image_status
        ),
        SlideKind::Media => println!(
            "  text {} {}",
            status_mark(state.text_status),
            state.text_status
        ),
    }
    println!();

    match &state.content {
        Some(SlideContent::Body(body)) => {
            println!("  {}", body.title);
            if let Some(subtitle) = &body.subtitle {
                println!("  {subtitle}");
            }
            for bullet in &body.bullets {
                println!("  - {bullet}");
            }
        }
        Some(SlideContent::Gallery(gallery)) => {
            println!("  {}", gallery.title);
            if gallery.entries.is_empty() {
                println!("  (no media yet; try 'add url <URL> <label>')");
            }
            for (index, entry) in gallery.entries.iter().enumerate() {
                println!(
                    "  {}. [{}] {}",
                    index + 1,
                    entry.kind.display_label(),
                    entry.label
                );
                println!("     {}", display_locator(&entry.locator));
            }
        }
        None => {
            if state.text_status == GenerationStatus::Failed {
                println!("  (generation failed; try 'regen')");
            } else {
                println!("  (not generated yet)");
            }
        }
    }
    println!();
}

fn print_status_table(slides: &[SlideState]) {
    println!("  {:>3}  {:<8}  {:<15}  {:<15}  TITLE", "ID", "KIND", "TEXT", "IMAGE");
    for state in slides {
        let text = format!("{} {}", status_mark(state.text_status), state.text_status);
        let image = match state.descriptor.kind {
            SlideKind::Media => "-".to_string(),
            SlideKind::Content => {
                format!("{} {}", status_mark(state.image_status), state.image_status)
            }
        };
        println!(
            "  {:>3}  {:<8}  {:<15}  {:<15}  {}",
            state.descriptor.id,
            state.descriptor.kind,
            text,
            image,
            state.descriptor.title
        );
    }
}

/// Shorten very long locators (data URIs mostly) for terminal display.
fn display_locator(locator: &str) -> String {
    const MAX: usize = 80;
    if locator.chars().count() <= MAX {
        return locator.to_string();
    }
    let prefix: String = locator.chars().take(MAX - 3).collect();
    format!("{prefix}...")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_locators_are_untouched() {
        assert_eq!(display_locator("https://example.com"), "https://example.com");
    }

    #[test]
    fn long_locators_are_shortened() {
        let long = format!("data:image/png;base64,{}", "A".repeat(200));
        let shown = display_locator(&long);
        assert_eq!(shown.chars().count(), 80);
        assert!(shown.ends_with("..."));
        assert!(shown.starts_with("data:image/png;base64,"));
    }
}
