//! Deck engine: slide state and generation orchestration
//!
//! Two layers. [`store::SlideStore`] is the synchronous state machine that
//! owns every slide's runtime state and enforces the lifecycle rules.
//! [`orchestrator::DeckOrchestrator`] drives it: it holds the store behind a
//! mutex, calls the collaborator backend with the lock released, and applies
//! outcomes back through the store's completion methods.

pub mod orchestrator;
pub mod store;

pub use orchestrator::{BuildReport, DeckOrchestrator};
pub use store::{DEFAULT_GALLERY_TITLE, SlideStore};
