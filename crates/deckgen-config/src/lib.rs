pub mod config;
pub mod outline;

pub use config::{CliArgs, CollaboratorSection, Config, ConfigSource, DeckSection, ExportSection};
pub use outline::{load_outline, sample_outline, sample_outline_toml, validate_outline};
