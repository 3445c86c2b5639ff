pub mod atomic_write;
pub mod error;
pub mod exit_codes;
pub mod logging;
pub mod types;

pub use error::DeckError;
pub use exit_codes::ExitCode;
