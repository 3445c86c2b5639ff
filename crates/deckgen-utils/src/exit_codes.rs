//! Exit code constants for deckgen.
//!
//! # Exit Code Table
//!
//! | Code | Constant | Description |
//! |------|----------|-------------|
//! | 0 | `SUCCESS` | Operation completed successfully |
//! | 1 | `INTERNAL` | General/internal failure |
//! | 2 | `CLI_ARGS` | Invalid CLI arguments, configuration, or slide reference |
//! | 3 | `EXPORT_REFUSED` | Export refused because nothing was generated |
//! | 70 | `BACKEND_FAILURE` | Collaborator provider call failed |

/// Exit codes matching the documented exit code table.
///
/// `ExitCode` provides type-safe exit code handling for deckgen operations.
/// Use the named constants for common exit codes, or
/// [`as_i32()`](Self::as_i32) to get the numeric value for
/// `std::process::exit()`.
///
/// The numeric values are part of the public CLI contract.
///
/// # Example
///
/// ```rust
/// use deckgen_utils::exit_codes::ExitCode;
///
/// let code = ExitCode::SUCCESS;
/// assert_eq!(code.as_i32(), 0);
///
/// assert_eq!(ExitCode::EXPORT_REFUSED, ExitCode::from_i32(3));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(i32);

impl ExitCode {
    /// Success - operation completed successfully
    pub const SUCCESS: ExitCode = ExitCode(0);

    /// Internal error - general failure
    pub const INTERNAL: ExitCode = ExitCode(1);

    /// CLI arguments error - invalid arguments, configuration, or slide id
    pub const CLI_ARGS: ExitCode = ExitCode(2);

    /// Export refused - no slide has generated content yet
    pub const EXPORT_REFUSED: ExitCode = ExitCode(3);

    /// Backend failure - a collaborator provider call failed
    pub const BACKEND_FAILURE: ExitCode = ExitCode(70);

    /// Get the numeric exit code value.
    ///
    /// Use this with `std::process::exit()`.
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self.0
    }

    /// Create an ExitCode from a raw i32 value.
    ///
    /// Prefer using the named constants when possible.
    #[must_use]
    pub const fn from_i32(code: i32) -> Self {
        ExitCode(code)
    }
}

impl From<i32> for ExitCode {
    fn from(code: i32) -> Self {
        ExitCode(code)
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.0
    }
}
