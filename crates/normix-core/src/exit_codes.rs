//! Exit codes for the normix CLI.
//!
//! Exit codes communicate the outcome without requiring output parsing.
//!
//! Exit code ranges:
//! - 0-9: Operational outcomes (success, aborted sweep)
//! - 10-19: User/input errors (recoverable by fixing arguments or data)
//! - 20-29: Internal and environment errors

use normix_config::ValidationError;

use crate::input::InputError;
use crate::recursion::RecursionError;
use crate::sampling::SamplingError;

/// Exit codes for normix operations.
///
/// These codes are a stable contract for scripts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Command completed.
    Clean = 0,

    /// Recursion stopped at the cancellation deadline; no estimate produced.
    Aborted = 6,

    /// Invalid arguments or configuration.
    ArgsError = 10,

    /// Inputs rejected: shape, sign, or finiteness violations.
    InvalidInput = 11,

    /// A density underflowed to zero where a ratio was needed.
    NumericDegeneracy = 12,

    /// Internal error (bug - please report).
    InternalError = 20,

    /// I/O error reading inputs or writing output.
    IoError = 21,
}

impl ExitCode {
    /// Convert to i32 for process exit.
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Check if this exit code indicates success.
    pub fn is_success(self) -> bool {
        self == ExitCode::Clean
    }

    /// Check if this exit code is a user/input error (codes 10-19).
    pub fn is_user_error(self) -> bool {
        (10..20).contains(&(self as i32))
    }

    /// Check if this exit code indicates any error requiring attention.
    pub fn is_error(self) -> bool {
        (self as i32) >= 10
    }

    /// Get the error code name as a string constant (for JSON output).
    pub fn code_name(&self) -> &'static str {
        match self {
            ExitCode::Clean => "OK",
            ExitCode::Aborted => "ERR_ABORTED",
            ExitCode::ArgsError => "ERR_ARGS",
            ExitCode::InvalidInput => "ERR_INPUT",
            ExitCode::NumericDegeneracy => "ERR_DEGENERATE",
            ExitCode::InternalError => "ERR_INTERNAL",
            ExitCode::IoError => "ERR_IO",
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.code_name(), self.as_i32())
    }
}

impl From<&ValidationError> for ExitCode {
    fn from(err: &ValidationError) -> Self {
        match err {
            ValidationError::IoError(_) => ExitCode::IoError,
            _ => ExitCode::ArgsError,
        }
    }
}

impl From<&SamplingError> for ExitCode {
    fn from(err: &SamplingError) -> Self {
        match err {
            SamplingError::InvalidInput(_) => ExitCode::InvalidInput,
            SamplingError::DegenerateWeights { .. } => ExitCode::NumericDegeneracy,
        }
    }
}

impl From<&RecursionError> for ExitCode {
    fn from(err: &RecursionError) -> Self {
        match err {
            RecursionError::InvalidInput(_) => ExitCode::InvalidInput,
            RecursionError::InvalidParameter(_) => ExitCode::ArgsError,
            RecursionError::NumericDegeneracy { .. } => ExitCode::NumericDegeneracy,
        }
    }
}

impl From<&InputError> for ExitCode {
    fn from(err: &InputError) -> Self {
        match err {
            InputError::Io { .. } => ExitCode::IoError,
            InputError::Parse { .. } | InputError::Mixture { .. } => ExitCode::InvalidInput,
        }
    }
}
