//! Shared error type across toolguard crates.
//!
//! Policy outcomes (truncation, blocked tools, rate-limit denials) are not
//! errors. This type covers configuration faults, counter-store failures, and
//! tool executor failures only.

use thiserror::Error;

/// Stable error codes (safe to surface to callers and logs).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardCode {
    /// Configuration could not be parsed or failed validation.
    BadConfig,
    /// Allow-list or redaction pattern is malformed.
    InvalidPattern,
    /// Unsupported configuration version.
    UnsupportedVersion,
    /// Counter store unreachable or returned garbage.
    StoreUnavailable,
    /// Underlying tool call failed.
    ToolFailed,
}

impl GuardCode {
    /// String representation used in reports and log fields.
    pub fn as_str(self) -> &'static str {
        match self {
            GuardCode::BadConfig => "BAD_CONFIG",
            GuardCode::InvalidPattern => "INVALID_PATTERN",
            GuardCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            GuardCode::StoreUnavailable => "STORE_UNAVAILABLE",
            GuardCode::ToolFailed => "TOOL_FAILED",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, GuardError>;

/// Unified error type used by core and pipeline.
#[derive(Debug, Error)]
pub enum GuardError {
    #[error("bad config: {0}")]
    BadConfig(String),
    #[error("invalid pattern: {0}")]
    InvalidPattern(String),
    #[error("unsupported config version")]
    UnsupportedVersion,
    #[error("counter store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("tool failed with status {status}: {message}")]
    Tool { status: u16, message: String },
}

impl GuardError {
    /// Map to a stable code.
    pub fn code(&self) -> GuardCode {
        match self {
            GuardError::BadConfig(_) => GuardCode::BadConfig,
            GuardError::InvalidPattern(_) => GuardCode::InvalidPattern,
            GuardError::UnsupportedVersion => GuardCode::UnsupportedVersion,
            GuardError::StoreUnavailable(_) => GuardCode::StoreUnavailable,
            GuardError::Tool { .. } => GuardCode::ToolFailed,
        }
    }

    /// Status code of a failed tool call, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            GuardError::Tool { status, .. } => Some(*status),
            _ => None,
        }
    }
}
