//! Error types for Loom TUI operations.
//!
//! Every fallible step of the frame pipeline reports failures as a structured
//! [`Fatal`] value carrying an [`ErrorCode`] and a developer-facing detail
//! string. Callers are expected to surface the detail verbatim.

use std::fmt;

use thiserror::Error;

/// Machine-readable failure category.
///
/// The `Display` form is the wire-style code name (`DUPLICATE_KEY`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Two siblings under one parent share a reconciliation key.
    DuplicateKey,
    /// Two instances in one committed tree share a widget `id` prop.
    DuplicateId,
    /// A container configuration could not be parsed or is out of range.
    InvalidProps,
    /// The tree is nested deeper than the configured traversal limit.
    DepthLimit,
    /// Malformed or out-of-range input to a drawing primitive.
    BadParams,
    /// A configured size or count cap was exceeded.
    TooLarge,
}

impl ErrorCode {
    /// Returns the wire-style name of this code.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DuplicateKey => "DUPLICATE_KEY",
            Self::DuplicateId => "DUPLICATE_ID",
            Self::InvalidProps => "INVALID_PROPS",
            Self::DepthLimit => "DEPTH_LIMIT",
            Self::BadParams => "BAD_PARAMS",
            Self::TooLarge => "TOO_LARGE",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A structural failure of reconciliation or layout.
///
/// Fatal results are never recovered from within the failing call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{code}: {detail}")]
pub struct Fatal {
    /// The failure category.
    pub code: ErrorCode,
    /// Human-readable context (parent id, indices, widget kind, prop name).
    pub detail: String,
}

impl Fatal {
    /// Creates a fatal result with the given code and detail.
    pub fn new(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self {
            code,
            detail: detail.into(),
        }
    }

    /// Creates an `INVALID_PROPS` fatal naming the widget kind, prop and reason.
    pub fn invalid_props(kind: impl fmt::Display, prop: &str, reason: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::InvalidProps,
            format!("{kind}.{prop}: {reason}"),
        )
    }
}

/// Result type alias using [`Fatal`] as the error.
pub type Result<T> = std::result::Result<T, Fatal>;
