//! Builder and reader errors.

use loom_tui_core::ErrorCode;
use thiserror::Error;

/// A failed drawlist build.
///
/// The code is always [`ErrorCode::BadParams`] or [`ErrorCode::TooLarge`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{code}: {detail}")]
pub struct BuildError {
    /// The failure category.
    pub code: ErrorCode,
    /// What was rejected and why.
    pub detail: String,
}

impl BuildError {
    /// Malformed or out-of-range input.
    pub fn bad_params(detail: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::BadParams,
            detail: detail.into(),
        }
    }

    /// A configured cap was exceeded.
    pub fn too_large(cap: &str, limit: u32, requested: u64) -> Self {
        Self {
            code: ErrorCode::TooLarge,
            detail: format!("{cap} exceeded: {requested} > {limit}"),
        }
    }
}

/// Result type alias for builder operations.
pub type BuildResult<T> = std::result::Result<T, BuildError>;

/// Errors from decoding a drawlist buffer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The buffer is shorter than the structure being read.
    #[error("buffer truncated: need {needed} bytes at offset {offset}, have {len}")]
    Truncated {
        /// Offset of the read.
        offset: usize,
        /// Bytes the read needed.
        needed: usize,
        /// Buffer length.
        len: usize,
    },

    /// The header does not start with the ZRDL magic.
    #[error("bad magic {0:#010x}")]
    BadMagic(u32),

    /// Unsupported format version.
    #[error("unsupported version {0}")]
    UnsupportedVersion(u32),

    /// The header size field does not match the fixed header.
    #[error("bad header size {0}")]
    BadHeaderSize(u32),

    /// The header's total size disagrees with the buffer.
    #[error("total size {declared} does not match buffer length {actual}")]
    SizeMismatch {
        /// Size declared in the header.
        declared: u32,
        /// Actual buffer length.
        actual: usize,
    },

    /// A section lies outside the buffer or is misaligned.
    #[error("section {section} is out of bounds or misaligned")]
    BadSection {
        /// Section name.
        section: &'static str,
    },

    /// A command record is malformed.
    #[error("command {index} at offset {offset}: {reason}")]
    BadCommand {
        /// Index in the command stream.
        index: usize,
        /// Byte offset of the record.
        offset: usize,
        /// What is wrong with it.
        reason: String,
    },

    /// A string or blob span points outside its pool.
    #[error("{table} span {index} is out of bounds")]
    BadSpan {
        /// `"string"` or `"blob"`.
        table: &'static str,
        /// Index of the span.
        index: usize,
    },

    /// A string table entry is not valid UTF-8.
    #[error("string {id} is not valid UTF-8")]
    InvalidUtf8 {
        /// 1-based string id.
        id: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_error_display() {
        let err = BuildError::too_large("max_strings", 1, 2);
        assert_eq!(err.code, ErrorCode::TooLarge);
        assert_eq!(err.to_string(), "TOO_LARGE: max_strings exceeded: 2 > 1");
    }

    #[test]
    fn test_parse_error_display() {
        assert_eq!(ParseError::BadMagic(0xDEAD_BEEF).to_string(), "bad magic 0xdeadbeef");
    }
}
