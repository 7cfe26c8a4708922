//! Pipeline error type.

use loom_tui_core::{ErrorCode, Fatal};
use loom_tui_drawlist::BuildError;
use thiserror::Error;

/// Any failure of a frame or of loading its configuration.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Reconciliation or layout failed.
    #[error("frame failed: {0}")]
    Frame(#[from] Fatal),

    /// The drawlist builder rejected a command or hit a cap.
    #[error("drawlist build failed: {0}")]
    Build(#[from] BuildError),

    /// The configuration document is not valid TOML.
    #[error("invalid configuration: {0}")]
    Toml(#[from] toml::de::Error),

    /// The configuration parsed but holds an unusable value.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl PipelineError {
    /// Returns the stable error code, if the failure carries one.
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Self::Frame(fatal) => Some(fatal.code),
            Self::Build(err) => Some(err.code),
            Self::Toml(_) | Self::Config(_) => None,
        }
    }
}

/// Result type alias using [`PipelineError`].
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_pass_through() {
        let fatal: PipelineError = Fatal::new(ErrorCode::DuplicateKey, "key \"a\"").into();
        assert_eq!(fatal.code(), Some(ErrorCode::DuplicateKey));
        assert!(fatal.to_string().contains("DUPLICATE_KEY"));

        let build: PipelineError = BuildError::bad_params("fill_rect: negative size").into();
        assert_eq!(build.code(), Some(ErrorCode::BadParams));

        assert_eq!(PipelineError::Config("x".into()).code(), None);
    }
}
