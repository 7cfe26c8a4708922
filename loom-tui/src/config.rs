//! Pipeline configuration.

use loom_tui_drawlist::DrawlistConfig;
use loom_tui_layout::LayoutConfig;
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, PipelineResult};

/// Configuration for a [`FramePipeline`](crate::FramePipeline).
///
/// Loads from TOML with one table per stage; every key is optional:
///
/// ```toml
/// [drawlist]
/// max_drawlist_bytes = 1048576
/// encoded_string_cache_cap = 512
///
/// [layout]
/// max_depth = 128
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Drawlist builder caps and options.
    pub drawlist: DrawlistConfig,
    /// Layout engine options.
    pub layout: LayoutConfig,
}

impl PipelineConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(source: &str) -> PipelineResult<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every stage's configuration.
    pub fn validate(&self) -> PipelineResult<()> {
        self.drawlist.validate()?;
        if self.layout.max_depth == 0 {
            return Err(PipelineError::Config(
                "layout.max_depth must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loom_tui_core::ErrorCode;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_document_is_default() {
        assert_eq!(
            PipelineConfig::from_toml_str("").unwrap(),
            PipelineConfig::default()
        );
    }

    #[test]
    fn test_partial_tables() {
        let config = PipelineConfig::from_toml_str(
            r#"
            [drawlist]
            max_strings = 32
            encoded_string_cache_cap = 16
            validate_params = false

            [layout]
            max_depth = 64
            "#,
        )
        .unwrap();
        assert_eq!(config.drawlist.max_strings, Some(32));
        assert_eq!(config.drawlist.max_cmd_count, None);
        assert_eq!(config.drawlist.encoded_string_cache_cap, 16);
        assert!(!config.drawlist.validate_params);
        assert_eq!(config.layout.max_depth, 64);
    }

    #[test]
    fn test_zero_cap_is_rejected() {
        let err = PipelineConfig::from_toml_str("[drawlist]\nmax_blobs = 0\n").unwrap_err();
        match err {
            PipelineError::Build(err) => {
                assert_eq!(err.code, ErrorCode::BadParams);
                assert!(err.detail.contains("max_blobs"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_zero_depth_is_rejected() {
        let err = PipelineConfig::from_toml_str("[layout]\nmax_depth = 0\n").unwrap_err();
        assert!(matches!(err, PipelineError::Config(_)));
    }

    #[test]
    fn test_malformed_toml() {
        let err = PipelineConfig::from_toml_str("[drawlist\n").unwrap_err();
        assert!(matches!(err, PipelineError::Toml(_)));
    }
}
