//! Builder caps and options.

use serde::{Deserialize, Serialize};

use crate::error::{BuildError, BuildResult};

/// Drawlist builder configuration.
///
/// Every cap is optional; `None` means unlimited. A cap of zero is rejected
/// as a configuration error rather than read as "unlimited".
///
/// # Example
///
/// ```
/// use loom_tui_drawlist::DrawlistConfig;
///
/// let config = DrawlistConfig {
///     max_strings: Some(64),
///     ..DrawlistConfig::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrawlistConfig {
    /// Maximum number of command records, `DEF_*` records included.
    pub max_cmd_count: Option<u32>,
    /// Maximum number of distinct strings per build.
    pub max_strings: Option<u32>,
    /// Maximum total UTF-8 bytes in the string pool.
    pub max_string_bytes: Option<u32>,
    /// Maximum number of blobs per build.
    pub max_blobs: Option<u32>,
    /// Maximum total bytes in the blob pool.
    pub max_blob_bytes: Option<u32>,
    /// Maximum size of the finished buffer, header included.
    pub max_drawlist_bytes: Option<u32>,
    /// Entries kept in the cross-frame encoded-string cache; 0 disables it.
    pub encoded_string_cache_cap: u32,
    /// Whether drawing primitives validate their arguments.
    pub validate_params: bool,
}

impl Default for DrawlistConfig {
    fn default() -> Self {
        Self {
            max_cmd_count: None,
            max_strings: None,
            max_string_bytes: None,
            max_blobs: None,
            max_blob_bytes: None,
            max_drawlist_bytes: None,
            encoded_string_cache_cap: 0,
            validate_params: true,
        }
    }
}

impl DrawlistConfig {
    /// Checks that no cap is zero.
    pub fn validate(&self) -> BuildResult<()> {
        let caps = [
            ("max_cmd_count", self.max_cmd_count),
            ("max_strings", self.max_strings),
            ("max_string_bytes", self.max_string_bytes),
            ("max_blobs", self.max_blobs),
            ("max_blob_bytes", self.max_blob_bytes),
            ("max_drawlist_bytes", self.max_drawlist_bytes),
        ];
        for (name, cap) in caps {
            if cap == Some(0) {
                return Err(BuildError::bad_params(format!(
                    "{name} must be at least 1 when set"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loom_tui_core::ErrorCode;

    #[test]
    fn test_default_is_unlimited_and_valid() {
        let config = DrawlistConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.validate_params);
        assert_eq!(config.max_strings, None);
    }

    #[test]
    fn test_zero_cap_is_bad_params() {
        let config = DrawlistConfig {
            max_blob_bytes: Some(0),
            ..DrawlistConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert_eq!(err.code, ErrorCode::BadParams);
        assert!(err.detail.contains("max_blob_bytes"));
    }
}
