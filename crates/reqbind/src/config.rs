//! Binder settings.

use serde::{Deserialize, Serialize};

/// Default maximum body size (1 MB).
pub const DEFAULT_MAX_BODY_SIZE: usize = 1024 * 1024;

/// Default maximum number of parts in a multipart body.
pub const DEFAULT_MAX_MULTIPART_FIELDS: usize = 100;

/// Settings shared by every bind call made through a [`Binder`](crate::Binder).
///
/// # Example
///
/// ```rust
/// use reqbind::BindConfig;
///
/// let config = BindConfig::default().with_vacuum(true).with_max_body_size(64 * 1024);
/// assert!(config.vacuum);
/// assert_eq!(config.max_body_size, 65536);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BindConfig {
    /// Trim values and drop empty ones before binding header, query and form data.
    pub vacuum: bool,

    /// Largest body accepted, in bytes.
    pub max_body_size: usize,

    /// Largest number of parts accepted in a multipart body.
    pub max_multipart_fields: usize,
}

impl Default for BindConfig {
    fn default() -> Self {
        Self {
            vacuum: false,
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            max_multipart_fields: DEFAULT_MAX_MULTIPART_FIELDS,
        }
    }
}

impl BindConfig {
    /// Enables or disables the vacuum pass.
    #[must_use]
    pub fn with_vacuum(mut self, vacuum: bool) -> Self {
        self.vacuum = vacuum;
        self
    }

    /// Sets the maximum body size.
    #[must_use]
    pub fn with_max_body_size(mut self, size: usize) -> Self {
        self.max_body_size = size;
        self
    }

    /// Sets the maximum number of multipart parts.
    #[must_use]
    pub fn with_max_multipart_fields(mut self, count: usize) -> Self {
        self.max_multipart_fields = count;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BindConfig::default();

        assert!(!config.vacuum);
        assert_eq!(config.max_body_size, DEFAULT_MAX_BODY_SIZE);
        assert_eq!(config.max_multipart_fields, DEFAULT_MAX_MULTIPART_FIELDS);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: BindConfig = serde_json::from_str(r#"{"vacuum": true}"#).unwrap();

        assert!(config.vacuum);
        assert_eq!(config.max_body_size, DEFAULT_MAX_BODY_SIZE);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result: Result<BindConfig, _> = serde_json::from_str(r#"{"vacum": true}"#);
        assert!(result.is_err());
    }
}
