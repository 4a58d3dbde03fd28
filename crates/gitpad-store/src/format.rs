//! Document format detection and validation.
//!
//! The format of a document is decided by its filename extension alone.
//! Files with an unrecognized extension are stored as-is without validation.

use std::path::Path;

use crate::error::{StoreError, StoreResult};

/// A document format the editor can validate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Yaml,
    Xml,
}

impl Format {
    /// Detect the format from a filename extension (case-insensitive).
    ///
    /// Returns `None` for unknown extensions and extensionless names.
    pub fn from_path(filename: &str) -> Option<Self> {
        let ext = Path::new(filename).extension()?.to_str()?;
        match ext.to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            "xml" => Some(Self::Xml),
            _ => None,
        }
    }

    /// Format name as shown in error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Json => "JSON",
            Self::Yaml => "YAML",
            Self::Xml => "XML",
        }
    }

    /// Check that `content` parses as this format.
    ///
    /// The parser's own message is preserved so the editor can show where
    /// the document is broken.
    pub fn validate(&self, content: &str) -> StoreResult<()> {
        match self {
            Self::Json => serde_json::from_str::<serde_json::Value>(content)
                .map(|_| ())
                .map_err(|e| StoreError::validation(format!("Invalid JSON format: {e}"))),
            Self::Yaml => serde_yaml::from_str::<serde_yaml::Value>(content)
                .map(|_| ())
                .map_err(|e| StoreError::validation(format!("Invalid YAML format: {e}"))),
            Self::Xml => roxmltree::Document::parse(content)
                .map(|_| ())
                .map_err(|e| StoreError::validation(format!("Invalid XML format: {e}"))),
        }
    }

    /// Starter document for a file that does not exist yet.
    pub fn default_document(&self, created: &str) -> String {
        match self {
            Self::Json => serde_json::to_string_pretty(&serde_json::json!({
                "name": "New File",
                "created": created,
            }))
            .unwrap_or_default(),
            Self::Yaml => format!("name: New File\ncreated: {created}\n"),
            Self::Xml => format!(
                "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
                 <root>\n  <name>New File</name>\n  <created>{created}</created>\n</root>"
            ),
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Validate `content` for the format of `filename`.
///
/// Unknown extensions are accepted unchanged.
pub fn validate(filename: &str, content: &str) -> StoreResult<()> {
    match Format::from_path(filename) {
        Some(format) => format.validate(content),
        None => Ok(()),
    }
}

/// Starter document for `filename`, empty when the format is unknown.
pub fn default_document(filename: &str, created: &str) -> String {
    match Format::from_path(filename) {
        Some(format) => format.default_document(created),
        None => String::new(),
    }
}
