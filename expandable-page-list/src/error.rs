use std::path::PathBuf;
use thiserror::Error;

/// Invalid construction parameters for the controller or the scrollbar.
///
/// Raised eagerly by constructors; values are never clamped into range.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("Thickness must be positive, got {0}")]
    NonPositiveThickness(f32),

    #[error("{field} must be greater than or equal to 0, got {value}")]
    Negative { field: &'static str, value: f32 },

    #[error("A fixed knob ratio must be smaller than 1, got {0}")]
    KnobRatioTooLarge(f32),

    #[error("Hidden alpha ({hidden}) cannot be greater than visible alpha ({visible})")]
    HiddenAlphaAboveVisible { hidden: f32, visible: f32 },
}

impl ConfigError {
    pub(crate) fn check_non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
        // NaN fails this check too
        if value >= 0.0 {
            Ok(())
        } else {
            Err(ConfigError::Negative { field, value })
        }
    }
}

/// A page source could not produce content.
///
/// Callers treat this as an absence of pages: the viewer stays in its loading
/// state instead of crashing.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Failed to bind to PDFium library: {0}")]
    Bind(String),

    #[error("Failed to open document {path}: {reason}")]
    Open { path: PathBuf, reason: String },

    #[error("Failed to render page {index}: {reason}")]
    Render { index: usize, reason: String },

    #[error("Page index {index} out of bounds (document has {count} pages)")]
    PageOutOfRange { index: usize, count: usize },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
