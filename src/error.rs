use std::path::PathBuf;
use thiserror::Error;

/// A specialized `Result` type for auto-pick operations.
pub type PickerResult<T> = Result<T, PickerError>;

/// The error type for recognition and automation operations.
///
/// Lifecycle misuse (start while running, pause while stopped, ...) and
/// actuation rejection are reported as boolean returns, not errors; a
/// template that misses the threshold is an empty result set.
#[derive(Debug, Error)]
pub enum PickerError {
    #[error("failed to load template {path:?}: {source}")]
    TemplateLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("template directory not found: {path:?}")]
    TemplateDirNotFound { path: PathBuf },

    #[error("failed to read template directory {path:?}: {source}")]
    TemplateDirRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("screen capture returned an empty frame for {what}")]
    EmptyCapture { what: &'static str },

    #[error("failed to load screenshot {path:?}: {source}")]
    ScreenshotLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to read settings file {path:?}: {source}")]
    SettingsRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse settings file {path:?}: {source}")]
    SettingsParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
