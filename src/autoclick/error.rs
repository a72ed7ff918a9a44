use std::path::PathBuf;
use thiserror::Error;

/// A specialized `Result` type for click-loop operations.
pub type ClickerResult<T> = Result<T, ClickerError>;

/// Coarse classification of errors, matching how the loop reacts to them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Invalid configuration; a start request is refused.
    Config,
    /// Capture problem; structural ones stop a running loop.
    Capture,
    /// Per-template problem; the template is skipped for the iteration.
    Match,
    /// Synthetic input problem.
    Click,
    /// Settings file problem.
    Settings,
}

/// The error type for the capture-match-click loop.
#[derive(Debug, Error)]
pub enum ClickerError {
    #[error("no template images loaded, refusing to start")]
    NoImages,

    #[error("condition requires at least {required} matches but only {loaded} template(s) are loaded")]
    NotEnoughImages { required: u32, loaded: usize },

    #[error("failed to enumerate monitors: {description}")]
    MonitorEnumeration { description: String },

    #[error("no monitors found")]
    NoMonitors,

    #[error("search region has non-positive size: {width}x{height}")]
    InvalidRegionSize { width: u32, height: u32 },

    #[error("capture of region ({left}, {top}) {width}x{height} failed: {description}")]
    CaptureFailed {
        left: i32,
        top: i32,
        width: u32,
        height: u32,
        description: String,
    },

    #[error("failed to load template {path:?}: {source}")]
    TemplateLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error(
        "template {path:?} is {template_width}x{template_height}, larger than the {frame_width}x{frame_height} capture"
    )]
    TemplateTooLarge {
        path: PathBuf,
        template_width: u32,
        template_height: u32,
        frame_width: u32,
        frame_height: u32,
    },

    #[error("failed to initialize mouse backend: {description}")]
    MouseInit { description: String },

    #[error("click at ({x}, {y}) failed: {description}")]
    ClickFailed { x: i32, y: i32, description: String },

    #[error("failed to read settings {path:?}: {source}")]
    SettingsRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse settings {path:?}: {source}")]
    SettingsParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write settings {path:?}: {source}")]
    SettingsWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ClickerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClickerError::NoImages | ClickerError::NotEnoughImages { .. } => ErrorKind::Config,
            ClickerError::MonitorEnumeration { .. }
            | ClickerError::NoMonitors
            | ClickerError::InvalidRegionSize { .. }
            | ClickerError::CaptureFailed { .. } => ErrorKind::Capture,
            ClickerError::TemplateLoad { .. } | ClickerError::TemplateTooLarge { .. } => {
                ErrorKind::Match
            }
            ClickerError::MouseInit { .. } | ClickerError::ClickFailed { .. } => ErrorKind::Click,
            ClickerError::SettingsRead { .. }
            | ClickerError::SettingsParse { .. }
            | ClickerError::SettingsWrite { .. } => ErrorKind::Settings,
        }
    }

    /// Whether a running loop must stop on this error. Per-template capture
    /// and match failures only skip the template for the current iteration.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ClickerError::MonitorEnumeration { .. }
                | ClickerError::NoMonitors
                | ClickerError::InvalidRegionSize { .. }
        )
    }
}
