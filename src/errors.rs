// SPDX-License-Identifier: GPL-3.0-only

//! Error types for the photobox application

use std::fmt;
use std::path::PathBuf;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Main application error type
#[derive(Debug, Clone)]
pub enum AppError {
    /// Camera detection/control errors
    Camera(CameraError),
    /// Capture sequencing errors
    Capture(CaptureError),
    /// Collage rendering errors
    Collage(CollageError),
    /// Configuration errors
    Config(String),
    /// Storage/filesystem errors
    Storage(String),
    /// Generic error with message
    Other(String),
}

/// Camera-specific errors
#[derive(Debug, Clone)]
pub enum CameraError {
    /// No camera enumerated by the detection command
    NotFound,
    /// The detection or configuration command could not be run
    CommandFailed(String),
    /// Video source (live view device) unavailable
    SourceUnavailable(String),
}

/// Capture sequencing errors
#[derive(Debug, Clone)]
pub enum CaptureError {
    /// Capture requested before a camera was detected
    NoCamera,
    /// A capture session is already running
    Busy,
    /// The capture command exited nonzero or could not be spawned
    CommandFailed(String),
    /// The captured file never appeared within the wait bound
    FileTimeout(PathBuf),
}

/// Collage rendering errors
#[derive(Debug, Clone)]
pub enum CollageError {
    /// Template background image unreadable
    TemplateUnreadable(String),
    /// A slot's captured image unreadable
    SlotUnreadable(String),
    /// Template descriptor file invalid
    InvalidDescriptor(String),
    /// Render invoked before all slots were filled
    Incomplete,
    /// Output encoding/writing failed
    WriteFailed(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Camera(e) => write!(f, "Camera error: {}", e),
            AppError::Capture(e) => write!(f, "Capture error: {}", e),
            AppError::Collage(e) => write!(f, "Collage error: {}", e),
            AppError::Config(msg) => write!(f, "Configuration error: {}", msg),
            AppError::Storage(msg) => write!(f, "Storage error: {}", msg),
            AppError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl fmt::Display for CameraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CameraError::NotFound => write!(f, "No camera detected"),
            CameraError::CommandFailed(msg) => write!(f, "Camera command failed: {}", msg),
            CameraError::SourceUnavailable(msg) => write!(f, "Video source unavailable: {}", msg),
        }
    }
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureError::NoCamera => {
                write!(f, "Camera is not detected yet. Unable to take a photo")
            }
            CaptureError::Busy => write!(f, "A capture session is already in progress"),
            CaptureError::CommandFailed(msg) => write!(f, "Error capturing image: {}", msg),
            CaptureError::FileTimeout(path) => {
                write!(f, "Captured file never appeared: {}", path.display())
            }
        }
    }
}

impl fmt::Display for CollageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollageError::TemplateUnreadable(msg) => {
                write!(f, "Failed to read collage template: {}", msg)
            }
            CollageError::SlotUnreadable(msg) => write!(f, "Failed to read slot image: {}", msg),
            CollageError::InvalidDescriptor(msg) => {
                write!(f, "Invalid collage descriptor: {}", msg)
            }
            CollageError::Incomplete => write!(f, "Collage has unfilled slots"),
            CollageError::WriteFailed(msg) => write!(f, "Failed to write collage: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}
impl std::error::Error for CameraError {}
impl std::error::Error for CaptureError {}
impl std::error::Error for CollageError {}

// Conversions from sub-errors to AppError
impl From<CameraError> for AppError {
    fn from(err: CameraError) -> Self {
        AppError::Camera(err)
    }
}

impl From<CaptureError> for AppError {
    fn from(err: CaptureError) -> Self {
        AppError::Capture(err)
    }
}

impl From<CollageError> for AppError {
    fn from(err: CollageError) -> Self {
        AppError::Collage(err)
    }
}

impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError::Other(msg)
    }
}

impl From<&str> for AppError {
    fn from(msg: &str) -> Self {
        AppError::Other(msg.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}
