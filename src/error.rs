//! Error types for photo extraction

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias for extraction operations
pub type Result<T> = std::result::Result<T, ExtractError>;

#[derive(Error, Debug)]
pub enum ExtractError {
    /// Source image could not be opened or decoded
    #[error("cannot read image {}: {source}", .path.display())]
    Input {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// A kept region collapsed to (nearly) zero width or height
    #[error("region cannot be rectified ({width:.1}x{height:.1})")]
    DegenerateRegion { width: f64, height: f64 },

    /// Output directory or file could not be created or written
    #[error("cannot write {}: {source}", .path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("invalid configuration: {message}")]
    Config { message: String },

    /// A corner was offered to a session that already holds four
    #[error("corner ({x}, {y}) rejected: all four corners are already set")]
    PointRejected { x: i32, y: i32 },

    #[error("need four corners to straighten, have {collected}")]
    IncompleteCorners { collected: usize },

    /// A batch worker died before reporting a result
    #[error("worker failed: {message}")]
    Worker { message: String },
}

impl ExtractError {
    pub fn input(path: impl AsRef<Path>, source: image::ImageError) -> Self {
        Self::Input {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn output<E>(path: impl AsRef<Path>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Output {
            path: path.as_ref().to_path_buf(),
            source: Box::new(source),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Only per-region anomalies are recovered inside an extraction run
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ExtractError::DegenerateRegion { .. })
    }
}
