//! Render error type

use lightdrive_core::LightDriveError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Render pipeline used before open(): {0}")]
    NotInitialized(&'static str),
    #[error("Surface error: {0}")]
    Surface(String),
    #[error("Image encoding failed: {0}")]
    Image(#[from] image::ImageError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<RenderError> for LightDriveError {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::NotInitialized(what) => LightDriveError::NotInitialized(what.to_string()),
            RenderError::Io(e) => LightDriveError::Io(e),
            other => LightDriveError::Render(other.to_string()),
        }
    }
}
