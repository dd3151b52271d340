use thiserror::Error;
use tokio::runtime::TryCurrentError;

use crate::config::ConfigError;
use crate::surface::SurfaceError;

pub type PresenterResult<T> = Result<T, PresenterError>;

/// Notification presenter errors
#[derive(Error, Debug)]
pub enum PresenterError {
    /// The surface rejected an operation
    #[error("Surface error: {0}")]
    Surface(#[from] SurfaceError),

    /// The presenter was given an invalid configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Notifications were requested outside a tokio runtime
    #[error("No tokio runtime available to schedule removal: {0}")]
    NoRuntime(#[from] TryCurrentError),
}
