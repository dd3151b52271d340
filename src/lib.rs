pub mod cli;
pub mod config;
pub mod notifications;
pub mod surface;

pub use config::{MarkupPolicy, PresenterConfig};
pub use notifications::{NotificationHandle, Presenter, Severity};
pub use surface::{MemorySurface, Surface};
