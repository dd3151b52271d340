/// Toast notification presenter
///
/// Notifications are small cards appended to a single container element on a
/// [`Surface`](crate::surface::Surface). Each card removes itself after its
/// display duration, or earlier when its close button is clicked:
///
/// - [`types`] - `Severity`, `NotificationId` and `NotificationHandle`
/// - [`card`] - card element construction and markup policy
/// - [`scheduler`] - cancellable one-shot removal timers
/// - [`presenter`] - the `Presenter` service tying it together
pub mod card;
pub mod error;
pub mod presenter;
pub mod scheduler;
pub mod types;

pub use error::{PresenterError, PresenterResult};
pub use presenter::Presenter;
pub use scheduler::RemovalScheduler;
pub use types::{NotificationHandle, NotificationId, Severity};

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Lock a mutex, recovering the data if a previous holder panicked
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
