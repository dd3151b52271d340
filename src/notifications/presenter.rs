use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::runtime::Handle;
use tokio::time::Duration;
use tracing::{debug, info, warn};

use crate::config::PresenterConfig;
use crate::surface::{NodeId, Surface, SurfaceResult};

use super::card;
use super::error::PresenterResult;
use super::lock;
use super::scheduler::RemovalScheduler;
use super::types::{NotificationHandle, NotificationId, Severity};

/// Shows toast notifications on a surface and removes them when they expire.
///
/// The presenter is an explicitly constructed service: build one per surface and
/// hand clones to whatever code raises notifications. Clones share the surface,
/// the pending timers and the default duration. Showing a notification needs a
/// tokio runtime because every notification schedules its own removal task.
pub struct Presenter<S: Surface> {
    surface: Arc<Mutex<S>>,
    scheduler: RemovalScheduler,
    /// Cards whose elements have not been released yet
    cards: Arc<Mutex<HashMap<NotificationId, NodeId>>>,
    config: Arc<PresenterConfig>,
    default_duration_ms: Arc<AtomicU64>,
}

impl<S: Surface> Clone for Presenter<S> {
    fn clone(&self) -> Self {
        Self {
            surface: Arc::clone(&self.surface),
            scheduler: self.scheduler.clone(),
            cards: Arc::clone(&self.cards),
            config: Arc::clone(&self.config),
            default_duration_ms: Arc::clone(&self.default_duration_ms),
        }
    }
}

impl<S> Presenter<S>
where
    S: Surface + Send + 'static,
{
    /// Create a presenter, attaching (or adopting) the container on the surface
    pub fn new(surface: S, config: PresenterConfig) -> PresenterResult<Self> {
        config.validate()?;

        let presenter = Self {
            surface: Arc::new(Mutex::new(surface)),
            scheduler: RemovalScheduler::new(),
            cards: Arc::new(Mutex::new(HashMap::new())),
            default_duration_ms: Arc::new(AtomicU64::new(config.default_duration_ms)),
            config: Arc::new(config),
        };
        presenter.ensure_container()?;

        Ok(presenter)
    }

    /// Create a presenter with the default configuration
    pub fn with_defaults(surface: S) -> PresenterResult<Self> {
        Self::new(surface, PresenterConfig::default())
    }

    pub fn config(&self) -> &PresenterConfig {
        &self.config
    }

    /// Run a closure with exclusive access to the surface
    pub fn with_surface<R>(&self, f: impl FnOnce(&mut S) -> R) -> R {
        let mut surface = lock(&self.surface);
        f(&mut *surface)
    }

    /// Return the container, creating and attaching it if the surface has none.
    ///
    /// Repeated calls return the same element.
    pub fn ensure_container(&self) -> PresenterResult<NodeId> {
        let mut surface = lock(&self.surface);
        Ok(Self::container_in(&mut *surface, &self.config)?)
    }

    fn container_in(surface: &mut S, config: &PresenterConfig) -> SurfaceResult<NodeId> {
        if let Some(container) = surface.element_by_id(&config.container_id) {
            return Ok(container);
        }

        let container = surface.create_element("div");
        surface.set_id(container, &config.container_id)?;
        surface.set_class(container, &config.container_class)?;
        let body = surface.body();
        surface.append_child(body, container)?;

        info!("Created notification container #{}", config.container_id);
        Ok(container)
    }

    /// Show a notification and schedule its removal.
    ///
    /// `duration` of `None` or zero uses the presenter's default. Fails with
    /// [`PresenterError::NoRuntime`](super::PresenterError::NoRuntime) outside a
    /// tokio runtime, before anything is added to the surface.
    pub fn show(
        &self,
        message: impl Into<String>,
        severity: impl Into<Severity>,
        duration: Option<Duration>,
    ) -> PresenterResult<NotificationHandle> {
        let message = message.into();
        let severity = severity.into();
        let duration = match duration {
            Some(d) if !d.is_zero() => d,
            _ => self.default_duration(),
        };
        let runtime = Handle::try_current()?;

        let id = NotificationId::new();
        let content = card::render_content(&message, self.config.markup_policy);

        let node = {
            let mut surface = lock(&self.surface);
            let container = Self::container_in(&mut *surface, &self.config)?;
            let node = card::build(&mut *surface, id, &severity, &content)?;
            surface.append_child(container, node)?;
            node
        };
        lock(&self.cards).insert(id, node);

        let surface = Arc::clone(&self.surface);
        let cards = Arc::clone(&self.cards);
        self.scheduler.schedule(&runtime, id, duration, move || {
            if let Err(e) = remove_card(&surface, &cards, node, id) {
                warn!("Failed to remove expired notification {}: {}", id, e);
            }
        });

        debug!("Showing {} notification {} for {:?}", severity, id, duration);
        Ok(NotificationHandle::new(id, node, severity, message, duration))
    }

    pub fn success(
        &self,
        message: impl Into<String>,
        duration: Option<Duration>,
    ) -> PresenterResult<NotificationHandle> {
        self.show(message, Severity::Success, duration)
    }

    pub fn error(
        &self,
        message: impl Into<String>,
        duration: Option<Duration>,
    ) -> PresenterResult<NotificationHandle> {
        self.show(message, Severity::Error, duration)
    }

    pub fn warning(
        &self,
        message: impl Into<String>,
        duration: Option<Duration>,
    ) -> PresenterResult<NotificationHandle> {
        self.show(message, Severity::Warning, duration)
    }

    pub fn info(
        &self,
        message: impl Into<String>,
        duration: Option<Duration>,
    ) -> PresenterResult<NotificationHandle> {
        self.show(message, Severity::Info, duration)
    }

    /// Close a notification now and cancel its timer.
    ///
    /// Returns `false` if it was already gone.
    pub fn dismiss(&self, handle: &NotificationHandle) -> PresenterResult<bool> {
        self.scheduler.cancel(handle.id());
        Ok(remove_card(
            &self.surface,
            &self.cards,
            handle.node(),
            handle.id(),
        )?)
    }

    /// Keep a notification on screen until it is closed.
    ///
    /// Returns `false` if no removal was pending.
    pub fn cancel_removal(&self, handle: &NotificationHandle) -> bool {
        self.scheduler.cancel(handle.id())
    }

    pub fn is_visible(&self, handle: &NotificationHandle) -> bool {
        lock(&self.surface).parent(handle.node()).is_some()
    }

    /// Number of cards currently in the container
    pub fn visible_count(&self) -> usize {
        let surface = lock(&self.surface);
        surface
            .element_by_id(&self.config.container_id)
            .and_then(|container| surface.children(container).ok())
            .map(|children| children.len())
            .unwrap_or(0)
    }

    /// Number of notifications still waiting for their removal timer
    pub fn pending_removals(&self) -> usize {
        self.scheduler.pending_count()
    }

    /// Cancel every pending removal and empty the container.
    ///
    /// The container itself stays attached. Returns how many cards were removed
    /// from it; cards already closed by their button are freed as well.
    pub fn reset(&self) -> PresenterResult<usize> {
        self.scheduler.cancel_all();
        let tracked: Vec<NodeId> = lock(&self.cards).drain().map(|(_, node)| node).collect();

        let mut surface = lock(&self.surface);
        let visible = match surface.element_by_id(&self.config.container_id) {
            Some(container) => surface.children(container)?,
            None => Vec::new(),
        };

        for node in visible.iter().chain(&tracked) {
            surface.release(*node)?;
        }

        info!("Reset notification container, removed {} cards", visible.len());
        Ok(visible.len())
    }

    pub fn default_duration(&self) -> Duration {
        Duration::from_millis(self.default_duration_ms.load(Ordering::Relaxed))
    }

    /// Change the duration used when `show` gets none, for every clone.
    ///
    /// Durations below one millisecond are ignored.
    pub fn set_default_duration(&self, duration: Duration) {
        let millis = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        if millis == 0 {
            warn!("Ignoring zero default notification duration");
            return;
        }
        self.default_duration_ms.store(millis, Ordering::Relaxed);
    }
}

/// Detach a card if it is still attached, then free its elements.
///
/// A card closed by its button is already detached but still allocated.
fn remove_card<S: Surface>(
    surface: &Mutex<S>,
    cards: &Mutex<HashMap<NotificationId, NodeId>>,
    node: NodeId,
    id: NotificationId,
) -> SurfaceResult<bool> {
    lock(cards).remove(&id);

    let mut surface = lock(surface);
    let attached = surface.parent(node).is_some();
    surface.release(node)?;

    if attached {
        debug!("Removed notification {}", id);
    } else {
        debug!("Notification {} already removed", id);
    }
    Ok(attached)
}
