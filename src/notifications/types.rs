use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use tokio::time::{Duration, Instant};
use uuid::Uuid;

use crate::surface::NodeId;

/// Severity of a notification, controlling its icon and styling class.
///
/// Tags other than the four known ones are kept verbatim in [`Severity::Other`]:
/// they still style the card (`notification {tag}`) but fall back to the info icon.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Severity {
    #[default]
    Success,
    Error,
    Warning,
    Info,
    Other(String),
}

impl Severity {
    /// The tag as it appears in the card's class list
    pub fn as_str(&self) -> &str {
        match self {
            Severity::Success => "success",
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
            Severity::Other(tag) => tag,
        }
    }

    /// Icon font classes; unknown tags use the info icon
    pub fn icon_class(&self) -> &'static str {
        match self {
            Severity::Success => "fas fa-check-circle",
            Severity::Error => "fas fa-exclamation-circle",
            Severity::Warning => "fas fa-exclamation-triangle",
            Severity::Info | Severity::Other(_) => "fas fa-info-circle",
        }
    }

    /// Full class attribute of a card with this severity
    pub fn card_class(&self) -> String {
        format!("notification {}", self.as_str())
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Severity::Other(_))
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Severity {
    fn from(tag: &str) -> Self {
        match tag {
            "success" => Severity::Success,
            "error" => Severity::Error,
            "warning" => Severity::Warning,
            "info" => Severity::Info,
            other => Severity::Other(other.to_string()),
        }
    }
}

impl From<String> for Severity {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "success" | "error" | "warning" | "info" => Severity::from(tag.as_str()),
            _ => Severity::Other(tag),
        }
    }
}

impl From<Severity> for String {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Other(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}

impl FromStr for Severity {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Severity::from(s))
    }
}

/// Unique identifier for a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NotificationId(Uuid);

impl NotificationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for NotificationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Reference to a notification created by the presenter
#[derive(Debug, Clone)]
pub struct NotificationHandle {
    id: NotificationId,
    node: NodeId,
    severity: Severity,
    message: String,
    duration: Duration,
    created_at: Instant,
}

impl NotificationHandle {
    pub(crate) fn new(
        id: NotificationId,
        node: NodeId,
        severity: Severity,
        message: String,
        duration: Duration,
    ) -> Self {
        Self {
            id,
            node,
            severity,
            message,
            duration,
            created_at: Instant::now(),
        }
    }

    pub fn id(&self) -> NotificationId {
        self.id
    }

    /// The card element on the surface
    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn severity(&self) -> &Severity {
        &self.severity
    }

    /// The message as passed by the caller, before any markup policy
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Effective display duration
    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    /// When the scheduled removal fires
    pub fn expires_at(&self) -> Instant {
        self.created_at + self.duration
    }

    /// Remaining share of the display time (1.0 = just shown, 0.0 = expired).
    ///
    /// This is the value a progress bar tracks; it follows the original schedule
    /// even if the removal was cancelled.
    pub fn remaining_fraction(&self) -> f64 {
        let elapsed = self.created_at.elapsed();
        if elapsed >= self.duration {
            0.0
        } else {
            1.0 - (elapsed.as_secs_f64() / self.duration.as_secs_f64())
        }
    }
}
