/// Notification card construction
///
/// A card is a `div.notification.{severity}` holding, in order: the severity
/// icon, the message content, the close button and an empty progress bar the
/// stylesheet animates.
use std::borrow::Cow;

use crate::config::MarkupPolicy;
use crate::surface::{NodeId, Surface, SurfaceResult, DISMISS_ATTRIBUTE, DISMISS_PARENT};

use super::types::{NotificationId, Severity};

pub const CONTENT_CLASS: &str = "notification-content";
pub const CLOSE_CLASS: &str = "notification-close";
pub const PROGRESS_CLASS: &str = "notification-progress";

/// Attribute carrying the notification id on the card element
pub const ID_ATTRIBUTE: &str = "data-notification-id";

const CLOSE_ICON: &str = "<i class=\"fas fa-times\"></i>";

/// Apply the markup policy to a message before it is inserted
pub fn render_content(message: &str, policy: MarkupPolicy) -> Cow<'_, str> {
    match policy {
        MarkupPolicy::Trusted => Cow::Borrowed(message),
        MarkupPolicy::Sanitized => Cow::Owned(ammonia::clean(message)),
        MarkupPolicy::Escaped => Cow::Owned(ammonia::clean_text(message)),
    }
}

/// Build a detached card on the surface and return its root element
pub fn build<S: Surface + ?Sized>(
    surface: &mut S,
    id: NotificationId,
    severity: &Severity,
    content: &str,
) -> SurfaceResult<NodeId> {
    let card = surface.create_element("div");
    surface.set_class(card, &severity.card_class())?;
    surface.set_attribute(card, ID_ATTRIBUTE, &id.to_string())?;

    let icon = surface.create_element("i");
    surface.set_class(icon, severity.icon_class())?;
    surface.append_child(card, icon)?;

    let body = surface.create_element("div");
    surface.set_class(body, CONTENT_CLASS)?;
    surface.set_inner_html(body, content)?;
    surface.append_child(card, body)?;

    let close = surface.create_element("button");
    surface.set_class(close, CLOSE_CLASS)?;
    surface.set_attribute(close, DISMISS_ATTRIBUTE, DISMISS_PARENT)?;
    surface.set_inner_html(close, CLOSE_ICON)?;
    surface.append_child(card, close)?;

    let progress = surface.create_element("div");
    surface.set_class(progress, PROGRESS_CLASS)?;
    surface.append_child(card, progress)?;

    Ok(card)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::MemorySurface;

    #[test]
    fn test_card_layout() {
        let mut surface = MemorySurface::new();
        let id = NotificationId::new();
        let card = build(&mut surface, id, &Severity::Error, "Disk <em>full</em>").unwrap();

        assert_eq!(surface.class_name(card), Some("notification error"));
        assert_eq!(
            surface.attribute(card, ID_ATTRIBUTE),
            Some(id.to_string().as_str())
        );

        let parts = surface.children(card).unwrap();
        assert_eq!(parts.len(), 4);
        assert_eq!(surface.tag_name(parts[0]), Some("i"));
        assert_eq!(surface.class_name(parts[0]), Some("fas fa-exclamation-circle"));
        assert_eq!(surface.class_name(parts[1]), Some(CONTENT_CLASS));
        assert_eq!(surface.inner_html(parts[1]), Some("Disk <em>full</em>"));
        assert_eq!(surface.tag_name(parts[2]), Some("button"));
        assert_eq!(surface.attribute(parts[2], DISMISS_ATTRIBUTE), Some(DISMISS_PARENT));
        assert_eq!(surface.class_name(parts[3]), Some(PROGRESS_CLASS));

        // Built detached; the presenter attaches it
        assert_eq!(surface.parent(card), None);
    }

    #[test]
    fn test_close_button_removes_card() {
        let mut surface = MemorySurface::new();
        let body = surface.body();
        let card = build(&mut surface, NotificationId::new(), &Severity::Info, "x").unwrap();
        surface.append_child(body, card).unwrap();

        let close = surface.find_by_class(card, CLOSE_CLASS).unwrap();
        assert!(surface.click(close).unwrap());
        assert_eq!(surface.parent(card), None);
    }

    #[test]
    fn test_trusted_markup_is_untouched() {
        let raw = "<b>ok</b><script>alert(1)</script>";
        assert_eq!(render_content(raw, MarkupPolicy::Trusted), raw);
    }

    #[test]
    fn test_sanitized_markup_drops_scripts() {
        let cleaned = render_content(
            "<b>ok</b><script>alert(1)</script><img src=x onerror=alert(2)>",
            MarkupPolicy::Sanitized,
        );
        assert!(cleaned.contains("<b>ok</b>"));
        assert!(!cleaned.contains("script"));
        assert!(!cleaned.contains("onerror"));
    }

    #[test]
    fn test_escaped_markup_is_plain_text() {
        let escaped = render_content("<b>ok</b>", MarkupPolicy::Escaped);
        assert!(!escaped.contains('<'));
        assert!(escaped.contains("&lt;b&gt;ok"));
    }
}
