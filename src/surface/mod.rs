//! Renderable surface abstraction
//!
//! A surface is the minimal slice of a document object model the notification
//! presenter needs: element creation, attribute assignment, tree mutation and
//! lookup by id. [`MemorySurface`] keeps an in-memory tree for tests and headless
//! rendering; a browser binding implements the same trait over the real DOM.
pub mod error;
pub mod memory;

pub use error::{SurfaceError, SurfaceResult};
pub use memory::MemorySurface;

use std::fmt;

/// Attribute marking a click target that removes the element's parent.
///
/// A click anywhere inside an element carrying `data-dismiss="parent"`
/// detaches that element's parent from the tree.
pub const DISMISS_ATTRIBUTE: &str = "data-dismiss";

/// Value of [`DISMISS_ATTRIBUTE`] that targets the parent element
pub const DISMISS_PARENT: &str = "parent";

/// Opaque handle to an element owned by a surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u64);

impl NodeId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// Element tree the presenter renders into
pub trait Surface {
    /// The document body; always attached
    fn body(&self) -> NodeId;

    /// Create a detached element with the given tag name
    fn create_element(&mut self, tag: &str) -> NodeId;

    fn set_id(&mut self, node: NodeId, id: &str) -> SurfaceResult<()>;

    /// Replace the element's class list (space separated)
    fn set_class(&mut self, node: NodeId, class: &str) -> SurfaceResult<()>;

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> SurfaceResult<()>;

    /// Replace the element's content with raw markup. The markup is not escaped.
    fn set_inner_html(&mut self, node: NodeId, markup: &str) -> SurfaceResult<()>;

    /// Append `child` as the last child of `parent`, detaching it from any previous parent
    fn append_child(&mut self, parent: NodeId, child: NodeId) -> SurfaceResult<()>;

    /// Detach the element from its parent. Removing a detached element is a no-op.
    fn remove(&mut self, node: NodeId) -> SurfaceResult<()>;

    /// Drop a detached element and its subtree, invalidating their handles.
    ///
    /// Attached elements are detached first. Releasing an unknown or already
    /// released handle is a no-op, and the body is never released.
    fn release(&mut self, node: NodeId) -> SurfaceResult<()>;

    /// Parent element, `None` once detached (or for the body)
    fn parent(&self, node: NodeId) -> Option<NodeId>;

    /// Child elements in document order
    fn children(&self, node: NodeId) -> SurfaceResult<Vec<NodeId>>;

    /// First attached element in document order with the given id
    fn element_by_id(&self, id: &str) -> Option<NodeId>;

    /// Dispatch a click on the element.
    ///
    /// Returns `true` when a handler reacted to the click.
    fn click(&mut self, node: NodeId) -> SurfaceResult<bool>;

    /// Whether the element is reachable from the body
    fn is_connected(&self, node: NodeId) -> bool {
        let body = self.body();
        let mut current = node;
        loop {
            if current == body {
                return true;
            }
            match self.parent(current) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id_display() {
        assert_eq!(NodeId::new(7).to_string(), "node#7");
        assert_eq!(NodeId::new(7).raw(), 7);
    }
}
