use thiserror::Error;

use super::NodeId;

pub type SurfaceResult<T> = Result<T, SurfaceError>;

/// Errors raised by a renderable surface
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SurfaceError {
    /// The node handle does not belong to this surface
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    /// Appending would make a node its own ancestor
    #[error("Cannot append {child} to {parent}: would create a cycle")]
    HierarchyRequest { parent: NodeId, child: NodeId },
}
