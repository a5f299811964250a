use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("Node not found: {0}")]
    NotFound(Uuid),

    #[error("Duplicate node id: {0}")]
    DuplicateId(Uuid),

    #[error("Node {id} references missing parent {parent_id}")]
    Orphan { id: Uuid, parent_id: Uuid },

    #[error("Node {0} is part of a parent cycle")]
    Cycle(Uuid),

    #[error("Cannot place node {id} relative to {target}: target is inside the moved subtree")]
    WouldCreateCycle { id: Uuid, target: Uuid },

    #[error("Tree depth limit of {limit} levels exceeded")]
    DepthExceeded { limit: usize },

    #[error("Invalid drop target: {0}")]
    InvalidTarget(String),
}
