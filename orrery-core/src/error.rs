/// Error types shared by the orrery crates
use std::path::PathBuf;

use crate::scene::NodeId;

/// Main error type
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unknown scene node: {0}")]
    UnknownNode(NodeId),

    #[error("attaching {child} under {parent} would create a cycle")]
    Cycle { child: NodeId, parent: NodeId },

    #[error("the scene root cannot be removed or reparented")]
    RootRemoval,

    #[error("surface is busy dispatching an event")]
    SurfaceBusy,

    #[error("config file not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type alias using the orrery Error type
pub type Result<T> = std::result::Result<T, Error>;
