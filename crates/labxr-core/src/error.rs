use labxr_config::ConfigError;
use labxr_spatial::NodeId;

use crate::object::ObjectKind;

/// Error types for engine construction
#[derive(Debug, thiserror::Error)]
pub enum LabError {
    #[error("Anchor surface '{0}' has no geometry extent")]
    MissingGeometry(String),

    #[error("Tile size must be positive, got {0}")]
    InvalidTileSize(f32),

    #[error("Scene node {0} does not exist")]
    UnknownNode(NodeId),

    #[error("Node '{0}' does not name an object kind")]
    UnknownObjectKind(String),

    #[error("No template object of kind '{0}' has been added")]
    MissingTemplate(ObjectKind),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, LabError>;
