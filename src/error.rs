use thiserror::Error;

pub type Result<T> = std::result::Result<T, DeckError>;

#[derive(Debug, Error)]
pub enum DeckError {
    #[error("Board not found: {0}")]
    BoardNotFound(String),

    #[error("Stack not found: {0}")]
    StackNotFound(String),

    #[error("Card not found: {0}")]
    CardNotFound(String),

    #[error("Label not found on current board: {0}")]
    LabelNotFound(String),

    #[error("No board is currently selected")]
    NoCurrentBoard,

    #[error("Invalid reorder: cannot move index {removed} to {added} in a sequence of {len}")]
    InvalidReorder {
        removed: usize,
        added: usize,
        len: usize,
    },

    #[error("{entity} is not at index {index} of its parent")]
    ReorderIndexMismatch { entity: String, index: usize },

    #[error("Invalid reorder state transition from {from} to {to}")]
    InvalidReorderTransition { from: String, to: String },

    #[error("Pending reorder not found: {0}")]
    ReorderNotFound(String),

    #[error("Transport error: {0}")]
    Transport(#[source] anyhow::Error),

    #[error("Rejected by server: {0}")]
    Rejected(String),

    #[error("Not found on server: {0}")]
    RemoteNotFound(String),

    #[error("Cache snapshot not found")]
    SnapshotNotFound,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("{0}")]
    Other(String),
}

impl DeckError {
    /// True for failures raised by the remote service rather than the local cache
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            Self::Transport(_) | Self::Rejected(_) | Self::RemoteNotFound(_)
        )
    }
}
