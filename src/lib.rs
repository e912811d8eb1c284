//! # Deck Core
//!
//! Client-side state layer for kanban boards.
//!
//! This crate keeps a normalized cache of boards, stacks, cards and labels
//! in sync with a remote backend. Drag-and-drop reorders are applied to the
//! cache immediately and undone if the server rejects them; every other
//! mutation is cached only once the server has answered.

pub mod actions;
pub mod config;
pub mod domain;
pub mod error;
pub mod reconcile;
pub mod service;
pub mod snapshot;
pub mod store;

// Re-export commonly used types
pub use actions::DeckActions;
pub use config::StoreConfig;
pub use domain::{
    board::{Board, BoardFilter, BoardMenuItem, Label, NewBoard, NewLabel},
    card::{Card, NewCard},
    ids::{BoardId, CardId, LabelId, StackId},
    ordering::apply_order,
    stack::{NewStack, Stack},
};
pub use error::{DeckError, Result};
pub use reconcile::{Notice, ReorderOutcome, ReorderState};
pub use service::{DeckService, MemoryService};
pub use snapshot::{CacheSnapshot, FileSnapshotStore, SnapshotStore};
pub use store::DeckStore;
