use std::{fmt, hash::Hash};

pub mod board;
pub mod card;
pub mod ids;
pub mod ordering;
pub mod stack;

pub use board::{Board, BoardFilter, BoardMenuItem, Label, NewBoard, NewLabel};
pub use card::{Card, NewCard};
pub use ids::{BoardId, CardId, LabelId, StackId};
pub use ordering::{apply_order, restamp, sort_by_order, Positioned};
pub use stack::{NewStack, Stack};

/// A server entity with a stable global identity
pub trait Entity: Clone {
    type Id: Copy + Ord + Hash + fmt::Debug + fmt::Display;

    fn id(&self) -> Self::Id;

    /// Overlays the fields present in `incoming`, keeping cached fields it lacks
    fn merge_from(&mut self, incoming: Self);
}

/// An entity ordered within a parent partition
pub trait Child: Entity + Positioned {
    type ParentId: Copy + Eq + Hash + fmt::Debug + fmt::Display;

    fn parent_id(&self) -> Self::ParentId;
}
