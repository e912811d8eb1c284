use crate::{
    domain::{BoardId, CardId, StackId},
    error::{DeckError, Result},
};
use chrono::{DateTime, Utc};
use std::{collections::HashMap, fmt};
use uuid::Uuid;

/// Lifecycle of one optimistic reorder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReorderState {
    /// Local store mutated, remote call not yet issued
    Applied,
    PendingConfirm,
    Confirmed,
    /// Inverse reorder applied after the remote call failed
    RolledBack,
    /// The remote call failed and the partition had to be renumbered instead
    RollbackFailed,
    /// The caller stopped waiting before the server answered
    Abandoned,
}

impl ReorderState {
    pub fn can_transition_to(&self, target: &ReorderState) -> bool {
        matches!(
            (self, target),
            (Self::Applied, Self::PendingConfirm)
                | (Self::Applied, Self::Abandoned)
                | (Self::PendingConfirm, Self::Confirmed)
                | (Self::PendingConfirm, Self::RolledBack)
                | (Self::PendingConfirm, Self::RollbackFailed)
                | (Self::PendingConfirm, Self::Abandoned)
        )
    }

    /// Terminal states; a reorder reaching one leaves the ledger
    pub fn is_settled(&self) -> bool {
        matches!(
            self,
            Self::Confirmed | Self::RolledBack | Self::RollbackFailed | Self::Abandoned
        )
    }
}

impl fmt::Display for ReorderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Applied => write!(f, "Applied"),
            Self::PendingConfirm => write!(f, "Pending Confirm"),
            Self::Confirmed => write!(f, "Confirmed"),
            Self::RolledBack => write!(f, "Rolled Back"),
            Self::RollbackFailed => write!(f, "Rollback Failed"),
            Self::Abandoned => write!(f, "Abandoned"),
        }
    }
}

/// The partition a reorder renumbers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReorderParent {
    Board(BoardId),
    Stack(StackId),
}

impl fmt::Display for ReorderParent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Board(id) => write!(f, "board {}", id),
            Self::Stack(id) => write!(f, "stack {}", id),
        }
    }
}

/// The entity a reorder moved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReorderTarget {
    Stack { id: StackId, board_id: BoardId },
    Card { id: CardId, stack_id: StackId },
}

impl ReorderTarget {
    pub fn parent(&self) -> ReorderParent {
        match self {
            Self::Stack { board_id, .. } => ReorderParent::Board(*board_id),
            Self::Card { stack_id, .. } => ReorderParent::Stack(*stack_id),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PendingReorder {
    pub id: Uuid,
    pub target: ReorderTarget,
    pub removed_index: usize,
    pub added_index: usize,
    pub state: ReorderState,
    pub started_at: DateTime<Utc>,
}

impl PendingReorder {
    /// Indices that undo this reorder
    pub fn inverse(&self) -> (usize, usize) {
        (self.added_index, self.removed_index)
    }
}

/// Tracks optimistic reorders until the server settles them
#[derive(Debug, Default)]
pub struct ReorderLedger {
    entries: HashMap<Uuid, PendingReorder>,
}

impl ReorderLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a reorder that was just applied to the local store
    pub fn record(
        &mut self,
        target: ReorderTarget,
        removed_index: usize,
        added_index: usize,
    ) -> Uuid {
        let id = Uuid::new_v4();
        self.entries.insert(
            id,
            PendingReorder {
                id,
                target,
                removed_index,
                added_index,
                state: ReorderState::Applied,
                started_at: Utc::now(),
            },
        );
        id
    }

    pub fn get(&self, id: Uuid) -> Option<&PendingReorder> {
        self.entries.get(&id)
    }

    /// Marks the remote call as issued
    pub fn mark_pending(&mut self, id: Uuid) -> Result<()> {
        self.transition(id, ReorderState::PendingConfirm)?;
        Ok(())
    }

    /// Settles a reorder as accepted by the server and forgets it
    pub fn confirm(&mut self, id: Uuid) -> Result<PendingReorder> {
        self.settle(id, ReorderState::Confirmed)
    }

    /// Settles a reorder whose inverse has been applied and forgets it
    pub fn roll_back(&mut self, id: Uuid) -> Result<PendingReorder> {
        self.settle(id, ReorderState::RolledBack)
    }

    /// Settles a rejected reorder whose inverse could not be applied
    pub fn fail_rollback(&mut self, id: Uuid) -> Result<PendingReorder> {
        self.settle(id, ReorderState::RollbackFailed)
    }

    /// Settles a reorder nobody is waiting on any more
    pub fn abandon(&mut self, id: Uuid) -> Result<PendingReorder> {
        self.settle(id, ReorderState::Abandoned)
    }

    /// Unsettled reorders on `parent`
    pub fn in_flight(&self, parent: ReorderParent) -> usize {
        self.entries
            .values()
            .filter(|entry| entry.target.parent() == parent && !entry.state.is_settled())
            .count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn transition(&mut self, id: Uuid, target: ReorderState) -> Result<()> {
        let entry = self
            .entries
            .get_mut(&id)
            .ok_or_else(|| DeckError::ReorderNotFound(id.to_string()))?;

        if !entry.state.can_transition_to(&target) {
            return Err(DeckError::InvalidReorderTransition {
                from: entry.state.to_string(),
                to: target.to_string(),
            });
        }
        entry.state = target;
        Ok(())
    }

    fn settle(&mut self, id: Uuid, target: ReorderState) -> Result<PendingReorder> {
        debug_assert!(target.is_settled());
        self.transition(id, target)?;
        self.entries
            .remove(&id)
            .ok_or_else(|| DeckError::ReorderNotFound(id.to_string()))
    }
}
