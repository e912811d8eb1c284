use crate::{
    domain::{BoardId, Stack, StackId},
    error::Result,
    store::Collection,
};
use tracing::debug;

/// Flat cache of stacks across every board
#[derive(Debug, Clone, Default)]
pub struct StackStore {
    stacks: Collection<Stack>,
}

impl StackStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stack(&self, id: StackId) -> Option<&Stack> {
        self.stacks.get(id)
    }

    pub fn len(&self) -> usize {
        self.stacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stacks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Stack> {
        self.stacks.iter()
    }

    /// Upserts a stack, merging into the cached copy
    ///
    /// Embedded cards are dropped; use
    /// [`DeckStore::ingest_stack`](crate::store::DeckStore::ingest_stack) to
    /// cache them.
    pub fn add_stack(&mut self, mut stack: Stack) {
        stack.cards = None;
        self.stacks.add(stack);
    }

    /// Replaces a cached stack; embedded cards are dropped
    pub fn update_stack(&mut self, mut stack: Stack) -> bool {
        stack.cards = None;
        self.stacks.update(stack)
    }

    pub fn delete_stack(&mut self, id: StackId) -> Option<Stack> {
        self.stacks.delete(id)
    }

    /// Local reorder of the stacks of one board
    pub fn order_stack(
        &mut self,
        board_id: BoardId,
        removed_index: usize,
        added_index: usize,
    ) -> Result<()> {
        self.stacks.reorder(board_id, removed_index, added_index)?;
        debug!(board_id = %board_id, removed_index, added_index, "reordered stacks");
        Ok(())
    }

    /// Puts a stack back at `position` by identity and renumbers the board
    pub fn resettle_stack(
        &mut self,
        board_id: BoardId,
        id: StackId,
        position: usize,
    ) -> Result<bool> {
        let moved = self.stacks.resettle(board_id, id, position)?;
        debug!(board_id = %board_id, stack_id = %id, position, moved, "resettled stacks");
        Ok(moved)
    }

    pub fn stacks_by_board(&self, board_id: BoardId) -> Vec<&Stack> {
        self.stacks.by_parent(board_id)
    }

    pub(crate) fn replace_all(&mut self, stacks: Vec<Stack>) {
        self.stacks.replace_all(stacks);
    }
}
