use crate::{
    domain::{Card, CardId, StackId},
    error::Result,
    store::Collection,
};
use tracing::debug;

/// Flat cache of cards across every stack
#[derive(Debug, Clone, Default)]
pub struct CardStore {
    cards: Collection<Card>,
}

impl CardStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn card(&self, id: CardId) -> Option<&Card> {
        self.cards.get(id)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter()
    }

    pub fn add_card(&mut self, card: Card) {
        self.cards.add(card);
    }

    pub fn update_card(&mut self, card: Card) -> bool {
        self.cards.update(card)
    }

    pub fn delete_card(&mut self, id: CardId) -> Option<Card> {
        self.cards.delete(id)
    }

    /// Local reorder of the cards of one stack
    pub fn order_card(
        &mut self,
        stack_id: StackId,
        removed_index: usize,
        added_index: usize,
    ) -> Result<()> {
        self.cards.reorder(stack_id, removed_index, added_index)?;
        debug!(stack_id = %stack_id, removed_index, added_index, "reordered cards");
        Ok(())
    }

    /// Puts a card back at `position` by identity and renumbers the stack
    pub fn resettle_card(
        &mut self,
        stack_id: StackId,
        id: CardId,
        position: usize,
    ) -> Result<bool> {
        let moved = self.cards.resettle(stack_id, id, position)?;
        debug!(stack_id = %stack_id, card_id = %id, position, moved, "resettled cards");
        Ok(moved)
    }

    pub fn cards_by_stack(&self, stack_id: StackId) -> Vec<&Card> {
        self.cards.by_parent(stack_id)
    }

    pub(crate) fn replace_all(&mut self, cards: Vec<Card>) {
        self.cards.replace_all(cards);
    }
}
