use crate::{
    actions::{roll_back_reorder, DeckActions, ReorderWatch},
    domain::{Card, CardId, NewCard, StackId},
    error::{DeckError, Result},
    reconcile::{ReorderOutcome, ReorderTarget},
    service::DeckService,
};
use tracing::{debug, info};

impl<S: DeckService + ?Sized> DeckActions<S> {
    /// Loads the cards of one stack into the cache
    pub async fn load_cards(&self, stack_id: StackId) -> Result<()> {
        let cards = self.service.load_cards(stack_id).await?;
        debug!(stack_id = %stack_id, count = cards.len(), "loaded cards");

        let mut store = self.store.write().await;
        for card in cards {
            store.cards.add_card(card);
        }
        Ok(())
    }

    pub async fn load_card(&self, id: CardId) -> Result<Card> {
        let card = self.service.load_card(id).await?;
        self.store.write().await.cards.add_card(card.clone());
        Ok(card)
    }

    pub async fn create_card(&self, card: NewCard) -> Result<Card> {
        let created = self.service.create_card(card).await?;
        info!(card_id = %created.id, stack_id = %created.stack_id, "created card");
        self.store.write().await.cards.add_card(created.clone());
        Ok(created)
    }

    pub async fn update_card(&self, card: &Card) -> Result<Card> {
        let updated = self.service.update_card(card).await?;
        info!(card_id = %updated.id, "updated card");

        let mut store = self.store.write().await;
        if store.cards.card(updated.id).is_some() {
            store.cards.update_card(updated.clone());
        } else {
            store.cards.add_card(updated.clone());
        }
        Ok(updated)
    }

    pub async fn delete_card(&self, id: CardId) -> Result<()> {
        self.service.delete_card(id).await?;
        info!(card_id = %id, "deleted card");
        self.store.write().await.cards.delete_card(id);
        Ok(())
    }

    /// Moves a card within its stack, optimistically
    ///
    /// Same contract as [`order_stack`](Self::order_stack).
    pub async fn order_card(
        &self,
        id: CardId,
        removed_index: usize,
        added_index: usize,
    ) -> Result<ReorderOutcome> {
        let ticket = {
            let mut store = self.store.write().await;
            let stack_id = store
                .cards
                .card(id)
                .map(|card| card.stack_id)
                .ok_or_else(|| DeckError::CardNotFound(id.to_string()))?;

            let at_removed = store
                .cards
                .cards_by_stack(stack_id)
                .get(removed_index)
                .map(|card| card.id);
            if at_removed != Some(id) {
                return Err(DeckError::ReorderIndexMismatch {
                    entity: format!("card {}", id),
                    index: removed_index,
                });
            }

            store.cards.order_card(stack_id, removed_index, added_index)?;
            let ticket = store.reorders.record(
                ReorderTarget::Card { id, stack_id },
                removed_index,
                added_index,
            );
            store.reorders.mark_pending(ticket)?;
            ticket
        };

        let watch = ReorderWatch::new(&self.store, ticket);
        let answer = self.service.reorder_card(id, added_index).await;
        let mut store = self.store.write().await;
        let ticket = watch.disarm();

        match answer {
            Ok(()) => {
                store.reorders.confirm(ticket)?;
                info!(card_id = %id, position = added_index, "card move confirmed");
                Ok(ReorderOutcome::Confirmed)
            }
            Err(err) => roll_back_reorder(&mut store, ticket, &err),
        }
    }
}
