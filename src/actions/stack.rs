use crate::{
    actions::{roll_back_reorder, DeckActions, ReorderWatch},
    domain::{BoardId, NewStack, Stack, StackId},
    error::{DeckError, Result},
    reconcile::{ReorderOutcome, ReorderTarget},
    service::DeckService,
};
use tracing::{debug, info};

impl<S: DeckService + ?Sized> DeckActions<S> {
    /// Loads the stacks of a board, caching their embedded cards separately
    pub async fn load_stacks(&self, board_id: BoardId) -> Result<()> {
        let stacks = self.service.load_stacks(board_id).await?;
        debug!(board_id = %board_id, count = stacks.len(), "loaded stacks");

        let mut store = self.store.write().await;
        for stack in stacks {
            store.ingest_stack(stack);
        }
        Ok(())
    }

    pub async fn load_stack(&self, id: StackId) -> Result<()> {
        let stack = self.service.load_stack(id).await?;
        self.store.write().await.ingest_stack(stack);
        Ok(())
    }

    pub async fn create_stack(&self, stack: NewStack) -> Result<Stack> {
        let created = self.service.create_stack(stack).await?;
        info!(stack_id = %created.id, board_id = %created.board_id, "created stack");
        self.store.write().await.ingest_stack(created.clone());
        Ok(created)
    }

    pub async fn update_stack(&self, stack: &Stack) -> Result<Stack> {
        let updated = self.service.update_stack(stack).await?;
        info!(stack_id = %updated.id, "updated stack");
        self.store.write().await.ingest_stack_replace(updated.clone());
        Ok(updated)
    }

    pub async fn delete_stack(&self, id: StackId) -> Result<()> {
        self.service.delete_stack(id).await?;
        info!(stack_id = %id, "deleted stack");
        self.store.write().await.stacks.delete_stack(id);
        Ok(())
    }

    /// Moves a stack within its board, optimistically
    ///
    /// The cache is reordered before the server is asked. If the server
    /// rejects the move the inverse reorder is applied, a notice is queued,
    /// and `RolledBack` is returned; the remote error is not propagated.
    /// Dropping the returned future before the server answers abandons the
    /// move and keeps the local order.
    pub async fn order_stack(
        &self,
        id: StackId,
        removed_index: usize,
        added_index: usize,
    ) -> Result<ReorderOutcome> {
        let ticket = {
            let mut store = self.store.write().await;
            let board_id = store
                .stacks
                .stack(id)
                .map(|stack| stack.board_id)
                .ok_or_else(|| DeckError::StackNotFound(id.to_string()))?;

            let at_removed = store
                .stacks
                .stacks_by_board(board_id)
                .get(removed_index)
                .map(|stack| stack.id);
            if at_removed != Some(id) {
                return Err(DeckError::ReorderIndexMismatch {
                    entity: format!("stack {}", id),
                    index: removed_index,
                });
            }

            store.stacks.order_stack(board_id, removed_index, added_index)?;
            let ticket = store.reorders.record(
                ReorderTarget::Stack { id, board_id },
                removed_index,
                added_index,
            );
            store.reorders.mark_pending(ticket)?;
            ticket
        };

        let watch = ReorderWatch::new(&self.store, ticket);
        let answer = self.service.reorder_stack(id, added_index).await;
        let mut store = self.store.write().await;
        let ticket = watch.disarm();

        match answer {
            Ok(()) => {
                store.reorders.confirm(ticket)?;
                info!(stack_id = %id, position = added_index, "stack move confirmed");
                Ok(ReorderOutcome::Confirmed)
            }
            Err(err) => roll_back_reorder(&mut store, ticket, &err),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::actions::{testing::FlakyService, DeckActions};
    use crate::domain::{Board, BoardId, Card, CardId, NewStack, Stack, StackId};
    use crate::error::DeckError;
    use crate::reconcile::{NoticeLevel, ReorderOutcome};
    use crate::service::DeckService;
    use std::sync::Arc;

    const BOARD: BoardId = BoardId::new(1);

    /// Board 1 with stacks A(0), B(1), C(2) loaded into the cache
    async fn actions_with_stacks(service: FlakyService) -> DeckActions<FlakyService> {
        service
            .inner
            .insert_board(Board::new(BOARD, "Roadmap", "0082c9"))
            .await;
        for (id, title, order) in [(10, "A", 0), (11, "B", 1), (12, "C", 2)] {
            service
                .inner
                .insert_stack(Stack::new(StackId::new(id), BOARD, title, order))
                .await;
        }

        let actions = DeckActions::with_empty_store(Arc::new(service));
        actions.load_stacks(BOARD).await.unwrap();
        actions
    }

    async fn view(actions: &DeckActions<FlakyService>) -> Vec<(String, i64)> {
        actions
            .store()
            .read()
            .await
            .stacks_by_board(BOARD)
            .iter()
            .map(|stack| (stack.title.clone(), stack.order))
            .collect()
    }

    fn expected(entries: &[(&str, i64)]) -> Vec<(String, i64)> {
        entries
            .iter()
            .map(|(title, order)| (title.to_string(), *order))
            .collect()
    }

    #[tokio::test]
    async fn test_order_stack_confirmed() {
        let actions = actions_with_stacks(FlakyService::new()).await;

        let outcome = actions.order_stack(StackId::new(11), 1, 0).await.unwrap();

        assert_eq!(outcome, ReorderOutcome::Confirmed);
        assert_eq!(view(&actions).await, expected(&[("B", 0), ("A", 1), ("C", 2)]));
        assert!(actions.store().read().await.reorders.is_empty());
        assert!(actions.notices().await.is_empty());

        // The server agrees with the cache
        let remote = actions.service().inner.load_stacks(BOARD).await.unwrap();
        let remote: Vec<i64> = remote.iter().map(|s| s.id.get()).collect();
        assert_eq!(remote, vec![11, 10, 12]);
    }

    #[tokio::test]
    async fn test_order_stack_rolled_back_on_failure() {
        let service = FlakyService::new();
        service.script_reorders(&[false]);
        let actions = actions_with_stacks(service).await;

        let outcome = actions.order_stack(StackId::new(11), 1, 0).await.unwrap();

        assert_eq!(outcome, ReorderOutcome::RolledBack);
        assert_eq!(view(&actions).await, expected(&[("A", 0), ("B", 1), ("C", 2)]));
        assert!(actions.store().read().await.reorders.is_empty());

        let notices = actions.notices().await;
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].level, NoticeLevel::Error);
    }

    #[tokio::test]
    async fn test_optimistic_state_visible_before_confirmation() {
        let actions = actions_with_stacks(FlakyService::gated()).await;

        let pending = {
            let actions = actions.clone();
            tokio::spawn(async move { actions.order_stack(StackId::new(11), 1, 0).await })
        };
        while actions.store().read().await.reorders.is_empty() {
            tokio::task::yield_now().await;
        }

        assert_eq!(view(&actions).await, expected(&[("B", 0), ("A", 1), ("C", 2)]));

        actions.service().release(1);
        assert_eq!(pending.await.unwrap().unwrap(), ReorderOutcome::Confirmed);
    }

    #[tokio::test]
    async fn test_concurrent_rollback_applies_inverse_unconditionally() {
        let service = FlakyService::gated();
        service.script_reorders(&[false, true]);
        let actions = actions_with_stacks(service).await;

        let first = {
            let actions = actions.clone();
            tokio::spawn(async move { actions.order_stack(StackId::new(11), 1, 0).await })
        };
        while actions.store().read().await.reorders.len() < 1 {
            tokio::task::yield_now().await;
        }
        // Cache is now B, A, C; move C to the front
        let second = {
            let actions = actions.clone();
            tokio::spawn(async move { actions.order_stack(StackId::new(12), 2, 0).await })
        };
        while actions.store().read().await.reorders.len() < 2 {
            tokio::task::yield_now().await;
        }
        assert_eq!(view(&actions).await, expected(&[("C", 0), ("B", 1), ("A", 2)]));

        actions.service().release(1);
        assert_eq!(first.await.unwrap().unwrap(), ReorderOutcome::RolledBack);

        // Inverse of (1 -> 0) applied to C, B, A moves C back to index 1
        assert_eq!(view(&actions).await, expected(&[("B", 0), ("C", 1), ("A", 2)]));

        actions.service().release(1);
        assert_eq!(second.await.unwrap().unwrap(), ReorderOutcome::Confirmed);
        assert!(actions.store().read().await.reorders.is_empty());
    }

    #[tokio::test]
    async fn test_rollback_after_concurrent_delete_restores_by_identity() {
        let service = FlakyService::gated();
        service.script_reorders(&[false]);
        let actions = actions_with_stacks(service).await;

        let pending = {
            let actions = actions.clone();
            tokio::spawn(async move { actions.order_stack(StackId::new(12), 2, 0).await })
        };
        while actions.service().waiting() < 1 {
            tokio::task::yield_now().await;
        }
        actions.delete_stack(StackId::new(10)).await.unwrap();
        assert_eq!(view(&actions).await, expected(&[("C", 0), ("B", 2)]));

        actions.service().release(1);
        assert_eq!(pending.await.unwrap().unwrap(), ReorderOutcome::RolledBack);

        assert_eq!(view(&actions).await, expected(&[("B", 0), ("C", 1)]));
        assert!(actions.store().read().await.reorders.is_empty());
        assert_eq!(actions.notices().await.len(), 1);
    }

    #[tokio::test]
    async fn test_dropped_reorder_leaves_ledger() {
        let actions = actions_with_stacks(FlakyService::gated()).await;

        let pending = {
            let actions = actions.clone();
            tokio::spawn(async move { actions.order_stack(StackId::new(11), 1, 0).await })
        };
        while actions.service().waiting() < 1 {
            tokio::task::yield_now().await;
        }
        assert_eq!(actions.store().read().await.reorders.len(), 1);

        pending.abort();
        assert!(pending.await.unwrap_err().is_cancelled());

        assert!(actions.store().read().await.reorders.is_empty());
        assert_eq!(view(&actions).await, expected(&[("B", 0), ("A", 1), ("C", 2)]));
    }

    #[tokio::test]
    async fn test_order_stack_validates_indices() {
        let actions = actions_with_stacks(FlakyService::new()).await;

        let result = actions.order_stack(StackId::new(11), 0, 1).await;
        assert!(matches!(result, Err(DeckError::ReorderIndexMismatch { .. })));

        let result = actions.order_stack(StackId::new(12), 2, 3).await;
        assert!(matches!(result, Err(DeckError::InvalidReorder { .. })));

        let result = actions.order_stack(StackId::new(99), 0, 1).await;
        assert!(matches!(result, Err(DeckError::StackNotFound(_))));

        assert_eq!(view(&actions).await, expected(&[("A", 0), ("B", 1), ("C", 2)]));
        assert!(actions.store().read().await.reorders.is_empty());
    }

    #[tokio::test]
    async fn test_load_stacks_ingests_nested_cards() {
        let service = FlakyService::new();
        service
            .inner
            .insert_board(Board::new(BOARD, "Roadmap", "0082c9"))
            .await;
        let mut stack = Stack::new(StackId::new(1), BOARD, "To do", 0);
        stack.cards = Some(vec![
            Card::new(CardId::new(10), StackId::new(1), "a", 0),
            Card::new(CardId::new(11), StackId::new(1), "b", 1),
        ]);
        service.inner.insert_stack(stack).await;

        let actions = DeckActions::with_empty_store(Arc::new(service));
        actions.load_stacks(BOARD).await.unwrap();

        let store = actions.store().read().await;
        assert!(store.cards.card(CardId::new(10)).is_some());
        assert!(store.cards.card(CardId::new(11)).is_some());
        assert!(store.stacks.stack(StackId::new(1)).unwrap().cards.is_none());
    }

    #[tokio::test]
    async fn test_create_update_delete_stack() {
        let actions = actions_with_stacks(FlakyService::new()).await;

        let created = actions
            .create_stack(NewStack {
                board_id: BOARD,
                title: "D".to_string(),
                order: 3,
            })
            .await
            .unwrap();
        assert_eq!(view(&actions).await.len(), 4);

        let mut renamed = created.clone();
        renamed.title = "Done".to_string();
        actions.update_stack(&renamed).await.unwrap();
        assert_eq!(
            actions
                .store()
                .read()
                .await
                .stacks
                .stack(created.id)
                .unwrap()
                .title,
            "Done"
        );

        actions.delete_stack(created.id).await.unwrap();
        assert_eq!(view(&actions).await, expected(&[("A", 0), ("B", 1), ("C", 2)]));
    }

    #[tokio::test]
    async fn test_failed_delete_keeps_stack() {
        let actions = actions_with_stacks(FlakyService::new()).await;
        actions.service().fail_writes(true);

        let result = actions.delete_stack(StackId::new(10)).await;
        assert!(matches!(result, Err(DeckError::Transport(_))));
        assert_eq!(view(&actions).await.len(), 3);
    }
}
