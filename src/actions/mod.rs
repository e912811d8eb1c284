//! Intents dispatched by the presentation layer
//!
//! Reorders mutate the cache first and undo the move if the server rejects
//! it. Every other mutation waits for the server and caches the canonical
//! response; failures are returned to the caller untouched.

use crate::{
    error::{DeckError, Result},
    reconcile::{Notice, PendingReorder, ReorderOutcome, ReorderTarget},
    service::DeckService,
    snapshot::SnapshotStore,
    store::DeckStore,
};
use std::sync::Arc;
use tokio::{runtime::Handle, sync::RwLock};
use tracing::{debug, error, warn};
use uuid::Uuid;

mod board;
mod card;
mod label;
mod stack;

/// Handle pairing the remote service with the shared cache
pub struct DeckActions<S: DeckService + ?Sized> {
    service: Arc<S>,
    store: Arc<RwLock<DeckStore>>,
}

impl<S: DeckService + ?Sized> Clone for DeckActions<S> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: DeckService + ?Sized> DeckActions<S> {
    pub fn new(service: Arc<S>, store: Arc<RwLock<DeckStore>>) -> Self {
        Self { service, store }
    }

    /// Shorthand for a fresh, empty cache
    pub fn with_empty_store(service: Arc<S>) -> Self {
        Self::new(service, Arc::new(RwLock::new(DeckStore::new())))
    }

    pub fn store(&self) -> &Arc<RwLock<DeckStore>> {
        &self.store
    }

    pub fn service(&self) -> &Arc<S> {
        &self.service
    }

    pub async fn notices(&self) -> Vec<Notice> {
        self.store.read().await.notices.iter().cloned().collect()
    }

    pub async fn dismiss_notice(&self, id: Uuid) -> bool {
        self.store.write().await.notices.dismiss(id)
    }

    /// Persists the current cache
    pub async fn save_snapshot(&self, target: &dyn SnapshotStore) -> Result<()> {
        let snapshot = self.store.read().await.snapshot();
        target.save(&snapshot).await
    }

    /// Replaces the cache with a previously saved snapshot
    pub async fn restore_snapshot(&self, source: &dyn SnapshotStore) -> Result<()> {
        let snapshot = source.load().await?;
        self.store.write().await.restore(snapshot);
        debug!("restored cache from snapshot");
        Ok(())
    }
}

/// Undoes a rejected reorder and tells the user
///
/// The inverse move is applied even if other reorders on the same parent
/// landed in the meantime. When the partition no longer has room for the
/// inverse indices the moved entity is put back by identity instead.
fn roll_back_reorder(
    store: &mut DeckStore,
    ticket: Uuid,
    cause: &DeckError,
) -> Result<ReorderOutcome> {
    let pending = store
        .reorders
        .get(ticket)
        .cloned()
        .ok_or_else(|| DeckError::ReorderNotFound(ticket.to_string()))?;
    let parent = pending.target.parent();

    let concurrent = store.reorders.in_flight(parent).saturating_sub(1);
    if concurrent > 0 {
        warn!(
            %parent,
            concurrent,
            "rolling back a reorder while others on the same parent are in flight"
        );
    }

    let what = match pending.target {
        ReorderTarget::Stack { .. } => "stack",
        ReorderTarget::Card { .. } => "card",
    };
    store
        .notices
        .push(Notice::error(format!("Could not move the {}: {}", what, cause)));

    match undo_reorder(store, &pending) {
        Ok(()) => {
            store.reorders.roll_back(ticket)?;
            warn!(%parent, error = %cause, "reorder rejected, previous order restored");
            Ok(ReorderOutcome::RolledBack)
        }
        Err(undo_err) => {
            store.reorders.fail_rollback(ticket)?;
            error!(%parent, error = %undo_err, "could not restore order after rejected reorder");
            Err(undo_err)
        }
    }
}

fn undo_reorder(store: &mut DeckStore, pending: &PendingReorder) -> Result<()> {
    let (removed_index, added_index) = pending.inverse();
    let inverse = match pending.target {
        ReorderTarget::Stack { board_id, .. } => {
            store.stacks.order_stack(board_id, removed_index, added_index)
        }
        ReorderTarget::Card { stack_id, .. } => {
            store.cards.order_card(stack_id, removed_index, added_index)
        }
    };
    let Err(err) = inverse else {
        return Ok(());
    };

    warn!(
        parent = %pending.target.parent(),
        error = %err,
        "partition changed since the move, restoring by identity"
    );
    let found = match pending.target {
        ReorderTarget::Stack { id, board_id } => {
            store.stacks.resettle_stack(board_id, id, pending.removed_index)?
        }
        ReorderTarget::Card { id, stack_id } => {
            store.cards.resettle_card(stack_id, id, pending.removed_index)?
        }
    };
    if !found {
        debug!(parent = %pending.target.parent(), "moved entity is gone, partition renumbered");
    }
    Ok(())
}

/// Abandons a pending reorder if the future awaiting the server is dropped
struct ReorderWatch {
    store: Arc<RwLock<DeckStore>>,
    ticket: Uuid,
    armed: bool,
}

impl ReorderWatch {
    fn new(store: &Arc<RwLock<DeckStore>>, ticket: Uuid) -> Self {
        Self {
            store: Arc::clone(store),
            ticket,
            armed: true,
        }
    }

    /// The server answered; settling the entry is up to the caller
    fn disarm(mut self) -> Uuid {
        self.armed = false;
        self.ticket
    }
}

impl Drop for ReorderWatch {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let ticket = self.ticket;
        match self.store.try_write() {
            Ok(mut store) => abandon_reorder(&mut store, ticket),
            Err(_) => match Handle::try_current() {
                Ok(handle) => {
                    let store = Arc::clone(&self.store);
                    handle.spawn(async move {
                        abandon_reorder(&mut *store.write().await, ticket);
                    });
                }
                Err(_) => warn!(%ticket, "could not release an abandoned reorder"),
            },
        }
    }
}

fn abandon_reorder(store: &mut DeckStore, ticket: Uuid) {
    if let Ok(entry) = store.reorders.abandon(ticket) {
        warn!(
            parent = %entry.target.parent(),
            "reorder abandoned before the server answered, keeping the local order"
        );
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::{
        domain::{
            Board, BoardId, Card, CardId, Label, LabelId, NewBoard, NewCard, NewLabel, NewStack,
            Stack, StackId,
        },
        error::{DeckError, Result},
        service::{DeckService, MemoryService},
    };
    use async_trait::async_trait;
    use std::{
        collections::VecDeque,
        sync::{
            atomic::{AtomicBool, AtomicUsize, Ordering},
            Mutex,
        },
    };
    use tokio::sync::Semaphore;

    /// Wraps [`MemoryService`] with injectable failures and a gate
    ///
    /// The gate holds back reorder and label calls until released.
    pub(crate) struct FlakyService {
        pub inner: MemoryService,
        fail_writes: AtomicBool,
        reorder_results: Mutex<VecDeque<bool>>,
        gate: Semaphore,
        waiting: AtomicUsize,
    }

    impl FlakyService {
        pub fn new() -> Self {
            Self {
                inner: MemoryService::new(),
                fail_writes: AtomicBool::new(false),
                reorder_results: Mutex::new(VecDeque::new()),
                gate: Semaphore::new(Semaphore::MAX_PERMITS),
                waiting: AtomicUsize::new(0),
            }
        }

        /// Gated calls block until [`release`](Self::release)
        pub fn gated() -> Self {
            Self {
                gate: Semaphore::new(0),
                ..Self::new()
            }
        }

        pub fn release(&self, count: usize) {
            self.gate.add_permits(count);
        }

        /// Calls currently held at the gate
        pub fn waiting(&self) -> usize {
            self.waiting.load(Ordering::SeqCst)
        }

        pub fn fail_writes(&self, fail: bool) {
            self.fail_writes.store(fail, Ordering::SeqCst);
        }

        /// Queues outcomes for upcoming reorder calls; `false` fails the call
        pub fn script_reorders(&self, outcomes: &[bool]) {
            self.reorder_results
                .lock()
                .unwrap()
                .extend(outcomes.iter().copied());
        }

        fn check_write(&self) -> Result<()> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(DeckError::Transport(anyhow::anyhow!("connection refused")));
            }
            Ok(())
        }

        async fn pass_gate(&self) -> Result<()> {
            self.waiting.fetch_add(1, Ordering::SeqCst);
            let permit = self.gate.acquire().await;
            self.waiting.fetch_sub(1, Ordering::SeqCst);
            permit.map_err(|err| DeckError::Other(err.to_string()))?.forget();
            Ok(())
        }

        async fn check_reorder(&self) -> Result<()> {
            self.pass_gate().await?;
            let succeed = self.reorder_results.lock().unwrap().pop_front().unwrap_or(true);
            if succeed {
                Ok(())
            } else {
                Err(DeckError::Transport(anyhow::anyhow!("gateway timeout")))
            }
        }
    }

    #[async_trait]
    impl DeckService for FlakyService {
        async fn load_boards(&self) -> Result<Vec<Board>> {
            self.inner.load_boards().await
        }

        async fn load_board(&self, id: BoardId) -> Result<Board> {
            self.inner.load_board(id).await
        }

        async fn create_board(&self, board: NewBoard) -> Result<Board> {
            self.check_write()?;
            self.inner.create_board(board).await
        }

        async fn update_board(&self, board: &Board) -> Result<Board> {
            self.check_write()?;
            self.inner.update_board(board).await
        }

        async fn delete_board(&self, id: BoardId) -> Result<()> {
            self.check_write()?;
            self.inner.delete_board(id).await
        }

        async fn undelete_board(&self, id: BoardId) -> Result<Board> {
            self.check_write()?;
            self.inner.undelete_board(id).await
        }

        async fn load_stacks(&self, board_id: BoardId) -> Result<Vec<Stack>> {
            self.inner.load_stacks(board_id).await
        }

        async fn load_stack(&self, id: StackId) -> Result<Stack> {
            self.inner.load_stack(id).await
        }

        async fn create_stack(&self, stack: NewStack) -> Result<Stack> {
            self.check_write()?;
            self.inner.create_stack(stack).await
        }

        async fn update_stack(&self, stack: &Stack) -> Result<Stack> {
            self.check_write()?;
            self.inner.update_stack(stack).await
        }

        async fn delete_stack(&self, id: StackId) -> Result<()> {
            self.check_write()?;
            self.inner.delete_stack(id).await
        }

        async fn reorder_stack(&self, id: StackId, position: usize) -> Result<()> {
            self.check_reorder().await?;
            self.inner.reorder_stack(id, position).await
        }

        async fn load_cards(&self, stack_id: StackId) -> Result<Vec<Card>> {
            self.inner.load_cards(stack_id).await
        }

        async fn load_card(&self, id: CardId) -> Result<Card> {
            self.inner.load_card(id).await
        }

        async fn create_card(&self, card: NewCard) -> Result<Card> {
            self.check_write()?;
            self.inner.create_card(card).await
        }

        async fn update_card(&self, card: &Card) -> Result<Card> {
            self.check_write()?;
            self.inner.update_card(card).await
        }

        async fn delete_card(&self, id: CardId) -> Result<()> {
            self.check_write()?;
            self.inner.delete_card(id).await
        }

        async fn reorder_card(&self, id: CardId, position: usize) -> Result<()> {
            self.check_reorder().await?;
            self.inner.reorder_card(id, position).await
        }

        async fn load_labels(&self, board_id: BoardId) -> Result<Vec<Label>> {
            self.inner.load_labels(board_id).await
        }

        async fn load_label(&self, id: LabelId) -> Result<Label> {
            self.inner.load_label(id).await
        }

        async fn create_label(&self, label: NewLabel) -> Result<Label> {
            self.pass_gate().await?;
            self.check_write()?;
            self.inner.create_label(label).await
        }

        async fn update_label(&self, label: &Label) -> Result<Label> {
            self.pass_gate().await?;
            self.check_write()?;
            self.inner.update_label(label).await
        }

        async fn delete_label(&self, id: LabelId) -> Result<()> {
            self.pass_gate().await?;
            self.check_write()?;
            self.inner.delete_label(id).await
        }
    }
}
