use crate::{
    config::StoreConfig,
    domain::{BoardId, Card, Stack, StackId},
    reconcile::{NoticeQueue, ReorderLedger},
    snapshot::CacheSnapshot,
};

pub mod board;
pub mod card;
pub mod collection;
pub mod stack;

pub use board::BoardStore;
pub use card::CardStore;
pub use collection::Collection;
pub use stack::StackStore;

/// The whole client-side cache
///
/// Constructed explicitly and handed to consumers; there is no global
/// instance. All methods are synchronous so a mutation is never observed
/// half-applied.
#[derive(Debug, Default)]
pub struct DeckStore {
    pub boards: BoardStore,
    pub stacks: StackStore,
    pub cards: CardStore,
    pub reorders: ReorderLedger,
    pub notices: NoticeQueue,
}

impl DeckStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: &StoreConfig) -> Self {
        Self {
            boards: BoardStore::with_filter(config.default_filter),
            notices: NoticeQueue::new(config.notice_capacity),
            ..Self::default()
        }
    }

    /// Caches a stack payload that may carry its cards
    ///
    /// Embedded cards go to the card cache first, then the stack is cached
    /// without them.
    pub fn ingest_stack(&mut self, mut stack: Stack) {
        for card in stack.take_cards() {
            self.cards.add_card(card);
        }
        self.stacks.add_stack(stack);
    }

    /// Like [`ingest_stack`](Self::ingest_stack) but replaces the cached stack
    pub fn ingest_stack_replace(&mut self, mut stack: Stack) {
        for card in stack.take_cards() {
            self.cards.add_card(card);
        }
        if self.stacks.stack(stack.id).is_some() {
            self.stacks.update_stack(stack);
        } else {
            self.stacks.add_stack(stack);
        }
    }

    pub fn stacks_by_board(&self, board_id: BoardId) -> Vec<&Stack> {
        self.stacks.stacks_by_board(board_id)
    }

    pub fn cards_by_stack(&self, stack_id: StackId) -> Vec<&Card> {
        self.cards.cards_by_stack(stack_id)
    }

    /// Copies the cached entities and selection for persistence
    pub fn snapshot(&self) -> CacheSnapshot {
        CacheSnapshot {
            boards: self.boards.boards().cloned().collect(),
            stacks: self.stacks.iter().cloned().collect(),
            cards: self.cards.iter().cloned().collect(),
            current_board: self.boards.current_board_id(),
            filter: self.boards.filter(),
        }
    }

    /// Replaces every cached entity with the snapshot's contents
    ///
    /// In-flight reorders and notices are left alone.
    pub fn restore(&mut self, snapshot: CacheSnapshot) {
        self.boards
            .restore(snapshot.boards, snapshot.current_board, snapshot.filter);
        self.stacks.replace_all(
            snapshot
                .stacks
                .into_iter()
                .map(|mut stack| {
                    stack.cards = None;
                    stack
                })
                .collect(),
        );
        self.cards.replace_all(snapshot.cards);
    }
}
