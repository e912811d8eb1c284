use crate::{
    domain::{
        apply_order, Board, BoardId, Card, CardId, Child, Label, LabelId, NewBoard,
        NewCard, NewLabel, NewStack, Stack, StackId,
    },
    error::{DeckError, Result},
    service::DeckService,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use tokio::sync::Mutex;

#[derive(Debug, Default)]
struct Backend {
    last_id: i64,
    boards: BTreeMap<BoardId, Board>,
    stacks: BTreeMap<StackId, Stack>,
    cards: BTreeMap<CardId, Card>,
}

impl Backend {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn observe_id(&mut self, id: i64) {
        self.last_id = self.last_id.max(id);
    }

    fn board_mut(&mut self, id: BoardId) -> Result<&mut Board> {
        self.boards
            .get_mut(&id)
            .ok_or_else(|| DeckError::RemoteNotFound(format!("board {}", id)))
    }

    fn cards_of(&self, stack_id: StackId) -> Vec<Card> {
        let mut cards: Vec<Card> = self
            .cards
            .values()
            .filter(|card| card.stack_id == stack_id)
            .cloned()
            .collect();
        cards.sort_by_key(|card| (card.order, card.id));
        cards
    }

    fn stack_with_cards(&self, id: StackId) -> Result<Stack> {
        let mut stack = self
            .stacks
            .get(&id)
            .cloned()
            .ok_or_else(|| DeckError::RemoteNotFound(format!("stack {}", id)))?;
        stack.cards = Some(self.cards_of(id));
        Ok(stack)
    }
}

/// In-process backend implementing the remote contract
///
/// Assigns ids, soft-deletes boards, and renumbers siblings on reorder the
/// way the REST backend does. Useful offline and as a test double.
#[derive(Debug, Default)]
pub struct MemoryService {
    backend: Mutex<Backend>,
}

impl MemoryService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a board as if it already existed on the server
    pub async fn insert_board(&self, board: Board) {
        let mut backend = self.backend.lock().await;
        backend.observe_id(board.id.get());
        for label in &board.labels {
            backend.observe_id(label.id.get());
        }
        backend.boards.insert(board.id, board);
    }

    pub async fn insert_stack(&self, mut stack: Stack) {
        let mut backend = self.backend.lock().await;
        backend.observe_id(stack.id.get());
        for card in stack.take_cards() {
            backend.observe_id(card.id.get());
            backend.cards.insert(card.id, card);
        }
        backend.stacks.insert(stack.id, stack);
    }

    pub async fn insert_card(&self, card: Card) {
        let mut backend = self.backend.lock().await;
        backend.observe_id(card.id.get());
        backend.cards.insert(card.id, card);
    }
}

fn require_title(kind: &str, title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(DeckError::Rejected(format!("{} title must not be empty", kind)));
    }
    Ok(())
}

fn deletion_time() -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(Utc::now().timestamp(), 0)
}

/// Moves `id` to `position` among its siblings and renumbers them
fn move_within<T: Child>(
    items: &mut BTreeMap<T::Id, T>,
    id: T::Id,
    position: usize,
) -> Result<()> {
    let parent = items
        .get(&id)
        .map(|item| item.parent_id())
        .ok_or_else(|| DeckError::RemoteNotFound(id.to_string()))?;

    let mut siblings: Vec<&T> = items
        .values()
        .filter(|item| item.parent_id() == parent)
        .collect();
    siblings.sort_by_key(|item| (item.order(), item.id()));
    let ids: Vec<T::Id> = siblings.iter().map(|item| item.id()).collect();

    let current = ids
        .iter()
        .position(|sibling| *sibling == id)
        .ok_or_else(|| DeckError::RemoteNotFound(id.to_string()))?;
    let ids = apply_order(ids, current, position)
        .map_err(|err| DeckError::Rejected(err.to_string()))?;

    for (order, sibling) in ids.into_iter().enumerate() {
        if let Some(item) = items.get_mut(&sibling) {
            item.set_order(order as i64);
        }
    }
    Ok(())
}

#[async_trait]
impl DeckService for MemoryService {
    async fn load_boards(&self) -> Result<Vec<Board>> {
        let backend = self.backend.lock().await;
        Ok(backend
            .boards
            .values()
            .filter(|board| !board.is_deleted())
            .cloned()
            .collect())
    }

    async fn load_board(&self, id: BoardId) -> Result<Board> {
        let backend = self.backend.lock().await;
        backend
            .boards
            .get(&id)
            .cloned()
            .ok_or_else(|| DeckError::RemoteNotFound(format!("board {}", id)))
    }

    async fn create_board(&self, board: NewBoard) -> Result<Board> {
        require_title("board", &board.title)?;
        let mut backend = self.backend.lock().await;
        let created = Board::new(BoardId::new(backend.next_id()), board.title, board.color);
        backend.boards.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update_board(&self, board: &Board) -> Result<Board> {
        require_title("board", &board.title)?;
        let mut backend = self.backend.lock().await;
        let stored = backend.board_mut(board.id)?;
        *stored = board.clone();
        Ok(stored.clone())
    }

    async fn delete_board(&self, id: BoardId) -> Result<()> {
        let mut backend = self.backend.lock().await;
        let stored = backend.board_mut(id)?;
        stored.deleted_at = deletion_time();
        Ok(())
    }

    async fn undelete_board(&self, id: BoardId) -> Result<Board> {
        let mut backend = self.backend.lock().await;
        let stored = backend.board_mut(id)?;
        stored.deleted_at = None;
        Ok(stored.clone())
    }

    async fn load_stacks(&self, board_id: BoardId) -> Result<Vec<Stack>> {
        let backend = self.backend.lock().await;
        if !backend.boards.contains_key(&board_id) {
            return Err(DeckError::RemoteNotFound(format!("board {}", board_id)));
        }

        let mut ids: Vec<(i64, StackId)> = backend
            .stacks
            .values()
            .filter(|stack| stack.board_id == board_id)
            .map(|stack| (stack.order, stack.id))
            .collect();
        ids.sort();

        ids.into_iter()
            .map(|(_, id)| backend.stack_with_cards(id))
            .collect()
    }

    async fn load_stack(&self, id: StackId) -> Result<Stack> {
        let backend = self.backend.lock().await;
        backend.stack_with_cards(id)
    }

    async fn create_stack(&self, stack: NewStack) -> Result<Stack> {
        require_title("stack", &stack.title)?;
        let mut backend = self.backend.lock().await;
        backend.board_mut(stack.board_id)?;

        let created = Stack::new(
            StackId::new(backend.next_id()),
            stack.board_id,
            stack.title,
            stack.order,
        );
        backend.stacks.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update_stack(&self, stack: &Stack) -> Result<Stack> {
        require_title("stack", &stack.title)?;
        let mut backend = self.backend.lock().await;
        let stored = backend
            .stacks
            .get_mut(&stack.id)
            .ok_or_else(|| DeckError::RemoteNotFound(format!("stack {}", stack.id)))?;

        *stored = stack.clone();
        stored.cards = None;
        Ok(stored.clone())
    }

    async fn delete_stack(&self, id: StackId) -> Result<()> {
        let mut backend = self.backend.lock().await;
        backend
            .stacks
            .remove(&id)
            .ok_or_else(|| DeckError::RemoteNotFound(format!("stack {}", id)))?;
        backend.cards.retain(|_, card| card.stack_id != id);
        Ok(())
    }

    async fn reorder_stack(&self, id: StackId, position: usize) -> Result<()> {
        let mut backend = self.backend.lock().await;
        move_within(&mut backend.stacks, id, position)
    }

    async fn load_cards(&self, stack_id: StackId) -> Result<Vec<Card>> {
        let backend = self.backend.lock().await;
        if !backend.stacks.contains_key(&stack_id) {
            return Err(DeckError::RemoteNotFound(format!("stack {}", stack_id)));
        }
        Ok(backend.cards_of(stack_id))
    }

    async fn load_card(&self, id: CardId) -> Result<Card> {
        let backend = self.backend.lock().await;
        backend
            .cards
            .get(&id)
            .cloned()
            .ok_or_else(|| DeckError::RemoteNotFound(format!("card {}", id)))
    }

    async fn create_card(&self, card: NewCard) -> Result<Card> {
        require_title("card", &card.title)?;
        let mut backend = self.backend.lock().await;
        if !backend.stacks.contains_key(&card.stack_id) {
            return Err(DeckError::RemoteNotFound(format!("stack {}", card.stack_id)));
        }

        let mut created = Card::new(
            CardId::new(backend.next_id()),
            card.stack_id,
            card.title,
            card.order,
        );
        created.description = card.description;
        backend.cards.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update_card(&self, card: &Card) -> Result<Card> {
        require_title("card", &card.title)?;
        let mut backend = self.backend.lock().await;
        let stored = backend
            .cards
            .get_mut(&card.id)
            .ok_or_else(|| DeckError::RemoteNotFound(format!("card {}", card.id)))?;

        *stored = card.clone();
        Ok(stored.clone())
    }

    async fn delete_card(&self, id: CardId) -> Result<()> {
        let mut backend = self.backend.lock().await;
        backend
            .cards
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| DeckError::RemoteNotFound(format!("card {}", id)))
    }

    async fn reorder_card(&self, id: CardId, position: usize) -> Result<()> {
        let mut backend = self.backend.lock().await;
        move_within(&mut backend.cards, id, position)
    }

    async fn load_labels(&self, board_id: BoardId) -> Result<Vec<Label>> {
        let backend = self.backend.lock().await;
        backend
            .boards
            .get(&board_id)
            .map(|board| board.labels.clone())
            .ok_or_else(|| DeckError::RemoteNotFound(format!("board {}", board_id)))
    }

    async fn load_label(&self, id: LabelId) -> Result<Label> {
        let backend = self.backend.lock().await;
        backend
            .boards
            .values()
            .flat_map(|board| board.labels.iter())
            .find(|label| label.id == id)
            .cloned()
            .ok_or_else(|| DeckError::RemoteNotFound(format!("label {}", id)))
    }

    async fn create_label(&self, label: NewLabel) -> Result<Label> {
        require_title("label", &label.title)?;
        let mut backend = self.backend.lock().await;
        let id = LabelId::new(backend.next_id());
        let board = backend.board_mut(label.board_id)?;

        let created = Label::new(id, label.board_id, label.title, label.color);
        board.labels.push(created.clone());
        Ok(created)
    }

    async fn update_label(&self, label: &Label) -> Result<Label> {
        require_title("label", &label.title)?;
        let mut backend = self.backend.lock().await;
        let board = backend.board_mut(label.board_id)?;
        let stored = board
            .labels
            .iter_mut()
            .find(|existing| existing.id == label.id)
            .ok_or_else(|| DeckError::RemoteNotFound(format!("label {}", label.id)))?;

        *stored = label.clone();
        Ok(stored.clone())
    }

    async fn delete_label(&self, id: LabelId) -> Result<()> {
        let mut backend = self.backend.lock().await;
        for board in backend.boards.values_mut() {
            if let Some(position) = board.labels.iter().position(|label| label.id == id) {
                board.labels.remove(position);
                return Ok(());
            }
        }
        Err(DeckError::RemoteNotFound(format!("label {}", id)))
    }
}
