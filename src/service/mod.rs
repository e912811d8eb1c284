use crate::{
    domain::{
        Board, BoardId, Card, CardId, Label, LabelId, NewBoard, NewCard, NewLabel, NewStack,
        Stack, StackId,
    },
    error::Result,
};
use async_trait::async_trait;

pub mod memory;

pub use memory::MemoryService;

/// The remote backend, one method per REST endpoint
///
/// Every call resolves with the canonical server entity. Transport failures
/// map to [`DeckError::Transport`](crate::DeckError::Transport), validation
/// failures to `Rejected`, and missing entities to `RemoteNotFound`.
#[async_trait]
pub trait DeckService: Send + Sync {
    async fn load_boards(&self) -> Result<Vec<Board>>;

    async fn load_board(&self, id: BoardId) -> Result<Board>;

    async fn create_board(&self, board: NewBoard) -> Result<Board>;

    async fn update_board(&self, board: &Board) -> Result<Board>;

    /// Soft-deletes a board
    async fn delete_board(&self, id: BoardId) -> Result<()>;

    async fn undelete_board(&self, id: BoardId) -> Result<Board>;

    /// Stacks of a board, each carrying its cards
    async fn load_stacks(&self, board_id: BoardId) -> Result<Vec<Stack>>;

    async fn load_stack(&self, id: StackId) -> Result<Stack>;

    async fn create_stack(&self, stack: NewStack) -> Result<Stack>;

    async fn update_stack(&self, stack: &Stack) -> Result<Stack>;

    async fn delete_stack(&self, id: StackId) -> Result<()>;

    /// Moves a stack to `position` within its board
    async fn reorder_stack(&self, id: StackId, position: usize) -> Result<()>;

    /// Cards of a stack, ascending by `order`
    async fn load_cards(&self, stack_id: StackId) -> Result<Vec<Card>>;

    async fn load_card(&self, id: CardId) -> Result<Card>;

    async fn create_card(&self, card: NewCard) -> Result<Card>;

    async fn update_card(&self, card: &Card) -> Result<Card>;

    async fn delete_card(&self, id: CardId) -> Result<()>;

    /// Moves a card to `position` within its stack
    async fn reorder_card(&self, id: CardId, position: usize) -> Result<()>;

    async fn load_labels(&self, board_id: BoardId) -> Result<Vec<Label>>;

    async fn load_label(&self, id: LabelId) -> Result<Label>;

    async fn create_label(&self, label: NewLabel) -> Result<Label>;

    async fn update_label(&self, label: &Label) -> Result<Label>;

    async fn delete_label(&self, id: LabelId) -> Result<()>;
}
