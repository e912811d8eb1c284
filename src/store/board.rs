use crate::{
    domain::{Board, BoardFilter, BoardId, BoardMenuItem, Label, LabelId},
    error::{DeckError, Result},
    store::Collection,
};
use tracing::debug;

/// Boards, the current selection, and the menu filter
#[derive(Debug, Clone, Default)]
pub struct BoardStore {
    boards: Collection<Board>,
    current_board: Option<BoardId>,
    filter: BoardFilter,
}

impl BoardStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filter(filter: BoardFilter) -> Self {
        Self {
            filter,
            ..Self::default()
        }
    }

    pub fn board(&self, id: BoardId) -> Option<&Board> {
        self.boards.get(id)
    }

    pub fn boards(&self) -> impl Iterator<Item = &Board> {
        self.boards.iter()
    }

    pub fn len(&self) -> usize {
        self.boards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boards.is_empty()
    }

    /// Upserts a board, merging into the cached copy
    pub fn add_board(&mut self, board: Board) {
        self.boards.add(board);
    }

    pub fn update_board(&mut self, board: Board) -> bool {
        self.boards.update(board)
    }

    /// Removes a board, clearing the selection when it was current
    pub fn remove_board(&mut self, id: BoardId) -> Option<Board> {
        let removed = self.boards.delete(id)?;
        if self.current_board == Some(id) {
            debug!(board_id = %id, "current board removed, clearing selection");
            self.current_board = None;
        }
        Some(removed)
    }

    /// Replaces the whole board collection with a fresh load
    pub fn set_boards(&mut self, boards: Vec<Board>) {
        self.boards.replace_all(boards);
        if let Some(current) = self.current_board {
            if !self.boards.contains(current) {
                self.current_board = None;
            }
        }
    }

    pub fn archived_boards(&self) -> Vec<&Board> {
        self.boards.iter().filter(|board| board.archived).collect()
    }

    pub fn none_archived_boards(&self) -> Vec<&Board> {
        self.boards.iter().filter(|board| !board.archived).collect()
    }

    pub fn shared_boards(&self) -> Vec<&Board> {
        self.boards.iter().filter(|board| board.shared).collect()
    }

    /// Boards selected by the current filter, projected for the menu
    pub fn filtered_boards(&self) -> Vec<BoardMenuItem> {
        self.boards
            .iter()
            .filter(|board| self.filter.matches(board))
            .map(BoardMenuItem::from)
            .collect()
    }

    pub fn filter(&self) -> BoardFilter {
        self.filter
    }

    pub fn set_filter(&mut self, filter: BoardFilter) {
        self.filter = filter;
    }

    pub fn current_board_id(&self) -> Option<BoardId> {
        self.current_board
    }

    pub fn current_board(&self) -> Option<&Board> {
        self.current_board.and_then(|id| self.boards.get(id))
    }

    /// Selects the current board; `None` clears the selection
    pub fn set_current_board(&mut self, id: Option<BoardId>) -> Result<()> {
        if let Some(id) = id {
            if !self.boards.contains(id) {
                return Err(DeckError::BoardNotFound(id.to_string()));
            }
        }
        self.current_board = id;
        Ok(())
    }

    /// Labels of the current board; empty when nothing is selected
    pub fn current_board_labels(&self) -> &[Label] {
        self.current_board()
            .map(|board| board.labels.as_slice())
            .unwrap_or(&[])
    }

    fn require_current_board(&self) -> Result<BoardId> {
        self.current_board.ok_or(DeckError::NoCurrentBoard)
    }

    fn board_mut(&mut self, id: BoardId) -> Result<&mut Board> {
        self.boards
            .get_mut(id)
            .ok_or_else(|| DeckError::BoardNotFound(id.to_string()))
    }

    /// Appends a label to the current board, replacing one with the same id
    pub fn add_label_to_current_board(&mut self, label: Label) -> Result<()> {
        let id = self.require_current_board()?;
        self.add_label(id, label)
    }

    /// Overwrites title and color of a label on the current board
    pub fn update_label_from_current_board(&mut self, label: &Label) -> Result<()> {
        let id = self.require_current_board()?;
        self.update_label(id, label)
    }

    pub fn remove_label_from_current_board(&mut self, id: LabelId) -> Result<Label> {
        let board_id = self.require_current_board()?;
        self.remove_label(board_id, id)
    }

    /// Appends a label to `board_id`, replacing one with the same id
    ///
    /// Used to land a server answer on the board that was current when the
    /// request was made.
    pub fn add_label(&mut self, board_id: BoardId, label: Label) -> Result<()> {
        let board = self.board_mut(board_id)?;
        match board.labels.iter().position(|existing| existing.id == label.id) {
            Some(position) => board.labels[position] = label,
            None => board.labels.push(label),
        }
        Ok(())
    }

    pub fn update_label(&mut self, board_id: BoardId, label: &Label) -> Result<()> {
        let board = self.board_mut(board_id)?;
        let existing = board
            .labels
            .iter_mut()
            .find(|existing| existing.id == label.id)
            .ok_or_else(|| DeckError::LabelNotFound(label.id.to_string()))?;
        existing.title = label.title.clone();
        existing.color = label.color.clone();
        Ok(())
    }

    pub fn remove_label(&mut self, board_id: BoardId, id: LabelId) -> Result<Label> {
        let board = self.board_mut(board_id)?;
        let position = board
            .labels
            .iter()
            .position(|label| label.id == id)
            .ok_or_else(|| DeckError::LabelNotFound(id.to_string()))?;
        Ok(board.labels.remove(position))
    }

    /// Replaces the label list of a cached board
    pub fn set_labels(&mut self, board_id: BoardId, labels: Vec<Label>) -> Result<()> {
        self.board_mut(board_id)?.labels = labels;
        Ok(())
    }

    pub(crate) fn restore(
        &mut self,
        boards: Vec<Board>,
        current: Option<BoardId>,
        filter: BoardFilter,
    ) {
        self.boards.replace_all(boards);
        self.current_board = current.filter(|id| self.boards.contains(*id));
        self.filter = filter;
    }
}
