use crate::{
    actions::DeckActions,
    domain::{Board, BoardFilter, BoardId, NewBoard},
    error::{DeckError, Result},
    service::DeckService,
};
use tracing::{debug, info};

impl<S: DeckService + ?Sized> DeckActions<S> {
    /// Replaces the cached boards with the server's list
    pub async fn load_boards(&self) -> Result<()> {
        let boards = self.service.load_boards().await?;
        debug!(count = boards.len(), "loaded boards");
        self.store.write().await.boards.set_boards(boards);
        Ok(())
    }

    pub async fn load_board(&self, id: BoardId) -> Result<Board> {
        let board = self.service.load_board(id).await?;
        self.store.write().await.boards.add_board(board.clone());
        Ok(board)
    }

    pub async fn create_board(&self, board: NewBoard) -> Result<Board> {
        let created = self.service.create_board(board).await?;
        info!(board_id = %created.id, "created board");
        self.store.write().await.boards.add_board(created.clone());
        Ok(created)
    }

    pub async fn update_board(&self, board: &Board) -> Result<Board> {
        let updated = self.service.update_board(board).await?;
        self.cache_board(updated.clone()).await;
        Ok(updated)
    }

    pub async fn archive_board(&self, id: BoardId) -> Result<Board> {
        self.set_archived(id, true).await
    }

    pub async fn unarchive_board(&self, id: BoardId) -> Result<Board> {
        self.set_archived(id, false).await
    }

    /// Deletes a board on the server and drops it from the cache
    pub async fn remove_board(&self, id: BoardId) -> Result<()> {
        self.service.delete_board(id).await?;
        info!(board_id = %id, "deleted board");
        self.store.write().await.boards.remove_board(id);
        Ok(())
    }

    pub async fn undelete_board(&self, id: BoardId) -> Result<Board> {
        let restored = self.service.undelete_board(id).await?;
        info!(board_id = %id, "restored board");
        self.store.write().await.boards.add_board(restored.clone());
        Ok(restored)
    }

    pub async fn set_board_filter(&self, filter: BoardFilter) {
        self.store.write().await.boards.set_filter(filter);
    }

    pub async fn set_current_board(&self, id: Option<BoardId>) -> Result<()> {
        self.store.write().await.boards.set_current_board(id)
    }

    async fn set_archived(&self, id: BoardId, archived: bool) -> Result<Board> {
        let mut copy = self
            .store
            .read()
            .await
            .boards
            .board(id)
            .cloned()
            .ok_or_else(|| DeckError::BoardNotFound(id.to_string()))?;
        copy.archived = archived;

        let updated = self.service.update_board(&copy).await?;
        info!(board_id = %id, archived, "changed board archive state");
        self.cache_board(updated.clone()).await;
        Ok(updated)
    }

    async fn cache_board(&self, board: Board) {
        let mut store = self.store.write().await;
        if store.boards.board(board.id).is_some() {
            store.boards.update_board(board);
        } else {
            store.boards.add_board(board);
        }
    }
}
