use crate::{
    actions::DeckActions,
    domain::{BoardId, Label, LabelId, NewLabel},
    error::{DeckError, Result},
    service::DeckService,
};
use tracing::{debug, info, warn};

impl<S: DeckService + ?Sized> DeckActions<S> {
    /// Replaces the cached labels of a board with the server's list
    pub async fn load_labels(&self, board_id: BoardId) -> Result<Vec<Label>> {
        let labels = self.service.load_labels(board_id).await?;
        debug!(board_id = %board_id, count = labels.len(), "loaded labels");
        self.store
            .write()
            .await
            .boards
            .set_labels(board_id, labels.clone())?;
        Ok(labels)
    }

    pub async fn load_label(&self, id: LabelId) -> Result<Label> {
        let label = self.service.load_label(id).await?;
        self.store
            .write()
            .await
            .boards
            .add_label(label.board_id, label.clone())?;
        Ok(label)
    }

    /// Creates a label on the current board
    ///
    /// The answer lands on the board that was current when the call was
    /// made, even if the selection changed in the meantime.
    pub async fn add_label_to_current_board(
        &self,
        title: impl Into<String>,
        color: impl Into<String>,
    ) -> Result<Label> {
        let board_id = self
            .store
            .read()
            .await
            .boards
            .current_board_id()
            .ok_or(DeckError::NoCurrentBoard)?;

        let created = self
            .service
            .create_label(NewLabel {
                board_id,
                title: title.into(),
                color: color.into(),
            })
            .await?;
        info!(label_id = %created.id, board_id = %board_id, "created label");

        let cached = self
            .store
            .write()
            .await
            .boards
            .add_label(board_id, created.clone());
        settled_on_board(cached, board_id)?;
        Ok(created)
    }

    /// Renames or recolors a label of the current board
    pub async fn update_label_from_current_board(&self, label: &Label) -> Result<Label> {
        let board_id = self.ensure_current_label(label.id).await?;

        let updated = self.service.update_label(label).await?;
        info!(label_id = %updated.id, board_id = %board_id, "updated label");
        let cached = self
            .store
            .write()
            .await
            .boards
            .update_label(board_id, &updated);
        settled_on_board(cached, board_id)?;
        Ok(updated)
    }

    pub async fn remove_label_from_current_board(&self, id: LabelId) -> Result<()> {
        let board_id = self.ensure_current_label(id).await?;

        self.service.delete_label(id).await?;
        info!(label_id = %id, board_id = %board_id, "deleted label");
        let cached = self.store.write().await.boards.remove_label(board_id, id);
        settled_on_board(cached.map(|_| ()), board_id)?;
        Ok(())
    }

    /// Returns the current board, failing when `id` is not one of its labels
    async fn ensure_current_label(&self, id: LabelId) -> Result<BoardId> {
        let store = self.store.read().await;
        let board = store.boards.current_board().ok_or(DeckError::NoCurrentBoard)?;
        if board.label(id).is_none() {
            return Err(DeckError::LabelNotFound(id.to_string()));
        }
        Ok(board.id)
    }
}

/// A board removed while its label call was in flight has nothing left to update
fn settled_on_board(cached: Result<()>, board_id: BoardId) -> Result<()> {
    match cached {
        Err(DeckError::BoardNotFound(_)) => {
            warn!(board_id = %board_id, "board left the cache before its label change landed");
            Ok(())
        }
        other => other,
    }
}
