use crate::{
    config::BoardConfig,
    domain::{Board, CardOutcome, Stage},
    error::{BoardError, Result},
    storage::{MemoryStorage, Storage},
};
use std::sync::Arc;

/// Owns the board and writes a snapshot to storage after every change.
///
/// Persistence is best effort: a failed save is logged and the in-memory
/// board stays authoritative for the session.
pub struct BoardController {
    board: Board,
    config: BoardConfig,
    storage: Arc<dyn Storage>,
}

impl BoardController {
    /// Loads the stored board, or creates and saves an empty one
    pub async fn open(storage: Arc<dyn Storage>, config: BoardConfig) -> Result<Self> {
        config.validate()?;
        if let Some(key) = storage.storage_key() {
            if key != config.storage_key {
                return Err(BoardError::ConfigError(format!(
                    "storage uses key {:?} but config expects {:?}",
                    key, config.storage_key
                )));
            }
        }
        storage.initialize().await?;

        let board = match storage.load_board().await {
            Ok(mut board) => {
                board.validate()?;
                board.normalize();
                board
            }
            Err(BoardError::BoardNotInitialized) => {
                log::info!("[notes.controller.open] No stored board, starting empty");
                Board::new(&config)
            }
            Err(e) => return Err(e),
        };

        let controller = Self {
            board,
            config,
            storage,
        };
        controller.persist().await;
        Ok(controller)
    }

    /// Opens a board kept in a [`MemoryStorage`] under the configured key
    pub async fn open_in_memory(config: BoardConfig) -> Result<(Self, Arc<MemoryStorage>)> {
        let storage = Arc::new(MemoryStorage::from_config(&config));
        let controller = Self::open(storage.clone(), config).await?;
        Ok((controller, storage))
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn into_board(self) -> Board {
        self.board
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn can_add_card(&self, stage: Stage) -> bool {
        self.board.can_add_card(stage)
    }

    pub async fn add_card<I, S>(&mut self, stage: Stage, title: &str, item_texts: I) -> Result<usize>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let index = self.board.add_card(stage, title, item_texts)?;
        self.persist().await;
        Ok(index)
    }

    pub async fn toggle_item(
        &mut self,
        stage: Stage,
        card_index: usize,
        item_index: usize,
    ) -> Result<CardOutcome> {
        let outcome = self.board.toggle_item(stage, card_index, item_index)?;

        if let CardOutcome::Blocked { to, capacity } = outcome {
            log::warn!(
                "[notes.controller.toggle] Card stays in {}: {} is full (max {})",
                stage,
                to,
                capacity
            );
        }
        if outcome != CardOutcome::Ignored {
            self.persist().await;
        }
        Ok(outcome)
    }

    pub async fn edit_card<I, S>(
        &mut self,
        stage: Stage,
        card_index: usize,
        title: &str,
        item_texts: I,
    ) -> Result<CardOutcome>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let outcome = self
            .board
            .edit_card(stage, card_index, title, item_texts)?;
        self.persist().await;
        Ok(outcome)
    }

    pub async fn update_item_text(
        &mut self,
        stage: Stage,
        card_index: usize,
        item_index: usize,
        new_text: &str,
    ) -> Result<bool> {
        let changed = self
            .board
            .update_item_text(stage, card_index, item_index, new_text)?;
        if changed {
            self.persist().await;
        }
        Ok(changed)
    }

    pub async fn append_item(&mut self, stage: Stage, card_index: usize, text: &str) -> Result<()> {
        self.board.append_item(stage, card_index, text)?;
        self.persist().await;
        Ok(())
    }

    pub async fn move_card(&mut self, from: Stage, to: Stage, card_index: usize) -> Result<usize> {
        let index = self.board.move_card(from, to, card_index)?;
        self.persist().await;
        Ok(index)
    }

    /// Starts over with three empty columns
    pub async fn reset(&mut self) -> Result<()> {
        log::info!("[notes.controller.reset] Clearing board");
        self.storage.clear().await?;
        self.board = Board::new(&self.config);
        self.persist().await;
        Ok(())
    }

    async fn persist(&self) {
        if let Err(e) = self.storage.save_board(&self.board).await {
            log::warn!("[notes.controller.save] Failed to save board: {}", e);
        }
    }
}
