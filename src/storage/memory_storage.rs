use crate::{
    config::BoardConfig,
    domain::Board,
    error::{BoardError, Result},
    storage::Storage,
};
use async_trait::async_trait;
use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
};

/// Key/value storage holding JSON strings, in the manner of browser local
/// storage. The board snapshot lives under a single key.
pub struct MemoryStorage {
    key: String,
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn from_config(config: &BoardConfig) -> Self {
        Self::new(config.storage_key.clone())
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Raw stored value for any key
    pub fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries()?.get(key).cloned())
    }

    /// Stores a raw value, as a UI sharing the store would
    pub fn set_item(&self, key: &str, value: String) -> Result<()> {
        self.entries()?.insert(key.to_string(), value);
        Ok(())
    }

    fn entries(&self) -> Result<MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| BoardError::StorageError("memory storage lock poisoned".to_string()))
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new(BoardConfig::DEFAULT_STORAGE_KEY)
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn initialize(&self) -> Result<()> {
        Ok(())
    }

    async fn save_board(&self, board: &Board) -> Result<()> {
        let json = serde_json::to_string(board)?;
        self.set_item(&self.key, json)
    }

    async fn load_board(&self) -> Result<Board> {
        let json = self
            .get_item(&self.key)?
            .ok_or(BoardError::BoardNotInitialized)?;
        let board: Board = serde_json::from_str(&json)?;
        Ok(board)
    }

    async fn clear(&self) -> Result<()> {
        self.entries()?.remove(&self.key);
        Ok(())
    }

    async fn is_initialized(&self) -> bool {
        matches!(self.get_item(&self.key), Ok(Some(_)))
    }

    fn storage_key(&self) -> Option<&str> {
        Some(&self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Stage;

    #[tokio::test]
    async fn test_save_and_load() {
        let storage = MemoryStorage::default();
        assert!(!storage.is_initialized().await);

        let mut board = Board::default();
        board.add_card(Stage::Backlog, "T", ["a", "b", "c"]).unwrap();
        storage.save_board(&board).await.unwrap();

        assert!(storage.is_initialized().await);
        assert_eq!(storage.load_board().await.unwrap(), board);
    }

    #[tokio::test]
    async fn test_snapshot_stored_under_key() {
        let storage = MemoryStorage::new("custom");
        storage.save_board(&Board::default()).await.unwrap();

        let raw = storage.get_item("custom").unwrap().unwrap();
        assert!(raw.starts_with("{\"columns\":["));
        assert!(storage.get_item("noteAppData").unwrap().is_none());
    }

    #[tokio::test]
    async fn test_load_externally_written_snapshot() {
        let storage = MemoryStorage::default();
        storage
            .set_item(
                "noteAppData",
                r#"{"columns":[
                    {"title":"One","cards":[{"title":"T","items":[
                        {"text":"a","completed":true,"changesHistory":[]},
                        {"text":"b","completed":false,"changesHistory":[]},
                        {"text":"c","completed":false,"changesHistory":[]}
                    ],"locked":false,"completedDate":null}],"locked":false},
                    {"title":"Two","cards":[]},
                    {"title":"Three","cards":[]}
                ]}"#
                .to_string(),
            )
            .unwrap();

        let board = storage.load_board().await.unwrap();
        assert_eq!(board.column(Stage::Backlog).title, "One");
        assert_eq!(board.card(Stage::Backlog, 0).unwrap().completed_count(), 1);
    }

    #[test]
    fn test_from_config_uses_configured_key() {
        let config = BoardConfig {
            storage_key: "myBoard".to_string(),
            ..BoardConfig::default()
        };
        let storage = MemoryStorage::from_config(&config);
        assert_eq!(storage.key(), "myBoard");
        assert_eq!(storage.storage_key(), Some("myBoard"));
    }

    #[tokio::test]
    async fn test_clear() {
        let storage = MemoryStorage::default();
        storage.save_board(&Board::default()).await.unwrap();
        storage.clear().await.unwrap();

        assert!(matches!(
            storage.load_board().await,
            Err(BoardError::BoardNotInitialized)
        ));
    }
}
