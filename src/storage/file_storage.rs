use crate::{
    domain::Board,
    error::{BoardError, Result},
    storage::Storage,
};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

/// File-based storage implementation
pub struct FileStorage {
    root_path: PathBuf,
}

impl FileStorage {
    const NOTES_DIR: &'static str = ".notes";
    const BOARD_FILE: &'static str = "board.json";

    /// Creates a new FileStorage instance for the given project root
    pub fn new(project_root: impl AsRef<Path>) -> Self {
        Self {
            root_path: project_root.as_ref().join(Self::NOTES_DIR),
        }
    }

    pub fn board_file(&self) -> PathBuf {
        self.root_path.join(Self::BOARD_FILE)
    }

    async fn ensure_directory_exists(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl Storage for FileStorage {
    async fn initialize(&self) -> Result<()> {
        self.ensure_directory_exists(&self.root_path).await
    }

    async fn save_board(&self, board: &Board) -> Result<()> {
        self.ensure_directory_exists(&self.root_path).await?;

        let json = serde_json::to_string_pretty(board)?;
        fs::write(self.board_file(), json).await?;

        Ok(())
    }

    async fn load_board(&self) -> Result<Board> {
        let board_file = self.board_file();

        if !board_file.exists() {
            return Err(BoardError::BoardNotInitialized);
        }

        let contents = fs::read_to_string(&board_file).await?;
        let board: Board = serde_json::from_str(&contents)?;

        Ok(board)
    }

    async fn clear(&self) -> Result<()> {
        let board_file = self.board_file();

        if board_file.exists() {
            fs::remove_file(board_file).await?;
        }
        Ok(())
    }

    async fn is_initialized(&self) -> bool {
        self.board_file().exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Stage;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_storage_initialization() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path());

        storage.initialize().await.unwrap();

        assert!(temp_dir.path().join(".notes").exists());
        assert!(!storage.is_initialized().await);
    }

    #[tokio::test]
    async fn test_load_before_save() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path());

        assert!(matches!(
            storage.load_board().await,
            Err(BoardError::BoardNotInitialized)
        ));
    }

    #[tokio::test]
    async fn test_board_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path());

        let mut board = Board::default();
        board.add_card(Stage::Backlog, "Chores", ["a", "b", "c"]).unwrap();
        board.add_card(Stage::Done, "Shipped", ["x", "y", "z"]).unwrap();
        board.update_item_text(Stage::Backlog, 0, 0, "apples").unwrap();

        storage.save_board(&board).await.unwrap();
        assert!(storage.is_initialized().await);

        let loaded = storage.load_board().await.unwrap();
        assert_eq!(loaded, board);
    }

    #[tokio::test]
    async fn test_corrupt_file() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path());
        storage.initialize().await.unwrap();

        std::fs::write(storage.board_file(), "{ not json").unwrap();
        assert!(matches!(
            storage.load_board().await,
            Err(BoardError::SerializationError(_))
        ));
    }

    #[tokio::test]
    async fn test_clear() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path());

        storage.save_board(&Board::default()).await.unwrap();
        storage.clear().await.unwrap();
        assert!(!storage.is_initialized().await);

        // clearing twice is fine
        storage.clear().await.unwrap();
    }
}
