use crate::domain::Stage;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, BoardError>;

/// Broad class of a [`BoardError`], used by callers to decide how to present it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad user input; nothing was mutated
    Validation,
    /// Destination column full; the board was rolled back
    Capacity,
    /// Column, card or item index does not exist
    NotFound,
    /// Persistence or configuration failure
    Storage,
}

#[derive(Debug, Error)]
pub enum BoardError {
    #[error("Card title cannot be empty")]
    EmptyTitle,

    #[error("Item text cannot be empty")]
    EmptyItemText,

    #[error("A card must have between 3 and 5 items, got {count}")]
    InvalidItemCount { count: usize },

    #[error("Items can only be appended to cards in the Backlog column, not {stage}")]
    AppendNotAllowed { stage: Stage },

    #[error("Card is locked")]
    CardLocked,

    #[error("{stage} column is full (max {capacity} cards)")]
    ColumnFull { stage: Stage, capacity: usize },

    #[error("Column index {0} out of range (0-2)")]
    ColumnOutOfRange(usize),

    #[error("No card at index {index} in {stage} column")]
    CardNotFound { stage: Stage, index: usize },

    #[error("No item at index {index}")]
    ItemNotFound { index: usize },

    #[error("Board not initialized")]
    BoardNotInitialized,

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Stored board is corrupt: {0}")]
    CorruptSnapshot(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl BoardError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyTitle
            | Self::EmptyItemText
            | Self::InvalidItemCount { .. }
            | Self::AppendNotAllowed { .. }
            | Self::CardLocked => ErrorKind::Validation,
            Self::ColumnFull { .. } => ErrorKind::Capacity,
            Self::ColumnOutOfRange(_) | Self::CardNotFound { .. } | Self::ItemNotFound { .. } => {
                ErrorKind::NotFound
            }
            Self::BoardNotInitialized
            | Self::StorageError(_)
            | Self::CorruptSnapshot(_)
            | Self::IoError(_)
            | Self::SerializationError(_)
            | Self::ConfigError(_) => ErrorKind::Storage,
        }
    }

    /// True for failures the user can fix by changing input or freeing a column
    pub fn is_user_facing(&self) -> bool {
        matches!(self.kind(), ErrorKind::Validation | ErrorKind::Capacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(BoardError::EmptyTitle.kind(), ErrorKind::Validation);
        assert_eq!(
            BoardError::ColumnFull {
                stage: Stage::InProgress,
                capacity: 5
            }
            .kind(),
            ErrorKind::Capacity
        );
        assert_eq!(BoardError::ItemNotFound { index: 9 }.kind(), ErrorKind::NotFound);
        assert_eq!(BoardError::BoardNotInitialized.kind(), ErrorKind::Storage);
    }

    #[test]
    fn test_user_facing() {
        assert!(BoardError::InvalidItemCount { count: 2 }.is_user_facing());
        assert!(!BoardError::StorageError("disk".to_string()).is_user_facing());
    }

    #[test]
    fn test_messages() {
        let err = BoardError::ColumnFull {
            stage: Stage::Backlog,
            capacity: 3,
        };
        assert_eq!(err.to_string(), "Backlog column is full (max 3 cards)");
        assert_eq!(
            BoardError::ColumnOutOfRange(7).to_string(),
            "Column index 7 out of range (0-2)"
        );
    }
}
