pub mod board;
pub mod card;
pub mod lifecycle;

pub use board::{Board, Column, Stage, CardOutcome};
pub use card::{parse_timestamp, Card, Item, MAX_ITEMS, MIN_ITEMS};
pub use lifecycle::{backlog_should_lock, next_stage};
