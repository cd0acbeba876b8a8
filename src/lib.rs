//! # Notes Board
//!
//! Core logic for a three-column checklist board. Cards carry 3 to 5
//! checklist items and move between columns as items get checked off.
//!
//! The crate holds the card lifecycle and persistence of board snapshots.
//! Rendering and user prompts belong to whatever UI drives the
//! [`BoardController`].

pub mod config;
pub mod controller;
pub mod domain;
pub mod error;
pub mod storage;

// Re-export commonly used types
pub use config::BoardConfig;
pub use controller::BoardController;
pub use domain::{
    board::{Board, Column, Stage, CardOutcome},
    card::{Card, Item},
};
pub use error::{BoardError, ErrorKind, Result};
pub use storage::Storage;
