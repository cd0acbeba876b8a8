//! Card lifecycle rules.
//!
//! A card's column follows its completion ratio `r`. After every toggle the
//! rules below are checked in order and the first match decides the move:
//!
//! 1. `r == 1` outside Done: move to Done
//! 2. Backlog and `r > 0.5`: move to In Progress
//! 3. In Progress and `r < 0.5`: move back to Backlog
//! 4. Done and `r < 1`: move back to In Progress
//!
//! A card moves at most once per toggle. Exactly half complete keeps a card
//! where it is.
//!
//! The Backlog column locks while In Progress is full and some Backlog card
//! is past half way, since that card has nowhere to go.

use crate::domain::{board::Board, card::Card, Stage};

/// Column a card in `current` should move to, if any
pub fn next_stage(current: Stage, card: &Card) -> Option<Stage> {
    if card.is_complete() && current != Stage::Done {
        return Some(Stage::Done);
    }

    match current {
        Stage::Backlog if card.is_more_than_half_complete() => Some(Stage::InProgress),
        Stage::InProgress if card.is_less_than_half_complete() => Some(Stage::Backlog),
        Stage::Done if !card.is_complete() => Some(Stage::InProgress),
        _ => None,
    }
}

/// Whether the Backlog column must be locked for the current board
pub fn backlog_should_lock(board: &Board) -> bool {
    board.is_full(Stage::InProgress)
        && board
            .column(Stage::Backlog)
            .cards
            .iter()
            .any(Card::is_more_than_half_complete)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card_with(done: &[bool]) -> Card {
        let texts: Vec<String> = (0..done.len()).map(|i| format!("item {}", i)).collect();
        let mut card = Card::new("Card", &texts).unwrap();
        for (item, &d) in card.items.iter_mut().zip(done) {
            item.completed = d;
        }
        card
    }

    #[test]
    fn test_complete_card_goes_to_done_from_anywhere() {
        let card = card_with(&[true, true, true]);
        assert_eq!(next_stage(Stage::Backlog, &card), Some(Stage::Done));
        assert_eq!(next_stage(Stage::InProgress, &card), Some(Stage::Done));
        assert_eq!(next_stage(Stage::Done, &card), None);
    }

    #[test]
    fn test_backlog_promotion() {
        assert_eq!(
            next_stage(Stage::Backlog, &card_with(&[true, true, false])),
            Some(Stage::InProgress)
        );
        assert_eq!(next_stage(Stage::Backlog, &card_with(&[true, false, false])), None);
        assert_eq!(
            next_stage(Stage::Backlog, &card_with(&[true, true, false, false])),
            None
        );
    }

    #[test]
    fn test_in_progress_demotion_is_strict() {
        assert_eq!(
            next_stage(Stage::InProgress, &card_with(&[true, false, false])),
            Some(Stage::Backlog)
        );
        // exactly half stays put
        assert_eq!(
            next_stage(Stage::InProgress, &card_with(&[true, true, false, false])),
            None
        );
        assert_eq!(
            next_stage(Stage::InProgress, &card_with(&[true, true, false])),
            None
        );
    }

    #[test]
    fn test_done_demotion_goes_one_step() {
        // below half still only drops to In Progress
        assert_eq!(
            next_stage(Stage::Done, &card_with(&[true, false, false])),
            Some(Stage::InProgress)
        );
        assert_eq!(
            next_stage(Stage::Done, &card_with(&[true, true, false])),
            Some(Stage::InProgress)
        );
    }

    #[test]
    fn test_backlog_lock_rule() {
        let mut board = Board::default();
        assert!(!backlog_should_lock(&board));

        board.column_mut(Stage::Backlog).cards.push(card_with(&[true, true, false]));
        assert!(!backlog_should_lock(&board));

        for _ in 0..5 {
            board
                .column_mut(Stage::InProgress)
                .cards
                .push(card_with(&[true, true, false]));
        }
        assert!(backlog_should_lock(&board));

        board.column_mut(Stage::Backlog).cards[0].items[0].completed = false;
        assert!(!backlog_should_lock(&board));
    }
}
