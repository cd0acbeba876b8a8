use crate::{
    config::BoardConfig,
    domain::{
        card::Card,
        lifecycle::{backlog_should_lock, next_stage},
    },
    error::{BoardError, Result},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the three fixed columns of the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Backlog,
    InProgress,
    Done,
}

impl Stage {
    pub const ALL: [Stage; 3] = [Stage::Backlog, Stage::InProgress, Stage::Done];

    pub fn index(self) -> usize {
        match self {
            Self::Backlog => 0,
            Self::InProgress => 1,
            Self::Done => 2,
        }
    }

    /// Maximum number of cards the column holds, `None` when unbounded
    pub fn capacity(self) -> Option<usize> {
        match self {
            Self::Backlog => Some(3),
            Self::InProgress => Some(5),
            Self::Done => None,
        }
    }
}

impl TryFrom<usize> for Stage {
    type Error = BoardError;

    fn try_from(index: usize) -> Result<Self> {
        Self::ALL
            .get(index)
            .copied()
            .ok_or(BoardError::ColumnOutOfRange(index))
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Backlog => write!(f, "Backlog"),
            Self::InProgress => write!(f, "In Progress"),
            Self::Done => write!(f, "Done"),
        }
    }
}

/// Where a card ended up after a toggle or an edit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardOutcome {
    /// The card is locked; nothing changed
    Ignored,
    /// The card kept its column
    Stayed,
    /// The card moved to the end of `to`
    Moved { to: Stage },
    /// The card should have moved but `to` was full, so it kept its place.
    /// The change that triggered the move still stands.
    Blocked { to: Stage, capacity: usize },
}

/// A column of cards
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub title: String,
    pub cards: Vec<Card>,
    #[serde(default)]
    pub locked: bool,
}

impl Column {
    pub fn new(title: String) -> Self {
        Self {
            title,
            cards: Vec::new(),
            locked: false,
        }
    }
}

/// Kanban board state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Board {
    columns: [Column; 3],
}

impl Board {
    pub fn new(config: &BoardConfig) -> Self {
        let [a, b, c] = config.column_titles.clone();
        Self {
            columns: [Column::new(a), Column::new(b), Column::new(c)],
        }
    }

    pub fn columns(&self) -> &[Column; 3] {
        &self.columns
    }

    pub fn column(&self, stage: Stage) -> &Column {
        &self.columns[stage.index()]
    }

    pub(crate) fn column_mut(&mut self, stage: Stage) -> &mut Column {
        &mut self.columns[stage.index()]
    }

    pub fn card(&self, stage: Stage, index: usize) -> Result<&Card> {
        self.column(stage)
            .cards
            .get(index)
            .ok_or(BoardError::CardNotFound { stage, index })
    }

    fn card_mut(&mut self, stage: Stage, index: usize) -> Result<&mut Card> {
        self.column_mut(stage)
            .cards
            .get_mut(index)
            .ok_or(BoardError::CardNotFound { stage, index })
    }

    pub fn card_count(&self, stage: Stage) -> usize {
        self.column(stage).cards.len()
    }

    pub fn is_full(&self, stage: Stage) -> bool {
        stage
            .capacity()
            .map(|cap| self.card_count(stage) >= cap)
            .unwrap_or(false)
    }

    pub fn can_add_card(&self, stage: Stage) -> bool {
        !self.is_full(stage)
    }

    fn ensure_room(&self, stage: Stage) -> Result<()> {
        match stage.capacity() {
            Some(capacity) if self.card_count(stage) >= capacity => {
                Err(BoardError::ColumnFull { stage, capacity })
            }
            _ => Ok(()),
        }
    }

    /// Creates a card at the end of `stage`. Returns its index.
    pub fn add_card<I, S>(&mut self, stage: Stage, title: &str, item_texts: I) -> Result<usize>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut card = Card::new(title, item_texts)?;
        self.ensure_room(stage)?;

        if stage == Stage::Done {
            card.completed_date = Some(Utc::now());
        }

        log::debug!(
            "[notes.board.add] Card {:?} added to {} with {} items",
            card.title,
            stage,
            card.items.len()
        );

        let column = self.column_mut(stage);
        column.cards.push(card);
        let index = column.cards.len() - 1;

        self.recompute_locks();
        Ok(index)
    }

    /// Flips an item and lets the card follow its new completion ratio
    pub fn toggle_item(
        &mut self,
        stage: Stage,
        card_index: usize,
        item_index: usize,
    ) -> Result<CardOutcome> {
        let card = self.card_mut(stage, card_index)?;
        card.item(item_index)?;

        if card.locked {
            log::debug!(
                "[notes.board.toggle] Ignored toggle on locked card {:?}",
                card.title
            );
            return Ok(CardOutcome::Ignored);
        }

        card.item_mut(item_index)?.toggle();

        let outcome = self.settle(stage, card_index)?;
        self.recompute_locks();
        Ok(outcome)
    }

    /// Replaces a card's title and items. Completion starts over, so the
    /// card may fall back to an earlier column.
    pub fn edit_card<I, S>(
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
        let card = self.card_mut(stage, card_index)?;
        if card.locked {
            return Err(BoardError::CardLocked);
        }

        let edited = Card::new(title, item_texts)?;
        card.title = edited.title;
        card.items = edited.items;
        card.touch();

        log::debug!(
            "[notes.board.edit] Card {:?} rewritten with {} items",
            card.title,
            card.items.len()
        );

        let outcome = self.settle(stage, card_index)?;
        self.recompute_locks();
        Ok(outcome)
    }

    /// Moves a card once if its completion ratio calls for it
    fn settle(&mut self, stage: Stage, card_index: usize) -> Result<CardOutcome> {
        let target = next_stage(stage, self.card(stage, card_index)?);

        match target {
            None => Ok(CardOutcome::Stayed),
            Some(to) => match self.move_card(stage, to, card_index) {
                Ok(_) => Ok(CardOutcome::Moved { to }),
                Err(BoardError::ColumnFull { capacity, .. }) => {
                    Ok(CardOutcome::Blocked { to, capacity })
                }
                Err(e) => Err(e),
            },
        }
    }

    /// Edits an item's text. Returns false when the text didn't change.
    pub fn update_item_text(
        &mut self,
        stage: Stage,
        card_index: usize,
        item_index: usize,
        new_text: &str,
    ) -> Result<bool> {
        let card = self.card_mut(stage, card_index)?;
        let changed = card.item_mut(item_index)?.rename(new_text)?;

        if changed {
            card.touch();
            log::debug!(
                "[notes.board.edit] Item {} of {:?} renamed",
                item_index,
                card.title
            );
        }

        Ok(changed)
    }

    /// Adds an item to an unlocked Backlog card
    pub fn append_item(&mut self, stage: Stage, card_index: usize, text: &str) -> Result<()> {
        if stage != Stage::Backlog {
            return Err(BoardError::AppendNotAllowed { stage });
        }

        let card = self.card_mut(stage, card_index)?;
        if card.locked {
            return Err(BoardError::CardLocked);
        }
        card.append_item(text)?;

        self.recompute_locks();
        Ok(())
    }

    /// Moves a card to the end of another column. Returns its new index.
    ///
    /// When the destination is full the card goes back to its original
    /// position and `ColumnFull` is returned.
    pub fn move_card(&mut self, from: Stage, to: Stage, card_index: usize) -> Result<usize> {
        if card_index >= self.card_count(from) {
            return Err(BoardError::CardNotFound {
                stage: from,
                index: card_index,
            });
        }

        let mut card = self.column_mut(from).cards.remove(card_index);

        if let Err(e) = self.ensure_room(to) {
            log::warn!(
                "[notes.board.move] Cannot move {:?} from {} to {}: {}",
                card.title,
                from,
                to,
                e
            );
            self.column_mut(from).cards.insert(card_index, card);
            return Err(e);
        }

        card.completed_date = if to == Stage::Done {
            Some(Utc::now())
        } else {
            None
        };

        log::debug!(
            "[notes.board.move] {:?} moved from {} to {}",
            card.title,
            from,
            to
        );

        let column = self.column_mut(to);
        column.cards.push(card);
        let index = column.cards.len() - 1;

        self.recompute_locks();
        Ok(index)
    }

    /// Re-applies the Backlog lock rule and mirrors column locks onto cards.
    /// Returns true when the Backlog lock flipped.
    pub fn recompute_locks(&mut self) -> bool {
        let lock = backlog_should_lock(self);
        let changed = self.column(Stage::Backlog).locked != lock;

        for stage in Stage::ALL {
            let column = self.column_mut(stage);
            column.locked = stage == Stage::Backlog && lock;
            let locked = column.locked;
            for card in &mut column.cards {
                card.locked = locked;
            }
        }

        if changed {
            log::debug!(
                "[notes.board.lock] Backlog {}",
                if lock { "locked" } else { "unlocked" }
            );
        }
        changed
    }

    /// Rejects stored boards that can't be repaired by [`Board::normalize`]
    pub fn validate(&self) -> Result<()> {
        for stage in Stage::ALL {
            if let Some(capacity) = stage.capacity() {
                let count = self.card_count(stage);
                if count > capacity {
                    return Err(BoardError::CorruptSnapshot(format!(
                        "{} column holds {} cards, max {}",
                        stage, count, capacity
                    )));
                }
            }
            if let Some(card) = self.column(stage).cards.iter().find(|c| c.items.is_empty()) {
                return Err(BoardError::CorruptSnapshot(format!(
                    "card {:?} has no items",
                    card.title
                )));
            }
        }
        Ok(())
    }

    /// Whether lock flags and completion dates agree with card positions
    pub fn is_consistent(&self) -> bool {
        let backlog = self.column(Stage::Backlog);
        if backlog.locked != backlog_should_lock(self) {
            return false;
        }

        Stage::ALL.iter().all(|&stage| {
            let column = self.column(stage);
            (stage == Stage::Backlog || !column.locked)
                && column.cards.iter().all(|card| {
                    card.locked == column.locked
                        && card.completed_date.is_some() == (stage == Stage::Done)
                })
        })
    }

    /// Restores lock flags and completion dates after loading a snapshot
    pub fn normalize(&mut self) {
        let now = Utc::now();
        for stage in Stage::ALL {
            for card in &mut self.column_mut(stage).cards {
                if stage == Stage::Done {
                    card.completed_date.get_or_insert(now);
                } else {
                    card.completed_date = None;
                }
            }
        }
        self.recompute_locks();
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new(&BoardConfig::default())
    }
}
