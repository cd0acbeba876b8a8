use crate::error::{BoardError, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Fewest items a card can be created with
pub const MIN_ITEMS: usize = 3;
/// Most items a card can hold
pub const MAX_ITEMS: usize = 5;

/// A single checklist entry on a card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub text: String,
    pub completed: bool,
    #[serde(default)]
    pub changes_history: Vec<String>,
}

impl Item {
    pub fn new(text: String) -> Self {
        Self {
            text,
            completed: false,
            changes_history: Vec::new(),
        }
    }

    /// Creates an item added after the card was made, recording the addition
    pub fn appended(text: String) -> Self {
        let entry = format!("Item added: \"{}\"", text);
        Self {
            text,
            completed: false,
            changes_history: vec![entry],
        }
    }

    pub fn toggle(&mut self) {
        self.completed = !self.completed;
    }

    /// Replaces the text. Returns false if the trimmed text is unchanged.
    pub fn rename(&mut self, new_text: &str) -> Result<bool> {
        let new_text = new_text.trim();
        if new_text.is_empty() {
            return Err(BoardError::EmptyItemText);
        }
        if self.text == new_text {
            return Ok(false);
        }

        self.changes_history
            .push(format!("Text changed: \"{}\"", new_text));
        self.text = new_text.to_string();
        Ok(true)
    }
}

/// A checklist card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub title: String,
    pub items: Vec<Item>,
    #[serde(default)]
    pub locked: bool,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub completed_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub last_modified: Option<DateTime<Utc>>,
}

/// Locale formats written by older browser-based boards, read as UTC
const LOCALE_FORMATS: [&str; 3] = [
    "%d.%m.%Y, %H:%M:%S",
    "%m/%d/%Y, %I:%M:%S %p",
    "%d/%m/%Y, %H:%M:%S",
];

/// Parses RFC 3339 or a known locale format. Anything else becomes `None`.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim().replace(['\u{202f}', '\u{a0}'], " ");

    if let Ok(parsed) = DateTime::parse_from_rfc3339(&raw) {
        return Some(parsed.with_timezone(&Utc));
    }

    LOCALE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(&raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

fn lenient_timestamp<'de, D>(deserializer: D) -> std::result::Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;

    Ok(raw.and_then(|s| {
        let parsed = parse_timestamp(&s);
        if parsed.is_none() {
            log::debug!("[notes.card.load] Dropping unreadable timestamp {:?}", s);
        }
        parsed
    }))
}

impl Card {
    /// Creates a card from a title and raw item texts.
    ///
    /// Blank texts are dropped before counting, so `["a", "", "b", "c"]`
    /// makes a three item card.
    pub fn new<I, S>(title: &str, item_texts: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let title = title.trim();
        if title.is_empty() {
            return Err(BoardError::EmptyTitle);
        }

        let items: Vec<Item> = item_texts
            .into_iter()
            .map(|t| t.as_ref().trim().to_string())
            .filter(|t| !t.is_empty())
            .map(Item::new)
            .collect();

        if !(MIN_ITEMS..=MAX_ITEMS).contains(&items.len()) {
            return Err(BoardError::InvalidItemCount { count: items.len() });
        }

        Ok(Self {
            title: title.to_string(),
            items,
            locked: false,
            completed_date: None,
            last_modified: None,
        })
    }

    pub fn item(&self, index: usize) -> Result<&Item> {
        self.items
            .get(index)
            .ok_or(BoardError::ItemNotFound { index })
    }

    pub fn item_mut(&mut self, index: usize) -> Result<&mut Item> {
        self.items
            .get_mut(index)
            .ok_or(BoardError::ItemNotFound { index })
    }

    pub fn completed_count(&self) -> usize {
        self.items.iter().filter(|i| i.completed).count()
    }

    /// Fraction of items completed, 0.0 for a card without items
    pub fn completion_ratio(&self) -> f64 {
        if self.items.is_empty() {
            return 0.0;
        }
        self.completed_count() as f64 / self.items.len() as f64
    }

    // Ratio checks compare 2*done against total to stay in integers.

    pub fn is_complete(&self) -> bool {
        !self.items.is_empty() && self.completed_count() == self.items.len()
    }

    pub fn is_more_than_half_complete(&self) -> bool {
        self.completed_count() * 2 > self.items.len()
    }

    pub fn is_less_than_half_complete(&self) -> bool {
        self.completed_count() * 2 < self.items.len()
    }

    /// Appends a new item, keeping the card within `MAX_ITEMS`
    pub fn append_item(&mut self, text: &str) -> Result<()> {
        let text = text.trim();
        if text.is_empty() {
            return Err(BoardError::EmptyItemText);
        }
        if self.items.len() >= MAX_ITEMS {
            return Err(BoardError::InvalidItemCount {
                count: self.items.len() + 1,
            });
        }

        self.items.push(Item::appended(text.to_string()));
        self.touch();
        Ok(())
    }

    pub fn touch(&mut self) {
        self.last_modified = Some(Utc::now());
    }
}
