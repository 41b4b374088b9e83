//! Board aggregate: a singleton board of ordered columns of ordered items.

use serde::Serialize;

/// A titled, positioned, timestamped unit of work within a column.
///
/// `timestamp` is assigned by the store at creation (RFC 3339) and
/// refreshed on update; it never comes from the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Item {
    pub id: i64,
    pub title: String,
    pub position: i64,
    pub timestamp: String,
}

/// A named container of items, positioned on the board.
///
/// Item order follows `position` ascending; the store's uniqueness
/// constraints rule out ties within a column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    pub id: i64,
    pub name: String,
    pub position: i64,
    pub items: Vec<Item>,
}

impl Column {
    pub fn new(id: i64, name: impl Into<String>, position: i64) -> Self {
        Self {
            id,
            name: name.into(),
            position,
            items: Vec::new(),
        }
    }

    /// Append an item to the end of the ordered sequence.
    pub fn add_item(&mut self, item: Item) {
        self.items.push(item);
    }
}

/// The singleton aggregate root: every column on the board, in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Board {
    pub title: String,
    pub columns: Vec<Column>,
}
