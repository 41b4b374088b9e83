//! taskwall-core: board/column/item entities and wire transcoding.
//!
//! Entities are plain value holders; the codec module owns inbound
//! validation. Identifiers and timestamps are store-assigned and never
//! accepted from the wire.

pub mod codec;
pub mod model;

pub use codec::{column_from_json, item_from_json, ColumnDraft, DecodeError, ItemDraft};
pub use model::{Board, Column, Item};
