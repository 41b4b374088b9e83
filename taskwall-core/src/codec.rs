//! Wire transcoding for the API boundary.
//!
//! Inbound payloads decode into drafts carrying exactly the
//! client-supplied fields; ids and timestamps are store-assigned.
//! Outbound entities encode through their `Serialize` impls.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why an inbound payload was rejected. No partial entity survives a
/// rejection.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Not valid JSON, or a required field is missing or mistyped
    #[error("malformed payload: {0}")]
    Json(#[from] serde_json::Error),

    /// A required text field is present but empty
    #[error("{field} must not be empty")]
    Empty { field: &'static str },
}

/// Client-supplied fields for creating or replacing a column.
#[derive(Debug, Clone, Deserialize)]
pub struct ColumnDraft {
    pub name: String,
    pub position: i64,
}

/// Client-supplied fields for creating or replacing an item.
#[derive(Debug, Clone, Deserialize)]
pub struct ItemDraft {
    pub title: String,
    pub position: i64,
}

/// Decode a column payload, requiring at minimum `{name, position}`.
pub fn column_from_json(raw: &str) -> Result<ColumnDraft, DecodeError> {
    let draft: ColumnDraft = serde_json::from_str(raw)?;
    if draft.name.trim().is_empty() {
        return Err(DecodeError::Empty { field: "name" });
    }
    Ok(draft)
}

/// Decode an item payload, requiring at minimum `{title, position}`.
pub fn item_from_json(raw: &str) -> Result<ItemDraft, DecodeError> {
    let draft: ItemDraft = serde_json::from_str(raw)?;
    if draft.title.trim().is_empty() {
        return Err(DecodeError::Empty { field: "title" });
    }
    Ok(draft)
}

/// Encode an entity to its wire representation.
pub fn to_json<T: Serialize>(entity: &T) -> Result<String, DecodeError> {
    Ok(serde_json::to_string(entity)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Column, Item};
    use serde_json::{json, Value};

    #[test]
    fn decodes_valid_column() {
        let draft = column_from_json(r#"{"name": "todo", "position": 1}"#).unwrap();
        assert_eq!(draft.name, "todo");
        assert_eq!(draft.position, 1);
    }

    #[test]
    fn ignores_extra_fields() {
        let draft = column_from_json(r#"{"name": "todo", "position": 1, "id": 99}"#).unwrap();
        assert_eq!(draft.name, "todo");
    }

    #[test]
    fn rejects_missing_position() {
        assert!(matches!(
            column_from_json(r#"{"name": "todo"}"#),
            Err(DecodeError::Json(_))
        ));
    }

    #[test]
    fn rejects_non_integer_position() {
        assert!(matches!(
            item_from_json(r#"{"title": "write spec", "position": "first"}"#),
            Err(DecodeError::Json(_))
        ));
    }

    #[test]
    fn rejects_empty_name() {
        assert!(matches!(
            column_from_json(r#"{"name": "  ", "position": 1}"#),
            Err(DecodeError::Empty { field: "name" })
        ));
    }

    #[test]
    fn rejects_garbage() {
        assert!(item_from_json("not json").is_err());
    }

    #[test]
    fn column_round_trip_preserves_name_and_position() {
        let draft = column_from_json(r#"{"name": "doing", "position": 2}"#).unwrap();
        let column = Column::new(7, draft.name.clone(), draft.position);

        let encoded: Value = serde_json::from_str(&to_json(&column).unwrap()).unwrap();
        assert_eq!(encoded["name"], json!("doing"));
        assert_eq!(encoded["position"], json!(2));
        assert_eq!(encoded["items"], json!([]));
    }

    #[test]
    fn item_encodes_wire_fields() {
        let item = Item {
            id: 3,
            title: "write spec".into(),
            position: 1,
            timestamp: "2024-01-01T00:00:00Z".into(),
        };

        let encoded: Value = serde_json::from_str(&to_json(&item).unwrap()).unwrap();
        assert_eq!(encoded["id"], json!(3));
        assert_eq!(encoded["title"], json!("write spec"));
        assert_eq!(encoded["position"], json!(1));
        assert_eq!(encoded["timestamp"], json!("2024-01-01T00:00:00Z"));
    }
}
