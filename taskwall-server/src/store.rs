//! SQLite persistence for the board aggregate.
//!
//! `BoardStore` owns the connection pool; schema creation is idempotent
//! and runs on connect. Check-then-write sequences run inside a single
//! transaction so a concurrent writer cannot slip between the existence
//! check and the mutation.

use std::path::Path;
use std::str::FromStr;

use chrono::{SecondsFormat, Utc};
use sqlx::error::ErrorKind;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{FromRow, SqlitePool};
use thiserror::Error;
use tracing::info;

use taskwall_core::model::{Board, Column, Item};

/// What went wrong in the store, beyond plain absence. Absence itself is
/// `Ok(None)` / an empty `Vec`, so callers can always tell "not found"
/// from "write failed".
#[derive(Debug, Error)]
pub enum StoreError {
    /// A position collided with the uniqueness constraint of its scope
    #[error("position {0} is already taken")]
    DuplicatePosition(i64),

    /// A foreign key pointed at a column that does not exist
    #[error("no column with id {0}")]
    MissingColumn(i64),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Sole owner of the storage connection; translates CRUD calls into
/// statements and reconstructs entities from rows.
#[derive(Clone)]
pub struct BoardStore {
    pool: SqlitePool,
    board_title: String,
}

#[derive(FromRow)]
struct ColumnRow {
    id: i64,
    name: String,
    position: i64,
}

impl From<ColumnRow> for Column {
    fn from(row: ColumnRow) -> Self {
        Column::new(row.id, row.name, row.position)
    }
}

#[derive(FromRow)]
struct ItemRow {
    id: i64,
    title: String,
    date: String,
    position: i64,
    column_id: i64,
}

impl From<ItemRow> for Item {
    fn from(row: ItemRow) -> Self {
        Item {
            id: row.id,
            title: row.title,
            position: row.position,
            timestamp: row.date,
        }
    }
}

impl BoardStore {
    /// Open (creating if absent) the database at `path` and ensure the
    /// schema exists. The parent directory is created first.
    pub async fn connect(path: &Path, board_title: impl Into<String>) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        let store = Self {
            pool,
            board_title: board_title.into(),
        };
        store.init_schema().await?;

        info!(path = %path.display(), "board store ready");
        Ok(store)
    }

    /// Open an in-memory database (for tests). A single connection keeps
    /// every caller on the same in-memory store.
    pub async fn in_memory(board_title: impl Into<String>) -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        let store = Self {
            pool,
            board_title: board_title.into(),
        };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> StoreResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS column (
                id INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                position INTEGER NOT NULL UNIQUE
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS item (
                id INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                date TEXT NOT NULL,
                position INTEGER NOT NULL,
                column_id INTEGER NOT NULL,
                UNIQUE (position, column_id),
                FOREIGN KEY (column_id) REFERENCES column (id)
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Assemble the singleton board: all columns ordered by position,
    /// each populated with its items ordered by position. No rows means
    /// an empty board, not an error.
    pub async fn get_board(&self) -> StoreResult<Board> {
        Ok(Board {
            title: self.board_title.clone(),
            columns: self.columns().await?,
        })
    }

    /// All columns with nested items, ordered by position. Two queries
    /// total; items are grouped in memory rather than fetched per column.
    pub async fn columns(&self) -> StoreResult<Vec<Column>> {
        let rows: Vec<ColumnRow> =
            sqlx::query_as("SELECT id, name, position FROM column ORDER BY position")
                .fetch_all(&self.pool)
                .await?;

        let items: Vec<ItemRow> = sqlx::query_as(
            "SELECT id, title, date, position, column_id FROM item ORDER BY position",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut columns: Vec<Column> = rows.into_iter().map(Column::from).collect();
        for row in items {
            if let Some(column) = columns.iter_mut().find(|c| c.id == row.column_id) {
                column.add_item(Item::from(row));
            }
        }

        Ok(columns)
    }

    /// A single column with its items, or `None` if no row matches.
    pub async fn column(&self, id: i64) -> StoreResult<Option<Column>> {
        let row: Option<ColumnRow> =
            sqlx::query_as("SELECT id, name, position FROM column WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut column = Column::from(row);
        for item in items_in(&self.pool, id).await? {
            column.add_item(item);
        }
        Ok(Some(column))
    }

    /// Insert a new column and return it with the store-assigned id,
    /// read back from the row just inserted.
    pub async fn create_column(&self, name: &str, position: i64) -> StoreResult<Column> {
        let row: ColumnRow = sqlx::query_as(
            "INSERT INTO column (name, position) VALUES (?, ?) RETURNING id, name, position",
        )
        .bind(name)
        .bind(position)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| constraint_error(e, position, None))?;

        Ok(Column::from(row))
    }

    /// Full replace of name/position. Existence is checked before the
    /// update, in the same transaction, so a no-op update to identical
    /// values is still reported as found. `None` if the id is unknown.
    pub async fn update_column(
        &self,
        id: i64,
        name: &str,
        position: i64,
    ) -> StoreResult<Option<Column>> {
        let mut tx = self.pool.begin().await?;

        let existing: Option<(i64,)> = sqlx::query_as("SELECT id FROM column WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        if existing.is_none() {
            return Ok(None);
        }

        sqlx::query("UPDATE column SET name = ?, position = ? WHERE id = ?")
            .bind(name)
            .bind(position)
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| constraint_error(e, position, None))?;

        let row: ColumnRow = sqlx::query_as("SELECT id, name, position FROM column WHERE id = ?")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
        let items = items_in(&mut *tx, id).await?;

        tx.commit().await?;

        let mut column = Column::from(row);
        for item in items {
            column.add_item(item);
        }
        Ok(Some(column))
    }

    /// Delete a column and every item it owns, in one transaction. The
    /// schema's foreign key carries no cascade rule, so the cascade is
    /// explicit here. Deleting an unknown id is not an error.
    pub async fn delete_column(&self, id: i64) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM item WHERE column_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM column WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Items of one column, ordered by position. An unknown column yields
    /// an empty sequence.
    pub async fn items(&self, column_id: i64) -> StoreResult<Vec<Item>> {
        items_in(&self.pool, column_id).await
    }

    /// A single item scoped to its column, or `None`.
    pub async fn item(&self, column_id: i64, item_id: i64) -> StoreResult<Option<Item>> {
        let row: Option<ItemRow> = sqlx::query_as(
            "SELECT id, title, date, position, column_id FROM item WHERE column_id = ? AND id = ?",
        )
        .bind(column_id)
        .bind(item_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Item::from))
    }

    /// Insert a new item under `column_id` with a store-assigned
    /// timestamp, read back from the row just inserted.
    pub async fn create_item(
        &self,
        column_id: i64,
        title: &str,
        position: i64,
    ) -> StoreResult<Item> {
        let stamp = now_timestamp();
        let row: ItemRow = sqlx::query_as(
            "INSERT INTO item (title, date, position, column_id) VALUES (?, ?, ?, ?) \
             RETURNING id, title, date, position, column_id",
        )
        .bind(title)
        .bind(&stamp)
        .bind(position)
        .bind(column_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| constraint_error(e, position, Some(column_id)))?;

        Ok(Item::from(row))
    }

    /// Replace title/position of an item scoped to `column_id` and
    /// refresh its timestamp. Existence is checked before the update, in
    /// the same transaction. `None` if no such item under that column.
    pub async fn update_item(
        &self,
        column_id: i64,
        item_id: i64,
        title: &str,
        position: i64,
    ) -> StoreResult<Option<Item>> {
        let mut tx = self.pool.begin().await?;

        let existing: Option<(i64,)> =
            sqlx::query_as("SELECT id FROM item WHERE column_id = ? AND id = ?")
                .bind(column_id)
                .bind(item_id)
                .fetch_optional(&mut *tx)
                .await?;
        if existing.is_none() {
            return Ok(None);
        }

        let stamp = now_timestamp();
        sqlx::query("UPDATE item SET title = ?, position = ?, date = ? WHERE column_id = ? AND id = ?")
            .bind(title)
            .bind(position)
            .bind(&stamp)
            .bind(column_id)
            .bind(item_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| constraint_error(e, position, Some(column_id)))?;

        let row: ItemRow = sqlx::query_as(
            "SELECT id, title, date, position, column_id FROM item WHERE column_id = ? AND id = ?",
        )
        .bind(column_id)
        .bind(item_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(Item::from(row)))
    }

    /// Delete the scoped item. Deleting an unknown id is not an error.
    pub async fn delete_item(&self, column_id: i64, item_id: i64) -> StoreResult<()> {
        sqlx::query("DELETE FROM item WHERE column_id = ? AND id = ?")
            .bind(column_id)
            .bind(item_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

async fn items_in<'e, E>(executor: E, column_id: i64) -> StoreResult<Vec<Item>>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    let rows: Vec<ItemRow> = sqlx::query_as(
        "SELECT id, title, date, position, column_id FROM item \
         WHERE column_id = ? ORDER BY position",
    )
    .bind(column_id)
    .fetch_all(executor)
    .await?;

    Ok(rows.into_iter().map(Item::from).collect())
}

/// RFC 3339, UTC, no trailing newline. Lexicographic order matches
/// chronological order.
fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn constraint_error(err: sqlx::Error, position: i64, column_id: Option<i64>) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        match db.kind() {
            ErrorKind::UniqueViolation => return StoreError::DuplicatePosition(position),
            ErrorKind::ForeignKeyViolation => {
                return StoreError::MissingColumn(column_id.unwrap_or_default());
            }
            _ => {}
        }
    }
    StoreError::Database(err)
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store() -> BoardStore {
        BoardStore::in_memory("kanban").await.unwrap()
    }

    #[tokio::test]
    async fn empty_board_is_not_an_error() {
        let store = store().await;
        let board = store.get_board().await.unwrap();
        assert_eq!(board.title, "kanban");
        assert!(board.columns.is_empty());
    }

    #[tokio::test]
    async fn columns_come_back_ordered_by_position() {
        let store = store().await;
        store.create_column("done", 3).await.unwrap();
        store.create_column("todo", 1).await.unwrap();
        store.create_column("doing", 2).await.unwrap();

        let names: Vec<String> = store
            .columns()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["todo", "doing", "done"]);
    }

    #[tokio::test]
    async fn create_column_returns_store_assigned_id() {
        let store = store().await;
        let column = store.create_column("todo", 5).await.unwrap();

        let fetched = store.column(column.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "todo");
        assert_eq!(fetched.position, 5);
    }

    #[tokio::test]
    async fn duplicate_column_position_is_rejected_and_board_unchanged() {
        let store = store().await;
        store.create_column("todo", 1).await.unwrap();

        let err = store.create_column("sneaky", 1).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicatePosition(1)));

        let columns = store.columns().await.unwrap();
        assert_eq!(columns.len(), 1);
        assert_eq!(columns[0].name, "todo");
    }

    #[tokio::test]
    async fn created_item_carries_generated_timestamp() {
        let store = store().await;
        let column = store.create_column("todo", 1).await.unwrap();

        let item = store.create_item(column.id, "write spec", 1).await.unwrap();
        assert_eq!(item.title, "write spec");
        assert_eq!(item.position, 1);
        assert!(!item.timestamp.is_empty());
        assert!(!item.timestamp.ends_with('\n'));

        let fetched = store.item(column.id, item.id).await.unwrap().unwrap();
        assert_eq!(fetched, item);
    }

    #[tokio::test]
    async fn item_position_is_unique_per_column_not_globally() {
        let store = store().await;
        let todo = store.create_column("todo", 1).await.unwrap();
        let doing = store.create_column("doing", 2).await.unwrap();

        store.create_item(todo.id, "a", 1).await.unwrap();
        // same position, different column: allowed
        store.create_item(doing.id, "b", 1).await.unwrap();

        let err = store.create_item(todo.id, "c", 1).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicatePosition(1)));
    }

    #[tokio::test]
    async fn item_under_unknown_column_is_a_missing_column() {
        let store = store().await;
        let err = store.create_item(99, "orphan", 1).await.unwrap_err();
        assert!(matches!(err, StoreError::MissingColumn(99)));
    }

    #[tokio::test]
    async fn delete_column_cascades_to_items() {
        let store = store().await;
        let column = store.create_column("todo", 1).await.unwrap();
        store.create_item(column.id, "a", 1).await.unwrap();
        store.create_item(column.id, "b", 2).await.unwrap();

        store.delete_column(column.id).await.unwrap();

        assert!(store.column(column.id).await.unwrap().is_none());
        assert!(store.items(column.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let store = store().await;
        store.delete_column(42).await.unwrap();
        store.delete_item(42, 7).await.unwrap();
    }

    #[tokio::test]
    async fn update_column_replaces_fields_and_keeps_items() {
        let store = store().await;
        let column = store.create_column("todo", 1).await.unwrap();
        store.create_item(column.id, "a", 1).await.unwrap();

        let updated = store
            .update_column(column.id, "backlog", 4)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.name, "backlog");
        assert_eq!(updated.position, 4);
        assert_eq!(updated.items.len(), 1);
    }

    #[tokio::test]
    async fn update_column_to_identical_values_is_still_found() {
        let store = store().await;
        let column = store.create_column("todo", 1).await.unwrap();

        let updated = store.update_column(column.id, "todo", 1).await.unwrap();
        assert!(updated.is_some());
    }

    #[tokio::test]
    async fn update_missing_column_is_none_and_mutates_nothing() {
        let store = store().await;
        store.create_column("todo", 1).await.unwrap();
        let before = store.columns().await.unwrap();

        let updated = store.update_column(99, "ghost", 9).await.unwrap();
        assert!(updated.is_none());
        assert_eq!(store.columns().await.unwrap(), before);
    }

    #[tokio::test]
    async fn update_item_refreshes_timestamp() {
        let store = store().await;
        let column = store.create_column("todo", 1).await.unwrap();
        let item = store.create_item(column.id, "a", 1).await.unwrap();

        let updated = store
            .update_item(column.id, item.id, "a, revised", 3)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.title, "a, revised");
        assert_eq!(updated.position, 3);
        assert!(updated.timestamp >= item.timestamp);
    }

    #[tokio::test]
    async fn update_item_is_scoped_to_its_column() {
        let store = store().await;
        let todo = store.create_column("todo", 1).await.unwrap();
        let doing = store.create_column("doing", 2).await.unwrap();
        let item = store.create_item(todo.id, "a", 1).await.unwrap();

        // right id, wrong column: not found
        let updated = store.update_item(doing.id, item.id, "a", 1).await.unwrap();
        assert!(updated.is_none());
    }

    #[tokio::test]
    async fn board_scenario() {
        let store = store().await;
        let todo = store.create_column("todo", 1).await.unwrap();
        store.create_column("doing", 2).await.unwrap();
        store.create_column("done", 3).await.unwrap();
        store.create_item(todo.id, "write spec", 1).await.unwrap();

        let board = store.get_board().await.unwrap();
        let names: Vec<&str> = board.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["todo", "doing", "done"]);
        assert_eq!(board.columns[0].items.len(), 1);
        assert_eq!(board.columns[0].items[0].title, "write spec");
        assert!(board.columns[1].items.is_empty());
        assert!(board.columns[2].items.is_empty());
    }

    #[tokio::test]
    async fn connect_creates_the_storage_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("board.db");

        let store = BoardStore::connect(&path, "kanban").await.unwrap();
        store.create_column("todo", 1).await.unwrap();

        assert!(path.exists());
    }
}
