//! SQLite-backed favorite store implementation.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::catalog::MediaKind;

use super::{FavoriteError, FavoriteItem, FavoriteStore, NewFavorite, ToggleOutcome};

/// SQLite-backed favorite store.
pub struct SqliteFavoriteStore {
    conn: Mutex<Connection>,
}

impl SqliteFavoriteStore {
    /// Open (or create) the database file and its tables.
    pub fn new(path: &Path) -> Result<Self, FavoriteError> {
        let conn = Connection::open(path).map_err(db_error)?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory() -> Result<Self, FavoriteError> {
        let conn = Connection::open_in_memory().map_err(db_error)?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), FavoriteError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS favorites (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                kind TEXT NOT NULL,
                stream_id INTEGER NOT NULL,
                name TEXT NOT NULL,
                image TEXT,
                added TEXT NOT NULL,
                UNIQUE (kind, stream_id)
            );

            CREATE INDEX IF NOT EXISTS idx_favorites_added ON favorites(added DESC);
            "#,
        )
        .map_err(db_error)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, FavoriteError> {
        self.conn
            .lock()
            .map_err(|_| FavoriteError::Database("connection lock poisoned".to_string()))
    }

    fn row_to_favorite(row: &rusqlite::Row) -> rusqlite::Result<FavoriteItem> {
        let kind_str: String = row.get(0)?;
        let stream_id: i64 = row.get(1)?;
        let name: String = row.get(2)?;
        let image: Option<String> = row.get(3)?;
        let added_str: String = row.get(4)?;

        let kind = kind_str.parse::<MediaKind>().map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                0,
                rusqlite::types::Type::Text,
                e.into(),
            )
        })?;
        let added = DateTime::parse_from_rfc3339(&added_str)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    4,
                    rusqlite::types::Type::Text,
                    Box::new(e),
                )
            })?;

        Ok(FavoriteItem {
            kind,
            stream_id: stream_id as u64,
            name,
            image,
            added,
        })
    }
}

fn db_error(e: rusqlite::Error) -> FavoriteError {
    FavoriteError::Database(e.to_string())
}

impl FavoriteStore for SqliteFavoriteStore {
    fn toggle(&self, favorite: NewFavorite) -> Result<ToggleOutcome, FavoriteError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction().map_err(db_error)?;

        let removed = tx
            .execute(
                "DELETE FROM favorites WHERE kind = ?1 AND stream_id = ?2",
                params![favorite.kind.as_str(), favorite.stream_id as i64],
            )
            .map_err(db_error)?;

        let outcome = if removed > 0 {
            ToggleOutcome::Removed
        } else {
            let added = Utc::now();
            tx.execute(
                "INSERT INTO favorites (kind, stream_id, name, image, added) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    favorite.kind.as_str(),
                    favorite.stream_id as i64,
                    favorite.name,
                    favorite.image,
                    added.to_rfc3339(),
                ],
            )
            .map_err(db_error)?;
            ToggleOutcome::Added {
                favorite: FavoriteItem {
                    kind: favorite.kind,
                    stream_id: favorite.stream_id,
                    name: favorite.name,
                    image: favorite.image,
                    added,
                },
            }
        };

        tx.commit().map_err(db_error)?;
        Ok(outcome)
    }

    fn list(&self) -> Result<Vec<FavoriteItem>, FavoriteError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(
                "SELECT kind, stream_id, name, image, added FROM favorites ORDER BY added DESC, id DESC",
            )
            .map_err(db_error)?;

        let favorites = stmt
            .query_map([], Self::row_to_favorite)
            .map_err(db_error)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(db_error)?;
        Ok(favorites)
    }

    fn is_favorite(&self, kind: MediaKind, stream_id: u64) -> Result<bool, FavoriteError> {
        let conn = self.conn()?;
        let found: Option<i64> = conn
            .query_row(
                "SELECT 1 FROM favorites WHERE kind = ?1 AND stream_id = ?2",
                params![kind.as_str(), stream_id as i64],
                |row| row.get(0),
            )
            .optional()
            .map_err(db_error)?;
        Ok(found.is_some())
    }

    fn remove(&self, kind: MediaKind, stream_id: u64) -> Result<(), FavoriteError> {
        let conn = self.conn()?;
        let removed = conn
            .execute(
                "DELETE FROM favorites WHERE kind = ?1 AND stream_id = ?2",
                params![kind.as_str(), stream_id as i64],
            )
            .map_err(db_error)?;

        if removed == 0 {
            return Err(FavoriteError::NotFound {
                kind: kind.as_str().to_string(),
                stream_id,
            });
        }
        Ok(())
    }
}
