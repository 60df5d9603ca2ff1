// src/db/mapping.rs
use crate::errors::ServerError;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};
use std::collections::HashSet;

/// A struct field and the column it is stored in.
#[derive(Debug, Clone, Copy)]
pub struct ColumnMapping {
    pub field: &'static str,
    pub column: &'static str,
}

/// Declared mapping between a persisted type and its table.
#[derive(Debug, Clone, Copy)]
pub struct TableMapping {
    pub table: &'static str,
    pub primary_key: &'static [&'static str],
    pub columns: &'static [ColumnMapping],
}

impl TableMapping {
    /// Checks the mapping against the live table: every mapped column must
    /// exist, every primary key column must be mapped, and the table's own
    /// primary key must be the declared one.
    pub fn validate(&self, conn: &Connection) -> Result<(), ServerError> {
        let mut stmt = conn
            .prepare(&format!("PRAGMA table_info({})", self.table))
            .map_err(|e| ServerError::DbError(e.to_string()))?;

        // (name, pk position); pk is 0 for non-key columns
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(1)?, row.get::<_, i64>(5)?)))
            .map_err(|e| ServerError::DbError(e.to_string()))?;

        let mut existing = HashSet::new();
        let mut table_pk = Vec::new();
        for r in rows {
            let (name, pk) = r.map_err(|e| ServerError::DbError(e.to_string()))?;
            if pk > 0 {
                table_pk.push((pk, name.clone()));
            }
            existing.insert(name);
        }

        if existing.is_empty() {
            return Err(ServerError::DbError(format!(
                "table '{}' does not exist",
                self.table
            )));
        }

        for mapping in self.columns {
            if !existing.contains(mapping.column) {
                return Err(ServerError::DbError(format!(
                    "could not map field '{}' to table '{}': column '{}' not found",
                    mapping.field, self.table, mapping.column
                )));
            }
        }

        for key in self.primary_key {
            if !self.columns.iter().any(|c| c.column == *key) {
                return Err(ServerError::DbError(format!(
                    "primary key column '{key}' of '{}' is not mapped",
                    self.table
                )));
            }
        }

        table_pk.sort();
        let table_pk: Vec<&str> = table_pk.iter().map(|(_, name)| name.as_str()).collect();
        if table_pk != self.primary_key {
            return Err(ServerError::DbError(format!(
                "table '{}' has primary key {:?}, mapping declares {:?}",
                self.table, table_pk, self.primary_key
            )));
        }

        Ok(())
    }

    pub fn column_names(&self) -> Vec<&'static str> {
        self.columns.iter().map(|c| c.column).collect()
    }

    /// `INSERT ... ON CONFLICT(pk) DO UPDATE SET col = excluded.col` for every
    /// non-key column.
    pub fn upsert_sql(&self) -> String {
        let columns = self.column_names();
        let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{i}")).collect();

        let updates: Vec<String> = columns
            .iter()
            .filter(|c| !self.primary_key.contains(c))
            .map(|c| format!("{c} = excluded.{c}"))
            .collect();

        let conflict = if updates.is_empty() {
            "DO NOTHING".to_string()
        } else {
            format!("DO UPDATE SET {}", updates.join(", "))
        };

        format!(
            "INSERT INTO {} ({}) VALUES ({}) ON CONFLICT({}) {}",
            self.table,
            columns.join(", "),
            placeholders.join(", "),
            self.primary_key.join(", "),
            conflict
        )
    }
}

/// A row type with a declared table mapping.
pub trait Persisted {
    const MAPPING: TableMapping;

    /// Values in the order of `MAPPING.columns`.
    fn field_values(&self) -> Vec<Value>;
}

/// Upserts `rows` with the statement generated from `T::MAPPING`.
/// Callers own the transaction.
pub fn upsert<T: Persisted>(conn: &Connection, rows: &[T]) -> Result<usize, ServerError> {
    if rows.is_empty() {
        return Ok(0);
    }

    let mut stmt = conn
        .prepare_cached(&T::MAPPING.upsert_sql())
        .map_err(|e| ServerError::DbError(e.to_string()))?;

    let mut written = 0;
    for row in rows {
        let values = row.field_values();
        if values.len() != T::MAPPING.columns.len() {
            return Err(ServerError::DbError(format!(
                "row for '{}' has {} values, mapping has {} columns",
                T::MAPPING.table,
                values.len(),
                T::MAPPING.columns.len()
            )));
        }
        written += stmt
            .execute(params_from_iter(values.iter()))
            .map_err(|e| ServerError::DbError(e.to_string()))?;
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Note {
        slug: String,
        body: Option<String>,
        stars: i64,
    }

    impl Persisted for Note {
        const MAPPING: TableMapping = TableMapping {
            table: "notes",
            primary_key: &["slug"],
            columns: &[
                ColumnMapping { field: "slug", column: "slug" },
                ColumnMapping { field: "body", column: "text" },
                ColumnMapping { field: "stars", column: "stars" },
            ],
        };

        fn field_values(&self) -> Vec<Value> {
            vec![
                Value::Text(self.slug.clone()),
                self.body.clone().map(Value::Text).unwrap_or(Value::Null),
                Value::Integer(self.stars),
            ]
        }
    }

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE notes (slug TEXT PRIMARY KEY, text TEXT, stars INTEGER NOT NULL);",
        )
        .unwrap();
        conn
    }

    #[test]
    fn generated_upsert_updates_non_key_columns() {
        assert_eq!(
            Note::MAPPING.upsert_sql(),
            "INSERT INTO notes (slug, text, stars) VALUES (?1, ?2, ?3) \
             ON CONFLICT(slug) DO UPDATE SET text = excluded.text, stars = excluded.stars"
        );
    }

    #[test]
    fn upsert_inserts_then_updates() {
        let conn = conn();
        Note::MAPPING.validate(&conn).unwrap();

        let first = Note { slug: "a".into(), body: None, stars: 1 };
        let second = Note { slug: "a".into(), body: Some("hi".into()), stars: 5 };
        upsert(&conn, &[first]).unwrap();
        upsert(&conn, &[second]).unwrap();

        let (count, text, stars): (i64, Option<String>, i64) = conn
            .query_row("SELECT COUNT(*), MAX(text), MAX(stars) FROM notes", [], |r| {
                Ok((r.get(0)?, r.get(1)?, r.get(2)?))
            })
            .unwrap();
        assert_eq!((count, text.as_deref(), stars), (1, Some("hi"), 5));
    }

    #[test]
    fn missing_column_fails_validation() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE notes (slug TEXT PRIMARY KEY, stars INTEGER);")
            .unwrap();
        let err = Note::MAPPING.validate(&conn).unwrap_err();
        assert!(matches!(err, ServerError::DbError(msg) if msg.contains("'text' not found")));
    }

    #[test]
    fn missing_table_fails_validation() {
        let conn = Connection::open_in_memory().unwrap();
        assert!(Note::MAPPING.validate(&conn).is_err());
    }

    #[test]
    fn primary_key_mismatch_fails_validation() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE notes (id INTEGER PRIMARY KEY, slug TEXT, text TEXT, stars INTEGER);",
        )
        .unwrap();
        assert!(Note::MAPPING.validate(&conn).is_err());
    }
}
