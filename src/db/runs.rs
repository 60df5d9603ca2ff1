use crate::db::connection::Database;
use crate::errors::ServerError;
use rusqlite::params;

#[derive(Debug, Clone, PartialEq)]
pub struct CollectRun {
    pub id: i64,
    pub town: String,
    pub started_at: i64,
    pub finished_at: Option<i64>,
    pub restaurants_found: Option<i64>,
    pub success: bool,
    pub error_message: Option<String>,
}

pub fn start_collect_run(db: &Database, town: &str, now: i64) -> Result<i64, ServerError> {
    db.with_conn(|conn| {
        conn.execute(
            "INSERT INTO collect_runs (town, started_at, success) VALUES (?, ?, 0)",
            params![town, now],
        )
        .map_err(|e| ServerError::DbError(e.to_string()))?;
        Ok(conn.last_insert_rowid())
    })
}

pub fn end_collect_run(
    db: &Database,
    run_id: i64,
    now: i64,
    found: usize,
    success: bool,
    error: Option<String>,
) -> Result<(), ServerError> {
    let found = i64::try_from(found).unwrap_or(i64::MAX);
    db.with_conn(|conn| {
        conn.execute(
            "UPDATE collect_runs SET finished_at = ?, restaurants_found = ?, success = ?, error_message = ? WHERE id = ?",
            params![now, found, success, error, run_id],
        )
        .map_err(|e| ServerError::DbError(e.to_string()))?;
        Ok(())
    })
}

pub fn get_recent_runs(db: &Database, limit: usize) -> Result<Vec<CollectRun>, ServerError> {
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    db.with_conn(|conn| {
        let mut stmt = conn
            .prepare("SELECT id, town, started_at, finished_at, restaurants_found, success, error_message FROM collect_runs ORDER BY started_at DESC, id DESC LIMIT ?")
            .map_err(|e| ServerError::DbError(e.to_string()))?;

        let rows = stmt
            .query_map(params![limit], |row| {
                Ok(CollectRun {
                    id: row.get(0)?,
                    town: row.get(1)?,
                    started_at: row.get(2)?,
                    finished_at: row.get(3)?,
                    restaurants_found: row.get(4)?,
                    success: row.get(5)?,
                    error_message: row.get(6)?,
                })
            })
            .map_err(|e| ServerError::DbError(e.to_string()))?;

        let mut runs = Vec::new();
        for r in rows {
            runs.push(r.map_err(|e| ServerError::DbError(e.to_string()))?);
        }
        Ok(runs)
    })
}
