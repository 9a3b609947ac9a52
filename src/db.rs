use std::path::Path;

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::{Connection, OptionalExtension, Row};
use serde::Serialize;

use crate::error::StoreError;
use crate::parser::classify::ClauseType;

pub type Result<T> = std::result::Result<T, StoreError>;

pub fn connect(path: impl AsRef<Path>) -> Result<Connection> {
    let path = path.as_ref();
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    let conn = Connection::open(path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;
    Ok(conn)
}

pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS clauses (
            id                    INTEGER PRIMARY KEY,
            clause_number         TEXT,
            clause_title          TEXT,
            section_name          TEXT,
            text_original         TEXT NOT NULL,
            text_cleaned          TEXT,
            clause_type           TEXT NOT NULL DEFAULT 'Unknown'
                                  CHECK(clause_type IN ('General Condition','Particular Condition','Unknown')),
            summary               TEXT,
            risk_summary          TEXT,
            time_frames_raw       TEXT,
            time_frames_explained TEXT,
            created_at            TEXT NOT NULL DEFAULT (datetime('now'))
        );
        CREATE INDEX IF NOT EXISTS idx_clauses_type ON clauses(clause_type);
        CREATE INDEX IF NOT EXISTS idx_clauses_number ON clauses(clause_number);
        ",
    )?;
    Ok(())
}

impl ToSql for ClauseType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for ClauseType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

// ── Rows ──

/// An analyzed clause that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClauseRow {
    pub clause_number: Option<String>,
    pub clause_title: Option<String>,
    pub section_name: Option<String>,
    pub text_original: String,
    pub text_cleaned: Option<String>,
    pub clause_type: ClauseType,
    pub summary: Option<String>,
    pub risk_summary: Option<String>,
    pub time_frames_raw: Option<String>,
    pub time_frames_explained: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Clause {
    pub id: i64,
    #[serde(flatten)]
    pub row: ClauseRow,
    pub created_at: String,
}

const CLAUSE_COLUMNS: &str = "id, clause_number, clause_title, section_name, text_original, text_cleaned,
     clause_type, summary, risk_summary, time_frames_raw, time_frames_explained, created_at";

fn clause_from_row(row: &Row<'_>) -> rusqlite::Result<Clause> {
    Ok(Clause {
        id: row.get(0)?,
        row: ClauseRow {
            clause_number: row.get(1)?,
            clause_title: row.get(2)?,
            section_name: row.get(3)?,
            text_original: row.get(4)?,
            text_cleaned: row.get(5)?,
            clause_type: row.get(6)?,
            summary: row.get(7)?,
            risk_summary: row.get(8)?,
            time_frames_raw: row.get(9)?,
            time_frames_explained: row.get(10)?,
        },
        created_at: row.get(11)?,
    })
}

// ── Writes ──

const INSERT_CLAUSE: &str = "INSERT INTO clauses
     (clause_number, clause_title, section_name, text_original, text_cleaned,
      clause_type, summary, risk_summary, time_frames_raw, time_frames_explained)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)";

fn insert_params(r: &ClauseRow) -> [&dyn ToSql; 10] {
    [
        &r.clause_number,
        &r.clause_title,
        &r.section_name,
        &r.text_original,
        &r.text_cleaned,
        &r.clause_type,
        &r.summary,
        &r.risk_summary,
        &r.time_frames_raw,
        &r.time_frames_explained,
    ]
}

pub fn create_clause(conn: &Connection, row: &ClauseRow) -> Result<Clause> {
    conn.execute(INSERT_CLAUSE, insert_params(row).as_slice())?;
    let id = conn.last_insert_rowid();
    get_clause(conn, id)?.ok_or(StoreError::NotFound(id))
}

/// Store one document's clauses in a single transaction; either all rows
/// land or none do.
pub fn save_clauses(conn: &Connection, rows: &[ClauseRow]) -> Result<Vec<Clause>> {
    let tx = conn.unchecked_transaction()?;
    let mut ids = Vec::with_capacity(rows.len());
    {
        let mut stmt = tx.prepare(INSERT_CLAUSE)?;
        for r in rows {
            stmt.execute(insert_params(r).as_slice())?;
            ids.push(tx.last_insert_rowid());
        }
    }
    tx.commit()?;

    ids.into_iter()
        .map(|id| get_clause(conn, id)?.ok_or(StoreError::NotFound(id)))
        .collect()
}

pub fn delete_all(conn: &Connection) -> Result<usize> {
    Ok(conn.execute("DELETE FROM clauses", [])?)
}

// ── Queries ──

pub fn get_clause(conn: &Connection, id: i64) -> Result<Option<Clause>> {
    let sql = format!("SELECT {CLAUSE_COLUMNS} FROM clauses WHERE id = ?1");
    Ok(conn.query_row(&sql, [id], clause_from_row).optional()?)
}

/// All clauses in insertion order, optionally narrowed by type and a
/// substring search. A type filter that names no known type is ignored.
pub fn list_clauses(conn: &Connection, type_filter: Option<&str>, search: Option<&str>) -> Result<Vec<Clause>> {
    let mut sql = format!("SELECT {CLAUSE_COLUMNS} FROM clauses WHERE 1=1");
    let mut params: Vec<Box<dyn ToSql>> = Vec::new();

    if let Some(clause_type) = type_filter.and_then(|t| t.parse::<ClauseType>().ok()) {
        params.push(Box::new(clause_type));
        sql.push_str(&format!(" AND clause_type = ?{}", params.len()));
    }
    if let Some(term) = search.map(str::trim).filter(|s| !s.is_empty()) {
        params.push(Box::new(format!("%{term}%")));
        let n = params.len();
        sql.push_str(&format!(
            " AND (clause_number LIKE ?{n} OR clause_title LIKE ?{n} OR text_original LIKE ?{n}
                   OR summary LIKE ?{n} OR risk_summary LIKE ?{n})"
        ));
    }
    sql.push_str(" ORDER BY id");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(rusqlite::params_from_iter(params.iter()), clause_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Analysis columns that can be listed by presence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisField {
    RiskSummary,
    TimeFramesRaw,
}

impl AnalysisField {
    pub fn column(&self) -> &'static str {
        match self {
            Self::RiskSummary => "risk_summary",
            Self::TimeFramesRaw => "time_frames_raw",
        }
    }
}

/// Clauses whose `field` is present and non-empty.
pub fn list_with_nonempty(conn: &Connection, field: AnalysisField) -> Result<Vec<Clause>> {
    let col = field.column();
    let sql = format!("SELECT {CLAUSE_COLUMNS} FROM clauses WHERE {col} IS NOT NULL AND {col} != '' ORDER BY id");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], clause_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub total: usize,
    pub general: usize,
    pub particular: usize,
    pub unknown: usize,
    pub with_risks: usize,
    pub with_time_frames: usize,
}

pub fn stats(conn: &Connection) -> Result<Stats> {
    let count = |sql: &str| -> Result<usize> {
        let n: i64 = conn.query_row(sql, [], |r| r.get(0))?;
        Ok(n as usize)
    };
    let by_type = |t: ClauseType| -> Result<usize> {
        let n: i64 = conn.query_row("SELECT COUNT(*) FROM clauses WHERE clause_type = ?1", [t], |r| r.get(0))?;
        Ok(n as usize)
    };
    Ok(Stats {
        total: count("SELECT COUNT(*) FROM clauses")?,
        general: by_type(ClauseType::General)?,
        particular: by_type(ClauseType::Particular)?,
        unknown: by_type(ClauseType::Unknown)?,
        with_risks: count("SELECT COUNT(*) FROM clauses WHERE risk_summary IS NOT NULL AND risk_summary != ''")?,
        with_time_frames: count(
            "SELECT COUNT(*) FROM clauses WHERE time_frames_raw IS NOT NULL AND time_frames_raw != ''",
        )?,
    })
}

// ── Tests ──
