//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts for the four corpus
//!   entity kinds.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Every mutation passes through the integrity checks in [`integrity`]:
//!   parent existence, sibling-key uniqueness, attribute validity, in that
//!   order.
//! - Cascade deletes are atomic; a fault mid-cascade surfaces as
//!   `CascadeAborted` and rolls the whole subtree removal back.
//! - Repository APIs return semantic errors (`NotFound`, `DuplicateKey`) in
//!   addition to DB transport errors.

use crate::db::DbError;
use crate::model::ayah::AyahId;
use crate::model::letter::AnnotationId;
use crate::model::surah::SurahId;
use crate::model::word::WordId;
use crate::model::AttributeError;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod ayah_repo;
pub mod integrity;
pub mod letter_repo;
pub mod surah_repo;
pub mod word_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Typed reference to one entity of any kind, used in error payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityRef {
    Surah(SurahId),
    Ayah(AyahId),
    Word(WordId),
    Letter(AnnotationId),
}

impl Display for EntityRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Surah(id) => write!(f, "surah {id}"),
            Self::Ayah(id) => write!(f, "ayah {id}"),
            Self::Word(id) => write!(f, "word {id}"),
            Self::Letter(id) => write!(f, "letter annotation {id}"),
        }
    }
}

/// Errors from corpus repository operations.
#[derive(Debug)]
pub enum RepoError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Required attribute missing or malformed.
    InvalidAttribute(AttributeError),
    /// Referenced owner does not exist.
    ParentNotFound(EntityRef),
    /// Composite sibling key already taken.
    DuplicateKey {
        entity: &'static str,
        key: String,
    },
    /// Operation targets a nonexistent id.
    NotFound(EntityRef),
    /// A fault interrupted a multi-entity delete; the subtree was rolled
    /// back to its pre-delete state.
    CascadeAborted {
        target: EntityRef,
        cause: Box<RepoError>,
    },
    /// Persisted data cannot be converted to a valid read model.
    InvalidData(String),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Required column is missing from expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidAttribute(err) => write!(f, "{err}"),
            Self::ParentNotFound(parent) => write!(f, "parent not found: {parent}"),
            Self::DuplicateKey { entity, key } => {
                write!(f, "duplicate key in {entity}: {key}")
            }
            Self::NotFound(entity) => write!(f, "not found: {entity}"),
            Self::CascadeAborted { target, cause } => {
                write!(f, "cascade delete of {target} aborted: {cause}")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted corpus data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "corpus repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "corpus repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "corpus repository requires column `{column}` in table `{table}`"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::InvalidAttribute(err) => Some(err),
            Self::CascadeAborted { cause, .. } => Some(cause.as_ref()),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<AttributeError> for RepoError {
    fn from(value: AttributeError) -> Self {
        Self::InvalidAttribute(value)
    }
}

/// Table/column requirements checked by `try_new` on each repository.
pub(crate) struct TableSpec {
    pub(crate) table: &'static str,
    pub(crate) columns: &'static [&'static str],
}

pub(crate) fn ensure_connection_ready(
    conn: &Connection,
    specs: &[TableSpec],
) -> RepoResult<()> {
    let expected_version = crate::db::migrations::latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for spec in specs {
        if !table_exists(conn, spec.table)? {
            return Err(RepoError::MissingRequiredTable(spec.table));
        }
        for column in spec.columns {
            if !table_has_column(conn, spec.table, column)? {
                return Err(RepoError::MissingRequiredColumn {
                    table: spec.table,
                    column,
                });
            }
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
