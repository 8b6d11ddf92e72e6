//! Integrity engine shared by every corpus mutation.
//!
//! # Responsibility
//! - Parent-existence and sibling-uniqueness checks for the create paths.
//! - Depth-first post-order cascade deletion for the delete paths.
//! - Mapping of SQL unique-constraint races to `DuplicateKey`.
//!
//! # Invariants
//! - Helpers operate on `&Connection` so the same checks run inside a
//!   repository's own immediate transaction or inside a caller-owned batch
//!   transaction (`Transaction` derefs to `Connection`).
//! - A cascade either removes the full subtree or, on any internal fault,
//!   none of it; the fault surfaces as `CascadeAborted` wrapping the cause.

use crate::model::ayah::AyahId;
use crate::model::surah::SurahId;
use crate::model::word::WordId;
use crate::repo::{EntityRef, RepoError, RepoResult};
use rusqlite::Connection;

pub(crate) fn surah_exists(conn: &Connection, id: SurahId) -> RepoResult<bool> {
    row_exists(conn, "SELECT EXISTS(SELECT 1 FROM surahs WHERE id = ?1);", id.raw())
}

pub(crate) fn ayah_exists(conn: &Connection, id: AyahId) -> RepoResult<bool> {
    row_exists(conn, "SELECT EXISTS(SELECT 1 FROM ayahs WHERE id = ?1);", id.raw())
}

pub(crate) fn word_exists(conn: &Connection, id: WordId) -> RepoResult<bool> {
    row_exists(conn, "SELECT EXISTS(SELECT 1 FROM words WHERE id = ?1);", id.raw())
}

/// Fails with `ParentNotFound` when the owning surah is absent.
pub(crate) fn ensure_surah_parent(conn: &Connection, id: SurahId) -> RepoResult<()> {
    if surah_exists(conn, id)? {
        Ok(())
    } else {
        Err(RepoError::ParentNotFound(EntityRef::Surah(id)))
    }
}

/// Fails with `ParentNotFound` when the owning ayah is absent.
pub(crate) fn ensure_ayah_parent(conn: &Connection, id: AyahId) -> RepoResult<()> {
    if ayah_exists(conn, id)? {
        Ok(())
    } else {
        Err(RepoError::ParentNotFound(EntityRef::Ayah(id)))
    }
}

/// Fails with `ParentNotFound` when the owning word is absent.
pub(crate) fn ensure_word_parent(conn: &Connection, id: WordId) -> RepoResult<()> {
    if word_exists(conn, id)? {
        Ok(())
    } else {
        Err(RepoError::ParentNotFound(EntityRef::Word(id)))
    }
}

/// Fails with `DuplicateKey` when `surah_number` is already taken.
pub(crate) fn ensure_unique_surah_number(conn: &Connection, number: u32) -> RepoResult<()> {
    let taken: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM surahs WHERE surah_number = ?1);",
        [number],
        |row| row.get(0),
    )?;
    if taken == 1 {
        return Err(RepoError::DuplicateKey {
            entity: "surahs",
            key: format!("surah_number={number}"),
        });
    }
    Ok(())
}

/// Fails with `DuplicateKey` when `(surah_id, ayah_number)` is already taken.
pub(crate) fn ensure_unique_ayah_key(
    conn: &Connection,
    surah_id: SurahId,
    ayah_number: u32,
) -> RepoResult<()> {
    let taken: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1 FROM ayahs WHERE surah_id = ?1 AND ayah_number = ?2
        );",
        rusqlite::params![surah_id.raw(), ayah_number],
        |row| row.get(0),
    )?;
    if taken == 1 {
        return Err(RepoError::DuplicateKey {
            entity: "ayahs",
            key: format!("surah_id={surah_id}, ayah_number={ayah_number}"),
        });
    }
    Ok(())
}

/// Fails with `DuplicateKey` when `(ayah_id, word_position)` is already taken.
pub(crate) fn ensure_unique_word_key(
    conn: &Connection,
    ayah_id: AyahId,
    word_position: u32,
) -> RepoResult<()> {
    let taken: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1 FROM words WHERE ayah_id = ?1 AND word_position = ?2
        );",
        rusqlite::params![ayah_id.raw(), word_position],
        |row| row.get(0),
    )?;
    if taken == 1 {
        return Err(RepoError::DuplicateKey {
            entity: "words",
            key: format!("ayah_id={ayah_id}, word_position={word_position}"),
        });
    }
    Ok(())
}

/// Fails with `DuplicateKey` when `(word_id, letter_position)` is taken.
pub(crate) fn ensure_unique_letter_key(
    conn: &Connection,
    word_id: WordId,
    letter_position: u32,
) -> RepoResult<()> {
    let taken: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1 FROM letter_annotations
            WHERE word_id = ?1 AND letter_position = ?2
        );",
        rusqlite::params![word_id.raw(), letter_position],
        |row| row.get(0),
    )?;
    if taken == 1 {
        return Err(RepoError::DuplicateKey {
            entity: "letter_annotations",
            key: format!("word_id={word_id}, letter_position={letter_position}"),
        });
    }
    Ok(())
}

/// Maps a lost unique-constraint race on INSERT to `DuplicateKey`.
///
/// The explicit sibling checks above run first; this catches a concurrent
/// writer that slipped in between check and insert.
pub(crate) fn map_unique_violation(
    err: rusqlite::Error,
    entity: &'static str,
    key: String,
) -> RepoError {
    match &err {
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            RepoError::DuplicateKey { entity, key }
        }
        _ => err.into(),
    }
}

/// Removes a surah subtree depth-first: letters, words, translations, ayahs,
/// then the surah row itself.
pub(crate) fn delete_surah_subtree(conn: &Connection, id: SurahId) -> RepoResult<()> {
    let target = EntityRef::Surah(id);
    run_cascade(target, || {
        conn.execute(
            "DELETE FROM letter_annotations
             WHERE word_id IN (
                SELECT w.id
                FROM words w
                INNER JOIN ayahs a ON a.id = w.ayah_id
                WHERE a.surah_id = ?1
             );",
            [id.raw()],
        )?;
        conn.execute(
            "DELETE FROM words
             WHERE ayah_id IN (SELECT id FROM ayahs WHERE surah_id = ?1);",
            [id.raw()],
        )?;
        conn.execute(
            "DELETE FROM ayah_translations
             WHERE ayah_id IN (SELECT id FROM ayahs WHERE surah_id = ?1);",
            [id.raw()],
        )?;
        conn.execute("DELETE FROM ayahs WHERE surah_id = ?1;", [id.raw()])?;
        conn.execute("DELETE FROM surahs WHERE id = ?1;", [id.raw()])?;
        Ok(())
    })
}

/// Removes an ayah subtree depth-first: letters, words, translations, then
/// the ayah row itself.
pub(crate) fn delete_ayah_subtree(conn: &Connection, id: AyahId) -> RepoResult<()> {
    let target = EntityRef::Ayah(id);
    run_cascade(target, || {
        conn.execute(
            "DELETE FROM letter_annotations
             WHERE word_id IN (SELECT id FROM words WHERE ayah_id = ?1);",
            [id.raw()],
        )?;
        conn.execute("DELETE FROM words WHERE ayah_id = ?1;", [id.raw()])?;
        conn.execute(
            "DELETE FROM ayah_translations WHERE ayah_id = ?1;",
            [id.raw()],
        )?;
        conn.execute("DELETE FROM ayahs WHERE id = ?1;", [id.raw()])?;
        Ok(())
    })
}

/// Removes a word and its letter annotations.
pub(crate) fn delete_word_subtree(conn: &Connection, id: WordId) -> RepoResult<()> {
    let target = EntityRef::Word(id);
    run_cascade(target, || {
        conn.execute(
            "DELETE FROM letter_annotations WHERE word_id = ?1;",
            [id.raw()],
        )?;
        conn.execute("DELETE FROM words WHERE id = ?1;", [id.raw()])?;
        Ok(())
    })
}

/// Wraps a commit failure at the end of a cascade as `CascadeAborted`.
pub(crate) fn cascade_aborted(target: EntityRef, err: rusqlite::Error) -> RepoError {
    RepoError::CascadeAborted {
        target,
        cause: Box::new(err.into()),
    }
}

fn run_cascade(
    target: EntityRef,
    cascade: impl FnOnce() -> Result<(), rusqlite::Error>,
) -> RepoResult<()> {
    cascade().map_err(|err| cascade_aborted(target, err))
}

fn row_exists(conn: &Connection, sql: &str, id: i64) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(sql, [id], |row| row.get(0))?;
    Ok(exists == 1)
}
