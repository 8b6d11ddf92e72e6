//! Surah repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - CRUD over the `surahs` table plus keyed lookup by chapter number.
//! - Cascade deletion of a chapter's whole subtree.
//!
//! # Invariants
//! - `surah_number` is globally unique; duplicates fail with `DuplicateKey`
//!   and leave the store unchanged.
//! - `update_surah` never changes `surah_number`; an attempt is rejected as
//!   `InvalidAttribute` before any SQL mutation.
//! - `delete_surah` is a single atomic cascade over ayahs, words, letter
//!   annotations and translations.

use crate::model::surah::{NewSurah, RevelationPlace, Surah, SurahId};
use crate::model::AttributeError;
use crate::repo::integrity::{
    cascade_aborted, delete_surah_subtree, ensure_unique_surah_number, map_unique_violation,
    surah_exists,
};
use crate::repo::{
    ensure_connection_ready, EntityRef, RepoError, RepoResult, TableSpec,
};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};

const SURAH_SELECT_SQL: &str = "SELECT
    id,
    surah_number,
    name_arabic,
    name_english,
    name_transliteration,
    revelation_place,
    total_ayahs,
    created_at,
    updated_at
FROM surahs";

const REQUIRED_TABLES: &[TableSpec] = &[TableSpec {
    table: "surahs",
    columns: &[
        "id",
        "surah_number",
        "name_arabic",
        "name_english",
        "name_transliteration",
        "revelation_place",
        "total_ayahs",
        "created_at",
        "updated_at",
    ],
}];

/// Repository interface for surah operations.
pub trait SurahRepository {
    /// Creates one chapter; fails with `DuplicateKey` on a taken number.
    fn create_surah(&self, draft: &NewSurah) -> RepoResult<SurahId>;
    /// Loads one chapter by id.
    fn get_surah(&self, id: SurahId) -> RepoResult<Option<Surah>>;
    /// Keyed lookup by canonical chapter number.
    fn find_by_number(&self, surah_number: u32) -> RepoResult<Option<Surah>>;
    /// Lists all chapters ordered by `surah_number`.
    fn list_surahs(&self) -> RepoResult<Vec<Surah>>;
    /// Updates non-key attributes of one chapter.
    fn update_surah(&self, surah: &Surah) -> RepoResult<()>;
    /// Deletes one chapter and its whole subtree atomically.
    fn delete_surah(&self, id: SurahId) -> RepoResult<()>;
}

/// SQLite-backed surah repository.
pub struct SqliteSurahRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSurahRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, REQUIRED_TABLES)?;
        Ok(Self { conn })
    }
}

impl SurahRepository for SqliteSurahRepository<'_> {
    fn create_surah(&self, draft: &NewSurah) -> RepoResult<SurahId> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let id = insert_surah(&tx, draft)?;
        tx.commit()?;
        Ok(id)
    }

    fn get_surah(&self, id: SurahId) -> RepoResult<Option<Surah>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SURAH_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.raw()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_surah_row(row)?));
        }
        Ok(None)
    }

    fn find_by_number(&self, surah_number: u32) -> RepoResult<Option<Surah>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SURAH_SELECT_SQL} WHERE surah_number = ?1;"))?;
        let mut rows = stmt.query([surah_number])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_surah_row(row)?));
        }
        Ok(None)
    }

    fn list_surahs(&self) -> RepoResult<Vec<Surah>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SURAH_SELECT_SQL} ORDER BY surah_number ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut surahs = Vec::new();
        while let Some(row) = rows.next()? {
            surahs.push(parse_surah_row(row)?);
        }
        Ok(surahs)
    }

    fn update_surah(&self, surah: &Surah) -> RepoResult<()> {
        surah.validate()?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let stored_number: Option<u32> = tx
            .query_row(
                "SELECT surah_number FROM surahs WHERE id = ?1;",
                [surah.id.raw()],
                |row| row.get(0),
            )
            .optional()?;

        let stored_number =
            stored_number.ok_or(RepoError::NotFound(EntityRef::Surah(surah.id)))?;
        if stored_number != surah.surah_number {
            return Err(AttributeError::IdentityChanged {
                entity: "surah",
                field: "surah_number",
            }
            .into());
        }

        tx.execute(
            "UPDATE surahs
             SET name_arabic = ?2,
                 name_english = ?3,
                 name_transliteration = ?4,
                 revelation_place = ?5,
                 total_ayahs = ?6,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![
                surah.id.raw(),
                surah.name_arabic.as_str(),
                surah.name_english.as_deref(),
                surah.name_transliteration.as_deref(),
                surah.revelation_place.map(revelation_place_to_db),
                surah.total_ayahs,
            ],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn delete_surah(&self, id: SurahId) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        if !surah_exists(&tx, id)? {
            return Err(RepoError::NotFound(EntityRef::Surah(id)));
        }
        delete_surah_subtree(&tx, id)?;
        tx.commit()
            .map_err(|err| cascade_aborted(EntityRef::Surah(id), err))?;
        Ok(())
    }
}

/// Inserts one surah row after uniqueness and attribute checks.
///
/// Runs against a caller-owned connection or transaction so bulk loads can
/// reuse the same integrity path.
pub(crate) fn insert_surah(conn: &Connection, draft: &NewSurah) -> RepoResult<SurahId> {
    ensure_unique_surah_number(conn, draft.surah_number)?;
    draft.validate()?;

    conn.execute(
        "INSERT INTO surahs (
            surah_number,
            name_arabic,
            name_english,
            name_transliteration,
            revelation_place,
            total_ayahs
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
        params![
            draft.surah_number,
            draft.name_arabic.as_str(),
            draft.name_english.as_deref(),
            draft.name_transliteration.as_deref(),
            draft.revelation_place.map(revelation_place_to_db),
            draft.total_ayahs,
        ],
    )
    .map_err(|err| {
        map_unique_violation(
            err,
            "surahs",
            format!("surah_number={}", draft.surah_number),
        )
    })?;

    Ok(SurahId::from_raw(conn.last_insert_rowid()))
}

fn parse_surah_row(row: &Row<'_>) -> RepoResult<Surah> {
    let revelation_place = match row.get::<_, Option<String>>("revelation_place")? {
        Some(value) => Some(parse_revelation_place(&value).ok_or_else(|| {
            RepoError::InvalidData(format!(
                "invalid revelation place `{value}` in surahs.revelation_place"
            ))
        })?),
        None => None,
    };

    Ok(Surah {
        id: SurahId::from_raw(row.get("id")?),
        surah_number: row.get("surah_number")?,
        name_arabic: row.get("name_arabic")?,
        name_english: row.get("name_english")?,
        name_transliteration: row.get("name_transliteration")?,
        revelation_place,
        total_ayahs: row.get("total_ayahs")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn revelation_place_to_db(place: RevelationPlace) -> &'static str {
    match place {
        RevelationPlace::Makkah => "Makkah",
        RevelationPlace::Madinah => "Madinah",
    }
}

fn parse_revelation_place(value: &str) -> Option<RevelationPlace> {
    match value {
        "Makkah" => Some(RevelationPlace::Makkah),
        "Madinah" => Some(RevelationPlace::Madinah),
        _ => None,
    }
}
