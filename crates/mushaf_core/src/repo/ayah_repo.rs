//! Ayah repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - CRUD over the `ayahs` table plus keyed lookup by `(surah, ayah_number)`
//!   and secondary lookup by juz/page partition.
//! - Atomic whole-set replacement of an ayah's translations.
//!
//! # Invariants
//! - `(surah_id, ayah_number)` is unique per surah; the same `ayah_number`
//!   may recur across surahs.
//! - `list_by_surah` is deterministic: `ayah_number ASC`. Juz/page listings
//!   order by `surah_id ASC, ayah_number ASC`.
//! - Translation replacement is a single transaction; readers never observe
//!   a partially replaced set.

use crate::model::ayah::{validate_lang_code, Ayah, AyahId, NewAyah};
use crate::model::surah::SurahId;
use crate::model::AttributeError;
use crate::repo::integrity::{
    ayah_exists, cascade_aborted, delete_ayah_subtree, ensure_surah_parent,
    ensure_unique_ayah_key, map_unique_violation,
};
use crate::repo::{
    ensure_connection_ready, EntityRef, RepoError, RepoResult, TableSpec,
};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use std::collections::BTreeMap;

const AYAH_SELECT_SQL: &str = "SELECT
    id,
    surah_id,
    ayah_number,
    text_uthmani,
    text_simple,
    text_imlaei,
    juz_number,
    page_number,
    created_at,
    updated_at
FROM ayahs";

const REQUIRED_TABLES: &[TableSpec] = &[
    TableSpec {
        table: "ayahs",
        columns: &[
            "id",
            "surah_id",
            "ayah_number",
            "text_uthmani",
            "text_simple",
            "text_imlaei",
            "juz_number",
            "page_number",
            "created_at",
            "updated_at",
        ],
    },
    TableSpec {
        table: "ayah_translations",
        columns: &["id", "ayah_id", "lang_code", "translated_text"],
    },
];

/// Repository interface for ayah operations.
pub trait AyahRepository {
    /// Creates one verse under an existing surah.
    fn create_ayah(&self, draft: &NewAyah) -> RepoResult<AyahId>;
    /// Loads one verse by id, including its translation set.
    fn get_ayah(&self, id: AyahId) -> RepoResult<Option<Ayah>>;
    /// Keyed lookup by `(surah, ayah_number)`.
    fn find_by_number(&self, surah_id: SurahId, ayah_number: u32) -> RepoResult<Option<Ayah>>;
    /// Lists verses of one surah ordered by `ayah_number`.
    fn list_by_surah(&self, surah_id: SurahId) -> RepoResult<Vec<Ayah>>;
    /// Lists verses tagged with one juz partition number.
    fn list_by_juz(&self, juz_number: u32) -> RepoResult<Vec<Ayah>>;
    /// Lists verses tagged with one page partition number.
    fn list_by_page(&self, page_number: u32) -> RepoResult<Vec<Ayah>>;
    /// Updates non-key attributes of one verse.
    fn update_ayah(&self, ayah: &Ayah) -> RepoResult<()>;
    /// Replaces the whole translation set of one verse atomically.
    fn set_translations(
        &self,
        id: AyahId,
        translations: &BTreeMap<String, String>,
    ) -> RepoResult<()>;
    /// Deletes one verse and its words/annotations atomically.
    fn delete_ayah(&self, id: AyahId) -> RepoResult<()>;
}

/// SQLite-backed ayah repository.
pub struct SqliteAyahRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAyahRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, REQUIRED_TABLES)?;
        Ok(Self { conn })
    }
}

impl AyahRepository for SqliteAyahRepository<'_> {
    fn create_ayah(&self, draft: &NewAyah) -> RepoResult<AyahId> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let id = insert_ayah(&tx, draft)?;
        tx.commit()?;
        Ok(id)
    }

    fn get_ayah(&self, id: AyahId) -> RepoResult<Option<Ayah>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{AYAH_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.raw()])?;
        if let Some(row) = rows.next()? {
            let ayah = parse_ayah_row(self.conn, row)?;
            return Ok(Some(ayah));
        }
        Ok(None)
    }

    fn find_by_number(&self, surah_id: SurahId, ayah_number: u32) -> RepoResult<Option<Ayah>> {
        let mut stmt = self.conn.prepare(&format!(
            "{AYAH_SELECT_SQL} WHERE surah_id = ?1 AND ayah_number = ?2;"
        ))?;
        let mut rows = stmt.query(params![surah_id.raw(), ayah_number])?;
        if let Some(row) = rows.next()? {
            let ayah = parse_ayah_row(self.conn, row)?;
            return Ok(Some(ayah));
        }
        Ok(None)
    }

    fn list_by_surah(&self, surah_id: SurahId) -> RepoResult<Vec<Ayah>> {
        ensure_surah_parent(self.conn, surah_id)?;
        self.collect_ayahs(
            &format!("{AYAH_SELECT_SQL} WHERE surah_id = ?1 ORDER BY ayah_number ASC;"),
            surah_id.raw(),
        )
    }

    fn list_by_juz(&self, juz_number: u32) -> RepoResult<Vec<Ayah>> {
        self.collect_ayahs(
            &format!(
                "{AYAH_SELECT_SQL}
                 WHERE juz_number = ?1
                 ORDER BY surah_id ASC, ayah_number ASC;"
            ),
            i64::from(juz_number),
        )
    }

    fn list_by_page(&self, page_number: u32) -> RepoResult<Vec<Ayah>> {
        self.collect_ayahs(
            &format!(
                "{AYAH_SELECT_SQL}
                 WHERE page_number = ?1
                 ORDER BY surah_id ASC, ayah_number ASC;"
            ),
            i64::from(page_number),
        )
    }

    fn update_ayah(&self, ayah: &Ayah) -> RepoResult<()> {
        ayah.validate()?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let stored: Option<(i64, u32)> = tx
            .query_row(
                "SELECT surah_id, ayah_number FROM ayahs WHERE id = ?1;",
                [ayah.id.raw()],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let (stored_surah, stored_number) =
            stored.ok_or(RepoError::NotFound(EntityRef::Ayah(ayah.id)))?;
        if stored_surah != ayah.surah_id.raw() {
            return Err(AttributeError::IdentityChanged {
                entity: "ayah",
                field: "surah_id",
            }
            .into());
        }
        if stored_number != ayah.ayah_number {
            return Err(AttributeError::IdentityChanged {
                entity: "ayah",
                field: "ayah_number",
            }
            .into());
        }

        tx.execute(
            "UPDATE ayahs
             SET text_uthmani = ?2,
                 text_simple = ?3,
                 text_imlaei = ?4,
                 juz_number = ?5,
                 page_number = ?6,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![
                ayah.id.raw(),
                ayah.text_uthmani.as_str(),
                ayah.text_simple.as_str(),
                ayah.text_imlaei.as_deref(),
                ayah.juz_number,
                ayah.page_number,
            ],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn set_translations(
        &self,
        id: AyahId,
        translations: &BTreeMap<String, String>,
    ) -> RepoResult<()> {
        for code in translations.keys() {
            validate_lang_code(code)?;
        }

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        if !ayah_exists(&tx, id)? {
            return Err(RepoError::NotFound(EntityRef::Ayah(id)));
        }

        tx.execute(
            "DELETE FROM ayah_translations WHERE ayah_id = ?1;",
            [id.raw()],
        )?;
        for (code, text) in translations {
            insert_translation(&tx, id, code, text)?;
        }
        tx.execute(
            "UPDATE ayahs
             SET updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            [id.raw()],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn delete_ayah(&self, id: AyahId) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        if !ayah_exists(&tx, id)? {
            return Err(RepoError::NotFound(EntityRef::Ayah(id)));
        }
        delete_ayah_subtree(&tx, id)?;
        tx.commit()
            .map_err(|err| cascade_aborted(EntityRef::Ayah(id), err))?;
        Ok(())
    }
}

impl SqliteAyahRepository<'_> {
    fn collect_ayahs(&self, sql: &str, bind: i64) -> RepoResult<Vec<Ayah>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query([bind])?;
        let mut ayahs = Vec::new();
        while let Some(row) = rows.next()? {
            ayahs.push(parse_ayah_row(self.conn, row)?);
        }
        Ok(ayahs)
    }
}

/// Inserts one ayah row after parent, uniqueness and attribute checks.
pub(crate) fn insert_ayah(conn: &Connection, draft: &NewAyah) -> RepoResult<AyahId> {
    ensure_surah_parent(conn, draft.surah_id)?;
    ensure_unique_ayah_key(conn, draft.surah_id, draft.ayah_number)?;
    draft.validate()?;

    conn.execute(
        "INSERT INTO ayahs (
            surah_id,
            ayah_number,
            text_uthmani,
            text_simple,
            text_imlaei,
            juz_number,
            page_number
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
        params![
            draft.surah_id.raw(),
            draft.ayah_number,
            draft.text_uthmani.as_str(),
            draft.text_simple.as_str(),
            draft.text_imlaei.as_deref(),
            draft.juz_number,
            draft.page_number,
        ],
    )
    .map_err(|err| {
        map_unique_violation(
            err,
            "ayahs",
            format!(
                "surah_id={}, ayah_number={}",
                draft.surah_id, draft.ayah_number
            ),
        )
    })?;

    Ok(AyahId::from_raw(conn.last_insert_rowid()))
}

/// Inserts one translation row; the caller owns the transaction.
pub(crate) fn insert_translation(
    conn: &Connection,
    id: AyahId,
    lang_code: &str,
    text: &str,
) -> RepoResult<()> {
    conn.execute(
        "INSERT INTO ayah_translations (ayah_id, lang_code, translated_text)
         VALUES (?1, ?2, ?3);",
        params![id.raw(), lang_code, text],
    )
    .map_err(|err| {
        map_unique_violation(
            err,
            "ayah_translations",
            format!("ayah_id={id}, lang_code={lang_code}"),
        )
    })?;
    Ok(())
}

fn parse_ayah_row(conn: &Connection, row: &Row<'_>) -> RepoResult<Ayah> {
    let id = AyahId::from_raw(row.get("id")?);
    Ok(Ayah {
        id,
        surah_id: SurahId::from_raw(row.get("surah_id")?),
        ayah_number: row.get("ayah_number")?,
        text_uthmani: row.get("text_uthmani")?,
        text_simple: row.get("text_simple")?,
        text_imlaei: row.get("text_imlaei")?,
        translations: load_translations(conn, id)?,
        juz_number: row.get("juz_number")?,
        page_number: row.get("page_number")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn load_translations(conn: &Connection, id: AyahId) -> RepoResult<BTreeMap<String, String>> {
    let mut stmt = conn.prepare(
        "SELECT lang_code, translated_text
         FROM ayah_translations
         WHERE ayah_id = ?1
         ORDER BY lang_code ASC;",
    )?;
    let mut rows = stmt.query([id.raw()])?;
    let mut translations = BTreeMap::new();
    while let Some(row) = rows.next()? {
        let code: String = row.get(0)?;
        let text: String = row.get(1)?;
        translations.insert(code, text);
    }
    Ok(translations)
}
