//! Word repository contracts and SQLite implementation.
//!
//! # Invariants
//! - `(ayah_id, word_position)` is unique per ayah; a duplicate fails with
//!   `DuplicateKey` and leaves the existing word untouched.
//! - `list_by_ayah` is deterministic: `word_position ASC`; an unknown ayah
//!   fails with `ParentNotFound`.

use crate::model::ayah::AyahId;
use crate::model::word::{NewWord, Word, WordId};
use crate::model::AttributeError;
use crate::repo::integrity::{
    cascade_aborted, delete_word_subtree, ensure_ayah_parent, ensure_unique_word_key,
    map_unique_violation, word_exists,
};
use crate::repo::{
    ensure_connection_ready, EntityRef, RepoError, RepoResult, TableSpec,
};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};

const WORD_SELECT_SQL: &str = "SELECT
    id,
    ayah_id,
    word_position,
    arabic_with_harakat,
    arabic_simple,
    transliteration,
    translation_en,
    root_letters,
    created_at,
    updated_at
FROM words";

const REQUIRED_TABLES: &[TableSpec] = &[TableSpec {
    table: "words",
    columns: &[
        "id",
        "ayah_id",
        "word_position",
        "arabic_with_harakat",
        "arabic_simple",
        "transliteration",
        "translation_en",
        "root_letters",
        "created_at",
        "updated_at",
    ],
}];

/// Repository interface for word operations.
pub trait WordRepository {
    /// Creates one token under an existing ayah.
    fn create_word(&self, draft: &NewWord) -> RepoResult<WordId>;
    /// Loads one token by id.
    fn get_word(&self, id: WordId) -> RepoResult<Option<Word>>;
    /// Lists tokens of one ayah ordered by `word_position`.
    fn list_by_ayah(&self, ayah_id: AyahId) -> RepoResult<Vec<Word>>;
    /// Updates non-key attributes of one token.
    fn update_word(&self, word: &Word) -> RepoResult<()>;
    /// Deletes one token and its letter annotations atomically.
    fn delete_word(&self, id: WordId) -> RepoResult<()>;
}

/// SQLite-backed word repository.
pub struct SqliteWordRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteWordRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, REQUIRED_TABLES)?;
        Ok(Self { conn })
    }
}

impl WordRepository for SqliteWordRepository<'_> {
    fn create_word(&self, draft: &NewWord) -> RepoResult<WordId> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let id = insert_word(&tx, draft)?;
        tx.commit()?;
        Ok(id)
    }

    fn get_word(&self, id: WordId) -> RepoResult<Option<Word>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{WORD_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.raw()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_word_row(row)?));
        }
        Ok(None)
    }

    fn list_by_ayah(&self, ayah_id: AyahId) -> RepoResult<Vec<Word>> {
        ensure_ayah_parent(self.conn, ayah_id)?;

        let mut stmt = self.conn.prepare(&format!(
            "{WORD_SELECT_SQL} WHERE ayah_id = ?1 ORDER BY word_position ASC;"
        ))?;
        let mut rows = stmt.query([ayah_id.raw()])?;
        let mut words = Vec::new();
        while let Some(row) = rows.next()? {
            words.push(parse_word_row(row)?);
        }
        Ok(words)
    }

    fn update_word(&self, word: &Word) -> RepoResult<()> {
        word.validate()?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let stored: Option<(i64, u32)> = tx
            .query_row(
                "SELECT ayah_id, word_position FROM words WHERE id = ?1;",
                [word.id.raw()],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let (stored_ayah, stored_position) =
            stored.ok_or(RepoError::NotFound(EntityRef::Word(word.id)))?;
        if stored_ayah != word.ayah_id.raw() {
            return Err(AttributeError::IdentityChanged {
                entity: "word",
                field: "ayah_id",
            }
            .into());
        }
        if stored_position != word.word_position {
            return Err(AttributeError::IdentityChanged {
                entity: "word",
                field: "word_position",
            }
            .into());
        }

        tx.execute(
            "UPDATE words
             SET arabic_with_harakat = ?2,
                 arabic_simple = ?3,
                 transliteration = ?4,
                 translation_en = ?5,
                 root_letters = ?6,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![
                word.id.raw(),
                word.arabic_with_harakat.as_str(),
                word.arabic_simple.as_str(),
                word.transliteration.as_deref(),
                word.translation_en.as_deref(),
                word.root_letters.as_deref(),
            ],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn delete_word(&self, id: WordId) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        if !word_exists(&tx, id)? {
            return Err(RepoError::NotFound(EntityRef::Word(id)));
        }
        delete_word_subtree(&tx, id)?;
        tx.commit()
            .map_err(|err| cascade_aborted(EntityRef::Word(id), err))?;
        Ok(())
    }
}

/// Inserts one word row after parent, uniqueness and attribute checks.
pub(crate) fn insert_word(conn: &Connection, draft: &NewWord) -> RepoResult<WordId> {
    ensure_ayah_parent(conn, draft.ayah_id)?;
    ensure_unique_word_key(conn, draft.ayah_id, draft.word_position)?;
    draft.validate()?;

    conn.execute(
        "INSERT INTO words (
            ayah_id,
            word_position,
            arabic_with_harakat,
            arabic_simple,
            transliteration,
            translation_en,
            root_letters
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
        params![
            draft.ayah_id.raw(),
            draft.word_position,
            draft.arabic_with_harakat.as_str(),
            draft.arabic_simple.as_str(),
            draft.transliteration.as_deref(),
            draft.translation_en.as_deref(),
            draft.root_letters.as_deref(),
        ],
    )
    .map_err(|err| {
        map_unique_violation(
            err,
            "words",
            format!(
                "ayah_id={}, word_position={}",
                draft.ayah_id, draft.word_position
            ),
        )
    })?;

    Ok(WordId::from_raw(conn.last_insert_rowid()))
}

fn parse_word_row(row: &Row<'_>) -> RepoResult<Word> {
    Ok(Word {
        id: WordId::from_raw(row.get("id")?),
        ayah_id: AyahId::from_raw(row.get("ayah_id")?),
        word_position: row.get("word_position")?,
        arabic_with_harakat: row.get("arabic_with_harakat")?,
        arabic_simple: row.get("arabic_simple")?,
        transliteration: row.get("transliteration")?,
        translation_en: row.get("translation_en")?,
        root_letters: row.get("root_letters")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
