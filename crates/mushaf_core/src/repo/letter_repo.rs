//! Letter annotation repository contracts and SQLite implementation.
//!
//! # Invariants
//! - `(word_id, letter_position)` is unique per word.
//! - The four phonetic-rule flags persist independently; update toggles any
//!   subset without touching the others' stored values.
//! - `list_by_word` is deterministic: `letter_position ASC`; an unknown word
//!   fails with `ParentNotFound`.

use crate::model::letter::{AnnotationId, HarakatType, LetterAnnotation, NewLetterAnnotation};
use crate::model::word::WordId;
use crate::model::AttributeError;
use crate::repo::integrity::{
    ensure_unique_letter_key, ensure_word_parent, map_unique_violation,
};
use crate::repo::{
    ensure_connection_ready, EntityRef, RepoError, RepoResult, TableSpec,
};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};

const LETTER_SELECT_SQL: &str = "SELECT
    id,
    word_id,
    letter_position,
    letter_arabic,
    harakat_type,
    harakat_symbol,
    has_madd,
    has_ghunnah,
    has_qalqalah,
    has_idgham,
    pronunciation_note
FROM letter_annotations";

const REQUIRED_TABLES: &[TableSpec] = &[TableSpec {
    table: "letter_annotations",
    columns: &[
        "id",
        "word_id",
        "letter_position",
        "letter_arabic",
        "harakat_type",
        "harakat_symbol",
        "has_madd",
        "has_ghunnah",
        "has_qalqalah",
        "has_idgham",
        "pronunciation_note",
    ],
}];

/// Repository interface for letter annotation operations.
pub trait LetterRepository {
    /// Creates one annotation under an existing word.
    fn create_annotation(&self, draft: &NewLetterAnnotation) -> RepoResult<AnnotationId>;
    /// Loads one annotation by id.
    fn get_annotation(&self, id: AnnotationId) -> RepoResult<Option<LetterAnnotation>>;
    /// Lists annotations of one word ordered by `letter_position`.
    fn list_by_word(&self, word_id: WordId) -> RepoResult<Vec<LetterAnnotation>>;
    /// Updates non-key attributes, including independent flag toggles.
    fn update_annotation(&self, annotation: &LetterAnnotation) -> RepoResult<()>;
    /// Deletes one annotation.
    fn delete_annotation(&self, id: AnnotationId) -> RepoResult<()>;
}

/// SQLite-backed letter annotation repository.
pub struct SqliteLetterRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteLetterRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, REQUIRED_TABLES)?;
        Ok(Self { conn })
    }
}

impl LetterRepository for SqliteLetterRepository<'_> {
    fn create_annotation(&self, draft: &NewLetterAnnotation) -> RepoResult<AnnotationId> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let id = insert_annotation(&tx, draft)?;
        tx.commit()?;
        Ok(id)
    }

    fn get_annotation(&self, id: AnnotationId) -> RepoResult<Option<LetterAnnotation>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{LETTER_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.raw()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_letter_row(row)?));
        }
        Ok(None)
    }

    fn list_by_word(&self, word_id: WordId) -> RepoResult<Vec<LetterAnnotation>> {
        ensure_word_parent(self.conn, word_id)?;

        let mut stmt = self.conn.prepare(&format!(
            "{LETTER_SELECT_SQL} WHERE word_id = ?1 ORDER BY letter_position ASC;"
        ))?;
        let mut rows = stmt.query([word_id.raw()])?;
        let mut annotations = Vec::new();
        while let Some(row) = rows.next()? {
            annotations.push(parse_letter_row(row)?);
        }
        Ok(annotations)
    }

    fn update_annotation(&self, annotation: &LetterAnnotation) -> RepoResult<()> {
        annotation.validate()?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let stored: Option<(i64, u32)> = tx
            .query_row(
                "SELECT word_id, letter_position FROM letter_annotations WHERE id = ?1;",
                [annotation.id.raw()],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let (stored_word, stored_position) =
            stored.ok_or(RepoError::NotFound(EntityRef::Letter(annotation.id)))?;
        if stored_word != annotation.word_id.raw() {
            return Err(AttributeError::IdentityChanged {
                entity: "letter_annotation",
                field: "word_id",
            }
            .into());
        }
        if stored_position != annotation.letter_position {
            return Err(AttributeError::IdentityChanged {
                entity: "letter_annotation",
                field: "letter_position",
            }
            .into());
        }

        tx.execute(
            "UPDATE letter_annotations
             SET letter_arabic = ?2,
                 harakat_type = ?3,
                 harakat_symbol = ?4,
                 has_madd = ?5,
                 has_ghunnah = ?6,
                 has_qalqalah = ?7,
                 has_idgham = ?8,
                 pronunciation_note = ?9
             WHERE id = ?1;",
            params![
                annotation.id.raw(),
                annotation.letter_arabic.as_str(),
                annotation.harakat_type.map(harakat_type_to_db),
                annotation.harakat_symbol.as_deref(),
                bool_to_int(annotation.has_madd),
                bool_to_int(annotation.has_ghunnah),
                bool_to_int(annotation.has_qalqalah),
                bool_to_int(annotation.has_idgham),
                annotation.pronunciation_note.as_deref(),
            ],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn delete_annotation(&self, id: AnnotationId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM letter_annotations WHERE id = ?1;",
            [id.raw()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(EntityRef::Letter(id)));
        }
        Ok(())
    }
}

/// Inserts one annotation row after parent, uniqueness and attribute checks.
pub(crate) fn insert_annotation(
    conn: &Connection,
    draft: &NewLetterAnnotation,
) -> RepoResult<AnnotationId> {
    ensure_word_parent(conn, draft.word_id)?;
    ensure_unique_letter_key(conn, draft.word_id, draft.letter_position)?;
    draft.validate()?;

    conn.execute(
        "INSERT INTO letter_annotations (
            word_id,
            letter_position,
            letter_arabic,
            harakat_type,
            harakat_symbol,
            has_madd,
            has_ghunnah,
            has_qalqalah,
            has_idgham,
            pronunciation_note
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10);",
        params![
            draft.word_id.raw(),
            draft.letter_position,
            draft.letter_arabic.as_str(),
            draft.harakat_type.map(harakat_type_to_db),
            draft.harakat_symbol.as_deref(),
            bool_to_int(draft.has_madd),
            bool_to_int(draft.has_ghunnah),
            bool_to_int(draft.has_qalqalah),
            bool_to_int(draft.has_idgham),
            draft.pronunciation_note.as_deref(),
        ],
    )
    .map_err(|err| {
        map_unique_violation(
            err,
            "letter_annotations",
            format!(
                "word_id={}, letter_position={}",
                draft.word_id, draft.letter_position
            ),
        )
    })?;

    Ok(AnnotationId::from_raw(conn.last_insert_rowid()))
}

fn parse_letter_row(row: &Row<'_>) -> RepoResult<LetterAnnotation> {
    let harakat_type = match row.get::<_, Option<String>>("harakat_type")? {
        Some(value) => Some(parse_harakat_type(&value).ok_or_else(|| {
            RepoError::InvalidData(format!(
                "invalid harakat type `{value}` in letter_annotations.harakat_type"
            ))
        })?),
        None => None,
    };

    Ok(LetterAnnotation {
        id: AnnotationId::from_raw(row.get("id")?),
        word_id: WordId::from_raw(row.get("word_id")?),
        letter_position: row.get("letter_position")?,
        letter_arabic: row.get("letter_arabic")?,
        harakat_type,
        harakat_symbol: row.get("harakat_symbol")?,
        has_madd: int_to_bool(row.get("has_madd")?, "has_madd")?,
        has_ghunnah: int_to_bool(row.get("has_ghunnah")?, "has_ghunnah")?,
        has_qalqalah: int_to_bool(row.get("has_qalqalah")?, "has_qalqalah")?,
        has_idgham: int_to_bool(row.get("has_idgham")?, "has_idgham")?,
        pronunciation_note: row.get("pronunciation_note")?,
    })
}

fn harakat_type_to_db(value: HarakatType) -> &'static str {
    match value {
        HarakatType::Fatha => "fatha",
        HarakatType::Damma => "damma",
        HarakatType::Kasra => "kasra",
        HarakatType::Fathatan => "fathatan",
        HarakatType::Dammatan => "dammatan",
        HarakatType::Kasratan => "kasratan",
        HarakatType::Sukun => "sukun",
        HarakatType::Shadda => "shadda",
        HarakatType::Maddah => "maddah",
    }
}

fn parse_harakat_type(value: &str) -> Option<HarakatType> {
    match value {
        "fatha" => Some(HarakatType::Fatha),
        "damma" => Some(HarakatType::Damma),
        "kasra" => Some(HarakatType::Kasra),
        "fathatan" => Some(HarakatType::Fathatan),
        "dammatan" => Some(HarakatType::Dammatan),
        "kasratan" => Some(HarakatType::Kasratan),
        "sukun" => Some(HarakatType::Sukun),
        "shadda" => Some(HarakatType::Shadda),
        "maddah" => Some(HarakatType::Maddah),
        _ => None,
    }
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

fn int_to_bool(value: i64, column: &'static str) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid {column} value `{other}` in letter_annotations"
        ))),
    }
}
