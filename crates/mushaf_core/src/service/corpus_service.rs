//! Corpus use-case service.
//!
//! # Responsibility
//! - Provide the stable create/get/update/delete/list surface over the four
//!   entity stores.
//! - Apply whole fixture batches in one transaction (parent before child).
//!
//! # Invariants
//! - Service APIs never bypass repository integrity checks.
//! - A batch commits fully or not at all; the first integrity violation
//!   aborts the whole load.

use crate::model::ayah::{validate_lang_code, Ayah, AyahId, NewAyah};
use crate::model::letter::{AnnotationId, HarakatType, LetterAnnotation, NewLetterAnnotation};
use crate::model::surah::{NewSurah, Surah, SurahId};
use crate::model::word::{NewWord, Word, WordId};
use crate::repo::ayah_repo::{
    insert_ayah, insert_translation, AyahRepository, SqliteAyahRepository,
};
use crate::repo::letter_repo::{insert_annotation, LetterRepository, SqliteLetterRepository};
use crate::repo::surah_repo::{insert_surah, SqliteSurahRepository, SurahRepository};
use crate::repo::word_repo::{insert_word, SqliteWordRepository, WordRepository};
use crate::repo::RepoResult;
use log::info;
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::collections::BTreeMap;

/// Facade over the four SQLite repositories sharing one connection.
pub struct CorpusService<'conn> {
    conn: &'conn Connection,
    surahs: SqliteSurahRepository<'conn>,
    ayahs: SqliteAyahRepository<'conn>,
    words: SqliteWordRepository<'conn>,
    letters: SqliteLetterRepository<'conn>,
}

impl<'conn> CorpusService<'conn> {
    /// Creates the service from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        Ok(Self {
            conn,
            surahs: SqliteSurahRepository::try_new(conn)?,
            ayahs: SqliteAyahRepository::try_new(conn)?,
            words: SqliteWordRepository::try_new(conn)?,
            letters: SqliteLetterRepository::try_new(conn)?,
        })
    }

    // Surah operations.

    pub fn create_surah(&self, draft: &NewSurah) -> RepoResult<SurahId> {
        self.surahs.create_surah(draft)
    }

    pub fn get_surah(&self, id: SurahId) -> RepoResult<Option<Surah>> {
        self.surahs.get_surah(id)
    }

    /// Keyed lookup by canonical chapter number.
    pub fn find_surah_by_number(&self, surah_number: u32) -> RepoResult<Option<Surah>> {
        self.surahs.find_by_number(surah_number)
    }

    pub fn list_surahs(&self) -> RepoResult<Vec<Surah>> {
        self.surahs.list_surahs()
    }

    pub fn update_surah(&self, surah: &Surah) -> RepoResult<()> {
        self.surahs.update_surah(surah)
    }

    /// Deletes one chapter and every descendant atomically.
    pub fn delete_surah(&self, id: SurahId) -> RepoResult<()> {
        self.surahs.delete_surah(id)?;
        info!("event=surah_delete module=service status=ok surah_id={id}");
        Ok(())
    }

    // Ayah operations.

    pub fn create_ayah(&self, draft: &NewAyah) -> RepoResult<AyahId> {
        self.ayahs.create_ayah(draft)
    }

    pub fn get_ayah(&self, id: AyahId) -> RepoResult<Option<Ayah>> {
        self.ayahs.get_ayah(id)
    }

    /// Keyed lookup by `(surah, ayah_number)`.
    pub fn find_ayah_by_number(
        &self,
        surah_id: SurahId,
        ayah_number: u32,
    ) -> RepoResult<Option<Ayah>> {
        self.ayahs.find_by_number(surah_id, ayah_number)
    }

    pub fn list_ayahs_by_surah(&self, surah_id: SurahId) -> RepoResult<Vec<Ayah>> {
        self.ayahs.list_by_surah(surah_id)
    }

    pub fn list_ayahs_by_juz(&self, juz_number: u32) -> RepoResult<Vec<Ayah>> {
        self.ayahs.list_by_juz(juz_number)
    }

    pub fn list_ayahs_by_page(&self, page_number: u32) -> RepoResult<Vec<Ayah>> {
        self.ayahs.list_by_page(page_number)
    }

    pub fn update_ayah(&self, ayah: &Ayah) -> RepoResult<()> {
        self.ayahs.update_ayah(ayah)
    }

    /// Replaces the whole translation set of one verse atomically.
    pub fn set_ayah_translations(
        &self,
        id: AyahId,
        translations: &BTreeMap<String, String>,
    ) -> RepoResult<()> {
        self.ayahs.set_translations(id, translations)
    }

    pub fn delete_ayah(&self, id: AyahId) -> RepoResult<()> {
        self.ayahs.delete_ayah(id)?;
        info!("event=ayah_delete module=service status=ok ayah_id={id}");
        Ok(())
    }

    // Word operations.

    pub fn create_word(&self, draft: &NewWord) -> RepoResult<WordId> {
        self.words.create_word(draft)
    }

    pub fn get_word(&self, id: WordId) -> RepoResult<Option<Word>> {
        self.words.get_word(id)
    }

    pub fn list_words_by_ayah(&self, ayah_id: AyahId) -> RepoResult<Vec<Word>> {
        self.words.list_by_ayah(ayah_id)
    }

    pub fn update_word(&self, word: &Word) -> RepoResult<()> {
        self.words.update_word(word)
    }

    pub fn delete_word(&self, id: WordId) -> RepoResult<()> {
        self.words.delete_word(id)?;
        info!("event=word_delete module=service status=ok word_id={id}");
        Ok(())
    }

    // Letter annotation operations.

    pub fn create_annotation(&self, draft: &NewLetterAnnotation) -> RepoResult<AnnotationId> {
        self.letters.create_annotation(draft)
    }

    pub fn get_annotation(&self, id: AnnotationId) -> RepoResult<Option<LetterAnnotation>> {
        self.letters.get_annotation(id)
    }

    pub fn list_annotations_by_word(&self, word_id: WordId) -> RepoResult<Vec<LetterAnnotation>> {
        self.letters.list_by_word(word_id)
    }

    pub fn update_annotation(&self, annotation: &LetterAnnotation) -> RepoResult<()> {
        self.letters.update_annotation(annotation)
    }

    pub fn delete_annotation(&self, id: AnnotationId) -> RepoResult<()> {
        self.letters.delete_annotation(id)
    }

    /// Applies one fixture batch in a single transaction.
    ///
    /// Parents are inserted before their children within the same
    /// transaction; the first integrity violation rolls the whole batch
    /// back and surfaces unchanged.
    pub fn load_batch(&self, batch: &CorpusBatch) -> RepoResult<BatchSummary> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let mut summary = BatchSummary::default();

        for surah_seed in &batch.surahs {
            let surah_id = insert_surah(&tx, &surah_seed.surah)?;
            summary.surahs += 1;

            for ayah_seed in &surah_seed.ayahs {
                let ayah_id = insert_ayah(&tx, &ayah_seed.to_draft(surah_id))?;
                summary.ayahs += 1;

                for (code, text) in &ayah_seed.translations {
                    validate_lang_code(code)?;
                    insert_translation(&tx, ayah_id, code, text)?;
                    summary.translations += 1;
                }

                for word_seed in &ayah_seed.words {
                    let word_id = insert_word(&tx, &word_seed.to_draft(ayah_id))?;
                    summary.words += 1;

                    for letter_seed in &word_seed.letters {
                        insert_annotation(&tx, &letter_seed.to_draft(word_id))?;
                        summary.annotations += 1;
                    }
                }
            }
        }

        tx.commit()?;
        info!(
            "event=batch_load module=service status=ok surahs={} ayahs={} words={} annotations={} translations={}",
            summary.surahs, summary.ayahs, summary.words, summary.annotations, summary.translations
        );
        Ok(summary)
    }
}

/// Counters for one applied batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub surahs: usize,
    pub ayahs: usize,
    pub words: usize,
    pub annotations: usize,
    pub translations: usize,
}

/// One fixture batch: surah subtrees in parent-before-child order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CorpusBatch {
    pub surahs: Vec<SurahSeed>,
}

/// One chapter with its verses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurahSeed {
    pub surah: NewSurah,
    pub ayahs: Vec<AyahSeed>,
}

impl SurahSeed {
    pub fn new(surah: NewSurah) -> Self {
        Self {
            surah,
            ayahs: Vec::new(),
        }
    }
}

/// One verse with its translations and tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AyahSeed {
    pub ayah_number: u32,
    pub text_uthmani: String,
    pub text_simple: String,
    pub text_imlaei: Option<String>,
    pub juz_number: Option<u32>,
    pub page_number: Option<u32>,
    pub translations: BTreeMap<String, String>,
    pub words: Vec<WordSeed>,
}

impl AyahSeed {
    pub fn new(
        ayah_number: u32,
        text_uthmani: impl Into<String>,
        text_simple: impl Into<String>,
    ) -> Self {
        Self {
            ayah_number,
            text_uthmani: text_uthmani.into(),
            text_simple: text_simple.into(),
            text_imlaei: None,
            juz_number: None,
            page_number: None,
            translations: BTreeMap::new(),
            words: Vec::new(),
        }
    }

    fn to_draft(&self, surah_id: SurahId) -> NewAyah {
        NewAyah {
            surah_id,
            ayah_number: self.ayah_number,
            text_uthmani: self.text_uthmani.clone(),
            text_simple: self.text_simple.clone(),
            text_imlaei: self.text_imlaei.clone(),
            juz_number: self.juz_number,
            page_number: self.page_number,
        }
    }
}

/// One token with its letter annotations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordSeed {
    pub word_position: u32,
    pub arabic_with_harakat: String,
    pub arabic_simple: String,
    pub transliteration: Option<String>,
    pub translation_en: Option<String>,
    pub root_letters: Option<String>,
    pub letters: Vec<LetterSeed>,
}

impl WordSeed {
    pub fn new(
        word_position: u32,
        arabic_with_harakat: impl Into<String>,
        arabic_simple: impl Into<String>,
    ) -> Self {
        Self {
            word_position,
            arabic_with_harakat: arabic_with_harakat.into(),
            arabic_simple: arabic_simple.into(),
            transliteration: None,
            translation_en: None,
            root_letters: None,
            letters: Vec::new(),
        }
    }

    fn to_draft(&self, ayah_id: AyahId) -> NewWord {
        NewWord {
            ayah_id,
            word_position: self.word_position,
            arabic_with_harakat: self.arabic_with_harakat.clone(),
            arabic_simple: self.arabic_simple.clone(),
            transliteration: self.transliteration.clone(),
            translation_en: self.translation_en.clone(),
            root_letters: self.root_letters.clone(),
        }
    }
}

/// One letter annotation seed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LetterSeed {
    pub letter_position: u32,
    pub letter_arabic: String,
    pub harakat_type: Option<HarakatType>,
    pub harakat_symbol: Option<String>,
    pub has_madd: bool,
    pub has_ghunnah: bool,
    pub has_qalqalah: bool,
    pub has_idgham: bool,
    pub pronunciation_note: Option<String>,
}

impl LetterSeed {
    pub fn new(letter_position: u32, letter_arabic: impl Into<String>) -> Self {
        Self {
            letter_position,
            letter_arabic: letter_arabic.into(),
            harakat_type: None,
            harakat_symbol: None,
            has_madd: false,
            has_ghunnah: false,
            has_qalqalah: false,
            has_idgham: false,
            pronunciation_note: None,
        }
    }

    fn to_draft(&self, word_id: WordId) -> NewLetterAnnotation {
        NewLetterAnnotation {
            word_id,
            letter_position: self.letter_position,
            letter_arabic: self.letter_arabic.clone(),
            harakat_type: self.harakat_type,
            harakat_symbol: self.harakat_symbol.clone(),
            has_madd: self.has_madd,
            has_ghunnah: self.has_ghunnah,
            has_qalqalah: self.has_qalqalah,
            has_idgham: self.has_idgham,
            pronunciation_note: self.pronunciation_note.clone(),
        }
    }
}
