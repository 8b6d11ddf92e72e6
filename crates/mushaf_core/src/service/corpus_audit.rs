//! Corpus completeness audit.
//!
//! # Responsibility
//! - Walk one surah subtree and report structural gaps: missing positions,
//!   declared/actual count drift, annotation coverage drift.
//!
//! # Invariants
//! - Auditing never mutates the store; every finding is a report, not a
//!   repair.
//! - Annotation coverage is only checked for words that carry at least one
//!   annotation; unannotated words are not findings.

use crate::model::letter::base_letter_count;
use crate::model::surah::SurahId;
use crate::repo::{EntityRef, RepoError, RepoResult};
use crate::service::corpus_service::CorpusService;
use log::info;
use std::fmt;

/// One structural finding from a surah audit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorpusIssue {
    /// Declared `total_ayahs` differs from the stored verse count.
    AyahCountMismatch {
        surah_number: u32,
        declared: u32,
        actual: u32,
    },
    /// Verse numbering has a gap or offset at one slot.
    NonContiguousAyahs {
        surah_number: u32,
        expected: u32,
        found: u32,
    },
    /// Word numbering has a gap or offset at one slot.
    NonContiguousWords {
        surah_number: u32,
        ayah_number: u32,
        expected: u32,
        found: u32,
    },
    /// Letter numbering has a gap or offset at one slot.
    NonContiguousLetters {
        surah_number: u32,
        ayah_number: u32,
        word_position: u32,
        expected: u32,
        found: u32,
    },
    /// Annotation count differs from the word's base letter count.
    LetterCountMismatch {
        surah_number: u32,
        ayah_number: u32,
        word_position: u32,
        base_letters: u32,
        annotations: u32,
    },
}

impl fmt::Display for CorpusIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CorpusIssue::AyahCountMismatch {
                surah_number,
                declared,
                actual,
            } => write!(
                f,
                "surah {surah_number} declares {declared} ayahs but stores {actual}"
            ),
            CorpusIssue::NonContiguousAyahs {
                surah_number,
                expected,
                found,
            } => write!(
                f,
                "surah {surah_number} ayah slot {expected} holds ayah_number {found}"
            ),
            CorpusIssue::NonContiguousWords {
                surah_number,
                ayah_number,
                expected,
                found,
            } => write!(
                f,
                "surah {surah_number} ayah {ayah_number} word slot {expected} holds word_position {found}"
            ),
            CorpusIssue::NonContiguousLetters {
                surah_number,
                ayah_number,
                word_position,
                expected,
                found,
            } => write!(
                f,
                "surah {surah_number} ayah {ayah_number} word {word_position} letter slot {expected} holds letter_position {found}"
            ),
            CorpusIssue::LetterCountMismatch {
                surah_number,
                ayah_number,
                word_position,
                base_letters,
                annotations,
            } => write!(
                f,
                "surah {surah_number} ayah {ayah_number} word {word_position} has {base_letters} base letters but {annotations} annotations"
            ),
        }
    }
}

impl CorpusService<'_> {
    /// Audits one surah subtree and returns every structural finding.
    ///
    /// An empty vector means the subtree is structurally complete. An
    /// unknown surah fails with `NotFound`.
    pub fn audit_surah(&self, id: SurahId) -> RepoResult<Vec<CorpusIssue>> {
        let surah = self
            .get_surah(id)?
            .ok_or(RepoError::NotFound(EntityRef::Surah(id)))?;
        let mut issues = Vec::new();

        let ayahs = self.list_ayahs_by_surah(id)?;
        for (slot, ayah) in ayahs.iter().enumerate() {
            let expected = slot as u32 + 1;
            if ayah.ayah_number != expected {
                issues.push(CorpusIssue::NonContiguousAyahs {
                    surah_number: surah.surah_number,
                    expected,
                    found: ayah.ayah_number,
                });
            }

            let words = self.list_words_by_ayah(ayah.id)?;
            for (slot, word) in words.iter().enumerate() {
                let expected = slot as u32 + 1;
                if word.word_position != expected {
                    issues.push(CorpusIssue::NonContiguousWords {
                        surah_number: surah.surah_number,
                        ayah_number: ayah.ayah_number,
                        expected,
                        found: word.word_position,
                    });
                }

                let annotations = self.list_annotations_by_word(word.id)?;
                if annotations.is_empty() {
                    continue;
                }
                for (slot, annotation) in annotations.iter().enumerate() {
                    let expected = slot as u32 + 1;
                    if annotation.letter_position != expected {
                        issues.push(CorpusIssue::NonContiguousLetters {
                            surah_number: surah.surah_number,
                            ayah_number: ayah.ayah_number,
                            word_position: word.word_position,
                            expected,
                            found: annotation.letter_position,
                        });
                    }
                }

                let base_letters = base_letter_count(&word.arabic_with_harakat) as u32;
                let annotation_count = annotations.len() as u32;
                if base_letters != annotation_count {
                    issues.push(CorpusIssue::LetterCountMismatch {
                        surah_number: surah.surah_number,
                        ayah_number: ayah.ayah_number,
                        word_position: word.word_position,
                        base_letters,
                        annotations: annotation_count,
                    });
                }
            }
        }

        let actual = ayahs.len() as u32;
        if surah.total_ayahs != actual {
            issues.push(CorpusIssue::AyahCountMismatch {
                surah_number: surah.surah_number,
                declared: surah.total_ayahs,
                actual,
            });
        }

        info!(
            "event=corpus_audit module=service status=ok surah_number={} issues={}",
            surah.surah_number,
            issues.len()
        );
        Ok(issues)
    }
}
