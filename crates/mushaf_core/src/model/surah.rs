//! Surah (chapter) domain model.
//!
//! # Responsibility
//! - Define the top-level corpus entity and its creation draft.
//! - Validate chapter attributes before any persistence attempt.
//!
//! # Invariants
//! - `surah_number` is globally unique and immutable once assigned.
//! - `total_ayahs` is a declared fact; reconciling it against the actual
//!   ayah count is a corpus-audit concern, never a storage constraint.

use crate::model::AttributeError;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

const ENTITY: &str = "surah";

/// Opaque store-assigned surah identifier.
///
/// Ids are monotonically assigned by the store; callers never construct them.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct SurahId(i64);

impl SurahId {
    pub(crate) fn from_raw(raw: i64) -> Self {
        Self(raw)
    }

    pub(crate) fn raw(self) -> i64 {
        self.0
    }
}

impl Display for SurahId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Revelation place label for a chapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevelationPlace {
    Makkah,
    Madinah,
}

/// Surah read model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Surah {
    /// Store-assigned stable id.
    pub id: SurahId,
    /// Canonical chapter number, globally unique.
    pub surah_number: u32,
    /// Arabic chapter name, required.
    pub name_arabic: String,
    pub name_english: Option<String>,
    pub name_transliteration: Option<String>,
    pub revelation_place: Option<RevelationPlace>,
    /// Declared ayah count for the complete chapter.
    pub total_ayahs: u32,
    /// Epoch ms creation timestamp.
    pub created_at: i64,
    /// Epoch ms update timestamp.
    pub updated_at: i64,
}

impl Surah {
    /// Validates mutable attributes for the update path.
    pub fn validate(&self) -> Result<(), AttributeError> {
        validate_attrs(self.surah_number, &self.name_arabic, self.total_ayahs)
    }
}

/// Creation draft for a surah.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSurah {
    pub surah_number: u32,
    pub name_arabic: String,
    pub name_english: Option<String>,
    pub name_transliteration: Option<String>,
    pub revelation_place: Option<RevelationPlace>,
    pub total_ayahs: u32,
}

impl NewSurah {
    /// Creates a draft with required attributes; optional names start empty.
    pub fn new(surah_number: u32, name_arabic: impl Into<String>, total_ayahs: u32) -> Self {
        Self {
            surah_number,
            name_arabic: name_arabic.into(),
            name_english: None,
            name_transliteration: None,
            revelation_place: None,
            total_ayahs,
        }
    }

    /// Validates draft attributes before persistence.
    pub fn validate(&self) -> Result<(), AttributeError> {
        validate_attrs(self.surah_number, &self.name_arabic, self.total_ayahs)
    }
}

fn validate_attrs(
    surah_number: u32,
    name_arabic: &str,
    total_ayahs: u32,
) -> Result<(), AttributeError> {
    if surah_number == 0 {
        return Err(AttributeError::NonPositive {
            entity: ENTITY,
            field: "surah_number",
        });
    }
    if name_arabic.trim().is_empty() {
        return Err(AttributeError::EmptyField {
            entity: ENTITY,
            field: "name_arabic",
        });
    }
    if total_ayahs == 0 {
        return Err(AttributeError::NonPositive {
            entity: ENTITY,
            field: "total_ayahs",
        });
    }
    Ok(())
}
