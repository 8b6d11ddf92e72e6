//! Word (token) domain model.
//!
//! # Invariants
//! - `(ayah_id, word_position)` is unique per ayah and immutable.
//! - Both Arabic forms are required; gloss, transliteration and root are
//!   optional enrichment.
//! - `root_letters` holds a triliteral/quadriliteral root, at most 10
//!   characters.

use crate::model::ayah::AyahId;
use crate::model::AttributeError;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

const ENTITY: &str = "word";
const ROOT_LETTERS_MAX_CHARS: usize = 10;

/// Opaque store-assigned word identifier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct WordId(i64);

impl WordId {
    pub(crate) fn from_raw(raw: i64) -> Self {
        Self(raw)
    }

    pub(crate) fn raw(self) -> i64 {
        self.0
    }
}

impl Display for WordId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Word read model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Word {
    pub id: WordId,
    /// Owning ayah.
    pub ayah_id: AyahId,
    /// One-based token position within the owning ayah.
    pub word_position: u32,
    /// Vocalized form with harakat, required.
    pub arabic_with_harakat: String,
    /// Simplified unvocalized form, required.
    pub arabic_simple: String,
    pub transliteration: Option<String>,
    /// English gloss.
    pub translation_en: Option<String>,
    /// Root letters, at most 10 characters.
    pub root_letters: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Word {
    pub fn validate(&self) -> Result<(), AttributeError> {
        validate_attrs(
            self.word_position,
            &self.arabic_with_harakat,
            &self.arabic_simple,
            self.root_letters.as_deref(),
        )
    }
}

/// Creation draft for a word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewWord {
    pub ayah_id: AyahId,
    pub word_position: u32,
    pub arabic_with_harakat: String,
    pub arabic_simple: String,
    pub transliteration: Option<String>,
    pub translation_en: Option<String>,
    pub root_letters: Option<String>,
}

impl NewWord {
    pub fn new(
        ayah_id: AyahId,
        word_position: u32,
        arabic_with_harakat: impl Into<String>,
        arabic_simple: impl Into<String>,
    ) -> Self {
        Self {
            ayah_id,
            word_position,
            arabic_with_harakat: arabic_with_harakat.into(),
            arabic_simple: arabic_simple.into(),
            transliteration: None,
            translation_en: None,
            root_letters: None,
        }
    }

    pub fn validate(&self) -> Result<(), AttributeError> {
        validate_attrs(
            self.word_position,
            &self.arabic_with_harakat,
            &self.arabic_simple,
            self.root_letters.as_deref(),
        )
    }
}

fn validate_attrs(
    word_position: u32,
    arabic_with_harakat: &str,
    arabic_simple: &str,
    root_letters: Option<&str>,
) -> Result<(), AttributeError> {
    if word_position == 0 {
        return Err(AttributeError::NonPositive {
            entity: ENTITY,
            field: "word_position",
        });
    }
    if arabic_with_harakat.trim().is_empty() {
        return Err(AttributeError::EmptyField {
            entity: ENTITY,
            field: "arabic_with_harakat",
        });
    }
    if arabic_simple.trim().is_empty() {
        return Err(AttributeError::EmptyField {
            entity: ENTITY,
            field: "arabic_simple",
        });
    }
    if let Some(root) = root_letters {
        if root.chars().count() > ROOT_LETTERS_MAX_CHARS {
            return Err(AttributeError::TooLong {
                entity: ENTITY,
                field: "root_letters",
                max_chars: ROOT_LETTERS_MAX_CHARS,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{AttributeError, NewWord};
    use crate::model::ayah::AyahId;

    #[test]
    fn oversized_root_is_rejected() {
        let mut draft = NewWord::new(AyahId::from_raw(1), 1, "بِسۡمِ", "بسم");
        draft.root_letters = Some("سسسسسسسسسسس".to_string());
        assert!(matches!(
            draft.validate(),
            Err(AttributeError::TooLong {
                field: "root_letters",
                ..
            })
        ));
    }

    #[test]
    fn zero_position_is_rejected() {
        let draft = NewWord::new(AyahId::from_raw(1), 0, "بِسۡمِ", "بسم");
        assert!(matches!(
            draft.validate(),
            Err(AttributeError::NonPositive {
                field: "word_position",
                ..
            })
        ));
    }
}
