//! Per-letter phonetic annotation model.
//!
//! # Responsibility
//! - Define harakat/diacritic detail attached to a single letter of a word's
//!   vocalized form.
//! - Provide the base-letter helper used by the corpus audit.
//!
//! # Invariants
//! - `(word_id, letter_position)` is unique per word and immutable.
//! - `letter_arabic` is exactly one character; `harakat_symbol` is a glyph of
//!   at most two characters.
//! - The four phonetic-rule flags are independent; none excludes another.
//!   The store records them, it never derives them.

use crate::model::word::WordId;
use crate::model::AttributeError;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

const ENTITY: &str = "letter_annotation";
const HARAKAT_SYMBOL_MAX_CHARS: usize = 2;

/// Opaque store-assigned annotation identifier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct AnnotationId(i64);

impl AnnotationId {
    pub(crate) fn from_raw(raw: i64) -> Self {
        Self(raw)
    }

    pub(crate) fn raw(self) -> i64 {
        self.0
    }
}

impl Display for AnnotationId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Harakat classification vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HarakatType {
    Fatha,
    Damma,
    Kasra,
    Fathatan,
    Dammatan,
    Kasratan,
    Sukun,
    Shadda,
    Maddah,
}

/// Letter annotation read model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LetterAnnotation {
    pub id: AnnotationId,
    /// Owning word.
    pub word_id: WordId,
    /// One-based letter position within the word's vocalized form.
    pub letter_position: u32,
    /// The single annotated Arabic letter.
    pub letter_arabic: String,
    /// Diacritic classification; `None` for an unmarked letter.
    pub harakat_type: Option<HarakatType>,
    /// Display glyph for the diacritic, at most two characters.
    pub harakat_symbol: Option<String>,
    pub has_madd: bool,
    pub has_ghunnah: bool,
    pub has_qalqalah: bool,
    pub has_idgham: bool,
    pub pronunciation_note: Option<String>,
}

impl LetterAnnotation {
    pub fn validate(&self) -> Result<(), AttributeError> {
        validate_attrs(
            self.letter_position,
            &self.letter_arabic,
            self.harakat_symbol.as_deref(),
        )
    }
}

/// Creation draft for a letter annotation.
///
/// All four rule flags start `false` and are toggled independently through
/// the update path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLetterAnnotation {
    pub word_id: WordId,
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

impl NewLetterAnnotation {
    pub fn new(word_id: WordId, letter_position: u32, letter_arabic: impl Into<String>) -> Self {
        Self {
            word_id,
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

    pub fn validate(&self) -> Result<(), AttributeError> {
        validate_attrs(
            self.letter_position,
            &self.letter_arabic,
            self.harakat_symbol.as_deref(),
        )
    }
}

/// Returns `true` for the marks stripped when reducing a vocalized form to
/// its base letters: the harakat combining range (U+064B..U+065F), the
/// superscript alef (U+0670), the Quranic annotation signs (U+06D6..U+06ED)
/// and the tatweel filler (U+0640).
pub fn is_harakat_mark(c: char) -> bool {
    matches!(
        c,
        '\u{064B}'..='\u{065F}' | '\u{0670}' | '\u{06D6}'..='\u{06ED}' | '\u{0640}'
    )
}

/// Counts base letters of a vocalized form, ignoring harakat marks.
pub fn base_letter_count(text: &str) -> usize {
    text.chars().filter(|c| !is_harakat_mark(*c)).count()
}

fn validate_attrs(
    letter_position: u32,
    letter_arabic: &str,
    harakat_symbol: Option<&str>,
) -> Result<(), AttributeError> {
    if letter_position == 0 {
        return Err(AttributeError::NonPositive {
            entity: ENTITY,
            field: "letter_position",
        });
    }
    if letter_arabic.chars().count() != 1 {
        return Err(AttributeError::NotSingleLetter(letter_arabic.to_string()));
    }
    if let Some(symbol) = harakat_symbol {
        if symbol.is_empty() {
            return Err(AttributeError::EmptyField {
                entity: ENTITY,
                field: "harakat_symbol",
            });
        }
        if symbol.chars().count() > HARAKAT_SYMBOL_MAX_CHARS {
            return Err(AttributeError::TooLong {
                entity: ENTITY,
                field: "harakat_symbol",
                max_chars: HARAKAT_SYMBOL_MAX_CHARS,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{base_letter_count, AttributeError, NewLetterAnnotation};
    use crate::model::word::WordId;

    #[test]
    fn letter_must_be_exactly_one_character() {
        let empty = NewLetterAnnotation::new(WordId::from_raw(1), 1, "");
        assert!(matches!(
            empty.validate(),
            Err(AttributeError::NotSingleLetter(_))
        ));

        let two = NewLetterAnnotation::new(WordId::from_raw(1), 1, "بس");
        assert!(matches!(
            two.validate(),
            Err(AttributeError::NotSingleLetter(_))
        ));

        let one = NewLetterAnnotation::new(WordId::from_raw(1), 1, "ب");
        assert!(one.validate().is_ok());
    }

    #[test]
    fn harakat_symbol_must_be_one_or_two_characters() {
        let mut draft = NewLetterAnnotation::new(WordId::from_raw(1), 1, "ب");
        draft.harakat_symbol = Some(String::new());
        assert!(matches!(
            draft.validate(),
            Err(AttributeError::EmptyField {
                field: "harakat_symbol",
                ..
            })
        ));

        draft.harakat_symbol = Some("ّٰـ".to_string());
        assert!(matches!(
            draft.validate(),
            Err(AttributeError::TooLong {
                field: "harakat_symbol",
                ..
            })
        ));

        draft.harakat_symbol = Some("ِ".to_string());
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn flags_default_to_false() {
        let draft = NewLetterAnnotation::new(WordId::from_raw(1), 1, "ب");
        assert!(!draft.has_madd && !draft.has_ghunnah && !draft.has_qalqalah && !draft.has_idgham);
    }

    #[test]
    fn base_letter_count_ignores_harakat_marks() {
        // "بِسۡمِ" is three base letters carrying three marks.
        assert_eq!(base_letter_count("بِسۡمِ"), 3);
        assert_eq!(base_letter_count("بسم"), 3);
    }
}
