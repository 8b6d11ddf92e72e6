//! Ayah (verse) domain model.
//!
//! # Responsibility
//! - Define the verse entity with its three text representations and the
//!   translation map keyed by language code.
//! - Validate verse attributes and translation language codes.
//!
//! # Invariants
//! - `(surah_id, ayah_number)` is unique per surah and immutable.
//! - Vocalized (`text_uthmani`) and simplified (`text_simple`) forms are
//!   required; the alternate orthography (`text_imlaei`) is optional.
//! - `juz_number`/`page_number` are secondary-index hints only and are never
//!   validated against a fixed numbering table.

use crate::model::surah::SurahId;
use crate::model::AttributeError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

const ENTITY: &str = "ayah";

static LANG_CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z]{2,3}$").expect("valid language code regex"));

/// Opaque store-assigned ayah identifier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct AyahId(i64);

impl AyahId {
    pub(crate) fn from_raw(raw: i64) -> Self {
        Self(raw)
    }

    pub(crate) fn raw(self) -> i64 {
        self.0
    }
}

impl Display for AyahId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ayah read model, including its translation set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ayah {
    pub id: AyahId,
    /// Owning surah.
    pub surah_id: SurahId,
    /// Verse number within the owning surah.
    pub ayah_number: u32,
    /// Fully vocalized (Uthmani) text, required.
    pub text_uthmani: String,
    /// Simplified unvocalized text, required.
    pub text_simple: String,
    /// Alternate (Imlaei) orthography, optional.
    pub text_imlaei: Option<String>,
    /// Translations keyed by lowercase language code.
    pub translations: BTreeMap<String, String>,
    pub juz_number: Option<u32>,
    pub page_number: Option<u32>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Ayah {
    /// Validates mutable attributes for the update path.
    pub fn validate(&self) -> Result<(), AttributeError> {
        validate_attrs(
            self.ayah_number,
            &self.text_uthmani,
            &self.text_simple,
            self.juz_number,
            self.page_number,
        )
    }
}

/// Creation draft for an ayah.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAyah {
    pub surah_id: SurahId,
    pub ayah_number: u32,
    pub text_uthmani: String,
    pub text_simple: String,
    pub text_imlaei: Option<String>,
    pub juz_number: Option<u32>,
    pub page_number: Option<u32>,
}

impl NewAyah {
    /// Creates a draft with the two required text forms.
    pub fn new(
        surah_id: SurahId,
        ayah_number: u32,
        text_uthmani: impl Into<String>,
        text_simple: impl Into<String>,
    ) -> Self {
        Self {
            surah_id,
            ayah_number,
            text_uthmani: text_uthmani.into(),
            text_simple: text_simple.into(),
            text_imlaei: None,
            juz_number: None,
            page_number: None,
        }
    }

    /// Validates draft attributes before persistence.
    pub fn validate(&self) -> Result<(), AttributeError> {
        validate_attrs(
            self.ayah_number,
            &self.text_uthmani,
            &self.text_simple,
            self.juz_number,
            self.page_number,
        )
    }
}

/// Validates one translation language code.
///
/// Codes are lowercase two- or three-letter labels (`en`, `bn`, `urd`).
pub fn validate_lang_code(code: &str) -> Result<(), AttributeError> {
    if LANG_CODE_RE.is_match(code) {
        Ok(())
    } else {
        Err(AttributeError::InvalidLanguageCode(code.to_string()))
    }
}

fn validate_attrs(
    ayah_number: u32,
    text_uthmani: &str,
    text_simple: &str,
    juz_number: Option<u32>,
    page_number: Option<u32>,
) -> Result<(), AttributeError> {
    if ayah_number == 0 {
        return Err(AttributeError::NonPositive {
            entity: ENTITY,
            field: "ayah_number",
        });
    }
    if text_uthmani.trim().is_empty() {
        return Err(AttributeError::EmptyField {
            entity: ENTITY,
            field: "text_uthmani",
        });
    }
    if text_simple.trim().is_empty() {
        return Err(AttributeError::EmptyField {
            entity: ENTITY,
            field: "text_simple",
        });
    }
    if juz_number == Some(0) {
        return Err(AttributeError::NonPositive {
            entity: ENTITY,
            field: "juz_number",
        });
    }
    if page_number == Some(0) {
        return Err(AttributeError::NonPositive {
            entity: ENTITY,
            field: "page_number",
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{validate_lang_code, AttributeError, NewAyah};
    use crate::model::surah::SurahId;

    fn surah_id() -> SurahId {
        SurahId::from_raw(1)
    }

    #[test]
    fn required_text_forms_are_enforced() {
        let draft = NewAyah::new(surah_id(), 1, "بِسۡمِ", "");
        assert!(matches!(
            draft.validate(),
            Err(AttributeError::EmptyField {
                field: "text_simple",
                ..
            })
        ));
    }

    #[test]
    fn optional_partition_numbers_must_be_positive_when_present() {
        let mut draft = NewAyah::new(surah_id(), 1, "بِسۡمِ", "بسم");
        draft.juz_number = Some(0);
        assert!(matches!(
            draft.validate(),
            Err(AttributeError::NonPositive {
                field: "juz_number",
                ..
            })
        ));
    }

    #[test]
    fn lang_codes_accept_iso_style_labels_only() {
        assert!(validate_lang_code("en").is_ok());
        assert!(validate_lang_code("bn").is_ok());
        assert!(validate_lang_code("urd").is_ok());
        assert!(validate_lang_code("EN").is_err());
        assert!(validate_lang_code("english").is_err());
        assert!(validate_lang_code("").is_err());
    }
}
