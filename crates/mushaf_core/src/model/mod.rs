//! Domain model for the Quranic text corpus.
//!
//! # Responsibility
//! - Define the four entity kinds of the corpus hierarchy
//!   (surah -> ayah -> word -> letter annotation) and their draft types.
//! - Own attribute-level validation shared by every write path.
//!
//! # Invariants
//! - Every entity is identified by an opaque, store-assigned id newtype.
//! - Identity fields (`surah_number`, owning parent, position) never change
//!   after creation; attribute validation rejects any attempt.
//! - Position fields are always positive; sibling uniqueness is enforced by
//!   the repository layer, not here.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod ayah;
pub mod letter;
pub mod surah;
pub mod word;

/// Attribute-level validation failure shared by all entity kinds.
///
/// Repositories surface this as the `InvalidAttribute` error kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeError {
    /// Required text field is empty after trimming.
    EmptyField {
        entity: &'static str,
        field: &'static str,
    },
    /// Numeric field must be a positive integer.
    NonPositive {
        entity: &'static str,
        field: &'static str,
    },
    /// `letter_arabic` must be exactly one character.
    NotSingleLetter(String),
    /// Text field exceeds its maximum length in characters.
    TooLong {
        entity: &'static str,
        field: &'static str,
        max_chars: usize,
    },
    /// Translation language code is not a lowercase ISO-style code.
    InvalidLanguageCode(String),
    /// Update attempted to change an immutable identity field.
    IdentityChanged {
        entity: &'static str,
        field: &'static str,
    },
}

impl Display for AttributeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyField { entity, field } => {
                write!(f, "{entity}.{field} must not be empty")
            }
            Self::NonPositive { entity, field } => {
                write!(f, "{entity}.{field} must be a positive integer")
            }
            Self::NotSingleLetter(value) => {
                write!(
                    f,
                    "letter_arabic must be exactly one character, got `{value}`"
                )
            }
            Self::TooLong {
                entity,
                field,
                max_chars,
            } => write!(f, "{entity}.{field} must be at most {max_chars} characters"),
            Self::InvalidLanguageCode(code) => {
                write!(f, "invalid translation language code `{code}`")
            }
            Self::IdentityChanged { entity, field } => {
                write!(f, "{entity}.{field} is immutable and cannot be updated")
            }
        }
    }
}

impl Error for AttributeError {}
