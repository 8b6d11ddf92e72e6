//! Core domain logic for the Mushaf corpus store.
//! This crate is the single source of truth for corpus invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::ayah::{Ayah, AyahId, NewAyah};
pub use model::letter::{
    base_letter_count, AnnotationId, HarakatType, LetterAnnotation, NewLetterAnnotation,
};
pub use model::surah::{NewSurah, RevelationPlace, Surah, SurahId};
pub use model::word::{NewWord, Word, WordId};
pub use model::AttributeError;
pub use repo::ayah_repo::{AyahRepository, SqliteAyahRepository};
pub use repo::letter_repo::{LetterRepository, SqliteLetterRepository};
pub use repo::surah_repo::{SqliteSurahRepository, SurahRepository};
pub use repo::word_repo::{SqliteWordRepository, WordRepository};
pub use repo::{EntityRef, RepoError, RepoResult};
pub use service::corpus_audit::CorpusIssue;
pub use service::corpus_service::{
    AyahSeed, BatchSummary, CorpusBatch, CorpusService, LetterSeed, SurahSeed, WordSeed,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
