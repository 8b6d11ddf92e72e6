//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into the corpus operation surface.
//! - Provide bulk loading and corpus-completeness auditing above raw
//!   storage.

pub mod corpus_audit;
pub mod corpus_service;
