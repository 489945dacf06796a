//! Redraft Text — chunking, entity extraction, and rewrite validation.

pub mod chunking;
pub mod entities;
pub mod validate;

pub use chunking::{split_text, TextChunk};
pub use entities::{EntitySet, HeuristicAnalyzer, TextAnalyzer};
pub use validate::{validate_and_sanitize, ValidationReport};
