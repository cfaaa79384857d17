//! # aqari-kb
//!
//! In-memory knowledge base loaded once from a CSV export of the keyword
//! sheet, plus the matcher that resolves free-text messages against it.
//! The index is immutable after load and shared behind an `Arc`; all
//! normalization happens at build time, never per request.

mod index;
mod matcher;

pub use index::{KeywordEntry, KnowledgeBase, RawRow, StructuralType};
pub use matcher::Matcher;
