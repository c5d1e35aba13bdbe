//! # dictag
//!
//! Dictionary-based entity tagging for Rust.
//!
//! Given a document and a precompiled synonym dictionary (surface form →
//! entity type), `dictag` finds every dictionary occurrence — exactly or
//! approximately, tolerating punctuation/whitespace and case variation —
//! resolves conflicts among overlapping candidates, and propagates labels
//! consistently across the document via repeated text and abbreviation
//! coreference.
//!
//! The pipeline is deterministic and rule-governed; there is no statistical
//! disambiguation. Per document:
//!
//! | Stage | Module | Job |
//! |-------|--------|-----|
//! | Matcher | [`dictionary`] | emit candidate hits, overlaps included |
//! | Boundary filter | [`boundary`] | drop bracket-straddling fragments |
//! | Overlap resolver | [`resolver`] | one winner per overlap group |
//! | Negative list | [`negative`] | drop deny-listed matches |
//! | Acronym reconciler | [`abbrev`] | mirror one-sided abbreviation hits |
//! | Consistency propagator | [`propagate`] | document-wide label copying |
//!
//! The final annotation set never contains two intersecting spans.
//!
//! ## Quick start
//!
//! ```rust
//! use dictag::{Dictionary, EntityType, MatchMode, Tagger, TaggerConfig};
//!
//! let dictionary = Dictionary::compile(
//!     vec![("BRCA1".to_string(), EntityType::Gene)],
//!     MatchMode::Exact,
//! )?;
//! let tagger = Tagger::new(
//!     dictionary,
//!     TaggerConfig::new().types_of_interest(vec![EntityType::Gene]),
//! )?;
//!
//! let annotations = tagger.annotate("BRCA1 is mutated; BRCA1 loss follows.", &[])?;
//! assert_eq!(annotations.len(), 2);
//! # Ok::<(), dictag::Error>(())
//! ```
//!
//! ## Sharing across threads
//!
//! The dictionary and negative list are compiled once and read-only
//! thereafter; a [`Tagger`] is `Send + Sync`, so parallel workers each
//! borrow the same instance and process independent documents with no
//! shared mutable state.

pub mod abbrev;
pub mod boundary;
pub mod dictionary;
pub mod entity;
pub mod error;
pub mod negative;
pub mod propagate;
pub mod resolver;
pub mod tagger;

pub mod prelude {
    //! Commonly used items, re-exported for convenience.
    pub use crate::abbrev::AbbreviationPair;
    pub use crate::dictionary::{Dictionary, MatchMode};
    pub use crate::entity::{AnnotationSource, EntityAnnotation, EntityType, Span};
    pub use crate::error::{Error, Result};
    pub use crate::negative::NegativeListEntry;
    pub use crate::tagger::{Tagger, TaggerConfig};
}

// Re-exports
pub use abbrev::AbbreviationPair;
pub use dictionary::{CandidateChunk, Dictionary, DictionaryEntry, MatchMode};
pub use entity::{AnnotationSource, EntityAnnotation, EntityType, Span};
pub use error::{Error, Result};
pub use negative::{NegativeList, NegativeListEntry};
pub use tagger::{Tagger, TaggerConfig};
