//! Pipeline orchestration.
//!
//! A [`Tagger`] owns the compiled dictionary, the negative list and the
//! configuration, and runs the full per-document pipeline:
//!
//! ```text
//! Matcher → Boundary Filter → Overlap Resolver → Negative List
//!         → Acronym Reconciler → Consistency Propagator
//! ```
//!
//! Everything the tagger holds is read-only after construction, so one
//! instance can be shared by reference across worker threads, each
//! processing its own documents.

use serde::{Deserialize, Serialize};

use crate::abbrev::{reconcile, AbbreviationPair};
use crate::boundary::is_contaminated;
use crate::dictionary::{Dictionary, MatchMode};
use crate::entity::{EntityAnnotation, EntityType};
use crate::error::{Error, Result};
use crate::negative::{NegativeList, NegativeListEntry};
use crate::propagate::{propagate_abbreviations, propagate_strings};
use crate::resolver::resolve;

/// Configuration for a tagging session.
///
/// Assembled elsewhere and treated as inert data here; validated once at
/// [`Tagger::new`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaggerConfig {
    /// Exact vs. approximate dictionary matching
    pub mode: MatchMode,
    /// Deny rules applied to winning matches
    pub negative_entries: Vec<NegativeListEntry>,
    /// Mirror one-sided matches across abbreviation pairs
    pub reconcile_acronyms: bool,
    /// Run the document-level consistency propagator
    pub propagate_consistency: bool,
    /// Entity types eligible for string/abbreviation propagation
    pub types_of_interest: Vec<EntityType>,
}

impl Default for TaggerConfig {
    fn default() -> Self {
        Self {
            mode: MatchMode::Exact,
            negative_entries: Vec::new(),
            reconcile_acronyms: true,
            propagate_consistency: true,
            types_of_interest: Vec::new(),
        }
    }
}

impl TaggerConfig {
    /// Start from defaults: exact matching, reconciler and propagator on.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the matching mode.
    #[must_use]
    pub fn mode(mut self, mode: MatchMode) -> Self {
        self.mode = mode;
        self
    }

    /// Add a deny rule.
    #[must_use]
    pub fn deny(mut self, entry: NegativeListEntry) -> Self {
        self.negative_entries.push(entry);
        self
    }

    /// Enable or disable the acronym reconciler.
    #[must_use]
    pub fn reconcile_acronyms(mut self, enabled: bool) -> Self {
        self.reconcile_acronyms = enabled;
        self
    }

    /// Enable or disable the consistency propagator.
    #[must_use]
    pub fn propagate_consistency(mut self, enabled: bool) -> Self {
        self.propagate_consistency = enabled;
        self
    }

    /// Set the entity types propagation may fire for.
    #[must_use]
    pub fn types_of_interest(mut self, types: Vec<EntityType>) -> Self {
        self.types_of_interest = types;
        self
    }
}

/// Dictionary-based entity tagger.
///
/// Compiled state is read-only; `Tagger` is `Send + Sync` and one instance
/// serves arbitrarily many documents, sequentially or from parallel
/// workers.
#[derive(Debug)]
pub struct Tagger {
    dictionary: Dictionary,
    negative: NegativeList,
    config: TaggerConfig,
}

impl Tagger {
    /// Build a tagger from a compiled dictionary and configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] when the propagator is enabled
    /// without any types of interest, or when the dictionary was compiled
    /// for a different matching mode than the configuration asks for.
    /// Configuration problems fail here, before any document is processed.
    pub fn new(dictionary: Dictionary, config: TaggerConfig) -> Result<Self> {
        if config.propagate_consistency && config.types_of_interest.is_empty() {
            return Err(Error::invalid_config(
                "consistency propagation enabled but no entity types of interest configured",
            ));
        }
        if dictionary.mode() != config.mode {
            return Err(Error::invalid_config(format!(
                "dictionary compiled for {:?} matching but configuration asks for {:?}",
                dictionary.mode(),
                config.mode
            )));
        }
        let negative = NegativeList::new(&config.negative_entries);
        Ok(Self {
            dictionary,
            negative,
            config,
        })
    }

    /// The compiled dictionary backing this tagger.
    #[must_use]
    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    /// Annotate one document.
    ///
    /// `pairs` is the abbreviation detector's output for this document; pass
    /// an empty slice when no detector ran. A document without matches
    /// yields `Ok` with an empty set — that is never an error.
    ///
    /// The returned annotations are sorted by span and pairwise disjoint.
    pub fn annotate(
        &self,
        text: &str,
        pairs: &[AbbreviationPair],
    ) -> Result<Vec<EntityAnnotation>> {
        let mut chunks = self.dictionary.scan(text);
        chunks.retain(|c| !is_contaminated(&c.matched_text));

        let mut annotations = resolve(chunks);
        annotations.retain(|a| !self.negative.is_denied(&a.text, &a.entity_type));

        if self.config.reconcile_acronyms {
            reconcile(&mut annotations, pairs, text);
        }

        if self.config.propagate_consistency {
            propagate_strings(&mut annotations, text, &self.config.types_of_interest);
            propagate_abbreviations(
                &mut annotations,
                pairs,
                text,
                &self.config.types_of_interest,
            );
        }

        annotations.sort_by_key(|a| (a.span.start, a.span.end));
        debug_assert!(
            annotations
                .windows(2)
                .all(|w| w[0].span.end <= w[1].span.start),
            "pipeline emitted overlapping annotations"
        );
        Ok(annotations)
    }
}
