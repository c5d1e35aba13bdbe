//! Abbreviation pairs and acronym reconciliation.
//!
//! Abbreviation detection itself lives outside this crate; only its output
//! — abbreviation/full-form span pairs — is consumed here. The reconciler
//! runs at sentence/document match time and mirrors one-sided dictionary
//! hits; gap-filling across the whole document is the propagator's job.

use serde::{Deserialize, Serialize};

use crate::entity::{AnnotationSource, EntityAnnotation, Span};

/// An abbreviation/full-form coreference pair supplied by an external
/// abbreviation detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbbreviationPair {
    /// Span of the abbreviation occurrence
    pub abbrev_span: Span,
    /// Span of the (defining) full form
    pub fullform_span: Span,
    /// Whether this occurrence is where the abbreviation was introduced,
    /// i.e. its full form is physically adjacent
    pub defined_here: bool,
}

/// Mirror one-sided matches across abbreviation pairs.
///
/// For each pair: if exactly one side carries an annotation, the other side
/// gains one with the same entity type (`source = AcronymMirror`). Both
/// sides annotated means the independent matches are trusted as-is; neither
/// side annotated means nothing to mirror.
///
/// A pair whose spans do not address valid text is skipped with a warning;
/// it never aborts the document.
pub fn reconcile(annotations: &mut Vec<EntityAnnotation>, pairs: &[AbbreviationPair], text: &str) {
    for pair in pairs {
        let (Some(abbrev_text), Some(fullform_text)) =
            (slice_span(text, pair.abbrev_span), slice_span(text, pair.fullform_span))
        else {
            log::warn!(
                "skipping abbreviation pair with dangling span: abbrev {:?}, full form {:?}",
                pair.abbrev_span,
                pair.fullform_span
            );
            continue;
        };

        let abbrev_hit = annotations.iter().position(|a| a.span.overlaps(pair.abbrev_span));
        let fullform_hit = annotations
            .iter()
            .position(|a| a.span.overlaps(pair.fullform_span));

        match (abbrev_hit, fullform_hit) {
            (Some(i), None) => {
                let mirrored = EntityAnnotation::new(
                    pair.fullform_span,
                    annotations[i].entity_type.clone(),
                    fullform_text,
                    AnnotationSource::AcronymMirror,
                    annotations[i].confidence,
                );
                annotations.push(mirrored);
            }
            (None, Some(i)) => {
                let mirrored = EntityAnnotation::new(
                    pair.abbrev_span,
                    annotations[i].entity_type.clone(),
                    abbrev_text,
                    AnnotationSource::AcronymMirror,
                    annotations[i].confidence,
                );
                annotations.push(mirrored);
            }
            // Both matched independently, or neither did.
            _ => {}
        }
    }
    annotations.sort_by_key(|a| (a.span.start, a.span.end));
}

/// Extract the text covered by a span, or `None` when the span is dangling
/// (out of range, inverted, or off a char boundary).
pub(crate) fn slice_span(text: &str, span: Span) -> Option<&str> {
    if span.is_empty() {
        return None;
    }
    text.get(span.start..span.end)
}
