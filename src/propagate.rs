//! Document-level consistency propagation.
//!
//! Runs once per document, after every sentence has been matched and
//! reconciled, over the complete annotation set and the raw text. Two
//! independent passes in a fixed order:
//!
//! 1. **String-based** — identical covered text elsewhere in the document
//!    receives the same label, for the entity types of interest.
//! 2. **Abbreviation-based** — labels are copied between an abbreviation
//!    and its defining full form when only one side carries one.
//!
//! Both passes only ever add annotations at spans disjoint from existing
//! ones (never relocating, never partially overlapping) and both are
//! idempotent: a second run adds nothing.

use crate::abbrev::{slice_span, AbbreviationPair};
use crate::entity::{AnnotationSource, EntityAnnotation, EntityType, Span};

/// String-based pass: copy labels onto every further textual occurrence of
/// annotated text.
///
/// For each type of interest, the first annotation (in span order) per
/// covered text becomes the representative; every other occurrence of that
/// exact substring in the document gains a `StringPropagation` annotation,
/// unless the occurrence span intersects an existing annotation.
pub fn propagate_strings(
    annotations: &mut Vec<EntityAnnotation>,
    text: &str,
    types_of_interest: &[EntityType],
) {
    // Representatives in first-seen span order, deduplicated on
    // (text, type), so the output is deterministic.
    let mut sorted: Vec<&EntityAnnotation> = annotations.iter().collect();
    sorted.sort_by_key(|a| (a.span.start, a.span.end));

    let mut representatives: Vec<(String, EntityType, f64)> = Vec::new();
    for annotation in sorted {
        if annotation.text.is_empty() || !types_of_interest.contains(&annotation.entity_type) {
            continue;
        }
        let seen = representatives
            .iter()
            .any(|(t, ty, _)| *t == annotation.text && *ty == annotation.entity_type);
        if !seen {
            representatives.push((
                annotation.text.clone(),
                annotation.entity_type.clone(),
                annotation.confidence,
            ));
        }
    }

    for (needle, entity_type, confidence) in representatives {
        for (start, _) in text.match_indices(&needle) {
            let span = Span::new(start, start + needle.len());
            // Exact-span duplicates are already annotated; partial overlaps
            // would break the no-overlap invariant. Both are skipped.
            if annotations.iter().any(|a| a.span.overlaps(span)) {
                continue;
            }
            annotations.push(EntityAnnotation::new(
                span,
                entity_type.clone(),
                needle.clone(),
                AnnotationSource::StringPropagation,
                confidence,
            ));
        }
    }
    annotations.sort_by_key(|a| (a.span.start, a.span.end));
}

/// Abbreviation-based pass: fill one-sided gaps across abbreviation pairs.
///
/// For each pair, the first qualifying annotation (a type of interest, in
/// span order) on one side is copied onto the other side when that side
/// carries none. Disagreement between two annotated sides is left alone —
/// this pass fills gaps, it does not arbitrate.
///
/// A dangling pair is a propagation-local failure: warn and continue.
pub fn propagate_abbreviations(
    annotations: &mut Vec<EntityAnnotation>,
    pairs: &[AbbreviationPair],
    text: &str,
    types_of_interest: &[EntityType],
) {
    for pair in pairs {
        let (Some(abbrev_text), Some(fullform_text)) =
            (slice_span(text, pair.abbrev_span), slice_span(text, pair.fullform_span))
        else {
            log::warn!(
                "skipping abbreviation propagation for dangling span: abbrev {:?}, full form {:?}",
                pair.abbrev_span,
                pair.fullform_span
            );
            continue;
        };

        let abbrev_label = first_qualifying(annotations, pair.abbrev_span, types_of_interest);
        let fullform_label = first_qualifying(annotations, pair.fullform_span, types_of_interest);

        match (abbrev_label, fullform_label) {
            (None, Some((entity_type, confidence))) => {
                copy_label(
                    annotations,
                    pair.abbrev_span,
                    abbrev_text,
                    entity_type,
                    confidence,
                );
            }
            (Some((entity_type, confidence)), None) => {
                copy_label(
                    annotations,
                    pair.fullform_span,
                    fullform_text,
                    entity_type,
                    confidence,
                );
            }
            // Both labeled (no arbitration) or neither labeled.
            _ => {}
        }
    }
    annotations.sort_by_key(|a| (a.span.start, a.span.end));
}

/// First annotation of a type of interest overlapping `span`, in span order.
fn first_qualifying(
    annotations: &[EntityAnnotation],
    span: Span,
    types_of_interest: &[EntityType],
) -> Option<(EntityType, f64)> {
    annotations
        .iter()
        .filter(|a| a.span.overlaps(span) && types_of_interest.contains(&a.entity_type))
        .min_by_key(|a| (a.span.start, a.span.end))
        .map(|a| (a.entity_type.clone(), a.confidence))
}

/// Add a propagated annotation at `span` unless anything already sits there.
fn copy_label(
    annotations: &mut Vec<EntityAnnotation>,
    span: Span,
    text: &str,
    entity_type: EntityType,
    confidence: f64,
) {
    // A non-qualifying annotation may still occupy the span; gap-filling
    // never overwrites or partially overlaps it.
    if annotations.iter().any(|a| a.span.overlaps(span)) {
        return;
    }
    annotations.push(EntityAnnotation::new(
        span,
        entity_type,
        text,
        AnnotationSource::AbbreviationPropagation,
        confidence,
    ));
}
