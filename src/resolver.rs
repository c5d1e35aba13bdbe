//! Overlap grouping and winner selection.
//!
//! Candidate chunks are sorted by span and swept into maximal
//! transitively-overlapping groups: a chunk joins the open group when it
//! intersects the running maximum end, which over sorted starts yields
//! exactly the union of intersecting intervals. Dense clusters of
//! duplicate-span candidates stay O(n log n) — the sweep never compares
//! pairs across groups.
//!
//! Within a group, one winner is selected:
//!
//! 1. a candidate that is merely a symmetric-bracket wrapper around a
//!    competitor loses to the unwrapped one — the wrapping is noise, not
//!    information;
//! 2. the longer covered span wins — a longer dictionary hit is the more
//!    specific one;
//! 3. the strictly lower score wins — exact beats approximate;
//! 4. the lowest entry id wins, for reproducibility.

use crate::dictionary::CandidateChunk;
use crate::entity::{AnnotationSource, EntityAnnotation};

/// Resolve candidate chunks into one annotation per overlap group.
///
/// Distinct groups are always disjoint in span, so the output never
/// contains two annotations with intersecting spans.
#[must_use]
pub fn resolve(mut chunks: Vec<CandidateChunk>) -> Vec<EntityAnnotation> {
    if chunks.is_empty() {
        return Vec::new();
    }

    chunks.sort_by_key(|c| (c.span.start, c.span.end, c.entry_id));

    let mut annotations = Vec::new();
    let mut group_start = 0;
    let mut group_max_end = chunks[0].span.end;

    for i in 1..chunks.len() {
        if chunks[i].span.start < group_max_end {
            group_max_end = group_max_end.max(chunks[i].span.end);
        } else {
            annotations.push(select_winner(&chunks[group_start..i]));
            group_start = i;
            group_max_end = chunks[i].span.end;
        }
    }
    annotations.push(select_winner(&chunks[group_start..]));

    debug_assert!(
        annotations
            .windows(2)
            .all(|w| w[0].span.end <= w[1].span.start),
        "resolver emitted overlapping annotations"
    );
    annotations
}

/// Pick the winning chunk of one overlap group.
fn select_winner(group: &[CandidateChunk]) -> EntityAnnotation {
    debug_assert!(!group.is_empty());

    // Drop bracket-wraps of other group members first; a wrapped variant
    // must never win on raw length.
    let winner = group
        .iter()
        .filter(|c| !group.iter().any(|other| is_bracket_wrap(c, other)))
        .reduce(|best, c| if beats(c, best) { c } else { best })
        .unwrap_or(&group[0]);

    EntityAnnotation::new(
        winner.span,
        winner.entity_type.clone(),
        winner.matched_text.clone(),
        AnnotationSource::DictionaryMatch,
        winner.confidence(),
    )
}

/// Whether `a` strictly beats `b` under the selection policy.
fn beats(a: &CandidateChunk, b: &CandidateChunk) -> bool {
    if a.span.len() != b.span.len() {
        return a.span.len() > b.span.len();
    }
    if a.score != b.score {
        return a.score < b.score;
    }
    a.entry_id < b.entry_id
}

/// Whether `outer` is `inner` plus exactly one symmetric bracket pair.
fn is_bracket_wrap(outer: &CandidateChunk, inner: &CandidateChunk) -> bool {
    const PAIRS: [(char, char); 3] = [('(', ')'), ('[', ']'), ('{', '}')];

    let mut chars = outer.matched_text.chars();
    let (Some(first), Some(last)) = (chars.next(), outer.matched_text.chars().next_back()) else {
        return false;
    };
    if !PAIRS.contains(&(first, last)) {
        return false;
    }
    outer.span.start + first.len_utf8() == inner.span.start
        && inner.span.end + last.len_utf8() == outer.span.end
}
