//! Dictionary compilation and candidate matching.
//!
//! A dictionary is a set of `(surface_form, entity_type)` pairs compiled
//! into an Aho-Corasick automaton. Scanning emits every candidate hit —
//! overlapping hits included — and leaves conflict resolution to the
//! resolver.
//!
//! Two modes:
//!
//! - **Exact**: surface forms are searched verbatim, word-boundary aligned,
//!   score 0.
//! - **Approximate**: the document is projected onto its case-folded
//!   alphanumeric characters (with an offset map back to the raw bytes) and
//!   the automaton runs over normalized forms, so whitespace/punctuation
//!   insertion and case variation are tolerated. Each hit carries a score
//!   counting the inserted/altered characters relative to the surface form.
//!
//! `matched_text` is always the raw covered substring; case folding is a
//! matching detail, never a reporting detail.

use std::collections::HashMap;
use std::io::BufRead;

use aho_corasick::{AhoCorasick, AhoCorasickBuilder, MatchKind};
use serde::{Deserialize, Serialize};

use crate::entity::{EntityType, Span};
use crate::error::{Error, Result};

/// Matching mode for a compiled dictionary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchMode {
    /// Verbatim surface-form occurrences only.
    #[default]
    Exact,
    /// Tolerate whitespace/punctuation insertion and case variation.
    Approximate,
}

/// A single compiled dictionary entry.
///
/// Immutable once the dictionary is compiled; the dictionary lives for the
/// whole tagging session and is rebuilt only on reconfiguration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DictionaryEntry {
    /// Literal string to match against document text
    pub surface_form: String,
    /// Entity type assigned on match
    pub entity_type: EntityType,
    /// Case-folded alphanumeric projection, used for approximate matching
    pub normalized_form: String,
}

/// A candidate matched span, before conflict resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateChunk {
    /// Covered span in the document
    pub span: Span,
    /// Index of the matched entry in the compiled dictionary
    pub entry_id: usize,
    /// Entity type of the matched entry
    pub entity_type: EntityType,
    /// Edit-distance-like cost; 0 = exact occurrence of the surface form
    pub score: f64,
    /// Raw covered substring (may differ from the surface form)
    pub matched_text: String,
}

impl CandidateChunk {
    /// Map the match score onto a [0, 1] confidence.
    #[must_use]
    pub fn confidence(&self) -> f64 {
        (1.0 - self.score / 10.0).clamp(0.1, 1.0)
    }
}

/// A compiled synonym dictionary.
///
/// Read-only after compilation and safe to share across worker threads; one
/// instance serves arbitrarily many documents.
#[derive(Debug)]
pub struct Dictionary {
    entries: Vec<DictionaryEntry>,
    mode: MatchMode,
    /// Exact mode: one pattern per entry, same index.
    exact: AhoCorasick,
    /// Approximate mode: one pattern per distinct normalized form.
    folded: AhoCorasick,
    /// Entry ids behind each folded pattern.
    folded_groups: Vec<Vec<usize>>,
}

impl Dictionary {
    /// Compile `(surface_form, entity_type)` pairs into a searchable
    /// dictionary.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDictionary`] for an empty surface form or a
    /// surface form with no alphanumeric content. Malformed entries are
    /// rejected here, never at scan time.
    pub fn compile(pairs: Vec<(String, EntityType)>, mode: MatchMode) -> Result<Self> {
        let mut entries = Vec::with_capacity(pairs.len());
        for (i, (surface_form, entity_type)) in pairs.into_iter().enumerate() {
            if surface_form.is_empty() {
                return Err(Error::invalid_dictionary(format!(
                    "entry {i} has an empty surface form"
                )));
            }
            let normalized_form = fold_string(&surface_form);
            if normalized_form.is_empty() {
                return Err(Error::invalid_dictionary(format!(
                    "entry {i} ({surface_form:?}) has no alphanumeric content"
                )));
            }
            entries.push(DictionaryEntry {
                surface_form,
                entity_type,
                normalized_form,
            });
        }

        let exact = AhoCorasickBuilder::new()
            .match_kind(MatchKind::Standard)
            .build(entries.iter().map(|e| e.surface_form.as_str()))
            .map_err(|e| Error::invalid_dictionary(e.to_string()))?;

        // Distinct normalized forms, in first-seen entry order.
        let mut seen: HashMap<&str, usize> = HashMap::new();
        let mut folded_patterns: Vec<&str> = Vec::new();
        let mut folded_groups: Vec<Vec<usize>> = Vec::new();
        for (id, entry) in entries.iter().enumerate() {
            match seen.get(entry.normalized_form.as_str()) {
                Some(&slot) => folded_groups[slot].push(id),
                None => {
                    seen.insert(&entry.normalized_form, folded_patterns.len());
                    folded_patterns.push(&entry.normalized_form);
                    folded_groups.push(vec![id]);
                }
            }
        }
        let folded = AhoCorasickBuilder::new()
            .match_kind(MatchKind::Standard)
            .build(folded_patterns)
            .map_err(|e| Error::invalid_dictionary(e.to_string()))?;

        Ok(Self {
            entries,
            mode,
            exact,
            folded,
            folded_groups,
        })
    }

    /// Load a dictionary from tab-separated `surface_form<TAB>TYPE` lines.
    ///
    /// Blank lines and lines starting with `#` are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] on read failure and
    /// [`Error::InvalidDictionary`] for lines without a tab separator or
    /// entries rejected by [`Dictionary::compile`].
    pub fn from_tsv<R: BufRead>(reader: R, mode: MatchMode) -> Result<Self> {
        let mut pairs = Vec::new();
        for (lineno, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim_end_matches(['\r', '\n']);
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (surface, label) = line.split_once('\t').ok_or_else(|| {
                Error::invalid_dictionary(format!("line {}: missing tab separator", lineno + 1))
            })?;
            pairs.push((surface.to_string(), EntityType::from_label(label.trim())));
        }
        Self::compile(pairs, mode)
    }

    /// Matching mode this dictionary was compiled for.
    #[must_use]
    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    /// Number of compiled entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the dictionary holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up a compiled entry by id.
    #[must_use]
    pub fn entry(&self, id: usize) -> Option<&DictionaryEntry> {
        self.entries.get(id)
    }

    /// Scan a text buffer and emit every candidate hit.
    ///
    /// Overlapping hits are all reported: one span may match several
    /// entries, and one entry may match several overlapping spans.
    #[must_use]
    pub fn scan(&self, text: &str) -> Vec<CandidateChunk> {
        match self.mode {
            MatchMode::Exact => self.scan_exact(text),
            MatchMode::Approximate => self.scan_approximate(text),
        }
    }

    fn scan_exact(&self, text: &str) -> Vec<CandidateChunk> {
        let mut chunks = Vec::new();
        for m in self.exact.find_overlapping_iter(text) {
            if !boundary_aligned(text, m.start(), m.end()) {
                continue;
            }
            let entry = &self.entries[m.pattern().as_usize()];
            chunks.push(CandidateChunk {
                span: Span::new(m.start(), m.end()),
                entry_id: m.pattern().as_usize(),
                entity_type: entry.entity_type.clone(),
                score: 0.0,
                matched_text: text[m.start()..m.end()].to_string(),
            });
        }
        chunks
    }

    fn scan_approximate(&self, text: &str) -> Vec<CandidateChunk> {
        let projection = Projection::build(text);
        let mut chunks = Vec::new();

        for m in self.folded.find_overlapping_iter(projection.folded.as_str()) {
            let (start, end) = projection.raw_span(m.start(), m.end());
            if !boundary_aligned(text, start, end) {
                continue;
            }
            let matched = &text[start..end];

            for &entry_id in &self.folded_groups[m.pattern().as_usize()] {
                let entry = &self.entries[entry_id];
                let score = approx_score(matched, &entry.surface_form);
                chunks.push(CandidateChunk {
                    span: Span::new(start, end),
                    entry_id,
                    entity_type: entry.entity_type.clone(),
                    score,
                    matched_text: matched.to_string(),
                });

                // Bracket-wrapped variant: "(L1CAM)" alongside "L1CAM". The
                // resolver's enclosure rule arbitrates between the two.
                if let Some((ws, we)) = bracket_wrap_span(text, start, end) {
                    chunks.push(CandidateChunk {
                        span: Span::new(ws, we),
                        entry_id,
                        entity_type: entry.entity_type.clone(),
                        score: score + 2.0,
                        matched_text: text[ws..we].to_string(),
                    });
                }
            }
        }
        chunks
    }
}

/// Case-folded alphanumeric projection of a text, with a map from folded
/// byte positions back to raw byte offsets.
struct Projection {
    folded: String,
    /// Raw byte offset of the source char, per folded byte.
    starts: Vec<usize>,
    /// Raw byte offset just past the source char, per folded byte.
    ends: Vec<usize>,
}

impl Projection {
    fn build(text: &str) -> Self {
        let mut folded = String::with_capacity(text.len());
        let mut starts = Vec::with_capacity(text.len());
        let mut ends = Vec::with_capacity(text.len());
        for (offset, ch) in text.char_indices() {
            if !ch.is_alphanumeric() {
                continue;
            }
            let char_end = offset + ch.len_utf8();
            for lc in ch.to_lowercase() {
                let before = folded.len();
                folded.push(lc);
                for _ in before..folded.len() {
                    starts.push(offset);
                    ends.push(char_end);
                }
            }
        }
        Self {
            folded,
            starts,
            ends,
        }
    }

    /// Map a folded byte range back onto the raw text.
    fn raw_span(&self, folded_start: usize, folded_end: usize) -> (usize, usize) {
        debug_assert!(folded_start < folded_end);
        (self.starts[folded_start], self.ends[folded_end - 1])
    }
}

/// Case-folded alphanumeric projection of a single string.
pub(crate) fn fold_string(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Word-boundary check: the chars adjacent to `[start, end)` must not be
/// alphanumeric, so matches never start or stop mid-token.
fn boundary_aligned(text: &str, start: usize, end: usize) -> bool {
    let before_ok = text[..start]
        .chars()
        .next_back()
        .map_or(true, |c| !c.is_alphanumeric());
    let after_ok = text[end..]
        .chars()
        .next()
        .map_or(true, |c| !c.is_alphanumeric());
    before_ok && after_ok
}

/// Cost of an approximate hit relative to the entry's surface form: the
/// char-count delta (inserted/removed boundary characters) plus the number
/// of case-altered alphanumeric characters.
fn approx_score(matched: &str, surface_form: &str) -> f64 {
    if matched == surface_form {
        return 0.0;
    }
    let len_delta = matched
        .chars()
        .count()
        .abs_diff(surface_form.chars().count());
    let case_delta = matched
        .chars()
        .filter(|c| c.is_alphanumeric())
        .zip(surface_form.chars().filter(|c| c.is_alphanumeric()))
        .filter(|(a, b)| a != b)
        .count();
    (len_delta + case_delta) as f64
}

const BRACKET_PAIRS: [(char, char); 3] = [('(', ')'), ('[', ']'), ('{', '}')];

/// If `[start, end)` is immediately wrapped by a matching bracket pair,
/// return the widened span including both brackets.
fn bracket_wrap_span(text: &str, start: usize, end: usize) -> Option<(usize, usize)> {
    let open = text[..start].chars().next_back()?;
    let close = text[end..].chars().next()?;
    if BRACKET_PAIRS.contains(&(open, close)) {
        Some((start - open.len_utf8(), end + close.len_utf8()))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gene_dict(surfaces: &[&str], mode: MatchMode) -> Dictionary {
        let pairs = surfaces
            .iter()
            .map(|s| (s.to_string(), EntityType::Gene))
            .collect();
        Dictionary::compile(pairs, mode).unwrap()
    }

    #[test]
    fn test_empty_surface_form_rejected() {
        let err = Dictionary::compile(
            vec![(String::new(), EntityType::Gene)],
            MatchMode::Exact,
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidDictionary(_)));
    }

    #[test]
    fn test_punctuation_only_surface_form_rejected() {
        let err = Dictionary::compile(
            vec![("--".to_string(), EntityType::Gene)],
            MatchMode::Approximate,
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidDictionary(_)));
    }

    #[test]
    fn test_exact_scan_word_boundary() {
        let dict = gene_dict(&["BRCA1"], MatchMode::Exact);
        let chunks = dict.scan("BRCA1 and BRCA1A and xBRCA1.");
        // Only the standalone occurrence; "BRCA1A" and "xBRCA1" are mid-token.
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].span, Span::new(0, 5));
        assert_eq!(chunks[0].score, 0.0);
        assert_eq!(chunks[0].matched_text, "BRCA1");
    }

    #[test]
    fn test_exact_scan_is_case_sensitive() {
        let dict = gene_dict(&["BRCA1"], MatchMode::Exact);
        assert!(dict.scan("brca1 mutation").is_empty());
    }

    #[test]
    fn test_exact_scan_multiple_entries_same_span() {
        let dict = Dictionary::compile(
            vec![
                ("BRCA1".to_string(), EntityType::Gene),
                ("BRCA1".to_string(), EntityType::Protein),
            ],
            MatchMode::Exact,
        )
        .unwrap();
        let chunks = dict.scan("BRCA1");
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].span, chunks[1].span);
        assert_ne!(chunks[0].entity_type, chunks[1].entity_type);
    }

    #[test]
    fn test_approximate_case_variation() {
        let dict = gene_dict(&["BRCA1"], MatchMode::Approximate);
        let chunks = dict.scan("the brca1 gene");
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].matched_text, "brca1"); // raw text, not folded
        assert_eq!(chunks[0].score, 4.0); // four case-altered chars
    }

    #[test]
    fn test_approximate_punctuation_insertion() {
        let dict = gene_dict(&["L1CAM"], MatchMode::Approximate);
        let chunks = dict.scan("L1 CAM signaling");
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].matched_text, "L1 CAM");
        assert_eq!(chunks[0].score, 1.0); // one inserted space
    }

    #[test]
    fn test_approximate_emits_wrapped_variant() {
        let dict = gene_dict(&["L1CAM"], MatchMode::Approximate);
        let mut chunks = dict.scan("(L1CAM)");
        chunks.sort_by_key(|c| c.span);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].span, Span::new(0, 7));
        assert_eq!(chunks[0].matched_text, "(L1CAM)");
        assert_eq!(chunks[0].score, 2.0);
        assert_eq!(chunks[1].span, Span::new(1, 6));
        assert_eq!(chunks[1].score, 0.0);
    }

    #[test]
    fn test_approximate_exact_occurrence_scores_zero() {
        // A surface form with interior punctuation still scores 0 on a
        // verbatim occurrence.
        let dict = gene_dict(&["Di(hydroxy)-transferase"], MatchMode::Approximate);
        let chunks = dict.scan("found Di(hydroxy)-transferase here");
        assert!(chunks.iter().any(|c| c.score == 0.0
            && c.matched_text == "Di(hydroxy)-transferase"));
    }

    #[test]
    fn test_approximate_respects_word_boundary() {
        let dict = gene_dict(&["CAM"], MatchMode::Approximate);
        // "CAM" inside "L1CAM" starts mid-token.
        assert!(dict.scan("L1CAM").is_empty());
    }

    #[test]
    fn test_from_tsv() {
        let tsv = "# comment\nBRCA1\tGENE\n\naspirin\tCHEM\n";
        let dict = Dictionary::from_tsv(tsv.as_bytes(), MatchMode::Exact).unwrap();
        assert_eq!(dict.len(), 2);
        assert_eq!(dict.entry(0).unwrap().entity_type, EntityType::Gene);
        assert_eq!(dict.entry(1).unwrap().entity_type, EntityType::Chemical);
    }

    #[test]
    fn test_from_tsv_missing_tab() {
        let err = Dictionary::from_tsv("BRCA1 GENE".as_bytes(), MatchMode::Exact).unwrap_err();
        assert!(matches!(err, Error::InvalidDictionary(_)));
    }

    #[test]
    fn test_chunk_confidence_mapping() {
        let dict = gene_dict(&["L1CAM"], MatchMode::Approximate);
        let chunks = dict.scan("L1 CAM");
        let exact = CandidateChunk {
            score: 0.0,
            ..chunks[0].clone()
        };
        assert!((exact.confidence() - 1.0).abs() < f64::EPSILON);
        assert!(chunks[0].confidence() < 1.0);
        assert!(chunks[0].confidence() >= 0.1);
    }
}
