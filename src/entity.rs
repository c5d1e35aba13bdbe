//! Annotation types for dictionary-based entity tagging.

use serde::{Deserialize, Serialize};

/// Entity type classification.
///
/// A closed inventory of the classes biomedical dictionaries carry, with an
/// `Other` escape hatch for project-specific types. Resolved once when the
/// dictionary is compiled, never re-parsed per match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityType {
    /// Gene or gene product symbol (GENE)
    Gene,
    /// Protein name (PROT)
    Protein,
    /// Chemical or drug (CHEM)
    Chemical,
    /// Disease or disorder (DISO)
    Disease,
    /// Organism/species (SPEC)
    Species,
    /// Cell line (CELL)
    CellLine,
    /// Other/project-specific entity type
    Other(String),
}

impl EntityType {
    /// Convert to label string.
    #[must_use]
    pub fn as_label(&self) -> &str {
        match self {
            EntityType::Gene => "GENE",
            EntityType::Protein => "PROT",
            EntityType::Chemical => "CHEM",
            EntityType::Disease => "DISO",
            EntityType::Species => "SPEC",
            EntityType::CellLine => "CELL",
            EntityType::Other(s) => s.as_str(),
        }
    }

    /// Parse from a label string.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label.to_uppercase().as_str() {
            "GENE" => EntityType::Gene,
            "PROT" | "PROTEIN" => EntityType::Protein,
            "CHEM" | "CHEMICAL" | "DRUG" => EntityType::Chemical,
            "DISO" | "DISEASE" => EntityType::Disease,
            "SPEC" | "SPECIES" | "ORGANISM" => EntityType::Species,
            "CELL" | "CELL_LINE" => EntityType::CellLine,
            other => EntityType::Other(other.to_string()),
        }
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_label())
    }
}

/// Half-open byte span `[start, end)` into the document text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Span {
    /// Start byte offset (inclusive)
    pub start: usize,
    /// End byte offset (exclusive)
    pub end: usize,
}

impl Span {
    /// Create a new span.
    #[must_use]
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Whether the span covers nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Check if this span intersects another (half-open semantics).
    #[must_use]
    pub fn overlaps(&self, other: Span) -> bool {
        !(self.end <= other.start || other.end <= self.start)
    }

    /// Check if this span fully contains another.
    #[must_use]
    pub fn contains(&self, other: Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Calculate overlap ratio (IoU) with another span.
    #[must_use]
    pub fn overlap_ratio(&self, other: Span) -> f64 {
        let intersection_start = self.start.max(other.start);
        let intersection_end = self.end.min(other.end);

        if intersection_start >= intersection_end {
            return 0.0;
        }

        let intersection = (intersection_end - intersection_start) as f64;
        let union = (self.len() + other.len() - (intersection_end - intersection_start)) as f64;

        if union == 0.0 {
            return 1.0;
        }

        intersection / union
    }
}

/// Which pipeline stage produced an annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnnotationSource {
    /// Won its overlap group during dictionary matching.
    DictionaryMatch,
    /// Mirrored from the other side of an abbreviation pair.
    AcronymMirror,
    /// Copied onto a repeated occurrence of identical text.
    StringPropagation,
    /// Copied between an abbreviation and its defining full form.
    AbbreviationPropagation,
}

/// A finished entity annotation.
///
/// Spans are never relocated once created; later pipeline stages only add
/// annotations at spans disjoint from existing ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityAnnotation {
    /// Covered span in the document
    pub span: Span,
    /// Entity type classification
    pub entity_type: EntityType,
    /// Covered text (raw substring, never case-folded)
    pub text: String,
    /// Producing pipeline stage
    pub source: AnnotationSource,
    /// Confidence score (0.0-1.0)
    pub confidence: f64,
}

impl EntityAnnotation {
    /// Create a new annotation. Confidence is clamped to [0, 1].
    #[must_use]
    pub fn new(
        span: Span,
        entity_type: EntityType,
        text: impl Into<String>,
        source: AnnotationSource,
        confidence: f64,
    ) -> Self {
        Self {
            span,
            entity_type,
            text: text.into(),
            source,
            confidence: confidence.clamp(0.0, 1.0),
        }
    }

    /// Check if this annotation's span intersects another's.
    #[must_use]
    pub fn overlaps(&self, other: &EntityAnnotation) -> bool {
        self.span.overlaps(other.span)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn overlap_is_symmetric(
            s1 in 0usize..100,
            len1 in 1usize..50,
            s2 in 0usize..100,
            len2 in 1usize..50,
        ) {
            let a = Span::new(s1, s1 + len1);
            let b = Span::new(s2, s2 + len2);
            prop_assert_eq!(a.overlaps(b), b.overlaps(a));
        }

        #[test]
        fn overlap_ratio_bounded(
            s1 in 0usize..100,
            len1 in 1usize..50,
            s2 in 0usize..100,
            len2 in 1usize..50,
        ) {
            let a = Span::new(s1, s1 + len1);
            let b = Span::new(s2, s2 + len2);
            let ratio = a.overlap_ratio(b);
            prop_assert!(ratio >= 0.0);
            prop_assert!(ratio <= 1.0);
        }

        #[test]
        fn self_overlap_ratio_is_one(s in 0usize..100, len in 1usize..50) {
            let span = Span::new(s, s + len);
            let ratio = span.overlap_ratio(span);
            prop_assert!((ratio - 1.0).abs() < 1e-10);
        }

        #[test]
        fn confidence_always_clamped(conf in -10.0f64..10.0) {
            let a = EntityAnnotation::new(
                Span::new(0, 4),
                EntityType::Gene,
                "test",
                AnnotationSource::DictionaryMatch,
                conf,
            );
            prop_assert!(a.confidence >= 0.0);
            prop_assert!(a.confidence <= 1.0);
        }
    }
}
