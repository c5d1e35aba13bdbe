//! Property tests for the pipeline-wide invariants.
//!
//! The resolver and both propagation passes promise: no two annotations in
//! a final set ever intersect, output is deterministic, and propagation is
//! idempotent. These must hold for arbitrary documents and dictionaries.

use dictag::dictionary::CandidateChunk;
use dictag::propagate::{propagate_abbreviations, propagate_strings};
use dictag::resolver::resolve;
use dictag::{
    AbbreviationPair, Dictionary, EntityAnnotation, EntityType, MatchMode, Span, Tagger,
    TaggerConfig,
};
use proptest::prelude::*;

/// A small pool of surface forms so random texts actually hit the
/// dictionary.
const SURFACE_POOL: &[&str] = &["brca", "tp53", "kinase", "gene", "lcat", "l1cam", "acid"];

fn arb_dictionary_pairs() -> impl Strategy<Value = Vec<(String, EntityType)>> {
    proptest::sample::subsequence(SURFACE_POOL.to_vec(), 1..SURFACE_POOL.len()).prop_map(
        |surfaces| {
            surfaces
                .into_iter()
                .map(|s| (s.to_string(), EntityType::Gene))
                .collect()
        },
    )
}

fn arb_text() -> impl Strategy<Value = String> {
    // Words from the pool, fillers, punctuation and case variation.
    proptest::collection::vec(
        prop_oneof![
            Just("brca".to_string()),
            Just("BRCA".to_string()),
            Just("tp53".to_string()),
            Just("l1cam".to_string()),
            Just("(lcat)".to_string()),
            Just("kinase".to_string()),
            Just("unrelated".to_string()),
            Just("words".to_string()),
        ],
        0..12,
    )
    .prop_map(|words| words.join(" "))
}

fn arb_mode() -> impl Strategy<Value = MatchMode> {
    prop_oneof![Just(MatchMode::Exact), Just(MatchMode::Approximate)]
}

fn assert_disjoint_sorted(annotations: &[EntityAnnotation]) {
    for w in annotations.windows(2) {
        assert!(
            w[0].span.end <= w[1].span.start,
            "overlapping or unsorted spans: {:?} vs {:?}",
            w[0].span,
            w[1].span
        );
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn final_annotation_set_is_disjoint(
        pairs in arb_dictionary_pairs(),
        text in arb_text(),
        mode in arb_mode(),
    ) {
        let dictionary = Dictionary::compile(pairs, mode).unwrap();
        let tagger = Tagger::new(
            dictionary,
            TaggerConfig::new()
                .mode(mode)
                .types_of_interest(vec![EntityType::Gene]),
        )
        .unwrap();

        let annotations = tagger.annotate(&text, &[]).unwrap();
        assert_disjoint_sorted(&annotations);
    }

    #[test]
    fn annotate_is_deterministic(
        pairs in arb_dictionary_pairs(),
        text in arb_text(),
        mode in arb_mode(),
    ) {
        let dictionary = Dictionary::compile(pairs, mode).unwrap();
        let tagger = Tagger::new(
            dictionary,
            TaggerConfig::new()
                .mode(mode)
                .types_of_interest(vec![EntityType::Gene]),
        )
        .unwrap();

        let first = tagger.annotate(&text, &[]).unwrap();
        let second = tagger.annotate(&text, &[]).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn propagation_is_idempotent(
        pairs in arb_dictionary_pairs(),
        text in arb_text(),
        mode in arb_mode(),
    ) {
        let dictionary = Dictionary::compile(pairs, mode).unwrap();
        let tagger = Tagger::new(
            dictionary,
            TaggerConfig::new()
                .mode(mode)
                .types_of_interest(vec![EntityType::Gene]),
        )
        .unwrap();

        let mut annotations = tagger.annotate(&text, &[]).unwrap();
        let once = annotations.clone();
        let types = vec![EntityType::Gene];
        propagate_strings(&mut annotations, &text, &types);
        propagate_abbreviations(&mut annotations, &[], &text, &types);
        prop_assert_eq!(annotations, once);
    }

    #[test]
    fn resolver_output_is_order_independent(
        starts in proptest::collection::vec((0usize..40, 1usize..8, 0.0f64..3.0), 0..20),
    ) {
        let chunks: Vec<CandidateChunk> = starts
            .iter()
            .enumerate()
            .map(|(id, &(start, len, score))| CandidateChunk {
                span: Span::new(start, start + len),
                entry_id: id,
                entity_type: EntityType::Gene,
                score,
                matched_text: "x".repeat(len),
            })
            .collect();

        let mut reversed = chunks.clone();
        reversed.reverse();

        prop_assert_eq!(resolve(chunks), resolve(reversed));
    }

    #[test]
    fn resolver_never_emits_overlaps(
        starts in proptest::collection::vec((0usize..60, 1usize..10, 0.0f64..3.0), 0..40),
    ) {
        let chunks: Vec<CandidateChunk> = starts
            .iter()
            .enumerate()
            .map(|(id, &(start, len, score))| CandidateChunk {
                span: Span::new(start, start + len),
                entry_id: id,
                entity_type: EntityType::Gene,
                score,
                matched_text: "x".repeat(len),
            })
            .collect();

        let annotations = resolve(chunks);
        assert_disjoint_sorted(&annotations);
    }

    #[test]
    fn dangling_abbreviation_pairs_never_panic(
        pairs in arb_dictionary_pairs(),
        text in arb_text(),
        a_start in 0usize..100,
        a_len in 0usize..20,
        f_start in 0usize..100,
        f_len in 0usize..20,
    ) {
        let dictionary = Dictionary::compile(pairs, MatchMode::Exact).unwrap();
        let tagger = Tagger::new(
            dictionary,
            TaggerConfig::new().types_of_interest(vec![EntityType::Gene]),
        )
        .unwrap();

        let pair = AbbreviationPair {
            abbrev_span: Span::new(a_start, a_start + a_len),
            fullform_span: Span::new(f_start, f_start + f_len),
            defined_here: true,
        };
        let annotations = tagger.annotate(&text, &[pair]).unwrap();
        assert_disjoint_sorted(&annotations);
    }
}
