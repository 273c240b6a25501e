//! Tests for highlight matching and ingestion.

use super::*;
use serde_json::json;

// ============================================================================
// Helpers
// ============================================================================

fn frag(page: u32, text: &str) -> HighlightFragment {
    HighlightFragment::new(page, text).unwrap()
}

fn seg(page: u32, content: &str) -> TextSegment {
    TextSegment::new(page, content)
}

fn joined(pieces: &[MarkedPiece]) -> String {
    pieces.iter().map(|p| p.text.as_str()).collect()
}

fn shape(pieces: &[MarkedPiece]) -> Vec<(&str, bool)> {
    pieces.iter().map(|p| (p.text.as_str(), p.emphasized)).collect()
}

// ============================================================================
// Fragment construction
// ============================================================================

#[test]
fn test_fragment_rejects_page_zero() {
    assert_eq!(
        HighlightFragment::new(0, "attention"),
        Err(HighlightError::InvalidPage)
    );
}

#[test]
fn test_fragment_rejects_blank_text() {
    assert_eq!(HighlightFragment::new(1, ""), Err(HighlightError::EmptyText));
    assert_eq!(
        HighlightFragment::new(1, " \t\n "),
        Err(HighlightError::EmptyText)
    );
}

#[test]
fn test_fragment_deserialize_validates() {
    let ok: HighlightFragment =
        serde_json::from_value(json!({"page": 2, "matched_text": "loss"})).unwrap();
    assert_eq!(ok.page(), 2);
    assert_eq!(ok.matched_text(), "loss");

    let bad = serde_json::from_value::<HighlightFragment>(json!({"page": 0, "matched_text": "loss"}));
    assert!(bad.is_err());
    let blank = serde_json::from_value::<HighlightFragment>(json!({"page": 1, "matched_text": "  "}));
    assert!(blank.is_err());
}

#[test]
fn test_fragment_serialize_roundtrip_shape() {
    let value = serde_json::to_value(frag(3, "dropout")).unwrap();
    assert_eq!(value, json!({"page": 3, "matched_text": "dropout"}));
}

// ============================================================================
// find_match
// ============================================================================

#[test]
fn test_find_match_empty_list() {
    assert!(find_match(&seg(1, "anything at all"), &[]).is_none());
    assert!(find_match(&seg(7, ""), &[]).is_none());
}

#[test]
fn test_find_match_other_page_never_matches() {
    let f = frag(2, "transformer");
    assert!(find_match(&seg(1, "The Transformer architecture"), &[f.clone()]).is_none());
    assert!(find_match(&seg(3, "transformer"), &[f]).is_none());
}

#[test]
fn test_find_match_any_case_substring() {
    let f = frag(4, "ATTENTION mechanism");
    let s = seg(4, "we study the attention Mechanism in depth");
    assert_eq!(find_match(&s, std::slice::from_ref(&f)), Some(&f));
}

#[test]
fn test_find_match_first_wins() {
    let f1 = frag(1, "neural");
    let f2 = frag(1, "neural network");
    let fragments = vec![f1.clone(), f2.clone()];
    let s = seg(1, "A neural network model");
    assert_eq!(find_match(&s, &fragments), Some(&f1));

    let reversed = vec![f2.clone(), f1];
    assert_eq!(find_match(&s, &reversed), Some(&f2));
}

#[test]
fn test_find_match_skips_non_matching_until_hit() {
    let fragments = vec![
        frag(1, "gradient"),
        frag(2, "results"),
        frag(2, "baseline"),
        frag(2, "results table"),
    ];
    let s = seg(2, "Compared to the Baseline, our results improve");
    assert_eq!(find_match(&s, &fragments).map(|f| f.matched_text()), Some("results"));
}

#[test]
fn test_find_match_no_occurrence() {
    let fragments = vec![frag(1, "convolution")];
    assert!(find_match(&seg(1, "recurrent layers only"), &fragments).is_none());
}

#[test]
fn test_find_match_special_characters_are_literal() {
    let fragments = vec![frag(1, "3.14 (pi)")];
    assert!(find_match(&seg(1, "value is 3.14 (pi) approx"), &fragments).is_some());
    assert!(find_match(&seg(1, "value is 3x14 pi approx"), &fragments).is_none());
}

// ============================================================================
// render_marked
// ============================================================================

#[test]
fn test_render_marked_preserves_original_casing() {
    let s = seg(1, "The Attention Mechanism");
    let f = frag(1, "attention mechanism");
    let pieces = render_marked(&s, &f);
    assert_eq!(shape(&pieces), vec![("The ", false), ("Attention Mechanism", true)]);
}

#[test]
fn test_render_marked_every_occurrence() {
    let s = seg(1, "cat cat dog");
    let f = frag(1, "cat");
    let pieces = render_marked(&s, &f);
    assert_eq!(
        shape(&pieces),
        vec![("cat", true), (" ", false), ("cat", true), (" dog", false)]
    );
}

#[test]
fn test_render_marked_adjacent_occurrences() {
    let s = seg(1, "CatCAT!");
    let f = frag(1, "cat");
    let pieces = render_marked(&s, &f);
    assert_eq!(shape(&pieces), vec![("Cat", true), ("CAT", true), ("!", false)]);
}

#[test]
fn test_render_marked_special_characters() {
    let s = seg(1, "value is 3.14 (pi) approx");
    let f = frag(1, "3.14 (pi)");
    let pieces = render_marked(&s, &f);
    assert_eq!(
        shape(&pieces),
        vec![("value is ", false), ("3.14 (pi)", true), (" approx", false)]
    );
}

#[test]
fn test_render_marked_regex_metacharacters() {
    let s = seg(5, "see eq. [1]+[2]* and $x^2$ | done");
    for needle in ["[1]+[2]*", "$x^2$", "|", "eq."] {
        let f = frag(5, needle);
        let pieces = render_marked(&s, &f);
        assert_eq!(joined(&pieces), s.content, "needle {}", needle);
        assert!(pieces.iter().any(|p| p.emphasized && p.text == needle));
    }
}

#[test]
fn test_render_marked_whole_segment() {
    let s = seg(2, "Results");
    let f = frag(2, "results");
    assert_eq!(shape(&render_marked(&s, &f)), vec![("Results", true)]);
}

#[test]
fn test_render_marked_concatenation_is_lossless() {
    let cases = [
        ("The quick brown fox jumps over the lazy dog", "the"),
        ("  leading and trailing  ", "and"),
        ("Ünïcödé text with ÜNÏCÖDÉ twice", "ünïcödé"),
        ("tabs\tand\nnewlines\tand", "and"),
        ("aaaa", "aa"),
    ];
    for (content, needle) in cases {
        let s = seg(1, content);
        let f = frag(1, needle);
        let pieces = render_marked(&s, &f);
        assert_eq!(joined(&pieces), content);
        for p in &pieces {
            assert!(!p.text.is_empty());
            assert_eq!(p.emphasized, p.text.to_lowercase() == needle.to_lowercase());
        }
    }
}

#[test]
fn test_render_marked_overlapping_needle() {
    let s = seg(1, "aaa");
    let f = frag(1, "aa");
    assert_eq!(shape(&render_marked(&s, &f)), vec![("aa", true), ("a", false)]);
}

#[test]
fn test_mark_segment_without_match_is_single_plain_piece() {
    let fragments = vec![frag(2, "elsewhere")];
    let s = seg(1, "nothing to see");
    assert_eq!(shape(&mark_segment(&s, &fragments)), vec![("nothing to see", false)]);
}

#[test]
fn test_mark_segment_uses_first_matching_fragment() {
    let fragments = vec![frag(1, "model"), frag(1, "large model")];
    let s = seg(1, "a Large Model");
    assert_eq!(
        shape(&mark_segment(&s, &fragments)),
        vec![("a Large ", false), ("Model", true)]
    );
}

#[test]
fn test_dotted_capital_i_is_not_a_match() {
    // to_lowercase("\u{130}") is "i\u{307}", but simple case folding keeps it distinct
    let fragments = vec![frag(1, "i\u{307}stanbul")];
    let s = seg(1, "\u{130}stanbul results");
    assert!(find_match(&s, &fragments).is_none());
    assert_eq!(
        shape(&mark_segment(&s, &fragments)),
        vec![("\u{130}stanbul results", false)]
    );
}

#[test]
fn test_every_found_match_renders_an_emphasized_piece() {
    let cases = [
        ("\u{130}stanbul results", "i\u{307}stanbul"),
        ("ΟΔΥΣΣΕΥΣ returns", "οδυσσευς"),
        ("Straße and STRASSE", "strasse"),
        ("Kelvin \u{212A} sign", "k sign"),
        ("ÉCOLE normale", "école"),
    ];
    for (content, needle) in cases {
        let s = seg(1, content);
        let fragments = vec![frag(1, needle)];
        if let Some(f) = find_match(&s, &fragments) {
            let pieces = render_marked(&s, f);
            assert_eq!(joined(&pieces), content);
            assert!(pieces.iter().any(|p| p.emphasized), "{content} / {needle}");
        }
    }
}

// ============================================================================
// Ingestion
// ============================================================================

#[test]
fn test_ingest_absent_or_null() {
    assert!(ingest_highlights(None).is_empty());
    assert!(ingest_highlights(Some(&Value::Null)).is_empty());
}

#[test]
fn test_ingest_non_array_is_ignored() {
    assert!(ingest_highlights(Some(&json!("No highlights returned."))).is_empty());
    assert!(ingest_highlights(Some(&json!({"page": 1}))).is_empty());
}

#[test]
fn test_ingest_drops_invalid_and_keeps_order() {
    let raw = json!([
        {"page": 1, "matched_chunk": "first"},
        {"page": 0, "matched_chunk": "zero page"},
        {"page": -2, "matched_chunk": "negative"},
        {"page": 2.5, "matched_chunk": "fractional"},
        {"page": "3", "matched_chunk": "string page"},
        {"matched_chunk": "no page"},
        {"page": 2, "matched_chunk": "   "},
        {"page": 2, "matched_chunk": ""},
        {"page": 2},
        {"page": null, "matched_chunk": "null page"},
        "not an object",
        {"page": 3, "matched_chunk": "second", "summary_sentence": "s", "coords": null, "similarity": 0.91},
        {"page": 1, "matched_chunk": "third"}
    ]);
    let fragments = ingest_highlights(Some(&raw));
    let got: Vec<(u32, &str)> = fragments.iter().map(|f| (f.page(), f.matched_text())).collect();
    assert_eq!(got, vec![(1, "first"), (3, "second"), (1, "third")]);
}

#[test]
fn test_ingest_page_overflow_dropped() {
    let raw = json!([{"page": 1u64 << 40, "matched_chunk": "huge"}]);
    assert!(ingest_highlights(Some(&raw)).is_empty());
}
