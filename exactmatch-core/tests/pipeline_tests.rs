// exactmatch-core/tests/pipeline_tests.rs
//! End-to-end runs of the extraction pipeline over small rule sets.

use exactmatch_core::report::{fragment_records, histogram_rows, signature_records};
use exactmatch_core::{
    ExtractError, Extractor, ExtractorConfig, RuleId, ScanError, SignatureKind, SignatureOutcome, ThresholdConfig,
};
use test_log::test;

const RULES: &str = r#"# sample rule set
alert tcp $EXTERNAL_NET any -> $HOME_NET 6970 (msg:"GateCrasher"; content:"GateCrasher"; pcre:"/^GateCrasher\s+v\d+\x2E\d+\x2C\s+Server\s+On-Line\x2E\x2E\x2E/ims"; sid:147; rev:8;)
alert tcp any any -> any 80 (msg:"admin probe"; content:"|2f|admin"; sid:200;)
alert tcp any any -> any 80 (msg:"admin probe again"; content:"|2f|admin"; sid:201;)
alert tcp any any -> any 80 (msg:"bad hex"; content:"ab|6|de"; sid:300;)
alert tcp any any -> any 80 (msg:"class only"; pcre:"/^[a-z]{2,4}$/"; sid:400;)

alert tcp any any -> any 80 (msg:"no sid"; content:"orphan";)
"#;

fn run(min: usize) -> exactmatch_core::RunOutput {
    let extractor = Extractor::new(ExtractorConfig::new(ThresholdConfig::new(min))).unwrap();
    extractor.run(RULES.lines())
}

#[test]
fn test_run_counters() {
    let output = run(2);
    let stats = &output.stats;
    assert_eq!(stats.rules_scanned, 5);
    assert_eq!(stats.rules_without_id, 1);
    assert_eq!(stats.content_signatures, 3);
    assert_eq!(stats.pattern_signatures, 2);
    assert_eq!(stats.duplicate_registrations, 1);
    assert_eq!(stats.discarded_signatures, 1);
    assert_eq!(stats.content_with_fragments, 2);
    assert_eq!(stats.pattern_with_fragments, 1);
    // gatecrasher + /admin from content, six pattern fragments.
    assert_eq!(stats.fragments_produced, 8);
    assert_eq!(stats.histogram.total(), stats.fragments_produced);
}

#[test]
fn test_gatecrasher_fragments() {
    let output = run(2);
    let sig = output
        .registry
        .iter()
        .find(|s| s.kind == SignatureKind::Pattern && s.text.contains("GateCrasher"))
        .unwrap();
    assert_eq!(sig.outcome, SignatureOutcome::Extracted { produced: 6 });
    let kept: Vec<&[u8]> = sig.fragments.iter().map(|f| f.bytes.as_slice()).collect();
    // Spans are maximal: the escaped dots are literals, so `on-line...` is one fragment.
    assert_eq!(kept, vec![&b"gatecrasher"[..], b"server", b"on-line..."]);
}

#[test]
fn test_malformed_hex_is_discarded_without_histogram_entries() {
    let output = run(2);
    assert_eq!(output.diagnostics.len(), 1);
    let diagnostic = &output.diagnostics[0];
    assert_eq!(diagnostic.rule_id, RuleId(300));
    assert!(matches!(diagnostic.error, ExtractError::MalformedHexSpan { .. }));

    let sig = output.registry.lookup(SignatureKind::Content, "ab|6|de").unwrap();
    assert!(sig.is_discarded());
    assert!(sig.fragments.is_empty());
    // "ab|6|de" would have decoded to five bytes.
    assert_eq!(output.stats.histogram.count(5), 0);
    // "/admin" and "server".
    assert_eq!(output.stats.histogram.count(6), 2);
}

#[test]
fn test_missing_sid_is_reported() {
    let output = run(2);
    assert_eq!(output.scan_errors, vec![ScanError::MissingRuleId { line: 8, signatures: 1 }]);
}

#[test]
fn test_uncovered_rules_in_scan_order() {
    let output = run(2);
    assert_eq!(output.uncovered_rules(), vec![RuleId(300), RuleId(400)]);
}

#[test]
fn test_threshold_does_not_change_histogram() {
    let low = run(0);
    let high = run(10);
    assert_eq!(low.stats.histogram, high.stats.histogram);
    assert!(high.stats.fragments_retained <= low.stats.fragments_retained);
    // Only the two eleven-byte "gatecrasher" fragments are longer than ten.
    assert_eq!(high.stats.fragments_retained, 2);
}

#[test]
fn test_records() {
    let output = run(2);
    let signatures = signature_records(&output.registry);
    assert_eq!(signatures.len(), 5);
    let admin = signatures.iter().find(|r| r.signature == "|2f|admin").unwrap();
    assert_eq!(admin.rules, vec![RuleId(200), RuleId(201)]);
    assert_eq!(admin.exact_matches, vec!["/admin".to_string()]);
    assert_eq!(admin.exact_matches_hex, vec!["2f61646d696e".to_string()]);

    let fragments = fragment_records(&output.registry);
    let gatecrasher = fragments
        .iter()
        .find(|r| r.exact_match_hex == hex::encode("gatecrasher"))
        .unwrap();
    assert_eq!(gatecrasher.kinds, vec![SignatureKind::Content, SignatureKind::Pattern]);
    assert_eq!(gatecrasher.rules, vec![RuleId(147)]);

    let rows = histogram_rows(&output.stats.histogram);
    assert!(rows.windows(2).all(|w| w[0].length < w[1].length));
}
