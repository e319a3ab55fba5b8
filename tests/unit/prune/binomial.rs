use super::*;

fn record(clicks: u64, impressions: u64) -> PerformanceRecord {
    PerformanceRecord {
        id: "s/square/crop0/preview".to_string(),
        clicks,
        impressions,
    }
}

#[test]
fn zero_clicks_matches_closed_form() {
    let p = binomial_less_p_value(0, 5000, 0.001).unwrap();
    let expected = 0.999f64.powi(5000);
    assert!((p - expected).abs() < 1e-12, "{p} vs {expected}");
}

#[test]
fn small_counts_match_direct_sum() {
    // P(X <= 2), X ~ Bin(10, 0.3)
    let direct = 0.7f64.powi(10) + 10.0 * 0.3 * 0.7f64.powi(9) + 45.0 * 0.09 * 0.7f64.powi(8);
    let p = binomial_less_p_value(2, 10, 0.3).unwrap();
    assert!((p - direct).abs() < 1e-12, "{p} vs {direct}");
}

#[test]
fn clicks_at_expected_rate_are_not_significant() {
    let p = binomial_less_p_value(5, 5000, 0.001).unwrap();
    assert!((0.60..0.63).contains(&p), "p = {p}");
}

#[test]
fn huge_counts_stay_finite() {
    let p = binomial_less_p_value(0, 10_000_000, 0.001).unwrap();
    assert_eq!(p, 0.0);
    let p = binomial_less_p_value(10_000, 10_000_000, 0.001).unwrap();
    assert!(p.is_finite() && (0.4..0.6).contains(&p), "p = {p}");
}

#[test]
fn counts_above_the_mode_use_the_upper_tail() {
    // P(X <= 8) = 1 - P(X >= 9), X ~ Bin(10, 0.3)
    let upper = 10.0 * 0.3f64.powi(9) * 0.7 + 0.3f64.powi(10);
    let p = binomial_less_p_value(8, 10, 0.3).unwrap();
    assert!((p - (1.0 - upper)).abs() < 1e-12, "{p} vs {}", 1.0 - upper);
}

#[test]
fn stirling_and_exact_factorials_agree_at_the_switch() {
    let exact: f64 = (2..=STIRLING_MIN).map(|i| (i as f64).ln()).sum();
    assert!((ln_factorial(STIRLING_MIN) - exact).abs() < 1e-10);
}

#[test]
fn click_counts_beyond_any_loop_budget_finish() {
    let n = 1_000_000_000_000;
    let p = binomial_less_p_value(1_000_000_000, n, 0.001).unwrap();
    assert!((0.3..0.7).contains(&p), "p = {p}");
    assert_eq!(binomial_less_p_value(n - 1, n, 0.001).unwrap(), 1.0);
    assert_eq!(binomial_less_p_value(0, n, 0.001).unwrap(), 0.0);
}

#[test]
fn degenerate_rates() {
    assert_eq!(binomial_less_p_value(0, 10, 0.0).unwrap(), 1.0);
    assert_eq!(binomial_less_p_value(3, 10, 1.0).unwrap(), 0.0);
    assert_eq!(binomial_less_p_value(10, 10, 1.0).unwrap(), 1.0);
}

#[test]
fn invalid_counts_are_rejected() {
    assert!(matches!(
        binomial_less_p_value(0, 0, 0.001),
        Err(AdsmithError::Validation(_))
    ));
    assert!(matches!(
        binomial_less_p_value(11, 10, 0.001),
        Err(AdsmithError::Validation(_))
    ));
    assert!(binomial_less_p_value(1, 10, 1.5).is_err());
}

#[test]
fn verdicts_follow_policy() {
    let policy = PrunePolicy::default();

    let dead = policy.evaluate(&record(0, 5000)).unwrap();
    assert_eq!(dead.verdict, Verdict::Prune);
    assert_eq!(dead.observed_ctr, 0.0);

    let healthy = policy.evaluate(&record(8, 5000)).unwrap();
    assert_eq!(healthy.verdict, Verdict::Keep);

    let young = policy.evaluate(&record(0, 500)).unwrap();
    assert_eq!(young.verdict, Verdict::Insufficient);
}

#[test]
fn stricter_alpha_keeps_borderline_records() {
    let strict = PrunePolicy {
        alpha: 0.001,
        ..PrunePolicy::default()
    };
    assert_eq!(strict.evaluate(&record(0, 5000)).unwrap().verdict, Verdict::Keep);
}

#[test]
fn bad_policy_is_rejected() {
    let policy = PrunePolicy {
        alpha: 0.0,
        ..PrunePolicy::default()
    };
    assert!(policy.evaluate(&record(1, 2000)).is_err());
}

#[test]
fn records_parse_from_json() {
    let records = records_from_json_str(
        r#"[{"id":"a/square/fit","clicks":3,"impressions":4000},{"id":"b/square/pan","clicks":0,"impressions":9000}]"#,
    )
    .unwrap();
    assert_eq!(records.len(), 2);
    let tests = PrunePolicy::default().evaluate_all(&records).unwrap();
    assert_eq!(tests[0].id, "a/square/fit");
    assert_eq!(tests[1].verdict, Verdict::Prune);
    assert!(matches!(
        records_from_json_str(r#"[{"id":"x"}]"#),
        Err(AdsmithError::Serde(_))
    ));
}

#[test]
fn records_load_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("records.json");
    std::fs::write(&path, r#"[{"id":"a","clicks":1,"impressions":10}]"#).unwrap();
    assert_eq!(load_records(&path).unwrap(), vec![PerformanceRecord {
        id: "a".to_string(),
        clicks: 1,
        impressions: 10
    }]);
}
