//! Behavioural properties of the validator, checked on small hand-built
//! datasets through the public API.

use vajra_validate::data::*;
use vajra_validate::verify::checks;
use vajra_validate::{validate, CheckId, Config, Datasets, Severity, Tolerances};

fn metrics(total_transactions: u64) -> KeyMetrics {
    KeyMetrics {
        total_transactions,
        districts_analyzed: 100,
        anomalous_districts: 10,
        tier1_critical_districts: 2,
        september_surge_multiplier: 3.4,
        estimated_fiscal_leakage: 1840.0,
    }
}

fn distribution() -> Vec<Category> {
    vec![
        Category {
            name: BIOMETRIC_CATEGORY.to_string(),
            value: 3_000_000,
        },
        Category {
            name: DEMOGRAPHIC_CATEGORY.to_string(),
            value: 1_500_000,
        },
        Category {
            name: "New Enrolments".to_string(),
            value: 400_000,
        },
    ]
}

fn age(group: &str, count: u64, percentage: f64) -> AgeBreakdown {
    AgeBreakdown {
        age_group: group.to_string(),
        count,
        percentage,
    }
}

fn mix(state: &str, biometric: f64, demographic: f64, enrolment: f64) -> ServiceMix {
    ServiceMix {
        state: state.to_string(),
        biometric,
        demographic,
        enrolment,
    }
}

fn ranked(district: &str, total: u64) -> RankedDistrict {
    RankedDistrict {
        district: district.to_string(),
        state: "S".to_string(),
        total,
    }
}

fn subsidy(benefit: &str, monthly: u64, annual: u64) -> SubsidyLine {
    SubsidyLine {
        benefit: benefit.to_string(),
        monthly,
        annual,
    }
}

fn errors_of(report: &vajra_validate::ValidationReport, check: CheckId) -> Vec<String> {
    report
        .for_check(check)
        .into_iter()
        .filter(|f| f.severity == Severity::Error)
        .map(|f| f.message.clone())
        .collect()
}

// ---------------------------------------------------------------------------
// Transaction total (scenarios A and B)
// ---------------------------------------------------------------------------

#[test]
fn transaction_total_matches() {
    let d = Datasets {
        key_metrics: Some(metrics(4_900_000)),
        transaction_distribution: Some(distribution()),
        ..Default::default()
    };
    let report = validate(&d, &Tolerances::default());
    assert!(errors_of(&report, CheckId::TransactionTotal).is_empty());
}

#[test]
fn transaction_total_mismatch_reports_difference() {
    let d = Datasets {
        key_metrics: Some(metrics(4_800_000)),
        transaction_distribution: Some(distribution()),
        ..Default::default()
    };
    let report = validate(&d, &Tolerances::default());
    let errors = errors_of(&report, CheckId::TransactionTotal);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("100000"), "{}", errors[0]);
}

// ---------------------------------------------------------------------------
// Category sums
// ---------------------------------------------------------------------------

#[test]
fn age_breakdown_off_by_one_names_dataset() {
    let d = Datasets {
        transaction_distribution: Some(distribution()),
        biometric_by_age: Some(vec![age("5-17", 1_000_000, 40.0), age("18+", 2_000_001, 60.0)]),
        demographic_by_age: Some(vec![age("5-17", 500_000, 30.0), age("18+", 1_000_000, 70.0)]),
        ..Default::default()
    };
    let report = validate(&d, &Tolerances::default());
    let errors = errors_of(&report, CheckId::AgeBreakdown);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains(BIOMETRIC_BY_AGE));
    assert!(errors[0].contains("difference 1"));
}

#[test]
fn age_breakdown_percentages_must_close() {
    let rows = vec![age("5-17", 1_000_000, 40.0), age("18+", 2_000_000, 59.0)];
    let out = checks::age_breakdown(BIOMETRIC_BY_AGE, BIOMETRIC_CATEGORY, &rows, Some(distribution().as_slice()));
    assert_eq!(out.len(), 1);
    assert!(out[0].message.contains("99%"));
}

// ---------------------------------------------------------------------------
// Percentage closure
// ---------------------------------------------------------------------------

#[test]
fn exact_closure_flags_99_and_101() {
    let share = |service: &str, a: f64, b: f64, c: f64| AgeGroupShare {
        service: service.to_string(),
        infant: a,
        child: b,
        adult: c,
    };
    let rows = vec![
        share("ok", 10.0, 40.0, 50.0),
        share("low", 10.0, 40.0, 49.0),
        share("high", 10.0, 40.0, 51.0),
    ];
    let out = checks::age_group_comparison(&rows);
    assert_eq!(out.len(), 2);
    assert!(out[0].message.starts_with("low"));
    assert!(out[1].message.starts_with("high"));

    let enrol = |expected: f64, actual: f64| EnrolmentShare {
        age_group: "all".to_string(),
        expected,
        actual,
    };
    assert_eq!(checks::enrolment_by_age(&[enrol(99.0, 101.0)]).len(), 2);
    assert!(checks::enrolment_by_age(&[enrol(100.0, 100.0)]).is_empty());
}

#[test]
fn tolerant_closure_band_is_inclusive() {
    let tol = Tolerances::default();
    let inside = vec![
        mix("edge-low", 49.5, 45.0, 5.0),
        mix("edge-high", 50.5, 45.0, 5.0),
        mix("centre", 55.1, 39.8, 5.1),
    ];
    assert!(checks::service_mix(&inside, &tol).is_empty());

    let outside = vec![mix("under", 49.4, 45.0, 5.0), mix("over", 50.6, 45.0, 5.0)];
    let out = checks::service_mix(&outside, &tol);
    assert_eq!(out.len(), 2);
    assert!(out.iter().all(|f| f.severity == Severity::Error));
}

// ---------------------------------------------------------------------------
// Arithmetic identity (scenario C)
// ---------------------------------------------------------------------------

#[test]
fn annualized_subsidy_identity() {
    let good = vec![subsidy("X", 100, 1200), subsidy("Y", 50, 600)];
    assert!(checks::subsidy_leakage(&good, None).is_empty());

    for (monthly, annual) in [(100, 1199), (850, 10_000), (0, 1)] {
        let out = checks::subsidy_leakage(&[subsidy("Z", monthly, annual)], None);
        assert_eq!(out.len(), 1, "monthly={} annual={}", monthly, annual);
        assert_eq!(out[0].severity, Severity::Error);
    }
}

// ---------------------------------------------------------------------------
// Ranking (scenario D)
// ---------------------------------------------------------------------------

#[test]
fn ascending_pair_is_one_ranking_error() {
    let d = Datasets {
        top20_districts: Some(vec![ranked("A", 500), ranked("B", 600)]),
        ..Default::default()
    };
    let report = validate(&d, &Tolerances::default());
    let errors = errors_of(&report, CheckId::Top20Ranking);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains('A') && errors[0].contains('B'));
    assert_eq!(report.errors.len(), 1);
}

#[test]
fn descending_ranking_with_ties_is_clean() {
    let rows: Vec<_> = [900, 800, 800, 10, 0]
        .iter()
        .enumerate()
        .map(|(i, t)| ranked(&format!("D{}", i), *t))
        .collect();
    assert!(checks::top20_ranking(&rows).is_empty());
}

// ---------------------------------------------------------------------------
// Ratio tolerance
// ---------------------------------------------------------------------------

#[test]
fn surge_mismatch_is_only_a_warning() {
    let rec = |multiplier: f64| SurgeRecord {
        district: "D".to_string(),
        sept_activity: 300.0,
        annual_avg: 100.0,
        multiplier,
    };
    let tol = Tolerances::default();
    assert!(checks::september_surge(&[rec(3.05), rec(2.95)], &tol).is_empty());

    let d = Datasets {
        september_surge: Some(vec![rec(3.15)]),
        ..Default::default()
    };
    let report = validate(&d, &tol);
    let surge = report.for_check(CheckId::SeptemberSurge);
    assert_eq!(surge.len(), 1);
    assert_eq!(surge[0].severity, Severity::Warning);
    assert!(report.errors.is_empty());
}

#[test]
fn percent_tolerance_from_config_moves_the_band() {
    let d = Datasets {
        service_mix_by_state: Some(vec![mix("S", 60.0, 33.0, 5.0)]),
        risk_tier_distribution: Some(vec![RiskTier {
            tier: TIER1_LABEL.to_string(),
            count: 2,
            percentage: 98.0,
        }]),
        ..Default::default()
    };

    let strict = validate(&d, &Config::from_lookup(|_| None).tolerances);
    assert_eq!(errors_of(&strict, CheckId::ServiceMix).len(), 1);
    assert!(strict
        .for_check(CheckId::RiskTiers)
        .iter()
        .any(|f| f.severity == Severity::Warning));

    let cfg = Config::from_lookup(|key| (key == "PERCENT_TOL").then(|| "2".to_string()));
    let loose = validate(&d, &cfg.tolerances);
    assert!(errors_of(&loose, CheckId::ServiceMix).is_empty());
    assert!(loose
        .for_check(CheckId::RiskTiers)
        .iter()
        .all(|f| f.severity != Severity::Warning));
}

// ---------------------------------------------------------------------------
// Isolation and idempotence
// ---------------------------------------------------------------------------

#[test]
fn missing_inputs_do_not_stop_other_checks() {
    let d = Datasets {
        top20_districts: Some(vec![ranked("A", 1), ranked("B", 2)]),
        service_mix_by_state: Some(vec![mix("S", 10.0, 10.0, 10.0)]),
        ..Default::default()
    };
    let report = validate(&d, &Tolerances::default());
    assert_eq!(report.errors.len(), 2);
    assert!(report
        .schema_errors
        .iter()
        .any(|f| f.check == CheckId::TransactionTotal && f.message.contains(KEY_METRICS)));
}

#[test]
fn percentage_rules_run_without_reference_totals() {
    let d = Datasets {
        biometric_by_age: Some(vec![age("18+", 1, 42.0)]),
        risk_tier_distribution: Some(vec![RiskTier {
            tier: TIER1_LABEL.to_string(),
            count: 1,
            percentage: 10.0,
        }]),
        ..Default::default()
    };
    let report = validate(&d, &Tolerances::default());

    let age_errors = errors_of(&report, CheckId::AgeBreakdown);
    assert_eq!(age_errors, vec!["biometricByAge percentages sum to 42%, not 100%".to_string()]);
    assert!(report
        .for_check(CheckId::AgeBreakdown)
        .iter()
        .any(|f| f.severity == Severity::Schema && f.message.contains(TRANSACTION_DISTRIBUTION)));

    let tiers = report.for_check(CheckId::RiskTiers);
    assert!(tiers
        .iter()
        .any(|f| f.severity == Severity::Warning && f.message.contains("10%")));
    assert!(tiers
        .iter()
        .any(|f| f.severity == Severity::Schema && f.message.contains(KEY_METRICS)));
    assert!(errors_of(&report, CheckId::RiskTiers).is_empty());
}

#[test]
fn validation_is_idempotent() {
    let d = Datasets {
        key_metrics: Some(metrics(4_800_000)),
        transaction_distribution: Some(distribution()),
        top20_districts: Some(vec![ranked("A", 500), ranked("B", 600)]),
        ..Default::default()
    };
    let tol = Tolerances::default();
    assert_eq!(validate(&d, &tol), validate(&d, &tol));
}
