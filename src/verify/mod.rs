//! The dataset consistency validator.
//!
//! [`validate`] runs every check in [`BATTERY`] order over a [`Datasets`]
//! collection and folds the findings into a [`ValidationReport`]. A check whose
//! input dataset is absent contributes one schema finding per missing input and
//! skips only the rules that read it; no check can stop another from running.

pub mod checks;
mod finding;

pub use finding::{num, CheckId, Finding, Severity};

use serde::Serialize;

use crate::config::Tolerances;
use crate::data::*;
use crate::figures::{self, Figures};
use crate::logging::{log_check, log_tolerances, v_num, ProfileScope};

/// Headline figures echoed from KeyMetrics for display. Not re-derived.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub total_transactions: u64,
    pub districts_analyzed: u64,
    pub anomalous_districts: u64,
    pub tier1_critical_districts: u64,
    pub september_surge_multiplier: f64,
    pub estimated_fiscal_leakage_cr: f64,
}

impl From<&KeyMetrics> for Summary {
    fn from(m: &KeyMetrics) -> Self {
        Self {
            total_transactions: m.total_transactions,
            districts_analyzed: m.districts_analyzed,
            anomalous_districts: m.anomalous_districts,
            tier1_critical_districts: m.tier1_critical_districts,
            september_surge_multiplier: m.september_surge_multiplier,
            estimated_fiscal_leakage_cr: m.estimated_fiscal_leakage,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    pub source: Option<String>,
    pub dataset_sha256: Option<String>,
    pub tolerances: Tolerances,
    pub errors: Vec<Finding>,
    pub warnings: Vec<Finding>,
    pub schema_errors: Vec<Finding>,
    pub summary: Option<Summary>,
    pub figures: Figures,
}

impl ValidationReport {
    fn assemble(findings: Vec<Finding>, datasets: &Datasets, tolerances: &Tolerances) -> Self {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();
        let mut schema_errors = Vec::new();
        for f in findings {
            match f.severity {
                Severity::Error => errors.push(f),
                Severity::Warning => warnings.push(f),
                Severity::Schema => schema_errors.push(f),
            }
        }
        Self {
            source: None,
            dataset_sha256: None,
            tolerances: *tolerances,
            errors,
            warnings,
            schema_errors,
            summary: datasets.key_metrics.as_ref().map(Summary::from),
            figures: {
                let _scope = ProfileScope::new("figures");
                figures::compute(datasets)
            },
        }
    }

    /// No hard errors and no schema errors. Warnings are allowed.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.schema_errors.is_empty()
    }

    pub fn findings(&self, severity: Severity) -> &[Finding] {
        match severity {
            Severity::Error => &self.errors,
            Severity::Warning => &self.warnings,
            Severity::Schema => &self.schema_errors,
        }
    }

    pub fn messages(&self, severity: Severity) -> Vec<&str> {
        self.findings(severity)
            .iter()
            .map(|f| f.message.as_str())
            .collect()
    }

    /// All findings of one check, in report order.
    pub fn for_check(&self, check: CheckId) -> Vec<&Finding> {
        self.errors
            .iter()
            .chain(&self.warnings)
            .chain(&self.schema_errors)
            .filter(|f| f.check == check)
            .collect()
    }
}

pub type CheckFn = fn(&Datasets, &Tolerances) -> Vec<Finding>;

/// Every check, in report order.
pub const BATTERY: [(CheckId, CheckFn); 12] = [
    (CheckId::TransactionTotal, run_transaction_total),
    (CheckId::AgeBreakdown, run_age_breakdown),
    (CheckId::StateTotals, run_state_totals),
    (CheckId::Tier1Count, run_tier1_count),
    (CheckId::RiskTiers, run_risk_tiers),
    (CheckId::DbRatio, run_db_ratio),
    (CheckId::SeptemberSurge, run_september_surge),
    (CheckId::SubsidyLeakage, run_subsidy_leakage),
    (CheckId::ServiceMix, run_service_mix),
    (CheckId::AgeGroupComparison, run_age_group_comparison),
    (CheckId::EnrolmentByAge, run_enrolment_by_age),
    (CheckId::Top20Ranking, run_top20_ranking),
];

/// Run the whole battery. Pure: the same input always gives the same report.
pub fn validate(datasets: &Datasets, tolerances: &Tolerances) -> ValidationReport {
    let _scope = ProfileScope::with_context("validate", &[("checks", v_num(BATTERY.len() as f64))]);
    log_tolerances(tolerances.multiplier, tolerances.percent);

    let mut findings = Vec::new();
    for (check, run) in BATTERY.iter() {
        let out = run(datasets, tolerances);
        let count = |s: Severity| out.iter().filter(|f| f.severity == s).count();
        log_check(
            check.as_str(),
            count(Severity::Error),
            count(Severity::Warning),
            count(Severity::Schema),
        );
        findings.extend(out);
    }
    ValidationReport::assemble(findings, datasets, tolerances)
}

/// Validate a loaded document, folding its decode problems into the report.
pub fn validate_loaded(loaded: &Loaded, tolerances: &Tolerances) -> ValidationReport {
    let mut report = validate(&loaded.datasets, tolerances);
    let mut schema_errors: Vec<Finding> = loaded
        .issues
        .iter()
        .map(|i| Finding::schema(CheckId::Document, format!("{}: {}", i.dataset, i.detail)))
        .collect();
    schema_errors.append(&mut report.schema_errors);
    report.schema_errors = schema_errors;
    report.source = Some(loaded.source.clone());
    report.dataset_sha256 = Some(loaded.sha256.clone());
    report
}

// =============================================================================
// Wiring: pick each check's inputs out of the collection
// =============================================================================

fn need<'a, T: ?Sized>(
    check: CheckId,
    dataset: &str,
    value: Option<&'a T>,
    out: &mut Vec<Finding>,
) -> Option<&'a T> {
    if value.is_none() {
        out.push(Finding::missing(check, dataset));
    }
    value
}

fn run_transaction_total(d: &Datasets, _: &Tolerances) -> Vec<Finding> {
    let check = CheckId::TransactionTotal;
    let mut out = Vec::new();
    let metrics = need(check, KEY_METRICS, d.key_metrics.as_ref(), &mut out);
    let dist = need(check, TRANSACTION_DISTRIBUTION, d.transaction_distribution.as_deref(), &mut out);
    if let (Some(m), Some(t)) = (metrics, dist) {
        out.extend(checks::transaction_total(m, t));
    }
    out
}

fn run_age_breakdown(d: &Datasets, _: &Tolerances) -> Vec<Finding> {
    let check = CheckId::AgeBreakdown;
    let mut out = Vec::new();
    let dist = need(check, TRANSACTION_DISTRIBUTION, d.transaction_distribution.as_deref(), &mut out);
    for (dataset, category, rows) in [
        (BIOMETRIC_BY_AGE, BIOMETRIC_CATEGORY, d.biometric_by_age.as_deref()),
        (DEMOGRAPHIC_BY_AGE, DEMOGRAPHIC_CATEGORY, d.demographic_by_age.as_deref()),
    ] {
        if let Some(rows) = need(check, dataset, rows, &mut out) {
            out.extend(checks::age_breakdown(dataset, category, rows, dist));
        }
    }
    out
}

fn run_state_totals(d: &Datasets, _: &Tolerances) -> Vec<Finding> {
    let mut out = Vec::new();
    if let Some(rows) = need(CheckId::StateTotals, TOP10_STATES, d.top10_states.as_deref(), &mut out) {
        out.extend(checks::state_totals(rows));
    }
    out
}

fn run_tier1_count(d: &Datasets, _: &Tolerances) -> Vec<Finding> {
    let check = CheckId::Tier1Count;
    let mut out = Vec::new();
    let metrics = need(check, KEY_METRICS, d.key_metrics.as_ref(), &mut out);
    let districts = need(check, TIER1_DISTRICTS, d.tier1_districts.as_deref(), &mut out);
    if let (Some(m), Some(t)) = (metrics, districts) {
        out.extend(checks::tier1_count(m, t));
    }
    out
}

fn run_risk_tiers(d: &Datasets, tol: &Tolerances) -> Vec<Finding> {
    let check = CheckId::RiskTiers;
    let mut out = Vec::new();
    let metrics = need(check, KEY_METRICS, d.key_metrics.as_ref(), &mut out);
    let tiers = need(check, RISK_TIER_DISTRIBUTION, d.risk_tier_distribution.as_deref(), &mut out);
    if let Some(tiers) = tiers {
        out.extend(checks::risk_tiers(metrics, tiers, tol));
    }
    out
}

fn run_db_ratio(d: &Datasets, _: &Tolerances) -> Vec<Finding> {
    let check = CheckId::DbRatio;
    let mut out = Vec::new();
    let metrics = need(check, KEY_METRICS, d.key_metrics.as_ref(), &mut out);
    let bands = need(check, DB_RATIO_ANALYSIS, d.db_ratio_analysis.as_deref(), &mut out);
    if let (Some(m), Some(b)) = (metrics, bands) {
        out.extend(checks::db_ratio(m, b));
    }
    out
}

fn run_september_surge(d: &Datasets, tol: &Tolerances) -> Vec<Finding> {
    let mut out = Vec::new();
    if let Some(rows) = need(CheckId::SeptemberSurge, SEPTEMBER_SURGE, d.september_surge.as_deref(), &mut out) {
        out.extend(checks::september_surge(rows, tol));
    }
    out
}

fn run_subsidy_leakage(d: &Datasets, _: &Tolerances) -> Vec<Finding> {
    let check = CheckId::SubsidyLeakage;
    let mut out = Vec::new();
    let lines = need(check, SUBSIDY_LEAKAGE, d.subsidy_leakage.as_deref(), &mut out);
    let fiscal = need(check, FISCAL_IMPACT, d.fiscal_impact.as_ref(), &mut out);
    if let Some(lines) = lines {
        out.extend(checks::subsidy_leakage(lines, fiscal));
    }
    out
}

fn run_service_mix(d: &Datasets, tol: &Tolerances) -> Vec<Finding> {
    let mut out = Vec::new();
    if let Some(rows) = need(CheckId::ServiceMix, SERVICE_MIX_BY_STATE, d.service_mix_by_state.as_deref(), &mut out) {
        out.extend(checks::service_mix(rows, tol));
    }
    out
}

fn run_age_group_comparison(d: &Datasets, _: &Tolerances) -> Vec<Finding> {
    let mut out = Vec::new();
    if let Some(rows) = need(
        CheckId::AgeGroupComparison,
        AGE_GROUP_COMPARISON,
        d.age_group_comparison.as_deref(),
        &mut out,
    ) {
        out.extend(checks::age_group_comparison(rows));
    }
    out
}

fn run_enrolment_by_age(d: &Datasets, _: &Tolerances) -> Vec<Finding> {
    let mut out = Vec::new();
    if let Some(rows) = need(CheckId::EnrolmentByAge, ENROLMENT_BY_AGE, d.enrolment_by_age.as_deref(), &mut out) {
        out.extend(checks::enrolment_by_age(rows));
    }
    out
}

fn run_top20_ranking(d: &Datasets, _: &Tolerances) -> Vec<Finding> {
    let mut out = Vec::new();
    if let Some(rows) = need(CheckId::Top20Ranking, TOP20_DISTRICTS, d.top20_districts.as_deref(), &mut out) {
        out.extend(checks::top20_ranking(rows));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_collection_reports_schema_only() {
        let report = validate(&Datasets::default(), &Tolerances::default());
        assert!(report.errors.is_empty());
        assert!(report.warnings.is_empty());
        assert!(!report.schema_errors.is_empty());
        assert!(report.summary.is_none());
        assert!(!report.is_clean());
        // Every check reports at least one missing input.
        for (check, _) in BATTERY.iter() {
            assert!(!report.for_check(*check).is_empty(), "{} silent", check);
        }
    }

    #[test]
    fn battery_order_is_report_order() {
        let ids: Vec<&str> = BATTERY.iter().map(|(c, _)| c.as_str()).collect();
        assert_eq!(ids.first(), Some(&"transaction_total"));
        assert_eq!(ids.last(), Some(&"top20_ranking"));
        assert_eq!(ids.len(), 12);
    }

    #[test]
    fn decode_issues_lead_schema_errors() {
        let loaded = load_str(r#"{"keyMetrics": 5}"#).unwrap();
        let report = validate_loaded(&loaded, &Tolerances::default());
        assert_eq!(report.schema_errors[0].check, CheckId::Document);
        assert!(report.schema_errors[0].message.starts_with("keyMetrics:"));
        assert_eq!(report.dataset_sha256.as_deref(), Some(loaded.sha256.as_str()));
    }
}
