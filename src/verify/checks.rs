//! The consistency checks.
//!
//! Each check takes exactly the datasets it reads and returns its findings.
//! Checks never fail and never stop early: every record is examined and every
//! problem is reported.

use crate::config::Tolerances;
use crate::data::{
    category_value, sum_u64, AgeBreakdown, AgeGroupShare, Category, DbRatioBand, EnrolmentShare,
    FiscalImpact, KeyMetrics, RankedDistrict, RiskTier, ServiceMix, StateTotal, SubsidyLine,
    SurgeRecord, Tier1District, DB_RATIO_ANALYSIS, RISK_TIER_DISTRIBUTION, TIER1_LABEL,
    TRANSACTION_DISTRIBUTION,
};

use super::finding::{num, CheckId, Finding};

// Percentages are decimal literals; sums this close to the target are exact.
const EXACT_EPSILON: f64 = 1e-9;

fn is_exactly(sum: f64, target: f64) -> bool {
    (sum - target).abs() < EXACT_EPSILON
}

fn within(sum: f64, target: f64, tolerance: f64) -> bool {
    (sum - target).abs() <= tolerance + EXACT_EPSILON
}

fn sum_f64<T>(rows: &[T], field: impl Fn(&T) -> f64) -> f64 {
    rows.iter().map(field).sum()
}

/// Transaction distribution adds up to the headline transaction count.
pub fn transaction_total(metrics: &KeyMetrics, distribution: &[Category]) -> Vec<Finding> {
    let sum = sum_u64(distribution, |c| c.value);
    if sum == metrics.total_transactions {
        return Vec::new();
    }
    vec![Finding::error(
        CheckId::TransactionTotal,
        format!(
            "transaction distribution sum ({}) != keyMetrics.totalTransactions ({}); difference {}",
            sum,
            metrics.total_transactions,
            sum.abs_diff(metrics.total_transactions)
        ),
    )]
}

/// An age split agrees with its category total and closes to 100%.
///
/// `dataset` names the breakdown in messages, `category` is the entry of the
/// transaction distribution it must add up to. `distribution` is `None` when
/// that dataset is absent; the percentage rule still runs.
pub fn age_breakdown(
    dataset: &str,
    category: &str,
    rows: &[AgeBreakdown],
    distribution: Option<&[Category]>,
) -> Vec<Finding> {
    let check = CheckId::AgeBreakdown;
    let mut out = Vec::new();

    if let Some(distribution) = distribution {
        let count = sum_u64(rows, |r| r.count);
        match category_value(distribution, category) {
            Some(expected) if expected != count => out.push(Finding::error(
                check,
                format!(
                    "{} count sum ({}) != {} ({}); difference {}",
                    dataset,
                    count,
                    category,
                    expected,
                    count.abs_diff(expected)
                ),
            )),
            Some(_) => {}
            None => out.push(Finding::schema(
                check,
                format!(
                    "{}: {} has no \"{}\" entry",
                    dataset, TRANSACTION_DISTRIBUTION, category
                ),
            )),
        }
    }

    let pct = sum_f64(rows, |r| r.percentage);
    if !is_exactly(pct, 100.0) {
        out.push(Finding::error(
            check,
            format!("{} percentages sum to {}%, not 100%", dataset, num(pct)),
        ));
    }
    out
}

/// Each state's components add up to its stated total.
pub fn state_totals(rows: &[StateTotal]) -> Vec<Finding> {
    rows.iter()
        .filter(|s| s.component_sum() != s.total)
        .map(|s| {
            Finding::error(
                CheckId::StateTotals,
                format!(
                    "{}: {} + {} + {} = {} != {}",
                    s.state,
                    s.biometric,
                    s.demographic,
                    s.enrolment,
                    s.component_sum(),
                    s.total
                ),
            )
        })
        .collect()
}

pub fn tier1_count(metrics: &KeyMetrics, districts: &[Tier1District]) -> Vec<Finding> {
    let listed = districts.len() as u64;
    if listed == metrics.tier1_critical_districts {
        return Vec::new();
    }
    vec![Finding::error(
        CheckId::Tier1Count,
        format!(
            "tier1Districts lists {} districts but keyMetrics.tier1CriticalDistricts is {}",
            listed, metrics.tier1_critical_districts
        ),
    )]
}

/// Tier counts cover every analyzed district, the Tier-1 bucket matches the
/// headline figure, and the percentages close to roughly 100.
///
/// Without `metrics` only the percentage rule runs.
pub fn risk_tiers(
    metrics: Option<&KeyMetrics>,
    tiers: &[RiskTier],
    tolerances: &Tolerances,
) -> Vec<Finding> {
    let check = CheckId::RiskTiers;
    let mut out = Vec::new();

    if let Some(metrics) = metrics {
        let count = sum_u64(tiers, |t| t.count);
        if count != metrics.districts_analyzed {
            out.push(Finding::error(
                check,
                format!(
                    "{} count sum ({}) != keyMetrics.districtsAnalyzed ({})",
                    RISK_TIER_DISTRIBUTION, count, metrics.districts_analyzed
                ),
            ));
        }

        match tiers.iter().find(|t| t.tier == TIER1_LABEL) {
            Some(t) if t.count != metrics.tier1_critical_districts => out.push(Finding::error(
                check,
                format!(
                    "{} \"{}\" count ({}) != keyMetrics.tier1CriticalDistricts ({})",
                    RISK_TIER_DISTRIBUTION, TIER1_LABEL, t.count, metrics.tier1_critical_districts
                ),
            )),
            Some(_) => {}
            None => out.push(Finding::schema(
                check,
                format!("{} has no \"{}\" entry", RISK_TIER_DISTRIBUTION, TIER1_LABEL),
            )),
        }
    }

    let pct = sum_f64(tiers, |t| t.percentage);
    if !within(pct, 100.0, tolerances.percent) {
        out.push(Finding::warning(
            check,
            format!(
                "{} percentages sum to {}%, outside 100% ± {}",
                RISK_TIER_DISTRIBUTION,
                num(pct),
                num(tolerances.percent)
            ),
        ));
    }
    out
}

pub fn db_ratio(metrics: &KeyMetrics, bands: &[DbRatioBand]) -> Vec<Finding> {
    let sum = sum_u64(bands, |b| b.districts);
    if sum == metrics.districts_analyzed {
        return Vec::new();
    }
    vec![Finding::error(
        CheckId::DbRatio,
        format!(
            "{} district sum ({}) != keyMetrics.districtsAnalyzed ({})",
            DB_RATIO_ANALYSIS, sum, metrics.districts_analyzed
        ),
    )]
}

/// Stated surge multipliers match `septActivity / annualAvg`.
///
/// Source figures are rounded upstream, so a mismatch is only a warning. The
/// "National Average" sentinel row is skipped.
pub fn september_surge(rows: &[SurgeRecord], tolerances: &Tolerances) -> Vec<Finding> {
    let check = CheckId::SeptemberSurge;
    let mut out = Vec::new();
    for r in rows.iter().filter(|r| !r.is_sentinel()) {
        let computed = r.sept_activity / r.annual_avg;
        if !computed.is_finite() {
            out.push(Finding::schema(
                check,
                format!(
                    "{}: multiplier cannot be recomputed from {}/{}",
                    r.district,
                    num(r.sept_activity),
                    num(r.annual_avg)
                ),
            ));
            continue;
        }
        if (computed - r.multiplier).abs() >= tolerances.multiplier {
            out.push(Finding::warning(
                check,
                format!(
                    "{} multiplier: {}/{} = {:.2} vs stated {}",
                    r.district,
                    num(r.sept_activity),
                    num(r.annual_avg),
                    computed,
                    num(r.multiplier)
                ),
            ));
        }
    }
    out
}

/// Monthly benefit amounts annualize exactly, and their sum matches the
/// per-identity fiscal figure (soft, the figure may carry extra factors).
///
/// `fiscal` is `None` when the fiscal impact dataset is absent; the
/// arithmetic rule still runs.
pub fn subsidy_leakage(lines: &[SubsidyLine], fiscal: Option<&FiscalImpact>) -> Vec<Finding> {
    let check = CheckId::SubsidyLeakage;
    let mut out: Vec<Finding> = lines
        .iter()
        .filter_map(|l| {
            let annualized = l.monthly.checked_mul(12);
            if annualized == Some(l.annual) {
                return None;
            }
            let shown = annualized.map(|v| v.to_string()).unwrap_or_else(|| "overflow".to_string());
            Some(Finding::error(
                check,
                format!("{}: monthly × 12 ({}) != annual ({})", l.benefit, shown, l.annual),
            ))
        })
        .collect();

    if let Some(fiscal) = fiscal {
        let total = sum_u64(lines, |l| l.annual);
        if total != fiscal.per_fraudulent_identity {
            out.push(Finding::warning(
                check,
                format!(
                    "subsidy annual sum ({}) != fiscalImpact.perFraudulentIdentity ({})",
                    total, fiscal.per_fraudulent_identity
                ),
            ));
        }
    }
    out
}

/// Service percentages per state close to 100 within tolerance.
pub fn service_mix(rows: &[ServiceMix], tolerances: &Tolerances) -> Vec<Finding> {
    rows.iter()
        .filter_map(|s| {
            let total = s.biometric + s.demographic + s.enrolment;
            if within(total, 100.0, tolerances.percent) {
                return None;
            }
            Some(Finding::error(
                CheckId::ServiceMix,
                format!(
                    "{} service mix: {}% + {}% + {}% = {}%, outside 100% ± {}",
                    s.state,
                    num(s.biometric),
                    num(s.demographic),
                    num(s.enrolment),
                    num(total),
                    num(tolerances.percent)
                ),
            ))
        })
        .collect()
}

pub fn age_group_comparison(rows: &[AgeGroupShare]) -> Vec<Finding> {
    rows.iter()
        .filter_map(|r| {
            let total = r.infant + r.child + r.adult;
            if is_exactly(total, 100.0) {
                return None;
            }
            Some(Finding::error(
                CheckId::AgeGroupComparison,
                format!(
                    "{} age groups: {}% + {}% + {}% = {}%, not 100%",
                    r.service,
                    num(r.infant),
                    num(r.child),
                    num(r.adult),
                    num(total)
                ),
            ))
        })
        .collect()
}

/// Expected and actual columns each close to 100.
pub fn enrolment_by_age(rows: &[EnrolmentShare]) -> Vec<Finding> {
    let mut out = Vec::new();
    for (column, sum) in [
        ("expected", sum_f64(rows, |r| r.expected)),
        ("actual", sum_f64(rows, |r| r.actual)),
    ] {
        if !is_exactly(sum, 100.0) {
            out.push(Finding::error(
                CheckId::EnrolmentByAge,
                format!("enrolmentByAge {} column sums to {}%, not 100%", column, num(sum)),
            ));
        }
    }
    out
}

/// The ranking is non-increasing by total; one finding per inverted pair.
pub fn top20_ranking(rows: &[RankedDistrict]) -> Vec<Finding> {
    rows.windows(2)
        .filter(|pair| pair[0].total < pair[1].total)
        .map(|pair| {
            Finding::error(
                CheckId::Top20Ranking,
                format!(
                    "top20 ranking: {} ({}) < {} ({})",
                    pair[0].district, pair[0].total, pair[1].district, pair[1].total
                ),
            )
        })
        .collect()
}
