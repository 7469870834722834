//! Descriptive figures shown alongside the findings.
//!
//! Nothing here is checked; these are the breakdowns and shares a reviewer
//! reads to sanity-check the dataset by eye. A figure is absent or empty when
//! its inputs are.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::data::{
    sum_u64, Datasets, DayOfWeek, DbRatioBand, MonthlyTrend, RiskTier, SurgeRecord, Tier1District,
};

const SURGE_MONTHS: [&str; 2] = ["Sep 2024", "Sep 2025"];
const DB_CRITICAL: f64 = 2.0;
const DB_HIGH: f64 = 1.5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Share {
    pub name: String,
    pub value: u64,
    pub percent: f64,
}

/// A subset total and its share of all transactions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Coverage {
    pub entries: usize,
    pub total: u64,
    pub percent_of_transactions: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthMultiple {
    pub month: String,
    pub demographic: u64,
    pub multiple_of_average: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyTotals {
    pub months: usize,
    pub biometric: u64,
    pub demographic: u64,
    pub enrolment: u64,
    pub grand_total: u64,
    pub average_demographic: f64,
    pub september: Vec<MonthMultiple>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DbSeverity {
    Critical,
    High,
    Normal,
}

impl DbSeverity {
    pub fn classify(db_ratio: f64) -> Self {
        if db_ratio >= DB_CRITICAL {
            DbSeverity::Critical
        } else if db_ratio >= DB_HIGH {
            DbSeverity::High
        } else {
            DbSeverity::Normal
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DbSeverity::Critical => "critical",
            DbSeverity::High => "high",
            DbSeverity::Normal => "normal",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistrictSeverity {
    pub district: String,
    pub db_ratio: f64,
    pub severity: DbSeverity,
}

/// One day of the weekly pattern and its share of the week.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayShare {
    pub day: String,
    pub transactions: u64,
    pub avg_load: f64,
    pub percent_of_week: f64,
}

/// A surge record's multiplier recomputed from its activity figures.
/// `computed` is `None` when the annual average is zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SurgeRecomputation {
    pub district: String,
    pub sept_activity: f64,
    pub annual_avg: f64,
    pub computed: Option<f64>,
    pub stated: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Figures {
    pub transaction_breakdown: Vec<Share>,
    pub top10_states: Option<Coverage>,
    pub monthly: Option<MonthlyTotals>,
    /// State name to number of tier-1 districts, sorted by state.
    pub tier1_by_state: BTreeMap<String, usize>,
    pub tier1_severity: Vec<DistrictSeverity>,
    pub risk_tiers: Vec<RiskTier>,
    pub risk_tier_percent_sum: Option<f64>,
    pub db_ratio_bands: Vec<DbRatioBand>,
    pub weekly_transactions: Option<u64>,
    pub weekdays: Vec<DayShare>,
    /// Non-sentinel surge records only.
    pub surge: Vec<SurgeRecomputation>,
    pub top20_districts: Option<Coverage>,
}

pub fn compute(d: &Datasets) -> Figures {
    let total_transactions = d.key_metrics.as_ref().map(|m| m.total_transactions);
    let coverage = |entries: usize, total: u64| Coverage {
        entries,
        total,
        percent_of_transactions: total_transactions.and_then(|t| percent(total, t)),
    };

    Figures {
        transaction_breakdown: d
            .transaction_distribution
            .as_deref()
            .map(|dist| {
                let sum = sum_u64(dist, |c| c.value);
                dist.iter()
                    .map(|c| Share {
                        name: c.name.clone(),
                        value: c.value,
                        percent: percent(c.value, sum).unwrap_or(0.0),
                    })
                    .collect()
            })
            .unwrap_or_default(),
        top10_states: d
            .top10_states
            .as_deref()
            .map(|rows| coverage(rows.len(), sum_u64(rows, |s| s.total))),
        monthly: d.monthly_trends.as_deref().and_then(monthly_totals),
        tier1_by_state: d
            .tier1_districts
            .as_deref()
            .map(tier1_by_state)
            .unwrap_or_default(),
        tier1_severity: d
            .tier1_districts
            .as_deref()
            .map(|rows| {
                rows.iter()
                    .map(|t| DistrictSeverity {
                        district: t.district.clone(),
                        db_ratio: t.db_ratio,
                        severity: DbSeverity::classify(t.db_ratio),
                    })
                    .collect()
            })
            .unwrap_or_default(),
        risk_tiers: d.risk_tier_distribution.clone().unwrap_or_default(),
        risk_tier_percent_sum: d
            .risk_tier_distribution
            .as_deref()
            .map(|tiers| tiers.iter().map(|t| t.percentage).sum()),
        db_ratio_bands: d.db_ratio_analysis.clone().unwrap_or_default(),
        weekly_transactions: d
            .day_of_week_data
            .as_deref()
            .map(|days| sum_u64(days, |day| day.transactions)),
        weekdays: d.day_of_week_data.as_deref().map(weekdays).unwrap_or_default(),
        surge: d.september_surge.as_deref().map(surge).unwrap_or_default(),
        top20_districts: d
            .top20_districts
            .as_deref()
            .map(|rows| coverage(rows.len(), sum_u64(rows, |r| r.total))),
    }
}

fn percent(part: u64, whole: u64) -> Option<f64> {
    if whole == 0 {
        return None;
    }
    Some(part as f64 / whole as f64 * 100.0)
}

fn monthly_totals(rows: &[MonthlyTrend]) -> Option<MonthlyTotals> {
    if rows.is_empty() {
        return None;
    }
    let biometric = sum_u64(rows, |m| m.biometric);
    let demographic = sum_u64(rows, |m| m.demographic);
    let enrolment = sum_u64(rows, |m| m.enrolment);
    let average_demographic = demographic as f64 / rows.len() as f64;

    let september = SURGE_MONTHS
        .iter()
        .filter_map(|name| rows.iter().find(|m| m.month == *name))
        .map(|m| MonthMultiple {
            month: m.month.clone(),
            demographic: m.demographic,
            multiple_of_average: if average_demographic > 0.0 {
                m.demographic as f64 / average_demographic
            } else {
                0.0
            },
        })
        .collect();

    Some(MonthlyTotals {
        months: rows.len(),
        biometric,
        demographic,
        enrolment,
        grand_total: biometric.saturating_add(demographic).saturating_add(enrolment),
        average_demographic,
        september,
    })
}

fn weekdays(days: &[DayOfWeek]) -> Vec<DayShare> {
    let week = sum_u64(days, |d| d.transactions);
    days.iter()
        .map(|d| DayShare {
            day: d.day.clone(),
            transactions: d.transactions,
            avg_load: d.avg_load,
            percent_of_week: percent(d.transactions, week).unwrap_or(0.0),
        })
        .collect()
}

fn surge(rows: &[SurgeRecord]) -> Vec<SurgeRecomputation> {
    rows.iter()
        .filter(|r| !r.is_sentinel())
        .map(|r| {
            let ratio = r.sept_activity / r.annual_avg;
            SurgeRecomputation {
                district: r.district.clone(),
                sept_activity: r.sept_activity,
                annual_avg: r.annual_avg,
                computed: ratio.is_finite().then_some(ratio),
                stated: r.multiplier,
            }
        })
        .collect()
}

fn tier1_by_state(rows: &[Tier1District]) -> BTreeMap<String, usize> {
    let mut by_state = BTreeMap::new();
    for d in rows {
        *by_state.entry(d.state.clone()).or_insert(0) += 1;
    }
    by_state
}
