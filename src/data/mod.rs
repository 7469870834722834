//! Typed dashboard datasets.
//!
//! Every dataset the dashboard renders is described here as a plain record
//! type. A [`Datasets`] collection holds each one as `Option<_>` so that a
//! document missing a section still validates: the checks that need the
//! absent dataset report a schema finding and everything else runs.

mod load;

pub use load::{builtin, load_path, load_str, Loaded, SchemaIssue, BUILTIN_SOURCE};

use serde::{Deserialize, Serialize};

// JSON section keys, also used in schema findings.
pub const KEY_METRICS: &str = "keyMetrics";
pub const TRANSACTION_DISTRIBUTION: &str = "transactionDistribution";
pub const BIOMETRIC_BY_AGE: &str = "biometricByAge";
pub const DEMOGRAPHIC_BY_AGE: &str = "demographicByAge";
pub const TOP10_STATES: &str = "top10States";
pub const MONTHLY_TRENDS: &str = "monthlyTrends";
pub const TIER1_DISTRICTS: &str = "tier1Districts";
pub const RISK_TIER_DISTRIBUTION: &str = "riskTierDistribution";
pub const DB_RATIO_ANALYSIS: &str = "dbRatioAnalysis";
pub const DAY_OF_WEEK: &str = "dayOfWeekData";
pub const SEPTEMBER_SURGE: &str = "septemberSurge";
pub const SUBSIDY_LEAKAGE: &str = "subsidyLeakage";
pub const FISCAL_IMPACT: &str = "fiscalImpact";
pub const SERVICE_MIX_BY_STATE: &str = "serviceMixByState";
pub const AGE_GROUP_COMPARISON: &str = "ageGroupComparison";
pub const ENROLMENT_BY_AGE: &str = "enrolmentByAge";
pub const TOP20_DISTRICTS: &str = "top20Districts";

pub const SECTIONS: [&str; 17] = [
    KEY_METRICS,
    TRANSACTION_DISTRIBUTION,
    BIOMETRIC_BY_AGE,
    DEMOGRAPHIC_BY_AGE,
    TOP10_STATES,
    MONTHLY_TRENDS,
    TIER1_DISTRICTS,
    RISK_TIER_DISTRIBUTION,
    DB_RATIO_ANALYSIS,
    DAY_OF_WEEK,
    SEPTEMBER_SURGE,
    SUBSIDY_LEAKAGE,
    FISCAL_IMPACT,
    SERVICE_MIX_BY_STATE,
    AGE_GROUP_COMPARISON,
    ENROLMENT_BY_AGE,
    TOP20_DISTRICTS,
];

// Category names looked up in the transaction distribution.
pub const BIOMETRIC_CATEGORY: &str = "Biometric Updates";
pub const DEMOGRAPHIC_CATEGORY: &str = "Demographic Updates";
pub const TIER1_LABEL: &str = "Tier-1 Critical";
pub const NATIONAL_AVERAGE: &str = "National Average";

/// Ground-truth scalars the other datasets must agree with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyMetrics {
    pub total_transactions: u64,
    pub districts_analyzed: u64,
    pub anomalous_districts: u64,
    pub tier1_critical_districts: u64,
    pub september_surge_multiplier: f64,
    /// Crore rupees.
    pub estimated_fiscal_leakage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub value: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgeBreakdown {
    pub age_group: String,
    pub count: u64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateTotal {
    pub state: String,
    pub biometric: u64,
    pub demographic: u64,
    pub enrolment: u64,
    pub total: u64,
}

impl StateTotal {
    pub fn component_sum(&self) -> u64 {
        self.biometric
            .saturating_add(self.demographic)
            .saturating_add(self.enrolment)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyTrend {
    pub month: String,
    pub biometric: u64,
    pub demographic: u64,
    pub enrolment: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tier1District {
    pub district: String,
    pub state: String,
    pub db_ratio: f64,
    pub score: f64,
    pub adult_share: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskTier {
    pub tier: String,
    pub count: u64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DbRatioBand {
    pub category: String,
    pub range: String,
    pub districts: u64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayOfWeek {
    pub day: String,
    pub transactions: u64,
    pub avg_load: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurgeRecord {
    pub district: String,
    pub sept_activity: f64,
    pub annual_avg: f64,
    pub multiplier: f64,
}

impl SurgeRecord {
    pub fn is_sentinel(&self) -> bool {
        self.district == NATIONAL_AVERAGE
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubsidyLine {
    pub benefit: String,
    pub monthly: u64,
    pub annual: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FiscalImpact {
    pub per_fraudulent_identity: u64,
    #[serde(default)]
    pub realistic_per_identity: Option<u64>,
}

/// Percent split of services for one state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceMix {
    pub state: String,
    pub biometric: f64,
    pub demographic: f64,
    pub enrolment: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgeGroupShare {
    pub service: String,
    #[serde(rename = "0-5")]
    pub infant: f64,
    #[serde(rename = "5-17")]
    pub child: f64,
    #[serde(rename = "18+")]
    pub adult: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrolmentShare {
    pub age_group: String,
    pub expected: f64,
    pub actual: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedDistrict {
    pub district: String,
    pub state: String,
    pub total: u64,
}

/// The full dataset collection. Absent sections are `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Datasets {
    pub key_metrics: Option<KeyMetrics>,
    pub transaction_distribution: Option<Vec<Category>>,
    pub biometric_by_age: Option<Vec<AgeBreakdown>>,
    pub demographic_by_age: Option<Vec<AgeBreakdown>>,
    pub top10_states: Option<Vec<StateTotal>>,
    pub monthly_trends: Option<Vec<MonthlyTrend>>,
    pub tier1_districts: Option<Vec<Tier1District>>,
    pub risk_tier_distribution: Option<Vec<RiskTier>>,
    pub db_ratio_analysis: Option<Vec<DbRatioBand>>,
    pub day_of_week_data: Option<Vec<DayOfWeek>>,
    pub september_surge: Option<Vec<SurgeRecord>>,
    pub subsidy_leakage: Option<Vec<SubsidyLine>>,
    pub fiscal_impact: Option<FiscalImpact>,
    pub service_mix_by_state: Option<Vec<ServiceMix>>,
    pub age_group_comparison: Option<Vec<AgeGroupShare>>,
    pub enrolment_by_age: Option<Vec<EnrolmentShare>>,
    pub top20_districts: Option<Vec<RankedDistrict>>,
}

/// Sum a `u64` column, saturating at `u64::MAX`.
pub fn sum_u64<T>(rows: &[T], field: impl Fn(&T) -> u64) -> u64 {
    rows.iter().fold(0u64, |acc, r| acc.saturating_add(field(r)))
}

/// Look up a category value by its display name.
pub fn category_value(distribution: &[Category], name: &str) -> Option<u64> {
    distribution.iter().find(|c| c.name == name).map(|c| c.value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_metrics_use_camel_case_keys() {
        let km: KeyMetrics = serde_json::from_str(
            r#"{"totalTransactions":10,"districtsAnalyzed":2,"anomalousDistricts":1,
                "tier1CriticalDistricts":1,"septemberSurgeMultiplier":3.4,
                "estimatedFiscalLeakage":1840}"#,
        )
        .unwrap();
        assert_eq!(km.tier1_critical_districts, 1);
        assert_eq!(km.estimated_fiscal_leakage, 1840.0);
    }

    #[test]
    fn age_group_share_reads_literal_keys() {
        let row: AgeGroupShare =
            serde_json::from_str(r#"{"service":"Enrolment","0-5":61,"5-17":27,"18+":12}"#).unwrap();
        assert_eq!(row.infant + row.child + row.adult, 100.0);
    }

    #[test]
    fn sentinel_detection() {
        let rec = SurgeRecord {
            district: NATIONAL_AVERAGE.to_string(),
            sept_activity: 0.0,
            annual_avg: 0.0,
            multiplier: 1.0,
        };
        assert!(rec.is_sentinel());
    }

    #[test]
    fn category_lookup_is_exact() {
        let dist = vec![Category {
            name: BIOMETRIC_CATEGORY.to_string(),
            value: 7,
        }];
        assert_eq!(category_value(&dist, BIOMETRIC_CATEGORY), Some(7));
        assert_eq!(category_value(&dist, "biometric updates"), None);
    }
}
