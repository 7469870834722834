use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckId {
    /// Problems found while decoding the document, before any check ran.
    Document,
    TransactionTotal,
    AgeBreakdown,
    StateTotals,
    Tier1Count,
    RiskTiers,
    DbRatio,
    SeptemberSurge,
    SubsidyLeakage,
    ServiceMix,
    AgeGroupComparison,
    EnrolmentByAge,
    Top20Ranking,
}

impl CheckId {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckId::Document => "document",
            CheckId::TransactionTotal => "transaction_total",
            CheckId::AgeBreakdown => "age_breakdown",
            CheckId::StateTotals => "state_totals",
            CheckId::Tier1Count => "tier1_count",
            CheckId::RiskTiers => "risk_tiers",
            CheckId::DbRatio => "db_ratio",
            CheckId::SeptemberSurge => "september_surge",
            CheckId::SubsidyLeakage => "subsidy_leakage",
            CheckId::ServiceMix => "service_mix",
            CheckId::AgeGroupComparison => "age_group_comparison",
            CheckId::EnrolmentByAge => "enrolment_by_age",
            CheckId::Top20Ranking => "top20_ranking",
        }
    }
}

impl fmt::Display for CheckId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Hard inconsistency: the data contradicts itself.
    Error,
    /// Soft anomaly: a derived value drifted past its tolerance.
    Warning,
    /// A dataset, record or field the check needs is absent or unreadable.
    Schema,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Finding {
    pub check: CheckId,
    pub severity: Severity,
    pub message: String,
}

impl Finding {
    pub fn error(check: CheckId, message: impl Into<String>) -> Self {
        Self {
            check,
            severity: Severity::Error,
            message: message.into(),
        }
    }

    pub fn warning(check: CheckId, message: impl Into<String>) -> Self {
        Self {
            check,
            severity: Severity::Warning,
            message: message.into(),
        }
    }

    pub fn schema(check: CheckId, message: impl Into<String>) -> Self {
        Self {
            check,
            severity: Severity::Schema,
            message: message.into(),
        }
    }

    pub fn missing(check: CheckId, dataset: &str) -> Self {
        Self::schema(check, format!("dataset {} missing", dataset))
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Render a float without trailing noise: `100`, `99.5`, `3.58`.
pub fn num(x: f64) -> String {
    if x.is_finite() && x.fract() == 0.0 {
        return format!("{:.0}", x);
    }
    let s = format!("{:.2}", x);
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}
