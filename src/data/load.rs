use anyhow::{bail, Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;

use super::*;
use crate::logging::{log_load, log_schema_issue, log_unknown_section};

pub const BUILTIN_SOURCE: &str = "builtin:data/dashboard.json";

const BUILTIN_DOCUMENT: &str = include_str!("../../data/dashboard.json");

/// A section that was present but could not be decoded into its record type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaIssue {
    pub dataset: String,
    pub detail: String,
}

#[derive(Debug, Clone)]
pub struct Loaded {
    pub source: String,
    pub sha256: String,
    pub datasets: Datasets,
    pub issues: Vec<SchemaIssue>,
}

/// Load a dataset document from disk.
pub fn load_path(path: &Path) -> Result<Loaded> {
    let bytes = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let text = String::from_utf8(bytes)
        .with_context(|| format!("{} is not valid UTF-8", path.display()))?;
    decode(path.display().to_string(), &text)
}

pub fn load_str(text: &str) -> Result<Loaded> {
    decode("inline".to_string(), text)
}

/// The dataset compiled into the binary.
pub fn builtin() -> Result<Loaded> {
    decode(BUILTIN_SOURCE.to_string(), BUILTIN_DOCUMENT)
}

fn decode(source: String, text: &str) -> Result<Loaded> {
    let sha256 = hex::encode(Sha256::digest(text.as_bytes()));
    let root: Value =
        serde_json::from_str(text).with_context(|| format!("{} is not valid JSON", source))?;
    let mut map = match root {
        Value::Object(map) => map,
        other => bail!(
            "{}: expected an object keyed by dataset name, found {}",
            source,
            value_kind(&other)
        ),
    };

    let present = SECTIONS.iter().filter(|key| map.contains_key(**key)).count();
    let mut issues = Vec::new();
    let datasets = Datasets {
        key_metrics: section(&mut map, KEY_METRICS, &mut issues),
        transaction_distribution: section(&mut map, TRANSACTION_DISTRIBUTION, &mut issues),
        biometric_by_age: section(&mut map, BIOMETRIC_BY_AGE, &mut issues),
        demographic_by_age: section(&mut map, DEMOGRAPHIC_BY_AGE, &mut issues),
        top10_states: section(&mut map, TOP10_STATES, &mut issues),
        monthly_trends: section(&mut map, MONTHLY_TRENDS, &mut issues),
        tier1_districts: section(&mut map, TIER1_DISTRICTS, &mut issues),
        risk_tier_distribution: section(&mut map, RISK_TIER_DISTRIBUTION, &mut issues),
        db_ratio_analysis: section(&mut map, DB_RATIO_ANALYSIS, &mut issues),
        day_of_week_data: section(&mut map, DAY_OF_WEEK, &mut issues),
        september_surge: section(&mut map, SEPTEMBER_SURGE, &mut issues),
        subsidy_leakage: section(&mut map, SUBSIDY_LEAKAGE, &mut issues),
        fiscal_impact: section(&mut map, FISCAL_IMPACT, &mut issues),
        service_mix_by_state: section(&mut map, SERVICE_MIX_BY_STATE, &mut issues),
        age_group_comparison: section(&mut map, AGE_GROUP_COMPARISON, &mut issues),
        enrolment_by_age: section(&mut map, ENROLMENT_BY_AGE, &mut issues),
        top20_districts: section(&mut map, TOP20_DISTRICTS, &mut issues),
    };

    // Whatever is left over is not a dataset we know about.
    for key in map.keys() {
        log_unknown_section(&source, key);
    }
    for issue in &issues {
        log_schema_issue(&issue.dataset, &issue.detail);
    }
    log_load(&source, &sha256, present, issues.len());

    Ok(Loaded {
        source,
        sha256,
        datasets,
        issues,
    })
}

fn section<T: DeserializeOwned>(
    map: &mut Map<String, Value>,
    key: &str,
    issues: &mut Vec<SchemaIssue>,
) -> Option<T> {
    let value = map.remove(key)?;
    match serde_json::from_value(value) {
        Ok(parsed) => Some(parsed),
        Err(err) => {
            issues.push(SchemaIssue {
                dataset: key.to_string(),
                detail: format!("cannot decode: {}", err),
            });
            None
        }
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_has_every_section() {
        let loaded = builtin().unwrap();
        assert!(loaded.issues.is_empty(), "{:?}", loaded.issues);
        let d = &loaded.datasets;
        assert!(d.key_metrics.is_some());
        assert!(d.top20_districts.is_some());
        assert_eq!(d.monthly_trends.as_ref().map(|m| m.len()), Some(24));
        assert_eq!(loaded.source, BUILTIN_SOURCE);
        assert_eq!(loaded.sha256.len(), 64);
    }

    #[test]
    fn missing_section_is_none_without_issue() {
        let loaded = load_str(r#"{"fiscalImpact":{"perFraudulentIdentity":100}}"#).unwrap();
        assert!(loaded.issues.is_empty());
        assert!(loaded.datasets.key_metrics.is_none());
        assert_eq!(
            loaded.datasets.fiscal_impact.map(|f| f.per_fraudulent_identity),
            Some(100)
        );
    }

    #[test]
    fn malformed_section_becomes_issue() {
        let loaded = load_str(r#"{"top20Districts":[{"district":"A","state":"S"}]}"#).unwrap();
        assert!(loaded.datasets.top20_districts.is_none());
        assert_eq!(loaded.issues.len(), 1);
        assert_eq!(loaded.issues[0].dataset, TOP20_DISTRICTS);
        assert!(loaded.issues[0].detail.contains("total"));
    }

    #[test]
    fn non_object_document_fails() {
        let err = load_str("[1, 2, 3]").unwrap_err();
        assert!(err.to_string().contains("an array"));
    }

    #[test]
    fn fingerprint_tracks_content() {
        let a = load_str("{}").unwrap();
        let b = load_str("{ }").unwrap();
        assert_ne!(a.sha256, b.sha256);
        assert_eq!(a.sha256, load_str("{}").unwrap().sha256);
    }
}
