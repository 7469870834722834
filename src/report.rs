//! Presentation of a [`ValidationReport`]: console text, JSON, exit status.

use anyhow::{Context, Result};
use std::fmt::Write;

use crate::figures::{Coverage, Figures};
use crate::verify::{num, Finding, Severity, Summary, ValidationReport};

pub const EXIT_OK: i32 = 0;
pub const EXIT_LOAD_FAILED: i32 = 1;
pub const EXIT_INCONSISTENT: i32 = 2;

const RULE: &str = "========================================";

/// 0 when the report is clean, [`EXIT_INCONSISTENT`] on errors or schema
/// errors, and on warnings too when `fail_on_warnings` is set.
pub fn exit_code(report: &ValidationReport, fail_on_warnings: bool) -> i32 {
    if !report.is_clean() || (fail_on_warnings && !report.warnings.is_empty()) {
        EXIT_INCONSISTENT
    } else {
        EXIT_OK
    }
}

pub fn render_json(report: &ValidationReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialize validation report")
}

pub fn render_text(report: &ValidationReport) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_text(&mut out, report);
    out
}

fn write_text(out: &mut String, report: &ValidationReport) -> std::fmt::Result {
    writeln!(out, "{}", RULE)?;
    writeln!(out, "DASHBOARD DATA VALIDATION")?;
    writeln!(out, "{}", RULE)?;
    if let Some(source) = &report.source {
        writeln!(out, "   Source: {}", source)?;
    }
    if let Some(sha) = &report.dataset_sha256 {
        writeln!(out, "   SHA-256: {}", sha)?;
    }
    writeln!(
        out,
        "   Tolerances: multiplier ±{}, percentage ±{}",
        num(report.tolerances.multiplier),
        num(report.tolerances.percent)
    )?;

    write_figures(out, &report.figures)?;

    writeln!(out)?;
    writeln!(out, "{}", RULE)?;
    writeln!(out, "VALIDATION SUMMARY")?;
    writeln!(out, "{}", RULE)?;
    write_findings(out, "ERRORS", &report.errors, "None! All critical validations passed.")?;
    write_findings(out, "WARNINGS", &report.warnings, "None!")?;
    write_findings(out, "SCHEMA", &report.schema_errors, "None!")?;

    writeln!(out)?;
    writeln!(out, "{}", RULE)?;
    writeln!(out, "KEY DATA POINTS")?;
    writeln!(out, "{}", RULE)?;
    match &report.summary {
        Some(summary) => write_summary(out, summary)?,
        None => writeln!(out, "   (keyMetrics unavailable)")?,
    }
    Ok(())
}

fn write_findings(out: &mut String, title: &str, findings: &[Finding], empty: &str) -> std::fmt::Result {
    writeln!(out)?;
    writeln!(out, "{} ({}):", title, findings.len())?;
    if findings.is_empty() {
        return writeln!(out, "   {}", empty);
    }
    for f in findings {
        let mark = match f.severity {
            Severity::Error => "x",
            Severity::Warning => "!",
            Severity::Schema => "?",
        };
        writeln!(out, "   [{}] {}: {}", mark, f.check, f.message)?;
    }
    Ok(())
}

fn write_summary(out: &mut String, s: &Summary) -> std::fmt::Result {
    writeln!(out, "   Total Transactions: {}", group_digits(s.total_transactions))?;
    writeln!(out, "   Districts Analyzed: {}", s.districts_analyzed)?;
    writeln!(out, "   Anomalous Districts: {}", s.anomalous_districts)?;
    writeln!(out, "   Tier-1 Critical: {}", s.tier1_critical_districts)?;
    writeln!(out, "   September Surge: {}x", num(s.september_surge_multiplier))?;
    writeln!(out, "   Estimated Fiscal Leakage: Rs {} Cr", num(s.estimated_fiscal_leakage_cr))
}

fn write_figures(out: &mut String, f: &Figures) -> std::fmt::Result {
    if !f.transaction_breakdown.is_empty() {
        section(out, "TRANSACTION BREAKDOWN")?;
        for share in &f.transaction_breakdown {
            writeln!(
                out,
                "   - {}: {} ({:.1}%)",
                share.name,
                group_digits(share.value),
                share.percent
            )?;
        }
    }
    if let Some(c) = &f.top10_states {
        section(out, "TOP 10 STATES")?;
        write_coverage(out, "states", c)?;
    }
    if let Some(m) = &f.monthly {
        section(out, "MONTHLY TRENDS")?;
        writeln!(out, "   Months: {}", m.months)?;
        writeln!(out, "   - Biometric: {}", group_digits(m.biometric))?;
        writeln!(out, "   - Demographic: {}", group_digits(m.demographic))?;
        writeln!(out, "   - Enrolment: {}", group_digits(m.enrolment))?;
        writeln!(out, "   - Grand total: {}", group_digits(m.grand_total))?;
        writeln!(out, "   Average monthly demographic: {:.0}", m.average_demographic)?;
        for sep in &m.september {
            writeln!(
                out,
                "   - {} demographic: {} ({:.2}x avg)",
                sep.month,
                group_digits(sep.demographic),
                sep.multiple_of_average
            )?;
        }
    }
    if !f.tier1_by_state.is_empty() {
        section(out, "TIER-1 DISTRICTS")?;
        for (state, count) in &f.tier1_by_state {
            writeln!(out, "   - {}: {} districts", state, count)?;
        }
        for d in &f.tier1_severity {
            writeln!(out, "   - {}: D/B={} {}", d.district, num(d.db_ratio), d.severity.as_str())?;
        }
    }
    if !f.risk_tiers.is_empty() {
        section(out, "RISK TIERS")?;
        for t in &f.risk_tiers {
            writeln!(out, "   - {}: {} ({}%)", t.tier, t.count, num(t.percentage))?;
        }
        if let Some(pct) = f.risk_tier_percent_sum {
            writeln!(out, "   Percentage sum: {:.1}%", pct)?;
        }
    }
    if !f.db_ratio_bands.is_empty() {
        section(out, "D/B RATIO BANDS")?;
        for b in &f.db_ratio_bands {
            writeln!(
                out,
                "   - {} ({}): {} districts ({}%)",
                b.category,
                b.range,
                b.districts,
                num(b.percentage)
            )?;
        }
    }
    if let Some(week) = f.weekly_transactions {
        section(out, "DAY OF WEEK")?;
        writeln!(out, "   Weekly total transactions: {}", group_digits(week))?;
        for d in &f.weekdays {
            writeln!(
                out,
                "   - {}: {} ({}% avg load, {:.1}% of week)",
                d.day,
                group_digits(d.transactions),
                num(d.avg_load),
                d.percent_of_week
            )?;
        }
    }
    if !f.surge.is_empty() {
        section(out, "SEPTEMBER SURGE")?;
        for r in &f.surge {
            let computed = match r.computed {
                Some(c) => format!("{:.2}x", c),
                None => "n/a".to_string(),
            };
            writeln!(
                out,
                "   - {}: {}/{} = {} (stated {}x)",
                r.district,
                num(r.sept_activity),
                num(r.annual_avg),
                computed,
                num(r.stated)
            )?;
        }
    }
    if let Some(c) = &f.top20_districts {
        section(out, "TOP 20 DISTRICTS")?;
        write_coverage(out, "districts", c)?;
    }
    Ok(())
}

fn section(out: &mut String, title: &str) -> std::fmt::Result {
    writeln!(out)?;
    writeln!(out, "{}", title)?;
    writeln!(out, "{}", "-".repeat(title.len()))
}

fn write_coverage(out: &mut String, noun: &str, c: &Coverage) -> std::fmt::Result {
    writeln!(out, "   {} {}, total {}", c.entries, noun, group_digits(c.total))?;
    if let Some(pct) = c.percent_of_transactions {
        writeln!(out, "   As % of total transactions: {:.1}%", pct)?;
    }
    Ok(())
}

/// `1234567` -> `1,234,567`
pub fn group_digits(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
