use crate::core::audit::{BUSINESS_STABLE_BAND_PCT, ECONOMY_DROP_THRESHOLD_PCT, HIGH_PRIORITY_MONTH};
use crate::domain::model::{AuditedRecord, AuditedSeries, FareClass};

const RULE_WIDTH: usize = 70;

pub const SECTION_SCOPE: &str = "[AUDIT SCOPE]";
pub const SECTION_FINDINGS: &str = "[KEY FINDINGS]";
pub const SECTION_CONTEXT: &str = "[HISTORICAL CONTEXT]";

fn value(v: Option<f64>) -> String {
    v.map(|x| format!("{:.2}", x)).unwrap_or_else(|| "n/a".to_string())
}

fn pct(v: Option<f64>) -> String {
    v.map(|x| format!("{:+.2}%", x)).unwrap_or_else(|| "n/a".to_string())
}

pub fn finding_label(record: &AuditedRecord) -> &'static str {
    if record.annotation.is_high_priority {
        "High Priority Anomaly"
    } else {
        "REVENUE_LEAKAGE"
    }
}

/// Renders the terminal audit report. Contains no wall-clock content, so the
/// same series always renders to the same text.
pub fn render_report(audited: &AuditedSeries) -> String {
    let rule = "-".repeat(RULE_WIDTH);
    let banner = "=".repeat(RULE_WIDTH);
    let start = audited
        .first_month()
        .map(|m| m.to_string())
        .unwrap_or_else(|| "n/a".to_string());
    let end = audited
        .last_month()
        .map(|m| m.to_string())
        .unwrap_or_else(|| "n/a".to_string());

    let mut lines = vec![
        banner.clone(),
        format!("{:^width$}", "BITRE AIR FARE AUDIT REPORT", width = RULE_WIDTH),
        format!("{:^width$}", "Aviation Revenue Integrity Assessment", width = RULE_WIDTH),
        banner,
        String::new(),
    ];

    // Scope
    let indices: Vec<&str> = audited.located.iter().map(|c| c.label()).collect();
    lines.push(SECTION_SCOPE.to_string());
    lines.push(rule.clone());
    lines.push(format!("  Period covered:          {} to {}", start, end));
    lines.push(format!("  Observations analysed:   {} months", audited.records.len()));
    lines.push(format!("  Indices reviewed:        {}", indices.join(", ")));
    lines.push("  Methodology:             Month-on-Month % change analysis with".to_string());
    lines.push(format!(
        "                           REVENUE_LEAKAGE flag (Economy drop >{}%,",
        -ECONOMY_DROP_THRESHOLD_PCT
    ));
    lines.push(format!(
        "                           Business stable -{b}% to +{b}%)",
        b = BUSINESS_STABLE_BAND_PCT
    ));
    lines.push(format!("  High priority month:     {}", HIGH_PRIORITY_MONTH));
    lines.push(rule.clone());
    lines.push(String::new());

    // Findings
    let findings: Vec<&AuditedRecord> = audited.leakage_events().collect();
    lines.push(SECTION_FINDINGS.to_string());
    lines.push(rule.clone());
    lines.push(format!("  REVENUE_LEAKAGE events:  {}", findings.len()));
    lines.push(rule.clone());
    if findings.is_empty() {
        lines.push("  No REVENUE_LEAKAGE events detected in the audit period.".to_string());
    }
    for (n, finding) in findings.iter().enumerate() {
        let (record, annotation) = (&finding.record, &finding.annotation);
        lines.push(format!("  {}. {}  |  {}", n + 1, record.month, finding_label(finding)));
        lines.push(format!(
            "       Index:  Business {}  |  Economy {}  |  Best Discount {}",
            value(record.value(FareClass::BusinessClass)),
            value(record.value(FareClass::RestrictedEconomy)),
            value(record.value(FareClass::BestDiscount)),
        ));
        lines.push(format!(
            "       MoM:    Business {}  |  Economy {}  |  Best Discount {}",
            pct(annotation.mom_business),
            pct(annotation.mom_restricted_economy),
            pct(annotation.mom_best_discount),
        ));
        lines.push(format!(
            "       High priority: {}",
            if annotation.is_high_priority { "yes" } else { "no" }
        ));
        if let Some(note) = &annotation.historical_note {
            lines.push(format!("       Note: {}", note));
        }
        lines.push(String::new());
    }
    lines.push(rule.clone());
    lines.push(String::new());

    // Context
    let noted: Vec<&AuditedRecord> = audited.noted_months().collect();
    lines.push(SECTION_CONTEXT.to_string());
    lines.push(rule.clone());
    if noted.is_empty() {
        lines.push("  No historical notes apply to the audit period.".to_string());
    }
    for (n, record) in noted.iter().enumerate() {
        lines.push(format!("  {}. {}:", n + 1, record.record.month));
        if let Some(note) = &record.annotation.historical_note {
            lines.push(format!("       {}", note));
        }
        lines.push(String::new());
    }
    lines.push(rule);

    let mut report = lines.join("\n");
    report.push('\n');
    report
}
