use chrono::{Datelike, NaiveDate};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Calendar month granularity used for every record in a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    pub const fn new(year: i32, month: u32) -> Option<Self> {
        if month >= 1 && month <= 12 {
            Some(Self { year, month })
        } else {
            None
        }
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// Months elapsed since year zero; consecutive months differ by one.
    pub fn ordinal(&self) -> i64 {
        self.year as i64 * 12 + (self.month as i64 - 1)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = String;

    /// Parses the canonical `YYYY-MM` key.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, month) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| format!("expected YYYY-MM, got '{}'", s))?;
        let year: i32 = year
            .parse()
            .map_err(|_| format!("invalid year in '{}'", s))?;
        let month: u32 = month
            .parse()
            .map_err(|_| format!("invalid month in '{}'", s))?;
        YearMonth::new(year, month).ok_or_else(|| format!("month out of range in '{}'", s))
    }
}

impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// The three real-terms fare classes tracked by the audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FareClass {
    BusinessClass,
    RestrictedEconomy,
    BestDiscount,
}

impl FareClass {
    pub const ALL: [FareClass; 3] = [
        FareClass::BusinessClass,
        FareClass::RestrictedEconomy,
        FareClass::BestDiscount,
    ];

    /// Canonical column label used in reports, chart legends and exports.
    pub fn label(&self) -> &'static str {
        match self {
            FareClass::BusinessClass => "Real Business Class",
            FareClass::RestrictedEconomy => "Real Restricted Economy",
            FareClass::BestDiscount => "Real Best Discount",
        }
    }

    pub fn short_label(&self) -> &'static str {
        match self {
            FareClass::BusinessClass => "Business",
            FareClass::RestrictedEconomy => "Economy",
            FareClass::BestDiscount => "Best Discount",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FareRecord {
    pub month: YearMonth,
    pub business_class: Option<f64>,
    pub restricted_economy: Option<f64>,
    pub best_discount: Option<f64>,
}

impl FareRecord {
    pub fn value(&self, class: FareClass) -> Option<f64> {
        match class {
            FareClass::BusinessClass => self.business_class,
            FareClass::RestrictedEconomy => self.restricted_economy,
            FareClass::BestDiscount => self.best_discount,
        }
    }

    /// Business Class or Restricted Economy present; Best Discount alone
    /// does not make a usable month.
    pub fn has_required_value(&self) -> bool {
        self.business_class.is_some() || self.restricted_economy.is_some()
    }
}

/// Cleaned monthly series: ascending by month, no duplicate months.
#[derive(Debug, Clone, PartialEq)]
pub struct FareSeries {
    records: Vec<FareRecord>,
    /// Fare classes whose column was located in the source file.
    located: Vec<FareClass>,
}

impl FareSeries {
    /// Sorts by month and keeps the first record of any duplicated month.
    pub fn new(mut records: Vec<FareRecord>, located: Vec<FareClass>) -> Self {
        records.sort_by_key(|r| r.month);
        let before = records.len();
        records.dedup_by_key(|r| r.month);
        if records.len() != before {
            tracing::warn!(
                "Dropped {} record(s) with duplicated months",
                before - records.len()
            );
        }
        Self { records, located }
    }

    pub fn records(&self) -> &[FareRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn located_classes(&self) -> &[FareClass] {
        &self.located
    }

    pub fn first_month(&self) -> Option<YearMonth> {
        self.records.first().map(|r| r.month)
    }

    pub fn last_month(&self) -> Option<YearMonth> {
        self.records.last().map(|r| r.month)
    }
}

/// Derived columns attached to a record by the audit engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AuditAnnotation {
    pub mom_business: Option<f64>,
    pub mom_restricted_economy: Option<f64>,
    pub mom_best_discount: Option<f64>,
    pub is_revenue_leakage: bool,
    pub is_high_priority: bool,
    pub historical_note: Option<String>,
}

impl AuditAnnotation {
    pub fn mom(&self, class: FareClass) -> Option<f64> {
        match class {
            FareClass::BusinessClass => self.mom_business,
            FareClass::RestrictedEconomy => self.mom_restricted_economy,
            FareClass::BestDiscount => self.mom_best_discount,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditedRecord {
    #[serde(flatten)]
    pub record: FareRecord,
    #[serde(flatten)]
    pub annotation: AuditAnnotation,
}

/// Series after the audit pass, consumed read-only by the renderers.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditedSeries {
    pub records: Vec<AuditedRecord>,
    pub located: Vec<FareClass>,
}

impl AuditedSeries {
    pub fn leakage_events(&self) -> impl Iterator<Item = &AuditedRecord> {
        self.records.iter().filter(|r| r.annotation.is_revenue_leakage)
    }

    pub fn noted_months(&self) -> impl Iterator<Item = &AuditedRecord> {
        self.records
            .iter()
            .filter(|r| r.annotation.historical_note.is_some())
    }

    pub fn first_month(&self) -> Option<YearMonth> {
        self.records.first().map(|r| r.record.month)
    }

    pub fn last_month(&self) -> Option<YearMonth> {
        self.records.last().map(|r| r.record.month)
    }
}

/// What the load stage produced.
#[derive(Debug, Clone)]
pub struct AuditOutput {
    pub report: String,
    pub chart_path: String,
    pub export_path: Option<String>,
    pub leakage_events: usize,
}
