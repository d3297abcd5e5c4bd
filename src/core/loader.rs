use crate::adapters::tabular::RawTable;
use crate::domain::model::{FareClass, FareRecord, FareSeries, YearMonth};
use crate::utils::error::{AuditError, Result};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use regex::Regex;
use std::sync::OnceLock;

/// Publications put a title and a disclaimer above the header row.
pub const MAX_HEADER_SCAN_ROWS: usize = 5;

/// Percentage-change analysis needs at least one prior month.
pub const MIN_VALID_ROWS: usize = 2;

/// Known header spellings for one fare-index column.
#[derive(Debug, Clone, Copy)]
pub struct ColumnAlias {
    pub class: FareClass,
    /// Matched against the normalized header first.
    pub exact: &'static [&'static str],
    /// Fallback: every token must occur in the normalized header.
    pub tokens: &'static [&'static str],
    /// Fallback: none of these may occur.
    pub excluded: &'static [&'static str],
}

pub const COLUMN_ALIASES: &[ColumnAlias] = &[
    ColumnAlias {
        class: FareClass::BusinessClass,
        exact: &[
            "real business class",
            "business class real",
            "business real",
            "real business",
        ],
        tokens: &["business"],
        excluded: &["restricted", "economy", "discount", "nominal"],
    },
    ColumnAlias {
        class: FareClass::RestrictedEconomy,
        exact: &[
            "real restricted economy",
            "restricted economy real",
            "real restricted economy class",
        ],
        tokens: &["restricted", "economy"],
        excluded: &["nominal"],
    },
    ColumnAlias {
        class: FareClass::BestDiscount,
        exact: &[
            "real best discount",
            "best discount real",
            "real best discount economy",
        ],
        tokens: &["best", "discount"],
        excluded: &["nominal"],
    },
];

/// Header words that identify the date column.
pub const DATE_HEADER_TOKENS: &[&str] = &["month", "survey"];

/// Column positions resolved from a header row.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnMap {
    pub header_row: usize,
    pub date: usize,
    pub business_class: Option<usize>,
    pub restricted_economy: Option<usize>,
    pub best_discount: Option<usize>,
}

impl ColumnMap {
    fn set(&mut self, class: FareClass, index: usize) {
        match class {
            FareClass::BusinessClass => self.business_class = Some(index),
            FareClass::RestrictedEconomy => self.restricted_economy = Some(index),
            FareClass::BestDiscount => self.best_discount = Some(index),
        }
    }

    pub fn column(&self, class: FareClass) -> Option<usize> {
        match class {
            FareClass::BusinessClass => self.business_class,
            FareClass::RestrictedEconomy => self.restricted_economy,
            FareClass::BestDiscount => self.best_discount,
        }
    }

    pub fn located(&self) -> Vec<FareClass> {
        FareClass::ALL
            .iter()
            .copied()
            .filter(|c| self.column(*c).is_some())
            .collect()
    }

    fn has_required(&self) -> bool {
        self.business_class.is_some() && self.restricted_economy.is_some()
    }
}

/// Lower-cases, replaces punctuation with spaces and collapses whitespace.
pub fn normalize_header(header: &str) -> String {
    header
        .chars()
        .map(|c| if c.is_alphanumeric() { c.to_ascii_lowercase() } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn has_token(normalized: &str, token: &str) -> bool {
    normalized.split(' ').any(|w| w == token)
}

fn alias_matches(alias: &ColumnAlias, normalized: &str) -> bool {
    alias.tokens.iter().all(|t| has_token(normalized, t))
        && !alias.excluded.iter().any(|t| has_token(normalized, t))
}

/// Resolves columns from one candidate header row.
pub fn map_columns(header: &[String], header_row: usize) -> ColumnMap {
    let normalized: Vec<String> = header.iter().map(|h| normalize_header(h)).collect();

    let date = normalized
        .iter()
        .position(|h| DATE_HEADER_TOKENS.iter().any(|t| h.contains(t)))
        .unwrap_or(0);

    let mut map = ColumnMap {
        header_row,
        date,
        business_class: None,
        restricted_economy: None,
        best_discount: None,
    };

    for alias in COLUMN_ALIASES {
        let candidate = |i: &usize| *i != date;
        let exact = (0..normalized.len())
            .filter(candidate)
            .find(|i| alias.exact.contains(&normalized[*i].as_str()));
        let fuzzy = || {
            let matching: Vec<usize> = (0..normalized.len())
                .filter(candidate)
                .filter(|i| alias_matches(alias, &normalized[*i]))
                .collect();
            matching
                .iter()
                .copied()
                .find(|i| has_token(&normalized[*i], "real"))
                .or_else(|| matching.first().copied())
        };

        if let Some(index) = exact.or_else(fuzzy) {
            tracing::debug!(
                "Column '{}' mapped to header '{}' (index {})",
                alias.class.label(),
                header[index],
                index
            );
            map.set(alias.class, index);
        }
    }

    map
}

/// Finds the header row among the leading rows of the table.
pub fn locate_columns(table: &RawTable) -> Result<ColumnMap> {
    let mut best: Option<ColumnMap> = None;

    for (row_idx, row) in table.rows.iter().take(MAX_HEADER_SCAN_ROWS).enumerate() {
        let map = map_columns(row, row_idx);
        if map.has_required() {
            return Ok(map);
        }
        let better = best
            .as_ref()
            .map(|b| map.located().len() > b.located().len())
            .unwrap_or(true);
        if better {
            best = Some(map);
        }
    }

    let missing: Vec<&str> = match &best {
        Some(map) => [FareClass::BusinessClass, FareClass::RestrictedEconomy]
            .iter()
            .filter(|c| map.column(**c).is_none())
            .map(|c| c.label())
            .collect(),
        None => vec![
            FareClass::BusinessClass.label(),
            FareClass::RestrictedEconomy.label(),
        ],
    };

    let available = best
        .as_ref()
        .and_then(|m| table.rows.get(m.header_row))
        .map(|r| r.join(", "))
        .unwrap_or_default();

    Err(AuditError::schema(format!(
        "required column(s) not found: {}. Available: [{}]",
        missing.join(", "),
        available
    )))
}

fn month_year_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?i)([a-z]{3,9})[\s\-/.]*'?(\d{2}|\d{4})$").expect("static regex")
    })
}

fn month_from_name(name: &str) -> Option<u32> {
    const NAMES: [&str; 12] = [
        "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
    ];
    let lower = name.to_lowercase();
    if lower.len() < 3 {
        return None;
    }
    let idx = NAMES.iter().position(|n| lower.starts_with(n))?;
    let full = [
        "january", "february", "march", "april", "may", "june", "july", "august", "september",
        "october", "november", "december",
    ];
    // Abbreviations must be a prefix of the full name: "Sept" yes, "Junk" no.
    full[idx].starts_with(&lower).then_some(idx as u32 + 1)
}

/// Two-digit years pivot at 70: `92` is 1992, `15` is 2015.
fn expand_year(year: &str) -> Option<i32> {
    let value: i32 = year.parse().ok()?;
    match year.len() {
        2 if value >= 70 => Some(1900 + value),
        2 => Some(2000 + value),
        4 => Some(value),
        _ => None,
    }
}

/// Excel serial day numbers count from 1899-12-30.
fn from_excel_serial(serial: f64) -> Option<NaiveDate> {
    if !(1.0..=2_958_465.0).contains(&serial) {
        return None;
    }
    NaiveDate::from_ymd_opt(1899, 12, 30)?.checked_add_signed(Duration::days(serial.trunc() as i64))
}

/// Parses a date cell to calendar-month granularity.
pub fn parse_month(raw: &str) -> Option<YearMonth> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }

    for fmt in ["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d", "%d-%m-%Y", "%d.%m.%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(value, fmt) {
            return Some(YearMonth::from_date(date));
        }
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%d/%m/%Y %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(YearMonth::from_date(dt.date()));
        }
    }

    if let Ok(ym) = value.parse::<YearMonth>() {
        if value.len() == 7 {
            return Some(ym);
        }
    }

    if let Some(caps) = month_year_regex().captures(value) {
        let month = month_from_name(&caps[1])?;
        let year = expand_year(&caps[2])?;
        return YearMonth::new(year, month);
    }

    if let Ok(serial) = value.parse::<f64>() {
        return from_excel_serial(serial).map(YearMonth::from_date);
    }

    None
}

/// Coerces an index cell; placeholders such as `n.a.` or `-` are absent.
pub fn parse_index_value(raw: &str) -> Option<f64> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Turns the raw grid into a cleaned, sorted monthly series.
pub fn clean(table: &RawTable) -> Result<FareSeries> {
    if table.is_empty() {
        return Err(AuditError::schema("input file contains no rows"));
    }

    let columns = locate_columns(table)?;
    tracing::info!(
        "Header row {} located: date column {}, indices {:?}",
        columns.header_row,
        columns.date,
        columns
            .located()
            .iter()
            .map(|c| c.label())
            .collect::<Vec<_>>()
    );

    let cell = |row: &[String], index: Option<usize>| -> Option<f64> {
        index.and_then(|i| row.get(i)).and_then(|v| parse_index_value(v))
    };

    let mut records = Vec::new();
    let mut bad_dates = 0usize;
    let mut empty_rows = 0usize;

    for row in table.rows.iter().skip(columns.header_row + 1) {
        let Some(month) = row.get(columns.date).and_then(|v| parse_month(v)) else {
            bad_dates += 1;
            continue;
        };

        let record = FareRecord {
            month,
            business_class: cell(row, columns.business_class),
            restricted_economy: cell(row, columns.restricted_economy),
            best_discount: cell(row, columns.best_discount),
        };

        if record.has_required_value() {
            records.push(record);
        } else {
            empty_rows += 1;
        }
    }

    tracing::debug!(
        "Dropped {} row(s) with unparseable dates and {} row(s) without business or economy values",
        bad_dates,
        empty_rows
    );

    let series = FareSeries::new(records, columns.located());
    if series.len() < MIN_VALID_ROWS {
        return Err(AuditError::data_format(format!(
            "{} valid monthly row(s) after cleaning; at least {} are required",
            series.len(),
            MIN_VALID_ROWS
        )));
    }

    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rows: &[&[&str]]) -> RawTable {
        RawTable {
            rows: rows
                .iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        }
    }

    fn ym(s: &str) -> YearMonth {
        s.parse().unwrap()
    }

    #[test]
    fn test_normalize_header() {
        assert_eq!(normalize_header("  Real  Business-Class (real) "), "real business class real");
        assert_eq!(normalize_header("Best\tDiscount"), "best discount");
    }

    #[test]
    fn test_exact_and_fuzzy_alias_matching() {
        let header: Vec<String> = [
            "Survey month",
            "Business Class",
            "Real Business Class",
            "Restricted economy (real)",
            "Nominal Best Discount",
            "Best Discount - Real",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        let map = map_columns(&header, 0);
        assert_eq!(map.date, 0);
        assert_eq!(map.business_class, Some(2));
        assert_eq!(map.restricted_economy, Some(3));
        assert_eq!(map.best_discount, Some(5));
    }

    #[test]
    fn test_fuzzy_match_prefers_real_terms_columns() {
        let header: Vec<String> = ["Month", "Business", "Business (Real)", "Restricted Economy"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let map = map_columns(&header, 0);
        assert_eq!(map.business_class, Some(2));
        assert_eq!(map.restricted_economy, Some(3));
        assert_eq!(map.best_discount, None);
    }

    #[test]
    fn test_header_row_found_below_title_rows() {
        let t = table(&[
            &["Domestic Air Fares, real terms"],
            &["Disclaimer: indices are provisional"],
            &["Month", "Real Business Class", "Real Restricted Economy", "Real Best Discount"],
            &["Jan-92", "100", "90", "80"],
        ]);
        let map = locate_columns(&t).unwrap();
        assert_eq!(map.header_row, 2);
        assert_eq!(map.best_discount, Some(3));
    }

    #[test]
    fn test_missing_required_columns_is_schema_error() {
        let t = table(&[
            &["Month", "Premium", "Flexible"],
            &["2020-01", "1", "2"],
            &["2020-02", "1", "2"],
        ]);
        let err = clean(&t).unwrap_err();
        assert!(matches!(err, AuditError::Schema { .. }));
        assert!(err.to_string().contains("Real Business Class"));
    }

    #[test]
    fn test_parse_month_shapes() {
        assert_eq!(parse_month("2011-06"), Some(ym("2011-06")));
        assert_eq!(parse_month("2011-06-01"), Some(ym("2011-06")));
        assert_eq!(parse_month("2011-06-01 00:00:00"), Some(ym("2011-06")));
        assert_eq!(parse_month("15/06/2011"), Some(ym("2011-06")));
        assert_eq!(parse_month("Jun-11"), Some(ym("2011-06")));
        assert_eq!(parse_month("Jan-92"), Some(ym("1992-01")));
        assert_eq!(parse_month("June 2011"), Some(ym("2011-06")));
        assert_eq!(parse_month("Sept 2015"), Some(ym("2015-09")));
        assert_eq!(parse_month("40695"), Some(ym("2011-06")));
        assert_eq!(parse_month("Junk 2011"), None);
        assert_eq!(parse_month("n.a."), None);
        assert_eq!(parse_month(""), None);
        assert_eq!(parse_month("Source: BITRE"), None);
    }

    #[test]
    fn test_parse_index_value() {
        assert_eq!(parse_index_value(" 101.5 "), Some(101.5));
        assert_eq!(parse_index_value("1,024.0"), Some(1024.0));
        assert_eq!(parse_index_value("n.a."), None);
        assert_eq!(parse_index_value("-"), None);
        assert_eq!(parse_index_value(""), None);
        assert_eq!(parse_index_value("NaN"), None);
    }

    #[test]
    fn test_bad_cells_become_absent_and_rows_survive() {
        let t = table(&[
            &["Month", "Real Business Class", "Real Restricted Economy", "Real Best Discount"],
            &["2020-01", "100", "n.a.", "50"],
            &["2020-02", "101", "90", ""],
            &["2020-03", "n.a.", "-", ""],
        ]);
        let series = clean(&t).unwrap();

        assert_eq!(series.len(), 2);
        let first = &series.records()[0];
        assert_eq!(first.business_class, Some(100.0));
        assert_eq!(first.restricted_economy, None);
        assert_eq!(first.best_discount, Some(50.0));
    }

    #[test]
    fn test_discount_only_rows_are_dropped() {
        let t = table(&[
            &["Month", "Real Business Class", "Real Restricted Economy", "Real Best Discount"],
            &["Jan-14", "100", "100", "60"],
            &["Feb-14", "n.a.", "n.a.", "61"],
            &["Mar-14", "101", "85", "62"],
        ]);
        let series = clean(&t).unwrap();

        let months: Vec<String> = series.records().iter().map(|r| r.month.to_string()).collect();
        assert_eq!(months, vec!["2014-01", "2014-03"]);
    }

    #[test]
    fn test_unparseable_date_rows_are_dropped_and_series_sorted() {
        let t = table(&[
            &["Month", "Real Business Class", "Real Restricted Economy"],
            &["2020-03", "103", "93"],
            &["not a date", "999", "999"],
            &["2020-01", "101", "91"],
            &["Source: BITRE", "", ""],
        ]);
        let series = clean(&t).unwrap();

        let months: Vec<String> = series.records().iter().map(|r| r.month.to_string()).collect();
        assert_eq!(months, vec!["2020-01", "2020-03"]);
        assert_eq!(
            series.located_classes(),
            &[FareClass::BusinessClass, FareClass::RestrictedEconomy]
        );
    }

    #[test]
    fn test_fewer_than_two_rows_is_data_format_error() {
        let t = table(&[
            &["Month", "Real Business Class", "Real Restricted Economy"],
            &["2020-01", "100", "90"],
            &["bad", "100", "90"],
        ]);
        let err = clean(&t).unwrap_err();
        assert!(matches!(err, AuditError::DataFormat { .. }));
    }
}
