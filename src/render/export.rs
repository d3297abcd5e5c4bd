use crate::domain::model::AuditedSeries;
use crate::utils::error::{AuditError, Result};
use csv::WriterBuilder;

const HEADER: [&str; 10] = [
    "month",
    "real_business_class",
    "real_restricted_economy",
    "real_best_discount",
    "business_mom_pct",
    "economy_mom_pct",
    "best_discount_mom_pct",
    "revenue_leakage",
    "high_priority",
    "historical_note",
];

fn cell(v: Option<f64>) -> String {
    v.map(|x| x.to_string()).unwrap_or_default()
}

/// Cleaned and annotated series as CSV. Absent values are empty cells.
pub fn render_csv(audited: &AuditedSeries) -> Result<Vec<u8>> {
    let mut writer = WriterBuilder::new().from_writer(Vec::new());
    writer.write_record(HEADER)?;

    for row in &audited.records {
        let (record, annotation) = (&row.record, &row.annotation);
        writer.write_record([
            record.month.to_string(),
            cell(record.business_class),
            cell(record.restricted_economy),
            cell(record.best_discount),
            cell(annotation.mom_business),
            cell(annotation.mom_restricted_economy),
            cell(annotation.mom_best_discount),
            annotation.is_revenue_leakage.to_string(),
            annotation.is_high_priority.to_string(),
            annotation.historical_note.clone().unwrap_or_default(),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|e| AuditError::IoError(e.into_error()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::audit::AuditEngine;
    use crate::domain::model::{FareClass, FareRecord, FareSeries};

    #[test]
    fn test_export_rows_and_empty_cells() {
        let series = FareSeries::new(
            vec![
                FareRecord {
                    month: "2011-05".parse().unwrap(),
                    business_class: Some(100.0),
                    restricted_economy: Some(100.0),
                    best_discount: None,
                },
                FareRecord {
                    month: "2011-06".parse().unwrap(),
                    business_class: Some(101.0),
                    restricted_economy: Some(80.0),
                    best_discount: None,
                },
            ],
            FareClass::ALL.to_vec(),
        );
        let audited = AuditEngine::default().run(&series);

        let bytes = render_csv(&audited).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("month,real_business_class"));
        assert_eq!(lines[1], "2011-05,100,100,,,,,false,false,");
        assert!(lines[2].starts_with("2011-06,101,80,,"));
        assert!(lines[2].contains(",true,true,"));
        assert!(lines[2].contains("Structural Change"));
    }
}
