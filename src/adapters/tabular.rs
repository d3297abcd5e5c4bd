use crate::utils::error::{AuditError, Result};
use calamine::{Data, DataType, Reader, Xlsx};
use csv::ReaderBuilder;
use std::io::Cursor;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Csv,
    Xlsx,
}

impl SourceFormat {
    pub fn from_path(path: &str) -> Result<Self> {
        let ext = Path::new(path)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "csv" => Ok(Self::Csv),
            "xlsx" => Ok(Self::Xlsx),
            other => Err(AuditError::InvalidConfigValueError {
                field: "input".to_string(),
                value: path.to_string(),
                reason: format!("Unsupported file extension: '{}'. Use .csv or .xlsx", other),
            }),
        }
    }
}

/// Untyped grid of trimmed cell text, title and disclaimer rows included.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn from_bytes(format: SourceFormat, data: &[u8]) -> Result<Self> {
        match format {
            SourceFormat::Csv => Self::from_csv(data),
            SourceFormat::Xlsx => Self::from_xlsx(data),
        }
    }

    pub fn from_csv(data: &[u8]) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(data);

        let mut rows = Vec::new();
        for result in reader.byte_records() {
            let record = result?;
            let row: Vec<String> = record
                .iter()
                .map(|field| String::from_utf8_lossy(field).trim().to_string())
                .collect();
            rows.push(row);
        }

        if let Some(first) = rows.first_mut().and_then(|r| r.first_mut()) {
            if let Some(stripped) = first.strip_prefix('\u{feff}') {
                *first = stripped.trim().to_string();
            }
        }

        Ok(Self { rows })
    }

    /// Reads the first worksheet.
    pub fn from_xlsx(data: &[u8]) -> Result<Self> {
        let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(data.to_vec()))?;

        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| AuditError::data_format("workbook has no worksheets"))?;
        tracing::debug!("Reading worksheet '{}'", sheet_name);

        let range = workbook.worksheet_range(&sheet_name)?;
        let rows = range
            .rows()
            .map(|row| row.iter().map(cell_text).collect())
            .collect();

        Ok(Self { rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Date cells become ISO dates so the cleaner sees one textual shape.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::DateTime(_) | Data::DateTimeIso(_) => cell
            .as_date()
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| cell.to_string()),
        other => other.to_string().trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::loader;
    use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};

    /// Publication-shaped workbook: title, disclaimer, then the header row.
    fn publication_workbook() -> Vec<u8> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        let month_format = Format::new().set_num_format("mmm-yy");

        sheet.write_string(0, 0, "Domestic air fares: real indices").unwrap();
        sheet
            .write_string(1, 0, "Source: BITRE. Index values are not seasonally adjusted.")
            .unwrap();
        let headers = [
            "Survey month",
            "Real Business Class",
            "Real Restricted Economy",
            "Real Best Discount",
        ];
        for (col, header) in headers.iter().enumerate() {
            sheet.write_string(2, col as u16, *header).unwrap();
        }

        let rows = [
            ((2011, 5), 121.0, 101.0, 61.0),
            ((2011, 6), 122.0, 85.0, 55.0),
            ((2011, 7), 150.0, 70.0, 50.0),
        ];
        for (i, ((year, month), business, economy, discount)) in rows.iter().enumerate() {
            let row = 3 + i as u32;
            let date = ExcelDateTime::from_ymd(*year, *month, 1).unwrap();
            sheet
                .write_datetime_with_format(row, 0, &date, &month_format)
                .unwrap();
            sheet.write_number(row, 1, *business).unwrap();
            sheet.write_number(row, 2, *economy).unwrap();
            sheet.write_number(row, 3, *discount).unwrap();
        }

        workbook.save_to_buffer().unwrap()
    }

    #[test]
    fn test_format_detection_by_extension() {
        assert_eq!(SourceFormat::from_path("air_fares.csv").unwrap(), SourceFormat::Csv);
        assert_eq!(
            SourceFormat::from_path("data/Air_Fares_0226.XLSX").unwrap(),
            SourceFormat::Xlsx
        );
        assert!(SourceFormat::from_path("air_fares.xls").is_err());
        assert!(SourceFormat::from_path("air_fares").is_err());
    }

    #[test]
    fn test_csv_keeps_title_rows_and_ragged_lines() {
        let data = "\u{feff}Domestic air fares\n Month , Real Business Class ,Real Restricted Economy\nJan-92,100.5,80\n";
        let table = RawTable::from_csv(data.as_bytes()).unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(table.rows[0], vec!["Domestic air fares"]);
        assert_eq!(
            table.rows[1],
            vec!["Month", "Real Business Class", "Real Restricted Economy"]
        );
        assert_eq!(table.rows[2][1], "100.5");
    }

    #[test]
    fn test_cell_text_conversions() {
        assert_eq!(cell_text(&Data::Empty), "");
        assert_eq!(cell_text(&Data::Float(101.25)), "101.25");
        assert_eq!(cell_text(&Data::String("  n.a. ".to_string())), "n.a.");
        assert_eq!(
            cell_text(&Data::DateTimeIso("2011-06-01".to_string())),
            "2011-06-01"
        );
    }

    #[test]
    fn test_invalid_workbook_bytes_are_an_error() {
        let err = RawTable::from_xlsx(b"not a zip archive").unwrap_err();
        assert!(matches!(err, AuditError::XlsxError(_)));
    }

    #[test]
    fn test_xlsx_publication_with_title_rows_cleans_to_months() {
        let table = RawTable::from_xlsx(&publication_workbook()).unwrap();

        assert_eq!(table.rows[0][0], "Domestic air fares: real indices");
        assert_eq!(table.rows[3][0], "2011-05-01");

        let series = loader::clean(&table).unwrap();
        let months: Vec<String> = series.records().iter().map(|r| r.month.to_string()).collect();
        assert_eq!(months, vec!["2011-05", "2011-06", "2011-07"]);

        let june = &series.records()[1];
        assert_eq!(june.business_class, Some(122.0));
        assert_eq!(june.restricted_economy, Some(85.0));
        assert_eq!(june.best_discount, Some(55.0));
        assert_eq!(series.located_classes().len(), 3);
    }
}
