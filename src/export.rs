//! Export sinks: delimited text and spreadsheet.
//!
//! Both sinks take the final ordered record set and a target path, and
//! fail independently — the caller decides what a single-sink failure
//! means for the run. The `id` column is dedup plumbing, not payload,
//! and is deliberately absent from both outputs.

use std::path::Path;

use rust_xlsxwriter::Workbook;
use tracing::info;

use crate::error::ExportError;
use crate::record::Review;

/// Column order shared by both sinks.
pub const EXPORT_HEADER: [&str; 5] = ["author", "date", "rating", "body", "source_platform"];

/// Write records as CSV with a header row, in store order. Embedded
/// delimiters and newlines get standard quoting via the `csv` crate.
pub fn write_csv(records: &[Review], path: &Path) -> Result<(), ExportError> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(EXPORT_HEADER)?;
    for r in records {
        let rating = r.rating.to_string();
        writer.write_record([
            r.author.as_str(),
            r.date.as_str(),
            rating.as_str(),
            r.body.as_str(),
            r.source_platform.as_str(),
        ])?;
    }
    writer.flush()?;
    info!(count = records.len(), path = %path.display(), "wrote CSV export");
    Ok(())
}

/// Write records to a single-sheet XLSX workbook, sheet name "Reviews",
/// identical header and row contents to the CSV sink.
pub fn write_xlsx(records: &[Review], path: &Path) -> Result<(), ExportError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Reviews")?;

    for (col, header) in EXPORT_HEADER.iter().enumerate() {
        sheet.write_string(0, col as u16, *header)?;
    }
    for (i, r) in records.iter().enumerate() {
        let row = (i + 1) as u32;
        sheet.write_string(row, 0, &r.author)?;
        sheet.write_string(row, 1, &r.date)?;
        sheet.write_number(row, 2, f64::from(r.rating))?;
        sheet.write_string(row, 3, &r.body)?;
        sheet.write_string(row, 4, &r.source_platform)?;
    }

    workbook.save(path)?;
    info!(count = records.len(), path = %path.display(), "wrote XLSX export");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Review> {
        vec![
            Review {
                id: "a".to_string(),
                author: "Ada".to_string(),
                date: "2024-03-03".to_string(),
                rating: 5,
                body: "Comfortable, on time".to_string(),
                source_platform: "google".to_string(),
            },
            Review {
                id: "b".to_string(),
                author: "Bob".to_string(),
                date: "last week".to_string(),
                rating: 0,
                body: "Line one\nline \"two\"".to_string(),
                source_platform: "Trustindex".to_string(),
            },
        ]
    }

    #[test]
    fn test_csv_header_and_quoting() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        write_csv(&sample(), &path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let mut lines = contents.lines();
        assert_eq!(
            lines.next().unwrap(),
            "author,date,rating,body,source_platform"
        );
        // Embedded comma forces quoting of the body field.
        assert!(contents.contains("\"Comfortable, on time\""));
        // Embedded newline and quotes survive a csv round trip.
        let mut reader = csv::Reader::from_path(&path).unwrap();
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[1][3], "Line one\nline \"two\"");
        assert_eq!(&rows[1][2], "0");
    }

    #[test]
    fn test_csv_zero_records_still_writes_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        write_csv(&[], &path).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.trim(), "author,date,rating,body,source_platform");
    }

    #[test]
    fn test_csv_unwritable_path_is_isolated_error() {
        let err = write_csv(&sample(), Path::new("/nonexistent-dir/out.csv"));
        assert!(err.is_err());
    }

    #[test]
    fn test_xlsx_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.xlsx");
        write_xlsx(&sample(), &path).unwrap();
        // XLSX is a zip container; check magic bytes rather than parsing.
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }
}
