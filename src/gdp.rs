// 📈 Quarterly GDP Loader
//
// The GDP workbook keeps an annual block on the left and a quarterly block on
// the right. Only the quarterly label and the chained 2009 dollar column are
// read. The same layout applies to the workbook itself and to a CSV export.

use crate::error::{PipelineError, Result};
use crate::quarter::Quarter;
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Cursor;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuarterlyGdpPoint {
    pub quarter: Quarter,
    pub gdp: f64,
}

impl QuarterlyGdpPoint {
    pub fn new(quarter: Quarter, gdp: f64) -> Self {
        QuarterlyGdpPoint { quarter, gdp }
    }
}

/// Where the quarterly block lives inside the sheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GdpSheetLayout {
    /// Title, header and unit rows before the first data row
    pub skip_rows: usize,
    pub quarter_column: usize,
    pub value_column: usize,
}

impl Default for GdpSheetLayout {
    fn default() -> Self {
        GdpSheetLayout {
            skip_rows: 8,
            quarter_column: 4,
            value_column: 6,
        }
    }
}

/// How the GDP file is stored, decided by its extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GdpSource {
    /// .xls / .xlsx / .xlsm / .xlsb / .ods
    Workbook,
    /// Anything else is read as a CSV export of the sheet
    Csv,
}

impl GdpSource {
    pub fn from_path(path: &Path) -> Self {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match extension.as_deref() {
            Some("xls" | "xlsx" | "xlsm" | "xlsb" | "ods") => GdpSource::Workbook,
            _ => GdpSource::Csv,
        }
    }
}

/// Load every quarterly point from the sheet, in file order
pub fn load_gdp_series(path: &Path, layout: &GdpSheetLayout) -> Result<Vec<QuarterlyGdpPoint>> {
    let points = match GdpSource::from_path(path) {
        GdpSource::Workbook => load_workbook(path, layout)?,
        GdpSource::Csv => load_csv(path, layout)?,
    };

    tracing::debug!(path = %path.display(), points = points.len(), "loaded GDP series");

    Ok(points)
}

/// First worksheet of an Excel/ODS workbook; layout positions are absolute
/// sheet coordinates, not offsets into the used range
fn load_workbook(path: &Path, layout: &GdpSheetLayout) -> Result<Vec<QuarterlyGdpPoint>> {
    // Format is sniffed from the bytes, so extension case does not matter
    let bytes = fs::read(path).map_err(|e| PipelineError::from_io(path, e))?;
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| PipelineError::from_workbook(path, e))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| PipelineError::malformed(path, 0, "workbook has no worksheets"))?
        .map_err(|e| PipelineError::from_workbook(path, e))?;

    let last_row = match range.end() {
        Some((row, _)) => row as usize,
        None => return Ok(Vec::new()),
    };

    let mut points = Vec::new();

    for row in layout.skip_rows..=last_row {
        let cell = |column: usize| cell_text(range.get_value((row as u32, column as u32)));

        let label = cell(layout.quarter_column);
        let raw_value = cell(layout.value_column);

        if let Some(point) = parse_point(path, row + 1, label.trim(), raw_value.trim())? {
            points.push(point);
        }
    }

    Ok(points)
}

fn cell_text(cell: Option<&Data>) -> String {
    match cell {
        None | Some(Data::Empty) => String::new(),
        Some(Data::String(text)) => text.clone(),
        Some(Data::Float(value)) => value.to_string(),
        Some(Data::Int(value)) => value.to_string(),
        Some(other) => other.to_string(),
    }
}

fn load_csv(path: &Path, layout: &GdpSheetLayout) -> Result<Vec<QuarterlyGdpPoint>> {
    let file = File::open(path).map_err(|e| PipelineError::from_io(path, e))?;

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(file);

    let mut points = Vec::new();

    for (index, result) in reader.records().enumerate().skip(layout.skip_rows) {
        let record = result.map_err(|e| PipelineError::from_csv(path, e))?;

        let label = record.get(layout.quarter_column).unwrap_or("").trim();
        let raw_value = record.get(layout.value_column).unwrap_or("").trim();

        if let Some(point) = parse_point(path, index + 1, label, raw_value)? {
            points.push(point);
        }
    }

    Ok(points)
}

/// One sheet row; `None` for the blank rows trailing the quarterly block
fn parse_point(
    path: &Path,
    line: usize,
    label: &str,
    raw_value: &str,
) -> Result<Option<QuarterlyGdpPoint>> {
    if label.is_empty() {
        return Ok(None);
    }

    let quarter: Quarter = label
        .parse()
        .map_err(|_| PipelineError::malformed(path, line, format!("bad quarter label {:?}", label)))?;

    let gdp = parse_number(raw_value).ok_or_else(|| {
        PipelineError::malformed(path, line, format!("bad GDP value {:?} for {}", raw_value, quarter))
    })?;

    Ok(Some(QuarterlyGdpPoint::new(quarter, gdp)))
}

/// "14,895.1" → 14895.1
fn parse_number(raw: &str) -> Option<f64> {
    let cleaned: String = raw.chars().filter(|c| *c != ',').collect();
    cleaned.parse().ok()
}

/// Slice of `points` starting `lookback` rows before `anchor`
pub fn anchor_series(
    points: &[QuarterlyGdpPoint],
    anchor: Quarter,
    lookback: usize,
) -> Result<&[QuarterlyGdpPoint]> {
    let position = points
        .iter()
        .position(|p| p.quarter == anchor)
        .ok_or(PipelineError::AnchorNotFound { anchor })?;

    if position < lookback {
        return Err(PipelineError::InsufficientLookback {
            anchor,
            required: lookback,
            available: position,
        });
    }

    Ok(&points[position - lookback..])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn series(start: Quarter, values: &[f64]) -> Vec<QuarterlyGdpPoint> {
        let mut quarter = start;
        values
            .iter()
            .map(|&gdp| {
                let point = QuarterlyGdpPoint::new(quarter, gdp);
                quarter = quarter.next();
                point
            })
            .collect()
    }

    fn write_sheet(rows: &[&str]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        for row in rows {
            writeln!(file, "{}", row).unwrap();
        }
        file
    }

    const PREAMBLE: &[&str] = &[
        "Current-Dollar and Real Gross Domestic Product,,,,,,",
        ",,,,,,",
        ",,,,,,",
        ",,,,,,",
        "Annual,,,,Quarterly,,",
        "(Seasonally adjusted annual rates),,,,(Seasonally adjusted annual rates),,",
        ",GDP in billions of current dollars,GDP in billions of chained 2009 dollars,,,GDP in billions of current dollars,GDP in billions of chained 2009 dollars",
        ",,,,,,",
    ];

    #[test]
    fn test_load_reads_quarterly_block() {
        let mut rows = PREAMBLE.to_vec();
        rows.push("1999,9660.6,12323.3,,1999q3,9734.2,\"12,419.3\"");
        rows.push("2000,10284.8,12713.7,,1999q4,9885.3,12595.6");
        rows.push("2001,10621.8,12837.2,,2000q1,10002.2,12643.3");
        rows.push(",,,,,,");
        let file = write_sheet(&rows);

        let points = load_gdp_series(file.path(), &GdpSheetLayout::default()).unwrap();

        assert_eq!(points.len(), 3);
        assert_eq!(points[0].quarter, Quarter::at(1999, 3));
        assert_eq!(points[0].gdp, 12419.3);
        assert_eq!(points[2].quarter, Quarter::at(2000, 1));
        assert_eq!(points[2].gdp, 12643.3);
    }

    #[test]
    fn test_load_rejects_bad_value() {
        let mut rows = PREAMBLE.to_vec();
        rows.push("2000,1,1,,2000q1,1,n/a");
        let file = write_sheet(&rows);

        let err = load_gdp_series(file.path(), &GdpSheetLayout::default()).unwrap_err();
        match err {
            PipelineError::MalformedRow { line, .. } => assert_eq!(line, 9),
            other => panic!("expected MalformedRow, got {:?}", other),
        }
    }

    fn write_workbook(rows: &[(u32, &str, f64)]) -> tempfile::TempPath {
        let path = tempfile::Builder::new()
            .suffix(".xlsx")
            .tempfile()
            .unwrap()
            .into_temp_path();

        let mut workbook = rust_xlsxwriter::Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "Current-Dollar and Real Gross Domestic Product").unwrap();
        sheet.write_string(4, 4, "Quarterly").unwrap();
        for &(row, label, value) in rows {
            sheet.write_string(row, 4, label).unwrap();
            sheet.write_number(row, 5, value * 0.8).unwrap();
            sheet.write_number(row, 6, value).unwrap();
        }
        workbook.save(&path).unwrap();

        path
    }

    #[test]
    fn test_source_chosen_by_extension() {
        assert_eq!(GdpSource::from_path(Path::new("gdplev.xls")), GdpSource::Workbook);
        assert_eq!(GdpSource::from_path(Path::new("data/GDPLEV.XLSX")), GdpSource::Workbook);
        assert_eq!(GdpSource::from_path(Path::new("gdplev.ods")), GdpSource::Workbook);
        assert_eq!(GdpSource::from_path(Path::new("gdplev.csv")), GdpSource::Csv);
        assert_eq!(GdpSource::from_path(Path::new("gdplev")), GdpSource::Csv);
    }

    #[test]
    fn test_load_reads_workbook_block() {
        let path = write_workbook(&[
            (8, "1999q3", 12419.3),
            (9, "1999q4", 12595.6),
            (10, "2000q1", 12643.3),
        ]);

        let points = load_gdp_series(&path, &GdpSheetLayout::default()).unwrap();

        assert_eq!(points.len(), 3);
        assert_eq!(points[0], QuarterlyGdpPoint::new(Quarter::at(1999, 3), 12419.3));
        assert_eq!(points[2], QuarterlyGdpPoint::new(Quarter::at(2000, 1), 12643.3));
    }

    #[test]
    fn test_workbook_rows_above_skip_are_ignored() {
        // Row 7 sits inside the header block and must not be read
        let path = write_workbook(&[(7, "not a quarter", 1.0), (8, "2000q1", 10.0)]);

        let points = load_gdp_series(&path, &GdpSheetLayout::default()).unwrap();

        assert_eq!(points, vec![QuarterlyGdpPoint::new(Quarter::at(2000, 1), 10.0)]);
    }

    #[test]
    fn test_workbook_bad_label_reports_sheet_row() {
        let path = write_workbook(&[(8, "2000q1", 10.0), (9, "Q5 2000", 11.0)]);

        let err = load_gdp_series(&path, &GdpSheetLayout::default()).unwrap_err();
        match err {
            PipelineError::MalformedRow { line, .. } => assert_eq!(line, 10),
            other => panic!("expected MalformedRow, got {:?}", other),
        }
    }

    #[test]
    fn test_load_missing_workbook() {
        let err = load_gdp_series(Path::new("/nonexistent/gdplev.xls"), &GdpSheetLayout::default())
            .unwrap_err();
        assert!(matches!(err, PipelineError::FileNotFound { .. }));
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_gdp_series(Path::new("/nonexistent/gdplev.csv"), &GdpSheetLayout::default())
            .unwrap_err();
        assert!(matches!(err, PipelineError::FileNotFound { .. }));
    }

    #[test]
    fn test_anchor_series_keeps_lookback() {
        let points = series(Quarter::at(1999, 1), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);

        let anchored = anchor_series(&points, Quarter::at(2000, 1), 2).unwrap();

        assert_eq!(anchored.len(), 4);
        assert_eq!(anchored[0].quarter, Quarter::at(1999, 3));
        assert_eq!(anchored[2].quarter, Quarter::at(2000, 1));
    }

    #[test]
    fn test_anchor_not_found() {
        let points = series(Quarter::at(1999, 1), &[1.0, 2.0]);
        let err = anchor_series(&points, Quarter::at(2000, 1), 2).unwrap_err();
        assert!(matches!(err, PipelineError::AnchorNotFound { .. }));
    }

    #[test]
    fn test_anchor_without_enough_history() {
        let points = series(Quarter::at(1999, 4), &[1.0, 2.0, 3.0]);
        let err = anchor_series(&points, Quarter::at(2000, 1), 2).unwrap_err();

        match err {
            PipelineError::InsufficientLookback {
                required, available, ..
            } => {
                assert_eq!(required, 2);
                assert_eq!(available, 1);
            }
            other => panic!("expected InsufficientLookback, got {:?}", other),
        }
    }
}
