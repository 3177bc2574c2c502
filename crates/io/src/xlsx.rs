// Excel import (xlsx, xls, xlsb, ods). One-way conversion: the first
// worksheet becomes a raw cell grid, row 0 as the header.

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use chrono::{Duration, NaiveDate};
use tabletalk_engine::Value;

use crate::error::IngestError;
use crate::RawGrid;

pub fn decode(bytes: &[u8]) -> Result<RawGrid, IngestError> {
    let cursor = Cursor::new(bytes.to_vec());
    let mut workbook =
        open_workbook_auto_from_rs(cursor).map_err(|e| IngestError::Decode(e.to_string()))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| IngestError::Decode("workbook has no sheets".into()))?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| IngestError::Decode(e.to_string()))?;

    let mut rows_iter = range.rows();

    let header = match rows_iter.next() {
        Some(cells) => cells.iter().map(header_text).collect::<Vec<String>>(),
        None => return Err(IngestError::Decode(format!("sheet '{sheet_name}' is empty"))),
    };

    let rows = rows_iter
        .map(|cells| cells.iter().map(cell_value).collect::<Vec<Value>>())
        .collect();

    Ok(RawGrid { header, rows })
}

fn header_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn cell_value(cell: &Data) -> Value {
    match cell {
        Data::Empty => Value::Null,
        Data::String(s) => {
            if s.trim().is_empty() {
                Value::Null
            } else {
                Value::Text(s.clone())
            }
        }
        Data::Float(n) => Value::Number(*n),
        Data::Int(n) => Value::Number(*n as f64),
        Data::Bool(b) => Value::Bool(*b),
        Data::DateTime(dt) => serial_to_date(dt.as_f64())
            .map(Value::Date)
            .unwrap_or(Value::Null),
        Data::DateTimeIso(s) => tabletalk_engine::infer::parse_date(s)
            .map(Value::Date)
            .unwrap_or_else(|| Value::Text(s.clone())),
        Data::DurationIso(s) => Value::Text(s.clone()),
        Data::Error(e) => Value::Text(format!("#{e:?}")),
    }
}

/// Convert an Excel 1900-system date serial to a calendar date. The time
/// fraction is dropped; this engine has no time-of-day type. Serial 0 is
/// 1899-12-30 (Excel's off-by-two epoch, including the Lotus leap bug).
fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_signed(Duration::days(serial.floor() as i64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serial_epoch_conversions() {
        assert_eq!(
            serial_to_date(1.0),
            NaiveDate::from_ymd_opt(1899, 12, 31)
        );
        // 2026-01-15 is serial 46037 in the 1900 system.
        assert_eq!(
            serial_to_date(46037.0),
            NaiveDate::from_ymd_opt(2026, 1, 15)
        );
        // Time fraction is dropped.
        assert_eq!(serial_to_date(46037.75), NaiveDate::from_ymd_opt(2026, 1, 15));
    }

    #[test]
    fn negative_and_non_finite_serials_rejected() {
        assert_eq!(serial_to_date(-1.0), None);
        assert_eq!(serial_to_date(f64::NAN), None);
    }

    #[test]
    fn garbage_bytes_are_a_decode_error() {
        assert!(matches!(
            decode(b"not a spreadsheet"),
            Err(IngestError::Decode(_))
        ));
    }
}
