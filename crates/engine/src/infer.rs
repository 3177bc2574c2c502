use chrono::NaiveDate;

use crate::dataset::ColumnType;
use crate::value::Value;

/// Share of non-null values that must satisfy a check for its type to win.
const TYPE_THRESHOLD: f64 = 0.8;

/// Date shapes accepted at inference time. ISO first, then the common
/// US and day-first forms spreadsheet exports use.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%d-%m-%Y", "%Y/%m/%d"];

/// Infer the semantic type of a column from its non-null values.
///
/// Checks run in fixed priority order — number, boolean, date — each with
/// an independent ≥80% threshold. Priority means a column of "1"/"0"
/// strings is `Number`, never `Bool`: the number check fires first.
/// A column with no non-null values is `Text`.
pub fn infer_type(values: &[Value]) -> ColumnType {
    let non_null: Vec<&Value> = values.iter().filter(|v| !v.is_null()).collect();
    if non_null.is_empty() {
        return ColumnType::Text;
    }

    let threshold = (non_null.len() as f64 * TYPE_THRESHOLD).ceil() as usize;

    let numeric = non_null.iter().filter(|v| looks_numeric(v)).count();
    if numeric >= threshold {
        return ColumnType::Number;
    }

    let boolean = non_null.iter().filter(|v| looks_boolean(v)).count();
    if boolean >= threshold {
        return ColumnType::Bool;
    }

    let date = non_null.iter().filter(|v| looks_date(v)).count();
    if date >= threshold {
        return ColumnType::Date;
    }

    ColumnType::Text
}

fn looks_numeric(value: &Value) -> bool {
    match value {
        Value::Number(_) => true,
        Value::Text(_) => value.as_number().is_some(),
        _ => false,
    }
}

fn looks_boolean(value: &Value) -> bool {
    match value {
        Value::Bool(_) => true,
        Value::Text(s) => matches!(
            s.trim().to_lowercase().as_str(),
            "true" | "false" | "yes" | "no" | "1" | "0"
        ),
        _ => false,
    }
}

fn looks_date(value: &Value) -> bool {
    match value {
        Value::Date(_) => true,
        Value::Text(s) => parse_date(s).is_some(),
        _ => false,
    }
}

/// Try the accepted date shapes in order. Used by inference and by the
/// ingestion layer when re-typing text cells.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
}
