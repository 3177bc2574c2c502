use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::infer::infer_type;
use crate::value::Value;

/// Semantic column type. A classification artifact, not a guarantee:
/// numeric handlers still tolerate non-numeric entries in a Number column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    Number,
    Bool,
    Date,
    Text,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number => write!(f, "number"),
            Self::Bool => write!(f, "boolean"),
            Self::Date => write!(f, "date"),
            Self::Text => write!(f, "text"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub ty: ColumnType,
    pub values: Vec<Value>,
}

#[derive(Debug)]
pub enum BuildError {
    /// Header row missing or all-blank.
    EmptyHeader,
    /// No data rows under the header.
    NoRows,
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyHeader => write!(f, "no header row found"),
            Self::NoRows => write!(f, "file contains a header but no data rows"),
        }
    }
}

impl std::error::Error for BuildError {}

/// In-memory table: typed columns plus per-row records. Built once per
/// uploaded file and read-only thereafter; replacing a dataset swaps the
/// whole value so in-flight queries against the old one are unaffected.
#[derive(Debug, Clone, Serialize)]
pub struct Dataset {
    file_name: String,
    columns: Vec<Column>,
    rows: Vec<HashMap<String, Value>>,
}

impl Dataset {
    /// Build a dataset from a header row and positional data rows.
    ///
    /// Header names are normalized (trimmed, lowercased, non-alphanumerics
    /// replaced with `_`) and deduplicated with a numeric suffix. Short
    /// rows are padded with [`Value::Null`]; long rows are truncated to
    /// the header width. Column types are inferred after normalization.
    pub fn build(
        file_name: &str,
        header: Vec<String>,
        data_rows: Vec<Vec<Value>>,
    ) -> Result<Dataset, BuildError> {
        let names = normalize_headers(&header);
        if names.is_empty() {
            return Err(BuildError::EmptyHeader);
        }
        if data_rows.is_empty() {
            return Err(BuildError::NoRows);
        }

        let width = names.len();
        let mut column_values: Vec<Vec<Value>> = vec![Vec::with_capacity(data_rows.len()); width];
        let mut rows: Vec<HashMap<String, Value>> = Vec::with_capacity(data_rows.len());

        for mut raw in data_rows {
            raw.resize(width, Value::Null);
            let mut record = HashMap::with_capacity(width);
            for (i, value) in raw.into_iter().enumerate() {
                record.insert(names[i].clone(), value.clone());
                column_values[i].push(value);
            }
            rows.push(record);
        }

        let columns = names
            .into_iter()
            .zip(column_values)
            .map(|(name, values)| {
                let ty = infer_type(&values);
                Column { name, ty, values }
            })
            .collect();

        Ok(Dataset {
            file_name: file_name.to_string(),
            columns,
            rows,
        })
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn rows(&self) -> &[HashMap<String, Value>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// (rows, columns)
    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), self.columns.len())
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn columns_of(&self, ty: ColumnType) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(move |c| c.ty == ty)
    }

    pub fn first_column_of(&self, ty: ColumnType) -> Option<&Column> {
        self.columns_of(ty).next()
    }

    /// Resolve a free-text token to a column by case-insensitive substring
    /// containment in either direction. First qualifying column wins.
    pub fn resolve_column(&self, token: &str) -> Option<&Column> {
        let token = token.trim().to_lowercase();
        if token.is_empty() {
            return None;
        }
        self.columns.iter().find(|c| {
            let name = c.name.to_lowercase();
            token.contains(&name) || name.contains(&token)
        })
    }

    /// Find the first column whose name appears in the question text
    /// (case-insensitive substring).
    pub fn column_named_in(&self, text: &str) -> Option<&Column> {
        let text = text.to_lowercase();
        self.columns
            .iter()
            .find(|c| text.contains(&c.name.to_lowercase()))
    }

    /// First `n` rows as display strings, in column order. Used by the
    /// host's data-summary surface.
    pub fn preview(&self, n: usize) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .take(n)
            .map(|record| {
                self.columns
                    .iter()
                    .map(|c| record.get(&c.name).map(Value::display).unwrap_or_default())
                    .collect()
            })
            .collect()
    }
}

/// Normalize header names the way spreadsheet exports need: trim,
/// lowercase, non-alphanumerics to `_`. Blank headers become `column_<i>`;
/// duplicates get a numeric suffix so names stay unique.
fn normalize_headers(header: &[String]) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut names = Vec::with_capacity(header.len());

    for (i, raw) in header.iter().enumerate() {
        let mut name: String = raw
            .trim()
            .to_lowercase()
            .chars()
            .map(|ch| if ch.is_ascii_alphanumeric() { ch } else { '_' })
            .collect();
        if name.chars().all(|ch| ch == '_') {
            name = format!("column_{}", i + 1);
        }
        let count = seen.entry(name.clone()).or_insert(0);
        *count += 1;
        if *count > 1 {
            name = format!("{name}_{count}");
        }
        names.push(name);
    }

    // An all-blank header row normalizes to column_N names; treat a
    // zero-width header as empty instead.
    if header.iter().all(|h| h.trim().is_empty()) {
        return Vec::new();
    }

    names
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Value {
        Value::Text(s.to_string())
    }

    fn sales_dataset() -> Dataset {
        Dataset::build(
            "sales.csv",
            vec!["Region".into(), "Sales".into()],
            vec![
                vec![text("east"), text("10")],
                vec![text("east"), text("20")],
                vec![text("west"), text("30")],
            ],
        )
        .unwrap()
    }

    #[test]
    fn build_infers_types_and_aligns_rows() {
        let ds = sales_dataset();
        assert_eq!(ds.shape(), (3, 2));
        assert_eq!(ds.column("region").unwrap().ty, ColumnType::Text);
        assert_eq!(ds.column("sales").unwrap().ty, ColumnType::Number);
        for col in ds.columns() {
            assert_eq!(col.values.len(), ds.row_count());
        }
        for record in ds.rows() {
            assert_eq!(record.len(), ds.columns().len());
        }
    }

    #[test]
    fn header_normalization() {
        let ds = Dataset::build(
            "x.csv",
            vec!["Unit Price ($)".into(), "Unit Price ($)".into(), "".into()],
            vec![vec![text("1"), text("2"), text("3")]],
        )
        .unwrap();
        let names = ds.column_names();
        assert_eq!(names[0], "unit_price____");
        assert_eq!(names[1], "unit_price_____2");
        assert_eq!(names[2], "column_3");
    }

    #[test]
    fn short_rows_padded_with_null() {
        let ds = Dataset::build(
            "x.csv",
            vec!["a".into(), "b".into()],
            vec![vec![text("1")]],
        )
        .unwrap();
        assert_eq!(ds.rows()[0]["b"], Value::Null);
        assert_eq!(ds.column("b").unwrap().values[0], Value::Null);
    }

    #[test]
    fn empty_inputs_rejected() {
        assert!(matches!(
            Dataset::build("x.csv", vec![], vec![vec![text("1")]]),
            Err(BuildError::EmptyHeader)
        ));
        assert!(matches!(
            Dataset::build("x.csv", vec!["a".into()], vec![]),
            Err(BuildError::NoRows)
        ));
    }

    #[test]
    fn resolve_column_containment_both_directions() {
        let ds = sales_dataset();
        // Token contains the column name.
        assert_eq!(ds.resolve_column("total sales").unwrap().name, "sales");
        // Column name contains the token.
        assert_eq!(ds.resolve_column("sale").unwrap().name, "sales");
        assert!(ds.resolve_column("profit").is_none());
    }

    #[test]
    fn column_named_in_question() {
        let ds = sales_dataset();
        assert_eq!(
            ds.column_named_in("what is the average Sales figure").unwrap().name,
            "sales"
        );
        assert!(ds.column_named_in("what is the average").is_none());
    }

    #[test]
    fn preview_renders_display_strings() {
        let ds = sales_dataset();
        let head = ds.preview(2);
        assert_eq!(head, vec![vec!["east", "10"], vec!["east", "20"]]);
    }
}
