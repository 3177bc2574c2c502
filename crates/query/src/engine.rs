use std::panic::{catch_unwind, AssertUnwindSafe};

use tabletalk_engine::{Column, ColumnType, Dataset};

use crate::chart::{handle_chart, handle_comparison};
use crate::conditions;
use crate::filter::matching_rows;
use crate::intent;
use crate::model::{Answer, Intent, Payload};

/// Filter tables show at most this many rows; the lead-in text always
/// states the true total.
const FILTER_PREVIEW_ROWS: usize = 10;

/// Preview rows in the summary table.
const SUMMARY_PREVIEW_ROWS: usize = 5;

/// Answer a free-text question against a built dataset.
///
/// Each call is one synchronous unit of work; the dataset is read-only
/// throughout. Every branch terminates in a well-formed [`Answer`] —
/// recoverable conditions (unresolved column, no numeric data, empty
/// result) become guidance text, and a panic anywhere in a handler is
/// caught at this boundary and turned into an apologetic text.
pub fn answer(dataset: &Dataset, question: &str) -> Answer {
    catch_unwind(AssertUnwindSafe(|| dispatch(dataset, question))).unwrap_or_else(|_| {
        Answer::text("Sorry, I hit an unexpected problem while analyzing that question. Try rephrasing it.")
    })
}

fn dispatch(dataset: &Dataset, question: &str) -> Answer {
    match intent::classify(question) {
        Intent::Average => handle_average(dataset, question),
        Intent::Count => handle_count(dataset, question),
        Intent::Max => handle_extremum(dataset, question, Extremum::Max),
        Intent::Min => handle_extremum(dataset, question, Extremum::Min),
        Intent::Chart => handle_chart(dataset, question),
        Intent::Comparison => handle_comparison(dataset, question),
        Intent::Filter => handle_filter(dataset, question),
        Intent::Summary => handle_summary(dataset),
    }
}

// ---------------------------------------------------------------------------
// Numeric helpers
// ---------------------------------------------------------------------------

/// Successfully-coerced numeric values of a column. Coercion failures
/// are dropped, never errors.
pub(crate) fn coerced(column: &Column) -> Vec<f64> {
    column.values.iter().filter_map(|v| v.as_number()).collect()
}

/// Mean of the coerced values. None when nothing coerces — the guard
/// that keeps division by zero out of every aggregate handler.
pub(crate) fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Display a computed number: integers without decimals.
pub(crate) fn display_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n:.2}")
    }
}

/// The numeric column the question names, if any.
fn named_numeric_column<'a>(dataset: &'a Dataset, question: &str) -> Option<&'a Column> {
    let text = question.to_lowercase();
    dataset
        .columns_of(ColumnType::Number)
        .find(|c| text.contains(&c.name.to_lowercase()))
}

// ---------------------------------------------------------------------------
// Average / Max / Min
// ---------------------------------------------------------------------------

fn handle_average(dataset: &Dataset, question: &str) -> Answer {
    if let Some(column) = named_numeric_column(dataset, question) {
        return match mean(&coerced(column)) {
            Some(avg) => Answer::text(format!("The average {} is {:.2}.", column.name, avg)),
            None => no_numeric_data(&column.name, "average"),
        };
    }

    // No column named: report every numeric column's mean.
    let lines: Vec<String> = dataset
        .columns_of(ColumnType::Number)
        .filter_map(|c| mean(&coerced(c)).map(|avg| format!("The average {} is {:.2}.", c.name, avg)))
        .collect();

    if lines.is_empty() {
        Answer::text("This dataset has no numeric columns to average.")
    } else {
        Answer::text(lines.join("\n"))
    }
}

#[derive(Clone, Copy)]
enum Extremum {
    Max,
    Min,
}

impl Extremum {
    fn label(self) -> &'static str {
        match self {
            Self::Max => "maximum",
            Self::Min => "minimum",
        }
    }
}

fn handle_extremum(dataset: &Dataset, question: &str, which: Extremum) -> Answer {
    let Some(column) = named_numeric_column(dataset, question) else {
        // No default column for max/min: ask the user to name one.
        return Answer::text(format!(
            "Please specify which column to take the {} of, e.g. '{} sales'.",
            which.label(),
            which.label()
        ));
    };

    let values = coerced(column);
    let result = match which {
        Extremum::Max => values.iter().cloned().fold(None, |acc: Option<f64>, v| {
            Some(acc.map_or(v, |a| a.max(v)))
        }),
        Extremum::Min => values.iter().cloned().fold(None, |acc: Option<f64>, v| {
            Some(acc.map_or(v, |a| a.min(v)))
        }),
    };

    match result {
        Some(v) => Answer::text(format!(
            "The {} {} is {}.",
            which.label(),
            column.name,
            display_number(v)
        )),
        None => no_numeric_data(&column.name, which.label()),
    }
}

fn no_numeric_data(column: &str, operation: &str) -> Answer {
    Answer::text(format!(
        "Column '{column}' has no numeric values to {operation}."
    ))
}

// ---------------------------------------------------------------------------
// Count / Filter
// ---------------------------------------------------------------------------

fn handle_count(dataset: &Dataset, question: &str) -> Answer {
    let conds = conditions::extract(dataset, question);
    if conds.is_empty() {
        return Answer::text(format!(
            "The dataset contains {} rows.",
            dataset.row_count()
        ));
    }

    let matched = matching_rows(dataset, &conds).len();
    Answer::text(format!(
        "Found {} rows matching your criteria out of {} total rows.",
        matched,
        dataset.row_count()
    ))
}

fn handle_filter(dataset: &Dataset, question: &str) -> Answer {
    let conds = conditions::extract(dataset, question);
    let matched = matching_rows(dataset, &conds);

    if matched.is_empty() {
        // Never an empty table.
        return Answer::text("No rows match your criteria.");
    }

    let headers: Vec<String> = dataset.columns().iter().map(|c| c.name.clone()).collect();
    let rows: Vec<Vec<String>> = matched
        .iter()
        .take(FILTER_PREVIEW_ROWS)
        .map(|&i| {
            let record = &dataset.rows()[i];
            dataset
                .columns()
                .iter()
                .map(|c| record.get(&c.name).map(|v| v.display()).unwrap_or_default())
                .collect()
        })
        .collect();

    let text = if matched.len() > FILTER_PREVIEW_ROWS {
        format!(
            "Found {} matching rows (showing the first {}).",
            matched.len(),
            FILTER_PREVIEW_ROWS
        )
    } else {
        format!("Found {} matching rows.", matched.len())
    };

    Answer::with_payload(
        text,
        Payload::Table {
            headers,
            rows,
            title: format!("Matching rows from {}", dataset.file_name()),
        },
    )
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

fn handle_summary(dataset: &Dataset) -> Answer {
    let (rows, cols) = dataset.shape();

    let table_rows: Vec<Vec<String>> = dataset
        .columns()
        .iter()
        .map(|column| {
            let stats = match column.ty {
                ColumnType::Number => {
                    let values = coerced(column);
                    match mean(&values) {
                        Some(avg) => {
                            let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
                            let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
                            format!(
                                "average {}, min {}, max {}",
                                display_number(avg),
                                display_number(min),
                                display_number(max)
                            )
                        }
                        None => "no numeric values".to_string(),
                    }
                }
                _ => {
                    // Distinct by exact value identity, not case-normalized.
                    let mut distinct: Vec<&tabletalk_engine::Value> = Vec::new();
                    for v in &column.values {
                        if !distinct.contains(&v) {
                            distinct.push(v);
                        }
                    }
                    format!("{} distinct values", distinct.len())
                }
            };
            vec![column.name.clone(), column.ty.to_string(), stats]
        })
        .collect();

    Answer::with_payload(
        format!(
            "{} has {} rows and {} columns.",
            dataset.file_name(),
            rows,
            cols
        ),
        Payload::Table {
            headers: vec!["column".into(), "type".into(), "summary".into()],
            rows: table_rows,
            title: format!("Summary of {}", dataset.file_name()),
        },
    )
}

/// First rows of the dataset as a table payload. Used by hosts for the
/// post-upload preview surface.
pub fn preview(dataset: &Dataset) -> Payload {
    Payload::Table {
        headers: dataset.columns().iter().map(|c| c.name.clone()).collect(),
        rows: dataset.preview(SUMMARY_PREVIEW_ROWS),
        title: format!("First rows of {}", dataset.file_name()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabletalk_engine::Value;

    fn text(s: &str) -> Value {
        Value::Text(s.to_string())
    }

    fn sales() -> Dataset {
        Dataset::build(
            "sales.csv",
            vec!["region".into(), "sales".into()],
            vec![
                vec![text("east"), text("10")],
                vec![text("east"), text("20")],
                vec![text("west"), text("30")],
            ],
        )
        .unwrap()
    }

    #[test]
    fn average_named_column() {
        let ans = answer(&sales(), "what is the average sales");
        assert_eq!(ans.text, "The average sales is 20.00.");
        assert!(ans.payload.is_none());
    }

    #[test]
    fn average_without_column_reports_all_numeric() {
        let ds = Dataset::build(
            "x.csv",
            vec!["price".into(), "qty".into()],
            vec![
                vec![text("1"), text("10")],
                vec![text("3"), text("30")],
            ],
        )
        .unwrap();
        let ans = answer(&ds, "compute the mean");
        assert_eq!(
            ans.text,
            "The average price is 2.00.\nThe average qty is 20.00."
        );
    }

    #[test]
    fn average_with_no_numeric_columns() {
        let ds = Dataset::build(
            "x.csv",
            vec!["name".into()],
            vec![vec![text("alice")], vec![text("bob")]],
        )
        .unwrap();
        let ans = answer(&ds, "average please");
        assert_eq!(ans.text, "This dataset has no numeric columns to average.");
    }

    #[test]
    fn max_and_min_named_column() {
        let ans = answer(&sales(), "what is the maximum sales");
        assert_eq!(ans.text, "The maximum sales is 30.");
        let ans = answer(&sales(), "min sales");
        assert_eq!(ans.text, "The minimum sales is 10.");
    }

    #[test]
    fn max_without_column_asks_for_one() {
        let ans = answer(&sales(), "what is the max");
        assert!(ans.text.starts_with("Please specify which column"));
    }

    #[test]
    fn count_without_conditions() {
        let ans = answer(&sales(), "how many rows are there");
        assert_eq!(ans.text, "The dataset contains 3 rows.");
    }

    #[test]
    fn count_with_condition() {
        let ans = answer(&sales(), "how many rows have sales > 15");
        assert_eq!(
            ans.text,
            "Found 2 rows matching your criteria out of 3 total rows."
        );
    }

    #[test]
    fn filter_returns_table() {
        let ans = answer(&sales(), "rows where sales > 15");
        assert_eq!(ans.text, "Found 2 matching rows.");
        match ans.payload.unwrap() {
            Payload::Table { headers, rows, .. } => {
                assert_eq!(headers, vec!["region", "sales"]);
                assert_eq!(rows, vec![vec!["east", "20"], vec!["west", "30"]]);
            }
            other => panic!("expected table, got {other:?}"),
        }
    }

    #[test]
    fn filter_with_no_matches_is_text_only() {
        let ans = answer(&sales(), "rows where sales > 99");
        assert_eq!(ans.text, "No rows match your criteria.");
        assert!(ans.payload.is_none());
    }

    #[test]
    fn filter_truncates_to_ten_rows() {
        let rows: Vec<Vec<Value>> = (0..25).map(|i| vec![text(&i.to_string())]).collect();
        let ds = Dataset::build("big.csv", vec!["n".into()], rows).unwrap();
        let ans = answer(&ds, "rows where n >= 0");
        assert_eq!(ans.text, "Found 25 matching rows (showing the first 10).");
        match ans.payload.unwrap() {
            Payload::Table { rows, .. } => {
                assert_eq!(rows.len(), 10);
                // Original row order preserved.
                assert_eq!(rows[0], vec!["0"]);
                assert_eq!(rows[9], vec!["9"]);
            }
            other => panic!("expected table, got {other:?}"),
        }
    }

    #[test]
    fn summary_reports_per_column_stats() {
        let ans = answer(&sales(), "describe the dataset");
        assert_eq!(ans.text, "sales.csv has 3 rows and 2 columns.");
        match ans.payload.unwrap() {
            Payload::Table { rows, .. } => {
                assert_eq!(rows[0], vec!["region", "text", "2 distinct values"]);
                assert_eq!(rows[1], vec!["sales", "number", "average 20, min 10, max 30"]);
            }
            other => panic!("expected table, got {other:?}"),
        }
    }

    #[test]
    fn summary_distinct_is_case_sensitive() {
        let ds = Dataset::build(
            "x.csv",
            vec!["name".into()],
            vec![vec![text("East")], vec![text("east")]],
        )
        .unwrap();
        let ans = answer(&ds, "describe");
        match ans.payload.unwrap() {
            Payload::Table { rows, .. } => {
                assert_eq!(rows[0][2], "2 distinct values");
            }
            other => panic!("expected table, got {other:?}"),
        }
    }
}
