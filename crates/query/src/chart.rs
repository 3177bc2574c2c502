use chrono::NaiveDate;
use tabletalk_engine::{infer, Column, ColumnType, Dataset, Value};

use crate::engine::{coerced, mean};
use crate::model::{Answer, ChartKind, Payload, SeriesPoint};

/// Histograms always span the observed range with this many equal-width
/// bins; the maximum value is clamped into the last one.
const HISTOGRAM_BINS: usize = 10;

/// Grouping label for null cells.
const UNKNOWN: &str = "Unknown";

// ---------------------------------------------------------------------------
// Chart intent
// ---------------------------------------------------------------------------

pub fn handle_chart(dataset: &Dataset, question: &str) -> Answer {
    let kind = ChartKind::from_text(question);
    let text = question.to_lowercase();

    // Trend questions get a line chart over the date column when the
    // dataset has one; otherwise they fall through to normal resolution.
    if text.contains("trend") || text.contains("over time") {
        if let Some(answer) = trend_chart(dataset) {
            return answer;
        }
    }

    let column = dataset
        .column_named_in(question)
        .or_else(|| dataset.first_column_of(ColumnType::Text));

    let Some(column) = column else {
        return Answer::text(
            "I couldn't find a column to chart. Try naming one, e.g. 'show a chart of region'.",
        );
    };

    match column.ty {
        ColumnType::Number => histogram(column, kind),
        _ => distribution(column, kind),
    }
}

/// Per-category occurrence counts for a non-numeric column, in
/// first-seen row order.
fn distribution(column: &Column, kind: ChartKind) -> Answer {
    let groups = group_values(&column.values);
    let series: Vec<SeriesPoint> = groups
        .into_iter()
        .map(|(category, rows)| SeriesPoint {
            category,
            count: rows.len(),
            aggregate: None,
        })
        .collect();

    Answer::with_payload(
        format!(
            "Distribution of '{}' across {} categories.",
            column.name,
            series.len()
        ),
        Payload::Chart {
            kind,
            series,
            category_key: column.name.clone(),
            value_key: "count".into(),
            title: format!("Distribution of {}", column.name),
        },
    )
}

/// Ten equal-width bins over the coerced values. Bin index is
/// `min(floor((v - min) / bin_size), 9)` so the maximum lands in the
/// last bin instead of overflowing into an eleventh; only non-empty
/// bins are emitted.
fn histogram(column: &Column, kind: ChartKind) -> Answer {
    let values = coerced(column);
    if values.is_empty() {
        return Answer::text(format!(
            "Column '{}' has no numeric values to chart.",
            column.name
        ));
    }

    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let bin_size = (max - min) / HISTOGRAM_BINS as f64;

    let mut counts = [0usize; HISTOGRAM_BINS];
    for v in &values {
        let idx = if bin_size > 0.0 {
            (((v - min) / bin_size).floor() as usize).min(HISTOGRAM_BINS - 1)
        } else {
            // Degenerate range: every value is the minimum.
            0
        };
        counts[idx] += 1;
    }

    let series: Vec<SeriesPoint> = counts
        .iter()
        .enumerate()
        .filter(|(_, &count)| count > 0)
        .map(|(i, &count)| {
            let lo = min + bin_size * i as f64;
            let hi = min + bin_size * (i + 1) as f64;
            SeriesPoint {
                category: format!("{lo:.1}-{hi:.1}"),
                count,
                aggregate: None,
            }
        })
        .collect();

    Answer::with_payload(
        format!(
            "Distribution of '{}' over {} values.",
            column.name,
            values.len()
        ),
        Payload::Chart {
            kind,
            series,
            category_key: column.name.clone(),
            value_key: "count".into(),
            title: format!("Distribution of {}", column.name),
        },
    )
}

/// Line chart of the first numeric column's per-date mean, dates
/// ascending. Requires a date-typed column and a numeric column; returns
/// None otherwise so the caller falls through.
fn trend_chart(dataset: &Dataset) -> Option<Answer> {
    let date_col = dataset.first_column_of(ColumnType::Date)?;
    let value_col = dataset.first_column_of(ColumnType::Number)?;

    let mut groups = group_values(&date_col.values);
    groups.sort_by_key(|(category, _)| infer::parse_date(category).unwrap_or(NaiveDate::MIN));

    let series: Vec<SeriesPoint> = groups
        .into_iter()
        .map(|(category, rows)| {
            let values: Vec<f64> = rows
                .iter()
                .filter_map(|&i| value_col.values[i].as_number())
                .collect();
            SeriesPoint {
                category,
                count: rows.len(),
                aggregate: mean(&values),
            }
        })
        .collect();

    Some(Answer::with_payload(
        format!("Trend of '{}' over '{}'.", value_col.name, date_col.name),
        Payload::Chart {
            kind: ChartKind::Line,
            series,
            category_key: date_col.name.clone(),
            value_key: "aggregate".into(),
            title: format!("{} over time", value_col.name),
        },
    ))
}

// ---------------------------------------------------------------------------
// Comparison intent
// ---------------------------------------------------------------------------

pub fn handle_comparison(dataset: &Dataset, question: &str) -> Answer {
    let text = question.to_lowercase();
    let tokens: Vec<&str> = text.split_whitespace().collect();

    let Some(by_pos) = tokens.iter().position(|t| *t == "by") else {
        return Answer::text(
            "Please phrase comparisons as '<value> by <category>', e.g. 'compare salary by dept'.",
        );
    };

    // First token after "by" that resolves to a column wins.
    let group_col = tokens[by_pos + 1..]
        .iter()
        .find_map(|t| dataset.resolve_column(t));

    let Some(group_col) = group_col else {
        return Answer::text("I couldn't find a column to group by. Try naming one after 'by'.");
    };

    let groups = group_values(&group_col.values);

    // First numeric column other than the group-by column carries the
    // aggregate; without one the chart falls back to per-group counts.
    let value_col = dataset
        .columns_of(ColumnType::Number)
        .find(|c| c.name != group_col.name);

    match value_col {
        Some(value_col) => {
            let series: Vec<SeriesPoint> = groups
                .into_iter()
                .map(|(category, rows)| {
                    let values: Vec<f64> = rows
                        .iter()
                        .filter_map(|&i| value_col.values[i].as_number())
                        .collect();
                    SeriesPoint {
                        category,
                        count: rows.len(),
                        aggregate: mean(&values),
                    }
                })
                .collect();

            Answer::with_payload(
                format!(
                    "Comparing average '{}' by '{}'.",
                    value_col.name, group_col.name
                ),
                Payload::Chart {
                    kind: ChartKind::Bar,
                    series,
                    category_key: group_col.name.clone(),
                    value_key: "aggregate".into(),
                    title: format!("{} by {}", value_col.name, group_col.name),
                },
            )
        }
        None => {
            let series: Vec<SeriesPoint> = groups
                .into_iter()
                .map(|(category, rows)| SeriesPoint {
                    category,
                    count: rows.len(),
                    aggregate: None,
                })
                .collect();

            Answer::with_payload(
                format!("Comparing row counts by '{}'.", group_col.name),
                Payload::Chart {
                    kind: ChartKind::Bar,
                    series,
                    category_key: group_col.name.clone(),
                    value_key: "count".into(),
                    title: format!("Row counts by {}", group_col.name),
                },
            )
        }
    }
}

/// Group row indices by stringified value (null → "Unknown"), preserving
/// first-seen order.
fn group_values(values: &[Value]) -> Vec<(String, Vec<usize>)> {
    let mut groups: Vec<(String, Vec<usize>)> = Vec::new();
    for (i, value) in values.iter().enumerate() {
        let key = if value.is_null() {
            UNKNOWN.to_string()
        } else {
            value.display()
        };
        match groups.iter_mut().find(|(k, _)| *k == key) {
            Some((_, rows)) => rows.push(i),
            None => groups.push((key, vec![i])),
        }
    }
    groups
}
