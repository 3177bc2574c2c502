use tabletalk_engine::{Dataset, Value};

use crate::model::{Condition, Operator};

/// Row indices satisfying every condition (AND). Zero conditions is
/// vacuously true: every row matches. Pure function of dataset +
/// conditions, so applying it twice yields the same set.
pub fn matching_rows(dataset: &Dataset, conditions: &[Condition]) -> Vec<usize> {
    dataset
        .rows()
        .iter()
        .enumerate()
        .filter(|(_, record)| {
            conditions.iter().all(|cond| {
                let cell = record.get(&cond.column).unwrap_or(&Value::Null);
                cell_matches(cell, cond)
            })
        })
        .map(|(i, _)| i)
        .collect()
}

/// Ordering operators coerce both sides to numbers; a side that fails to
/// coerce fails the row. `=` is deliberately case-insensitive substring
/// containment of the stringified cell against the stringified value —
/// a quirk of the original behavior that downstream users rely on.
fn cell_matches(cell: &Value, cond: &Condition) -> bool {
    match cond.operator {
        Operator::Eq => {
            let haystack = cell.display().to_lowercase();
            let needle = cond.value.to_string().to_lowercase();
            !needle.is_empty() && haystack.contains(&needle)
        }
        op => {
            let (Some(lhs), Some(rhs)) = (cell.as_number(), cond.value.as_number()) else {
                return false;
            };
            match op {
                Operator::Gt => lhs > rhs,
                Operator::Lt => lhs < rhs,
                Operator::Ge => lhs >= rhs,
                Operator::Le => lhs <= rhs,
                Operator::Eq => unreachable!(),
            }
        }
    }
}
