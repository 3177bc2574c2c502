use regex::Regex;
use tabletalk_engine::{ColumnType, Dataset};

use crate::model::{CondValue, Condition, Operator};

/// Extract structured predicates from free text.
///
/// Three shapes are matched against the lowercased question, in order,
/// accumulating every match of each shape. Overlapping shapes can emit
/// duplicates; they are kept, not deduplicated — AND semantics make the
/// duplicates harmless.
pub fn extract(dataset: &Dataset, question: &str) -> Vec<Condition> {
    let text = question.to_lowercase();
    let mut conditions = Vec::new();

    let comparison = Regex::new(r"(\w+)\s*(>=|<=|>|<|=)\s*([\w.-]+)").unwrap();
    for caps in comparison.captures_iter(&text) {
        let op = Operator::parse(&caps[2]).unwrap_or(Operator::Eq);
        push_condition(dataset, &mut conditions, &caps[1], op, &caps[3]);
    }

    let is_shape = Regex::new(r"(\w+)\s+is\s+([\w.-]+)").unwrap();
    for caps in is_shape.captures_iter(&text) {
        push_condition(dataset, &mut conditions, &caps[1], Operator::Eq, &caps[2]);
    }

    let equals_shape = Regex::new(r"(\w+)\s+equals?\s+([\w.-]+)").unwrap();
    for caps in equals_shape.captures_iter(&text) {
        push_condition(dataset, &mut conditions, &caps[1], Operator::Eq, &caps[2]);
    }

    conditions
}

/// Resolve the column token and append the condition. Tokens naming no
/// dataset column are dropped silently — the shapes over-match ordinary
/// prose, and unresolved matches are noise, not errors.
fn push_condition(
    dataset: &Dataset,
    out: &mut Vec<Condition>,
    column_token: &str,
    operator: Operator,
    value_token: &str,
) {
    let Some(column) = dataset.resolve_column(column_token) else {
        return;
    };

    let value = if column.ty == ColumnType::Number {
        match value_token.parse::<f64>() {
            Ok(n) => CondValue::Number(n),
            Err(_) => CondValue::Text(value_token.to_string()),
        }
    } else {
        CondValue::Text(value_token.to_string())
    };

    out.push(Condition {
        column: column.name.clone(),
        operator,
        value,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabletalk_engine::Value;

    fn dataset() -> Dataset {
        Dataset::build(
            "people.csv",
            vec!["age".into(), "region".into()],
            vec![
                vec![Value::Text("31".into()), Value::Text("east".into())],
                vec![Value::Text("28".into()), Value::Text("west".into())],
            ],
        )
        .unwrap()
    }

    #[test]
    fn numeric_comparison() {
        let conds = extract(&dataset(), "how many people have age > 30");
        assert_eq!(
            conds,
            vec![Condition {
                column: "age".into(),
                operator: Operator::Gt,
                value: CondValue::Number(30.0),
            }]
        );
    }

    #[test]
    fn is_shape_defaults_to_eq() {
        let conds = extract(&dataset(), "rows where region is east");
        assert_eq!(conds.len(), 1);
        assert_eq!(conds[0].operator, Operator::Eq);
        assert_eq!(conds[0].value, CondValue::Text("east".into()));
    }

    #[test]
    fn equals_shape() {
        let conds = extract(&dataset(), "region equals west");
        assert_eq!(conds.len(), 1);
        assert_eq!(conds[0].column, "region");
    }

    #[test]
    fn unresolved_column_dropped() {
        assert!(extract(&dataset(), "salary > 100").is_empty());
        assert!(extract(&dataset(), "nothing to see here").is_empty());
    }

    #[test]
    fn text_value_kept_for_text_columns() {
        let conds = extract(&dataset(), "region = east");
        assert_eq!(conds[0].value, CondValue::Text("east".into()));
    }

    #[test]
    fn multiple_conditions_accumulate() {
        let conds = extract(&dataset(), "age > 30 and region is east");
        assert_eq!(conds.len(), 2);
    }
}
