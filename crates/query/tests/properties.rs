//! Algebraic properties of filtering, counting and histogram binning.

use proptest::prelude::*;
use tabletalk_engine::{Dataset, Value};
use tabletalk_query::filter::matching_rows;
use tabletalk_query::{answer, CondValue, Condition, Operator, Payload};

fn number_dataset(values: &[f64]) -> Dataset {
    Dataset::build(
        "gen.csv",
        vec!["score".into()],
        values.iter().map(|&v| vec![Value::Number(v)]).collect(),
    )
    .unwrap()
}

proptest! {
    #[test]
    fn filter_is_idempotent(values in prop::collection::vec(-1000.0f64..1000.0, 1..100),
                            threshold in -1000.0f64..1000.0) {
        let ds = number_dataset(&values);
        let conds = [Condition {
            column: "score".into(),
            operator: Operator::Gt,
            value: CondValue::Number(threshold),
        }];
        let once = matching_rows(&ds, &conds);
        let twice = matching_rows(&ds, &conds);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn count_with_conditions_is_monotonic(values in prop::collection::vec(-1000.0f64..1000.0, 1..100),
                                          threshold in -1000.0f64..1000.0) {
        let ds = number_dataset(&values);
        let conds = [Condition {
            column: "score".into(),
            operator: Operator::Le,
            value: CondValue::Number(threshold),
        }];
        let with = matching_rows(&ds, &conds).len();
        let without = matching_rows(&ds, &[]).len();
        prop_assert!(with <= without);
        prop_assert_eq!(without, ds.row_count());
    }

    #[test]
    fn histogram_conserves_counts(values in prop::collection::vec(-1.0e6f64..1.0e6, 1..200)) {
        let ds = number_dataset(&values);
        let ans = answer(&ds, "plot score");
        let Some(Payload::Chart { series, .. }) = ans.payload else {
            return Err(TestCaseError::fail("expected a chart payload"));
        };
        // Never more than the 10 fixed bins, and every value lands in one:
        // the maximum is clamped into the last bin, never an eleventh.
        prop_assert!(series.len() <= 10);
        let total: usize = series.iter().map(|p| p.count).sum();
        prop_assert_eq!(total, values.len());
    }

    #[test]
    fn histogram_max_lands_in_last_bin(values in prop::collection::vec(0.0f64..1000.0, 2..200)) {
        let ds = number_dataset(&values);
        let ans = answer(&ds, "plot score");
        let Some(Payload::Chart { series, .. }) = ans.payload else {
            return Err(TestCaseError::fail("expected a chart payload"));
        };
        let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let last = series.last().unwrap();
        prop_assert!(last.count >= 1);
        // The last emitted bin's upper edge is the observed maximum
        // (labels carry one decimal place, so allow that rounding).
        let hi: f64 = last.category.rsplit('-').next().unwrap().parse().unwrap();
        prop_assert!((hi - max).abs() <= 0.051);
    }
}
