//! Property-based tests for the aggregation pipeline.
//!
//! Frames are generated with arbitrary dates and values, including zero
//! divisors, to check the invariants the menus rely on.

use agata_retail_lib::analytics::{
    aggregate, top_n, AggregationResult, Bucket, BucketKey, BucketKind, Rank, ReduceKind,
};
use agata_retail_lib::data::derive::{derive, Metric};
use agata_retail_lib::data::models::{Category, DatasetKind, Measure};
use agata_retail_lib::data::{NumericColumn, SalesFrame};
use agata_retail_lib::report::ChartKind;
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use proptest::prelude::*;

type DayRow = (i64, f64, f64, f64, f64);

fn day_row_strategy(span_days: i64) -> impl Strategy<Value = DayRow> {
    (
        0..span_days,
        prop_oneof![Just(0.0), 0.0..5_000.0f64],
        prop_oneof![Just(0.0), 0.0..10_000.0f64],
        0.0..1_000.0f64,
        -500.0..3_000.0f64,
    )
}

fn day_frame(start: NaiveDate, rows: &[DayRow]) -> SalesFrame {
    fn column(rows: &[DayRow], measure: Measure, pick: fn(&DayRow) -> f64) -> NumericColumn {
        NumericColumn {
            measure,
            values: rows.iter().map(pick).collect(),
        }
    }
    SalesFrame::new(
        DatasetKind::DaySell,
        rows.iter().map(|r| start + Duration::days(r.0)).collect(),
        vec![
            column(rows, Measure::NetPurchase, |r| r.1),
            column(rows, Measure::GrossSale, |r| r.2),
            column(rows, Measure::Tax, |r| r.3),
            column(rows, Measure::Margin, |r| r.4),
        ],
        vec![],
    )
    .unwrap()
}

fn jan_2018() -> NaiveDate {
    NaiveDate::from_ymd_opt(2018, 1, 1).unwrap()
}

fn ranking(values: &[f64]) -> AggregationResult {
    AggregationResult {
        measure: Measure::NetSaleValue,
        bucket_kind: BucketKind::Category(Category::ProductGroup),
        reduce_kind: ReduceKind::Sum,
        buckets: values
            .iter()
            .enumerate()
            .map(|(i, v)| Bucket {
                key: BucketKey::Category(format!("g{}", i)),
                value: Some(*v),
            })
            .collect(),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn rederiving_is_idempotent(rows in prop::collection::vec(day_row_strategy(400), 1..60)) {
        let frame = day_frame(jan_2018(), &rows);
        for metric in [Metric::NetSales, Metric::NetSalesPercentage, Metric::ProfitPercentage] {
            let once = derive(&frame, metric).unwrap();
            let twice = derive(&once, metric).unwrap();
            let bits = |f: &SalesFrame| -> Vec<u64> {
                f.column(metric.measure()).unwrap().iter().map(|v| v.to_bits()).collect()
            };
            prop_assert_eq!(bits(&once), bits(&twice));
            prop_assert_eq!(once.len(), frame.len());
        }
    }

    #[test]
    fn weekday_grouping_always_has_seven_days(
        rows in prop::collection::vec(day_row_strategy(30), 1..40),
        mean in any::<bool>(),
    ) {
        let frame = day_frame(jan_2018(), &rows);
        let reduce = if mean { ReduceKind::Mean } else { ReduceKind::Sum };
        let result = aggregate(&frame, BucketKind::Weekday, reduce, Measure::GrossSale, None).unwrap();

        let days: Vec<_> = result
            .buckets
            .iter()
            .map(|b| match b.key {
                BucketKey::Weekday(day) => day,
                _ => panic!("unexpected key {:?}", b.key),
            })
            .collect();
        prop_assert_eq!(days, vec![
            Weekday::Mon, Weekday::Tue, Weekday::Wed, Weekday::Thu,
            Weekday::Fri, Weekday::Sat, Weekday::Sun,
        ]);
    }

    #[test]
    fn monthly_buckets_within_a_year_are_bounded(
        rows in prop::collection::vec(day_row_strategy(900), 1..80),
    ) {
        let frame = day_frame(NaiveDate::from_ymd_opt(2017, 6, 1).unwrap(), &rows);
        let result = aggregate(&frame, BucketKind::Month, ReduceKind::Sum, Measure::GrossSale, Some(2018)).unwrap();

        prop_assert!(result.len() <= 12);
        for bucket in &result.buckets {
            match bucket.key {
                BucketKey::Month { year, .. } => prop_assert_eq!(year, 2018),
                _ => prop_assert!(false, "unexpected key {:?}", bucket.key),
            }
        }
    }

    #[test]
    fn monthly_sum_preserves_total(rows in prop::collection::vec(day_row_strategy(365), 1..60)) {
        let frame = day_frame(jan_2018(), &rows);
        let result = aggregate(&frame, BucketKind::Month, ReduceKind::Sum, Measure::GrossSale, None).unwrap();

        let expected: f64 = frame.column(Measure::GrossSale).unwrap().iter().sum();
        let bucketed: f64 = result.values().into_iter().flatten().sum();
        prop_assert!((expected - bucketed).abs() <= 1e-6 * expected.abs().max(1.0));

        // contiguous: consecutive months with no gaps
        let months: Vec<(i32, u32)> = result
            .buckets
            .iter()
            .filter_map(|b| match b.key {
                BucketKey::Month { year, month } => Some((year, month)),
                _ => None,
            })
            .collect();
        for pair in months.windows(2) {
            let next = NaiveDate::from_ymd_opt(pair[0].0, pair[0].1, 1).unwrap() + Duration::days(32);
            prop_assert_eq!(pair[1], (next.year(), next.month()));
        }
    }

    #[test]
    fn top_n_keeps_k_sorted_entries(
        values in prop::collection::vec(-1_000.0..1_000.0f64, 1..30),
        k_seed in any::<prop::sample::Index>(),
    ) {
        let result = ranking(&values);
        let k = k_seed.index(values.len()) + 1;

        let best = top_n(&result, k, Rank::Best).unwrap();
        let worst = top_n(&result, k, Rank::Worst).unwrap();
        prop_assert_eq!(best.len(), k);
        prop_assert_eq!(worst.len(), k);

        let best_values: Vec<f64> = best.values().into_iter().flatten().collect();
        prop_assert!(best_values.windows(2).all(|w| w[0] <= w[1]));

        let mut descending = values.clone();
        descending.sort_by(|a, b| b.total_cmp(a));
        let mut expected: Vec<f64> = descending[..k].to_vec();
        expected.reverse();
        prop_assert_eq!(best_values, expected);

        if 2 * k <= values.len() {
            let worst_keys = worst.keys();
            prop_assert!(best.keys().iter().all(|key| !worst_keys.contains(key)));
        }
    }

    #[test]
    fn top_n_rejects_out_of_range_counts(values in prop::collection::vec(-10.0..10.0f64, 1..10)) {
        let result = ranking(&values);
        prop_assert!(top_n(&result, 0, Rank::Best).is_err());
        prop_assert!(top_n(&result, values.len() + 1, Rank::Worst).is_err());
    }

    #[test]
    fn unknown_chart_names_fall_back_to_bar(name in "[a-z]{5,12}") {
        prop_assert_eq!(ChartKind::from(name.as_str()), ChartKind::Bar);
    }
}
