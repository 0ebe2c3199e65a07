//! Linear regression over sales frames
//!
//! Rows are shuffled with a seeded generator, split into train and test
//! partitions, and one ordinary least squares model is fitted per target.
//! Accuracy is the coefficient of determination on the test partition,
//! averaged across targets.

use crate::config::PredictionConfig;
use crate::data::models::Measure;
use crate::data::SalesFrame;
use crate::error::{AppError, Result};
use linfa::traits::{Fit, Predict};
use linfa::DatasetBase;
use linfa_linear::{FittedLinearRegression, LinearRegression};
use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Serialize;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Fewest rows either partition may hold
const MIN_PARTITION_ROWS: usize = 2;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    /// One predicted value per target, in target order
    pub values: Vec<(Measure, f64)>,
    /// Mean R² over the targets on the held-out rows
    pub accuracy: f64,
}

impl Prediction {
    pub fn value(&self, measure: Measure) -> Option<f64> {
        self.values
            .iter()
            .find(|(m, _)| *m == measure)
            .map(|(_, v)| *v)
    }
}

/// Canonical columns left as model inputs once `excluded` and `targets` are removed
pub fn feature_measures(frame: &SalesFrame, excluded: &[Measure], targets: &[Measure]) -> Vec<Measure> {
    frame
        .canonical_measures()
        .into_iter()
        .filter(|m| !excluded.contains(m) && !targets.contains(m))
        .collect()
}

/// Fit one model per target and predict from `input`, given in `feature_measures` order
pub fn fit_and_predict(
    frame: &SalesFrame,
    excluded: &[Measure],
    targets: &[Measure],
    input: &[f64],
    config: &PredictionConfig,
) -> Result<Prediction> {
    if targets.is_empty() {
        return Err(AppError::InvalidArgument("no target columns given".into()));
    }
    let features = feature_measures(frame, excluded, targets);
    if features.is_empty() {
        return Err(AppError::InvalidArgument("no feature columns left".into()));
    }
    if input.len() != features.len() {
        return Err(AppError::InvalidArgument(format!(
            "expected {} input values ({}), got {}",
            features.len(),
            features.iter().map(|m| m.label()).collect::<Vec<_>>().join(", "),
            input.len()
        )));
    }

    let feature_columns = features
        .iter()
        .map(|m| frame.column(*m))
        .collect::<Result<Vec<_>>>()?;
    let target_columns = targets
        .iter()
        .map(|m| frame.column(*m))
        .collect::<Result<Vec<_>>>()?;

    let mut rows: Vec<usize> = (0..frame.len())
        .filter(|&i| {
            feature_columns
                .iter()
                .chain(&target_columns)
                .all(|c| !c[i].is_nan())
        })
        .collect();
    if rows.len() < frame.len() {
        warn!("{} row(s) with missing values left out", frame.len() - rows.len());
    }

    let test_count = (rows.len() as f64 * config.test_ratio).ceil() as usize;
    let train_count = rows.len() - test_count;
    if test_count < MIN_PARTITION_ROWS || train_count < MIN_PARTITION_ROWS {
        return Err(AppError::InsufficientData(format!(
            "{} usable rows cannot be split {}/{}",
            rows.len(),
            1.0 - config.test_ratio,
            config.test_ratio
        )));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    rows.shuffle(&mut rng);
    let (test_rows, train_rows) = rows.split_at(test_count);

    info!(
        "Fitting {} target(s) on {} rows, testing on {}",
        targets.len(),
        train_rows.len(),
        test_rows.len()
    );
    let t0 = Instant::now();

    let x_train = design_matrix(&feature_columns, train_rows);
    let x_test = design_matrix(&feature_columns, test_rows);
    let x_input = Array2::from_shape_vec((1, input.len()), input.to_vec())
        .map_err(|e| AppError::Model(e.to_string()))?;

    let mut values = Vec::with_capacity(targets.len());
    let mut r2_total = 0.0;
    for (measure, column) in targets.iter().zip(&target_columns) {
        let y_train: Array1<f64> = train_rows.iter().map(|&i| column[i]).collect();
        let y_test: Array1<f64> = test_rows.iter().map(|&i| column[i]).collect();

        let dataset = DatasetBase::from(x_train.clone()).with_targets(y_train);
        let model: FittedLinearRegression<f64> = LinearRegression::default().fit(&dataset)?;

        let r2 = r_squared(&model.predict(&x_test), &y_test);
        debug!("{} R² = {:.6}", measure, r2);
        r2_total += r2;

        let predicted: Array1<f64> = model.predict(&x_input);
        values.push((*measure, predicted[0]));
    }

    debug!("Fitted in {:?}", t0.elapsed());

    Ok(Prediction {
        values,
        accuracy: r2_total / targets.len() as f64,
    })
}

fn design_matrix(columns: &[&[f64]], rows: &[usize]) -> Array2<f64> {
    Array2::from_shape_fn((rows.len(), columns.len()), |(r, c)| columns[c][rows[r]])
}

/// Coefficient of determination; 0 when the actuals have no variance
fn r_squared(predicted: &Array1<f64>, actual: &Array1<f64>) -> f64 {
    let n = actual.len() as f64;
    let mean = actual.sum() / n;
    let ss_tot: f64 = actual.iter().map(|a| (a - mean).powi(2)).sum();
    let ss_res: f64 = predicted
        .iter()
        .zip(actual.iter())
        .map(|(p, a)| (a - p).powi(2))
        .sum();
    if ss_tot > 0.0 {
        1.0 - ss_res / ss_tot
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::*;
    use chrono::Duration;

    fn config() -> PredictionConfig {
        PredictionConfig {
            test_ratio: 0.3,
            seed: 2,
        }
    }

    /// tax = 0.1 * gross + 0.05 * purchase + 1, margin noisy
    fn linear_frame(rows: usize) -> SalesFrame {
        let start = date(2018, 1, 1);
        let data: Vec<_> = (0..rows)
            .map(|i| {
                let purchase = 50.0 + (i * 7 % 13) as f64 * 3.0;
                let gross = 100.0 + (i * 5 % 11) as f64 * 10.0;
                let tax = 0.1 * gross + 0.05 * purchase + 1.0;
                let margin = (i % 4) as f64;
                (start + Duration::days(i as i64), purchase, gross, tax, margin)
            })
            .collect();
        day_frame(&data)
    }

    #[test]
    fn test_exact_linear_relation() {
        let frame = linear_frame(30);
        let prediction = fit_and_predict(
            &frame,
            &[Measure::Margin],
            &[Measure::Tax],
            &[60.0, 150.0],
            &config(),
        )
        .unwrap();
        let tax = prediction.value(Measure::Tax).unwrap();
        assert!((tax - 19.0).abs() < 1e-6, "predicted {tax}");
        assert!((prediction.accuracy - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_same_seed_is_bit_identical() {
        let frame = linear_frame(25);
        let run = || {
            fit_and_predict(
                &frame,
                &[],
                &[Measure::NetPurchase, Measure::GrossSale],
                &[12.0, 3.0],
                &config(),
            )
            .unwrap()
        };
        let (a, b) = (run(), run());
        assert_eq!(a.accuracy.to_bits(), b.accuracy.to_bits());
        for ((_, x), (_, y)) in a.values.iter().zip(&b.values) {
            assert_eq!(x.to_bits(), y.to_bits());
        }
        assert_eq!(a.values.len(), 2);
    }

    #[test]
    fn test_feature_measures() {
        let frame = linear_frame(3);
        assert_eq!(
            feature_measures(&frame, &[Measure::Margin], &[Measure::Tax]),
            vec![Measure::NetPurchase, Measure::GrossSale]
        );
    }

    #[test]
    fn test_input_arity_checked() {
        let frame = linear_frame(30);
        let err = fit_and_predict(&frame, &[Measure::Margin], &[Measure::Tax], &[1.0], &config())
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidArgument(_)));
    }

    #[test]
    fn test_too_few_rows() {
        let frame = linear_frame(3);
        let err = fit_and_predict(
            &frame,
            &[Measure::Margin],
            &[Measure::Tax],
            &[1.0, 1.0],
            &config(),
        )
        .unwrap_err();
        assert!(matches!(err, AppError::InsufficientData(_)));
    }

    #[test]
    fn test_r_squared_constant_actuals() {
        let actual = Array1::from(vec![2.0, 2.0]);
        let predicted = Array1::from(vec![1.0, 3.0]);
        assert_eq!(r_squared(&predicted, &actual), 0.0);
    }
}
