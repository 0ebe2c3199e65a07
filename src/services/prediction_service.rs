//! Prediction Service
//!
//! Regression forecasts over the day-level export. Always works on a
//! freshly loaded frame so derived columns never leak into the features.

use crate::config::PredictionConfig;
use crate::data::models::Measure;
use crate::data::SalesFrame;
use crate::error::{AppError, Result};
use crate::ml::fit_and_predict;
use serde::Serialize;
use tracing::info;

/// Tax predicted from net purchase and gross sale
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaxForecast {
    pub tax: f64,
    /// gross sale - (net purchase + predicted tax)
    pub evaluated_margin: f64,
    /// R² on the held-out rows
    pub accuracy: f64,
}

/// Net purchase and gross sale predicted from tax and margin
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PurchaseSaleForecast {
    pub net_purchase: f64,
    pub gross_sale: f64,
    pub accuracy: f64,
}

pub struct PredictionService;

impl PredictionService {
    pub fn predict_tax(
        frame: &SalesFrame,
        net_purchase: f64,
        gross_sale: f64,
        config: &PredictionConfig,
    ) -> Result<TaxForecast> {
        info!("PredictionService::predict_tax");
        let prediction = fit_and_predict(
            frame,
            &[Measure::Margin],
            &[Measure::Tax],
            &[net_purchase, gross_sale],
            config,
        )?;
        let tax = prediction
            .value(Measure::Tax)
            .ok_or_else(|| AppError::Model("no tax prediction returned".into()))?;

        Ok(TaxForecast {
            tax,
            evaluated_margin: gross_sale - (net_purchase + tax),
            accuracy: prediction.accuracy,
        })
    }

    pub fn predict_purchase_sale(
        frame: &SalesFrame,
        tax: f64,
        margin: f64,
        config: &PredictionConfig,
    ) -> Result<PurchaseSaleForecast> {
        info!("PredictionService::predict_purchase_sale");
        let prediction = fit_and_predict(
            frame,
            &[],
            &[Measure::NetPurchase, Measure::GrossSale],
            &[tax, margin],
            config,
        )?;
        let missing = |m: Measure| AppError::Model(format!("no {} prediction returned", m));

        Ok(PurchaseSaleForecast {
            net_purchase: prediction
                .value(Measure::NetPurchase)
                .ok_or_else(|| missing(Measure::NetPurchase))?,
            gross_sale: prediction
                .value(Measure::GrossSale)
                .ok_or_else(|| missing(Measure::GrossSale))?,
            accuracy: prediction.accuracy,
        })
    }
}
