//! Session state
//!
//! Caches the loaded frames for the lifetime of one menu session. Frames are
//! immutable once loaded; derived columns live only in the values returned
//! by the services.

use crate::config::{AppConfig, SourceConfig};
use crate::data::loader::{self, LoadOptions, SourceSchema};
use crate::data::models::DatasetKind;
use crate::data::SalesFrame;
use crate::error::{AppError, Result};
use tracing::{info, warn};

pub struct Session {
    config: AppConfig,
    day_sell: Option<SalesFrame>,
    product_sales: Option<SalesFrame>,
}

impl Session {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            day_sell: None,
            product_sales: None,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Cached frame for `kind`, loading it on first use.
    ///
    /// A cached frame whose calendar fields are missing is reloaded.
    pub fn frame(&mut self, kind: DatasetKind) -> Result<&SalesFrame> {
        let slot = match kind {
            DatasetKind::DaySell => &mut self.day_sell,
            DatasetKind::ProductSales => &mut self.product_sales,
        };

        let needs_load = match slot.as_ref() {
            Some(frame) if frame.has_calendar() => false,
            Some(_) => {
                warn!("Calendar fields missing from {:?} frame, reloading", kind);
                true
            }
            None => true,
        };
        if needs_load {
            *slot = Some(load_source(&self.config, kind)?);
        }

        slot.as_ref()
            .ok_or_else(|| AppError::InsufficientData(format!("{:?} frame not loaded", kind)))
    }

    /// Load `kind` from disk, bypassing the cache
    pub fn load_fresh(&self, kind: DatasetKind) -> Result<SalesFrame> {
        load_source(&self.config, kind)
    }

    #[cfg(test)]
    pub(crate) fn cache(&mut self, frame: SalesFrame) {
        match frame.kind() {
            DatasetKind::DaySell => self.day_sell = Some(frame),
            DatasetKind::ProductSales => self.product_sales = Some(frame),
        }
    }
}

fn source_config(config: &AppConfig, kind: DatasetKind) -> &SourceConfig {
    match kind {
        DatasetKind::DaySell => &config.day_sell,
        DatasetKind::ProductSales => &config.product_sales,
    }
}

fn load_source(config: &AppConfig, kind: DatasetKind) -> Result<SalesFrame> {
    let source = source_config(config, kind);
    let frame = loader::load(
        &source.path,
        &SourceSchema::for_kind(kind),
        LoadOptions::from(source),
    )?;
    info!("{:?} frame ready: {} rows", kind, frame.len());
    Ok(frame)
}
