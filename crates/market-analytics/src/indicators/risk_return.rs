//! Risk / Return Projector
//!
//! Scales a single 24-hour percentage change to a yearly figure:
//!
//! ```text
//! daily      = change_24h / 100          (0 when the change is missing)
//! volatility = |daily| * sqrt(365)
//! annual     = (1 + daily)^365 - 1
//! ```
//!
//! This is a coarse projection from one sample, not a historical standard
//! deviation. Chart scaling downstream depends on this exact formula, so any
//! change to it is a behavior change.

use crate::model::{Asset, RiskReturnPoint};

const DAYS_PER_YEAR: f64 = 365.0;

/// Annualized `(volatility, return)` for a 24h percentage change
pub fn annualize(change_24h: Option<f64>) -> (f64, f64) {
    let daily = change_24h.unwrap_or(0.0) / 100.0;
    let volatility = daily.abs() * DAYS_PER_YEAR.sqrt();
    let annual = (1.0 + daily).powf(DAYS_PER_YEAR) - 1.0;
    (volatility, annual)
}

/// One point per asset, input order preserved, nothing filtered
pub fn project_risk_return(assets: &[Asset]) -> Vec<RiskReturnPoint> {
    assets
        .iter()
        .map(|asset| {
            let (risk_volatility, annualized_return) = annualize(asset.change_24h);
            RiskReturnPoint {
                risk_volatility,
                annualized_return,
                label: asset.symbol.clone(),
                icon_ref: asset.image.clone().unwrap_or_default(),
            }
        })
        .collect()
}
