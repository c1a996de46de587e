//! Fourier series features for seasonal regression

use crate::{MathError, Result};
use std::f64::consts::PI;

/// Sine/cosine pairs of a periodic signal, `order` harmonics deep.
///
/// `t` and `period` must share a unit (days for daily price data). Output is
/// `[sin(2πt/p), cos(2πt/p), sin(4πt/p), cos(4πt/p), ...]`, length `2 * order`.
pub fn features(t: f64, period: f64, order: usize) -> Vec<f64> {
    let mut out = Vec::with_capacity(2 * order);
    for n in 1..=order {
        let angle = 2.0 * PI * n as f64 * t / period;
        out.push(angle.sin());
        out.push(angle.cos());
    }
    out
}

/// A seasonal cycle described by its period and Fourier order
#[derive(Debug, Clone, PartialEq)]
pub struct Seasonality {
    name: String,
    period: f64,
    order: usize,
}

impl Seasonality {
    pub fn new(name: &str, period: f64, order: usize) -> Result<Self> {
        if !(period > 0.0 && period.is_finite()) {
            return Err(MathError::InvalidInput(
                "Seasonal period must be positive".to_string(),
            ));
        }
        if order == 0 {
            return Err(MathError::InvalidInput(
                "Fourier order must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            name: name.to_string(),
            period,
            order,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of design matrix columns this seasonality contributes
    pub fn width(&self) -> usize {
        2 * self.order
    }

    pub fn features(&self, t: f64) -> Vec<f64> {
        features(t, self.period, self.order)
    }
}
