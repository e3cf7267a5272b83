// ABOUTME: Training load averaging algorithms (CTL/ATL) over a continuous daily series
// ABOUTME: Implements EMA (default), Banister impulse-response decay, and simple moving average
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Dreamy

use std::str::FromStr;

use dreamy_core::constants::load;
use dreamy_core::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Training load averaging selection
///
/// - `Ema`: exponential moving average, `α = 2/(N+1)`
/// - `ImpulseResponse`: Banister decay, `α = 1 - e^(-1/N)`
/// - `Sma`: mean of the last N days, rest days counted as zero
///
/// # Scientific References
///
/// - Coggan, A. (2003). "Training and Racing Using a Power Meter." *Peaksware LLC*.
/// - Banister, E.W. (1991). "Modeling elite athletic performance." *Physiological Testing of Elite Athletes*.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TrainingLoadAlgorithm {
    /// Exponential Moving Average
    ///
    /// Formula: `α = 2/(N+1)`, `EMA_t = α x TSS_t + (1-α) x EMA_{t-1}`
    Ema {
        /// CTL window in days
        ctl_days: u32,
        /// ATL window in days
        atl_days: u32,
    },

    /// Impulse-response decay
    ///
    /// Formula: `α = 1 - e^(-1/N)`, same recursion as EMA
    ImpulseResponse {
        /// CTL time constant in days
        ctl_days: u32,
        /// ATL time constant in days
        atl_days: u32,
    },

    /// Simple Moving Average
    ///
    /// Formula: `SMA = Σ(TSS_i) / N` for i in [t-N+1, t]
    Sma {
        /// CTL window in days
        ctl_days: u32,
        /// ATL window in days
        atl_days: u32,
    },
}

impl Default for TrainingLoadAlgorithm {
    fn default() -> Self {
        Self::Ema {
            ctl_days: load::CTL_DAYS,
            atl_days: load::ATL_DAYS,
        }
    }
}

impl TrainingLoadAlgorithm {
    /// CTL window in days
    #[must_use]
    pub const fn ctl_days(&self) -> u32 {
        match self {
            Self::Ema { ctl_days, .. }
            | Self::ImpulseResponse { ctl_days, .. }
            | Self::Sma { ctl_days, .. } => *ctl_days,
        }
    }

    /// ATL window in days
    #[must_use]
    pub const fn atl_days(&self) -> u32 {
        match self {
            Self::Ema { atl_days, .. }
            | Self::ImpulseResponse { atl_days, .. }
            | Self::Sma { atl_days, .. } => *atl_days,
        }
    }

    /// Check window sizes
    ///
    /// # Errors
    ///
    /// Returns `AppError::InvalidInput` when a window is zero.
    pub fn validate(&self) -> AppResult<()> {
        if self.ctl_days() == 0 || self.atl_days() == 0 {
            return Err(AppError::invalid_input(format!(
                "Window sizes must be positive, got ctl={} atl={}",
                self.ctl_days(),
                self.atl_days()
            )));
        }
        Ok(())
    }

    /// Smoothing factor for a window, `None` for windowed averages
    #[must_use]
    pub fn alpha(&self, window_days: u32) -> Option<f64> {
        let n = f64::from(window_days.max(1));
        match self {
            Self::Ema { .. } => Some(2.0 / (n + 1.0)),
            Self::ImpulseResponse { .. } => Some(1.0 - (-1.0 / n).exp()),
            Self::Sma { .. } => None,
        }
    }

    /// Smooth a continuous daily series (one value per calendar day)
    ///
    /// `seed` is the value on the day before the first entry; windowed
    /// averages treat days before the series as `seed`.
    #[must_use]
    pub fn smooth(&self, daily_tss: &[f64], window_days: u32, seed: f64) -> Vec<f64> {
        if let Some(alpha) = self.alpha(window_days) {
            let mut value = seed;
            return daily_tss
                .iter()
                .map(|tss| {
                    value = tss.mul_add(alpha, value * (1.0 - alpha));
                    value
                })
                .collect();
        }

        let window = window_days.max(1) as usize;
        let n = f64::from(window_days.max(1));
        let mut sum = seed * n;
        daily_tss
            .iter()
            .enumerate()
            .map(|(i, tss)| {
                sum += tss;
                sum -= if i >= window {
                    daily_tss[i - window]
                } else {
                    seed
                };
                sum / n
            })
            .collect()
    }

    /// Get algorithm name
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Ema { .. } => "ema",
            Self::ImpulseResponse { .. } => "impulse_response",
            Self::Sma { .. } => "sma",
        }
    }

    /// Get the formula as a string
    #[must_use]
    pub const fn formula(&self) -> &'static str {
        match self {
            Self::Ema { .. } => "α = 2/(N+1); L_t = α x TSS_t + (1-α) x L_{t-1}",
            Self::ImpulseResponse { .. } => "α = 1 - e^(-1/N); L_t = α x TSS_t + (1-α) x L_{t-1}",
            Self::Sma { .. } => "L_t = Σ TSS over last N days / N",
        }
    }
}

impl FromStr for TrainingLoadAlgorithm {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ctl_days = load::CTL_DAYS;
        let atl_days = load::ATL_DAYS;
        match s.to_lowercase().as_str() {
            "ema" => Ok(Self::Ema { ctl_days, atl_days }),
            "impulse_response" | "banister" => Ok(Self::ImpulseResponse { ctl_days, atl_days }),
            "sma" => Ok(Self::Sma { ctl_days, atl_days }),
            other => Err(AppError::invalid_input(format!(
                "Unknown training load algorithm: '{other}'. Valid options: ema, impulse_response, sma"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ema_alpha() {
        let ema = TrainingLoadAlgorithm::default();
        let alpha = ema.alpha(7).unwrap();
        assert!((alpha - 0.25).abs() < 1e-12);
        let smoothed = ema.smooth(&[100.0, 0.0], 7, 0.0);
        assert!((smoothed[0] - 25.0).abs() < 1e-9);
        assert!((smoothed[1] - 18.75).abs() < 1e-9);
    }

    #[test]
    fn test_sma_window() {
        let sma = TrainingLoadAlgorithm::Sma {
            ctl_days: 4,
            atl_days: 2,
        };
        let smoothed = sma.smooth(&[10.0, 20.0, 30.0, 40.0], 2, 0.0);
        assert_eq!(smoothed, vec![5.0, 15.0, 25.0, 35.0]);
    }

    #[test]
    fn test_zero_window_rejected() {
        let bad = TrainingLoadAlgorithm::Ema {
            ctl_days: 0,
            atl_days: 7,
        };
        assert!(bad.validate().is_err());
        assert!("kalman".parse::<TrainingLoadAlgorithm>().is_err());
    }
}
