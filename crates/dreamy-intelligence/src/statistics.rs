// ABOUTME: Least-squares linear regression used by threshold detection and fitness trends
// ABOUTME: Reports slope, intercept, coefficient of determination and sample size
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Dreamy
#![allow(clippy::cast_precision_loss)] // sample counts are far below 2^52

use serde::{Deserialize, Serialize};

/// Result of an ordinary least-squares fit `y = slope x + intercept`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Regression {
    /// Change in y per unit x
    pub slope: f64,
    /// y at x = 0
    pub intercept: f64,
    /// Coefficient of determination (0-1)
    pub r_squared: f64,
    /// Number of points
    pub n: usize,
}

impl Regression {
    /// y on the fitted line at `x`
    #[must_use]
    pub fn predict(&self, x: f64) -> f64 {
        self.slope.mul_add(x, self.intercept)
    }

    /// x where the fitted line reaches `y`, `None` for a flat line
    #[must_use]
    pub fn solve_for_x(&self, y: f64) -> Option<f64> {
        (self.slope.abs() > f64::EPSILON).then(|| (y - self.intercept) / self.slope)
    }
}

/// Fit a line through `(x, y)` points
///
/// Returns `None` with fewer than two finite points or when every x is equal.
#[must_use]
pub fn linear_regression(points: &[(f64, f64)]) -> Option<Regression> {
    let finite: Vec<(f64, f64)> = points
        .iter()
        .copied()
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .collect();
    let n = finite.len();
    if n < 2 {
        return None;
    }

    let count = n as f64;
    let mean_x = finite.iter().map(|(x, _)| x).sum::<f64>() / count;
    let mean_y = finite.iter().map(|(_, y)| y).sum::<f64>() / count;

    let (sxx, sxy, syy) = finite.iter().fold((0.0, 0.0, 0.0), |(sxx, sxy, syy), (x, y)| {
        let dx = x - mean_x;
        let dy = y - mean_y;
        (dx.mul_add(dx, sxx), dx.mul_add(dy, sxy), dy.mul_add(dy, syy))
    });

    if sxx <= f64::EPSILON {
        return None;
    }

    let slope = sxy / sxx;
    let intercept = slope.mul_add(-mean_x, mean_y);
    let r_squared = if syy <= f64::EPSILON {
        1.0
    } else {
        ((sxy * sxy) / (sxx * syy)).clamp(0.0, 1.0)
    };

    Some(Regression {
        slope,
        intercept,
        r_squared,
        n,
    })
}

/// Arithmetic mean, `None` for an empty slice
#[must_use]
pub fn mean(values: &[f64]) -> Option<f64> {
    (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_line() {
        let fit = linear_regression(&[(1.0, 3.0), (2.0, 5.0), (3.0, 7.0)]).unwrap();
        assert!((fit.slope - 2.0).abs() < 1e-12);
        assert!((fit.intercept - 1.0).abs() < 1e-12);
        assert!((fit.r_squared - 1.0).abs() < 1e-12);
        assert_eq!(fit.n, 3);
        assert!((fit.solve_for_x(9.0).unwrap() - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_degenerate_inputs() {
        assert!(linear_regression(&[(1.0, 1.0)]).is_none());
        assert!(linear_regression(&[(2.0, 1.0), (2.0, 5.0)]).is_none());
        assert!(mean(&[]).is_none());
    }
}
