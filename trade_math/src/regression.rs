//! Least squares regression
//!
//! Penalized (ridge) least squares over an arbitrary design matrix

use crate::{MathError, Result};
use std::ops::Range;

/// Result of a penalized least squares fit
#[derive(Debug, Clone)]
pub struct LeastSquaresFit {
    /// One coefficient per design matrix column
    pub coefficients: Vec<f64>,
    /// `y - X * coefficients` for every training row
    pub residuals: Vec<f64>,
}

impl LeastSquaresFit {
    /// Contribution of `columns` of one design row to the fitted value
    pub fn evaluate(&self, row: &[f64], columns: Range<usize>) -> f64 {
        row[columns.clone()]
            .iter()
            .zip(&self.coefficients[columns])
            .map(|(x, beta)| x * beta)
            .sum()
    }
}

/// Solve `(X'X + diag(penalties)) beta = X'y`.
///
/// `rows` is the design matrix in row-major order; every row must have
/// `penalties.len()` columns. A zero penalty leaves that column unregularized.
pub fn fit_penalized(rows: &[Vec<f64>], targets: &[f64], penalties: &[f64]) -> Result<LeastSquaresFit> {
    if rows.len() != targets.len() {
        return Err(MathError::InvalidInput(format!(
            "Design rows ({}) don't match targets ({})",
            rows.len(),
            targets.len()
        )));
    }
    if rows.is_empty() {
        return Err(MathError::InsufficientData(
            "No observations to fit".to_string(),
        ));
    }

    let k = penalties.len();
    if let Some(bad) = rows.iter().find(|row| row.len() != k) {
        return Err(MathError::InvalidInput(format!(
            "Design row has {} columns, expected {}",
            bad.len(),
            k
        )));
    }

    let mut gram = vec![vec![0.0; k]; k];
    let mut moment = vec![0.0; k];
    for (row, &y) in rows.iter().zip(targets) {
        for i in 0..k {
            moment[i] += row[i] * y;
            for j in i..k {
                gram[i][j] += row[i] * row[j];
            }
        }
    }
    for i in 0..k {
        gram[i][i] += penalties[i];
        for j in 0..i {
            gram[i][j] = gram[j][i];
        }
    }

    let mut fit = LeastSquaresFit {
        coefficients: solve(gram, moment)?,
        residuals: Vec::with_capacity(rows.len()),
    };
    for (row, &y) in rows.iter().zip(targets) {
        let fitted = fit.evaluate(row, 0..k);
        fit.residuals.push(y - fitted);
    }

    Ok(fit)
}

/// Gaussian elimination with partial pivoting
fn solve(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Result<Vec<f64>> {
    let n = b.len();

    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&x, &y| a[x][col].abs().total_cmp(&a[y][col].abs()))
            .unwrap_or(col);
        if a[pivot][col].abs() < 1e-12 {
            return Err(MathError::CalculationError(format!(
                "Singular system: column {} has no usable pivot",
                col
            )));
        }
        a.swap(col, pivot);
        b.swap(col, pivot);

        for row in col + 1..n {
            let factor = a[row][col] / a[col][col];
            if factor == 0.0 {
                continue;
            }
            for j in col..n {
                a[row][j] -= factor * a[col][j];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = (row + 1..n).map(|j| a[row][j] * x[j]).sum();
        x[row] = (b[row] - tail) / a[row][row];
    }

    Ok(x)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unpenalized_fit_matches_exact_plane() {
        // y = 2 + 3a - b
        let rows: Vec<Vec<f64>> = (0..6)
            .map(|i| {
                let a = i as f64;
                let b = (i * i) as f64 * 0.5;
                vec![1.0, a, b]
            })
            .collect();
        let targets: Vec<f64> = rows.iter().map(|r| 2.0 + 3.0 * r[1] - r[2]).collect();

        let fit = fit_penalized(&rows, &targets, &[0.0, 0.0, 0.0]).unwrap();

        assert!((fit.coefficients[0] - 2.0).abs() < 1e-8);
        assert!((fit.coefficients[1] - 3.0).abs() < 1e-8);
        assert!((fit.coefficients[2] + 1.0).abs() < 1e-8);
        assert!(fit.residuals.iter().all(|r| r.abs() < 1e-8));
    }

    #[test]
    fn test_penalty_shrinks_coefficient() {
        let rows: Vec<Vec<f64>> = (0..10).map(|i| vec![1.0, i as f64]).collect();
        let targets: Vec<f64> = (0..10).map(|i| i as f64).collect();

        let free = fit_penalized(&rows, &targets, &[0.0, 0.0]).unwrap();
        let shrunk = fit_penalized(&rows, &targets, &[0.0, 1000.0]).unwrap();

        assert!(shrunk.coefficients[1].abs() < free.coefficients[1].abs());
    }

    #[test]
    fn test_evaluate_sums_selected_columns() {
        let fit = LeastSquaresFit {
            coefficients: vec![2.0, 3.0, -1.0],
            residuals: Vec::new(),
        };
        let row = [1.0, 10.0, 4.0];

        assert!((fit.evaluate(&row, 0..3) - 28.0).abs() < 1e-12);
        assert!((fit.evaluate(&row, 0..2) - 32.0).abs() < 1e-12);
        assert!((fit.evaluate(&row, 2..3) + 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_singular_system_is_reported() {
        let rows = vec![vec![1.0, 1.0], vec![1.0, 1.0]];
        let result = fit_penalized(&rows, &[1.0, 2.0], &[0.0, 0.0]);
        assert!(matches!(result, Err(MathError::CalculationError(_))));
    }
}
