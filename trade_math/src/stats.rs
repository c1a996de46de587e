//! Summary statistics over price and residual series

use crate::{MathError, Result};

/// Arithmetic mean
pub fn mean(values: &[f64]) -> Result<f64> {
    if values.is_empty() {
        return Err(MathError::InsufficientData(
            "Cannot take the mean of an empty series".to_string(),
        ));
    }
    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (n - 1 denominator)
pub fn std_dev(values: &[f64]) -> Result<f64> {
    if values.len() < 2 {
        return Err(MathError::InsufficientData(
            "Need at least 2 values for a standard deviation".to_string(),
        ));
    }
    let m = mean(values)?;
    let variance =
        values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    Ok(variance.sqrt())
}

/// Largest absolute value, used to scale targets before fitting
pub fn max_abs(values: &[f64]) -> Result<f64> {
    values
        .iter()
        .map(|v| v.abs())
        .max_by(|a, b| a.total_cmp(b))
        .ok_or_else(|| MathError::InsufficientData("Empty series".to_string()))
}

/// Minimum and maximum of a series
pub fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    values.iter().fold(None, |acc, &v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_and_std_dev() {
        let data = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((mean(&data).unwrap() - 5.0).abs() < 1e-12);
        assert!((std_dev(&data).unwrap() - 2.138_089_935).abs() < 1e-6);
    }

    #[test]
    fn test_empty_inputs() {
        assert!(mean(&[]).is_err());
        assert!(std_dev(&[1.0]).is_err());
        assert!(max_abs(&[]).is_err());
        assert_eq!(min_max(&[]), None);
    }

    #[test]
    fn test_max_abs_and_min_max() {
        let data = [-8.0, 3.0, 5.5];
        assert_eq!(max_abs(&data).unwrap(), 8.0);
        assert_eq!(min_max(&data), Some((-8.0, 5.5)));
    }
}
