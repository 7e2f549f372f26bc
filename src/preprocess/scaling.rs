//! Standardization (zero mean, unit variance) with remembered statistics

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Fitted standard scaler over a set of named numeric columns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    columns: Vec<String>,
    mean: Vec<f64>,
    std: Vec<f64>,
}

impl StandardScaler {
    /// Learn per-column mean and population standard deviation.
    /// Constant columns get std 1 so transform leaves them centered
    /// instead of dividing by zero.
    pub fn fit(columns: &[(&str, &[f64])]) -> Result<Self> {
        let mut names = Vec::with_capacity(columns.len());
        let mut means = Vec::with_capacity(columns.len());
        let mut stds = Vec::with_capacity(columns.len());
        for &(name, values) in columns {
            if values.is_empty() {
                return Err(Error::Transform(format!(
                    "cannot fit scaler on empty column {name}"
                )));
            }
            let n = values.len() as f64;
            let mean = values.iter().sum::<f64>() / n;
            let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
            let std = var.sqrt();
            names.push(name.to_string());
            means.push(mean);
            stds.push(if std == 0.0 { 1.0 } else { std });
        }
        Ok(Self {
            columns: names,
            mean: means,
            std: stds,
        })
    }

    pub fn columns(&self) -> Vec<&str> {
        self.columns.iter().map(String::as_str).collect()
    }

    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    pub fn std(&self) -> &[f64] {
        &self.std
    }

    /// Standardize one column's values in place using the fitted stats
    pub fn transform_column(&self, name: &str, values: &mut [f64]) -> Result<()> {
        let idx = self
            .columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| Error::Transform(format!("column {name} not seen at fit time")))?;
        for v in values.iter_mut() {
            *v = (*v - self.mean[idx]) / self.std[idx];
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_fit_computes_population_stats() {
        let values = [2.0, 4.0, 6.0];
        let scaler = StandardScaler::fit(&[("tenure", &values)]).unwrap();
        assert_relative_eq!(scaler.mean()[0], 4.0);
        assert_relative_eq!(scaler.std()[0], (8.0f64 / 3.0).sqrt());
    }

    #[test]
    fn test_transform_centers_and_scales() {
        let values = [2.0, 4.0, 6.0];
        let scaler = StandardScaler::fit(&[("tenure", &values)]).unwrap();
        let mut scaled = values;
        scaler.transform_column("tenure", &mut scaled).unwrap();

        let mean: f64 = scaled.iter().sum::<f64>() / 3.0;
        let var: f64 = scaled.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / 3.0;
        assert_relative_eq!(mean, 0.0, epsilon = 1e-12);
        assert_relative_eq!(var.sqrt(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_constant_column_gets_unit_std() {
        let values = [5.0, 5.0, 5.0];
        let scaler = StandardScaler::fit(&[("flat", &values)]).unwrap();
        assert_relative_eq!(scaler.std()[0], 1.0);

        let mut scaled = values;
        scaler.transform_column("flat", &mut scaled).unwrap();
        assert!(scaled.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_unknown_column_is_an_error() {
        let values = [1.0, 2.0];
        let scaler = StandardScaler::fit(&[("a", &values)]).unwrap();
        let mut other = [1.0];
        assert!(scaler.transform_column("b", &mut other).is_err());
    }

    #[test]
    fn test_empty_column_rejected() {
        let values: [f64; 0] = [];
        assert!(StandardScaler::fit(&[("a", &values)]).is_err());
    }
}
