//! Feature engineering shared by training and serving
//!
//! The `FittedFeaturePipeline` is the consistency contract between the
//! transformation stage and the prediction path: it is fit exactly once
//! on the training dataset, serialized inside the model artifact, and
//! re-applied verbatim at inference. Serving never refits an encoder or
//! scaler.
//!
//! Engineered layout: scaled numeric columns first (in dataset order),
//! then one-hot indicator columns named `<column>_<category>`.

mod encoding;
mod impute;
mod scaling;

pub use encoding::OneHotEncoder;
pub use impute::{median, MedianImputer};
pub use scaling::StandardScaler;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::dataset::{NumericFrame, RawFrame};
use crate::error::{Error, Result};

/// Coerce a column to numeric in place: numeric-string cells keep their
/// parsed value, everything else (blanks included) becomes 0. Returns
/// whether the column was present; absence is not an error.
pub fn coerce_to_numeric(frame: &mut RawFrame, column: &str) -> bool {
    frame.map_column(column, |cell| {
        let trimmed = cell.trim();
        match trimmed.parse::<f64>() {
            Ok(_) => trimmed.to_string(),
            Err(_) => "0".to_string(),
        }
    })
}

/// Fitted feature pipeline: imputation medians, encoder vocabularies,
/// and scaler statistics learned from the training dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedFeaturePipeline {
    numeric_columns: Vec<String>,
    categorical_columns: Vec<String>,
    /// Columns whose non-numeric cells are mapped to 0 at transform time
    coerced_columns: Vec<String>,
    imputer: MedianImputer,
    encoder: OneHotEncoder,
    scaler: StandardScaler,
    feature_names: Vec<String>,
}

impl FittedFeaturePipeline {
    /// Fit on the training dataset and return the engineered matrix.
    ///
    /// `categorical` and `numeric` are the column splits (derived by the
    /// caller, by dtype inspection at training time); `coerced` names
    /// the columns whose non-numeric cells map to 0.
    pub fn fit_transform(
        frame: &RawFrame,
        categorical: &[&str],
        numeric: &[&str],
        coerced: &[&str],
    ) -> Result<(Self, NumericFrame)> {
        if frame.height() == 0 {
            return Err(Error::Transform("cannot fit on an empty dataset".into()));
        }

        // parse numeric columns, blanks as NaN
        let mut raw_values: Vec<Vec<f64>> = Vec::with_capacity(numeric.len());
        for &name in numeric {
            raw_values.push(parse_column(frame, name, coerced)?);
        }

        let with_names: Vec<(&str, &[f64])> = numeric
            .iter()
            .zip(raw_values.iter())
            .map(|(&n, v)| (n, v.as_slice()))
            .collect();
        let imputer = MedianImputer::fit(&with_names);
        for (&name, values) in numeric.iter().zip(raw_values.iter_mut()) {
            imputer.transform_column(name, values)?;
        }

        let imputed: Vec<(&str, &[f64])> = numeric
            .iter()
            .zip(raw_values.iter())
            .map(|(&n, v)| (n, v.as_slice()))
            .collect();
        let scaler = StandardScaler::fit(&imputed)?;
        for (&name, values) in numeric.iter().zip(raw_values.iter_mut()) {
            scaler.transform_column(name, values)?;
        }

        let encoder = OneHotEncoder::fit(frame, categorical)?;

        let pipeline = Self {
            numeric_columns: numeric.iter().map(|s| s.to_string()).collect(),
            categorical_columns: categorical.iter().map(|s| s.to_string()).collect(),
            coerced_columns: coerced.iter().map(|s| s.to_string()).collect(),
            feature_names: {
                let mut names: Vec<String> = numeric.iter().map(|s| s.to_string()).collect();
                names.extend(encoder.feature_names());
                names
            },
            imputer,
            encoder,
            scaler,
        };

        let matrix = pipeline.assemble(frame, raw_values)?;
        Ok((pipeline, matrix))
    }

    /// Apply the fitted pipeline to new data without refitting
    pub fn transform(&self, frame: &RawFrame) -> Result<NumericFrame> {
        let mut raw_values: Vec<Vec<f64>> = Vec::with_capacity(self.numeric_columns.len());
        let coerced: Vec<&str> = self.coerced_columns.iter().map(String::as_str).collect();
        for name in &self.numeric_columns {
            let mut values = parse_column(frame, name, &coerced)?;
            self.imputer.transform_column(name, &mut values)?;
            self.scaler.transform_column(name, &mut values)?;
            raw_values.push(values);
        }
        self.assemble(frame, raw_values)
    }

    /// Ordered engineered column names: numerics then indicators
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn numeric_columns(&self) -> &[String] {
        &self.numeric_columns
    }

    pub fn categorical_columns(&self) -> &[String] {
        &self.categorical_columns
    }

    fn assemble(&self, frame: &RawFrame, numeric_values: Vec<Vec<f64>>) -> Result<NumericFrame> {
        let height = frame.height();
        let n_num = self.numeric_columns.len();
        let onehot = self.encoder.transform(frame)?;
        let mut data = Array2::<f64>::zeros((height, n_num + onehot.ncols()));
        for (c, values) in numeric_values.iter().enumerate() {
            for (r, &v) in values.iter().enumerate() {
                data[[r, c]] = v;
            }
        }
        for r in 0..height {
            for c in 0..onehot.ncols() {
                data[[r, n_num + c]] = onehot[[r, c]];
            }
        }
        NumericFrame::new(self.feature_names.clone(), data)
    }
}

/// Parse one numeric column: blanks become NaN (for imputation), cells
/// of coerced columns that fail to parse become 0, anything else that
/// fails to parse is a fatal data-shape error.
fn parse_column(frame: &RawFrame, name: &str, coerced: &[&str]) -> Result<Vec<f64>> {
    let cells = frame
        .column(name)
        .ok_or_else(|| Error::Transform(format!("numeric column {name} missing")))?;
    let coerce = coerced.contains(&name);
    cells
        .iter()
        .map(|cell| {
            let trimmed = cell.trim();
            if trimmed.is_empty() {
                Ok(f64::NAN)
            } else {
                match trimmed.parse::<f64>() {
                    Ok(v) => Ok(v),
                    Err(_) if coerce => Ok(0.0),
                    Err(e) => Err(Error::Transform(format!(
                        "non-numeric cell {trimmed:?} in column {name}: {e}"
                    ))),
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn frame() -> RawFrame {
        RawFrame::new(
            vec!["tenure".into(), "TotalCharges".into(), "Contract".into()],
            vec![
                vec!["1".into(), "29.85".into(), "Month-to-month".into()],
                vec!["34".into(), "".into(), "One year".into()],
                vec!["2".into(), "108.15".into(), "Month-to-month".into()],
                vec!["45".into(), "1840.75".into(), "One year".into()],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_coerce_to_numeric() {
        let mut f = RawFrame::new(
            vec!["TotalCharges".into()],
            vec![
                vec!["29.85".into()],
                vec!["".into()],
                vec![" ".into()],
                vec!["abc".into()],
            ],
        )
        .unwrap();
        assert!(coerce_to_numeric(&mut f, "TotalCharges"));
        assert_eq!(f.column("TotalCharges").unwrap(), vec!["29.85", "0", "0", "0"]);
        assert!(!coerce_to_numeric(&mut f, "nope"));
    }

    #[test]
    fn test_fit_transform_layout() {
        let f = frame();
        let (pipeline, matrix) =
            FittedFeaturePipeline::fit_transform(&f, &["Contract"], &["tenure", "TotalCharges"], &[])
                .unwrap();
        assert_eq!(
            pipeline.feature_names(),
            &[
                "tenure",
                "TotalCharges",
                "Contract_Month-to-month",
                "Contract_One year",
            ]
        );
        assert_eq!(matrix.height(), 4);
        assert_eq!(matrix.width(), 4);
        assert!(!matrix.has_non_finite());
    }

    #[test]
    fn test_numeric_columns_are_standardized() {
        let f = frame();
        let (_, matrix) =
            FittedFeaturePipeline::fit_transform(&f, &["Contract"], &["tenure", "TotalCharges"], &[])
                .unwrap();
        for c in 0..2 {
            let col = matrix.data.column(c);
            let mean = col.sum() / col.len() as f64;
            assert_relative_eq!(mean, 0.0, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_blank_cells_imputed_with_median() {
        let f = frame();
        let (pipeline, matrix) =
            FittedFeaturePipeline::fit_transform(&f, &[], &["TotalCharges"], &[]).unwrap();
        // blank row imputed with median of {29.85, 108.15, 1840.75} = 108.15,
        // then standardized; only finite values survive
        assert!(!matrix.has_non_finite());

        // the fitted transform must agree with fit-time output
        let again = pipeline.transform(&f).unwrap();
        assert_eq!(again.data, matrix.data);
    }

    #[test]
    fn test_transform_reuses_fitted_state() {
        let f = frame();
        let (pipeline, _) =
            FittedFeaturePipeline::fit_transform(&f, &["Contract"], &["tenure"], &[]).unwrap();

        // a one-row frame: statistics come from the 4-row fit, not from
        // this row, so the scaled value is not degenerate zero
        let one = RawFrame::new(
            vec!["tenure".into(), "Contract".into()],
            vec![vec!["34".into(), "One year".into()]],
        )
        .unwrap();
        let out = pipeline.transform(&one).unwrap();
        assert_eq!(out.height(), 1);
        assert!(out.data[[0, 0]].abs() > 0.0);
        assert_eq!(out.data[[0, 2]], 1.0); // Contract_One year
    }

    #[test]
    fn test_pipeline_roundtrips_through_json() {
        let f = frame();
        let (pipeline, _) =
            FittedFeaturePipeline::fit_transform(&f, &["Contract"], &["tenure"], &[]).unwrap();
        let json = serde_json::to_string(&pipeline).unwrap();
        let back: FittedFeaturePipeline = serde_json::from_str(&json).unwrap();
        assert_eq!(back, pipeline);
    }

    #[test]
    fn test_empty_dataset_rejected() {
        let empty = RawFrame::new(vec!["a".into()], vec![]).unwrap();
        assert!(FittedFeaturePipeline::fit_transform(&empty, &[], &["a"], &[]).is_err());
    }

    #[test]
    fn test_coerced_column_maps_junk_to_zero() {
        let f = RawFrame::new(
            vec!["TotalCharges".into()],
            vec![vec!["10".into()], vec!["junk".into()]],
        )
        .unwrap();
        let (_, matrix) =
            FittedFeaturePipeline::fit_transform(&f, &[], &["TotalCharges"], &["TotalCharges"])
                .unwrap();
        assert!(!matrix.has_non_finite());
    }
}
