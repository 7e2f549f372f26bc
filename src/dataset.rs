//! Tabular containers for the pipeline's flat-file checkpoints
//!
//! `RawFrame` holds the dataset as read from CSV: ordered column names
//! plus string cells, with dtype inspection done on the data itself.
//! `NumericFrame` holds an engineered feature matrix with its column
//! names and writes/reads the `train.csv`/`test.csv` checkpoints
//! (header row, feature columns followed by the target column).

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use ndarray::{Array1, Array2};

use crate::error::{Error, Result};

/// Raw string table with an ordered header
#[derive(Debug, Clone, PartialEq)]
pub struct RawFrame {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl RawFrame {
    /// Build a frame from a header and rows; every row must match the
    /// header width
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self> {
        let width = columns.len();
        if let Some(bad) = rows.iter().position(|r| r.len() != width) {
            return Err(Error::Transform(format!(
                "row {bad} has {} cells, expected {width}",
                rows[bad].len()
            )));
        }
        Ok(Self { columns, rows })
    }

    /// Read a CSV file with a header row
    pub fn read_csv(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let mut rdr = csv::Reader::from_reader(BufReader::new(file));
        let columns: Vec<String> = rdr
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();
        let mut rows = Vec::new();
        for record in rdr.records() {
            let record = record?;
            rows.push(record.iter().map(|c| c.to_string()).collect());
        }
        Self::new(columns, rows)
    }

    /// Write the frame as CSV with a header row
    pub fn write_csv(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = File::create(path.as_ref())?;
        let mut wtr = csv::Writer::from_writer(BufWriter::new(file));
        wtr.write_record(&self.columns)?;
        for row in &self.rows {
            wtr.write_record(row)?;
        }
        wtr.flush()?;
        Ok(())
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Index of a column by name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Cells of a named column, in row order
    pub fn column(&self, name: &str) -> Option<Vec<&str>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|r| r[idx].as_str()).collect())
    }

    /// Drop a column by exact name match; absence is not an error.
    /// Returns whether the column was present.
    pub fn drop_column(&mut self, name: &str) -> bool {
        match self.column_index(name) {
            Some(idx) => {
                self.columns.remove(idx);
                for row in &mut self.rows {
                    row.remove(idx);
                }
                true
            }
            None => false,
        }
    }

    /// Replace every cell of a column via a mapping function
    pub fn map_column(&mut self, name: &str, f: impl Fn(&str) -> String) -> bool {
        match self.column_index(name) {
            Some(idx) => {
                for row in &mut self.rows {
                    row[idx] = f(&row[idx]);
                }
                true
            }
            None => false,
        }
    }

    /// Dtype inspection: a column is numeric when every non-empty cell
    /// parses as a float. Empty cells count as missing values, not as
    /// evidence of a string dtype.
    pub fn is_numeric_column(&self, name: &str) -> bool {
        match self.column_index(name) {
            Some(idx) => self.rows.iter().all(|r| {
                let cell = r[idx].trim();
                cell.is_empty() || cell.parse::<f64>().is_ok()
            }),
            None => false,
        }
    }

}

/// Engineered feature matrix with named columns
#[derive(Debug, Clone, PartialEq)]
pub struct NumericFrame {
    pub columns: Vec<String>,
    pub data: Array2<f64>,
}

impl NumericFrame {
    pub fn new(columns: Vec<String>, data: Array2<f64>) -> Result<Self> {
        if columns.len() != data.ncols() {
            return Err(Error::Transform(format!(
                "{} column names for a {}-column matrix",
                columns.len(),
                data.ncols()
            )));
        }
        Ok(Self { columns, data })
    }

    pub fn height(&self) -> usize {
        self.data.nrows()
    }

    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    /// True when any cell is NaN or infinite. The transformation stage
    /// logs (does not fail) on this as a post-imputation sanity check.
    pub fn has_non_finite(&self) -> bool {
        self.data.iter().any(|v| !v.is_finite())
    }

    /// Write features followed by the integer-encoded target column
    pub fn write_csv_with_target(
        &self,
        path: impl AsRef<Path>,
        target_name: &str,
        target: &[u8],
    ) -> Result<()> {
        if target.len() != self.height() {
            return Err(Error::Transform(format!(
                "{} target values for {} rows",
                target.len(),
                self.height()
            )));
        }
        let file = File::create(path.as_ref())?;
        let mut wtr = csv::Writer::from_writer(BufWriter::new(file));
        let mut header: Vec<&str> = self.columns.iter().map(String::as_str).collect();
        header.push(target_name);
        wtr.write_record(&header)?;
        for (i, row) in self.data.rows().into_iter().enumerate() {
            let mut record: Vec<String> = row.iter().map(|v| format!("{v}")).collect();
            record.push(format!("{}", target[i]));
            wtr.write_record(&record)?;
        }
        wtr.flush()?;
        Ok(())
    }

    /// Read a train/test checkpoint back: feature matrix plus target
    pub fn read_csv_with_target(
        path: impl AsRef<Path>,
        target_name: &str,
    ) -> Result<(Self, Array1<u8>)> {
        let raw = RawFrame::read_csv(path.as_ref())?;
        let target_idx = raw.column_index(target_name).ok_or_else(|| {
            Error::Transform(format!(
                "target column {target_name} missing from {}",
                path.as_ref().display()
            ))
        })?;

        let feature_cols: Vec<String> = raw
            .columns()
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != target_idx)
            .map(|(_, c)| c.clone())
            .collect();

        let height = raw.height();
        let width = feature_cols.len();
        let mut data = Array2::<f64>::zeros((height, width));
        let mut target = Array1::<u8>::zeros(height);

        for (r, row) in raw.rows().iter().enumerate() {
            let mut c = 0;
            for (i, cell) in row.iter().enumerate() {
                if i == target_idx {
                    target[r] = cell.trim().parse::<f64>().map_err(|e| {
                        Error::Transform(format!("bad target value {cell:?}: {e}"))
                    })? as u8;
                } else {
                    data[[r, c]] = cell.trim().parse::<f64>().map_err(|e| {
                        Error::Transform(format!("bad numeric cell {cell:?}: {e}"))
                    })?;
                    c += 1;
                }
            }
        }

        Ok((Self::new(feature_cols, data)?, target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_frame() -> RawFrame {
        RawFrame::new(
            vec!["a".into(), "b".into(), "c".into()],
            vec![
                vec!["1".into(), "x".into(), "0.5".into()],
                vec!["2".into(), "y".into(), "".into()],
                vec!["3".into(), "z".into(), "1.5".into()],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_new_rejects_ragged_rows() {
        let result = RawFrame::new(
            vec!["a".into(), "b".into()],
            vec![vec!["1".into()]],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_dtype_inspection() {
        let frame = sample_frame();
        assert!(frame.is_numeric_column("a"));
        assert!(!frame.is_numeric_column("b"));
        // empty cell does not disqualify a numeric column
        assert!(frame.is_numeric_column("c"));
        assert!(!frame.is_numeric_column("missing"));
    }

    #[test]
    fn test_drop_column() {
        let mut frame = sample_frame();
        assert!(frame.drop_column("b"));
        assert_eq!(frame.width(), 2);
        assert_eq!(frame.columns(), &["a".to_string(), "c".to_string()]);
        assert!(!frame.drop_column("b"));
    }

    #[test]
    fn test_map_column() {
        let mut frame = sample_frame();
        frame.map_column("c", |cell| {
            if cell.trim().parse::<f64>().is_ok() {
                cell.to_string()
            } else {
                "0".to_string()
            }
        });
        assert_eq!(frame.column("c").unwrap(), vec!["0.5", "0", "1.5"]);
    }

    #[test]
    fn test_csv_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.csv");
        let frame = sample_frame();
        frame.write_csv(&path).unwrap();
        let back = RawFrame::read_csv(&path).unwrap();
        assert_eq!(back, frame);
    }

    #[test]
    fn test_numeric_frame_roundtrip_with_target() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("train.csv");
        let frame = NumericFrame::new(
            vec!["f1".into(), "f2".into()],
            ndarray::arr2(&[[0.25, -1.5], [1.0, 2.0], [3.5, 0.0]]),
        )
        .unwrap();
        frame
            .write_csv_with_target(&path, "Churn", &[1, 0, 1])
            .unwrap();

        let (back, target) = NumericFrame::read_csv_with_target(&path, "Churn").unwrap();
        assert_eq!(back.columns, frame.columns);
        assert_eq!(back.data, frame.data);
        assert_eq!(target.to_vec(), vec![1, 0, 1]);
    }

    #[test]
    fn test_non_finite_detection() {
        let frame = NumericFrame::new(
            vec!["f1".into()],
            ndarray::arr2(&[[1.0], [f64::NAN]]),
        )
        .unwrap();
        assert!(frame.has_non_finite());
    }
}
