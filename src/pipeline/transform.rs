//! Data transformation stage
//!
//! Turns the validated raw CSV into engineered train/test checkpoints:
//! drop the identifier column, coerce `TotalCharges`, split columns by
//! inspecting the data, encode the target, fit the feature pipeline
//! (impute, one-hot, standardize), stratified 80/20 split with a fixed
//! seed, and write `train.csv` / `test.csv`. The fitted pipeline is
//! persisted next to them for the training stage.

use std::fs;
use std::path::Path;

use ndarray::Array2;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::cli::logging::{log, LogLevel};
use crate::config::TransformationConfig;
use crate::dataset::{NumericFrame, RawFrame};
use crate::error::{Error, Result};
use crate::preprocess::{self, FittedFeaturePipeline};
use crate::schema::{self, encode_target};

/// Run the transformation stage on the ingested dataset
pub fn run(config: &TransformationConfig, dataset_path: &Path, level: LogLevel) -> Result<()> {
    let mut frame = RawFrame::read_csv(dataset_path)?;

    // step 1: the identifier carries no signal
    frame.drop_column(schema::ID_COLUMN);

    // step 2: TotalCharges holds blank strings for zero-tenure customers
    preprocess::coerce_to_numeric(&mut frame, schema::TOTAL_CHARGES);

    // step 3: pull out and encode the target before feature work
    let target: Vec<u8> = frame
        .column(schema::TARGET_COLUMN)
        .ok_or_else(|| {
            Error::Transform(format!("target column {} missing", schema::TARGET_COLUMN))
        })?
        .iter()
        .map(|v| encode_target(v))
        .collect();
    frame.drop_column(schema::TARGET_COLUMN);

    // step 4: categorical/numeric split comes from the data itself,
    // not from the schema tags, so a column that arrives all-numeric
    // is treated as numeric
    let (categorical, numeric) = split_by_dtype(&frame);
    log(
        level,
        LogLevel::Verbose,
        &format!(
            "dtype split: {} categorical, {} numeric",
            categorical.len(),
            numeric.len()
        ),
    );

    // steps 5-7: impute, one-hot, standardize
    let cat_refs: Vec<&str> = categorical.iter().map(String::as_str).collect();
    let num_refs: Vec<&str> = numeric.iter().map(String::as_str).collect();
    let (pipeline, engineered) = FittedFeaturePipeline::fit_transform(
        &frame,
        &cat_refs,
        &num_refs,
        &[schema::TOTAL_CHARGES],
    )?;

    if engineered.has_non_finite() {
        log(
            level,
            LogLevel::Normal,
            "warning: engineered matrix contains non-finite values",
        );
    }

    // step 8: stratified split with the configured seed
    let (train_idx, test_idx) = stratified_split(&target, config.test_ratio, config.seed);
    let (train_x, train_y) = take_rows(&engineered, &target, &train_idx);
    let (test_x, test_y) = take_rows(&engineered, &target, &test_idx);

    log(
        level,
        LogLevel::Normal,
        &format!(
            "split: train {}x{} ({} positive), test {}x{} ({} positive)",
            train_x.height(),
            train_x.width(),
            train_y.iter().filter(|&&y| y == 1).count(),
            test_x.height(),
            test_x.width(),
            test_y.iter().filter(|&&y| y == 1).count(),
        ),
    );

    // step 9: write the checkpoints and the fitted state
    fs::create_dir_all(&config.root_dir)?;
    train_x.write_csv_with_target(config.train_path(), schema::TARGET_COLUMN, &train_y)?;
    test_x.write_csv_with_target(config.test_path(), schema::TARGET_COLUMN, &test_y)?;
    fs::write(config.pipeline_path(), serde_json::to_string(&pipeline)?)?;
    Ok(())
}

/// Split columns into categorical/numeric by inspecting cell contents
#[must_use]
pub fn split_by_dtype(frame: &RawFrame) -> (Vec<String>, Vec<String>) {
    let mut categorical = Vec::new();
    let mut numeric = Vec::new();
    for name in frame.columns() {
        if frame.is_numeric_column(name) {
            numeric.push(name.clone());
        } else {
            categorical.push(name.clone());
        }
    }
    (categorical, numeric)
}

/// Deterministic stratified split. Test size is `round(n * ratio)`;
/// per-class allotments use floors plus largest fractional remainders
/// so every class keeps its proportion as closely as integers allow.
/// Returned index lists are sorted, so output rows keep dataset order.
#[must_use]
pub fn stratified_split(target: &[u8], ratio: f64, seed: u64) -> (Vec<usize>, Vec<usize>) {
    let n = target.len();
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let n_test = (n as f64 * ratio).round() as usize;

    let mut rng = StdRng::seed_from_u64(seed);
    let mut by_class: Vec<(u8, Vec<usize>)> = Vec::new();
    for (i, &y) in target.iter().enumerate() {
        match by_class.iter_mut().find(|(c, _)| *c == y) {
            Some((_, idx)) => idx.push(i),
            None => by_class.push((y, vec![i])),
        }
    }
    by_class.sort_by_key(|(c, _)| *c);

    // floor allotment per class, leftover by largest fractional part
    let mut allotted: Vec<usize> = Vec::with_capacity(by_class.len());
    let mut remainders: Vec<(usize, f64)> = Vec::with_capacity(by_class.len());
    for (slot, (_, idx)) in by_class.iter().enumerate() {
        let exact = idx.len() as f64 * n_test as f64 / n as f64;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let floor = exact.floor() as usize;
        allotted.push(floor);
        remainders.push((slot, exact - exact.floor()));
    }
    let mut leftover = n_test.saturating_sub(allotted.iter().sum::<usize>());
    remainders.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
    for (slot, _) in remainders {
        if leftover == 0 {
            break;
        }
        if allotted[slot] < by_class[slot].1.len() {
            allotted[slot] += 1;
            leftover -= 1;
        }
    }

    let mut train = Vec::new();
    let mut test = Vec::new();
    for ((_, mut idx), k) in by_class.into_iter().zip(allotted) {
        idx.shuffle(&mut rng);
        test.extend_from_slice(&idx[..k]);
        train.extend_from_slice(&idx[k..]);
    }
    train.sort_unstable();
    test.sort_unstable();
    (train, test)
}

/// Select rows of the engineered matrix and target by index
fn take_rows(frame: &NumericFrame, target: &[u8], indices: &[usize]) -> (NumericFrame, Vec<u8>) {
    let mut data = Array2::<f64>::zeros((indices.len(), frame.width()));
    let mut y = Vec::with_capacity(indices.len());
    for (r, &i) in indices.iter().enumerate() {
        data.row_mut(r).assign(&frame.data.row(i));
        y.push(target[i]);
    }
    (
        NumericFrame {
            columns: frame.columns.clone(),
            data,
        },
        y,
    )
}

/// Load the fitted pipeline persisted by this stage
pub fn load_fitted_pipeline(config: &TransformationConfig) -> Result<FittedFeaturePipeline> {
    let json = fs::read_to_string(config.pipeline_path())?;
    Ok(serde_json::from_str(&json)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stratified_split_counts() {
        // 7 negatives, 3 positives, 20% test -> 2 test rows, one per class
        let target = vec![0, 0, 1, 0, 0, 1, 0, 0, 1, 0];
        let (train, test) = stratified_split(&target, 0.2, 42);
        assert_eq!(train.len(), 8);
        assert_eq!(test.len(), 2);

        let test_pos = test.iter().filter(|&&i| target[i] == 1).count();
        assert_eq!(test_pos, 1);

        let mut all: Vec<usize> = train.iter().chain(test.iter()).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_stratified_split_is_seeded() {
        let target: Vec<u8> = (0..50).map(|i| u8::from(i % 3 == 0)).collect();
        let (train_a, test_a) = stratified_split(&target, 0.2, 42);
        let (train_b, test_b) = stratified_split(&target, 0.2, 42);
        assert_eq!(train_a, train_b);
        assert_eq!(test_a, test_b);

        let (_, test_c) = stratified_split(&target, 0.2, 7);
        assert_ne!(test_a, test_c);
    }

    #[test]
    fn test_split_preserves_class_ratio() {
        // 80 negatives, 20 positives, 20% test -> 16/4
        let target: Vec<u8> = (0..100).map(|i| u8::from(i < 20)).collect();
        let (_, test) = stratified_split(&target, 0.2, 42);
        assert_eq!(test.len(), 20);
        assert_eq!(test.iter().filter(|&&i| target[i] == 1).count(), 4);
    }

    #[test]
    fn test_split_by_dtype_inspects_cells() {
        let frame = RawFrame::new(
            vec!["a".into(), "b".into(), "c".into()],
            vec![
                vec!["1".into(), "x".into(), "2.5".into()],
                vec!["2".into(), "y".into(), "".into()],
            ],
        )
        .unwrap();
        let (categorical, numeric) = split_by_dtype(&frame);
        assert_eq!(categorical, vec!["b".to_string()]);
        // blank cells count as missing, not as text
        assert_eq!(numeric, vec!["a".to_string(), "c".to_string()]);
    }

    #[test]
    fn test_transform_stage_writes_checkpoints() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("Churn.csv");
        write_small_dataset(&data);

        let config = TransformationConfig {
            root_dir: dir.path().join("transformed"),
            test_ratio: 0.2,
            seed: 42,
        };
        run(&config, &data, LogLevel::Quiet).unwrap();

        let (train_x, train_y) =
            NumericFrame::read_csv_with_target(config.train_path(), schema::TARGET_COLUMN).unwrap();
        let (test_x, test_y) =
            NumericFrame::read_csv_with_target(config.test_path(), schema::TARGET_COLUMN).unwrap();
        assert_eq!(train_x.height(), 8);
        assert_eq!(test_x.height(), 2);
        assert_eq!(train_x.width(), test_x.width());
        assert_eq!(train_y.iter().filter(|&&y| y == 1).count(), 2);
        assert_eq!(test_y.iter().filter(|&&y| y == 1).count(), 1);

        let pipeline = load_fitted_pipeline(&config).unwrap();
        assert_eq!(pipeline.feature_names().len(), train_x.width());
    }

    #[test]
    fn test_transform_stage_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("Churn.csv");
        write_small_dataset(&data);

        let config = TransformationConfig {
            root_dir: dir.path().join("transformed"),
            test_ratio: 0.2,
            seed: 42,
        };
        run(&config, &data, LogLevel::Quiet).unwrap();
        let first_train = fs::read(config.train_path()).unwrap();
        let first_test = fs::read(config.test_path()).unwrap();

        run(&config, &data, LogLevel::Quiet).unwrap();
        assert_eq!(fs::read(config.train_path()).unwrap(), first_train);
        assert_eq!(fs::read(config.test_path()).unwrap(), first_test);
    }

    /// 10 rows, 7 No / 3 Yes, with a customerID column, a blank
    /// TotalCharges, and two categorical columns
    fn write_small_dataset(path: &Path) {
        let header = "customerID,gender,tenure,Contract,TotalCharges,Churn";
        let rows = [
            "c1,Male,1,Month-to-month,29.85,No",
            "c2,Female,34,One year,1889.5,No",
            "c3,Male,2,Month-to-month,108.15,Yes",
            "c4,Female,45,One year,1840.75,No",
            "c5,Male,2,Month-to-month,151.65,Yes",
            "c6,Female,8,Month-to-month,820.5,No",
            "c7,Male,22,One year,1949.4,No",
            "c8,Female,10,Month-to-month,301.9,Yes",
            "c9,Male,0,Month-to-month,,No",
            "c10,Female,62,One year,3487.95,No",
        ];
        let mut out = String::from(header);
        for row in rows {
            out.push('\n');
            out.push_str(row);
        }
        out.push('\n');
        fs::write(path, out).unwrap();
    }
}
