//! Model training stage
//!
//! Fits the random forest on `train.csv` and assembles the single-file
//! model artifact: forest, ordered feature names, the fitted feature
//! pipeline from the transformation stage, and the schema. The test
//! checkpoint is loaded to confirm the split is intact but plays no
//! part in fitting.

use crate::cli::logging::{log, LogLevel};
use crate::config::{TrainerConfig, TransformationConfig};
use crate::dataset::NumericFrame;
use crate::error::{Error, Result};
use crate::model::{ChurnModel, RandomForestClassifier};
use crate::pipeline::transform;
use crate::schema::{ChurnSchema, TARGET_COLUMN};

/// Run the training stage; returns the saved artifact
pub fn run(
    config: &TrainerConfig,
    transformation: &TransformationConfig,
    level: LogLevel,
) -> Result<ChurnModel> {
    let (train_x, train_y) =
        NumericFrame::read_csv_with_target(transformation.train_path(), TARGET_COLUMN)?;
    let (test_x, _) =
        NumericFrame::read_csv_with_target(transformation.test_path(), TARGET_COLUMN)?;
    if test_x.width() != train_x.width() {
        return Err(Error::Train(format!(
            "train/test column mismatch: {} vs {}",
            train_x.width(),
            test_x.width()
        )));
    }

    let pipeline = transform::load_fitted_pipeline(transformation)?;
    if pipeline.feature_names() != train_x.columns.as_slice() {
        return Err(Error::Train(
            "train.csv columns do not match the fitted pipeline".into(),
        ));
    }

    log(
        level,
        LogLevel::Normal,
        &format!(
            "training forest on {}x{} ({} trees, depth {})",
            train_x.height(),
            train_x.width(),
            config.n_trees,
            config.max_depth
        ),
    );

    let labels: Vec<u8> = train_y.iter().copied().collect();
    let forest = RandomForestClassifier::fit(&train_x.data, &labels, config.forest_params())?;

    let model = ChurnModel {
        forest,
        feature_names: train_x.columns.clone(),
        pipeline,
        schema: ChurnSchema::default(),
    };
    model.save(config.model_path())?;
    log(
        level,
        LogLevel::Normal,
        &format!("model saved to {}", config.model_path().display()),
    );
    Ok(model)
}
