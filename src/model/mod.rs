//! Tree-ensemble classifier and its persisted artifact

mod artifact;
mod forest;
mod tree;

pub use artifact::ChurnModel;
pub use forest::{ForestParams, RandomForestClassifier};
pub use tree::{DecisionTree, TreeParams};
