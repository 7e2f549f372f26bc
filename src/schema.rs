//! Fixed dataset schema for the telecom churn dataset
//!
//! One shared definition of the 19 input columns, their kinds, and the
//! target encoding. Validation, transformation, and prediction all
//! derive their column sets from here, so the training-time and
//! serving-time views of the data cannot drift apart. The definition is
//! embedded into the model artifact at training time.

use serde::{Deserialize, Serialize};

/// Column kind tag; used for the categorical/numeric split
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnKind {
    Categorical,
    Numeric,
}

/// The 19 input columns in their fixed dataset order
pub const INPUT_COLUMNS: [(&str, ColumnKind); 19] = [
    ("gender", ColumnKind::Categorical),
    ("SeniorCitizen", ColumnKind::Numeric),
    ("Partner", ColumnKind::Categorical),
    ("Dependents", ColumnKind::Categorical),
    ("tenure", ColumnKind::Numeric),
    ("PhoneService", ColumnKind::Categorical),
    ("MultipleLines", ColumnKind::Categorical),
    ("InternetService", ColumnKind::Categorical),
    ("OnlineSecurity", ColumnKind::Categorical),
    ("OnlineBackup", ColumnKind::Categorical),
    ("DeviceProtection", ColumnKind::Categorical),
    ("TechSupport", ColumnKind::Categorical),
    ("StreamingTV", ColumnKind::Categorical),
    ("StreamingMovies", ColumnKind::Categorical),
    ("Contract", ColumnKind::Categorical),
    ("PaperlessBilling", ColumnKind::Categorical),
    ("PaymentMethod", ColumnKind::Categorical),
    ("MonthlyCharges", ColumnKind::Numeric),
    ("TotalCharges", ColumnKind::Numeric),
];

/// Identifier column dropped before feature engineering
pub const ID_COLUMN: &str = "customerID";

/// The monetary total column known to contain blank strings for
/// zero-tenure customers; coerced to numeric with blanks mapped to 0
pub const TOTAL_CHARGES: &str = "TotalCharges";

/// Name of the target column
pub const TARGET_COLUMN: &str = "Churn";

/// Positive label value in the raw dataset
pub const POSITIVE_LABEL: &str = "Yes";

/// Schema descriptor shared by validation, transformation, and serving
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChurnSchema {
    /// Input columns in fixed order, with their kind tags
    pub columns: Vec<(String, ColumnKind)>,
    /// Target column name
    pub target: String,
}

impl Default for ChurnSchema {
    fn default() -> Self {
        Self {
            columns: INPUT_COLUMNS
                .iter()
                .map(|(name, kind)| ((*name).to_string(), *kind))
                .collect(),
            target: TARGET_COLUMN.to_string(),
        }
    }
}

impl ChurnSchema {
    /// Input column names in fixed order
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|(n, _)| n.as_str()).collect()
    }

    /// Names of categorical input columns
    pub fn categorical(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|(_, k)| *k == ColumnKind::Categorical)
            .map(|(n, _)| n.as_str())
            .collect()
    }

    /// Names of numeric input columns
    pub fn numeric(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|(_, k)| *k == ColumnKind::Numeric)
            .map(|(n, _)| n.as_str())
            .collect()
    }

    /// Expected columns for raw dataset validation: inputs plus target
    pub fn expected_columns(&self) -> Vec<String> {
        let mut cols: Vec<String> = self.columns.iter().map(|(n, _)| n.clone()).collect();
        cols.push(self.target.clone());
        cols
    }

    /// Number of input columns
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Encode a raw target value: the fixed positive label maps to 1,
/// every other value maps to 0. Not a generic label encoder.
pub fn encode_target(value: &str) -> u8 {
    u8::from(value == POSITIVE_LABEL)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_has_19_inputs() {
        let schema = ChurnSchema::default();
        assert_eq!(schema.len(), 19);
        assert_eq!(schema.categorical().len(), 15);
        assert_eq!(schema.numeric().len(), 4);
    }

    #[test]
    fn test_expected_columns_include_target() {
        let schema = ChurnSchema::default();
        let expected = schema.expected_columns();
        assert_eq!(expected.len(), 20);
        assert_eq!(expected.last().map(String::as_str), Some("Churn"));
    }

    #[test]
    fn test_target_encoding_is_fixed() {
        assert_eq!(encode_target("Yes"), 1);
        assert_eq!(encode_target("No"), 0);
        assert_eq!(encode_target("yes"), 0);
        assert_eq!(encode_target(""), 0);
        assert_eq!(encode_target("Maybe"), 0);
    }

    #[test]
    fn test_column_order_is_dataset_order() {
        let schema = ChurnSchema::default();
        let names = schema.column_names();
        assert_eq!(names[0], "gender");
        assert_eq!(names[4], "tenure");
        assert_eq!(names[18], "TotalCharges");
    }

    #[test]
    fn test_schema_roundtrips_through_json() {
        let schema = ChurnSchema::default();
        let json = serde_json::to_string(&schema).unwrap();
        let back: ChurnSchema = serde_json::from_str(&json).unwrap();
        assert_eq!(back, schema);
    }
}
