use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::info;

use super::model::Model;
use super::ScoreOracle;
use crate::error::{OracleInferenceError, OracleLoadError};
use crate::features::{Feature, FeatureValue, FeatureVector, FEATURE_COUNT};

/// Artifact format this build understands.
pub const FORMAT_VERSION: u32 = 1;

/// On-disk JSON form of an exported classifier.
///
/// Example:
/// ```json
/// {
///   "format_version": 1,
///   "columns": ["repayment_curr_ratio", "...", "employment_status_clients"],
///   "categories": {
///     "bank_account_type": ["Other", "Savings", "Current"],
///     "employment_status_clients": ["Permanent", "Unknown", "..."]
///   },
///   "model": { "kind": "logistic", "intercept": 0.2, "coefficients": [...] }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Artifact {
    pub format_version: u32,
    /// Training column names, in positional order.
    pub columns: Vec<String>,
    /// Ordinal encoding of each categorical column: a value is encoded as its
    /// index in this list.
    pub categories: BTreeMap<String, Vec<String>>,
    pub model: Model,
}

/// The artifact must list every training column, in feature order. The first
/// out-of-place column is reported along with where it belongs.
fn check_columns(columns: &[String]) -> Result<(), OracleLoadError> {
    if columns.len() != FEATURE_COUNT {
        return Err(OracleLoadError::ColumnCount {
            found: columns.len(),
            expected: FEATURE_COUNT,
        });
    }

    let mismatch = Feature::ALL
        .iter()
        .zip(columns)
        .enumerate()
        .find(|(_, (feature, column))| feature.column() != column.as_str());
    let Some((position, (feature, column))) = mismatch else {
        return Ok(());
    };

    let detail = match Feature::from_column(column) {
        Some(other) => format!("that column belongs at position {}", other.index()),
        None => "not a known training column".to_string(),
    };
    Err(OracleLoadError::ColumnMismatch {
        position,
        expected: feature.column(),
        found: column.clone(),
        detail,
    })
}

/// Classifier loaded from an [`Artifact`] file.
#[derive(Debug, Clone)]
pub struct ArtifactOracle {
    model: Model,
    bank_account_types: Vec<String>,
    employment_statuses: Vec<String>,
}

impl ArtifactOracle {
    /// Read and check the artifact at `path`.
    pub fn load(path: &Path) -> Result<Self, OracleLoadError> {
        let content = fs::read_to_string(path).map_err(|source| OracleLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let oracle = Self::from_json(&content)?;
        info!(
            path = %path.display(),
            model = %oracle.model.describe(),
            "Loaded model artifact"
        );
        Ok(oracle)
    }

    pub fn from_json(json: &str) -> Result<Self, OracleLoadError> {
        let artifact: Artifact = serde_json::from_str(json)?;
        Self::from_artifact(artifact)
    }

    pub fn from_artifact(mut artifact: Artifact) -> Result<Self, OracleLoadError> {
        if artifact.format_version != FORMAT_VERSION {
            return Err(OracleLoadError::UnsupportedVersion {
                found: artifact.format_version,
                expected: FORMAT_VERSION,
            });
        }

        check_columns(&artifact.columns)?;

        artifact.model.validate(FEATURE_COUNT)?;

        let mut take_categories = |feature: Feature| {
            artifact
                .categories
                .remove(feature.column())
                .filter(|values| !values.is_empty())
                .ok_or(OracleLoadError::MissingCategories {
                    column: feature.column(),
                })
        };
        let bank_account_types = take_categories(Feature::BankAccountType)?;
        let employment_statuses = take_categories(Feature::EmploymentStatus)?;

        Ok(Self {
            model: artifact.model,
            bank_account_types,
            employment_statuses,
        })
    }

    /// Turn a feature vector into the numeric row the model evaluates.
    pub fn encode(&self, features: &FeatureVector) -> Result<Vec<f64>, OracleInferenceError> {
        features
            .iter()
            .map(|(feature, value)| self.encode_value(feature, value))
            .collect()
    }

    fn encode_value(
        &self,
        feature: Feature,
        value: FeatureValue,
    ) -> Result<f64, OracleInferenceError> {
        let column = feature.column();
        match (feature.is_categorical(), value) {
            (false, FeatureValue::Numeric(v)) if v.is_finite() => Ok(v),
            (false, FeatureValue::Numeric(_)) => {
                Err(OracleInferenceError::NonFiniteFeature { column })
            }
            (true, FeatureValue::Categorical(label)) => {
                let categories = match feature {
                    Feature::BankAccountType => &self.bank_account_types,
                    _ => &self.employment_statuses,
                };
                categories
                    .iter()
                    .position(|c| c == label)
                    .map(|i| i as f64)
                    .ok_or_else(|| OracleInferenceError::UnknownCategory {
                        column,
                        value: label.to_string(),
                    })
            }
            _ => Err(OracleInferenceError::WrongKind { column }),
        }
    }
}

impl ScoreOracle for ArtifactOracle {
    fn predict_proba(&self, features: &FeatureVector) -> Result<f64, OracleInferenceError> {
        let row = self.encode(features)?;
        Ok(self.model.predict_proba(&row))
    }

    fn describe(&self) -> String {
        self.model.describe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::derive_features;
    use crate::input::{BankAccountType, EmploymentStatus, RawInput};
    use crate::oracle::{DecisionTree, LogisticModel, Node, TreeEnsemble};
    use std::io::Write;

    fn columns() -> Vec<String> {
        Feature::ALL.iter().map(|f| f.column().to_string()).collect()
    }

    fn categories() -> BTreeMap<String, Vec<String>> {
        let mut map = BTreeMap::new();
        map.insert(
            "bank_account_type".to_string(),
            BankAccountType::ALL.iter().map(|b| b.to_string()).collect(),
        );
        map.insert(
            "employment_status_clients".to_string(),
            EmploymentStatus::ALL.iter().map(|e| e.to_string()).collect(),
        );
        map
    }

    fn logistic_artifact(coefficients: Vec<f64>) -> Artifact {
        Artifact {
            format_version: FORMAT_VERSION,
            columns: columns(),
            categories: categories(),
            model: Model::Logistic(LogisticModel {
                intercept: 0.0,
                coefficients,
            }),
        }
    }

    #[test]
    fn test_zero_model_predicts_half() {
        let oracle = ArtifactOracle::from_artifact(logistic_artifact(vec![0.0; 14])).unwrap();
        let fv = derive_features(&RawInput::default()).unwrap();
        assert_eq!(oracle.predict_proba(&fv).unwrap(), 0.5);
    }

    #[test]
    fn test_encoding_is_positional_with_ordinal_categories() {
        let oracle = ArtifactOracle::from_artifact(logistic_artifact(vec![0.0; 14])).unwrap();
        let input = RawInput {
            bank_account_type: BankAccountType::Current,
            employment_status: EmploymentStatus::Contract,
            ..RawInput::default()
        };
        let row = oracle.encode(&derive_features(&input).unwrap()).unwrap();

        assert_eq!(row.len(), 14);
        assert_eq!(row[0], 1.0);
        assert_eq!(row[6], 30.0);
        assert_eq!(row[8], 8100.0);
        assert_eq!(row[9], 2_500_000_000.0);
        assert_eq!(row[12], 2.0);
        assert_eq!(row[13], 6.0);
    }

    #[test]
    fn test_unknown_category_is_an_inference_error() {
        let mut artifact = logistic_artifact(vec![0.0; 14]);
        artifact
            .categories
            .insert("bank_account_type".to_string(), vec!["Savings".to_string()]);
        let oracle = ArtifactOracle::from_artifact(artifact).unwrap();

        let err = oracle
            .predict_proba(&derive_features(&RawInput::default()).unwrap())
            .unwrap_err();
        assert_eq!(
            err,
            OracleInferenceError::UnknownCategory {
                column: "bank_account_type",
                value: "Other".to_string()
            }
        );
    }

    #[test]
    fn test_column_mismatch_fails_load() {
        let mut artifact = logistic_artifact(vec![0.0; 14]);
        artifact.columns[9] = "sq_loanamount".to_string();
        let err = ArtifactOracle::from_artifact(artifact).unwrap_err();
        match &err {
            OracleLoadError::ColumnMismatch {
                position,
                expected,
                found,
                detail,
            } => {
                assert_eq!(*position, 9);
                assert_eq!(*expected, "sqrt_loanamount");
                assert_eq!(found, "sq_loanamount");
                assert_eq!(detail, "not a known training column");
            }
            other => panic!("expected ColumnMismatch, got {:?}", other),
        }
        assert!(err.to_string().contains("column 9 is 'sq_loanamount'"));
    }

    #[test]
    fn test_reordered_columns_fail_load() {
        let mut artifact = logistic_artifact(vec![0.0; 14]);
        artifact.columns.swap(0, 1);
        let err = ArtifactOracle::from_artifact(artifact).unwrap_err();
        match err {
            OracleLoadError::ColumnMismatch {
                position,
                expected,
                found,
                detail,
            } => {
                assert_eq!(position, 0);
                assert_eq!(expected, "repayment_curr_ratio");
                assert_eq!(found, "num_prev_loans");
                assert_eq!(detail, "that column belongs at position 1");
            }
            other => panic!("expected ColumnMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_column_fails_load() {
        let mut artifact = logistic_artifact(vec![0.0; 14]);
        artifact.columns.pop();
        assert!(matches!(
            ArtifactOracle::from_artifact(artifact),
            Err(OracleLoadError::ColumnCount {
                found: 13,
                expected: 14
            })
        ));
    }

    #[test]
    fn test_missing_categories_fail_load() {
        let mut artifact = logistic_artifact(vec![0.0; 14]);
        artifact.categories.remove("employment_status_clients");
        let err = ArtifactOracle::from_artifact(artifact).unwrap_err();
        assert!(matches!(
            err,
            OracleLoadError::MissingCategories {
                column: "employment_status_clients"
            }
        ));
    }

    #[test]
    fn test_unsupported_version() {
        let mut artifact = logistic_artifact(vec![0.0; 14]);
        artifact.format_version = 2;
        assert!(matches!(
            ArtifactOracle::from_artifact(artifact),
            Err(OracleLoadError::UnsupportedVersion { found: 2, expected: 1 })
        ));
    }

    #[test]
    fn test_load_from_file() {
        let artifact = Artifact {
            model: Model::GradientBoosting(TreeEnsemble {
                learning_rate: 1.0,
                init_score: 0.0,
                // age <= 40 -> +2, else -2
                trees: vec![DecisionTree {
                    nodes: vec![
                        Node::Split {
                            feature: Feature::Age.index(),
                            threshold: 40.0,
                            left: 1,
                            right: 2,
                        },
                        Node::Leaf(2.0),
                        Node::Leaf(-2.0),
                    ],
                }],
            }),
            ..logistic_artifact(vec![])
        };
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(serde_json::to_string(&artifact).unwrap().as_bytes())
            .unwrap();

        let oracle = ArtifactOracle::load(file.path()).unwrap();
        let young = derive_features(&RawInput::default()).unwrap();
        let old = derive_features(&RawInput {
            age: 70,
            ..RawInput::default()
        })
        .unwrap();

        let p_young = oracle.predict_proba(&young).unwrap();
        let p_old = oracle.predict_proba(&old).unwrap();
        assert!((p_young - crate::oracle::logistic(2.0)).abs() < 1e-12);
        assert!(p_old < 0.5 && p_young > 0.5);
        assert!(oracle.describe().contains("1 trees"));
    }

    #[test]
    fn test_missing_file() {
        let err = ArtifactOracle::load(Path::new("/nonexistent/model.json")).unwrap_err();
        assert!(matches!(err, OracleLoadError::Io { .. }));
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            ArtifactOracle::from_json("{ not json"),
            Err(OracleLoadError::Parse(_))
        ));
    }
}
