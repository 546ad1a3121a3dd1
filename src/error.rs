use std::path::PathBuf;

/// A single problem with one input field.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FieldError {
    #[error("{field}: value is required")]
    Missing { field: &'static str },

    #[error("{field}: value must be a finite number")]
    NotFinite { field: &'static str },

    #[error("{field}: {value} is outside [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("{field}: '{value}' is not one of {expected}")]
    UnknownVariant {
        field: &'static str,
        value: String,
        expected: String,
    },
}

impl FieldError {
    /// Name of the offending input field.
    pub fn field(&self) -> &'static str {
        match self {
            FieldError::Missing { field }
            | FieldError::NotFinite { field }
            | FieldError::OutOfRange { field, .. }
            | FieldError::UnknownVariant { field, .. } => field,
        }
    }
}

/// One or more input fields were missing or outside their domain.
///
/// Every offending field of a record is reported, not just the first.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid input: {}", join_errors(.errors))]
pub struct ValidationError {
    pub errors: Vec<FieldError>,
}

impl ValidationError {
    pub fn new(errors: Vec<FieldError>) -> Self {
        Self { errors }
    }

    /// Names of all offending fields, in report order.
    pub fn fields(&self) -> Vec<&'static str> {
        self.errors.iter().map(FieldError::field).collect()
    }
}

fn join_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// The oracle artifact could not be turned into a usable classifier.
#[derive(Debug, thiserror::Error)]
pub enum OracleLoadError {
    #[error("failed to read model artifact at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("model artifact is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("unsupported artifact format version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("artifact lists {found} columns, expected {expected}")]
    ColumnCount { found: usize, expected: usize },

    #[error("artifact column {position} is '{found}', expected '{expected}' ({detail})")]
    ColumnMismatch {
        position: usize,
        expected: &'static str,
        found: String,
        detail: String,
    },

    #[error("artifact lists no categories for column '{column}'")]
    MissingCategories { column: &'static str },

    #[error("malformed model: {reason}")]
    MalformedModel { reason: String },
}

/// The oracle rejected a well-formed feature vector or broke its output contract.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OracleInferenceError {
    #[error("feature '{column}' has category '{value}' unknown to the model")]
    UnknownCategory { column: &'static str, value: String },

    #[error("feature '{column}' has kind the model does not accept")]
    WrongKind { column: &'static str },

    #[error("feature '{column}' is not finite")]
    NonFiniteFeature { column: &'static str },

    #[error("oracle returned {0}, which is not a probability in [0, 1]")]
    InvalidProbability(f64),

    #[error("oracle failed: {0}")]
    Other(String),
}

/// Score band configuration is unusable.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid score bands: {}", .0.join("; "))]
    InvalidBands(Vec<String>),
}

/// Failure of a single prediction request. No partial result accompanies it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("prediction failed: {0}")]
    Inference(#[from] OracleInferenceError),
}
