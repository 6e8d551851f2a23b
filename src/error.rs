/// Errors returned by the optimizer, its search space, and its collaborators.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when the lower bound is greater than the upper bound.
    #[error("invalid bounds for '{name}': lower ({lower}) must be less than or equal to upper ({upper})")]
    InvalidBounds {
        /// The parameter name.
        name: String,
        /// The lower bound value.
        lower: f64,
        /// The upper bound value.
        upper: f64,
    },

    /// Returned when a categorical parameter has no allowed values.
    #[error("categorical parameter '{0}' has no allowed values")]
    EmptyChoices(String),

    /// Returned when a search space is built from zero parameters.
    #[error("search space must contain at least one parameter")]
    EmptySpace,

    /// Returned when two parameters share a name.
    #[error("duplicate parameter name '{0}'")]
    DuplicateName(String),

    /// Returned when a name-keyed parameter map contains a name the space does not know.
    #[error("unknown parameter '{0}'")]
    UnknownParameter(String),

    /// Returned when a name-keyed parameter map lacks a parameter of the space.
    #[error("missing value for parameter '{0}'")]
    MissingParameter(String),

    /// Returned when a value does not match its parameter's declared type or domain.
    #[error("type mismatch for parameter '{name}': {reason}")]
    TypeMismatch {
        /// The parameter name.
        name: String,
        /// What was wrong with the value.
        reason: String,
    },

    /// Returned when vectors or matrices have incompatible shapes.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch {
        /// The expected length.
        expected: usize,
        /// The actual length.
        got: usize,
    },

    /// Returned when exactly one of the test features / test targets is supplied.
    #[error("missing value: need to provide both 'x_test' and 'y_test'")]
    MissingValue,

    /// Returned when both an explicit test set and a fold count are supplied.
    #[error("conflicting validation: provide either 'x_test' and 'y_test' or 'n_folds'")]
    ConflictingValidation,

    /// Returned when a fold count cannot split the training data.
    #[error("invalid fold count {n_folds} for {n_samples} samples")]
    InvalidFolds {
        /// The requested number of folds.
        n_folds: usize,
        /// The number of training samples.
        n_samples: usize,
    },

    /// Returned when an acquisition function name is not recognized.
    #[error("unknown acquisition function '{0}'")]
    UnknownAcquisition(String),

    /// Returned when a result is requested before anything was evaluated.
    #[error("no evaluations recorded")]
    NoHistory,

    /// Returned when the surrogate cannot be fitted (e.g. the covariance is not positive definite).
    #[error("surrogate error: {0}")]
    Surrogate(String),

    /// Returned when the model-evaluation collaborator fails.
    #[error("evaluation error: {0}")]
    Evaluation(String),

    /// Returned when an acquisition maximizer cannot be set up.
    #[error("maximizer error: {0}")]
    Maximizer(String),

    /// Returned when an internal invariant is violated.
    #[error("internal error: {0}")]
    Internal(&'static str),
}

pub type Result<T> = core::result::Result<T, Error>;
