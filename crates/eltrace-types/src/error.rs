use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Solver diverged at iteration {iteration}: {message}")]
    SolverDiverged { iteration: usize, message: String },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Malformed record in {source_name}: {reason}")]
    MalformedRecord { source_name: String, reason: String },

    #[error("Grid index out of bounds: i={i}, j={j}, k={k}")]
    GridOutOfBounds { i: usize, j: usize, k: usize },

    #[error("Physics constraint violated: {0}")]
    PhysicsViolation(String),

    #[error("Singular linear system: {0}")]
    SingularSystem(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SimError {
    /// Shorthand for a per-record failure tagged with the record's origin.
    pub fn malformed(source_name: impl Into<String>, reason: impl Into<String>) -> Self {
        SimError::MalformedRecord {
            source_name: source_name.into(),
            reason: reason.into(),
        }
    }
}

pub type SimResult<T> = Result<T, SimError>;
