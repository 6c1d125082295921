use thiserror::Error;

/// Errors raised by the bordered-linear-solver core itself.
///
/// Inner-solver non-convergence and Schur/denominator degeneracy are *not*
/// represented here: per the solver contract they surface through the
/// `converged` flag and (possibly non-finite) values of a [`crate::BlsSolution`],
/// never as an `Err`. Only programmer errors (bad configuration, mismatched
/// block sizes) are fatal.
#[derive(Error, Debug)]
pub enum BlsError {
    #[error("invalid bordered-solver configuration: {0}")]
    Configuration(String),

    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },
}

impl BlsError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn dimension_mismatch(expected: usize, found: usize) -> Self {
        Self::DimensionMismatch { expected, found }
    }
}

pub type Result<T> = std::result::Result<T, BlsError>;
