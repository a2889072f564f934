use linfa_linalg::LinalgError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, EmError>;

/// An error raised while estimating a Gaussian mixture
#[derive(Error, Debug)]
pub enum EmError {
    /// The dataset and the hyperparameters cannot form a valid engine:
    /// empty input, zero clusters, inconsistent dimensionality
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// A record of the input file holds a token that is not a number
    #[error("Malformed record on line {line}: {token:?} does not parse as a number")]
    MalformedRecord { line: usize, token: String },
    /// A cluster covariance stopped being invertible during density
    /// evaluation. This is a numerical degeneracy, not user error; consider
    /// increasing the covariance regularization.
    #[error("Covariance of cluster {cluster} is singular at iteration {iteration}: {source}")]
    SingularMatrix {
        cluster: usize,
        iteration: usize,
        #[source]
        source: LinalgError,
    },
    /// A cluster's accumulated responsibility underflowed to zero in the
    /// maximization step, so its parameters can no longer be re-estimated
    #[error(
        "Cluster {cluster} has no responsibility mass left at iteration {iteration}. \
         Consider decreasing the number of clusters or changing the initialization."
    )]
    DegenerateCluster { cluster: usize, iteration: usize },
    /// Errors from linear algebra on caller-supplied matrices
    #[error(transparent)]
    Linalg(#[from] LinalgError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    MinMaxError(#[from] ndarray_stats::errors::MinMaxError),
}
