use ndarray_rand::rand::{Rng, SeedableRng};
use rand_isaac::Isaac64Rng;

use crate::gaussian_mixture::errors::{EmError, Result};

/// The checked set of hyperparameters for the
/// [EM engine](struct.EmClustering.html). Obtained through
/// [`EmParams::check`](struct.EmParams.html#method.check).
#[derive(Clone, Debug)]
pub struct EmValidParams<R: Rng> {
    n_clusters: usize,
    n_iterations: usize,
    reg_covar: f64,
    rng: R,
}

impl<R: Rng + Clone> EmValidParams<R> {
    pub fn n_clusters(&self) -> usize {
        self.n_clusters
    }

    pub fn n_iterations(&self) -> usize {
        self.n_iterations
    }

    pub fn reg_covariance(&self) -> f64 {
        self.reg_covar
    }

    pub fn rng(&self) -> R {
        self.rng.clone()
    }
}

/// The set of hyperparameters that can be specified for the execution of
/// the [EM algorithm](struct.EmClustering.html).
#[derive(Clone, Debug)]
pub struct EmParams<R: Rng>(EmValidParams<R>);

impl EmParams<Isaac64Rng> {
    pub fn new(n_clusters: usize) -> EmParams<Isaac64Rng> {
        Self::new_with_rng(n_clusters, Isaac64Rng::seed_from_u64(42))
    }
}

impl<R: Rng + Clone> EmParams<R> {
    pub fn new_with_rng(n_clusters: usize, rng: R) -> EmParams<R> {
        Self(EmValidParams {
            n_clusters,
            n_iterations: 100,
            reg_covar: 1e-6,
            rng,
        })
    }

    /// Set the number of EM iterations to run. There is no convergence
    /// check: the engine always runs the full count. Zero is permitted and
    /// leaves the model at its initialized state.
    pub fn n_iterations(mut self, n_iterations: usize) -> Self {
        self.0.n_iterations = n_iterations;
        self
    }

    /// Non-negative regularization added to the diagonal of every covariance
    /// estimate. Keeps the covariances invertible when a cluster collapses
    /// onto few points.
    pub fn reg_covariance(mut self, reg_covar: f64) -> Self {
        self.0.reg_covar = reg_covar;
        self
    }

    /// Swap the random generator used to draw the initial clusters.
    pub fn with_rng<R2: Rng + Clone>(self, rng: R2) -> EmParams<R2> {
        EmParams(EmValidParams {
            n_clusters: self.0.n_clusters,
            n_iterations: self.0.n_iterations,
            reg_covar: self.0.reg_covar,
            rng,
        })
    }

    pub fn check(self) -> Result<EmValidParams<R>> {
        if self.0.n_clusters == 0 {
            Err(EmError::InvalidInput(
                "`n_clusters` cannot be 0".to_string(),
            ))
        } else if self.0.reg_covar < 0. {
            Err(EmError::InvalidInput(
                "`reg_covariance` must not be negative".to_string(),
            ))
        } else {
            Ok(self.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_parameters() {
        let params = EmParams::new(3).check().unwrap();
        assert_eq!(params.n_clusters(), 3);
        assert_eq!(params.n_iterations(), 100);
        assert!(params.reg_covariance() > 0.);
    }

    #[test]
    fn zero_clusters_rejected() {
        assert!(EmParams::new(0).check().is_err());
    }

    #[test]
    fn negative_regularization_rejected() {
        assert!(EmParams::new(2).reg_covariance(-1e-6).check().is_err());
    }

    #[test]
    fn zero_iterations_allowed() {
        assert!(EmParams::new(2).n_iterations(0).check().is_ok());
    }
}
