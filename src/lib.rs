//! `em-clustering` estimates the parameters of a Gaussian Mixture Model from
//! unlabeled multi-dimensional data with the Expectation-Maximization (EM)
//! algorithm.
//!
//! ## The big picture
//!
//! Given a fixed number of clusters `K` and `N` data points of `D` real-valued
//! attributes each, the engine iterates a fixed number of times between:
//!
//! 1. Expectation step: for every point, recompute the *responsibility* each
//!    cluster has for it, i.e. the posterior probability that the cluster
//!    generated the point under the current model.
//! 2. Maximization step: for every cluster, re-estimate mean, covariance and
//!    mixing probability from the responsibilities just computed.
//!
//! There is no convergence check; the loop bound is the sole termination
//! condition. Initialization samples cluster means from the dataset, so the
//! random generator is injectable (and seedable) to make runs reproducible.
//!
//! Beyond the engine itself the crate ships the surrounding plumbing:
//! [`read_points`]/[`parse_points`] turn whitespace-delimited text into data
//! points, and [`write_formatted`]/[`write_compact`] render the fitted
//! clusters through an eigen-decomposition of their covariances.
//!
//! ```no_run
//! use em_clustering::{DataPoint, EmClustering};
//! use ndarray::array;
//!
//! # fn main() -> Result<(), em_clustering::EmError> {
//! let points = vec![
//!     DataPoint::new(array![-5.1], 2),
//!     DataPoint::new(array![-4.9], 2),
//!     DataPoint::new(array![5.0], 2),
//!     DataPoint::new(array![5.1], 2),
//! ];
//!
//! let model = EmClustering::params(2)
//!     .n_iterations(25)
//!     .check()?
//!     .fit(points)?;
//!
//! for cluster in model.clusters() {
//!     println!("mean = {}, weight = {}", cluster.mean(), cluster.probability());
//! }
//! # Ok(())
//! # }
//! ```

mod dataset;
mod gaussian_mixture;
mod report;

pub use dataset::*;
pub use gaussian_mixture::*;
pub use report::*;
