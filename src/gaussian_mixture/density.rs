use linfa_linalg::cholesky::Cholesky;
use linfa_linalg::triangular::{SolveTriangularInplace, UPLO};
use linfa_linalg::LinalgError;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use std::f64::consts::PI;

use crate::gaussian_mixture::errors::Result;

/// Multivariate normal density with the covariance factorized once up front,
/// so the same distribution can be evaluated against many points without
/// decomposing again.
///
/// The Cholesky factor supplies both the precision matrix (through a
/// triangular solve against the identity) and the determinant (squared
/// product of the factor diagonal), so a single decomposition covers the
/// whole evaluation.
#[derive(Debug, Clone)]
pub struct GaussianDensity {
    mean: Array1<f64>,
    precision: Array2<f64>,
    norm: f64,
}

impl GaussianDensity {
    /// Factorize `covariance` and capture everything needed for repeated
    /// evaluations. Fails when the covariance is not positive definite.
    pub fn new(
        mean: ArrayView1<f64>,
        covariance: ArrayView2<f64>,
    ) -> std::result::Result<GaussianDensity, LinalgError> {
        let n_features = mean.len();
        let decomp = covariance.cholesky()?;
        let determinant = decomp.diag().product().powi(2);
        let inv_lower = decomp.solve_triangular_into(Array2::eye(n_features), UPLO::Lower)?;
        let precision = inv_lower.t().dot(&inv_lower);

        Ok(GaussianDensity {
            mean: mean.to_owned(),
            precision,
            norm: ((2. * PI).powi(n_features as i32) * determinant)
                .sqrt()
                .recip(),
        })
    }

    /// Density of `x` under this distribution. Pure, non-negative.
    pub fn density(&self, x: ArrayView1<f64>) -> f64 {
        let diff = &x - &self.mean;
        let exponent = -0.5 * diff.dot(&self.precision.dot(&diff));
        exponent.exp() * self.norm
    }
}

/// Probability density of `x` under a normal distribution with the given
/// mean and covariance.
///
/// The one-dimensional case short-circuits to the closed form
/// `exp(-(x-m)^2 / 2v) / sqrt(2 pi v)` without touching the matrix
/// machinery; anything larger goes through the factorized path.
pub fn multivariate_gaussian(
    x: ArrayView1<f64>,
    mean: ArrayView1<f64>,
    covariance: ArrayView2<f64>,
) -> Result<f64> {
    if mean.len() == 1 {
        let variance = covariance[(0, 0)];
        let diff = x[0] - mean[0];
        Ok((-diff * diff / (2. * variance)).exp() / (2. * PI * variance).sqrt())
    } else {
        let density = GaussianDensity::new(mean, covariance)?;
        Ok(density.density(x))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn standard_normal_integrates_to_one() {
        let mean = array![0.];
        let covariance = array![[1.]];
        let step = 0.01;
        let mut total = 0.;
        let mut x = -8.;
        while x < 8. {
            total +=
                multivariate_gaussian(array![x].view(), mean.view(), covariance.view()).unwrap()
                    * step;
            x += step;
        }
        assert_abs_diff_eq!(total, 1.0, epsilon = 1e-4);
    }

    #[test]
    fn density_is_non_negative() {
        let mean = array![1.0, -2.0];
        let covariance = array![[2.0, 0.3], [0.3, 1.0]];
        let density = GaussianDensity::new(mean.view(), covariance.view()).unwrap();
        for x in [
            array![0., 0.],
            array![10., -10.],
            array![-3.5, 7.25],
            array![1.0, -2.0],
        ] {
            assert!(density.density(x.view()) >= 0.);
        }
    }

    #[test]
    fn bivariate_standard_normal_at_origin() {
        let mean = array![0., 0.];
        let covariance = array![[1., 0.], [0., 1.]];
        let value =
            multivariate_gaussian(mean.view(), mean.view(), covariance.view()).unwrap();
        assert_abs_diff_eq!(value, 1. / (2. * PI), epsilon = 1e-12);
    }

    #[test]
    fn scalar_and_matrix_paths_agree() {
        let mean = array![0.7];
        let covariance = array![[2.5]];
        let factorized = GaussianDensity::new(mean.view(), covariance.view()).unwrap();
        for x in [-3.0, 0.0, 0.7, 1.3, 6.0] {
            let closed_form =
                multivariate_gaussian(array![x].view(), mean.view(), covariance.view()).unwrap();
            assert_abs_diff_eq!(
                closed_form,
                factorized.density(array![x].view()),
                epsilon = 1e-12
            );
        }
    }

    #[test]
    fn indefinite_covariance_is_rejected() {
        // eigenvalues 3 and -1, so no Cholesky factor exists
        let mean = array![0., 0.];
        let covariance = array![[1., 2.], [2., 1.]];
        assert!(GaussianDensity::new(mean.view(), covariance.view()).is_err());
        assert!(multivariate_gaussian(mean.view(), mean.view(), covariance.view()).is_err());
    }
}
