use log::debug;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use ndarray_rand::rand::Rng;
use rand_isaac::Isaac64Rng;

use crate::gaussian_mixture::density::GaussianDensity;
use crate::gaussian_mixture::errors::{EmError, Result};
use crate::gaussian_mixture::hyperparams::{EmParams, EmValidParams};

/// One observation: its attribute vector plus the soft membership it
/// currently has in every cluster.
///
/// A point is created once when the input is parsed, with its
/// responsibilities set to the uniform `1/K`, and is then rewritten in place
/// by every expectation step. Points are owned by the engine, never by a
/// cluster; the relation between the two goes through the cluster's stable
/// index.
#[derive(Debug, Clone, PartialEq)]
pub struct DataPoint {
    attributes: Array1<f64>,
    responsibilities: Array1<f64>,
}

impl DataPoint {
    pub fn new(attributes: Array1<f64>, n_clusters: usize) -> DataPoint {
        let responsibilities = Array1::from_elem(n_clusters, 1. / n_clusters as f64);
        DataPoint {
            attributes,
            responsibilities,
        }
    }

    pub fn attributes(&self) -> ArrayView1<f64> {
        self.attributes.view()
    }

    /// Soft membership of this point in `cluster`, looked up through the
    /// cluster's index rather than any container position.
    pub fn responsibility(&self, cluster: &Cluster) -> f64 {
        self.responsibilities[cluster.index]
    }

    pub fn responsibilities(&self) -> ArrayView1<f64> {
        self.responsibilities.view()
    }
}

/// One mixture component: mean vector, covariance matrix and mixing
/// probability, together with the index that correlates it with the
/// responsibility slots of every [`DataPoint`].
#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    index: usize,
    mean: Array1<f64>,
    covariance: Array2<f64>,
    probability: f64,
}

impl Cluster {
    /// Assemble a component by hand, e.g. to seed the engine with a known
    /// starting state. [`EmValidParams::fit`] normally draws the initial
    /// state itself.
    pub fn new(
        index: usize,
        mean: Array1<f64>,
        covariance: Array2<f64>,
        probability: f64,
    ) -> Cluster {
        Cluster {
            index,
            mean,
            covariance,
            probability,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn mean(&self) -> ArrayView1<f64> {
        self.mean.view()
    }

    pub fn covariance(&self) -> ArrayView2<f64> {
        self.covariance.view()
    }

    pub fn probability(&self) -> f64 {
        self.probability
    }

    /// Random symmetric covariance to start a component from: the lower
    /// triangle is sampled and mirrored up, then the diagonal is lifted
    /// above the off-diagonal row sums so the matrix is strictly diagonally
    /// dominant, hence positive definite and invertible for the very first
    /// expectation step. A single feature degenerates to one random
    /// positive variance.
    fn random_covariance(n_features: usize, rng: &mut impl Rng) -> Array2<f64> {
        if n_features == 1 {
            return Array2::from_elem((1, 1), rng.gen_range(0.5..10.));
        }
        let mut covariance = Array2::zeros((n_features, n_features));
        for i in 0..n_features {
            for j in 0..=i {
                let value = rng.gen_range(0.0..3.);
                covariance[(i, j)] = value;
                covariance[(j, i)] = value;
            }
        }
        for i in 0..n_features {
            covariance[(i, i)] += 3. * n_features as f64;
        }
        covariance
    }
}

/// Gaussian Mixture Model estimation with a fixed-count EM loop.
///
/// The engine owns the data points and the clusters and alternates strictly
/// between the two EM phases: an expectation step rewrites every point's
/// responsibilities from the current clusters, then a maximization step
/// rewrites every cluster from the updated responsibilities. Within one
/// iteration no cluster parameter is read after it has been partially
/// rewritten: each cluster's new probability, mean and covariance are
/// accumulated into fresh storage and committed together, with the
/// covariance deviation term taken against the mean of the *previous*
/// iteration.
pub struct EmClustering {
    clusters: Vec<Cluster>,
    points: Vec<DataPoint>,
    n_features: usize,
}

impl EmClustering {
    pub fn params(n_clusters: usize) -> EmParams<Isaac64Rng> {
        EmParams::new(n_clusters)
    }

    pub fn params_with_rng<R: Rng + Clone>(n_clusters: usize, rng: R) -> EmParams<R> {
        EmParams::new_with_rng(n_clusters, rng)
    }

    /// The fitted components, in index order.
    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    pub fn into_clusters(self) -> Vec<Cluster> {
        self.clusters
    }

    /// The data points with their final responsibilities.
    pub fn data_points(&self) -> &[DataPoint] {
        &self.points
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Expectation: rewrite every point's responsibilities from the current
    /// clusters. Each cluster covariance is factorized exactly once and the
    /// factorization reused across all points.
    fn e_step(&mut self, iteration: usize) -> Result<()> {
        let densities = self
            .clusters
            .iter()
            .map(|cluster| {
                GaussianDensity::new(cluster.mean(), cluster.covariance()).map_err(|source| {
                    EmError::SingularMatrix {
                        cluster: cluster.index,
                        iteration,
                        source,
                    }
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let clusters = &self.clusters;
        for point in self.points.iter_mut() {
            let weighted: Vec<f64> = clusters
                .iter()
                .zip(&densities)
                .map(|(cluster, density)| {
                    density.density(point.attributes.view()) * cluster.probability
                })
                .collect();
            // the evidence is computed once per point and shared by all
            // numerators, so the responsibilities of a point sum to one up
            // to rounding; when every density underflows to zero the
            // division yields NaN, which is left to propagate
            let evidence: f64 = weighted.iter().sum();
            for (cluster, numerator) in clusters.iter().zip(&weighted) {
                point.responsibilities[cluster.index] = numerator / evidence;
            }
        }
        Ok(())
    }

    /// Maximization: re-estimate every cluster from the responsibilities
    /// written by the preceding expectation step. All three sums are fully
    /// accumulated before anything is committed onto the cluster, and the
    /// deviation term reads the old mean.
    fn m_step(&mut self, iteration: usize, reg_covar: f64) -> Result<()> {
        let n_samples = self.points.len() as f64;
        let n_features = self.n_features;
        let points = &self.points;

        for cluster in self.clusters.iter_mut() {
            let mut total_responsibility = 0.;
            let mut weighted_sum = Array1::<f64>::zeros(n_features);
            let mut deviation_sum = Array2::<f64>::zeros((n_features, n_features));

            for point in points {
                let responsibility = point.responsibilities[cluster.index];
                total_responsibility += responsibility;
                weighted_sum.scaled_add(responsibility, &point.attributes);
                let diff = &point.attributes - &cluster.mean;
                deviation_sum.scaled_add(responsibility, &outer_product(diff.view()));
            }

            if total_responsibility < 10. * f64::EPSILON {
                return Err(EmError::DegenerateCluster {
                    cluster: cluster.index,
                    iteration,
                });
            }

            let mut covariance = deviation_sum / total_responsibility;
            covariance.diag_mut().mapv_inplace(|x| x + reg_covar);

            cluster.probability = total_responsibility / n_samples;
            cluster.mean = weighted_sum / total_responsibility;
            cluster.covariance = covariance;
        }
        Ok(())
    }
}

impl<R: Rng + Clone> EmValidParams<R> {
    /// Run the fixed-count EM loop from a randomly drawn initial state:
    /// every cluster starts on the attributes of a uniformly sampled data
    /// point (with replacement, so duplicate seeds are permitted), a random
    /// symmetric covariance and the uniform mixing probability `1/K`.
    pub fn fit(&self, points: Vec<DataPoint>) -> Result<EmClustering> {
        let n_features = validate_points(&points, self.n_clusters())?;
        let mut rng = self.rng();

        let clusters = (0..self.n_clusters())
            .map(|index| {
                let seed = points[rng.gen_range(0..points.len())].attributes.clone();
                Cluster {
                    index,
                    mean: seed,
                    covariance: Cluster::random_covariance(n_features, &mut rng),
                    probability: 1. / self.n_clusters() as f64,
                }
            })
            .collect();

        self.fit_with(clusters, points)
    }

    /// Run the loop from caller-provided clusters instead of random ones,
    /// e.g. to reproduce a run exactly or to continue from a known state.
    pub fn fit_with(
        &self,
        clusters: Vec<Cluster>,
        points: Vec<DataPoint>,
    ) -> Result<EmClustering> {
        let n_features = validate_points(&points, self.n_clusters())?;
        validate_clusters(&clusters, self.n_clusters(), n_features)?;

        let mut engine = EmClustering {
            clusters,
            points,
            n_features,
        };
        for iteration in 0..self.n_iterations() {
            engine.e_step(iteration)?;
            engine.m_step(iteration, self.reg_covariance())?;
            debug!("iteration {}/{} complete", iteration + 1, self.n_iterations());
        }
        Ok(engine)
    }
}

fn outer_product(v: ArrayView1<f64>) -> Array2<f64> {
    let column = v.insert_axis(Axis(1));
    column.dot(&column.t())
}

fn validate_points(points: &[DataPoint], n_clusters: usize) -> Result<usize> {
    let first = points
        .first()
        .ok_or_else(|| EmError::InvalidInput("the dataset is empty".to_string()))?;
    let n_features = first.attributes.len();
    if n_features == 0 {
        return Err(EmError::InvalidInput(
            "points must have at least one attribute".to_string(),
        ));
    }
    if points.len() < n_clusters {
        return Err(EmError::InvalidInput(format!(
            "{} points cannot seed {} clusters",
            points.len(),
            n_clusters
        )));
    }
    for (position, point) in points.iter().enumerate() {
        if point.attributes.len() != n_features {
            return Err(EmError::InvalidInput(format!(
                "point {} has {} attributes where the first point has {}",
                position,
                point.attributes.len(),
                n_features
            )));
        }
        if point.responsibilities.len() != n_clusters {
            return Err(EmError::InvalidInput(format!(
                "point {} carries {} responsibility slots for {} clusters",
                position,
                point.responsibilities.len(),
                n_clusters
            )));
        }
    }
    Ok(n_features)
}

fn validate_clusters(clusters: &[Cluster], n_clusters: usize, n_features: usize) -> Result<()> {
    if clusters.len() != n_clusters {
        return Err(EmError::InvalidInput(format!(
            "{} clusters supplied where {} are configured",
            clusters.len(),
            n_clusters
        )));
    }
    let mut seen = vec![false; n_clusters];
    for cluster in clusters {
        if cluster.index >= n_clusters || seen[cluster.index] {
            return Err(EmError::InvalidInput(format!(
                "cluster index {} is out of range or duplicated",
                cluster.index
            )));
        }
        seen[cluster.index] = true;
        if cluster.mean.len() != n_features
            || cluster.covariance.dim() != (n_features, n_features)
        {
            return Err(EmError::InvalidInput(format!(
                "cluster {} does not match the {}-dimensional data",
                cluster.index, n_features
            )));
        }
    }
    Ok(())
}
