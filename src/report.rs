use linfa_linalg::eigh::EighInto;
use ndarray::{Array1, Array2, ArrayView1};
use ndarray_stats::QuantileExt;
use std::io::Write;

use crate::gaussian_mixture::{Cluster, Result};

/// Eigen summary of one fitted cluster, for display and plotting: the
/// covariance is decomposed into real eigenvalues and eigenvectors, and the
/// dominant eigenvector (largest eigenvalue) gives the component's
/// orientation against the second coordinate axis.
#[derive(Debug, Clone)]
pub struct ClusterReport {
    pub mean: Array1<f64>,
    pub eigenvalues: Array1<f64>,
    /// Columns are eigenvectors, aligned with `eigenvalues`.
    pub eigenvectors: Array2<f64>,
    /// Orientation of the dominant eigenvector in degrees, zero in one
    /// dimension where no orientation exists.
    pub angle_degrees: f64,
}

/// Decompose a cluster's covariance for reporting. This is post-processing
/// of the estimation result and plays no part in the EM loop itself.
pub fn cluster_report(cluster: &Cluster) -> Result<ClusterReport> {
    let (eigenvalues, eigenvectors) = cluster.covariance().to_owned().eigh_into()?;
    let dominant = eigenvectors.column(eigenvalues.argmax()?);
    let angle_degrees = if dominant.len() > 1 {
        (dominant[1] / magnitude(dominant)).acos().to_degrees()
    } else {
        0.
    };
    Ok(ClusterReport {
        mean: cluster.mean().to_owned(),
        angle_degrees,
        eigenvalues,
        eigenvectors,
    })
}

fn magnitude(v: ArrayView1<f64>) -> f64 {
    v.dot(&v).sqrt()
}

fn by_index(clusters: &[Cluster]) -> Vec<&Cluster> {
    let mut ordered: Vec<&Cluster> = clusters.iter().collect();
    ordered.sort_by_key(|cluster| cluster.index());
    ordered
}

/// Human-readable report: one block per cluster in index order with the
/// 1-based ordinal, mean components, eigenvalues, orientation angle and the
/// full list of eigenvectors.
pub fn write_formatted<W: Write>(mut writer: W, clusters: &[Cluster]) -> Result<()> {
    for cluster in by_index(clusters) {
        let report = cluster_report(cluster)?;
        writeln!(writer, "{}. Cluster:", cluster.index() + 1)?;
        writeln!(writer, "- Mean:")?;
        for value in report.mean.iter() {
            writeln!(writer, "  - {}", value)?;
        }
        writeln!(writer, "- RealEigenvalues:")?;
        for value in report.eigenvalues.iter() {
            writeln!(writer, "  - {}", value)?;
        }
        writeln!(writer, "- AngleDegree: {}", report.angle_degrees)?;
        writeln!(writer, "- Eigenvectors:")?;
        for vector in report.eigenvectors.columns() {
            let parts: Vec<String> = vector.iter().map(|v| v.to_string()).collect();
            writeln!(writer, "  - [{}]", parts.join("; "))?;
        }
        writeln!(writer)?;
    }
    Ok(())
}

/// Compact report for downstream plotting tools: one line per cluster in
/// index order, holding means, eigenvalues and the orientation angle,
/// space-separated.
pub fn write_compact<W: Write>(mut writer: W, clusters: &[Cluster]) -> Result<()> {
    for cluster in by_index(clusters) {
        let report = cluster_report(cluster)?;
        let mut fields: Vec<String> = report.mean.iter().map(|v| v.to_string()).collect();
        fields.extend(report.eigenvalues.iter().map(|v| v.to_string()));
        fields.push(report.angle_degrees.to_string());
        writeln!(writer, "{}", fields.join(" "))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn diagonal_covariance_reports_its_diagonal() {
        let cluster = Cluster::new(0, array![1., 2.], array![[4., 0.], [0., 1.]], 1.0);
        let report = cluster_report(&cluster).unwrap();

        let mut eigenvalues: Vec<f64> = report.eigenvalues.to_vec();
        eigenvalues.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_abs_diff_eq!(eigenvalues[0], 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(eigenvalues[1], 4.0, epsilon = 1e-9);

        // dominant axis is the first coordinate, orthogonal to the second
        assert_abs_diff_eq!(report.angle_degrees, 90.0, epsilon = 1e-6);
    }

    #[test]
    fn one_dimensional_covariance_has_no_angle() {
        let cluster = Cluster::new(0, array![3.], array![[2.5]], 1.0);
        let report = cluster_report(&cluster).unwrap();
        assert_abs_diff_eq!(report.eigenvalues[0], 2.5, epsilon = 1e-9);
        assert_eq!(report.angle_degrees, 0.);
    }

    #[test]
    fn compact_report_is_one_line_per_cluster() {
        let clusters = vec![
            Cluster::new(0, array![0., 0.], array![[1., 0.], [0., 2.]], 0.5),
            Cluster::new(1, array![5., 5.], array![[2., 0.], [0., 1.]], 0.5),
        ];
        let mut buffer = Vec::new();
        write_compact(&mut buffer, &clusters).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        for line in lines {
            // two means, two eigenvalues, one angle
            assert_eq!(line.split_whitespace().count(), 5);
        }
    }

    #[test]
    fn formatted_report_orders_clusters_by_index() {
        let clusters = vec![
            Cluster::new(1, array![5.], array![[1.]], 0.5),
            Cluster::new(0, array![-5.], array![[1.]], 0.5),
        ];
        let mut buffer = Vec::new();
        write_formatted(&mut buffer, &clusters).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let first = text.find("1. Cluster:").unwrap();
        let second = text.find("2. Cluster:").unwrap();
        assert!(first < second);
        assert!(text.find("-5").unwrap() < text.find("AngleDegree").unwrap());
    }
}
