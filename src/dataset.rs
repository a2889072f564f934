use ndarray::Array1;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::gaussian_mixture::{DataPoint, EmError, Result};

/// Read whitespace-delimited data points from a text file: one point per
/// line, attributes separated by spaces.
///
/// `n_clusters` sizes the uniform responsibility vector every point starts
/// with. Opening failures surface as the underlying I/O error so the caller
/// can distinguish a missing file from a malformed one.
pub fn read_points<P: AsRef<Path>>(path: P, n_clusters: usize) -> Result<Vec<DataPoint>> {
    let file = File::open(path)?;
    parse_points(BufReader::new(file), n_clusters)
}

/// Parse data points from any buffered reader.
///
/// Extra and trailing spaces are ignored, as are lines containing nothing
/// but whitespace. A token that does not parse as a number fails the whole
/// read and names the offending line and token. Lines are not required to
/// agree on their attribute count here; that invariant is enforced when the
/// points are handed to the engine.
pub fn parse_points<R: BufRead>(reader: R, n_clusters: usize) -> Result<Vec<DataPoint>> {
    let mut points = Vec::new();
    for (number, line) in reader.lines().enumerate() {
        let line = line?;
        let mut attributes = Vec::new();
        for token in line.split_whitespace() {
            let value: f64 = token.parse().map_err(|_| EmError::MalformedRecord {
                line: number + 1,
                token: token.to_string(),
            })?;
            attributes.push(value);
        }
        if attributes.is_empty() {
            continue;
        }
        points.push(DataPoint::new(Array1::from(attributes), n_clusters));
    }
    Ok(points)
}
