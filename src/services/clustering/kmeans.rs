use super::metrics::compute_inertia;
use super::types::DataPoint;
use crate::error::EngineError;

/// Min-max normalization of both axes to [0, 1]. Clustering runs in scaled
/// space; reported centroids are inverse-transformed, and the inverse of a
/// scaled mean is the original-space mean, so the centroid contract holds.
#[derive(Debug, Clone, Copy)]
pub struct MinMaxScaler {
    min_x: f64,
    range_x: f64,
    min_y: f64,
    range_y: f64,
}

impl MinMaxScaler {
    pub fn fit(points: &[DataPoint]) -> Self {
        let mut min_x = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_y = f64::NEG_INFINITY;
        for p in points {
            min_x = min_x.min(p.x);
            max_x = max_x.max(p.x);
            min_y = min_y.min(p.y);
            max_y = max_y.max(p.y);
        }
        Self {
            min_x,
            range_x: max_x - min_x,
            min_y,
            range_y: max_y - min_y,
        }
    }

    /// A zero-range axis pins to 0.0 instead of dividing by zero.
    pub fn transform(&self, p: DataPoint) -> DataPoint {
        DataPoint {
            x: if self.range_x > 0.0 {
                (p.x - self.min_x) / self.range_x
            } else {
                0.0
            },
            y: if self.range_y > 0.0 {
                (p.y - self.min_y) / self.range_y
            } else {
                0.0
            },
        }
    }

    pub fn inverse(&self, p: DataPoint) -> DataPoint {
        DataPoint {
            x: p.x * self.range_x + self.min_x,
            y: p.y * self.range_y + self.min_y,
        }
    }

    pub fn transform_all(&self, points: &[DataPoint]) -> Vec<DataPoint> {
        points.iter().map(|p| self.transform(*p)).collect()
    }
}

/// A fitted clustering in whatever coordinate space the points came in.
#[derive(Debug, Clone)]
pub struct KMeansFit {
    pub labels: Vec<usize>,
    pub centroids: Vec<DataPoint>,
    pub inertia: f64,
}

/// Lloyd's k-means with fully deterministic initialization: no RNG anywhere,
/// so identical inputs produce bit-identical fits.
pub struct KMeansEngine {
    max_iterations: usize,
}

impl KMeansEngine {
    pub fn new(max_iterations: usize) -> Self {
        Self { max_iterations }
    }

    pub fn fit(&self, points: &[DataPoint], k: usize) -> Result<KMeansFit, EngineError> {
        let distinct = distinct_points(points);
        if k == 0 || distinct.len() < k {
            return Err(EngineError::InsufficientData(format!(
                "need at least {} distinct points for k={}, found {}",
                k.max(1),
                k,
                distinct.len()
            )));
        }

        Ok(self.lloyd(points, initial_centroids(&distinct, k)))
    }

    /// Fit from caller-supplied starting centroids (warm start). Lloyd's
    /// iteration never increases its objective, so the result's inertia is
    /// bounded by the inertia of the starting configuration.
    pub fn fit_from(&self, points: &[DataPoint], centroids: Vec<DataPoint>) -> KMeansFit {
        self.lloyd(points, centroids)
    }

    fn lloyd(&self, points: &[DataPoint], mut centroids: Vec<DataPoint>) -> KMeansFit {
        let mut labels: Vec<usize> = points
            .iter()
            .map(|p| nearest_centroid(p, &centroids))
            .collect();

        for iteration in 0..self.max_iterations {
            centroids = update_centroids(points, &labels, centroids);

            let mut changed = false;
            for (i, p) in points.iter().enumerate() {
                let nearest = nearest_centroid(p, &centroids);
                if nearest != labels[i] {
                    labels[i] = nearest;
                    changed = true;
                }
            }

            if !changed {
                tracing::debug!("k-means converged after {} iterations", iteration + 1);
                break;
            }
        }

        // The iteration bound can leave centroids one update behind the
        // final assignment; settle them so each is the mean of its points.
        centroids = update_centroids(points, &labels, centroids);
        let inertia = compute_inertia(points, &labels, &centroids);

        KMeansFit {
            labels,
            centroids,
            inertia,
        }
    }
}

/// Assignment step: nearest centroid by Euclidean distance, ties broken by
/// lowest cluster index.
fn nearest_centroid(point: &DataPoint, centroids: &[DataPoint]) -> usize {
    let mut best = 0;
    let mut best_dist = f64::INFINITY;
    for (idx, centroid) in centroids.iter().enumerate() {
        let dist = point.distance_sq(centroid);
        if dist < best_dist {
            best_dist = dist;
            best = idx;
        }
    }
    best
}

/// Update step: each centroid becomes the mean of its assigned points. A
/// centroid with no points retains its previous position.
fn update_centroids(
    points: &[DataPoint],
    labels: &[usize],
    previous: Vec<DataPoint>,
) -> Vec<DataPoint> {
    let k = previous.len();
    let mut sums = vec![DataPoint { x: 0.0, y: 0.0 }; k];
    let mut counts = vec![0usize; k];

    for (p, &label) in points.iter().zip(labels) {
        sums[label].x += p.x;
        sums[label].y += p.y;
        counts[label] += 1;
    }

    previous
        .into_iter()
        .enumerate()
        .map(|(idx, old)| {
            if counts[idx] > 0 {
                DataPoint {
                    x: sums[idx].x / counts[idx] as f64,
                    y: sums[idx].y / counts[idx] as f64,
                }
            } else {
                old
            }
        })
        .collect()
}

/// Distinct points sorted lexicographically by (x, y).
pub fn distinct_points(points: &[DataPoint]) -> Vec<DataPoint> {
    let mut distinct = points.to_vec();
    distinct.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    distinct.dedup_by(|a, b| a.x == b.x && a.y == b.y);
    distinct
}

/// k centroids picked evenly spaced by index over the sorted distinct
/// points; k = 1 takes the middle point.
fn initial_centroids(distinct: &[DataPoint], k: usize) -> Vec<DataPoint> {
    let d = distinct.len();
    if k == 1 {
        return vec![distinct[d / 2]];
    }
    (0..k).map(|i| distinct[i * (d - 1) / (k - 1)]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> DataPoint {
        DataPoint { x, y }
    }

    fn two_blobs() -> Vec<DataPoint> {
        vec![p(1.0, 1.0), p(1.1, 0.9), p(10.0, 10.0), p(10.1, 9.9)]
    }

    #[test]
    fn scaler_round_trips() {
        let points = two_blobs();
        let scaler = MinMaxScaler::fit(&points);
        let scaled = scaler.transform(p(10.1, 9.9));
        assert!((scaled.x - 1.0).abs() < 1e-12);
        let back = scaler.inverse(scaled);
        assert!((back.x - 10.1).abs() < 1e-9);
        assert!((back.y - 9.9).abs() < 1e-9);
    }

    #[test]
    fn scaler_pins_degenerate_axis() {
        let points = vec![p(5.0, 1.0), p(5.0, 2.0)];
        let scaler = MinMaxScaler::fit(&points);
        assert_eq!(scaler.transform(p(5.0, 1.0)).x, 0.0);
        assert_eq!(scaler.transform(p(5.0, 2.0)).x, 0.0);
    }

    #[test]
    fn separates_two_blobs() {
        let points = two_blobs();
        let fit = KMeansEngine::new(300).fit(&points, 2).unwrap();
        assert_eq!(fit.labels[0], fit.labels[1]);
        assert_eq!(fit.labels[2], fit.labels[3]);
        assert_ne!(fit.labels[0], fit.labels[2]);
        assert!(fit.inertia < 0.01);
    }

    #[test]
    fn determinism_across_runs() {
        let points = two_blobs();
        let engine = KMeansEngine::new(300);
        let a = engine.fit(&points, 2).unwrap();
        let b = engine.fit(&points, 2).unwrap();
        assert_eq!(a.labels, b.labels);
        assert_eq!(a.centroids, b.centroids);
        assert_eq!(a.inertia.to_bits(), b.inertia.to_bits());
    }

    #[test]
    fn k_beyond_distinct_points_fails() {
        let points = vec![p(1.0, 1.0), p(1.0, 1.0), p(2.0, 2.0)];
        let engine = KMeansEngine::new(300);
        assert!(engine.fit(&points, 2).is_ok());
        assert!(matches!(
            engine.fit(&points, 3),
            Err(EngineError::InsufficientData(_))
        ));
        assert!(matches!(
            engine.fit(&points, 0),
            Err(EngineError::InsufficientData(_))
        ));
    }

    #[test]
    fn k_equal_to_points_gives_one_point_per_cluster() {
        let points = vec![p(0.0, 0.0), p(1.0, 0.0), p(0.0, 1.0)];
        let fit = KMeansEngine::new(300).fit(&points, 3).unwrap();
        let mut sorted = fit.labels.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, vec![0, 1, 2]);
        assert!(fit.inertia.abs() < 1e-12);
    }

    #[test]
    fn single_cluster_centroid_is_mean() {
        let points = vec![p(0.0, 0.0), p(2.0, 4.0)];
        let fit = KMeansEngine::new(300).fit(&points, 1).unwrap();
        assert!((fit.centroids[0].x - 1.0).abs() < 1e-12);
        assert!((fit.centroids[0].y - 2.0).abs() < 1e-12);
    }
}
