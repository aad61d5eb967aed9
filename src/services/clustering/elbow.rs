use super::kmeans::{distinct_points, KMeansEngine, KMeansFit};
use super::types::{DataPoint, ElbowCurve, ElbowPoint};
use crate::error::EngineError;

/// Computes inertia across candidate cluster counts. The analyzer never
/// chooses k; the curve goes back to the caller for heuristic selection.
pub struct ElbowAnalyzer {
    max_k: usize,
    engine: KMeansEngine,
}

impl ElbowAnalyzer {
    pub fn new(max_k: usize, max_iterations: usize) -> Self {
        Self {
            max_k,
            engine: KMeansEngine::new(max_iterations),
        }
    }

    pub fn curve(&self, points: &[DataPoint]) -> Result<ElbowCurve, EngineError> {
        let start = std::time::Instant::now();
        let distinct = distinct_points(points);
        if distinct.len() < 2 {
            return Err(EngineError::InsufficientData(format!(
                "elbow analysis needs at least 2 distinct points, found {}",
                distinct.len()
            )));
        }

        let k_max = self.max_k.min(distinct.len());
        let mut curve = Vec::with_capacity(k_max);
        let mut prev: Option<KMeansFit> = None;

        for k in 1..=k_max {
            let mut fit = self.engine.fit(points, k)?;

            // Independent deterministic inits do not guarantee a
            // non-increasing curve. If the fresh fit regresses, refit warm-
            // started from the k-1 centroids plus the worst-served point;
            // Lloyd's from that start cannot exceed the k-1 inertia.
            if let Some(prev_fit) = &prev {
                if fit.inertia > prev_fit.inertia {
                    let mut seeds = prev_fit.centroids.clone();
                    seeds.push(farthest_point(points, prev_fit));
                    let refit = self.engine.fit_from(points, seeds);
                    if refit.inertia < fit.inertia {
                        fit = refit;
                    }
                }
            }

            curve.push(ElbowPoint {
                k,
                inertia: fit.inertia,
            });
            prev = Some(fit);
        }

        tracing::info!(
            "Elbow curve over k=1..={} computed in {:?}",
            k_max,
            start.elapsed()
        );
        Ok(ElbowCurve { points: curve })
    }
}

/// The point with the largest distance to its assigned centroid.
fn farthest_point(points: &[DataPoint], fit: &KMeansFit) -> DataPoint {
    let mut best = points[0];
    let mut best_dist = f64::NEG_INFINITY;
    for (p, &label) in points.iter().zip(&fit.labels) {
        let dist = p.distance_sq(&fit.centroids[label]);
        if dist > best_dist {
            best_dist = dist;
            best = *p;
        }
    }
    best
}
