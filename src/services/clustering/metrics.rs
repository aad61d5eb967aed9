use super::types::{AxisQuartiles, AxisSummary, DataPoint};

/// Within-cluster sum of squared distances from each point to its assigned
/// centroid.
pub fn compute_inertia(points: &[DataPoint], labels: &[usize], centroids: &[DataPoint]) -> f64 {
    points
        .iter()
        .zip(labels)
        .map(|(p, &cluster)| p.distance_sq(&centroids[cluster]))
        .sum()
}

/// Mean silhouette coefficient over all points, or None for degenerate
/// clusterings (k < 2 or k >= number of points), where separation is
/// undefined rather than an error.
pub fn silhouette_score(points: &[DataPoint], labels: &[usize], k: usize) -> Option<f64> {
    let n = points.len();
    if k < 2 || k >= n {
        return None;
    }

    let mut total = 0.0;
    for i in 0..n {
        let cluster = labels[i];

        let mut same_sum = 0.0;
        let mut same_count = 0usize;
        let mut other_sums = vec![0.0; k];
        let mut other_counts = vec![0usize; k];

        for j in 0..n {
            if i == j {
                continue;
            }
            let distance = points[i].distance(&points[j]);
            if labels[j] == cluster {
                same_sum += distance;
                same_count += 1;
            } else {
                other_sums[labels[j]] += distance;
                other_counts[labels[j]] += 1;
            }
        }

        // a is undefined for a single-member cluster; score it 0.
        if same_count == 0 {
            continue;
        }

        let a = same_sum / same_count as f64;
        let b = other_sums
            .iter()
            .zip(&other_counts)
            .filter(|(_, &count)| count > 0)
            .map(|(sum, &count)| sum / count as f64)
            .fold(f64::INFINITY, f64::min);

        let score = if b.is_infinite() || (a == 0.0 && b == 0.0) {
            0.0
        } else {
            (b - a) / a.max(b)
        };
        total += score;
    }

    Some(total / n as f64)
}

/// Min, max and mean of a value set; None when empty.
pub fn axis_summary(values: &[f64]) -> Option<AxisSummary> {
    if values.is_empty() {
        return None;
    }
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut sum = 0.0;
    for &v in values {
        min = min.min(v);
        max = max.max(v);
        sum += v;
    }
    Some(AxisSummary {
        min,
        max,
        mean: sum / values.len() as f64,
    })
}

/// Five-number summary with linearly interpolated quartiles; None when
/// empty.
pub fn axis_quartiles(values: &[f64]) -> Option<AxisQuartiles> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    Some(AxisQuartiles {
        min: sorted[0],
        q1: quantile(&sorted, 0.25),
        median: quantile(&sorted, 0.5),
        q3: quantile(&sorted, 0.75),
        max: sorted[sorted.len() - 1],
    })
}

fn quantile(sorted: &[f64], q: f64) -> f64 {
    let position = (sorted.len() - 1) as f64 * q;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    if lower == upper {
        sorted[lower]
    } else {
        let weight = position - lower as f64;
        sorted[lower] * (1.0 - weight) + sorted[upper] * weight
    }
}
