use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DataPoint {
    pub x: f64,
    pub y: f64,
}

impl DataPoint {
    pub fn distance_sq(&self, other: &DataPoint) -> f64 {
        (self.x - other.x).powi(2) + (self.y - other.y).powi(2)
    }

    pub fn distance(&self, other: &DataPoint) -> f64 {
        self.distance_sq(other).sqrt()
    }
}

/// One retained row in original coordinate space, labeled with its cluster.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterAssignment {
    pub key: String,
    pub x: f64,
    pub y: f64,
    pub cluster: usize,
}

/// Mean position of a cluster's points at convergence, in original
/// coordinate space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Centroid {
    pub cluster: usize,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ElbowPoint {
    pub k: usize,
    pub inertia: f64,
}

/// (k, inertia) pairs for k = 1..=K_max; inertia is non-increasing.
#[derive(Debug, Clone, PartialEq)]
pub struct ElbowCurve {
    pub points: Vec<ElbowPoint>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AxisSummary {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AxisQuartiles {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

/// Descriptive statistics for one cluster; axis stats are None for empty
/// clusters.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterStats {
    pub cluster: usize,
    pub count: usize,
    pub x: Option<AxisSummary>,
    pub y: Option<AxisSummary>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoxplotStats {
    pub cluster: usize,
    pub x: Option<AxisQuartiles>,
    pub y: Option<AxisQuartiles>,
}

/// Everything a single clustering request produces. Computed fresh per
/// request; the engine holds no state across calls.
#[derive(Debug, Clone)]
pub struct ClusterAnalysisResult {
    pub num_clusters: usize,
    pub assignments: Vec<ClusterAssignment>,
    pub centroids: Vec<Centroid>,
    /// None for degenerate clusterings (k < 2 or k >= number of points).
    pub silhouette: Option<f64>,
    pub stats: Vec<ClusterStats>,
    pub boxplots: Vec<BoxplotStats>,
}
