pub mod elbow;
pub mod kmeans;
pub mod metrics;
pub mod types;

pub use elbow::ElbowAnalyzer;
pub use kmeans::{KMeansEngine, MinMaxScaler};
