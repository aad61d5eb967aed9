use anyhow::Result;
use dotenvy::dotenv;
use serde::Deserialize;

fn default_elbow_max_k() -> usize {
    10
}

fn default_max_iterations() -> usize {
    300
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Upper bound on k for the elbow curve (further capped at the number of
    /// distinct points per request).
    pub elbow_max_k: usize,
    /// Lloyd's iteration bound; termination is guaranteed even without
    /// convergence.
    pub kmeans_max_iterations: usize,
    /// Raw cell values treated as null, compared after trimming.
    pub null_tokens: Vec<String>,
}

impl Config {
    pub fn new() -> Result<Self> {
        // Load .env file first
        dotenv().ok();

        let elbow_max_k = match std::env::var("ELBOW_MAX_K") {
            Ok(v) => v
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid ELBOW_MAX_K: {}", e))?,
            Err(_) => default_elbow_max_k(),
        };

        let kmeans_max_iterations = match std::env::var("KMEANS_MAX_ITERATIONS") {
            Ok(v) => v
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid KMEANS_MAX_ITERATIONS: {}", e))?,
            Err(_) => default_max_iterations(),
        };

        let null_tokens = match std::env::var("NULL_TOKENS") {
            Ok(v) => v.split(',').map(|t| t.trim().to_string()).collect(),
            Err(_) => vec![String::new()],
        };

        Ok(Config {
            elbow_max_k,
            kmeans_max_iterations,
            null_tokens,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            elbow_max_k: default_elbow_max_k(),
            kmeans_max_iterations: default_max_iterations(),
            null_tokens: vec![String::new()],
        }
    }
}
