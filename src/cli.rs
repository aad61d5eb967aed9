//! Command-line interface definitions and argument parsing

use clap::{Parser, Subcommand};

/// Data profiling and k-means clustering engine for delimited datasets
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Profile a dataset: columns, types, nulls and duplicate rows
    GetDataInfo {
        /// Path to the input CSV file
        path: String,

        /// Character encoding label (e.g. utf-8, windows-1252)
        #[arg(short, long, default_value = "utf-8")]
        encoding: String,

        /// Field delimiter (single byte)
        #[arg(short, long, default_value = ",")]
        delimiter: String,
    },

    /// Apply a cleaning-options JSON object and write the cleaned CSV
    CleanData {
        /// Path to the input CSV file
        path: String,

        /// Cleaning options as a JSON object
        /// Example: '{"remove_duplicates": true, "null_handling": {"age": "mean"}}'
        options: String,

        #[arg(short, long, default_value = "utf-8")]
        encoding: String,

        #[arg(short, long, default_value = ",")]
        delimiter: String,
    },

    /// Compute the elbow curve (k vs. inertia) over two numeric columns
    Elbow {
        /// Path to the input CSV file
        path: String,

        /// Column providing the x axis
        column_x: String,

        /// Column providing the y axis
        column_y: String,

        #[arg(short, long, default_value = "utf-8")]
        encoding: String,

        #[arg(short, long, default_value = ",")]
        delimiter: String,
    },

    /// Run k-means and report assignments, centroids and cluster quality
    Cluster {
        /// Path to the input CSV file
        path: String,

        /// Column whose values identify rows in the cluster detail
        key_column: String,

        /// Column providing the x axis
        column_x: String,

        /// Column providing the y axis
        column_y: String,

        /// Target number of clusters
        num_clusters: usize,

        #[arg(short, long, default_value = "utf-8")]
        encoding: String,

        #[arg(short, long, default_value = ",")]
        delimiter: String,
    },
}
