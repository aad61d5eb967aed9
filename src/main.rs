use anyhow::Result;
use clap::Parser;
use cluster_services::cli::{Cli, Command};
use cluster_services::{config, logging, AnalysisEngine};
use std::path::Path;

fn main() -> Result<()> {
    // Initialize logging
    logging::init_logging()?;

    // Load configuration
    let config = config::Config::new()?;

    let cli = Cli::parse();
    let engine = AnalysisEngine::new(config);

    // Every operation prints one JSON envelope to stdout; failures are part
    // of the envelope, not process errors.
    let envelope = match cli.command {
        Command::GetDataInfo {
            path,
            encoding,
            delimiter,
        } => engine
            .get_data_info(Path::new(&path), &encoding, &delimiter)
            .map(|r| serde_json::to_value(r))
            .unwrap_or_else(|e| Ok(e.failure_body())),
        Command::CleanData {
            path,
            options,
            encoding,
            delimiter,
        } => engine
            .clean_data(Path::new(&path), &options, &encoding, &delimiter)
            .map(|r| serde_json::to_value(r))
            .unwrap_or_else(|e| Ok(e.failure_body())),
        Command::Elbow {
            path,
            column_x,
            column_y,
            encoding,
            delimiter,
        } => engine
            .elbow(Path::new(&path), &column_x, &column_y, &encoding, &delimiter)
            .map(|r| serde_json::to_value(r))
            .unwrap_or_else(|e| Ok(e.failure_body())),
        Command::Cluster {
            path,
            key_column,
            column_x,
            column_y,
            num_clusters,
            encoding,
            delimiter,
        } => engine
            .cluster(
                Path::new(&path),
                &key_column,
                &column_x,
                &column_y,
                num_clusters,
                &encoding,
                &delimiter,
            )
            .map(|r| serde_json::to_value(r))
            .unwrap_or_else(|e| Ok(e.failure_body())),
    }?;

    println!("{}", serde_json::to_string(&envelope)?);

    Ok(())
}
