use crate::config::Config;
use crate::error::EngineError;
use crate::services::assembler::{
    self, CleanDataResponse, ClusterResponse, DataInfoResponse, ElbowResponse,
};
use crate::services::clustering::metrics::{axis_quartiles, axis_summary, silhouette_score};
use crate::services::clustering::types::*;
use crate::services::clustering::{ElbowAnalyzer, KMeansEngine, MinMaxScaler};
use crate::services::dataset::types::{CellValue, Table};
use crate::services::dataset::utils::{is_null_cell, parse_numeric};
use crate::services::dataset::{parse_cleaning_options, DatasetCleaner, DatasetProfiler, TableLoader};
use std::path::{Path, PathBuf};

/// Facade over the profiling, cleaning and clustering components. Stateless
/// and reentrant: each call reads its input file, computes, and returns; the
/// only write is `clean_data`'s cleaned CSV sibling.
pub struct AnalysisEngine {
    config: Config,
}

impl AnalysisEngine {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn get_data_info(
        &self,
        path: &Path,
        encoding: &str,
        delimiter: &str,
    ) -> Result<DataInfoResponse, EngineError> {
        let start = std::time::Instant::now();
        tracing::info!("get_data_info on {}", path.display());

        let table = TableLoader::load_path(path, encoding, delimiter)?;
        let profile = self.profiler().profile(&table);

        tracing::info!("get_data_info completed in {:?}", start.elapsed());
        Ok(assembler::data_info(&profile))
    }

    pub fn clean_data(
        &self,
        path: &Path,
        options_json: &str,
        encoding: &str,
        delimiter: &str,
    ) -> Result<CleanDataResponse, EngineError> {
        let start = std::time::Instant::now();
        tracing::info!("clean_data on {}", path.display());

        let table = TableLoader::load_path(path, encoding, delimiter)?;
        let plan = parse_cleaning_options(options_json)?;
        let original_rows = table.num_rows();

        let cleaner = DatasetCleaner::new(&self.config.null_tokens);
        let (cleaned, report) = cleaner.apply(&table, &plan)?;

        let cleaned_path = cleaned_sibling_path(path);
        self.write_csv(&cleaned_path, &cleaned, encoding, delimiter)?;
        tracing::info!("Wrote cleaned table to {}", cleaned_path.display());

        let profile = self.profiler().profile(&cleaned);
        let cleaned_filename = file_name(&cleaned_path);

        tracing::info!("clean_data completed in {:?}", start.elapsed());
        Ok(assembler::clean_data(
            cleaned_filename,
            original_rows,
            &cleaned,
            &profile,
            &report,
            &self.config.null_tokens,
        ))
    }

    pub fn elbow(
        &self,
        path: &Path,
        column_x: &str,
        column_y: &str,
        encoding: &str,
        delimiter: &str,
    ) -> Result<ElbowResponse, EngineError> {
        let start = std::time::Instant::now();
        let resolved = resolve_dataset_path(path);
        tracing::info!(
            "elbow on {} over ({}, {})",
            resolved.display(),
            column_x,
            column_y
        );

        let table = TableLoader::load_path(&resolved, encoding, delimiter)?;
        let (_, points) = self.extract_points(&table, None, column_x, column_y)?;

        let scaler = MinMaxScaler::fit(&points);
        let scaled = scaler.transform_all(&points);

        let analyzer = ElbowAnalyzer::new(
            self.config.elbow_max_k,
            self.config.kmeans_max_iterations,
        );
        let curve = analyzer.curve(&scaled)?;

        tracing::info!("elbow completed in {:?}", start.elapsed());
        Ok(assembler::elbow(file_name(&resolved), &curve))
    }

    #[allow(clippy::too_many_arguments)]
    pub fn cluster(
        &self,
        path: &Path,
        key_column: &str,
        column_x: &str,
        column_y: &str,
        num_clusters: usize,
        encoding: &str,
        delimiter: &str,
    ) -> Result<ClusterResponse, EngineError> {
        let start = std::time::Instant::now();
        let resolved = resolve_dataset_path(path);
        tracing::info!(
            "cluster on {} with k={} over ({}, {}), keyed by {}",
            resolved.display(),
            num_clusters,
            column_x,
            column_y,
            key_column
        );

        let table = TableLoader::load_path(&resolved, encoding, delimiter)?;
        let key_idx = table.column_index(key_column).ok_or_else(|| {
            EngineError::UnknownColumn(format!("no column named '{}'", key_column))
        })?;
        let (keys, points) = self.extract_points(&table, Some(key_idx), column_x, column_y)?;

        if points.is_empty() {
            return Err(EngineError::InsufficientData(
                "no usable rows after dropping nulls".to_string(),
            ));
        }

        let scaler = MinMaxScaler::fit(&points);
        let scaled = scaler.transform_all(&points);

        let engine = KMeansEngine::new(self.config.kmeans_max_iterations);
        let fit = engine.fit(&scaled, num_clusters)?;
        let silhouette = silhouette_score(&scaled, &fit.labels, num_clusters);

        let result = build_result(num_clusters, &keys, &points, &fit.labels, &fit.centroids, &scaler, silhouette);

        let key_is_numeric = keys.iter().all(|k| parse_numeric(k).is_some());
        let columns_used = vec![
            key_column.to_string(),
            column_x.to_string(),
            column_y.to_string(),
        ];

        tracing::info!(
            "cluster completed in {:?} (silhouette: {:?})",
            start.elapsed(),
            result.silhouette
        );
        Ok(assembler::cluster(
            file_name(&resolved),
            &result,
            columns_used,
            key_is_numeric,
        ))
    }

    fn profiler(&self) -> DatasetProfiler {
        DatasetProfiler::new(&self.config.null_tokens)
    }

    /// Pull (key, x, y) triples out of a table: rows holding a null in any
    /// involved column are dropped; x/y cells must coerce to numbers.
    fn extract_points(
        &self,
        table: &Table,
        key_idx: Option<usize>,
        column_x: &str,
        column_y: &str,
    ) -> Result<(Vec<String>, Vec<DataPoint>), EngineError> {
        let x_idx = table
            .column_index(column_x)
            .ok_or_else(|| EngineError::UnknownColumn(format!("no column named '{}'", column_x)))?;
        let y_idx = table
            .column_index(column_y)
            .ok_or_else(|| EngineError::UnknownColumn(format!("no column named '{}'", column_y)))?;

        let mut keys = Vec::new();
        let mut points = Vec::new();
        for (row_idx, row) in table.rows.iter().enumerate() {
            let involved = key_idx
                .into_iter()
                .chain([x_idx, y_idx])
                .any(|idx| is_null_cell(&row[idx], &self.config.null_tokens));
            if involved {
                continue;
            }

            let x = coerce_axis(&row[x_idx], column_x)?;
            let y = coerce_axis(&row[y_idx], column_y)?;
            let key = match key_idx {
                Some(idx) => row[idx].to_string(),
                None => row_idx.to_string(),
            };
            keys.push(key);
            points.push(DataPoint { x, y });
        }
        Ok((keys, points))
    }

    /// Serialize a table back to CSV in the requested encoding. Null cells
    /// export as empty fields.
    fn write_csv(
        &self,
        path: &Path,
        table: &Table,
        encoding_label: &str,
        delimiter: &str,
    ) -> Result<(), EngineError> {
        let encoding = encoding_rs::Encoding::for_label(encoding_label.as_bytes()).ok_or_else(
            || EngineError::Decode(format!("unknown encoding label '{}'", encoding_label)),
        )?;
        let delim = TableLoader::delimiter_byte(delimiter)?;

        let mut writer = csv::WriterBuilder::new()
            .delimiter(delim)
            .from_writer(Vec::new());
        writer
            .write_record(&table.columns)
            .map_err(|e| EngineError::Format(e.to_string()))?;
        for row in &table.rows {
            writer
                .write_record(row.iter().map(|cell| cell.to_string()))
                .map_err(|e| EngineError::Format(e.to_string()))?;
        }
        let text = String::from_utf8(
            writer
                .into_inner()
                .map_err(|e| EngineError::Format(e.to_string()))?,
        )
        .map_err(|e| EngineError::Format(e.to_string()))?;

        let (encoded, _, unmappable) = encoding.encode(&text);
        if unmappable {
            return Err(EngineError::Decode(format!(
                "cleaned table is not representable in {}",
                encoding.name()
            )));
        }
        std::fs::write(path, &encoded)?;
        Ok(())
    }
}

fn coerce_axis(cell: &CellValue, column: &str) -> Result<f64, EngineError> {
    match cell {
        CellValue::Num(n) => Ok(*n),
        CellValue::Str(s) => parse_numeric(s).ok_or_else(|| {
            EngineError::ColumnType(format!(
                "column '{}' holds non-numeric value '{}'",
                column, s
            ))
        }),
        CellValue::Null => Err(EngineError::ColumnType(format!(
            "column '{}' holds a null value",
            column
        ))),
    }
}

#[allow(clippy::too_many_arguments)]
fn build_result(
    num_clusters: usize,
    keys: &[String],
    points: &[DataPoint],
    labels: &[usize],
    scaled_centroids: &[DataPoint],
    scaler: &MinMaxScaler,
    silhouette: Option<f64>,
) -> ClusterAnalysisResult {
    let assignments: Vec<ClusterAssignment> = keys
        .iter()
        .zip(points)
        .zip(labels)
        .map(|((key, p), &cluster)| ClusterAssignment {
            key: key.clone(),
            x: p.x,
            y: p.y,
            cluster,
        })
        .collect();

    let centroids: Vec<Centroid> = scaled_centroids
        .iter()
        .enumerate()
        .map(|(cluster, c)| {
            let original = scaler.inverse(*c);
            Centroid {
                cluster,
                x: original.x,
                y: original.y,
            }
        })
        .collect();

    let mut stats = Vec::with_capacity(num_clusters);
    let mut boxplots = Vec::with_capacity(num_clusters);
    for cluster in 0..num_clusters {
        let xs: Vec<f64> = points
            .iter()
            .zip(labels)
            .filter(|(_, &l)| l == cluster)
            .map(|(p, _)| p.x)
            .collect();
        let ys: Vec<f64> = points
            .iter()
            .zip(labels)
            .filter(|(_, &l)| l == cluster)
            .map(|(p, _)| p.y)
            .collect();

        stats.push(ClusterStats {
            cluster,
            count: xs.len(),
            x: axis_summary(&xs),
            y: axis_summary(&ys),
        });
        boxplots.push(BoxplotStats {
            cluster,
            x: axis_quartiles(&xs),
            y: axis_quartiles(&ys),
        });
    }

    ClusterAnalysisResult {
        num_clusters,
        assignments,
        centroids,
        silhouette,
        stats,
        boxplots,
    }
}

/// Prefer the `<stem>_cleaned.csv` sibling when a prior clean pass produced
/// one. The engine never deletes or moves files.
fn resolve_dataset_path(path: &Path) -> PathBuf {
    let cleaned = cleaned_sibling_path(path);
    if cleaned != path && cleaned.exists() {
        return cleaned;
    }
    path.to_path_buf()
}

fn cleaned_sibling_path(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!("{}_cleaned.csv", stem))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cleaned_sibling_naming() {
        let path = Path::new("/data/sales.csv");
        assert_eq!(
            cleaned_sibling_path(path),
            PathBuf::from("/data/sales_cleaned.csv")
        );
    }

    #[test]
    fn missing_sibling_resolves_to_input() {
        let path = Path::new("/nonexistent/dir/input.csv");
        assert_eq!(resolve_dataset_path(path), path.to_path_buf());
    }
}
