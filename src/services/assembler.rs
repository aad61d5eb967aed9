//! Response DTOs for the four public operations and the pure mappings from
//! engine structures into them. No decisions here and no failure modes
//! beyond what upstream already reported.

use crate::services::clustering::types::{
    AxisQuartiles, AxisSummary, ClusterAnalysisResult, ElbowCurve, ElbowPoint,
};
use crate::services::dataset::types::{
    CellValue, CleaningReport, ColumnType, Table, TableProfile,
};
use crate::services::dataset::utils::{is_null_cell, parse_numeric};
use serde::Serialize;
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;

#[derive(Debug, Serialize)]
pub struct NullColumnInfo {
    pub count: usize,
    pub percentage: f64,
    pub dtype: String,
}

#[derive(Debug, Serialize)]
pub struct DataInfoResponse {
    pub success: bool,
    pub columns: Vec<String>,
    pub numeric_columns: Vec<String>,
    pub num_rows: usize,
    pub has_nulls: bool,
    /// Only columns that actually hold nulls appear here.
    pub null_info: BTreeMap<String, NullColumnInfo>,
    pub has_duplicates: bool,
    pub num_duplicates: usize,
}

#[derive(Debug, Serialize)]
pub struct CleanDataResponse {
    pub success: bool,
    pub cleaned_filename: String,
    pub original_rows: usize,
    pub cleaned_rows: usize,
    pub rows_removed: usize,
    pub columns_dropped: Vec<String>,
    pub remaining_nulls: BTreeMap<String, usize>,
    pub columns: Vec<String>,
    pub numeric_columns: Vec<String>,
    pub rows: Vec<Map<String, Value>>,
}

#[derive(Debug, Serialize)]
pub struct ElbowResponse {
    pub success: bool,
    pub dataset_used: String,
    pub elbow_curve: Vec<ElbowPoint>,
}

#[derive(Debug, Serialize)]
pub struct ScatterPointDto {
    pub x: f64,
    pub y: f64,
    pub cluster: usize,
}

#[derive(Debug, Serialize)]
pub struct BoxplotDto {
    pub cluster: usize,
    pub x: Option<AxisQuartiles>,
    pub y: Option<AxisQuartiles>,
}

#[derive(Debug, Serialize)]
pub struct DetailRowDto {
    pub key: Value,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Serialize)]
pub struct ClusterDetailDto {
    pub cluster: usize,
    pub count: usize,
    pub x: Option<AxisSummary>,
    pub y: Option<AxisSummary>,
    pub rows: Vec<DetailRowDto>,
}

#[derive(Debug, Serialize)]
pub struct ClusterResponse {
    pub success: bool,
    pub dataset_used: String,
    pub num_clusters: usize,
    pub silhouette_score: Option<f64>,
    pub columns_used: Vec<String>,
    pub data_points: Vec<ScatterPointDto>,
    pub centroids: Vec<ScatterPointDto>,
    pub boxplot_data: Vec<BoxplotDto>,
    pub cluster_detail: Vec<ClusterDetailDto>,
}

pub fn data_info(profile: &TableProfile) -> DataInfoResponse {
    let null_info = profile
        .columns
        .iter()
        .filter(|c| c.null_count > 0)
        .map(|c| {
            (
                c.name.clone(),
                NullColumnInfo {
                    count: c.null_count,
                    percentage: c.null_count as f64 / profile.num_rows as f64 * 100.0,
                    dtype: c.data_type.as_str().to_string(),
                },
            )
        })
        .collect();

    DataInfoResponse {
        success: true,
        columns: profile.columns.iter().map(|c| c.name.clone()).collect(),
        numeric_columns: profile.numeric_columns(),
        num_rows: profile.num_rows,
        has_nulls: profile.has_nulls,
        null_info,
        has_duplicates: profile.has_duplicates,
        num_duplicates: profile.num_duplicate_rows,
    }
}

pub fn clean_data(
    cleaned_filename: String,
    original_rows: usize,
    table: &Table,
    profile: &TableProfile,
    report: &CleaningReport,
    null_tokens: &[String],
) -> CleanDataResponse {
    let remaining_nulls = profile
        .columns
        .iter()
        .filter(|c| c.null_count > 0)
        .map(|c| (c.name.clone(), c.null_count))
        .collect();

    let numeric: Vec<bool> = profile
        .columns
        .iter()
        .map(|c| c.data_type == ColumnType::Numeric)
        .collect();

    let rows = table
        .rows
        .iter()
        .map(|row| {
            table
                .columns
                .iter()
                .zip(row)
                .zip(&numeric)
                .map(|((name, cell), &is_numeric)| {
                    (name.clone(), cell_to_json(cell, is_numeric, null_tokens))
                })
                .collect()
        })
        .collect();

    CleanDataResponse {
        success: true,
        cleaned_filename,
        original_rows,
        cleaned_rows: table.num_rows(),
        rows_removed: report.rows_removed,
        columns_dropped: report.columns_dropped.clone(),
        remaining_nulls,
        columns: table.columns.clone(),
        numeric_columns: profile.numeric_columns(),
        rows,
    }
}

pub fn elbow(dataset_used: String, curve: &ElbowCurve) -> ElbowResponse {
    ElbowResponse {
        success: true,
        dataset_used,
        elbow_curve: curve.points.clone(),
    }
}

pub fn cluster(
    dataset_used: String,
    result: &ClusterAnalysisResult,
    columns_used: Vec<String>,
    key_is_numeric: bool,
) -> ClusterResponse {
    let data_points = result
        .assignments
        .iter()
        .map(|a| ScatterPointDto {
            x: a.x,
            y: a.y,
            cluster: a.cluster,
        })
        .collect();

    let centroids = result
        .centroids
        .iter()
        .map(|c| ScatterPointDto {
            x: c.x,
            y: c.y,
            cluster: c.cluster,
        })
        .collect();

    let boxplot_data = result
        .boxplots
        .iter()
        .map(|b| BoxplotDto {
            cluster: b.cluster,
            x: b.x,
            y: b.y,
        })
        .collect();

    let cluster_detail = result
        .stats
        .iter()
        .map(|s| ClusterDetailDto {
            cluster: s.cluster,
            count: s.count,
            x: s.x,
            y: s.y,
            rows: result
                .assignments
                .iter()
                .filter(|a| a.cluster == s.cluster)
                .map(|a| DetailRowDto {
                    key: key_to_json(&a.key, key_is_numeric),
                    x: a.x,
                    y: a.y,
                })
                .collect(),
        })
        .collect();

    ClusterResponse {
        success: true,
        dataset_used,
        num_clusters: result.num_clusters,
        silhouette_score: result.silhouette,
        columns_used,
        data_points,
        centroids,
        boxplot_data,
        cluster_detail,
    }
}

/// Record typing: null tokens serialize as JSON null, numeric-column values
/// as numbers, everything else as strings.
fn cell_to_json(cell: &CellValue, column_is_numeric: bool, null_tokens: &[String]) -> Value {
    if is_null_cell(cell, null_tokens) {
        return Value::Null;
    }
    match cell {
        CellValue::Num(n) => number_value(*n),
        CellValue::Str(s) => {
            if column_is_numeric {
                match parse_numeric(s) {
                    Some(n) => number_value(n),
                    None => Value::String(s.clone()),
                }
            } else {
                Value::String(s.clone())
            }
        }
        CellValue::Null => Value::Null,
    }
}

fn key_to_json(key: &str, key_is_numeric: bool) -> Value {
    if key_is_numeric {
        if let Some(n) = parse_numeric(key) {
            return number_value(n);
        }
    }
    Value::String(key.to_string())
}

fn number_value(n: f64) -> Value {
    Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
}
