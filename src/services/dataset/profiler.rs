use super::types::*;
use super::utils::{is_date_string, is_null_cell, parse_numeric};
use rayon::prelude::*;
use smallvec::SmallVec;
use std::collections::HashSet;

/// Pure, side-effect-free per-column and table-level diagnostics.
pub struct DatasetProfiler {
    null_tokens: Vec<String>,
}

impl DatasetProfiler {
    pub fn new(null_tokens: &[String]) -> Self {
        Self {
            null_tokens: null_tokens.to_vec(),
        }
    }

    pub fn profile(&self, table: &Table) -> TableProfile {
        let start = std::time::Instant::now();

        let columns: Vec<ColumnProfile> = table
            .columns
            .iter()
            .enumerate()
            .map(|(idx, name)| self.profile_column(table, idx, name))
            .collect();

        let num_rows = table.num_rows();
        let num_duplicate_rows = Self::count_duplicate_rows(table);
        let has_nulls = columns.iter().any(|c| c.null_count > 0);

        tracing::info!(
            "Profiled {} columns over {} rows in {:?}",
            columns.len(),
            num_rows,
            start.elapsed()
        );

        TableProfile {
            columns,
            num_rows,
            has_nulls,
            has_duplicates: num_duplicate_rows > 0,
            num_duplicate_rows,
        }
    }

    fn profile_column(&self, table: &Table, idx: usize, name: &str) -> ColumnProfile {
        let values: Vec<&CellValue> = table.rows.iter().map(|row| &row[idx]).collect();

        let (null_count, seen_values) = values
            .par_iter()
            .fold(
                || (0usize, HashSet::new()),
                |(mut nulls, mut seen), value| {
                    if is_null_cell(value, &self.null_tokens) {
                        nulls += 1;
                    } else {
                        seen.insert(CellValue::clone(value));
                    }
                    (nulls, seen)
                },
            )
            .reduce(
                || (0usize, HashSet::new()),
                |a, b| {
                    let mut combined_set = a.1;
                    combined_set.extend(b.1);
                    (a.0 + b.0, combined_set)
                },
            );

        let mut sample_values = SmallVec::<[String; SAMPLE_SIZE]>::new();
        values
            .iter()
            .take(SAMPLE_SIZE)
            .for_each(|value| sample_values.push(value.to_string()));

        ColumnProfile {
            name: name.to_string(),
            data_type: self.infer_column_type(&values),
            null_count,
            distinct_count: seen_values.len(),
            sample_values,
        }
    }

    /// Numeric when every non-null cell parses as a finite number, datetime
    /// when every non-null cell matches a known date shape, unknown when the
    /// column has no non-null cells, categorical otherwise.
    fn infer_column_type(&self, values: &[&CellValue]) -> ColumnType {
        let mut non_null = 0usize;
        let mut numeric = 0usize;
        let mut datetime = 0usize;

        for value in values {
            if is_null_cell(value, &self.null_tokens) {
                continue;
            }
            non_null += 1;
            match value {
                CellValue::Num(_) => numeric += 1,
                CellValue::Str(s) => {
                    if parse_numeric(s).is_some() {
                        numeric += 1;
                    } else if is_date_string(s) {
                        datetime += 1;
                    }
                }
                CellValue::Null => {}
            }
        }

        if non_null == 0 {
            ColumnType::Unknown
        } else if numeric == non_null {
            ColumnType::Numeric
        } else if datetime == non_null {
            ColumnType::Datetime
        } else {
            ColumnType::Categorical
        }
    }

    /// Rows identical to an earlier row, by exact cell equality in column
    /// order.
    fn count_duplicate_rows(table: &Table) -> usize {
        let mut seen: HashSet<&[CellValue]> = HashSet::with_capacity(table.num_rows());
        table
            .rows
            .iter()
            .filter(|row| !seen.insert(row.as_slice()))
            .count()
    }
}
