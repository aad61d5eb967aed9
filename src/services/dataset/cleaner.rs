use super::types::*;
use super::utils::{cell_as_numeric, is_null_cell};
use crate::error::EngineError;
use serde_json::Value;
use std::collections::{HashMap, HashSet};

/// Applies a [`CleaningPlan`] to a table, never mutating the input. Phases
/// run in a fixed order regardless of the plan's op order: column drops,
/// then duplicate removal, then null handling, so later steps always see
/// the narrower, deduplicated table.
pub struct DatasetCleaner {
    null_tokens: Vec<String>,
}

impl DatasetCleaner {
    pub fn new(null_tokens: &[String]) -> Self {
        Self {
            null_tokens: null_tokens.to_vec(),
        }
    }

    pub fn apply(
        &self,
        table: &Table,
        plan: &CleaningPlan,
    ) -> Result<(Table, CleaningReport), EngineError> {
        let start = std::time::Instant::now();
        self.validate_columns(table, plan)?;

        let mut out = table.clone();
        let mut report = CleaningReport::default();

        // Phase 1: column drops. A column already removed by this plan is a
        // satisfied condition, hence a no-op.
        for op in &plan.ops {
            if let CleaningOp::DropColumn { column } = op {
                if let Some(idx) = out.column_index(column) {
                    out.columns.remove(idx);
                    for row in &mut out.rows {
                        row.remove(idx);
                    }
                    report.columns_dropped.push(column.clone());
                }
            }
        }

        // Phase 2: duplicate removal, first occurrence wins.
        if plan
            .ops
            .iter()
            .any(|op| matches!(op, CleaningOp::DropDuplicateRows))
        {
            let before = out.rows.len();
            let mut seen: HashSet<Vec<CellValue>> = HashSet::with_capacity(before);
            out.rows.retain(|row| seen.insert(row.clone()));
            report.rows_removed += before - out.rows.len();
        }

        // Phase 3: null handling, in plan order.
        for op in &plan.ops {
            match op {
                CleaningOp::DropRowsWithNull { columns } => {
                    let indices: Vec<usize> = match columns {
                        Some(names) => names
                            .iter()
                            .filter_map(|name| out.column_index(name))
                            .collect(),
                        None => (0..out.columns.len()).collect(),
                    };
                    let before = out.rows.len();
                    out.rows.retain(|row| {
                        !indices
                            .iter()
                            .any(|&idx| is_null_cell(&row[idx], &self.null_tokens))
                    });
                    report.rows_removed += before - out.rows.len();
                }
                CleaningOp::FillNull { column, strategy } => {
                    if let Some(idx) = out.column_index(column) {
                        self.fill_column(&mut out, idx, column, strategy)?;
                    }
                }
                _ => {}
            }
        }

        tracing::info!(
            "Cleaning removed {} rows, dropped {} columns in {:?}",
            report.rows_removed,
            report.columns_dropped.len(),
            start.elapsed()
        );
        Ok((out, report))
    }

    /// Every column a plan references must exist in the input table.
    fn validate_columns(&self, table: &Table, plan: &CleaningPlan) -> Result<(), EngineError> {
        let check = |name: &str| -> Result<(), EngineError> {
            if table.column_index(name).is_none() {
                return Err(EngineError::UnknownColumn(format!(
                    "no column named '{}'",
                    name
                )));
            }
            Ok(())
        };

        for op in &plan.ops {
            match op {
                CleaningOp::DropColumn { column } | CleaningOp::FillNull { column, .. } => {
                    check(column)?
                }
                CleaningOp::DropRowsWithNull {
                    columns: Some(names),
                } => {
                    for name in names {
                        check(name)?;
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn fill_column(
        &self,
        table: &mut Table,
        idx: usize,
        column: &str,
        strategy: &FillStrategy,
    ) -> Result<(), EngineError> {
        let fill = match strategy {
            FillStrategy::Constant(value) => Some(value.clone()),
            FillStrategy::ColumnMean => self
                .numeric_values(table, idx, column)?
                .map(|values| CellValue::Num(values.iter().sum::<f64>() / values.len() as f64)),
            FillStrategy::ColumnMedian => self
                .numeric_values(table, idx, column)?
                .map(|mut values| {
                    values.sort_by(|a, b| a.total_cmp(b));
                    let mid = values.len() / 2;
                    let median = if values.len() % 2 == 0 {
                        (values[mid - 1] + values[mid]) / 2.0
                    } else {
                        values[mid]
                    };
                    CellValue::Num(median)
                }),
            FillStrategy::ColumnMode => self.mode_value(table, idx),
        };

        // No non-null values means nothing to derive a fill from.
        let Some(fill) = fill else { return Ok(()) };

        for row in &mut table.rows {
            if is_null_cell(&row[idx], &self.null_tokens) {
                row[idx] = fill.clone();
            }
        }
        Ok(())
    }

    /// Non-null values of a column, which must all coerce to numbers.
    /// Returns None when the column has no non-null values.
    fn numeric_values(
        &self,
        table: &Table,
        idx: usize,
        column: &str,
    ) -> Result<Option<Vec<f64>>, EngineError> {
        let mut values = Vec::new();
        for row in &table.rows {
            let cell = &row[idx];
            if is_null_cell(cell, &self.null_tokens) {
                continue;
            }
            match cell_as_numeric(cell) {
                Some(n) => values.push(n),
                None => {
                    return Err(EngineError::ColumnType(format!(
                        "column '{}' holds non-numeric value '{}'",
                        column, cell
                    )))
                }
            }
        }
        Ok(if values.is_empty() { None } else { Some(values) })
    }

    /// Most frequent non-null value; ties break to the smallest value.
    fn mode_value(&self, table: &Table, idx: usize) -> Option<CellValue> {
        let mut counts: HashMap<&CellValue, usize> = HashMap::new();
        for row in &table.rows {
            let cell = &row[idx];
            if !is_null_cell(cell, &self.null_tokens) {
                *counts.entry(cell).or_insert(0) += 1;
            }
        }
        counts
            .into_iter()
            .min_by(|(a, ca), (b, cb)| cb.cmp(ca).then_with(|| a.to_string().cmp(&b.to_string())))
            .map(|(value, _)| value.clone())
    }
}

/// Parse the external layer's loosely-typed cleaning-options JSON into a
/// [`CleaningPlan`]. Unknown option or method names are rejected, never
/// silently ignored.
pub fn parse_cleaning_options(options_json: &str) -> Result<CleaningPlan, EngineError> {
    let value: Value = serde_json::from_str(options_json)?;
    let obj = value
        .as_object()
        .ok_or_else(|| EngineError::Format("cleaning options must be a JSON object".to_string()))?;

    let mut ops = Vec::new();
    for (key, val) in obj {
        match key.as_str() {
            "remove_duplicates" => {
                if expect_bool(key, val)? {
                    ops.push(CleaningOp::DropDuplicateRows);
                }
            }
            "drop_null_rows" => {
                if expect_bool(key, val)? {
                    ops.push(CleaningOp::DropRowsWithNull { columns: None });
                }
            }
            "null_handling" => {
                let handling = val.as_object().ok_or_else(|| {
                    EngineError::Format("'null_handling' must be an object".to_string())
                })?;
                for (column, method) in handling {
                    ops.push(parse_null_method(column, method)?);
                }
            }
            other => {
                return Err(EngineError::Format(format!(
                    "unknown cleaning option '{}'",
                    other
                )))
            }
        }
    }

    Ok(CleaningPlan { ops })
}

fn expect_bool(key: &str, value: &Value) -> Result<bool, EngineError> {
    value
        .as_bool()
        .ok_or_else(|| EngineError::Format(format!("'{}' must be a boolean", key)))
}

fn parse_null_method(column: &str, method: &Value) -> Result<CleaningOp, EngineError> {
    match method {
        Value::String(name) => match name.as_str() {
            "drop_column" => Ok(CleaningOp::DropColumn {
                column: column.to_string(),
            }),
            "drop_row" => Ok(CleaningOp::DropRowsWithNull {
                columns: Some(vec![column.to_string()]),
            }),
            "mean" => Ok(fill_op(column, FillStrategy::ColumnMean)),
            "median" => Ok(fill_op(column, FillStrategy::ColumnMedian)),
            "mode" => Ok(fill_op(column, FillStrategy::ColumnMode)),
            other => Err(EngineError::Format(format!(
                "unknown null-handling method '{}' for column '{}'",
                other, column
            ))),
        },
        Value::Object(spec) => {
            match spec.get("method").and_then(Value::as_str) {
                Some("constant") => {}
                _ => {
                    return Err(EngineError::Format(format!(
                        "null-handling object for column '{}' must set method 'constant'",
                        column
                    )))
                }
            }
            let fill = match spec.get("value") {
                Some(Value::String(s)) => CellValue::Str(s.clone()),
                Some(Value::Number(n)) => {
                    let n = n.as_f64().filter(|v| v.is_finite()).ok_or_else(|| {
                        EngineError::Format(format!(
                            "constant fill for column '{}' is not a finite number",
                            column
                        ))
                    })?;
                    CellValue::Num(n)
                }
                _ => {
                    return Err(EngineError::Format(format!(
                        "constant fill for column '{}' needs a string or number value",
                        column
                    )))
                }
            };
            Ok(fill_op(column, FillStrategy::Constant(fill)))
        }
        _ => Err(EngineError::Format(format!(
            "invalid null-handling entry for column '{}'",
            column
        ))),
    }
}

fn fill_op(column: &str, strategy: FillStrategy) -> CleaningOp {
    CleaningOp::FillNull {
        column: column.to_string(),
        strategy,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn str_row(cells: &[&str]) -> Vec<CellValue> {
        cells.iter().map(|c| CellValue::Str(c.to_string())).collect()
    }

    fn cleaner() -> DatasetCleaner {
        DatasetCleaner::new(&[String::new()])
    }

    fn table() -> Table {
        Table {
            columns: vec!["id".into(), "x".into(), "label".into()],
            rows: vec![
                str_row(&["1", "1", "a"]),
                str_row(&["1", "1", "a"]),
                str_row(&["2", "", "b"]),
                str_row(&["3", "3", ""]),
            ],
        }
    }

    #[test]
    fn empty_plan_is_identity() {
        let input = table();
        let (out, report) = cleaner().apply(&input, &CleaningPlan::default()).unwrap();
        assert_eq!(out, input);
        assert_eq!(report, CleaningReport::default());
    }

    #[test]
    fn drop_duplicates_keeps_first_occurrence() {
        let (out, report) = cleaner()
            .apply(
                &table(),
                &CleaningPlan {
                    ops: vec![CleaningOp::DropDuplicateRows],
                },
            )
            .unwrap();
        assert_eq!(out.rows.len(), 3);
        assert_eq!(report.rows_removed, 1);
        assert_eq!(out.rows[0], str_row(&["1", "1", "a"]));
    }

    #[test]
    fn fill_mean_replaces_only_nulls() {
        let input = Table {
            columns: vec!["x".into()],
            rows: vec![str_row(&["1"]), str_row(&[""]), str_row(&["3"])],
        };
        let plan = CleaningPlan {
            ops: vec![CleaningOp::FillNull {
                column: "x".into(),
                strategy: FillStrategy::ColumnMean,
            }],
        };
        let (out, _) = cleaner().apply(&input, &plan).unwrap();
        assert_eq!(out.rows[1][0], CellValue::Num(2.0));
        assert_eq!(out.rows[0][0], CellValue::Str("1".into()));
    }

    #[test]
    fn fill_mean_on_text_column_is_column_type_error() {
        let plan = CleaningPlan {
            ops: vec![CleaningOp::FillNull {
                column: "label".into(),
                strategy: FillStrategy::ColumnMean,
            }],
        };
        let err = cleaner().apply(&table(), &plan).unwrap_err();
        assert!(matches!(err, EngineError::ColumnType(_)));
    }

    #[test]
    fn fill_median_interpolates_even_counts() {
        let input = Table {
            columns: vec!["x".into()],
            rows: vec![str_row(&["1"]), str_row(&["2"]), str_row(&["4"]), str_row(&["8"]), str_row(&[""])],
        };
        let plan = CleaningPlan {
            ops: vec![CleaningOp::FillNull {
                column: "x".into(),
                strategy: FillStrategy::ColumnMedian,
            }],
        };
        let (out, _) = cleaner().apply(&input, &plan).unwrap();
        assert_eq!(out.rows[4][0], CellValue::Num(3.0));
    }

    #[test]
    fn fill_mode_breaks_ties_to_smallest() {
        let input = Table {
            columns: vec!["c".into()],
            rows: vec![str_row(&["b"]), str_row(&["a"]), str_row(&["b"]), str_row(&["a"]), str_row(&[""])],
        };
        let plan = CleaningPlan {
            ops: vec![CleaningOp::FillNull {
                column: "c".into(),
                strategy: FillStrategy::ColumnMode,
            }],
        };
        let (out, _) = cleaner().apply(&input, &plan).unwrap();
        assert_eq!(out.rows[4][0], CellValue::Str("a".into()));
    }

    #[test]
    fn drop_column_then_fill_on_it_is_noop() {
        let plan = CleaningPlan {
            ops: vec![
                CleaningOp::FillNull {
                    column: "x".into(),
                    strategy: FillStrategy::ColumnMean,
                },
                CleaningOp::DropColumn { column: "x".into() },
            ],
        };
        // Column drops run first, so the fill sees a table without 'x'.
        let (out, report) = cleaner().apply(&table(), &plan).unwrap();
        assert_eq!(out.columns, vec!["id", "label"]);
        assert_eq!(report.columns_dropped, vec!["x".to_string()]);
    }

    #[test]
    fn drop_unknown_column_fails() {
        let plan = CleaningPlan {
            ops: vec![CleaningOp::DropColumn {
                column: "missing".into(),
            }],
        };
        let err = cleaner().apply(&table(), &plan).unwrap_err();
        assert!(matches!(err, EngineError::UnknownColumn(_)));
    }

    #[test]
    fn drop_rows_with_null_scoped_and_unscoped() {
        let plan = CleaningPlan {
            ops: vec![CleaningOp::DropRowsWithNull {
                columns: Some(vec!["x".into()]),
            }],
        };
        let (out, report) = cleaner().apply(&table(), &plan).unwrap();
        assert_eq!(out.rows.len(), 3);
        assert_eq!(report.rows_removed, 1);

        let plan = CleaningPlan {
            ops: vec![CleaningOp::DropRowsWithNull { columns: None }],
        };
        let (out, report) = cleaner().apply(&table(), &plan).unwrap();
        assert_eq!(out.rows.len(), 2);
        assert_eq!(report.rows_removed, 2);
    }

    #[test]
    fn cleaning_is_idempotent() {
        let plan = CleaningPlan {
            ops: vec![
                CleaningOp::DropDuplicateRows,
                CleaningOp::DropRowsWithNull { columns: None },
            ],
        };
        let c = cleaner();
        let (cleaned, first) = c.apply(&table(), &plan).unwrap();
        let (again, second) = c.apply(&cleaned, &plan).unwrap();
        assert!(first.rows_removed > 0);
        assert_eq!(second.rows_removed, 0);
        assert_eq!(again, cleaned);
    }

    #[test]
    fn parse_options_happy_path() {
        let plan = parse_cleaning_options(
            r#"{"remove_duplicates": true,
                "null_handling": {"age": "mean", "city": {"method": "constant", "value": "n/a"}}}"#,
        )
        .unwrap();
        assert!(plan.ops.contains(&CleaningOp::DropDuplicateRows));
        assert!(plan.ops.contains(&CleaningOp::FillNull {
            column: "age".into(),
            strategy: FillStrategy::ColumnMean,
        }));
        assert!(plan.ops.contains(&CleaningOp::FillNull {
            column: "city".into(),
            strategy: FillStrategy::Constant(CellValue::Str("n/a".into())),
        }));
    }

    #[test]
    fn parse_options_rejects_unknown_names() {
        assert!(matches!(
            parse_cleaning_options(r#"{"normalize": true}"#),
            Err(EngineError::Format(_))
        ));
        assert!(matches!(
            parse_cleaning_options(r#"{"null_handling": {"x": "interpolate"}}"#),
            Err(EngineError::Format(_))
        ));
        assert!(matches!(
            parse_cleaning_options("[1,2]"),
            Err(EngineError::Format(_))
        ));
    }

    #[test]
    fn parse_options_false_flags_add_no_ops() {
        let plan =
            parse_cleaning_options(r#"{"remove_duplicates": false, "drop_null_rows": false}"#)
                .unwrap();
        assert!(plan.is_empty());
    }
}
