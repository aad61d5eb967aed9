use smallvec::SmallVec;
use std::hash::{Hash, Hasher};

pub const SAMPLE_SIZE: usize = 3;

/// A single cell. The loader only produces `Str` (verbatim text); `Num`
/// enters through fill-null strategies and `Null` marks explicit missing
/// values recognized via the null-token set.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Str(String),
    Num(f64),
    Null,
}

// Cells are always finite, so bit-pattern equality is total.
impl Eq for CellValue {}

impl Hash for CellValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            CellValue::Str(s) => {
                0u8.hash(state);
                s.hash(state);
            }
            CellValue::Num(n) => {
                1u8.hash(state);
                n.to_bits().hash(state);
            }
            CellValue::Null => 2u8.hash(state),
        }
    }
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CellValue::Str(s) => write!(f, "{}", s),
            CellValue::Num(n) => write!(f, "{}", n),
            CellValue::Null => Ok(()),
        }
    }
}

/// Ordered column names plus rows aligned to that order. Every row holds
/// exactly `columns.len()` cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl Table {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Numeric,
    Categorical,
    Datetime,
    Unknown,
}

impl ColumnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Numeric => "numeric",
            ColumnType::Categorical => "categorical",
            ColumnType::Datetime => "datetime",
            ColumnType::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ColumnProfile {
    pub name: String,
    pub data_type: ColumnType,
    pub null_count: usize,
    pub distinct_count: usize,
    pub sample_values: SmallVec<[String; SAMPLE_SIZE]>,
}

#[derive(Debug, Clone)]
pub struct TableProfile {
    pub columns: Vec<ColumnProfile>,
    pub num_rows: usize,
    pub has_nulls: bool,
    pub has_duplicates: bool,
    pub num_duplicate_rows: usize,
}

impl TableProfile {
    pub fn numeric_columns(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| c.data_type == ColumnType::Numeric)
            .map(|c| c.name.clone())
            .collect()
    }
}

/// How `FillNull` replaces missing values.
#[derive(Debug, Clone, PartialEq)]
pub enum FillStrategy {
    Constant(CellValue),
    ColumnMean,
    ColumnMedian,
    ColumnMode,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CleaningOp {
    DropColumn {
        column: String,
    },
    DropDuplicateRows,
    /// Drop rows holding a null in any of the named columns, or in any
    /// column at all when unspecified.
    DropRowsWithNull {
        columns: Option<Vec<String>>,
    },
    FillNull {
        column: String,
        strategy: FillStrategy,
    },
}

/// Immutable set of cleaning operations. Application order is fixed by the
/// cleaner (column drops, then duplicate removal, then null handling)
/// regardless of the order ops appear here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CleaningPlan {
    pub ops: Vec<CleaningOp>,
}

impl CleaningPlan {
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CleaningReport {
    pub rows_removed: usize,
    pub columns_dropped: Vec<String>,
}
