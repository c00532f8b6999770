use crate::error::{Result, TtgpError};
use polars::prelude::*;
use std::collections::HashMap;

pub struct DataValidator;

impl DataValidator {
    /// Every column must be numeric
    pub fn validate_numeric(df: &DataFrame) -> Result<()> {
        for column in df.get_columns() {
            if !matches!(
                column.dtype(),
                DataType::Float64
                    | DataType::Float32
                    | DataType::Int64
                    | DataType::Int32
                    | DataType::UInt64
                    | DataType::UInt32
            ) {
                return Err(TtgpError::DataLoading(format!(
                    "Column '{}' must be numeric, found {:?}",
                    column.name(),
                    column.dtype()
                )));
            }
        }
        Ok(())
    }

    pub fn validate_target(df: &DataFrame, target_column: &str) -> Result<()> {
        let columns = df.get_column_names();
        if !columns.iter().any(|c| c.as_str() == target_column) {
            return Err(TtgpError::DataLoading(format!(
                "Missing target column '{}'",
                target_column
            )));
        }
        if columns.len() < 2 {
            return Err(TtgpError::DataLoading(
                "Need at least one feature column besides the target".to_string(),
            ));
        }
        Ok(())
    }

    /// Null counts per column, omitting columns without nulls
    pub fn check_nulls(df: &DataFrame) -> Result<HashMap<String, usize>> {
        let mut report = HashMap::new();
        for column in df.get_columns() {
            let nulls = column.null_count();
            if nulls > 0 {
                report.insert(column.name().to_string(), nulls);
            }
        }
        Ok(report)
    }
}
