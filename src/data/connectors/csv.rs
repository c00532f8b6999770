use crate::error::{Result, TtgpError};
use polars::prelude::*;
use std::path::Path;
use super::validator::DataValidator;

pub struct CsvConnector;

impl CsvConnector {
    /// Load CSV file into DataFrame
    pub fn load<P: AsRef<Path>>(path: P) -> Result<DataFrame> {
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .try_into_reader_with_file_path(Some(path.as_ref().to_path_buf()))?
            .finish()
            .map_err(|e| TtgpError::DataLoading(format!("Failed to read CSV: {}", e)))?;

        Ok(df)
    }

    /// Load a CSV file and check it is usable as a regression table
    pub fn load_and_validate<P: AsRef<Path>>(path: P, target_column: &str) -> Result<DataFrame> {
        let df = Self::load(&path)?;

        DataValidator::validate_numeric(&df)?;
        DataValidator::validate_target(&df, target_column)?;

        let nulls = DataValidator::check_nulls(&df)?;
        if !nulls.is_empty() {
            return Err(TtgpError::DataLoading(format!(
                "Null values in {}: {:?}",
                path.as_ref().display(),
                nulls
            )));
        }

        log::debug!(
            "Loaded {} rows x {} columns from {}",
            df.height(),
            df.width(),
            path.as_ref().display()
        );
        Ok(df)
    }
}
