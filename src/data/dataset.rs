use crate::error::{Result, TtgpError};
use polars::prelude::*;

/// Row-major feature matrix with its regression target
#[derive(Debug, Clone)]
pub struct Dataset {
    feature_names: Vec<String>,
    rows: Vec<Vec<f64>>,
    labels: Vec<f64>,
}

impl Dataset {
    pub fn new(feature_names: Vec<String>, rows: Vec<Vec<f64>>, labels: Vec<f64>) -> Result<Self> {
        if rows.len() != labels.len() {
            return Err(TtgpError::MetricContract(format!(
                "{} rows but {} labels",
                rows.len(),
                labels.len()
            )));
        }
        if rows.is_empty() {
            return Err(TtgpError::MetricContract("dataset has no rows".to_string()));
        }
        if let Some(bad) = rows.iter().position(|r| r.len() != feature_names.len()) {
            return Err(TtgpError::VocabularyContract(format!(
                "row {} has {} values, expected {}",
                bad,
                rows[bad].len(),
                feature_names.len()
            )));
        }

        Ok(Self {
            feature_names,
            rows,
            labels,
        })
    }

    /// Build from a numeric frame; every column other than `target` is a feature
    pub fn from_frame(df: &DataFrame, target: &str) -> Result<Self> {
        let labels = column_values(df, target)?;

        let feature_names: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .filter(|name| name != target)
            .collect();

        let columns = feature_names
            .iter()
            .map(|name| column_values(df, name))
            .collect::<Result<Vec<_>>>()?;

        let rows = (0..df.height())
            .map(|i| columns.iter().map(|col| col[i]).collect())
            .collect();

        Self::new(feature_names, rows, labels)
    }

    /// Splits off the last `fraction` of rows as a held-out set
    pub fn split_tail(self, fraction: f64) -> Result<(Dataset, Dataset)> {
        let test_len = (self.rows.len() as f64 * fraction).round() as usize;
        if test_len == 0 || test_len >= self.rows.len() {
            return Err(TtgpError::Configuration(format!(
                "test fraction {} leaves an empty partition of {} rows",
                fraction,
                self.rows.len()
            )));
        }

        let cut = self.rows.len() - test_len;
        let mut rows = self.rows;
        let mut labels = self.labels;
        let test_rows = rows.split_off(cut);
        let test_labels = labels.split_off(cut);

        Ok((
            Dataset::new(self.feature_names.clone(), rows, labels)?,
            Dataset::new(self.feature_names, test_rows, test_labels)?,
        ))
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn arity(&self) -> usize {
        self.feature_names.len()
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn labels(&self) -> &[f64] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn column_values(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
    let column = df.column(name)?.cast(&DataType::Float64)?;
    column
        .f64()?
        .into_iter()
        .enumerate()
        .map(|(i, v)| {
            v.ok_or_else(|| TtgpError::DataLoading(format!("null in column '{}' at row {}", name, i)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::df;

    fn sample() -> Dataset {
        Dataset::new(
            vec!["x".to_string()],
            (0..10).map(|i| vec![i as f64]).collect(),
            (0..10).map(|i| 2.0 * i as f64).collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_mismatched_labels_rejected() {
        let err = Dataset::new(vec!["x".to_string()], vec![vec![1.0]], vec![]).unwrap_err();
        assert!(matches!(err, TtgpError::MetricContract(_)));
    }

    #[test]
    fn test_split_tail() {
        let (train, test) = sample().split_tail(0.3).unwrap();
        assert_eq!(train.len(), 7);
        assert_eq!(test.len(), 3);
        assert_eq!(test.rows()[0], vec![7.0]);
    }

    #[test]
    fn test_from_frame() {
        let df = df! {
            "a" => &[1.0, 2.0],
            "b" => &[3i64, 4],
            "y" => &[0.5, 0.25],
        }
        .unwrap();

        let data = Dataset::from_frame(&df, "y").unwrap();
        assert_eq!(data.feature_names(), &["a".to_string(), "b".to_string()]);
        assert_eq!(data.rows()[1], vec![2.0, 4.0]);
        assert_eq!(data.labels(), &[0.5, 0.25]);
    }
}
