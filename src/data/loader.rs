//! CSV Data Loader Module
//! Pure I/O boundary: reads the transaction CSV into a Polars DataFrame.

use polars::prelude::*;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error("File not found: {0}")]
    FileNotFound(String),
}

/// Load a CSV file using Polars.
///
/// Performs no transformation. A missing or malformed source is a reported
/// failure; the caller decides whether to keep dependent actions disabled.
pub fn load_csv(file_path: &str) -> Result<DataFrame, LoaderError> {
    if !Path::new(file_path).exists() {
        return Err(LoaderError::FileNotFound(file_path.to_string()));
    }

    let df = LazyCsvReader::new(file_path)
        .with_infer_schema_length(Some(10000))
        .finish()?
        .collect()?;

    Ok(df)
}

/// Get list of column names from a DataFrame.
pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Get list of numeric column names.
pub fn numeric_columns(df: &DataFrame) -> Vec<String> {
    df.get_columns()
        .iter()
        .filter(|col| {
            matches!(
                col.dtype(),
                DataType::Float32
                    | DataType::Float64
                    | DataType::Int8
                    | DataType::Int16
                    | DataType::Int32
                    | DataType::Int64
                    | DataType::UInt8
                    | DataType::UInt16
                    | DataType::UInt32
                    | DataType::UInt64
            )
        })
        .map(|col| col.name().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_nonexistent_path_reports_failure() {
        let result = load_csv("/no/such/dir/creditcard.csv");
        assert!(matches!(result, Err(LoaderError::FileNotFound(_))));
    }

    #[test]
    fn load_reads_header_and_rows() {
        let dir = std::env::temp_dir().join("fraudlens_loader_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("tiny.csv");
        std::fs::write(&path, "V1,Amount,Class\n0.1,10.0,0\n0.2,20.0,1\n").unwrap();

        let df = load_csv(path.to_str().unwrap()).unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(column_names(&df), vec!["V1", "Amount", "Class"]);
        assert_eq!(numeric_columns(&df).len(), 3);
    }
}
