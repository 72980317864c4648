//! Parquet file summaries.
//!
//! Reports row and column counts for Parquet files inside a fixed data
//! directory. Only the file footer is read; row groups are never decoded.

use std::fs::File;
use std::path::{Component, Path, PathBuf};

use parquet::file::reader::{FileReader, SerializedFileReader};
use serde::Serialize;
use tracing::debug;

use crate::error::SummaryError;

/// Default data directory, relative to the working directory.
pub const DEFAULT_DATA_DIR: &str = "data";

/// Row and column counts of a Parquet file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileSummary {
    /// Filename as requested (relative to the data directory).
    pub filename: String,
    /// Number of data rows recorded in the footer.
    pub rows: u64,
    /// Number of top-level columns in the schema.
    pub columns: usize,
}

impl FileSummary {
    /// Human-readable description returned to tool callers.
    #[must_use]
    pub fn describe(&self) -> String {
        format!(
            "Parquet file '{}' has {} rows and {} columns.",
            self.filename, self.rows, self.columns
        )
    }
}

/// Reads summaries of Parquet files in a designated data directory.
///
/// Stateless apart from the directory path, so it can be shared freely
/// between concurrent tool calls.
#[derive(Debug, Clone)]
pub struct SummaryProvider {
    data_dir: PathBuf,
}

impl SummaryProvider {
    /// Creates a provider rooted at `data_dir`.
    #[must_use]
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Returns the data directory.
    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Summarises `filename`, which must name a file inside the data directory.
    ///
    /// Every call re-reads the footer.
    ///
    /// # Errors
    ///
    /// - [`SummaryError::InvalidArguments`] if the name is empty, absolute,
    ///   or escapes the data directory.
    /// - [`SummaryError::FileNotFound`] if no such file exists.
    /// - [`SummaryError::UnreadableFormat`] if the file is not valid Parquet.
    pub fn summarize(&self, filename: &str) -> Result<FileSummary, SummaryError> {
        let path = self.resolve(filename)?;

        let file = File::open(&path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => SummaryError::FileNotFound { path: path.clone() },
            _ => SummaryError::UnreadableFormat {
                path: path.clone(),
                message: e.to_string(),
            },
        })?;

        let reader = SerializedFileReader::new(file).map_err(|e| SummaryError::UnreadableFormat {
            path: path.clone(),
            message: e.to_string(),
        })?;

        let metadata = reader.metadata().file_metadata();
        let rows = u64::try_from(metadata.num_rows()).map_err(|_| {
            SummaryError::UnreadableFormat {
                path: path.clone(),
                message: format!("negative row count {}", metadata.num_rows()),
            }
        })?;
        let columns = metadata.schema_descr().root_schema().get_fields().len();

        debug!(filename, rows, columns, "read parquet footer");

        Ok(FileSummary {
            filename: filename.to_string(),
            rows,
            columns,
        })
    }

    /// Lists `*.parquet` files directly inside the data directory, sorted.
    ///
    /// A missing data directory yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the directory exists but cannot be read.
    pub fn list_files(&self) -> std::io::Result<Vec<String>> {
        let entries = match std::fs::read_dir(&self.data_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry?;
            let path = entry.path();
            let is_parquet = path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("parquet"));
            if is_parquet
                && path.is_file()
                && let Some(name) = path.file_name().and_then(|n| n.to_str())
            {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    /// Maps a requested filename onto a path inside the data directory.
    fn resolve(&self, filename: &str) -> Result<PathBuf, SummaryError> {
        if filename.is_empty() {
            return Err(SummaryError::InvalidArguments {
                message: "filename must not be empty".to_string(),
            });
        }

        let relative = Path::new(filename);
        if !relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
        {
            return Err(SummaryError::InvalidArguments {
                message: format!(
                    "filename must be relative to the data directory without `..`: {filename}"
                ),
            });
        }

        let path = self.data_dir.join(relative);
        if !path.exists() {
            return Err(SummaryError::FileNotFound { path });
        }
        if !path.is_file() {
            return Err(SummaryError::InvalidArguments {
                message: format!("not a regular file: {filename}"),
            });
        }

        // Symlinks may still point outside the data directory.
        let root = self
            .data_dir
            .canonicalize()
            .map_err(|_| SummaryError::FileNotFound { path: path.clone() })?;
        let target = path
            .canonicalize()
            .map_err(|_| SummaryError::FileNotFound { path: path.clone() })?;
        if !target.starts_with(&root) {
            return Err(SummaryError::InvalidArguments {
                message: format!("filename resolves outside the data directory: {filename}"),
            });
        }

        Ok(target)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use std::fs::File;
    use std::path::Path;
    use std::sync::Arc;

    use parquet::data_type::Int32Type;
    use parquet::file::properties::WriterProperties;
    use parquet::file::writer::SerializedFileWriter;
    use parquet::schema::parser::parse_message_type;

    /// Writes a Parquet file of `columns` INT32 columns and `rows` rows.
    ///
    /// With `rows == 0` no row group is written, leaving schema-only metadata.
    pub(crate) fn write_parquet(path: &Path, columns: usize, rows: usize) {
        let fields: String = (0..columns)
            .map(|i| format!("REQUIRED INT32 col_{i};"))
            .collect();
        let schema = parse_message_type(&format!("message sample {{ {fields} }}"))
            .unwrap_or_else(|e| unreachable!("schema: {e}"));
        let file = File::create(path).unwrap_or_else(|e| unreachable!("create: {e}"));
        let props = Arc::new(WriterProperties::builder().build());
        let mut writer = SerializedFileWriter::new(file, Arc::new(schema), props)
            .unwrap_or_else(|e| unreachable!("writer: {e}"));

        if rows > 0 {
            let values: Vec<i32> = (0..rows).map(|v| i32::try_from(v).unwrap_or(0)).collect();
            let mut row_group = writer
                .next_row_group()
                .unwrap_or_else(|e| unreachable!("row group: {e}"));
            while let Some(mut column) = row_group
                .next_column()
                .unwrap_or_else(|e| unreachable!("column: {e}"))
            {
                column
                    .typed::<Int32Type>()
                    .write_batch(&values, None, None)
                    .unwrap_or_else(|e| unreachable!("write: {e}"));
                column.close().unwrap_or_else(|e| unreachable!("close: {e}"));
            }
            row_group
                .close()
                .unwrap_or_else(|e| unreachable!("row group close: {e}"));
        }

        writer
            .close()
            .unwrap_or_else(|e| unreachable!("writer close: {e}"));
    }
}
