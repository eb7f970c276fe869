use std::fmt;
use std::path::PathBuf;

/// Summary of a completed transform stage.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformReport {
    /// Directory holding the staged parquet parts; the only input of the load stage.
    pub staging_dir: PathBuf,
    pub raw_trips: usize,
    /// Trips dropped by the cleaner's quality filters.
    pub rejected_trips: usize,
    pub weather_observations: usize,
    pub global_avg_temperature: f64,
    pub output_rows: usize,
    pub output_columns: usize,
    pub staged_files: Vec<PathBuf>,
}

/// Summary of the analytical table after a load.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadReport {
    pub table: String,
    pub rows: usize,
    pub columns: usize,
    pub column_names: Vec<String>,
    /// First rows in whatever order SQLite returns them, rendered as text.
    pub sample: Vec<Vec<String>>,
}

impl fmt::Display for LoadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Table '{}' loaded", self.table)?;
        writeln!(f, "Rows: {} | Columns: {}", self.rows, self.columns)?;
        writeln!(f, "Sample rows:")?;
        writeln!(f, "{}", self.column_names.join(" | "))?;
        for row in &self.sample {
            writeln!(f, "{}", row.join(" | "))?;
        }
        Ok(())
    }
}
