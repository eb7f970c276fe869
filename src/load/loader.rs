use crate::config::PipelineConfig;
use crate::load::error::LoadError;
use crate::load::sql_value::{affinity, quote_identifier, render, to_sql_value};
use crate::types::reports::LoadReport;
use log::{debug, info};
use polars::prelude::*;
use rusqlite::{params_from_iter, Connection};
use std::io;
use std::path::Path;
use tokio::task;

/// Rows shown in the load report.
pub const SAMPLE_ROWS: usize = 5;

/// Loads every staged parquet part into a freshly created database file.
///
/// The database file is deleted first, so the table never mixes runs. Table
/// recreation and all inserts happen in a single transaction.
pub async fn load_staging(
    staging_dir: &Path,
    database_path: &Path,
    table: &str,
) -> Result<LoadReport, LoadError> {
    validate_table_name(table)?;
    let staging_dir = staging_dir.to_path_buf();
    let database_path = database_path.to_path_buf();
    let table = table.to_string();

    task::spawn_blocking(move || {
        let df = read_staging(&staging_dir)?;
        info!(
            "Loading {} staged rows from {:?} into {:?}",
            df.height(),
            staging_dir,
            database_path
        );
        let mut conn = open_fresh_database(&database_path)?;
        replace_table(&mut conn, &table, &df)?;
        let report = inspect_table(&conn, &table)?;
        info!("{}", report);
        Ok(report)
    })
    .await?
}

fn read_staging(staging_dir: &Path) -> Result<DataFrame, LoadError> {
    let pattern = PipelineConfig::parquet_glob(staging_dir);
    let mut df = LazyFrame::scan_parquet(&pattern, Default::default())
        .map_err(|e| LoadError::StagingScan(staging_dir.to_path_buf(), e))?
        .collect()
        .map_err(|e| LoadError::StagingScan(staging_dir.to_path_buf(), e))?;
    df.as_single_chunk_par();
    Ok(df)
}

fn open_fresh_database(path: &Path) -> Result<Connection, LoadError> {
    match std::fs::remove_file(path) {
        Ok(()) => debug!("Deleted previous database {:?}", path),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(LoadError::DatabaseRemove(path.to_path_buf(), e)),
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| LoadError::DatabaseDirCreation(parent.to_path_buf(), e))?;
    }
    Connection::open(path).map_err(|e| LoadError::DatabaseOpen(path.to_path_buf(), e))
}

/// Only ASCII letters, digits and underscores, not starting with a digit.
pub fn validate_table_name(table: &str) -> Result<(), LoadError> {
    let valid = table
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && table.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(LoadError::InvalidTableName(table.to_string()))
    }
}

/// Drops, recreates and fills `table` from `df` in one transaction.
pub fn replace_table(conn: &mut Connection, table: &str, df: &DataFrame) -> Result<usize, LoadError> {
    validate_table_name(table)?;
    if df.width() == 0 {
        return Err(LoadError::EmptySchema);
    }

    let quoted_table = quote_identifier(table);
    let column_defs: Vec<String> = df
        .get_columns()
        .iter()
        .map(|c| format!("{} {}", quote_identifier(c.name()), affinity(c.dtype())))
        .collect();
    let placeholders = vec!["?"; df.width()].join(", ");

    let tx = conn.transaction()?;
    tx.execute_batch(&format!(
        "DROP TABLE IF EXISTS {quoted_table}; CREATE TABLE {quoted_table} ({});",
        column_defs.join(", ")
    ))?;
    {
        let mut insert = tx.prepare(&format!(
            "INSERT INTO {quoted_table} VALUES ({placeholders})"
        ))?;
        let columns = df.get_columns();
        for row in 0..df.height() {
            let values = columns
                .iter()
                .map(|c| c.get(row).map(to_sql_value))
                .collect::<PolarsResult<Vec<_>>>()?;
            insert.execute(params_from_iter(values.iter()))?;
        }
    }
    tx.commit()?;

    debug!("Inserted {} rows into {}", df.height(), table);
    Ok(df.height())
}

/// Row count, column list and a small unordered sample of `table`.
pub fn inspect_table(conn: &Connection, table: &str) -> Result<LoadReport, LoadError> {
    validate_table_name(table)?;
    let quoted_table = quote_identifier(table);

    let rows: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {quoted_table}"), [], |r| {
        r.get(0)
    })?;

    let mut info = conn.prepare(&format!("PRAGMA table_info({quoted_table})"))?;
    let column_names = info
        .query_map([], |r| r.get::<_, String>(1))?
        .collect::<Result<Vec<_>, _>>()?;

    let mut sample_stmt = conn.prepare(&format!(
        "SELECT * FROM {quoted_table} LIMIT {SAMPLE_ROWS}"
    ))?;
    let column_count = sample_stmt.column_count();
    let mut sample = Vec::new();
    let mut result_rows = sample_stmt.query([])?;
    while let Some(row) = result_rows.next()? {
        let mut values = Vec::with_capacity(column_count);
        for i in 0..column_count {
            values.push(render(row.get_ref(i)?));
        }
        sample.push(values);
    }

    Ok(LoadReport {
        table: table.to_string(),
        rows: rows as usize,
        columns: column_names.len(),
        column_names,
        sample,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::staging_writer::write_staging;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn staged_frame() -> DataFrame {
        let pickups = [
            NaiveDate::from_ymd_opt(2023, 1, 1)
                .unwrap()
                .and_hms_opt(8, 0, 0)
                .unwrap(),
            NaiveDate::from_ymd_opt(2023, 1, 2)
                .unwrap()
                .and_hms_opt(17, 30, 0)
                .unwrap(),
        ];
        let mut df = df!(
            "pickup_datetime" => pickups,
            "PU_Borough" => [Some("Queens"), None],
            "pickup_hour" => [8i32, 17],
            "is_weekend" => [true, false],
            "temperature" => [5.5f64, 10.0],
        )
        .unwrap();
        let dates = df
            .column("pickup_datetime")
            .unwrap()
            .as_materialized_series()
            .cast(&DataType::Date)
            .unwrap()
            .with_name("pickup_date".into());
        df.with_column(dates).unwrap();
        df
    }

    #[test]
    fn test_validate_table_name() {
        assert!(validate_table_name("taxi_weather").is_ok());
        assert!(validate_table_name("_t1").is_ok());
        assert!(validate_table_name("").is_err());
        assert!(validate_table_name("1abc").is_err());
        assert!(validate_table_name("taxi; DROP TABLE x").is_err());
    }

    #[test]
    fn test_replace_table_types_and_values() -> Result<(), Box<dyn std::error::Error>> {
        let mut conn = Connection::open_in_memory()?;
        let inserted = replace_table(&mut conn, "taxi_weather", &staged_frame())?;
        assert_eq!(inserted, 2);

        let types: Vec<(String, String)> = conn
            .prepare("PRAGMA table_info(\"taxi_weather\")")?
            .query_map([], |r| Ok((r.get(1)?, r.get(2)?)))?
            .collect::<Result<_, _>>()?;
        assert_eq!(
            types,
            vec![
                ("pickup_datetime".to_string(), "TEXT".to_string()),
                ("PU_Borough".to_string(), "TEXT".to_string()),
                ("pickup_hour".to_string(), "INTEGER".to_string()),
                ("is_weekend".to_string(), "INTEGER".to_string()),
                ("temperature".to_string(), "REAL".to_string()),
                ("pickup_date".to_string(), "TEXT".to_string()),
            ]
        );

        let (pickup, borough, weekend, date): (String, Option<String>, i64, String) = conn
            .query_row(
                "SELECT pickup_datetime, PU_Borough, is_weekend, pickup_date FROM taxi_weather WHERE pickup_hour = 8",
                [],
                |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?)),
            )?;
        assert_eq!(pickup, "2023-01-01 08:00:00");
        assert_eq!(borough.as_deref(), Some("Queens"));
        assert_eq!(weekend, 1);
        assert_eq!(date, "2023-01-01");
        Ok(())
    }

    #[test]
    fn test_replace_table_drops_previous_rows() -> Result<(), Box<dyn std::error::Error>> {
        let mut conn = Connection::open_in_memory()?;
        replace_table(&mut conn, "taxi_weather", &staged_frame())?;
        replace_table(&mut conn, "taxi_weather", &staged_frame())?;
        let report = inspect_table(&conn, "taxi_weather")?;
        assert_eq!(report.rows, 2);
        assert_eq!(report.columns, 6);
        Ok(())
    }

    #[test]
    fn test_replace_table_rejects_empty_schema() {
        let mut conn = Connection::open_in_memory().unwrap();
        let result = replace_table(&mut conn, "taxi_weather", &DataFrame::empty());
        assert!(matches!(result, Err(LoadError::EmptySchema)));
    }

    #[tokio::test]
    async fn test_load_staging_recreates_database() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let staging = dir.path().join("staging");
        let database = dir.path().join("processed").join("taxi_weather.sqlite");
        write_staging(staged_frame(), &staging, 1).await?;

        let first = load_staging(&staging, &database, "taxi_weather").await?;
        assert_eq!(first.rows, 2);
        assert_eq!(first.columns, 6);
        assert_eq!(first.sample.len(), 2);
        assert_eq!(first.column_names[1], "PU_Borough");

        let second = load_staging(&staging, &database, "taxi_weather").await?;
        assert_eq!(second.rows, first.rows);
        assert_eq!(second.column_names, first.column_names);
        Ok(())
    }

    #[tokio::test]
    async fn test_load_staging_missing_staging() {
        let dir = tempdir().unwrap();
        let result = load_staging(
            &dir.path().join("nothing_here"),
            &dir.path().join("db.sqlite"),
            "taxi_weather",
        )
        .await;
        assert!(matches!(result, Err(LoadError::StagingScan(..))));
    }
}
