//! Storage codecs — format-specific artifact read/write.
//!
//! Three interchangeable formats:
//! - `csv`: delimited text. Dtypes are re-inferred on read, so integer
//!   columns with missing values come back as floats; the index designation
//!   is not carried and must be restored from metadata.
//! - `pkl`: bincode of an owned column-major value table. Preserves dtypes
//!   and the index designation exactly.
//! - `feather`: Arrow IPC. Preserves dtypes; the index designation is
//!   flattened into ordinary columns on write and restored from metadata.

use crate::config::FileFormat;
use crate::dataset::Dataset;
use crate::error::DataError;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Write `dataset` to `path` in the given format, overwriting wholesale.
pub fn write(dataset: &Dataset, path: &Path, format: FileFormat) -> Result<(), DataError> {
    match format {
        FileFormat::Csv => write_csv(dataset.frame(), path),
        FileFormat::Pkl => write_pkl(dataset, path),
        FileFormat::Feather => write_feather(dataset.frame(), path),
    }
}

/// Read the artifact at `path` in the given format.
///
/// For `csv` and `feather` the returned dataset has no index designation;
/// the cache resolver restores it from the metadata record.
pub fn read(path: &Path, format: FileFormat) -> Result<Dataset, DataError> {
    match format {
        FileFormat::Csv => read_csv(path).map(Dataset::new),
        FileFormat::Pkl => read_pkl(path),
        FileFormat::Feather => read_feather(path).map(Dataset::new),
    }
}

// ── csv ─────────────────────────────────────────────────────────────

fn write_csv(frame: &DataFrame, path: &Path) -> Result<(), DataError> {
    let mut file =
        fs::File::create(path).map_err(|e| DataError::Codec(format!("create file: {e}")))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(&mut frame.clone())
        .map_err(|e| DataError::Codec(format!("write csv: {e}")))?;
    Ok(())
}

fn read_csv(path: &Path) -> Result<DataFrame, DataError> {
    LazyCsvReader::new(path)
        .with_has_header(true)
        .finish()
        .map_err(|e| DataError::Codec(format!("open csv: {e}")))?
        .collect()
        .map_err(|e| DataError::Codec(format!("read csv: {e}")))
}

// ── feather (Arrow IPC) ─────────────────────────────────────────────

fn write_feather(frame: &DataFrame, path: &Path) -> Result<(), DataError> {
    let file =
        fs::File::create(path).map_err(|e| DataError::Codec(format!("create file: {e}")))?;
    IpcWriter::new(file)
        .finish(&mut frame.clone())
        .map_err(|e| DataError::Codec(format!("write feather: {e}")))?;
    Ok(())
}

fn read_feather(path: &Path) -> Result<DataFrame, DataError> {
    let file = fs::File::open(path).map_err(|e| DataError::Codec(format!("open: {e}")))?;
    IpcReader::new(file)
        .finish()
        .map_err(|e| DataError::Codec(format!("read feather: {e}")))
}

// ── pkl (row-oriented binary) ───────────────────────────────────────

/// Serializable form of a dataset. Column values are stored with their
/// logical type so a round trip is exact (ints stay ints, datetimes keep
/// their unit), and the index designation travels inside the artifact.
#[derive(Serialize, Deserialize)]
struct PklTable {
    index: Vec<String>,
    columns: Vec<PklColumn>,
}

#[derive(Serialize, Deserialize)]
struct PklColumn {
    name: String,
    values: PklValues,
}

#[derive(Serialize, Deserialize)]
enum PklValues {
    Int64(Vec<Option<i64>>),
    Float64(Vec<Option<f64>>),
    Bool(Vec<Option<bool>>),
    Str(Vec<Option<String>>),
    /// Microseconds since the epoch.
    DatetimeMicros(Vec<Option<i64>>),
    /// Days since the epoch.
    DateDays(Vec<Option<i32>>),
}

fn write_pkl(dataset: &Dataset, path: &Path) -> Result<(), DataError> {
    let table = encode_pkl(dataset)?;
    let bytes = bincode::serialize(&table)
        .map_err(|e| DataError::Codec(format!("serialize pkl: {e}")))?;
    fs::write(path, bytes).map_err(|e| DataError::Codec(format!("write pkl: {e}")))?;
    Ok(())
}

fn read_pkl(path: &Path) -> Result<Dataset, DataError> {
    let bytes = fs::read(path).map_err(|e| DataError::Codec(format!("open: {e}")))?;
    let table: PklTable = bincode::deserialize(&bytes)
        .map_err(|e| DataError::Codec(format!("deserialize pkl: {e}")))?;
    decode_pkl(table)
}

fn encode_pkl(dataset: &Dataset) -> Result<PklTable, DataError> {
    let mut columns = Vec::with_capacity(dataset.width());

    for column in dataset.frame().get_columns() {
        let name = column.name().to_string();
        let values = match column.dtype() {
            DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64 => PklValues::Int64(int64_values(column, &name)?),
            DataType::Float64 | DataType::Float32 => {
                let cast = column
                    .cast(&DataType::Float64)
                    .map_err(|e| DataError::Codec(format!("column '{name}': {e}")))?;
                PklValues::Float64(
                    cast.f64()
                        .map_err(|e| DataError::Codec(format!("column '{name}': {e}")))?
                        .to_vec(),
                )
            }
            DataType::Boolean => PklValues::Bool(
                column
                    .bool()
                    .map_err(|e| DataError::Codec(format!("column '{name}': {e}")))?
                    .iter()
                    .collect(),
            ),
            DataType::String => PklValues::Str(
                column
                    .str()
                    .map_err(|e| DataError::Codec(format!("column '{name}': {e}")))?
                    .iter()
                    .map(|v| v.map(String::from))
                    .collect(),
            ),
            DataType::Datetime(_, _) => {
                let cast = column
                    .cast(&DataType::Datetime(TimeUnit::Microseconds, None))
                    .and_then(|c| c.cast(&DataType::Int64))
                    .map_err(|e| DataError::Codec(format!("column '{name}': {e}")))?;
                PklValues::DatetimeMicros(
                    cast.i64()
                        .map_err(|e| DataError::Codec(format!("column '{name}': {e}")))?
                        .to_vec(),
                )
            }
            DataType::Date => {
                let cast = column
                    .cast(&DataType::Int32)
                    .map_err(|e| DataError::Codec(format!("column '{name}': {e}")))?;
                PklValues::DateDays(
                    cast.i32()
                        .map_err(|e| DataError::Codec(format!("column '{name}': {e}")))?
                        .to_vec(),
                )
            }
            other => {
                return Err(DataError::Codec(format!(
                    "unsupported dtype {other:?} in column '{name}'"
                )))
            }
        };
        columns.push(PklColumn { name, values });
    }

    Ok(PklTable {
        index: dataset.index().to_vec(),
        columns,
    })
}

fn int64_values(column: &Column, name: &str) -> Result<Vec<Option<i64>>, DataError> {
    let cast = column
        .cast(&DataType::Int64)
        .map_err(|e| DataError::Codec(format!("column '{name}': {e}")))?;
    Ok(cast
        .i64()
        .map_err(|e| DataError::Codec(format!("column '{name}': {e}")))?
        .to_vec())
}

fn decode_pkl(table: PklTable) -> Result<Dataset, DataError> {
    let mut columns = Vec::with_capacity(table.columns.len());

    for pkl_column in table.columns {
        let name = pkl_column.name;
        let column = match pkl_column.values {
            PklValues::Int64(v) => Column::new(name.as_str().into(), v),
            PklValues::Float64(v) => Column::new(name.as_str().into(), v),
            PklValues::Bool(v) => Column::new(name.as_str().into(), v),
            PklValues::Str(v) => Column::new(name.as_str().into(), v),
            PklValues::DatetimeMicros(v) => Column::new(name.as_str().into(), v)
                .cast(&DataType::Datetime(TimeUnit::Microseconds, None))
                .map_err(|e| DataError::Codec(format!("column '{name}': {e}")))?,
            PklValues::DateDays(v) => Column::new(name.as_str().into(), v)
                .cast(&DataType::Date)
                .map_err(|e| DataError::Codec(format!("column '{name}': {e}")))?,
        };
        columns.push(column);
    }

    let frame = DataFrame::new(columns)
        .map_err(|e| DataError::Codec(format!("rebuild dataframe: {e}")))?;
    Dataset::with_index(frame, table.index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicU64, Ordering};

    static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

    fn temp_path(ext: &str) -> PathBuf {
        let id = TEST_COUNTER.fetch_add(1, Ordering::Relaxed);
        let dir = env::temp_dir().join(format!("datashed_codec_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir.join(format!("artifact_{id}.{ext}"))
    }

    fn sample() -> Dataset {
        Dataset::new(
            df!(
                "A" => [0i64, 1, 2],
                "B" => [3.5f64, 4.5, 5.5],
                "C" => ["x", "y", "z"],
            )
            .unwrap(),
        )
    }

    #[test]
    fn csv_roundtrip_reinfers_types() {
        let path = temp_path("csv");
        write(&sample(), &path, FileFormat::Csv).unwrap();
        let loaded = read(&path, FileFormat::Csv).unwrap();

        assert!(loaded.content_eq(&sample()));
        // csv carries no index designation
        assert!(loaded.index().is_empty());
    }

    #[test]
    fn feather_roundtrip_preserves_dtypes_but_not_index() {
        let path = temp_path("feather");
        let ds = Dataset::with_index(sample().into_frame(), vec!["C".into()]).unwrap();
        write(&ds, &path, FileFormat::Feather).unwrap();

        let loaded = read(&path, FileFormat::Feather).unwrap();
        assert!(loaded.index().is_empty());
        assert!(loaded.frame().equals(sample().frame()));
    }

    #[test]
    fn pkl_roundtrip_preserves_index_and_dtypes() {
        let path = temp_path("pkl");
        let micros = vec![Some(1_577_836_800_000_000i64), None, Some(0)];
        let frame = DataFrame::new(vec![
            Column::new("Date".into(), micros)
                .cast(&DataType::Datetime(TimeUnit::Microseconds, None))
                .unwrap(),
            Column::new("n".into(), vec![Some(1i64), Some(2), None]),
        ])
        .unwrap();
        let ds = Dataset::with_index(frame, vec!["Date".into()]).unwrap();

        write(&ds, &path, FileFormat::Pkl).unwrap();
        let loaded = read(&path, FileFormat::Pkl).unwrap();

        assert_eq!(loaded.index(), ["Date"]);
        assert_eq!(
            loaded.frame().column("Date").unwrap().dtype(),
            &DataType::Datetime(TimeUnit::Microseconds, None)
        );
        assert!(loaded.frame().equals_missing(ds.frame()));
    }

    #[test]
    fn pkl_narrows_to_int64_on_write() {
        let path = temp_path("pkl");
        let frame = DataFrame::new(vec![Column::new("small".into(), vec![1i32, 2, 3])]).unwrap();
        write(&Dataset::new(frame), &path, FileFormat::Pkl).unwrap();

        let loaded = read(&path, FileFormat::Pkl).unwrap();
        assert_eq!(
            loaded.frame().column("small").unwrap().dtype(),
            &DataType::Int64
        );
    }

    #[test]
    fn overwrite_replaces_previous_artifact() {
        let path = temp_path("csv");
        write(&sample(), &path, FileFormat::Csv).unwrap();

        let smaller = Dataset::new(df!("A" => [9i64]).unwrap());
        write(&smaller, &path, FileFormat::Csv).unwrap();

        let loaded = read(&path, FileFormat::Csv).unwrap();
        assert_eq!(loaded.height(), 1);
        assert_eq!(loaded.width(), 1);
    }
}
