//! Creditor record sources.

use std::io::Cursor;
use std::path::Path;

use log::info;
use polars::prelude::{DataFrame, DataType, IpcReader, SerReader};

use crate::error::{LedgerError, LedgerResult};
use crate::spec::SpecCreditorRecord;

/// Column holding the creditor name in an IPC source.
pub const C_COL_NAME: &str = "name";
/// Column holding the creditor id in an IPC source.
pub const C_COL_ID: &str = "id";

/// Built-in creditor list used when no source is given.
pub fn derive_sample_creditor_records() -> Vec<SpecCreditorRecord> {
    vec![
        SpecCreditorRecord::new("Test1", "A1231"),
        SpecCreditorRecord::new("Test2", "B2231"),
        SpecCreditorRecord::new("Test3", "C3231"),
        SpecCreditorRecord::new("Test4", "D4231"),
    ]
}

/// Read creditor records from an Arrow IPC file.
pub fn load_creditor_records_from_ipc_file(path: &Path) -> LedgerResult<Vec<SpecCreditorRecord>> {
    let v_ipc_df = std::fs::read(path)?;
    let l_records = load_creditor_records_from_ipc_bytes(&v_ipc_df)?;
    info!(
        "loaded {} creditor records from {}",
        l_records.len(),
        path.display()
    );
    Ok(l_records)
}

/// Read creditor records from IPC-serialized dataframe bytes.
///
/// `name` and `id` must be present and castable to strings; row order is kept.
pub fn load_creditor_records_from_ipc_bytes(
    v_ipc_df: &[u8],
) -> LedgerResult<Vec<SpecCreditorRecord>> {
    let df = IpcReader::new(Cursor::new(v_ipc_df))
        .finish()
        .map_err(|err| {
            LedgerError::input_validation(format!("Failed to read IPC DataFrame bytes: {err}"))
        })?;
    derive_creditor_records_from_dataframe(&df)
}

/// Convert a `name`/`id` dataframe into records; nulls are rejected.
pub fn derive_creditor_records_from_dataframe(
    df: &DataFrame,
) -> LedgerResult<Vec<SpecCreditorRecord>> {
    let l_names = derive_string_column(df, C_COL_NAME)?;
    let l_ids = derive_string_column(df, C_COL_ID)?;

    l_names
        .into_iter()
        .zip(l_ids)
        .enumerate()
        .map(|(n_idx, (name, id))| match (name, id) {
            (Some(name), Some(id)) => Ok(SpecCreditorRecord { name, id }),
            _ => Err(LedgerError::input_validation(format!(
                "creditor row {n_idx} has a missing {C_COL_NAME:?} or {C_COL_ID:?}."
            ))),
        })
        .collect()
}

fn derive_string_column(df: &DataFrame, col_name: &str) -> LedgerResult<Vec<Option<String>>> {
    let col = df.column(col_name).map_err(|_| {
        LedgerError::input_validation(format!("Column not found: {col_name:?}"))
    })?;
    let col = col.cast(&DataType::String).map_err(|err| {
        LedgerError::input_validation(format!("Column {col_name:?} is not text-like: {err}"))
    })?;
    let ca = col.str().map_err(|err| {
        LedgerError::input_validation(format!("Column {col_name:?} is not text-like: {err}"))
    })?;
    Ok(ca
        .into_iter()
        .map(|value| value.map(ToString::to_string))
        .collect())
}

#[cfg(test)]
mod tests {
    use polars::prelude::{IpcWriter, NamedFrom, Series, SerWriter};

    use super::*;

    fn derive_ipc_bytes(mut df: DataFrame) -> Vec<u8> {
        let mut v_buf = Vec::new();
        IpcWriter::new(&mut v_buf).finish(&mut df).unwrap();
        v_buf
    }

    #[test]
    fn test_load_records_keeps_row_order() {
        let df = DataFrame::new(vec![
            Series::new("name".into(), &["Zeta", "Alpha"]).into(),
            Series::new("id".into(), &["Z9", "A1"]).into(),
        ])
        .unwrap();

        let l_records = load_creditor_records_from_ipc_bytes(&derive_ipc_bytes(df)).unwrap();
        assert_eq!(
            l_records,
            vec![
                SpecCreditorRecord::new("Zeta", "Z9"),
                SpecCreditorRecord::new("Alpha", "A1"),
            ]
        );
    }

    #[test]
    fn test_numeric_ids_are_cast_to_text() {
        let df = DataFrame::new(vec![
            Series::new("name".into(), &["Test1"]).into(),
            Series::new("id".into(), &[1231i64]).into(),
        ])
        .unwrap();

        let l_records = derive_creditor_records_from_dataframe(&df).unwrap();
        assert_eq!(l_records[0].id, "1231");
    }

    #[test]
    fn test_missing_column_or_null_is_input_error() {
        let df = DataFrame::new(vec![Series::new("name".into(), &["Test1"]).into()]).unwrap();
        let err = derive_creditor_records_from_dataframe(&df).unwrap_err();
        assert!(matches!(err, LedgerError::InputValidation(_)));

        let df = DataFrame::new(vec![
            Series::new("name".into(), &[Some("Test1"), None]).into(),
            Series::new("id".into(), &["A", "B"]).into(),
        ])
        .unwrap();
        assert!(derive_creditor_records_from_dataframe(&df).is_err());
    }

    #[test]
    fn test_garbage_bytes_are_input_error() {
        let err = load_creditor_records_from_ipc_bytes(b"not arrow").unwrap_err();
        assert!(matches!(err, LedgerError::InputValidation(_)));
    }
}
