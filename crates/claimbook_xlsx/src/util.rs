//! Stateless helpers: A1 grid addressing and name normalization.
//!
//! All row/column to A1 text conversion goes through this module; callers
//! never concatenate positional strings themselves.

use std::collections::BTreeMap;

use rust_xlsxwriter::utility::column_number_to_name;

use crate::conf::{N_LEN_EXCEL_SHEET_NAME_MAX, N_NCOLS_EXCEL_MAX, TUP_EXCEL_ILLEGAL};
use crate::error::{LedgerError, LedgerResult};
use crate::spec::SpecGridRegion;

////////////////////////////////////////////////////////////////////////////////
// #region GridAddress

/// Convert zero-based column index to column letters (`0 -> A`, `26 -> AA`).
///
/// `col` must be below [`N_NCOLS_EXCEL_MAX`]; planned blocks never exceed it.
pub fn derive_column_name(col: usize) -> String {
    debug_assert!(col < N_NCOLS_EXCEL_MAX, "column index out of range: {col}");
    column_number_to_name(col as u16)
}

/// Convert column letters back to a zero-based index; `None` for invalid text.
pub fn parse_column_name(name: &str) -> Option<usize> {
    if name.is_empty() {
        return None;
    }
    let mut n_col = 0usize;
    for chr in name.chars() {
        if !chr.is_ascii_alphabetic() {
            return None;
        }
        let n_digit = (chr.to_ascii_uppercase() as u8 - b'A') as usize + 1;
        n_col = n_col.checked_mul(26)?.checked_add(n_digit)?;
    }
    let n_col = n_col - 1;
    (n_col < N_NCOLS_EXCEL_MAX).then_some(n_col)
}

/// Relative A1 reference (`D3`).
pub fn derive_cell_ref(row: usize, col: usize) -> String {
    format!("{}{}", derive_column_name(col), row + 1)
}

/// Absolute A1 reference (`$D$3`).
pub fn derive_cell_ref_absolute(row: usize, col: usize) -> String {
    format!("${}${}", derive_column_name(col), row + 1)
}

/// Column-absolute, row-relative A1 reference (`$D3`).
///
/// Keeps pointing at the same column while a rule's row offset shifts.
pub fn derive_cell_ref_col_absolute(row: usize, col: usize) -> String {
    format!("${}{}", derive_column_name(col), row + 1)
}

/// Relative A1 range (`D3:F3`); a single cell collapses to `D3`.
pub fn derive_range_ref(region: &SpecGridRegion) -> String {
    let c_start = derive_cell_ref(region.row_start, region.col_start);
    if region.row_start == region.row_end && region.col_start == region.col_end {
        return c_start;
    }
    format!(
        "{c_start}:{}",
        derive_cell_ref(region.row_end, region.col_end)
    )
}

/// Absolute A1 range (`$B$2:$B$5`).
pub fn derive_range_ref_absolute(region: &SpecGridRegion) -> String {
    format!(
        "{}:{}",
        derive_cell_ref_absolute(region.row_start, region.col_start),
        derive_cell_ref_absolute(region.row_end, region.col_end)
    )
}

/// Sheet-qualified absolute range (`Creditor!$B$2:$B$5`), quoting the sheet when needed.
pub fn derive_sheet_range_ref(sheet_name: &str, region: &SpecGridRegion) -> String {
    let if_plain = sheet_name
        .chars()
        .all(|chr| chr.is_ascii_alphanumeric() || chr == '_')
        && !sheet_name.starts_with(|chr: char| chr.is_ascii_digit());
    let c_sheet = if if_plain {
        sheet_name.to_string()
    } else {
        format!("'{}'", sheet_name.replace('\'', "''"))
    };
    format!("{c_sheet}!{}", derive_range_ref_absolute(region))
}

/// Parse an A1 reference (with or without `$` anchors) into zero-based `(row, col)`.
pub fn parse_cell_ref(cell_ref: &str) -> Option<(usize, usize)> {
    let c_ref = cell_ref.replace('$', "");
    let n_split = c_ref.find(|chr: char| chr.is_ascii_digit())?;
    let (c_col, c_row) = c_ref.split_at(n_split);
    let n_col = parse_column_name(c_col)?;
    let n_row = c_row.parse::<usize>().ok()?.checked_sub(1)?;
    Some((n_row, n_col))
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region NameNormalization

/// Replace invalid chars and trim to valid Excel sheet name.
pub fn sanitize_sheet_name(name: &str, replace_to: &str) -> String {
    let mut c_name = name.to_string();
    for c_illegal in TUP_EXCEL_ILLEGAL {
        c_name = c_name.replace(c_illegal, replace_to);
    }
    c_name = c_name.trim().to_string();
    if c_name.is_empty() {
        c_name = "Sheet".to_string();
    }

    c_name.chars().take(N_LEN_EXCEL_SHEET_NAME_MAX).collect()
}

/// Validate that `names` has no duplicates (case-insensitive, as Excel compares them).
pub fn validate_unique_names(kind: &str, names: &[String]) -> LedgerResult<()> {
    let mut dict_pos: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for (n_idx, c_name) in names.iter().enumerate() {
        dict_pos
            .entry(c_name.to_lowercase())
            .or_default()
            .push(n_idx);
    }

    let c_msg = dict_pos
        .iter()
        .filter_map(|(c_name, l_pos)| {
            if l_pos.len() > 1 {
                Some(format!(
                    "{c_name:?} x{} at indices {:?}",
                    l_pos.len(),
                    l_pos
                ))
            } else {
                None
            }
        })
        .collect::<Vec<_>>()
        .join("; ");

    if c_msg.is_empty() {
        return Ok(());
    }
    Err(LedgerError::configuration(format!(
        "Duplicate {kind} names detected: {c_msg}"
    )))
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region IndexRanges

/// Convert sorted indices to contiguous inclusive ranges.
pub fn derive_contiguous_ranges(sorted_indices: &[usize]) -> Vec<(usize, usize)> {
    if sorted_indices.is_empty() {
        return vec![];
    }

    let mut l_contiguous_ranges = Vec::new();
    let mut n_idx_start = sorted_indices[0];
    let mut n_idx_end = sorted_indices[0];

    for idx in &sorted_indices[1..] {
        if *idx == n_idx_end + 1 {
            n_idx_end = *idx;
        } else {
            l_contiguous_ranges.push((n_idx_start, n_idx_end));
            n_idx_start = *idx;
            n_idx_end = *idx;
        }
    }

    l_contiguous_ranges.push((n_idx_start, n_idx_end));
    l_contiguous_ranges
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
