//! Block planner: places one claim table per creditor on the main sheet.

use log::debug;

use crate::conf::{N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX, N_ROWS_BLOCK_PREAMBLE};
use crate::error::{LedgerError, LedgerResult};
use crate::spec::{SpecBlockGeometry, SpecColumn, SpecCreditorRecord, SpecLedgerLayout};

/// Check that blocks of `layout` can never overlap.
pub fn validate_layout(layout: &SpecLedgerLayout) -> LedgerResult<()> {
    if layout.height_block == 0 {
        return Err(LedgerError::configuration(
            "height_block must be >= 1.",
        ));
    }
    let row_gap_min = layout.row_gap_min().ok_or_else(|| {
        LedgerError::configuration(format!(
            "height_block={} exceeds the addressable row range.",
            layout.height_block
        ))
    })?;
    if layout.row_gap < row_gap_min {
        return Err(LedgerError::configuration(format!(
            "row_gap={} overlaps blocks: must be >= height_block + {N_ROWS_BLOCK_PREAMBLE} \
             = {row_gap_min}.",
            layout.row_gap
        )));
    }
    Ok(())
}

/// Compute the geometry of each creditor's block, in input order.
///
/// Block `i` starts at row `i * row_gap`: name row, header row, then
/// `height_block` data rows.
pub fn plan_table_blocks(
    records: &[SpecCreditorRecord],
    columns: &[SpecColumn],
    layout: &SpecLedgerLayout,
) -> LedgerResult<Vec<SpecBlockGeometry>> {
    validate_layout(layout)?;
    if columns.is_empty() {
        return Err(LedgerError::configuration(
            "column spec must have >= 1 column.",
        ));
    }
    if columns.len() > N_NCOLS_EXCEL_MAX {
        return Err(LedgerError::configuration(format!(
            "column spec has {} columns; Excel limit is {N_NCOLS_EXCEL_MAX}.",
            columns.len()
        )));
    }

    let mut l_blocks = Vec::with_capacity(records.len());
    for (idx_block, record) in records.iter().enumerate() {
        let row_name = idx_block
            .checked_mul(layout.row_gap)
            .filter(|row| *row < N_NROWS_EXCEL_MAX)
            .ok_or_else(|| derive_row_limit_error(idx_block))?;
        let row_header = row_name + 1;
        let row_data_start = row_header + 1;
        let row_data_end = row_name
            .checked_add(layout.height_block + 1)
            .filter(|row| *row < N_NROWS_EXCEL_MAX)
            .ok_or_else(|| derive_row_limit_error(idx_block))?;

        debug!(
            "block {idx_block} ({:?}): rows {row_name}..={row_data_end}",
            record.name
        );
        l_blocks.push(SpecBlockGeometry {
            idx_block,
            row_name,
            row_header,
            row_data_start,
            row_data_end,
            width_cols: columns.len(),
        });
    }

    Ok(l_blocks)
}

fn derive_row_limit_error(idx_block: usize) -> LedgerError {
    LedgerError::configuration(format!(
        "block {idx_block} exceeds the worksheet limit of {N_NROWS_EXCEL_MAX} rows."
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conf::{EnumLayoutVersion, TUP_LEDGER_COLUMNS};

    fn derive_records(n: usize) -> Vec<SpecCreditorRecord> {
        (0..n)
            .map(|idx| SpecCreditorRecord::new(format!("Test{}", idx + 1), format!("ID{idx}")))
            .collect()
    }

    #[test]
    fn test_plan_two_blocks_v2_layout() {
        let records = vec![
            SpecCreditorRecord::new("Test1", "A1231"),
            SpecCreditorRecord::new("Test2", "B2231"),
        ];
        let l_blocks = plan_table_blocks(
            &records,
            &TUP_LEDGER_COLUMNS,
            &EnumLayoutVersion::V2.layout(),
        )
        .unwrap();

        assert_eq!(
            l_blocks,
            vec![
                SpecBlockGeometry {
                    idx_block: 0,
                    row_name: 0,
                    row_header: 1,
                    row_data_start: 2,
                    row_data_end: 26,
                    width_cols: 10,
                },
                SpecBlockGeometry {
                    idx_block: 1,
                    row_name: 30,
                    row_header: 31,
                    row_data_start: 32,
                    row_data_end: 56,
                    width_cols: 10,
                },
            ]
        );
    }

    #[test]
    fn test_plan_v1_layout_offsets() {
        let l_blocks = plan_table_blocks(
            &derive_records(3),
            &TUP_LEDGER_COLUMNS,
            &EnumLayoutVersion::V1.layout(),
        )
        .unwrap();

        assert_eq!(l_blocks[2].row_name, 40);
        assert_eq!(l_blocks[2].row_data_start, 42);
        assert_eq!(l_blocks[2].row_data_end, 57);
    }

    #[test]
    fn test_plan_rejects_overlapping_gap() {
        let err = plan_table_blocks(
            &derive_records(2),
            &TUP_LEDGER_COLUMNS,
            &SpecLedgerLayout {
                height_block: 25,
                row_gap: 20,
            },
        )
        .unwrap_err();
        assert!(matches!(err, LedgerError::Configuration(_)));
    }

    #[test]
    fn test_plan_rejects_gap_even_without_records() {
        let layout = SpecLedgerLayout {
            height_block: 25,
            row_gap: 26,
        };
        assert!(plan_table_blocks(&[], &TUP_LEDGER_COLUMNS, &layout).is_err());
    }

    #[test]
    fn test_plan_accepts_tightest_gap() {
        let layout = SpecLedgerLayout {
            height_block: 5,
            row_gap: 7,
        };
        let l_blocks = plan_table_blocks(&derive_records(2), &TUP_LEDGER_COLUMNS, &layout).unwrap();
        assert_eq!(l_blocks[0].row_data_end + 1, l_blocks[1].row_name);
    }

    #[test]
    fn test_plan_rejects_zero_height_and_empty_columns() {
        let layout = SpecLedgerLayout {
            height_block: 0,
            row_gap: 2,
        };
        assert!(plan_table_blocks(&derive_records(1), &TUP_LEDGER_COLUMNS, &layout).is_err());
        assert!(
            plan_table_blocks(&derive_records(1), &[], &SpecLedgerLayout::default()).is_err()
        );
    }

    #[test]
    fn test_plan_rejects_unaddressable_height() {
        for height_block in [usize::MAX, usize::MAX - 1, usize::MAX - 2] {
            let layout = SpecLedgerLayout {
                height_block,
                row_gap: usize::MAX,
            };
            let err =
                plan_table_blocks(&derive_records(1), &TUP_LEDGER_COLUMNS, &layout).unwrap_err();
            assert!(matches!(err, LedgerError::Configuration(_)), "{height_block}");
        }
    }

    #[test]
    fn test_plan_rejects_row_limit_overflow() {
        let layout = SpecLedgerLayout {
            height_block: 500_000,
            row_gap: 500_002,
        };
        assert!(plan_table_blocks(&derive_records(2), &TUP_LEDGER_COLUMNS, &layout).is_ok());
        let err = plan_table_blocks(&derive_records(3), &TUP_LEDGER_COLUMNS, &layout).unwrap_err();
        assert!(matches!(err, LedgerError::Configuration(_)));
    }

    #[test]
    fn test_plan_keeps_duplicate_records() {
        let records = vec![
            SpecCreditorRecord::new("Same", "X1"),
            SpecCreditorRecord::new("Same", "X1"),
        ];
        let l_blocks =
            plan_table_blocks(&records, &TUP_LEDGER_COLUMNS, &SpecLedgerLayout::default()).unwrap();
        assert_eq!(l_blocks.len(), 2);
        assert_eq!(l_blocks[1].idx_block, 1);
    }
}
