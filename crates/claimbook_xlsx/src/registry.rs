//! Creditor registry sheet: the name/id lookup table.

use crate::conf::{
    C_LABEL_CREDITOR, C_LABEL_REGISTRY_ID, C_RANGE_NAME_CREDITOR_IDS, C_TABLE_NAME_REGISTRY,
    TUP_REGISTRY_COLUMN_WIDTHS,
};
use crate::spec::{
    EnumCellContent, EnumStyleRole, SpecCellModel, SpecCreditorRecord, SpecGridRegion,
    SpecNamedRange, SpecSheetModel, SpecTableRegion,
};

/// Build the registry sheet: header row, then one row per record in input order.
///
/// The ID data rows are exposed as the workbook name [`C_RANGE_NAME_CREDITOR_IDS`].
/// With no records only the header row is written; no table or name is
/// declared since an empty data range has no address.
pub fn build_registry_sheet(records: &[SpecCreditorRecord], sheet_name: &str) -> SpecSheetModel {
    let mut sheet = SpecSheetModel::new(sheet_name);
    sheet.widths_by_col = TUP_REGISTRY_COLUMN_WIDTHS
        .iter()
        .copied()
        .enumerate()
        .collect();

    let l_headers = [C_LABEL_CREDITOR, C_LABEL_REGISTRY_ID];
    for (col, label) in l_headers.iter().enumerate() {
        sheet.cells.push(SpecCellModel::new(
            0,
            col,
            EnumCellContent::String(label.to_string()),
            EnumStyleRole::RegistryHeader,
        ));
    }
    for (idx, record) in records.iter().enumerate() {
        let row = idx + 1;
        sheet.cells.push(SpecCellModel::new(
            row,
            0,
            EnumCellContent::String(record.name.clone()),
            EnumStyleRole::RegistryText,
        ));
        sheet.cells.push(SpecCellModel::new(
            row,
            1,
            EnumCellContent::String(record.id.clone()),
            EnumStyleRole::RegistryText,
        ));
    }

    if records.is_empty() {
        return sheet;
    }

    let row_last = records.len();
    sheet.tables.push(SpecTableRegion {
        name: C_TABLE_NAME_REGISTRY.to_string(),
        region: SpecGridRegion::new(0, 0, row_last, 1),
        headers: l_headers.iter().map(|label| label.to_string()).collect(),
        header_style: EnumStyleRole::RegistryHeader,
    });
    sheet.named_ranges.push(SpecNamedRange {
        name: C_RANGE_NAME_CREDITOR_IDS.to_string(),
        sheet_name: sheet_name.to_string(),
        region: SpecGridRegion::new(1, 1, row_last, 1),
    });

    sheet
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::derive_range_ref;

    #[test]
    fn test_registry_rows_and_named_range() {
        let records = vec![
            SpecCreditorRecord::new("Test1", "A1231"),
            SpecCreditorRecord::new("Test2", "B2231"),
        ];
        let sheet = build_registry_sheet(&records, "Creditor");

        assert_eq!(sheet.count_rows(), 3);
        assert_eq!(sheet.named_ranges.len(), 1);
        assert_eq!(derive_range_ref(&sheet.named_ranges[0].region), "B2:B3");
        assert_eq!(sheet.tables[0].region, SpecGridRegion::new(0, 0, 2, 1));
        assert_eq!(
            sheet.cell_at(2, 1).map(|cell| &cell.content),
            Some(&EnumCellContent::String("B2231".to_string()))
        );
        assert_eq!(
            sheet.cell_at(0, 0).map(|cell| cell.style),
            Some(EnumStyleRole::RegistryHeader)
        );
    }

    #[test]
    fn test_registry_keeps_input_order() {
        let records = vec![
            SpecCreditorRecord::new("Zeta", "Z1"),
            SpecCreditorRecord::new("Alpha", "A1"),
        ];
        let sheet = build_registry_sheet(&records, "Creditor");
        assert_eq!(
            sheet.cell_at(1, 0).map(|cell| &cell.content),
            Some(&EnumCellContent::String("Zeta".to_string()))
        );
    }

    #[test]
    fn test_empty_registry_has_header_only() {
        let sheet = build_registry_sheet(&[], "Creditor");
        assert_eq!(sheet.count_rows(), 1);
        assert!(sheet.tables.is_empty());
        assert!(sheet.named_ranges.is_empty());
    }
}
