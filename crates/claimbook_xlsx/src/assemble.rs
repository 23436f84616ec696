//! Report assembler: merges block geometry, rules and the registry into a document.

use log::{debug, info};

use crate::conf::{C_LABEL_CREDITOR, C_TABLE_NAME_CLAIMS_PREFIX, TUP_MAIN_COLUMN_WIDTHS};
use crate::error::{LedgerError, LedgerResult};
use crate::plan::{plan_table_blocks, validate_layout};
use crate::registry::build_registry_sheet;
use crate::rule::generate_block_rules;
use crate::spec::{
    EnumCellContent, EnumColumnKind, EnumRuleSpec, EnumStyleRole, SpecBlockGeometry,
    SpecCellModel, SpecColumn, SpecCreditorRecord, SpecDocumentModel, SpecLedgerOptions,
    SpecSheetModel, SpecTableRegion,
};
use crate::util::{sanitize_sheet_name, validate_unique_names};

/// Reject records with a blank name or id.
pub fn validate_records(records: &[SpecCreditorRecord]) -> LedgerResult<()> {
    for (n_idx, record) in records.iter().enumerate() {
        if record.name.trim().is_empty() {
            return Err(LedgerError::input_validation(format!(
                "creditor record {n_idx} has a blank name (id={:?}).",
                record.id
            )));
        }
        if record.id.trim().is_empty() {
            return Err(LedgerError::input_validation(format!(
                "creditor record {n_idx} ({:?}) has a blank id.",
                record.name
            )));
        }
    }
    Ok(())
}

/// Per-column editability under sheet protection: only input columns are unlocked.
pub fn plan_column_locks(columns: &[SpecColumn]) -> Vec<bool> {
    columns.iter().map(|column| column.kind.is_input()).collect()
}

/// Build the full document: the claim sheet followed by the creditor registry.
///
/// Nothing is written here; the model is complete and validated before the
/// serializer sees it.
pub fn assemble_document(
    records: &[SpecCreditorRecord],
    columns: &[SpecColumn],
    options: &SpecLedgerOptions,
) -> LedgerResult<SpecDocumentModel> {
    validate_layout(&options.layout)?;
    validate_records(records)?;

    let c_sheet_name_main = sanitize_sheet_name(&options.sheet_name_main, "_");
    let c_sheet_name_registry = sanitize_sheet_name(&options.sheet_name_registry, "_");
    validate_unique_names(
        "sheet",
        &[c_sheet_name_main.clone(), c_sheet_name_registry.clone()],
    )?;

    let l_blocks = plan_table_blocks(records, columns, &options.layout)?;
    let sheet_main = build_main_sheet(
        &c_sheet_name_main,
        records,
        &l_blocks,
        columns,
        options.if_protect_main,
    )?;
    let sheet_registry = build_registry_sheet(records, &c_sheet_name_registry);

    let document = SpecDocumentModel {
        sheets: vec![sheet_main, sheet_registry],
    };
    validate_document_names(&document)?;

    info!(
        "assembled {} claim blocks and {} registry rows",
        l_blocks.len(),
        records.len()
    );
    Ok(document)
}

fn build_main_sheet(
    sheet_name: &str,
    records: &[SpecCreditorRecord],
    blocks: &[SpecBlockGeometry],
    columns: &[SpecColumn],
    if_protected: bool,
) -> LedgerResult<SpecSheetModel> {
    let mut sheet = SpecSheetModel::new(sheet_name);
    sheet.if_protected = if_protected;
    sheet.widths_by_col = TUP_MAIN_COLUMN_WIDTHS
        .iter()
        .copied()
        .take(columns.len())
        .enumerate()
        .collect();

    let l_if_unlocked_by_col = plan_column_locks(columns);

    for (block, record) in blocks.iter().zip(records) {
        sheet.cells.push(SpecCellModel::new(
            block.row_name,
            0,
            EnumCellContent::String(C_LABEL_CREDITOR.to_string()),
            EnumStyleRole::CreditorLabel,
        ));
        sheet.cells.push(SpecCellModel::new(
            block.row_name,
            1,
            EnumCellContent::String(record.name.clone()),
            EnumStyleRole::CreditorName,
        ));

        for (col, column) in columns.iter().enumerate() {
            sheet.cells.push(SpecCellModel::new(
                block.row_header,
                col,
                EnumCellContent::String(column.label.to_string()),
                EnumStyleRole::TableHeader,
            ));
        }

        for row in block.row_data_start..=block.row_data_end {
            for (col, column) in columns.iter().enumerate() {
                if column.kind == EnumColumnKind::ComputedCurrency {
                    continue;
                }
                sheet.cells.push(SpecCellModel {
                    if_unlocked: if_protected && l_if_unlocked_by_col[col],
                    ..SpecCellModel::new(
                        row,
                        col,
                        EnumCellContent::Blank,
                        column.kind.style_role(),
                    )
                });
            }
        }

        let l_rules = generate_block_rules(block, columns)?;
        debug!(
            "block {}: {} rules generated",
            block.idx_block,
            l_rules.len()
        );
        for rule in l_rules {
            match rule {
                EnumRuleSpec::Formula(rule_formula) => sheet.cells.push(SpecCellModel::new(
                    rule_formula.region.row_start,
                    rule_formula.region.col_start,
                    EnumCellContent::Formula(rule_formula.formula),
                    rule_formula.style,
                )),
                other => sheet.rules.push(other),
            }
        }

        sheet.tables.push(SpecTableRegion {
            name: format!("{C_TABLE_NAME_CLAIMS_PREFIX}{}", block.idx_block + 1),
            region: block.region_table(),
            headers: columns.iter().map(|column| column.label.to_string()).collect(),
            header_style: EnumStyleRole::TableHeader,
        });
    }

    Ok(sheet)
}

/// Table names and defined names share one workbook namespace.
fn validate_document_names(document: &SpecDocumentModel) -> LedgerResult<()> {
    let l_names: Vec<String> = document
        .sheets
        .iter()
        .flat_map(|sheet| {
            sheet
                .tables
                .iter()
                .map(|table| table.name.clone())
                .chain(sheet.named_ranges.iter().map(|named| named.name.clone()))
        })
        .collect();
    validate_unique_names("table/range", &l_names)
}
