//! XLSX writer kernel that serializes a ledger document model into a workbook.

use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use log::{info, warn};
use rust_xlsxwriter::{
    ConditionalFormatFormula, DataValidation, DataValidationErrorStyle, Format, FormatAlign,
    FormatBorder, Formula, Table, TableColumn, Workbook, Worksheet,
};

use crate::assemble::assemble_document;
use crate::conf::{
    ENUM_TABLE_STYLE_LEDGER, TUP_LEDGER_COLUMNS, derive_default_ledger_format,
    derive_default_ledger_formats,
};
use crate::error::{LedgerError, LedgerResult};
use crate::spec::{
    EnumCellContent, EnumRuleSpec, EnumStyleRole, SpecCellFormat, SpecConditionalFormatRule,
    SpecCreditorRecord, SpecDocumentModel, SpecFormulaRule, SpecLedgerOptions, SpecLedgerReport,
    SpecSheetModel, SpecSheetReport, SpecTableRegion, SpecValidationRule,
};
use crate::util::derive_sheet_range_ref;

/// Stateful workbook writer.
///
/// The workbook is built in memory; the output file is only opened by
/// [`Self::close`], once serialization has succeeded.
pub struct XlsxWriter {
    path_file_out: PathBuf,
    workbook: Workbook,
    dict_fmt: BTreeMap<EnumStyleRole, SpecCellFormat>,
    set_sheet_names_existing: BTreeSet<String>,
    report: SpecLedgerReport,
    if_closed: bool,
}

impl XlsxWriter {
    /// Create writer bound to output path and role presets.
    ///
    /// Roles missing from `dict_fmt` fall back to [`derive_default_ledger_format`].
    pub fn new(path_file_out: PathBuf, dict_fmt: BTreeMap<EnumStyleRole, SpecCellFormat>) -> Self {
        Self {
            path_file_out,
            workbook: Workbook::new(),
            dict_fmt,
            set_sheet_names_existing: BTreeSet::new(),
            report: SpecLedgerReport::default(),
            if_closed: false,
        }
    }

    /// Return output file path as string.
    pub fn file_out(&self) -> String {
        self.path_file_out.to_string_lossy().to_string()
    }

    /// Return snapshot of the write report.
    pub fn report(&self) -> SpecLedgerReport {
        self.report.clone()
    }

    /// Serialize the workbook and write it to disk. Idempotent.
    ///
    /// The file handle lives only inside this call and is dropped on every path.
    pub fn close(&mut self) -> LedgerResult<()> {
        if self.if_closed {
            return Ok(());
        }
        let v_buf = self.workbook.save_to_buffer()?;
        let mut file_out = File::create(&self.path_file_out)?;
        file_out.write_all(&v_buf)?;
        file_out.flush()?;
        self.if_closed = true;
        info!("wrote {} ({} bytes)", self.file_out(), v_buf.len());
        Ok(())
    }

    /// Serialize the workbook into memory without touching the output path.
    pub fn save_to_buffer(&mut self) -> LedgerResult<Vec<u8>> {
        Ok(self.workbook.save_to_buffer()?)
    }

    /// Add every sheet of `document`, in order, plus its workbook names.
    pub fn write_document(&mut self, document: &SpecDocumentModel) -> LedgerResult<()> {
        if self.if_closed {
            return Err(LedgerError::configuration("Cannot write after close()."));
        }
        for sheet in &document.sheets {
            self.write_sheet(sheet)?;
        }
        for sheet in &document.sheets {
            for named in &sheet.named_ranges {
                let c_refers_to =
                    format!("={}", derive_sheet_range_ref(&named.sheet_name, &named.region));
                self.workbook.define_name(&named.name, &c_refers_to)?;
            }
        }
        for c_warning in &self.report.warnings {
            warn!("{c_warning}");
        }
        Ok(())
    }

    fn write_sheet(&mut self, sheet: &SpecSheetModel) -> LedgerResult<()> {
        if !self.set_sheet_names_existing.insert(sheet.sheet_name.to_lowercase()) {
            return Err(LedgerError::configuration(format!(
                "Duplicate sheet name: {:?}",
                sheet.sheet_name
            )));
        }

        let mut dict_fmt_resolved: BTreeMap<(EnumStyleRole, bool), Format> = BTreeMap::new();
        let dict_fmt = &self.dict_fmt;
        let mut derive_format = |role: EnumStyleRole, if_unlocked: bool| -> Format {
            dict_fmt_resolved
                .entry((role, if_unlocked))
                .or_insert_with(|| {
                    let mut spec = dict_fmt
                        .get(&role)
                        .cloned()
                        .unwrap_or_else(|| derive_default_ledger_format(role));
                    if if_unlocked {
                        spec = spec.with_(SpecCellFormat {
                            locked: Some(false),
                            ..Default::default()
                        });
                    }
                    derive_rust_xlsx_format(&spec)
                })
                .clone()
        };

        let worksheet = self.workbook.add_worksheet();
        worksheet.set_name(&sheet.sheet_name)?;

        for (col, width) in &sheet.widths_by_col {
            worksheet.set_column_width(cast_col_num(*col)?, *width)?;
        }

        for cell in &sheet.cells {
            let format = derive_format(cell.style, sheet.if_protected && cell.if_unlocked);
            write_cell_with_format(worksheet, cell.row, cell.col, &cell.content, &format)?;
        }

        for rule in &sheet.rules {
            match rule {
                EnumRuleSpec::Formula(rule_formula) => {
                    let format = derive_format(rule_formula.style, false);
                    write_formula_rule(worksheet, rule_formula, &format)?;
                }
                EnumRuleSpec::Validation(rule_validation) => {
                    write_validation_rule(worksheet, rule_validation)?;
                }
                EnumRuleSpec::ConditionalFormat(rule_cf) => {
                    let format = derive_format(rule_cf.style, false);
                    write_conditional_format_rule(worksheet, rule_cf, format)?;
                }
            }
        }

        // Tables rewrite their header cells, so they go after the cells.
        for table in &sheet.tables {
            let format = derive_format(table.header_style, false);
            write_table(worksheet, table, &format)?;
        }

        if sheet.if_protected {
            worksheet.protect();
        }

        info!(
            "sheet {:?}: {} cells, {} rules, {} tables",
            sheet.sheet_name,
            sheet.cells.len(),
            sheet.rules.len(),
            sheet.tables.len()
        );
        if sheet.tables.is_empty() && !sheet.cells.is_empty() {
            self.report.warn(format!(
                "Sheet {:?} has cells but no table declarations.",
                sheet.sheet_name
            ));
        }
        self.report.sheets.push(SpecSheetReport {
            sheet_name: sheet.sheet_name.clone(),
            n_cells: sheet.cells.len(),
            n_rules: sheet.rules.len(),
            n_tables: sheet.tables.len(),
        });
        Ok(())
    }
}

/// Serialize `document` to xlsx bytes using the given role presets.
pub fn serialize_document(
    document: &SpecDocumentModel,
    dict_fmt: BTreeMap<EnumStyleRole, SpecCellFormat>,
) -> LedgerResult<Vec<u8>> {
    let mut writer = XlsxWriter::new(PathBuf::new(), dict_fmt);
    writer.write_document(document)?;
    writer.save_to_buffer()
}

/// Assemble the ledger for `records` and write it to `path_file_out`.
///
/// Errors leave no file behind; the output is only created after the whole
/// workbook has been serialized.
pub fn write_ledger_workbook(
    records: &[SpecCreditorRecord],
    options: &SpecLedgerOptions,
    path_file_out: PathBuf,
) -> LedgerResult<SpecLedgerReport> {
    let document = assemble_document(records, &TUP_LEDGER_COLUMNS, options)?;
    let mut writer = XlsxWriter::new(path_file_out, derive_default_ledger_formats());
    writer.write_document(&document)?;
    writer.close()?;
    Ok(writer.report())
}

fn write_cell_with_format(
    worksheet: &mut Worksheet,
    row_idx: usize,
    col_idx: usize,
    content: &EnumCellContent,
    format: &Format,
) -> LedgerResult<()> {
    let (row, col) = (cast_row_num(row_idx)?, cast_col_num(col_idx)?);
    match content {
        EnumCellContent::Blank => {
            worksheet.write_blank(row, col, format)?;
        }
        EnumCellContent::String(val) => {
            worksheet.write_string_with_format(row, col, val, format)?;
        }
        EnumCellContent::Formula(val) => {
            worksheet.write_formula_with_format(row, col, Formula::new(val), format)?;
        }
    }
    Ok(())
}

fn write_formula_rule(
    worksheet: &mut Worksheet,
    rule: &SpecFormulaRule,
    format: &Format,
) -> LedgerResult<()> {
    write_cell_with_format(
        worksheet,
        rule.region.row_start,
        rule.region.col_start,
        &EnumCellContent::Formula(rule.formula.clone()),
        format,
    )
}

fn write_validation_rule(worksheet: &mut Worksheet, rule: &SpecValidationRule) -> LedgerResult<()> {
    let validation = DataValidation::new()
        .allow_custom(Formula::new(&rule.predicate))
        .set_error_style(DataValidationErrorStyle::Stop)
        .set_error_title(&rule.error_title)?
        .set_error_message(&rule.error_message)?
        .show_dropdown(!rule.if_suppress_dropdown);

    worksheet.add_data_validation(
        cast_row_num(rule.region.row_start)?,
        cast_col_num(rule.region.col_start)?,
        cast_row_num(rule.region.row_end)?,
        cast_col_num(rule.region.col_end)?,
        &validation,
    )?;
    Ok(())
}

fn write_conditional_format_rule(
    worksheet: &mut Worksheet,
    rule: &SpecConditionalFormatRule,
    format: Format,
) -> LedgerResult<()> {
    let conditional_format = ConditionalFormatFormula::new()
        .set_rule(rule.predicate.as_str())
        .set_format(format);

    worksheet.add_conditional_format(
        cast_row_num(rule.region.row_start)?,
        cast_col_num(rule.region.col_start)?,
        cast_row_num(rule.region.row_end)?,
        cast_col_num(rule.region.col_end)?,
        &conditional_format,
    )?;
    Ok(())
}

fn write_table(
    worksheet: &mut Worksheet,
    table: &SpecTableRegion,
    fmt_header: &Format,
) -> LedgerResult<()> {
    let l_columns: Vec<TableColumn> = table
        .headers
        .iter()
        .map(|header| {
            TableColumn::new()
                .set_header(header)
                .set_header_format(fmt_header.clone())
        })
        .collect();

    let table_xlsx = Table::new()
        .set_name(&table.name)
        .set_style(ENUM_TABLE_STYLE_LEDGER)
        .set_banded_rows(true)
        .set_banded_columns(false)
        .set_first_column(false)
        .set_last_column(false)
        .set_autofilter(true)
        .set_columns(&l_columns);

    worksheet.add_table(
        cast_row_num(table.region.row_start)?,
        cast_col_num(table.region.col_start)?,
        cast_row_num(table.region.row_end)?,
        cast_col_num(table.region.col_end)?,
        &table_xlsx,
    )?;
    Ok(())
}

/// Border styles by the integer code used in [`SpecCellFormat`].
const TUP_FORMAT_BORDERS: [FormatBorder; 14] = [
    FormatBorder::None,
    FormatBorder::Thin,
    FormatBorder::Medium,
    FormatBorder::Dashed,
    FormatBorder::Dotted,
    FormatBorder::Thick,
    FormatBorder::Double,
    FormatBorder::Hair,
    FormatBorder::MediumDashed,
    FormatBorder::DashDot,
    FormatBorder::MediumDashDot,
    FormatBorder::DashDotDot,
    FormatBorder::MediumDashDotDot,
    FormatBorder::SlantDashDot,
];

fn derive_rust_xlsx_format(spec: &SpecCellFormat) -> Format {
    let mut format = Format::new();

    if let Some(val) = &spec.font_name {
        format = format.set_font_name(val.as_str());
    }
    if let Some(val) = spec.font_size {
        format = format.set_font_size(val as f64);
    }
    if let Some(val) = &spec.font_color {
        format = format.set_font_color(val.as_str());
    }
    if spec.bold == Some(true) {
        format = format.set_bold();
    }
    if let Some(align) = spec.align.as_deref().and_then(derive_format_align) {
        format = format.set_align(align);
    }
    if let Some(val) = &spec.num_format {
        format = format.set_num_format(val.as_str());
    }
    if let Some(val) = &spec.bg_color {
        format = format.set_background_color(val.as_str());
    }

    // Side overrides apply after the all-sides border.
    if let Some(val) = spec.border {
        format = format.set_border(derive_format_border(val));
    }
    let l_sides: [(Option<i64>, fn(Format, FormatBorder) -> Format); 4] = [
        (spec.top, Format::set_border_top),
        (spec.bottom, Format::set_border_bottom),
        (spec.left, Format::set_border_left),
        (spec.right, Format::set_border_right),
    ];
    for (side, set_side) in l_sides {
        if let Some(val) = side {
            format = set_side(format, derive_format_border(val));
        }
    }
    if let Some(val) = &spec.border_color {
        format = format.set_border_color(val.as_str());
    }

    if spec.locked == Some(false) {
        format = format.set_unlocked();
    }

    format
}

fn derive_format_border(border: i64) -> FormatBorder {
    usize::try_from(border)
        .ok()
        .and_then(|idx| TUP_FORMAT_BORDERS.get(idx).copied())
        .unwrap_or(FormatBorder::None)
}

fn derive_format_align(align: &str) -> Option<FormatAlign> {
    match align.trim().to_ascii_lowercase().as_str() {
        "general" => Some(FormatAlign::General),
        "left" => Some(FormatAlign::Left),
        "center" => Some(FormatAlign::Center),
        "right" => Some(FormatAlign::Right),
        "center_across" => Some(FormatAlign::CenterAcross),
        _ => None,
    }
}

fn cast_row_num(value: usize) -> LedgerResult<u32> {
    u32::try_from(value)
        .map_err(|_| LedgerError::configuration(format!("row index overflow: {value}")))
}

fn cast_col_num(value: usize) -> LedgerResult<u16> {
    u16::try_from(value)
        .map_err(|_| LedgerError::configuration(format!("column index overflow: {value}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::{SpecCellModel, SpecGridRegion};

    #[test]
    fn test_unknown_border_code_draws_nothing() {
        assert_eq!(derive_format_border(1), FormatBorder::Thin);
        assert_eq!(derive_format_border(-1), FormatBorder::None);
        assert_eq!(derive_format_border(99), FormatBorder::None);
        assert_eq!(derive_format_align(" Center "), Some(FormatAlign::Center));
    }

    #[test]
    fn test_cast_limits() {
        assert_eq!(cast_row_num(1_048_575).unwrap(), 1_048_575);
        assert!(cast_col_num(70_000).is_err());
    }

    #[test]
    fn test_write_after_close_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = XlsxWriter::new(dir.path().join("out.xlsx"), derive_default_ledger_formats());
        writer.write_document(&SpecDocumentModel::default()).unwrap();
        writer.close().unwrap();
        writer.close().unwrap();

        let err = writer.write_document(&SpecDocumentModel::default()).unwrap_err();
        assert!(matches!(err, LedgerError::Configuration(_)));
    }

    #[test]
    fn test_report_lists_sheets_in_order() {
        let records = vec![SpecCreditorRecord::new("Test1", "A1231")];
        let document =
            assemble_document(&records, &TUP_LEDGER_COLUMNS, &SpecLedgerOptions::default()).unwrap();
        let mut writer = XlsxWriter::new(PathBuf::new(), derive_default_ledger_formats());
        writer.write_document(&document).unwrap();

        let report = writer.report();
        let l_names: Vec<&str> = report
            .sheets
            .iter()
            .map(|sheet| sheet.sheet_name.as_str())
            .collect();
        assert_eq!(l_names, vec!["Main", "Creditor"]);
        assert_eq!(report.sheets[0].n_tables, 1);
        assert_eq!(report.sheets[0].n_rules, 7);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_failed_assembly_writes_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let path_file_out = dir.path().join("out.xlsx");
        let records = vec![SpecCreditorRecord::new("Test1", "")];

        let err =
            write_ledger_workbook(&records, &SpecLedgerOptions::default(), path_file_out.clone())
                .unwrap_err();
        assert!(matches!(err, LedgerError::InputValidation(_)));
        assert!(!path_file_out.exists());
    }

    fn read_zip_part_from_bytes(v_buf: &[u8], part_name: &str) -> String {
        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(v_buf)).unwrap();
        let mut part = archive.by_name(part_name).unwrap();
        let mut c_xml = String::new();
        std::io::Read::read_to_string(&mut part, &mut c_xml).unwrap();
        c_xml
    }

    #[test]
    fn test_hand_built_formula_rule_is_written_as_formula_cell() {
        let mut sheet = SpecSheetModel::new("Totals");
        sheet.cells.push(SpecCellModel::new(
            0,
            0,
            EnumCellContent::String("Amount".to_string()),
            EnumStyleRole::TableHeader,
        ));
        sheet.rules.push(EnumRuleSpec::Formula(SpecFormulaRule {
            region: SpecGridRegion::cell(4, 2),
            formula: "SUM(A2:B2)".to_string(),
            style: EnumStyleRole::Total,
        }));
        let document = SpecDocumentModel {
            sheets: vec![sheet],
        };

        let v_buf = serialize_document(&document, derive_default_ledger_formats()).unwrap();

        let c_sheet = read_zip_part_from_bytes(&v_buf, "xl/worksheets/sheet1.xml");
        assert!(c_sheet.contains(r#"<c r="C5""#));
        assert!(c_sheet.contains("<f>SUM(A2:B2)</f>"));
        let c_workbook = read_zip_part_from_bytes(&v_buf, "xl/workbook.xml");
        assert!(c_workbook.contains(r#"<sheet name="Totals""#));
    }

    #[test]
    fn test_duplicate_sheet_names_are_rejected() {
        let document = SpecDocumentModel {
            sheets: vec![SpecSheetModel::new("Main"), SpecSheetModel::new("MAIN")],
        };
        let mut writer = XlsxWriter::new(PathBuf::new(), derive_default_ledger_formats());
        assert!(writer.write_document(&document).is_err());
    }
}
