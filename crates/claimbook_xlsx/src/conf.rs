//! Ledger constants and default preset factories.

use std::collections::BTreeMap;

use rust_xlsxwriter::TableStyle;

use crate::spec::{
    EnumColumnKind, EnumStyleRole, SpecCellFormat, SpecColumn, SpecLedgerLayout,
    SpecLedgerOptions,
};

/// Excel worksheet maximum row count.
pub const N_NROWS_EXCEL_MAX: usize = 1_048_576;
/// Excel worksheet maximum column count.
pub const N_NCOLS_EXCEL_MAX: usize = 16_384;
/// Excel sheet name maximum length.
pub const N_LEN_EXCEL_SHEET_NAME_MAX: usize = 31;
/// Characters not allowed in sheet names.
pub const TUP_EXCEL_ILLEGAL: [&str; 7] = ["*", ":", "?", "/", "\\", "[", "]"];

/// Rows preceding the data rows of a block: creditor name row and table header row.
pub const N_ROWS_BLOCK_PREAMBLE: usize = 2;

/// Claim table columns, in sheet order.
pub const TUP_LEDGER_COLUMNS: [SpecColumn; 10] = [
    SpecColumn::new("Agreement No.", EnumColumnKind::Text),
    SpecColumn::new("Project Name", EnumColumnKind::Text),
    SpecColumn::new("Due Date", EnumColumnKind::Date),
    SpecColumn::new("Principal Amount (Rs.)", EnumColumnKind::Currency),
    SpecColumn::new("Interest Amount (Rs.)", EnumColumnKind::Currency),
    SpecColumn::new("Other Charges (Rs.)", EnumColumnKind::Currency),
    SpecColumn::new("Total Claim (Rs.)", EnumColumnKind::ComputedCurrency),
    SpecColumn::new("Status", EnumColumnKind::Status),
    SpecColumn::new("Reason", EnumColumnKind::Status),
    SpecColumn::new("Timestamp", EnumColumnKind::Status),
];

/// Main sheet column widths in character units, one per ledger column.
pub const TUP_MAIN_COLUMN_WIDTHS: [f64; 10] =
    [25.0, 35.0, 15.0, 30.0, 30.0, 30.0, 30.0, 15.0, 35.0, 22.0];

/// Registry sheet column widths (creditor, id).
pub const TUP_REGISTRY_COLUMN_WIDTHS: [f64; 2] = [25.0, 15.0];

pub const C_SHEET_NAME_MAIN: &str = "Main";
pub const C_SHEET_NAME_REGISTRY: &str = "Creditor";

/// Label written left of each creditor name and as the registry's first header.
pub const C_LABEL_CREDITOR: &str = "Creditor";
pub const C_LABEL_REGISTRY_ID: &str = "ID";

/// Registry table name.
pub const C_TABLE_NAME_REGISTRY: &str = "Creditors";
/// Claim table name prefix; suffixed with the 1-based block number.
pub const C_TABLE_NAME_CLAIMS_PREFIX: &str = "Claims_";
/// Style of every declared table.
pub const ENUM_TABLE_STYLE_LEDGER: TableStyle = TableStyle::Medium2;
/// Workbook-scoped name covering the registry ID column's data rows.
pub const C_RANGE_NAME_CREDITOR_IDS: &str = "CreditorIDs";

pub const C_NUM_FORMAT_DATE: &str = "dd-mm-yyyy";
pub const C_NUM_FORMAT_CURRENCY: &str = "#,##0;[Red]#,##0";

pub const C_VALIDATION_ERROR_TITLE: &str = "Invalid Amount";
pub const C_VALIDATION_ERROR_MESSAGE: &str = "Please enter valid amount";

/// Output file written when no path is given.
pub const C_FILE_OUT_DEFAULT: &str = "ClaimBook.xlsx";

/// Layout generations of the claim sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnumLayoutVersion {
    /// 16 data rows per block, blocks 20 rows apart.
    V1,
    /// 25 data rows per block, blocks 30 rows apart.
    #[default]
    V2,
}

impl EnumLayoutVersion {
    /// Geometry constants of this layout generation.
    pub fn layout(self) -> SpecLedgerLayout {
        match self {
            Self::V1 => SpecLedgerLayout {
                height_block: 16,
                row_gap: 20,
            },
            Self::V2 => SpecLedgerLayout {
                height_block: 25,
                row_gap: 30,
            },
        }
    }
}

/// Default style preset of one role.
///
/// The match is exhaustive, so adding a role without a preset fails to compile.
pub fn derive_default_ledger_format(role: EnumStyleRole) -> SpecCellFormat {
    let cfg_base_fmt_spec = SpecCellFormat {
        font_name: Some("Times New Roman".to_string()),
        font_size: Some(11),
        ..Default::default()
    };
    let cfg_cell_fmt_spec = cfg_base_fmt_spec.with_(SpecCellFormat {
        font_size: Some(12),
        border: Some(1),
        border_color: Some("#000000".to_string()),
        ..Default::default()
    });

    match role {
        EnumStyleRole::CreditorLabel => cfg_base_fmt_spec.with_(SpecCellFormat {
            font_size: Some(13),
            ..Default::default()
        }),
        EnumStyleRole::CreditorName => cfg_cell_fmt_spec.with_(SpecCellFormat {
            font_size: Some(13),
            bg_color: Some("#C0C0C0".to_string()),
            ..Default::default()
        }),
        EnumStyleRole::TableHeader => cfg_cell_fmt_spec.with_(SpecCellFormat {
            font_color: Some("#FFFFFF".to_string()),
            align: Some("center".to_string()),
            ..Default::default()
        }),
        EnumStyleRole::Text | EnumStyleRole::Audit => cfg_cell_fmt_spec,
        EnumStyleRole::Date => cfg_cell_fmt_spec.with_(SpecCellFormat {
            num_format: Some(C_NUM_FORMAT_DATE.to_string()),
            ..Default::default()
        }),
        EnumStyleRole::Currency => cfg_cell_fmt_spec.with_(SpecCellFormat {
            num_format: Some(C_NUM_FORMAT_CURRENCY.to_string()),
            ..Default::default()
        }),
        EnumStyleRole::Total => cfg_cell_fmt_spec.with_(SpecCellFormat {
            num_format: Some(C_NUM_FORMAT_CURRENCY.to_string()),
            bold: Some(true),
            ..Default::default()
        }),
        EnumStyleRole::RegistryHeader => cfg_base_fmt_spec.with_(SpecCellFormat {
            font_size: Some(12),
            font_color: Some("#FFFFFF".to_string()),
            align: Some("center".to_string()),
            ..Default::default()
        }),
        EnumStyleRole::RegistryText => cfg_base_fmt_spec,
        // Conditional formats only carry borders; top is never drawn.
        EnumStyleRole::WarningBorder => SpecCellFormat {
            bottom: Some(1),
            left: Some(1),
            right: Some(1),
            border_color: Some("#FF0000".to_string()),
            ..Default::default()
        },
    }
}

/// Build default style presets keyed by role, consumed by [`crate::writer::XlsxWriter`].
pub fn derive_default_ledger_formats() -> BTreeMap<EnumStyleRole, SpecCellFormat> {
    EnumStyleRole::ALL
        .into_iter()
        .map(|role| (role, derive_default_ledger_format(role)))
        .collect()
}

/// Build default ledger options.
pub fn derive_default_ledger_options() -> SpecLedgerOptions {
    SpecLedgerOptions::default()
}
