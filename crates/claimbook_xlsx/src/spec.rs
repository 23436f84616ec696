//! Shared ledger specification models.

use crate::conf::{
    C_SHEET_NAME_MAIN, C_SHEET_NAME_REGISTRY, EnumLayoutVersion, N_ROWS_BLOCK_PREAMBLE,
};

////////////////////////////////////////////////////////////////////////////////
// #region CellFormatSpecification

/// Cell format specification merged from presets and resolved by the writer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SpecCellFormat {
    /// Font family name.
    pub font_name: Option<String>,
    /// Font size in points.
    pub font_size: Option<i64>,
    /// Bold style.
    pub bold: Option<bool>,

    /// Horizontal alignment.
    pub align: Option<String>,
    /// Border style for all sides.
    pub border: Option<i64>,
    /// Border color for every side that has a border.
    pub border_color: Option<String>,

    /// Top border override.
    pub top: Option<i64>,
    /// Bottom border override.
    pub bottom: Option<i64>,
    /// Left border override.
    pub left: Option<i64>,
    /// Right border override.
    pub right: Option<i64>,

    /// Number format code.
    pub num_format: Option<String>,
    /// Background fill color.
    pub bg_color: Option<String>,
    /// Font color.
    pub font_color: Option<String>,
    /// Cell lock state under sheet protection; `None` keeps Excel's locked default.
    pub locked: Option<bool>,
}

impl SpecCellFormat {
    /// Return a new format by overlaying `patch` onto `self`.
    pub fn with_(&self, patch: SpecCellFormat) -> SpecCellFormat {
        self.merge(&patch)
    }

    /// Merge two formats with right-side non-`None` overwrite semantics.
    pub fn merge(&self, other: &SpecCellFormat) -> SpecCellFormat {
        SpecCellFormat {
            font_name: other.font_name.clone().or_else(|| self.font_name.clone()),
            font_size: other.font_size.or(self.font_size),
            bold: other.bold.or(self.bold),
            align: other.align.clone().or_else(|| self.align.clone()),
            border: other.border.or(self.border),
            border_color: other
                .border_color
                .clone()
                .or_else(|| self.border_color.clone()),
            top: other.top.or(self.top),
            bottom: other.bottom.or(self.bottom),
            left: other.left.or(self.left),
            right: other.right.or(self.right),
            num_format: other.num_format.clone().or_else(|| self.num_format.clone()),
            bg_color: other.bg_color.clone().or_else(|| self.bg_color.clone()),
            font_color: other.font_color.clone().or_else(|| self.font_color.clone()),
            locked: other.locked.or(self.locked),
        }
    }
}

/// Closed set of style roles a cell or rule can reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EnumStyleRole {
    /// "Creditor" caption on a block's name row.
    CreditorLabel,
    /// Creditor name on a block's name row.
    CreditorName,
    /// Claim table header cell.
    TableHeader,
    /// Free-text input cell.
    Text,
    /// Date input cell.
    Date,
    /// Amount input cell.
    Currency,
    /// Computed total cell.
    Total,
    /// Status/reason/timestamp cell.
    Audit,
    /// Registry table header cell.
    RegistryHeader,
    /// Registry body cell.
    RegistryText,
    /// Red border drawn by conditional formats.
    WarningBorder,
}

impl EnumStyleRole {
    /// Every role, in declaration order.
    pub const ALL: [EnumStyleRole; 11] = [
        Self::CreditorLabel,
        Self::CreditorName,
        Self::TableHeader,
        Self::Text,
        Self::Date,
        Self::Currency,
        Self::Total,
        Self::Audit,
        Self::RegistryHeader,
        Self::RegistryText,
        Self::WarningBorder,
    ];
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region InputSpecification

/// One creditor, in input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecCreditorRecord {
    /// Display name.
    pub name: String,
    /// Registry identifier.
    pub id: String,
}

impl SpecCreditorRecord {
    pub fn new(name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
        }
    }
}

/// Data type of a claim table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnumColumnKind {
    Text,
    Date,
    Currency,
    /// Sum of the currency columns immediately to its left.
    ComputedCurrency,
    Status,
}

impl EnumColumnKind {
    /// Whether users type into this column (unlocked under sheet protection).
    pub fn is_input(self) -> bool {
        matches!(self, Self::Text | Self::Date | Self::Currency)
    }

    /// Style role of this column's data cells.
    pub fn style_role(self) -> EnumStyleRole {
        match self {
            Self::Text => EnumStyleRole::Text,
            Self::Date => EnumStyleRole::Date,
            Self::Currency => EnumStyleRole::Currency,
            Self::ComputedCurrency => EnumStyleRole::Total,
            Self::Status => EnumStyleRole::Audit,
        }
    }
}

/// Claim table column: header label and data type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecColumn {
    pub label: &'static str,
    pub kind: EnumColumnKind,
}

impl SpecColumn {
    pub const fn new(label: &'static str, kind: EnumColumnKind) -> Self {
        Self { label, kind }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region GeometrySpecification

/// Inclusive rectangular grid region, zero-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SpecGridRegion {
    /// First row (inclusive).
    pub row_start: usize,
    /// First column (inclusive).
    pub col_start: usize,
    /// Last row (inclusive).
    pub row_end: usize,
    /// Last column (inclusive).
    pub col_end: usize,
}

impl SpecGridRegion {
    pub fn new(row_start: usize, col_start: usize, row_end: usize, col_end: usize) -> Self {
        Self {
            row_start,
            col_start,
            row_end,
            col_end,
        }
    }

    /// Single-cell region.
    pub fn cell(row: usize, col: usize) -> Self {
        Self::new(row, col, row, col)
    }

    /// Whether `other` lies entirely inside `self`.
    pub fn contains(&self, other: &SpecGridRegion) -> bool {
        other.row_start >= self.row_start
            && other.row_end <= self.row_end
            && other.col_start >= self.col_start
            && other.col_end <= self.col_end
    }

    /// Whether the two regions share at least one cell.
    pub fn overlaps(&self, other: &SpecGridRegion) -> bool {
        self.row_start <= other.row_end
            && other.row_start <= self.row_end
            && self.col_start <= other.col_end
            && other.col_start <= self.col_end
    }
}

/// Placement of one creditor's claim table on the main sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecBlockGeometry {
    /// Zero-based position in the input record list.
    pub idx_block: usize,
    /// Row holding the creditor caption and name.
    pub row_name: usize,
    /// Table header row.
    pub row_header: usize,
    /// First data row (inclusive).
    pub row_data_start: usize,
    /// Last data row (inclusive).
    pub row_data_end: usize,
    /// Number of table columns.
    pub width_cols: usize,
}

impl SpecBlockGeometry {
    /// Region covered by the data rows across all columns.
    pub fn region_data(&self) -> SpecGridRegion {
        SpecGridRegion::new(
            self.row_data_start,
            0,
            self.row_data_end,
            self.width_cols.saturating_sub(1),
        )
    }

    /// Region declared as a table object: header row plus data rows.
    pub fn region_table(&self) -> SpecGridRegion {
        SpecGridRegion::new(
            self.row_header,
            0,
            self.row_data_end,
            self.width_cols.saturating_sub(1),
        )
    }

    /// Data rows of a single column.
    pub fn region_column_data(&self, col: usize) -> SpecGridRegion {
        SpecGridRegion::new(self.row_data_start, col, self.row_data_end, col)
    }
}

/// Block geometry constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecLedgerLayout {
    /// Data rows per creditor table.
    pub height_block: usize,
    /// Stride between the first rows of consecutive blocks.
    pub row_gap: usize,
}

impl SpecLedgerLayout {
    /// Smallest stride that keeps blocks of this height apart; `None` on overflow.
    pub fn row_gap_min(&self) -> Option<usize> {
        self.height_block.checked_add(N_ROWS_BLOCK_PREAMBLE)
    }
}

impl Default for SpecLedgerLayout {
    fn default() -> Self {
        EnumLayoutVersion::default().layout()
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region RuleSpecification

/// Formula written into one computed cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecFormulaRule {
    /// Single target cell.
    pub region: SpecGridRegion,
    /// Formula text without the leading `=`.
    pub formula: String,
    /// Style of the formula cell.
    pub style: EnumStyleRole,
}

/// Custom data validation over a column range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecValidationRule {
    pub region: SpecGridRegion,
    /// Boolean formula without the leading `=`, relative to the region's top-left cell.
    pub predicate: String,
    pub error_title: String,
    pub error_message: String,
    /// Hide the in-cell dropdown arrow.
    pub if_suppress_dropdown: bool,
}

/// Formula-driven conditional format over a column range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecConditionalFormatRule {
    pub region: SpecGridRegion,
    /// Boolean formula without the leading `=`, relative to the region's top-left cell.
    pub predicate: String,
    /// Format applied where the predicate holds.
    pub style: EnumStyleRole,
}

/// Rule attached to a sheet region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnumRuleSpec {
    Formula(SpecFormulaRule),
    Validation(SpecValidationRule),
    ConditionalFormat(SpecConditionalFormatRule),
}

impl EnumRuleSpec {
    /// Target region of the rule.
    pub fn region(&self) -> &SpecGridRegion {
        match self {
            Self::Formula(rule) => &rule.region,
            Self::Validation(rule) => &rule.region,
            Self::ConditionalFormat(rule) => &rule.region,
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region DocumentSpecification

/// Cell payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnumCellContent {
    /// Formatted empty cell.
    Blank,
    /// Text value.
    String(String),
    /// Formula text without the leading `=`.
    Formula(String),
}

/// One written cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecCellModel {
    pub row: usize,
    pub col: usize,
    pub content: EnumCellContent,
    pub style: EnumStyleRole,
    /// Editable when the sheet is protected.
    pub if_unlocked: bool,
}

impl SpecCellModel {
    pub fn new(row: usize, col: usize, content: EnumCellContent, style: EnumStyleRole) -> Self {
        Self {
            row,
            col,
            content,
            style,
            if_unlocked: false,
        }
    }
}

/// Region declared as a first-class table object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecTableRegion {
    /// Workbook-unique table name.
    pub name: String,
    /// Header row plus data rows.
    pub region: SpecGridRegion,
    /// Header labels, one per column of `region`.
    pub headers: Vec<String>,
    pub header_style: EnumStyleRole,
}

/// Workbook-scoped defined name pointing into one sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecNamedRange {
    pub name: String,
    pub sheet_name: String,
    pub region: SpecGridRegion,
}

/// One sheet of the document, in write order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecSheetModel {
    pub sheet_name: String,
    pub cells: Vec<SpecCellModel>,
    pub rules: Vec<EnumRuleSpec>,
    pub tables: Vec<SpecTableRegion>,
    pub named_ranges: Vec<SpecNamedRange>,
    /// `(column, width)` pairs in character units.
    pub widths_by_col: Vec<(usize, f64)>,
    /// Engage sheet protection; only cells flagged `if_unlocked` stay editable.
    pub if_protected: bool,
}

impl SpecSheetModel {
    pub fn new(sheet_name: impl Into<String>) -> Self {
        Self {
            sheet_name: sheet_name.into(),
            ..Default::default()
        }
    }

    /// Number of distinct rows holding at least one cell.
    pub fn count_rows(&self) -> usize {
        let mut l_rows: Vec<usize> = self.cells.iter().map(|cell| cell.row).collect();
        l_rows.sort_unstable();
        l_rows.dedup();
        l_rows.len()
    }

    /// Look up the cell written at `(row, col)`.
    pub fn cell_at(&self, row: usize, col: usize) -> Option<&SpecCellModel> {
        self.cells
            .iter()
            .find(|cell| cell.row == row && cell.col == col)
    }
}

/// Ordered sheets handed to the serializer.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecDocumentModel {
    pub sheets: Vec<SpecSheetModel>,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Options

/// Generation options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecLedgerOptions {
    /// Block geometry constants.
    pub layout: SpecLedgerLayout,
    /// Protect the main sheet, leaving only input columns editable.
    pub if_protect_main: bool,
    /// Claim sheet name.
    pub sheet_name_main: String,
    /// Registry sheet name.
    pub sheet_name_registry: String,
}

impl Default for SpecLedgerOptions {
    fn default() -> Self {
        Self {
            layout: SpecLedgerLayout::default(),
            if_protect_main: false,
            sheet_name_main: C_SHEET_NAME_MAIN.to_string(),
            sheet_name_registry: C_SHEET_NAME_REGISTRY.to_string(),
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ReportSpecification

/// Per-sheet write summary.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecSheetReport {
    /// Actual sheet name in the workbook.
    pub sheet_name: String,
    pub n_cells: usize,
    pub n_rules: usize,
    pub n_tables: usize,
}

/// Per-document write report.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecLedgerReport {
    /// Sheets in write order.
    pub sheets: Vec<SpecSheetReport>,
    /// Non-fatal warnings.
    pub warnings: Vec<String>,
}

impl SpecLedgerReport {
    /// Add a warning message.
    pub fn warn(&mut self, msg: impl AsRef<str>) {
        self.warnings.push(msg.as_ref().to_string());
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_prefers_right_side_values() {
        let base = SpecCellFormat {
            font_name: Some("Times New Roman".to_string()),
            border: Some(1),
            locked: Some(true),
            ..Default::default()
        };
        let merged = base.with_(SpecCellFormat {
            border: Some(2),
            locked: Some(false),
            ..Default::default()
        });

        assert_eq!(merged.font_name.as_deref(), Some("Times New Roman"));
        assert_eq!(merged.border, Some(2));
        assert_eq!(merged.locked, Some(false));
    }

    #[test]
    fn test_region_contains_and_overlaps() {
        let outer = SpecGridRegion::new(2, 0, 26, 9);
        assert!(outer.contains(&SpecGridRegion::new(2, 3, 26, 3)));
        assert!(!outer.contains(&SpecGridRegion::new(1, 3, 26, 3)));
        assert!(outer.overlaps(&SpecGridRegion::cell(26, 9)));
        assert!(!outer.overlaps(&SpecGridRegion::cell(30, 0)));
    }

    #[test]
    fn test_input_kinds_are_editable() {
        assert!(EnumColumnKind::Currency.is_input());
        assert!(!EnumColumnKind::ComputedCurrency.is_input());
        assert!(!EnumColumnKind::Status.is_input());
    }
}
