//! `claimbook_xlsx`:
//! creditor claim-ledger workbook generator.
//!
//! Modules:
//! - `conf`     : constants, layout presets and default style presets
//! - `spec`     : specs/models/options
//! - `util`     : A1 addressing and naming helpers
//! - `plan`     : claim block geometry
//! - `rule`     : formulas, validations and conditional formats per block
//! - `registry` : creditor registry sheet
//! - `assemble` : document model assembly
//! - `source`   : creditor record sources
//! - `writer`   : pure-Rust writer kernel
pub mod assemble;
pub mod conf;
pub mod error;
pub mod plan;
pub mod registry;
pub mod rule;
pub mod source;
pub mod spec;
pub mod util;
pub mod writer;

pub use assemble::{assemble_document, plan_column_locks, validate_records};
pub use conf::{
    C_FILE_OUT_DEFAULT, EnumLayoutVersion, N_LEN_EXCEL_SHEET_NAME_MAX, N_NCOLS_EXCEL_MAX,
    N_NROWS_EXCEL_MAX, TUP_EXCEL_ILLEGAL, TUP_LEDGER_COLUMNS, derive_default_ledger_format,
    derive_default_ledger_formats, derive_default_ledger_options,
};
pub use error::{LedgerError, LedgerResult};
pub use plan::{plan_table_blocks, validate_layout};
pub use registry::build_registry_sheet;
pub use rule::generate_block_rules;
pub use source::{
    derive_sample_creditor_records, load_creditor_records_from_ipc_bytes,
    load_creditor_records_from_ipc_file,
};
pub use spec::{
    EnumCellContent, EnumColumnKind, EnumRuleSpec, EnumStyleRole, SpecBlockGeometry,
    SpecCellFormat, SpecCellModel, SpecColumn, SpecCreditorRecord, SpecDocumentModel,
    SpecGridRegion, SpecLedgerLayout, SpecLedgerOptions, SpecLedgerReport, SpecSheetModel,
};
pub use util::{
    derive_cell_ref, derive_cell_ref_absolute, derive_cell_ref_col_absolute, derive_column_name,
    derive_range_ref, derive_sheet_range_ref, parse_cell_ref, sanitize_sheet_name,
};
pub use writer::{XlsxWriter, serialize_document, write_ledger_workbook};
