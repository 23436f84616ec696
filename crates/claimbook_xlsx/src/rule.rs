//! Rule generator: formulas, validations and conditional formats per block.
//!
//! Output is a pure function of the block geometry and the column spec.
//! Predicates are written against the top-left cell of their region, so
//! Excel shifts relative references row by row.

use crate::conf::{C_VALIDATION_ERROR_MESSAGE, C_VALIDATION_ERROR_TITLE};
use crate::error::{LedgerError, LedgerResult};
use crate::spec::{
    EnumColumnKind, EnumRuleSpec, EnumStyleRole, SpecBlockGeometry, SpecColumn,
    SpecConditionalFormatRule, SpecFormulaRule, SpecGridRegion, SpecValidationRule,
};
use crate::util::{
    derive_cell_ref, derive_cell_ref_col_absolute, derive_contiguous_ranges, derive_range_ref,
};

/// Generate every rule attached to one block, in a fixed order:
/// total formulas (row by row), amount validations, then blank warnings.
pub fn generate_block_rules(
    block: &SpecBlockGeometry,
    columns: &[SpecColumn],
) -> LedgerResult<Vec<EnumRuleSpec>> {
    if block.width_cols != columns.len() {
        return Err(LedgerError::configuration(format!(
            "block {} spans {} columns but the column spec has {}.",
            block.idx_block,
            block.width_cols,
            columns.len()
        )));
    }

    let mut l_rules = Vec::new();
    l_rules.extend(generate_total_formulas(block, columns)?);
    l_rules.extend(generate_amount_validations(block, columns));
    l_rules.extend(generate_blank_warnings(block, columns));
    Ok(l_rules)
}

/// One `SUM` per data row for each computed column, over the run of
/// currency columns immediately to its left.
pub fn generate_total_formulas(
    block: &SpecBlockGeometry,
    columns: &[SpecColumn],
) -> LedgerResult<Vec<EnumRuleSpec>> {
    let mut l_rules = Vec::new();
    for (col_total, column) in columns.iter().enumerate() {
        if column.kind != EnumColumnKind::ComputedCurrency {
            continue;
        }
        let (col_sum_start, col_sum_end) = derive_summed_columns(columns, col_total)?;

        for row in block.row_data_start..=block.row_data_end {
            let c_range =
                derive_range_ref(&SpecGridRegion::new(row, col_sum_start, row, col_sum_end));
            l_rules.push(EnumRuleSpec::Formula(SpecFormulaRule {
                region: SpecGridRegion::cell(row, col_total),
                formula: format!("SUM({c_range})"),
                style: EnumStyleRole::Total,
            }));
        }
    }
    Ok(l_rules)
}

/// One numeric-input validation per currency column, covering all data rows.
///
/// The probe cell is the column's first data row, written as the 1-based A1
/// row `row_data_start + 1`; the relative reference then moves with each
/// validated cell.
pub fn generate_amount_validations(
    block: &SpecBlockGeometry,
    columns: &[SpecColumn],
) -> Vec<EnumRuleSpec> {
    derive_currency_columns(columns)
        .into_iter()
        .map(|col| {
            EnumRuleSpec::Validation(SpecValidationRule {
                region: block.region_column_data(col),
                predicate: format!("ISNUMBER({})", derive_cell_ref(block.row_data_start, col)),
                error_title: C_VALIDATION_ERROR_TITLE.to_string(),
                error_message: C_VALIDATION_ERROR_MESSAGE.to_string(),
                if_suppress_dropdown: true,
            })
        })
        .collect()
}

/// Red-border warnings for required cells left blank.
///
/// - the key column (first text column) when blank;
/// - every currency column when all currency cells of that row are blank.
pub fn generate_blank_warnings(
    block: &SpecBlockGeometry,
    columns: &[SpecColumn],
) -> Vec<EnumRuleSpec> {
    let mut l_rules = Vec::new();

    if let Some(col_key) = columns
        .iter()
        .position(|column| column.kind == EnumColumnKind::Text)
    {
        l_rules.push(EnumRuleSpec::ConditionalFormat(SpecConditionalFormatRule {
            region: block.region_column_data(col_key),
            predicate: format!(
                "ISBLANK({})",
                derive_cell_ref(block.row_data_start, col_key)
            ),
            style: EnumStyleRole::WarningBorder,
        }));
    }

    let l_cols_currency = derive_currency_columns(columns);
    if l_cols_currency.is_empty() {
        return l_rules;
    }
    let c_predicate_amounts = format!(
        "AND({})",
        l_cols_currency
            .iter()
            .map(|col| format!(
                "ISBLANK({})",
                derive_cell_ref_col_absolute(block.row_data_start, *col)
            ))
            .collect::<Vec<_>>()
            .join(",")
    );
    for col in l_cols_currency {
        l_rules.push(EnumRuleSpec::ConditionalFormat(SpecConditionalFormatRule {
            region: block.region_column_data(col),
            predicate: c_predicate_amounts.clone(),
            style: EnumStyleRole::WarningBorder,
        }));
    }

    l_rules
}

fn derive_currency_columns(columns: &[SpecColumn]) -> Vec<usize> {
    columns
        .iter()
        .enumerate()
        .filter_map(|(col, column)| (column.kind == EnumColumnKind::Currency).then_some(col))
        .collect()
}

/// Inclusive column span summed into the computed column at `col_total`.
fn derive_summed_columns(columns: &[SpecColumn], col_total: usize) -> LedgerResult<(usize, usize)> {
    derive_contiguous_ranges(&derive_currency_columns(columns))
        .into_iter()
        .find(|(_, col_end)| col_end + 1 == col_total)
        .ok_or_else(|| {
            LedgerError::configuration(format!(
                "computed column {:?} has no currency columns immediately before it.",
                columns[col_total].label
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conf::TUP_LEDGER_COLUMNS;

    fn derive_block(idx_block: usize, row_name: usize, height_block: usize) -> SpecBlockGeometry {
        SpecBlockGeometry {
            idx_block,
            row_name,
            row_header: row_name + 1,
            row_data_start: row_name + 2,
            row_data_end: row_name + 1 + height_block,
            width_cols: TUP_LEDGER_COLUMNS.len(),
        }
    }

    #[test]
    fn test_total_formula_per_row_uses_own_row() {
        let block = derive_block(1, 30, 25);
        let l_rules = generate_total_formulas(&block, &TUP_LEDGER_COLUMNS).unwrap();

        assert_eq!(l_rules.len(), 25);
        let EnumRuleSpec::Formula(rule_first) = &l_rules[0] else {
            panic!("expected formula rule");
        };
        assert_eq!(rule_first.region, SpecGridRegion::cell(32, 6));
        assert_eq!(rule_first.formula, "SUM(D33:F33)");
        let EnumRuleSpec::Formula(rule_last) = &l_rules[24] else {
            panic!("expected formula rule");
        };
        assert_eq!(rule_last.region, SpecGridRegion::cell(56, 6));
        assert_eq!(rule_last.formula, "SUM(D57:F57)");
    }

    #[test]
    fn test_validation_probe_is_first_data_row_in_a1() {
        let block = derive_block(0, 0, 25);
        let l_rules = generate_amount_validations(&block, &TUP_LEDGER_COLUMNS);

        assert_eq!(l_rules.len(), 3);
        let EnumRuleSpec::Validation(rule) = &l_rules[0] else {
            panic!("expected validation rule");
        };
        assert_eq!(rule.region, SpecGridRegion::new(2, 3, 26, 3));
        assert_eq!(rule.predicate, "ISNUMBER(D3)");
        assert_eq!(rule.error_title, "Invalid Amount");
        assert_eq!(rule.error_message, "Please enter valid amount");
        assert!(rule.if_suppress_dropdown);
    }

    #[test]
    fn test_blank_warnings_cover_key_and_amount_columns() {
        let block = derive_block(0, 0, 25);
        let l_rules = generate_blank_warnings(&block, &TUP_LEDGER_COLUMNS);

        let l_pairs: Vec<(SpecGridRegion, String)> = l_rules
            .iter()
            .map(|rule| match rule {
                EnumRuleSpec::ConditionalFormat(cf) => (cf.region, cf.predicate.clone()),
                _ => panic!("expected conditional format"),
            })
            .collect();
        let c_amounts = "AND(ISBLANK($D3),ISBLANK($E3),ISBLANK($F3))".to_string();
        assert_eq!(
            l_pairs,
            vec![
                (SpecGridRegion::new(2, 0, 26, 0), "ISBLANK(A3)".to_string()),
                (SpecGridRegion::new(2, 3, 26, 3), c_amounts.clone()),
                (SpecGridRegion::new(2, 4, 26, 4), c_amounts.clone()),
                (SpecGridRegion::new(2, 5, 26, 5), c_amounts),
            ]
        );
    }

    #[test]
    fn test_rules_stay_inside_their_block() {
        let block = derive_block(3, 90, 25);
        let region_data = block.region_data();
        for rule in generate_block_rules(&block, &TUP_LEDGER_COLUMNS).unwrap() {
            assert!(region_data.contains(rule.region()), "{rule:?}");
        }
    }

    #[test]
    fn test_generation_is_deterministic() {
        let block = derive_block(2, 60, 25);
        assert_eq!(
            generate_block_rules(&block, &TUP_LEDGER_COLUMNS).unwrap(),
            generate_block_rules(&block, &TUP_LEDGER_COLUMNS).unwrap()
        );
    }

    #[test]
    fn test_computed_column_without_amounts_is_rejected() {
        let columns = [
            SpecColumn::new("Name", EnumColumnKind::Text),
            SpecColumn::new("Total", EnumColumnKind::ComputedCurrency),
        ];
        let block = SpecBlockGeometry {
            width_cols: 2,
            ..derive_block(0, 0, 4)
        };
        let err = generate_block_rules(&block, &columns).unwrap_err();
        assert!(matches!(err, LedgerError::Configuration(_)));
    }

    #[test]
    fn test_width_mismatch_is_rejected() {
        let block = SpecBlockGeometry {
            width_cols: 7,
            ..derive_block(0, 0, 4)
        };
        assert!(generate_block_rules(&block, &TUP_LEDGER_COLUMNS).is_err());
    }
}
