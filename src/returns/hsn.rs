//! HSN-wise summary of outward supplies

use bigdecimal::BigDecimal;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

use crate::returns::totals::TaxTotals;
use crate::types::InvoiceLine;
use crate::utils::money::{compare_hsn_codes, round_money, sum_money};

/// One row of the HSN summary, keyed by (HSN code, tax rate)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HsnSummaryRow {
    pub hsn_code: String,
    pub description: String,
    pub unit_of_measure: String,
    pub tax_rate: BigDecimal,
    pub total_quantity: BigDecimal,
    #[serde(flatten)]
    pub totals: TaxTotals,
    /// IGST + CGST + SGST + cess
    pub tax_amount: BigDecimal,
    /// Taxable value plus tax
    pub total_value: BigDecimal,
}

/// Build the HSN summary.
///
/// Description and unit come from the first line seen for each group. Rows
/// are ordered by HSN code (see [`compare_hsn_codes`]) and then by rate.
pub fn build_hsn_summary(lines: &[InvoiceLine]) -> Vec<HsnSummaryRow> {
    let mut order: Vec<(String, BigDecimal)> = Vec::new();
    let mut groups: BTreeMap<(String, BigDecimal), Vec<&InvoiceLine>> = BTreeMap::new();

    // 18 and 18.00 compare equal, so they share a group
    for line in lines {
        let key = (line.hsn_code.clone(), line.tax_rate.clone());
        groups
            .entry(key.clone())
            .or_insert_with(|| {
                order.push(key);
                Vec::new()
            })
            .push(line);
    }

    let mut rows: Vec<HsnSummaryRow> = order
        .into_iter()
        .filter_map(|key| {
            let group = groups.remove(&key)?;
            let first = group.first()?;
            let totals = TaxTotals::from_lines(group.iter().copied());
            let tax_amount = round_money(&totals.tax_amount());
            let total_value = round_money(&totals.total());

            Some(HsnSummaryRow {
                hsn_code: first.hsn_code.clone(),
                description: first.description.clone(),
                unit_of_measure: first.unit_of_measure.clone(),
                tax_rate: first.tax_rate.clone(),
                total_quantity: sum_money(group.iter().map(|line| &line.quantity)),
                totals,
                tax_amount,
                total_value,
            })
        })
        .collect();

    rows.sort_by(|a, b| {
        compare_hsn_codes(&a.hsn_code, &b.hsn_code).then_with(|| a.tax_rate.cmp(&b.tax_rate))
    });

    debug!(rows = rows.len(), lines = lines.len(), "Built HSN summary");
    rows
}
