//! Turn raw stored invoice lines into normalized [`InvoiceLine`]s

use bigdecimal::BigDecimal;
use std::collections::BTreeMap;
use tracing::debug;

use crate::tax::gst::{GstCalculation, GstRate, SupplyType};
use crate::types::*;
use crate::utils::money::{round_money, sum_money};
use crate::utils::validation::*;

/// Normalize every raw line, failing on the first malformed one.
///
/// Lines without a stored invoice value get the sum of taxable value and tax
/// over all lines sharing their invoice number; if any line of the invoice
/// carries a stored value, that value is used for the whole invoice.
pub fn normalize_lines(
    raw_lines: &[RawInvoiceLine],
    home_state: Option<&str>,
) -> GstReturnResult<Vec<InvoiceLine>> {
    let pending = raw_lines
        .iter()
        .enumerate()
        .map(|(index, raw)| normalize_line(raw, index, home_state))
        .collect::<GstReturnResult<Vec<_>>>()?;

    let mut stored_values: BTreeMap<&str, &BigDecimal> = BTreeMap::new();
    let mut line_totals: BTreeMap<&str, Vec<BigDecimal>> = BTreeMap::new();
    for (line, stored) in &pending {
        if let Some(value) = stored {
            stored_values.entry(&line.invoice_number).or_insert(value);
        }
        line_totals
            .entry(&line.invoice_number)
            .or_default()
            .push(&line.taxable_value + line.tax_amount());
    }

    let invoice_values: BTreeMap<String, BigDecimal> = line_totals
        .iter()
        .map(|(number, totals)| {
            let value = match stored_values.get(number) {
                Some(stored) => round_money(stored),
                None => sum_money(totals.iter()),
            };
            (number.to_string(), value)
        })
        .collect();

    let lines: Vec<InvoiceLine> = pending
        .into_iter()
        .map(|(line, _)| {
            let invoice_value = invoice_values
                .get(&line.invoice_number)
                .cloned()
                .unwrap_or_else(|| BigDecimal::from(0));
            InvoiceLine {
                invoice_value,
                ..line
            }
        })
        .collect();

    debug!(
        lines = lines.len(),
        invoices = invoice_values.len(),
        "Normalized invoice lines"
    );

    Ok(lines)
}

/// Normalize a single line; the invoice value is left at zero and returned
/// separately when stored
fn normalize_line(
    raw: &RawInvoiceLine,
    index: usize,
    home_state: Option<&str>,
) -> GstReturnResult<(InvoiceLine, Option<BigDecimal>)> {
    let line_ref = format!(
        "line {} (invoice {})",
        index + 1,
        raw.invoice_number.as_deref().unwrap_or("?")
    );

    let invoice_number = require_text(&raw.invoice_number, "invoiceNumber", &line_ref)?;
    let invoice_date = raw.invoice_date.ok_or_else(|| {
        GstReturnError::MalformedLine(format!(
            "{}: missing required field 'invoiceDate'",
            line_ref
        ))
    })?;
    let place_of_supply = require_text(&raw.place_of_supply, "placeOfSupply", &line_ref)?;
    let hsn_code = require_text(&raw.hsn_code, "hsnCode", &line_ref)?;

    let tax_rate = require_amount(&raw.tax_rate, "taxRate", &line_ref)?;
    validate_non_negative(&tax_rate, "taxRate", &line_ref)?;

    let quantity = raw.quantity.clone().unwrap_or_else(|| BigDecimal::from(0));
    validate_non_negative(&quantity, "quantity", &line_ref)?;

    let taxable_value = match (&raw.taxable_value, &raw.unit_price) {
        (Some(value), _) => round_money(value),
        (None, Some(unit_price)) => {
            let gross = &quantity * unit_price;
            let discount = raw.discount.clone().unwrap_or_else(|| BigDecimal::from(0));
            round_money(&(gross - discount))
        }
        (None, None) => {
            return Err(GstReturnError::MalformedLine(format!(
                "{}: missing required field 'taxableValue'",
                line_ref
            )))
        }
    };
    validate_non_negative(&taxable_value, "taxableValue", &line_ref)?;

    let supply_type = resolve_supply_type(raw, &place_of_supply, home_state);

    let (igst, cgst, sgst) = match (&raw.igst, &raw.cgst, &raw.sgst) {
        (None, None, None) => {
            let calculation = GstCalculation::calculate(
                taxable_value.clone(),
                GstRate::for_supply(tax_rate.clone(), supply_type),
            )?;
            (
                calculation.igst_amount,
                calculation.cgst_amount,
                calculation.sgst_amount,
            )
        }
        // Stored amounts are kept, at money precision
        (igst, cgst, sgst) => (
            stored_amount(igst),
            stored_amount(cgst),
            stored_amount(sgst),
        ),
    };

    let line = InvoiceLine {
        invoice_number,
        invoice_date,
        document_type: raw.document_type.unwrap_or_default(),
        customer_id: non_blank(&raw.customer_id),
        recipient_gstin: non_blank(&raw.recipient_gstin),
        place_of_supply,
        hsn_code,
        description: raw.description.clone().unwrap_or_default(),
        unit_of_measure: raw.unit_of_measure.clone().unwrap_or_default(),
        quantity,
        taxable_value,
        tax_rate,
        igst,
        cgst,
        sgst,
        cess: stored_amount(&raw.cess),
        invoice_value: BigDecimal::from(0),
        supply_type,
    };

    Ok((line, raw.invoice_value.clone()))
}

fn stored_amount(value: &Option<BigDecimal>) -> BigDecimal {
    value
        .as_ref()
        .map(round_money)
        .unwrap_or_else(|| BigDecimal::from(0))
}

/// Stored supply type, else home-state comparison, else whatever the stored
/// tax components imply, else intra-state
fn resolve_supply_type(
    raw: &RawInvoiceLine,
    place_of_supply: &str,
    home_state: Option<&str>,
) -> SupplyType {
    if let Some(supply_type) = raw.supply_type {
        return supply_type;
    }
    if let Some(home) = home_state {
        return SupplyType::from_states(place_of_supply, home);
    }

    let zero = BigDecimal::from(0);
    match &raw.igst {
        Some(igst) if *igst > zero => SupplyType::Inter,
        _ => SupplyType::Intra,
    }
}
