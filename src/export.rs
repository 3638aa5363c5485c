//! CSV and JSON export of prepared returns
//!
//! CSV columns follow the GST portal's offline templates; amounts are written
//! with two decimals and rates as stored.

use serde::Serialize;

use crate::returns::{DocumentSummary, Gstr1Report, HsnSummaryRow};
use crate::types::*;
use crate::utils::money::format_money;

const HSN_HEADER: &str = "HSN,Description,UQC,Total Quantity,Total Value,Rate,Taxable Value,\
Integrated Tax Amount,Central Tax Amount,State/UT Tax Amount,Cess Amount";

const B2CS_HEADER: &str = "Type,Place Of Supply,Rate,Taxable Value,Integrated Tax Amount,\
Central Tax Amount,State/UT Tax Amount,Cess Amount";

const DOCUMENT_HEADER: &str =
    "Number,Date,Type,Party,GSTIN,Place Of Supply,Taxable Value,IGST,CGST,SGST,Cess,Total";

/// HSN summary as CSV
pub fn hsn_summary_csv(rows: &[HsnSummaryRow]) -> String {
    let mut out = String::from(HSN_HEADER);
    out.push_str("\r\n");

    for row in rows {
        let fields = [
            csv_field(&row.hsn_code),
            csv_field(&row.description),
            csv_field(&row.unit_of_measure),
            row.total_quantity.to_string(),
            format_money(&row.total_value),
            row.tax_rate.to_string(),
            format_money(&row.totals.taxable_value),
            format_money(&row.totals.igst),
            format_money(&row.totals.cgst),
            format_money(&row.totals.sgst),
            format_money(&row.totals.cess),
        ];
        push_record(&mut out, &fields);
    }
    out
}

/// Consolidated B2C small rows of a GSTR-1 report as CSV
pub fn b2cs_csv(report: &Gstr1Report) -> String {
    let mut out = String::from(B2CS_HEADER);
    out.push_str("\r\n");

    for row in report.gstr1.b2cs.values() {
        let fields = [
            // Ecommerce supplies are not tracked, so every row is "OE"
            "OE".to_string(),
            csv_field(&row.place_of_supply),
            row.tax_rate.to_string(),
            format_money(&row.totals.taxable_value),
            format_money(&row.totals.igst),
            format_money(&row.totals.cgst),
            format_money(&row.totals.sgst),
            format_money(&row.totals.cess),
        ];
        push_record(&mut out, &fields);
    }
    out
}

/// Document summary as CSV
pub fn document_summary_csv(summary: &DocumentSummary) -> String {
    let mut out = String::from(DOCUMENT_HEADER);
    out.push_str("\r\n");

    for document in &summary.documents {
        let (party_name, party_gstin) = match &document.party {
            Some(party) => (party.name.as_str(), party.gstin.as_deref().unwrap_or("")),
            None => ("", ""),
        };
        let fields = [
            csv_field(&document.number),
            document.date.format(ReturnPeriod::DATE_FORMAT).to_string(),
            document.document_type.as_str().to_string(),
            csv_field(party_name),
            csv_field(party_gstin),
            csv_field(&document.place_of_supply),
            format_money(&document.totals.taxable_value),
            format_money(&document.totals.igst),
            format_money(&document.totals.cgst),
            format_money(&document.totals.sgst),
            format_money(&document.totals.cess),
            format_money(&document.total),
        ];
        push_record(&mut out, &fields);
    }
    out
}

/// Pretty-printed JSON mirroring the response shapes
pub fn to_json<T: Serialize>(value: &T) -> GstReturnResult<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| GstReturnError::Export(format!("Cannot serialize to JSON: {}", e)))
}

fn push_record(out: &mut String, fields: &[String]) {
    out.push_str(&fields.join(","));
    out.push_str("\r\n");
}

/// Quote a field when it contains a separator, quote or line break
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
