//! Cross-checks between computed returns and the lines they were built from
//!
//! Stored tax amounts are trusted by the aggregation; this module surfaces
//! where they disagree with `taxable_value × tax_rate`, and where section
//! totals drift from the line totals.

use bigdecimal::BigDecimal;
use serde::Serialize;
use tracing::warn;

use crate::returns::{DocumentSummary, Gstr1Report, HsnSummaryRow, TaxTotals};
use crate::tax::gst::{GstCalculation, GstRate, SupplyType};
use crate::types::*;
use crate::utils::money::{sum_money, within_tolerance};

/// A line whose stored tax components differ from the expected split
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineTaxMismatch {
    pub invoice_number: String,
    pub hsn_code: String,
    pub supply_type: SupplyType,
    pub expected_igst: BigDecimal,
    pub expected_cgst: BigDecimal,
    pub expected_sgst: BigDecimal,
    pub stored_igst: BigDecimal,
    pub stored_cgst: BigDecimal,
    pub stored_sgst: BigDecimal,
}

/// A total that does not agree with its source
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalsDifference {
    /// Component or document the difference was found on
    pub subject: String,
    pub expected: BigDecimal,
    pub actual: BigDecimal,
}

/// Outcome of reconciling one period
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationReport {
    pub is_consistent: bool,
    pub line_totals: TaxTotals,
    pub gstr1_differences: Vec<TotalsDifference>,
    pub hsn_coverage_match: bool,
    pub hsn_taxable_value: BigDecimal,
    pub line_mismatches: Vec<LineTaxMismatch>,
}

/// Reconciliation checks with a rounding tolerance
#[derive(Debug, Clone)]
pub struct ReconciliationEngine {
    tolerance: BigDecimal,
}

impl Default for ReconciliationEngine {
    fn default() -> Self {
        Self::new(BigDecimal::new(1.into(), 2))
    }
}

impl ReconciliationEngine {
    /// Create an engine with the given tolerance
    pub fn new(tolerance: BigDecimal) -> Self {
        Self { tolerance }
    }

    /// Reconcile a GSTR-1 report and HSN summary against their input lines
    pub fn reconcile(
        &self,
        lines: &[InvoiceLine],
        report: &Gstr1Report,
        hsn_rows: &[HsnSummaryRow],
    ) -> GstReturnResult<ReconciliationReport> {
        let line_totals = TaxTotals::from_lines(lines);
        let gstr1_differences = self.compare_totals(&line_totals, &report.summary.totals);

        let hsn_taxable_value = sum_money(hsn_rows.iter().map(|row| &row.totals.taxable_value));
        let hsn_coverage_match = within_tolerance(
            &hsn_taxable_value,
            &line_totals.taxable_value,
            &self.tolerance,
        );

        let line_mismatches = self.check_lines(lines)?;

        let is_consistent =
            gstr1_differences.is_empty() && hsn_coverage_match && line_mismatches.is_empty();

        if !is_consistent {
            warn!(
                gstr1_differences = gstr1_differences.len(),
                hsn_coverage_match,
                line_mismatches = line_mismatches.len(),
                "GST return does not reconcile with its lines"
            );
        }

        Ok(ReconciliationReport {
            is_consistent,
            line_totals,
            gstr1_differences,
            hsn_coverage_match,
            hsn_taxable_value,
            line_mismatches,
        })
    }

    /// Compare every line's stored IGST/CGST/SGST with the expected split
    pub fn check_lines(&self, lines: &[InvoiceLine]) -> GstReturnResult<Vec<LineTaxMismatch>> {
        let mut mismatches = Vec::new();

        for line in lines {
            let expected = GstCalculation::calculate(
                line.taxable_value.clone(),
                GstRate::for_supply(line.tax_rate.clone(), line.supply_type),
            )?;

            let agrees = within_tolerance(&expected.igst_amount, &line.igst, &self.tolerance)
                && within_tolerance(&expected.cgst_amount, &line.cgst, &self.tolerance)
                && within_tolerance(&expected.sgst_amount, &line.sgst, &self.tolerance);

            if !agrees {
                mismatches.push(LineTaxMismatch {
                    invoice_number: line.invoice_number.clone(),
                    hsn_code: line.hsn_code.clone(),
                    supply_type: line.supply_type,
                    expected_igst: expected.igst_amount,
                    expected_cgst: expected.cgst_amount,
                    expected_sgst: expected.sgst_amount,
                    stored_igst: line.igst.clone(),
                    stored_cgst: line.cgst.clone(),
                    stored_sgst: line.sgst.clone(),
                });
            }
        }

        Ok(mismatches)
    }

    /// Documents whose total differs from taxable value plus tax
    pub fn check_document_totals(&self, summary: &DocumentSummary) -> Vec<TotalsDifference> {
        summary
            .documents
            .iter()
            .filter_map(|document| {
                let expected = document.totals.total();
                if within_tolerance(&expected, &document.total, &self.tolerance) {
                    None
                } else {
                    Some(TotalsDifference {
                        subject: document.number.clone(),
                        expected,
                        actual: document.total.clone(),
                    })
                }
            })
            .collect()
    }

    fn compare_totals(&self, expected: &TaxTotals, actual: &TaxTotals) -> Vec<TotalsDifference> {
        [
            ("taxableValue", &expected.taxable_value, &actual.taxable_value),
            ("igst", &expected.igst, &actual.igst),
            ("cgst", &expected.cgst, &actual.cgst),
            ("sgst", &expected.sgst, &actual.sgst),
            ("cess", &expected.cess, &actual.cess),
        ]
        .into_iter()
        .filter(|(_, expected, actual)| !within_tolerance(expected, actual, &self.tolerance))
        .map(|(subject, expected, actual)| TotalsDifference {
            subject: subject.to_string(),
            expected: expected.clone(),
            actual: actual.clone(),
        })
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::returns::{build_document_summary, build_gstr1, build_hsn_summary};
    use chrono::NaiveDate;
    use std::collections::HashMap;
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn line(number: &str, igst: &str, cgst: &str, sgst: &str) -> InvoiceLine {
        let supply_type = if dec(igst) > BigDecimal::from(0) {
            SupplyType::Inter
        } else {
            SupplyType::Intra
        };
        InvoiceLine {
            invoice_number: number.to_string(),
            invoice_date: NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
            document_type: DocumentType::Invoice,
            customer_id: None,
            recipient_gstin: None,
            place_of_supply: "27-Maharashtra".to_string(),
            hsn_code: "1006".to_string(),
            description: String::new(),
            unit_of_measure: String::new(),
            quantity: dec("1"),
            taxable_value: dec("1000"),
            tax_rate: dec("18"),
            igst: dec(igst),
            cgst: dec(cgst),
            sgst: dec(sgst),
            cess: dec("0"),
            invoice_value: dec("1180"),
            supply_type,
        }
    }

    #[test]
    fn test_consistent_period() {
        let lines = vec![line("INV-1", "180", "0", "0"), line("INV-2", "0", "90", "90")];
        let report = build_gstr1(&lines, &dec("250000")).unwrap();
        let hsn = build_hsn_summary(&lines);

        let result = ReconciliationEngine::default()
            .reconcile(&lines, &report, &hsn)
            .unwrap();

        assert!(result.is_consistent);
        assert!(result.hsn_coverage_match);
        assert_eq!(result.line_totals.igst, dec("180"));
    }

    #[test]
    fn test_flags_stored_tax_mismatch() {
        let lines = vec![line("INV-1", "0", "100", "90")];
        let mismatches = ReconciliationEngine::default().check_lines(&lines).unwrap();

        assert_eq!(mismatches.len(), 1);
        assert_eq!(mismatches[0].expected_cgst, dec("90"));
        assert_eq!(mismatches[0].stored_cgst, dec("100"));
    }

    #[test]
    fn test_tolerates_rounding() {
        let lines = vec![line("INV-1", "0", "90.01", "89.99")];
        assert!(ReconciliationEngine::default()
            .check_lines(&lines)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_detects_drifted_summary() {
        let lines = vec![line("INV-1", "180", "0", "0")];
        let mut report = build_gstr1(&lines, &dec("250000")).unwrap();
        report.summary.totals.igst = dec("179");

        let result = ReconciliationEngine::default()
            .reconcile(&lines, &report, &build_hsn_summary(&lines))
            .unwrap();

        assert!(!result.is_consistent);
        assert_eq!(result.gstr1_differences.len(), 1);
        assert_eq!(result.gstr1_differences[0].subject, "igst");
    }

    #[test]
    fn test_document_totals() {
        let lines = vec![line("INV-1", "180", "0", "0")];
        let mut summary = build_document_summary(&lines, &HashMap::new());
        let engine = ReconciliationEngine::default();
        assert!(engine.check_document_totals(&summary).is_empty());

        summary.documents[0].total = dec("1000");
        let differences = engine.check_document_totals(&summary);
        assert_eq!(differences[0].subject, "INV-1");
        assert_eq!(differences[0].expected, dec("1180"));
    }
}
