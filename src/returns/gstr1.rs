//! GSTR-1 outward supply buckets: B2B, B2C large and B2C small

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

use crate::returns::totals::TaxTotals;
use crate::tax::gst::SupplyType;
use crate::types::*;
use crate::utils::validation::validate_threshold;

/// Section of GSTR-1 a line is reported under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Gstr1Section {
    B2b,
    B2cl,
    B2cs,
}

/// Decide the section for a line.
///
/// Registered recipients go to B2B. Unregistered recipients go to B2C large
/// only when the invoice value is strictly above the threshold.
///
/// The document type plays no part: credit and debit notes are reported in
/// the same sections as invoices, with their amounts as stored.
/// [`build_gstr1`] applies this to the first line of each invoice and places
/// the whole invoice accordingly.
pub fn classify(line: &InvoiceLine, threshold: &BigDecimal) -> Gstr1Section {
    match &line.recipient_gstin {
        Some(_) => Gstr1Section::B2b,
        None if line.invoice_value > *threshold => Gstr1Section::B2cl,
        None => Gstr1Section::B2cs,
    }
}

/// One invoice with its aggregated amounts and itemized lines
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceEntry {
    pub invoice_number: String,
    pub invoice_date: NaiveDate,
    pub document_type: DocumentType,
    pub place_of_supply: String,
    pub supply_type: SupplyType,
    pub invoice_value: BigDecimal,
    #[serde(flatten)]
    pub totals: TaxTotals,
    pub lines: Vec<InvoiceLine>,
}

impl InvoiceEntry {
    /// Build an entry from the lines of one invoice; `None` when empty
    fn from_lines(lines: Vec<InvoiceLine>) -> Option<Self> {
        let first = lines.first()?;
        let invoice_date = lines
            .iter()
            .map(|line| line.invoice_date)
            .min()
            .unwrap_or(first.invoice_date);

        Some(Self {
            invoice_number: first.invoice_number.clone(),
            invoice_date,
            document_type: first.document_type,
            place_of_supply: first.place_of_supply.clone(),
            supply_type: first.supply_type,
            invoice_value: first.invoice_value.clone(),
            totals: TaxTotals::from_lines(&lines),
            lines,
        })
    }
}

/// B2B invoices of one recipient
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct B2bGroup {
    pub gstin: String,
    pub invoices: Vec<InvoiceEntry>,
}

/// B2C large invoices of one place of supply
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct B2clGroup {
    pub place_of_supply: String,
    pub invoices: Vec<InvoiceEntry>,
}

/// Grouping key of a consolidated B2C small row
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct B2csKey {
    pub place_of_supply: String,
    pub tax_rate: BigDecimal,
    pub supply_type: SupplyType,
}

/// Consolidated B2C small row; no per-invoice detail is kept
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct B2csRow {
    pub place_of_supply: String,
    pub tax_rate: BigDecimal,
    pub supply_type: SupplyType,
    #[serde(flatten)]
    pub totals: TaxTotals,
}

/// GSTR-1 buckets, keyed in ascending order.
///
/// Each map serializes as the sequence of its values.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Gstr1Buckets {
    #[serde(serialize_with = "serialize_values")]
    pub b2b: BTreeMap<String, B2bGroup>,
    #[serde(serialize_with = "serialize_values")]
    pub b2cl: BTreeMap<String, B2clGroup>,
    #[serde(serialize_with = "serialize_values")]
    pub b2cs: BTreeMap<B2csKey, B2csRow>,
}

impl Gstr1Buckets {
    /// Iterate over every B2B and B2C large invoice
    pub fn invoices(&self) -> impl Iterator<Item = &InvoiceEntry> {
        self.b2b
            .values()
            .flat_map(|group| group.invoices.iter())
            .chain(self.b2cl.values().flat_map(|group| group.invoices.iter()))
    }
}

fn serialize_values<K, V, S>(map: &BTreeMap<K, V>, serializer: S) -> Result<S::Ok, S::Error>
where
    V: Serialize,
    S: Serializer,
{
    serializer.collect_seq(map.values())
}

/// Number of reported entries per section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Gstr1Counts {
    /// B2B invoices
    pub b2b: usize,
    /// B2C large invoices
    pub b2cl: usize,
    /// Consolidated B2C small rows
    pub b2cs: usize,
}

/// Totals across all three sections, used for reconciliation display
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Gstr1Summary {
    pub total_invoices: usize,
    pub counts: Gstr1Counts,
    pub totals: TaxTotals,
}

/// Complete GSTR-1 computation
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Gstr1Report {
    pub gstr1: Gstr1Buckets,
    pub summary: Gstr1Summary,
}

/// Build the GSTR-1 buckets and summary for a set of lines.
///
/// Invoices inside every group are ordered by date, then number.
pub fn build_gstr1(lines: &[InvoiceLine], threshold: &BigDecimal) -> GstReturnResult<Gstr1Report> {
    validate_threshold(threshold)?;

    let mut ordered = lines.to_vec();
    ordered.sort_by(|a, b| {
        a.invoice_date
            .cmp(&b.invoice_date)
            .then_with(|| a.invoice_number.cmp(&b.invoice_number))
    });

    let mut by_invoice: BTreeMap<String, Vec<InvoiceLine>> = BTreeMap::new();
    for line in ordered {
        by_invoice
            .entry(line.invoice_number.clone())
            .or_default()
            .push(line);
    }

    let mut b2b_lines: BTreeMap<String, Vec<InvoiceLine>> = BTreeMap::new();
    let mut b2cl_lines: BTreeMap<String, Vec<InvoiceLine>> = BTreeMap::new();
    let mut b2cs_lines: BTreeMap<B2csKey, Vec<InvoiceLine>> = BTreeMap::new();
    let mut b2cs_invoices: BTreeSet<String> = BTreeSet::new();

    // An invoice lands in one section and one group, keyed by its first line
    for (number, invoice_lines) in by_invoice {
        let Some(first) = invoice_lines.first() else {
            continue;
        };

        match (classify(first, threshold), first.recipient_gstin.clone()) {
            (Gstr1Section::B2b, Some(gstin)) => {
                b2b_lines.entry(gstin).or_default().extend(invoice_lines)
            }
            (Gstr1Section::B2cl, _) => b2cl_lines
                .entry(first.place_of_supply.clone())
                .or_default()
                .extend(invoice_lines),
            _ => {
                b2cs_invoices.insert(number);
                for line in invoice_lines {
                    b2cs_lines
                        .entry(B2csKey {
                            place_of_supply: line.place_of_supply.clone(),
                            tax_rate: line.tax_rate.clone(),
                            supply_type: line.supply_type,
                        })
                        .or_default()
                        .push(line);
                }
            }
        }
    }

    let b2b: BTreeMap<String, B2bGroup> = b2b_lines
        .into_iter()
        .map(|(gstin, lines)| {
            let group = B2bGroup {
                gstin: gstin.clone(),
                invoices: group_invoices(lines),
            };
            (gstin, group)
        })
        .collect();

    let b2cl: BTreeMap<String, B2clGroup> = b2cl_lines
        .into_iter()
        .map(|(place, lines)| {
            let group = B2clGroup {
                place_of_supply: place.clone(),
                invoices: group_invoices(lines),
            };
            (place, group)
        })
        .collect();

    let b2cs: BTreeMap<B2csKey, B2csRow> = b2cs_lines
        .into_iter()
        .map(|(key, lines)| {
            let row = B2csRow {
                place_of_supply: key.place_of_supply.clone(),
                tax_rate: key.tax_rate.clone(),
                supply_type: key.supply_type,
                totals: TaxTotals::from_lines(&lines),
            };
            (key, row)
        })
        .collect();

    let buckets = Gstr1Buckets { b2b, b2cl, b2cs };
    let summary = summarize(&buckets, &b2cs_invoices);

    debug!(
        b2b = summary.counts.b2b,
        b2cl = summary.counts.b2cl,
        b2cs = summary.counts.b2cs,
        total_invoices = summary.total_invoices,
        "Built GSTR-1 buckets"
    );

    Ok(Gstr1Report {
        gstr1: buckets,
        summary,
    })
}

/// Group lines by invoice number, ordered by (date, number)
fn group_invoices(lines: Vec<InvoiceLine>) -> Vec<InvoiceEntry> {
    let mut by_number: BTreeMap<String, Vec<InvoiceLine>> = BTreeMap::new();
    for line in lines {
        by_number
            .entry(line.invoice_number.clone())
            .or_default()
            .push(line);
    }

    let mut invoices: Vec<InvoiceEntry> = by_number
        .into_values()
        .filter_map(InvoiceEntry::from_lines)
        .collect();
    invoices.sort_by(|a, b| {
        a.invoice_date
            .cmp(&b.invoice_date)
            .then_with(|| a.invoice_number.cmp(&b.invoice_number))
    });
    invoices
}

fn summarize(buckets: &Gstr1Buckets, b2cs_invoices: &BTreeSet<String>) -> Gstr1Summary {
    let counts = Gstr1Counts {
        b2b: buckets.b2b.values().map(|g| g.invoices.len()).sum(),
        b2cl: buckets.b2cl.values().map(|g| g.invoices.len()).sum(),
        b2cs: buckets.b2cs.len(),
    };

    let distinct: BTreeSet<&str> = buckets
        .invoices()
        .map(|invoice| invoice.invoice_number.as_str())
        .chain(b2cs_invoices.iter().map(String::as_str))
        .collect();

    let section_totals: Vec<&TaxTotals> = buckets
        .invoices()
        .map(|invoice| &invoice.totals)
        .chain(buckets.b2cs.values().map(|row| &row.totals))
        .collect();

    Gstr1Summary {
        total_invoices: distinct.len(),
        counts,
        totals: TaxTotals::combine(section_totals),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn line(number: &str, day: u32, gstin: Option<&str>, invoice_value: &str) -> InvoiceLine {
        InvoiceLine {
            invoice_number: number.to_string(),
            invoice_date: NaiveDate::from_ymd_opt(2024, 4, day).unwrap(),
            document_type: DocumentType::Invoice,
            customer_id: None,
            recipient_gstin: gstin.map(str::to_string),
            place_of_supply: "27-Maharashtra".to_string(),
            hsn_code: "1006".to_string(),
            description: "Rice".to_string(),
            unit_of_measure: "KGS".to_string(),
            quantity: dec("1"),
            taxable_value: dec("1000"),
            tax_rate: dec("18"),
            igst: dec("0"),
            cgst: dec("90"),
            sgst: dec("90"),
            cess: dec("0"),
            invoice_value: dec(invoice_value),
            supply_type: SupplyType::Intra,
        }
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let threshold = dec("250000.00");
        assert_eq!(
            classify(&line("A", 1, None, "250000.00"), &threshold),
            Gstr1Section::B2cs
        );
        assert_eq!(
            classify(&line("B", 1, None, "250000.01"), &threshold),
            Gstr1Section::B2cl
        );
        assert_eq!(
            classify(&line("C", 1, Some("27AAAAA0000A1Z5"), "999999"), &threshold),
            Gstr1Section::B2b
        );
    }

    #[test]
    fn test_rejects_non_positive_threshold() {
        let result = build_gstr1(&[], &dec("0"));
        assert!(matches!(result, Err(GstReturnError::ThresholdNotPositive(_))));
    }

    #[test]
    fn test_empty_input() {
        let report = build_gstr1(&[], &dec("250000")).unwrap();
        assert!(report.gstr1.b2b.is_empty());
        assert_eq!(report.summary.total_invoices, 0);
        assert_eq!(report.summary.totals.igst, dec("0"));
    }

    #[test]
    fn test_b2b_invoice_ordering_and_grouping() {
        let gstin = Some("27AAAAA0000A1Z5");
        let lines = vec![
            line("INV-3", 5, gstin, "2360"),
            line("INV-2", 3, gstin, "1180"),
            line("INV-1", 5, gstin, "1180"),
            line("INV-3", 5, gstin, "2360"),
        ];
        let report = build_gstr1(&lines, &dec("250000")).unwrap();

        let group = &report.gstr1.b2b["27AAAAA0000A1Z5"];
        let numbers: Vec<&str> = group
            .invoices
            .iter()
            .map(|i| i.invoice_number.as_str())
            .collect();
        assert_eq!(numbers, vec!["INV-2", "INV-1", "INV-3"]);

        let inv3 = &group.invoices[2];
        assert_eq!(inv3.lines.len(), 2);
        assert_eq!(inv3.totals.taxable_value, dec("2000"));
        assert_eq!(inv3.totals.cgst, dec("180"));
        assert_eq!(report.summary.counts.b2b, 3);
    }

    #[test]
    fn test_b2cs_rows_are_consolidated_by_place_and_rate() {
        let mut five_percent = line("INV-2", 2, None, "1050");
        five_percent.tax_rate = dec("5");
        five_percent.cgst = dec("25");
        five_percent.sgst = dec("25");

        let lines = vec![
            line("INV-1", 1, None, "1180"),
            five_percent,
            line("INV-3", 3, None, "1180"),
        ];
        let report = build_gstr1(&lines, &dec("250000")).unwrap();

        assert_eq!(report.gstr1.b2cs.len(), 2);
        let rows: Vec<&B2csRow> = report.gstr1.b2cs.values().collect();
        assert_eq!(rows[0].tax_rate, dec("5"));
        assert_eq!(rows[1].tax_rate, dec("18"));
        assert_eq!(rows[1].totals.taxable_value, dec("2000"));
        assert_eq!(rows[1].totals.cgst, dec("180"));
        assert_eq!(report.summary.total_invoices, 3);
        assert_eq!(report.summary.counts.b2cs, 2);
    }

    #[test]
    fn test_b2cl_lists_invoices_individually() {
        let lines = vec![
            line("INV-2", 2, None, "300000"),
            line("INV-1", 1, None, "400000"),
        ];
        let report = build_gstr1(&lines, &dec("250000")).unwrap();

        let group = &report.gstr1.b2cl["27-Maharashtra"];
        assert_eq!(group.invoices.len(), 2);
        assert_eq!(group.invoices[0].invoice_number, "INV-1");
        assert!(report.gstr1.b2cs.is_empty());
    }

    #[test]
    fn test_invoice_with_two_places_stays_in_one_group() {
        let mut karnataka = line("INV-1", 1, None, "400000");
        karnataka.place_of_supply = "29-Karnataka".to_string();
        let lines = vec![line("INV-1", 1, None, "400000"), karnataka];
        let report = build_gstr1(&lines, &dec("250000")).unwrap();

        assert_eq!(report.gstr1.b2cl.len(), 1);
        let group = &report.gstr1.b2cl["27-Maharashtra"];
        assert_eq!(group.invoices.len(), 1);
        assert_eq!(group.invoices[0].lines.len(), 2);
        assert_eq!(report.summary.counts.b2cl, 1);
        assert_eq!(report.summary.total_invoices, 1);
    }

    #[test]
    fn test_invoice_with_two_gstins_stays_in_one_group() {
        let lines = vec![
            line("INV-1", 1, Some("27AAAAA0000A1Z5"), "2360"),
            line("INV-1", 1, Some("29BBBBB1111B1Z1"), "2360"),
        ];
        let report = build_gstr1(&lines, &dec("250000")).unwrap();

        assert_eq!(report.gstr1.b2b.len(), 1);
        assert_eq!(report.gstr1.b2b["27AAAAA0000A1Z5"].invoices[0].lines.len(), 2);
        assert_eq!(report.summary.counts.b2b, 1);
    }

    #[test]
    fn test_invoice_section_follows_first_line() {
        // The second line has no GSTIN but belongs to a B2B invoice
        let lines = vec![
            line("INV-1", 1, Some("27AAAAA0000A1Z5"), "2360"),
            line("INV-1", 1, None, "2360"),
        ];
        let report = build_gstr1(&lines, &dec("250000")).unwrap();

        assert!(report.gstr1.b2cs.is_empty());
        assert_eq!(report.gstr1.b2b["27AAAAA0000A1Z5"].invoices[0].lines.len(), 2);
        assert_eq!(report.summary.totals.taxable_value, dec("2000"));
    }

    #[test]
    fn test_b2cs_rows_split_by_supply_type() {
        let mut inter = line("INV-2", 2, None, "1180");
        inter.supply_type = SupplyType::Inter;
        inter.cgst = dec("0");
        inter.sgst = dec("0");
        inter.igst = dec("180");

        let lines = vec![line("INV-1", 1, None, "1180"), inter];
        let report = build_gstr1(&lines, &dec("250000")).unwrap();

        assert_eq!(report.gstr1.b2cs.len(), 2);
        let rows: Vec<&B2csRow> = report.gstr1.b2cs.values().collect();
        assert_eq!(rows[0].supply_type, SupplyType::Intra);
        assert_eq!(rows[0].totals.igst, dec("0"));
        assert_eq!(rows[1].supply_type, SupplyType::Inter);
        assert_eq!(rows[1].totals.igst, dec("180"));
        assert_eq!(rows[1].totals.cgst, dec("0"));
    }

    #[test]
    fn test_notes_are_reported_with_invoices() {
        let mut note = line("CN-1", 2, None, "1180");
        note.document_type = DocumentType::CreditNote;
        let lines = vec![line("INV-1", 1, None, "1180"), note];
        let report = build_gstr1(&lines, &dec("250000")).unwrap();

        assert_eq!(
            classify(&lines[1], &dec("250000")),
            Gstr1Section::B2cs
        );
        assert_eq!(report.gstr1.b2cs.len(), 1);
        assert_eq!(report.summary.totals.taxable_value, dec("2000"));
        assert_eq!(report.summary.total_invoices, 2);
    }

    #[test]
    fn test_serializes_buckets_as_arrays() {
        let lines = vec![line("INV-1", 1, Some("27AAAAA0000A1Z5"), "1180")];
        let report = build_gstr1(&lines, &dec("250000")).unwrap();
        let json = serde_json::to_value(&report).unwrap();

        assert!(json["gstr1"]["b2b"].is_array());
        assert_eq!(json["gstr1"]["b2b"][0]["gstin"], "27AAAAA0000A1Z5");
        assert!(json["gstr1"]["b2b"][0]["invoices"][0]["taxableValue"].is_string());
        assert!(json["gstr1"]["b2cs"].is_array());
        assert_eq!(json["summary"]["totalInvoices"], 1);
    }
}
