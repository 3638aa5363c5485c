//! Document summary: one entry per issued document, newest first

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

use crate::returns::totals::TaxTotals;
use crate::types::*;
use crate::utils::money::round_money;

/// Summary of one document, derived by summing its lines
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSummaryEntry {
    pub number: String,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub document_type: DocumentType,
    /// `None` when the customer could not be resolved
    pub party: Option<Party>,
    pub place_of_supply: String,
    #[serde(flatten)]
    pub totals: TaxTotals,
    pub total: BigDecimal,
}

/// All documents of a period
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSummary {
    pub documents: Vec<DocumentSummaryEntry>,
    pub total_count: usize,
}

/// Build the document summary.
///
/// Parties are looked up by the document's customer id; a document whose
/// customer is unknown still appears, with no party. Entries are ordered by
/// date descending, then number descending.
pub fn build_document_summary(
    lines: &[InvoiceLine],
    parties: &HashMap<String, Party>,
) -> DocumentSummary {
    let mut by_number: BTreeMap<&str, Vec<&InvoiceLine>> = BTreeMap::new();
    for line in lines {
        by_number
            .entry(line.invoice_number.as_str())
            .or_default()
            .push(line);
    }

    let mut documents: Vec<DocumentSummaryEntry> = by_number
        .into_values()
        .filter_map(|document_lines| document_entry(&document_lines, parties))
        .collect();

    documents.sort_by(|a, b| {
        b.date
            .cmp(&a.date)
            .then_with(|| b.number.cmp(&a.number))
    });

    let unresolved = documents.iter().filter(|d| d.party.is_none()).count();
    debug!(
        documents = documents.len(),
        unresolved_parties = unresolved,
        "Built document summary"
    );

    DocumentSummary {
        total_count: documents.len(),
        documents,
    }
}

fn document_entry(
    lines: &[&InvoiceLine],
    parties: &HashMap<String, Party>,
) -> Option<DocumentSummaryEntry> {
    let first = lines.first()?;
    let date = lines.iter().map(|line| line.invoice_date).min()?;
    let party = lines
        .iter()
        .find_map(|line| line.customer_id.as_ref())
        .and_then(|customer_id| parties.get(customer_id))
        .cloned();

    let totals = TaxTotals::from_lines(lines.iter().copied());
    let total = round_money(&totals.total());

    Some(DocumentSummaryEntry {
        number: first.invoice_number.clone(),
        date,
        document_type: first.document_type,
        party,
        place_of_supply: first.place_of_supply.clone(),
        totals,
        total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tax::gst::SupplyType;
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn line(number: &str, day: u32, customer: Option<&str>) -> InvoiceLine {
        InvoiceLine {
            invoice_number: number.to_string(),
            invoice_date: NaiveDate::from_ymd_opt(2024, 4, day).unwrap(),
            document_type: DocumentType::Invoice,
            customer_id: customer.map(str::to_string),
            recipient_gstin: None,
            place_of_supply: "27-Maharashtra".to_string(),
            hsn_code: "9983".to_string(),
            description: "Consulting".to_string(),
            unit_of_measure: "OTH".to_string(),
            quantity: dec("1"),
            taxable_value: dec("1000"),
            tax_rate: dec("18"),
            igst: dec("0"),
            cgst: dec("90"),
            sgst: dec("90"),
            cess: dec("5"),
            invoice_value: dec("1185"),
            supply_type: SupplyType::Intra,
        }
    }

    #[test]
    fn test_one_entry_per_document_newest_first() {
        let lines = vec![
            line("INV-1", 1, None),
            line("INV-2", 9, None),
            line("INV-1", 1, None),
            line("INV-3", 9, None),
        ];
        let summary = build_document_summary(&lines, &HashMap::new());

        assert_eq!(summary.total_count, 3);
        let numbers: Vec<&str> = summary
            .documents
            .iter()
            .map(|d| d.number.as_str())
            .collect();
        assert_eq!(numbers, vec!["INV-3", "INV-2", "INV-1"]);

        let inv1 = &summary.documents[2];
        assert_eq!(inv1.totals.taxable_value, dec("2000"));
        assert_eq!(inv1.totals.cess, dec("10"));
        assert_eq!(inv1.total, dec("2370"));
    }

    #[test]
    fn test_party_lookup() {
        let mut parties = HashMap::new();
        parties.insert(
            "cust-1".to_string(),
            Party::new("Acme Traders".to_string(), Some("27AAAAA0000A1Z5".to_string())),
        );

        let lines = vec![line("INV-1", 1, Some("cust-1")), line("INV-2", 2, Some("cust-9"))];
        let summary = build_document_summary(&lines, &parties);

        assert!(summary.documents[0].party.is_none());
        assert_eq!(
            summary.documents[1].party.as_ref().map(|p| p.name.as_str()),
            Some("Acme Traders")
        );
    }

    #[test]
    fn test_total_reconciles_with_components() {
        let summary = build_document_summary(&[line("INV-1", 1, None)], &HashMap::new());
        let entry = &summary.documents[0];
        assert_eq!(entry.total, entry.totals.total());
    }

    #[test]
    fn test_wire_shape() {
        let summary = build_document_summary(&[line("INV-1", 1, None)], &HashMap::new());
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["totalCount"], 1);
        assert_eq!(json["documents"][0]["type"], "invoice");
        assert!(json["documents"][0]["party"].is_null());
        assert_eq!(json["documents"][0]["date"], "2024-04-01");
    }
}
