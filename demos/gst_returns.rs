//! GST return preparation examples

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use gst_returns_core::{
    export::{b2cs_csv, hsn_summary_csv, to_json},
    utils::MemoryInvoiceSource,
    GstReturnConfig, GstReturnService, Party, RawInvoiceLine, ReturnRequest,
};
use std::str::FromStr;
use tracing_subscriber::EnvFilter;

fn line(number: &str, day: u32, place: &str, hsn: &str, taxable: &str, rate: u32) -> RawInvoiceLine {
    RawInvoiceLine {
        invoice_number: Some(number.to_string()),
        invoice_date: NaiveDate::from_ymd_opt(2024, 4, day),
        place_of_supply: Some(place.to_string()),
        hsn_code: Some(hsn.to_string()),
        description: Some(format!("Goods under HSN {}", hsn)),
        unit_of_measure: Some("NOS".to_string()),
        quantity: Some(BigDecimal::from(1)),
        taxable_value: BigDecimal::from_str(taxable).ok(),
        tax_rate: Some(BigDecimal::from(rate)),
        ..Default::default()
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    println!("🧾 GST Returns Core - April 2024 Filing\n");

    // 1. Load a month of invoice lines
    let source = MemoryInvoiceSource::new();
    source.add_lines(vec![
        RawInvoiceLine {
            recipient_gstin: Some("27AAAAA0000A1Z5".to_string()),
            customer_id: Some("acme".to_string()),
            ..line("INV-001", 2, "27-Maharashtra", "1006", "5000", 18)
        },
        RawInvoiceLine {
            recipient_gstin: Some("27AAAAA0000A1Z5".to_string()),
            customer_id: Some("acme".to_string()),
            ..line("INV-001", 2, "27-Maharashtra", "9983", "1200", 18)
        },
        line("INV-002", 5, "29-Karnataka", "8471", "310000", 18),
        line("INV-003", 9, "27-Maharashtra", "1006", "1000", 5),
        line("INV-004", 12, "27-Maharashtra", "1006", "850.50", 5),
        RawInvoiceLine {
            // Stored tax disagrees with the rate, reconciliation flags it
            cgst: Some(BigDecimal::from(50)),
            sgst: Some(BigDecimal::from(40)),
            ..line("INV-005", 20, "27-Maharashtra", "3004", "1000", 18)
        },
    ])?;
    source.add_party(
        "acme",
        Party::new("Acme Traders".to_string(), Some("27AAAAA0000A1Z5".to_string())),
    )?;

    let config = GstReturnConfig::default().with_home_state("27-Maharashtra");
    let service = GstReturnService::with_config(source, config)?;
    let request = ReturnRequest::new("2024-04-01", "2024-04-30");

    // 2. GSTR-1 buckets
    println!("📊 GSTR-1:");
    let gstr1 = service.gstr1(&request).await?;
    for group in gstr1.report.gstr1.b2b.values() {
        println!("  B2B  {} - {} invoice(s)", group.gstin, group.invoices.len());
    }
    for group in gstr1.report.gstr1.b2cl.values() {
        println!(
            "  B2CL {} - {} invoice(s)",
            group.place_of_supply,
            group.invoices.len()
        );
    }
    for row in gstr1.report.gstr1.b2cs.values() {
        println!(
            "  B2CS {} @ {}% - taxable ₹{}",
            row.place_of_supply, row.tax_rate, row.totals.taxable_value
        );
    }
    println!(
        "  Total invoices: {}, total tax: ₹{}",
        gstr1.report.summary.total_invoices,
        gstr1.report.summary.totals.tax_amount()
    );
    println!();

    // 3. HSN summary
    println!("📦 HSN Summary:");
    let hsn = service.hsn_summary(&request).await?;
    for row in &hsn.rows {
        println!(
            "  {:<6} @ {:>2}%  taxable ₹{:<12} tax ₹{}",
            row.hsn_code, row.tax_rate, row.totals.taxable_value, row.tax_amount
        );
    }
    println!();

    // 4. Document summary
    println!("📄 Documents (newest first):");
    let documents = service.document_summary(&request).await?;
    for document in &documents.documents {
        let party = document
            .party
            .as_ref()
            .map(|p| p.name.as_str())
            .unwrap_or("Walk-in customer");
        println!(
            "  {} {} {:<18} ₹{}",
            document.date, document.number, party, document.total
        );
    }
    println!();

    // 5. Reconciliation
    println!("🔍 Reconciliation:");
    let reconciliation = service.reconciliation(&request).await?;
    println!("  Consistent: {}", reconciliation.is_consistent);
    for mismatch in &reconciliation.line_mismatches {
        println!(
            "  {} (HSN {}): stored CGST ₹{} / SGST ₹{}, expected ₹{} / ₹{}",
            mismatch.invoice_number,
            mismatch.hsn_code,
            mismatch.stored_cgst,
            mismatch.stored_sgst,
            mismatch.expected_cgst,
            mismatch.expected_sgst
        );
    }
    println!();

    // 6. Portal exports
    println!("📤 HSN CSV:\n{}", hsn_summary_csv(&hsn.rows));
    println!("📤 B2CS CSV:\n{}", b2cs_csv(&gstr1.report));
    println!("📤 GSTR-1 JSON:\n{}", to_json(&gstr1)?);

    Ok(())
}
