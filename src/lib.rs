//! # GST Returns Core
//!
//! Prepares Indian GST return data from the invoice lines of a filing period.
//!
//! ## Features
//!
//! - **GSTR-1 buckets**: B2B by recipient GSTIN, B2C large by place of supply,
//!   consolidated B2C small rows by place of supply and rate
//! - **HSN summary**: quantity, taxable value and tax per HSN code and rate
//! - **Document summary**: one entry per issued document, newest first
//! - **Reconciliation**: cross-checks of stored tax against the expected
//!   CGST/SGST/IGST split and of section totals against line totals
//! - **Export**: CSV in the GST portal's column layout, and JSON
//! - **Source abstraction**: invoice data comes through the [`InvoiceSource`] trait
//!
//! ## Quick Start
//!
//! ```rust
//! use gst_returns_core::{build_gstr1, build_hsn_summary, normalize_lines, RawInvoiceLine};
//! use bigdecimal::BigDecimal;
//! use chrono::NaiveDate;
//!
//! let raw = RawInvoiceLine {
//!     invoice_number: Some("INV-001".to_string()),
//!     invoice_date: NaiveDate::from_ymd_opt(2024, 4, 2),
//!     place_of_supply: Some("27-Maharashtra".to_string()),
//!     hsn_code: Some("1006".to_string()),
//!     quantity: Some(BigDecimal::from(10)),
//!     taxable_value: Some(BigDecimal::from(1000)),
//!     tax_rate: Some(BigDecimal::from(18)),
//!     ..Default::default()
//! };
//!
//! let lines = normalize_lines(&[raw], Some("27")).unwrap();
//! let report = build_gstr1(&lines, &BigDecimal::from(250_000)).unwrap();
//! assert_eq!(report.summary.counts.b2cs, 1);
//!
//! let hsn = build_hsn_summary(&lines);
//! assert_eq!(hsn[0].tax_amount, BigDecimal::from(180));
//! ```

pub mod config;
pub mod export;
pub mod reconciliation;
pub mod returns;
pub mod tax;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use config::*;
pub use reconciliation::*;
pub use returns::*;
pub use tax::gst::*;
pub use traits::*;
pub use types::*;
