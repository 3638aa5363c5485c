//! Core types and data structures for GST return preparation

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::tax::gst::{GstError, SupplyType};

/// Kind of outward supply document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentType {
    /// Tax invoice
    #[default]
    Invoice,
    /// Credit note issued against an earlier invoice
    CreditNote,
    /// Debit note issued against an earlier invoice
    DebitNote,
}

impl DocumentType {
    /// Label used in exports
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Invoice => "invoice",
            DocumentType::CreditNote => "credit-note",
            DocumentType::DebitNote => "debit-note",
        }
    }
}

/// Counterparty shown against a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Party {
    /// Customer or supplier name
    pub name: String,
    /// GSTIN of the party, if registered
    pub gstin: Option<String>,
}

impl Party {
    /// Create a new party
    pub fn new(name: String, gstin: Option<String>) -> Self {
        Self { name, gstin }
    }
}

/// One taxable line item of an outward supply document, normalized.
///
/// All amounts are trusted as stored; see [`crate::reconciliation`] for the
/// cross-check against `taxable_value × tax_rate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceLine {
    pub invoice_number: String,
    pub invoice_date: NaiveDate,
    pub document_type: DocumentType,
    /// Reference used to look up the party for document summaries
    pub customer_id: Option<String>,
    /// Present for B2B supplies, absent for B2C
    pub recipient_gstin: Option<String>,
    /// State code of the place of supply, e.g. "27-Maharashtra"
    pub place_of_supply: String,
    pub hsn_code: String,
    pub description: String,
    pub unit_of_measure: String,
    pub quantity: BigDecimal,
    pub taxable_value: BigDecimal,
    /// Percentage, never rounded
    pub tax_rate: BigDecimal,
    pub igst: BigDecimal,
    pub cgst: BigDecimal,
    pub sgst: BigDecimal,
    pub cess: BigDecimal,
    /// Total value of the whole invoice this line belongs to
    pub invoice_value: BigDecimal,
    pub supply_type: SupplyType,
}

impl InvoiceLine {
    /// Sum of all tax components on this line
    pub fn tax_amount(&self) -> BigDecimal {
        &self.igst + &self.cgst + &self.sgst + &self.cess
    }

    /// Whether the recipient is a registered business
    pub fn is_b2b(&self) -> bool {
        self.recipient_gstin.is_some()
    }
}

/// Invoice line as delivered by the data source, before normalization.
///
/// Only the identifiers are mandatory at the type level; the rest is checked
/// when the line is normalized so a missing field surfaces as
/// [`GstReturnError::MalformedLine`] instead of a deserialization failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawInvoiceLine {
    pub invoice_number: Option<String>,
    pub invoice_date: Option<NaiveDate>,
    pub document_type: Option<DocumentType>,
    pub customer_id: Option<String>,
    pub recipient_gstin: Option<String>,
    pub place_of_supply: Option<String>,
    pub hsn_code: Option<String>,
    pub description: Option<String>,
    pub unit_of_measure: Option<String>,
    pub quantity: Option<BigDecimal>,
    pub unit_price: Option<BigDecimal>,
    pub discount: Option<BigDecimal>,
    pub taxable_value: Option<BigDecimal>,
    pub tax_rate: Option<BigDecimal>,
    pub igst: Option<BigDecimal>,
    pub cgst: Option<BigDecimal>,
    pub sgst: Option<BigDecimal>,
    pub cess: Option<BigDecimal>,
    pub invoice_value: Option<BigDecimal>,
    pub supply_type: Option<SupplyType>,
}

/// Closed filing interval `[from, to]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnPeriod {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl ReturnPeriod {
    /// Date format accepted on the wire
    pub const DATE_FORMAT: &'static str = "%Y-%m-%d";

    /// Create a period, rejecting `from > to`
    pub fn new(from: NaiveDate, to: NaiveDate) -> GstReturnResult<Self> {
        if from > to {
            return Err(GstReturnError::InvalidPeriod(format!(
                "Period start {} is after period end {}",
                from, to
            )));
        }
        Ok(Self { from, to })
    }

    /// Parse a period from two `YYYY-MM-DD` strings
    pub fn parse(from: &str, to: &str) -> GstReturnResult<Self> {
        let from = parse_date(from)?;
        let to = parse_date(to)?;
        Self::new(from, to)
    }

    /// Whether the date falls inside the period (inclusive on both ends)
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }
}

fn parse_date(value: &str) -> GstReturnResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), ReturnPeriod::DATE_FORMAT).map_err(|e| {
        GstReturnError::InvalidPeriod(format!("Cannot parse date '{}': {}", value, e))
    })
}

/// Errors that can occur while preparing GST returns
#[derive(Debug, thiserror::Error)]
pub enum GstReturnError {
    #[error("Invalid period: {0}")]
    InvalidPeriod(String),
    #[error("Malformed line: {0}")]
    MalformedLine(String),
    #[error("B2C large threshold must be positive, got {0}")]
    ThresholdNotPositive(BigDecimal),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Invoice source error: {0}")]
    Source(String),
    #[error("Export error: {0}")]
    Export(String),
    #[error(transparent)]
    Tax(#[from] GstError),
}

/// Result type for GST return operations
pub type GstReturnResult<T> = Result<T, GstReturnError>;
