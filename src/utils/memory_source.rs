//! In-memory invoice source for testing

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::traits::*;
use crate::types::*;

/// In-memory invoice source for testing and development
#[derive(Debug, Clone, Default)]
pub struct MemoryInvoiceSource {
    lines: Arc<RwLock<Vec<RawInvoiceLine>>>,
    parties: Arc<RwLock<HashMap<String, Party>>>,
}

impl MemoryInvoiceSource {
    /// Create an empty source
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a raw invoice line
    pub fn add_line(&self, line: RawInvoiceLine) -> GstReturnResult<()> {
        self.lines
            .write()
            .map_err(|e| GstReturnError::Source(e.to_string()))?
            .push(line);
        Ok(())
    }

    /// Store several raw invoice lines
    pub fn add_lines(&self, lines: impl IntoIterator<Item = RawInvoiceLine>) -> GstReturnResult<()> {
        self.lines
            .write()
            .map_err(|e| GstReturnError::Source(e.to_string()))?
            .extend(lines);
        Ok(())
    }

    /// Register a party under a customer id
    pub fn add_party(&self, customer_id: impl Into<String>, party: Party) -> GstReturnResult<()> {
        self.parties
            .write()
            .map_err(|e| GstReturnError::Source(e.to_string()))?
            .insert(customer_id.into(), party);
        Ok(())
    }

    /// Clear all data (useful for testing)
    pub fn clear(&self) -> GstReturnResult<()> {
        self.lines
            .write()
            .map_err(|e| GstReturnError::Source(e.to_string()))?
            .clear();
        self.parties
            .write()
            .map_err(|e| GstReturnError::Source(e.to_string()))?
            .clear();
        Ok(())
    }
}

#[async_trait]
impl InvoiceSource for MemoryInvoiceSource {
    async fn fetch_lines(&self, period: &ReturnPeriod) -> GstReturnResult<Vec<RawInvoiceLine>> {
        let lines = self
            .lines
            .read()
            .map_err(|e| GstReturnError::Source(e.to_string()))?;

        // Undated lines are passed through so normalization can reject them
        let filtered: Vec<RawInvoiceLine> = lines
            .iter()
            .filter(|line| line.invoice_date.map_or(true, |date| period.contains(date)))
            .cloned()
            .collect();
        Ok(filtered)
    }

    async fn fetch_parties(
        &self,
        customer_ids: &[String],
    ) -> GstReturnResult<HashMap<String, Party>> {
        let parties = self
            .parties
            .read()
            .map_err(|e| GstReturnError::Source(e.to_string()))?;

        Ok(customer_ids
            .iter()
            .filter_map(|id| parties.get(id).map(|party| (id.clone(), party.clone())))
            .collect())
    }
}
