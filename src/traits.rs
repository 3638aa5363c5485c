//! Traits for the data source behind return preparation

use async_trait::async_trait;
use std::collections::HashMap;

use crate::types::*;

/// Source of invoice data for a filing period
///
/// This trait lets the return service work with any backend (a REST API,
/// a database, in-memory fixtures) by implementing these methods. Retries and
/// timeouts belong to the implementation, not to the aggregation.
#[async_trait]
pub trait InvoiceSource: Send + Sync {
    /// Fetch every stored line of documents dated inside the period
    async fn fetch_lines(&self, period: &ReturnPeriod) -> GstReturnResult<Vec<RawInvoiceLine>>;

    /// Resolve parties by customer id; unknown ids are simply absent
    async fn fetch_parties(
        &self,
        customer_ids: &[String],
    ) -> GstReturnResult<HashMap<String, Party>>;
}
