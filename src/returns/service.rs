//! Return service that fetches a period's lines and builds each return

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::config::GstReturnConfig;
use crate::reconciliation::{ReconciliationEngine, ReconciliationReport};
use crate::returns::{
    build_document_summary, build_gstr1, build_hsn_summary, normalize_lines, DocumentSummary,
    Gstr1Report, HsnSummaryRow,
};
use crate::traits::*;
use crate::types::*;
use crate::utils::validation::validate_threshold;

/// Request for any of the returns of a period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnRequest {
    /// First day of the period, `YYYY-MM-DD`
    pub from: String,
    /// Last day of the period, `YYYY-MM-DD`
    pub to: String,
    /// Overrides the configured B2C large threshold
    #[serde(default)]
    pub threshold: Option<BigDecimal>,
}

impl ReturnRequest {
    /// Create a request using the configured threshold
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            threshold: None,
        }
    }

    /// Override the B2C large threshold for this request
    pub fn with_threshold(mut self, threshold: BigDecimal) -> Self {
        self.threshold = Some(threshold);
        self
    }
}

/// GSTR-1 response
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Gstr1Response {
    #[serde(flatten)]
    pub report: Gstr1Report,
    pub period: ReturnPeriod,
}

/// HSN summary response
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HsnSummaryResponse {
    pub rows: Vec<HsnSummaryRow>,
}

/// Prepares returns from an [`InvoiceSource`]
pub struct GstReturnService<S: InvoiceSource> {
    source: S,
    config: GstReturnConfig,
    reconciliation: ReconciliationEngine,
}

impl<S: InvoiceSource> GstReturnService<S> {
    /// Create a service with the default configuration
    pub fn new(source: S) -> Self {
        let config = GstReturnConfig::default();
        let reconciliation = ReconciliationEngine::new(config.rounding_tolerance.clone());
        Self {
            source,
            config,
            reconciliation,
        }
    }

    /// Create a service with a custom configuration
    pub fn with_config(source: S, config: GstReturnConfig) -> GstReturnResult<Self> {
        config.validate()?;
        let reconciliation = ReconciliationEngine::new(config.rounding_tolerance.clone());
        Ok(Self {
            source,
            config,
            reconciliation,
        })
    }

    /// Active configuration
    pub fn config(&self) -> &GstReturnConfig {
        &self.config
    }

    /// Build the GSTR-1 buckets for the requested period
    #[instrument(skip(self, request), fields(from = %request.from, to = %request.to))]
    pub async fn gstr1(&self, request: &ReturnRequest) -> GstReturnResult<Gstr1Response> {
        let period = ReturnPeriod::parse(&request.from, &request.to)?;
        let threshold = self.resolve_threshold(request)?;
        let lines = self.load(&period).await?;
        let report = build_gstr1(&lines, &threshold)?;

        info!(
            total_invoices = report.summary.total_invoices,
            b2b = report.summary.counts.b2b,
            b2cl = report.summary.counts.b2cl,
            b2cs = report.summary.counts.b2cs,
            "GSTR-1 prepared"
        );

        Ok(Gstr1Response { report, period })
    }

    /// Build the HSN summary for the requested period
    #[instrument(skip(self, request), fields(from = %request.from, to = %request.to))]
    pub async fn hsn_summary(&self, request: &ReturnRequest) -> GstReturnResult<HsnSummaryResponse> {
        let period = ReturnPeriod::parse(&request.from, &request.to)?;
        let lines = self.load(&period).await?;
        let rows = build_hsn_summary(&lines);

        info!(rows = rows.len(), "HSN summary prepared");
        Ok(HsnSummaryResponse { rows })
    }

    /// Build the document summary for the requested period
    #[instrument(skip(self, request), fields(from = %request.from, to = %request.to))]
    pub async fn document_summary(
        &self,
        request: &ReturnRequest,
    ) -> GstReturnResult<DocumentSummary> {
        let period = ReturnPeriod::parse(&request.from, &request.to)?;
        let lines = self.load(&period).await?;

        let mut customer_ids: Vec<String> = lines
            .iter()
            .filter_map(|line| line.customer_id.clone())
            .collect();
        customer_ids.sort();
        customer_ids.dedup();

        let parties = self
            .source
            .fetch_parties(&customer_ids)
            .await
            .inspect_err(|e| warn!(error = %e, "Failed to fetch parties"))?;

        let summary = build_document_summary(&lines, &parties);
        info!(documents = summary.total_count, "Document summary prepared");
        Ok(summary)
    }

    /// Reconcile the period's GSTR-1 and HSN summary against its lines
    #[instrument(skip(self, request), fields(from = %request.from, to = %request.to))]
    pub async fn reconciliation(
        &self,
        request: &ReturnRequest,
    ) -> GstReturnResult<ReconciliationReport> {
        let period = ReturnPeriod::parse(&request.from, &request.to)?;
        let threshold = self.resolve_threshold(request)?;
        let lines = self.load(&period).await?;
        let report = build_gstr1(&lines, &threshold)?;
        let hsn_rows = build_hsn_summary(&lines);

        let result = self.reconciliation.reconcile(&lines, &report, &hsn_rows)?;
        info!(
            is_consistent = result.is_consistent,
            line_mismatches = result.line_mismatches.len(),
            "Reconciliation finished"
        );
        Ok(result)
    }

    fn resolve_threshold(&self, request: &ReturnRequest) -> GstReturnResult<BigDecimal> {
        let threshold = request
            .threshold
            .clone()
            .unwrap_or_else(|| self.config.b2c_large_threshold.clone());
        validate_threshold(&threshold)?;
        Ok(threshold)
    }

    async fn load(&self, period: &ReturnPeriod) -> GstReturnResult<Vec<InvoiceLine>> {
        let raw_lines = self
            .source
            .fetch_lines(period)
            .await
            .inspect_err(|e| warn!(error = %e, "Failed to fetch invoice lines"))?;

        let lines = normalize_lines(&raw_lines, self.config.home_state.as_deref())
            .inspect_err(|e| warn!(error = %e, "Rejected invoice lines"))?;

        Ok(lines)
    }
}
