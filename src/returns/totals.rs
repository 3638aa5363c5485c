//! Rounded tax totals shared by every return section

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::types::InvoiceLine;
use crate::utils::money::sum_money;

/// Taxable value and tax components, each rounded to two decimals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxTotals {
    pub taxable_value: BigDecimal,
    pub igst: BigDecimal,
    pub cgst: BigDecimal,
    pub sgst: BigDecimal,
    pub cess: BigDecimal,
}

impl Default for TaxTotals {
    fn default() -> Self {
        Self {
            taxable_value: BigDecimal::from(0),
            igst: BigDecimal::from(0),
            cgst: BigDecimal::from(0),
            sgst: BigDecimal::from(0),
            cess: BigDecimal::from(0),
        }
    }
}

impl TaxTotals {
    /// Aggregate a set of lines
    pub fn from_lines<'a, I>(lines: I) -> Self
    where
        I: IntoIterator<Item = &'a InvoiceLine>,
        I::IntoIter: Clone,
    {
        let lines = lines.into_iter();
        Self {
            taxable_value: sum_money(lines.clone().map(|l| &l.taxable_value)),
            igst: sum_money(lines.clone().map(|l| &l.igst)),
            cgst: sum_money(lines.clone().map(|l| &l.cgst)),
            sgst: sum_money(lines.clone().map(|l| &l.sgst)),
            cess: sum_money(lines.map(|l| &l.cess)),
        }
    }

    /// Combine already aggregated totals
    pub fn combine<'a, I>(totals: I) -> Self
    where
        I: IntoIterator<Item = &'a TaxTotals>,
        I::IntoIter: Clone,
    {
        let totals = totals.into_iter();
        Self {
            taxable_value: sum_money(totals.clone().map(|t| &t.taxable_value)),
            igst: sum_money(totals.clone().map(|t| &t.igst)),
            cgst: sum_money(totals.clone().map(|t| &t.cgst)),
            sgst: sum_money(totals.clone().map(|t| &t.sgst)),
            cess: sum_money(totals.map(|t| &t.cess)),
        }
    }

    /// IGST + CGST + SGST + cess
    pub fn tax_amount(&self) -> BigDecimal {
        &self.igst + &self.cgst + &self.sgst + &self.cess
    }

    /// Taxable value plus all tax
    pub fn total(&self) -> BigDecimal {
        &self.taxable_value + self.tax_amount()
    }
}
