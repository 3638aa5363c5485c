//! GST rate structure and expected tax computation for Indian supplies

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::utils::money::round_money;

/// Whether a supply stays inside the supplier's state or crosses a state border
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SupplyType {
    /// Intra-state supply - CGST + SGST
    Intra,
    /// Inter-state supply - IGST only
    Inter,
}

impl SupplyType {
    /// Derive the supply type by comparing the place of supply with the home state.
    ///
    /// Both sides are reduced to their state code first, so "27-Maharashtra"
    /// and "27" are the same state.
    pub fn from_states(place_of_supply: &str, home_state: &str) -> Self {
        if state_code(place_of_supply) == state_code(home_state) {
            SupplyType::Intra
        } else {
            SupplyType::Inter
        }
    }
}

/// Extract the state code from a place-of-supply string such as "27-Maharashtra"
pub fn state_code(place_of_supply: &str) -> &str {
    let trimmed = place_of_supply.trim();
    match trimmed.split_once('-') {
        Some((code, _)) => code.trim(),
        None => trimmed,
    }
}

/// A total GST rate split into its central, state and integrated parts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GstRate {
    /// Combined rate in percent, e.g. 18 for 18%
    pub total_rate: BigDecimal,
    pub cgst_rate: BigDecimal,
    pub sgst_rate: BigDecimal,
    pub igst_rate: BigDecimal,
}

impl GstRate {
    /// Half CGST, half SGST
    pub fn intra_state(total_rate: BigDecimal) -> Self {
        let half = &total_rate / BigDecimal::from(2);
        Self {
            cgst_rate: half.clone(),
            sgst_rate: half,
            igst_rate: BigDecimal::from(0),
            total_rate,
        }
    }

    /// IGST only
    pub fn inter_state(total_rate: BigDecimal) -> Self {
        Self {
            cgst_rate: BigDecimal::from(0),
            sgst_rate: BigDecimal::from(0),
            igst_rate: total_rate.clone(),
            total_rate,
        }
    }

    /// Split a total rate according to the supply type
    pub fn for_supply(total_rate: BigDecimal, supply_type: SupplyType) -> Self {
        match supply_type {
            SupplyType::Intra => Self::intra_state(total_rate),
            SupplyType::Inter => Self::inter_state(total_rate),
        }
    }

    /// Check that the parts are non-negative, sum to the total and never mix
    /// IGST with CGST/SGST
    pub fn validate(&self) -> Result<(), GstError> {
        let zero = BigDecimal::from(0);

        if self.total_rate < zero {
            return Err(GstError::InvalidRate(format!(
                "rate {} is negative",
                self.total_rate
            )));
        }

        let parts = &self.cgst_rate + &self.sgst_rate + &self.igst_rate;
        if parts != self.total_rate {
            return Err(GstError::InvalidRate(format!(
                "CGST {} + SGST {} + IGST {} does not equal {}",
                self.cgst_rate, self.sgst_rate, self.igst_rate, self.total_rate
            )));
        }

        let has_igst = self.igst_rate > zero;
        if !has_igst && self.cgst_rate != self.sgst_rate {
            return Err(GstError::InvalidRate(format!(
                "intra-state split is uneven: CGST {} vs SGST {}",
                self.cgst_rate, self.sgst_rate
            )));
        }
        if has_igst && (self.cgst_rate > zero || self.sgst_rate > zero) {
            return Err(GstError::InvalidRate(
                "IGST cannot be combined with CGST or SGST".to_string(),
            ));
        }

        Ok(())
    }
}

/// Tax components a line should carry for its taxable value and rate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GstCalculation {
    pub taxable_value: BigDecimal,
    pub gst_rate: GstRate,
    pub cgst_amount: BigDecimal,
    pub sgst_amount: BigDecimal,
    pub igst_amount: BigDecimal,
    /// Sum of the three rounded components
    pub total_gst_amount: BigDecimal,
}

impl GstCalculation {
    /// Calculate GST components, each rounded to two decimals
    pub fn calculate(taxable_value: BigDecimal, gst_rate: GstRate) -> Result<Self, GstError> {
        gst_rate.validate()?;

        if taxable_value < BigDecimal::from(0) {
            return Err(GstError::Calculation(format!(
                "taxable value {} is negative",
                taxable_value
            )));
        }

        let cgst_amount = component(&taxable_value, &gst_rate.cgst_rate);
        let sgst_amount = component(&taxable_value, &gst_rate.sgst_rate);
        let igst_amount = component(&taxable_value, &gst_rate.igst_rate);
        let total_gst_amount = &igst_amount + &cgst_amount + &sgst_amount;

        Ok(Self {
            taxable_value,
            gst_rate,
            cgst_amount,
            sgst_amount,
            igst_amount,
            total_gst_amount,
        })
    }
}

fn component(taxable_value: &BigDecimal, rate: &BigDecimal) -> BigDecimal {
    round_money(&((taxable_value * rate) / BigDecimal::from(100)))
}

/// Errors from rate validation and tax computation
#[derive(Debug, thiserror::Error)]
pub enum GstError {
    #[error("Invalid GST rate: {0}")]
    InvalidRate(String),
    #[error("GST calculation failed: {0}")]
    Calculation(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_rate_split_by_supply() {
        let intra = GstRate::for_supply(BigDecimal::from(5), SupplyType::Intra);
        assert_eq!(intra.cgst_rate, BigDecimal::from_str("2.5").unwrap());
        assert_eq!(intra.sgst_rate, BigDecimal::from_str("2.5").unwrap());
        assert!(intra.validate().is_ok());

        let inter = GstRate::for_supply(BigDecimal::from(28), SupplyType::Inter);
        assert_eq!(inter.igst_rate, BigDecimal::from(28));
        assert_eq!(inter.cgst_rate, BigDecimal::from(0));
        assert!(inter.validate().is_ok());
    }

    #[test]
    fn test_rejects_uneven_or_mixed_split() {
        let uneven = GstRate {
            total_rate: BigDecimal::from(12),
            cgst_rate: BigDecimal::from(7),
            sgst_rate: BigDecimal::from(5),
            igst_rate: BigDecimal::from(0),
        };
        assert!(matches!(uneven.validate(), Err(GstError::InvalidRate(_))));

        let mixed = GstRate {
            total_rate: BigDecimal::from(18),
            cgst_rate: BigDecimal::from(9),
            sgst_rate: BigDecimal::from(0),
            igst_rate: BigDecimal::from(9),
        };
        assert!(mixed.validate().is_err());

        let negative = GstRate::intra_state(BigDecimal::from(-5));
        assert!(negative.validate().is_err());
    }

    #[test]
    fn test_rejects_negative_taxable_value() {
        let result = GstCalculation::calculate(
            BigDecimal::from(-1),
            GstRate::inter_state(BigDecimal::from(18)),
        );
        assert!(matches!(result, Err(GstError::Calculation(_))));
    }

    #[test]
    fn test_intra_state_calculation() {
        let calculation = GstCalculation::calculate(
            BigDecimal::from(5000),
            GstRate::for_supply(BigDecimal::from(18), SupplyType::Intra),
        )
        .unwrap();

        assert_eq!(calculation.cgst_amount, BigDecimal::from(450));
        assert_eq!(calculation.sgst_amount, BigDecimal::from(450));
        assert_eq!(calculation.igst_amount, BigDecimal::from(0));
        assert_eq!(calculation.total_gst_amount, BigDecimal::from(900));
    }

    #[test]
    fn test_calculation_rounds_each_component() {
        // 5% of 333.33 = 16.6665, split 8.33325 each
        let calculation = GstCalculation::calculate(
            BigDecimal::from_str("333.33").unwrap(),
            GstRate::intra_state(BigDecimal::from(5)),
        )
        .unwrap();

        assert_eq!(calculation.cgst_amount, BigDecimal::from_str("8.33").unwrap());
        assert_eq!(calculation.sgst_amount, BigDecimal::from_str("8.33").unwrap());
    }

    #[test]
    fn test_supply_type_from_states() {
        assert_eq!(
            SupplyType::from_states("27-Maharashtra", "27"),
            SupplyType::Intra
        );
        assert_eq!(
            SupplyType::from_states("29-Karnataka", "27-Maharashtra"),
            SupplyType::Inter
        );
        assert_eq!(state_code(" 07 - Delhi "), "07");
    }
}
