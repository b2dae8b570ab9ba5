use crate::api::types::CalculationRequest;
use crate::errors::{ClientError, ClientResult};

const INVALID_NUMBERS: &str = "Please enter valid numbers for all fields.";
const NOT_POSITIVE: &str = "All values must be positive numbers.";

/// Raw form input: six numeric fields exactly as typed. Rate, yield and
/// volatility are entered as percentages.
#[derive(Debug, Clone, Default)]
pub struct CalculationInput {
    pub stock_price: String,
    pub strike_price: String,
    pub time_to_maturity: String,
    pub risk_free_rate: String,
    pub dividend_yield: String,
    pub volatility: String,
}

impl CalculationInput {
    /// Parse, convert percentages to fractions, then require strict
    /// positivity. Both checks fail with a single aggregate message, not
    /// per-field errors. An input that fails here never reaches the
    /// network layer.
    ///
    /// The positivity check is strict for every field, so a dividend
    /// yield of exactly zero is rejected.
    pub fn validate(&self) -> ClientResult<CalculationRequest> {
        let raw = [
            &self.stock_price,
            &self.strike_price,
            &self.time_to_maturity,
            &self.risk_free_rate,
            &self.dividend_yield,
            &self.volatility,
        ];

        let mut parsed = [0.0_f64; 6];
        for (slot, field) in parsed.iter_mut().zip(raw) {
            *slot = match field.trim().parse::<f64>() {
                Ok(v) if !v.is_nan() => v,
                _ => return Err(ClientError::Validation(INVALID_NUMBERS.into())),
            };
        }

        // Percentage fields become fractions before the positivity check
        let request = CalculationRequest {
            stock_price: parsed[0],
            strike_price: parsed[1],
            time_to_maturity: parsed[2],
            risk_free_rate: parsed[3] / 100.0,
            dividend_yield: parsed[4] / 100.0,
            volatility: parsed[5] / 100.0,
        };

        let converted = [
            request.stock_price,
            request.strike_price,
            request.time_to_maturity,
            request.risk_free_rate,
            request.dividend_yield,
            request.volatility,
        ];
        if converted.iter().any(|v| *v <= 0.0 || !v.is_finite()) {
            return Err(ClientError::Validation(NOT_POSITIVE.into()));
        }

        Ok(request)
    }
}
