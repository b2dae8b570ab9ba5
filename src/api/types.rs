use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Transient login/registration input. Never persisted, never logged.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

// ── Auth wire types ──

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: Option<String>,
    #[allow(dead_code)]
    pub token_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: i64,
    pub username: String,
}

/// The identity endpoint wraps the user in a capitalized envelope.
#[derive(Debug, Deserialize)]
pub struct UserEnvelope {
    #[serde(rename = "User")]
    pub user: Identity,
}

#[derive(Debug, Serialize)]
pub struct RegisterRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct RegisterAck {
    #[allow(dead_code)]
    pub id: Option<i64>,
    pub username: Option<String>,
}

// ── Pricing wire types ──

/// Validated, unit-converted form input. Rates and volatility are
/// fractions here (already divided by 100), never raw percentages.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalculationRequest {
    pub stock_price: f64,
    pub strike_price: f64,
    pub time_to_maturity: f64,
    pub risk_free_rate: f64,
    pub dividend_yield: f64,
    pub volatility: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CalculationResult {
    #[allow(dead_code)]
    pub id: Option<i64>,
    pub call_option_price: f64,
    pub put_option_price: f64,
    // Service emits naive ISO datetimes, no timezone
    #[allow(dead_code)]
    pub timestamp: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CalculationRecord {
    pub id: i64,
    pub stock_price: f64,
    pub strike_price: f64,
    pub time_to_maturity: f64,
    pub risk_free_rate: f64,
    pub dividend_yield: f64,
    pub volatility: f64,
    pub call_option_price: f64,
    pub put_option_price: f64,
    pub timestamp: Option<NaiveDateTime>,
}

/// FastAPI-style error envelope.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub detail: Option<String>,
}
