use serde::{Deserialize, Serialize};
use std::fmt;

/// ISO 4217-style currency code attached to events and expenses.
///
/// The engine balances a single currency per event and never converts
/// between codes; the code is carried so callers can detect mixed input.
///
/// # Examples
///
/// ```
/// use split_engine::core::currency::CurrencyCode;
///
/// let eur = CurrencyCode::new("EUR");
/// assert_eq!(eur.as_str(), "EUR");
/// assert_eq!(CurrencyCode::default().as_str(), "USD");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CurrencyCode(String);

impl CurrencyCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for CurrencyCode {
    fn default() -> Self {
        Self::new("USD")
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CurrencyCode {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
