//! Classification of the error strings Kraken returns in the `error` array
//!
//! Kraken errors are formatted as `"<severity><category>:<message>"`, e.g.
//! `"EOrder:Insufficient funds"` or `"EAPI:Invalid nonce"`. The prefix is
//! enough to tell callers whether they are looking at an order rejection,
//! an authentication problem or server-side throttling.

/// Kraken API error categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// EAPI:* errors - API-level issues (key, signature, nonce, rate limit)
    Api,
    /// EGeneral:* errors - General errors
    General,
    /// EService:* errors - Service availability
    Service,
    /// EOrder:* errors - Trading/order errors
    Order,
    /// EFunding:* errors - Deposit/withdrawal errors
    Funding,
    /// EQuery:* errors - Query/search errors
    Query,
    /// ETrade:* errors - Trade execution errors
    Trade,
    /// ESession:* errors
    Session,
    /// Unknown error category
    Unknown,
}

/// One parsed entry of the `error` array
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeError {
    /// The original error string from Kraken
    pub raw: String,
    /// Error category from the prefix
    pub category: ErrorCategory,
    /// Text after the prefix
    pub message: String,
}

impl ExchangeError {
    /// Parse a Kraken error string
    pub fn parse(error: &str) -> Self {
        let (category, message) = match error.split_once(':') {
            Some((prefix, message)) => (category_of(prefix), message.trim().to_string()),
            None => (ErrorCategory::Unknown, error.to_string()),
        };

        Self {
            raw: error.to_string(),
            category,
            message,
        }
    }

    /// Kraken's own throttling (`EAPI:Rate limit exceeded`, `EOrder:Rate limit exceeded`,
    /// `EGeneral:Too many requests`)
    pub fn is_rate_limit(&self) -> bool {
        let message = self.message.to_ascii_lowercase();
        message.contains("rate limit exceeded") || message.contains("too many requests")
    }

    /// Key, signature, nonce or permission problem
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self.raw.as_str(),
            "EAPI:Invalid key"
                | "EAPI:Invalid signature"
                | "EAPI:Invalid nonce"
                | "EGeneral:Permission denied"
        )
    }
}

impl std::fmt::Display for ExchangeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

fn category_of(prefix: &str) -> ErrorCategory {
    // Severity letter: E (error) or W (warning)
    let name = prefix
        .strip_prefix('E')
        .or_else(|| prefix.strip_prefix('W'))
        .unwrap_or(prefix);

    match name {
        "API" => ErrorCategory::Api,
        "General" => ErrorCategory::General,
        "Service" => ErrorCategory::Service,
        "Order" => ErrorCategory::Order,
        "Funding" => ErrorCategory::Funding,
        "Query" => ErrorCategory::Query,
        "Trade" => ErrorCategory::Trade,
        "Session" => ErrorCategory::Session,
        _ => ErrorCategory::Unknown,
    }
}
