use thiserror::Error;

/// A provider could not deliver a series.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RetrievalFailure {
    /// Transport, HTTP status or client initialisation error
    #[error("{provider} request for '{symbol}' failed: {message}")]
    Provider {
        provider: String,
        symbol: String,
        message: String,
    },

    /// Response arrived but did not have the expected shape
    #[error("{provider} returned malformed data for '{symbol}': {message}")]
    Malformed {
        provider: String,
        symbol: String,
        message: String,
    },

    /// Provider answered with no observations in the requested window
    #[error("{provider} returned no data for '{symbol}'")]
    Empty { provider: String, symbol: String },

    /// One leg of a two-series metric failed
    #[error("input '{input}' unavailable: {source}")]
    Input {
        input: String,
        #[source]
        source: Box<RetrievalFailure>,
    },

    #[error(transparent)]
    Computation(#[from] ComputationFailure),
}

impl RetrievalFailure {
    pub fn provider(provider: &str, symbol: &str, message: impl ToString) -> Self {
        Self::Provider {
            provider: provider.to_string(),
            symbol: symbol.to_string(),
            message: message.to_string(),
        }
    }

    pub fn malformed(provider: &str, symbol: &str, message: impl ToString) -> Self {
        Self::Malformed {
            provider: provider.to_string(),
            symbol: symbol.to_string(),
            message: message.to_string(),
        }
    }

    pub fn empty(provider: &str, symbol: &str) -> Self {
        Self::Empty {
            provider: provider.to_string(),
            symbol: symbol.to_string(),
        }
    }
}

/// Derivation of a series from its inputs failed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ComputationFailure {
    #[error("{operation} requires a non-empty series")]
    EmptyInput { operation: &'static str },

    #[error("{operation} requires {expected} inputs, got {actual}")]
    InputCount {
        operation: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("{operation} produced no defined values")]
    NoDefinedValues { operation: &'static str },

    #[error("timestamps out of order at index {index}")]
    Unordered { index: usize },
}

/// Startup configuration problem. The only failure that aborts the process.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} not found. Set it in the environment or a .env file.")]
    MissingCredential(&'static str),

    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: &'static str, message: String },
}
