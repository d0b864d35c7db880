//! Quote provider for the lock screen.
//!
//! Fetches a short quote from the hitokoto service. Failures never reach the
//! lock screen: `fetch_or_fallback` substitutes a fixed quote instead.

use serde::{Deserialize, Serialize};

/// Default quote service endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://v1.hitokoto.cn/";

/// Quote shown when the provider cannot be reached.
pub const FALLBACK_TEXT: &str = "The journey of a thousand miles begins with a single step";
pub const FALLBACK_SOURCE: &str = "Lao Tzu";

/// A quote ready for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub text: String,
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

impl Quote {
    pub fn fallback() -> Self {
        Self {
            text: FALLBACK_TEXT.to_string(),
            source: FALLBACK_SOURCE.to_string(),
            author: None,
        }
    }
}

impl std::fmt::Display for Quote {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "「{}」 — {}", self.text, self.source)?;
        if let Some(author) = &self.author {
            write!(f, " ({author})")?;
        }
        Ok(())
    }
}

/// Wire format of the quote service.
#[derive(Debug, Clone, Deserialize)]
struct HitokotoResponse {
    hitokoto: String,
    from: String,
    #[serde(default)]
    from_who: Option<String>,
}

impl From<HitokotoResponse> for Quote {
    fn from(r: HitokotoResponse) -> Self {
        Self {
            text: r.hitokoto,
            source: r.from,
            author: r.from_who.filter(|who| !who.trim().is_empty()),
        }
    }
}

/// Quote client error types.
#[derive(Debug)]
pub enum QuoteError {
    Config(String),
    Network(String),
    Server { status: u16, message: String },
    Serialization(String),
}

impl std::fmt::Display for QuoteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QuoteError::Config(msg) => write!(f, "Quote config error: {msg}"),
            QuoteError::Network(msg) => write!(f, "Quote network error: {msg}"),
            QuoteError::Server { status, message } => {
                write!(f, "Quote server error ({status}): {message}")
            }
            QuoteError::Serialization(msg) => write!(f, "Quote serialization error: {msg}"),
        }
    }
}

impl std::error::Error for QuoteError {}

/// Async client for the quote service.
pub struct HitokotoClient {
    endpoint: String,
    client: reqwest::Client,
}

impl HitokotoClient {
    pub fn new() -> Result<Self, QuoteError> {
        Self::with_endpoint(DEFAULT_ENDPOINT)
    }

    pub fn with_endpoint(endpoint: impl Into<String>) -> Result<Self, QuoteError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .map_err(|e| QuoteError::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            endpoint: endpoint.into(),
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Fetch one quote.
    pub async fn fetch(&self) -> Result<Quote, QuoteError> {
        let response = self
            .client
            .get(&self.endpoint)
            .send()
            .await
            .map_err(|e| QuoteError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(QuoteError::Server {
                status: status.as_u16(),
                message,
            });
        }

        let body: HitokotoResponse = response
            .json()
            .await
            .map_err(|e| QuoteError::Serialization(e.to_string()))?;

        Ok(body.into())
    }

    /// Fetch one quote, substituting the fallback on any failure.
    pub async fn fetch_or_fallback(&self) -> Quote {
        match self.fetch().await {
            Ok(quote) => quote,
            Err(e) => {
                tracing::warn!("Failed to fetch quote: {e}");
                Quote::fallback()
            }
        }
    }
}

/// Blocking quote client for use in synchronous contexts.
pub struct BlockingHitokotoClient {
    inner: HitokotoClient,
    runtime: tokio::runtime::Runtime,
}

impl BlockingHitokotoClient {
    pub fn new() -> Result<Self, QuoteError> {
        Self::with_endpoint(DEFAULT_ENDPOINT)
    }

    pub fn with_endpoint(endpoint: impl Into<String>) -> Result<Self, QuoteError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| QuoteError::Config(format!("Failed to create runtime: {e}")))?;

        Ok(Self {
            inner: HitokotoClient::with_endpoint(endpoint)?,
            runtime,
        })
    }

    pub fn fetch(&self) -> Result<Quote, QuoteError> {
        self.runtime.block_on(self.inner.fetch())
    }

    pub fn fetch_or_fallback(&self) -> Quote {
        self.runtime.block_on(self.inner.fetch_or_fallback())
    }
}
