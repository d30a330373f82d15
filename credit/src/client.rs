//! HTTP gateway to the account service.

use corebank_commons::dto::{DepositRequest, GetAccount};
use corebank_commons::remote::{
    MissingConfig, RemoteResponse, TransportError, failure_response, success_response,
};
use std::future::Future;
use std::time::Duration;

/// Environment variable holding the account service base URL.
const ACCOUNT_URL_VAR: &str = "ACCOUNT_SERVICE_URL";

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Remote account operations the origination workflow needs.
///
/// One invocation per call, no retries; see `corebank_commons::remote` for
/// the outcome contract.
pub trait AccountGateway: Send + Sync {
    /// Asks the account service to credit the target account.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the service cannot be reached, the
    /// request times out, or a success body does not parse. A non-2xx
    /// answer is an `Ok` response, not an error.
    fn deposit(
        &self,
        request: &DepositRequest,
    ) -> impl Future<Output = Result<RemoteResponse<GetAccount>, TransportError>> + Send;
}

/// Reqwest-based [`AccountGateway`].
///
/// The inner client is cheap to clone and shared read-only across requests;
/// build one at startup.
#[derive(Clone)]
pub struct HttpAccountClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpAccountClient {
    /// Creates a client for the given base URL with the default timeout.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Request`] when the underlying HTTP client
    /// cannot be constructed.
    pub fn new(base_url: impl Into<String>) -> Result<Self, TransportError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Creates a client with an explicit request timeout. Timeout expiry
    /// surfaces as [`TransportError::Timeout`] on each call.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Request`] when the underlying HTTP client
    /// cannot be constructed.
    pub fn with_timeout(
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Request(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Creates a client from the `ACCOUNT_SERVICE_URL` environment
    /// variable.
    ///
    /// # Errors
    ///
    /// Returns [`MissingConfig`] when the variable is not set.
    pub fn from_env() -> Result<Self, MissingConfig> {
        let base_url =
            std::env::var(ACCOUNT_URL_VAR).map_err(|_| MissingConfig(ACCOUNT_URL_VAR))?;
        Self::new(base_url).map_err(|_| MissingConfig(ACCOUNT_URL_VAR))
    }
}

impl AccountGateway for HttpAccountClient {
    async fn deposit(
        &self,
        request: &DepositRequest,
    ) -> Result<RemoteResponse<GetAccount>, TransportError> {
        let response = self
            .client
            .post(format!("{}/accounts/deposits", self.base_url))
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TransportError::Timeout(e.to_string())
                } else {
                    TransportError::Request(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        let text = response.text().await.unwrap_or_default();

        tracing::debug!(
            status,
            account_number = %request.account_number,
            "deposit answered"
        );

        if (200..300).contains(&status) {
            success_response(status, &text)
        } else {
            Ok(failure_response(status, &text))
        }
    }
}
