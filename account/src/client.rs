//! HTTP gateway to the customer service.

use corebank_commons::dto::{GetCustomerDetail, SaveCustomer};
use corebank_commons::remote::{
    MissingConfig, RemoteResponse, TransportError, failure_response, success_response,
};
use std::future::Future;
use std::time::Duration;

/// Environment variable holding the customer service base URL.
const CUSTOMER_URL_VAR: &str = "CUSTOMER_SERVICE_URL";

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Remote customer operations the provisioning workflow needs.
///
/// One invocation per call, no retries; see `corebank_commons::remote` for
/// the outcome contract.
pub trait CustomerGateway: Send + Sync {
    /// Asks the customer service to create a customer.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the service cannot be reached, the
    /// request times out, or a success body does not parse. A non-2xx
    /// answer is an `Ok` response, not an error.
    fn create_customer(
        &self,
        request: &SaveCustomer,
    ) -> impl Future<Output = Result<RemoteResponse<GetCustomerDetail>, TransportError>> + Send;
}

/// Reqwest-based [`CustomerGateway`].
///
/// The inner client is cheap to clone and shared read-only across requests;
/// build one at startup.
#[derive(Clone)]
pub struct HttpCustomerClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpCustomerClient {
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

    /// Creates a client from the `CUSTOMER_SERVICE_URL` environment
    /// variable.
    ///
    /// # Errors
    ///
    /// Returns [`MissingConfig`] when the variable is not set.
    pub fn from_env() -> Result<Self, MissingConfig> {
        let base_url =
            std::env::var(CUSTOMER_URL_VAR).map_err(|_| MissingConfig(CUSTOMER_URL_VAR))?;
        Self::new(base_url).map_err(|_| MissingConfig(CUSTOMER_URL_VAR))
    }
}

impl CustomerGateway for HttpCustomerClient {
    async fn create_customer(
        &self,
        request: &SaveCustomer,
    ) -> Result<RemoteResponse<GetCustomerDetail>, TransportError> {
        let response = self
            .client
            .post(format!("{}/customers", self.base_url))
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

        tracing::debug!(status, email = %request.email, "customer creation answered");

        if (200..300).contains(&status) {
            success_response(status, &text)
        } else {
            Ok(failure_response(status, &text))
        }
    }
}
