//! HTTP implementation of [`CartTransport`].

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;
use uuid::Uuid;

use quickbite_core::CartPayload;

use super::types::{
    AddItemRequest, ApplyCouponRequest, CheckoutRequest, ErrorBody, OrderConfirmation,
    OrderPayload, RemoveItemRequest, UpdateItemRequest,
};
use super::ApiError;
use crate::config::ClientConfig;
use crate::transport::CartTransport;

// =============================================================================
// CartApiClient
// =============================================================================

/// Client for the QuickBite cart backend.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Clone)]
pub struct CartApiClient {
    inner: Arc<CartApiClientInner>,
}

struct CartApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    token: Option<SecretString>,
}

impl std::fmt::Debug for CartApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("token", &self.inner.token.as_ref().map(|_| "[REDACTED]"))
            .finish_non_exhaustive()
    }
}

impl CartApiClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built or the base URL
    /// cannot carry path segments.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        if config.api_url.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(config.api_url.to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("quickbite-client/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(CartApiClientInner {
                client,
                base_url: config.api_url.clone(),
                token: config.api_token.clone(),
            }),
        })
    }

    /// The configured backend base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Build an endpoint URL below the base URL.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidUrl(self.inner.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Send a request and decode the JSON answer.
    async fn execute<B, T>(&self, method: Method, url: Url, body: Option<&B>) -> Result<T, ApiError>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let request_id = Uuid::new_v4();
        debug!(%method, %url, %request_id, "Sending cart API request");

        let mut request = self
            .inner
            .client
            .request(method, url.clone())
            .header("X-Request-Id", request_id.to_string())
            .header("Accept", "application/json");

        if let Some(token) = &self.inner.token {
            request = request.bearer_auth(token.expose_secret());
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();

        // Check for rate limiting
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(ApiError::RateLimited(retry_after));
        }

        // Get response body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                %request_id,
                body = %response_text.chars().take(500).collect::<String>(),
                "Cart API returned non-success status"
            );
            return Err(status_error(status, &url, &response_text));
        }

        serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(
                error = %e,
                %request_id,
                body = %response_text.chars().take(500).collect::<String>(),
                "Failed to parse cart API response"
            );
            ApiError::Parse(e)
        })
    }
}

/// Map a non-success status to an error.
fn status_error(status: StatusCode, url: &Url, body: &str) -> ApiError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ApiError::Unauthorized,
        StatusCode::NOT_FOUND => ApiError::NotFound(url.path().to_string()),
        _ => {
            let message = serde_json::from_str::<ErrorBody>(body)
                .ok()
                .and_then(ErrorBody::into_message)
                .unwrap_or_else(|| {
                    let text = body.trim();
                    if text.is_empty() {
                        status
                            .canonical_reason()
                            .unwrap_or("Request failed")
                            .to_string()
                    } else {
                        text.chars().take(200).collect()
                    }
                });
            ApiError::Rejected {
                status: status.as_u16(),
                message,
            }
        }
    }
}

// =============================================================================
// Cart Methods
// =============================================================================

#[async_trait]
impl CartTransport for CartApiClient {
    #[instrument(skip(self))]
    async fn fetch_cart(&self) -> Result<CartPayload, ApiError> {
        let url = self.endpoint(&["cart"])?;
        self.execute::<(), _>(Method::GET, url, None).await
    }

    #[instrument(skip(self, request), fields(menu_item_id = %request.menu_item_id))]
    async fn add_item(&self, request: &AddItemRequest) -> Result<CartPayload, ApiError> {
        let url = self.endpoint(&["cart", "items"])?;
        self.execute(Method::POST, url, Some(request)).await
    }

    #[instrument(skip(self, request), fields(menu_item_id = %request.menu_item_id, quantity = request.quantity))]
    async fn update_item(&self, request: &UpdateItemRequest) -> Result<CartPayload, ApiError> {
        let url = self.endpoint(&["cart", "items", request.menu_item_id.as_str()])?;
        self.execute(Method::PUT, url, Some(request)).await
    }

    #[instrument(skip(self, request), fields(menu_item_id = %request.menu_item_id))]
    async fn remove_item(&self, request: &RemoveItemRequest) -> Result<CartPayload, ApiError> {
        let url = self.endpoint(&["cart", "items", request.menu_item_id.as_str()])?;
        self.execute(Method::DELETE, url, Some(request)).await
    }

    #[instrument(skip(self))]
    async fn clear_cart(&self) -> Result<CartPayload, ApiError> {
        let url = self.endpoint(&["cart"])?;
        self.execute::<(), _>(Method::DELETE, url, None).await
    }

    #[instrument(skip(self))]
    async fn apply_coupon(&self, code: &str) -> Result<CartPayload, ApiError> {
        let url = self.endpoint(&["cart", "coupon"])?;
        let body = ApplyCouponRequest {
            code: code.to_string(),
        };
        self.execute(Method::POST, url, Some(&body)).await
    }

    #[instrument(skip(self))]
    async fn remove_coupon(&self) -> Result<CartPayload, ApiError> {
        let url = self.endpoint(&["cart", "coupon"])?;
        self.execute::<(), _>(Method::DELETE, url, None).await
    }

    #[instrument(skip(self))]
    async fn fetch_pricing(&self) -> Result<CartPayload, ApiError> {
        let url = self.endpoint(&["cart", "pricing"])?;
        self.execute::<(), _>(Method::GET, url, None).await
    }

    #[instrument(skip(self, request), fields(payment_method = %request.payment_method))]
    async fn create_order(
        &self,
        request: &CheckoutRequest,
    ) -> Result<OrderConfirmation, ApiError> {
        let url = self.endpoint(&["orders"])?;
        let payload: OrderPayload = self.execute(Method::POST, url, Some(request)).await?;
        Ok(payload.into_confirmation())
    }
}
