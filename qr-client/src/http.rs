//! REST client for the dashboard API

use reqwest::{Client, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::error::ErrorResponse;
use shared::models::{AuthResponse, LoginRequest, Order, OrderUpdate, RegisterRequest};
use shared::order::{OrderStatus, PaymentStatus};
use uuid::Uuid;

use crate::{ClientError, ClientResult, LiveClientConfig};

/// Query for `GET /api/orders`
#[derive(Debug, Clone, Default, Serialize)]
pub struct OrderQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_filter: Option<OrderStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_items: Option<bool>,
}

/// HTTP client for the qr-cloud API
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(config: &LiveClientConfig) -> ClientResult<Self> {
        let client = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// Set the authentication token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    /// Get the current token
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Decode the success body or the error envelope
    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await?;
            return Err(match serde_json::from_str::<ErrorResponse>(&text) {
                Ok(envelope) => ClientError::Api {
                    status: status.as_u16(),
                    code: envelope.error_code,
                    message: envelope.message,
                },
                Err(_) => ClientError::Api {
                    status: status.as_u16(),
                    code: 0,
                    message: text,
                },
            });
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| ClientError::InvalidResponse(e.to_string()))
    }

    // ========== Auth API ==========

    /// Login and keep the issued token for later calls
    pub async fn login(&mut self, email: &str, password: &str) -> ClientResult<AuthResponse> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response = self
            .client
            .post(self.url("/api/auth/login"))
            .json(&body)
            .send()
            .await?;
        let auth: AuthResponse = Self::handle_response(response).await?;
        self.token = Some(auth.token.access_token.clone());
        Ok(auth)
    }

    /// Register an owner with a new restaurant and keep the issued token
    pub async fn register(
        &mut self,
        email: &str,
        password: &str,
        restaurant_name: &str,
    ) -> ClientResult<AuthResponse> {
        let body = RegisterRequest {
            email: email.to_string(),
            password: password.to_string(),
            restaurant_name: restaurant_name.to_string(),
        };
        let response = self
            .client
            .post(self.url("/api/auth/register"))
            .json(&body)
            .send()
            .await?;
        let auth: AuthResponse = Self::handle_response(response).await?;
        self.token = Some(auth.token.access_token.clone());
        Ok(auth)
    }

    // ========== Orders API ==========

    pub async fn orders(&self, query: &OrderQuery) -> ClientResult<Vec<Order>> {
        let request = self.client.get(self.url("/api/orders")).query(query);
        let response = self.authorized(request).send().await?;
        Self::handle_response(response).await
    }

    /// Change order and/or payment status
    pub async fn update_order_status(
        &self,
        order_id: Uuid,
        order_status: Option<OrderStatus>,
        payment_status: Option<PaymentStatus>,
    ) -> ClientResult<Order> {
        let body = OrderUpdate {
            order_status,
            payment_status,
        };
        let request = self
            .client
            .put(self.url(&format!("/api/orders/{order_id}")))
            .json(&body);
        let response = self.authorized(request).send().await?;
        Self::handle_response(response).await
    }
}
