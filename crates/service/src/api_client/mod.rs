//! Typed client for the auth, product and order services.
//!
//! One method per backend call. A non-2xx answer becomes
//! [`ClientError::Rejected`] whose message is fixed per [`Operation`].
//! Nothing is retried.

pub mod dto;

use std::fmt;

use common::join_url;
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::errors::ServiceError;
use crate::runtime_config::{RuntimeConfig, RuntimeConfigCache};
pub use dto::*;

pub const DEFAULT_PAGE_LIMIT: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Register,
    VerifyEmail,
    Login,
    Me,
    Categories,
    Products,
    Product,
    CategoryProducts,
    CreateProduct,
    CreateOrder,
    Order,
    MyOrders,
    GeocodeAddress,
    ReverseGeocode,
    UpsertMyLocation,
}

impl Operation {
    pub fn failure_message(self) -> &'static str {
        match self {
            Operation::Register => "Registration failed",
            Operation::VerifyEmail => "Verification failed",
            Operation::Login => "Login failed",
            Operation::Me => "Failed to get user",
            Operation::Categories => "Failed to fetch categories",
            Operation::Products => "Failed to fetch products",
            Operation::Product => "Failed to fetch product",
            Operation::CategoryProducts => "Failed to fetch category products",
            Operation::CreateProduct => "Failed to create product",
            Operation::CreateOrder => "Failed to create order",
            Operation::Order => "Failed to fetch order",
            Operation::MyOrders => "Failed to fetch orders",
            Operation::GeocodeAddress => "Geocoding failed",
            Operation::ReverseGeocode => "Reverse geocoding failed",
            Operation::UpsertMyLocation => "Failed to save location",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.failure_message())
    }
}

#[derive(Debug, Error)]
pub enum ClientError {
    /// Backend answered with a non-2xx status.
    #[error("{operation}")]
    Rejected { operation: Operation, status: StatusCode },
    #[error("{operation}: {source}")]
    Transport { operation: Operation, source: reqwest::Error },
    #[error("{operation}: invalid response body: {source}")]
    Decode { operation: Operation, source: reqwest::Error },
    #[error("{operation}: invalid service URL: {source}")]
    InvalidUrl { operation: Operation, source: url::ParseError },
}

impl ClientError {
    pub fn operation(&self) -> Operation {
        match self {
            ClientError::Rejected { operation, .. }
            | ClientError::Transport { operation, .. }
            | ClientError::Decode { operation, .. }
            | ClientError::InvalidUrl { operation, .. } => *operation,
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MarketplaceClient {
    http: Client,
    config: RuntimeConfig,
}

impl MarketplaceClient {
    pub fn new(http: Client, config: RuntimeConfig) -> Self {
        Self { http, config }
    }

    /// Build from the shared runtime config cache.
    pub async fn from_cache(http: Client, cache: &RuntimeConfigCache) -> Result<Self, ServiceError> {
        Ok(Self::new(http, cache.get().await?))
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    fn auth_url(&self, path: &str) -> String {
        join_url(&self.config.auth_service, path)
    }

    fn product_url(&self, path: &str) -> String {
        join_url(&self.config.product_service, path)
    }

    fn order_url(&self, path: &str) -> String {
        join_url(&self.config.order_service, path)
    }

    /// Product service URL with each of `segments` percent-encoded as one path segment.
    fn product_segments_url(&self, segments: &[&str]) -> Result<Url, url::ParseError> {
        let mut url = Url::parse(&self.config.product_service)?;
        url.path_segments_mut()
            .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn execute<T: DeserializeOwned>(&self, operation: Operation, req: RequestBuilder) -> Result<T, ClientError> {
        let resp = req
            .send()
            .await
            .map_err(|source| ClientError::Transport { operation, source })?;
        let status = resp.status();
        if !status.is_success() {
            warn!(?operation, %status, "backend rejected request");
            return Err(ClientError::Rejected { operation, status });
        }
        debug!(?operation, %status, "backend request ok");
        resp.json::<T>()
            .await
            .map_err(|source| ClientError::Decode { operation, source })
    }

    // Auth

    pub async fn register(&self, email: &str, password: &str, name: &str) -> Result<Value, ClientError> {
        let req = self
            .http
            .post(self.auth_url("/register"))
            .json(&json!({ "email": email, "password": password, "name": name }));
        self.execute(Operation::Register, req).await
    }

    pub async fn verify_email(&self, email: &str, code: &str) -> Result<Value, ClientError> {
        let req = self
            .http
            .post(self.auth_url("/verify-email"))
            .json(&json!({ "email": email, "code": code }));
        self.execute(Operation::VerifyEmail, req).await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ClientError> {
        let req = self
            .http
            .post(self.auth_url("/login"))
            .json(&json!({ "email": email, "password": password }));
        self.execute(Operation::Login, req).await
    }

    pub async fn me(&self, token: &str) -> Result<User, ClientError> {
        let req = self.http.get(self.auth_url("/me")).bearer_auth(token);
        self.execute(Operation::Me, req).await
    }

    // Products

    pub async fn categories(&self) -> Result<Vec<Category>, ClientError> {
        let req = self.http.get(self.product_url("/categories"));
        self.execute(Operation::Categories, req).await
    }

    pub async fn products(&self, category_id: Option<i64>, limit: Option<u32>) -> Result<Vec<Product>, ClientError> {
        let mut req = self.http.get(self.product_url("/products"));
        if let Some(id) = category_id {
            req = req.query(&[("category_id", id)]);
        }
        let req = req.query(&[("limit", limit.unwrap_or(DEFAULT_PAGE_LIMIT))]);
        self.execute(Operation::Products, req).await
    }

    pub async fn product(&self, id: i64) -> Result<Product, ClientError> {
        let req = self.http.get(self.product_url(&format!("/products/{id}")));
        self.execute(Operation::Product, req).await
    }

    pub async fn category_products(&self, slug: &str, limit: Option<u32>) -> Result<Vec<Product>, ClientError> {
        let url = self
            .product_segments_url(&["categories", slug, "products"])
            .map_err(|source| ClientError::InvalidUrl { operation: Operation::CategoryProducts, source })?;
        let req = self
            .http
            .get(url)
            .query(&[("limit", limit.unwrap_or(DEFAULT_PAGE_LIMIT))]);
        self.execute(Operation::CategoryProducts, req).await
    }

    pub async fn create_product(&self, token: &str, data: &NewProduct) -> Result<CreatedProduct, ClientError> {
        let req = self.http.post(self.product_url("/products")).bearer_auth(token).json(data);
        self.execute(Operation::CreateProduct, req).await
    }

    // Orders

    pub async fn create_order(&self, token: &str, data: &NewOrder) -> Result<Value, ClientError> {
        let req = self.http.post(self.order_url("/orders")).bearer_auth(token).json(data);
        self.execute(Operation::CreateOrder, req).await
    }

    pub async fn order(&self, token: &str, id: i64) -> Result<Order, ClientError> {
        let req = self.http.get(self.order_url(&format!("/orders/{id}"))).bearer_auth(token);
        self.execute(Operation::Order, req).await
    }

    pub async fn my_orders(&self, token: &str) -> Result<Vec<OrderSummary>, ClientError> {
        let req = self.http.get(self.order_url("/orders/my-orders")).bearer_auth(token);
        self.execute(Operation::MyOrders, req).await
    }

    // Geocoding and locations

    pub async fn geocode_address(&self, address: &str) -> Result<GeocodeResult, ClientError> {
        let req = self
            .http
            .post(self.order_url("/geocode/address"))
            .json(&json!({ "address": address }));
        self.execute(Operation::GeocodeAddress, req).await
    }

    pub async fn reverse_geocode(&self, at: Coordinates) -> Result<GeocodeResult, ClientError> {
        let req = self.http.post(self.order_url("/geocode/reverse")).json(&at);
        self.execute(Operation::ReverseGeocode, req).await
    }

    pub async fn upsert_my_location(&self, token: &str, location: &LocationInfo) -> Result<LocationUpsertResponse, ClientError> {
        let req = self.http.put(self.order_url("/locations/me")).bearer_auth(token).json(location);
        self.execute(Operation::UpsertMyLocation, req).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_error_displays_fixed_message() {
        let err = ClientError::Rejected { operation: Operation::Login, status: StatusCode::UNAUTHORIZED };
        assert_eq!(err.to_string(), "Login failed");
        assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
        assert_eq!(err.operation(), Operation::Login);
    }

    #[test]
    fn urls_are_joined_per_service() {
        let client = MarketplaceClient::new(
            Client::new(),
            RuntimeConfig {
                auth_service: "http://auth/".into(),
                product_service: "http://product".into(),
                order_service: "http://order".into(),
            },
        );
        assert_eq!(client.auth_url("/login"), "http://auth/login");
        assert_eq!(client.product_url("/categories"), "http://product/categories");
        assert_eq!(client.order_url("/orders/my-orders"), "http://order/orders/my-orders");
    }

    #[test]
    fn slug_is_a_single_encoded_segment() {
        let mut config = RuntimeConfig::default();
        config.product_service = "http://product/api/".into();
        let client = MarketplaceClient::new(Client::new(), config);

        let url = client.product_segments_url(&["categories", "a/b?c#d", "products"]).unwrap();
        assert_eq!(url.as_str(), "http://product/api/categories/a%2Fb%3Fc%23d/products");
        assert_eq!(url.query(), None);
        assert_eq!(url.fragment(), None);

        let plain = client.product_segments_url(&["categories", "books", "products"]).unwrap();
        assert_eq!(plain.as_str(), "http://product/api/categories/books/products");
    }

    #[tokio::test]
    async fn unparseable_product_base_is_reported() {
        let mut config = RuntimeConfig::default();
        config.product_service = "not a url".into();
        let client = MarketplaceClient::new(Client::new(), config);

        let err = client.category_products("books", None).await.unwrap_err();
        assert!(matches!(err, ClientError::InvalidUrl { operation: Operation::CategoryProducts, .. }));
    }
}
