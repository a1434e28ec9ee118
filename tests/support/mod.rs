#![allow(dead_code, clippy::unwrap_used)]

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use sea_orm::DatabaseConnection;
use serde_json::{Value, json};
use tower::ServiceExt;
use wig_storefront::{
    api::{self, AppState, auth::issue_token},
    config::{
        settings::Settings,
        store::{StoreConfig, parse_config},
    },
    core::{
        catalog::{self, NewProduct},
        profile,
    },
    entities::product,
    payment::{FakeGateway, PaymentGateway},
};

pub const JWT_SECRET: &str = "integration-secret";
pub const HASH_COST: u32 = 4;

const STORE_TOML: &str = r#"
currency = "usd"
max_quantity_per_item = 5

[delivery]
free_threshold = 150.0

[[delivery.tiers]]
min_subtotal = 0.0
fee = 15.0

[[delivery.tiers]]
min_subtotal = 75.0
fee = 7.5

[checkout]
success_url = "https://shop.test/checkout/done?session_id={CHECKOUT_SESSION_ID}"
cancel_url = "https://shop.test/cart"
"#;

pub struct TestApp {
    pub router: Router,
    pub db: DatabaseConnection,
    pub gateway: Arc<FakeGateway>,
}

fn settings() -> Settings {
    Settings {
        bind_addr: "127.0.0.1:0".to_string(),
        store_config_path: "store.toml".to_string(),
        jwt_secret: JWT_SECRET.to_string(),
        token_ttl_hours: 1,
        password_hash_cost: HASH_COST,
        stripe_secret_key: "sk_test_unused".to_string(),
        stripe_api_base: "http://127.0.0.1:9".to_string(),
    }
}

pub fn store_config() -> StoreConfig {
    parse_config(STORE_TOML).unwrap()
}

impl TestApp {
    pub async fn spawn() -> Self {
        let db = sea_orm::Database::connect("sqlite::memory:").await.unwrap();
        wig_storefront::config::database::create_tables(&db)
            .await
            .unwrap();
        let gateway = Arc::new(FakeGateway::default());
        let state = AppState {
            db: db.clone(),
            gateway: Arc::clone(&gateway) as Arc<dyn PaymentGateway>,
            store: Arc::new(store_config()),
            settings: Arc::new(settings()),
        };
        Self {
            router: api::router(state),
            db,
            gateway,
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, value)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, token, None).await
    }

    /// Registers a customer over HTTP and returns its bearer token.
    pub async fn register(&self, email: &str) -> String {
        let (status, body) = self
            .post(
                "/auth/register",
                None,
                json!({ "email": email, "password": "password123", "full_name": "Test Shopper" }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["token"].as_str().unwrap().to_string()
    }

    /// Creates the bootstrap administrator directly and returns its bearer token.
    pub async fn admin_token(&self) -> String {
        let admin = profile::ensure_admin(&self.db, "admin@shop.test", "admin-password", HASH_COST)
            .await
            .unwrap();
        issue_token(&admin, JWT_SECRET, 1).unwrap()
    }

    pub async fn product(&self, name: &str, price: f64) -> product::Model {
        catalog::create_product(
            &self.db,
            NewProduct {
                name: name.to_string(),
                description: Some(format!("{name} description")),
                price,
                category: "lace-front".to_string(),
                in_stock: true,
                rating: 4.5,
            },
        )
        .await
        .unwrap()
    }
}

pub fn delivery() -> Value {
    json!({
        "full_name": "Alice Walker",
        "email": "alice@shop.test",
        "phone": "+1 404 555 0100",
        "address": "12 Peachtree St",
        "city": "Atlanta",
        "postal_code": "30303"
    })
}
