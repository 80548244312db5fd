use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use parking_lot::Mutex;
use pricing_backend::{
    error::{PricingError, PricingResult},
    handlers,
    models::catalog::ReferencePrice,
    services::{pricing::PricingService, reference_prices::ReferencePriceSource},
    store::MemoryStore,
    AppState,
};
use rust_decimal::Decimal;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

/// Reference feed double; tests swap its next response at will
#[derive(Default)]
pub struct StubReferenceSource {
    response: Mutex<Option<Result<Vec<ReferencePrice>, String>>>,
    delay: Mutex<Option<Duration>>,
}

#[allow(dead_code)]
impl StubReferenceSource {
    pub fn set_prices(&self, prices: Vec<ReferencePrice>) {
        *self.response.lock() = Some(Ok(prices));
    }

    pub fn set_failure(&self, message: &str) {
        *self.response.lock() = Some(Err(message.to_string()));
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock() = Some(delay);
    }
}

#[async_trait]
impl ReferencePriceSource for StubReferenceSource {
    async fn fetch_reference_prices(&self) -> PricingResult<Vec<ReferencePrice>> {
        let delay = *self.delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let response = self.response.lock().clone();
        match response {
            Some(Ok(prices)) => Ok(prices),
            Some(Err(message)) => Err(PricingError::Unavailable(message)),
            None => Ok(Vec::new()),
        }
    }
}

pub fn reference(id: &str, provider: &str, price: Decimal) -> ReferencePrice {
    ReferencePrice {
        id: id.to_string(),
        name: format!("{} ({})", id, provider),
        provider: provider.to_string(),
        reference_price: price,
    }
}

pub struct TestContext {
    pub pricing: PricingService,
    pub source: Arc<StubReferenceSource>,
}

/// Pricing service over an empty in-memory store and a stub feed
pub fn setup_pricing() -> TestContext {
    setup_pricing_with_timeout(Duration::from_secs(5))
}

pub fn setup_pricing_with_timeout(timeout: Duration) -> TestContext {
    let source = Arc::new(StubReferenceSource::default());
    let pricing = PricingService::new(Arc::new(MemoryStore::new()), source.clone(), timeout);
    TestContext { pricing, source }
}

/// Service seeded with `prices` through a catalog refresh
#[allow(dead_code)]
pub async fn setup_seeded(prices: Vec<ReferencePrice>) -> TestContext {
    let ctx = setup_pricing();
    ctx.source.set_prices(prices);
    ctx.pricing
        .refresh_catalog()
        .await
        .expect("seed refresh should succeed");
    ctx
}

#[allow(dead_code)]
pub fn build_test_router(pricing: PricingService) -> Router {
    handlers::api_router(AppState { pricing })
}

/// Send one request through the router and decode the JSON body (Null when empty)
#[allow(dead_code)]
pub async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, json)
}
