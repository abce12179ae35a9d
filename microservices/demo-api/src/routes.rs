//! Demo routes
//!
//! Every route except `/health` goes through the chaos layer first.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Request, State};
use axum::http::{HeaderValue, StatusCode};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;

use crate::catalog::{NewOrder, Order, OrderBook, Product, User, PRODUCTS, USERS};
use crate::chaos::Chaos;
use crate::error::{ApiError, Result};

/// Header carrying the handling time in milliseconds
pub const RESPONSE_TIME_HEADER: &str = "x-response-time";

#[derive(Clone)]
pub struct AppState {
    pub chaos: Arc<Chaos>,
    pub orders: Arc<OrderBook>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/users", get(users))
        .route("/products", get(products))
        .route("/orders", get(list_orders).post(create_order))
        .route("/orders/{id}", get(get_order))
        .route("/error", get(intentional_error))
        .route("/health", get(health))
        .layer(middleware::from_fn(response_time))
        .with_state(state)
}

async fn response_time(request: Request, next: Next) -> Response {
    let started = Instant::now();
    let mut response = next.run(request).await;
    let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
    if let Ok(value) = HeaderValue::from_str(&format!("{:.2}ms", elapsed_ms)) {
        response.headers_mut().insert(RESPONSE_TIME_HEADER, value);
    }
    response
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

async fn index(State(state): State<AppState>) -> Result<Json<Value>> {
    state.chaos.disturb().await?;
    Ok(Json(json!({ "message": "Welcome to the demo API" })))
}

async fn users(State(state): State<AppState>) -> Result<Json<&'static [User]>> {
    state.chaos.disturb().await?;
    Ok(Json(USERS))
}

async fn products(State(state): State<AppState>) -> Result<Json<&'static [Product]>> {
    state.chaos.disturb().await?;
    Ok(Json(PRODUCTS))
}

async fn list_orders(State(state): State<AppState>) -> Result<Json<Vec<Order>>> {
    state.chaos.disturb().await?;
    Ok(Json(state.orders.list()))
}

async fn get_order(State(state): State<AppState>, Path(id): Path<u64>) -> Result<Json<Order>> {
    state.chaos.disturb().await?;
    Ok(Json(state.orders.get(id)?))
}

async fn create_order(
    State(state): State<AppState>,
    body: std::result::Result<Json<NewOrder>, JsonRejection>,
) -> Result<(StatusCode, Json<Order>)> {
    state.chaos.disturb().await?;
    let Json(request) = body.map_err(|e| ApiError::InvalidRequest(e.body_text()))?;
    let order = state.orders.create(&request)?;
    Ok((StatusCode::CREATED, Json(order)))
}

async fn intentional_error(State(state): State<AppState>) -> Result<Json<Value>> {
    // the delay still applies; the failure is unconditional
    let delay = state.chaos.sample_delay();
    tokio::time::sleep(delay).await;
    Err(ApiError::Intentional)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::Client;
    use std::net::SocketAddr;

    async fn serve(chaos: Chaos) -> SocketAddr {
        let app = router(AppState {
            chaos: Arc::new(chaos),
            orders: Arc::new(OrderBook::default()),
        });
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    #[tokio::test]
    async fn test_routes_answer_when_calm() {
        let addr = serve(Chaos::calm()).await;
        let client = Client::new();

        for path in ["/", "/users", "/products", "/orders", "/orders/1", "/health"] {
            let response = client.get(format!("http://{}{}", addr, path)).send().await.unwrap();
            assert_eq!(response.status().as_u16(), 200, "{}", path);
            assert!(response.headers().contains_key(RESPONSE_TIME_HEADER), "{}", path);
        }

        let users: Vec<Value> = client
            .get(format!("http://{}/users", addr))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(users.len(), USERS.len());
    }

    #[tokio::test]
    async fn test_error_route_always_fails() {
        let addr = serve(Chaos::calm()).await;

        let response = reqwest::get(format!("http://{}/error", addr)).await.unwrap();

        assert_eq!(response.status().as_u16(), 500);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["code"], 500);
    }

    #[tokio::test]
    async fn test_health_is_exempt_from_failures() {
        let addr = serve(Chaos::failing()).await;

        let users = reqwest::get(format!("http://{}/users", addr)).await.unwrap();
        let health = reqwest::get(format!("http://{}/health", addr)).await.unwrap();

        assert_eq!(users.status().as_u16(), 500);
        assert_eq!(health.status().as_u16(), 200);
    }

    #[tokio::test]
    async fn test_create_order() {
        let addr = serve(Chaos::calm()).await;
        let client = Client::new();
        let url = format!("http://{}/orders", addr);

        let created = client
            .post(&url)
            .json(&json!({ "user_id": 2, "product_id": 1, "quantity": 3 }))
            .send()
            .await
            .unwrap();
        assert_eq!(created.status().as_u16(), 201);
        let order: Value = created.json().await.unwrap();
        assert_eq!(order["id"], 3);
        assert_eq!(order["quantity"], 3);

        let missing = client
            .post(&url)
            .json(&json!({ "user_id": 2 }))
            .send()
            .await
            .unwrap();
        assert_eq!(missing.status().as_u16(), 400);

        let fetched = client.get(format!("{}/3", url)).send().await.unwrap();
        assert_eq!(fetched.status().as_u16(), 200);
    }

    #[tokio::test]
    async fn test_unknown_order_is_404() {
        let addr = serve(Chaos::calm()).await;

        let response = reqwest::get(format!("http://{}/orders/42", addr)).await.unwrap();

        assert_eq!(response.status().as_u16(), 404);
    }
}
