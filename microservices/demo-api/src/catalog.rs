//! Fixed users and products, and an in-memory order book

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{ApiError, Result};

#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: u64,
    pub name: &'static str,
    pub email: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct Product {
    pub id: u64,
    pub name: &'static str,
    pub price: f64,
}

pub const USERS: &[User] = &[
    User { id: 1, name: "John Doe", email: "john@example.com" },
    User { id: 2, name: "Jane Smith", email: "jane@example.com" },
    User { id: 3, name: "Bob Johnson", email: "bob@example.com" },
];

pub const PRODUCTS: &[Product] = &[
    Product { id: 1, name: "Laptop", price: 999.99 },
    Product { id: 2, name: "Phone", price: 599.99 },
    Product { id: 3, name: "Tablet", price: 399.99 },
];

#[derive(Debug, Clone, Serialize)]
pub struct Order {
    pub id: u64,
    pub user_id: u64,
    pub product_id: u64,
    pub quantity: u32,
    pub status: &'static str,
    pub created_at: DateTime<Utc>,
}

/// Body of `POST /orders`; every field is required
#[derive(Debug, Default, Deserialize)]
pub struct NewOrder {
    pub user_id: Option<u64>,
    pub product_id: Option<u64>,
    pub quantity: Option<u32>,
}

impl NewOrder {
    fn validate(&self) -> Result<(u64, u64, u32)> {
        match (self.user_id, self.product_id, self.quantity) {
            (Some(user_id), Some(product_id), Some(quantity)) => Ok((user_id, product_id, quantity)),
            _ => Err(ApiError::InvalidRequest(
                "user_id, product_id and quantity are required".to_string(),
            )),
        }
    }
}

pub struct OrderBook {
    orders: RwLock<Vec<Order>>,
    next_id: AtomicU64,
}

impl Default for OrderBook {
    fn default() -> Self {
        let now = Utc::now();
        let seed = vec![
            Order { id: 1, user_id: 1, product_id: 1, quantity: 1, status: "completed", created_at: now },
            Order { id: 2, user_id: 2, product_id: 2, quantity: 2, status: "pending", created_at: now },
        ];
        Self {
            next_id: AtomicU64::new(seed.len() as u64 + 1),
            orders: RwLock::new(seed),
        }
    }
}

impl OrderBook {
    pub fn list(&self) -> Vec<Order> {
        self.orders.read().clone()
    }

    pub fn get(&self, id: u64) -> Result<Order> {
        self.orders
            .read()
            .iter()
            .find(|o| o.id == id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("order {}", id)))
    }

    pub fn create(&self, request: &NewOrder) -> Result<Order> {
        let (user_id, product_id, quantity) = request.validate()?;
        let order = Order {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            user_id,
            product_id,
            quantity,
            status: "pending",
            created_at: Utc::now(),
        };
        self.orders.write().push(order.clone());
        Ok(order)
    }
}
