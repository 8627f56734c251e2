#![allow(dead_code)]
//! Host-side fixtures shared by the integration tests.

use chrono::{DateTime, TimeZone, Utc};
use std::cell::Cell;
use template_sandbox::expose;

pub struct Address {
    pub city: String,
    pub country: String,
}

expose!(Address { city, country });

/// A customer record with state a template must never reach.
pub struct Customer {
    pub name: String,
    pub email: String,
    pub address: Option<Address>,
    pub password_hash: String,
    pub deleted: Cell<bool>,
}

expose!(Customer { name, email, address });

impl Customer {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            address: Some(Address { city: "Oslo".into(), country: "NO".into() }),
            password_hash: "$argon2id$secret".into(),
            deleted: Cell::new(false),
        }
    }

    /// Mutates host state; must stay invisible to templates.
    pub fn delete(&self) {
        self.deleted.set(true);
    }
}

pub struct OrderLine {
    pub sku: String,
    pub quantity: u32,
    pub price: f64,
}

expose!(OrderLine { sku, quantity, price });

/// Stands in for a database connection held by the order.
pub struct Connection {
    pub dsn: String,
}

expose!(Connection {});

pub struct Order {
    pub number: String,
    pub created_at: DateTime<Utc>,
    pub customer: Customer,
    pub lines: Vec<OrderLine>,
    pub total: f64,
    pub connection: Connection,
}

expose!(Order { number, created_at, customer, lines, total });

pub fn sample_order() -> Order {
    Order {
        number: "SO-1001".into(),
        created_at: Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 0).unwrap(),
        customer: Customer::new("Bo"),
        lines: vec![
            OrderLine { sku: "MUG-1".into(), quantity: 2, price: 7.5 },
            OrderLine { sku: "TEE-3".into(), quantity: 1, price: 1200.0 },
        ],
        total: 1215.0,
        connection: Connection { dsn: "postgres://shop".into() },
    }
}
