//! List response bodies.
//!
//! Some list endpoints return a bare JSON array, others a paged object
//! (`items` plus counters whose names vary by endpoint).

use serde::{Deserialize, Serialize};

/// Paged list body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paged<T> {
    pub items: Vec<T>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub page: Option<u64>,
    #[serde(default, alias = "page_size")]
    pub size: Option<u64>,
    #[serde(default, alias = "total_pages")]
    pub pages: Option<u64>,
}

/// Either shape of a list body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ListBody<T> {
    Paged(Paged<T>),
    Plain(Vec<T>),
}

impl<T> ListBody<T> {
    /// Total number of items on the server, falling back to the page length.
    pub fn total(&self) -> u64 {
        match self {
            ListBody::Paged(p) => p.total.max(p.items.len() as u64),
            ListBody::Plain(items) => items.len() as u64,
        }
    }

    pub fn into_items(self) -> Vec<T> {
        match self {
            ListBody::Paged(p) => p.items,
            ListBody::Plain(items) => items,
        }
    }
}
