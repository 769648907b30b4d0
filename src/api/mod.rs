//! Upstream Indibiz REST API access
//!
//! The portal owns no data: every list, create, update and delete is a call
//! through [`ApiClient`].

mod client;

pub use client::{ApiClient, ApiError, ApiResponse, RequestOptions};

use crate::pagination::Pagination;
use serde::{Deserialize, Serialize};

/// List endpoint envelope: `{ result: { data, pagination } }`
#[derive(Debug, Deserialize)]
pub struct ListEnvelope<T> {
    pub result: Page<T>,
}

/// One page of records as returned by a list endpoint
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    #[serde(default)]
    pub pagination: Pagination,
}

impl<T> Page<T> {
    pub fn empty(page: u32, limit: u32) -> Self {
        Self {
            data: Vec::new(),
            pagination: Pagination {
                page,
                limit,
                ..Pagination::default()
            },
        }
    }
}
