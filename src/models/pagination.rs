//! Pagination and response envelopes
//!
//! The backend wraps single resources as `{ data }` and lists as
//! `{ data, pagination: { page, limit, total, pages } }`. Some list endpoints
//! omit the pagination block and only report a top-level `total`.

use serde::{Deserialize, Serialize};

/// Pagination metadata of a list response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default)]
    pub limit: u32,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub pages: u32,
}

fn first_page() -> u32 {
    1
}

impl Pagination {
    /// Derive pagination from a total item count
    pub fn from_total(total: u64, params: &ListParams) -> Self {
        let limit = u64::from(params.limit.max(1));
        let pages = total.div_ceil(limit);
        Self {
            page: params.page,
            limit: params.limit,
            total,
            pages: u32::try_from(pages).unwrap_or(u32::MAX),
        }
    }
}

/// Page request parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ListParams {
    /// Page number (1-indexed)
    pub page: u32,
    /// Number of items per page
    pub limit: u32,
}

impl Default for ListParams {
    fn default() -> Self {
        Self { page: 1, limit: 10 }
    }
}

impl ListParams {
    /// Create new pagination parameters
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.clamp(1, 100),
        }
    }
}

/// `{ data }` wrapper of single-resource responses
#[derive(Debug, Clone, Deserialize)]
pub struct DataEnvelope<T> {
    pub data: T,
}

/// Raw list response as the backend sends it
#[derive(Debug, Clone, Deserialize)]
pub struct ListEnvelope<T> {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
    #[serde(default)]
    pub total: Option<u64>,
}

impl<T> ListEnvelope<T> {
    /// Normalize into a [`Page`], deriving pagination from `total` when absent
    pub fn into_page(self, params: &ListParams) -> Page<T> {
        let pagination = self
            .pagination
            .unwrap_or_else(|| Pagination::from_total(self.total.unwrap_or(0), params));
        Page {
            items: self.data,
            pagination,
        }
    }
}

/// A normalized page of items
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

impl<T> Page<T> {
    /// Total pages, never less than one
    pub fn total_pages(&self) -> u32 {
        self.pagination.pages.max(1)
    }
}
