pub mod bids;
pub mod gigs;

use serde::Serialize;

/// One page of a listing, with enough totals for a client to draw a pager.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    /// 1-indexed.
    pub page: u64,
    pub pages: u64,
}
