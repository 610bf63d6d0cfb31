use serde::{Deserialize, Serialize};

/// Best achievable fill across venues
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RouteQuote {
    pub price: f64,
    pub latency_ms: u32,
}

/// Smart-order-routing source
pub trait RouteProvider: Send + Sync {
    /// Best route for an order near `price`, if any venue can take it
    fn best_route(&self, price: f64) -> Option<RouteQuote>;
}
