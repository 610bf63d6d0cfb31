//! News and sentiment feed port

/// Economic-calendar and sentiment source consulted by event strategies
pub trait NewsFeed: Send + Sync {
    /// Whether a scheduled high-impact release is in progress
    fn is_major_event_active(&self) -> bool;

    /// Aggregate sentiment in [0, 1]; 0.5 is neutral
    fn sentiment_score(&self) -> f64;
}
