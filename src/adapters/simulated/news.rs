use crate::ports::news::NewsFeed;

/// Fixed news state, quiet and neutral by default
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StaticNewsFeed {
    pub major_event: bool,
    pub sentiment: f64,
}

impl StaticNewsFeed {
    pub fn new(major_event: bool, sentiment: f64) -> Self {
        Self {
            major_event,
            sentiment: sentiment.clamp(0.0, 1.0),
        }
    }
}

impl Default for StaticNewsFeed {
    fn default() -> Self {
        Self::new(false, 0.5)
    }
}

impl NewsFeed for StaticNewsFeed {
    fn is_major_event_active(&self) -> bool {
        self.major_event
    }

    fn sentiment_score(&self) -> f64 {
        self.sentiment
    }
}
