use async_trait::async_trait;
use chrono::Utc;
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

use crate::domain::market::{MarketSnapshot, Ohlcv, TimeFrame, VolatilityMetrics};
use crate::ports::market_data::{MarketDataError, MarketDataPort};

use super::{lock, make_rng};

/// Half-tick offset of the synthetic top of book
const BOOK_HALF_SPREAD: f64 = 0.25;
const BOOK_LEVEL_SIZE: u64 = 100;

/// Shape of the synthetic tape
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationParams {
    /// Lowest base price drawn
    pub base_price: f64,
    /// Width of the uniform band above `base_price`
    pub price_range: f64,
    pub seed: Option<u64>,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            base_price: 4500.0,
            price_range: 200.0,
            seed: None,
        }
    }
}

/// Random-walk-free synthetic snapshot source
///
/// Every call draws an independent snapshot: one bar copied onto M1, M5 and
/// M15, a one-level book around the base price and uniform volatility stats.
pub struct SimulatedMarketData {
    params: SimulationParams,
    rng: Mutex<StdRng>,
}

impl SimulatedMarketData {
    pub fn new(params: SimulationParams) -> Self {
        Self {
            params,
            rng: Mutex::new(make_rng(params.seed)),
        }
    }

    pub fn params(&self) -> &SimulationParams {
        &self.params
    }

    fn generate(&self, symbol: &str) -> MarketSnapshot {
        let mut rng = lock(&self.rng);
        let now = Utc::now();

        let base = self.params.base_price + rng.gen::<f64>() * self.params.price_range;
        let close = base + (rng.gen::<f64>() - 0.5) * 10.0;
        let volume = 1000 + (rng.gen::<f64>() * 2000.0) as u64;
        let bar = Ohlcv::new(base, base + 5.0, base - 5.0, close, volume, now);

        let mut snapshot = MarketSnapshot::new(symbol, now)
            .with_bar(TimeFrame::M1, bar)
            .with_bar(TimeFrame::M5, bar)
            .with_bar(TimeFrame::M15, bar);

        snapshot.order_book.add_bid(base - BOOK_HALF_SPREAD, BOOK_LEVEL_SIZE);
        snapshot.order_book.add_ask(base + BOOK_HALF_SPREAD, BOOK_LEVEL_SIZE);

        snapshot.volatility = VolatilityMetrics {
            realized: 0.15 + rng.gen::<f64>() * 0.1,
            rank: rng.gen::<f64>(),
            high_regime: rng.gen::<f64>() > 0.7,
            ..VolatilityMetrics::default()
        };

        snapshot
    }
}

impl Default for SimulatedMarketData {
    fn default() -> Self {
        Self::new(SimulationParams::default())
    }
}

#[async_trait]
impl MarketDataPort for SimulatedMarketData {
    async fn latest_snapshot(&self, symbol: &str) -> Result<MarketSnapshot, MarketDataError> {
        if symbol.trim().is_empty() {
            return Err(MarketDataError::UnknownSymbol(symbol.to_string()));
        }

        let snapshot = self.generate(symbol);
        tracing::debug!(
            "Simulated {} @ {:.2} (vol rank {:.2})",
            symbol,
            snapshot.current_price(),
            snapshot.volatility.rank
        );
        Ok(snapshot)
    }
}
