//! Indicator Helpers
//!
//! Classic indicators over bar history (ATR, EMA, RSI), a rolling
//! volatility model, and the placeholder predicate set used by the
//! predicate strategies.

use statrs::statistics::Statistics;
use std::collections::VecDeque;

use crate::domain::market::Ohlcv;

/// Average true range over the last `period` bars
///
/// Returns 0.0 until `period + 1` bars are available.
pub fn atr(bars: &[Ohlcv], period: usize) -> f64 {
    if period == 0 || bars.len() < period + 1 {
        return 0.0;
    }

    let start = bars.len() - period;
    let sum: f64 = (start..bars.len())
        .map(|i| bars[i].true_range(Some(&bars[i - 1])))
        .sum();
    sum / period as f64
}

/// Exponential moving average seeded with the first value
pub fn ema(values: &[f64], period: usize) -> f64 {
    let Some((&first, rest)) = values.split_first() else {
        return 0.0;
    };

    let multiplier = 2.0 / (period as f64 + 1.0);
    rest.iter()
        .fold(first, |ema, value| value * multiplier + ema * (1.0 - multiplier))
}

/// Relative strength index over the first `period` close-to-close changes
///
/// Neutral 50.0 until `period + 1` bars are available.
pub fn rsi(bars: &[Ohlcv], period: usize) -> f64 {
    if period == 0 || bars.len() < period + 1 {
        return 50.0;
    }

    let (gain, loss) = bars[..=period].windows(2).fold((0.0, 0.0), |(gain, loss), pair| {
        let change = pair[1].close - pair[0].close;
        if change > 0.0 {
            (gain + change, loss)
        } else {
            (gain, loss - change)
        }
    });

    let avg_gain = gain / period as f64;
    let avg_loss = loss / period as f64;

    if avg_loss == 0.0 {
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    100.0 - 100.0 / (1.0 + rs)
}

/// Default price window for [`VolatilityModel`]
pub const VOLATILITY_WINDOW: usize = 20;

/// Standard deviation above which the market counts as volatile
pub const HIGH_VOLATILITY_STD_DEV: f64 = 10.0;

/// Standard deviation below which the market counts as quiet
pub const LOW_VOLATILITY_STD_DEV: f64 = 5.0;

/// Rolling price-dispersion model for regime switching
#[derive(Debug, Clone)]
pub struct VolatilityModel {
    window: usize,
    prices: VecDeque<f64>,
}

impl VolatilityModel {
    pub fn new(window: usize) -> Self {
        Self {
            window: window.max(1),
            prices: VecDeque::with_capacity(window.max(1)),
        }
    }

    pub fn update(&mut self, price: f64) {
        if self.prices.len() >= self.window {
            self.prices.pop_front();
        }
        self.prices.push_back(price);
    }

    /// Population standard deviation of the window, 0.0 when empty
    pub fn std_dev(&self) -> f64 {
        if self.prices.is_empty() {
            return 0.0;
        }
        self.prices.iter().population_std_dev()
    }

    pub fn is_high(&self) -> bool {
        self.std_dev() > HIGH_VOLATILITY_STD_DEV
    }

    pub fn is_low(&self) -> bool {
        self.std_dev() < LOW_VOLATILITY_STD_DEV
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    pub fn clear(&mut self) {
        self.prices.clear();
    }
}

impl Default for VolatilityModel {
    fn default() -> Self {
        Self::new(VOLATILITY_WINDOW)
    }
}

/// Placeholder market-condition predicates
///
/// Each predicate fires when the price is an exact multiple of a fixed
/// divisor. Real detection logic plugs in here.
#[derive(Debug, Clone, Copy, Default)]
pub struct IndicatorProcessor;

impl IndicatorProcessor {
    pub fn new() -> Self {
        Self
    }

    fn divisible(price: f64, divisor: f64) -> bool {
        price % divisor == 0.0
    }

    pub fn is_trending(&self, price: f64) -> bool {
        Self::divisible(price, 5.0)
    }

    pub fn is_choppy(&self, price: f64) -> bool {
        Self::divisible(price, 7.0)
    }

    pub fn is_volume_spike(&self, price: f64) -> bool {
        Self::divisible(price, 11.0)
    }

    pub fn is_liquidity_sweep(&self, price: f64) -> bool {
        Self::divisible(price, 13.0)
    }

    pub fn is_reversal_sign(&self, price: f64) -> bool {
        Self::divisible(price, 17.0)
    }

    pub fn is_volatility_high(&self, price: f64) -> bool {
        Self::divisible(price, 19.0)
    }

    pub fn is_breakout_confirmed(&self, price: f64) -> bool {
        Self::divisible(price, 23.0)
    }

    pub fn is_swing_failure(&self, price: f64) -> bool {
        Self::divisible(price, 29.0)
    }

    pub fn is_correlation_diverging(&self, price: f64) -> bool {
        Self::divisible(price, 31.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::Utc;

    fn closes(values: &[f64]) -> Vec<Ohlcv> {
        values
            .iter()
            .map(|&c| Ohlcv::new(c, c + 1.0, c - 1.0, c, 100, Utc::now()))
            .collect()
    }

    #[test]
    fn test_atr_needs_history() {
        let bars = closes(&[100.0, 101.0]);
        assert_eq!(atr(&bars, 2), 0.0);
        assert_eq!(atr(&bars, 0), 0.0);
    }

    #[test]
    fn test_atr_flat_bars() {
        // Each bar spans 2.0 and closes inside the next bar's range
        let bars = closes(&[100.0, 100.5, 101.0, 100.5]);
        assert_relative_eq!(atr(&bars, 3), 2.0);
    }

    #[test]
    fn test_atr_with_gaps() {
        // Gaps of 10 dominate the 2.0 bar range: TR = |high - prev close| = 11
        let bars = closes(&[100.0, 110.0, 120.0]);
        assert_relative_eq!(atr(&bars, 2), 11.0);
    }

    #[test]
    fn test_ema() {
        assert_eq!(ema(&[], 10), 0.0);
        assert_eq!(ema(&[42.0], 10), 42.0);

        // period 3 -> multiplier 0.5
        assert_relative_eq!(ema(&[10.0, 20.0, 30.0], 3), 22.5);
    }

    #[test]
    fn test_rsi() {
        assert_eq!(rsi(&closes(&[100.0, 101.0]), 14), 50.0);

        // Only gains
        assert_eq!(rsi(&closes(&[100.0, 101.0, 102.0, 103.0]), 3), 100.0);

        // Two gains of 1 and one loss of 1: RS = 2 -> RSI = 66.67
        let value = rsi(&closes(&[100.0, 101.0, 102.0, 101.0]), 3);
        assert_relative_eq!(value, 100.0 - 100.0 / 3.0, epsilon = 1e-9);
    }

    #[test]
    fn test_volatility_model_window() {
        let mut model = VolatilityModel::new(3);
        for price in [1.0, 2.0, 3.0, 4.0] {
            model.update(price);
        }
        assert_eq!(model.len(), 3);
        // Window holds 2, 3, 4
        assert_relative_eq!(model.std_dev(), (2.0f64 / 3.0).sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_volatility_regimes() {
        let mut quiet = VolatilityModel::default();
        assert!(quiet.is_empty());
        assert_eq!(quiet.std_dev(), 0.0);
        quiet.update(4500.0);
        quiet.update(4501.0);
        assert!(quiet.is_low());
        assert!(!quiet.is_high());

        let mut wild = VolatilityModel::default();
        wild.update(4500.0);
        wild.update(4540.0);
        assert!(wild.is_high());
        assert!(!wild.is_low());

        wild.clear();
        assert!(wild.is_empty());
    }

    #[test]
    fn test_indicator_predicates() {
        let ip = IndicatorProcessor::new();
        assert!(ip.is_trending(5005.0));
        assert!(!ip.is_trending(5006.0));
        assert!(ip.is_choppy(4998.0));
        assert!(ip.is_volume_spike(4499.0));
        assert!(ip.is_liquidity_sweep(4511.0));
        assert!(ip.is_reversal_sign(4522.0));
        assert!(ip.is_volatility_high(4503.0));
        assert!(ip.is_breakout_confirmed(4508.0));
        assert!(ip.is_swing_failure(4524.0));
        assert!(ip.is_correlation_diverging(4526.0));
        assert!(!ip.is_trending(4500.25));
    }
}
