use rand::rngs::StdRng;
use rand::Rng;
use std::sync::Mutex;

use crate::ports::routing::{RouteProvider, RouteQuote};

use super::{lock, make_rng};

/// Random venue quotes within ten basis points of the reference price
pub struct SimulatedRouter {
    rng: Mutex<StdRng>,
}

impl SimulatedRouter {
    pub fn new(seed: Option<u64>) -> Self {
        Self { rng: Mutex::new(make_rng(seed)) }
    }
}

impl Default for SimulatedRouter {
    fn default() -> Self {
        Self::new(None)
    }
}

impl RouteProvider for SimulatedRouter {
    fn best_route(&self, price: f64) -> Option<RouteQuote> {
        if !price.is_finite() || price <= 0.0 {
            return None;
        }

        let mut rng = lock(&self.rng);
        let routed = price * (0.999 + rng.gen::<f64>() * 0.002);
        let latency_ms = (rng.gen::<f64>() * 40.0) as u32;
        Some(RouteQuote { price: routed, latency_ms })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_routes_stay_near_price() {
        let router = SimulatedRouter::new(Some(3));
        for _ in 0..50 {
            let route = router.best_route(4500.0).unwrap();
            assert!(route.price >= 4500.0 * 0.999 && route.price <= 4500.0 * 1.001);
            assert!(route.latency_ms < 40);
        }
    }

    #[test]
    fn test_no_route_for_bad_price() {
        let router = SimulatedRouter::default();
        assert!(router.best_route(0.0).is_none());
        assert!(router.best_route(f64::NAN).is_none());
    }
}
