//! Simulated Adapters
//!
//! Synthetic implementations of every port so the engine can run end to end
//! without a venue connection.

mod execution;
mod market_data;
mod news;
mod routing;

pub use execution::PaperExecution;
pub use market_data::{SimulatedMarketData, SimulationParams};
pub use news::StaticNewsFeed;
pub use routing::SimulatedRouter;

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::{Mutex, MutexGuard};

/// Seeded when reproducibility is wanted, from entropy otherwise
fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
