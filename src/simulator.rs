//! Synthetic internal readings.
//!
//! The simulator keeps the dashboard populated while no physical sensor is
//! reporting. Its output is generated, not measured.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::error::Result;
use crate::ingest::IngestionService;
use crate::models::Reading;

/// Distribution a synthetic reading is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// Hot factory floor: 28–38 °C, 40–65 % humidity.
    Factory,
    /// On-demand sample: 28–35 °C base ±1 °C jitter, 45–60 % humidity.
    Manual,
}

impl Profile {
    /// Draw `(temperature, humidity)`.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> (f64, f64) {
        match self {
            Profile::Factory => (
                rng.random_range(28.0..=38.0),
                rng.random_range(40.0..=65.0),
            ),
            Profile::Manual => {
                let base = rng.random_range(28.0..=35.0);
                let jitter = rng.random_range(-1.0..=1.0);
                (base + jitter, rng.random_range(45.0..=60.0))
            }
        }
    }
}

/// Generate one reading from `profile` and store it as internal.
pub async fn simulate_once(ingest: &IngestionService, profile: Profile) -> Result<Reading> {
    let (temperature, humidity) = profile.sample(&mut rand::rng());
    ingest.record_internal(temperature, humidity).await
}

/// Background task inserting a factory reading every `period`.
pub struct Simulator {
    ingest: Arc<IngestionService>,
    period: Duration,
}

impl Simulator {
    pub fn new(ingest: Arc<IngestionService>, period: Duration) -> Self {
        Self { ingest, period }
    }

    /// Spawn the loop. The first reading is produced one period after start.
    pub fn spawn(self) -> JoinHandle<()> {
        // ---
        info!("Starting simulator (interval: {}s)", self.period.as_secs());
        tokio::spawn(async move { self.run().await })
    }

    async fn run(self) {
        // ---
        let mut ticker = interval_at(Instant::now() + self.period, self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut consecutive_failures = 0u32;

        loop {
            ticker.tick().await;

            match simulate_once(&self.ingest, Profile::Factory).await {
                Ok(reading) => {
                    consecutive_failures = 0;
                    debug!(
                        "Simulated reading: {:.1}°C {:.1}% (apparent {:.1}°C)",
                        reading.temperature, reading.humidity, reading.apparent
                    );
                }
                Err(e) => {
                    consecutive_failures += 1;
                    if consecutive_failures <= 3 {
                        warn!("Simulator run failed: {} (attempt {})", e, consecutive_failures);
                    } else if consecutive_failures == 4 {
                        error!(
                            "Simulator failed {} times in a row, will keep trying quietly",
                            consecutive_failures
                        );
                    }
                }
            }
        }
    }
}
