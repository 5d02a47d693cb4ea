// src/utils/clock.rs

use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{Interval, MissedTickBehavior, interval_at, Instant};

/// A source of periodic ticks.
///
/// The countdown asks the ticker for the next tick instead of reading the
/// wall clock, so tests can drive it without sleeping.
#[async_trait]
pub trait Ticker: Send {
    /// Resolves when the next tick is due.
    async fn tick(&mut self);
}

/// Real one-second ticker backed by `tokio::time::Interval`.
///
/// The interval is released when the ticker is dropped.
pub struct IntervalTicker {
    interval: Interval,
}

impl IntervalTicker {
    pub fn every(period: Duration) -> Self {
        // First tick one full period from now rather than immediately.
        let mut interval = interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { interval }
    }

    pub fn seconds() -> Self {
        Self::every(Duration::from_secs(1))
    }
}

#[async_trait]
impl Ticker for IntervalTicker {
    async fn tick(&mut self) {
        self.interval.tick().await;
    }
}

/// Ticker that fires immediately and counts how often it was polled.
#[derive(Debug, Default)]
pub struct ImmediateTicker {
    pub ticks: u64,
}

#[async_trait]
impl Ticker for ImmediateTicker {
    async fn tick(&mut self) {
        self.ticks += 1;
        tokio::task::yield_now().await;
    }
}
