use crate::error::ForecastError;
use crate::history::{CountHistory, DEFAULT_HISTORY_CAPACITY};
use std::time::{Duration, Instant};

/// An external time-series engine predicting future counts
pub trait Forecaster {
    /// Predicts `steps` future counts from `history`, oldest first
    fn forecast(&self, history: &[u32], steps: usize) -> Result<Vec<f32>, ForecastError>;
}

impl<F: Forecaster + ?Sized> Forecaster for &F {
    fn forecast(&self, history: &[u32], steps: usize) -> Result<Vec<f32>, ForecastError> {
        (**self).forecast(history, steps)
    }
}

/// Decides when a stream's history is ripe for a forecast.
///
/// A forecast needs a full window of counts and is rate limited to one per
/// `interval`.
#[derive(Debug, Clone)]
pub struct ForecastGate {
    window: usize,
    steps: usize,
    interval: Duration,
    last: Option<Instant>,
}

impl Default for ForecastGate {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY, 10, Duration::from_secs(1))
    }
}

impl ForecastGate {
    pub fn new(window: usize, steps: usize, interval: Duration) -> Self {
        Self {
            window: window.max(1),
            steps,
            interval,
            last: None,
        }
    }

    pub fn is_ready(&self, history: &CountHistory, now: Instant) -> bool {
        if history.len() < self.window {
            return false;
        }
        match self.last {
            Some(last) => now.saturating_duration_since(last) >= self.interval,
            None => true,
        }
    }

    /// Runs `forecaster` over the newest `window` counts when the gate is open.
    ///
    /// A failed forecast still closes the gate for one interval, so a broken
    /// engine is not retried on every frame.
    pub fn maybe_forecast<F: Forecaster + ?Sized>(
        &mut self,
        forecaster: &F,
        history: &CountHistory,
        now: Instant,
    ) -> Option<Result<Vec<f32>, ForecastError>> {
        if !self.is_ready(history, now) {
            return None;
        }
        self.last = Some(now);
        Some(forecaster.forecast(&history.latest(self.window), self.steps))
    }
}
