// In crates/strategies/src/market_cycle.rs

use crate::indicators::{population_std_dev, round2, simple_moving_average, trailing};
use crate::types::MarketCycleSettings;
use core_types::{Error, Result};
use serde::Serialize;

const TREND_SHORT_WINDOW: usize = 7;
const TREND_LONG_WINDOW: usize = 30;
const RECENT_WINDOW: usize = 3;

/// The market phase a price history is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MarketCycle {
    /// Sideways and quiet.
    Accumulation,
    Markup,
    BullMarket,
    Decline,
    Crash,
    /// Too little history to tell.
    Unknown,
}

/// The measurements behind a classification, in percent and rounded to two
/// decimal places.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CycleMetrics {
    /// Change over the look-back window.
    pub momentum_pct: f64,
    /// Standard deviation of per-step returns.
    pub volatility_pct: f64,
    /// Short SMA relative to long SMA.
    pub trend_pct: f64,
    /// Change over the last three prices.
    pub recent_change_pct: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CycleReading {
    pub cycle: MarketCycle,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<CycleMetrics>,
}

#[derive(Debug, Clone, Default)]
pub struct MarketCycleDetector {
    settings: MarketCycleSettings,
}

impl MarketCycleDetector {
    pub fn new(settings: MarketCycleSettings) -> Self {
        Self { settings }
    }

    /// Classifies `prices` (oldest first).
    ///
    /// Histories shorter than the configured window are `Unknown`. Prices that
    /// are not strictly positive make returns undefined and are rejected.
    pub fn detect(&self, prices: &[f64]) -> Result<CycleReading> {
        let window = self.settings.window.max(2);
        if prices.len() < window {
            tracing::warn!(required = window, actual = prices.len(), "Not enough history to detect the market cycle.");
            return Ok(CycleReading {
                cycle: MarketCycle::Unknown,
                metrics: None,
            });
        }
        if let Some(price) = prices.iter().find(|p| !p.is_finite() || **p <= 0.0) {
            return Err(Error::Computation(format!("market cycle needs positive prices, got {}", price)));
        }

        let momentum = percent_change(trailing(prices, window));
        let returns: Vec<f64> = prices.windows(2).map(|w| (w[1] - w[0]) / w[0]).collect();
        let volatility = population_std_dev(&returns)?;
        let short = simple_moving_average(trailing(prices, TREND_SHORT_WINDOW))?;
        let long = simple_moving_average(trailing(prices, TREND_LONG_WINDOW))?;
        let trend = (short - long) / long * 100.0;
        let recent_change = percent_change(trailing(prices, RECENT_WINDOW));

        let cycle = self.classify(momentum, volatility, trend, recent_change);
        let metrics = CycleMetrics {
            momentum_pct: round2(momentum)?,
            volatility_pct: round2(volatility * 100.0)?,
            trend_pct: round2(trend)?,
            recent_change_pct: round2(recent_change)?,
        };
        tracing::info!(?cycle, ?metrics, "Market cycle detected.");

        Ok(CycleReading {
            cycle,
            metrics: Some(metrics),
        })
    }

    /// First matching phase wins; anything unclear is treated as accumulation.
    fn classify(&self, momentum: f64, volatility: f64, trend: f64, recent_change: f64) -> MarketCycle {
        let s = &self.settings;
        if recent_change < s.crash_threshold_pct && volatility > s.volatility_high {
            MarketCycle::Crash
        } else if momentum > s.bull_threshold_pct && trend > 5.0 && volatility < s.volatility_high {
            MarketCycle::BullMarket
        } else if momentum > 5.0 && trend > 2.0 {
            MarketCycle::Markup
        } else if momentum < -5.0 && trend < -2.0 {
            MarketCycle::Decline
        } else {
            MarketCycle::Accumulation
        }
    }
}

/// Percentage change from the first to the last price of `window`.
fn percent_change(window: &[f64]) -> f64 {
    match (window.first(), window.last()) {
        (Some(first), Some(last)) => (last - first) / first * 100.0,
        _ => 0.0,
    }
}
