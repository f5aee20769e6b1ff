// In crates/strategies/src/lib.rs

use async_trait::async_trait;
use core_types::{Decision, IndicatorSnapshot, PriceSeries, Result, Signal};

pub mod composite;
pub mod ema_rsi;
pub mod indicators;
pub mod macd;
pub mod market_cycle;
pub mod rule_based;
pub mod types;

pub use composite::{CompositeProvider, WeightedProvider};
pub use ema_rsi::EmaRsiProvider;
pub use indicators::{compute, IndicatorEngine};
pub use macd::MacdProvider;
pub use market_cycle::{CycleReading, MarketCycle, MarketCycleDetector};
pub use rule_based::{RuleBasedProvider, SignalDecider};
pub use types::{
    CompositeMember, CompositeSettings, EmaRsiSettings, IndicatorSettings, MacdSettings, MarketCycleSettings,
    RuleSettings,
};

/// Confidence attached to a HOLD vote from a single-indicator strategy.
pub const NEUTRAL_CONFIDENCE: f64 = 50.0;

/// The universal interface for anything that can turn a price series into a `Decision`.
///
/// Implementations must be stateless between calls: the same series always yields
/// the same decision for the deterministic provider, and no provider may keep
/// mutable state that leaks from one invocation into the next.
#[async_trait]
pub trait DecisionProvider: Send + Sync {
    /// The name of the provider, as used in configuration.
    fn name(&self) -> &'static str;

    /// Produces a decision for the given series.
    ///
    /// Errors are returned rather than folded into a fallback decision; the
    /// pipeline boundary is responsible for that conversion.
    async fn assess(&self, series: &PriceSeries) -> Result<Decision>;
}

/// Turns a strategy's vote into a decision carrying the indicator snapshot.
pub(crate) fn vote(signal: Signal, confidence: f64, reasoning: String, snapshot: IndicatorSnapshot) -> Decision {
    let confidence = match signal {
        Signal::Hold => NEUTRAL_CONFIDENCE,
        _ => confidence.clamp(0.0, 100.0),
    };
    Decision {
        signal,
        confidence,
        reasoning,
        indicators: Some(snapshot),
        error: None,
    }
}
