// In crates/strategies/src/composite.rs

use crate::indicators::{round2, IndicatorEngine};
use crate::types::IndicatorSettings;
use crate::{DecisionProvider, NEUTRAL_CONFIDENCE};
use async_trait::async_trait;
use core_types::{Decision, PriceSeries, Result, Signal};

/// A member provider and its voting weight, in percent.
pub struct WeightedProvider {
    pub provider: Box<dyn DecisionProvider>,
    pub weight: f64,
}

/// Combines several providers by weighted vote.
///
/// Each member scores +1 for BUY, -1 for SELL and 0 for HOLD, scaled by
/// `weight / 100`. The summed score is a BUY at or above `buy_threshold` and a
/// SELL at or below `sell_threshold`. A member that fails counts as HOLD.
pub struct CompositeProvider {
    members: Vec<WeightedProvider>,
    buy_threshold: f64,
    sell_threshold: f64,
    engine: IndicatorEngine,
}

impl CompositeProvider {
    pub fn new(
        members: Vec<WeightedProvider>,
        buy_threshold: f64,
        sell_threshold: f64,
        indicator_settings: IndicatorSettings,
    ) -> Self {
        let total: f64 = members.iter().map(|m| m.weight).sum();
        if (total - 100.0).abs() > 0.01 {
            tracing::warn!(total, "Composite weights do not sum to 100.");
        }
        Self {
            members,
            buy_threshold,
            sell_threshold,
            engine: IndicatorEngine::new(indicator_settings),
        }
    }
}

fn score(signal: Signal) -> f64 {
    match signal {
        Signal::Buy => 1.0,
        Signal::Sell => -1.0,
        Signal::Hold => 0.0,
    }
}

#[async_trait]
impl DecisionProvider for CompositeProvider {
    fn name(&self) -> &'static str {
        "composite"
    }

    async fn assess(&self, series: &PriceSeries) -> Result<Decision> {
        let snapshot = self.engine.compute(&series.history, series.current_price)?;

        let mut total = 0.0;
        let mut votes = Vec::with_capacity(self.members.len());
        for member in &self.members {
            let name = member.provider.name();
            let signal = match member.provider.assess(series).await {
                Ok(decision) => decision.signal,
                Err(e) => {
                    tracing::warn!(member = name, error = %e, "Composite member failed, counting it as HOLD.");
                    Signal::Hold
                }
            };
            total += score(signal) * member.weight / 100.0;
            votes.push(format!("{} {} ({:.0}%)", name, signal, member.weight));
        }

        let signal = if total >= self.buy_threshold {
            Signal::Buy
        } else if total <= self.sell_threshold {
            Signal::Sell
        } else {
            Signal::Hold
        };
        let confidence = match signal {
            Signal::Hold => NEUTRAL_CONFIDENCE,
            _ => round2((total.abs() * 100.0).min(100.0))?,
        };

        tracing::info!(score = total, signal = %signal, "Composite vote counted.");
        Ok(Decision {
            signal,
            confidence,
            reasoning: format!("weighted score {:+.2}: {}", total, votes.join(", ")),
            indicators: Some(snapshot),
            error: None,
        })
    }
}
