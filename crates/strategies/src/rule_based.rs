// In crates/strategies/src/rule_based.rs

use crate::indicators::IndicatorEngine;
use crate::types::{IndicatorSettings, RuleSettings};
use crate::DecisionProvider;
use async_trait::async_trait;
use core_types::{Decision, IndicatorSnapshot, PriceSeries, Result, Signal};

pub const NEUTRAL_REASONING: &str = "neutral market conditions";
pub const INSUFFICIENT_DATA_REASONING: &str = "insufficient data for analysis";

/// Scores an `IndicatorSnapshot` with a fixed cascade of four rules.
///
/// Each rule may set or override the signal and add to a running confidence:
/// 1. Trend: price against both moving averages.
/// 2. RSI: oversold/overbought, which can only move off `HOLD` or reinforce
///    the current direction, never flip it.
/// 3. Momentum: a large price change in the direction of the signal.
/// 4. Cross: the short average relative to the long one.
#[derive(Debug, Clone, Default)]
pub struct SignalDecider {
    settings: RuleSettings,
}

impl SignalDecider {
    pub fn new(settings: RuleSettings) -> Self {
        Self { settings }
    }

    pub fn decide(&self, snapshot: &IndicatorSnapshot) -> Decision {
        let s = &self.settings;
        let mut signal = Signal::Hold;
        let mut confidence = s.base_confidence;
        let mut reasons: Vec<String> = Vec::new();

        // 1. Trend
        if snapshot.price_above_short && snapshot.price_above_long {
            signal = Signal::Buy;
            confidence += s.trend_weight;
            reasons.push(format!(
                "price {:.2} above both moving averages ({:.2} / {:.2})",
                snapshot.current_price, snapshot.sma_short, snapshot.sma_long
            ));
        } else if snapshot.current_price < snapshot.sma_short && snapshot.current_price < snapshot.sma_long {
            signal = Signal::Sell;
            confidence += s.trend_weight;
            reasons.push(format!(
                "price {:.2} below both moving averages ({:.2} / {:.2})",
                snapshot.current_price, snapshot.sma_short, snapshot.sma_long
            ));
        }

        // 2. RSI
        if snapshot.rsi < s.rsi_oversold && signal != Signal::Sell {
            signal = Signal::Buy;
            confidence += s.rsi_weight;
            reasons.push(format!("RSI {:.2} indicates oversold", snapshot.rsi));
        } else if snapshot.rsi > s.rsi_overbought && signal != Signal::Buy {
            signal = Signal::Sell;
            confidence += s.rsi_weight;
            reasons.push(format!("RSI {:.2} indicates overbought", snapshot.rsi));
        }

        // 3. Momentum
        if snapshot.price_change_pct > s.momentum_threshold_pct && signal == Signal::Buy {
            confidence += s.momentum_weight;
            reasons.push(format!("strong upward momentum ({:+.2}%)", snapshot.price_change_pct));
        } else if snapshot.price_change_pct < -s.momentum_threshold_pct && signal == Signal::Sell {
            confidence += s.momentum_weight;
            reasons.push(format!("strong downward momentum ({:+.2}%)", snapshot.price_change_pct));
        }

        // 4. Cross
        if snapshot.sma_short > snapshot.sma_long && signal == Signal::Buy {
            confidence += s.cross_weight;
            reasons.push("golden cross (short average above long)".to_string());
        } else if signal == Signal::Sell {
            confidence += s.cross_weight;
            reasons.push("death cross confirmation".to_string());
        }

        let reasoning = if reasons.is_empty() {
            NEUTRAL_REASONING.to_string()
        } else {
            reasons.join(" | ")
        };

        Decision {
            signal,
            confidence: confidence.clamp(0.0, 100.0),
            reasoning,
            indicators: Some(*snapshot),
            error: None,
        }
    }

    /// Decides on the outcome of an indicator computation, short-circuiting
    /// any upstream error to a zero-confidence `HOLD`.
    pub fn decide_from(&self, snapshot: Result<IndicatorSnapshot>) -> Decision {
        match snapshot {
            Ok(snapshot) => self.decide(&snapshot),
            Err(e) => Decision::fallback(INSUFFICIENT_DATA_REASONING, e.to_string()),
        }
    }
}

/// The deterministic provider: `IndicatorEngine` followed by `SignalDecider`.
#[derive(Debug, Clone, Default)]
pub struct RuleBasedProvider {
    engine: IndicatorEngine,
    decider: SignalDecider,
}

impl RuleBasedProvider {
    pub fn new(indicator_settings: IndicatorSettings, rule_settings: RuleSettings) -> Self {
        Self {
            engine: IndicatorEngine::new(indicator_settings),
            decider: SignalDecider::new(rule_settings),
        }
    }

    /// Runs the full pipeline synchronously and always returns a decision.
    pub fn evaluate(&self, series: &PriceSeries) -> Decision {
        self.decider
            .decide_from(self.engine.compute(&series.history, series.current_price))
    }
}

#[async_trait]
impl DecisionProvider for RuleBasedProvider {
    fn name(&self) -> &'static str {
        "rules"
    }

    async fn assess(&self, series: &PriceSeries) -> Result<Decision> {
        let snapshot = self.engine.compute(&series.history, series.current_price)?;
        Ok(self.decider.decide(&snapshot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::compute;
    use core_types::Error;

    fn snapshot(current_price: f64, sma_short: f64, sma_long: f64, rsi: f64, change: f64) -> IndicatorSnapshot {
        IndicatorSnapshot {
            current_price,
            sma_short,
            sma_long,
            price_change_pct: change,
            volatility: 1.0,
            rsi,
            price_above_short: current_price > sma_short,
            price_above_long: current_price > sma_long,
        }
    }

    fn decide(s: IndicatorSnapshot) -> Decision {
        SignalDecider::default().decide(&s)
    }

    #[test]
    fn test_reference_scenario_is_buy_at_65() {
        let snapshot = compute(&[100.0, 102.0, 101.0, 105.0, 110.0], 111.0).unwrap();
        let decision = decide(snapshot);
        assert_eq!(decision.signal, Signal::Buy);
        assert_eq!(decision.confidence, 65.0);
        assert!(decision.reasoning.contains("above both moving averages"));
        assert!(!decision.reasoning.contains('|'));
        assert_eq!(decision.indicators, Some(snapshot));
        assert_eq!(decision.error, None);
    }

    #[test]
    fn test_neutral_conditions() {
        let decision = decide(snapshot(100.0, 100.0, 100.0, 50.0, 0.0));
        assert_eq!(decision.signal, Signal::Hold);
        assert_eq!(decision.confidence, 50.0);
        assert_eq!(decision.reasoning, NEUTRAL_REASONING);
    }

    #[test]
    fn test_full_bullish_cascade() {
        // Every rule fires: an oversold RSI reinforces an existing BUY.
        let decision = decide(snapshot(120.0, 110.0, 100.0, 25.0, 3.0));
        assert_eq!(decision.signal, Signal::Buy);
        assert_eq!(decision.confidence, 50.0 + 15.0 + 10.0 + 10.0 + 5.0);
        let parts: Vec<&str> = decision.reasoning.split(" | ").collect();
        assert_eq!(parts.len(), 4);
        assert!(parts[0].contains("above both"));
        assert!(parts[1].contains("oversold"));
        assert!(parts[2].contains("strong upward momentum"));
        assert!(parts[3].contains("golden cross"));
    }

    #[test]
    fn test_full_bearish_cascade() {
        let decision = decide(snapshot(80.0, 90.0, 100.0, 75.0, -3.0));
        assert_eq!(decision.signal, Signal::Sell);
        assert_eq!(decision.confidence, 90.0);
        let parts: Vec<&str> = decision.reasoning.split(" | ").collect();
        assert_eq!(parts.len(), 4);
        assert!(parts[1].contains("overbought"));
        assert!(parts[2].contains("strong downward momentum"));
        assert!(parts[3].contains("death cross"));
    }

    #[test]
    fn test_rsi_never_flips_direction() {
        // Bullish trend with an overbought RSI stays BUY and gains nothing from RSI.
        let decision = decide(snapshot(120.0, 110.0, 110.0, 85.0, 0.5));
        assert_eq!(decision.signal, Signal::Buy);
        assert_eq!(decision.confidence, 65.0);
        assert!(!decision.reasoning.contains("overbought"));

        // Bearish trend with an oversold RSI stays SELL.
        let decision = decide(snapshot(90.0, 100.0, 100.0, 10.0, -0.5));
        assert_eq!(decision.signal, Signal::Sell);
        assert!(!decision.reasoning.contains("oversold"));
    }

    #[test]
    fn test_rsi_moves_off_hold() {
        let decision = decide(snapshot(100.0, 100.0, 100.0, 80.0, 0.0));
        assert_eq!(decision.signal, Signal::Sell);
        // RSI +10 and the death-cross confirmation +5.
        assert_eq!(decision.confidence, 65.0);
    }

    #[test]
    fn test_momentum_against_signal_is_ignored() {
        let decision = decide(snapshot(120.0, 110.0, 110.0, 50.0, -5.0));
        assert_eq!(decision.signal, Signal::Buy);
        assert_eq!(decision.confidence, 65.0);
        assert!(!decision.reasoning.contains("momentum"));
    }

    #[test]
    fn test_oversold_rsi_overrides_hold_trend() {
        // A steady decline of 60 points: the short average sits below the long one,
        // and a current price between them leaves the trend test at HOLD.
        let history: Vec<f64> = (0..60).map(|i| 160.0 - i as f64).collect();
        let snapshot = compute(&history, 115.0).unwrap();
        assert_eq!(snapshot.sma_short, 110.5);
        assert_eq!(snapshot.sma_long, 125.5);
        assert!(snapshot.rsi < 30.0);

        let decision = decide(snapshot);
        assert_eq!(decision.signal, Signal::Buy);
        assert!(decision.reasoning.starts_with("RSI"));
        assert!(decision.reasoning.contains("strong upward momentum"));
        assert!(!decision.reasoning.contains("golden cross"));
        assert_eq!(decision.confidence, 70.0);
    }

    #[test]
    fn test_confidence_is_clamped() {
        let decider = SignalDecider::new(RuleSettings {
            base_confidence: 95.0,
            ..RuleSettings::default()
        });
        let decision = decider.decide(&snapshot(120.0, 110.0, 100.0, 50.0, 3.0));
        assert_eq!(decision.confidence, 100.0);

        let decider = SignalDecider::new(RuleSettings {
            base_confidence: -40.0,
            ..RuleSettings::default()
        });
        let decision = decider.decide(&snapshot(100.0, 100.0, 100.0, 50.0, 0.0));
        assert_eq!(decision.confidence, 0.0);
    }

    #[test]
    fn test_upstream_error_short_circuits() {
        let decision = SignalDecider::default()
            .decide_from(Err(Error::InsufficientData { required: 2, actual: 1 }));
        assert_eq!(decision.signal, Signal::Hold);
        assert_eq!(decision.confidence, 0.0);
        assert_eq!(decision.reasoning, INSUFFICIENT_DATA_REASONING);
        assert_eq!(decision.indicators, None);
        assert!(!decision.error.unwrap().is_empty());
    }

    #[test]
    fn test_evaluate_is_idempotent() {
        let provider = RuleBasedProvider::default();
        let series = PriceSeries::new(98.0, vec![100.0, 101.0, 99.5, 102.0, 100.5, 99.0]);
        assert_eq!(provider.evaluate(&series), provider.evaluate(&series));
    }

    #[tokio::test]
    async fn test_assess_propagates_errors() {
        let provider = RuleBasedProvider::default();
        let result = provider.assess(&PriceSeries::new(100.0, vec![100.0])).await;
        assert!(matches!(result, Err(Error::InsufficientData { .. })));

        let decision = provider
            .assess(&PriceSeries::new(111.0, vec![100.0, 102.0, 101.0, 105.0, 110.0]))
            .await
            .unwrap();
        assert_eq!(decision.signal, Signal::Buy);
    }
}
