// In crates/strategies/src/types.rs

use serde::{Deserialize, Serialize};

/// Window lengths used by the `IndicatorEngine`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct IndicatorSettings {
    /// Trailing window for `sma_short` and `volatility`.
    pub short_window: usize,
    /// Trailing window for `sma_long`. Histories shorter than this reuse `sma_short`.
    pub long_window: usize,
    /// Maximum number of trailing price changes fed into the RSI.
    pub rsi_period: usize,
}

impl Default for IndicatorSettings {
    fn default() -> Self {
        Self {
            short_window: 20,
            long_window: 50,
            rsi_period: 14,
        }
    }
}

/// Thresholds and confidence weights for the rule cascade.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct RuleSettings {
    /// The confidence every evaluation starts from.
    pub base_confidence: f64,
    pub trend_weight: f64,
    pub rsi_weight: f64,
    pub momentum_weight: f64,
    pub cross_weight: f64,
    pub rsi_oversold: f64,
    pub rsi_overbought: f64,
    /// Absolute percentage change that counts as strong momentum.
    pub momentum_threshold_pct: f64,
}

impl Default for RuleSettings {
    fn default() -> Self {
        Self {
            base_confidence: 50.0,
            trend_weight: 15.0,
            rsi_weight: 10.0,
            momentum_weight: 10.0,
            cross_weight: 5.0,
            rsi_oversold: 30.0,
            rsi_overbought: 70.0,
            momentum_threshold_pct: 2.0,
        }
    }
}

/// Parameters for the EMA trend + RSI band strategy.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct EmaRsiSettings {
    pub ema_period: usize,
    pub rsi_period: usize,
    pub rsi_oversold: f64,
    pub rsi_overbought: f64,
    /// The confidence attached to a BUY or SELL from this strategy.
    pub confidence: f64,
}

impl Default for EmaRsiSettings {
    fn default() -> Self {
        Self {
            ema_period: 20,
            rsi_period: 14,
            rsi_oversold: 30.0,
            rsi_overbought: 70.0,
            confidence: 70.0,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct MacdSettings {
    pub fast_period: usize,
    pub slow_period: usize,
    pub signal_period: usize,
    pub confidence: f64,
}

impl Default for MacdSettings {
    fn default() -> Self {
        Self {
            fast_period: 12,
            slow_period: 26,
            signal_period: 9,
            confidence: 70.0,
        }
    }
}

/// One voter in the composite strategy. Weights are percentages.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CompositeMember {
    pub name: String,
    pub weight: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct CompositeSettings {
    pub members: Vec<CompositeMember>,
    /// A weighted score at or above this is a BUY.
    pub buy_threshold: f64,
    /// A weighted score at or below this is a SELL.
    pub sell_threshold: f64,
}

impl Default for CompositeSettings {
    fn default() -> Self {
        let member = |name: &str, weight: f64| CompositeMember {
            name: name.to_string(),
            weight,
        };
        Self {
            members: vec![member("ema_rsi", 40.0), member("macd", 30.0), member("rules", 30.0)],
            buy_threshold: 0.5,
            sell_threshold: -0.5,
        }
    }
}

/// Thresholds for classifying the market phase.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct MarketCycleSettings {
    /// Minimum number of prices, and the momentum look-back.
    pub window: usize,
    /// Three-point change (percent) below which a volatile market is crashing.
    pub crash_threshold_pct: f64,
    /// Momentum (percent) above which a calm uptrend is a bull market.
    pub bull_threshold_pct: f64,
    /// Standard deviation of per-step returns, as a fraction, that marks a
    /// turbulent market.
    pub volatility_high: f64,
}

impl Default for MarketCycleSettings {
    fn default() -> Self {
        Self {
            window: 30,
            crash_threshold_pct: -10.0,
            bull_threshold_pct: 20.0,
            volatility_high: 0.05,
        }
    }
}
