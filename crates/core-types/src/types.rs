// In crates/core-types/src/types.rs

use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::Error;

/// The smallest history the pipeline will analyze.
pub const MIN_HISTORY_LEN: usize = 2;

/// The categorical recommendation emitted by a decision provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Signal {
    Buy,
    Sell,
    #[default]
    Hold,
}

impl Signal {
    /// Parses a signal from free text. Anything that is not `BUY` or `SELL`
    /// (case-insensitive) is treated as `HOLD`.
    pub fn parse_lenient(text: &str) -> Self {
        match text.trim().to_ascii_uppercase().as_str() {
            "BUY" => Signal::Buy,
            "SELL" => Signal::Sell,
            _ => Signal::Hold,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Signal::Buy => "BUY",
            Signal::Sell => "SELL",
            Signal::Hold => "HOLD",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A chronological price history (oldest first) plus the latest observation,
/// which is not yet part of the history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    pub history: Vec<f64>,
    pub current_price: f64,
}

impl PriceSeries {
    pub fn new(current_price: f64, history: Vec<f64>) -> Self {
        Self { history, current_price }
    }

    /// Every observation in order, the current price last.
    pub fn prices(&self) -> impl Iterator<Item = f64> + '_ {
        self.history.iter().copied().chain(std::iter::once(self.current_price))
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Fails with `InsufficientData` when the history is too short to analyze.
    pub fn ensure_analyzable(&self) -> Result<(), Error> {
        if self.history.len() < MIN_HISTORY_LEN {
            return Err(Error::InsufficientData {
                required: MIN_HISTORY_LEN,
                actual: self.history.len(),
            });
        }
        Ok(())
    }
}

/// The derived statistics for one invocation. Numeric fields are rounded to
/// two decimal places.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub current_price: f64,
    #[serde(alias = "sma_20")]
    pub sma_short: f64,
    #[serde(alias = "sma_50")]
    pub sma_long: f64,
    pub price_change_pct: f64,
    pub volatility: f64,
    pub rsi: f64,
    #[serde(alias = "price_above_sma20")]
    pub price_above_short: bool,
    #[serde(alias = "price_above_sma50")]
    pub price_above_long: bool,
}

/// The sole output of the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub signal: Signal,
    pub confidence: f64,
    #[serde(default)]
    pub reasoning: String,
    /// Serialized as `{}` when no snapshot is available.
    #[serde(
        default,
        serialize_with = "serialize_indicators",
        deserialize_with = "deserialize_indicators_lenient"
    )]
    pub indicators: Option<IndicatorSnapshot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Decision {
    /// The safe decision emitted whenever the pipeline cannot produce a real one.
    pub fn fallback(reasoning: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            signal: Signal::Hold,
            confidence: 0.0,
            reasoning: reasoning.into(),
            indicators: None,
            error: Some(error.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

fn serialize_indicators<S>(value: &Option<IndicatorSnapshot>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(snapshot) => snapshot.serialize(serializer),
        None => serializer.serialize_map(Some(0))?.end(),
    }
}

/// Accepts `null`, `{}` or a partial object and yields `None` for anything
/// that is not a complete snapshot.
pub fn deserialize_indicators_lenient<'de, D>(deserializer: D) -> Result<Option<IndicatorSnapshot>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}
