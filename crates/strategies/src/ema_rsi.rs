// In crates/strategies/src/ema_rsi.rs

use crate::indicators::IndicatorEngine;
use crate::types::{EmaRsiSettings, IndicatorSettings};
use crate::{vote, DecisionProvider};
use async_trait::async_trait;
use core_types::{Decision, Error, PriceSeries, Result, Signal};
use ta::indicators::{ExponentialMovingAverage as Ema, RelativeStrengthIndex as Rsi};
use ta::Next;

/// The state of the EMA + RSI strategy after one price.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmaRsiReading {
    pub signal: Signal,
    pub price: f64,
    pub ema: f64,
    pub rsi: f64,
    /// False until enough prices have been seen for both indicators.
    pub warmed_up: bool,
}

/// Stateful EMA trend filter combined with RSI bands.
///
/// BUY when the price is above its EMA while RSI is oversold, SELL when it is
/// below its EMA while RSI is overbought, otherwise HOLD.
#[derive(Debug)]
pub struct EmaRsi {
    settings: EmaRsiSettings,
    ema: Ema,
    rsi: Rsi,
    seen: usize,
}

impl EmaRsi {
    pub fn new(settings: EmaRsiSettings) -> Result<Self> {
        let ema = Ema::new(settings.ema_period)
            .map_err(|e| Error::Computation(format!("invalid EMA period {}: {:?}", settings.ema_period, e)))?;
        let rsi = Rsi::new(settings.rsi_period)
            .map_err(|e| Error::Computation(format!("invalid RSI period {}: {:?}", settings.rsi_period, e)))?;
        Ok(Self {
            settings,
            ema,
            rsi,
            seen: 0,
        })
    }

    /// Prices needed before a signal other than HOLD can be produced.
    pub fn warmup(&self) -> usize {
        self.settings.ema_period.max(self.settings.rsi_period + 1)
    }

    pub fn next(&mut self, price: f64) -> EmaRsiReading {
        self.seen += 1;
        let ema = self.ema.next(price);
        let rsi = self.rsi.next(price);
        let warmed_up = self.seen >= self.warmup();

        let signal = if !warmed_up {
            Signal::Hold
        } else if price > ema && rsi < self.settings.rsi_oversold {
            Signal::Buy
        } else if price < ema && rsi > self.settings.rsi_overbought {
            Signal::Sell
        } else {
            Signal::Hold
        };

        EmaRsiReading {
            signal,
            price,
            ema,
            rsi,
            warmed_up,
        }
    }
}

/// Replays a whole `PriceSeries` through a fresh `EmaRsi` and votes on the last price.
#[derive(Debug, Clone, Default)]
pub struct EmaRsiProvider {
    settings: EmaRsiSettings,
    engine: IndicatorEngine,
}

impl EmaRsiProvider {
    pub fn new(settings: EmaRsiSettings, indicator_settings: IndicatorSettings) -> Self {
        Self {
            settings,
            engine: IndicatorEngine::new(indicator_settings),
        }
    }
}

#[async_trait]
impl DecisionProvider for EmaRsiProvider {
    fn name(&self) -> &'static str {
        "ema_rsi"
    }

    async fn assess(&self, series: &PriceSeries) -> Result<Decision> {
        let snapshot = self.engine.compute(&series.history, series.current_price)?;

        let mut strategy = EmaRsi::new(self.settings.clone())?;
        let reading = series
            .prices()
            .map(|price| strategy.next(price))
            .last()
            .ok_or_else(|| Error::Computation("empty price series".to_string()))?;

        let reasoning = match reading.signal {
            _ if !reading.warmed_up => format!(
                "EMA/RSI warming up ({} of {} prices)",
                series.len() + 1,
                strategy.warmup()
            ),
            Signal::Buy => format!(
                "price {:.2} above EMA {:.2} with RSI {:.2} oversold",
                reading.price, reading.ema, reading.rsi
            ),
            Signal::Sell => format!(
                "price {:.2} below EMA {:.2} with RSI {:.2} overbought",
                reading.price, reading.ema, reading.rsi
            ),
            Signal::Hold => format!("no EMA/RSI setup (EMA {:.2}, RSI {:.2})", reading.ema, reading.rsi),
        };

        tracing::debug!(ema = reading.ema, rsi = reading.rsi, signal = %reading.signal, "EMA/RSI assessed.");
        Ok(vote(reading.signal, self.settings.confidence, reasoning, snapshot))
    }
}
