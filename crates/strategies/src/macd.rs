// In crates/strategies/src/macd.rs

use crate::indicators::IndicatorEngine;
use crate::types::{IndicatorSettings, MacdSettings};
use crate::{vote, DecisionProvider};
use async_trait::async_trait;
use core_types::{Decision, Error, PriceSeries, Result, Signal};
use ta::indicators::MovingAverageConvergenceDivergence as MacdIndicator;
use ta::Next;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MacdReading {
    pub signal: Signal,
    pub macd: f64,
    pub signal_line: f64,
}

/// Signals MACD crossovers of its signal line.
///
/// A BUY is emitted only on the price where the MACD line moves from at or
/// below the signal line to above it; SELL is the mirror image.
#[derive(Debug)]
pub struct Macd {
    indicator: MacdIndicator,
    previous: Option<(f64, f64)>,
}

impl Macd {
    pub fn new(settings: &MacdSettings) -> Result<Self> {
        let indicator = MacdIndicator::new(settings.fast_period, settings.slow_period, settings.signal_period)
            .map_err(|e| {
                Error::Computation(format!(
                    "invalid MACD periods {}/{}/{}: {:?}",
                    settings.fast_period, settings.slow_period, settings.signal_period, e
                ))
            })?;
        Ok(Self {
            indicator,
            previous: None,
        })
    }

    pub fn next(&mut self, price: f64) -> MacdReading {
        let output = self.indicator.next(price);
        let (macd, signal_line) = (output.macd, output.signal);

        let signal = match self.previous {
            Some((prev_macd, prev_signal)) if prev_macd <= prev_signal && macd > signal_line => Signal::Buy,
            Some((prev_macd, prev_signal)) if prev_macd >= prev_signal && macd < signal_line => Signal::Sell,
            _ => Signal::Hold,
        };
        self.previous = Some((macd, signal_line));

        MacdReading {
            signal,
            macd,
            signal_line,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MacdProvider {
    settings: MacdSettings,
    engine: IndicatorEngine,
}

impl MacdProvider {
    pub fn new(settings: MacdSettings, indicator_settings: IndicatorSettings) -> Self {
        Self {
            settings,
            engine: IndicatorEngine::new(indicator_settings),
        }
    }
}

#[async_trait]
impl DecisionProvider for MacdProvider {
    fn name(&self) -> &'static str {
        "macd"
    }

    async fn assess(&self, series: &PriceSeries) -> Result<Decision> {
        let snapshot = self.engine.compute(&series.history, series.current_price)?;

        let mut strategy = Macd::new(&self.settings)?;
        let reading = series
            .prices()
            .map(|price| strategy.next(price))
            .last()
            .ok_or_else(|| Error::Computation("empty price series".to_string()))?;

        let reasoning = match reading.signal {
            Signal::Buy => format!(
                "bullish MACD crossover ({:.2} above signal {:.2})",
                reading.macd, reading.signal_line
            ),
            Signal::Sell => format!(
                "bearish MACD crossover ({:.2} below signal {:.2})",
                reading.macd, reading.signal_line
            ),
            Signal::Hold => format!(
                "no MACD crossover (MACD {:.2}, signal {:.2})",
                reading.macd, reading.signal_line
            ),
        };

        Ok(vote(reading.signal, self.settings.confidence, reasoning, snapshot))
    }
}
