// In crates/strategies/src/indicators.rs

use crate::types::IndicatorSettings;
use core_types::{Error, IndicatorSnapshot, Result, MIN_HISTORY_LEN};
use num_traits::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use ta::indicators::{SimpleMovingAverage as Sma, StandardDeviation};
use ta::Next;

/// Turns a raw price history into an `IndicatorSnapshot`.
///
/// The engine holds only its window settings, so a single instance can be
/// shared freely across threads and invocations.
#[derive(Debug, Clone, Default)]
pub struct IndicatorEngine {
    settings: IndicatorSettings,
}

/// Computes a snapshot with the default 20/50/14 windows.
pub fn compute(price_history: &[f64], current_price: f64) -> Result<IndicatorSnapshot> {
    IndicatorEngine::default().compute(price_history, current_price)
}

impl IndicatorEngine {
    pub fn new(settings: IndicatorSettings) -> Self {
        Self { settings }
    }

    pub fn compute(&self, price_history: &[f64], current_price: f64) -> Result<IndicatorSnapshot> {
        if price_history.len() < MIN_HISTORY_LEN {
            return Err(Error::InsufficientData {
                required: MIN_HISTORY_LEN,
                actual: price_history.len(),
            });
        }
        validate_prices(price_history, current_price)?;

        let short_window = trailing(price_history, self.settings.short_window);
        let sma_short = simple_moving_average(short_window)?;
        // Histories shorter than the long window reuse the short average.
        let sma_long = if price_history.len() >= self.settings.long_window {
            simple_moving_average(trailing(price_history, self.settings.long_window))?
        } else {
            sma_short
        };

        let last_price = price_history[price_history.len() - 1];
        if last_price == 0.0 {
            return Err(Error::Computation(
                "division by zero: last historical price is 0".to_string(),
            ));
        }
        let price_change_pct = (current_price - last_price) / last_price * 100.0;

        let volatility = population_std_dev(short_window)?;
        let rsi = relative_strength_index(price_history, self.settings.rsi_period);

        let sma_short = round2(sma_short)?;
        let sma_long = round2(sma_long)?;

        let snapshot = IndicatorSnapshot {
            current_price,
            sma_short,
            sma_long,
            price_change_pct: round2(price_change_pct)?,
            volatility: round2(volatility)?,
            rsi: round2(rsi)?,
            price_above_short: current_price > sma_short,
            price_above_long: current_price > sma_long,
        };

        tracing::debug!(
            points = price_history.len(),
            sma_short = snapshot.sma_short,
            sma_long = snapshot.sma_long,
            rsi = snapshot.rsi,
            volatility = snapshot.volatility,
            "Computed indicator snapshot."
        );

        Ok(snapshot)
    }
}

pub(crate) fn validate_prices(price_history: &[f64], current_price: f64) -> Result<()> {
    let is_valid = |p: f64| p.is_finite() && p >= 0.0;
    if !is_valid(current_price) {
        return Err(Error::Computation(format!("malformed current price: {}", current_price)));
    }
    if let Some((index, price)) = price_history.iter().enumerate().find(|(_, p)| !is_valid(**p)) {
        return Err(Error::Computation(format!(
            "malformed historical price at position {}: {}",
            index, price
        )));
    }
    Ok(())
}

/// The last `window` prices, or all of them if the history is shorter.
pub(crate) fn trailing(prices: &[f64], window: usize) -> &[f64] {
    &prices[prices.len().saturating_sub(window)..]
}

pub(crate) fn simple_moving_average(window: &[f64]) -> Result<f64> {
    let mut sma = Sma::new(window.len())
        .map_err(|e| Error::Computation(format!("invalid SMA window {}: {:?}", window.len(), e)))?;
    Ok(window.iter().fold(0.0, |_, price| sma.next(*price)))
}

/// Population standard deviation (divides by N).
pub(crate) fn population_std_dev(window: &[f64]) -> Result<f64> {
    let mut sd = StandardDeviation::new(window.len())
        .map_err(|e| Error::Computation(format!("invalid volatility window {}: {:?}", window.len(), e)))?;
    Ok(window.iter().fold(0.0, |_, price| sd.next(*price)))
}

/// Simple-average RSI over at most `period` trailing changes.
///
/// Flat periods count as neither gains nor losses, and a window without losses
/// yields RS = 0 (so RSI = 0).
fn relative_strength_index(prices: &[f64], period: usize) -> f64 {
    let changes: Vec<f64> = prices.windows(2).map(|w| w[1] - w[0]).collect();
    let recent = trailing(&changes, period);

    let gains: Vec<f64> = recent.iter().copied().filter(|c| *c > 0.0).collect();
    let losses: Vec<f64> = recent.iter().filter(|c| **c < 0.0).map(|c| c.abs()).collect();

    let avg_gain = mean(&gains);
    let avg_loss = mean(&losses);

    let rs = if avg_loss == 0.0 { 0.0 } else { avg_gain / avg_loss };
    100.0 - 100.0 / (1.0 + rs)
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Rounds the exact binary value of `value` to two decimal places, half to even.
///
/// Finite values beyond `Decimal`'s range carry no cents and come back unchanged.
pub(crate) fn round2(value: f64) -> Result<f64> {
    if !value.is_finite() {
        return Err(Error::Computation(format!("value out of range: {}", value)));
    }
    Ok(Decimal::from_f64_retain(value)
        .map(|d| d.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven))
        .and_then(|d| d.to_f64())
        .unwrap_or(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!((actual - expected).abs() < 1e-9, "{} != {}", actual, expected);
    }

    #[test]
    fn test_reference_scenario() {
        let snapshot = compute(&[100.0, 102.0, 101.0, 105.0, 110.0], 111.0).unwrap();
        assert_close(snapshot.sma_short, 103.6);
        assert_close(snapshot.sma_long, 103.6);
        assert_close(snapshot.price_change_pct, 0.91);
        assert_close(snapshot.volatility, 3.61);
        // gains 2, 4, 5 and a single loss of 1: RS = 11/3
        assert_close(snapshot.rsi, 78.57);
        assert!(snapshot.price_above_short);
        assert!(snapshot.price_above_long);
        assert_close(snapshot.current_price, 111.0);
    }

    #[test]
    fn test_insufficient_data() {
        assert_eq!(
            compute(&[], 100.0),
            Err(Error::InsufficientData { required: 2, actual: 0 })
        );
        assert_eq!(
            compute(&[100.0], 100.0),
            Err(Error::InsufficientData { required: 2, actual: 1 })
        );
    }

    #[test]
    fn test_zero_last_price_is_an_error() {
        let result = compute(&[5.0, 0.0], 1.0);
        assert!(matches!(result, Err(Error::Computation(msg)) if msg.contains("division by zero")));
    }

    #[test]
    fn test_malformed_prices_are_rejected() {
        assert!(matches!(compute(&[1.0, f64::NAN], 1.0), Err(Error::Computation(_))));
        assert!(matches!(compute(&[1.0, 2.0], f64::INFINITY), Err(Error::Computation(_))));
        assert!(matches!(compute(&[1.0, -2.0], 1.0), Err(Error::Computation(_))));
    }

    #[test]
    fn test_long_average_uses_trailing_fifty() {
        // 1..=60: the trailing 50 are 11..=60, the trailing 20 are 41..=60.
        let history: Vec<f64> = (1..=60).map(|i| i as f64).collect();
        let snapshot = compute(&history, 60.0).unwrap();
        assert_close(snapshot.sma_long, 35.5);
        assert_close(snapshot.sma_short, 50.5);
    }

    #[test]
    fn test_long_average_falls_back_below_fifty_points() {
        let history: Vec<f64> = (1..=49).map(|i| i as f64).collect();
        let snapshot = compute(&history, 10.0).unwrap();
        assert_eq!(snapshot.sma_long, snapshot.sma_short);
        assert_close(snapshot.sma_short, 39.5);
    }

    #[test]
    fn test_flat_prices_have_zero_volatility_and_rsi() {
        let snapshot = compute(&[42.0; 30], 42.0).unwrap();
        assert_eq!(snapshot.volatility, 0.0);
        // No gains and no losses: RS defaults to 0.
        assert_eq!(snapshot.rsi, 0.0);
        assert!(!snapshot.price_above_short);
        assert!(!snapshot.price_above_long);
        assert_eq!(snapshot.price_change_pct, 0.0);
    }

    #[test]
    fn test_rsi_all_gains_is_zero() {
        let history: Vec<f64> = (1..=20).map(|i| i as f64).collect();
        assert_eq!(relative_strength_index(&history, 14), 0.0);
    }

    #[test]
    fn test_rsi_all_losses_is_zero() {
        let history: Vec<f64> = (1..=20).map(|i| 40.0 - i as f64).collect();
        assert_eq!(relative_strength_index(&history, 14), 0.0);
    }

    #[test]
    fn test_rsi_ignores_flat_changes() {
        // Changes: +2, 0, -1. Flat period is in neither list, so avg_gain = 2, avg_loss = 1.
        let rsi = relative_strength_index(&[10.0, 12.0, 12.0, 11.0], 14);
        assert_close(rsi, 100.0 - 100.0 / 3.0);
    }

    #[test]
    fn test_rsi_only_looks_at_trailing_period() {
        // A big early gain followed by 14 alternating moves of equal size.
        let mut history = vec![0.0, 100.0];
        for i in 0..14 {
            history.push(if i % 2 == 0 { 99.0 } else { 100.0 });
        }
        assert_close(relative_strength_index(&history, 14), 50.0);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(0.9090909).unwrap(), 0.91);
        assert_eq!(round2(3.14159).unwrap(), 3.14);
        assert_eq!(round2(103.6).unwrap(), 103.6);
        assert!(round2(f64::NAN).is_err());
        assert!(round2(f64::INFINITY).is_err());
    }

    #[test]
    fn test_round2_uses_the_exact_binary_value() {
        // 2.675 is stored as 2.67499..., 2.665 as 2.66500...0355.
        assert_eq!(round2(2.675).unwrap(), 2.67);
        assert_eq!(round2(2.665).unwrap(), 2.67);
        assert_eq!(round2(1.005).unwrap(), 1.0);
        // Exact binary midpoints go to the even neighbour.
        assert_eq!(round2(0.125).unwrap(), 0.12);
        assert_eq!(round2(0.375).unwrap(), 0.38);
    }

    #[test]
    fn test_round2_keeps_values_beyond_decimal_range() {
        assert_eq!(round2(1e29).unwrap(), 1e29);
        assert_eq!(round2(-3.5e30).unwrap(), -3.5e30);
    }

    #[test]
    fn test_huge_prices_still_produce_a_snapshot() {
        let snapshot = compute(&[1e29, 1e29], 1e29).unwrap();
        assert_eq!(snapshot.sma_short, 1e29);
        assert_eq!(snapshot.sma_long, 1e29);
        assert_eq!(snapshot.price_change_pct, 0.0);
        assert!(snapshot.volatility >= 0.0);
        assert!(!snapshot.price_above_short);
    }

    #[test]
    fn test_custom_windows() {
        let engine = IndicatorEngine::new(IndicatorSettings {
            short_window: 2,
            long_window: 3,
            rsi_period: 1,
        });
        let snapshot = engine.compute(&[1.0, 2.0, 3.0, 4.0], 5.0).unwrap();
        assert_close(snapshot.sma_short, 3.5);
        assert_close(snapshot.sma_long, 3.0);
        assert_close(snapshot.volatility, 0.5);
    }
}
