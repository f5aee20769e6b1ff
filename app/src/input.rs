// In app/src/input.rs

use anyhow::{anyhow, Context, Result};
use core_types::PriceSeries;
use std::path::Path;

pub const USAGE: &str = "signal-advisor analyze <CURRENT_PRICE> [PRICES]...";

/// Builds a `PriceSeries` from the command-line prices.
///
/// The first argument is the current price, the rest are the history, oldest
/// first. Prices from `history_file` are older than the positional history and
/// come before it.
pub fn read_series(args: &[String], history_file: Option<&Path>) -> Result<PriceSeries> {
    let (current, rest) = args
        .split_first()
        .ok_or_else(|| anyhow!("Insufficient arguments. Usage: {}", USAGE))?;
    let current_price = parse_price(current)?;

    let mut history = match history_file {
        Some(path) => read_history_file(path)?,
        None => Vec::new(),
    };
    for raw in rest {
        history.push(parse_price(raw)?);
    }

    Ok(PriceSeries::new(current_price, history))
}

fn parse_price(raw: &str) -> Result<f64> {
    raw.trim()
        .parse::<f64>()
        .with_context(|| format!("invalid price '{}'", raw))
}

/// Reads prices separated by whitespace, commas or newlines. Lines starting
/// with `#` are ignored.
fn read_history_file(path: &Path) -> Result<Vec<f64>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read history file {}", path.display()))?;

    content
        .lines()
        .filter(|line| !line.trim_start().starts_with('#'))
        .flat_map(|line| line.split(|c: char| c == ',' || c.is_whitespace()))
        .filter(|token| !token.is_empty())
        .map(parse_price)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_first_argument_is_current_price() {
        let series = read_series(&args(&["111", "100", "102.5"]), None).unwrap();
        assert_eq!(series.current_price, 111.0);
        assert_eq!(series.history, vec![100.0, 102.5]);
    }

    #[test]
    fn test_no_arguments() {
        let err = read_series(&[], None).unwrap_err();
        assert!(err.to_string().contains("Insufficient arguments"));
    }

    #[test]
    fn test_invalid_price() {
        let err = read_series(&args(&["111", "abc"]), None).unwrap_err();
        assert!(err.to_string().contains("invalid price 'abc'"));
    }

    #[test]
    fn test_history_file_precedes_positional_prices() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prices.txt");
        std::fs::write(&path, "# btc closes\n100, 101\n102 103\n\n").unwrap();

        let series = read_series(&args(&["105", "104"]), Some(&path)).unwrap();
        assert_eq!(series.current_price, 105.0);
        assert_eq!(series.history, vec![100.0, 101.0, 102.0, 103.0, 104.0]);
    }

    #[test]
    fn test_missing_history_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_series(&args(&["105"]), Some(&dir.path().join("missing.txt"))).unwrap_err();
        assert!(err.to_string().contains("failed to read history file"));
    }
}
