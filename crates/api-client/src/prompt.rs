// In crates/api-client/src/prompt.rs

use core_types::PriceSeries;

pub const SYSTEM_PROMPT: &str = "You are a professional cryptocurrency trading analyst. \
Always respond with valid JSON only, no additional text.";

/// Builds the user prompt asking the model for a decision in our `Decision` shape.
pub fn build_analysis_prompt(series: &PriceSeries) -> String {
    let current_price = series.current_price;
    format!(
        r#"You are a Bitcoin trading analyst. Analyze the following price data and provide a trading recommendation.

Current Bitcoin Price: ${current_price:.2}

Recent Price History (last {count} prices):
{history:?}

Please analyze this data and provide:
1. A trading signal (BUY, SELL, or HOLD)
2. A confidence level from 0 to 100
3. Technical indicators you calculated (SMA20, SMA50, RSI, volatility, price_change_pct)
4. Clear reasoning for your recommendation

Respond ONLY with valid JSON in this exact format:
{{
  "signal": "BUY|SELL|HOLD",
  "confidence": 0-100,
  "reasoning": "your detailed reasoning",
  "indicators": {{
    "sma_20": number,
    "sma_50": number,
    "rsi": number,
    "volatility": number,
    "price_change_pct": number,
    "current_price": {current_price},
    "price_above_sma20": boolean,
    "price_above_sma50": boolean
  }}
}}"#,
        count = series.history.len(),
        history = series.history,
    )
}
