// In crates/engine/src/llm_provider.rs

use api_client::prompt::{build_analysis_prompt, SYSTEM_PROMPT};
use api_client::LlmClient;
use async_trait::async_trait;
use core_types::types::deserialize_indicators_lenient;
use core_types::{Decision, Error, IndicatorSnapshot, PriceSeries, Result, Signal};
use serde::Deserialize;
use serde_json::Value;
use strategies::DecisionProvider;

const DEFAULT_CONFIDENCE: f64 = 50.0;
const DEFAULT_REASONING: &str = "LLM analysis";

/// A decision provider that asks a chat-completions model for the verdict.
///
/// The model's answer is trusted only as far as its shape: the signal is parsed
/// leniently, confidence is clamped, and indicators that do not form a complete
/// snapshot are dropped.
#[derive(Debug, Clone)]
pub struct LlmProvider {
    client: LlmClient,
}

impl LlmProvider {
    pub fn new(client: LlmClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DecisionProvider for LlmProvider {
    fn name(&self) -> &'static str {
        "llm"
    }

    async fn assess(&self, series: &PriceSeries) -> Result<Decision> {
        series.ensure_analyzable()?;

        tracing::info!(points = series.len(), model = %self.client.model(), "Analyzing price points with LLM.");

        let prompt = build_analysis_prompt(series);
        let content = self
            .client
            .complete_json(SYSTEM_PROMPT, &prompt)
            .await
            .map_err(|e| Error::Provider(format!("Error calling LLM API: {}", e)))?;

        let decision = parse_verdict(&content)?;
        tracing::debug!(reasoning = %decision.reasoning, "LLM reasoning.");
        Ok(decision)
    }
}

/// The JSON object the model is asked to return.
#[derive(Debug, Deserialize)]
struct LlmVerdict {
    #[serde(default)]
    signal: Option<String>,
    #[serde(default)]
    confidence: Option<Value>,
    #[serde(default)]
    reasoning: Option<String>,
    #[serde(default, deserialize_with = "deserialize_indicators_lenient")]
    indicators: Option<IndicatorSnapshot>,
}

/// Maps the model's message content onto a `Decision`.
pub fn parse_verdict(content: &str) -> Result<Decision> {
    let verdict: LlmVerdict = serde_json::from_str(content.trim())
        .map_err(|e| Error::Provider(format!("LLM returned an unparseable verdict: {}", e)))?;

    let confidence = verdict
        .confidence
        .as_ref()
        .and_then(confidence_from_value)
        .unwrap_or(DEFAULT_CONFIDENCE)
        .clamp(0.0, 100.0);

    Ok(Decision {
        signal: verdict.signal.as_deref().map(Signal::parse_lenient).unwrap_or_default(),
        confidence,
        reasoning: verdict
            .reasoning
            .filter(|r| !r.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_REASONING.to_string()),
        indicators: verdict.indicators,
        error: None,
    })
}

/// Accepts `72`, `72.5` or `"72.5"`.
fn confidence_from_value(value: &Value) -> Option<f64> {
    let confidence = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').parse::<f64>().ok(),
        _ => None,
    };
    confidence.filter(|c| c.is_finite())
}
