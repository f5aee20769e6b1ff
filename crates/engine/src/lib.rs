// In crates/engine/src/lib.rs

pub mod llm_provider;
pub mod strategy_factory;

use anyhow::Result;
use app_config::Settings;
use core_types::{Decision, Error, PriceSeries};
use strategies::rule_based::INSUFFICIENT_DATA_REASONING;
use strategies::DecisionProvider;

use crate::strategy_factory::create_provider;

const PROVIDER_FAILURE_REASONING: &str = "decision provider failed";

/// The pipeline boundary.
///
/// Whatever goes wrong inside the provider, `analyze` always hands back a
/// well-formed `Decision`; failures become a zero-confidence `HOLD` carrying
/// the error text.
pub struct Engine {
    provider: Box<dyn DecisionProvider>,
}

impl Engine {
    pub fn new(provider: Box<dyn DecisionProvider>) -> Self {
        Self { provider }
    }

    /// Builds an engine around the provider selected in `settings`.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Ok(Self::new(create_provider(settings)?))
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    pub async fn analyze(&self, series: &PriceSeries) -> Decision {
        if let Err(e) = series.ensure_analyzable() {
            tracing::warn!(points = series.len(), "Insufficient price history, holding.");
            return Decision::fallback(INSUFFICIENT_DATA_REASONING, e.to_string());
        }

        match self.provider.assess(series).await {
            Ok(decision) => {
                tracing::info!(
                    provider = self.provider.name(),
                    signal = %decision.signal,
                    confidence = decision.confidence,
                    "Decision produced."
                );
                decision
            }
            Err(e) => {
                tracing::error!(provider = self.provider.name(), error = %e, "Decision provider failed, holding.");
                let reasoning = match e {
                    Error::Provider(_) => PROVIDER_FAILURE_REASONING,
                    Error::InsufficientData { .. } | Error::Computation(_) => INSUFFICIENT_DATA_REASONING,
                };
                Decision::fallback(reasoning, e.to_string())
            }
        }
    }
}
