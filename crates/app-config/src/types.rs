// In crates/app-config/src/types.rs

use serde::Deserialize;

use crate::error::{Error, Result};

pub use strategies::types::{
    CompositeMember, CompositeSettings, EmaRsiSettings, IndicatorSettings, MacdSettings, MarketCycleSettings,
    RuleSettings,
};

/// Environment variable consulted when `llm.api_key` is not configured.
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

#[derive(Deserialize, Debug, Clone, Default)]
pub struct Settings {
    /// The application's general settings.
    #[serde(default)]
    pub app: AppSettings,
    /// Which decision provider answers `analyze` requests.
    #[serde(default)]
    pub decider: DeciderSettings,
    #[serde(default)]
    pub indicators: IndicatorSettings,
    #[serde(default)]
    pub rules: RuleSettings,
    #[serde(default)]
    pub ema_rsi: EmaRsiSettings,
    #[serde(default)]
    pub macd: MacdSettings,
    /// Member providers and thresholds for the weighted vote.
    #[serde(default)]
    pub composite: CompositeSettings,
    #[serde(default)]
    pub cycle: MarketCycleSettings,
    /// Settings for the language-model decision provider.
    #[serde(default)]
    pub llm: LlmSettings,
}

impl Settings {
    /// Rejects values that would only fail later, mid-analysis.
    pub fn validate(&self) -> Result<()> {
        let positive = |key: &'static str, value: usize| {
            if value == 0 {
                Err(Error::Invalid { key, reason: "must be at least 1".to_string() })
            } else {
                Ok(())
            }
        };
        positive("indicators.short_window", self.indicators.short_window)?;
        positive("indicators.long_window", self.indicators.long_window)?;
        positive("indicators.rsi_period", self.indicators.rsi_period)?;
        positive("ema_rsi.ema_period", self.ema_rsi.ema_period)?;
        positive("ema_rsi.rsi_period", self.ema_rsi.rsi_period)?;
        positive("macd.fast_period", self.macd.fast_period)?;
        positive("macd.slow_period", self.macd.slow_period)?;
        positive("macd.signal_period", self.macd.signal_period)?;

        if self.rules.rsi_oversold >= self.rules.rsi_overbought {
            return Err(Error::Invalid {
                key: "rules.rsi_oversold",
                reason: format!(
                    "{} must be below rules.rsi_overbought ({})",
                    self.rules.rsi_oversold, self.rules.rsi_overbought
                ),
            });
        }
        if self.macd.fast_period >= self.macd.slow_period {
            return Err(Error::Invalid {
                key: "macd.fast_period",
                reason: format!("{} must be below macd.slow_period ({})", self.macd.fast_period, self.macd.slow_period),
            });
        }
        if self.composite.sell_threshold >= self.composite.buy_threshold {
            return Err(Error::Invalid {
                key: "composite.sell_threshold",
                reason: "must be below composite.buy_threshold".to_string(),
            });
        }
        if let Some(member) = self.composite.members.iter().find(|m| !m.weight.is_finite() || m.weight < 0.0) {
            return Err(Error::Invalid {
                key: "composite.members",
                reason: format!("weight of '{}' must be a non-negative number", member.name),
            });
        }
        Ok(())
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct AppSettings {
    /// The environment the application is running in (e.g., "development", "production").
    pub environment: String,
    /// The log level for the application.
    pub log_level: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            log_level: "info".to_string(),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct DeciderSettings {
    /// `"rules"` for the deterministic cascade, `"ema_rsi"`, `"macd"` or
    /// `"composite"` for the indicator strategies, `"llm"` for the chat-completions provider.
    pub provider: String,
}

impl Default for DeciderSettings {
    fn default() -> Self {
        Self {
            provider: "rules".to_string(),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct LlmSettings {
    /// The API key. Falls back to `OPENAI_API_KEY` when unset.
    pub api_key: Option<String>,
    /// Base URL of an OpenAI-compatible API, without the `/chat/completions` suffix.
    pub base_url: String,
    pub model: String,
    pub temperature: f64,
    pub timeout_secs: u64,
    /// Extra attempts after a transport failure, rate limit, or server error.
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            temperature: 0.3,
            timeout_secs: 30,
            max_retries: 2,
            retry_backoff_ms: 500,
        }
    }
}

impl LlmSettings {
    /// The configured key, or the `OPENAI_API_KEY` environment variable.
    pub fn resolved_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| std::env::var(OPENAI_API_KEY_ENV).ok())
            .filter(|k| !k.trim().is_empty())
    }
}
