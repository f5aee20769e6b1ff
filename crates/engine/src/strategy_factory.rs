//! This module provides a factory for creating decision providers from configuration.

use crate::llm_provider::LlmProvider;
use anyhow::Result;
use app_config::Settings;
use strategies::{CompositeProvider, DecisionProvider, EmaRsiProvider, MacdProvider, RuleBasedProvider, WeightedProvider};

/// Creates the provider named by `settings.decider.provider`.
pub fn create_provider(settings: &Settings) -> Result<Box<dyn DecisionProvider>> {
    create_named_provider(&settings.decider.provider, settings)
}

/// Creates a provider by name, taking its parameters from `settings`.
pub fn create_named_provider(name: &str, settings: &Settings) -> Result<Box<dyn DecisionProvider>> {
    let provider: Box<dyn DecisionProvider> = match normalize(name).as_str() {
        "rules" => Box::new(RuleBasedProvider::new(
            settings.indicators.clone(),
            settings.rules.clone(),
        )),
        "ema_rsi" => Box::new(EmaRsiProvider::new(
            settings.ema_rsi.clone(),
            settings.indicators.clone(),
        )),
        "macd" => Box::new(MacdProvider::new(settings.macd.clone(), settings.indicators.clone())),
        "llm" => {
            let client = api_client::new(&settings.llm)?;
            Box::new(LlmProvider::new(client))
        }
        "composite" => Box::new(create_composite(settings)?),
        unknown => anyhow::bail!("Attempted to create unknown decision provider: {}", unknown),
    };

    tracing::debug!(provider = provider.name(), "Decision provider created.");
    Ok(provider)
}

/// Builds the weighted vote from `settings.composite.members`.
fn create_composite(settings: &Settings) -> Result<CompositeProvider> {
    let config = &settings.composite;
    if config.members.is_empty() {
        anyhow::bail!("The composite decision provider needs at least one member");
    }

    let members = config
        .members
        .iter()
        .map(|member| {
            if normalize(&member.name) == "composite" {
                anyhow::bail!("The composite decision provider cannot contain itself");
            }
            Ok(WeightedProvider {
                provider: create_named_provider(&member.name, settings)?,
                weight: member.weight,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CompositeProvider::new(
        members,
        config.buy_threshold,
        config.sell_threshold,
        settings.indicators.clone(),
    ))
}

/// Case-insensitive, and `ema-rsi` is accepted for `ema_rsi`.
fn normalize(name: &str) -> String {
    name.trim().to_ascii_lowercase().replace('-', "_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use app_config::LlmSettings;
    use strategies::CompositeMember;

    #[test]
    fn test_default_provider_is_rules() {
        let provider = create_provider(&Settings::default()).unwrap();
        assert_eq!(provider.name(), "rules");
    }

    #[test]
    fn test_llm_provider_with_key() {
        let settings = Settings {
            llm: LlmSettings {
                api_key: Some("sk-test".to_string()),
                ..LlmSettings::default()
            },
            ..Settings::default()
        };
        let provider = create_named_provider("LLM", &settings).unwrap();
        assert_eq!(provider.name(), "llm");
    }

    #[test]
    fn test_indicator_strategies() {
        let settings = Settings::default();
        assert_eq!(create_named_provider("ema-rsi", &settings).unwrap().name(), "ema_rsi");
        assert_eq!(create_named_provider("MACD", &settings).unwrap().name(), "macd");
    }

    #[test]
    fn test_default_composite() {
        let provider = create_named_provider("composite", &Settings::default()).unwrap();
        assert_eq!(provider.name(), "composite");
    }

    #[test]
    fn test_composite_cannot_nest() {
        let mut settings = Settings::default();
        settings.composite.members.push(CompositeMember {
            name: "Composite".to_string(),
            weight: 10.0,
        });
        let err = create_named_provider("composite", &settings).err().unwrap();
        assert!(err.to_string().contains("cannot contain itself"));
    }

    #[test]
    fn test_composite_rejects_unknown_member() {
        let mut settings = Settings::default();
        settings.composite.members = vec![CompositeMember {
            name: "oracle".to_string(),
            weight: 100.0,
        }];
        let err = create_named_provider("composite", &settings).err().unwrap();
        assert!(err.to_string().contains("unknown decision provider: oracle"));
    }

    #[test]
    fn test_unknown_provider_is_rejected() {
        let err = create_named_provider("oracle", &Settings::default()).err().unwrap();
        assert!(err.to_string().contains("unknown decision provider"));
    }
}
