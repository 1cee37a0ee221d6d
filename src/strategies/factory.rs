//! Strategy construction from settings.

use std::sync::Arc;

use crate::config::Settings;
use crate::strategies::filefixtures::FileFixturesStrategy;
use crate::strategies::proxyrules::ProxyRulesStrategy;
use crate::strategies::{Strategy, StrategyError};

/// Strategy names accepted in `settings.strategy`.
pub const KNOWN_STRATEGIES: &[&str] = &["proxyrules", "filefixtures"];

/// Build the strategy selected by the settings.
pub fn strategy_provider(settings: &Settings) -> Result<Arc<dyn Strategy>, StrategyError> {
    let strategy: Arc<dyn Strategy> = match settings.strategy.as_str() {
        "proxyrules" => Arc::new(ProxyRulesStrategy::new(settings)?),
        "filefixtures" => Arc::new(FileFixturesStrategy::new(settings)?),
        other => return Err(StrategyError::UnknownStrategy(other.to_string())),
    };

    tracing::info!(strategy = strategy.name(), "Strategy initialized");
    Ok(strategy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_unknown_strategy() {
        let mut settings = Settings::default();
        settings.strategy = "chaosmonkey".into();
        let err = strategy_provider(&settings).err().unwrap();
        assert!(matches!(err, StrategyError::UnknownStrategy(ref name) if name == "chaosmonkey"));
        assert!(err.is_configuration_error());
    }

    #[test]
    fn test_proxyrules_strategy() {
        let mut file = tempfile::Builder::new().suffix(".yml").tempfile().unwrap();
        writeln!(file, "- pattern: /a\n  replacement: /b").unwrap();

        let mut settings = Settings::default();
        settings.proxyrules.rules_filename = Some(file.path().to_path_buf());

        let strategy = strategy_provider(&settings).unwrap();
        assert_eq!(strategy.name(), "proxyrules");
    }

    #[test]
    fn test_filefixtures_strategy() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = Settings::default();
        settings.strategy = "filefixtures".into();
        settings.filefixtures.templates_dir = dir.path().to_path_buf();

        let strategy = strategy_provider(&settings).unwrap();
        assert_eq!(strategy.name(), "filefixtures");
    }
}
