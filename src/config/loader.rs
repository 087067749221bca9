//! Configuration loading from disk and the command line.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::cli::Cli;
use crate::config::schema::ServerConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse a TOML configuration file. Not validated; flags may still fill gaps.
pub fn load_config(path: &Path) -> Result<ServerConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Defaults, then the `--config` file, then flags; validated.
pub fn resolve(cli: &Cli) -> Result<ServerConfig, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ServerConfig::default(),
    };
    cli.apply(&mut config);

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn flags_override_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[listener]\nport = 9000\n\n[server]\nredirect_code = 302\n\n[[redirects.from_to]]\nfrom = \"/a\"\nto = \"http://a\""
        )
        .unwrap();

        let path = file.path().to_str().unwrap();
        let cli = Cli::try_parse_from(["goto-redirect", "--config", path, "--port", "9001"]).unwrap();
        let config = resolve(&cli).unwrap();

        assert_eq!(config.listener.port, 9001);
        assert_eq!(config.server.redirect_code, 302);
        assert_eq!(config.redirects.from_to.len(), 1);
    }

    #[test]
    fn invalid_result_is_rejected() {
        let cli = Cli::try_parse_from(["goto-redirect"]).unwrap();
        let err = resolve(&cli).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("no redirects given"));
    }

    #[test]
    fn unreadable_and_unparsable_files() {
        assert!(matches!(
            load_config(Path::new("/no/such/config.toml")),
            Err(ConfigError::Io(_))
        ));

        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[listener\nport = ").unwrap();
        assert!(matches!(load_config(file.path()), Err(ConfigError::Parse(_))));
    }
}
