//! Service configuration and its named presets.
//!
//! The bootstrap picks a preset (`--env`, else `LLM_CONNECTOR_ENV`, else
//! development), applies command-line overrides, and hands the finished
//! [`AppConfig`] to the server. Nothing below the bootstrap reads the
//! environment.

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigurationError;
use crate::llm::{gemini, openai};
use crate::prompt::DEFAULT_SYSTEM_PROMPT;

/// Environment variable naming the preset.
pub const ENV_VAR: &str = "LLM_CONNECTOR_ENV";

const DEFAULT_PORT: u16 = 5000;

/// Named configuration preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Production,
    Testing,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
            Environment::Testing => "testing",
        }
    }

    /// Read the preset from `LLM_CONNECTOR_ENV`.
    ///
    /// Unset or empty means development; anything unrecognized is an error
    /// rather than a silent fallback.
    pub fn from_env() -> Result<Self, ConfigurationError> {
        match env::var(ENV_VAR) {
            Ok(v) if !v.trim().is_empty() => v.parse(),
            _ => Ok(Environment::Development),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            "testing" | "test" => Ok(Environment::Testing),
            _ => Err(ConfigurationError::UnknownEnvironment(s.to_string())),
        }
    }
}

/// Everything the server needs at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub host: String,
    pub port: u16,
    pub debug: bool,
    /// Emit logs as one JSON object per line.
    pub json_logs: bool,
    /// Used when a request carries no system prompt.
    pub system_prompt: String,
    /// Reject requests without a system prompt instead of using the default.
    pub require_system_prompt: bool,
    pub openai_base_url: String,
    pub gemini_base_url: String,
    /// Provider call timeout. `None` leaves it to the transport.
    pub request_timeout: Option<Duration>,
    /// Few-shot templates file. `None` uses the bundled set.
    pub templates_path: Option<PathBuf>,
}

impl AppConfig {
    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            debug: true,
            json_logs: false,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            require_system_prompt: false,
            openai_base_url: openai::DEFAULT_BASE_URL.to_string(),
            gemini_base_url: gemini::DEFAULT_BASE_URL.to_string(),
            request_timeout: None,
            templates_path: None,
        }
    }

    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            host: "0.0.0.0".to_string(),
            debug: false,
            json_logs: true,
            ..Self::development()
        }
    }

    pub fn testing() -> Self {
        Self {
            environment: Environment::Testing,
            port: 0,
            ..Self::development()
        }
    }

    pub fn for_environment(environment: Environment) -> Self {
        match environment {
            Environment::Development => Self::development(),
            Environment::Production => Self::production(),
            Environment::Testing => Self::testing(),
        }
    }

    /// `RUST_LOG`-style filter used when `RUST_LOG` is not set.
    pub fn default_log_filter(&self) -> &'static str {
        if self.debug {
            "llm_connector=debug,info"
        } else {
            "info"
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::development()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_presets_differ_where_expected() {
        let dev = AppConfig::development();
        let prod = AppConfig::production();
        let test = AppConfig::testing();

        assert!(dev.debug && !dev.json_logs);
        assert!(!prod.debug && prod.json_logs);
        assert_eq!(prod.host, "0.0.0.0");
        assert!(test.debug);
        assert_eq!(test.port, 0);

        for config in [&dev, &prod, &test] {
            assert_eq!(config.system_prompt, DEFAULT_SYSTEM_PROMPT);
            assert!(config.request_timeout.is_none());
            assert!(!config.require_system_prompt);
        }
    }

    #[test]
    fn test_for_environment_matches_preset() {
        for env in [Environment::Development, Environment::Production, Environment::Testing] {
            assert_eq!(AppConfig::for_environment(env).environment, env);
        }
    }

    #[test]
    fn test_environment_parse_accepts_aliases() {
        assert_eq!("PRODUCTION".parse::<Environment>().unwrap(), Environment::Production);
        assert_eq!(" prod ".parse::<Environment>().unwrap(), Environment::Production);
        assert_eq!("test".parse::<Environment>().unwrap(), Environment::Testing);
        assert_eq!("dev".parse::<Environment>().unwrap(), Environment::Development);
    }

    #[test]
    fn test_environment_parse_rejects_unknown() {
        assert_eq!(
            "staging".parse::<Environment>(),
            Err(ConfigurationError::UnknownEnvironment("staging".to_string()))
        );
    }

    #[test]
    #[serial]
    fn test_from_env_default() {
        temp_env::with_var_unset(ENV_VAR, || {
            assert_eq!(Environment::from_env().unwrap(), Environment::Development);
        });
    }

    #[test]
    #[serial]
    fn test_from_env_empty_uses_default() {
        temp_env::with_var(ENV_VAR, Some(""), || {
            assert_eq!(Environment::from_env().unwrap(), Environment::Development);
        });
    }

    #[test]
    #[serial]
    fn test_from_env_reads_value() {
        temp_env::with_var(ENV_VAR, Some("production"), || {
            assert_eq!(Environment::from_env().unwrap(), Environment::Production);
        });
    }

    #[test]
    #[serial]
    fn test_from_env_invalid_is_error() {
        temp_env::with_var(ENV_VAR, Some("staging"), || {
            assert!(Environment::from_env().is_err());
        });
    }

    #[test]
    fn test_bind_address() {
        let config = AppConfig {
            host: "0.0.0.0".to_string(),
            port: 8080,
            ..AppConfig::testing()
        };
        assert_eq!(config.bind_address(), "0.0.0.0:8080");
    }
}
