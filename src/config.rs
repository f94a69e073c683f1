//! Configuration for Wayfinder.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;
use crate::insight::DEFAULT_EXCHANGE_WINDOW;
use crate::style::DEFAULT_MIN_SAMPLES;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Main configuration for the interview binary.
#[derive(Debug, Clone)]
pub struct Config {
    pub llm: LlmConfig,
    pub engine: EngineConfig,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Ok(Self {
            llm: LlmConfig::from_env()?,
            engine: EngineConfig::from_env()?,
        })
    }
}

/// Generation collaborator settings.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: SecretString,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl LlmConfig {
    pub(crate) fn from_env() -> Result<Self, ConfigError> {
        let api_key = optional_env("LLM_API_KEY")?
            .map(SecretString::from)
            .ok_or_else(|| ConfigError::MissingRequired {
                key: "LLM_API_KEY".to_string(),
                hint: "Set LLM_API_KEY in the environment or in a .env file".to_string(),
            })?;

        let base_url = optional_env("LLM_BASE_URL")?.unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ConfigError::InvalidValue {
                key: "LLM_BASE_URL".to_string(),
                message: "must start with http:// or https://".to_string(),
            });
        }

        let timeout_secs: u64 = parse_optional_env("LLM_TIMEOUT_SECS", 60)?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "LLM_TIMEOUT_SECS".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }

        let temperature: f32 = parse_optional_env("LLM_TEMPERATURE", 0.7)?;
        if !(0.0..=2.0).contains(&temperature) {
            return Err(ConfigError::InvalidValue {
                key: "LLM_TEMPERATURE".to_string(),
                message: format!("must be between 0.0 and 2.0, got {temperature}"),
            });
        }

        Ok(Self {
            api_key,
            base_url,
            model: optional_env("LLM_MODEL")?.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            timeout: Duration::from_secs(timeout_secs),
            max_tokens: parse_optional_env("LLM_MAX_TOKENS", 600)?,
            temperature,
        })
    }
}

/// Engine settings that need no credential.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub session_dir: PathBuf,
    pub exchange_window: usize,
    pub style_min_samples: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            session_dir: default_session_dir(),
            exchange_window: DEFAULT_EXCHANGE_WINDOW,
            style_min_samples: DEFAULT_MIN_SAMPLES,
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let exchange_window: usize =
            parse_optional_env("WAYFINDER_EXCHANGE_WINDOW", DEFAULT_EXCHANGE_WINDOW)?;
        if exchange_window == 0 {
            return Err(ConfigError::InvalidValue {
                key: "WAYFINDER_EXCHANGE_WINDOW".to_string(),
                message: "must be at least 1".to_string(),
            });
        }

        let style_min_samples: usize =
            parse_optional_env("WAYFINDER_STYLE_MIN_SAMPLES", DEFAULT_MIN_SAMPLES)?;
        if style_min_samples == 0 {
            return Err(ConfigError::InvalidValue {
                key: "WAYFINDER_STYLE_MIN_SAMPLES".to_string(),
                message: "must be at least 1".to_string(),
            });
        }

        Ok(Self {
            session_dir: optional_env("WAYFINDER_SESSION_DIR")?
                .map(PathBuf::from)
                .unwrap_or_else(default_session_dir),
            exchange_window,
            style_min_samples,
        })
    }
}

fn default_session_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("wayfinder").join("sessions"))
        .unwrap_or_else(|| PathBuf::from("sessions"))
}

// Helper functions

pub(crate) fn optional_env(key: &str) -> Result<Option<String>, ConfigError> {
    match std::env::var(key) {
        Ok(val) if val.is_empty() => Ok(None),
        Ok(val) => Ok(Some(val)),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(e) => Err(ConfigError::ParseError(format!(
            "failed to read {key}: {e}"
        ))),
    }
}

pub(crate) fn parse_optional_env<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    optional_env(key)?
        .map(|s| {
            s.parse().map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: format!("{e}"),
            })
        })
        .transpose()
        .map(|opt| opt.unwrap_or(default))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::sync::Mutex;

    // Env vars are process-global, so serialize tests that mutate them.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const LLM_VARS: &[&str] = &[
        "LLM_API_KEY",
        "LLM_BASE_URL",
        "LLM_MODEL",
        "LLM_TIMEOUT_SECS",
        "LLM_MAX_TOKENS",
        "LLM_TEMPERATURE",
    ];

    const ENGINE_VARS: &[&str] = &[
        "WAYFINDER_SESSION_DIR",
        "WAYFINDER_EXCHANGE_WINDOW",
        "WAYFINDER_STYLE_MIN_SAMPLES",
    ];

    fn clear(vars: &[&str]) {
        for var in vars {
            unsafe { std::env::remove_var(var) };
        }
    }

    #[test]
    fn optional_env_returns_none_for_empty_string() {
        let _lock = ENV_LOCK.lock();
        unsafe { std::env::set_var("_TEST_WF_EMPTY_42", "") };
        let result = optional_env("_TEST_WF_EMPTY_42").unwrap();
        assert!(result.is_none());
        unsafe { std::env::remove_var("_TEST_WF_EMPTY_42") };
    }

    #[test]
    fn parse_optional_env_returns_error_for_invalid_value() {
        let _lock = ENV_LOCK.lock();
        unsafe { std::env::set_var("_TEST_WF_PARSE_BAD_42", "not_a_number") };
        let result: Result<u64, _> = parse_optional_env("_TEST_WF_PARSE_BAD_42", 0);
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
        unsafe { std::env::remove_var("_TEST_WF_PARSE_BAD_42") };
    }

    #[test]
    fn llm_config_requires_api_key() {
        let _lock = ENV_LOCK.lock();
        clear(LLM_VARS);
        let err = LlmConfig::from_env().unwrap_err();
        assert!(
            matches!(err, ConfigError::MissingRequired { ref key, .. } if key == "LLM_API_KEY")
        );
    }

    #[test]
    fn llm_config_defaults() {
        let _lock = ENV_LOCK.lock();
        clear(LLM_VARS);
        unsafe { std::env::set_var("LLM_API_KEY", "sk-test") };

        let config = LlmConfig::from_env().unwrap();
        assert_eq!(config.api_key.expose_secret(), "sk-test");
        assert_eq!(config.base_url, "https://api.openai.com/v1");
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert_eq!(config.max_tokens, 600);
        assert_eq!(config.temperature, 0.7);

        clear(LLM_VARS);
    }

    #[test]
    fn llm_config_rejects_bad_values() {
        let _lock = ENV_LOCK.lock();
        clear(LLM_VARS);
        unsafe { std::env::set_var("LLM_API_KEY", "sk-test") };

        unsafe { std::env::set_var("LLM_TIMEOUT_SECS", "soon") };
        assert!(matches!(
            LlmConfig::from_env(),
            Err(ConfigError::InvalidValue { .. })
        ));
        unsafe { std::env::remove_var("LLM_TIMEOUT_SECS") };

        unsafe { std::env::set_var("LLM_BASE_URL", "api.example.com") };
        assert!(matches!(
            LlmConfig::from_env(),
            Err(ConfigError::InvalidValue { .. })
        ));

        clear(LLM_VARS);
    }

    #[test]
    fn engine_config_respects_env_vars() {
        let _lock = ENV_LOCK.lock();
        clear(ENGINE_VARS);
        unsafe { std::env::set_var("WAYFINDER_SESSION_DIR", "/tmp/wayfinder-test") };
        unsafe { std::env::set_var("WAYFINDER_EXCHANGE_WINDOW", "4") };
        unsafe { std::env::set_var("WAYFINDER_STYLE_MIN_SAMPLES", "5") };

        let config = EngineConfig::from_env().unwrap();
        assert_eq!(config.session_dir, PathBuf::from("/tmp/wayfinder-test"));
        assert_eq!(config.exchange_window, 4);
        assert_eq!(config.style_min_samples, 5);

        clear(ENGINE_VARS);
    }

    #[test]
    fn engine_config_rejects_zero_window() {
        let _lock = ENV_LOCK.lock();
        clear(ENGINE_VARS);
        unsafe { std::env::set_var("WAYFINDER_EXCHANGE_WINDOW", "0") };
        assert!(matches!(
            EngineConfig::from_env(),
            Err(ConfigError::InvalidValue { .. })
        ));
        clear(ENGINE_VARS);
    }
}
