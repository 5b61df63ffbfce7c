use std::path::Path;

use crate::config::schema::Config;
use crate::error::ConfigError;

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_config_from_str(&content)
}

pub fn load_config_from_str(content: &str) -> Result<Config, ConfigError> {
    let config: Config = serde_json::from_str(content)?;

    validate_config(&config)?;

    Ok(config)
}

pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.version != "1.0" {
        return Err(ConfigError::Validation {
            message: format!("Unsupported config version: {}", config.version),
        });
    }

    if config.ocr.max_pages == 0 {
        return Err(ConfigError::Validation {
            message: "ocr.max_pages must be at least 1".to_string(),
        });
    }

    if config.ocr.dpi == 0 {
        return Err(ConfigError::Validation {
            message: "ocr.dpi must be greater than 0".to_string(),
        });
    }

    if config.ocr.languages.iter().any(|l| l.trim().is_empty()) {
        return Err(ConfigError::Validation {
            message: "ocr.languages must not contain empty entries".to_string(),
        });
    }

    let placeholder = &config.naming.placeholder;
    if placeholder.is_empty() || placeholder.contains(['/', '\\', '\0']) {
        return Err(ConfigError::Validation {
            message: format!(
                "naming.placeholder must be non-empty and free of path separators, got '{}'",
                placeholder
            ),
        });
    }

    if config.llm.model.trim().is_empty() {
        return Err(ConfigError::Validation {
            message: "llm.model must not be empty".to_string(),
        });
    }

    Ok(())
}

/// Reads the classifier API key from the environment variable named in the config.
pub fn resolve_api_key(config: &Config) -> Result<String, ConfigError> {
    let var = &config.llm.api_key_env;
    match std::env::var(var) {
        Ok(key) if !key.trim().is_empty() => Ok(key),
        _ => Err(ConfigError::MissingApiKey(var.clone())),
    }
}
