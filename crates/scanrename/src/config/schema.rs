use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub ocr: OcrConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub naming: NamingConfig,
}

fn default_version() -> String {
    "1.0".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            ocr: OcrConfig::default(),
            llm: LlmConfig::default(),
            naming: NamingConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrConfig {
    #[serde(default = "default_languages")]
    pub languages: Vec<String>,
    #[serde(default = "default_dpi")]
    pub dpi: u32,
    /// Pages of a multi-page container that are read; the rest are ignored.
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,
}

fn default_languages() -> Vec<String> {
    vec!["eng".to_string()]
}

fn default_dpi() -> u32 {
    300
}

fn default_max_pages() -> usize {
    3
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            languages: default_languages(),
            dpi: default_dpi(),
            max_pages: default_max_pages(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Name of the environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default)]
    pub temperature: f32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Extra attempts after the first failed request. Zero means a single attempt.
    #[serde(default)]
    pub max_retries: u32,
    #[serde(default = "default_max_input_chars")]
    pub max_input_chars: usize,
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_max_input_chars() -> usize {
    12_000
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            temperature: 0.0,
            timeout_secs: default_timeout_secs(),
            max_retries: 0,
            max_input_chars: default_max_input_chars(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamingConfig {
    /// Token rendered in place of a missing field.
    #[serde(default = "default_placeholder")]
    pub placeholder: String,
    /// Replace path separators and collapse whitespace in name fragments.
    #[serde(default = "default_true")]
    pub sanitize: bool,
}

fn default_placeholder() -> String {
    "None".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            placeholder: default_placeholder(),
            sanitize: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Text,
    Image,
}

impl DocumentFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "txt" | "text" | "md" => Some(Self::Text),
            "png" | "jpg" | "jpeg" | "tiff" | "tif" | "bmp" | "gif" | "webp" => Some(Self::Image),
            _ => None,
        }
    }
}
