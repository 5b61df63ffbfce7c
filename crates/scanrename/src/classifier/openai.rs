//! Classifier backed by an OpenAI-compatible chat completions endpoint with
//! structured (JSON Schema) output.

use std::time::Duration;

use log::{debug, info, warn};
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::classifier::schema::{output_schema, ClassificationResult, ResponseValidator};
use crate::classifier::Classifier;
use crate::config::schema::LlmConfig;
use crate::error::ClassifyError;
use crate::sanitize::{sanitize_for_prompt, truncate_chars};

const SYSTEM_PROMPT: &str = "You classify scanned documents. \
Reply with a single JSON object that follows the provided schema exactly. \
Use null for any field the text does not support.";

const SCHEMA_NAME: &str = "scanned_document_metadata";

/// Base delay between retries, doubled on each attempt.
const RETRY_BASE_DELAY_MS: u64 = 500;

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    refusal: Option<String>,
}

pub struct OpenAiClassifier {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_retries: u32,
    max_input_chars: usize,
    validator: ResponseValidator,
}

impl OpenAiClassifier {
    pub fn new(config: &LlmConfig, api_key: String) -> Result<Self, ClassifyError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ClassifyError::ClientInit(e.to_string()))?;

        let endpoint = format!("{}/chat/completions", config.base_url.trim_end_matches('/'));
        info!("Classifier using model {} at {}", config.model, endpoint);

        Ok(Self {
            client,
            endpoint,
            api_key,
            model: config.model.clone(),
            temperature: config.temperature,
            max_retries: config.max_retries,
            max_input_chars: config.max_input_chars,
            validator: ResponseValidator::new()?,
        })
    }

    fn request_body(&self, text: &str) -> Value {
        json!({
            "model": self.model,
            "temperature": self.temperature,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": build_prompt(text, self.max_input_chars) },
            ],
            "response_format": {
                "type": "json_schema",
                "json_schema": {
                    "name": SCHEMA_NAME,
                    "strict": true,
                    "schema": output_schema(),
                },
            },
        })
    }

    /// Sends the request, retrying transport failures and retryable statuses
    /// up to `max_retries` extra times.
    fn send_with_retry(&self, body: &Value) -> Result<String, ClassifyError> {
        let mut attempt = 0;
        loop {
            match self.send(body) {
                Ok(content) => return Ok(content),
                Err(e) if attempt < self.max_retries && is_retryable(&e) => {
                    let delay = RETRY_BASE_DELAY_MS << attempt.min(6);
                    attempt += 1;
                    warn!(
                        "Classifier request failed ({}), retry {}/{} in {}ms",
                        e, attempt, self.max_retries, delay
                    );
                    std::thread::sleep(Duration::from_millis(delay));
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn send(&self, body: &Value) -> Result<String, ClassifyError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .map_err(|e| ClassifyError::Request(e.to_string()))?;

        let status = response.status();
        let payload = response
            .text()
            .map_err(|e| ClassifyError::Request(e.to_string()))?;

        if !status.is_success() {
            return Err(ClassifyError::Status {
                status: status.as_u16(),
                body: payload,
            });
        }

        Ok(payload)
    }

    /// Turns a raw chat-completions payload into a validated result.
    pub fn parse_response(&self, payload: &str) -> Result<ClassificationResult, ClassifyError> {
        let response: ChatResponse =
            serde_json::from_str(payload).map_err(|e| ClassifyError::InvalidJson(e.to_string()))?;

        let message = response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message)
            .ok_or(ClassifyError::EmptyResponse)?;

        if let Some(refusal) = message.refusal {
            return Err(ClassifyError::Refused(refusal));
        }

        let content = message
            .content
            .filter(|c| !c.trim().is_empty())
            .ok_or(ClassifyError::EmptyResponse)?;
        debug!("Classifier response:\n{}", content);

        let value: Value =
            serde_json::from_str(&content).map_err(|e| ClassifyError::InvalidJson(e.to_string()))?;

        self.validator.validate(value)
    }
}

impl Classifier for OpenAiClassifier {
    fn classify(&self, text: &str) -> Result<ClassificationResult, ClassifyError> {
        let body = self.request_body(text);
        debug!("Classifier request:\n{}", body);

        let payload = self.send_with_retry(&body)?;
        self.parse_response(&payload)
    }
}

fn build_prompt(text: &str, max_chars: usize) -> String {
    let text = sanitize_for_prompt(truncate_chars(text, max_chars));
    format!(
        "Classify the following scanned document text\n<text>{}</text>",
        text
    )
}

fn is_retryable(error: &ClassifyError) -> bool {
    match error {
        ClassifyError::Request(_) => true,
        ClassifyError::Status { status, .. } => *status == 429 || *status >= 500,
        _ => false,
    }
}
