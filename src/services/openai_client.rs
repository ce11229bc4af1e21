use std::time::Duration;

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::{ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs},
    Client,
};
use backoff::ExponentialBackoffBuilder;

use crate::configuration::CompletionSettings;

#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    #[error("Could not reach completion service: {0}")]
    Transport(String),
    #[error("Completion service timed out")]
    Timeout,
    #[error("Completion service rejected the API key: {0}")]
    Auth(String),
    #[error("Completion service rate limit hit: {0}")]
    RateLimited(String),
    #[error("Completion service error: {0}")]
    Api(String),
    #[error("Completion service returned no content")]
    EmptyResponse,
    #[error("Invalid completion request: {0}")]
    InvalidRequest(String),
}

impl From<OpenAIError> for CompletionError {
    fn from(value: OpenAIError) -> Self {
        match value {
            OpenAIError::Reqwest(e) if e.is_timeout() => CompletionError::Timeout,
            OpenAIError::Reqwest(e) => match e.status().map(|s| s.as_u16()) {
                Some(401) | Some(403) => CompletionError::Auth(e.to_string()),
                Some(429) => CompletionError::RateLimited(e.to_string()),
                _ => CompletionError::Transport(e.to_string()),
            },
            OpenAIError::ApiError(e) => {
                let code = e.code.clone().unwrap_or_default();
                let kind = e.r#type.clone().unwrap_or_default();

                if code == "invalid_api_key" || kind == "authentication_error" {
                    CompletionError::Auth(e.message)
                } else if code == "rate_limit_exceeded" || kind == "tokens" {
                    CompletionError::RateLimited(e.message)
                } else {
                    CompletionError::Api(e.message)
                }
            }
            OpenAIError::JSONDeserialize(e) => {
                CompletionError::Api(format!("Malformed response body: {}", e))
            }
            OpenAIError::InvalidArgument(e) => CompletionError::InvalidRequest(e),
            other => CompletionError::Api(other.to_string()),
        }
    }
}

/// A text-in, text-out chat completion endpoint.
#[allow(async_fn_in_trait)]
pub trait CompletionService {
    /// Sends `prompt` as the only user message and returns the first choice's text.
    async fn complete(&self, prompt: &str, temperature: f32) -> Result<String, CompletionError>;
}

pub struct OpenaiClient {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenaiClient {
    pub fn new(settings: &CompletionSettings) -> Result<Self, reqwest::Error> {
        let config = OpenAIConfig::new()
            .with_api_key(settings.api_key.clone())
            .with_api_base(settings.api_base.clone());
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;
        // One attempt per call: a 429 or 5xx surfaces straight away.
        let single_attempt = ExponentialBackoffBuilder::new()
            .with_max_elapsed_time(Some(Duration::ZERO))
            .build();

        Ok(OpenaiClient {
            client: Client::with_config(config)
                .with_http_client(http_client)
                .with_backoff(single_attempt),
            model: settings.model.clone(),
        })
    }
}

impl CompletionService for OpenaiClient {
    async fn complete(&self, prompt: &str, temperature: f32) -> Result<String, CompletionError> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(self.model.as_str())
            .messages([ChatCompletionRequestUserMessageArgs::default()
                .content(prompt)
                .build()?
                .into()])
            .temperature(temperature)
            .build()?;

        log::info!(
            "Requesting completion from {} ({} prompt chars, temperature {})",
            self.model,
            prompt.chars().count(),
            temperature
        );

        let response = self.client.chat().create(request).await?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(CompletionError::EmptyResponse)?;

        match content.trim().is_empty() {
            true => Err(CompletionError::EmptyResponse),
            false => Ok(content),
        }
    }
}
