use reqwest::{Client, StatusCode};
use std::error::Error;
use std::fmt;
use tracing::{debug, info, warn};

use super::endpoints::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage};
use crate::config::AppConfig;

/// Generated recipe text, exactly as returned by the model.
pub type RecipeText = String;

#[derive(Debug)]
pub enum GenerationError {
    MissingCredentials,
    MalformedResponse(String),
    UpstreamFailure { status: u16, body: String },
    TransportFailure(reqwest::Error),
}

impl fmt::Display for GenerationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationError::MissingCredentials => {
                write!(f, "API Key not found. Please check your .env file.")
            }
            GenerationError::MalformedResponse(reason) => {
                write!(f, "Invalid response from the API: {}", reason)
            }
            GenerationError::UpstreamFailure { status, body } => {
                write!(f, "API call failed with status code {}: {}", status, body)
            }
            GenerationError::TransportFailure(err) => write!(f, "Error: {}", err),
        }
    }
}

impl Error for GenerationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            GenerationError::TransportFailure(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for GenerationError {
    fn from(err: reqwest::Error) -> Self {
        GenerationError::TransportFailure(err)
    }
}

/// Calls an OpenRouter-style chat-completion endpoint once per request.
#[derive(Debug, Clone)]
pub struct RecipeClient {
    client: Client,
    api_key: Option<String>,
    endpoint: String,
    model: String,
    site_url: String,
    app_name: String,
}

impl RecipeClient {
    pub fn new(config: &AppConfig) -> Self {
        Self::with_http_client(config, Client::new())
    }

    /// Uses a caller-built reqwest client, e.g. one with proxies disabled.
    pub fn with_http_client(config: &AppConfig, client: Client) -> Self {
        Self {
            client,
            api_key: config.api_key.clone(),
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            site_url: config.site_url.clone(),
            app_name: config.app_name.clone(),
        }
    }

    pub fn has_credentials(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn build_request(&self, prompt: &str) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::system(crate::prompt_builder::SYSTEM_PROMPT),
                ChatMessage::user(prompt),
            ],
        }
    }

    pub async fn generate(&self, prompt: &str) -> Result<RecipeText, GenerationError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(GenerationError::MissingCredentials)?;

        let request = self.build_request(prompt);
        info!(model = %self.model, endpoint = %self.endpoint, "requesting recipe");

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .header("Content-Type", "application/json")
            .header("HTTP-Referer", &self.site_url)
            .header("X-Title", &self.app_name)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if status != StatusCode::OK {
            warn!(status = status.as_u16(), "completion endpoint returned an error");
            return Err(GenerationError::UpstreamFailure {
                status: status.as_u16(),
                body,
            });
        }

        debug!(bytes = body.len(), "completion response received");
        extract_recipe_text(&body)
    }
}

/// Pulls `choices[0].message.content` out of a successful response body.
pub fn extract_recipe_text(body: &str) -> Result<RecipeText, GenerationError> {
    let parsed: ChatCompletionResponse = serde_json::from_str(body)
        .map_err(|e| GenerationError::MalformedResponse(format!("body is not valid JSON: {}", e)))?;

    match parsed.choices.as_deref() {
        None => Err(GenerationError::MalformedResponse(
            "missing 'choices'".to_string(),
        )),
        Some([]) => Err(GenerationError::MalformedResponse(
            "empty 'choices'".to_string(),
        )),
        Some(_) => parsed.first_content().map(str::to_string).ok_or_else(|| {
            GenerationError::MalformedResponse("first choice has no message content".to_string())
        }),
    }
}
