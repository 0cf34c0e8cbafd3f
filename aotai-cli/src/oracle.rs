//! Chat-completion HTTP backend for the narrative oracle.
use anyhow::{Context, Result};
use aotai_game::{GeneratedOracle, NarrativeOracle, OfflineOracle, OracleError, Prompt, TextGenerator};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const NARRATIVE_TEMPERATURE: f32 = 0.8;

/// Connection settings for a chat-completion compatible endpoint.
#[derive(Debug, Clone)]
pub struct OracleSettings {
    pub endpoint: String,
    pub model: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

/// POSTs prompts to `<endpoint>/chat/completions` and returns the first choice's content.
pub struct ChatCompletionClient {
    url: String,
    model: String,
    api_key: Option<String>,
    http_client: reqwest::Client,
}

impl ChatCompletionClient {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(settings: &OracleSettings) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()
            .context("Failed to build HTTP client for the narrative oracle")?;
        Ok(Self {
            url: format!("{}/chat/completions", settings.endpoint.trim_end_matches('/')),
            model: settings.model.clone(),
            api_key: settings.api_key.clone(),
            http_client,
        })
    }
}

#[async_trait]
impl TextGenerator for ChatCompletionClient {
    async fn complete(&self, prompt: &Prompt) -> Result<String, OracleError> {
        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &prompt.system,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt.user,
                },
            ],
            temperature: NARRATIVE_TEMPERATURE,
            response_format: prompt.expects_json.then_some(ResponseFormat {
                kind: "json_object",
            }),
        };

        let mut request = self.http_client.post(&self.url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }
        log::debug!("oracle request to {} (json: {})", self.url, prompt.expects_json);

        let response = request
            .send()
            .await
            .map_err(|err| OracleError::Transport(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(OracleError::Status(status.as_u16()));
        }
        let text = response
            .text()
            .await
            .map_err(|err| OracleError::Transport(err.to_string()))?;
        let parsed: ChatResponse = serde_json::from_str(&text)?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(OracleError::MissingField("choices[0].message.content"))
    }
}

/// Pick the oracle implementation for this session.
///
/// # Errors
///
/// Returns an error if the network client cannot be built.
pub fn build_oracle(settings: Option<&OracleSettings>) -> Result<Box<dyn NarrativeOracle>> {
    match settings {
        Some(settings) => {
            log::info!("narrative oracle: {} via {}", settings.model, settings.endpoint);
            Ok(Box::new(GeneratedOracle::new(ChatCompletionClient::new(
                settings,
            )?)))
        }
        None => {
            log::info!("narrative oracle: offline");
            Ok(Box::new(OfflineOracle))
        }
    }
}
