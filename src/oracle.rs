//! Chat-completion oracle client.

use crate::config::OracleConfig;
use crate::credentials::CredentialStore;
use crate::prompt::OraclePrompt;
use async_trait::async_trait;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tracing::{debug, error, info, instrument};

/// Anything that answers an [`OraclePrompt`] with free text.
#[async_trait]
pub trait Oracle: Send + Sync {
    /// Sends the prompt and returns the raw reply.
    async fn complete(&self, prompt: &OraclePrompt) -> Result<String, OracleError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f64,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    content: Option<String>,
}

/// Oracle backed by an OpenAI-compatible `/chat/completions` endpoint.
///
/// The credential is read from the store on every call and dropped when the
/// call finishes.
#[derive(Clone)]
pub struct ChatCompletionOracle {
    config: OracleConfig,
    credentials: Arc<dyn CredentialStore>,
    http: reqwest::Client,
}

impl std::fmt::Debug for ChatCompletionOracle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatCompletionOracle")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ChatCompletionOracle {
    /// Creates an oracle client.
    #[instrument(skip(config, credentials), fields(model = %config.model(), endpoint = %config.endpoint()))]
    pub fn new(config: OracleConfig, credentials: Arc<dyn CredentialStore>) -> Self {
        info!("Creating chat-completion oracle");
        Self {
            config,
            credentials,
            http: reqwest::Client::new(),
        }
    }

    /// The configuration this client sends with each request.
    pub fn config(&self) -> &OracleConfig {
        &self.config
    }
}

#[async_trait]
impl Oracle for ChatCompletionOracle {
    #[instrument(skip(self, prompt), fields(model = %self.config.model()))]
    async fn complete(&self, prompt: &OraclePrompt) -> Result<String, OracleError> {
        let credential = self
            .credentials
            .get(self.config.credential_key())
            .await
            .map_err(|e| OracleError::new(format!("No API credential available: {}", e.message)))?;

        debug!("Building chat completion request");
        let body = ChatRequest {
            model: self.config.model(),
            messages: [
                ChatMessage {
                    role: "system",
                    content: prompt.system(),
                },
                ChatMessage {
                    role: "user",
                    content: prompt.user(),
                },
            ],
            temperature: *self.config.temperature(),
            max_tokens: *self.config.max_tokens(),
        };

        debug!("Sending request to oracle");
        let response = self
            .http
            .post(self.config.endpoint())
            .bearer_auth(credential.expose())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(error = ?e, "Oracle request failed");
                OracleError::new(format!("Oracle request failed: {}", e))
            })?;

        let status = response.status();
        let response_text = response.text().await.map_err(|e| {
            error!(error = ?e, "Failed to read oracle response");
            OracleError::new(format!("Failed to read response: {}", e))
        })?;

        if !status.is_success() {
            error!(status = %status, response = %response_text, "Oracle API error");
            return Err(OracleError::new(format!(
                "Oracle API error {}: {}",
                status, response_text
            )));
        }

        debug!(response_length = response_text.len(), "Parsing oracle response");
        let parsed: ChatResponse = serde_json::from_str(&response_text).map_err(|e| {
            error!(error = ?e, response = %response_text, "Failed to parse oracle response");
            OracleError::new(format!("Failed to parse response: {}", e))
        })?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                error!("No content in oracle response");
                OracleError::new("No content in oracle response".to_string())
            })?;

        let reply = content.trim().to_string();
        info!(reply = %reply, "Oracle replied");
        Ok(reply)
    }
}

/// Oracle that replays canned replies in order and remembers its prompts.
#[derive(Debug, Default)]
pub struct ScriptedOracle {
    replies: Mutex<VecDeque<Result<String, OracleError>>>,
    prompts: Mutex<Vec<OraclePrompt>>,
}

impl ScriptedOracle {
    /// Creates an oracle that answers with `replies`, one per call.
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(|r| Ok(r.into())).collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Queues a failing call after the existing replies.
    pub fn then_fail(self, message: impl Into<String>) -> Self {
        if let Ok(mut replies) = self.replies.lock() {
            replies.push_back(Err(OracleError::new(message.into())));
        }
        self
    }

    /// Prompts received so far.
    pub fn prompts(&self) -> Vec<OraclePrompt> {
        self.prompts
            .lock()
            .map(|prompts| prompts.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Oracle for ScriptedOracle {
    #[instrument(skip(self, prompt))]
    async fn complete(&self, prompt: &OraclePrompt) -> Result<String, OracleError> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.clone());
        }

        let next = self
            .replies
            .lock()
            .map_err(|_| OracleError::new("Scripted oracle lock poisoned".to_string()))?
            .pop_front();

        next.unwrap_or_else(|| Err(OracleError::new("Scripted oracle has no replies left".to_string())))
    }
}

/// Oracle call failure: transport, credential or response shape.
#[derive(Debug, Clone, Display, Error)]
#[display("Oracle error: {} at {}:{}", message, file, line)]
pub struct OracleError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl OracleError {
    /// Creates a new oracle error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        error!(error_message = %message, "Oracle error created");
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
