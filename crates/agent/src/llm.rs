//! Agent backed by an OpenAI-compatible chat-completions endpoint.
//!
//! Each round trip is one stateless completion: the prompt already carries
//! the position, the rejected moves and the last tool result. The model is
//! offered both tools; a plain-text JSON answer is accepted as well.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{
    agent::{AgentReply, AgentRequest, MoveAgent, Usage},
    config::LlmConfig,
    error::TransportError,
    tools::{MoveSubmission, ToolCall, tool_definitions},
};

/// Error bodies are cut to this many characters.
const MAX_ERROR_BODY: usize = 500;

pub struct ChatCompletionsAgent {
    client: reqwest::Client,
    config: LlmConfig,
    api_key: String,
}

impl ChatCompletionsAgent {
    /// Reads the API key from the environment variable named in `config`.
    pub fn from_env(config: LlmConfig) -> Result<Self, TransportError> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| TransportError::MissingApiKey(config.api_key_env.clone()))?;
        Ok(Self::with_api_key(config, api_key))
    }

    pub fn with_api_key(config: LlmConfig, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
            api_key: api_key.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }
}

#[async_trait]
impl MoveAgent for ChatCompletionsAgent {
    fn name(&self) -> &str {
        &self.config.model
    }

    async fn exchange(&mut self, request: &AgentRequest) -> Result<AgentReply, TransportError> {
        let body = request_body(&self.config, request);
        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                body: text.chars().take(MAX_ERROR_BODY).collect(),
            });
        }
        parse_completion(&text)
    }
}

/// JSON body for one completion request.
pub fn request_body(config: &LlmConfig, request: &AgentRequest) -> Value {
    let mut body = json!({
        "model": config.model,
        "messages": [{ "role": "user", "content": request.prompt }],
        "tools": tool_definitions(),
        "tool_choice": "auto",
    });
    if let Some(t) = config.temperature {
        body["temperature"] = json!(t);
    }
    body
}

#[derive(Deserialize)]
struct Completion {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<WireUsage>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Deserialize)]
struct Message {
    content: Option<String>,
    tool_calls: Option<Vec<WireToolCall>>,
}

#[derive(Deserialize)]
struct WireToolCall {
    function: FunctionCall,
}

#[derive(Deserialize)]
struct FunctionCall {
    name: String,
    #[serde(default)]
    arguments: String,
}

#[derive(Deserialize)]
struct WireUsage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
}

/// Decodes a chat-completions response body. The first tool call wins;
/// without one the message text must hold a JSON answer.
pub fn parse_completion(body: &str) -> Result<AgentReply, TransportError> {
    let completion: Completion = serde_json::from_str(body)
        .map_err(|e| TransportError::Unusable(format!("malformed completion: {e}")))?;
    let usage = completion
        .usage
        .map(|u| Usage {
            input_tokens: u.prompt_tokens,
            output_tokens: u.completion_tokens,
        })
        .unwrap_or_default();

    let message = completion
        .choices
        .into_iter()
        .next()
        .map(|c| c.message)
        .ok_or_else(|| TransportError::Unusable("completion has no choices".to_string()))?;

    let first_call = message.tool_calls.and_then(|calls| calls.into_iter().next());
    let call = match (first_call, message.content) {
        (Some(tc), _) => ToolCall::from_function(&tc.function.name, &tc.function.arguments)?,
        (None, Some(text)) => parse_text_answer(&text)?,
        (None, None) => {
            return Err(TransportError::Unusable(
                "completion has neither a tool call nor text".to_string(),
            ));
        }
    };
    Ok(AgentReply { call, usage })
}

/// Accepts `{"move": ..., "offerDraw": ..., "resign": ...}` anywhere in
/// the text, including inside a fenced code block.
pub fn parse_text_answer(text: &str) -> Result<ToolCall, TransportError> {
    let start = text.find('{');
    let end = text.rfind('}');
    let json = match (start, end) {
        (Some(s), Some(e)) if s < e => &text[s..=e],
        _ => {
            return Err(TransportError::Unusable(format!(
                "no JSON object in answer: {}",
                text.chars().take(MAX_ERROR_BODY).collect::<String>()
            )));
        }
    };
    serde_json::from_str::<MoveSubmission>(json)
        .map(ToolCall::SubmitMove)
        .map_err(|e| TransportError::Unusable(format!("bad JSON answer: {e}")))
}

#[cfg(test)]
#[path = "llm_tests.rs"]
mod llm_tests;
