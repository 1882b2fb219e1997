//! OpenRouter LLM Provider
//!
//! Implementation of `LlmProvider` for OpenRouter and any other endpoint
//! speaking the OpenAI chat-completions format.

use std::time::Duration;

use agent_core::{
    error::{AgentError, Result},
    message::{ContentBlock, ConversationTurn, Role},
    provider::{Completion, FinishReason, GenerationOptions, LlmProvider, TokenUsage},
    tool::ToolSchema,
};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// OpenRouter provider configuration
#[derive(Clone, Debug)]
pub struct OpenRouterConfig {
    /// API key sent as a bearer token
    pub api_key: String,

    /// API base URL, without the `/chat/completions` suffix
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl OpenRouterConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.into(),
            timeout_secs: 120,
        }
    }

    /// Read `OPEN_ROUTER_API_KEY` and optional `OPEN_ROUTER_BASE_URL`
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPEN_ROUTER_API_KEY")
            .map_err(|_| AgentError::Config("OPEN_ROUTER_API_KEY is not set".into()))?;

        let mut config = Self::new(api_key);
        if let Ok(base_url) = std::env::var("OPEN_ROUTER_BASE_URL") {
            config.base_url = base_url;
        }
        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

/// OpenRouter LLM provider
pub struct OpenRouterProvider {
    client: reqwest::Client,
    config: OpenRouterConfig,
}

impl OpenRouterProvider {
    /// Create from configuration
    pub fn from_config(config: OpenRouterConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AgentError::Config(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_config(OpenRouterConfig::from_env()?)
    }

    pub fn config(&self) -> &OpenRouterConfig {
        &self.config
    }
}

#[async_trait]
impl LlmProvider for OpenRouterProvider {
    fn name(&self) -> &str {
        "OpenRouter"
    }

    async fn complete(
        &self,
        turns: &[ConversationTurn],
        tools: &[ToolSchema],
        options: &GenerationOptions,
    ) -> Result<Completion> {
        let body = build_request(turns, tools, options)?;

        let response = self.client
            .post(self.config.completions_url())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AgentError::ProviderUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            // Auth failures never echo the body back, it may quote the key
            return Err(match status.as_u16() {
                401 | 403 => AgentError::Auth(format!("HTTP {}", status.as_u16())),
                429 => AgentError::RateLimited(response.text().await.unwrap_or_default()),
                code => {
                    let text = response
                        .text()
                        .await
                        .unwrap_or_else(|e| format!("<body read error: {e}>"));
                    AgentError::Provider(format!("HTTP {code}: {text}"))
                }
            });
        }

        let api_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| AgentError::Parse(e.to_string()))?;

        parse_response(api_response, &options.model)
    }
}

// --- Request building: conversation → OpenAI format ---

fn build_request(
    turns: &[ConversationTurn],
    tools: &[ToolSchema],
    options: &GenerationOptions,
) -> Result<Value> {
    let mut messages = Vec::new();

    if let Some(system) = &options.system_prompt {
        messages.push(json!({ "role": "system", "content": system }));
    }

    for turn in turns {
        match turn.role {
            Role::User => push_user_turn(&mut messages, turn),
            Role::Assistant => messages.push(assistant_message(turn)?),
        }
    }

    let mut body = json!({
        "model": options.model,
        "messages": messages,
        "max_tokens": options.max_tokens,
    });

    if let Some(temperature) = options.temperature {
        body["temperature"] = json!(temperature);
    }

    if !tools.is_empty() {
        body["tools"] = tools.iter().map(tool_to_openai).collect();
        body["tool_choice"] = json!(options.tool_choice);
    }

    Ok(body)
}

/// Text becomes one user message; each tool result its own `tool` message
fn push_user_turn(messages: &mut Vec<Value>, turn: &ConversationTurn) {
    let mut text_parts = Vec::new();

    for block in &turn.content {
        match block {
            ContentBlock::Text { text } => text_parts.push(text.as_str()),
            ContentBlock::ToolResult { tool_use_id, content, is_error } => {
                let content = if *is_error {
                    format!("[ERROR] {content}")
                } else {
                    content.clone()
                };
                messages.push(json!({
                    "role": "tool",
                    "tool_call_id": tool_use_id,
                    "content": content,
                }));
            }
            ContentBlock::ToolUse { .. } => {}
        }
    }

    if !text_parts.is_empty() {
        messages.push(json!({ "role": "user", "content": text_parts.join("\n\n") }));
    }
}

fn assistant_message(turn: &ConversationTurn) -> Result<Value> {
    let text: String = turn.texts().collect();

    let mut tool_calls = Vec::new();
    for block in &turn.content {
        if let ContentBlock::ToolUse { id, name, input } = block {
            tool_calls.push(json!({
                "id": id,
                "type": "function",
                "function": {
                    "name": name,
                    "arguments": serde_json::to_string(input)?,
                }
            }));
        }
    }

    // Null content is only accepted alongside tool calls
    let message = if tool_calls.is_empty() {
        json!({ "role": "assistant", "content": text })
    } else {
        let content = if text.is_empty() { Value::Null } else { Value::String(text) };
        json!({ "role": "assistant", "content": content, "tool_calls": tool_calls })
    };

    Ok(message)
}

fn tool_to_openai(tool: &ToolSchema) -> Value {
    json!({
        "type": "function",
        "function": {
            "name": tool.name,
            "description": tool.description,
            "parameters": tool.input_schema(),
        }
    })
}

// --- Response parsing: OpenAI format → content blocks ---

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<WireToolCall>>,
}

#[derive(Deserialize)]
struct WireToolCall {
    #[serde(default)]
    id: Option<String>,
    function: WireFunction,
}

#[derive(Deserialize)]
struct WireFunction {
    name: String,
    #[serde(default)]
    arguments: String,
}

#[derive(Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
    #[serde(default)]
    total_tokens: Option<u32>,
}

fn parse_response(api: ChatResponse, requested_model: &str) -> Result<Completion> {
    let choice = api
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| AgentError::Parse("empty choices array in response".into()))?;

    let mut content = Vec::new();

    if let Some(text) = choice.message.content.filter(|t| !t.is_empty()) {
        content.push(ContentBlock::Text { text });
    }

    for call in choice.message.tool_calls.unwrap_or_default() {
        content.push(ContentBlock::ToolUse {
            id: call.id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            input: decode_arguments(&call.function.name, call.function.arguments),
            name: call.function.name,
        });
    }

    let finish_reason = match choice.finish_reason.as_deref() {
        Some("stop") => Some(FinishReason::Stop),
        Some("length") => Some(FinishReason::Length),
        Some("tool_calls") => Some(FinishReason::ToolUse),
        Some("content_filter") => Some(FinishReason::ContentFilter),
        Some("error") => Some(FinishReason::Error),
        Some(other) => {
            tracing::warn!(finish_reason = other, "Unknown finish_reason");
            None
        }
        None => None,
    };

    Ok(Completion {
        content,
        model: api.model.unwrap_or_else(|| requested_model.to_string()),
        usage: api.usage.map(|u| TokenUsage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u
                .total_tokens
                .unwrap_or_else(|| u.prompt_tokens.saturating_add(u.completion_tokens)),
        }),
        finish_reason,
    })
}

/// Empty arguments mean `{}`. Unparseable ones are kept as a raw string so
/// the tool's own decoding reports them as invalid input.
fn decode_arguments(tool: &str, arguments: String) -> Value {
    if arguments.trim().is_empty() {
        return json!({});
    }
    match serde_json::from_str(&arguments) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(tool, error = %e, "Malformed tool arguments JSON");
            Value::String(arguments)
        }
    }
}
