//! OpenAI-Compatible Provider
//!
//! Implementation of `CompletionProvider` for servers speaking the OpenAI
//! `/chat/completions` protocol: OpenAI itself, DeepSeek, and local
//! llamafile-style servers. The model is taken from each request, which lets
//! one binding serve both the tool-routing and the synthesis model.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use url::Url;

use super::adapter::ResponseAdapter;
use super::http_client::build_http_client;
use super::provider::{missing_api_key_error, parse_http_error, CompletionProvider};
use super::types::{
    CompletionRequest, LlmError, LlmResponse, LlmResult, Message, MessageRole, ProviderConfig,
    ProviderType, StopReason, ToolCall, ToolDefinition, UsageStats,
};

const CHAT_COMPLETIONS_PATH: &str = "chat/completions";

/// OpenAI-compatible provider
pub struct OpenAiCompatibleProvider {
    config: ProviderConfig,
    client: reqwest::Client,
    base: Url,
    adapter: OpenAiAdapter,
}

impl OpenAiCompatibleProvider {
    /// Create a provider from configuration.
    ///
    /// Fails when the base URL or proxy URL cannot be parsed.
    pub fn new(config: ProviderConfig) -> LlmResult<Self> {
        let client = build_http_client(
            Duration::from_secs(config.request_timeout_secs),
            config.proxy_url.as_deref(),
        )?;
        let base = Self::normalize_base(config.base_url())?;

        Ok(Self {
            config,
            client,
            base,
            adapter: OpenAiAdapter,
        })
    }

    /// Parse the base URL and make sure it ends with a slash so that
    /// `Url::join` appends instead of replacing the last segment.
    fn normalize_base(raw: &str) -> LlmResult<Url> {
        let mut base = Url::parse(raw).map_err(|e| LlmError::InvalidRequest {
            message: format!("Invalid base URL '{}': {}", raw, e),
        })?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(base)
    }

    fn url_for(&self, path: &str) -> LlmResult<Url> {
        self.base.join(path).map_err(|e| LlmError::InvalidRequest {
            message: format!("Invalid endpoint path '{}': {}", path, e),
        })
    }

    /// Full URL of the chat completions endpoint.
    pub fn completions_url(&self) -> LlmResult<Url> {
        self.url_for(CHAT_COMPLETIONS_PATH)
    }

    fn api_key(&self) -> LlmResult<Option<&str>> {
        match self.config.api_key.as_deref() {
            Some(key) => Ok(Some(key)),
            None if self.config.provider.requires_api_key() => {
                Err(missing_api_key_error(self.name()))
            }
            None => Ok(None),
        }
    }

    /// Build the request body for the API
    fn build_request_body(&self, request: &CompletionRequest) -> Value {
        let messages: Vec<Value> = request.messages.iter().map(Self::message_to_openai).collect();

        let mut body = json!({
            "model": request.model,
            "messages": messages,
            "temperature": request.temperature,
            "max_tokens": request.max_tokens.unwrap_or(self.config.max_tokens),
            "stream": false,
        });

        if !request.tools.is_empty() {
            let tools: Vec<Value> = request.tools.iter().map(Self::tool_to_openai).collect();
            body["tools"] = json!(tools);
            if let Some(choice) = request.tool_choice {
                body["tool_choice"] = json!(choice.as_str());
            }
        }

        // Provider-specific options never override the fields above
        if let Some(map) = body.as_object_mut() {
            for (key, value) in &self.config.options {
                map.entry(key.clone()).or_insert_with(|| value.clone());
            }
        }

        body
    }

    /// Convert a Message to OpenAI API format
    fn message_to_openai(message: &Message) -> Value {
        match message.role {
            MessageRole::Tool => json!({
                "role": "tool",
                "tool_call_id": message.tool_call_id.clone().unwrap_or_default(),
                "name": message.name.clone().unwrap_or_default(),
                "content": message.content,
            }),
            MessageRole::Assistant if message.has_tool_calls() => {
                let tool_calls: Vec<Value> = message
                    .tool_calls
                    .iter()
                    .map(|tc| {
                        json!({
                            "id": tc.id,
                            "type": "function",
                            "function": {
                                "name": tc.name,
                                "arguments": Self::arguments_to_wire(&tc.arguments),
                            }
                        })
                    })
                    .collect();

                let content = if message.content.is_empty() {
                    Value::Null
                } else {
                    json!(message.content)
                };

                json!({
                    "role": "assistant",
                    "content": content,
                    "tool_calls": tool_calls,
                })
            }
            role => json!({
                "role": match role {
                    MessageRole::System => "system",
                    MessageRole::User => "user",
                    _ => "assistant",
                },
                "content": message.content,
            }),
        }
    }

    /// OpenAI transports arguments as a JSON-encoded string. Arguments that
    /// were kept verbatim as a string (unparseable model output) go back as-is.
    fn arguments_to_wire(arguments: &Value) -> String {
        match arguments {
            Value::String(raw) => raw.clone(),
            other => other.to_string(),
        }
    }

    /// Convert a ToolDefinition to OpenAI API format
    fn tool_to_openai(tool: &ToolDefinition) -> Value {
        json!({
            "type": "function",
            "function": {
                "name": tool.name,
                "description": tool.description,
                "parameters": tool.input_schema
            }
        })
    }
}

#[async_trait]
impl CompletionProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &'static str {
        match self.config.provider {
            ProviderType::OpenAI => "openai",
            ProviderType::DeepSeek => "deepseek",
            ProviderType::Llamafile => "llamafile",
        }
    }

    async fn complete(&self, request: CompletionRequest) -> LlmResult<LlmResponse> {
        let api_key = self.api_key()?;
        let url = self.completions_url()?;
        let body = self.build_request_body(&request);

        tracing::debug!(
            provider = self.name(),
            model = %request.model,
            messages = request.messages.len(),
            tools = request.tools.len(),
            "Sending completion request"
        );

        let mut builder = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .json(&body);
        if let Some(key) = api_key {
            builder = builder.header("Authorization", format!("Bearer {}", key));
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_connect() {
                LlmError::ProviderUnavailable {
                    message: e.to_string(),
                }
            } else {
                LlmError::NetworkError {
                    message: e.to_string(),
                }
            }
        })?;

        let status = response.status().as_u16();
        let body_text = response.text().await.map_err(|e| LlmError::NetworkError {
            message: e.to_string(),
        })?;

        if status != 200 {
            return Err(parse_http_error(status, &body_text, self.name()));
        }

        self.adapter.parse(&body_text)
    }
}

/// Adapter for the OpenAI `/chat/completions` reply shape.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenAiAdapter;

impl ResponseAdapter for OpenAiAdapter {
    type Raw = OpenAiResponse;

    fn adapt(&self, raw: OpenAiResponse) -> LlmResult<LlmResponse> {
        let choice = raw
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::ParseError {
                message: "Response contained no choices".to_string(),
            })?;

        let stop_reason = choice
            .finish_reason
            .as_deref()
            .map(StopReason::from)
            .unwrap_or(StopReason::EndTurn);

        let (content, tool_calls) = match choice.message {
            Some(msg) => {
                let tool_calls = msg
                    .tool_calls
                    .unwrap_or_default()
                    .into_iter()
                    .map(|tc| {
                        let arguments = serde_json::from_str(&tc.function.arguments)
                            .unwrap_or(Value::String(tc.function.arguments));
                        ToolCall {
                            id: tc.id,
                            name: tc.function.name,
                            arguments,
                        }
                    })
                    .collect();
                (msg.content, tool_calls)
            }
            None => (None, Vec::new()),
        };

        let usage = raw
            .usage
            .map(|u| UsageStats {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
            })
            .unwrap_or_default();

        Ok(LlmResponse {
            content,
            tool_calls,
            stop_reason,
            usage,
            model: raw.model,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct OpenAiResponse {
    #[serde(default)]
    model: String,
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<ResponseUsage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ResponseMessage>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
    tool_calls: Option<Vec<ResponseToolCall>>,
}

#[derive(Debug, Deserialize)]
struct ResponseToolCall {
    id: String,
    function: ResponseFunction,
}

#[derive(Debug, Deserialize)]
struct ResponseFunction {
    name: String,
    #[serde(default)]
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct ResponseUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}
