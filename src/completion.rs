//! Completion client.  The handler only sees the [`CompletionBackend`] trait;
//! [`GroqClient`] is the production implementation that talks to an
//! OpenAI-compatible chat-completions endpoint.

use serde::{Deserialize, Serialize};

use crate::error::SummarizeError;
use crate::prompt::PromptSpec;

/// Groq's OpenAI-compatible chat-completions endpoint.
pub const GROQ_CHAT_COMPLETIONS_URL: &str = "https://api.groq.com/openai/v1/chat/completions";

/// Anything able to turn a prompt into generated text.  Implementations
/// perform at most one outbound call per invocation and never retry.
#[async_trait::async_trait]
pub trait CompletionBackend: Send + Sync {
    fn name(&self) -> &str;
    async fn complete(&self, prompt: PromptSpec) -> Result<String, SummarizeError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f64,
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
    message: Option<ChatChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// Client for the Groq chat-completions API.  The credential is handed in at
/// construction; transport settings are reqwest's defaults.
pub struct GroqClient {
    api_key: String,
    endpoint: String,
    client: reqwest::Client,
}

impl GroqClient {
    pub fn new(
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self {
            api_key: api_key.into(),
            endpoint: endpoint.into(),
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

fn request_payload(prompt: &PromptSpec) -> ChatRequest<'_> {
    ChatRequest {
        model: &prompt.model,
        messages: [
            ChatMessage {
                role: "system",
                content: &prompt.system_instruction,
            },
            ChatMessage {
                role: "user",
                content: &prompt.user_message,
            },
        ],
        temperature: prompt.temperature,
    }
}

/// Pull `choices[0].message.content` out of a successful response body.
fn parse_completion(body: &str) -> Result<String, SummarizeError> {
    let parsed: ChatResponse = serde_json::from_str(body).map_err(|err| {
        SummarizeError::MalformedUpstreamResponse(format!("invalid JSON body: {err}"))
    })?;
    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .and_then(|message| message.content)
        .ok_or_else(|| {
            SummarizeError::MalformedUpstreamResponse(
                "missing choices[0].message.content".to_string(),
            )
        })
}

#[async_trait::async_trait]
impl CompletionBackend for GroqClient {
    fn name(&self) -> &str {
        "groq"
    }

    async fn complete(&self, prompt: PromptSpec) -> Result<String, SummarizeError> {
        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request_payload(&prompt))
            .send()
            .await?;
        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            tracing::warn!(
                backend = "groq",
                status = status.as_u16(),
                "completion API returned an error status"
            );
            return Err(SummarizeError::Upstream {
                status: status.as_u16(),
                body,
            });
        }
        parse_completion(&body)
    }
}
