use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A chat prompt: optional system instructions plus the user turn.
#[derive(Debug, Clone, PartialEq)]
pub struct Prompt {
    pub system: Option<String>,
    pub user: String,
}

impl Prompt {
    #[cfg(test)]
    pub fn user_only(user: impl Into<String>) -> Self {
        Self {
            system: None,
            user: user.into(),
        }
    }
}

/// Text completion backend
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, model: &str, prompt: &Prompt) -> Result<String>;
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChatResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

fn build_request<'a>(model: &'a str, prompt: &'a Prompt) -> ChatRequest<'a> {
    let mut messages = Vec::with_capacity(2);
    if let Some(system) = &prompt.system {
        messages.push(ChatMessage { role: "system", content: system });
    }
    messages.push(ChatMessage { role: "user", content: &prompt.user });

    ChatRequest {
        model,
        messages,
        temperature: 0.7,
    }
}

fn first_content(response: ChatResponse) -> Result<String> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .and_then(|message| message.content)
        .map(|content| content.trim().to_string())
        .filter(|content| !content.is_empty())
        .ok_or_else(|| anyhow::anyhow!("OpenRouter returned no content."))
}

/// Minimal non-streaming OpenRouter chat completions client.
pub struct OpenRouterClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl OpenRouterClient {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }
}

#[async_trait]
impl CompletionClient for OpenRouterClient {
    async fn complete(&self, model: &str, prompt: &Prompt) -> Result<String> {
        if self.api_key.trim().is_empty() {
            anyhow::bail!("Missing OpenRouter API key (set OPENROUTER_API_KEY or --set-api-key)");
        }

        let url = format!("{}/chat/completions", self.base_url);
        tracing::debug!("Requesting completion from {} with model {}", url, model);

        let response = self.client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&build_request(model, prompt))
            .send()
            .await
            .context("Failed to reach OpenRouter")?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            anyhow::bail!("OpenRouter error: {} {}", status.as_u16(), text);
        }

        let body: ChatResponse = response
            .json()
            .await
            .context("Failed to decode OpenRouter response")?;

        first_content(body)
    }
}
