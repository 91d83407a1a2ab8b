//! OpenAI chat-completions client.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{require, Settings};
use crate::{Error, Result};
use super::LanguageModel;

/// `POST {base_url}/chat/completions` with a fixed temperature of 0.
pub struct OpenAiChat {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ChatTurn<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatTurn<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiChat {
    /// The key is only checked when the first request is sent.
    pub fn new(api_key: Option<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: crate::config::DEFAULT_OPENAI_BASE_URL.to_string(),
            model: model.into(),
            temperature: 0.0,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.openai_api_key.clone(), settings.openai_model.as_str())
            .with_base_url(settings.openai_base_url.as_str())
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn request_body<'a>(&'a self, prompt: &'a str, system_instruction: Option<&'a str>) -> ChatRequest<'a> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = system_instruction {
            messages.push(ChatTurn { role: "system", content: system });
        }
        messages.push(ChatTurn { role: "user", content: prompt });
        ChatRequest { model: &self.model, temperature: self.temperature, messages }
    }
}

#[async_trait]
impl LanguageModel for OpenAiChat {
    async fn invoke(&self, prompt: &str, system_instruction: Option<&str>) -> Result<String> {
        let api_key = require(&self.api_key, "OPENAI_API_KEY")?;
        let endpoint = format!("{}/chat/completions", self.base_url);
        debug!(model = %self.model, %endpoint, "sending chat completion");

        let response = self
            .client
            .post(&endpoint)
            .bearer_auth(api_key)
            .json(&self.request_body(prompt, system_instruction))
            .send()
            .await
            .map_err(|e| Error::LlmError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::LlmError(format!("{status}: {body}")));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| Error::LlmError(format!("malformed completion: {e}")))?;

        Ok(parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default())
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let chat = OpenAiChat::new(Some("sk-test".into()), "gpt-4o");
        let body = serde_json::to_value(chat.request_body("question", Some("be brief"))).unwrap();

        assert_eq!(body["model"], "gpt-4o");
        assert_eq!(body["temperature"], 0.0);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["content"], "question");
    }

    #[test]
    fn test_response_parsing_tolerates_null_content() {
        let parsed: ChatResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#).unwrap();
        assert!(parsed.choices[0].message.content.is_none());
    }

    #[tokio::test]
    async fn test_missing_key_fails_on_first_call() {
        let chat = OpenAiChat::new(None, "gpt-4o").with_base_url("http://127.0.0.1:9/");
        let err = chat.invoke("hi", None).await.unwrap_err();
        assert!(matches!(err, Error::ConfigError(_)));
        assert_eq!(chat.model_name(), "gpt-4o");
    }
}
