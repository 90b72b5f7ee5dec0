use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{normalize_labels, GeneratorError, TextGenerator, KEYWORDS_PER_PICK, MAX_TOPICS};

const TOPICS_PROMPT: &str = "List up to 2 disciplines or fields of study that the following text \
belongs to. Prefer broad fields (\"physics\" over \"theoretical physics\"). Use plain words \
separated by spaces, never underscores or hyphens. \
Answer with a JSON object of the form {\"values\": [\"topic\", ...]}.";

const KEYWORDS_PROMPT: &str = "Produce 5 search keywords for the following text. Do not copy \
words that appear in the text, avoid dates, numbers and generic words such as \"innovation\" or \
\"science\", and include names of specific works when relevant. Use plain words separated by \
spaces. Answer with a JSON object of the form {\"keywords\": [\"keyword\", ...]}.";

/// Chat-completions backed generator.
pub struct OpenAiGenerator {
    api_key: String,
    base_url: String,
    client: Client,
    model: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    response_format: ResponseFormat,
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

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct TopicsPayload {
    values: Vec<String>,
}

#[derive(Deserialize)]
struct KeywordsPayload {
    keywords: Vec<String>,
}

impl OpenAiGenerator {
    pub fn new(
        api_key: &str,
        base_url: &str,
        model: &str,
        timeout: Duration,
    ) -> Result<Self, GeneratorError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GeneratorError::Request(e.to_string()))?;

        Ok(Self {
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            model: model.to_string(),
        })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    /// Send one instruction + text pair and return the raw JSON content of the reply.
    async fn complete(&self, instruction: &str, text: &str) -> Result<String, GeneratorError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: instruction,
                },
                ChatMessage {
                    role: "user",
                    content: text,
                },
            ],
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };

        let resp = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| GeneratorError::Request(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(GeneratorError::Request(format!(
                "completion failed ({status}): {body}"
            )));
        }

        let body: ChatResponse = resp
            .json()
            .await
            .map_err(|e| GeneratorError::Response(e.to_string()))?;

        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| GeneratorError::Response("empty completion".to_string()))
    }
}

#[async_trait]
impl TextGenerator for OpenAiGenerator {
    async fn topics(&self, text: &str) -> Result<Vec<String>, GeneratorError> {
        let content = self.complete(TOPICS_PROMPT, text).await?;
        let payload: TopicsPayload = serde_json::from_str(&content)
            .map_err(|e| GeneratorError::Response(format!("{e}: {content}")))?;
        Ok(normalize_labels(payload.values, MAX_TOPICS))
    }

    async fn keywords(&self, text: &str) -> Result<Vec<String>, GeneratorError> {
        let content = self.complete(KEYWORDS_PROMPT, text).await?;
        let payload: KeywordsPayload = serde_json::from_str(&content)
            .map_err(|e| GeneratorError::Response(format!("{e}: {content}")))?;
        Ok(normalize_labels(payload.keywords, KEYWORDS_PER_PICK))
    }
}
