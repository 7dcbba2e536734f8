//! Single-shot question answering against a hosted completion model.
//!
//! Every call is independent: the client sends the prior turns it wants the
//! model to see and nothing is remembered between requests.

use crate::api::error::AppError;
use anyhow::{Context, anyhow};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use utoipa::ToSchema;

const TUTOR_INSTRUCTIONS: &str = "You are an academic tutor for secondary and higher secondary school students. \
Answer the student's question clearly and concisely. \
Walk through problem-solving questions step by step and explain concepts in simple terms. \
Be encouraging, and format the answer as Markdown.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Sends `prompt` and returns the generated text.
    async fn complete(&self, prompt: &str) -> anyhow::Result<String>;
}

/// `generateContent` client for Gemini-compatible endpoints.
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl GeminiClient {
    pub fn new(base_url: String, api_key: Option<String>, model: String) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;
        Ok(Self {
            http,
            base_url,
            api_key,
            model,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

/// Concatenated text parts of the first candidate.
pub fn extract_answer(body: &Value) -> Option<String> {
    let parts = body
        .get("candidates")?
        .get(0)?
        .get("content")?
        .get("parts")?
        .as_array()?;

    let text: String = parts
        .iter()
        .filter_map(|p| p.get("text").and_then(Value::as_str))
        .collect();

    if text.trim().is_empty() { None } else { Some(text) }
}

#[async_trait]
impl CompletionClient for GeminiClient {
    async fn complete(&self, prompt: &str) -> anyhow::Result<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| anyhow!("AI_API_KEY is not configured"))?;

        let res = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&json!({
                "contents": [{ "role": "user", "parts": [{ "text": prompt }] }]
            }))
            .send()
            .await
            .context("completion request failed")?;

        let status = res.status();
        if !status.is_success() {
            let detail = res.text().await.unwrap_or_default();
            return Err(anyhow!("completion endpoint returned {}: {}", status, detail));
        }

        let body: Value = res.json().await.context("invalid completion response")?;
        extract_answer(&body).ok_or_else(|| anyhow!("completion response carried no text"))
    }
}

pub struct TutorService {
    client: Arc<dyn CompletionClient>,
}

impl TutorService {
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self { client }
    }

    pub fn build_prompt(question: &str, history: &[ChatTurn]) -> String {
        let mut prompt = String::from(TUTOR_INSTRUCTIONS);
        prompt.push_str("\n\n");

        if !history.is_empty() {
            prompt.push_str("Conversation so far:\n");
            for turn in history {
                let speaker = match turn.role {
                    ChatRole::User => "Student",
                    ChatRole::Model => "Tutor",
                };
                prompt.push_str(&format!("{}: {}\n", speaker, turn.content));
            }
            prompt.push('\n');
        }

        prompt.push_str(&format!(
            "The student's latest question is:\n'{}'\n\nProvide your answer.",
            question
        ));
        prompt
    }

    pub async fn ask(&self, question: &str, history: &[ChatTurn]) -> Result<String, AppError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(AppError::Validation("Please enter a question.".to_string()));
        }

        let prompt = Self::build_prompt(question, history);
        tracing::debug!(
            "🤖 Asking tutor ({} prior turns, {} prompt chars)",
            history.len(),
            prompt.len()
        );

        self.client.complete(&prompt).await.map_err(|e| {
            tracing::error!("❌ Tutor completion failed: {:?}", e);
            AppError::Ai(e.to_string())
        })
    }
}
