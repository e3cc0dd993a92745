//! Hosted judge over an OpenAI-compatible chat-completions endpoint.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::config::JudgeConfig;
use crate::domain::error::{EvalError, Result};
use crate::judge::model::{JudgeModel, JudgeRequest, JudgeVerdict};

const USER_AGENT: &str = concat!("agenteval/", env!("CARGO_PKG_VERSION"));

pub struct HttpJudge {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl std::fmt::Debug for HttpJudge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpJudge")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl HttpJudge {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| EvalError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
        })
    }

    /// Build from configuration, reading the API key from
    /// `config.api_key_env`.
    pub fn from_config(config: &JudgeConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env).map_err(|_| {
            EvalError::Config(format!(
                "environment variable {} is not set",
                config.api_key_env
            ))
        })?;
        Self::new(&config.endpoint, api_key, &config.model)
    }

    fn capability_err(&self, reason: impl Into<String>) -> EvalError {
        EvalError::ExternalCapability {
            model: self.model.clone(),
            reason: reason.into(),
        }
    }
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

fn system_prompt(request: &JudgeRequest) -> String {
    let criteria: String = request
        .criteria
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{}. {c}\n", i + 1))
        .collect();
    format!(
        "You are an expert evaluator assessing the semantic quality of AI-generated \
         paper reviews against a human baseline review.\n\n\
         Criteria:\n{criteria}\n\
         Respond with a JSON object {{\"score\": number, \"justification\": string}} where \
         score lies between 0 and {max} (0 = completely different, {max} = equivalent). \
         Judge meaning, not wording.",
        max = request.score_scale.max()
    )
}

fn user_prompt(request: &JudgeRequest) -> String {
    let a = &request.agent;
    let b = &request.baseline;
    format!(
        "Agent review:\nRating: {}/10, Confidence: {}/5\nText: {}\n\n\
         Baseline review:\nRating: {}/10, Confidence: {}/5\nText: {}",
        a.rating, a.confidence, a.review_text, b.rating, b.confidence, b.review_text
    )
}

/// Parse `{score, justification}` from a completion. Accepts bare JSON, a
/// fenced ```json block, or the first `{...}` span in surrounding prose.
pub(crate) fn parse_verdict(content: &str) -> Result<JudgeVerdict> {
    let trimmed = content.trim();
    if let Ok(v) = serde_json::from_str::<JudgeVerdict>(trimmed) {
        return Ok(v);
    }
    let candidate = fenced_json(trimmed).or_else(|| {
        let start = trimmed.find('{')?;
        let end = trimmed.rfind('}')?;
        (end > start).then(|| &trimmed[start..=end])
    });
    candidate
        .and_then(|json| serde_json::from_str::<JudgeVerdict>(json).ok())
        .ok_or_else(|| EvalError::JudgeContractViolation {
            reason: "response is not a {score, justification} object".to_string(),
        })
}

static FENCED_JSON: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)```(?:json)?\s*(\{.*?\})\s*```").expect("fenced JSON pattern compiles")
});

fn fenced_json(text: &str) -> Option<&str> {
    FENCED_JSON
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

#[async_trait]
impl JudgeModel for HttpJudge {
    fn model_id(&self) -> &str {
        &self.model
    }

    async fn judge(&self, request: &JudgeRequest) -> Result<JudgeVerdict> {
        let body = json!({
            "model": self.model,
            "temperature": 0,
            "seed": request.sampling_seed,
            "response_format": {"type": "json_object"},
            "messages": [
                {"role": "system", "content": system_prompt(request)},
                {"role": "user", "content": user_prompt(request)},
            ],
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.endpoint))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.capability_err(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let reason = if status.as_u16() == 401 || status.as_u16() == 403 {
                format!("authentication failed (HTTP {})", status.as_u16())
            } else {
                let text = response
                    .text()
                    .await
                    .unwrap_or_else(|e| format!("<body read error: {e}>"));
                format!("HTTP {}: {text}", status.as_u16())
            };
            return Err(self.capability_err(reason));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| self.capability_err(format!("malformed response body: {e}")))?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| self.capability_err("empty choices array in response"))?;

        debug!(model = %self.model, bytes = content.len(), "judge completion received");
        parse_verdict(&content)
    }
}
