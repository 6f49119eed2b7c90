//! Best-effort prompt refinement via the Groq chat-completions API.
//!
//! A single request/response with a local fallback: if no API key is
//! configured, or the call fails for any reason, the original prompt is
//! used unchanged. Refinement never fails a generation request.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Groq OpenAI-compatible chat-completions endpoint.
const GROQ_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
/// Model used for refinement.
const GROQ_MODEL: &str = "llama3-8b-8192";
/// Timeout for the refinement call.
const REFINE_TIMEOUT: Duration = Duration::from_secs(20);

/// Errors from the refinement call. Internal to this module's logging;
/// callers only ever see the fallback prompt.
#[derive(Debug, thiserror::Error)]
enum RefineError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Groq API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("Response contained no completion")]
    EmptyResponse,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'static str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

/// Expands terse user prompts into director-style video prompts.
pub struct PromptRefiner {
    client: reqwest::Client,
    api_key: Option<String>,
}

impl PromptRefiner {
    /// Create a refiner. With no API key it degrades to a pass-through.
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
        }
    }

    /// Refine a prompt, falling back to the original on any failure.
    pub async fn refine(&self, prompt: &str, duration_seconds: u32) -> String {
        let Some(api_key) = &self.api_key else {
            return prompt.to_string();
        };

        match self.try_refine(api_key, prompt, duration_seconds).await {
            Ok(refined) => {
                tracing::debug!(original = %prompt, refined = %refined, "Prompt refined");
                refined
            }
            Err(e) => {
                tracing::warn!(error = %e, "Prompt refinement failed, using original prompt");
                prompt.to_string()
            }
        }
    }

    async fn try_refine(
        &self,
        api_key: &str,
        prompt: &str,
        duration_seconds: u32,
    ) -> Result<String, RefineError> {
        let system_prompt = format!(
            "You are an AI director. Expand the user's idea into a precise video prompt \
             for a generative video model. Mention scene, camera, lighting, style, and motion. \
             Target duration: ~{duration_seconds} seconds. Keep it concise (1-2 sentences)."
        );

        let body = ChatRequest {
            model: GROQ_MODEL,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: 0.7,
            max_tokens: 300,
        };

        let response = self
            .client
            .post(GROQ_API_URL)
            .timeout(REFINE_TIMEOUT)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(RefineError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response.json().await?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or(RefineError::EmptyResponse)?;

        Ok(content.trim().to_string())
    }
}
