//! Gemini `generateContent` request/response bodies and failure classification.

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::domain::conversation::PromptTurn;
use crate::ports::{BackendError, InlineAttachment};

/// Status string Gemini uses for quota exhaustion.
const RESOURCE_EXHAUSTED: &str = "RESOURCE_EXHAUSTED";

#[derive(Debug, Serialize)]
pub(crate) struct GenerateContentRequest {
    pub contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
pub(crate) struct Content {
    pub role: &'static str,
    pub parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub(crate) enum Part {
    Text {
        text: String,
    },
    InlineData {
        inline_data: InlineDataPayload,
    },
}

#[derive(Debug, Serialize)]
pub(crate) struct InlineDataPayload {
    pub mime_type: String,
    pub data: String,
}

impl GenerateContentRequest {
    /// History turns in order, the last one being the new message.
    pub fn chat(turns: &[PromptTurn]) -> Self {
        let contents = turns
            .iter()
            .map(|turn| Content {
                role: turn.role.as_str(),
                parts: vec![Part::Text {
                    text: turn.text.clone(),
                }],
            })
            .collect();

        Self { contents }
    }

    /// One user content carrying the inline binary followed by the prompt.
    pub fn attachment(prompt: &str, attachment: &InlineAttachment) -> Self {
        Self {
            contents: vec![Content {
                role: "user",
                parts: vec![
                    Part::InlineData {
                        inline_data: InlineDataPayload {
                            mime_type: attachment.mime_type.clone(),
                            data: BASE64_STANDARD.encode(&attachment.data),
                        },
                    },
                    Part::Text {
                        text: prompt.to_string(),
                    },
                ],
            }],
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// First text part of the first candidate; `None` when there is nothing usable.
    pub fn into_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .and_then(|content| content.parts.into_iter().find_map(|part| part.text))
            .filter(|text| !text.trim().is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    status: Option<String>,
}

/// Classifies a non-success HTTP answer.
pub(crate) fn classify_status(status: StatusCode, body: &str) -> BackendError {
    let parsed = serde_json::from_str::<ErrorWrapper>(body).ok();
    let api_status = parsed.as_ref().and_then(|w| w.error.status.as_deref());
    let message = parsed
        .as_ref()
        .and_then(|w| w.error.message.clone())
        .unwrap_or_else(|| body.trim().to_string());

    if status == StatusCode::TOO_MANY_REQUESTS || api_status == Some(RESOURCE_EXHAUSTED) {
        BackendError::quota_exceeded(format!("HTTP {}: {}", status.as_u16(), message))
    } else {
        BackendError::fatal(format!("HTTP {}: {}", status.as_u16(), message))
    }
}
