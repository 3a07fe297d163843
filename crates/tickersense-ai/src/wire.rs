//! Wire shapes for the generative-AI endpoint.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Request payload for `models/{model}:generateContent`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<Tool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
}

impl GenerateContentRequest {
    /// Build a request for one user prompt.
    ///
    /// Structured output and the web-grounding tool are mutually exclusive
    /// upstream: a schema forces schema-constrained JSON and drops the
    /// tool, otherwise the grounding tool is attached so responses can
    /// reflect current information.
    pub fn for_prompt(prompt: &str, schema: Option<Value>) -> Self {
        let contents = vec![Content::user_text(prompt)];

        match schema {
            Some(schema) => Self {
                contents,
                tools: None,
                generation_config: Some(GenerationConfig {
                    response_mime_type: Some(String::from("application/json")),
                    response_schema: Some(schema),
                }),
                system_instruction: None,
            },
            None => Self {
                contents,
                tools: Some(vec![Tool::google_search()]),
                generation_config: None,
                system_instruction: None,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub parts: Vec<Part>,
}

impl Content {
    pub fn user_text(text: &str) -> Self {
        Self {
            role: Some(String::from("user")),
            parts: vec![Part {
                text: text.to_owned(),
            }],
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Part {
    pub text: String,
}

/// Tool attachment; the only tool this service uses is web grounding.
#[derive(Debug, Clone, Serialize)]
pub struct Tool {
    pub google_search: Value,
}

impl Tool {
    pub fn google_search() -> Self {
        Self {
            google_search: Value::Object(serde_json::Map::new()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_schema: Option<Value>,
}

// Response side, Option-rich: a malformed or empty candidate list degrades
// to "no text" instead of a deserialization failure.

#[derive(Debug, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

impl GenerateContentResponse {
    /// First non-empty text fragment of the first candidate, if any.
    pub fn first_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .find_map(|part| part.text)
            .filter(|text| !text.trim().is_empty())
    }
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
pub struct CandidatePart {
    #[serde(default)]
    pub text: Option<String>,
}
