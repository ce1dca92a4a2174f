//! Google Gemini `generateContent` transport with optional search grounding.

use std::time::Duration;

use log::{debug, error, info};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::core::config::AssistantConfig;

use super::{AssistantError, Citation, GenerateRequest, Generation, GenerativeBackend};

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini API client
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireRequest {
    system_instruction: WireContent,
    contents: Vec<WireContent>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<WireTool>,
}

#[derive(Debug, Serialize)]
struct WireContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<WirePart>,
}

#[derive(Debug, Serialize)]
struct WirePart {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireTool {
    google_search: EmptyConfig,
}

#[derive(Debug, Serialize)]
struct EmptyConfig {}

#[derive(Debug, Deserialize)]
struct WireResponse {
    #[serde(default)]
    candidates: Vec<WireCandidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireCandidate {
    #[serde(default)]
    content: Option<WireResponseContent>,
    #[serde(default)]
    grounding_metadata: Option<WireGrounding>,
}

#[derive(Debug, Deserialize)]
struct WireResponseContent {
    #[serde(default)]
    parts: Vec<WireResponsePart>,
}

#[derive(Debug, Deserialize)]
struct WireResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireGrounding {
    #[serde(default)]
    grounding_chunks: Vec<WireChunk>,
}

#[derive(Debug, Deserialize)]
struct WireChunk {
    #[serde(default)]
    web: Option<WireWeb>,
}

#[derive(Debug, Deserialize)]
struct WireWeb {
    #[serde(default)]
    uri: Option<String>,
    #[serde(default)]
    title: Option<String>,
}

impl GeminiClient {
    pub fn new(config: &AssistantConfig, api_key: String) -> Result<Self, AssistantError> {
        if api_key.trim().is_empty() {
            return Err(AssistantError::MissingApiKey(config.api_key_env.clone()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(AssistantError::Http)?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
        })
    }

    /// The key travels in the `x-goog-api-key` header, never in the URL.
    fn url(&self) -> String {
        format!("{}/{}:generateContent", self.base_url, self.model)
    }
}

fn build_body(request: &GenerateRequest) -> WireRequest {
    WireRequest {
        system_instruction: WireContent {
            role: None,
            parts: vec![WirePart {
                text: request.system_instruction.clone(),
            }],
        },
        contents: vec![WireContent {
            role: Some("user"),
            parts: vec![WirePart {
                text: request.user_text.clone(),
            }],
        }],
        tools: if request.search_grounding {
            vec![WireTool {
                google_search: EmptyConfig {},
            }]
        } else {
            Vec::new()
        },
    }
}

/// Concatenated candidate text plus web citations from the grounding side channel.
fn parse_generation(body: &str) -> Result<Generation, AssistantError> {
    let response: WireResponse = serde_json::from_str(body)?;
    let Some(candidate) = response.candidates.into_iter().next() else {
        return Ok(Generation::default());
    };

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    let citations = candidate
        .grounding_metadata
        .map(|g| {
            g.grounding_chunks
                .into_iter()
                .filter_map(|chunk| chunk.web)
                .filter_map(|web| {
                    web.uri.map(|uri| Citation {
                        uri,
                        title: web.title,
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    Ok(Generation {
        text: (!text.is_empty()).then_some(text),
        citations,
    })
}

#[async_trait::async_trait]
impl GenerativeBackend for GeminiClient {
    async fn generate(&self, request: &GenerateRequest) -> Result<Generation, AssistantError> {
        let url = self.url();
        debug!("Sending request to Gemini API: {}", url);

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&build_body(request))
            .send()
            .await
            .map_err(|e| AssistantError::Http(e.without_url()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AssistantError::Http(e.without_url()))?;
        debug!("Gemini API response status: {}", status);

        if !status.is_success() {
            error!("Gemini API error: {} - {}", status, body);
            return Err(AssistantError::Api {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        let generation = parse_generation(&body)?;
        info!(
            "Gemini reply: {} chars, {} citations",
            generation.text.as_deref().map_or(0, str::len),
            generation.citations.len()
        );
        Ok(generation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let body = build_body(&GenerateRequest {
            system_instruction: "sys".into(),
            user_text: "why?".into(),
            search_grounding: true,
        });
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["systemInstruction"]["parts"][0]["text"], "sys");
        assert!(json["systemInstruction"].get("role").is_none());
        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][0]["parts"][0]["text"], "why?");
        assert_eq!(json["tools"][0]["googleSearch"], serde_json::json!({}));
    }

    #[test]
    fn test_url_carries_no_key() {
        let cfg = AssistantConfig {
            base_url: "http://127.0.0.1:1/v1beta/models/".into(),
            ..AssistantConfig::default()
        };
        let client = GeminiClient::new(&cfg, "SECRETKEY123".into()).unwrap();
        assert_eq!(
            client.url(),
            "http://127.0.0.1:1/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn test_no_tools_without_grounding() {
        let body = build_body(&GenerateRequest {
            system_instruction: "sys".into(),
            user_text: "plan".into(),
            search_grounding: false,
        });
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("tools").is_none());
    }

    #[test]
    fn test_parse_text_and_citations() {
        let body = r#"{
            "candidates": [{
                "content": {"parts": [{"text": "Hello "}, {"text": "world"}]},
                "groundingMetadata": {"groundingChunks": [
                    {"web": {"uri": "https://x.example", "title": "X"}},
                    {"web": {"uri": "https://y.example"}},
                    {"retrievedContext": {}}
                ]}
            }]
        }"#;
        let g = parse_generation(body).unwrap();
        assert_eq!(g.text.as_deref(), Some("Hello world"));
        assert_eq!(g.citations.len(), 2);
        assert_eq!(g.citations[1].title, None);
    }

    #[test]
    fn test_parse_empty_candidates() {
        let g = parse_generation(r#"{"candidates": []}"#).unwrap();
        assert!(g.text.is_none());
        assert!(parse_generation("not json").is_err());
    }

    #[test]
    fn test_client_requires_key() {
        let cfg = AssistantConfig::default();
        assert!(matches!(
            GeminiClient::new(&cfg, "  ".into()),
            Err(AssistantError::MissingApiKey(_))
        ));
        let client = GeminiClient::new(&cfg, "k".into()).unwrap();
        assert!(client.url().ends_with("/gemini-2.5-flash:generateContent?key=k"));
    }
}
