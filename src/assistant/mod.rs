//! Boundary to the external explanation service.
//!
//! Both calls always produce displayable text: transport and API failures
//! are turned into the localized fallback strings here, so the chat log
//! never sees an error value.

pub mod dispatcher;
pub mod gemini;
pub mod prompts;

use std::sync::Arc;

use log::{info, warn};
use thiserror::Error;

use crate::core::config::AssistantConfig;
use crate::core::site_context::SiteContext;
use crate::core::strings::AssistantStrings;
use crate::core::tree::{Locale, NodeDefinition};
use crate::report::summary::SummaryPayload;

use gemini::GeminiClient;

#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("API key not configured (set {0})")]
    MissingApiKey(String),
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API returned HTTP {status}: {body}")]
    Api { status: u16, body: String },
    #[error("invalid response JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to start async runtime: {0}")]
    Runtime(#[from] std::io::Error),
}

/// A web source reported by the grounding side channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Citation {
    pub uri: String,
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateRequest {
    pub system_instruction: String,
    pub user_text: String,
    pub search_grounding: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Generation {
    pub text: Option<String>,
    pub citations: Vec<Citation>,
}

/// One text-generation round trip.
#[async_trait::async_trait]
pub trait GenerativeBackend: Send + Sync {
    async fn generate(&self, request: &GenerateRequest) -> Result<Generation, AssistantError>;
}

/// Backend used when no API key is configured; every call fails softly.
struct Unconfigured {
    key_env: String,
}

#[async_trait::async_trait]
impl GenerativeBackend for Unconfigured {
    async fn generate(&self, _request: &GenerateRequest) -> Result<Generation, AssistantError> {
        Err(AssistantError::MissingApiKey(self.key_env.clone()))
    }
}

/// Everything an explanation needs, captured when the user asked.
#[derive(Debug, Clone)]
pub struct ExplainRequest {
    pub query: String,
    pub node: NodeDefinition,
    pub locale: Locale,
    pub site: SiteContext,
    pub strings: AssistantStrings,
}

#[derive(Debug, Clone)]
pub struct SummaryRequest {
    pub payload: SummaryPayload,
    pub locale: Locale,
    pub strings: AssistantStrings,
}

#[derive(Clone)]
pub struct Assistant {
    backend: Arc<dyn GenerativeBackend>,
}

impl Assistant {
    pub fn new(backend: Arc<dyn GenerativeBackend>) -> Self {
        Self { backend }
    }

    /// Gemini when a key is available, otherwise a backend that always
    /// answers with the technical-error fallback.
    pub fn from_config(config: &AssistantConfig) -> Self {
        let unconfigured = || -> Arc<dyn GenerativeBackend> {
            Arc::new(Unconfigured {
                key_env: config.api_key_env.clone(),
            })
        };
        let backend = match config.api_key() {
            Some(key) => match GeminiClient::new(config, key) {
                Ok(client) => Arc::new(client) as Arc<dyn GenerativeBackend>,
                Err(e) => {
                    warn!("assistant disabled: {e}");
                    unconfigured()
                }
            },
            None => {
                warn!(
                    "assistant disabled: environment variable {} is not set",
                    config.api_key_env
                );
                unconfigured()
            }
        };
        Self { backend }
    }

    pub async fn explain(&self, req: &ExplainRequest) -> String {
        info!("explanation requested for node {}", req.node.id);
        let request = GenerateRequest {
            system_instruction: prompts::explanation_instruction(&req.node, req.locale, &req.site),
            user_text: req.query.clone(),
            search_grounding: true,
        };
        match self.backend.generate(&request).await {
            Ok(Generation {
                text: Some(mut text),
                citations,
            }) => {
                let sources = prompts::format_sources(&citations);
                if !sources.is_empty() {
                    text.push_str("\n\n");
                    text.push_str(&req.strings.sources_header);
                    text.push('\n');
                    text.push_str(&sources.join("\n"));
                }
                text
            }
            Ok(_) => {
                warn!("explanation reply had no text");
                req.strings.format_error.clone()
            }
            Err(e) => {
                warn!("explanation failed: {e}");
                format!("{}: {}", req.strings.technical_error, e)
            }
        }
    }

    pub async fn summarize(&self, req: &SummaryRequest) -> String {
        info!("strategic summary requested");
        let request = GenerateRequest {
            system_instruction: prompts::summary_instruction(&req.payload, req.locale),
            user_text: prompts::SUMMARY_REQUEST.to_string(),
            search_grounding: false,
        };
        match self.backend.generate(&request).await {
            Ok(Generation {
                text: Some(text), ..
            }) => text,
            Ok(_) => {
                warn!("summary reply had no text");
                req.strings.summary_failed.clone()
            }
            Err(e) => {
                warn!("summary failed: {e}");
                req.strings.summary_service_error.clone()
            }
        }
    }
}
