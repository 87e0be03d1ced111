//! Cloud OCR through a vision LLM.
//!
//! The page PNG is sent as a base64 attachment with a transcription prompt
//! from [`crate::prompts`]. Temperature is pinned to 0: OCR has one right
//! answer, and sampling only adds invented words.

use super::OcrEngine;
use crate::config::VisionOptions;
use crate::error::{Ocr2PdfError, OcrError};
use crate::pipeline::encode::encode_page;
use crate::prompts::{NO_TEXT_SENTINEL, OCR_SYSTEM_PROMPT};
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider, ProviderFactory};
use image::DynamicImage;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Default model when only a provider is named.
pub const DEFAULT_VISION_MODEL: &str = "gpt-4.1-nano";

/// [`OcrEngine`] backed by an `edgequake-llm` vision provider.
pub struct VisionEngine {
    provider: Arc<dyn LLMProvider>,
    system_prompt: String,
    max_tokens: usize,
}

impl fmt::Debug for VisionEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VisionEngine")
            .field("provider", &"<dyn LLMProvider>")
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl VisionEngine {
    /// Wrap a provider the caller already configured.
    pub fn new(provider: Arc<dyn LLMProvider>) -> Self {
        Self {
            provider,
            system_prompt: OCR_SYSTEM_PROMPT.to_string(),
            max_tokens: VisionOptions::default().max_tokens,
        }
    }

    /// Resolve a provider from `options` and the environment.
    pub fn from_options(options: &VisionOptions) -> Result<Self, Ocr2PdfError> {
        let provider = resolve_provider(options)?;
        let mut engine = Self::new(provider).with_max_tokens(options.max_tokens);
        if let Some(ref prompt) = options.system_prompt {
            engine = engine.with_system_prompt(prompt.clone());
        }
        Ok(engine)
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    fn build_options(&self) -> CompletionOptions {
        CompletionOptions {
            temperature: Some(0.0),
            max_tokens: Some(self.max_tokens),
            ..Default::default()
        }
    }
}

#[async_trait]
impl OcrEngine for VisionEngine {
    fn name(&self) -> &str {
        "vision"
    }

    async fn extract_text(&self, image: &DynamicImage) -> Result<String, OcrError> {
        let image_data = encode_page(image)?;
        // The image carries the content; the empty user text only opens the turn.
        let messages = vec![
            ChatMessage::system(self.system_prompt.as_str()),
            ChatMessage::user_with_images("", vec![image_data]),
        ];

        let response = self
            .provider
            .chat(&messages, Some(&self.build_options()))
            .await
            .map_err(|e| OcrError::Api(e.to_string()))?;

        debug!(
            "vision: {} input tokens, {} output tokens",
            response.prompt_tokens, response.completion_tokens
        );
        Ok(normalise_reply(&response.content))
    }
}

/// Map the "no text" sentinel to an empty page.
fn normalise_reply(content: &str) -> String {
    if content.trim() == NO_TEXT_SENTINEL {
        String::new()
    } else {
        content.to_string()
    }
}

fn create_vision_provider(
    provider_name: &str,
    model: &str,
) -> Result<Arc<dyn LLMProvider>, Ocr2PdfError> {
    ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
        Ocr2PdfError::ProviderNotConfigured {
            provider: provider_name.to_string(),
            hint: format!("{e}"),
        }
    })
}

/// Resolve the vision provider, most specific first:
///
/// 1. **Named provider** (`options.provider_name`) with `options.model`.
/// 2. **Environment pair** `EDGEQUAKE_LLM_PROVIDER` + `EDGEQUAKE_MODEL`, both non-empty.
/// 3. **OpenAI** when `OPENAI_API_KEY` is set.
/// 4. **Auto-detection** via [`ProviderFactory::from_env`].
///
/// A caller holding a ready provider skips all of this with [`VisionEngine::new`].
fn resolve_provider(options: &VisionOptions) -> Result<Arc<dyn LLMProvider>, Ocr2PdfError> {
    let model = options.model.as_deref().unwrap_or(DEFAULT_VISION_MODEL);

    if let Some(ref name) = options.provider_name {
        return create_vision_provider(name, model);
    }

    if let (Ok(prov), Ok(env_model)) = (
        std::env::var("EDGEQUAKE_LLM_PROVIDER"),
        std::env::var("EDGEQUAKE_MODEL"),
    ) {
        if !prov.is_empty() && !env_model.is_empty() {
            return create_vision_provider(&prov, &env_model);
        }
    }

    if std::env::var("OPENAI_API_KEY").is_ok_and(|k| !k.is_empty()) {
        return create_vision_provider("openai", model);
    }

    let (llm_provider, _embedding) =
        ProviderFactory::from_env().map_err(|e| Ocr2PdfError::ProviderNotConfigured {
            provider: "auto".to_string(),
            hint: format!(
                "No vision provider could be auto-detected from environment.\n\
                Set OPENAI_API_KEY, ANTHROPIC_API_KEY, or use --engine tesseract.\n\
                Error: {}",
                e
            ),
        })?;

    Ok(llm_provider)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_becomes_empty() {
        assert_eq!(normalise_reply("[[NO_TEXT]]"), "");
        assert_eq!(normalise_reply("  [[NO_TEXT]]\n"), "");
        assert_eq!(normalise_reply("Q1: [[NO_TEXT]]"), "Q1: [[NO_TEXT]]");
        assert_eq!(normalise_reply("Name: Ada\n"), "Name: Ada\n");
    }
}
