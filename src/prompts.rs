use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::models::chat::{ChatCompletionRequest, ChatMessage, ContentPart, ImageUrl};

const DEFAULT_TEXT_SYSTEM: &str = "あなたはていねいで優しい先生くまお先生です。";
const DEFAULT_VISION_SYSTEM: &str = "画像を見て質問に答えてください。";
const DEFAULT_VISION_INSTRUCTION: &str = "この画像からわかることを教えてください。";

/// Fixed prompts wrapped around every user message.
///
/// Loaded from a JSON file when `--prompt-config=<path>` is given; any field
/// left out keeps its default.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PromptConfig {
    /// System prompt for text conversations
    #[serde(default = "default_text_system")]
    pub text_system: String,

    /// System prompt for image questions
    #[serde(default = "default_vision_system")]
    pub vision_system: String,

    /// User instruction sent alongside the image
    #[serde(default = "default_vision_instruction")]
    pub vision_instruction: String,
}

fn default_text_system() -> String {
    DEFAULT_TEXT_SYSTEM.to_string()
}

fn default_vision_system() -> String {
    DEFAULT_VISION_SYSTEM.to_string()
}

fn default_vision_instruction() -> String {
    DEFAULT_VISION_INSTRUCTION.to_string()
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            text_system: default_text_system(),
            vision_system: default_vision_system(),
            vision_instruction: default_vision_instruction(),
        }
    }
}

impl PromptConfig {
    /// Load prompt configuration from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).with_context(|| {
            format!(
                "Failed to read prompt config file: {}",
                path.as_ref().display()
            )
        })?;

        let config: PromptConfig = serde_json::from_str(&content)
            .with_context(|| "Failed to parse prompt config JSON")?;

        Ok(config)
    }

    /// System prompt followed by the user's text.
    pub fn text_request(&self, model: &str, max_tokens: u32, text: &str) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: model.to_string(),
            messages: vec![
                ChatMessage::system(self.text_system.clone()),
                ChatMessage::user(text),
            ],
            max_tokens: Some(max_tokens),
        }
    }

    /// System prompt followed by one user message holding the instruction and the image.
    pub fn vision_request(
        &self,
        model: &str,
        max_tokens: u32,
        mime: &str,
        image_base64: &str,
    ) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: model.to_string(),
            messages: vec![
                ChatMessage::system(self.vision_system.clone()),
                ChatMessage::user_parts(vec![
                    ContentPart::Text {
                        text: self.vision_instruction.clone(),
                    },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl::data(mime, image_base64),
                    },
                ]),
            ],
            max_tokens: Some(max_tokens),
        }
    }
}
