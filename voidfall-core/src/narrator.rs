//! AI narration layer over the Gemini client.
//!
//! The narrator is strictly fail-soft: every enhancement call has a base
//! text to fall back on, and timeouts, transport errors, and empty model
//! output all return that base text unchanged. Game flow never waits on
//! the model beyond the configured timeout and never fails because of it.

use crate::story::StoryNode;
use gemini::{Gemini, Request};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 256;
const DEFAULT_TEMPERATURE: f32 = 0.8;
const SUMMARY_FALLBACK: &str = "Story node";

#[derive(Debug, Error)]
pub enum NarratorError {
    #[error("GEMINI_API_KEY is not set")]
    NoApiKey,
}

/// Tunables for narration requests.
#[derive(Debug, Clone)]
pub struct NarratorConfig {
    /// Override the client's default model.
    pub model: Option<String>,
    /// Language the narration is written in.
    pub language: String,
    pub max_output_tokens: u32,
    pub temperature: f32,
    /// Hard ceiling on each narration request.
    pub timeout: Duration,
}

impl Default for NarratorConfig {
    fn default() -> Self {
        Self {
            model: None,
            language: "English".to_string(),
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl NarratorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.max_output_tokens = max_output_tokens;
        self
    }
}

/// Source of enhanced outcome narration. Implementations must honor the
/// fail-soft contract: return `base_text` when no better text is
/// available, never an error.
pub trait Narrate: Send + Sync {
    fn enhance<'a>(
        &'a self,
        base_text: &'a str,
        action_text: &'a str,
        roll: u8,
        success: bool,
    ) -> Pin<Box<dyn Future<Output = String> + Send + 'a>>;
}

impl Narrate for Narrator {
    fn enhance<'a>(
        &'a self,
        base_text: &'a str,
        action_text: &'a str,
        roll: u8,
        success: bool,
    ) -> Pin<Box<dyn Future<Output = String> + Send + 'a>> {
        Box::pin(Narrator::enhance(self, base_text, action_text, roll, success))
    }
}

/// Generates dramatic scene text from outcome facts.
#[derive(Clone)]
pub struct Narrator {
    client: Gemini,
    config: NarratorConfig,
}

impl Narrator {
    pub fn new(client: Gemini) -> Self {
        Self {
            client,
            config: NarratorConfig::default(),
        }
    }

    /// Build a narrator from the `GEMINI_API_KEY` environment variable.
    pub fn from_env() -> Result<Self, NarratorError> {
        let client = Gemini::from_env().map_err(|_| NarratorError::NoApiKey)?;
        Ok(Self::new(client))
    }

    pub fn with_config(mut self, config: NarratorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &NarratorConfig {
        &self.config
    }

    /// Rewrite the target node's base text in the light of the action the
    /// player took and how the dice fell. Returns the base text untouched
    /// on any failure.
    pub async fn enhance(
        &self,
        base_text: &str,
        action_text: &str,
        roll: u8,
        success: bool,
    ) -> String {
        let prompt = enhance_prompt(base_text, action_text, roll, success, &self.config.language);
        match self.generate(prompt).await {
            Some(text) => text,
            None => base_text.to_string(),
        }
    }

    /// A terse one-line summary of a node, for overview displays. Falls
    /// back to a generic label on any failure.
    pub async fn summarize_node(&self, node: &StoryNode) -> String {
        let prompt = format!(
            "Summarize this scene from a sci-fi adventure in at most 10 words, \
             in {}. Reply with the summary only.\n\nTitle: {}\n\n{}",
            self.config.language, node.title, node.text
        );
        match self.generate(prompt).await {
            Some(text) => text,
            None => SUMMARY_FALLBACK.to_string(),
        }
    }

    /// One attempt, bounded by the configured timeout. `None` covers
    /// timeout, transport or API errors, and blank output alike.
    async fn generate(&self, prompt: String) -> Option<String> {
        let mut request = Request::new(prompt)
            .with_temperature(self.config.temperature)
            .with_max_output_tokens(self.config.max_output_tokens);
        if let Some(model) = &self.config.model {
            request = request.with_model(model.clone());
        }

        let response = tokio::time::timeout(self.config.timeout, self.client.generate(request))
            .await
            .ok()?
            .ok()?;
        let text = response.text().trim().to_string();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

fn enhance_prompt(
    base_text: &str,
    action_text: &str,
    roll: u8,
    success: bool,
    language: &str,
) -> String {
    let outcome = if success { "SUCCESS" } else { "FAILURE" };
    format!(
        "You are the game master of a tense sci-fi survival adventure aboard \
         a derelict spaceship.\n\n\
         Context (what happens next): {base_text}\n\
         The player's action: {action_text}\n\
         Dice roll: {roll} (scale 1-20)\n\
         Outcome: {outcome}\n\n\
         Rewrite the context as a dramatic scene that reflects the player's \
         action and how well the roll went. At most 3 sentences. Write in \
         {language}. Do not mention dice, rolls, or game mechanics."
    )
}
