//! Short generated texts: the magic explanation on the Learn screen and the
//! motivational message on the Reward screen. Every failure collapses to a
//! fixed fallback string.

pub mod gemini;
pub mod worker;

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::config::Config;

pub use gemini::{GeminiClient, GeminiSettings};
pub use worker::{Delivery, ExplanationWorker, TextRequest, Ticket};

#[derive(Debug, Error)]
pub enum ExplainError {
    #[error("text generation is disabled")]
    Disabled,
    #[error("api key environment variable {0} is not set")]
    MissingApiKey(String),
    #[error("text generation request failed with status {0}")]
    HttpStatus(u16),
    #[error("text generation returned an empty response")]
    EmptyResponse,
    #[cfg(feature = "network")]
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("built without network support")]
    Unavailable,
}

/// Raw prompt-in, text-out backend.
pub trait TextClient: Send + Sync {
    fn generate(&self, prompt: &str, temperature: f32) -> Result<String, ExplainError>;
}

/// Never reaches a backend; every call falls back.
pub struct OfflineClient;

impl TextClient for OfflineClient {
    fn generate(&self, _prompt: &str, _temperature: f32) -> Result<String, ExplainError> {
        Err(ExplainError::Disabled)
    }
}

/// Texts for the learner. Implementations never fail.
pub trait ExplanationProvider: Send + Sync {
    fn table_explanation(&self, table: u32, sample_factor: u32) -> String;
    fn motivational_message(&self, child_name: &str, achievement: &str) -> String;
}

pub fn explanation_fallback(table: u32, sample_factor: u32, child_name: &str) -> String {
    format!(
        "Si tienes {table} gatitos y cada uno tiene {sample_factor} juguetes, \
         ¡tienes {} juguetes en total, {child_name}! 🐾",
        table * sample_factor
    )
}

pub fn motivation_fallback(child_name: &str) -> String {
    format!("¡Eres una campeona de las matemáticas, {child_name}! 🌟")
}

pub fn table_achievement_summary(table: u32) -> String {
    format!("Excelente dominando la tabla del {table}")
}

pub struct MagicExplainer<C: TextClient> {
    client: C,
    child_name: String,
}

impl<C: TextClient> MagicExplainer<C> {
    pub fn new(client: C, child_name: &str) -> Self {
        Self {
            client,
            child_name: child_name.to_string(),
        }
    }

    fn generate_or(&self, prompt: &str, temperature: f32, fallback: String) -> String {
        match self.client.generate(prompt, temperature) {
            Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) => {
                warn!("text generation returned blank output, using fallback");
                fallback
            }
            Err(ExplainError::Disabled) => fallback,
            Err(e) => {
                warn!("text generation failed: {e}");
                fallback
            }
        }
    }
}

impl<C: TextClient> ExplanationProvider for MagicExplainer<C> {
    fn table_explanation(&self, table: u32, sample_factor: u32) -> String {
        let name = &self.child_name;
        let prompt = format!(
            "Explica por qué {table} x {sample_factor} es {} a una niña de 7 años llamada {name}. \
             Usa una analogía muy visual (como gatitos, dulces, unicornios o arcoiris). \
             Sé muy breve (máximo 30 palabras).",
            table * sample_factor
        );
        self.generate_or(
            &prompt,
            0.7,
            explanation_fallback(table, sample_factor, name),
        )
    }

    fn motivational_message(&self, child_name: &str, achievement: &str) -> String {
        let prompt = format!(
            "Eres un hada mágica que enseña matemáticas a una niña de 7 años llamada {child_name}. \
             Acaba de lograr: {achievement}. \
             Dale un mensaje corto (máximo 20 palabras), muy dulce y motivador, mencionando su nombre ({child_name}). \
             Usa muchos emojis de estrellas, hadas y corazones."
        );
        self.generate_or(&prompt, 0.9, motivation_fallback(child_name))
    }
}

/// Gemini-backed provider when configured and reachable, otherwise one
/// that always answers with the fallback texts.
pub fn provider_from_config(config: &Config) -> Arc<dyn ExplanationProvider> {
    match GeminiSettings::from_config(config).and_then(GeminiClient::new) {
        Ok(client) => Arc::new(MagicExplainer::new(client, &config.child_name)),
        Err(e) => {
            info!("generated texts disabled: {e}");
            Arc::new(MagicExplainer::new(OfflineClient, &config.child_name))
        }
    }
}
