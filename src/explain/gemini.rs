use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::explain::{ExplainError, TextClient};

#[derive(Clone, Debug)]
pub struct GeminiSettings {
    pub base_url: String,
    pub model: String,
    pub api_key: String,
    pub timeout_secs: u64,
}

impl GeminiSettings {
    /// Settings from config plus the api key read from the environment.
    pub fn from_config(config: &Config) -> Result<Self, ExplainError> {
        if !config.ai_enabled {
            return Err(ExplainError::Disabled);
        }
        let api_key = std::env::var(&config.ai_api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ExplainError::MissingApiKey(config.ai_api_key_env.clone()))?;
        Ok(Self {
            base_url: config.ai_base_url.clone(),
            model: config.ai_model.clone(),
            api_key,
            timeout_secs: config.ai_timeout_secs,
        })
    }

    pub fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

/// Keeps the key out of request URLs, which reqwest errors echo.
#[cfg(feature = "network")]
const API_KEY_HEADER: &str = "x-goog-api-key";

pub struct GeminiClient {
    #[cfg_attr(not(feature = "network"), allow(dead_code))]
    settings: GeminiSettings,
    #[cfg(feature = "network")]
    http: reqwest::blocking::Client,
}

impl GeminiClient {
    #[cfg(feature = "network")]
    pub fn new(settings: GeminiSettings) -> Result<Self, ExplainError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(settings.timeout_secs))
            .build()?;
        Ok(Self { settings, http })
    }

    #[cfg(not(feature = "network"))]
    pub fn new(_settings: GeminiSettings) -> Result<Self, ExplainError> {
        Err(ExplainError::Unavailable)
    }
}

impl TextClient for GeminiClient {
    #[cfg(feature = "network")]
    fn generate(&self, prompt: &str, temperature: f32) -> Result<String, ExplainError> {
        let payload = GenerateRequest::new(prompt, temperature);
        let response = self
            .http
            .post(self.settings.endpoint())
            .header(API_KEY_HEADER, self.settings.api_key.as_str())
            .json(&payload)
            .send()
            .map_err(|e| ExplainError::Http(e.without_url()))?;

        if !response.status().is_success() {
            return Err(ExplainError::HttpStatus(response.status().as_u16()));
        }

        let body: GenerateResponse = response
            .json()
            .map_err(|e| ExplainError::Http(e.without_url()))?;
        body.first_text().ok_or(ExplainError::EmptyResponse)
    }

    #[cfg(not(feature = "network"))]
    fn generate(&self, _prompt: &str, _temperature: f32) -> Result<String, ExplainError> {
        Err(ExplainError::Unavailable)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

impl GenerateRequest {
    fn new(prompt: &str, temperature: f32) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                }],
            }],
            generation_config: GenerationConfig { temperature },
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

impl GenerateResponse {
    fn first_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .filter_map(|c| c.content)
            .flat_map(|c| c.parts)
            .filter_map(|p| p.text)
            .find(|t| !t.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_config_is_rejected() {
        let config = Config {
            ai_enabled: false,
            ..Config::default()
        };
        assert!(matches!(
            GeminiSettings::from_config(&config),
            Err(ExplainError::Disabled)
        ));
    }

    #[test]
    fn test_missing_key_is_rejected() {
        let config = Config {
            ai_api_key_env: "TABLAS_TEST_KEY_THAT_IS_NEVER_SET".to_string(),
            ..Config::default()
        };
        match GeminiSettings::from_config(&config) {
            Err(ExplainError::MissingApiKey(var)) => {
                assert_eq!(var, "TABLAS_TEST_KEY_THAT_IS_NEVER_SET")
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_endpoint_format() {
        let settings = GeminiSettings {
            base_url: "https://example.test/v1beta/".to_string(),
            model: "m1".to_string(),
            api_key: "k".to_string(),
            timeout_secs: 10,
        };
        assert_eq!(settings.endpoint(), "https://example.test/v1beta/models/m1:generateContent");
    }

    #[test]
    fn test_request_body_shape() {
        let json = serde_json::to_value(GenerateRequest::new("hola", 0.7)).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hola");
        assert!(json["generationConfig"]["temperature"].as_f64().unwrap() > 0.69);
    }

    #[cfg(feature = "network")]
    #[test]
    fn test_transport_errors_never_carry_the_key() {
        let client = GeminiClient::new(GeminiSettings {
            base_url: "http://127.0.0.1:1/v1beta".to_string(),
            model: "m".to_string(),
            api_key: "SUPERSECRETKEY".to_string(),
            timeout_secs: 2,
        })
        .unwrap();

        let err = client.generate("hola", 0.7).unwrap_err();
        assert!(matches!(err, ExplainError::Http(_)));
        assert!(!err.to_string().contains("SUPERSECRETKEY"));
        assert!(!format!("{err:?}").contains("SUPERSECRETKEY"));
    }

    #[test]
    fn test_response_text_extraction() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"  "},{"text":"¡Magia!"}]}}]}"#;
        let parsed: GenerateResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.first_text().as_deref(), Some("¡Magia!"));

        let empty: GenerateResponse = serde_json::from_str(r#"{"candidates":[]}"#).unwrap();
        assert_eq!(empty.first_text(), None);
        let blocked: GenerateResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(blocked.first_text(), None);
    }
}
