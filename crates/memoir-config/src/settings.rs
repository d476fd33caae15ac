//! Settings schema and environment loading.

use crate::error::ConfigError;
use std::str::FromStr;

/// Immutable process settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Port the HTTP server binds to.
    pub port: u16,
    /// Default log filter applied when `RUST_LOG` is unset.
    pub log_level: String,
    /// Origins allowed by the CORS layer.
    pub cors_origins: Vec<String>,
    /// Optional Hugging Face API token.
    pub hf_token: Option<String>,
    /// Generation model identifier.
    pub hf_llm_model: String,
    /// Embedding model identifier.
    pub hf_embedding_model: String,
    /// Dimensionality every stored vector must match.
    pub embedding_dimension: usize,
    /// Vector store API key.
    pub pinecone_api_key: Option<String>,
    /// Vector store index name.
    pub pinecone_index: String,
    /// Serverless cloud provider for index creation.
    pub pinecone_cloud: String,
    /// Serverless region for index creation.
    pub pinecone_region: String,
    /// Default number of memories retrieved per turn, clamped to 1..=50.
    pub top_k: usize,
    /// Per-IP request budget per minute.
    pub rate_limit_rpm: u32,
    /// Token budget per generation call.
    pub max_new_tokens: u32,
    /// Sampling temperature per generation call.
    pub temperature: f32,
}

impl Settings {
    /// Load settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let top_k: usize = parse_or(&lookup, "TOP_K", 5)?;
        Ok(Self {
            port: parse_or(&lookup, "PORT", 8000)?,
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            cors_origins: lookup("CORS_ORIGINS")
                .map(|raw| split_origins(&raw))
                .unwrap_or_else(default_origins),
            hf_token: lookup("HF_TOKEN").filter(|v| !v.is_empty()),
            hf_llm_model: lookup("HF_LLM_MODEL")
                .unwrap_or_else(|| "mistralai/Mistral-7B-Instruct-v0.2".to_string()),
            hf_embedding_model: lookup("HF_EMBEDDING_MODEL")
                .unwrap_or_else(|| "sentence-transformers/all-MiniLM-L6-v2".to_string()),
            embedding_dimension: parse_or(&lookup, "EMBEDDING_DIMENSION", 384)?,
            pinecone_api_key: lookup("PINECONE_API_KEY").filter(|v| !v.is_empty()),
            pinecone_index: lookup("PINECONE_INDEX").unwrap_or_else(|| "ai-memory-mvp".to_string()),
            pinecone_cloud: lookup("PINECONE_CLOUD").unwrap_or_else(|| "aws".to_string()),
            pinecone_region: lookup("PINECONE_REGION").unwrap_or_else(|| "us-east-1".to_string()),
            top_k: top_k.clamp(1, 50),
            rate_limit_rpm: parse_or(&lookup, "RATE_LIMIT_RPM", 60)?,
            max_new_tokens: parse_or(&lookup, "MAX_NEW_TOKENS", 256)?,
            temperature: parse_or(&lookup, "TEMPERATURE", 0.2)?,
        })
    }
}

/// Parse an optional variable, falling back to a default when unset.
fn parse_or<T, F>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|err| ConfigError::InvalidField {
            key,
            message: format!("{err}"),
        }),
        None => Ok(default),
    }
}

/// Split a comma-separated origin list, dropping blank entries.
fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|origin| origin.trim().to_string())
        .filter(|origin| !origin.is_empty())
        .collect()
}

fn default_origins() -> Vec<String> {
    vec![
        "http://localhost:7860".to_string(),
        "http://localhost:8000".to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::Settings;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Settings {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| map.get(key).cloned()).expect("settings")
    }

    #[test]
    fn defaults_apply_when_environment_is_empty() {
        let settings = load(&[]);
        assert_eq!(settings.port, 8000);
        assert_eq!(settings.top_k, 5);
        assert_eq!(settings.embedding_dimension, 384);
        assert_eq!(settings.pinecone_index, "ai-memory-mvp");
        assert_eq!(settings.rate_limit_rpm, 60);
        assert_eq!(settings.cors_origins.len(), 2);
        assert_eq!(settings.hf_token, None);
    }

    #[test]
    fn cors_origins_split_on_commas() {
        let settings = load(&[("CORS_ORIGINS", "http://a.test, http://b.test ,")]);
        assert_eq!(
            settings.cors_origins,
            vec!["http://a.test".to_string(), "http://b.test".to_string()]
        );
    }

    #[test]
    fn top_k_is_clamped_to_bounds() {
        assert_eq!(load(&[("TOP_K", "0")]).top_k, 1);
        assert_eq!(load(&[("TOP_K", "500")]).top_k, 50);
        assert_eq!(load(&[("TOP_K", "7")]).top_k, 7);
    }

    #[test]
    fn malformed_numeric_is_rejected() {
        let result = Settings::from_lookup(|key| {
            (key == "PORT").then(|| "not-a-port".to_string())
        });
        assert!(result.is_err());
    }

    #[test]
    fn empty_token_counts_as_unset() {
        let settings = load(&[("HF_TOKEN", "")]);
        assert_eq!(settings.hf_token, None);
        let settings = load(&[("HF_TOKEN", "hf_abc")]);
        assert_eq!(settings.hf_token.as_deref(), Some("hf_abc"));
    }
}
