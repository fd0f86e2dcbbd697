//! Settings with built-in defaults, a JSON overlay and env overrides.

use crate::error::ConfigError;
use crate::secret::ApiKey;
use rag_turn::LmConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// File read by [`Settings::load`] when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "rag.json";

const GEMINI_API_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent";

/// Which OpenAI-compatible backend serves the LM.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// api.groq.com
    #[default]
    Groq,
    /// api.openai.com
    OpenAi,
}

impl ProviderKind {
    fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "groq" => Some(Self::Groq),
            "openai" => Some(Self::OpenAi),
            _ => None,
        }
    }
}

/// Credentials. Every key is optional until something needs it.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiKeys {
    /// `GROQ_API_KEY`
    pub groq: Option<ApiKey>,
    /// `GEMINI_API_KEY`
    pub gemini: Option<ApiKey>,
    /// `OPENAI_API_KEY`
    pub openai: Option<ApiKey>,
    /// `UNSTRUCTURED_API_KEY`
    pub unstructured: Option<ApiKey>,
    /// `PATHWAY_LICENSE_KEY`
    pub pathway_license: Option<ApiKey>,
}

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Bind address.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Headers sent on outgoing JSON requests.
    pub request_headers: BTreeMap<String, String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8666,
            request_headers: BTreeMap::from([(
                "Content-Type".to_string(),
                "application/json".to_string(),
            )]),
        }
    }
}

/// Where documents live and how they are split.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentSettings {
    /// Raw uploads.
    pub data_folder: PathBuf,
    /// Documents after cleaning.
    pub cleaned_data_folder: PathBuf,
    /// Tables extracted from documents.
    pub csv_folder: PathBuf,
    /// Document partitioning endpoint.
    pub unstructured_api_url: String,
    /// Chunk size in tokens.
    pub chunk_size: usize,
    /// Tokens shared by consecutive chunks.
    pub chunk_overlap: usize,
    /// Placeholder replaced by a table's file name.
    pub table_key: String,
}

impl Default for DocumentSettings {
    fn default() -> Self {
        Self {
            data_folder: PathBuf::from("data"),
            cleaned_data_folder: PathBuf::from("documentations"),
            csv_folder: PathBuf::from("csv_files"),
            unstructured_api_url: "https://api.unstructuredapp.io/general/v0/general".into(),
            chunk_size: 512,
            chunk_overlap: 20,
            table_key: "TABLE_FILE_NAME".into(),
        }
    }
}

/// Retrieval and prompt assembly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    /// Passages returned per query.
    pub top_k: usize,
    /// Minimum similarity for a passage to count.
    pub threshold: f64,
    /// Web search results kept.
    pub search_max_results: usize,
    /// Placeholder for retrieved context in prompt templates.
    pub context_key: String,
    /// Placeholder for system instructions in prompt templates.
    pub system_instructions_key: String,
    /// How many times a query may be split into sub-queries.
    pub max_decomposition_depth: u32,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            top_k: 5,
            threshold: 0.3,
            search_max_results: 5,
            context_key: "CONTEXT".into(),
            system_instructions_key: "SYSTEM_INSTRUCTIONS".into(),
            max_decomposition_depth: 4,
        }
    }
}

/// The LM every call-site shares.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LmSettings {
    /// Backend.
    pub provider: ProviderKind,
    /// Model identifier.
    pub model: String,
    /// Overrides the backend's default base URL.
    pub base_url: Option<String>,
    /// Completion budget per call.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f64,
    /// Retries for rate limits and transient failures.
    pub max_retries: u32,
}

impl Default for LmSettings {
    fn default() -> Self {
        let defaults = LmConfig::default();
        Self {
            provider: ProviderKind::Groq,
            model: "llama-3.3-70b-versatile".into(),
            base_url: None,
            max_tokens: defaults.max_tokens,
            temperature: defaults.temperature,
            max_retries: defaults.max_retries,
        }
    }
}

/// Everything the workspace can be configured with.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Credentials.
    pub keys: ApiKeys,
    /// HTTP server.
    pub server: ServerSettings,
    /// Document storage and chunking.
    pub documents: DocumentSettings,
    /// Retrieval.
    pub retrieval: RetrievalSettings,
    /// Language model.
    pub lm: LmSettings,
    /// Call-site names the call logger records. Empty records all.
    pub tracked_agents: Vec<String>,
}

impl Settings {
    /// Parse settings from JSON. Missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read settings from a JSON file.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Resolve settings the way the CLI does: `path` if given, else
    /// [`DEFAULT_CONFIG_FILE`] if it exists, else defaults; then env
    /// overrides; then validation.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut settings = match path {
            Some(path) => Self::from_path(path)?,
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::from_path(default_path)?
                } else {
                    tracing::debug!("no settings file found; using defaults");
                    Self::default()
                }
            }
        };
        settings.apply_env();
        settings.validate()?;
        Ok(settings)
    }

    /// Override keys and the model from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_with(|name| std::env::var(name).ok());
    }

    /// Override keys and the model from `lookup`. Empty values are ignored.
    pub fn apply_env_with(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let keys = [
            ("GROQ_API_KEY", &mut self.keys.groq),
            ("GEMINI_API_KEY", &mut self.keys.gemini),
            ("OPENAI_API_KEY", &mut self.keys.openai),
            ("UNSTRUCTURED_API_KEY", &mut self.keys.unstructured),
            ("PATHWAY_LICENSE_KEY", &mut self.keys.pathway_license),
        ];
        for (name, slot) in keys {
            if let Some(value) = get(name) {
                *slot = Some(ApiKey::new(value));
            }
        }

        if let Some(provider) = get("RAG_PROVIDER") {
            match ProviderKind::parse(&provider) {
                Some(kind) => self.lm.provider = kind,
                None => tracing::warn!(value = %provider, "ignoring unknown RAG_PROVIDER"),
            }
        }
        if let Some(model) = get("RAG_MODEL") {
            self.lm.model = model;
        }
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field, reason: &str| {
            Err(ConfigError::Invalid {
                field,
                reason: reason.to_string(),
            })
        };
        if self.server.port == 0 {
            return invalid("server.port", "must be non-zero");
        }
        if self.documents.chunk_size == 0 {
            return invalid("documents.chunk_size", "must be non-zero");
        }
        if self.documents.chunk_overlap >= self.documents.chunk_size {
            return invalid("documents.chunk_overlap", "must be smaller than chunk_size");
        }
        if !(0.0..=1.0).contains(&self.retrieval.threshold) {
            return invalid("retrieval.threshold", "must be within [0, 1]");
        }
        if self.retrieval.top_k == 0 {
            return invalid("retrieval.top_k", "must be non-zero");
        }
        if self.lm.model.trim().is_empty() {
            return invalid("lm.model", "must not be empty");
        }
        if !(0.0..=2.0).contains(&self.lm.temperature) {
            return invalid("lm.temperature", "must be within [0, 2]");
        }
        Ok(())
    }

    /// The Gemini generateContent URL with the key appended.
    pub fn gemini_api_url(&self) -> Result<String, ConfigError> {
        let key = self
            .keys
            .gemini
            .as_ref()
            .ok_or(ConfigError::MissingKey("GEMINI_API_KEY"))?;
        Ok(format!("{GEMINI_API_URL}?key={}", key.expose()))
    }

    /// Marker a document uses to reference an extracted table.
    pub fn table_syntax(&self) -> String {
        format!("$[[table_{}]]", self.documents.table_key)
    }

    /// The key for the configured LM backend.
    pub fn lm_api_key(&self) -> Result<&ApiKey, ConfigError> {
        let (key, name) = match self.lm.provider {
            ProviderKind::Groq => (&self.keys.groq, "GROQ_API_KEY"),
            ProviderKind::OpenAi => (&self.keys.openai, "OPENAI_API_KEY"),
        };
        key.as_ref()
            .filter(|k| !k.is_empty())
            .ok_or(ConfigError::MissingKey(name))
    }

    /// Call defaults for the LM.
    pub fn lm_config(&self) -> LmConfig {
        LmConfig {
            model: self.lm.model.clone(),
            max_tokens: self.lm.max_tokens,
            temperature: self.lm.temperature,
            max_retries: self.lm.max_retries,
            ..LmConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn defaults_match_the_deployed_constants() {
        let s = Settings::default();
        assert_eq!(s.server.host, "0.0.0.0");
        assert_eq!(s.server.port, 8666);
        assert_eq!(s.server.request_headers["Content-Type"], "application/json");
        assert_eq!(s.documents.data_folder, PathBuf::from("data"));
        assert_eq!(s.documents.cleaned_data_folder, PathBuf::from("documentations"));
        assert_eq!(s.documents.csv_folder, PathBuf::from("csv_files"));
        assert_eq!(s.documents.chunk_size, 512);
        assert_eq!(s.documents.chunk_overlap, 20);
        assert_eq!(s.retrieval.top_k, 5);
        assert_eq!(s.retrieval.threshold, 0.3);
        assert_eq!(s.retrieval.search_max_results, 5);
        assert_eq!(s.retrieval.context_key, "CONTEXT");
        assert_eq!(s.retrieval.system_instructions_key, "SYSTEM_INSTRUCTIONS");
        assert_eq!(s.retrieval.max_decomposition_depth, 4);
        assert_eq!(s.lm.provider, ProviderKind::Groq);
        assert_eq!(s.lm.model, "llama-3.3-70b-versatile");
        assert!(s.tracked_agents.is_empty());
        assert!(s.validate().is_ok());
    }

    #[test]
    fn table_syntax_embeds_the_key() {
        assert_eq!(Settings::default().table_syntax(), "$[[table_TABLE_FILE_NAME]]");
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let s = Settings::from_json_str(
            r#"{"server": {"port": 9000}, "lm": {"provider": "openai", "model": "gpt-4o"},
                "tracked_agents": ["agent basic"]}"#,
        )
        .unwrap();
        assert_eq!(s.server.port, 9000);
        assert_eq!(s.server.host, "0.0.0.0");
        assert_eq!(s.lm.provider, ProviderKind::OpenAi);
        assert_eq!(s.lm.model, "gpt-4o");
        assert_eq!(s.lm.max_tokens, 1000);
        assert_eq!(s.tracked_agents, vec!["agent basic"]);
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = Settings::from_json_str("{ port: }").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn from_path_reads_a_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"keys": {{"groq": "gsk_file"}}, "retrieval": {{"top_k": 8}}}}"#).unwrap();

        let s = Settings::from_path(file.path()).unwrap();
        assert_eq!(s.retrieval.top_k, 8);
        assert_eq!(s.lm_api_key().unwrap().expose(), "gsk_file");
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        let err = Settings::from_path(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("absent.json"));
    }

    #[test]
    fn load_applies_validation() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"documents": {{"chunk_size": 10, "chunk_overlap": 10}}}}"#).unwrap();

        let err = Settings::load(Some(file.path())).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid { field: "documents.chunk_overlap", .. }
        ));
    }

    #[test]
    fn env_overrides_keys_and_model() {
        let mut s = Settings::default();
        s.apply_env_with(env(&[
            ("GROQ_API_KEY", "gsk_env"),
            ("GEMINI_API_KEY", "gem"),
            ("PATHWAY_LICENSE_KEY", "pw"),
            ("RAG_MODEL", "llama-3.1-8b-instant"),
            ("OPENAI_API_KEY", "  "),
        ]));
        assert_eq!(s.keys.groq.as_ref().unwrap().expose(), "gsk_env");
        assert_eq!(s.keys.pathway_license.as_ref().unwrap().expose(), "pw");
        assert!(s.keys.openai.is_none());
        assert_eq!(s.lm.model, "llama-3.1-8b-instant");
        assert_eq!(
            s.gemini_api_url().unwrap(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent?key=gem"
        );
    }

    #[test]
    fn env_selects_provider() {
        let mut s = Settings::default();
        s.apply_env_with(env(&[("RAG_PROVIDER", "OpenAI"), ("OPENAI_API_KEY", "sk")]));
        assert_eq!(s.lm.provider, ProviderKind::OpenAi);
        assert_eq!(s.lm_api_key().unwrap().expose(), "sk");

        s.apply_env_with(env(&[("RAG_PROVIDER", "cohere")]));
        assert_eq!(s.lm.provider, ProviderKind::OpenAi);
    }

    #[test]
    fn missing_keys_are_reported_by_name() {
        let s = Settings::default();
        assert!(matches!(s.gemini_api_url(), Err(ConfigError::MissingKey("GEMINI_API_KEY"))));
        assert!(matches!(s.lm_api_key(), Err(ConfigError::MissingKey("GROQ_API_KEY"))));
    }

    #[test]
    fn validation_rejects_out_of_range_values() {
        let mut s = Settings::default();
        s.retrieval.threshold = 1.5;
        assert!(s.validate().is_err());

        let mut s = Settings::default();
        s.retrieval.top_k = 0;
        assert!(s.validate().is_err());

        let mut s = Settings::default();
        s.server.port = 0;
        assert!(s.validate().is_err());
    }

    #[test]
    fn serialized_settings_redact_keys() {
        let mut s = Settings::default();
        s.keys.groq = Some(ApiKey::new("gsk_secret".into()));
        let json = serde_json::to_string(&s).unwrap();
        assert!(!json.contains("gsk_secret"));
        assert!(json.contains("[REDACTED]"));
    }

    #[test]
    fn lm_config_carries_lm_settings() {
        let mut s = Settings::default();
        s.lm.max_retries = 7;
        let config = s.lm_config();
        assert_eq!(config.model, "llama-3.3-70b-versatile");
        assert_eq!(config.max_retries, 7);
        assert_eq!(config.max_tokens, 1000);
    }
}
