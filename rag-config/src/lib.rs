#![deny(missing_docs)]
//! Settings for the agentic RAG workspace.
//!
//! [`Settings::default`] carries the deployed constants. A JSON file may
//! override any subset of them, and API keys plus the model can be set
//! from the environment (`GROQ_API_KEY`, `GEMINI_API_KEY`,
//! `OPENAI_API_KEY`, `UNSTRUCTURED_API_KEY`, `PATHWAY_LICENSE_KEY`,
//! `RAG_PROVIDER`, `RAG_MODEL`).

pub mod error;
pub mod secret;
pub mod settings;

pub use error::ConfigError;
pub use secret::ApiKey;
pub use settings::{
    ApiKeys, DEFAULT_CONFIG_FILE, DocumentSettings, LmSettings, ProviderKind, RetrievalSettings,
    ServerSettings, Settings,
};
