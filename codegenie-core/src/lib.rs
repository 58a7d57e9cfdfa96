//! # CodeGenie Core
//!
//! Building blocks for turning a natural-language request into code.
//!
//! ## Core Concepts
//! - **Credentials**: username/password accounts in a JSON file
//! - **Language detection**: ordered regex table over the request text
//! - **Prompt**: style decoration plus a model-specific template
//! - **Provider**: trait-based text-generation client (Hugging Face)
//! - **Extraction**: the code block out of a raw completion
//! - **History**: one plain-text record per generation

pub mod config;
pub mod credentials;
pub mod error;
pub mod explain;
pub mod extract;
pub mod history;
pub mod language;
pub mod model;
pub mod password;
pub mod prompt;
pub mod provider;
pub mod timestamp;

pub use config::AppConfig;
pub use credentials::{
    CredentialBackend, CredentialStore, JsonFileBackend, MemoryBackend, SeedAccount, UserProfile,
    UserRecord, UserTable,
};
pub use error::{Error, ErrorKind, ErrorStatus, Result};
pub use explain::{explain, CodeElement, Explanation};
pub use extract::extract_code;
pub use history::{HistoryRecord, HistoryStore};
pub use language::{detect_language, Detection, Language};
pub use model::Model;
pub use prompt::{build_prompt, CodeStyle, StylePreferences};
pub use provider::{
    HuggingFaceProvider, InferenceParams, InferenceProvider, ProviderConfig, ProviderError,
};
