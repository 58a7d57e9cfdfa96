//! Runtime configuration read from `CODEGENIE_*` environment variables.

use crate::credentials::SeedAccount;
use crate::error::{self, Result};
use crate::model::Model;
use crate::provider::{InferenceParams, ProviderConfig, DEFAULT_API_BASE, DEFAULT_TIMEOUT_SECS};
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_token: Option<String>,
    pub api_base: String,
    pub model: Model,
    pub data_dir: PathBuf,
    /// Explicit credential file; derived from `data_dir` when unset
    pub users_file: Option<PathBuf>,
    /// Explicit history directory; derived from `data_dir` when unset
    pub history_dir: Option<PathBuf>,
    pub params: InferenceParams,
    pub timeout_secs: u64,
    pub seed: Option<SeedAccount>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_token: None,
            api_base: DEFAULT_API_BASE.into(),
            model: Model::default(),
            data_dir: PathBuf::from("."),
            users_file: None,
            history_dir: None,
            params: InferenceParams::default(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            seed: None,
        }
    }
}

impl AppConfig {
    /// Read the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = InferenceParams::default();

        let seed = match (
            get("CODEGENIE_SEED_USER"),
            get("CODEGENIE_SEED_EMAIL"),
            get("CODEGENIE_SEED_PASSWORD"),
        ) {
            (Some(username), Some(email), Some(password)) => Some(SeedAccount {
                username,
                email,
                password,
            }),
            (None, None, None) => None,
            _ => {
                return Err(error::config_invalid("CODEGENIE_SEED_USER", "partial seed account")
                    .with_context(
                        "hint",
                        "set CODEGENIE_SEED_USER, CODEGENIE_SEED_EMAIL and CODEGENIE_SEED_PASSWORD together",
                    ))
            }
        };

        Ok(Self {
            api_token: get("CODEGENIE_API_TOKEN").or_else(|| get("HF_API_TOKEN")),
            api_base: get("CODEGENIE_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.into()),
            model: get("CODEGENIE_MODEL")
                .map(|id| Model::from_id(&id))
                .unwrap_or_default(),
            data_dir: get("CODEGENIE_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
            users_file: get("CODEGENIE_USERS_FILE").map(PathBuf::from),
            history_dir: get("CODEGENIE_HISTORY_DIR").map(PathBuf::from),
            params: InferenceParams {
                max_new_tokens: parsed(&get, "CODEGENIE_MAX_NEW_TOKENS", defaults.max_new_tokens)?,
                temperature: parsed(&get, "CODEGENIE_TEMPERATURE", defaults.temperature)?,
                top_p: parsed(&get, "CODEGENIE_TOP_P", defaults.top_p)?,
                do_sample: defaults.do_sample,
            },
            timeout_secs: parsed(&get, "CODEGENIE_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?,
            seed,
        })
    }

    pub fn users_file(&self) -> PathBuf {
        self.users_file
            .clone()
            .unwrap_or_else(|| self.data_dir.join("users").join("user_database.json"))
    }

    pub fn history_dir(&self) -> PathBuf {
        self.history_dir
            .clone()
            .unwrap_or_else(|| self.data_dir.join("history"))
    }

    pub fn provider_config(&self) -> ProviderConfig {
        ProviderConfig {
            api_key: self.api_token.clone(),
            ..ProviderConfig::default()
        }
        .with_base_url(self.api_base.clone())
        .with_timeout(self.timeout_secs)
    }
}

fn parsed<T, G>(get: &G, key: &'static str, default: T) -> Result<T>
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw.parse().map_err(|_| error::config_invalid(key, raw)),
        None => Ok(default),
    }
}
