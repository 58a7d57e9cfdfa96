//! Code generator - drives one request through the pipeline

use codegenie_core::error::{self, Result};
use codegenie_core::{
    build_prompt, detect_language, explain, extract_code, Detection, Explanation, HistoryRecord,
    HistoryStore, InferenceParams, InferenceProvider, Language, Model, StylePreferences,
};
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// What the user asked for
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub prompt: String,
    /// `None` asks for detection from the prompt
    pub language: Option<Language>,
    pub model: Model,
    pub style: StylePreferences,
    pub username: String,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            language: None,
            model: Model::default(),
            style: StylePreferences::default(),
            username: username.into(),
        }
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = Some(language);
        self
    }

    pub fn with_model(mut self, model: Model) -> Self {
        self.model = model;
        self
    }

    pub fn with_style(mut self, style: StylePreferences) -> Self {
        self.style = style;
        self
    }
}

/// Result of a successful generation
#[derive(Debug, Clone)]
pub struct Generation {
    pub language: Language,
    /// Set when the language was detected rather than chosen
    pub detection: Option<Detection>,
    /// Full prompt sent to the provider
    pub prompt_sent: String,
    pub code: String,
    pub explanation: Explanation,
    /// Where the history record was written, if history is enabled
    pub history_path: Option<PathBuf>,
}

/// Drives requests through one inference provider
pub struct CodeGenerator<P: InferenceProvider> {
    provider: P,
    params: InferenceParams,
    history: Option<HistoryStore>,
}

impl<P: InferenceProvider> CodeGenerator<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            params: InferenceParams::default(),
            history: None,
        }
    }

    pub fn with_params(mut self, params: InferenceParams) -> Self {
        self.params = params;
        self
    }

    /// Record every successful generation in `store`
    pub fn with_history(mut self, store: HistoryStore) -> Self {
        self.history = Some(store);
        self
    }

    pub fn params(&self) -> &InferenceParams {
        &self.params
    }

    pub async fn generate(&self, request: &GenerationRequest) -> Result<Generation> {
        let user_prompt = request.prompt.trim();
        if user_prompt.is_empty() {
            return Err(error::invalid_argument("Please enter a prompt first.")
                .with_operation("pipeline::generate"));
        }

        let (language, detection) = match request.language {
            Some(language) => (language, None),
            None => {
                let detection = detect_language(user_prompt);
                debug!(
                    language = %detection.language,
                    matched = ?detection.matched,
                    "detected language"
                );
                (detection.language, Some(detection))
            }
        };

        let decorated = request.style.decorate(user_prompt);
        let prompt_sent = build_prompt(&decorated, language, &request.model);

        info!(
            provider = self.provider.name(),
            model = request.model.id(),
            language = %language,
            user = %request.username,
            "generating code"
        );

        let completion = self
            .provider
            .generate(&request.model, &prompt_sent, &self.params)
            .await
            .map_err(|e| e.into_error(self.provider.name(), &request.model))?;
        debug!(completion_len = completion.len(), "completion received");

        let code = extract_code(&completion, &prompt_sent)
            .map_err(|e| e.with_context("model", request.model.id()))?;
        let explanation = explain(&code, language);

        let history_path = match &self.history {
            Some(store) => {
                let record = HistoryRecord::new(user_prompt, language, &request.username, &code)
                    .with_model(request.model.id());
                match store.record(&record) {
                    Ok(path) => Some(path),
                    Err(e) => {
                        warn!(error = %e, "failed to save history record");
                        None
                    }
                }
            }
            None => None,
        };

        info!(language = %language, code_len = code.len(), "code generated");

        Ok(Generation {
            language,
            detection,
            prompt_sent,
            code,
            explanation,
            history_path,
        })
    }
}
