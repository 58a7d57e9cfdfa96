//! Models offered for code generation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Hosted model used for a generation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Model {
    Mistral7bInstruct,
    CodeLlama7bInstruct,
    Bloomz7b1,
    /// Any other model id served by the inference endpoint
    Custom(String),
}

impl Model {
    /// Catalog entries, default first
    pub const CATALOG: [Model; 3] = [
        Model::Mistral7bInstruct,
        Model::CodeLlama7bInstruct,
        Model::Bloomz7b1,
    ];

    /// Resolve a model id or a catalog display name.
    pub fn from_id(id: &str) -> Self {
        let id = id.trim();
        Self::CATALOG
            .into_iter()
            .find(|m| m.id() == id || m.display_name().eq_ignore_ascii_case(id))
            .unwrap_or_else(|| Model::Custom(id.to_string()))
    }

    pub fn id(&self) -> &str {
        match self {
            Model::Mistral7bInstruct => "mistralai/Mistral-7B-Instruct-v0.2",
            Model::CodeLlama7bInstruct => "codellama/CodeLlama-7b-Instruct-hf",
            Model::Bloomz7b1 => "bigscience/bloomz-7b1",
            Model::Custom(id) => id,
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            Model::Mistral7bInstruct => "Mistral 7B Instruct",
            Model::CodeLlama7bInstruct => "CodeLlama 7B Instruct",
            Model::Bloomz7b1 => "Bloomz 7B1",
            Model::Custom(id) => id,
        }
    }

    /// One-line description for listings
    pub fn summary(&self) -> &'static str {
        match self {
            Model::Mistral7bInstruct => "Good general-purpose code generation",
            Model::CodeLlama7bInstruct => "Specialized for code generation",
            Model::Bloomz7b1 => "Another option with different capabilities",
            Model::Custom(_) => "Custom model",
        }
    }

    /// CodeLlama models get their own prompt templates
    pub fn is_codellama(&self) -> bool {
        self.id().to_lowercase().contains("codellama")
    }
}

impl Default for Model {
    fn default() -> Self {
        Model::Mistral7bInstruct
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_id() {
        assert_eq!(
            Model::from_id("codellama/CodeLlama-7b-Instruct-hf"),
            Model::CodeLlama7bInstruct
        );
        assert_eq!(Model::from_id("bloomz 7b1"), Model::Bloomz7b1);
        assert_eq!(
            Model::from_id("org/other-model"),
            Model::Custom("org/other-model".into())
        );
    }

    #[test]
    fn test_codellama_family() {
        assert!(Model::CodeLlama7bInstruct.is_codellama());
        assert!(Model::from_id("TheBloke/CodeLlama-13B").is_codellama());
        assert!(!Model::default().is_codellama());
    }
}
