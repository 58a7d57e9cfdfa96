//! Prompt construction.
//!
//! A request is first decorated with the user's style preferences, then
//! wrapped in a model-specific instruction template.

use crate::language::Language;
use crate::model::Model;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default approximate length, in lines
pub const DEFAULT_CODE_LENGTH: u32 = 30;
pub const MIN_CODE_LENGTH: u32 = 10;
pub const MAX_CODE_LENGTH: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CodeStyle {
    #[default]
    Standard,
    Concise,
    HeavilyCommented,
    ProductionReady,
}

impl CodeStyle {
    pub const ALL: [CodeStyle; 4] = [
        CodeStyle::Standard,
        CodeStyle::Concise,
        CodeStyle::HeavilyCommented,
        CodeStyle::ProductionReady,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            CodeStyle::Standard => "Standard",
            CodeStyle::Concise => "Concise",
            CodeStyle::HeavilyCommented => "Heavily Commented",
            CodeStyle::ProductionReady => "Production Ready",
        }
    }
}

impl fmt::Display for CodeStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CodeStyle {
    type Err = String;

    /// Accepts "Heavily Commented", "heavily-commented", "heavily_commented", ...
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle: String = s
            .trim()
            .chars()
            .map(|c| if c == '-' || c == '_' { ' ' } else { c })
            .collect::<String>()
            .to_lowercase();
        CodeStyle::ALL
            .into_iter()
            .find(|style| style.name().to_lowercase() == needle)
            .ok_or_else(|| format!("unknown code style '{}'", s.trim()))
    }
}

/// Preferences appended to the user's request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StylePreferences {
    pub style: CodeStyle,
    /// Approximate length in lines, clamped to 10..=100
    pub code_length: u32,
    pub additional_requirements: Option<String>,
}

impl Default for StylePreferences {
    fn default() -> Self {
        Self {
            style: CodeStyle::Standard,
            code_length: DEFAULT_CODE_LENGTH,
            additional_requirements: None,
        }
    }
}

impl StylePreferences {
    pub fn with_style(mut self, style: CodeStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_code_length(mut self, lines: u32) -> Self {
        self.code_length = lines.clamp(MIN_CODE_LENGTH, MAX_CODE_LENGTH);
        self
    }

    pub fn with_additional_requirements(mut self, text: impl Into<String>) -> Self {
        self.additional_requirements = Some(text.into());
        self
    }

    /// Append the preferences to a request
    pub fn decorate(&self, request: &str) -> String {
        let mut out = request.to_string();
        if let Some(extra) = self
            .additional_requirements
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            out.push_str(&format!("\n\nAdditional requirements: {}", extra));
        }
        if self.style != CodeStyle::Standard {
            out.push_str(&format!(
                "\n\nPlease make the code {}.",
                self.style.name().to_lowercase()
            ));
        }
        out.push_str(&format!(
            "\n\nThe code should be approximately {} lines long.",
            self.code_length
        ));
        out
    }
}

/// A request asking for both HTML and CSS gets the web-project templates
pub fn is_web_project(request: &str) -> bool {
    let upper = request.to_uppercase();
    upper.contains("HTML") && upper.contains("CSS")
}

/// Wrap a (decorated) request in the instruction template for `model`.
pub fn build_prompt(request: &str, language: Language, model: &Model) -> String {
    let web = is_web_project(request);
    let name = language.name();

    match (model.is_codellama(), web) {
        (true, true) => format!(
            "Write code based on this description:\n\
             {request}\n\
             Include HTML structure, CSS styling, and JavaScript if needed.\n\
             Format the code properly with clear comments.\n\
             Code:\n\
             ```\n"
        ),
        (true, false) => format!(
            "Write a {name} function based on this description:\n\
             {request}\n\
             Include necessary imports, clear comments, and format the code properly.\n\
             {name} code:\n\
             ```{ext}\n",
            ext = language.extension()
        ),
        (false, true) => format!(
            "Task: Write code based on the following description.\n\
             Description: {request}\n\
             Requirements:\n\
             - Create proper HTML structure\n\
             - Add CSS styling\n\
             - Include JavaScript functionality if needed\n\
             - Format the code properly with clear sections\n\
             CODE:\n"
        ),
        (false, false) => format!(
            "Task: Write a {name} function based on the following description.\n\
             Description: {request}\n\
             Requirements:\n\
             - Include necessary imports\n\
             - Add clear comments\n\
             - Format the code properly\n\
             - Follow best practices for {name}\n\
             {name} CODE:\n"
        ),
    }
}
