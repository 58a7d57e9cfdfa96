//! Templated explanation of generated code.
//!
//! Keywords are matched as lower-cased substrings, so `for` also fires on
//! `format`. The explanation is a rough reading aid, not an analysis.

use crate::language::Language;
use serde::Serialize;
use std::fmt;

const COMMON_ELEMENTS: [(&str, &str); 13] = [
    ("import", "This section imports necessary libraries and modules."),
    ("include", "This includes necessary header files."),
    ("def", "This defines a function that implements the requested functionality."),
    ("function", "This defines a function that implements the requested functionality."),
    ("class", "This defines a class to organize the functionality."),
    ("for", "This loop iterates through the input data."),
    ("while", "This loop executes code repeatedly until a condition is false."),
    ("if", "This condition checks for specific cases."),
    ("return", "This returns the final result from the function."),
    ("try", "This implements error handling for the code."),
    ("switch", "This provides multiple case conditions for different scenarios."),
    ("struct", "This defines a custom data structure."),
    ("constructor", "This initializes the object when it's created."),
];

const USAGE_NOTES: [&str; 3] = [
    "The code is designed to handle the specific requirements efficiently.",
    "Error handling is implemented where appropriate.",
    "Follow best practices when integrating this code.",
];

fn language_keywords(language: Language) -> Option<&'static [&'static str]> {
    let keywords: &'static [&'static str] = match language {
        Language::Html => &[
            "html", "body", "div", "span", "form", "input", "button", "tag", "element",
        ],
        Language::Css => &[
            "style", "class", "id", "margin", "padding", "color", "background", "flex", "grid",
        ],
        Language::JavaScript => &[
            "function", "const", "let", "var", "document", "window", "event", "callback",
        ],
        Language::Python => &[
            "def", "class", "import", "with", "as", "try", "except", "list", "dict",
        ],
        Language::Java => &[
            "class", "public", "private", "static", "void", "interface", "extends", "implements",
        ],
        Language::Cpp => &[
            "class", "template", "namespace", "vector", "map", "cout", "cin", "pointer",
        ],
        Language::C => &["pointer", "malloc", "free", "struct", "printf", "scanf", "include"],
        Language::CSharp => &[
            "class", "using", "namespace", "public", "private", "async", "await", "List<>",
        ],
        Language::Sql => &[
            "select", "from", "where", "join", "group by", "having", "order by", "insert",
            "update",
        ],
        Language::Go => &[
            "func", "defer", "goroutine", "channel", "struct", "interface", "package",
        ],
        _ => return None,
    };
    Some(keywords)
}

/// One recognized structural element
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeElement {
    pub keyword: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Explanation {
    pub language: Language,
    /// Language-specific keywords found, in table order. `None` when the
    /// language has no keyword table.
    pub features: Option<Vec<&'static str>>,
    pub elements: Vec<CodeElement>,
    pub notes: &'static [&'static str],
}

impl Explanation {
    pub fn headline(&self) -> String {
        format!("{} Code Analysis", self.language)
    }

    pub fn summary(&self) -> String {
        format!(
            "This code implements the requested functionality with proper structure and best practices for {}.",
            self.language
        )
    }
}

/// Build the explanation for `code` written in `language`.
pub fn explain(code: &str, language: Language) -> Explanation {
    let lowered = code.to_lowercase();

    // `List<>` never matches once lower-cased; kept for parity with the table
    let features = language_keywords(language).map(|keywords| {
        keywords
            .iter()
            .copied()
            .filter(|k| lowered.contains(*k))
            .collect()
    });

    let elements = COMMON_ELEMENTS
        .iter()
        .filter(|(keyword, _)| lowered.contains(keyword))
        .map(|&(keyword, description)| CodeElement {
            keyword,
            description,
        })
        .collect();

    Explanation {
        language,
        features,
        elements,
        notes: &USAGE_NOTES,
    }
}

/// Markdown rendering
impl fmt::Display for Explanation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "### {}", self.headline())?;
        writeln!(f)?;
        writeln!(f, "{}", self.summary())?;

        if let Some(features) = &self.features {
            writeln!(f)?;
            writeln!(f, "### {}-Specific Features", self.language)?;
            if !features.is_empty() {
                writeln!(f)?;
                writeln!(
                    f,
                    "The code utilizes {}-specific features like: {}",
                    self.language,
                    features.join(", ")
                )?;
            }
        }

        writeln!(f)?;
        writeln!(f, "### Code Structure Breakdown")?;
        if !self.elements.is_empty() {
            writeln!(f)?;
        }
        for element in &self.elements {
            writeln!(f, "- **{}**: {}", capitalize(element.keyword), element.description)?;
        }

        writeln!(f)?;
        writeln!(f, "### Performance and Usage Notes")?;
        writeln!(f)?;
        for note in self.notes {
            writeln!(f, "- {}", note)?;
        }
        Ok(())
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PYTHON: &str = "import math\n\ndef area(r):\n    return math.pi * r * r\n";

    #[test]
    fn test_python_features_in_table_order() {
        let explanation = explain(PYTHON, Language::Python);
        assert_eq!(explanation.features, Some(vec!["def", "import"]));
    }

    #[test]
    fn test_substring_matching() {
        let explanation = explain("msg := fmt.Sprintf(\"%d\", n)\nformat(msg)", Language::Go);
        assert_eq!(explanation.features, Some(vec![]));
        let keywords: Vec<_> = explanation.elements.iter().map(|e| e.keyword).collect();
        assert_eq!(keywords, vec!["for"]);
    }

    #[test]
    fn test_common_elements() {
        let explanation = explain(PYTHON, Language::Python);
        let keywords: Vec<_> = explanation.elements.iter().map(|e| e.keyword).collect();
        assert_eq!(keywords, vec!["import", "def", "return"]);
    }

    #[test]
    fn test_language_without_table() {
        let explanation = explain("fn main() {}", Language::Rust);
        assert_eq!(explanation.features, None);
        assert!(explanation.elements.is_empty());
    }

    #[test]
    fn test_markdown_rendering() {
        let text = explain(PYTHON, Language::Python).to_string();
        assert!(text.starts_with("### Python Code Analysis\n"));
        assert!(text.contains("features like: def, import\n"));
        assert!(text.contains("- **Import**: This section imports necessary libraries and modules.\n"));
        assert!(text.contains("- Follow best practices when integrating this code.\n"));
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("constructor"), "Constructor");
        assert_eq!(capitalize(""), "");
    }
}
