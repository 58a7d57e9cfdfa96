//! # Language Detection
//!
//! Guesses the target programming language from a free-text request.
//!
//! Detection walks an ordered table of `language -> patterns`; the first
//! pattern that matches decides. When nothing matches, the phrases
//! `in <language>` / `using <language>` are tried, and failing that the
//! default language ([`Language::Python`]) is returned. It is a heuristic:
//! "write a C# class" is reported as C, because C precedes C# in the table
//! and `\bc\b` already matches.

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A language code can be generated for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    Python,
    JavaScript,
    Java,
    Cpp,
    C,
    CSharp,
    Go,
    Ruby,
    Php,
    Swift,
    Kotlin,
    Rust,
    TypeScript,
    Html,
    Css,
    Sql,
    Shell,
    Perl,
    R,
    Matlab,
}

impl Language {
    /// Every language, in detection order
    pub const ALL: [Language; 20] = [
        Language::Python,
        Language::JavaScript,
        Language::Java,
        Language::Cpp,
        Language::C,
        Language::CSharp,
        Language::Go,
        Language::Ruby,
        Language::Php,
        Language::Swift,
        Language::Kotlin,
        Language::Rust,
        Language::TypeScript,
        Language::Html,
        Language::Css,
        Language::Sql,
        Language::Shell,
        Language::Perl,
        Language::R,
        Language::Matlab,
    ];

    /// Returned when detection finds nothing
    pub const DEFAULT: Language = Language::Python;

    pub fn name(&self) -> &'static str {
        match self {
            Language::Python => "Python",
            Language::JavaScript => "JavaScript",
            Language::Java => "Java",
            Language::Cpp => "C++",
            Language::C => "C",
            Language::CSharp => "C#",
            Language::Go => "Go",
            Language::Ruby => "Ruby",
            Language::Php => "PHP",
            Language::Swift => "Swift",
            Language::Kotlin => "Kotlin",
            Language::Rust => "Rust",
            Language::TypeScript => "TypeScript",
            Language::Html => "HTML",
            Language::Css => "CSS",
            Language::Sql => "SQL",
            Language::Shell => "Shell/Bash",
            Language::Perl => "Perl",
            Language::R => "R",
            Language::Matlab => "MATLAB",
        }
    }

    /// File extension without the dot
    pub fn extension(&self) -> &'static str {
        match self {
            Language::Python => "py",
            Language::JavaScript => "js",
            Language::Java => "java",
            Language::Cpp => "cpp",
            Language::C => "c",
            Language::CSharp => "cs",
            Language::Go => "go",
            Language::Ruby => "rb",
            Language::Php => "php",
            Language::Swift => "swift",
            Language::Kotlin => "kt",
            Language::Rust => "rs",
            Language::TypeScript => "ts",
            Language::Html => "html",
            Language::Css => "css",
            Language::Sql => "sql",
            Language::Shell => "sh",
            Language::Perl => "pl",
            Language::R => "r",
            Language::Matlab => "m",
        }
    }

    /// Tag for syntax highlighters and Markdown fences
    pub fn highlight_tag(&self) -> String {
        match self {
            Language::Shell => "bash".to_string(),
            other => other.name().to_lowercase(),
        }
    }

    fn patterns(&self) -> &'static [&'static str] {
        match self {
            Language::Python => &[
                r"\bpython\b", r"\.py\b", r"\bpip\b", r"\bdjango\b", r"\bflask\b",
                r"\bnumpy\b", r"\bpandas\b",
            ],
            Language::JavaScript => &[
                r"\bjavascript\b", r"\bjs\b", r"\.js\b", r"\bnode\.js\b", r"\bnpm\b",
                r"\breact\b", r"\bangular\b", r"\bvue\b",
            ],
            Language::Java => &[
                r"\bjava\b", r"\.java\b", r"\bspring\b", r"\bmaven\b", r"\bhibernate\b",
            ],
            Language::Cpp => &[r"\bc\+\+", r"\.cpp\b", r"\bcmake\b", r"\bstl\b", r"\bvector<"],
            Language::C => &[
                r"\bc\b", r"\.c\b", r"\bpointer\b", r"\bmalloc\b", r"\bstdio\b",
                r"\bstdlib\b", r"\bprintf\b",
            ],
            Language::CSharp => &[
                r"\bc#", r"\.cs\b", r"\bdotnet\b", r"\basync\b", r"\bawait\b", r"\busing\b",
            ],
            Language::Go => &[r"\bgo\b", r"\bgolang\b", r"\.go\b", r"\bgoroutine\b"],
            Language::Ruby => &[r"\bruby\b", r"\.rb\b", r"\brails\b", r"\bgem\b"],
            Language::Php => &[r"\bphp\b", r"\.php\b", r"\blaravel\b", r"\bsymphony\b"],
            Language::Swift => &[
                r"\bswift\b", r"\.swift\b", r"\bios\b", r"\bxcode\b", r"\bcocoa\b",
            ],
            Language::Kotlin => &[r"\bkotlin\b", r"\.kt\b", r"\bandroid\b"],
            Language::Rust => &[r"\brust\b", r"\.rs\b", r"\bcargo\b", r"\bcrate\b"],
            Language::TypeScript => &[
                r"\btypescript\b", r"\bts\b", r"\.ts\b", r"\bangular\b", r"\bvue\b",
            ],
            Language::Html => &[
                r"\bhtml\b", r"\.html\b", r"\bhtml5\b", r"\bdiv\b", r"\bspan\b",
                r"\binput\b", r"\bform\b", r"\bmarkup\b",
            ],
            Language::Css => &[
                r"\bcss\b", r"\.css\b", r"\bstylesheet\b", r"\bstyle\b", r"\bflex\b",
                r"\bgrid\b", r"\bbootstrap\b",
            ],
            Language::Sql => &[
                r"\bsql\b", r"\bmysql\b", r"\bpostgresql\b", r"\bselect\b", r"\bfrom\b",
                r"\bwhere\b", r"\bgroup by\b",
            ],
            Language::Shell => &[
                r"\bbash\b", r"\bshell\b", r"\.sh\b", r"\blinux\b", r"\bunix\b",
                r"\bscript\b",
            ],
            Language::Perl => &[r"\bperl\b", r"\.pl\b", r"\bregex\b"],
            Language::R => &[
                r"\br\b", r"\.r\b", r"\bstatistics\b", r"\bggplot\b", r"\bdplyr\b",
            ],
            Language::Matlab => &[r"\bmatlab\b", r"\.m\b", r"\bmatrix\b", r"\boctave\b"],
        }
    }
}

impl Default for Language {
    fn default() -> Self {
        Language::DEFAULT
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Language {
    type Err = String;

    /// Accepts the display name or the file extension, any case.
    /// `bash` and `shell` are accepted for Shell/Bash.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        if needle == "bash" || needle == "shell" {
            return Ok(Language::Shell);
        }
        Language::ALL
            .into_iter()
            .find(|l| l.name().to_lowercase() == needle || l.extension() == needle)
            .ok_or_else(|| format!("unknown language '{}'", s.trim()))
    }
}

/// Outcome of [`detect_language`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
    pub language: Language,
    /// The pattern or phrase that decided; `None` means the default was used
    pub matched: Option<String>,
}

impl Detection {
    pub fn is_fallback(&self) -> bool {
        self.matched.is_none()
    }
}

static PATTERN_TABLE: Lazy<Vec<(Language, Vec<(&'static str, Regex)>)>> = Lazy::new(|| {
    Language::ALL
        .into_iter()
        .map(|lang| {
            let compiled = lang
                .patterns()
                .iter()
                .filter_map(|p| {
                    RegexBuilder::new(p)
                        .case_insensitive(true)
                        .build()
                        .ok()
                        .map(|re| (*p, re))
                })
                .collect();
            (lang, compiled)
        })
        .collect()
});

/// Guess the language a request is asking for.
pub fn detect_language(prompt: &str) -> Detection {
    let lowered = prompt.to_lowercase();

    for (lang, patterns) in PATTERN_TABLE.iter() {
        if let Some((pattern, _)) = patterns.iter().find(|(_, re)| re.is_match(&lowered)) {
            return Detection {
                language: *lang,
                matched: Some((*pattern).to_string()),
            };
        }
    }

    for lang in Language::ALL {
        let name = lang.name().to_lowercase();
        for phrase in [format!("in {}", name), format!("using {}", name)] {
            if lowered.contains(&phrase) {
                return Detection {
                    language: lang,
                    matched: Some(phrase),
                };
            }
        }
    }

    Detection {
        language: Language::DEFAULT,
        matched: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_pattern_compiles() {
        for (lang, compiled) in PATTERN_TABLE.iter() {
            assert_eq!(compiled.len(), lang.patterns().len(), "{}", lang);
        }
    }

    #[test]
    fn test_python_keywords() {
        assert_eq!(detect_language("parse config.py and print keys").language, Language::Python);
        assert_eq!(detect_language("Write PYTHON to sort a list").language, Language::Python);
        assert!(!detect_language("python please").is_fallback());
    }

    #[test]
    fn test_fallback_to_default() {
        let detection = detect_language("reverse the words of a sentence");
        assert_eq!(detection.language, Language::DEFAULT);
        assert!(detection.is_fallback());
    }

    #[test]
    fn test_table_order_breaks_ties() {
        // both JavaScript and TypeScript list `angular`
        assert_eq!(detect_language("an angular component").language, Language::JavaScript);
        // `\bc\b` precedes the C# patterns
        assert_eq!(detect_language("a c# record type").language, Language::C);
        assert_eq!(detect_language("c++ template for a ring buffer").language, Language::Cpp);
    }

    #[test]
    fn test_other_languages() {
        assert_eq!(detect_language("a cargo workspace").language, Language::Rust);
        assert_eq!(detect_language("select the top 5 rows").language, Language::Sql);
        assert_eq!(detect_language("golang http server").language, Language::Go);
        assert_eq!(detect_language("build a matrix inverse").language, Language::Matlab);
        assert_eq!(detect_language("a bash backup job").language, Language::Shell);
    }

    #[test]
    fn test_language_parsing() {
        assert_eq!("c++".parse::<Language>().unwrap(), Language::Cpp);
        assert_eq!("Shell/Bash".parse::<Language>().unwrap(), Language::Shell);
        assert_eq!("bash".parse::<Language>().unwrap(), Language::Shell);
        assert_eq!("rs".parse::<Language>().unwrap(), Language::Rust);
        assert!("cobol".parse::<Language>().is_err());
    }

    #[test]
    fn test_language_metadata() {
        assert_eq!(Language::Shell.highlight_tag(), "bash");
        assert_eq!(Language::CSharp.highlight_tag(), "c#");
        assert_eq!(Language::Kotlin.extension(), "kt");
        assert_eq!(Language::Cpp.to_string(), "C++");
    }
}
