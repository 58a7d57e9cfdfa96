//! # Generation History
//!
//! One plain-text file per successful generation:
//!
//! ```text
//! Prompt: <prompt>
//! Language: <language>
//! Timestamp: YYYY-MM-DD HH:MM:SS
//! User: <username>
//! Model: <model id>
//!
//! --- Generated Code ---
//!
//! <code>
//! ```
//!
//! Records are written once and never rewritten. `Model:` is omitted when
//! unknown.

use crate::error::{self, Error, Result};
use crate::language::Language;
use crate::timestamp;
use chrono::NaiveDateTime;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const CODE_DELIMITER: &str = "--- Generated Code ---";
pub const UNKNOWN: &str = "Unknown";
pub const NO_CODE: &str = "No code found";

const PROMPT_LABEL: &str = "Prompt: ";
const LANGUAGE_LABEL: &str = "Language: ";
const TIMESTAMP_LABEL: &str = "Timestamp: ";
const USER_LABEL: &str = "User: ";
const MODEL_LABEL: &str = "Model: ";

const FILE_PREFIX: &str = "code_";
const FILE_EXTENSION: &str = "txt";

/// One prompt/response interaction
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRecord {
    pub prompt: String,
    /// Display name of the language, as written
    pub language: String,
    /// `None` when the stored timestamp is missing or unreadable
    pub created_at: Option<NaiveDateTime>,
    pub username: String,
    pub model: Option<String>,
    pub code: String,
}

impl HistoryRecord {
    pub fn new(
        prompt: impl Into<String>,
        language: Language,
        username: impl Into<String>,
        code: impl Into<String>,
    ) -> Self {
        Self {
            prompt: prompt.into(),
            language: language.name().to_string(),
            created_at: Some(timestamp::now()),
            username: username.into(),
            model: None,
            code: code.into(),
        }
    }

    pub fn with_model(mut self, model_id: impl Into<String>) -> Self {
        self.model = Some(model_id.into());
        self
    }

    pub fn with_created_at(mut self, at: NaiveDateTime) -> Self {
        self.created_at = Some(at);
        self
    }

    /// Timestamp as stored, or `Unknown`
    pub fn timestamp_text(&self) -> String {
        self.created_at
            .as_ref()
            .map(timestamp::format)
            .unwrap_or_else(|| UNKNOWN.to_string())
    }

    /// Render the on-disk text
    pub fn render(&self) -> String {
        let mut out = format!(
            "{}{}\n{}{}\n{}{}\n{}{}\n",
            PROMPT_LABEL,
            self.prompt,
            LANGUAGE_LABEL,
            self.language,
            TIMESTAMP_LABEL,
            self.timestamp_text(),
            USER_LABEL,
            self.username
        );
        if let Some(model) = &self.model {
            out.push_str(&format!("{}{}\n", MODEL_LABEL, model));
        }
        out.push_str(&format!("\n{}\n\n{}", CODE_DELIMITER, self.code));
        out
    }

    /// Read a record back.
    ///
    /// The header ends with `Language:`, `Timestamp:`, `User:` and an
    /// optional `Model:` line, in that order; everything above them is the
    /// prompt, whatever its lines look like. Missing fields become `Unknown`,
    /// missing code becomes `No code found`.
    pub fn parse(text: &str) -> Self {
        let (header, code) = match text.split_once(CODE_DELIMITER) {
            Some((header, code)) => (header, Some(code.trim())),
            None => (text, None),
        };

        let mut lines: Vec<&str> = header.lines().collect();
        while lines.last().is_some_and(|line| line.trim().is_empty()) {
            lines.pop();
        }

        let mut take = |label: &str| -> Option<String> {
            let value = lines.last()?.strip_prefix(label)?.to_string();
            lines.pop();
            Some(value)
        };
        let model = take(MODEL_LABEL);
        let username = take(USER_LABEL);
        let stamp = take(TIMESTAMP_LABEL);
        let language = take(LANGUAGE_LABEL);

        let prompt = match lines.split_first() {
            Some((first, rest)) => first.strip_prefix(PROMPT_LABEL).map(|head| {
                std::iter::once(head)
                    .chain(rest.iter().copied())
                    .collect::<Vec<_>>()
                    .join("\n")
            }),
            None => None,
        };

        let field = |value: Option<String>| {
            value
                .map(|v| v.trim_end().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| UNKNOWN.to_string())
        };

        Self {
            prompt: field(prompt),
            language: field(language),
            created_at: stamp.as_deref().and_then(|s| timestamp::parse(s.trim())),
            username: field(username),
            model: model.map(|m| m.trim().to_string()).filter(|m| !m.is_empty()),
            code: code
                .filter(|c| !c.is_empty())
                .unwrap_or(NO_CODE)
                .to_string(),
        }
    }
}

/// Directory of history files
#[derive(Debug, Clone)]
pub struct HistoryStore {
    dir: PathBuf,
}

impl HistoryStore {
    /// Open the store, creating the directory if needed.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir).map_err(|e| {
            Error::from(e)
                .with_operation("history::open")
                .with_context("path", dir.display().to_string())
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `record` to a new file and return its path.
    ///
    /// The file is named after the record's timestamp. An existing file is
    /// never overwritten: a `_1`, `_2`, ... suffix is tried instead.
    pub fn record(&self, record: &HistoryRecord) -> Result<PathBuf> {
        let stamp = record
            .created_at
            .unwrap_or_else(timestamp::now)
            .format(timestamp::FILE_FORMAT)
            .to_string();
        let content = record.render();

        let mut attempt = 0u32;
        loop {
            let name = if attempt == 0 {
                format!("{}{}.{}", FILE_PREFIX, stamp, FILE_EXTENSION)
            } else {
                format!("{}{}_{}.{}", FILE_PREFIX, stamp, attempt, FILE_EXTENSION)
            };
            let path = self.dir.join(name);

            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => {
                    write_or_remove(&path, file, &content)?;
                    info!(path = %path.display(), user = %record.username, "history record saved");
                    return Ok(path);
                }
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                    debug!(path = %path.display(), "history file exists, trying next suffix");
                    attempt += 1;
                }
                Err(e) => {
                    return Err(Error::from(e)
                        .with_operation("history::record")
                        .with_context("path", path.display().to_string()));
                }
            }
        }
    }

    /// Records for `username`, newest first.
    pub fn list_for_user(&self, username: &str) -> Result<Vec<(PathBuf, HistoryRecord)>> {
        let entries = std::fs::read_dir(&self.dir).map_err(|e| {
            Error::from(e)
                .with_operation("history::list_for_user")
                .with_context("path", self.dir.display().to_string())
        })?;

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| is_history_file(path))
            .collect();
        paths.sort_by_cached_key(|path| std::cmp::Reverse(sort_key(path)));

        let mut records = Vec::new();
        for path in paths {
            let text = match std::fs::read_to_string(&path) {
                Ok(text) => text,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping unreadable history file");
                    continue;
                }
            };
            let record = HistoryRecord::parse(&text);
            if record.username == username {
                records.push((path, record));
            }
        }
        Ok(records)
    }

    /// Load a single record by path
    pub fn load(&self, path: impl AsRef<Path>) -> Result<HistoryRecord> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            error::io_error(format!("Failed to read history file: {}", e))
                .with_operation("history::load")
                .with_context("path", path.display().to_string())
                .set_source(e)
        })?;
        Ok(HistoryRecord::parse(&text))
    }
}

/// Write a freshly created record file; a partial file is removed on failure.
fn write_or_remove(path: &Path, mut file: impl Write, content: &str) -> Result<()> {
    file.write_all(content.as_bytes()).map_err(|e| {
        if let Err(cleanup) = std::fs::remove_file(path) {
            warn!(path = %path.display(), error = %cleanup, "failed to remove partial history file");
        }
        Error::from(e)
            .with_operation("history::record")
            .with_context("path", path.display().to_string())
    })
}

/// `(stamp, suffix)` from `code_<stamp>[_<suffix>].txt`
fn sort_key(path: &Path) -> (String, u32) {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .and_then(|s| s.strip_prefix(FILE_PREFIX))
        .unwrap_or_default();
    let mut parts = stem.splitn(3, '_');
    let date = parts.next().unwrap_or_default();
    let time = parts.next().unwrap_or_default();
    let suffix = parts.next().and_then(|n| n.parse().ok()).unwrap_or(0);
    (format!("{}_{}", date, time), suffix)
}

fn is_history_file(path: &Path) -> bool {
    path.is_file()
        && path.extension().and_then(|e| e.to_str()) == Some(FILE_EXTENSION)
        && path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with(FILE_PREFIX))
}
