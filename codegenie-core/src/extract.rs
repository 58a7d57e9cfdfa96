//! Pulls the code out of a raw text completion.
//!
//! Text-generation endpoints usually echo the prompt before the completion,
//! and models wrap code in Markdown fences with varying discipline. The rules
//! here are best effort:
//!
//! 1. drop the echoed prompt, if present;
//! 2. if the echoed prompt ends on an opening fence line, keep everything up
//!    to the first closing fence;
//! 3. otherwise keep the body of the first fenced block, without its info
//!    string (an unterminated fence runs to the end);
//! 4. otherwise keep the whole remaining text.
//!
//! The result is trimmed; an empty result is an `EmptyCompletion` error.

use crate::error::{self, Result};

const FENCE: &str = "```";

/// Extract code from `completion`, which was produced for `prompt`.
pub fn extract_code(completion: &str, prompt: &str) -> Result<String> {
    let echoed = completion.strip_prefix(prompt);
    let body = echoed.unwrap_or(completion);

    let code = if echoed.is_some() && ends_inside_fence(prompt) {
        body.split(FENCE).next().unwrap_or_default()
    } else {
        first_fenced_block(body).unwrap_or(body)
    };

    let code = code.trim();
    if code.is_empty() {
        return Err(error::empty_completion().with_operation("extract::extract_code"));
    }
    Ok(code.to_string())
}

/// Body of the first fenced block, info string removed.
pub fn first_fenced_block(text: &str) -> Option<&str> {
    let start = text.find(FENCE)? + FENCE.len();
    let rest = &text[start..];

    let rest = match rest.find('\n') {
        Some(nl) if is_info_string(&rest[..nl]) => &rest[nl + 1..],
        _ => rest,
    };

    Some(match rest.find(FENCE) {
        Some(end) => &rest[..end],
        None => rest,
    })
}

/// The last non-blank line of the prompt opens a fence
fn ends_inside_fence(prompt: &str) -> bool {
    prompt
        .lines()
        .rev()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .is_some_and(|line| line.starts_with(FENCE))
}

/// `python`, `c++`, `objective-c`, `c#`, or nothing at all
fn is_info_string(line: &str) -> bool {
    let line = line.trim();
    !line.contains(char::is_whitespace)
        && line
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '+' | '#' | '-' | '_' | '.' | '/'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::language::Language;
    use crate::model::Model;
    use crate::prompt::build_prompt;

    #[test]
    fn test_fenced_block_only() {
        let completion = "Here you go:\n```python\ndef add(a, b):\n    return a + b\n```\nEnjoy!";
        assert_eq!(
            extract_code(completion, "unrelated").unwrap(),
            "def add(a, b):\n    return a + b"
        );
    }

    #[test]
    fn test_fence_without_info_string() {
        let completion = "```\n  SELECT 1;  \n```";
        assert_eq!(extract_code(completion, "").unwrap(), "SELECT 1;");
    }

    #[test]
    fn test_strips_echoed_prompt() {
        let prompt = "Task: write it.\nPython CODE:\n";
        let completion = format!("{}print('hi')\n", prompt);
        assert_eq!(extract_code(&completion, prompt).unwrap(), "print('hi')");
    }

    #[test]
    fn test_prompt_opened_fence() {
        let prompt = "Python code:\n```py\n";
        let completion = format!("{}x = 1\nprint(x)\n```\nThis prints one.", prompt);
        assert_eq!(extract_code(&completion, prompt).unwrap(), "x = 1\nprint(x)");
    }

    #[test]
    fn test_fenced_prompt_without_echo() {
        let prompt = build_prompt("sum a list", Language::Python, &Model::CodeLlama7bInstruct);
        let completion = "Here is the function:\n```python\ndef total(xs):\n    return sum(xs)\n```";
        assert_eq!(
            extract_code(completion, &prompt).unwrap(),
            "def total(xs):\n    return sum(xs)"
        );
    }

    #[test]
    fn test_fence_in_request_text() {
        let prompt = build_prompt("fix this snippet ``` print(x)", Language::Python, &Model::Mistral7bInstruct);
        let completion = format!("{}Sure, here it is:\n```python\nprint(x)\n```", prompt);
        assert_eq!(extract_code(&completion, &prompt).unwrap(), "print(x)");
    }

    #[test]
    fn test_inexact_echo_is_not_stripped() {
        let prompt = build_prompt("sum a list", Language::Python, &Model::CodeLlama7bInstruct);
        let echo = prompt.replacen("description:", "description: ", 1);
        let completion = format!("{}total = sum(xs)\n```", echo);
        let code = extract_code(&completion, &prompt).unwrap();
        assert_eq!(code, "total = sum(xs)");
        assert!(!code.contains("Write a"));
    }

    #[test]
    fn test_ends_inside_fence() {
        assert!(ends_inside_fence("Python code:\n```py\n"));
        assert!(ends_inside_fence("Code:\n```\n\n"));
        assert!(!ends_inside_fence("fix ``` this\nPython CODE:\n"));
    }

    #[test]
    fn test_unterminated_fence_runs_to_end() {
        let completion = "Sure.\n```rust\nfn main() {}\n";
        assert_eq!(extract_code(completion, "p").unwrap(), "fn main() {}");
    }

    #[test]
    fn test_single_line_fence_keeps_content() {
        assert_eq!(first_fenced_block("```ls -la```"), Some("ls -la"));
    }

    #[test]
    fn test_no_fence_returns_trailing_text() {
        assert_eq!(extract_code("  echo done  ", "").unwrap(), "echo done");
    }

    #[test]
    fn test_empty_completion() {
        let prompt = "Go CODE:\n";
        let err = extract_code(prompt, prompt).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptyCompletion);

        let err = extract_code("```\n\n```", "").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptyCompletion);
    }
}
