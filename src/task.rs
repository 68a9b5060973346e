//! Task data model and input validation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Store-assigned task identifier (SQLite rowid).
pub type TaskId = i64;

/// Maximum length of a task summary, in characters.
pub const SUMMARY_MAX_CHARS: usize = 300;

/// Maximum size of a task's context blob, in bytes.
pub const CONTEXT_MAX_BYTES: usize = 1024 * 1024;

/// Separator for the optional `prefix: body` summary convention.
pub const PREFIX_DELIMITER: char = ':';

/// A single work item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// The `prefix` part of a `prefix: body` summary, if the convention is used.
    pub fn prefix(&self) -> Option<&str> {
        split_prefix(&self.summary).map(|(prefix, _)| prefix)
    }

    pub fn has_context(&self) -> bool {
        self.context.as_deref().map(|c| !c.is_empty()).unwrap_or(false)
    }
}

/// Split a summary on the first `:` into `(prefix, body)`.
///
/// Returns `None` when there is no delimiter. Either side may still be
/// empty; `validate_summary` is what rejects that.
pub fn split_prefix(summary: &str) -> Option<(&str, &str)> {
    let (prefix, body) = summary.split_once(PREFIX_DELIMITER)?;
    Some((prefix.trim(), body.trim()))
}

/// Validate and normalize a summary entered by the user.
///
/// Trims surrounding whitespace, enforces the length cap, and applies the
/// prefix convention: if a `:` is present, both prefix and body must be
/// non-empty.
pub fn validate_summary(raw: &str) -> Result<String> {
    let summary = raw.trim();
    if summary.is_empty() {
        return Err(Error::InvalidSummary("summary cannot be empty".to_string()));
    }
    if summary.chars().count() > SUMMARY_MAX_CHARS {
        return Err(Error::InvalidSummary(format!(
            "summary is longer than {SUMMARY_MAX_CHARS} characters"
        )));
    }
    if let Some((prefix, body)) = split_prefix(summary) {
        if prefix.is_empty() {
            return Err(Error::InvalidSummary("prefix cannot be empty".to_string()));
        }
        if body.is_empty() {
            return Err(Error::InvalidSummary(
                "nothing after the prefix".to_string(),
            ));
        }
    }
    Ok(summary.to_string())
}

/// Enforce the context size cap.
pub fn validate_context(content: &str) -> Result<()> {
    if content.len() > CONTEXT_MAX_BYTES {
        return Err(Error::ContextTooLarge {
            size: content.len(),
            max: CONTEXT_MAX_BYTES,
        });
    }
    Ok(())
}

/// Truncate a summary to the cap, marking the cut with an ellipsis.
///
/// Used by non-interactive import, which accepts arbitrary lines.
pub fn truncate_summary(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.chars().count() <= SUMMARY_MAX_CHARS {
        return trimmed.to_string();
    }
    let kept: String = trimmed.chars().take(SUMMARY_MAX_CHARS - 3).collect();
    format!("{kept}...")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: TaskId, summary: &str) -> Task {
        let now = Utc::now();
        Task {
            id,
            summary: summary.to_string(),
            context: None,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn validate_accepts_plain_summary() {
        let summary = validate_summary("  buy milk  ").expect("summary");
        assert_eq!(summary, "buy milk");
    }

    #[test]
    fn validate_rejects_empty_summary() {
        let err = validate_summary("   ").expect_err("empty");
        assert!(matches!(err, Error::InvalidSummary(_)));
    }

    #[test]
    fn validate_rejects_overlong_summary() {
        let raw = "x".repeat(SUMMARY_MAX_CHARS + 1);
        let err = validate_summary(&raw).expect_err("too long");
        assert!(matches!(err, Error::InvalidSummary(_)));
    }

    #[test]
    fn validate_accepts_prefix_and_body() {
        let summary = validate_summary("errands: buy milk").expect("summary");
        assert_eq!(summary, "errands: buy milk");
    }

    #[test]
    fn validate_rejects_empty_prefix() {
        let err = validate_summary(": buy milk").expect_err("empty prefix");
        assert!(matches!(err, Error::InvalidSummary(_)));
    }

    #[test]
    fn validate_rejects_empty_body() {
        let err = validate_summary("errands:").expect_err("empty body");
        assert!(matches!(err, Error::InvalidSummary(_)));
    }

    #[test]
    fn split_prefix_uses_first_delimiter() {
        let (prefix, body) = split_prefix("work: fix build: again").expect("split");
        assert_eq!(prefix, "work");
        assert_eq!(body, "fix build: again");
    }

    #[test]
    fn prefix_reads_through_task() {
        assert_eq!(task(1, "home: water plants").prefix(), Some("home"));
        assert_eq!(task(2, "water plants").prefix(), None);
    }

    #[test]
    fn context_cap_enforced() {
        validate_context("short note").expect("small context");
        let big = "y".repeat(CONTEXT_MAX_BYTES + 1);
        let err = validate_context(&big).expect_err("too large");
        assert!(matches!(err, Error::ContextTooLarge { .. }));
    }

    #[test]
    fn truncate_marks_cut_with_ellipsis() {
        let long = "z".repeat(SUMMARY_MAX_CHARS * 2);
        let truncated = truncate_summary(&long);
        assert_eq!(truncated.chars().count(), SUMMARY_MAX_CHARS);
        assert!(truncated.ends_with("..."));
        assert_eq!(truncate_summary("short"), "short");
    }
}
