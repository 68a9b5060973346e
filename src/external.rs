//! Shelling out: editors, browsers, the clipboard.
//!
//! Everything here runs a foreign process. Editor plumbing reports `String`
//! errors because its outcome travels through the message channel rather
//! than the usual error path.

use std::env;
use std::io::{self, Write};
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};

use once_cell::sync::Lazy;
use regex::Regex;
use tempfile::NamedTempFile;

use crate::error::{Error, Result};

static URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[a-zA-Z][a-zA-Z0-9+.-]*://[^\s<>"'`]+"#).expect("regex: url"));

/// Scan free text for URLs, in order of appearance.
///
/// Matches any `scheme://` token and strips trailing punctuation that is
/// usually prose, not part of the link.
pub fn extract_urls(text: &str) -> Vec<String> {
    URL_RE
        .find_iter(text)
        .map(|m| {
            m.as_str()
                .trim_end_matches(['.', ',', ';', ':', '!', '?', '"', '\''])
                .to_string()
        })
        .filter(|url| !url.is_empty())
        .collect()
}

// =============================================================================
// Editor
// =============================================================================

/// Editor commands to try, most specific first.
pub fn editor_candidates(configured: Option<&str>) -> Vec<String> {
    let mut out = Vec::new();
    if let Some(value) = configured {
        if !value.trim().is_empty() {
            out.push(value.to_string());
        }
    }
    for name in ["PRIO_EDITOR", "VISUAL", "EDITOR"] {
        if let Ok(value) = env::var(name) {
            if !value.trim().is_empty() {
                out.push(value);
            }
        }
    }
    out.push("vi".to_string());
    out
}

pub fn split_editor_command(value: &str) -> Vec<String> {
    value
        .split_whitespace()
        .map(|part| part.to_string())
        .collect()
}

/// Try each candidate in turn, skipping the ones that are not installed.
pub fn launch_editor(
    candidates: &[String],
    path: &Path,
) -> std::result::Result<ExitStatus, String> {
    let mut attempted: Vec<String> = Vec::new();
    for candidate in candidates {
        let parts = split_editor_command(candidate);
        if parts.is_empty() {
            continue;
        }
        attempted.push(parts[0].clone());
        let mut command = Command::new(&parts[0]);
        if parts.len() > 1 {
            command.args(&parts[1..]);
        }
        command.arg(path);
        match command.status() {
            Ok(status) => return Ok(status),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                continue;
            }
            Err(err) => {
                return Err(format!("failed to launch editor '{}': {err}", parts[0]));
            }
        }
    }
    let tried = if attempted.is_empty() {
        "no editor candidates".to_string()
    } else {
        attempted.join(", ")
    };
    Err(format!(
        "no editor found (tried {tried}); set $VISUAL or $EDITOR"
    ))
}

/// Create the scratch file a context edit happens in, seeded with the
/// current context. The `.md` suffix lets editors pick a sensible mode.
pub fn context_scratch_file(
    context: Option<&str>,
) -> std::result::Result<NamedTempFile, String> {
    let mut file = tempfile::Builder::new()
        .prefix("prio-context-")
        .suffix(".md")
        .tempfile()
        .map_err(|err| format!("failed to create temp file for editor: {err}"))?;
    if let Some(context) = context {
        file.write_all(context.as_bytes())
            .map_err(|err| format!("failed to seed temp file: {err}"))?;
        file.flush()
            .map_err(|err| format!("failed to flush temp file: {err}"))?;
    }
    Ok(file)
}

// =============================================================================
// Browser and clipboard
// =============================================================================

pub fn open_url(url: &str) -> Result<()> {
    let (program, args): (&str, &[&str]) = if cfg!(target_os = "windows") {
        ("cmd", &["/c", "start"])
    } else if cfg!(target_os = "macos") {
        ("open", &[])
    } else {
        ("xdg-open", &[])
    };
    let status = Command::new(program)
        .args(args)
        .arg(url)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()?;
    if !status.success() {
        return Err(Error::OperationFailed(format!(
            "{program} exited with {status}"
        )));
    }
    Ok(())
}

/// Open several URLs. macOS `open` takes them all in one call; elsewhere
/// they go out one at a time.
pub fn open_urls(urls: &[String]) -> Result<()> {
    if cfg!(target_os = "macos") {
        let status = Command::new("open")
            .args(urls)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()?;
        if !status.success() {
            return Err(Error::OperationFailed(format!("open exited with {status}")));
        }
        return Ok(());
    }
    for url in urls {
        open_url(url)?;
    }
    Ok(())
}

/// Pipe text into the first clipboard helper that is installed.
pub fn copy_to_clipboard(text: &str) -> Result<()> {
    let candidates: &[(&str, &[&str])] = &[
        ("pbcopy", &[]),
        ("wl-copy", &[]),
        ("xclip", &["-selection", "clipboard"]),
        ("xsel", &["--input", "--clipboard"]),
    ];

    let mut missing: Vec<&str> = Vec::new();
    for (program, args) in candidates {
        let child = Command::new(program)
            .args(*args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();
        let mut child = match child {
            Ok(child) => child,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                missing.push(program);
                continue;
            }
            Err(err) => return Err(err.into()),
        };
        if let Some(stdin) = child.stdin.as_mut() {
            stdin.write_all(text.as_bytes())?;
        }
        // The helper reads until EOF; stdin has to close before wait.
        drop(child.stdin.take());
        let status = child.wait()?;
        if !status.success() {
            return Err(Error::OperationFailed(format!(
                "{program} exited with {status}"
            )));
        }
        return Ok(());
    }
    Err(Error::OperationFailed(format!(
        "no clipboard helper found (tried {})",
        missing.join(", ")
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_finds_urls_in_order() {
        let urls = extract_urls("see https://a.example/x then http://b.example/y?q=1");
        assert_eq!(urls, vec!["https://a.example/x", "http://b.example/y?q=1"]);
    }

    #[test]
    fn extract_strips_trailing_punctuation() {
        let urls = extract_urls("read https://example.com/post, then reply.");
        assert_eq!(urls, vec!["https://example.com/post"]);
    }

    #[test]
    fn extract_accepts_other_schemes() {
        let urls = extract_urls("listen on spotify://track/123");
        assert_eq!(urls, vec!["spotify://track/123"]);
    }

    #[test]
    fn extract_returns_empty_for_plain_text() {
        assert!(extract_urls("no links here, just words").is_empty());
    }

    #[test]
    fn split_editor_command_keeps_flags() {
        assert_eq!(split_editor_command("nvim -u NONE"), vec!["nvim", "-u", "NONE"]);
        assert!(split_editor_command("   ").is_empty());
    }

    #[test]
    fn candidates_put_config_first_and_vi_last() {
        let candidates = editor_candidates(Some("nano -w"));
        assert_eq!(candidates.first().map(String::as_str), Some("nano -w"));
        assert_eq!(candidates.last().map(String::as_str), Some("vi"));
    }

    #[test]
    fn scratch_file_is_seeded_with_context() {
        let file = context_scratch_file(Some("existing notes")).expect("scratch file");
        let content = std::fs::read_to_string(file.path()).expect("read back");
        assert_eq!(content, "existing notes");
        assert!(file.path().to_string_lossy().ends_with(".md"));
    }
}
