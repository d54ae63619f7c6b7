use serde::Serialize;
use std::fmt;

/// The exact string meaning "no review issues found".
pub const LGTM: &str = "LGTM";

/// Reviewer phrasings that mean "no issues", compared case-insensitively.
const CLEAN_PHRASES: &[&str] = &["lgtm", "no issues", "no issues found", "none"];

/// Outcome of a code review.
///
/// Either the `LGTM` sentinel or a non-empty block of findings where every
/// line starts with `- `. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewResult {
    Lgtm,
    Findings(String),
}

impl ReviewResult {
    /// Normalize raw reviewer output.
    ///
    /// Empty output and known "no issues" phrasings collapse to [`ReviewResult::Lgtm`].
    /// Anything else becomes a findings block with one `- ` bullet per line.
    pub fn normalize(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Self::Lgtm;
        }

        let phrase = trimmed
            .trim_end_matches(['.', '!'])
            .trim()
            .to_lowercase();
        if CLEAN_PHRASES.contains(&phrase.as_str()) {
            return Self::Lgtm;
        }

        let findings: Vec<String> = trimmed
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(to_bullet)
            .filter(|line| line.len() > 2)
            .collect();

        if findings.is_empty() {
            Self::Lgtm
        } else {
            Self::Findings(findings.join("\n"))
        }
    }

    pub fn is_lgtm(&self) -> bool {
        matches!(self, Self::Lgtm)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Lgtm => LGTM,
            Self::Findings(findings) => findings,
        }
    }

    pub fn into_string(self) -> String {
        match self {
            Self::Lgtm => LGTM.to_string(),
            Self::Findings(findings) => findings,
        }
    }
}

impl fmt::Display for ReviewResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rewrite one finding line so it starts with `- `.
fn to_bullet(line: &str) -> String {
    if line.starts_with("- ") {
        return line.to_string();
    }

    let body = if let Some(rest) = line.strip_prefix(['-', '*', '•']) {
        rest
    } else {
        strip_numbering(line).unwrap_or(line)
    };

    format!("- {}", body.trim())
}

/// Strip a leading `1.` / `1)` style list marker. The marker must be followed
/// by whitespace, so decimals like `1.5x` stay intact.
fn strip_numbering(line: &str) -> Option<&str> {
    let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits == 0 {
        return None;
    }
    line[digits..]
        .strip_prefix(['.', ')'])
        .filter(|rest| rest.starts_with(char::is_whitespace))
}

/// Which reviewer produced the review returned to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ReviewerIdentity {
    #[serde(rename = "claude")]
    Primary,
    #[serde(rename = "gemini_fallback")]
    Fallback,
    #[serde(rename = "claude_after_refactor")]
    PrimaryAfterRefactor,
    #[serde(rename = "gemini_fallback_after_refactor")]
    FallbackAfterRefactor,
    /// The run failed before any review was used.
    #[serde(rename = "none")]
    None,
}

impl ReviewerIdentity {
    /// Identity for a review taken on a given pass.
    pub fn for_pass(used_fallback: bool, after_refactor: bool) -> Self {
        match (used_fallback, after_refactor) {
            (false, false) => Self::Primary,
            (true, false) => Self::Fallback,
            (false, true) => Self::PrimaryAfterRefactor,
            (true, true) => Self::FallbackAfterRefactor,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Primary => "claude",
            Self::Fallback => "gemini_fallback",
            Self::PrimaryAfterRefactor => "claude_after_refactor",
            Self::FallbackAfterRefactor => "gemini_fallback_after_refactor",
            Self::None => "none",
        }
    }
}

impl fmt::Display for ReviewerIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
