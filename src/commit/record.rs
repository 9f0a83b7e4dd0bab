//! The structured commit record drafted by the model.

use std::fmt;
use std::sync::LazyLock;

use regex_lite::Regex;
use serde::{Deserialize, Deserializer, Serialize};

/// Conventional-commit types the model may use.
pub const ALLOWED_TYPES: &[&str] = &[
    "feat", "fix", "docs", "style", "refactor", "perf", "test", "build", "ci", "chore", "revert",
];

/// Scopes the model is steered towards.
pub const ALLOWED_SCOPES: &[&str] = &["auth", "db", "ui", "api", "deps", "core", "test"];

/// Soft limit for the title; longer titles are kept but flagged.
pub const TITLE_SOFT_LIMIT: usize = 72;

static TITLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\w+)(?:\(([^)]+)\))?(!)?: \S").expect("valid title regex")
});

/// A commit title plus one body line per change.
///
/// `body` accepts a JSON string (split into lines), a sequence of strings,
/// `null`, or nothing at all; it is always stored as lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord {
    pub title: String,
    #[serde(default, deserialize_with = "deserialize_body")]
    pub body: Vec<String>,
}

/// Something off about a title that is still usable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TitleIssue {
    NotConventional,
    UnknownType(String),
    UnknownScope(String),
    TooLong(usize),
}

impl fmt::Display for TitleIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TitleIssue::NotConventional => write!(f, "not in `type(scope): message` form"),
            TitleIssue::UnknownType(t) => write!(f, "type '{t}' is not a conventional type"),
            TitleIssue::UnknownScope(s) => write!(f, "scope '{s}' is not one of the suggested scopes"),
            TitleIssue::TooLong(n) => write!(f, "{n} characters, over the {TITLE_SOFT_LIMIT} soft limit"),
        }
    }
}

impl CommitRecord {
    pub fn new(title: impl Into<String>, body: Vec<String>) -> Self {
        Self {
            title: title.into(),
            body,
        }
    }

    /// Body lines joined with newlines.
    pub fn body_text(&self) -> String {
        self.body.join("\n")
    }

    /// Soft checks against the conventional-commit format requested from the model.
    pub fn title_issues(&self) -> Vec<TitleIssue> {
        let mut issues = Vec::new();

        let length = self.title.chars().count();
        if length > TITLE_SOFT_LIMIT {
            issues.push(TitleIssue::TooLong(length));
        }

        let Some(caps) = TITLE_RE.captures(&self.title) else {
            issues.push(TitleIssue::NotConventional);
            return issues;
        };

        let commit_type = caps.get(1).map(|m| m.as_str()).unwrap_or("");
        if !ALLOWED_TYPES.contains(&commit_type) {
            issues.push(TitleIssue::UnknownType(commit_type.to_string()));
        }

        if let Some(scope) = caps.get(2).map(|m| m.as_str())
            && !ALLOWED_SCOPES.contains(&scope)
        {
            issues.push(TitleIssue::UnknownScope(scope.to_string()));
        }

        issues
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum BodyShape {
    Lines(Vec<String>),
    Text(String),
}

fn deserialize_body<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let lines = match Option::<BodyShape>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(BodyShape::Lines(lines)) => lines,
        Some(BodyShape::Text(text)) => text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect(),
    };
    Ok(lines)
}
