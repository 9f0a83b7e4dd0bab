//! Prompt construction for AI-generated commit messages.

use crate::commit::record::{ALLOWED_SCOPES, ALLOWED_TYPES, TITLE_SOFT_LIMIT};
use crate::git::diff::DiffSnapshot;

/// A system instruction plus the user turn for one model call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system_instruction: String,
    pub user_content: String,
}

/// Build the fixed system instruction pinning the model to the JSON schema.
pub fn system_instruction() -> String {
    let types = ALLOWED_TYPES.join("|");
    let scopes = ALLOWED_SCOPES.join("|");

    format!(
        r#"You write Git commit messages following the Conventional Commits specification.

Respond with ONLY a raw JSON object. No markdown fences, no explanation, no text before or after it.
The object has exactly two fields:
{{"title": "type(scope): message", "body": ["- first change", "- second change"]}}

## title (string)
- Format: `type(scope): message` where `(scope)` is optional
- type: one of {types}
- scope: one of {scopes}
- Lowercase type, imperative mood, no period at the end
- Keep the whole title within {TITLE_SOFT_LIMIT} characters

## body (array of strings)
- One entry per distinct change found in the diff
- Every entry starts with "- "
- If the diff is empty, still return a meaningful title and an empty body: []"#
    )
}

/// Build the prompt for one staged snapshot.
///
/// The diff text is embedded verbatim. An empty diff still yields a valid prompt.
pub fn compose_prompt(snapshot: &DiffSnapshot) -> Prompt {
    let files_section = if snapshot.staged_files.is_empty() {
        "(none)".to_string()
    } else {
        snapshot
            .staged_files
            .iter()
            .map(|f| format!("- {} ({})", f.path, f.status))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let diff_section = if snapshot.diff_text.is_empty() {
        "(empty diff)"
    } else {
        snapshot.diff_text.as_str()
    };

    let user_content = format!(
        r#"Using branch "{branch}" as context, generate a commit message for the staged changes below.

## Staged Files ({additions} additions, {deletions} deletions)
{files_section}

## Diff
{diff_section}"#,
        branch = snapshot.branch,
        additions = snapshot.additions,
        deletions = snapshot.deletions,
    );

    Prompt {
        system_instruction: system_instruction(),
        user_content,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::diff::{FileStatus, StagedFile};

    fn snapshot(diff_text: &str) -> DiffSnapshot {
        DiffSnapshot {
            branch: "feature/auth".to_string(),
            staged_files: vec![StagedFile {
                path: "src/auth/login.rs".to_string(),
                status: FileStatus::Modified,
            }],
            diff_text: diff_text.to_string(),
            additions: 1,
            deletions: 0,
            unstaged_count: 0,
            untracked_count: 0,
        }
    }

    #[test]
    fn test_system_instruction_pins_schema() {
        let instruction = system_instruction();
        assert!(instruction.contains(r#""title""#));
        assert!(instruction.contains(r#""body""#));
        assert!(instruction.contains("ONLY a raw JSON object"));
        assert!(instruction.contains("feat|fix|docs|style|refactor|perf|test|build|ci|chore|revert"));
        assert!(instruction.contains("auth|db|ui|api|deps|core|test"));
        assert!(instruction.contains("72 characters"));
        assert!(instruction.contains(r#"starts with "- ""#));
    }

    #[test]
    fn test_compose_prompt_embeds_diff_verbatim() {
        let diff = "diff --git a/x b/x\n+ added login validation\n\x1b[31m-kept as is\n";
        let prompt = compose_prompt(&snapshot(diff));
        assert!(prompt.user_content.contains(diff));
        assert!(prompt.user_content.contains("feature/auth"));
        assert!(prompt.user_content.contains("src/auth/login.rs (Modified)"));
        assert_eq!(prompt.system_instruction, system_instruction());
    }

    #[test]
    fn test_compose_prompt_with_empty_diff() {
        let prompt = compose_prompt(&snapshot(""));
        assert!(prompt.user_content.contains("(empty diff)"));
        assert!(prompt.system_instruction.contains("empty body"));
    }
}
