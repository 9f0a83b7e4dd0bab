//! Commit record generation with a bounded two-phase retry.
//!
//! Each round asks the model for text (up to [`MAX_MODEL_ATTEMPTS`] calls when
//! the call fails or comes back empty) and parses it. An unparseable response
//! triggers one more full round, so a generation costs at most
//! `MAX_MODEL_ATTEMPTS * MAX_PARSE_ROUNDS` model calls.

use tracing::{debug, info, warn};

use crate::commit::parser::parse_response;
use crate::commit::prompt::{Prompt, compose_prompt};
use crate::commit::record::CommitRecord;
use crate::git::diff::DiffSnapshot;
use crate::llm::ModelClient;

/// Model calls per round before the round gives up.
pub const MAX_MODEL_ATTEMPTS: usize = 2;

/// Full generate-and-parse rounds before generation gives up.
pub const MAX_PARSE_ROUNDS: usize = 2;

/// What happened on a single model call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// The call itself failed (transport, quota, auth, missing output).
    ModelFailed(String),
    /// The call succeeded but returned only whitespace.
    EmptyOutput,
    /// Text came back but did not parse into a commit record.
    Unparseable,
    Parsed,
}

/// Result of a generation plus every attempt that led to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationReport {
    pub record: Option<CommitRecord>,
    pub attempts: Vec<AttemptOutcome>,
}

impl GenerationReport {
    /// Number of times the model was called.
    pub fn model_calls(&self) -> usize {
        self.attempts.len()
    }
}

/// Drives prompt composition, model calls and parsing.
pub struct CommitGenerator<'a, M: ModelClient + ?Sized> {
    model: &'a M,
}

impl<'a, M: ModelClient + ?Sized> CommitGenerator<'a, M> {
    pub fn new(model: &'a M) -> Self {
        Self { model }
    }

    /// Generate a commit record for the staged snapshot.
    ///
    /// Returns a report without a record when nothing is staged (the model is
    /// not called) or when the retry budget is spent.
    pub async fn generate(&self, snapshot: &DiffSnapshot) -> GenerationReport {
        let mut attempts = Vec::new();

        if snapshot.is_empty() {
            info!("No staged files; skipping generation");
            return GenerationReport {
                record: None,
                attempts,
            };
        }

        let prompt = compose_prompt(snapshot);
        debug!(
            "Commit prompt length: {} chars",
            prompt.system_instruction.len() + prompt.user_content.len()
        );

        for round in 1..=MAX_PARSE_ROUNDS {
            let Some(raw) = self.request_text(&prompt, &mut attempts).await else {
                warn!("Model produced no output after {MAX_MODEL_ATTEMPTS} attempts");
                break;
            };

            match parse_response(&raw) {
                Some(record) => {
                    attempts.push(AttemptOutcome::Parsed);
                    for issue in record.title_issues() {
                        warn!("Generated title '{}': {}", record.title, issue);
                    }
                    return GenerationReport {
                        record: Some(record),
                        attempts,
                    };
                }
                None => {
                    attempts.push(AttemptOutcome::Unparseable);
                    warn!("Model response was not a valid commit record (round {round}/{MAX_PARSE_ROUNDS})");
                }
            }
        }

        GenerationReport {
            record: None,
            attempts,
        }
    }

    /// Ask the model for non-empty text, retrying once on failure.
    async fn request_text(
        &self,
        prompt: &Prompt,
        attempts: &mut Vec<AttemptOutcome>,
    ) -> Option<String> {
        for attempt in 1..=MAX_MODEL_ATTEMPTS {
            match self.model.generate_content(prompt).await {
                Ok(text) if !text.trim().is_empty() => return Some(text),
                Ok(_) => {
                    warn!("Model returned empty output (attempt {attempt}/{MAX_MODEL_ATTEMPTS})");
                    attempts.push(AttemptOutcome::EmptyOutput);
                }
                Err(e) => {
                    warn!("Model call failed (attempt {attempt}/{MAX_MODEL_ATTEMPTS}): {e}");
                    attempts.push(AttemptOutcome::ModelFailed(e.to_string()));
                }
            }
        }

        None
    }
}
