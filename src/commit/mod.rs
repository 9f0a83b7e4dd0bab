//! AI-generated commit records: prompt, parsing and the retry loop.

pub mod generate;
pub mod parser;
pub mod prompt;
pub mod record;

pub use generate::{AttemptOutcome, CommitGenerator, GenerationReport};
pub use parser::parse_response;
pub use prompt::{Prompt, compose_prompt};
pub use record::CommitRecord;
