//! Calendar date extraction from free text via a locally-run Ollama model.
//!
//! One passage in, one collection of `{day, month, year}` records out.
//! The model does the reading; this crate does the prompting, the wire
//! handling, and the strict schema checking of what comes back.
//!
//! ```no_run
//! use dateline::DateExtractor;
//!
//! let extractor = DateExtractor::local();
//! if let Some(dates) = extractor.extract("Wikipedia was launched on January 15, 2001.") {
//!     for d in &dates.dates {
//!         println!("{}-{}-{}", d.year, d.month, d.day);
//!     }
//! }
//! ```

pub mod config;
pub mod extractor;
pub mod ollama;
pub mod parser;
pub mod prompt;
pub mod types;
pub mod validate;

pub use config::*;
pub use extractor::*;
pub use ollama::*;
pub use parser::*;
pub use prompt::*;
pub use types::*;
pub use validate::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Ollama is not running at {0}")]
    Connection(String),

    #[error("Ollama returned error (status {status}): {body}")]
    Backend { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Invalid model name: '{0}'")]
    InvalidModelName(String),

    #[error("Response parsing error: {0}")]
    ResponseParsing(String),

    #[error("Malformed model response: {0}")]
    MalformedResponse(String),

    #[error("JSON parsing error: {0}")]
    JsonParsing(String),

    #[error("Schema validation failed: {0}")]
    SchemaValidation(#[from] validate::SchemaViolation),
}

/// Which side of the round trip a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The model call itself went wrong: connection, HTTP, bad model name.
    Backend,
    /// The model answered, but the reply does not parse or does not match
    /// the expected schema.
    Schema,
}

impl ExtractError {
    /// Classify this failure for callers that only care which side broke.
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Connection(_)
            | Self::Backend { .. }
            | Self::HttpClient(_)
            | Self::InvalidModelName(_)
            | Self::ResponseParsing(_) => FailureKind::Backend,
            Self::MalformedResponse(_) | Self::JsonParsing(_) | Self::SchemaValidation(_) => {
                FailureKind::Schema
            }
        }
    }
}
