//! Crate-level defaults and runtime configuration.
//!
//! Every tunable the extractor honors lives here as a named constant, so
//! there is exactly one place to read the stock behavior off.

/// Model used when the caller does not pick one.
pub const DEFAULT_MODEL: &str = "llama3.1";

/// Sampling temperature used when the caller does not pick one.
///
/// Zero keeps extraction deterministic: the same passage yields the same
/// dates across runs.
pub const DEFAULT_TEMPERATURE: f32 = 0.0;

/// Base URL of a locally-running Ollama instance.
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// HTTP timeout for a single chat round trip, in seconds.
///
/// Generous because a cold model load on CPU-only machines can take well
/// over a minute before the first token.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Default `tracing` filter when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "dateline=info"
}

/// Per-extraction knobs, enumerated so callers never rely on hidden state.
///
/// `Default` gives the stock setup: `llama3.1` at temperature zero.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractorConfig {
    /// Ollama model identifier (`name` or `name:tag`).
    pub model: String,
    /// Sampling temperature passed to the model.
    pub temperature: f32,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

impl ExtractorConfig {
    /// Stock configuration with a different model.
    pub fn with_model(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Self::default()
        }
    }
}
