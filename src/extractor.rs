use crate::config::ExtractorConfig;
use crate::ollama::OllamaClient;
use crate::parser::parse_response_json;
use crate::prompt::{build_extraction_prompt, EXTRACTION_SYSTEM_PROMPT};
use crate::types::{DateCollection, LlmClient};
use crate::validate::validate_date_collection;
use crate::ExtractError;

/// Orchestrates one extraction round trip:
/// prompt → model → parse → validate → dates
///
/// Each call is a single synchronous attempt. There is no retry and no
/// state carried between passages.
pub struct DateExtractor {
    llm: Box<dyn LlmClient + Send + Sync>,
    config: ExtractorConfig,
}

impl DateExtractor {
    pub fn new(llm: Box<dyn LlmClient + Send + Sync>, config: ExtractorConfig) -> Self {
        Self { llm, config }
    }

    /// Extractor against the local Ollama instance with stock configuration
    /// (honors `OLLAMA_HOST`).
    pub fn local() -> Self {
        Self::new(Box::new(OllamaClient::from_env()), ExtractorConfig::default())
    }

    /// The configuration this extractor runs with.
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extract dates from a passage, surfacing what went wrong on failure.
    ///
    /// `ExtractError::kind()` separates backend trouble (Ollama down, HTTP
    /// failure, model missing) from schema trouble (the model answered,
    /// but not in the shape the prompt demanded).
    pub fn try_extract(&self, passage: &str) -> Result<DateCollection, ExtractError> {
        let _span =
            tracing::info_span!("extract_dates", passage_bytes = passage.len()).entered();

        // Step 1: Build the two-message prompt (pure, cannot fail)
        let prompt = build_extraction_prompt(passage);

        // Step 2: One chat round trip
        let reply = self.llm.chat(
            &self.config.model,
            EXTRACTION_SYSTEM_PROMPT,
            &prompt,
            self.config.temperature,
        )?;

        // Step 3: Locate and parse the JSON payload
        let value = parse_response_json(&reply)?;

        // Step 4: Validate the shape into typed records
        let collection = validate_date_collection(&value)?;

        tracing::debug!(
            model = %self.config.model,
            count = collection.dates.len(),
            "date extraction complete"
        );

        Ok(collection)
    }

    /// Extract dates from a passage, collapsing every failure to `None`.
    ///
    /// The diagnostic goes to the log only. Callers that need to tell a
    /// backend failure from a schema failure should use `try_extract`.
    pub fn extract(&self, passage: &str) -> Option<DateCollection> {
        match self.try_extract(passage) {
            Ok(collection) => Some(collection),
            Err(e) => {
                tracing::error!(kind = ?e.kind(), error = %e, "Error in extracting dates");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ollama::MockLlmClient;
    use crate::types::DateRecord;
    use crate::FailureKind;
    use std::sync::{Arc, Mutex};

    /// Mock client that always fails at the transport level.
    struct FailingLlmClient;

    impl LlmClient for FailingLlmClient {
        fn chat(
            &self,
            _model: &str,
            _system: &str,
            _prompt: &str,
            _temperature: f32,
        ) -> Result<String, ExtractError> {
            Err(ExtractError::Connection("http://localhost:11434".into()))
        }

        fn is_model_available(&self, _model: &str) -> Result<bool, ExtractError> {
            Ok(false)
        }

        fn list_models(&self) -> Result<Vec<String>, ExtractError> {
            Err(ExtractError::Connection("http://localhost:11434".into()))
        }
    }

    /// What one chat call carried across the client boundary.
    struct CapturedChat {
        model: String,
        system: String,
        prompt: String,
        temperature: f32,
    }

    /// Mock client that records every chat call before replying.
    struct CapturingLlmClient {
        reply: String,
        calls: Arc<Mutex<Vec<CapturedChat>>>,
    }

    impl LlmClient for CapturingLlmClient {
        fn chat(
            &self,
            model: &str,
            system: &str,
            prompt: &str,
            temperature: f32,
        ) -> Result<String, ExtractError> {
            self.calls.lock().unwrap().push(CapturedChat {
                model: model.to_string(),
                system: system.to_string(),
                prompt: prompt.to_string(),
                temperature,
            });
            Ok(self.reply.clone())
        }

        fn is_model_available(&self, _model: &str) -> Result<bool, ExtractError> {
            Ok(true)
        }

        fn list_models(&self) -> Result<Vec<String>, ExtractError> {
            Ok(vec!["llama3.1:latest".into()])
        }
    }

    /// Write sink that keeps formatted log output for assertions.
    struct LogSink(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for LogSink {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn extractor_with_reply(reply: &str) -> DateExtractor {
        DateExtractor::new(Box::new(MockLlmClient::new(reply)), ExtractorConfig::default())
    }

    #[test]
    fn full_extraction_pipeline() {
        let extractor =
            extractor_with_reply(r#"{"dates": [{"day": 15, "month": 1, "year": 2001}]}"#);
        let collection = extractor
            .extract("Wikipedia was launched on January 15, 2001.")
            .unwrap();

        assert_eq!(
            collection.dates,
            vec![DateRecord {
                day: 15,
                month: 1,
                year: 2001
            }]
        );
    }

    #[test]
    fn month_comes_back_numeric() {
        let extractor =
            extractor_with_reply(r#"{"dates": [{"day": 4, "month": 9, "year": 1998}]}"#);
        let collection = extractor
            .extract("Google was founded on September 4, 1998.")
            .unwrap();

        assert_eq!(collection.dates[0].month, 9);
    }

    #[test]
    fn two_dates_keep_model_emission_order() {
        let extractor = extractor_with_reply(
            r#"{"dates": [{"day": 29, "month": 1, "year": 1886}, {"day": 8, "month": 6, "year": 1948}]}"#,
        );
        let collection = extractor
            .extract("Benz applied for a patent on January 29, 1886, and the 356 followed on June 8, 1948.")
            .unwrap();

        assert_eq!(collection.dates.len(), 2);
        assert_eq!(
            collection.dates[0],
            DateRecord {
                day: 29,
                month: 1,
                year: 1886
            }
        );
        assert_eq!(
            collection.dates[1],
            DateRecord {
                day: 8,
                month: 6,
                year: 1948
            }
        );
    }

    #[test]
    fn no_dates_is_success_not_failure() {
        let extractor = extractor_with_reply(r#"{"dates": []}"#);
        let collection = extractor.extract("Nothing datable in here.").unwrap();
        assert!(collection.dates.is_empty());
    }

    #[test]
    fn empty_passage_is_a_valid_input() {
        let extractor = extractor_with_reply(r#"{"dates": []}"#);
        assert!(extractor.extract("").is_some());
    }

    #[test]
    fn fenced_reply_is_accepted() {
        let extractor = extractor_with_reply(
            "```json\n{\"dates\": [{\"day\": 15, \"month\": 1, \"year\": 2001}]}\n```",
        );
        let collection = extractor.extract("January 15, 2001").unwrap();
        assert_eq!(collection.dates.len(), 1);
    }

    #[test]
    fn missing_dates_key_is_a_schema_failure() {
        let extractor = extractor_with_reply(r#"{"found": []}"#);

        let err = extractor.try_extract("some passage").unwrap_err();
        assert_eq!(err.kind(), FailureKind::Schema);
        assert!(extractor.extract("some passage").is_none());
    }

    #[test]
    fn non_integer_field_is_a_schema_failure() {
        let extractor =
            extractor_with_reply(r#"{"dates": [{"day": "fifteen", "month": 1, "year": 2001}]}"#);

        let err = extractor.try_extract("some passage").unwrap_err();
        assert_eq!(err.kind(), FailureKind::Schema);
        assert!(extractor.extract("some passage").is_none());
    }

    #[test]
    fn unparsable_reply_is_a_schema_failure() {
        let extractor = extractor_with_reply("I could not find any dates, sorry!");

        let err = extractor.try_extract("some passage").unwrap_err();
        assert_eq!(err.kind(), FailureKind::Schema);
    }

    #[test]
    fn transport_failure_is_a_backend_failure() {
        let extractor =
            DateExtractor::new(Box::new(FailingLlmClient), ExtractorConfig::default());

        let err = extractor.try_extract("some passage").unwrap_err();
        assert_eq!(err.kind(), FailureKind::Backend);
        assert!(extractor.extract("some passage").is_none());
    }

    #[test]
    fn same_reply_gives_same_collection() {
        let extractor =
            extractor_with_reply(r#"{"dates": [{"day": 8, "month": 6, "year": 1948}]}"#);
        let passage = "Porsche 356 production began on June 8, 1948.";

        let first = extractor.try_extract(passage).unwrap();
        let second = extractor.try_extract(passage).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn chat_carries_prompt_system_and_config() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let client = CapturingLlmClient {
            reply: r#"{"dates": []}"#.into(),
            calls: Arc::clone(&calls),
        };
        let extractor = DateExtractor::new(Box::new(client), ExtractorConfig::default());

        extractor.extract("The wall fell on November 9, 1989.").unwrap();

        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].model, "llama3.1");
        assert!((calls[0].temperature - 0.0).abs() < f32::EPSILON);
        assert_eq!(calls[0].system, EXTRACTION_SYSTEM_PROMPT);
        assert!(calls[0].prompt.contains("The wall fell on November 9, 1989."));
        assert!(calls[0].prompt.contains("'dates' key"));
    }

    #[test]
    fn custom_config_reaches_the_client() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let client = CapturingLlmClient {
            reply: r#"{"dates": []}"#.into(),
            calls: Arc::clone(&calls),
        };
        let config = ExtractorConfig {
            model: "mistral:7b".into(),
            temperature: 0.7,
        };
        let extractor = DateExtractor::new(Box::new(client), config);
        assert_eq!(extractor.config().model, "mistral:7b");
        assert!((extractor.config().temperature - 0.7).abs() < f32::EPSILON);

        extractor.extract("whatever").unwrap();

        let calls = calls.lock().unwrap();
        assert_eq!(calls[0].model, "mistral:7b");
        assert!((calls[0].temperature - 0.7).abs() < f32::EPSILON);
    }

    #[test]
    fn span_reports_passage_length_in_bytes() {
        let sink = Arc::new(Mutex::new(Vec::new()));
        let writer_sink = Arc::clone(&sink);
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || LogSink(Arc::clone(&writer_sink)))
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            let extractor = extractor_with_reply(r#"{"dates": []}"#);
            // "Född 8 juni 1948." is 17 chars but 18 bytes ('ö' is two).
            extractor.try_extract("Född 8 juni 1948.").unwrap();
        });

        let logged = String::from_utf8(sink.lock().unwrap().clone()).unwrap();
        assert!(logged.contains("passage_bytes=18"));
    }
}
