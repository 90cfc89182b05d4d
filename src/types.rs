use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::ExtractError;

/// A single calendar date pulled from a passage.
///
/// Field values come from the model verbatim. The schema check only
/// guarantees they are integers, so a day of 31 in a 30-day month (or a
/// month of 13) can slip through; `as_naive_date` is the calendar-aware
/// conversion for callers that need a real date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRecord {
    pub day: i64,
    /// Numeric month (the prompt asks for the number, not the name).
    pub month: i64,
    pub year: i64,
}

impl DateRecord {
    /// Checked conversion to a chrono calendar date.
    ///
    /// `None` when the raw integers do not form a real date.
    pub fn as_naive_date(&self) -> Option<NaiveDate> {
        let year = i32::try_from(self.year).ok()?;
        let month = u32::try_from(self.month).ok()?;
        let day = u32::try_from(self.day).ok()?;
        NaiveDate::from_ymd_opt(year, month, day)
    }
}

/// Every date extracted from one passage, in the order the model emitted
/// them (which need not match their order in the passage).
///
/// Empty is a valid outcome: the passage contained no recognizable dates.
/// That is distinct from an extraction failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateCollection {
    pub dates: Vec<DateRecord>,
}

/// LLM chat backend abstraction (allows mocking)
pub trait LlmClient {
    /// Send one system + user message pair, return the assistant reply
    /// content verbatim.
    fn chat(
        &self,
        model: &str,
        system: &str,
        prompt: &str,
        temperature: f32,
    ) -> Result<String, ExtractError>;

    fn is_model_available(&self, model: &str) -> Result<bool, ExtractError>;

    fn list_models(&self) -> Result<Vec<String>, ExtractError>;
}
