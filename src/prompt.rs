/// Fixed system message sent with every extraction request.
pub const EXTRACTION_SYSTEM_PROMPT: &str = "You are a helpful AI assistant. \
Extract dates from the given passage and return them in JSON format.";

/// Build the user message for one passage.
///
/// Pure function of the passage text, which is embedded verbatim. An empty
/// passage is a legitimate input; "no dates found" is a model outcome, not
/// a builder concern.
pub fn build_extraction_prompt(passage: &str) -> String {
    format!(
        "Identify the dates from the passage and extract the day, month and year. \
         Return the dates as a JSON object with a 'dates' key containing a list of \
         date objects. Each date object should have 'day', 'month', and 'year' keys. \
         Return the number of the month, not its name. Here is the text: {passage}"
    )
}
