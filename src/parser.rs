use serde_json::Value;

use crate::ExtractError;

/// Locate and parse the JSON document in a raw model reply.
///
/// Prompted models answer with either the bare JSON document or the
/// document wrapped in a Markdown code fence, sometimes with prose around
/// the fence. Both forms are accepted; prose outside a fence is ignored.
/// No repair beyond fence stripping is attempted.
pub fn parse_response_json(response: &str) -> Result<Value, ExtractError> {
    let payload = extract_json_payload(response)?;
    serde_json::from_str(payload.trim()).map_err(|e| ExtractError::JsonParsing(e.to_string()))
}

/// Pull the JSON text out of the reply: fenced block if present, otherwise
/// the whole reply.
fn extract_json_payload(response: &str) -> Result<&str, ExtractError> {
    // ```json wins over a bare ``` fence when both could match.
    for fence in ["```json", "```"] {
        if let Some(start) = response.find(fence) {
            let content_start = start + fence.len();
            let content_end = response[content_start..]
                .find("```")
                .ok_or_else(|| ExtractError::MalformedResponse("Unclosed code fence".into()))?;
            return Ok(&response[content_start..content_start + content_end]);
        }
    }

    let trimmed = response.trim();
    if trimmed.is_empty() {
        return Err(ExtractError::MalformedResponse("Empty model reply".into()));
    }
    Ok(trimmed)
}
