//! Lenient JSON extraction for model replies
//!
//! Only used when a reply does not parse as bare JSON. Some models
//! still wrap schema-constrained output in a markdown fence or a line
//! of prose.

const FENCE: &str = "```";

/// Return the JSON object text inside `text`.
///
/// A fenced block wins when a fence opens a line; backticks inside a
/// line (for example within a JSON string) are not treated as a fence.
/// Otherwise the outermost `{ ... }` span is returned.
pub fn extract_json_object(text: &str) -> Option<&str> {
    if let Some(body) = fenced_block(text) {
        return Some(body);
    }

    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Body of the first fenced block, minus its info string (`json`, etc.)
fn fenced_block(text: &str) -> Option<&str> {
    let open = text
        .match_indices(FENCE)
        .map(|(i, _)| i)
        .find(|&i| i == 0 || text[..i].ends_with('\n'))?;

    let after_open = &text[open + FENCE.len()..];
    let body = &after_open[after_open.find('\n')? + 1..];
    let close = body.find(FENCE)?;

    Some(body[..close].trim())
}
