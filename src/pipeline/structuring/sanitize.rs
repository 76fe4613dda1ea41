// Input normalization applied before any structuring strategy runs.
// Every strategy assumes `\n` line endings and no invisible formatting characters.

use super::InputError;

/// Normalize raw document text: unify line endings to `\n` and strip
/// invisible formatting characters. Rejects empty or whitespace-only input.
pub fn normalize_document(raw: &str) -> Result<String, InputError> {
    let normalized = remove_invisible_chars(&normalize_line_endings(raw));

    if normalized.trim().is_empty() {
        return Err(InputError::EmptyDocument);
    }

    Ok(normalized)
}

/// Convert `\r\n` and lone `\r` to `\n`.
pub fn normalize_line_endings(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Remove zero-width and directional formatting characters.
/// Preserves standard whitespace (space, newline, tab).
fn remove_invisible_chars(text: &str) -> String {
    text.chars()
        .filter(|c| {
            if *c == ' ' || *c == '\n' || *c == '\t' {
                return true;
            }
            if matches!(
                *c,
                '\u{200B}'  // Zero-width space
                | '\u{200C}' // Zero-width non-joiner
                | '\u{200D}' // Zero-width joiner
                | '\u{200E}' // Left-to-right mark
                | '\u{200F}' // Right-to-left mark
                | '\u{202A}'..='\u{202E}' // Directional embeddings/overrides
                | '\u{2060}'..='\u{2064}' // Word joiner, invisible operators
                | '\u{FEFF}' // BOM / zero-width no-break space
            ) {
                return false;
            }
            !c.is_control()
        })
        .collect()
}
