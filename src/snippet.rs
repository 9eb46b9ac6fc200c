use crate::generate::TextGenerator;
use tracing::warn;

fn snippet_prompt(language: &str) -> String {
    format!(
        "Generate a short, 8-12 line code snippet in the {language} programming language. \
         The code must be a common, practical, and representative example of the language's syntax, \
         suitable for a typing practice app. Do not include any explanation, comments, or markdown \
         formatting like ```. Only return the raw code itself. The code must not contain any backticks."
    )
}

/// Substitute challenge used whenever generation fails
pub fn fallback_snippet(language: &str) -> String {
    format!(
        "// Could not load a challenge for {language}.\n\
         // Check your API key or network connection.\n\
         function fallback() {{\n  console.log(\"This is a fallback code snippet.\");\n}}"
    )
}

/// Remove a markdown fence wrapped around the whole text.
///
/// Only a leading fence (with an optional language tag line) and a trailing
/// fence are removed. Fences in the middle of the body are kept as typed text.
pub fn strip_code_fences(raw: &str) -> &str {
    let mut text = raw.trim();

    if let Some(rest) = text.strip_prefix("```") {
        let tag_len = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(rest.len());
        text = match rest[tag_len..].strip_prefix('\n') {
            Some(body) if tag_len > 0 => body,
            _ => rest,
        };
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }

    text.trim()
}

/// Fetch a practice snippet for `language`. Never fails: any error, or an
/// empty result once cleaned, yields [`fallback_snippet`].
pub fn generate_code_snippet(generator: &dyn TextGenerator, language: &str) -> String {
    match generator.generate(&snippet_prompt(language)) {
        Ok(text) => {
            let cleaned = strip_code_fences(&text);
            if cleaned.is_empty() {
                warn!(language, "generated snippet was empty, using fallback");
                fallback_snippet(language)
            } else {
                cleaned.to_string()
            }
        }
        Err(e) => {
            warn!(language, error = %e, "snippet generation failed, using fallback");
            fallback_snippet(language)
        }
    }
}
