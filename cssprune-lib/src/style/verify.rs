use lightningcss::rules::CssRule;
use lightningcss::stylesheet::{ParserOptions, StyleSheet};

use crate::error::ExtractionError;

/// Rule counts of a stylesheet that lightningcss accepted.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SheetSummary {
    pub style_rules: usize,
    pub media_rules: usize,
    pub keyframes: usize,
    pub font_faces: usize,
    pub other: usize,
}

/// Parses `css` with lightningcss in non-recovering mode.
///
/// Used on the filter output: the scanner only counts braces, so braces inside
/// strings or attribute selectors can cut a rule in the wrong place. A full
/// parse catches that before the result is handed out.
pub fn verify_stylesheet(css: &str) -> Result<SheetSummary, ExtractionError> {
    let parser_opts = ParserOptions {
        error_recovery: false,
        ..ParserOptions::default()
    };
    let sheet = StyleSheet::parse(css, parser_opts)
        .map_err(|e| ExtractionError::InvalidOutput(e.to_string()))?;

    let mut summary = SheetSummary::default();
    for rule in &sheet.rules.0 {
        match rule {
            CssRule::Style(_) => summary.style_rules += 1,
            CssRule::Media(_) => summary.media_rules += 1,
            CssRule::Keyframes(_) => summary.keyframes += 1,
            CssRule::FontFace(_) => summary.font_faces += 1,
            _ => summary.other += 1,
        }
    }
    log::debug!("verified filtered stylesheet: {:?}", summary);
    Ok(summary)
}
