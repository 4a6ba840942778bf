use crate::class_set::ClassSet;
use crate::error::ExtractionError;
use crate::options::{exceeds, FilterOptions};
use crate::style::scanner::{is_keyframes_header, Construct, RuleScanner};
use crate::style::selector::should_include;
use crate::style::verify;

/// Keeps only the rules of `css` that reference a class in `target`, with default options.
pub fn filter_css(css: &str, target: &ClassSet) -> Result<String, ExtractionError> {
    filter_css_with(css, target, &FilterOptions::default())
}

/// Keeps only the rules of `css` that reference a class in `target`.
///
/// Kept rules and at-rule blocks are copied verbatim, in document order, each
/// separated by a blank line. Comments, unmatched rules and media blocks with
/// no matching rule inside are dropped. `@keyframes` blocks are always kept.
///
/// # Arguments
///
/// * `css` - The stylesheet to filter.
/// * `target` - Class names whose rules are kept.
/// * `options` - Size cap and optional re-parse of the output.
///
/// # Returns
///
/// The filtered stylesheet, or an [`ExtractionError`] with no partial output.
///
/// # Limitations
///
/// Rule boundaries are found by counting braces line by line, without
/// tokenizing strings or escapes. A `}` inside a string value
/// (`content: "}"`) fails the call with [`ExtractionError::UnbalancedBrace`];
/// a `{` inside a string leaves the rule open, so it and every later rule are
/// dropped as unterminated.
pub fn filter_css_with(
    css: &str,
    target: &ClassSet,
    options: &FilterOptions,
) -> Result<String, ExtractionError> {
    if let Some(limit) = exceeds(css.len(), options.max_input_bytes) {
        return Err(ExtractionError::InputTooLarge {
            size: css.len(),
            limit,
        });
    }

    let constructs = RuleScanner::new().scan(css)?;
    let total = constructs.len();
    let mut kept = 0usize;
    let mut output = String::new();

    for construct in constructs {
        let accepted = match construct {
            Construct::Rule { text, line } => {
                if should_include(&text, target) {
                    Some(text)
                } else {
                    log::trace!("dropping rule on line {}", line);
                    None
                }
            }
            Construct::AtRule { text, line } => {
                process_at_rule_block(&text, target).map_err(|err| match err {
                    ExtractionError::UnbalancedBrace { .. } => {
                        ExtractionError::UnbalancedBrace { line }
                    }
                    other => other,
                })?
            }
        };
        if let Some(text) = accepted {
            output.push_str(&text);
            output.push_str("\n\n");
            kept += 1;
        }
    }

    let output = output.trim().to_string();
    log::debug!(
        "kept {} of {} CSS constructs ({} -> {} bytes)",
        kept,
        total,
        css.len(),
        output.len()
    );

    if options.verify_output {
        verify::verify_stylesheet(&output)?;
    }
    Ok(output)
}

/// Filters the inside of one `@media` or `@keyframes` block.
///
/// Keyframes come back unchanged. A media block is rebuilt around the inner
/// rules that match, or dropped (`None`) when none do.
pub fn process_at_rule_block(
    text: &str,
    target: &ClassSet,
) -> Result<Option<String>, ExtractionError> {
    if is_keyframes_header(text.trim_start()) {
        return Ok(Some(text.to_string()));
    }

    let (open, close) = match (text.find('{'), text.rfind('}')) {
        (Some(open), Some(close)) if open < close => (open, close),
        _ => return Ok(None),
    };
    let header = text[..open].trim();
    let body = text[open + 1..close].trim();
    if body.is_empty() {
        return Ok(None);
    }

    let rules = RuleScanner::nested()
        .scan(body)?
        .into_iter()
        .filter_map(|construct| match construct {
            Construct::Rule { text, .. } if should_include(&text, target) => Some(text),
            _ => None,
        })
        .collect::<Vec<_>>();

    if rules.is_empty() {
        log::trace!("dropping empty block `{}`", header);
        return Ok(None);
    }
    Ok(Some(format!("{} {{\n    {}\n}}", header, rules.join("\n\n    "))))
}
