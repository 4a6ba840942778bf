use rayon::prelude::*;

use crate::class_set::ClassSet;
use crate::dom::dom_tree::{self, Document};
use crate::error::ParseError;
use crate::options::{exceeds, CollectOptions};
use crate::parser::html_sink;

/// Collects every distinct class token used in `html`, with default options.
pub fn collect_classes(html: &str) -> Result<ClassSet, ParseError> {
    collect_classes_with(html, &CollectOptions::default())
}

/// Collects every distinct class token used in `html`.
///
/// Parsing is tolerant: malformed markup is repaired by html5ever and whatever
/// elements survive are visited. A missing `<!DOCTYPE>` is not treated as an
/// error, so fragments are accepted in strict mode too.
///
/// # Arguments
///
/// * `html` - The HTML document or fragment to scan.
/// * `options` - Size cap and strictness.
///
/// # Returns
///
/// The sorted, duplicate-free set of class names. Fails with
/// [`ParseError::InputTooLarge`] over the size cap, or with
/// [`ParseError::Malformed`] when `options.strict` is set and html5ever had to
/// recover from errors in the markup.
pub fn collect_classes_with(html: &str, options: &CollectOptions) -> Result<ClassSet, ParseError> {
    if let Some(limit) = exceeds(html.len(), options.max_input_bytes) {
        return Err(ParseError::InputTooLarge {
            size: html.len(),
            limit,
        });
    }

    let parsed = html_sink::create_dom_tree(html);
    if !parsed.errors.is_empty() {
        if options.strict {
            return Err(ParseError::Malformed {
                count: parsed.errors.len(),
                first: parsed.errors[0].to_string(),
            });
        }
        log::debug!(
            "recovered from {} HTML parse error(s); first: {}",
            parsed.errors.len(),
            parsed.errors[0]
        );
    }

    let classes = classes_in_document(&parsed.document);
    log::debug!(
        "collected {} classes from {} bytes of HTML",
        classes.len(),
        html.len()
    );
    Ok(classes)
}

/// Collects the union of the classes of several documents, parsing them in parallel.
///
/// Each document is parsed on whichever rayon worker picks it up; only the
/// resulting sets cross threads. Any failing document fails the whole call.
pub fn collect_classes_from_many<S>(
    documents: &[S],
    options: &CollectOptions,
) -> Result<ClassSet, ParseError>
where
    S: AsRef<str> + Sync,
{
    let sets = documents
        .par_iter()
        .map(|html| collect_classes_with(html.as_ref(), options))
        .collect::<Result<Vec<_>, _>>()?;

    let mut classes = ClassSet::new();
    for set in sets {
        classes.union_with(set);
    }
    Ok(classes)
}

/// Walks the tree and gathers the class tokens of every element.
fn classes_in_document(document: &Document) -> ClassSet {
    let mut classes = ClassSet::new();
    dom_tree::for_each_element(&document.root, &mut |elem| {
        classes.extend(elem.class_tokens());
    });
    classes
}
