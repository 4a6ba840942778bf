use crate::class_set::ClassSet;
use crate::error::{Error, Result};
use crate::options::ExtractOptions;
use crate::parser::class_collector;
use crate::style::rule_filter;

/// Result of running both stages on one HTML/CSS pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub classes: ClassSet,
    pub css: String,
}

/// Collects the classes used by `html`, then keeps the rules of `css` that use them.
///
/// # Arguments
///
/// * `html` - The page whose `class` attributes decide what is kept.
/// * `css` - The stylesheet to prune.
/// * `options` - Options for both stages.
///
/// # Returns
///
/// An [`Extraction`] with the collected classes and the filtered stylesheet.
/// Whitespace-only CSS fails with [`Error::EmptyCss`] and a page without any
/// class with [`Error::NoClasses`].
pub fn extract(html: &str, css: &str, options: &ExtractOptions) -> Result<Extraction> {
    let classes = class_collector::collect_classes_with(html, &options.collect)?;
    let css = extract_for_classes(css, &classes, options)?;
    Ok(Extraction { classes, css })
}

/// Second stage on its own, for callers that built the class set themselves.
pub fn extract_for_classes(css: &str, classes: &ClassSet, options: &ExtractOptions) -> Result<String> {
    if css.trim().is_empty() {
        return Err(Error::EmptyCss);
    }
    if classes.is_empty() {
        return Err(Error::NoClasses);
    }
    Ok(rule_filter::filter_css_with(css, classes, &options.filter)?)
}
