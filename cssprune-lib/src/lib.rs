//! Prune a stylesheet down to the rules an HTML document actually uses.
//!
//! Two independent stages: [`collect_classes`] gathers the class names found in
//! the `class` attributes of an HTML document, and [`filter_css`] keeps the CSS
//! rules whose selectors mention at least one of them. [`extract`] runs both.
//!
//! ```
//! let classes = cssprune_lib::collect_classes(r#"<div class="card"></div>"#).unwrap();
//! let css = cssprune_lib::filter_css(".card { padding: 1em; }\n.unused { x: y; }", &classes).unwrap();
//! assert_eq!(css, ".card { padding: 1em; }");
//! ```

pub mod class_set;
pub mod dom;
pub mod error;
pub mod extract;
pub mod options;
pub mod parser;
pub mod style;

pub use class_set::ClassSet;
pub use error::{Error, ExtractionError, ParseError, Result};
pub use extract::{extract, extract_for_classes, Extraction};
pub use options::{CollectOptions, ExtractOptions, FilterOptions, DEFAULT_MAX_INPUT_BYTES};
pub use parser::class_collector::{collect_classes, collect_classes_from_many, collect_classes_with};
pub use style::rule_filter::{filter_css, filter_css_with, process_at_rule_block};
