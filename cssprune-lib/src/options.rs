//! Tunables for the class collector and the rule filter.

/// Default cap applied to both HTML and CSS inputs (10 MiB).
pub const DEFAULT_MAX_INPUT_BYTES: usize = 10 * 1024 * 1024;

/// Options for [`crate::parser::class_collector::collect_classes_with`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectOptions {
    /// Inputs longer than this are rejected before parsing. `None` disables the check.
    pub max_input_bytes: Option<usize>,
    /// Fail on any recoverable html5ever parse error instead of tolerating it.
    pub strict: bool,
}

impl Default for CollectOptions {
    fn default() -> Self {
        Self {
            max_input_bytes: Some(DEFAULT_MAX_INPUT_BYTES),
            strict: false,
        }
    }
}

/// Options for [`crate::style::rule_filter::filter_css_with`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOptions {
    /// Inputs longer than this are rejected before scanning. `None` disables the check.
    pub max_input_bytes: Option<usize>,
    /// Re-parse the filtered output with lightningcss and fail if it is not valid CSS.
    pub verify_output: bool,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            max_input_bytes: Some(DEFAULT_MAX_INPUT_BYTES),
            verify_output: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractOptions {
    pub collect: CollectOptions,
    pub filter: FilterOptions,
}

/// Returns the limit that `size` breaks, if any.
pub(crate) fn exceeds(size: usize, limit: Option<usize>) -> Option<usize> {
    match limit {
        Some(limit) if size > limit => Some(limit),
        _ => None,
    }
}
