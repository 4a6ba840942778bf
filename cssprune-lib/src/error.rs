use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Raised when an HTML document cannot be turned into a class set.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("HTML input is {size} bytes, above the {limit} byte limit")]
    InputTooLarge { size: usize, limit: usize },

    #[error("HTML input is malformed ({count} parse errors, first: {first})")]
    Malformed { count: usize, first: String },
}

/// Raised when the CSS scanner cannot produce a complete result.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("CSS input is {size} bytes, above the {limit} byte limit")]
    InputTooLarge { size: usize, limit: usize },

    #[error("Unbalanced closing brace on line {line}")]
    UnbalancedBrace { line: usize },

    #[error("Filtered CSS failed verification: {0}")]
    InvalidOutput(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Failed to parse HTML and extract classes: {0}")]
    Parse(#[from] ParseError),

    #[error("Failed to extract CSS rules: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("No CSS content to filter")]
    EmptyCss,

    #[error("No classes found in the HTML input")]
    NoClasses,
}
