pub mod rule_filter;
pub mod scanner;
pub mod selector;
pub mod verify;
