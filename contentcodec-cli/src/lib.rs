//! CLI library for testing purposes

pub mod payload;
pub mod validation;

pub use payload::{parse_documents, parse_json, read_input, to_pretty_json};
pub use validation::{ValidationContext, validate_context, validate_element, validate_locale};
