// URL handling utilities
pub mod url_builder;
pub mod url_parser;

pub use url_builder::absolute_url;
pub use url_parser::hostname_from_url;
