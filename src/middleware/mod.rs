pub mod error_sanitizer;

pub use error_sanitizer::ErrorSanitizer;
