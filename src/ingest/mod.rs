pub mod loader;
pub mod sanitizer;
pub mod types;
