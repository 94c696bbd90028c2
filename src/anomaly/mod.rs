pub mod baseline;
pub mod engine;
pub mod frequency;
pub mod rules;
pub mod types;
