//! Input normalization: hook payload or raw text to matchable prompt text.

pub mod parser;
pub mod types;

pub use parser::normalize;
pub use types::{InputSource, NormalizedInput};
