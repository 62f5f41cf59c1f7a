//! Rule matching — maps normalized prompt text to the rule that fires.

pub mod matcher;

pub use matcher::Matcher;
