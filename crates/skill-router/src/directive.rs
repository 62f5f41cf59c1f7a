//! Directives: the structured payload handed to the host.

pub mod builder;
pub mod types;

pub use builder::build;
pub use types::{BranchAction, BranchPayload, DebtActionPayload, Directive, DispatchPayload, DispatchResult};
