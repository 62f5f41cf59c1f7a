//! Prompt-to-capability dispatcher.
//!
//! A static, ordered rule table maps free-form prompts to capability
//! directives. The first matching rule wins. Directives carry chain hints
//! that the host follows by re-entering the dispatcher, and conditional
//! chains may resolve to write-once debt records.

pub mod capability;
pub mod debt;
pub mod directive;
pub mod dispatcher;
pub mod error;
pub mod hook;
pub mod input;
pub mod outcome;
pub mod routing;
pub mod rule;
pub mod settings;
pub mod utils;

pub use crate::dispatcher::Dispatcher;
pub use crate::directive::{Directive, DispatchResult};
pub use crate::error::{RouteError, RouteResult};
pub use crate::outcome::{resolve, Outcome, OutcomeReport, Resolution};
pub use crate::rule::{ChainDirective, RuleTable};
