use serde::{Deserialize, Serialize};

/// A named unit of externally stored instructions the host may activate.
///
/// The router never opens `resource`; it only echoes the path back inside
/// directives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capability {
    pub id: String,
    /// Path of the capability description, relative to the host's skill store.
    pub resource: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}
