use serde::{Deserialize, Serialize};

use super::{Tool, ToolChoice};

/// Partial session configuration sent with `session.update`.
///
/// Only the fields set here are changed server-side; everything else keeps
/// the value issued with the session credential.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct SessionUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<Tool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<ToolChoice>,
}
