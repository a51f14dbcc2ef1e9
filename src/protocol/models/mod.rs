pub mod common;
pub mod items;
pub mod response;
pub mod session;
pub mod tools;

pub use common::{ArbitraryJson, JsonSchema, Role};
pub use items::{ContentPart, Item};
pub use response::{Response, ResponseConfig, ResponseStatus};
pub use session::SessionUpdate;
pub use tools::{Tool, ToolChoice, ToolChoiceMode};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_choice_auto_serializes_as_string() {
        let choice = ToolChoice::Mode(ToolChoiceMode::Auto);
        let serialized = serde_json::to_string(&choice).unwrap();
        assert_eq!(serialized, "\"auto\"");
    }
}
