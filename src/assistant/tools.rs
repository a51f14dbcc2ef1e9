use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use schemars::r#gen::SchemaSettings;
use schemars::schema::RootSchema;
use serde::{Deserialize, Serialize};

use crate::config::AssistantConfig;
use crate::form::{FormField, HighlightSet};
use crate::protocol::client_events::ClientEvent;
use crate::protocol::models::{SessionUpdate, Tool, ToolChoice, ToolChoiceMode};
use crate::{Error, Result};

const HIGHLIGHT_DESCRIPTION: &str = "Highlight form fields when user asks about where to enter information, \
for example if the user asks \"where do i put my BSN number?\" or \"where should I write my BSN number?\" \
then this function should be called to highlight the bsn field, while saying \"i've highlighted it on the form for you\"";

/// The tools the model may call. Anything else is rejected at decode time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolName {
    DisplayImage,
    HighlightFormFields,
}

impl ToolName {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DisplayImage => "display_image",
            Self::HighlightFormFields => "highlight_form_fields",
        }
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "display_image" => Ok(Self::DisplayImage),
            "highlight_form_fields" => Ok(Self::HighlightFormFields),
            other => Err(Error::UnknownTool(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DisplayImageArgs {
    /// Official name of the document/image to display
    pub image_name: String,
    /// Secure URL to the official documentation image
    pub image_url: String,
    /// Brief explanation of what the image shows
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct HighlightFormFieldsArgs {
    /// Form fields to highlight for the user
    pub fields_to_highlight: Vec<FormField>,
}

impl HighlightFormFieldsArgs {
    #[must_use]
    pub fn to_set(&self) -> HighlightSet {
        self.fields_to_highlight.iter().copied().collect()
    }
}

/// A function call whose arguments passed schema decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolCall {
    DisplayImage(DisplayImageArgs),
    HighlightFormFields(HighlightFormFieldsArgs),
}

impl ToolCall {
    /// Decode a model function call into its typed arguments.
    ///
    /// # Errors
    /// Returns `UnknownTool` for names outside the registry and
    /// `InvalidToolArguments` when `arguments` does not match the tool's schema.
    pub fn decode(name: &str, arguments: &str) -> Result<Self> {
        let tool: ToolName = name.parse()?;
        let invalid = |source| Error::InvalidToolArguments { tool, source };
        match tool {
            ToolName::DisplayImage => serde_json::from_str(arguments)
                .map(Self::DisplayImage)
                .map_err(invalid),
            ToolName::HighlightFormFields => serde_json::from_str(arguments)
                .map(Self::HighlightFormFields)
                .map_err(invalid),
        }
    }

    #[must_use]
    pub const fn name(&self) -> ToolName {
        match self {
            Self::DisplayImage(_) => ToolName::DisplayImage,
            Self::HighlightFormFields(_) => ToolName::HighlightFormFields,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ToolDefinition {
    pub name: String,
    pub description: Option<String>,
    pub schema: RootSchema,
}

/// Tool declarations announced to the model at session start.
#[derive(Clone, Debug, Default)]
pub struct ToolRegistry {
    defs: Vec<ToolDefinition>,
    instructions: Option<String>,
}

impl ToolRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The two form-assistant tools, with the image catalogue from `config`.
    #[must_use]
    pub fn for_form(config: &AssistantConfig) -> Self {
        let mut registry = Self::new().with_instructions(config.instructions.clone());
        registry.declare::<DisplayImageArgs>(
            ToolName::DisplayImage.as_str(),
            Some(display_image_description(config)),
        );
        registry.declare::<HighlightFormFieldsArgs>(
            ToolName::HighlightFormFields.as_str(),
            Some(HIGHLIGHT_DESCRIPTION.to_string()),
        );
        registry
    }

    /// Instructions sent alongside the tools in `session.update`.
    #[must_use]
    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    #[must_use]
    pub fn instructions(&self) -> Option<&str> {
        self.instructions.as_deref()
    }

    #[must_use]
    pub fn definitions(&self) -> &[ToolDefinition] {
        &self.defs
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.defs.iter().any(|def| def.name == name)
    }

    /// Declare a tool whose parameter schema is derived from `TArgs`.
    pub fn declare<TArgs>(&mut self, name: &str, description: Option<String>)
    where
        TArgs: JsonSchema,
    {
        let schema = parameters_schema::<TArgs>();
        self.defs.retain(|def| def.name != name);
        self.defs.push(ToolDefinition {
            name: name.to_string(),
            description,
            schema,
        });
    }

    /// Convert all declared tools into protocol-level tool definitions.
    ///
    /// # Errors
    /// Returns an error if schema serialization fails.
    pub fn try_as_tools(&self) -> Result<Vec<Tool>> {
        let mut tools = Vec::with_capacity(self.defs.len());
        for def in &self.defs {
            let parameters = serde_json::to_value(&def.schema)?;
            tools.push(Tool::Function {
                name: def.name.clone(),
                description: def.description.clone(),
                parameters,
            });
        }
        Ok(tools)
    }

    /// The one-off `session.update` that announces every declared tool.
    ///
    /// # Errors
    /// Returns an error if schema serialization fails.
    pub fn session_update(&self) -> Result<ClientEvent> {
        let update = SessionUpdate {
            instructions: self.instructions.clone(),
            tools: Some(self.try_as_tools()?),
            tool_choice: Some(ToolChoice::Mode(ToolChoiceMode::Auto)),
        };
        Ok(ClientEvent::SessionUpdate {
            event_id: None,
            session: Box::new(update),
        })
    }
}

/// Flat draft-07 schema: enums inlined, no `$schema` key.
fn parameters_schema<T: JsonSchema>() -> RootSchema {
    SchemaSettings::draft07()
        .with(|settings| {
            settings.inline_subschemas = true;
            settings.meta_schema = None;
        })
        .into_generator()
        .into_root_schema_for::<T>()
}

fn display_image_description(config: &AssistantConfig) -> String {
    let catalogue = config
        .images
        .iter()
        .map(|image| format!("{} | {}", image.url, image.description))
        .collect::<Vec<_>>()
        .join("\n");
    let mut description = format!(
        "Call this function if a question is about a card or where to find a number outside of the form.\n\
         Here is a list of the available images with their corresponding URLs and descriptions:\n\n\
         {catalogue}\n\n\
         Choose the most relevant image to display with the user's question."
    );
    let digid = config
        .images
        .iter()
        .find(|image| image.description.to_lowercase().contains("digid"));
    if let Some(image) = digid {
        description.push_str(&format!(
            " for example, if the question asks about digital services, or digiD, you should show the URL {}",
            image.url
        ));
    }
    description
}
