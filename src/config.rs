use std::time::Duration;

/// Pause between applying a tool call to the UI and asking the model to
/// carry on, so the spoken follow-up lands after the screen has changed.
pub const DEFAULT_FOLLOW_UP_DELAY: Duration = Duration::from_millis(500);

pub const DEFAULT_IMAGE_FOLLOW_UP: &str = "Ask if the user can see the image on the right-hand side.";
pub const DEFAULT_HIGHLIGHT_FOLLOW_UP: &str = "Tell the user the field has been highlighted on the form.";

/// Agent persona sent with the tool announcement.
pub const DEFAULT_INSTRUCTIONS: &str = r#"You are a customer service agent for the Dutch government, assisting a citizen who is filling out a government form. Your task is to answer any questions they have about the form in clear, easy-to-understand language. Prioritize assisting the user in navigating any difficulties they encounter. Keep your responses concise, aiming not to speak for longer than 10 seconds without checking in to ensure the caller is following along.

# Steps
1. **Listen**: Carefully listen to the citizen's questions or concerns regarding the form.
2. **Clarify**: Ask any necessary clarifying questions to understand the specific pain points or areas they need help with.
3. **Respond**: Provide clear and concise answers, addressing the specific part of the form they are asking about.
4. **Guide**: Offer guidance on what the next steps in the form might be if they seem necessary.
5. **Repeat/Elaborate**: Be ready to repeat or elaborate on information if the citizen does not understand your initial explanation.

# Output Format
- Short, concise sentences.
- Information should be structured logically and get straight to the point.
- Each response should be no longer than 10 seconds worth of speech.

# Examples
**Example 1**
- **Citizen Question**: "I'm stuck on the section about income. What do I need to write here?"
- **Agent Response**: "For the income section, you need to provide your gross annual income amount. This includes any additional sources like rental income."

**Example 2**
- **Citizen Question**: "Which box do I tick if I'm self-employed?"
- **Agent Response**: "If you're self-employed, tick the box labeled 'self-employed freelancer.' This section allows you to input any earnings from your business activities."

# Notes
- Always remain patient and understanding, as some citizens may not be familiar with official terminology or procedures.
- Ensure privacy and confidentiality when discussing personal information related to the form.
- Adapt your language to suit the citizen's level of understanding without being condescending."#;

/// An image the model may choose to show with `display_image`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAsset {
    pub url: String,
    pub description: String,
}

impl ImageAsset {
    pub fn new(url: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            description: description.into(),
        }
    }
}

/// The visual examples served alongside the form.
#[must_use]
pub fn default_images() -> Vec<ImageAsset> {
    vec![
        ImageAsset::new("/assets/visual-examples/1.jpg", "dutch ID card front"),
        ImageAsset::new("/assets/visual-examples/2.png", "dutch ID card back"),
        ImageAsset::new("/assets/visual-examples/3.png", "digiD logo"),
        ImageAsset::new("/assets/visual-examples/4.png", "dutch form example front"),
        ImageAsset::new("/assets/visual-examples/5.png", "dutch form example back"),
        ImageAsset::new("/assets/visual-examples/6.png", "none of the above - basic logo"),
    ]
}

/// Waveform colors (CSS color strings).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechPalette {
    pub agent: String,
    pub user: String,
    pub idle: String,
}

impl Default for SpeechPalette {
    fn default() -> Self {
        Self {
            agent: "#3b82f6".to_string(),
            user: "#ef4444".to_string(),
            idle: "#ccc".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AssistantConfig {
    pub instructions: String,
    pub follow_up_delay: Duration,
    pub image_follow_up: String,
    pub highlight_follow_up: String,
    pub palette: SpeechPalette,
    pub images: Vec<ImageAsset>,
}

impl AssistantConfig {
    #[must_use]
    pub fn builder() -> AssistantConfigBuilder {
        AssistantConfigBuilder::new()
    }
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            instructions: DEFAULT_INSTRUCTIONS.to_string(),
            follow_up_delay: DEFAULT_FOLLOW_UP_DELAY,
            image_follow_up: DEFAULT_IMAGE_FOLLOW_UP.to_string(),
            highlight_follow_up: DEFAULT_HIGHLIGHT_FOLLOW_UP.to_string(),
            palette: SpeechPalette::default(),
            images: default_images(),
        }
    }
}

pub struct AssistantConfigBuilder {
    config: AssistantConfig,
}

impl AssistantConfigBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: AssistantConfig::default(),
        }
    }

    #[must_use]
    pub fn instructions(mut self, instructions: impl Into<String>) -> Self {
        self.config.instructions = instructions.into();
        self
    }

    #[must_use]
    pub const fn follow_up_delay(mut self, delay: Duration) -> Self {
        self.config.follow_up_delay = delay;
        self
    }

    #[must_use]
    pub fn image_follow_up(mut self, instructions: impl Into<String>) -> Self {
        self.config.image_follow_up = instructions.into();
        self
    }

    #[must_use]
    pub fn highlight_follow_up(mut self, instructions: impl Into<String>) -> Self {
        self.config.highlight_follow_up = instructions.into();
        self
    }

    #[must_use]
    pub fn palette(mut self, palette: SpeechPalette) -> Self {
        self.config.palette = palette;
        self
    }

    /// Replace the image catalogue offered to the model.
    #[must_use]
    pub fn images(mut self, images: Vec<ImageAsset>) -> Self {
        self.config.images = images;
        self
    }

    #[must_use]
    pub fn image(mut self, url: impl Into<String>, description: impl Into<String>) -> Self {
        self.config.images.push(ImageAsset::new(url, description));
        self
    }

    #[must_use]
    pub fn build(self) -> AssistantConfig {
        self.config
    }
}

impl Default for AssistantConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_demo_pacing() {
        let config = AssistantConfig::default();
        assert_eq!(config.follow_up_delay, Duration::from_millis(500));
        assert_eq!(config.images.len(), 6);
        assert_eq!(config.palette.agent, "#3b82f6");
        assert!(config.instructions.starts_with("You are a customer service agent for the Dutch government"));
    }

    #[test]
    fn builder_overrides_fields() {
        let config = AssistantConfig::builder()
            .follow_up_delay(Duration::from_millis(50))
            .images(Vec::new())
            .image("/a.jpg", "front of ID")
            .highlight_follow_up("Say it is highlighted.")
            .instructions("Be brief.")
            .build();

        assert_eq!(config.follow_up_delay, Duration::from_millis(50));
        assert_eq!(config.images, vec![ImageAsset::new("/a.jpg", "front of ID")]);
        assert_eq!(config.highlight_follow_up, "Say it is highlighted.");
        assert_eq!(config.image_follow_up, DEFAULT_IMAGE_FOLLOW_UP);
        assert_eq!(config.instructions, "Be brief.");
    }
}
