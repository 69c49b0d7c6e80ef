//! Notification message template.

/// Placeholder replaced by the member's mention or stored display name.
pub const NAME_PLACEHOLDER: &str = "{name}";

pub const DEFAULT_MESSAGE: &str = "🎉 Happy Birthday, {name}! Hope you have an amazing day! 🎂";
pub const DEFAULT_DEBUG_MESSAGE: &str = "🎉 [DEBUG] Happy Birthday, {name}! 🎂";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageTemplate(String);

impl MessageTemplate {
    /// Returns `None` when the template lacks the `{name}` placeholder.
    pub fn new(template: impl Into<String>) -> Option<Self> {
        let template = template.into();
        template
            .contains(NAME_PLACEHOLDER)
            .then_some(Self(template))
    }

    pub fn render(&self, name: &str) -> String {
        self.0.replace(NAME_PLACEHOLDER, name)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for MessageTemplate {
    fn default() -> Self {
        Self(DEFAULT_MESSAGE.to_owned())
    }
}
