use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Read access to a located result element.
pub trait LinkElement {
    /// Visible text of the element.
    fn text(&self) -> &str;

    /// Value of an attribute, `None` when absent.
    fn attribute(&self, name: &str) -> Option<&str>;
}

/// A result link as read from the page during one extraction pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawResultElement {
    #[serde(default)]
    pub text_content: String,
    #[serde(default)]
    pub attributes: HashMap<String, String>,
}

impl RawResultElement {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text_content(mut self, text: impl Into<String>) -> Self {
        self.text_content = text.into();
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn link(text: impl Into<String>, href: impl Into<String>) -> Self {
        Self::new().with_text_content(text).with_attribute("href", href)
    }
}

impl LinkElement for RawResultElement {
    fn text(&self) -> &str {
        &self.text_content
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}
