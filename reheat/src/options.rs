use reheat_dom::SerializeOptions;

/// Naming conventions shared with the host runtime.
#[derive(Clone, Debug)]
pub struct ReconcileOptions {
    /// Attribute carrying a node's identity key (default: `key`)
    pub key_attribute: String,
    /// Prefix of attributes owned by the event-binding layer (default: `@`).
    /// An empty prefix disables the rule.
    pub event_prefix: String,
    /// Attribute marking a component style node (default: `data-e-style`)
    pub style_marker: String,
    /// Compare the live children against the parsed markup before diffing
    /// and skip the pass when they are identical (default: false)
    pub fast_path: bool,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            key_attribute: "key".to_string(),
            event_prefix: "@".to_string(),
            style_marker: "data-e-style".to_string(),
            fast_path: false,
        }
    }
}

impl ReconcileOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_key_attribute(mut self, name: impl Into<String>) -> Self {
        self.key_attribute = name.into();
        self
    }

    pub fn with_event_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.event_prefix = prefix.into();
        self
    }

    pub fn with_style_marker(mut self, name: impl Into<String>) -> Self {
        self.style_marker = name.into();
        self
    }

    /// Enable the deep-equality shortcut.
    pub fn fast_path(mut self) -> Self {
        self.fast_path = true;
        self
    }

    pub fn is_event_attribute(&self, name: &str) -> bool {
        !self.event_prefix.is_empty() && name.starts_with(self.event_prefix.as_str())
    }

    /// Serialization options that leave out exactly what reconciliation
    /// does not manage.
    pub fn managed_serialize_options(&self) -> SerializeOptions {
        SerializeOptions::new()
            .managed_only()
            .with_style_marker(self.style_marker.clone())
    }
}
