//! Configuration for the NAMQR codec.

use crate::dictionary::{FieldKind, TagDictionary};
use crate::tlv::TemplateLayout;
use crate::{NamqrError, Result};
use serde::{Deserialize, Serialize};

/// Smallest accepted `max_payload_length`: room for the checksum field alone.
pub const MIN_PAYLOAD_LENGTH: usize = 8;

/// Largest accepted `max_payload_length`.
pub const MAX_PAYLOAD_LENGTH: usize = 4096;

/// Largest accepted `max_template_depth`.
pub const MAX_TEMPLATE_DEPTH: usize = 8;

/// Resource bounds and tables used by [`NamqrCodec`](crate::NamqrCodec).
///
/// Every field has a default, so a JSON document only needs the fields it
/// overrides:
///
/// ```
/// use namqr_lib::CodecConfig;
///
/// let config = CodecConfig::from_json(r#"{ "max_payload_length": 256 }"#).unwrap();
/// assert_eq!(config.max_payload_length, 256);
/// assert_eq!(config.max_template_depth, 2);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodecConfig {
    /// Longest payload accepted by decode or produced by encode, in characters.
    #[serde(default = "default_max_payload_length")]
    pub max_payload_length: usize,

    /// Deepest template nesting accepted by decode.
    #[serde(default = "default_max_template_depth")]
    pub max_template_depth: usize,

    /// Tag to field mapping.
    #[serde(default)]
    pub dictionary: TagDictionary,

    /// Which tags hold nested templates.
    #[serde(default = "TemplateLayout::namqr_v5")]
    pub layout: TemplateLayout,
}

fn default_max_payload_length() -> usize {
    512
}

fn default_max_template_depth() -> usize {
    2
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_payload_length: default_max_payload_length(),
            max_template_depth: default_max_template_depth(),
            dictionary: TagDictionary::namqr_v5(),
            layout: TemplateLayout::namqr_v5(),
        }
    }
}

impl CodecConfig {
    /// Create a configuration with NAMQR v5.0 defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a configuration from JSON and validate it.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Set the maximum payload length.
    pub fn with_max_payload_length(mut self, length: usize) -> Self {
        self.max_payload_length = length;
        self
    }

    /// Set the maximum template depth.
    pub fn with_max_template_depth(mut self, depth: usize) -> Self {
        self.max_template_depth = depth;
        self
    }

    /// Set the tag dictionary.
    pub fn with_dictionary(mut self, dictionary: TagDictionary) -> Self {
        self.dictionary = dictionary;
        self
    }

    /// Set the template layout.
    pub fn with_layout(mut self, layout: TemplateLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Check bounds and that the dictionary agrees with the layout.
    ///
    /// # Errors
    ///
    /// Returns [`NamqrError::InvalidConfig`] describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        if !(MIN_PAYLOAD_LENGTH..=MAX_PAYLOAD_LENGTH).contains(&self.max_payload_length) {
            return Err(NamqrError::InvalidConfig(format!(
                "max_payload_length must be between {MIN_PAYLOAD_LENGTH} and {MAX_PAYLOAD_LENGTH}, got {}",
                self.max_payload_length
            )));
        }
        if !(1..=MAX_TEMPLATE_DEPTH).contains(&self.max_template_depth) {
            return Err(NamqrError::InvalidConfig(format!(
                "max_template_depth must be between 1 and {MAX_TEMPLATE_DEPTH}, got {}",
                self.max_template_depth
            )));
        }

        self.dictionary.validate()?;
        self.layout.validate()?;

        for tag in self.dictionary.template_tags() {
            if !self.layout.is_composite(tag) {
                return Err(NamqrError::InvalidConfig(format!(
                    "tag {tag} is a template in the dictionary but not in the layout"
                )));
            }
        }
        for (tag, spec) in &self.dictionary.fields {
            if spec.kind != FieldKind::Template && self.layout.is_composite(*tag) {
                return Err(NamqrError::InvalidConfig(format!(
                    "tag {tag} is a plain value in the dictionary but a template in the layout"
                )));
            }
        }

        Ok(())
    }
}
