use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One choice of a choice-bearing render element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderChoice {
    pub value: String,
    pub text: String,
}

/// Declarative input validator attached to a render element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderValidator {
    #[serde(rename = "type")]
    pub validator_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regex: Option<String>,
}

/// Engine-facing element derived 1:1 from an abstract field, or the generated
/// panel wrapping a section's fields.
///
/// Every optional attribute is omitted from the wire when unset; the rendering
/// engine treats absence as its own default.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderElement {
    #[serde(rename = "type")]
    pub element_type: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_required: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_with_new_line: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<RenderChoice>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub col_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible_if: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_to_page: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_mask: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validators: Option<Vec<RenderValidator>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accepted_types: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_data_as_text: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_multiple: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_images_preview: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_type: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub elements: Vec<RenderElement>,
}

impl RenderElement {
    /// Leaf element of the given engine type.
    pub fn leaf(element_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            element_type: element_type.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    /// Expanded panel wrapper around a section's elements.
    pub fn panel(name: impl Into<String>, title: impl Into<String>, elements: Vec<RenderElement>) -> Self {
        Self {
            element_type: "panel".into(),
            name: name.into(),
            title: Some(title.into()),
            state: Some("expanded".into()),
            elements,
            ..Self::default()
        }
    }
}

/// Engine-facing page derived 1:1 from an abstract section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderPage {
    pub name: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible_if: Option<String>,
    pub elements: Vec<RenderElement>,
}

/// Compiled schema handed to the rendering engine.
///
/// Freshly allocated on every compile call; never the persisted source of
/// truth (the abstract form is).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderSchema {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    pub show_progress_bar: String,
    pub show_question_numbers: String,
    pub question_title_location: String,
    pub width_mode: String,
    pub pages: Vec<RenderPage>,
}

impl RenderSchema {
    /// Serializes to the raw JSON shape the engine and the export pipeline
    /// consume.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}
