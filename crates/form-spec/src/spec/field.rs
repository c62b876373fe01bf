use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::condition::Conditional;

/// One selectable option of a choice-bearing field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FieldOption {
    pub value: String,
    pub label: String,
}

/// Declared layout width, drawn from a closed enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum FieldWidth {
    Full,
    Half,
    Third,
    Quarter,
}

impl FieldWidth {
    /// Percentage string consumed by the rendering engine.
    pub fn as_percent(&self) -> &'static str {
        match self {
            FieldWidth::Full => "100%",
            FieldWidth::Half => "50%",
            FieldWidth::Third => "33%",
            FieldWidth::Quarter => "25%",
        }
    }
}

/// A single author-facing field.
///
/// `id` doubles as the render-engine field name and as the variable referenced
/// by conditional expressions; it must be unique within a form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AbstractField {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<FieldOption>>,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditional: Option<Conditional>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<FieldWidth>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_row: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl AbstractField {
    /// Minimal constructor used by builders and tests; everything optional
    /// stays unset.
    pub fn new(id: impl Into<String>, label: impl Into<String>, field_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            field_type: field_type.into(),
            options: None,
            required: false,
            placeholder: None,
            conditional: None,
            skip_to: None,
            min: None,
            max: None,
            width: None,
            new_row: None,
            description: None,
        }
    }
}
