use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::condition::Conditional;
use crate::spec::field::AbstractField;

/// Visual theme hint carried through to the rendering engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum FormTheme {
    Default,
    Healthcare,
    Modern,
}

impl FormTheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormTheme::Default => "default",
            FormTheme::Healthcare => "healthcare",
            FormTheme::Modern => "modern",
        }
    }
}

/// A titled group of fields; compiles 1:1 into a render page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AbstractSection {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub fields: Vec<AbstractField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditional: Option<Conditional>,
    /// Declared but not consumed by compilation; reserved for authoring tools.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns_count: Option<u32>,
}

/// Top-level author-facing form definition.
///
/// The abstract form is the source of truth: it is authored once, compiled on
/// demand, and never mutated by the compiler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AbstractForm {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub sections: Vec<AbstractSection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<FormTheme>,
}

/// Author-facing wire envelope: `{"form": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FormEnvelope {
    pub form: AbstractForm,
}
