use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Failure reported by the underlying document primitive.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("document primitive unavailable: {0}")]
    Unavailable(String),
    #[error("document save failed: {0}")]
    Save(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Page margins in the primitive's units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Margins {
    pub left: u32,
    pub right: u32,
    pub top: u32,
    pub bot: u32,
}

impl Margins {
    pub fn uniform(value: u32) -> Self {
        Self {
            left: value,
            right: value,
            top: value,
            bot: value,
        }
    }
}

/// Document options handed to the primitive alongside the schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocOptions {
    pub font_size: u32,
    pub format: String,
    pub margins: Margins,
    pub font_name: String,
    pub compress: bool,
    pub orientation: String,
}

impl Default for DocOptions {
    /// Minimal option set, also used for the Tier-1 retry.
    fn default() -> Self {
        Self {
            font_size: 12,
            format: "letter".into(),
            margins: Margins::uniform(10),
            font_name: "Helvetica".into(),
            compress: false,
            orientation: "p".into(),
        }
    }
}

impl DocOptions {
    /// Clinical artifact preset with room for a header.
    pub fn healthcare() -> Self {
        Self {
            font_size: 11,
            margins: Margins {
                left: 15,
                right: 15,
                top: 25,
                bot: 15,
            },
            ..Self::default()
        }
    }

    /// Preset for the flattened single-page tier.
    pub fn flattened() -> Self {
        Self {
            font_size: 11,
            margins: Margins {
                left: 20,
                right: 20,
                top: 30,
                bot: 20,
            },
            ..Self::default()
        }
    }

    /// Preset for the raw text dump tier.
    pub fn fallback() -> Self {
        Self {
            margins: Margins::uniform(20),
            ..Self::default()
        }
    }
}

/// Boundary to the external document-rendering primitive.
///
/// The pipeline only composes the primitive's input; pagination and paint
/// stay on the other side of this trait. Implementations may perform I/O;
/// tests fault-inject through it.
pub trait DocumentRenderer {
    fn save(
        &self,
        schema: &Value,
        data: &Value,
        options: &DocOptions,
        filename: &str,
    ) -> Result<(), RenderError>;
}
