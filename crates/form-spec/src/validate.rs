use serde_json::Value;
use thiserror::Error;

use crate::spec::{AbstractForm, FormEnvelope};

/// Structural violation found by the pre-compilation gate.
///
/// Checks run in a fixed order and stop at the first violation; the message
/// names the offending element so authors can fix the schema and resubmit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
    #[error("form payload must be a JSON object")]
    NotAnObject,
    #[error("missing top-level 'form' object")]
    MissingForm,
    #[error("'form.title' must be a string")]
    InvalidTitle,
    #[error("'form.sections' must be an array")]
    InvalidSections,
    #[error("section {index} must be an object")]
    SectionNotAnObject { index: usize },
    #[error("section {index} is missing a string 'title'")]
    SectionTitle { index: usize },
    #[error("section {index} is missing a 'fields' array")]
    SectionFields { index: usize },
    #[error("field {field} in section {section} must be an object")]
    FieldNotAnObject { section: usize, field: usize },
    #[error("field {field} in section {section} needs string 'id', 'label', and 'type'")]
    FieldAttributes { section: usize, field: usize },
}

/// Failure to turn raw JSON into an [`AbstractForm`].
#[derive(Debug, Error)]
pub enum ParseError {
    #[error(transparent)]
    Shape(#[from] ShapeError),
    #[error("failed to decode form: {0}")]
    Decode(#[source] serde_json::Error),
}

/// Runs the ordered structural checks against an untrusted payload.
pub fn check_shape(input: &Value) -> Result<(), ShapeError> {
    let root = input.as_object().ok_or(ShapeError::NotAnObject)?;
    let form = root
        .get("form")
        .and_then(Value::as_object)
        .ok_or(ShapeError::MissingForm)?;

    if !form.get("title").is_some_and(Value::is_string) {
        return Err(ShapeError::InvalidTitle);
    }

    let sections = form
        .get("sections")
        .and_then(Value::as_array)
        .ok_or(ShapeError::InvalidSections)?;

    for (section_index, section) in sections.iter().enumerate() {
        let section = section.as_object().ok_or(ShapeError::SectionNotAnObject {
            index: section_index,
        })?;
        if !section.get("title").is_some_and(Value::is_string) {
            return Err(ShapeError::SectionTitle {
                index: section_index,
            });
        }
        let fields = section
            .get("fields")
            .and_then(Value::as_array)
            .ok_or(ShapeError::SectionFields {
                index: section_index,
            })?;
        for (field_index, field) in fields.iter().enumerate() {
            let field = field.as_object().ok_or(ShapeError::FieldNotAnObject {
                section: section_index,
                field: field_index,
            })?;
            let well_formed = ["id", "label", "type"]
                .iter()
                .all(|key| field.get(*key).is_some_and(Value::is_string));
            if !well_formed {
                return Err(ShapeError::FieldAttributes {
                    section: section_index,
                    field: field_index,
                });
            }
        }
    }

    Ok(())
}

/// Pure type-guard form of the gate.
pub fn is_valid_form(input: &Value) -> bool {
    check_shape(input).is_ok()
}

/// Gates then decodes the payload. Compilation entry points expect the gate
/// to have run; they only re-check semantic content.
pub fn parse_form(input: &Value) -> Result<AbstractForm, ParseError> {
    check_shape(input)?;
    let envelope: FormEnvelope =
        serde_json::from_value(input.clone()).map_err(ParseError::Decode)?;
    Ok(envelope.form)
}
