use std::collections::BTreeSet;

use thiserror::Error;

use crate::condition::compile_conditional;
use crate::render::{RenderChoice, RenderElement, RenderPage, RenderSchema, RenderValidator};
use crate::spec::{AbstractField, AbstractForm, AbstractSection};

const ZIP_CODE_PATTERN: &str = "^[0-9]{5}(-[0-9]{4})?$";
const FILE_MAX_SIZE_BYTES: u64 = 10_485_760;

/// Semantic failure during compilation. Shape problems are the validator's
/// job; these cover the content invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error("no sections found in form schema")]
    NoSections,
    #[error("no valid form elements found in any section")]
    NoElements,
    #[error("field id '{0}' is declared more than once")]
    DuplicateFieldId(String),
}

/// Compiles an abstract form into a render-ready schema.
///
/// Pure and idempotent: the input is never mutated and repeated calls yield
/// structurally identical output.
pub fn compile(form: &AbstractForm) -> Result<RenderSchema, CompileError> {
    if form.sections.is_empty() {
        return Err(CompileError::NoSections);
    }

    let mut seen_ids = BTreeSet::new();
    for field in form.sections.iter().flat_map(|section| &section.fields) {
        if !seen_ids.insert(field.id.as_str()) {
            return Err(CompileError::DuplicateFieldId(field.id.clone()));
        }
    }

    let pages: Vec<RenderPage> = form
        .sections
        .iter()
        .enumerate()
        .filter(|(_, section)| !section.fields.is_empty())
        .map(|(index, section)| compile_section(section, index))
        .collect();

    if pages.is_empty() {
        return Err(CompileError::NoElements);
    }

    Ok(RenderSchema {
        title: form.title.clone(),
        description: form.description.clone(),
        theme: form.theme.map(|theme| theme.as_str().to_string()),
        show_progress_bar: "bottom".into(),
        show_question_numbers: "off".into(),
        question_title_location: "top".into(),
        width_mode: "responsive".into(),
        pages,
    })
}

fn compile_section(section: &AbstractSection, index: usize) -> RenderPage {
    let elements = section
        .fields
        .iter()
        .enumerate()
        .map(|(field_index, field)| map_field(field, field_index))
        .collect();

    RenderPage {
        name: format!("page{}", index + 1),
        title: section.title.clone(),
        description: section.description.clone(),
        visible_if: section.conditional.as_ref().map(compile_conditional),
        elements: vec![RenderElement::panel(
            format!("panel_{index}"),
            section.title.clone(),
            elements,
        )],
    }
}

/// Maps one abstract field to its render element.
///
/// Total over all field types: anything outside the table degrades to a plain
/// text input rather than failing.
pub fn map_field(field: &AbstractField, index_in_section: usize) -> RenderElement {
    let (element_type, input_type) = map_field_type(&field.field_type);

    let mut element = RenderElement::leaf(element_type, field.id.clone());
    element.title = Some(field.label.clone());
    element.title_location = Some("top".into());
    element.input_type = input_type.map(str::to_string);
    element.width = Some(
        field
            .width
            .map(|width| width.as_percent())
            .unwrap_or("100%")
            .to_string(),
    );
    // First field of a section always opens a row; later fields continue it
    // unless explicitly broken. Wrapping past 100% stays the engine's job.
    element.start_with_new_line = Some(index_in_section == 0 || field.new_row == Some(true));

    if field.required {
        element.is_required = Some(true);
    }
    element.placeholder = field.placeholder.clone();
    element.description = field.description.clone();

    if let Some(options) = &field.options
        && matches!(element_type, "radiogroup" | "checkbox" | "dropdown")
    {
        element.choices = Some(
            options
                .iter()
                .map(|option| RenderChoice {
                    value: option.value.clone(),
                    text: option.label.clone(),
                })
                .collect(),
        );
        if matches!(element_type, "radiogroup" | "checkbox") {
            element.col_count = Some(if options.len() <= 4 { options.len() as u32 } else { 2 });
        }
    }

    if element_type == "rating"
        && let (Some(min), Some(max)) = (field.min, field.max)
    {
        element.rate_min = Some(min);
        element.rate_max = Some(max);
    }

    if let Some(conditional) = &field.conditional {
        element.visible_if = Some(compile_conditional(conditional));
    }

    if let Some(skip_to) = &field.skip_to {
        element.value_name = Some(field.id.clone());
        element.skip_to_page = Some(skip_to.clone());
    }

    apply_type_specifics(field, &mut element);

    element
}

/// Closed lookup table from abstract type names to engine element types.
fn map_field_type(field_type: &str) -> (&'static str, Option<&'static str>) {
    match field_type {
        "text" => ("text", None),
        "textarea" => ("comment", None),
        "number" => ("text", Some("number")),
        "date" => ("text", Some("date")),
        "email" => ("text", Some("email")),
        "tel" | "phone" => ("text", Some("tel")),
        "url" => ("text", Some("url")),
        "radio" => ("radiogroup", None),
        "checkbox" => ("checkbox", None),
        "select" | "dropdown" => ("dropdown", None),
        "range" => ("rating", None),
        "signature" => ("signaturepad", None),
        "file" => ("file", None),
        "html" | "textBlock" => ("html", None),
        "panel" => ("panel", None),
        "ssn" | "zipcode" => ("text", None),
        _ => ("text", None),
    }
}

/// Subtype overrides applied after the generic mapping so they win over the
/// table defaults.
fn apply_type_specifics(field: &AbstractField, element: &mut RenderElement) {
    match field.field_type.as_str() {
        "ssn" => element.input_mask = Some("999-99-9999".into()),
        "phone" => element.input_mask = Some("(999) 999-9999".into()),
        "zipcode" => {
            element.validators = Some(vec![RenderValidator {
                validator_type: "regex".into(),
                text: Some("Please enter a valid ZIP code".into()),
                regex: Some(ZIP_CODE_PATTERN.into()),
            }]);
        }
        "textBlock" => {
            element.html = Some(format!(
                "<div class=\"form-text-block\"><strong>{}</strong></div>",
                field.label
            ));
        }
        "file" => {
            element.accepted_types = Some("image/*".into());
            element.store_data_as_text = Some(false);
            element.allow_multiple = Some(false);
            element.max_size = Some(FILE_MAX_SIZE_BYTES);
            element.allow_images_preview = Some(true);

            let label = field.label.to_lowercase();
            if label.contains("insurance") || label.contains("id") || label.contains("license") {
                element.source_type = Some("camera,file-picker".into());
                element.description = Some(
                    field
                        .placeholder
                        .clone()
                        .unwrap_or_else(|| "Take a photo or upload an image".into()),
                );
            }
        }
        _ => {}
    }
}
