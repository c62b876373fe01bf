mod document;
mod flatten;

pub use document::{DocOptions, DocumentRenderer, Margins, RenderError};
pub use flatten::{FlattenError, PrintableRow, flattened_schema, printable_rows};

use std::sync::OnceLock;

use log::warn;
use regex::Regex;
use serde_json::{Value, json};

const FLATTENED_WARNING: &str = "Generated optimized document format due to form complexity";
const TEXT_ONLY_WARNING: &str = "Generated text-only document due to form complexity";

/// Outcome of an export attempt. The pipeline never panics and never returns
/// an error type; exhaustion of every tier is reported as `success: false`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOutcome {
    pub success: bool,
    pub filename: Option<String>,
    pub error: Option<String>,
    pub warning: Option<String>,
}

impl ExportOutcome {
    fn ok(filename: String) -> Self {
        Self {
            success: true,
            filename: Some(filename),
            error: None,
            warning: None,
        }
    }

    fn degraded(filename: String, warning: &str) -> Self {
        Self {
            warning: Some(warning.to_string()),
            ..Self::ok(filename)
        }
    }

    fn failed(error: String) -> Self {
        Self {
            success: false,
            filename: None,
            error: Some(error),
            warning: None,
        }
    }
}

/// Converts a completed response into a printable artifact.
///
/// Three strictly sequential tiers of decreasing fidelity: structured render,
/// flattened single page, raw text dump. A later tier runs only after the
/// previous one failed. Callers serialize concurrent exports per response;
/// the pipeline itself is synchronous and re-entrant.
pub fn export_artifact(
    renderer: &dyn DocumentRenderer,
    schema: &Value,
    response_data: &Value,
    title: &str,
    patient_name: Option<&str>,
    submitted_date: Option<&str>,
    options: Option<&DocOptions>,
) -> ExportOutcome {
    let filename = artifact_filename(patient_name, title, submitted_date, None);

    // Tier 1: structured render over a sanitized deep copy of the schema.
    let clean = sanitize_schema(schema);
    let tier1_options = options.cloned().unwrap_or_else(DocOptions::healthcare);
    let tier1_error = match renderer.save(&clean, response_data, &tier1_options, &filename) {
        Ok(()) => return ExportOutcome::ok(filename),
        Err(first) => {
            // One retry with the minimal option set before giving up on the tier.
            match renderer.save(&clean, response_data, &DocOptions::default(), &filename) {
                Ok(()) => return ExportOutcome::ok(filename),
                Err(_) => first,
            }
        }
    };
    warn!("structured export failed ({tier1_error}); falling back to flattened layout");

    // Tier 2: one linear page of label/value blocks.
    match flatten::flattened_schema(schema, response_data, title, patient_name, submitted_date) {
        Ok(flat) => {
            match renderer.save(&flat, &Value::Object(Default::default()), &DocOptions::flattened(), &filename) {
                Ok(()) => return ExportOutcome::degraded(filename, FLATTENED_WARNING),
                Err(error) => {
                    warn!("flattened export failed ({error}); falling back to raw text dump");
                }
            }
        }
        Err(error) => {
            warn!("flattening failed ({error}); falling back to raw text dump");
        }
    }

    // Tier 3: raw response dump through a minimal one-field schema. There is
    // no fourth tier; only the primitive itself failing here surfaces as an
    // unsuccessful outcome.
    let pretty = serde_json::to_string_pretty(response_data)
        .unwrap_or_else(|_| response_data.to_string());
    let minimal = json!({
        "title": title,
        "pages": [{
            "name": "page1",
            "elements": [{
                "type": "comment",
                "name": "response_data",
                "title": "Form Response Data",
                "defaultValue": pretty.clone(),
            }]
        }]
    });
    let text_filename = artifact_filename(patient_name, title, submitted_date, Some("text"));
    match renderer.save(
        &minimal,
        &json!({ "response_data": pretty }),
        &DocOptions::fallback(),
        &text_filename,
    ) {
        Ok(()) => ExportOutcome::degraded(text_filename, TEXT_ONLY_WARNING),
        Err(error) => ExportOutcome::failed(error.to_string()),
    }
}

/// Renders an unfilled form template. Single attempt; authoring tools use
/// this for printable blanks.
pub fn export_blank_form(
    renderer: &dyn DocumentRenderer,
    schema: &Value,
    title: &str,
    options: Option<&DocOptions>,
) -> ExportOutcome {
    let filename = sanitize_filename(&format!("{title}_Blank_Template.pdf"));
    let doc_options = options.cloned().unwrap_or_default();
    match renderer.save(schema, &Value::Object(Default::default()), &doc_options, &filename) {
        Ok(()) => ExportOutcome::ok(filename),
        Err(error) => ExportOutcome::failed(error.to_string()),
    }
}

/// `{patient|Anonymous}_{title}_{date}.pdf`, with an optional tier marker and
/// every character outside `[A-Za-z0-9_\-.]` replaced by `_`.
pub fn artifact_filename(
    patient_name: Option<&str>,
    title: &str,
    submitted_date: Option<&str>,
    marker: Option<&str>,
) -> String {
    let patient = patient_name.unwrap_or("Anonymous");
    let date = submitted_date.unwrap_or("undated");
    let stem = match marker {
        Some(marker) => format!("{patient}_{title}_{date}_{marker}"),
        None => format!("{patient}_{title}_{date}"),
    };
    sanitize_filename(&format!("{stem}.pdf"))
}

fn sanitize_filename(raw: &str) -> String {
    static SAFE: OnceLock<Regex> = OnceLock::new();
    let safe = SAFE.get_or_init(|| {
        Regex::new(r"[^A-Za-z0-9_\-.]").expect("literal filename pattern compiles")
    });
    safe.replace_all(raw, "_").into_owned()
}

/// Deep-copies and scrubs a schema for the structured tier: layout hints are
/// stripped, fragile question types are pinned down, and chrome that wastes
/// page space is turned off.
pub fn sanitize_schema(schema: &Value) -> Value {
    let mut clean = schema.clone();
    if let Some(root) = clean.as_object_mut() {
        root.insert("showProgressBar".into(), json!(false));
        root.insert("showQuestionNumbers".into(), json!("off"));
        root.insert("questionErrorLocation".into(), json!("bottom"));
    }
    if let Some(pages) = clean.get_mut("pages").and_then(Value::as_array_mut) {
        for page in pages {
            if let Some(elements) = page.get_mut("elements").and_then(Value::as_array_mut) {
                for element in elements {
                    scrub_element(element);
                }
            }
        }
    }
    clean
}

fn scrub_element(element: &mut Value) {
    let Some(object) = element.as_object_mut() else {
        return;
    };
    object.remove("width");
    object.remove("minWidth");
    object.remove("maxWidth");
    object.remove("startWithNewLine");
    object.insert("readOnly".into(), json!(false));

    match object.get("type").and_then(Value::as_str) {
        Some("matrix" | "matrixdynamic" | "matrixdropdown") => {
            object.insert("allowRowsDragAndDrop".into(), json!(false));
            object.insert("verticalAlign".into(), json!("top"));
        }
        Some("file") => {
            object.insert("storeDataAsText".into(), json!(true));
            object.insert("maxSize".into(), json!(0));
        }
        _ => {}
    }

    if let Some(children) = object.get_mut("elements").and_then(Value::as_array_mut) {
        for child in children {
            scrub_element(child);
        }
    }
}
