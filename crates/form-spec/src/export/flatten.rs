use handlebars::Handlebars;
use serde_json::{Value, json};
use thiserror::Error;

const HEADER_TEMPLATE: &str = "<div style=\"margin-bottom: 20px; border-bottom: 2px solid #333; \
     padding-bottom: 10px;\"><h1 style=\"margin: 0; color: #333;\">{{title}}</h1>\
     <div style=\"color: #666; margin-top: 5px;\">Patient: {{patient}}<br>Date: {{date}}</div></div>";

const QUESTION_BLOCK_TEMPLATE: &str = "<div style=\"margin-bottom: 15px; page-break-inside: avoid;\">\
     <div style=\"font-weight: bold; color: #333; margin-bottom: 5px;\">{{question}}</div>\
     <div style=\"color: #666; padding-left: 10px;\">{{{answer}}}</div></div>";

/// Failure while building the flattened tier's content blocks.
#[derive(Debug, Error)]
pub enum FlattenError {
    #[error("template registration failed: {0}")]
    Template(#[from] handlebars::TemplateError),
    #[error("block rendering failed: {0}")]
    Render(#[from] handlebars::RenderError),
}

/// One question/answer pair formatted for printing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintableRow {
    pub question: String,
    pub answer: String,
    pub kind: String,
}

struct QuestionRef {
    name: String,
    title: String,
    kind: String,
    rate_max: Option<f64>,
}

/// Walks a render schema and formats every answered question as plain text.
/// Useful for custom printable layouts outside the pipeline.
pub fn printable_rows(schema: &Value, data: &Value) -> Vec<PrintableRow> {
    collect_questions(schema)
        .into_iter()
        .filter_map(|question| {
            let value = answered_value(data, &question.name)?;
            Some(PrintableRow {
                answer: format_answer(&question.kind, value, question.rate_max, "\n", false),
                question: question.title,
                kind: question.kind,
            })
        })
        .collect()
}

/// Builds the Tier-2 single-page schema: a header block followed by one
/// label/value html block per answered question.
pub fn flattened_schema(
    schema: &Value,
    data: &Value,
    title: &str,
    patient_name: Option<&str>,
    submitted_date: Option<&str>,
) -> Result<Value, FlattenError> {
    let mut registry = Handlebars::new();
    registry.register_template_string("header", HEADER_TEMPLATE)?;
    registry.register_template_string("block", QUESTION_BLOCK_TEMPLATE)?;

    let mut elements = vec![json!({
        "type": "html",
        "name": "header",
        "html": registry.render(
            "header",
            &json!({
                "title": title,
                "patient": patient_name.unwrap_or("Anonymous"),
                "date": submitted_date.unwrap_or("undated"),
            }),
        )?,
    })];

    for question in collect_questions(schema) {
        let Some(value) = answered_value(data, &question.name) else {
            continue;
        };
        let answer = format_answer(&question.kind, value, question.rate_max, "<br>", true);
        let html = registry.render(
            "block",
            &json!({ "question": question.title, "answer": answer }),
        )?;
        elements.push(json!({
            "type": "html",
            "name": format!("{}_display", question.name),
            "html": html,
        }));
    }

    Ok(json!({
        "title": title,
        "showProgressBar": false,
        "showQuestionNumbers": "off",
        "pages": [{ "name": "responses", "elements": elements }],
    }))
}

/// Answered means present and neither null nor the empty string.
fn answered_value<'a>(data: &'a Value, name: &str) -> Option<&'a Value> {
    match data.get(name) {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) if text.is_empty() => None,
        Some(value) => Some(value),
    }
}

fn collect_questions(schema: &Value) -> Vec<QuestionRef> {
    let mut questions = Vec::new();
    if let Some(pages) = schema.get("pages").and_then(Value::as_array) {
        for page in pages {
            if let Some(elements) = page.get("elements").and_then(Value::as_array) {
                for element in elements {
                    collect_element(element, &mut questions);
                }
            }
        }
    }
    questions
}

fn collect_element(element: &Value, questions: &mut Vec<QuestionRef>) {
    let kind = element.get("type").and_then(Value::as_str).unwrap_or("text");

    if kind == "panel" {
        if let Some(children) = element.get("elements").and_then(Value::as_array) {
            for child in children {
                collect_element(child, questions);
            }
        }
        return;
    }

    let Some(name) = element.get("name").and_then(Value::as_str) else {
        return;
    };
    questions.push(QuestionRef {
        name: name.to_string(),
        title: element
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or(name)
            .to_string(),
        kind: kind.to_string(),
        rate_max: element.get("rateMax").and_then(Value::as_f64),
    });
}

/// Per-type answer formatting shared by the flattened tier (html flavor) and
/// [`printable_rows`] (plain flavor).
fn format_answer(
    kind: &str,
    value: &Value,
    rate_max: Option<f64>,
    line_break: &str,
    escape: bool,
) -> String {
    match kind {
        "checkbox" => match value {
            Value::Array(entries) => entries
                .iter()
                .map(display_value)
                .collect::<Vec<_>>()
                .join(", "),
            other => display_value(other),
        },
        "rating" => format!("{} out of {}", display_value(value), rate_max.unwrap_or(5.0)),
        "boolean" => {
            if value.as_bool() == Some(true) {
                "Yes".into()
            } else {
                "No".into()
            }
        }
        "matrix" | "matrixdynamic" | "matrixdropdown" => format_matrix(value, line_break),
        "file" => "File uploaded".into(),
        "signaturepad" => "Signature captured".into(),
        _ => {
            let text = display_value(value);
            if escape {
                escape_html(&text).replace('\n', line_break)
            } else {
                text
            }
        }
    }
}

/// Matrix answers serialize one line per row, each cell as `key: value`.
fn format_matrix(value: &Value, line_break: &str) -> String {
    match value {
        Value::Array(rows) => rows
            .iter()
            .enumerate()
            .map(|(index, row)| format!("Row {}: {}", index + 1, format_cells(row, ", ")))
            .collect::<Vec<_>>()
            .join(line_break),
        Value::Object(_) => format_cells(value, line_break),
        other => display_value(other),
    }
}

fn format_cells(row: &Value, separator: &str) -> String {
    match row.as_object() {
        Some(cells) => cells
            .iter()
            .map(|(key, cell)| format!("{key}: {}", display_value(cell)))
            .collect::<Vec<_>>()
            .join(separator),
        None => display_value(row),
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => number.to_string(),
        other => other.to_string(),
    }
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn checkbox_answers_join_with_commas() {
        let value = json!(["fatigue", "fever"]);
        assert_eq!(
            format_answer("checkbox", &value, None, "<br>", true),
            "fatigue, fever"
        );
    }

    #[test]
    fn rating_renders_out_of_max() {
        assert_eq!(
            format_answer("rating", &json!(7), Some(10.0), "<br>", true),
            "7 out of 10"
        );
        assert_eq!(format_answer("rating", &json!(3), None, "<br>", true), "3 out of 5");
    }

    #[test]
    fn boolean_renders_yes_no() {
        assert_eq!(format_answer("boolean", &json!(true), None, "<br>", true), "Yes");
        assert_eq!(format_answer("boolean", &json!(false), None, "<br>", true), "No");
    }

    #[test]
    fn matrix_rows_serialize_per_line() {
        let rows = json!([
            { "med": "aspirin", "dose": "81mg" },
            { "med": "metformin", "dose": "500mg" }
        ]);
        assert_eq!(
            format_answer("matrixdynamic", &rows, None, "<br>", true),
            "Row 1: dose: 81mg, med: aspirin<br>Row 2: dose: 500mg, med: metformin"
        );
        let object = json!({ "q1": "mild", "q2": "severe" });
        assert_eq!(
            format_answer("matrix", &object, None, "<br>", true),
            "q1: mild<br>q2: severe"
        );
    }

    #[test]
    fn binary_content_renders_placeholders() {
        assert_eq!(
            format_answer("file", &json!("data:image/png;base64,AAAA"), None, "<br>", true),
            "File uploaded"
        );
        assert_eq!(
            format_answer("signaturepad", &json!("data:..."), None, "<br>", true),
            "Signature captured"
        );
    }

    #[test]
    fn free_text_is_escaped_and_line_broken() {
        let value = json!("temp > 39 & rising\nsince Tuesday");
        assert_eq!(
            format_answer("comment", &value, None, "<br>", true),
            "temp &gt; 39 &amp; rising<br>since Tuesday"
        );
    }

    #[test]
    fn printable_rows_skip_unanswered_questions() {
        let schema = json!({
            "pages": [{
                "name": "page1",
                "elements": [{
                    "type": "panel",
                    "name": "panel_0",
                    "elements": [
                        { "type": "text", "name": "name", "title": "Name" },
                        { "type": "text", "name": "email", "title": "Email" },
                        { "type": "rating", "name": "pain", "title": "Pain level", "rateMax": 10 }
                    ]
                }]
            }]
        });
        let data = json!({ "name": "Ada", "email": "", "pain": 4 });
        let rows = printable_rows(&schema, &data);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].question, "Name");
        assert_eq!(rows[1].answer, "4 out of 10");
    }

    #[test]
    fn flattened_schema_prepends_header() {
        let schema = json!({
            "pages": [{
                "name": "page1",
                "elements": [
                    { "type": "text", "name": "name", "title": "Name" }
                ]
            }]
        });
        let data = json!({ "name": "Ada" });
        let flat = flattened_schema(&schema, &data, "Intake", Some("Ada"), Some("2026-08-07"))
            .expect("flatten");
        let elements = flat["pages"][0]["elements"].as_array().expect("elements");
        assert_eq!(elements[0]["name"], "header");
        let header = elements[0]["html"].as_str().expect("header html");
        assert!(header.contains("Patient: Ada"));
        assert!(header.contains("Date: 2026-08-07"));
        assert_eq!(elements[1]["name"], "name_display");
    }

    #[test]
    fn question_titles_escape_through_the_template() {
        let schema = json!({
            "pages": [{
                "name": "page1",
                "elements": [
                    { "type": "text", "name": "q", "title": "Weight <kg>" }
                ]
            }]
        });
        let flat = flattened_schema(&schema, &json!({ "q": "70" }), "T", None, None)
            .expect("flatten");
        let html = flat["pages"][0]["elements"][1]["html"].as_str().expect("html");
        assert!(html.contains("Weight &lt;kg&gt;"));
    }
}
