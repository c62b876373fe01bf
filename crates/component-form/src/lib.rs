//! String-in/string-out boundary over the form compiler.
//!
//! Hosts that can only pass JSON text (embedded runtimes, FFI shims) call
//! these functions; richer callers should use `form-spec` directly. Every
//! function returns a JSON string; failures come back as `{"error": "..."}`.

use serde_json::{Value, json};
use thiserror::Error;

use form_spec::{
    Conditional, ExclusiveGroup, ParseError, compile, compile_conditional, flattened_schema,
    parse_form, sanitize_schema,
};

const DEFAULT_FORM: &str = include_str!("../../form-spec/tests/fixtures/patient_intake.json");

#[derive(Debug, Error)]
enum ComponentError {
    #[error("failed to parse payload: {0}")]
    PayloadParse(#[source] serde_json::Error),
    #[error("invalid form: {0}")]
    Form(#[from] ParseError),
    #[error("compilation failed: {0}")]
    Compile(#[from] form_spec::CompileError),
    #[error("flattening failed: {0}")]
    Flatten(#[from] form_spec::FlattenError),
    #[error("json encode error: {0}")]
    JsonEncode(#[source] serde_json::Error),
}

fn parse_payload(payload: &str) -> Result<Value, ComponentError> {
    let source = if payload.trim().is_empty() {
        DEFAULT_FORM
    } else {
        payload
    };
    serde_json::from_str(source).map_err(ComponentError::PayloadParse)
}

fn parse_value(payload: &str) -> Result<Value, ComponentError> {
    serde_json::from_str(payload).map_err(ComponentError::PayloadParse)
}

fn respond(result: Result<Value, ComponentError>) -> String {
    match result {
        Ok(value) => serde_json::to_string(&value).unwrap_or_else(|error| {
            json!({ "error": format!("json encode: {}", error) }).to_string()
        }),
        Err(error) => json!({ "error": error.to_string() }).to_string(),
    }
}

/// Echoes the canonical parsed form back to the caller.
pub fn describe(form_json: &str) -> String {
    respond(parse_payload(form_json).and_then(|payload| {
        let form = parse_form(&payload)?;
        serde_json::to_value(form).map_err(ComponentError::JsonEncode)
    }))
}

/// Shape-checks a payload; `{"valid": true}` or `{"valid": false, "error"}`.
pub fn validate(form_json: &str) -> String {
    respond(parse_payload(form_json).map(|payload| match form_spec::check_shape(&payload) {
        Ok(()) => json!({ "valid": true }),
        Err(error) => json!({ "valid": false, "error": error.to_string() }),
    }))
}

/// Compiles an abstract form payload into its render schema.
pub fn compile_form(form_json: &str) -> String {
    respond(parse_payload(form_json).and_then(|payload| {
        let form = parse_form(&payload)?;
        let schema = compile(&form)?;
        serde_json::to_value(schema).map_err(ComponentError::JsonEncode)
    }))
}

/// Compiles a standalone conditional into its expression string.
pub fn compile_condition(conditional_json: &str) -> String {
    respond(parse_value(conditional_json).and_then(|payload| {
        let conditional: Conditional =
            serde_json::from_value(payload).map_err(ComponentError::PayloadParse)?;
        Ok(json!({ "expression": compile_conditional(&conditional) }))
    }))
}

/// Runs the exclusive-choice interception for one pending value change.
pub fn intercept_choice(group: &str, old_json: &str, proposed_json: &str) -> String {
    respond(
        parse_value(old_json)
            .and_then(|old| parse_value(proposed_json).map(|proposed| (old, proposed)))
            .and_then(|(old, proposed)| {
                let old = string_list(&old);
                let proposed = string_list(&proposed);
                let change = ExclusiveGroup::new(group).intercept(&old, &proposed);
                serde_json::to_value(change).map_err(ComponentError::JsonEncode)
            }),
    )
}

/// Builds the flattened single-page schema for a (schema, response) pair.
pub fn flatten(schema_json: &str, data_json: &str, title: &str, patient: &str, date: &str) -> String {
    respond(
        parse_value(schema_json)
            .and_then(|schema| parse_value(data_json).map(|data| (schema, data)))
            .and_then(|(schema, data)| {
                let flat =
                    flattened_schema(&schema, &data, title, non_empty(patient), non_empty(date))?;
                Ok(flat)
            }),
    )
}

/// Returns the print-sanitized deep copy of a render schema.
pub fn sanitize(schema_json: &str) -> String {
    respond(parse_value(schema_json).map(|schema| sanitize_schema(&schema)))
}

fn string_list(value: &Value) -> Vec<String> {
    value
        .as_array()
        .map(|entries| {
            entries
                .iter()
                .filter_map(Value::as_str)
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

fn non_empty(value: &str) -> Option<&str> {
    if value.is_empty() { None } else { Some(value) }
}
