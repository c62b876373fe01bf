use std::cell::{Cell, RefCell};

use serde_json::{Value, json};

use form_spec::{
    DocOptions, DocumentRenderer, RenderError, compile, export_artifact, export_blank_form,
    parse_form,
};

/// Records every save call and fails the first `failures` of them.
struct FlakyRenderer {
    failures: Cell<usize>,
    calls: RefCell<Vec<(Value, String)>>,
}

impl FlakyRenderer {
    fn failing(failures: usize) -> Self {
        Self {
            failures: Cell::new(failures),
            calls: RefCell::new(Vec::new()),
        }
    }

    fn reliable() -> Self {
        Self::failing(0)
    }

    fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    fn last_schema(&self) -> Value {
        self.calls.borrow().last().expect("at least one call").0.clone()
    }
}

impl DocumentRenderer for FlakyRenderer {
    fn save(
        &self,
        schema: &Value,
        _data: &Value,
        _options: &DocOptions,
        filename: &str,
    ) -> Result<(), RenderError> {
        self.calls
            .borrow_mut()
            .push((schema.clone(), filename.to_string()));
        let remaining = self.failures.get();
        if remaining > 0 {
            self.failures.set(remaining - 1);
            return Err(RenderError::Save("synthetic failure".into()));
        }
        Ok(())
    }
}

fn fixture_schema() -> Value {
    let payload: Value =
        serde_json::from_str(include_str!("fixtures/patient_intake.json")).expect("fixture parses");
    let form = parse_form(&payload).expect("parse fixture");
    compile(&form).expect("compile fixture").to_value()
}

fn fixture_response() -> Value {
    json!({
        "firstName": "Ada",
        "lastName": "Lovelace",
        "hasAllergies": "Yes",
        "allergyDetails": "Penicillin -> hives\nPeanuts",
        "symptoms": ["fever", "fatigue"],
        "painLevel": 4
    })
}

#[test]
fn tier1_succeeds_with_sanitized_schema() {
    let renderer = FlakyRenderer::reliable();
    let outcome = export_artifact(
        &renderer,
        &fixture_schema(),
        &fixture_response(),
        "Patient Intake",
        Some("Ada Lovelace"),
        Some("2026-08-07"),
        None,
    );

    assert!(outcome.success);
    assert_eq!(
        outcome.filename.as_deref(),
        Some("Ada_Lovelace_Patient_Intake_2026-08-07.pdf")
    );
    assert_eq!(outcome.warning, None);
    assert_eq!(renderer.call_count(), 1);

    let saved = renderer.last_schema();
    assert_eq!(saved["showProgressBar"], json!(false));
    let first = &saved["pages"][0]["elements"][0]["elements"][0];
    assert!(first.get("width").is_none());
    assert!(first.get("startWithNewLine").is_none());
}

#[test]
fn tier1_retries_once_with_minimal_options() {
    let renderer = FlakyRenderer::failing(1);
    let outcome = export_artifact(
        &renderer,
        &fixture_schema(),
        &fixture_response(),
        "Patient Intake",
        None,
        None,
        None,
    );

    assert!(outcome.success);
    assert_eq!(outcome.warning, None);
    assert_eq!(renderer.call_count(), 2);
}

#[test]
fn tier2_flattens_after_structured_tier_exhausts() {
    let renderer = FlakyRenderer::failing(2);
    let outcome = export_artifact(
        &renderer,
        &fixture_schema(),
        &fixture_response(),
        "Patient Intake",
        Some("Ada"),
        Some("2026-08-07"),
        None,
    );

    assert!(outcome.success);
    let warning = outcome.warning.expect("degradation warning");
    assert!(warning.contains("optimized"));
    assert_eq!(renderer.call_count(), 3);

    let flat = renderer.last_schema();
    let elements = flat["pages"][0]["elements"].as_array().expect("elements");
    assert_eq!(elements[0]["name"], "header");
    // Answered questions only; the unanswered date-of-birth never shows up.
    assert!(
        elements
            .iter()
            .all(|element| element["name"] != "dateOfBirth_display")
    );
    let allergy = elements
        .iter()
        .find(|element| element["name"] == "allergyDetails_display")
        .expect("allergy block");
    let html = allergy["html"].as_str().expect("html");
    assert!(html.contains("Penicillin -&gt; hives<br>Peanuts"));
}

#[test]
fn tier3_dumps_raw_response_and_still_succeeds() {
    let renderer = FlakyRenderer::failing(3);
    let outcome = export_artifact(
        &renderer,
        &fixture_schema(),
        &fixture_response(),
        "Patient Intake",
        Some("Ada"),
        Some("2026-08-07"),
        None,
    );

    assert!(outcome.success);
    let warning = outcome.warning.expect("degradation warning");
    assert!(warning.contains("text-only"));
    let filename = outcome.filename.expect("filename");
    assert_eq!(filename, "Ada_Patient_Intake_2026-08-07_text.pdf");
    assert!(filename.chars().all(|c| c.is_ascii_alphanumeric() || "_-.".contains(c)));
    assert_eq!(renderer.call_count(), 4);

    let minimal = renderer.last_schema();
    assert_eq!(minimal["pages"][0]["elements"][0]["type"], "comment");
    let dump = minimal["pages"][0]["elements"][0]["defaultValue"]
        .as_str()
        .expect("dump");
    assert!(dump.contains("\"firstName\": \"Ada\""));
}

#[test]
fn exhausting_every_tier_reports_failure_without_panicking() {
    let renderer = FlakyRenderer::failing(usize::MAX);
    let outcome = export_artifact(
        &renderer,
        &fixture_schema(),
        &fixture_response(),
        "Patient Intake",
        None,
        None,
        None,
    );

    assert!(!outcome.success);
    assert!(outcome.filename.is_none());
    assert!(outcome.error.expect("error message").contains("synthetic failure"));
    // Tier 1 + retry, tier 2, tier 3: bounded degradation, no backoff loop.
    assert_eq!(renderer.call_count(), 4);
}

#[test]
fn export_works_for_arbitrary_engine_schemas() {
    // The pipeline accepts any engine-facing schema, not only compiler output.
    let schema = json!({
        "title": "Ad-hoc",
        "pages": [{
            "name": "page1",
            "elements": [
                { "type": "boolean", "name": "fasting", "title": "Fasting?" },
                { "type": "file", "name": "insuranceCard", "title": "Insurance card" },
                {
                    "type": "matrixdynamic",
                    "name": "medications",
                    "title": "Medications",
                    "columns": [{ "name": "med" }, { "name": "dose" }]
                }
            ]
        }]
    });
    let data = json!({
        "fasting": true,
        "insuranceCard": "data:image/png;base64,AAAA",
        "medications": [
            { "med": "aspirin", "dose": "81mg" }
        ]
    });

    let renderer = FlakyRenderer::failing(2);
    let outcome = export_artifact(&renderer, &schema, &data, "Ad-hoc", None, None, None);
    assert!(outcome.success);

    let flat = renderer.last_schema();
    let blocks = flat["pages"][0]["elements"].as_array().expect("elements");
    let html_of = |name: &str| {
        blocks
            .iter()
            .find(|element| element["name"] == format!("{name}_display"))
            .and_then(|element| element["html"].as_str())
            .map(str::to_string)
            .expect("block html")
    };
    assert!(html_of("fasting").contains("Yes"));
    assert!(html_of("insuranceCard").contains("File uploaded"));
    assert!(html_of("medications").contains("Row 1: dose: 81mg, med: aspirin"));
}

#[test]
fn blank_form_export_names_the_template() {
    let renderer = FlakyRenderer::reliable();
    let outcome = export_blank_form(&renderer, &fixture_schema(), "Patient Intake", None);
    assert!(outcome.success);
    assert_eq!(
        outcome.filename.as_deref(),
        Some("Patient_Intake_Blank_Template.pdf")
    );
}

#[test]
fn blank_form_export_reports_renderer_failure() {
    let renderer = FlakyRenderer::failing(usize::MAX);
    let outcome = export_blank_form(&renderer, &fixture_schema(), "Patient Intake", None);
    assert!(!outcome.success);
    assert!(outcome.error.is_some());
}
