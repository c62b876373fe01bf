use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde_json::{Value, json};

use form_spec::{
    DocOptions, DocumentRenderer, RenderError, check_shape, compile, export_artifact,
    export_blank_form, parse_form,
};

#[derive(Parser)]
#[command(
    name = "intake-form",
    about = "Compile intake forms and export printable artifacts",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Shape-check an authored form definition.
    Validate {
        /// Path to the abstract form JSON.
        input: PathBuf,
    },
    /// Compile an authored form into a render schema.
    Compile {
        /// Path to the abstract form JSON.
        input: PathBuf,
        /// Write the render schema here instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Emit compact JSON instead of pretty-printed.
        #[arg(long)]
        compact: bool,
    },
    /// Export a completed response as a print job for the document engine.
    Export {
        /// Path to the render schema JSON.
        #[arg(long)]
        schema: PathBuf,
        /// Path to the response data JSON; omit together with --blank.
        #[arg(long)]
        data: Option<PathBuf>,
        /// Artifact title.
        #[arg(long)]
        title: String,
        /// Patient display name.
        #[arg(long)]
        patient: Option<String>,
        /// Submission date string.
        #[arg(long)]
        date: Option<String>,
        /// Directory receiving the composed print job.
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
        /// Export an unfilled template instead of a response.
        #[arg(long)]
        blank: bool,
    },
}

/// Writes the composed print job (`document`, `data`, `options`) as
/// `<filename>.json` for the external document engine to pick up.
struct PrintJobRenderer {
    out_dir: PathBuf,
}

impl DocumentRenderer for PrintJobRenderer {
    fn save(
        &self,
        schema: &Value,
        data: &Value,
        options: &DocOptions,
        filename: &str,
    ) -> Result<(), RenderError> {
        let job = json!({
            "document": schema,
            "data": data,
            "options": options,
        });
        let payload = serde_json::to_string_pretty(&job)
            .map_err(|error| RenderError::Save(error.to_string()))?;
        fs::create_dir_all(&self.out_dir)?;
        fs::write(self.out_dir.join(format!("{filename}.json")), payload)?;
        Ok(())
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> Result<(), String> {
    match command {
        Command::Validate { input } => {
            let payload = read_json(&input)?;
            check_shape(&payload).map_err(|error| format!("invalid form: {error}"))?;
            println!("{} is a valid form definition", input.display());
            Ok(())
        }
        Command::Compile {
            input,
            output,
            compact,
        } => {
            let payload = read_json(&input)?;
            let form = parse_form(&payload).map_err(|error| format!("invalid form: {error}"))?;
            let schema = compile(&form).map_err(|error| format!("compile failed: {error}"))?;
            let rendered = if compact {
                serde_json::to_string(&schema)
            } else {
                serde_json::to_string_pretty(&schema)
            }
            .map_err(|error| format!("failed to encode render schema: {error}"))?;
            match output {
                Some(path) => {
                    fs::write(&path, rendered)
                        .map_err(|error| format!("failed to write {}: {error}", path.display()))?;
                    println!("wrote render schema to {}", path.display());
                }
                None => println!("{rendered}"),
            }
            Ok(())
        }
        Command::Export {
            schema,
            data,
            title,
            patient,
            date,
            out_dir,
            blank,
        } => {
            let schema_value = read_json(&schema)?;
            let renderer = PrintJobRenderer {
                out_dir: out_dir.clone(),
            };
            let outcome = if blank {
                export_blank_form(&renderer, &schema_value, &title, None)
            } else {
                let data_path = data.ok_or_else(|| {
                    "either --data or --blank is required for export".to_string()
                })?;
                let response = read_json(&data_path)?;
                export_artifact(
                    &renderer,
                    &schema_value,
                    &response,
                    &title,
                    patient.as_deref(),
                    date.as_deref(),
                    None,
                )
            };

            if let Some(warning) = &outcome.warning {
                eprintln!("warning: {warning}");
            }
            match (outcome.success, outcome.filename) {
                (true, Some(filename)) => {
                    println!(
                        "queued print job {}",
                        out_dir.join(format!("{filename}.json")).display()
                    );
                    Ok(())
                }
                _ => Err(format!(
                    "export failed: {}",
                    outcome.error.unwrap_or_else(|| "unknown error".into())
                )),
            }
        }
    }
}

fn read_json(path: &Path) -> Result<Value, String> {
    let raw = fs::read_to_string(path)
        .map_err(|error| format!("failed to read {}: {error}", path.display()))?;
    serde_json::from_str(&raw).map_err(|error| format!("{} is not valid JSON: {error}", path.display()))
}
