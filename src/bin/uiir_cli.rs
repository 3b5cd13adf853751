//! UI-IR CLI - local bridge to the core
//!
//! Commands: validate, patch, generate, sample
//! Outputs JSON to stdout, logs to stderr
//! Exit code 2 on validation, patch or framework failure; 1 on I/O failure

use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use uiir_core::{
    codec, hashing, sample, validate_patches, CodeBundle, CoreConfig, GenerateOptions, UiIr,
};

#[derive(Parser)]
#[command(name = "uiir-cli")]
#[command(about = "UI-IR CLI - validate, patch and generate code from UI documents")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to a JSON config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a UI-IR document and print the report
    Validate {
        /// UI-IR JSON file
        document: PathBuf,
    },

    /// Apply a JSON array of patches to a document
    Patch {
        /// UI-IR JSON file
        document: PathBuf,

        /// JSON file holding an array of patches
        #[arg(short, long)]
        patches: PathBuf,

        /// Write the patched document here instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Generate a source bundle
    Generate {
        /// UI-IR JSON file
        document: PathBuf,

        /// Target framework (next | react); overrides the config file
        #[arg(short, long)]
        framework: Option<String>,

        /// Write files under this directory instead of printing the bundle
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Print (or write) the built-in demo document
    Sample {
        /// Directory to write sample-ui-ir.json into
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

const EXIT_IO: u8 = 1;
const EXIT_REJECTED: u8 = 2;

/// Failure exit codes: 1 for I/O and config, 2 for rejected input.
enum Failure {
    Io(String),
    Rejected(Value),
}

impl Failure {
    fn report(self, out: &mut dyn Write) -> u8 {
        match self {
            Failure::Io(message) => {
                let _ = writeln!(out, "{}", json!({ "success": false, "error": message }));
                EXIT_IO
            }
            Failure::Rejected(detail) => {
                let _ = writeln!(out, "{}", pretty(&detail));
                EXIT_REJECTED
            }
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { tracing::Level::DEBUG } else { tracing::Level::WARN };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(level)
        .init();

    ExitCode::from(execute(cli, &mut io::stdout().lock()))
}

/// Run one command, writing its JSON result to `out`. Returns the exit status.
fn execute(cli: Cli, out: &mut dyn Write) -> u8 {
    match run(cli, out) {
        Ok(status) => status,
        Err(failure) => failure.report(out),
    }
}

fn run(cli: Cli, out: &mut dyn Write) -> Result<u8, Failure> {
    let config = CoreConfig::load_or_default(cli.config.as_deref())
        .map_err(|e| Failure::Io(e.to_string()))?;

    match cli.command {
        Commands::Validate { document } => {
            let raw = read_json(&document)?;
            let report = config.validator().check(&raw);
            print(out, &pretty(&report))?;
            Ok(if report.valid { 0 } else { EXIT_REJECTED })
        }

        Commands::Patch { document, patches, out: target } => {
            let ui = load_document(&config, &document)?;
            let patches = validate_patches(&read_json(&patches)?).map_err(|e| {
                Failure::Rejected(json!({ "success": false, "error": e.to_string(), "violations": e.violations }))
            })?;
            let patched = ui.patched(&patches).map_err(|e| {
                Failure::Rejected(json!({ "success": false, "error": e.to_string() }))
            })?;
            let text = codec::serialize(&patched).map_err(|e| Failure::Io(e.to_string()))?;
            emit(out, target.as_deref(), &text)?;
            Ok(0)
        }

        Commands::Generate { document, framework, out: target } => {
            let options = match framework {
                Some(name) => GenerateOptions::for_target(&name).map_err(|e| {
                    Failure::Rejected(json!({ "success": false, "error": e.to_string() }))
                })?,
                None => config.generate_options(),
            };
            let ui = load_document(&config, &document)?;
            let bundle = uiir_core::generate(&ui, &options);
            match target {
                Some(dir) => {
                    write_bundle(&dir, &bundle)?;
                    let summary = json!({
                        "success": true,
                        "framework": bundle.framework,
                        "entry": bundle.entry,
                        "files": bundle.files.keys().collect::<Vec<_>>(),
                        "digest": hashing::bundle_digest(&bundle),
                    });
                    print(out, &pretty(&summary))?;
                }
                None => print(out, &pretty(&bundle))?,
            }
            Ok(0)
        }

        Commands::Sample { out: target } => {
            let text = codec::serialize(&sample::sample_document()).map_err(|e| Failure::Io(e.to_string()))?;
            let target = target.map(|dir| dir.join("sample-ui-ir.json"));
            emit(out, target.as_deref(), &text)?;
            Ok(0)
        }
    }
}

fn pretty<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_default()
}

fn read_json(path: &Path) -> Result<Value, Failure> {
    let content = fs::read_to_string(path)
        .map_err(|e| Failure::Io(format!("Failed to read {}: {}", path.display(), e)))?;
    serde_json::from_str(&content).map_err(|e| {
        Failure::Rejected(json!({ "success": false, "error": format!("Invalid JSON in {}: {}", path.display(), e) }))
    })
}

fn load_document(config: &CoreConfig, path: &Path) -> Result<UiIr, Failure> {
    let raw = read_json(path)?;
    config.validator().validate(&raw).map_err(|e| {
        Failure::Rejected(json!({ "success": false, "error": e.to_string(), "violations": e.violations }))
    })
}

fn print(out: &mut dyn Write, text: &str) -> Result<(), Failure> {
    writeln!(out, "{}", text).map_err(|e| Failure::Io(format!("Failed to write output: {}", e)))
}

fn emit(out: &mut dyn Write, target: Option<&Path>, text: &str) -> Result<(), Failure> {
    match target {
        Some(path) => write_file(path, text),
        None => print(out, text),
    }
}

fn write_file(path: &Path, text: &str) -> Result<(), Failure> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| Failure::Io(format!("Failed to create {}: {}", parent.display(), e)))?;
    }
    fs::write(path, text).map_err(|e| Failure::Io(format!("Failed to write {}: {}", path.display(), e)))
}

fn write_bundle(dir: &Path, bundle: &CodeBundle) -> Result<(), Failure> {
    for (relative, source) in &bundle.files {
        write_file(&dir.join(relative), source)?;
    }
    tracing::debug!(dir = %dir.display(), files = bundle.files.len(), "bundle written");
    Ok(())
}
