//! convcheck - configuration value checker CLI
//!
//! The `convcheck` command checks property values against the converter
//! their Java type would use.
//!
//! ## Commands
//!
//! - `validate`: Validate one value against a type signature
//! - `describe`: Show which converter a type signature resolves to
//! - `parse`: Show the parsed type descriptor tree

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, Level};

use convcheck_core::metrics::METRICS;
use convcheck_core::{
    Diagnostic, EngineSettings, EnumConstantsProvider, ExecutionMode, LeafOrigin,
    ProjectRuntime, SimpleEnumConstantsProvider, TypeDescriptor,
};

#[derive(Parser)]
#[command(name = "convcheck")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Validate configuration values against their converter types", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON output and JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a value; exits with status 1 when diagnostics are reported
    Validate {
        /// Type signature, e.g. `java.util.List<java.lang.Integer>`
        #[arg(short = 't', long = "type")]
        signature: String,

        /// Property value to check
        #[arg(long, allow_hyphen_values = true)]
        value: String,

        #[command(flatten)]
        project: ProjectArgs,
    },

    /// Show the converter a type signature resolves to
    Describe {
        /// Type signature
        #[arg(short = 't', long = "type")]
        signature: String,

        #[command(flatten)]
        project: ProjectArgs,
    },

    /// Show the parsed descriptor tree of a type signature
    Parse {
        /// Type signature
        #[arg(short = 't', long = "type")]
        signature: String,

        #[command(flatten)]
        project: ProjectArgs,
    },
}

#[derive(Args, Debug, Default)]
struct ProjectArgs {
    /// Trust mode: `safe` or `full` (overrides settings and CONVCHECK_MODE)
    #[arg(short, long)]
    mode: Option<String>,

    /// Project artifact: an output directory or a tar archive (repeatable)
    #[arg(short, long = "artifact")]
    artifacts: Vec<PathBuf>,

    /// Fallback enum constants as `TYPE=A,B,C` (repeatable)
    #[arg(long = "enum", value_name = "TYPE=CONSTANTS")]
    enums: Vec<String>,

    /// Settings file (TOML, or JSON by `.json` extension)
    #[arg(long)]
    settings: Option<PathBuf>,
}

/// Everything a subcommand needs, resolved from flags, settings and env.
struct Project {
    runtime: ProjectRuntime,
    mode: ExecutionMode,
    enums: SimpleEnumConstantsProvider,
}

impl Project {
    fn provider(&self) -> Option<&dyn EnumConstantsProvider> {
        if self.enums.is_empty() {
            None
        } else {
            Some(&self.enums)
        }
    }
}

fn load_settings(args: &ProjectArgs) -> Result<EngineSettings> {
    let mut settings = match &args.settings {
        Some(path) => EngineSettings::load(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => EngineSettings::default(),
    }
    .from_env();

    settings.artifacts.extend(args.artifacts.iter().cloned());
    if let Some(mode) = &args.mode {
        settings.execution.mode = parse_mode(mode)?;
    }
    Ok(settings)
}

fn parse_mode(name: &str) -> Result<ExecutionMode> {
    match name.trim().to_ascii_lowercase().as_str() {
        "safe" | "1" => Ok(ExecutionMode::Safe),
        "full" | "2" => Ok(ExecutionMode::Full),
        other => bail!("Unknown mode '{other}' (expected safe or full)"),
    }
}

fn parse_enums(specs: &[String]) -> Result<SimpleEnumConstantsProvider> {
    let mut provider = SimpleEnumConstantsProvider::new();
    for spec in specs {
        let Some((type_name, constants)) = spec.split_once('=') else {
            bail!("Invalid --enum '{spec}' (expected TYPE=A,B,C)");
        };
        let type_name = type_name.trim();
        if type_name.is_empty() {
            bail!("Invalid --enum '{spec}': missing type name");
        }
        provider.add_enum_constants(
            type_name,
            constants
                .split(',')
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string),
        );
    }
    Ok(provider)
}

fn open_project(settings: &EngineSettings, args: &ProjectArgs) -> Result<Project> {
    let enums = parse_enums(&args.enums)?;
    let runtime = ProjectRuntime::from_settings(settings);
    debug!(
        artifacts = settings.artifacts.len(),
        mode = %settings.execution.mode,
        "project opened"
    );
    Ok(Project {
        runtime,
        mode: settings.execution.mode,
        enums,
    })
}

#[derive(Serialize)]
struct ValidateReport<'a> {
    signature: &'a str,
    value: &'a str,
    mode: ExecutionMode,
    diagnostics: &'a [Diagnostic],
}

fn cmd_validate(project: &Project, signature: &str, value: &str, json: bool) -> Result<bool> {
    let mut diagnostics: Vec<Diagnostic> = Vec::new();
    project.runtime.validate_value(
        value,
        signature,
        project.provider(),
        project.mode,
        &mut diagnostics,
    );

    if json {
        let report = ValidateReport {
            signature,
            value,
            mode: project.mode,
            diagnostics: &diagnostics,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if diagnostics.is_empty() {
        println!("{value:?} is a valid {signature}");
    } else {
        for d in &diagnostics {
            println!("{}..{}: {} [{}/{}]", d.start, d.end(), d.message, d.source, d.code);
        }
    }
    Ok(!diagnostics.is_empty())
}

fn cmd_describe(project: &Project, signature: &str, json: bool) -> Result<()> {
    let description =
        project
            .runtime
            .find_converter_description(signature, project.provider(), project.mode);

    if json {
        let out = json!({
            "signature": signature,
            "mode": project.mode,
            "converter": description,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        match description {
            Some(name) => println!("{signature}: {name}"),
            None => println!("{signature}: no converter"),
        }
    }
    Ok(())
}

fn cmd_parse(project: &Project, signature: &str, json: bool) -> Result<()> {
    let descriptor = project
        .runtime
        .find_type(signature, project.provider(), project.mode)
        .with_context(|| format!("Failed to parse type signature '{signature}'"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&descriptor_json(&descriptor))?);
    } else {
        let mut out = String::new();
        render_tree(&descriptor, 0, &mut out);
        print!("{out}");
    }
    Ok(())
}

fn leaf_kind(origin: LeafOrigin) -> String {
    match origin {
        LeafOrigin::Resolved(kind) => format!("{kind:?}").to_lowercase(),
        LeafOrigin::Emulated => "emulated".to_string(),
    }
}

fn descriptor_json(descriptor: &TypeDescriptor) -> Value {
    match descriptor {
        TypeDescriptor::Leaf(leaf) => json!({
            "leaf": leaf.name,
            "kind": leaf_kind(leaf.origin),
        }),
        TypeDescriptor::Enum(e) => json!({
            "enum": e.name,
            "constants": e.constants,
        }),
        TypeDescriptor::Parameterized { raw, arguments } => json!({
            "parameterized": raw,
            "arguments": arguments.iter().map(descriptor_json).collect::<Vec<_>>(),
        }),
        TypeDescriptor::Array(element) => json!({
            "array": descriptor_json(element),
        }),
    }
}

fn render_tree(descriptor: &TypeDescriptor, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    match descriptor {
        TypeDescriptor::Leaf(leaf) => {
            out.push_str(&format!("{indent}{} ({})\n", leaf.name, leaf_kind(leaf.origin)));
        }
        TypeDescriptor::Enum(e) => {
            out.push_str(&format!("{indent}{} (enum: {})\n", e.name, e.constants.join(", ")));
        }
        TypeDescriptor::Parameterized { raw, arguments } => {
            out.push_str(&format!("{indent}{raw} (parameterized)\n"));
            for argument in arguments {
                render_tree(argument, depth + 1, out);
            }
        }
        TypeDescriptor::Array(element) => {
            out.push_str(&format!("{indent}[] (array)\n"));
            render_tree(element, depth + 1, out);
        }
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let project_args = match &cli.command {
        Commands::Validate { project, .. }
        | Commands::Describe { project, .. }
        | Commands::Parse { project, .. } => project,
    };
    let settings = load_settings(project_args)?;

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        settings.logging.level()
    };
    convcheck_core::init_tracing(cli.json || settings.logging.json, level);

    let project = open_project(&settings, project_args)?;

    let status = match &cli.command {
        Commands::Validate {
            signature, value, ..
        } => {
            if cmd_validate(&project, signature, value, cli.json)? {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
        Commands::Describe { signature, .. } => {
            cmd_describe(&project, signature, cli.json)?;
            ExitCode::SUCCESS
        }
        Commands::Parse { signature, .. } => {
            cmd_parse(&project, signature, cli.json)?;
            ExitCode::SUCCESS
        }
    };

    if cli.verbose {
        METRICS.flush();
    }
    Ok(status)
}
