//! Workflow Runner CLI - validate CSV files against workflow schemas
//!
//! # Commands
//!
//! ```bash
//! workflow-runner run schema.json grades.csv --list-param allowed_subjects=Math,History
//! workflow-runner check-schema schema.json   # Load and check a schema
//! workflow-runner parse grades.csv           # Print parsed headers and rows as JSON
//! workflow-runner data-types                 # Show data types and extra-column policies
//! ```
//!
//! `run` exits with 0 when the file passes, 1 when it has failures and 2 when
//! the run could not happen (unreadable input, bad schema, bad parameters).

use clap::{Parser, Subcommand};
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use workflow_runner::config::parse_delimiter;
use workflow_runner::params::{load_binding, parse_list_assignment, parse_string_assignment};
use workflow_runner::parser::format_delimiter;
use workflow_runner::validation::data_types_description;
use workflow_runner::{
    load_workflow_schema, parse_bytes_auto, run_workflow_file_with_schema, ParamBinding,
    ParamValue, RunOptions,
};

const EXIT_FAILURES: u8 = 1;
const EXIT_ERROR: u8 = 2;

#[derive(Parser)]
#[command(name = "workflow-runner")]
#[command(about = "Validate CSV files against workflow schemas", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a workflow schema against a file
    Run {
        /// Workflow schema JSON file
        schema: PathBuf,

        /// Input CSV file
        input: PathBuf,

        /// Bind a string parameter (name=value), repeatable
        #[arg(long = "param", value_parser = parse_string_assignment)]
        params: Vec<(String, ParamValue)>,

        /// Bind a list parameter (name=a,b,c), repeatable
        #[arg(long = "list-param", value_parser = parse_list_assignment)]
        list_params: Vec<(String, ParamValue)>,

        /// JSON object of parameter values; flags override it
        #[arg(long)]
        params_json: Option<PathBuf>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// CSV delimiter (auto-detect if not specified)
        #[arg(short, long, value_parser = delimiter_arg)]
        delimiter: Option<char>,

        /// Skip blank/duplicate header and overlong row checks
        #[arg(long)]
        no_baseline: bool,

        /// No progress output on stderr
        #[arg(short, long)]
        quiet: bool,
    },

    /// Load a workflow schema and print a summary
    CheckSchema {
        /// Workflow schema JSON file
        schema: PathBuf,
    },

    /// Parse a CSV file and output JSON
    Parse {
        /// Input CSV file
        input: PathBuf,

        /// CSV delimiter (auto-detect if not specified)
        #[arg(short, long, value_parser = delimiter_arg)]
        delimiter: Option<char>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show supported data types and extra-column policies
    DataTypes,
}

fn delimiter_arg(value: &str) -> Result<char, String> {
    parse_delimiter(value).ok_or_else(|| format!("invalid delimiter '{}'", value))
}

fn main() -> ExitCode {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let mut options = RunOptions::from_env();

    let result = match cli.command {
        Commands::Run {
            schema,
            input,
            params,
            list_params,
            params_json,
            json,
            output,
            delimiter,
            no_baseline,
            quiet,
        } => {
            if delimiter.is_some() {
                options.delimiter = delimiter;
            }
            options.baseline_checks &= !no_baseline;
            options.quiet |= quiet;

            let flags: ParamBinding = params.into_iter().chain(list_params).collect();
            cmd_run(
                &schema,
                &input,
                params_json.as_deref(),
                flags,
                json,
                output.as_deref(),
                &options,
            )
        }

        Commands::CheckSchema { schema } => cmd_check_schema(&schema).map(|_| ExitCode::SUCCESS),

        Commands::Parse {
            input,
            delimiter,
            output,
        } => cmd_parse(&input, delimiter.or(options.delimiter), output.as_deref())
            .map(|_| ExitCode::SUCCESS),

        Commands::DataTypes => {
            println!("{}", data_types_description());
            Ok(ExitCode::SUCCESS)
        }
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}

fn cmd_run(
    schema_path: &Path,
    input: &Path,
    params_json: Option<&Path>,
    flags: ParamBinding,
    json: bool,
    output: Option<&Path>,
    options: &RunOptions,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let binding = load_binding(params_json, flags)?;
    let schema = load_workflow_schema(schema_path)?;
    let report = run_workflow_file_with_schema(&schema, input, &binding, options)?;

    let rendered = if json {
        serde_json::to_string_pretty(&report)?
    } else {
        report.to_text()
    };
    write_output(&rendered, output)?;

    Ok(if report.passed {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_FAILURES)
    })
}

fn cmd_check_schema(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let schema = load_workflow_schema(path)?;

    println!("Schema: {}", path.display());
    println!("\nOperations ({}):", schema.operations().len());
    for (i, op) in schema.operations().iter().enumerate() {
        println!("  {}. {} ({})", i + 1, op.title(), op.kind());
    }

    println!("\nFieldset schemas:");
    for fieldset in schema.fieldset_schemas() {
        println!(
            "  {} - {} field(s), order matters: {}, extra columns: {}",
            fieldset.name,
            fieldset.fields.len(),
            fieldset.order_matters,
            fieldset.allow_extra_columns
        );
    }

    let params: Vec<_> = schema.params().collect();
    if !params.is_empty() {
        println!("\nParameters:");
        for param in params {
            println!(
                "  {}{}",
                param.name,
                if param.required { " (required)" } else { "" }
            );
        }
    }

    Ok(())
}

fn cmd_parse(
    input: &Path,
    delimiter: Option<char>,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("Parsing CSV: {}", input.display());

    let bytes = fs::read(input)?;
    let result = parse_bytes_auto(&bytes, delimiter)?;

    eprintln!("   Encoding: {}", result.encoding);
    eprintln!(
        "   Delimiter: '{}'{}",
        format_delimiter(result.delimiter),
        if delimiter.is_none() { " (auto-detected)" } else { "" }
    );
    eprintln!("   Columns: {}", result.data.headers.join(", "));
    eprintln!("   Parsed {} rows", result.data.row_count());

    let value = json!({
        "headers": result.data.headers,
        "rows": result.data.rows,
    });
    write_output(&serde_json::to_string_pretty(&value)?, output)?;

    Ok(())
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
