//! Schema Compare CLI
//!
//! Compares the root schemas of two JSON schema documents.
//!
//! Exit codes: 0 when the relation holds, 1 when it does not, 2 on error.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use schema_compare::config::OutputFormat;
use schema_compare::{
    compatible_type_rules, document, same_type_rules, Comparator, CompareConfig, CompareContext,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "schema-compare")]
#[command(about = "Check type equality and compatibility between schema documents")]
struct Cli {
    /// Config file (defaults to schema-compare.toml lookup)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Print the per-rule audit trail
    #[arg(long, global = true)]
    trace: bool,

    /// Output format (overrides config)
    #[arg(short, long, global = true)]
    format: Option<Format>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check whether both documents describe the same type
    Same {
        left: PathBuf,
        right: PathBuf,
    },

    /// Check whether the higher (looser) type accepts the lower one
    Compatible {
        higher: PathBuf,
        lower: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Pretty,
    Json,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Pretty => OutputFormat::Pretty,
            Format::Json => OutputFormat::Json,
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<bool> {
    let config_path = cli.config.as_deref().map(|p| p.to_string_lossy().into_owned());
    let config = CompareConfig::load_from(config_path.as_deref())
        .context("failed to load configuration")?;
    let options = config.options();
    let format = cli.format.map(OutputFormat::from).unwrap_or(config.report.output_format);
    let show_trail = cli.trace || config.report.audit_trail;

    let (relation, comparator, left_path, right_path) = match cli.command {
        Commands::Same { left, right } => {
            ("same", Comparator::new(same_type_rules(&options)), left, right)
        }
        Commands::Compatible { higher, lower } => (
            "compatible",
            Comparator::new(compatible_type_rules(&options)),
            higher,
            lower,
        ),
    };

    let left = document::from_path(&left_path)
        .with_context(|| format!("failed to load {}", left_path.display()))?;
    let right = document::from_path(&right_path)
        .with_context(|| format!("failed to load {}", right_path.display()))?;

    let mut context = if show_trail {
        CompareContext::with_stack()
    } else {
        CompareContext::new()
    };
    let holds = comparator.compare_with(left.root(), right.root(), &mut context)?;

    match format {
        OutputFormat::Json => {
            let mut report = serde_json::json!({
                "relation": relation,
                "left": left_path.display().to_string(),
                "right": right_path.display().to_string(),
                "result": holds,
                "diagnostics": context.diagnostics(),
            });
            if show_trail {
                report["audit_trail"] = serde_json::to_value(context.records())?;
            }
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Pretty => {
            if show_trail {
                println!("Audit trail:");
                for record in context.records() {
                    let mark = if record.result { "✓" } else { "✗" };
                    println!("  {} {} ({} vs {})", mark, record.rule, record.left, record.right);
                }
                println!();
            }
            for diagnostic in context.diagnostics() {
                println!("⚠️  {}", diagnostic);
            }
            if holds {
                println!("✅ {}: {} vs {}", relation, left.root(), right.root());
            } else {
                println!("❌ not {}: {} vs {}", relation, left.root(), right.root());
            }
        }
    }

    Ok(holds)
}
