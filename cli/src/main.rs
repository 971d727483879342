//! unmark CLI - watermark removal tool for PDF and PPTX

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;

use unmark::render::{self, JsonFormat};
use unmark::{cleaned_path, DiagnosticTrace, Engine, EngineConfig, ProcessorRegistry, RemovalReport};

#[derive(Parser)]
#[command(name = "unmark")]
#[command(author = "iyulab")]
#[command(version)]
#[command(
    about = "Remove generator branding watermarks from PDF and PPTX files",
    long_about = None
)]
struct Cli {
    /// Input PDF or PPTX file
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output file
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    #[command(flatten)]
    engine: EngineArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args, Clone)]
struct EngineArgs {
    /// Domain whose hyperlinks mark a picture as a watermark
    #[arg(
        long,
        global = true,
        env = "UNMARK_DOMAIN",
        default_value = unmark::engine::DEFAULT_TARGET_DOMAIN
    )]
    domain: String,

    /// Corner threshold as a fraction of the canvas (0.0-1.0)
    #[arg(
        long,
        global = true,
        env = "UNMARK_CORNER_THRESHOLD",
        default_value_t = unmark::engine::DEFAULT_CORNER_THRESHOLD
    )]
    threshold: f64,

    /// Maximum nesting depth for groups
    #[arg(long, global = true, default_value_t = unmark::engine::DEFAULT_MAX_GROUP_DEPTH)]
    max_depth: usize,

    /// Only remove pictures linked to the domain
    #[arg(long, global = true)]
    no_size_heuristic: bool,
}

impl EngineArgs {
    fn build(&self) -> unmark::Result<Engine> {
        Engine::new(
            EngineConfig::new()
                .with_target_domain(self.domain.clone())
                .with_corner_threshold(self.threshold)
                .with_max_group_depth(self.max_depth)
                .with_size_heuristic(!self.no_size_heuristic),
        )
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Report watermarks without changing the file
    Detect {
        /// Input PDF or PPTX file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output the report as JSON
        #[arg(long)]
        json: bool,

        /// Print every classification decision
        #[arg(long)]
        trace: bool,
    },

    /// Remove watermarks
    #[command(alias = "rm")]
    Remove {
        /// Input PDF or PPTX files
        #[arg(value_name = "FILE", required = true)]
        inputs: Vec<PathBuf>,

        /// Output file (one input) or directory (several inputs)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,

        /// Output the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Dump the element tree with diagnostic notes
    Inspect {
        /// Input PDF or PPTX file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Show version information
    Version,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Detect { input, json, trace }) => {
            cmd_detect(&input, json, trace, &cli.engine)
        }
        Some(Commands::Remove {
            inputs,
            output,
            json,
        }) => cmd_remove(&inputs, output.as_deref(), json, &cli.engine),
        Some(Commands::Inspect { input }) => cmd_inspect(&input, &cli.engine),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            // Default behavior: remove if input is provided
            if let Some(input) = cli.input {
                cmd_remove(&[input], cli.output.as_deref(), false, &cli.engine)
            } else {
                println!("{}", "Usage: unmark <FILE> [OUTPUT]".yellow());
                println!("       unmark --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn cmd_detect(
    input: &Path,
    json: bool,
    trace: bool,
    args: &EngineArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let engine = args.build()?;
    let registry = ProcessorRegistry::with_defaults();
    let mut diagnostics = if trace {
        DiagnosticTrace::new()
    } else {
        DiagnosticTrace::disabled()
    };

    let report = registry.detect(input, &engine, &mut diagnostics)?;

    if json {
        println!("{}", render::to_json(&report, JsonFormat::Pretty)?);
        return Ok(());
    }

    if trace && !diagnostics.events().is_empty() {
        println!("{}", "Trace".cyan().bold());
        println!("{}", render::trace_listing(diagnostics.events()));
        println!();
    }

    let summary = render::detection_summary(&report);
    if report.has_watermarks() {
        println!("{}", summary.yellow());
    } else {
        println!("{}", summary.green());
    }
    Ok(())
}

fn cmd_remove(
    inputs: &[PathBuf],
    output: Option<&Path>,
    json: bool,
    args: &EngineArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let engine = args.build()?;
    let registry = ProcessorRegistry::with_defaults();

    if let [input] = inputs {
        let output = output
            .map(Path::to_path_buf)
            .unwrap_or_else(|| cleaned_path(input, None));
        let report = registry.remove(input, &output, &engine, &mut DiagnosticTrace::disabled())?;
        if json {
            println!("{}", render::to_json(&report, JsonFormat::Pretty)?);
        } else {
            print_removal(input, &report);
        }
        return Ok(());
    }

    if let Some(dir) = output {
        fs::create_dir_all(dir)?;
    }

    let pb = ProgressBar::new(inputs.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let reports: Vec<RemovalReport> = inputs
        .par_iter()
        .map(|input| {
            let target = cleaned_path(input, output);
            let result = registry.remove(input, &target, &engine, &mut DiagnosticTrace::disabled());
            if let Err(e) = &result {
                log::warn!("{}: {}", input.display(), e);
            }
            pb.set_message(input.display().to_string());
            pb.inc(1);
            RemovalReport::from_result(result)
        })
        .collect();

    pb.finish_with_message("Done!");

    if json {
        println!("{}", render::to_json(&reports, JsonFormat::Pretty)?);
    } else {
        println!();
        for (input, report) in inputs.iter().zip(&reports) {
            print_removal(input, report);
        }
    }

    let failed = reports.iter().filter(|r| !r.success).count();
    if failed > 0 {
        return Err(format!("{} of {} files failed", failed, reports.len()).into());
    }
    Ok(())
}

fn print_removal(input: &Path, report: &RemovalReport) {
    let label = format!("{}:", input.display());
    if report.success {
        println!("{} {}", label.bold(), render::removal_summary(report).green());
    } else {
        println!("{} {}", label.bold(), render::removal_summary(report).red());
    }
}

fn cmd_inspect(input: &Path, args: &EngineArgs) -> Result<(), Box<dyn std::error::Error>> {
    let engine = args.build()?;
    let registry = ProcessorRegistry::with_defaults();
    let processor = registry.get_for_path(input)?;

    let bytes = fs::read(input)?;
    let package = processor.load(&bytes, &engine)?;
    let mut diagnostics = DiagnosticTrace::new();
    let report = engine.detect(package.document(), &mut diagnostics);

    println!("{}", "Document Tree".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Processor".bold(), processor.name());
    println!("{}", render::element_tree(package.document()));

    println!();
    println!("{}", "Decisions".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}", render::trace_listing(diagnostics.events()));

    println!();
    println!("{}: {}", "Watermarks".bold(), report.watermark_count());
    println!("{}: {}", "Warnings".bold(), diagnostics.warning_count());
    Ok(())
}

fn cmd_version() {
    println!("{} {}", "unmark".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Watermark removal tool for PDF and PPTX");
    println!();
    println!("Repository: {}", "https://github.com/iyulab/unmark".dimmed());
    println!("License: MIT");
}
