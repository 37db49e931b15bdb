//! SOD splitter CLI
//!
//! Command-line driver for the split pipeline: extract symbols from the
//! monolithic source, map them to modules, write the output tree and
//! verify it.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use sodsplit_classify::{Classifier, SplitPlan};
use sodsplit_core::SplitOptions;
use sodsplit_emit::Synthesizer;
use sodsplit_extract::{ExtractionStats, Extractor};
use sodsplit_verify::{Verifier, VerifyReport};
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sodsplit")]
#[command(author, version, about = "Split the monolithic SOD library into per-module sources", long_about = None)]
struct Cli {
    /// Path to the monolithic sod.c file
    #[arg(long, value_name = "FILE")]
    input: PathBuf,

    /// Destination directory for the generated tree
    #[arg(long, value_name = "DIR")]
    output_dir: PathBuf,

    /// Skip the verification step
    #[arg(long)]
    skip_verification: bool,

    /// Exit non-zero when verification finds issues
    #[arg(long)]
    strict: bool,

    /// Wall-clock budget for the whole run, in seconds
    #[arg(long, default_value_t = 300, value_name = "SECS")]
    max_time: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Report format (text, json)
    #[arg(long, default_value = "text")]
    format: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // json mode keeps stdout parseable unless RUST_LOG asks for more
    let default_level = if cli.format == "json" {
        "warn"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if cli.format != "text" && cli.format != "json" {
        bail!("unknown format: {}", cli.format);
    }

    let opts = SplitOptions {
        input: cli.input,
        output_dir: cli.output_dir,
        verify: !cli.skip_verification,
        strict: cli.strict,
        max_time_secs: cli.max_time,
    };
    run(&opts, cli.format == "json")
}

fn run(opts: &SplitOptions, json: bool) -> Result<()> {
    let budget = opts.budget();
    if !json {
        println!("Starting SOD library splitting process...");
    }

    let source = fs::read_to_string(&opts.input)
        .with_context(|| format!("cannot read {}", opts.input.display()))?;

    let extractor = Extractor::new();
    let extraction = extractor.extract(&source);
    let stats = extraction.stats();
    if !json {
        print_extraction(&stats);
    }

    let plan = Classifier::new().classify(&extraction);
    if !json {
        print_mapping(&plan);
    }

    let emit_report = Synthesizer::new().write_tree(opts, &extraction, &plan)?;
    if !json {
        println!(
            "\nSplitting complete! Created {} components.",
            emit_report.modules_written.len()
        );
    }

    let verify_report = if !opts.verify {
        if !json {
            println!("Skipping verification step as requested.");
        }
        None
    } else if budget.fraction_used() > 0.8 {
        warn!("Approaching timeout limit. Skipping verification step.");
        None
    } else {
        Some(Verifier::new().verify_tree(opts)?)
    };

    if let Some(report) = &verify_report {
        if opts.strict && report.has_issues() {
            bail!("issues were found during verification and strict mode is enabled");
        }
    }

    if json {
        print_json_report(opts, &stats, &plan, &emit_report, &verify_report)?;
    } else {
        println!("Processing completed successfully.");
        print_usage(opts);
    }
    Ok(())
}

fn print_extraction(stats: &ExtractionStats) {
    println!("\nExtraction complete. Found {} symbols:", stats.total_symbols);
    println!("  Functions: {}", stats.functions);
    println!("  Structs: {}", stats.structs);
    println!("  Enums: {}", stats.enums);
    println!("  Globals: {}", stats.globals);
    println!("  Typedefs: {}", stats.typedefs);
    println!("  Macros: {}", stats.macros);
    println!("  Comments: {}", stats.comments);
    println!("  Includes: {}", stats.includes);
    println!("  Conditionals: {}", stats.conditionals);
}

fn print_mapping(plan: &SplitPlan) {
    println!("\nComponent mapping complete:");
    for (module, elements) in &plan.modules {
        let mut kind_counts: BTreeMap<&str, usize> = BTreeMap::new();
        for elem in elements {
            *kind_counts.entry(elem.kind.as_str()).or_insert(0) += 1;
        }
        let breakdown: Vec<String> = kind_counts
            .iter()
            .map(|(kind, count)| format!("{} {}", count, kind))
            .collect();
        println!("  {}: {} elements ({})", module, elements.len(), breakdown.join(", "));
    }

    if plan.module_deps.values().any(|deps| !deps.is_empty()) {
        println!("\nModule dependencies:");
        for (module, deps) in &plan.module_deps {
            if !deps.is_empty() {
                let list: Vec<&str> = deps.iter().copied().collect();
                println!("  {} depends on: {}", module, list.join(", "));
            }
        }
    }
}

fn print_json_report(
    opts: &SplitOptions,
    stats: &ExtractionStats,
    plan: &SplitPlan,
    emit_report: &sodsplit_emit::EmitReport,
    verify_report: &Option<VerifyReport>,
) -> Result<()> {
    let module_counts: BTreeMap<&str, usize> = plan
        .modules
        .iter()
        .map(|(module, elements)| (*module, elements.len()))
        .collect();
    let result = serde_json::json!({
        "input": opts.input.to_string_lossy(),
        "output_dir": opts.output_dir.to_string_lossy(),
        "extraction": stats,
        "modules": module_counts,
        "module_dependencies": plan.module_deps,
        "files_written": emit_report.files_written,
        "verification": verify_report,
    });
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn print_usage(opts: &SplitOptions) {
    println!("\nUsage instructions:");
    println!("  1. The split files are located in:");
    println!("     - Source files: {}", opts.src_dir().display());
    println!("     - Header files: {}", opts.include_dir().display());
    println!("  2. To compile the split files, include them in your build system.");
    println!("  3. To use the SOD library, include the main header: #include \"sod/sod.h\"");
}
