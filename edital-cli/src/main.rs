use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::path::Path;
use tracing_subscriber::EnvFilter;

use edital_core::serialization::OUTPUT_FORMATS;
use edital_core::validation::{default_catalog, Phase};
use edital_core::{
    from_json, to_json, ChecklistProcessor, ChecklistReport, ExtractionConfig, RuleOutcome,
    Section,
};

#[derive(Parser)]
#[command(name = "edital-checklist")]
#[command(about = "Check a procurement notice (edital) against the Lei 14.133/2021 checklist")]
struct Args {
    /// Path to the edital as plain UTF-8 text
    #[arg(short, long, required_unless_present_any = ["import", "show_configs"])]
    input: Option<String>,

    /// JSON array of sections to use instead of indexing the text
    #[arg(long)]
    sections: Option<String>,

    /// Evaluate a previously exported field map instead of extracting
    #[arg(long, conflicts_with = "input")]
    import: Option<String>,

    /// Path to custom config file (YAML format)
    #[arg(short, long)]
    config: Option<String>,

    /// Output file path (if not specified, auto-generated based on input)
    #[arg(short, long)]
    output: Option<String>,

    /// Output format: report, fields, or checklist
    #[arg(short = 'f', long, default_value = "report")]
    output_format: String,

    /// Also write the extracted field map to this path
    #[arg(long)]
    export_fields: Option<String>,

    /// Log timings of the index, extract and evaluate steps
    #[arg(long)]
    profile: bool,

    /// Debug logging for the checking library
    #[arg(short, long)]
    verbose: bool,

    /// Show available config options and exit
    #[arg(long)]
    show_configs: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    println!("📑 Edital Checklist");

    if args.show_configs {
        show_help();
        return Ok(());
    }

    let config = ExtractionConfig::load_with_fallback(args.config.as_deref());
    if let Some(config_path) = &args.config {
        println!("📋 Loaded config from: {}", config_path);
    } else {
        println!("📋 Using default config");
    }

    let processor = ChecklistProcessor::new(config).with_profiling(args.profile);

    if let Some(import_path) = &args.import {
        return evaluate_import(&processor, import_path, &args);
    }

    let Some(input) = &args.input else {
        anyhow::bail!("--input is required unless --import or --show-configs is given");
    };
    let text =
        fs::read_to_string(input).with_context(|| format!("Failed to read edital {input}"))?;
    let sections = args.sections.as_deref().map(load_sections).transpose()?;

    println!("📄 Processing: {}", input);
    let report = processor.process(&text, sections);

    if let Some(warning) = &report.warning {
        println!("⚠️  {}", warning);
    }
    println!(
        "✅ {} sections, {} fields determined",
        report.sections.len(),
        report.summary.fields
    );
    print_checklist(&report.outcomes);

    let output_path = args
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(input, args.config.as_deref()));
    save_report(&report, &output_path, &args.output_format)?;

    if let Some(fields_path) = &args.export_fields {
        fs::write(fields_path, to_json(&report.fields)?)
            .with_context(|| format!("Failed to write {fields_path}"))?;
        println!("💾 Field map exported to: {}", fields_path);
    }

    Ok(())
}

/// `RUST_LOG` wins; otherwise info, or debug for the library with `--verbose`.
fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "info,edital_core=debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_sections(path: &str) -> Result<Vec<Section>> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read sections file {path}"))?;
    let sections: Vec<Section> = serde_json::from_str(&content)
        .with_context(|| format!("Invalid sections file {path}"))?;
    println!("🗂️  Using {} sections from: {}", sections.len(), path);
    Ok(sections)
}

fn evaluate_import(processor: &ChecklistProcessor, path: &str, args: &Args) -> Result<()> {
    let json =
        fs::read_to_string(path).with_context(|| format!("Failed to read field map {path}"))?;
    let fields = from_json(&json).with_context(|| format!("Invalid field map {path}"))?;
    println!("📥 Imported {} fields from: {}", fields.len(), path);

    let outcomes = processor.evaluate_fields(&fields);
    print_checklist(&outcomes);

    if let Some(output_path) = &args.output {
        let rendered = match args.output_format.as_str() {
            "fields" => to_json(&fields)?,
            _ => serde_json::to_string_pretty(&outcomes)?,
        };
        fs::write(output_path, rendered)
            .with_context(|| format!("Failed to write {output_path}"))?;
        println!("💾 Checklist saved to: {}", output_path);
    }
    Ok(())
}

fn print_checklist(outcomes: &[RuleOutcome]) {
    let catalog = default_catalog();
    let phase_of = |id: &str| -> Option<Phase> {
        catalog.iter().find(|e| e.id == id).map(|e| e.phase)
    };

    let mut current: Option<Phase> = None;
    for outcome in outcomes {
        if let Some(phase) = phase_of(&outcome.id) {
            if current != Some(phase) {
                println!("\n📂 {}", phase.label());
                current = Some(phase);
            }
        }

        let marker = if outcome.is_warning() { "⚠️ " } else { "✅" };
        println!("  {} {:<8} {}: {}", marker, outcome.id, outcome.title, outcome.message);
        if let Some(guidance) = &outcome.guidance {
            println!("       ↳ {}", guidance);
        }
        if let Some(source) = &outcome.source {
            println!("       📍 Seção {} - {}", source.number, source.title);
        }
    }

    let warnings = outcomes.iter().filter(|o| o.is_warning()).count();
    println!(
        "\n📊 {} verificações: {} ok, {} alertas",
        outcomes.len(),
        outcomes.len() - warnings,
        warnings
    );
}

fn default_output_path(input: &str, config: Option<&str>) -> String {
    let input_name = Path::new(input)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("edital");
    let config_suffix = config
        .and_then(|p| Path::new(p).file_stem())
        .and_then(|s| s.to_str())
        .map(|s| format!("_{s}"))
        .unwrap_or_default();
    format!("{input_name}{config_suffix}_checklist.json")
}

fn save_report(report: &ChecklistReport, output_path: &str, format: &str) -> Result<()> {
    let rendered = report.render(format)?;
    fs::write(output_path, rendered).with_context(|| format!("Failed to write {output_path}"))?;
    tracing::debug!(path = output_path, format, outcomes = report.outcomes.len(), "report written");

    match format {
        "fields" => println!("💾 Field map saved to: {}", output_path),
        "checklist" => println!("💾 Checklist saved to: {}", output_path),
        "report" => println!("💾 Full report saved to: {}", output_path),
        _ => {
            println!("⚠️  Unknown output format '{}', using default report format", format);
            println!("💾 Full report saved to: {}", output_path);
        }
    }

    Ok(())
}

fn show_help() {
    println!("\n📋 Available Configuration Options:");
    println!("  --input <path>          Edital as plain UTF-8 text");
    println!("  --sections <path>       JSON outline to use instead of indexing");
    println!("  --import <path>         Evaluate an exported field map (no extraction)");
    println!("  --config <path>         Load custom config file");
    println!("  --output <path>         Output file path (auto-generated if not specified)");
    println!("  --output-format <fmt>   Output format: {}", OUTPUT_FORMATS.join(", "));
    println!("  --export-fields <path>  Also write the extracted field map");
    println!("  --profile               Log step timings");
    println!("  --verbose               Debug logging (RUST_LOG overrides)");

    println!("\n📄 Output Formats:");
    println!("  report     - Sections, fields, sources and rule outcomes (default)");
    println!("  fields     - Flat field map, re-importable with --import");
    println!("  checklist  - Rule outcomes only");

    println!("\n⚙️  Config file sections (YAML, every key optional):");
    println!("  structure  - Heading windows and title length limits");
    println!("  context    - Negation, confidentiality, TOC and attribution windows");
    println!("  pipeline   - Field rules to run, in order, with enabled flags");

    println!("\n📝 Usage Examples:");
    println!("  edital-checklist -i edital.txt");
    println!("  edital-checklist -i edital.txt -o checklist.json -f checklist");
    println!("  edital-checklist -i edital.txt --export-fields campos.json");
    println!("  edital-checklist --import campos.json");
}
