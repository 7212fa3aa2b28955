use crate::extractor::ExtractionConfig;
use crate::pipeline::ExtractionPipeline;
use crate::writer::{
    output_file_name, CsvWriter, OpenApi20Writer, OpenApiYamlWriter, OutputWriter, TextListWriter,
};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::{debug, info, warn};
use std::path::PathBuf;

/// Route Extractor - Generate OpenAPI 2.0 documentation and route lists from Symfony projects
#[derive(Parser, Debug)]
#[command(name = "route-extractor")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Source directory scanned for @Route annotations
    #[arg(short = 's', long = "src", value_name = "DIR")]
    pub source_dir: Option<PathBuf>,

    /// Route dump produced by `bin/console debug:router --format=json`
    #[arg(short = 'j', long = "symfony-json", value_name = "FILE")]
    pub symfony_json: Option<PathBuf>,

    /// Output directory
    #[arg(short = 'o', long = "output", value_name = "DIR")]
    pub output_dir: PathBuf,

    /// Output file name (defaults to the writer's own file name)
    #[arg(short = 'f', long = "filename", value_name = "NAME")]
    pub filename: Option<String>,

    /// Host written into the OpenAPI document
    #[arg(short = 'H', long = "host", default_value = "localhost:8080")]
    pub host: String,

    /// Base path written into the OpenAPI document
    #[arg(short = 'b', long = "base-path", default_value = "/")]
    pub base_path: String,

    /// Output formats, repeatable
    #[arg(short = 'F', long = "format", value_enum, default_values_t = [OutputFormat::Openapi])]
    pub formats: Vec<OutputFormat>,

    /// Extension of the scanned source files
    #[arg(short = 'e', long = "extension", default_value = "php")]
    pub extension: String,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Output format options
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    /// OpenAPI 2.0 as JSON
    Openapi,
    /// OpenAPI 2.0 as YAML
    OpenapiYaml,
    /// Semicolon separated route list
    Csv,
    /// One URL per line
    Text,
}

impl OutputFormat {
    pub fn writer(self) -> Box<dyn OutputWriter> {
        match self {
            OutputFormat::Openapi => Box::new(OpenApi20Writer),
            OutputFormat::OpenapiYaml => Box::new(OpenApiYamlWriter),
            OutputFormat::Csv => Box::new(CsvWriter),
            OutputFormat::Text => Box::new(TextListWriter),
        }
    }
}

impl CliArgs {
    pub fn to_extraction_config(&self) -> ExtractionConfig {
        ExtractionConfig {
            source_dir: self.source_dir.clone(),
            symfony_json: self.symfony_json.clone(),
            extension: self.extension.clone(),
        }
    }
}

/// Parse command line arguments
pub fn parse_args() -> Result<CliArgs> {
    let args = CliArgs::parse();
    parse_args_from_parsed(args)
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(mut args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    if args.source_dir.is_none() && args.symfony_json.is_none() {
        anyhow::bail!("Nothing to extract: specify --src and/or --symfony-json");
    }

    if let Some(ref source_dir) = args.source_dir {
        if !source_dir.exists() {
            anyhow::bail!("Source directory does not exist: {}", source_dir.display());
        }
        if !source_dir.is_dir() {
            anyhow::bail!("Source path is not a directory: {}", source_dir.display());
        }
    }

    if !args.output_dir.exists() {
        anyhow::bail!(
            "Output directory does not exist: {}",
            args.output_dir.display()
        );
    }
    if !args.output_dir.is_dir() {
        anyhow::bail!(
            "Output path is not a directory: {}",
            args.output_dir.display()
        );
    }

    let mut seen = Vec::new();
    args.formats.retain(|format| {
        let first = !seen.contains(format);
        seen.push(*format);
        first
    });

    if let Some(ref source_dir) = args.source_dir {
        info!("Source directory: {}", source_dir.display());
    }
    if let Some(ref json) = args.symfony_json {
        info!("Symfony route dump: {}", json.display());
    }
    info!("Output directory: {}", args.output_dir.display());
    info!("Host: {}, base path: {}", args.host, args.base_path);
    info!("Formats: {:?}", args.formats);

    Ok(args)
}

/// Run the main workflow
pub fn run(args: CliArgs) -> Result<()> {
    info!("Starting route extraction...");

    let config = args.to_extraction_config();
    let routes = ExtractionPipeline::new()
        .run(&config)
        .context("Route extraction failed")?;

    if routes.is_empty() {
        warn!("No routes found");
    }

    let several = args.formats.len() > 1;
    let mut written = Vec::new();

    for format in &args.formats {
        let writer = format.writer();
        let file_name = output_file_name(writer.as_ref(), args.filename.as_deref(), several);
        let path = args.output_dir.join(file_name);

        debug!("Running writer '{}'", writer.name());
        writer
            .write(routes.as_slice(), &args.host, &args.base_path, &path)
            .with_context(|| format!("Writer '{}' failed", writer.name()))?;
        written.push(path);
    }

    info!("Extraction complete!");
    info!("Summary:");
    info!("  - Routes found: {}", routes.len());
    for path in &written {
        info!("  - Written: {}", path.display());
    }

    Ok(())
}
