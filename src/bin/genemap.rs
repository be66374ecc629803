// Copyright (c) 2024-2025 Fulcrum Genomics LLC
// SPDX-License-Identifier: MIT

//! genemap CLI
//!
//! Builds the central gene registry from nomenclature references and maps
//! dataset gene columns onto it.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{error, info};
use tracing_subscriber::util::SubscriberInitExt;

use ferro_genemap::{
    export, BuildContext, ExportOptions, GenemapConfig, GenemapError, RegistryEntry, Species,
};

#[derive(Parser)]
#[command(name = "genemap")]
#[command(author, version, about = "Cross-species gene registry builder")]
#[command(long_about = "Build a deduplicated human/mouse/zebrafish gene registry and link dataset \
gene columns to it.

Examples:
  genemap check-config --config genemap.toml
  genemap build --config genemap.toml --output-dir out/
  genemap lookup --config genemap.toml --species mouse Brca1 Trp53")]
struct Cli {
    /// Log level (trace, debug, info, warn, error) or an EnvFilter directive
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the registry, map all configured tables and write the results
    Build {
        /// Configuration file (.toml or .json)
        #[arg(short, long)]
        config: PathBuf,

        /// Directory for the output tables and manifest
        #[arg(short, long)]
        output_dir: PathBuf,

        /// Export every synonym, not only those seen in the datasets
        #[arg(long)]
        keep_unused_synonyms: bool,
    },

    /// Validate a configuration file and check that its inputs exist
    CheckConfig {
        /// Configuration file (.toml or .json)
        #[arg(short, long)]
        config: PathBuf,
    },

    /// Build the registry and print the entries matching symbols as JSON
    Lookup {
        /// Configuration file (.toml or .json)
        #[arg(short, long)]
        config: PathBuf,

        /// Species namespace (human, mouse, zebrafish)
        #[arg(short, long)]
        species: Species,

        /// Symbols or synonyms to look up
        #[arg(required = true)]
        symbols: Vec<String>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level)?;

    let result = match cli.command {
        Commands::Build {
            config,
            output_dir,
            keep_unused_synonyms,
        } => run_build(&config, &output_dir, keep_unused_synonyms),
        Commands::CheckConfig { config } => run_check_config(&config),
        Commands::Lookup {
            config,
            species,
            symbols,
        } => run_lookup(&config, species, &symbols),
    };

    result.map_err(|e| {
        error!("{}", e.detailed_message());
        e.detailed_message().into()
    })
}

fn run_build(
    config_path: &Path,
    output_dir: &Path,
    keep_unused_synonyms: bool,
) -> Result<(), GenemapError> {
    info!("Loading configuration from {}", config_path.display());
    let config = GenemapConfig::from_file(config_path)?;
    let output = BuildContext::new(&config).run()?;
    let manifest = export(
        &output,
        output_dir,
        ExportOptions {
            keep_unused_synonyms,
        },
    )?;
    println!(
        "Built {} entries ({} stubs) and {} link tables into {}",
        manifest.entries,
        manifest.stub_entries,
        manifest
            .tables
            .iter()
            .map(|t| t.link_tables.len())
            .sum::<usize>(),
        output_dir.display()
    );
    Ok(())
}

fn run_check_config(config_path: &Path) -> Result<(), GenemapError> {
    println!("Checking configuration {}...", config_path.display());
    let config = GenemapConfig::from_file(config_path)?;
    config.validate()?;
    println!("Configuration is valid");

    let files = config.reference_files();
    let mut inputs = vec![
        ("hgnc", files.hgnc.clone()),
        ("mgi", files.mgi.clone()),
        ("homology", files.homology.clone()),
    ];
    if let Some(zfin) = &files.zfin {
        inputs.push(("zfin", zfin.clone()));
    }
    for table in &config.tables {
        inputs.push((table.table.as_str(), config.resolve_path(&table.in_path)));
    }

    let mut missing = 0usize;
    println!("\nInputs:");
    for (name, path) in &inputs {
        if path.exists() {
            println!("  OK {}: {}", name, path.display());
        } else {
            println!("  MISSING {}: {}", name, path.display());
            missing += 1;
        }
    }

    if missing > 0 {
        return Err(GenemapError::Io {
            msg: format!("{} of {} input files are missing", missing, inputs.len()),
        });
    }
    Ok(())
}

#[derive(Serialize)]
struct LookupResult<'a> {
    symbol: &'a str,
    species: Species,
    entries: Vec<&'a RegistryEntry>,
}

fn run_lookup(config_path: &Path, species: Species, symbols: &[String]) -> Result<(), GenemapError> {
    let config = GenemapConfig::from_file(config_path)?;
    let (registry, _) = BuildContext::new(&config).build_registry()?;

    let results: Vec<LookupResult> = symbols
        .iter()
        .map(|symbol| LookupResult {
            symbol: symbol.as_str(),
            species,
            entries: registry
                .lookup(species, symbol)
                .iter()
                .filter_map(|id| registry.get(*id))
                .collect(),
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&results)?);
    Ok(())
}

fn init_tracing(level: &str) -> Result<(), Box<dyn std::error::Error>> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter};

    let filter =
        EnvFilter::try_new(level).map_err(|e| format!("Invalid log level '{}': {}", level, e))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    Ok(())
}
