// Shelfline CLI - headless inventory reconciliation

mod exit_codes;

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use shelfline_embed::HttpEmbedder;
use shelfline_recon::loader::{load_catalog_csv, load_purchase_csv};
use shelfline_recon::report::{build_report, export_flat, format_console};
use shelfline_recon::semantic::SemanticIndex;
use shelfline_recon::source::{CsvSource, InventorySource};
use shelfline_recon::{match_inventory, CanonIndex, CatalogIndex, ReconConfig};

use exit_codes::{EXIT_INVALID_CONFIG, EXIT_LOAD, EXIT_RUNTIME, EXIT_SUCCESS};

pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

fn cli_err(code: u8, message: impl Into<String>) -> CliError {
    CliError {
        code,
        message: message.into(),
        hint: None,
    }
}

#[derive(Parser)]
#[command(name = "shelf")]
#[command(about = "Inventory reconciliation against purchase canon and vendor order guides")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a reconciliation pass from a site config and canonical CSV exports
    #[command(after_help = "\
Examples:
  shelf run --config site.toml --purchases canon.csv --inventory counts.csv
  shelf run --config site.toml --purchases q1.csv --purchases q2.csv \\
      --catalog sysco.csv --catalog usfoods.csv --inventory counts.csv --json
  shelf run --config site.toml --purchases canon.csv --inventory counts.csv \\
      --semantic --export flagged.csv")]
    Run {
        /// Site config TOML
        #[arg(long)]
        config: PathBuf,

        /// Purchase-history CSV (repeatable; later files win duplicate skus)
        #[arg(long = "purchases", required = true)]
        purchases: Vec<PathBuf>,

        /// Vendor order-guide CSV (repeatable)
        #[arg(long = "catalog")]
        catalogs: Vec<PathBuf>,

        /// Inventory count CSV
        #[arg(long)]
        inventory: PathBuf,

        /// Reconcile one unit only (default: every unit in the inventory file)
        #[arg(long)]
        unit: Option<String>,

        /// Ignore-list file, one sku per line (# starts a comment)
        #[arg(long)]
        ignore: Option<PathBuf>,

        /// Build the semantic index from the [embedding] config before matching
        #[arg(long)]
        semantic: bool,

        /// Print the full report as JSON to stdout instead of console text
        #[arg(long)]
        json: bool,

        /// Write the JSON report to a file
        #[arg(long)]
        output: Option<PathBuf>,

        /// Write the flat CSV export to a file
        #[arg(long)]
        export: Option<PathBuf>,

        /// Include clean rows in console output
        #[arg(long)]
        show_clean: bool,
    },

    /// Validate a site config without running
    #[command(after_help = "\
Examples:
  shelf validate --config site.toml")]
    Validate {
        /// Site config TOML
        #[arg(long)]
        config: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Run {
            config,
            purchases,
            catalogs,
            inventory,
            unit,
            ignore,
            semantic,
            json,
            output,
            export,
            show_clean,
        } => cmd_run(RunArgs {
            config,
            purchases,
            catalogs,
            inventory,
            unit,
            ignore,
            semantic,
            json,
            output,
            export,
            show_clean,
        }),
        Commands::Validate { config } => cmd_validate(&config),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(e) => {
            eprintln!("error: {}", e.message);
            if let Some(hint) = e.hint {
                eprintln!("hint: {hint}");
            }
            ExitCode::from(e.code)
        }
    }
}

struct RunArgs {
    config: PathBuf,
    purchases: Vec<PathBuf>,
    catalogs: Vec<PathBuf>,
    inventory: PathBuf,
    unit: Option<String>,
    ignore: Option<PathBuf>,
    semantic: bool,
    json: bool,
    output: Option<PathBuf>,
    export: Option<PathBuf>,
    show_clean: bool,
}

fn load_config(path: &Path) -> Result<ReconConfig, CliError> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        cli_err(
            EXIT_INVALID_CONFIG,
            format!("cannot read {}: {e}", path.display()),
        )
    })?;
    ReconConfig::from_toml(&text).map_err(|e| cli_err(EXIT_INVALID_CONFIG, e.to_string()))
}

fn read_input(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path)
        .map_err(|e| cli_err(EXIT_LOAD, format!("cannot read {}: {e}", path.display())))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn cmd_validate(config_path: &Path) -> Result<(), CliError> {
    let config = load_config(config_path)?;
    println!(
        "config ok: {} ({} vendors, {} units)",
        config.name,
        config.vendors.len(),
        config.units.len()
    );
    Ok(())
}

/// Parse an ignore-list file: one sku per line, `#` starts a comment.
fn parse_ignore_list(text: &str) -> HashSet<String> {
    text.lines()
        .map(|line| line.split('#').next().unwrap_or("").trim())
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

fn cmd_run(args: RunArgs) -> Result<(), CliError> {
    let config = load_config(&args.config)?;

    // Purchase batches concatenate in argument order; later files win
    // duplicate skus.
    let mut purchases = Vec::new();
    for path in &args.purchases {
        let data = read_input(path)?;
        purchases.extend(
            load_purchase_csv(&file_name(path), &data, &config)
                .map_err(|e| cli_err(EXIT_LOAD, e.to_string()))?,
        );
    }
    let canon = CanonIndex::build(purchases);

    let catalog = if args.catalogs.is_empty() {
        None
    } else {
        let mut items = Vec::new();
        for path in &args.catalogs {
            let data = read_input(path)?;
            items.extend(
                load_catalog_csv(&file_name(path), &data, &config)
                    .map_err(|e| cli_err(EXIT_LOAD, e.to_string()))?,
            );
        }
        Some(CatalogIndex::build(items))
    };

    let inventory_data = read_input(&args.inventory)?;
    let source = CsvSource::from_csv(&file_name(&args.inventory), &inventory_data)
        .map_err(|e| cli_err(EXIT_LOAD, e.to_string()))?;
    let units = match &args.unit {
        Some(unit) => vec![unit.clone()],
        None => source
            .units()
            .map_err(|e| cli_err(EXIT_LOAD, e.to_string()))?,
    };
    let mut items = Vec::new();
    for unit in &units {
        items.extend(
            source
                .inventory_for_unit(unit)
                .map_err(|e| cli_err(EXIT_LOAD, e.to_string()))?,
        );
    }

    let ignored = match &args.ignore {
        Some(path) => parse_ignore_list(&read_input(path)?),
        None => HashSet::new(),
    };

    // The semantic index is best-effort: anything short of a ready index
    // degrades to lexical suggestions, never to a failed run.
    let semantic_index = if args.semantic {
        build_semantic_index(&config, catalog.as_ref())
    } else {
        None
    };

    let results = match_inventory(
        &items,
        &canon,
        &config,
        catalog.as_ref(),
        semantic_index.as_ref(),
        &ignored,
    );
    let report = build_report(&config.name, results);

    let json_str = serde_json::to_string_pretty(&report)
        .map_err(|e| cli_err(EXIT_RUNTIME, format!("JSON serialization error: {e}")))?;

    if let Some(path) = &args.output {
        std::fs::write(path, &json_str)
            .map_err(|e| cli_err(EXIT_RUNTIME, format!("cannot write output: {e}")))?;
        eprintln!("wrote {}", path.display());
    }

    if let Some(path) = &args.export {
        let flat = export_flat(&report.results, true)
            .map_err(|e| cli_err(EXIT_RUNTIME, e.to_string()))?;
        std::fs::write(path, flat)
            .map_err(|e| cli_err(EXIT_RUNTIME, format!("cannot write export: {e}")))?;
        eprintln!("wrote {}", path.display());
    }

    if args.json {
        println!("{json_str}");
    } else {
        print!("{}", format_console(&report.results, args.show_clean));
    }

    Ok(())
}

fn build_semantic_index(
    config: &ReconConfig,
    catalog: Option<&CatalogIndex>,
) -> Option<SemanticIndex> {
    let Some(embedding) = &config.embedding else {
        eprintln!("--semantic ignored: no [embedding] section in config");
        return None;
    };
    let Some(catalog) = catalog else {
        eprintln!("--semantic ignored: no catalogs loaded");
        return None;
    };

    let mut index = SemanticIndex::new(Box::new(HttpEmbedder::from_config(embedding)));
    index.build(catalog, false);
    if index.is_ready() {
        eprintln!("semantic index ready: {} of {} items", index.len(), catalog.len());
    } else {
        eprintln!("semantic backend unavailable; using lexical suggestions only");
    }
    Some(index)
}
