//! pdu-extract - Modbus PDU register extractor
//!
//! A CLI tool that scans a vendor CFG JSON document for PDU-bearing
//! objects and writes a flattened register summary, grouped by PDU,
//! for the Immergas ESPHome component.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Input load/parse failure, invalid arguments, or write failure

mod analysis;
mod cli;
mod config;
mod header;
mod labels;
mod loader;
mod models;
mod report;
mod scanner;

use anyhow::{Context, Result};
use cli::Args;
use config::{Config, CONFIG_FILE_NAME};
use loader::LoadError;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    debug!("pdu-extract v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    if let Err(e) = run_extract(&args) {
        match e.downcast_ref::<LoadError>() {
            Some(load_error) => eprintln!("{}", load_error),
            None => {
                error!("Extraction failed: {:#}", e);
                eprintln!("Error: {:#}", e);
            }
        }
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .pdu-extract.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "{} already exists. Remove it first or edit it manually.",
            CONFIG_FILE_NAME
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("Created {} with default settings.", CONFIG_FILE_NAME);
    Ok(())
}

/// Initialize logging based on verbosity settings.
///
/// Logs go to stderr; stdout carries only the completion lines.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Run the complete extraction: load, scan, flatten, report.
fn run_extract(args: &Args) -> Result<()> {
    let mut config = load_config(args)?;
    config.merge_with_args(args);

    let plan = config.plan(&args.base_dir());
    debug!("Run plan: {:?}", plan);

    // Step 1: Load both inputs before producing anything
    let (cfg, lbl) = loader::load_inputs(&plan.cfg, &plan.lbl)?;

    // Step 2: Scan for PDU-bearing objects
    let pdus = scanner::scan(&cfg.value);
    info!("Discovered {} PDUs", pdus.len());

    // Step 3: Flatten and deduplicate fragments
    let entries = analysis::flatten_records(pdus.into_records());

    // Step 4: Build and save the report
    let report = report::build_report(&cfg, &lbl, entries);
    report::write_report(&report, &plan.output)?;

    println!(
        "Wrote {} - PDUs found: {}",
        plan.output.display(),
        report.pdus.len()
    );

    // Step 5: Companion outputs
    if let Some(ref dir) = plan.labels_dir {
        let generated = labels::generate_label_modules(&lbl.value, dir)?;
        if generated.is_empty() {
            println!("No language keys found in label file");
        } else {
            println!("Generated label modules:");
            for path in &generated {
                println!(" - {}", path.display());
            }
        }
    }

    if let Some(ref path) = plan.header {
        let count = header::write_header(&report, path)?;
        println!("Wrote {} - header entries: {}", path.display(), count);
    }

    Ok(())
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", CONFIG_FILE_NAME);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
