//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation. Unset options fall back to the
//! configuration file, then to the built-in defaults.

use clap::Parser;
use std::path::PathBuf;

/// pdu-extract - Modbus PDU register extractor
///
/// Scans a vendor CFG document for PDU-bearing objects and writes a
/// flattened register summary grouped by PDU, plus per-language label
/// modules and an optional C++ PDU map header.
///
/// Examples:
///   pdu-extract
///   pdu-extract --cfg CFG.json --lbl LBL.json -o registers.json
///   pdu-extract --base-dir ./Immergas-Modbus --header
///   pdu-extract --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Configuration (CFG) JSON document
    ///
    /// Default: ../dominus/CFG-WFC01_IM_MBUS.json relative to the base directory.
    #[arg(long, value_name = "FILE", env = "PDU_EXTRACT_CFG")]
    pub cfg: Option<PathBuf>,

    /// Label (LBL) JSON document
    ///
    /// Default: ../dominus/LBL-WFC01_IM_MBUS.json relative to the base directory.
    #[arg(long, value_name = "FILE", env = "PDU_EXTRACT_LBL")]
    pub lbl: Option<PathBuf>,

    /// Output file path for the register summary
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Directory that relative paths are resolved against
    ///
    /// Defaults to the current directory.
    #[arg(long, value_name = "DIR")]
    pub base_dir: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .pdu-extract.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory for the generated labels_<lang>.py modules
    #[arg(long, value_name = "DIR", conflicts_with = "no_labels")]
    pub labels_dir: Option<PathBuf>,

    /// Skip label module generation
    #[arg(long)]
    pub no_labels: bool,

    /// Also write the C++ PDU map header
    ///
    /// Without a value, writes components/immergas_modbus/immergas_pdus.h.
    #[arg(long, value_name = "FILE", num_args = 0..=1)]
    pub header: Option<Option<PathBuf>>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .pdu-extract.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        // Validate base directory if provided
        if let Some(ref base) = self.base_dir {
            if !base.exists() {
                return Err(format!(
                    "Base directory does not exist: {}",
                    base.display()
                ));
            }
            if !base.is_dir() {
                return Err(format!("Base path is not a directory: {}", base.display()));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// Returns the base directory for relative paths.
    pub fn base_dir(&self) -> PathBuf {
        self.base_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            cfg: None,
            lbl: None,
            output: None,
            base_dir: None,
            config: None,
            labels_dir: None,
            no_labels: false,
            header: None,
            verbose: false,
            quiet: false,
            init_config: false,
        }
    }

    #[test]
    fn test_parse_header_flag() {
        let args = Args::try_parse_from(["pdu-extract", "--header"]).unwrap();
        assert_eq!(args.header, Some(None));

        let args = Args::try_parse_from(["pdu-extract", "--header", "out.h"]).unwrap();
        assert_eq!(args.header, Some(Some(PathBuf::from("out.h"))));

        let args = Args::try_parse_from(["pdu-extract"]).unwrap();
        assert_eq!(args.header, None);
    }

    #[test]
    fn test_labels_dir_conflicts_with_no_labels() {
        let result =
            Args::try_parse_from(["pdu-extract", "--no-labels", "--labels-dir", "labels"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());

        args.init_config = true;
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validation_missing_base_dir() {
        let mut args = make_args();
        args.base_dir = Some(PathBuf::from("/definitely/not/here"));
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }

    #[test]
    fn test_base_dir_default() {
        assert_eq!(make_args().base_dir(), PathBuf::from("."));
    }
}
