//! Input document loading.
//!
//! Reads the configuration and label documents from disk and parses
//! them as generic JSON trees. Any failure here is fatal for the run.

use serde::Deserialize;
use serde_json::Value;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Failure to load one of the input documents.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read/parse {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to read/parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl LoadError {
    /// Path of the document that failed to load.
    #[allow(dead_code)] // Accessor used by tests
    pub fn path(&self) -> &Path {
        match self {
            LoadError::Read { path, .. } | LoadError::Parse { path, .. } => path,
        }
    }
}

/// A parsed JSON document and where it came from.
#[derive(Debug, Clone)]
pub struct LoadedDocument {
    /// Canonical absolute path of the file.
    pub path: PathBuf,
    /// Parsed content.
    pub value: Value,
}

/// Read a file as UTF-8 text and parse it as JSON.
pub fn load_json(path: &Path) -> Result<LoadedDocument, LoadError> {
    debug!("Loading {}", path.display());

    let content = std::fs::read_to_string(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let value = parse_document(&content).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    // The file was just read, so canonicalize only fails on exotic races.
    let path = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    info!("Loaded {} ({} bytes)", path.display(), content.len());

    Ok(LoadedDocument { path, value })
}

/// Parse JSON text with no nesting limit.
///
/// Deep levels are parsed on a heap-allocated stack segment instead of
/// the thread stack.
fn parse_document(content: &str) -> Result<Value, serde_json::Error> {
    let mut deserializer = serde_json::Deserializer::from_str(content);
    deserializer.disable_recursion_limit();
    let value = Value::deserialize(serde_stacker::Deserializer::new(&mut deserializer))?;
    deserializer.end()?;
    Ok(value)
}

/// Load the configuration and label documents, in that order.
pub fn load_inputs(cfg: &Path, lbl: &Path) -> Result<(LoadedDocument, LoadedDocument), LoadError> {
    let cfg = load_json(cfg)?;
    let lbl = load_json(lbl)?;
    Ok((cfg, lbl))
}
