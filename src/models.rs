//! Data models for the PDU extractor.
//!
//! This module contains the core data structures shared by the scanner,
//! the flattener and the report generators.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};
use serde_json::{json, Value};
use std::fmt;
use std::path::PathBuf;

/// Action recognised on a PDU-bearing object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Register is read by the device client.
    Read,
    /// Register is written by the device client.
    Write,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Read => write!(f, "read"),
            Action::Write => write!(f, "write"),
        }
    }
}

impl Action {
    /// Recognise an `action` field value. Only the exact strings
    /// `"read"` and `"write"` match.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value.as_str()? {
            "read" => Some(Action::Read),
            "write" => Some(Action::Write),
            _ => None,
        }
    }

    /// The `{action}` message fragment for this action.
    pub fn message(self) -> Value {
        json!({ "action": self.to_string() })
    }
}

/// Fragments collected for one PDU identifier.
///
/// The same type is used for the raw accumulator filled by the scanner
/// and for the flattened, deduplicated entry written to the report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PduRecord {
    /// The identifier, taken verbatim from the `pdu` field.
    pub pdu: Value,
    /// View fragments.
    pub views: Vec<Value>,
    /// Command fragments (written views and item/data pairs).
    pub commands: Vec<Value>,
    /// Message fragments (`{action}` descriptors).
    pub messages: Vec<Value>,
}

impl PduRecord {
    /// Creates an empty record for an identifier.
    pub fn new(pdu: Value) -> Self {
        Self {
            pdu,
            views: Vec::new(),
            commands: Vec::new(),
            messages: Vec::new(),
        }
    }

    /// Returns true when any message records a write.
    pub fn is_writable(&self) -> bool {
        self.messages
            .iter()
            .any(|m| m.get("action").and_then(Action::from_value) == Some(Action::Write))
    }
}

/// Summary of the label document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LabelSummary {
    /// Number of entries in the `anomalies` array (0 when absent or not an array).
    pub anomalies_count: usize,
}

impl LabelSummary {
    /// Summarise a parsed label document.
    pub fn from_labels(lbl: &Value) -> Self {
        Self {
            anomalies_count: lbl
                .get("anomalies")
                .and_then(Value::as_array)
                .map_or(0, Vec::len),
        }
    }
}

/// The register summary written to the output file.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    /// Time the report was assembled.
    #[serde(serialize_with = "serialize_timestamp")]
    pub generated_at: DateTime<Utc>,
    /// Absolute path of the configuration document.
    pub source_cfg: PathBuf,
    /// Absolute path of the label document.
    pub source_lbl: PathBuf,
    /// One entry per PDU, in first-discovery order.
    pub pdus: Vec<PduRecord>,
    /// Label document summary.
    pub lbl_summary: LabelSummary,
}

fn serialize_timestamp<S: Serializer>(ts: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true))
}
