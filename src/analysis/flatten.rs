//! Flattening and deduplication of collected fragments.

use super::value::json_eq;
use crate::models::PduRecord;
use serde_json::Value;

/// Splice array fragments into the sequence, one level deep.
///
/// Non-array fragments are appended as-is. Collection order is kept.
pub fn flatten_fragments(fragments: Vec<Value>) -> Vec<Value> {
    let mut flat = Vec::with_capacity(fragments.len());

    for fragment in fragments {
        match fragment {
            Value::Array(items) => flat.extend(items),
            other => flat.push(other),
        }
    }

    flat
}

/// Keep the first occurrence of each structurally distinct value.
pub fn dedupe(values: Vec<Value>) -> Vec<Value> {
    let mut unique: Vec<Value> = Vec::with_capacity(values.len());

    for value in values {
        if !unique.iter().any(|seen| json_eq(seen, &value)) {
            unique.push(value);
        }
    }

    unique
}

/// Turn a raw accumulator into a report entry.
///
/// Views and commands are flattened one level; messages are never arrays.
/// Deduplication applies within each sequence only.
pub fn flatten_record(record: PduRecord) -> PduRecord {
    PduRecord {
        pdu: record.pdu,
        views: dedupe(flatten_fragments(record.views)),
        commands: dedupe(flatten_fragments(record.commands)),
        messages: dedupe(record.messages),
    }
}

/// Flatten every record, keeping discovery order.
pub fn flatten_records(records: Vec<PduRecord>) -> Vec<PduRecord> {
    records.into_iter().map(flatten_record).collect()
}
