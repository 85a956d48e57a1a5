//! Structural scanner for PDU-bearing objects.
//!
//! Walks an arbitrary JSON tree depth-first, in key enumeration order,
//! and collects view, command and message fragments for every object
//! carrying a `pdu` field.

use crate::analysis::json_eq;
use crate::models::{Action, PduRecord};
use serde_json::{json, Map, Value};
use tracing::{debug, trace};

/// PDU records keyed by identifier, in first-discovery order.
#[derive(Debug, Default)]
pub struct PduMap {
    records: Vec<PduRecord>,
}

impl PduMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered identifiers.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if no identifier has been registered.
    #[allow(dead_code)] // Pairs with len()
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Look up the record for an identifier.
    #[allow(dead_code)] // Lookup used by tests
    pub fn get(&self, pdu: &Value) -> Option<&PduRecord> {
        self.records.iter().find(|r| json_eq(&r.pdu, pdu))
    }

    /// Get the record for an identifier, creating it on first use.
    fn entry(&mut self, pdu: &Value) -> &mut PduRecord {
        let index = match self.records.iter().position(|r| json_eq(&r.pdu, pdu)) {
            Some(index) => index,
            None => {
                debug!("New PDU discovered: {}", pdu);
                self.records.push(PduRecord::new(pdu.clone()));
                self.records.len() - 1
            }
        };
        &mut self.records[index]
    }

    /// Append a view fragment.
    pub fn add_view(&mut self, pdu: &Value, view: Value) {
        self.entry(pdu).views.push(view);
    }

    /// Append a command fragment.
    pub fn add_command(&mut self, pdu: &Value, command: Value) {
        self.entry(pdu).commands.push(command);
    }

    /// Append a message fragment.
    pub fn add_message(&mut self, pdu: &Value, message: Value) {
        self.entry(pdu).messages.push(message);
    }

    /// Consume the map, yielding records in discovery order.
    pub fn into_records(self) -> Vec<PduRecord> {
        self.records
    }
}

/// Scan a configuration document and collect fragments per PDU.
///
/// The walk is pre-order, children left to right, and uses a heap stack
/// so nesting depth is bounded only by memory.
pub fn scan(document: &Value) -> PduMap {
    let mut pdus = PduMap::new();
    let mut pending = vec![document];

    while let Some(value) = pending.pop() {
        match value {
            Value::Array(items) => pending.extend(items.iter().rev()),
            Value::Object(object) => {
                if let Some(pdu) = object.get("pdu") {
                    collect_fragments(pdu, object, &mut pdus);
                }
                pending.extend(object.values().rev());
            }
            _ => {}
        }
    }

    debug!("Scan complete: {} PDUs", pdus.len());
    pdus
}

/// Apply the four independent fragment checks to one `pdu` object.
///
/// Records are only created when a fragment is actually added.
fn collect_fragments(pdu: &Value, object: &Map<String, Value>, pdus: &mut PduMap) {
    if pdu.is_null() {
        trace!("Skipping object with null pdu");
        return;
    }

    let view = object.get("view");
    let action = object.get("action").and_then(Action::from_value);

    if let Some(view) = view {
        pdus.add_view(pdu, view.clone());
    }

    if let (Some(Action::Write), Some(view)) = (action, view) {
        pdus.add_command(pdu, view.clone());
    }

    let item_data = object.get("item").zip(object.get("data"));
    if let Some((item, data)) = item_data {
        pdus.add_command(pdu, json!({ "item": item, "data": data }));
    }

    if let Some(action) = action {
        pdus.add_message(pdu, action.message());
    }

    if view.is_none() && action.is_none() && item_data.is_none() {
        trace!("PDU {} object has no recognised companion fields", pdu);
    }
}
