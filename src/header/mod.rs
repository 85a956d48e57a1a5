//! C++ PDU map header generation.
//!
//! Derives a register table from the flattened report so the ESPHome
//! component can decode values without parsing JSON on the device.

use crate::analysis::is_truthy;
use crate::models::{PduRecord, Report};
use anyhow::{Context, Result};
use serde_json::Value;
use std::path::Path;
use tracing::{info, warn};

/// Value encoding of a register, matching `ImmergasPduType` in the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PduType {
    Unknown = 0,
    U16 = 1,
    S16 = 2,
    U8 = 3,
    Temp = 4,
    LbFlag8 = 5,
}

/// One row of the generated `immergas_pdu_map` table.
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderEntry {
    pub pdu: u16,
    pub reg: u16,
    pub count: u8,
    pub kind: PduType,
    pub scale: f64,
    pub writable: bool,
}

/// Detect the value type, register count and scale of a view.
///
/// Only object views with a non-empty `return` array carry type
/// information; everything else is unknown.
pub fn detect_type(view: &Value) -> (PduType, u8, f64) {
    let unknown = (PduType::Unknown, 1, 1.0);

    let Some(first) = view
        .get("return")
        .and_then(Value::as_array)
        .and_then(|ret| ret.first())
        .and_then(Value::as_str)
    else {
        return unknown;
    };

    match first {
        "u16" => (PduType::U16, 1, 1.0),
        "s16" => (PduType::S16, 1, 1.0),
        "u8" => (PduType::U8, 1, 1.0),
        "temp" => {
            let scale = match view.get("decimal").and_then(Value::as_i64) {
                Some(dec) if dec > 0 => i32::try_from(dec).map_or(0.0, |d| 10f64.powi(-d)),
                _ => 1.0,
            };
            (PduType::Temp, 1, scale)
        }
        "LB" => (PduType::LbFlag8, 1, 1.0),
        _ => unknown,
    }
}

fn has_return(view: &Value) -> bool {
    view.get("return").is_some_and(is_truthy)
}

/// Interpret a PDU identifier as a register number.
fn register_number(pdu: &Value) -> Option<u16> {
    match pdu {
        Value::Number(n) => n.as_u64().and_then(|n| u16::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn header_entry(record: &PduRecord) -> Option<HeaderEntry> {
    let Some(reg) = register_number(&record.pdu) else {
        warn!("Skipping PDU {} in header: not a register number", record.pdu);
        return None;
    };

    let typed_view = record
        .views
        .iter()
        .find(|v| has_return(v))
        .or_else(|| record.views.first());

    let (kind, count, scale) = typed_view.map_or((PduType::Unknown, 1, 1.0), detect_type);

    Some(HeaderEntry {
        pdu: reg,
        reg,
        count,
        kind,
        scale,
        writable: record.is_writable(),
    })
}

/// Build header rows for every numeric PDU, sorted by register.
pub fn header_entries(report: &Report) -> Vec<HeaderEntry> {
    let mut entries: Vec<HeaderEntry> = report.pdus.iter().filter_map(header_entry).collect();
    entries.sort_by_key(|e| e.reg);
    entries
}

/// Render the C++ header source.
pub fn render_header(entries: &[HeaderEntry]) -> String {
    let mut lines: Vec<String> = vec![
        "#pragma once".to_string(),
        "#include <cstdint>".to_string(),
        "namespace esphome { namespace immergas_modbus {".to_string(),
        "enum ImmergasPduType : uint8_t { IM_PDU_UNKNOWN=0, IM_PDU_U16=1, IM_PDU_S16=2, IM_PDU_U8=3, IM_PDU_TEMP=4, IM_PDU_LB_FLAG8=5, IM_PDU_U32=6, IM_PDU_S32=7, IM_PDU_FLOAT32=8 };\n".to_string(),
        "struct ImmergasPduEntry { uint16_t pdu; uint16_t reg_addr; uint8_t count; uint8_t type; float scale; bool writable; const char *label; };\n".to_string(),
        "static const ImmergasPduEntry immergas_pdu_map[] = {".to_string(),
    ];

    for e in entries {
        lines.push(format!(
            "    {{ {}, {}, {}, {}, {:.6}f, {}, \"\" }},",
            e.pdu, e.reg, e.count, e.kind as u8, e.scale, e.writable
        ));
    }

    lines.push("};".to_string());
    lines.push(
        "static const size_t immergas_pdu_map_len = sizeof(immergas_pdu_map)/sizeof(immergas_pdu_map[0]);"
            .to_string(),
    );
    lines.push("}} // namespace esphome::immergas_modbus".to_string());

    let mut header = lines.join("\n");
    header.push('\n');
    header
}

/// Generate the header for a report and write it to `path`.
pub fn write_header(report: &Report, path: &Path) -> Result<usize> {
    let entries = header_entries(report);

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create header directory: {}", parent.display()))?;
    }

    std::fs::write(path, render_header(&entries))
        .with_context(|| format!("Failed to write header: {}", path.display()))?;

    info!("Header has {} entries", entries.len());
    Ok(entries.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LabelSummary;
    use chrono::Utc;
    use serde_json::json;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn record(pdu: Value, views: Vec<Value>, messages: Vec<Value>) -> PduRecord {
        PduRecord {
            pdu,
            views,
            commands: Vec::new(),
            messages,
        }
    }

    fn report(pdus: Vec<PduRecord>) -> Report {
        Report {
            generated_at: Utc::now(),
            source_cfg: PathBuf::from("/cfg.json"),
            source_lbl: PathBuf::from("/lbl.json"),
            pdus,
            lbl_summary: LabelSummary::default(),
        }
    }

    #[test]
    fn test_detect_type() {
        assert_eq!(detect_type(&json!({"return": ["u16"]})), (PduType::U16, 1, 1.0));
        assert_eq!(detect_type(&json!({"return": ["s16", "x"]})), (PduType::S16, 1, 1.0));
        assert_eq!(detect_type(&json!({"return": ["u8"]})), (PduType::U8, 1, 1.0));
        assert_eq!(detect_type(&json!({"return": ["LB"]})), (PduType::LbFlag8, 1, 1.0));
        assert_eq!(detect_type(&json!({"return": ["f32"]})).0, PduType::Unknown);
        assert_eq!(detect_type(&json!({"return": "u16"})).0, PduType::Unknown);
        assert_eq!(detect_type(&json!({"return": []})).0, PduType::Unknown);
        assert_eq!(detect_type(&json!("plain view")).0, PduType::Unknown);
    }

    #[test]
    fn test_detect_temp_scale() {
        let (kind, _, scale) = detect_type(&json!({"return": ["temp"], "decimal": 1}));
        assert_eq!(kind, PduType::Temp);
        assert!((scale - 0.1).abs() < 1e-12);

        let (_, _, scale) = detect_type(&json!({"return": ["temp"], "decimal": 0}));
        assert_eq!(scale, 1.0);

        let (_, _, scale) = detect_type(&json!({"return": ["temp"], "decimal": "2"}));
        assert_eq!(scale, 1.0);
    }

    #[test]
    fn test_register_number() {
        assert_eq!(register_number(&json!(2001)), Some(2001));
        assert_eq!(register_number(&json!("42")), Some(42));
        assert_eq!(register_number(&json!(70000)), None);
        assert_eq!(register_number(&json!(-1)), None);
        assert_eq!(register_number(&json!("abc")), None);
        assert_eq!(register_number(&json!(1.5)), None);
    }

    #[test]
    fn test_header_entries_sorted_and_typed() {
        let report = report(vec![
            record(
                json!(300),
                vec![json!("label"), json!({"return": ["temp"], "decimal": 1})],
                vec![json!({"action": "read"})],
            ),
            record(json!("skip-me"), vec![json!({"return": ["u16"]})], Vec::new()),
            record(
                json!(100),
                vec![json!({"name": "no return"})],
                vec![json!({"action": "write"})],
            ),
            record(json!(200), Vec::new(), Vec::new()),
        ]);

        let entries = header_entries(&report);
        let regs: Vec<u16> = entries.iter().map(|e| e.reg).collect();
        assert_eq!(regs, vec![100, 200, 300]);

        assert_eq!(entries[0].kind, PduType::Unknown);
        assert!(entries[0].writable);
        assert_eq!(entries[1].kind, PduType::Unknown);
        assert!(!entries[1].writable);
        assert_eq!(entries[2].kind, PduType::Temp);
        assert!(!entries[2].writable);
    }

    #[test]
    fn test_render_header() {
        let entries = vec![HeaderEntry {
            pdu: 2001,
            reg: 2001,
            count: 1,
            kind: PduType::Temp,
            scale: 0.1,
            writable: true,
        }];

        let header = render_header(&entries);
        assert!(header.starts_with("#pragma once\n#include <cstdint>\n"));
        assert!(header.contains("static const ImmergasPduEntry immergas_pdu_map[] = {"));
        assert!(header.contains("    { 2001, 2001, 1, 4, 0.100000f, true, \"\" },"));
        assert!(header.contains("}} // namespace esphome::immergas_modbus"));
    }

    #[test]
    fn test_write_header_creates_parent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("components").join("immergas_pdus.h");

        let count = write_header(
            &report(vec![record(json!(1), vec![json!({"return": ["u8"]})], Vec::new())]),
            &path,
        )
        .unwrap();

        assert_eq!(count, 1);
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("    { 1, 1, 1, 3, 1.000000f, false, \"\" },"));
    }
}
