#![allow(dead_code)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub struct TestEnv {
    _tmp: TempDir,
    pub root: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let root = tmp.path().to_path_buf();
        Self { _tmp: tmp, root }
    }

    /// Command running in the temp root, isolated from any local config.
    pub fn cmd(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("pdu-extract");
        cmd.current_dir(&self.root)
            .env_remove("PDU_EXTRACT_CFG")
            .env_remove("PDU_EXTRACT_LBL");
        cmd
    }

    pub fn write_json(&self, name: &str, value: &Value) -> PathBuf {
        let path = self.root.join(name);
        fs::write(&path, value.to_string()).expect("write json input");
        path
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Run an extraction of `cfg` with an empty label document.
    pub fn extract_cfg(&self, cfg: Value) -> Value {
        let lbl = serde_json::json!({});
        self.extract(&cfg, &lbl)
    }

    /// Run an extraction without label generation and return the report.
    pub fn extract(&self, cfg: &Value, lbl: &Value) -> Value {
        let cfg_path = self.write_json("cfg.json", cfg);
        let lbl_path = self.write_json("lbl.json", lbl);
        let out = self.path("registers.json");

        self.cmd()
            .arg("--cfg")
            .arg(&cfg_path)
            .arg("--lbl")
            .arg(&lbl_path)
            .arg("-o")
            .arg(&out)
            .arg("--no-labels")
            .assert()
            .success();

        read_json(&out)
    }
}

pub fn read_json(path: &Path) -> Value {
    let content = fs::read_to_string(path).expect("read output");
    serde_json::from_str(&content).expect("valid json output")
}

pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("fixtures")
        .join("dominus")
        .join(name)
}
