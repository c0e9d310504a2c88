//! Shared helpers for CLI specs

use assert_cmd::Command;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Five nodes, every pair of quorums sharing a member
pub const FIVE_NODE_LEGACY: &str = "\
# nodes delay cs requests
5 20 10 3
1 127.0.0.1 7001
2 127.0.0.1 7002
3 127.0.0.1 7003
4 127.0.0.1 7004
5 127.0.0.1 7005
1 2 3
1 2 4
1 3 5
2 4 5
3 4 5
";

pub const TWO_NODE_TOML: &str = r#"
[timing]
mean_inter_request_delay = "20ms"
mean_cs_execution = "10ms"
requests_per_node = 3

[[nodes]]
id = 1
host = "127.0.0.1"
port = 7001
quorum = [1, 2]

[[nodes]]
id = 2
host = "127.0.0.1"
port = 7002
quorum = [2, 1]
"#;

/// Path to a workspace binary, building it on first use
fn bin(name: &str, package: &str) -> PathBuf {
    static BUILT: OnceLock<()> = OnceLock::new();
    let path = assert_cmd::cargo::cargo_bin(name);
    if !path.exists() {
        BUILT.get_or_init(|| {
            let cargo = std::env::var("CARGO").unwrap_or_else(|_| "cargo".to_string());
            let status = std::process::Command::new(cargo)
                .args(["build", "-p", package, "--bin", name])
                .status()
                .expect("failed to run cargo build");
            assert!(status.success(), "building {} failed", name);
        });
    }
    path
}

/// A scratch directory to run the CLI in
pub struct Project {
    dir: tempfile::TempDir,
}

impl Project {
    pub fn empty() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write a file relative to the project root, creating parent dirs
    pub fn file(&self, rel: &str, content: &str) -> &Self {
        let path = self.dir.path().join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
        self
    }

    pub fn mkw(&self) -> Run {
        let mut cmd = Command::new(bin("mkw", "mkw"));
        cmd.current_dir(self.dir.path()).env_remove("MKW_LOG");
        Run { cmd }
    }
}

pub struct Run {
    cmd: Command,
}

impl Run {
    pub fn args(mut self, args: &[&str]) -> Self {
        self.cmd.args(args);
        self
    }

    /// Run and require exit code 0
    pub fn passes(mut self) -> Output {
        let output = self.cmd.output().unwrap();
        let out = Output::from(output);
        assert!(out.success, "expected success\n{}", out);
        out
    }

    /// Run and require a non-zero exit code
    pub fn fails(mut self) -> Output {
        let output = self.cmd.output().unwrap();
        let out = Output::from(output);
        assert!(!out.success, "expected failure\n{}", out);
        out
    }
}

pub struct Output {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl From<std::process::Output> for Output {
    fn from(output: std::process::Output) -> Self {
        Self {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

impl std::fmt::Display for Output {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "--- stdout ---\n{}--- stderr ---\n{}", self.stdout, self.stderr)
    }
}

impl Output {
    pub fn stdout_has(&self, needle: &str) -> &Self {
        assert!(self.stdout.contains(needle), "stdout missing {:?}\n{}", needle, self);
        self
    }

    pub fn stderr_has(&self, needle: &str) -> &Self {
        assert!(self.stderr.contains(needle), "stderr missing {:?}\n{}", needle, self);
        self
    }

    pub fn stdout_eq(&self, expected: &str) -> &Self {
        similar_asserts::assert_eq!(self.stdout.trim_end(), expected.trim_end());
        self
    }

    pub fn stdout_json(&self) -> serde_json::Value {
        serde_json::from_str(&self.stdout).unwrap()
    }
}
