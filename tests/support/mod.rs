#![allow(dead_code)]

use anyhow::{Context, Result, bail};
use modelreg::{Distribution, FsScanner, Registry, RootScanner, ScanWarning};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;

/// Temporary directory acting as the working directory for one test.
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("failed to allocate workspace"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `body` to `<rel_dir>/MODELS`, creating the directory.
    pub fn write_modelfile(&self, rel_dir: &str, body: &str) -> PathBuf {
        let dir = self.path().join(rel_dir);
        fs::create_dir_all(&dir).expect("failed to create model dir");
        let path = dir.join("MODELS");
        fs::write(&path, body).expect("failed to write MODELS");
        path
    }

    pub fn mkdir(&self, rel_dir: &str) -> PathBuf {
        let dir = self.path().join(rel_dir);
        fs::create_dir_all(&dir).expect("failed to create dir");
        dir
    }

    /// Install a fake package under `site`: each `(path, body)` is written
    /// relative to the site root and listed in the package's RECORD.
    pub fn write_package(&self, site: &str, project: &str, version: &str, files: &[(&str, &str)]) -> PathBuf {
        let root = self.mkdir(site);
        let meta = root.join(format!("{project}-{version}.dist-info"));
        fs::create_dir_all(&meta).expect("failed to create dist-info");
        let mut record = String::new();
        for (rel, body) in files {
            let path = root.join(rel);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).expect("failed to create package dir");
            }
            fs::write(&path, body).expect("failed to write package file");
            record.push_str(&format!("{rel},sha256=fixture,{}\n", body.len()));
        }
        record.push_str(&format!("{project}-{version}.dist-info/RECORD,,\n"));
        fs::write(meta.join("RECORD"), record).expect("failed to write RECORD");
        meta
    }

    pub fn registry(&self) -> Registry {
        Registry::new(FsScanner::new(self.path()))
    }

    pub fn counting_registry(&self) -> (Registry, Arc<AtomicUsize>) {
        let scans = Arc::new(AtomicUsize::new(0));
        let scanner = CountingScanner {
            inner: FsScanner::new(self.path()),
            scans: Arc::clone(&scans),
        };
        (Registry::new(scanner), scans)
    }
}

/// Filesystem scanner that counts how many roots it was asked to scan.
pub struct CountingScanner {
    inner: FsScanner,
    scans: Arc<AtomicUsize>,
}

impl RootScanner for CountingScanner {
    fn scan(&self, root: &str, warnings: &mut Vec<ScanWarning>) -> Vec<Arc<Distribution>> {
        self.scans.fetch_add(1, Ordering::SeqCst);
        self.inner.scan(root, warnings)
    }
}

pub fn fullnames<T>(entries: &[(String, T)]) -> Vec<&str> {
    entries.iter().map(|(name, _)| name.as_str()).collect()
}

/// Run the `modelreg` binary inside `workspace` with a clean environment.
pub fn modelreg(workspace: &Workspace, args: &[&str]) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_modelreg"));
    cmd.args(args)
        .current_dir(workspace.path())
        .env_remove("MODELREG_PATH")
        .env("MODELREG_BASE_DIR", workspace.path());
    cmd
}

pub fn run_command(mut cmd: Command) -> Result<Output> {
    let output = cmd
        .output()
        .with_context(|| format!("failed to run command: {:?}", cmd))?;
    if output.status.success() {
        Ok(output)
    } else {
        bail!(
            "command {:?} failed: status {:?}\nstdout: {}\nstderr: {}",
            cmd,
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        )
    }
}
