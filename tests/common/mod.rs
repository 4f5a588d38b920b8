// tests/common/mod.rs
//! A repository double that materialises a fixed tree per commit.

#![allow(dead_code)]

use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};
use strata_core::error::{Result, StrataError};
use strata_core::repo::Repository;
use tempfile::TempDir;

type Hook = Box<dyn Fn(&str) + Send>;

pub struct FakeRepository {
    dir: TempDir,
    head: Option<String>,
    trees: HashMap<String, Vec<(String, String)>>,
    fail_checkout: HashSet<String>,
    fail_repair: bool,
    fail_reset: bool,
    branch: Option<String>,
    on_checkout: Option<Hook>,
    submodule_syncs: Arc<Mutex<usize>>,
    branch_switches: Arc<Mutex<Vec<String>>>,
    checkouts: Arc<Mutex<Vec<String>>>,
    head_queries: Arc<Mutex<usize>>,
}

impl FakeRepository {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("tempdir"),
            head: None,
            trees: HashMap::new(),
            fail_checkout: HashSet::new(),
            fail_repair: false,
            fail_reset: false,
            branch: None,
            on_checkout: None,
            submodule_syncs: Arc::new(Mutex::new(0)),
            branch_switches: Arc::new(Mutex::new(Vec::new())),
            checkouts: Arc::new(Mutex::new(Vec::new())),
            head_queries: Arc::new(Mutex::new(0)),
        }
    }

    /// Adds a commit; the most recently added commit is `HEAD`.
    pub fn commit(mut self, hash: &str, files: &[(&str, &str)]) -> Self {
        let files = files
            .iter()
            .map(|(p, c)| ((*p).to_string(), (*c).to_string()))
            .collect();
        self.trees.insert(hash.to_string(), files);
        self.head = Some(hash.to_string());
        self
    }

    pub fn head(mut self, hash: &str) -> Self {
        self.head = Some(hash.to_string());
        self
    }

    pub fn without_head(mut self) -> Self {
        self.head = None;
        self
    }

    pub fn failing_checkout(mut self, hash: &str) -> Self {
        self.fail_checkout.insert(hash.to_string());
        self
    }

    pub fn failing_repair(mut self) -> Self {
        self.fail_repair = true;
        self
    }

    pub fn failing_reset(mut self) -> Self {
        self.fail_reset = true;
        self
    }

    /// Starts out on `name`, pointing at the current head.
    pub fn on_branch(mut self, name: &str) -> Self {
        self.branch = Some(name.to_string());
        self
    }

    pub fn on_checkout(mut self, hook: impl Fn(&str) + Send + 'static) -> Self {
        self.on_checkout = Some(Box::new(hook));
        self
    }

    /// Shared log of successful checkouts, readable after the repo is moved.
    pub fn checkouts(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.checkouts)
    }

    pub fn submodule_syncs(&self) -> Arc<Mutex<usize>> {
        Arc::clone(&self.submodule_syncs)
    }

    pub fn branch_switches(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.branch_switches)
    }

    pub fn head_queries(&self) -> Arc<Mutex<usize>> {
        Arc::clone(&self.head_queries)
    }

    fn materialise(&self, files: &[(String, String)]) -> std::io::Result<()> {
        let root = self.dir.path();
        for entry in fs::read_dir(root)? {
            let path = entry?.path();
            if path.is_dir() {
                fs::remove_dir_all(&path)?;
            } else {
                fs::remove_file(&path)?;
            }
        }
        for (rel, content) in files {
            let path = root.join(rel);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, content)?;
        }
        Ok(())
    }
}

impl Repository for FakeRepository {
    fn root(&self) -> &Path {
        self.dir.path()
    }

    fn head_hash(&self) -> Result<String> {
        *self.head_queries.lock().expect("lock") += 1;
        self.head.clone().ok_or_else(|| StrataError::Resolution {
            reference: "HEAD".into(),
            reason: "repository has no commits".into(),
        })
    }

    fn current_branch(&self) -> Result<Option<String>> {
        Ok(self.branch.clone())
    }

    fn switch_branch(&mut self, branch: &str) -> Result<()> {
        self.branch_switches.lock().expect("lock").push(branch.to_string());
        self.branch = Some(branch.to_string());
        Ok(())
    }

    fn checkout(&mut self, commit: &str) -> Result<()> {
        let failure = |reason: &str| StrataError::Checkout {
            commit: commit.to_string(),
            reason: reason.to_string(),
        };
        if self.fail_checkout.contains(commit) {
            return Err(failure("simulated checkout failure"));
        }
        let files = self
            .trees
            .get(commit)
            .cloned()
            .ok_or_else(|| failure("unknown revision"))?;
        self.materialise(&files)
            .map_err(|e| failure(&e.to_string()))?;
        self.checkouts.lock().expect("lock").push(commit.to_string());
        self.branch = None;
        if let Some(hook) = &self.on_checkout {
            hook(commit);
        }
        Ok(())
    }

    fn reset_and_clean(&mut self) -> Result<()> {
        if self.fail_reset {
            return Err(StrataError::Reset {
                reason: "simulated reset failure".into(),
            });
        }
        Ok(())
    }

    fn repair_large_file_pointers(&mut self) -> Result<()> {
        if self.fail_repair {
            return Err(StrataError::Repair {
                step: "large-file pointers",
                reason: "simulated repair failure".into(),
            });
        }
        Ok(())
    }

    fn sync_submodules(&mut self) -> Result<()> {
        *self.submodule_syncs.lock().expect("lock") += 1;
        Ok(())
    }

    fn commit_time(&self, _commit: &str) -> Result<DateTime<Utc>> {
        DateTime::from_timestamp(1_700_000_000, 0)
            .ok_or_else(|| StrataError::Analysis("bad timestamp".into()))
    }
}

pub fn swift_files(commits: &[&str]) -> strata_core::types::MetricRequest {
    strata_core::types::MetricRequest::new(
        "swift-files",
        strata_core::types::Analysis::FileCount {
            extension: "swift".into(),
            exclude: Vec::new(),
        },
        commits.iter().map(|c| (*c).into()).collect(),
    )
}
