// src/plan.rs
//! Commit planning: resolve `HEAD` once and group requests by commit.

use crate::error::Result;
use crate::repo::Repository;
use crate::types::{CommitRef, MetricRequest, HEAD};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info};

/// Requests scheduled for one concrete commit.
#[derive(Debug, Clone)]
pub struct BatchEntry {
    pub commit: String,
    pub requests: Vec<Arc<MetricRequest>>,
}

/// Requests grouped by commit, in the order commits were first referenced.
#[derive(Debug, Clone, Default)]
pub struct CommitBatch {
    entries: Vec<BatchEntry>,
    index: HashMap<String, usize>,
}

impl CommitBatch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `request` at `commit`; a request is listed at most once per commit.
    pub fn push(&mut self, commit: &str, request: &Arc<MetricRequest>) {
        let slot = match self.index.get(commit) {
            Some(&i) => i,
            None => {
                self.index.insert(commit.to_string(), self.entries.len());
                self.entries.push(BatchEntry {
                    commit: commit.to_string(),
                    requests: Vec::new(),
                });
                self.entries.len() - 1
            }
        };
        let requests = &mut self.entries[slot].requests;
        if !requests.iter().any(|r| Arc::ptr_eq(r, request)) {
            requests.push(Arc::clone(request));
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BatchEntry> {
        self.entries.iter()
    }

    /// Commit hashes in processing order.
    #[must_use]
    pub fn commits(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.commit.as_str()).collect()
    }

    #[must_use]
    pub fn get(&self, commit: &str) -> Option<&BatchEntry> {
        self.index.get(commit).map(|&i| &self.entries[i])
    }

    /// Drops the listed commits, keeping the order of the rest.
    #[must_use]
    pub fn without(self, done: &HashSet<String>) -> Self {
        let mut kept = Self::new();
        for entry in self.entries {
            if done.contains(&entry.commit) {
                continue;
            }
            kept.index.insert(entry.commit.clone(), kept.entries.len());
            kept.entries.push(entry);
        }
        kept
    }
}

impl IntoIterator for CommitBatch {
    type Item = BatchEntry;
    type IntoIter = std::vec::IntoIter<BatchEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Plans `requests` against `repo`, querying its head only if needed.
///
/// # Errors
/// Returns `Resolution` if `HEAD` is referenced and cannot be resolved.
pub fn plan<R: Repository + ?Sized>(requests: &[MetricRequest], repo: &R) -> Result<CommitBatch> {
    plan_with(requests, || repo.head_hash())
}

/// Plans `requests`, calling `resolve_head` at most once.
///
/// # Errors
/// Returns the error of `resolve_head`.
pub fn plan_with<F>(requests: &[MetricRequest], resolve_head: F) -> Result<CommitBatch>
where
    F: FnOnce() -> Result<String>,
{
    let head = if requests.iter().any(MetricRequest::references_head) {
        let hash = resolve_head()?;
        info!(head = %hash, "resolved HEAD");
        Some(hash)
    } else {
        None
    };

    let mut batch = CommitBatch::new();
    for request in requests {
        let shared = Arc::new(request.clone());
        for commit in &request.commits {
            let hash = match commit {
                CommitRef::Hash(h) => h.as_str(),
                CommitRef::Head => head.as_deref().unwrap_or(HEAD),
            };
            batch.push(hash, &shared);
        }
    }
    debug!(commits = batch.len(), requests = requests.len(), "planned batch");
    Ok(batch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StrataError;
    use crate::types::Analysis;
    use std::cell::Cell;

    fn request(name: &str, commits: &[&str]) -> MetricRequest {
        MetricRequest::new(
            name,
            Analysis::FileCount {
                extension: "swift".into(),
                exclude: Vec::new(),
            },
            commits.iter().map(|c| CommitRef::from(*c)).collect(),
        )
    }

    #[test]
    fn first_seen_order() {
        let batch = plan_with(
            &[request("a", &["c2", "c1"]), request("b", &["c2", "c3"])],
            || unreachable!(),
        )
        .unwrap();
        assert_eq!(batch.commits(), vec!["c2", "c1", "c3"]);
        let names: Vec<&str> = batch.get("c2").unwrap().requests.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn head_resolved_once_and_shared() {
        let calls = Cell::new(0);
        let batch = plan_with(&[request("a", &["HEAD"]), request("b", &["x", "HEAD"])], || {
            calls.set(calls.get() + 1);
            Ok("deadbeef".to_string())
        })
        .unwrap();
        assert_eq!(calls.get(), 1);
        assert_eq!(batch.commits(), vec!["deadbeef", "x"]);
        assert_eq!(batch.get("deadbeef").unwrap().requests.len(), 2);
    }

    #[test]
    fn head_alias_of_explicit_hash_does_not_duplicate() {
        let batch = plan_with(&[request("a", &["abc", "HEAD"])], || Ok("abc".into())).unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch.get("abc").unwrap().requests.len(), 1);
    }

    #[test]
    fn head_failure_is_resolution_error() {
        let err = plan_with(&[request("a", &["HEAD"])], || {
            Err(StrataError::Resolution {
                reference: "HEAD".into(),
                reason: "detached nothing".into(),
            })
        })
        .unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn empty_requests_give_empty_batch() {
        assert!(plan_with(&[], || unreachable!()).unwrap().is_empty());
    }

    #[test]
    fn without_keeps_order() {
        let batch = plan_with(&[request("a", &["c1", "c2", "c3"])], || unreachable!()).unwrap();
        let done = HashSet::from(["c2".to_string()]);
        let rest = batch.without(&done);
        assert_eq!(rest.commits(), vec!["c1", "c3"]);
        assert!(rest.get("c3").is_some());
    }
}
