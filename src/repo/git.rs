// src/repo/git.rs
use super::Repository;
use crate::error::{Result, StrataError};
use crate::process;
use crate::types::{CommandResult, HEAD};
use chrono::{DateTime, TimeZone, Utc};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// A working tree driven through the `git` command-line client.
#[derive(Debug, Clone)]
pub struct GitRepository {
    root: PathBuf,
    git: String,
}

impl GitRepository {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, git: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            git: git.into(),
        }
    }

    /// Checks if `root` is inside a git work tree.
    #[must_use]
    pub fn is_repository(&self) -> bool {
        self.git(&["rev-parse", "--is-inside-work-tree"])
            .map(|o| o.passed())
            .unwrap_or(false)
    }

    fn git(&self, args: &[&str]) -> Result<CommandResult> {
        process::run(&self.git, args, &self.root)
    }

    fn run_git(&self, args: &[&str]) -> std::result::Result<CommandResult, String> {
        match self.git(args) {
            Ok(out) if out.passed() => Ok(out),
            Ok(out) => Err(format!("git {} failed: {}", args.join(" "), out.stderr().trim())),
            Err(e) => Err(e.to_string()),
        }
    }
}

impl Repository for GitRepository {
    fn root(&self) -> &Path {
        &self.root
    }

    fn head_hash(&self) -> Result<String> {
        let out = self
            .run_git(&["rev-parse", "--verify", "HEAD^{commit}"])
            .map_err(|reason| StrataError::Resolution {
                reference: HEAD.to_string(),
                reason,
            })?;
        let hash = out.stdout().trim().to_string();
        if hash.is_empty() {
            return Err(StrataError::Resolution {
                reference: HEAD.to_string(),
                reason: "git printed no hash".to_string(),
            });
        }
        Ok(hash)
    }

    fn checkout(&mut self, commit: &str) -> Result<()> {
        info!(commit, "checking out");
        self.run_git(&["checkout", "--force", "--quiet", "--detach", commit])
            .map(drop)
            .map_err(|reason| StrataError::Checkout {
                commit: commit.to_string(),
                reason,
            })
    }

    fn current_branch(&self) -> Result<Option<String>> {
        // Exit status 1 with no output means a detached HEAD.
        let out = self.git(&["symbolic-ref", "-q", "--short", "HEAD"])?;
        let branch = out.stdout().trim();
        if out.passed() && !branch.is_empty() {
            Ok(Some(branch.to_string()))
        } else {
            Ok(None)
        }
    }

    fn switch_branch(&mut self, branch: &str) -> Result<()> {
        info!(branch, "switching back to branch");
        self.run_git(&["checkout", "--force", "--quiet", branch])
            .map(drop)
            .map_err(|reason| StrataError::Checkout {
                commit: branch.to_string(),
                reason,
            })
    }

    fn reset_and_clean(&mut self) -> Result<()> {
        self.run_git(&["reset", "--hard", "--quiet"])
            .map_err(|reason| StrataError::Reset { reason })?;
        self.run_git(&["clean", "-ffdx", "--quiet"])
            .map_err(|reason| StrataError::Reset { reason })?;
        Ok(())
    }

    fn repair_large_file_pointers(&mut self) -> Result<()> {
        // Files committed as content although LFS tracks them show up as
        // permanently modified; re-indexing from scratch settles them.
        let status = self
            .run_git(&["status", "--porcelain"])
            .map_err(|reason| StrataError::Repair {
                step: "large_file_pointers",
                reason,
            })?;
        if status.stdout().trim().is_empty() {
            return Ok(());
        }
        debug!("working tree dirty after checkout, re-indexing");
        for args in [
            &["rm", "--cached", "-r", "-q", "."][..],
            &["reset", "--hard", "--quiet"][..],
        ] {
            self.run_git(args).map_err(|reason| StrataError::Repair {
                step: "large_file_pointers",
                reason,
            })?;
        }
        Ok(())
    }

    fn sync_submodules(&mut self) -> Result<()> {
        for args in [
            &["submodule", "sync", "--recursive", "--quiet"][..],
            &["submodule", "update", "--init", "--recursive", "--force", "--quiet"][..],
        ] {
            self.run_git(args).map_err(|reason| StrataError::Repair {
                step: "submodules",
                reason,
            })?;
        }
        Ok(())
    }

    fn commit_time(&self, commit: &str) -> Result<DateTime<Utc>> {
        let out = self
            .run_git(&["show", "-s", "--format=%ct", commit])
            .map_err(StrataError::Analysis)?;
        parse_epoch(out.stdout())
    }
}

fn parse_epoch(raw: &str) -> Result<DateTime<Utc>> {
    let secs: i64 = raw
        .trim()
        .parse()
        .map_err(|_| StrataError::malformed("git show", format!("not a timestamp: {raw:?}")))?;
    Utc.timestamp_opt(secs, 0)
        .single()
        .ok_or_else(|| StrataError::malformed("git show", format!("timestamp out of range: {secs}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn epoch_parses_with_newline() {
        let t = parse_epoch("1700000000\n").unwrap();
        assert_eq!(t.timestamp(), 1_700_000_000);
    }

    #[test]
    fn epoch_rejects_garbage() {
        assert!(matches!(
            parse_epoch("yesterday"),
            Err(StrataError::MalformedOutput { .. })
        ));
    }

    fn git_available() -> bool {
        std::process::Command::new("git")
            .arg("--version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    fn commit_all(dir: &Path, message: &str) {
        for args in [
            vec!["add", "-A"],
            vec![
                "-c",
                "user.name=strata",
                "-c",
                "user.email=strata@example.invalid",
                "commit",
                "-q",
                "-m",
                message,
            ],
        ] {
            let ok = std::process::Command::new("git")
                .args(&args)
                .current_dir(dir)
                .status()
                .map(|s| s.success())
                .unwrap_or(false);
            assert!(ok, "git {args:?} failed");
        }
    }

    #[test]
    fn head_resolution_and_checkout_roundtrip() {
        if !git_available() {
            return;
        }
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        assert!(std::process::Command::new("git")
            .args(["init", "-q"])
            .current_dir(root)
            .status()
            .unwrap()
            .success());

        fs::write(root.join("a.swift"), "class A {}\n").unwrap();
        commit_all(root, "first");
        let mut repo = GitRepository::new(root, "git");
        assert!(repo.is_repository());
        let first = repo.head_hash().unwrap();

        fs::write(root.join("b.swift"), "class B {}\n").unwrap();
        commit_all(root, "second");
        let second = repo.head_hash().unwrap();
        assert_ne!(first, second);

        fs::write(root.join("junk.tmp"), "x").unwrap();
        repo.reset_and_clean().unwrap();
        assert!(!root.join("junk.tmp").exists());

        repo.checkout(&first).unwrap();
        assert!(!root.join("b.swift").exists());
        assert_eq!(repo.head_hash().unwrap(), first);
        assert!(repo.commit_time(&first).is_ok());
    }

    #[test]
    fn branch_is_reported_and_restored() {
        if !git_available() {
            return;
        }
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        assert!(std::process::Command::new("git")
            .args(["init", "-q"])
            .current_dir(root)
            .status()
            .unwrap()
            .success());
        fs::write(root.join("a.swift"), "class A {}\n").unwrap();
        commit_all(root, "first");
        assert!(std::process::Command::new("git")
            .args(["checkout", "-q", "-b", "trunk"])
            .current_dir(root)
            .status()
            .unwrap()
            .success());

        let mut repo = GitRepository::new(root, "git");
        assert_eq!(repo.current_branch().unwrap().as_deref(), Some("trunk"));

        let head = repo.head_hash().unwrap();
        repo.checkout(&head).unwrap();
        assert_eq!(repo.current_branch().unwrap(), None);

        repo.switch_branch("trunk").unwrap();
        assert_eq!(repo.current_branch().unwrap().as_deref(), Some("trunk"));
    }

    #[test]
    fn head_of_empty_repository_fails_resolution() {
        if !git_available() {
            return;
        }
        let dir = TempDir::new().unwrap();
        assert!(std::process::Command::new("git")
            .args(["init", "-q"])
            .current_dir(dir.path())
            .status()
            .unwrap()
            .success());
        let repo = GitRepository::new(dir.path(), "git");
        assert!(matches!(
            repo.head_hash(),
            Err(StrataError::Resolution { .. })
        ));
    }
}
