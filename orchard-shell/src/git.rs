//! [`Vcs`] backed by the `git` binary.
//!
//! Every invocation uses `git -C <dir>` so no call depends on the process
//! working directory.

use std::path::{Path, PathBuf};
use std::process::Command;

use orchard_core::external::{AddWorktree, Vcs, WorktreeEntry};
use orchard_core::ExternalError;

use crate::command::{capture, probe};

const TOOL: &str = "git";

#[derive(Debug, Clone, Default)]
pub struct GitCli;

impl GitCli {
    pub fn new() -> Self {
        Self
    }

    fn git(dir: &Path) -> Command {
        let mut cmd = Command::new(TOOL);
        cmd.arg("-C").arg(dir);
        cmd
    }
}

impl Vcs for GitCli {
    fn common_dir(&self, dir: &Path) -> Result<PathBuf, ExternalError> {
        let out = capture(
            TOOL,
            "rev-parse",
            Self::git(dir).args(["rev-parse", "--git-common-dir"]),
        )?;
        let common = PathBuf::from(out);
        let absolute = if common.is_absolute() {
            common
        } else {
            dir.join(common)
        };
        Ok(absolute.canonicalize().unwrap_or(absolute))
    }

    fn root_worktree(&self, dir: &Path) -> Result<PathBuf, ExternalError> {
        self.list_worktrees(dir)?
            .into_iter()
            .next()
            .map(|entry| entry.path)
            .ok_or_else(|| ExternalError::new(TOOL, "worktree list", "no worktrees reported"))
    }

    fn list_worktrees(&self, repo: &Path) -> Result<Vec<WorktreeEntry>, ExternalError> {
        let out = capture(
            TOOL,
            "worktree list",
            Self::git(repo).args(["worktree", "list", "--porcelain"]),
        )?;
        Ok(parse_porcelain(&out))
    }

    fn add_worktree(&self, repo: &Path, request: &AddWorktree) -> Result<(), ExternalError> {
        let mut cmd = Self::git(repo);
        cmd.args(["worktree", "add"]);
        if request.create_branch {
            cmd.arg("-b").arg(&request.branch).arg(&request.path);
            if let Some(start) = &request.start_point {
                cmd.arg(start);
            }
        } else {
            cmd.arg(&request.path).arg(&request.branch);
        }
        capture(TOOL, "worktree add", &mut cmd).map(drop)
    }

    fn remove_worktree(&self, repo: &Path, path: &Path, force: bool) -> Result<(), ExternalError> {
        let mut cmd = Self::git(repo);
        cmd.args(["worktree", "remove"]);
        if force {
            cmd.arg("--force");
        }
        cmd.arg(path);
        capture(TOOL, "worktree remove", &mut cmd).map(drop)
    }

    fn move_worktree(&self, repo: &Path, from: &Path, to: &Path) -> Result<(), ExternalError> {
        capture(
            TOOL,
            "worktree move",
            Self::git(repo).args(["worktree", "move"]).arg(from).arg(to),
        )
        .map(drop)
    }

    fn current_branch(&self, dir: &Path) -> Result<String, ExternalError> {
        capture(
            TOOL,
            "rev-parse",
            Self::git(dir).args(["rev-parse", "--abbrev-ref", "HEAD"]),
        )
    }

    fn is_dirty(&self, dir: &Path) -> Result<bool, ExternalError> {
        let out = capture(TOOL, "status", Self::git(dir).args(["status", "--porcelain"]))?;
        Ok(!out.trim().is_empty())
    }

    fn is_merged(&self, repo: &Path, branch: &str, into: &str) -> Result<bool, ExternalError> {
        probe(
            TOOL,
            "merge-base",
            Self::git(repo).args(["merge-base", "--is-ancestor", branch, into]),
        )
    }

    fn branch_exists(&self, repo: &Path, branch: &str) -> Result<bool, ExternalError> {
        let reference = format!("refs/heads/{branch}");
        probe(
            TOOL,
            "show-ref",
            Self::git(repo).args(["show-ref", "--verify", "--quiet", &reference]),
        )
    }

    fn delete_branch(&self, repo: &Path, branch: &str, force: bool) -> Result<(), ExternalError> {
        let flag = if force { "-D" } else { "-d" };
        capture(TOOL, "branch delete", Self::git(repo).args(["branch", flag, branch])).map(drop)
    }

    fn default_branch(&self, repo: &Path) -> Result<String, ExternalError> {
        let remote_head = capture(
            TOOL,
            "symbolic-ref",
            Self::git(repo).args(["symbolic-ref", "--short", "refs/remotes/origin/HEAD"]),
        );
        if let Ok(head) = remote_head {
            if let Some(branch) = head.strip_prefix("origin/") {
                return Ok(branch.to_owned());
            }
        }
        for candidate in ["main", "master"] {
            if self.branch_exists(repo, candidate)? {
                return Ok(candidate.to_owned());
            }
        }
        self.current_branch(repo)
    }

    fn fetch(&self, repo: &Path) -> Result<(), ExternalError> {
        let remotes = capture(TOOL, "remote", Self::git(repo).arg("remote"))?;
        if !remotes.lines().any(|r| r.trim() == "origin") {
            return Err(ExternalError::new(TOOL, "fetch", "no 'origin' remote"));
        }
        capture(TOOL, "fetch", Self::git(repo).args(["fetch", "--quiet", "origin"])).map(drop)
    }
}

/// Parse `git worktree list --porcelain`. Records are separated by blank
/// lines; the first record is the main worktree.
pub fn parse_porcelain(output: &str) -> Vec<WorktreeEntry> {
    let mut entries = Vec::new();
    let mut current: Option<WorktreeEntry> = None;

    for line in output.lines() {
        if let Some(path) = line.strip_prefix("worktree ") {
            entries.extend(current.take());
            current = Some(WorktreeEntry {
                path: PathBuf::from(path),
                branch: None,
                bare: false,
                prunable: false,
            });
        } else if let Some(entry) = current.as_mut() {
            if let Some(reference) = line.strip_prefix("branch ") {
                let short = reference.strip_prefix("refs/heads/").unwrap_or(reference);
                entry.branch = Some(short.to_owned());
            } else if line == "bare" {
                entry.bare = true;
            } else if line == "prunable" || line.starts_with("prunable ") {
                entry.prunable = true;
            } else if line.is_empty() {
                entries.extend(current.take());
            }
        }
    }
    entries.extend(current);
    entries
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
