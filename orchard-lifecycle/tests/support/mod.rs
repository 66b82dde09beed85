//! In-memory collaborators for lifecycle tests.
//!
//! `FakeVcs` mirrors worktree operations onto the real filesystem (create,
//! move and remove directories) so path checks behave as they would with git.

#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use orchard_core::external::{
    AddWorktree, Env, FileSync, ScriptRunner, Sessions, Vcs, WorktreeEntry,
};
use orchard_core::ports::PortProbe;
use orchard_core::ExternalError;
use orchard_lifecycle::{Collaborators, Lifecycle, RepoContext};

// ---------------------------------------------------------------------------
// Version control
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct RepoState {
    pub common: PathBuf,
    /// Linked worktrees (the root is implicit).
    pub worktrees: Vec<(PathBuf, String)>,
    pub branches: BTreeSet<String>,
    pub merged: BTreeSet<String>,
    pub dirty: BTreeSet<PathBuf>,
}

#[derive(Debug, Default)]
pub struct VcsState {
    pub repos: BTreeMap<PathBuf, RepoState>,
    pub fail_move: bool,
    pub fail_remove: bool,
    pub adds: Vec<AddWorktree>,
}

#[derive(Clone, Default)]
pub struct FakeVcs(pub Arc<Mutex<VcsState>>);

fn ext(action: &str, message: impl Into<String>) -> ExternalError {
    ExternalError::new("git", action, message)
}

impl FakeVcs {
    pub fn state(&self) -> std::sync::MutexGuard<'_, VcsState> {
        self.0.lock().unwrap()
    }

    fn root_of(state: &VcsState, dir: &Path) -> Option<PathBuf> {
        state.repos.iter().find_map(|(root, repo)| {
            let inside = dir.starts_with(root)
                || repo.worktrees.iter().any(|(wt, _)| dir.starts_with(wt));
            inside.then(|| root.clone())
        })
    }

    fn with_repo<T>(
        &self,
        dir: &Path,
        action: &str,
        f: impl FnOnce(&mut RepoState, &mut VcsState) -> Result<T, ExternalError>,
    ) -> Result<T, ExternalError> {
        let mut state = self.state();
        let root = Self::root_of(&state, dir)
            .ok_or_else(|| ext(action, format!("not a git repository: {}", dir.display())))?;
        let mut repo = state.repos.remove(&root).unwrap();
        let result = f(&mut repo, &mut *state);
        state.repos.insert(root, repo);
        result
    }

    pub fn worktree_paths(&self, root: &Path) -> Vec<PathBuf> {
        self.state().repos[root]
            .worktrees
            .iter()
            .map(|(p, _)| p.clone())
            .collect()
    }

    pub fn has_branch(&self, root: &Path, branch: &str) -> bool {
        self.state().repos[root].branches.contains(branch)
    }
}

impl Vcs for FakeVcs {
    fn common_dir(&self, dir: &Path) -> Result<PathBuf, ExternalError> {
        self.with_repo(dir, "rev-parse", |repo, _| Ok(repo.common.clone()))
    }

    fn root_worktree(&self, dir: &Path) -> Result<PathBuf, ExternalError> {
        let state = self.state();
        Self::root_of(&state, dir).ok_or_else(|| ext("worktree list", "not a git repository"))
    }

    fn list_worktrees(&self, repo: &Path) -> Result<Vec<WorktreeEntry>, ExternalError> {
        let root = self.root_worktree(repo)?;
        self.with_repo(repo, "worktree list", |state, _| {
            let mut entries = vec![WorktreeEntry {
                path: root.clone(),
                branch: Some("main".into()),
                bare: false,
                prunable: false,
            }];
            entries.extend(state.worktrees.iter().map(|(path, branch)| WorktreeEntry {
                path: path.clone(),
                branch: Some(branch.clone()),
                bare: false,
                prunable: false,
            }));
            Ok(entries)
        })
    }

    fn add_worktree(&self, repo: &Path, request: &AddWorktree) -> Result<(), ExternalError> {
        self.with_repo(repo, "worktree add", |state, vcs| {
            if request.create_branch && !state.branches.insert(request.branch.clone()) {
                return Err(ext("worktree add", "branch already exists"));
            }
            std::fs::create_dir_all(&request.path).map_err(|e| ext("worktree add", e.to_string()))?;
            state
                .worktrees
                .push((request.path.clone(), request.branch.clone()));
            vcs.adds.push(request.clone());
            Ok(())
        })
    }

    fn remove_worktree(&self, repo: &Path, path: &Path, force: bool) -> Result<(), ExternalError> {
        self.with_repo(repo, "worktree remove", |state, vcs| {
            if vcs.fail_remove {
                return Err(ext("worktree remove", "worktree is locked"));
            }
            if !force && state.dirty.contains(path) {
                return Err(ext("worktree remove", "contains modified files"));
            }
            state.worktrees.retain(|(p, _)| p != path);
            let _ = std::fs::remove_dir_all(path);
            Ok(())
        })
    }

    fn move_worktree(&self, repo: &Path, from: &Path, to: &Path) -> Result<(), ExternalError> {
        self.with_repo(repo, "worktree move", |state, vcs| {
            if vcs.fail_move {
                return Err(ext("worktree move", "target is locked"));
            }
            let entry = state
                .worktrees
                .iter_mut()
                .find(|(p, _)| p == from)
                .ok_or_else(|| ext("worktree move", "not a worktree"))?;
            std::fs::rename(from, to).map_err(|e| ext("worktree move", e.to_string()))?;
            entry.0 = to.to_path_buf();
            Ok(())
        })
    }

    fn current_branch(&self, dir: &Path) -> Result<String, ExternalError> {
        self.with_repo(dir, "rev-parse", |state, _| {
            Ok(state
                .worktrees
                .iter()
                .find(|(p, _)| dir.starts_with(p))
                .map(|(_, b)| b.clone())
                .unwrap_or_else(|| "main".into()))
        })
    }

    fn is_dirty(&self, dir: &Path) -> Result<bool, ExternalError> {
        self.with_repo(dir, "status", |state, _| Ok(state.dirty.contains(dir)))
    }

    fn is_merged(&self, repo: &Path, branch: &str, _into: &str) -> Result<bool, ExternalError> {
        self.with_repo(repo, "merge-base", |state, _| Ok(state.merged.contains(branch)))
    }

    fn branch_exists(&self, repo: &Path, branch: &str) -> Result<bool, ExternalError> {
        self.with_repo(repo, "show-ref", |state, _| Ok(state.branches.contains(branch)))
    }

    fn delete_branch(&self, repo: &Path, branch: &str, _force: bool) -> Result<(), ExternalError> {
        self.with_repo(repo, "branch delete", |state, _| {
            if state.branches.remove(branch) {
                Ok(())
            } else {
                Err(ext("branch delete", format!("branch '{branch}' not found")))
            }
        })
    }

    fn default_branch(&self, _repo: &Path) -> Result<String, ExternalError> {
        Ok("main".into())
    }

    fn fetch(&self, _repo: &Path) -> Result<(), ExternalError> {
        Err(ext("fetch", "no 'origin' remote"))
    }
}

// ---------------------------------------------------------------------------
// Sessions, scripts, files, ports
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct SessionState {
    pub running: BTreeMap<String, (PathBuf, String, Env)>,
    pub fail_rename: bool,
}

#[derive(Clone, Default)]
pub struct FakeSessions(pub Arc<Mutex<SessionState>>);

impl FakeSessions {
    pub fn state(&self) -> std::sync::MutexGuard<'_, SessionState> {
        self.0.lock().unwrap()
    }
}

impl Sessions for FakeSessions {
    fn start(&self, key: &str, dir: &Path, command: &str, env: &Env) -> Result<(), ExternalError> {
        self.state()
            .running
            .insert(key.into(), (dir.to_path_buf(), command.into(), env.clone()));
        Ok(())
    }

    fn stop(&self, key: &str) -> Result<(), ExternalError> {
        self.state()
            .running
            .remove(key)
            .map(drop)
            .ok_or_else(|| ExternalError::new("tmux", "kill-session", "no such session"))
    }

    fn is_running(&self, key: &str) -> Result<bool, ExternalError> {
        Ok(self.state().running.contains_key(key))
    }

    fn capture(&self, key: &str, _lines: usize) -> Result<String, ExternalError> {
        let state = self.state();
        let (_, command, _) = state
            .running
            .get(key)
            .ok_or_else(|| ExternalError::new("tmux", "capture-pane", "no such session"))?;
        Ok(format!("$ {command}\nlistening"))
    }

    fn rename(&self, from: &str, to: &str) -> Result<(), ExternalError> {
        let mut state = self.state();
        if state.fail_rename {
            return Err(ExternalError::new("tmux", "rename-session", "denied"));
        }
        let session = state
            .running
            .remove(from)
            .ok_or_else(|| ExternalError::new("tmux", "rename-session", "no such session"))?;
        state.running.insert(to.into(), session);
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct ScriptState {
    pub runs: Vec<(String, PathBuf, Env)>,
    pub failing: BTreeSet<String>,
}

#[derive(Clone, Default)]
pub struct FakeScripts(pub Arc<Mutex<ScriptState>>);

impl FakeScripts {
    pub fn state(&self) -> std::sync::MutexGuard<'_, ScriptState> {
        self.0.lock().unwrap()
    }
}

impl ScriptRunner for FakeScripts {
    fn run(&self, script: &str, dir: &Path, env: &Env) -> Result<(), ExternalError> {
        let mut state = self.state();
        state.runs.push((script.into(), dir.to_path_buf(), env.clone()));
        if state.failing.contains(script) {
            return Err(ExternalError::new("sh", "script", "exit status: 1"));
        }
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct FakeFiles(pub Arc<Mutex<Vec<(PathBuf, PathBuf, Vec<String>)>>>);

impl FileSync for FakeFiles {
    fn sync(&self, from: &Path, to: &Path, include: &[String]) -> Result<usize, ExternalError> {
        self.0
            .lock()
            .unwrap()
            .push((from.to_path_buf(), to.to_path_buf(), include.to_vec()));
        Ok(include.len())
    }
}

pub struct AllFree;

impl PortProbe for AllFree {
    fn is_free(&self, _port: u16) -> bool {
        true
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

pub struct Harness {
    pub tmp: tempfile::TempDir,
    pub home: PathBuf,
    pub vcs: FakeVcs,
    pub sessions: FakeSessions,
    pub scripts: FakeScripts,
    pub files: FakeFiles,
    pub lifecycle: Lifecycle,
}

impl Harness {
    pub fn new() -> Self {
        let tmp = tempfile::TempDir::new().unwrap();
        let home = tmp.path().join("home");
        std::fs::create_dir_all(&home).unwrap();
        let vcs = FakeVcs::default();
        let sessions = FakeSessions::default();
        let scripts = FakeScripts::default();
        let files = FakeFiles::default();
        let lifecycle = Lifecycle::new(
            &home,
            Collaborators {
                vcs: Box::new(vcs.clone()),
                sessions: Box::new(sessions.clone()),
                scripts: Box::new(scripts.clone()),
                files: Box::new(files.clone()),
                probe: Box::new(AllFree),
            },
        );
        Self {
            tmp,
            home,
            vcs,
            sessions,
            scripts,
            files,
            lifecycle,
        }
    }

    /// Create a fake repository at `<tmp>/code/<name>` with an optional
    /// `.orchard.yaml`, and open it.
    pub fn repo(&self, name: &str, config: Option<&str>) -> RepoContext {
        let root = self.tmp.path().join("code").join(name);
        let common = root.join(".git");
        std::fs::create_dir_all(&common).unwrap();
        if let Some(config) = config {
            std::fs::write(root.join(".orchard.yaml"), config).unwrap();
        }
        self.vcs.state().repos.insert(
            root.clone(),
            RepoState {
                common,
                branches: ["main".to_string()].into_iter().collect(),
                ..RepoState::default()
            },
        );
        self.lifecycle.open_repo(&root).unwrap()
    }

    pub fn outside(&self) -> PathBuf {
        let dir = self.tmp.path().join("elsewhere");
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }
}
