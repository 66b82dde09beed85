//! Orchestrator behavior against in-memory collaborators.

mod support;

use assert_fs::prelude::*;
use orchard_core::{CoreError, ErrorKind, RepoRegistry, WorkspaceRegistry};
use orchard_lifecycle::{ArchiveOptions, ArchiveOutcome, CreateRequest, LifecycleError};
use predicates::prelude::*;
use rstest::rstest;
use support::Harness;

fn named(name: &str) -> CreateRequest {
    CreateRequest {
        name: Some(name.into()),
        ..CreateRequest::default()
    }
}

// ---------------------------------------------------------------------------
// 1. Create
// ---------------------------------------------------------------------------

#[test]
fn create_allocates_registers_and_auto_registers() {
    let h = Harness::new();
    let ctx = h.repo("api", None);

    let out = h.lifecycle.create(&ctx, &named("brave-otter")).unwrap();
    assert!(out.created);
    assert_eq!(out.workspace.port, 61000);
    assert_eq!(out.workspace.branch, "brave-otter");
    assert_eq!(
        out.workspace.path,
        h.home.join(".orchard/worktrees/api/brave-otter")
    );
    assert!(out.workspace.path.is_dir());
    assert!(out.warnings.iter().any(|w| w.starts_with("fetch")), "{:?}", out.warnings);

    let vcs = h.vcs.state();
    assert!(vcs.adds[0].create_branch);
    assert_eq!(vcs.adds[0].start_point.as_deref(), Some("main"), "no fetch, local default");
    drop(vcs);

    let registry = WorkspaceRegistry::load_at(&ctx.registry_path()).unwrap();
    assert_eq!(registry.find("brave-otter").unwrap().port, 61000);
    let repos = RepoRegistry::load_at(&h.home).unwrap();
    assert_eq!(repos.find("api").unwrap().path, ctx.root);
}

#[test]
fn sequential_creates_take_successive_blocks() {
    let h = Harness::new();
    let ctx = h.repo("api", Some("base_port: 62000\nport_block_size: 5\n"));

    let a = h.lifecycle.create(&ctx, &named("a")).unwrap();
    let generated = h.lifecycle.create(&ctx, &CreateRequest::default()).unwrap();
    assert_eq!(a.workspace.port, 62000);
    assert_eq!(generated.workspace.port, 62005);
    assert!(orchard_core::WorkspaceName::parse(generated.workspace.name.as_str()).is_ok());
}

#[test]
fn duplicate_name_fails_unless_existing_ok() {
    let h = Harness::new();
    let ctx = h.repo("api", None);
    h.lifecycle.create(&ctx, &named("a")).unwrap();

    let err = h.lifecycle.create(&ctx, &named("a")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AlreadyExists, "got: {err}");

    let again = h
        .lifecycle
        .create(
            &ctx,
            &CreateRequest {
                existing_ok: true,
                ..named("a")
            },
        )
        .unwrap();
    assert!(!again.created);
    assert_eq!(again.workspace.port, 61000);
    assert_eq!(h.vcs.state().adds.len(), 1);
}

#[test]
fn invalid_names_are_rejected_before_any_side_effect() {
    let h = Harness::new();
    let ctx = h.repo("api", None);
    let err = h.lifecycle.create(&ctx, &named("../escape")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
    assert!(h.vcs.state().adds.is_empty());
}

#[test]
fn port_survey_spans_registered_repositories() {
    let h = Harness::new();
    let api = h.repo("api", None);
    let web = h.repo("web", None);

    let first = h.lifecycle.create(&api, &named("a")).unwrap();
    let second = h.lifecycle.create(&web, &named("a")).unwrap();
    assert_eq!(first.workspace.port, 61000);
    assert_eq!(second.workspace.port, 61010);

    let blocks = h.lifecycle.port_blocks().unwrap();
    assert_eq!(blocks.len(), 2);
    assert_eq!((blocks[0].start, blocks[0].end), (61000, 61009));
    assert_eq!(blocks[1].repo.as_str(), "web");
}

#[test]
fn failed_registry_save_rolls_back_worktree_and_branch() {
    let h = Harness::new();
    let ctx = h.repo("api", None);
    // A directory where the lock file should be makes every save fail.
    std::fs::create_dir_all(ctx.registry_path().with_file_name("workspaces.json.lock")).unwrap();

    let err = h.lifecycle.create(&ctx, &named("doomed")).unwrap_err();
    assert!(matches!(err, LifecycleError::RolledBack { .. }), "got: {err}");
    assert_eq!(err.kind(), ErrorKind::Io);
    match &err {
        LifecycleError::RolledBack {
            compensation_failures,
            ..
        } => assert!(compensation_failures.is_empty()),
        _ => unreachable!(),
    }
    assert!(h.vcs.worktree_paths(&ctx.root).is_empty());
    assert!(!h.vcs.has_branch(&ctx.root, "doomed"));
    assert!(!h.home.join(".orchard/worktrees/api/doomed").exists());
}

#[test]
fn existing_branch_is_checked_out_not_created() {
    let h = Harness::new();
    let ctx = h.repo("api", None);
    h.vcs
        .state()
        .repos
        .get_mut(&ctx.root)
        .unwrap()
        .branches
        .insert("feature/login".into());

    let out = h
        .lifecycle
        .create(
            &ctx,
            &CreateRequest {
                branch: Some("feature/login".into()),
                ..named("login")
            },
        )
        .unwrap();
    assert_eq!(out.workspace.branch, "feature/login");
    let vcs = h.vcs.state();
    assert!(!vcs.adds[0].create_branch);
    assert_eq!(vcs.adds[0].start_point, None);
}

#[test]
fn setup_failures_are_warnings_and_keep_the_workspace() {
    let h = Harness::new();
    let ctx = h.repo(
        "api",
        Some("copy: [.env]\nscripts:\n  setup: make deps\n"),
    );
    h.scripts.state().failing.insert("make deps".into());

    let out = h.lifecycle.create(&ctx, &named("a")).unwrap();
    assert!(out.warnings.iter().any(|w| w.starts_with("setup script")));
    assert_eq!(h.files.0.lock().unwrap().len(), 1);

    {
        let scripts = h.scripts.state();
        assert_eq!(scripts.runs[0].1, out.workspace.path);
        assert_eq!(scripts.runs[0].2["ORCHARD_PORT"], "61000");
    }
    assert!(h.lifecycle.list(&ctx).unwrap().iter().any(|w| w.name.0 == "a"));
}

// ---------------------------------------------------------------------------
// 2. Archive
// ---------------------------------------------------------------------------

#[test]
fn dirty_workspace_needs_force() {
    let h = Harness::new();
    let ctx = h.repo("api", None);
    let ws = h.lifecycle.create(&ctx, &named("a")).unwrap().workspace;
    h.vcs
        .state()
        .repos
        .get_mut(&ctx.root)
        .unwrap()
        .dirty
        .insert(ws.path.clone());

    let err = h
        .lifecycle
        .archive(&ctx, "a", ArchiveOptions::default())
        .unwrap_err();
    assert!(matches!(err, LifecycleError::DirtyWorkspace { .. }), "got: {err}");
    assert_eq!(err.kind(), ErrorKind::DirtyWorkspace);
    assert!(h.lifecycle.list(&ctx).unwrap().iter().any(|w| w.name.0 == "a"));

    let forced = ArchiveOptions {
        force: true,
        ..ArchiveOptions::default()
    };
    let out = h.lifecycle.archive(&ctx, "a", forced).unwrap();
    assert!(matches!(out, ArchiveOutcome::Archived { .. }));
    assert!(h.lifecycle.list(&ctx).unwrap().is_empty());
    assert!(!ws.path.exists());
}

#[rstest]
#[case(true)]
#[case(false)]
fn archiving_a_missing_workspace(#[case] missing_ok: bool) {
    let h = Harness::new();
    let ctx = h.repo("api", None);
    let options = ArchiveOptions {
        missing_ok,
        ..ArchiveOptions::default()
    };
    let result = h.lifecycle.archive(&ctx, "ghost", options);
    if missing_ok {
        assert_eq!(
            result.unwrap(),
            ArchiveOutcome::NotFound {
                name: "ghost".into()
            }
        );
    } else {
        assert_eq!(result.unwrap_err().kind(), ErrorKind::NotFound);
    }
}

#[test]
fn worktree_removal_failure_still_forgets_the_workspace() {
    let h = Harness::new();
    let ctx = h.repo("api", None);
    h.lifecycle.create(&ctx, &named("a")).unwrap();
    h.vcs.state().fail_remove = true;

    let out = h
        .lifecycle
        .archive(&ctx, "a", ArchiveOptions::default())
        .unwrap();
    match out {
        ArchiveOutcome::Archived { warnings, .. } => {
            assert!(warnings.iter().any(|w| w.starts_with("remove worktree")))
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    let registry = WorkspaceRegistry::load_at(&ctx.registry_path()).unwrap();
    assert!(registry.find("a").is_none());
}

#[test]
fn archive_stops_session_and_runs_archive_script() {
    let h = Harness::new();
    let ctx = h.repo("api", Some("scripts:\n  run: npm start\n  archive: ./down.sh\n"));
    let ws = h.lifecycle.create(&ctx, &named("a")).unwrap().workspace;
    h.lifecycle.run(&ctx, &ws).unwrap();
    assert!(h.lifecycle.is_running(&ctx, &ws));

    h.lifecycle
        .archive(&ctx, "a", ArchiveOptions::default())
        .unwrap();
    assert!(h.sessions.state().running.is_empty());
    let scripts = h.scripts.state();
    let (script, dir, env) = scripts.runs.last().unwrap();
    assert_eq!(script, "./down.sh");
    assert_eq!(dir, &ws.path);
    assert_eq!(env["ORCHARD_WORKSPACE_NAME"], "a");
}

#[test]
fn branch_cleanup_only_deletes_merged_branches() {
    let h = Harness::new();
    let ctx = h.repo("api", None);
    h.lifecycle.create(&ctx, &named("merged")).unwrap();
    h.lifecycle.create(&ctx, &named("wip")).unwrap();
    h.vcs
        .state()
        .repos
        .get_mut(&ctx.root)
        .unwrap()
        .merged
        .insert("merged".into());
    let options = ArchiveOptions {
        delete_branch: true,
        ..ArchiveOptions::default()
    };

    match h.lifecycle.archive(&ctx, "merged", options).unwrap() {
        ArchiveOutcome::Archived { branch_deleted, .. } => assert!(branch_deleted),
        other => panic!("unexpected outcome: {other:?}"),
    }
    match h.lifecycle.archive(&ctx, "wip", options).unwrap() {
        ArchiveOutcome::Archived {
            branch_deleted,
            warnings,
            ..
        } => {
            assert!(!branch_deleted);
            assert!(warnings.iter().any(|w| w.contains("not merged")));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert!(!h.vcs.has_branch(&ctx.root, "merged"));
    assert!(h.vcs.has_branch(&ctx.root, "wip"));
}

// ---------------------------------------------------------------------------
// 3. Rename
// ---------------------------------------------------------------------------

#[test]
fn failed_move_leaves_registry_untouched() {
    let h = Harness::new();
    let ctx = h.repo("api", None);
    let original = h.lifecycle.create(&ctx, &named("old")).unwrap().workspace;
    h.vcs.state().fail_move = true;

    let err = h.lifecycle.rename(&ctx, "old", "new").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ExternalOperationFailed);

    let registry = WorkspaceRegistry::load_at(&ctx.registry_path()).unwrap();
    assert_eq!(registry.find("old"), Some(&original));
    assert!(registry.find("new").is_none());
}

#[test]
fn rename_moves_worktree_and_session() {
    let h = Harness::new();
    let ctx = h.repo("api", Some("scripts:\n  run: npm start\n"));
    let original = h.lifecycle.create(&ctx, &named("old")).unwrap().workspace;
    h.lifecycle.run(&ctx, &original).unwrap();

    let out = h.lifecycle.rename(&ctx, "old", "new").unwrap();
    assert_eq!(out.previous.as_str(), "old");
    assert_eq!(out.workspace.port, original.port);
    assert_eq!(out.workspace.branch, original.branch);
    assert_eq!(out.workspace.created_at, original.created_at);
    assert_eq!(out.workspace.path, original.path.with_file_name("new"));
    assert!(out.workspace.path.is_dir());
    assert!(out.warnings.is_empty(), "{:?}", out.warnings);
    assert!(h.sessions.state().running.contains_key("orchard-api-new"));
}

#[rstest]
#[case("old", "old", ErrorKind::InvalidInput)]
#[case("old", "taken", ErrorKind::AlreadyExists)]
#[case("ghost", "fresh", ErrorKind::NotFound)]
#[case("old", "bad name", ErrorKind::InvalidInput)]
fn rename_rejections(#[case] old: &str, #[case] new: &str, #[case] kind: ErrorKind) {
    let h = Harness::new();
    let ctx = h.repo("api", None);
    h.lifecycle.create(&ctx, &named("old")).unwrap();
    h.lifecycle.create(&ctx, &named("taken")).unwrap();

    let err = h.lifecycle.rename(&ctx, old, new).unwrap_err();
    assert_eq!(err.kind(), kind, "got: {err}");
    let names: Vec<_> = h
        .lifecycle
        .list(&ctx)
        .unwrap()
        .into_iter()
        .map(|w| w.name.0)
        .collect();
    assert_eq!(names, vec!["old", "taken"]);
}

// ---------------------------------------------------------------------------
// 4. Reconciliation and resolution
// ---------------------------------------------------------------------------

#[test]
fn vanished_worktrees_are_dropped_and_persisted() {
    let h = Harness::new();
    let ctx = h.repo("api", None);
    h.lifecycle.create(&ctx, &named("a")).unwrap();
    h.lifecycle.create(&ctx, &named("b")).unwrap();
    // Pruned behind our back: git no longer lists it.
    h.vcs
        .state()
        .repos
        .get_mut(&ctx.root)
        .unwrap()
        .worktrees
        .retain(|(p, _)| !p.ends_with("a"));

    let names: Vec<_> = h
        .lifecycle
        .list(&ctx)
        .unwrap()
        .into_iter()
        .map(|w| w.name.0)
        .collect();
    assert_eq!(names, vec!["b"]);

    let doc = assert_fs::fixture::ChildPath::new(ctx.registry_path());
    doc.assert(predicate::str::contains("\"b\"").and(predicate::str::contains("\"a\"").not()));
}

#[test]
fn deleted_worktree_directory_is_dropped_and_archive_needs_no_force() {
    let h = Harness::new();
    let ctx = h.repo("api", None);
    let a = h.lifecycle.create(&ctx, &named("a")).unwrap().workspace;
    h.lifecycle.create(&ctx, &named("b")).unwrap();
    // Still listed by git, but the directory is gone.
    std::fs::remove_dir_all(&a.path).unwrap();

    let names: Vec<_> = h
        .lifecycle
        .list(&ctx)
        .unwrap()
        .into_iter()
        .map(|w| w.name.0)
        .collect();
    assert_eq!(names, vec!["b"]);

    let outcome = h
        .lifecycle
        .archive(
            &ctx,
            "a",
            ArchiveOptions {
                missing_ok: true,
                ..ArchiveOptions::default()
            },
        )
        .unwrap();
    assert_eq!(outcome, ArchiveOutcome::NotFound { name: "a".into() });
}

#[test]
fn cli_resolution_is_local_first_then_global() {
    let h = Harness::new();
    let api = h.repo("api", None);
    let web = h.repo("web", None);
    let a = h.lifecycle.create(&api, &named("shared")).unwrap().workspace;
    h.lifecycle.create(&web, &named("shared")).unwrap();
    h.lifecycle.create(&web, &named("only-web")).unwrap();

    // Inside a workspace: no name needed.
    let inside = a.path.join("src");
    std::fs::create_dir_all(&inside).unwrap();
    let hit = h.lifecycle.resolve(&inside, None, None).unwrap();
    assert_eq!(hit.workspace, a);

    // Inside api, a name only known to web is not found locally.
    let err = h.lifecycle.resolve(&api.root, Some("only-web"), None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    // Outside every repository: global, first registered wins.
    let outside = h.outside();
    let hit = h.lifecycle.resolve(&outside, Some("shared"), None).unwrap();
    assert_eq!(hit.ctx.name.as_str(), "api");
    let hit = h.lifecycle.resolve(&outside, Some("shared"), Some("web")).unwrap();
    assert_eq!(hit.ctx.name.as_str(), "web");

    let err = h.lifecycle.resolve(&outside, None, None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotInWorkspace);
    let err = h.lifecycle.resolve_global("ghost", None).unwrap_err();
    assert!(
        matches!(err, LifecycleError::Core(CoreError::NotFoundAnywhere { .. })),
        "got: {err}"
    );
}

#[test]
fn list_all_reports_every_repository() {
    let h = Harness::new();
    let api = h.repo("api", None);
    let web = h.repo("web", None);
    h.lifecycle.create(&api, &named("a")).unwrap();
    h.lifecycle.create(&web, &named("b")).unwrap();

    let listing = h.lifecycle.list_all().unwrap();
    assert_eq!(listing.len(), 2);
    assert_eq!(listing[0].repo.name.as_str(), "api");
    assert_eq!(listing[0].workspaces[0].name.as_str(), "a");
    assert_eq!(listing[1].workspaces[0].name.as_str(), "b");
    assert!(listing.iter().all(|l| l.error.is_none()));
}

// ---------------------------------------------------------------------------
// 5. Sessions
// ---------------------------------------------------------------------------

#[test]
fn run_stop_and_logs() {
    let h = Harness::new();
    let bare = h.repo("api", None);
    let ws = h.lifecycle.create(&bare, &named("a")).unwrap().workspace;
    let err = h.lifecycle.run(&bare, &ws).unwrap_err();
    assert!(matches!(err, LifecycleError::NoRunScript { .. }), "got: {err}");

    let ctx = h.repo("web", Some("scripts:\n  run: npm start\n"));
    let ws = h.lifecycle.create(&ctx, &named("b")).unwrap().workspace;
    let started = h.lifecycle.run(&ctx, &ws).unwrap();
    assert_eq!(started.session, "orchard-web-b");
    assert_eq!(started.port, 61010);
    {
        let sessions = h.sessions.state();
        let (dir, command, env) = &sessions.running["orchard-web-b"];
        assert_eq!(dir, &ws.path);
        assert_eq!(command, "npm start");
        assert_eq!(env["PORT"], "61010");
    }

    let err = h.lifecycle.run(&ctx, &ws).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AlreadyExists);
    assert!(h.lifecycle.logs(&ctx, &ws, 50).unwrap().contains("npm start"));

    h.lifecycle.stop(&ctx, &ws).unwrap();
    let err = h.lifecycle.stop(&ctx, &ws).unwrap_err();
    assert!(matches!(err, LifecycleError::SessionNotRunning { .. }));
}
