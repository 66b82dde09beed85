//! Environment and session naming for a workspace.

use orchard_core::{Env, Workspace};

use crate::context::RepoContext;

/// Background session key: `orchard-<repo>-<workspace>`. Characters tmux
/// treats as separators are replaced.
pub fn session_key(repo: &str, workspace: &str) -> String {
    format!("orchard-{repo}-{workspace}")
        .chars()
        .map(|c| match c {
            '.' | ':' | ' ' => '_',
            other => other,
        })
        .collect()
}

/// Variables exported to setup/run/archive scripts and background sessions.
pub fn workspace_env(ctx: &RepoContext, ws: &Workspace) -> Env {
    let port = ws.port.to_string();
    let mut env = Env::new();
    env.insert("ORCHARD_WORKSPACE_NAME".into(), ws.name.0.clone());
    env.insert(
        "ORCHARD_WORKSPACE_PATH".into(),
        ws.path.to_string_lossy().into_owned(),
    );
    env.insert(
        "ORCHARD_ROOT_PATH".into(),
        ctx.root.to_string_lossy().into_owned(),
    );
    env.insert("ORCHARD_BRANCH".into(), ws.branch.clone());
    env.insert("ORCHARD_PORT".into(), port.clone());
    env.insert("PORT".into(), port);
    env
}
