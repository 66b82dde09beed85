//! Background run session of a workspace: `run`, `stop`, `logs`, status.

use serde::Serialize;

use orchard_core::Workspace;

use crate::context::{Lifecycle, RepoContext};
use crate::env::{session_key, workspace_env};
use crate::error::LifecycleError;

pub const DEFAULT_LOG_LINES: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunOutcome {
    pub session: String,
    pub command: String,
    pub port: u16,
}

impl Lifecycle {
    /// Start the configured run script in the workspace's session.
    pub fn run(&self, ctx: &RepoContext, ws: &Workspace) -> Result<RunOutcome, LifecycleError> {
        let command = ctx
            .config
            .scripts
            .run
            .clone()
            .ok_or_else(|| LifecycleError::NoRunScript {
                repo: ctx.name.0.clone(),
            })?;
        let session = session_key(ctx.name.as_str(), ws.name.as_str());
        if self.session_running(&session) {
            return Err(LifecycleError::SessionRunning { session });
        }
        let env = workspace_env(ctx, ws);
        self.tools.sessions.start(&session, &ws.path, &command, &env)?;
        tracing::info!(workspace = %ws.name, session = %session, port = ws.port, "session started");
        Ok(RunOutcome {
            session,
            command,
            port: ws.port,
        })
    }

    pub fn stop(&self, ctx: &RepoContext, ws: &Workspace) -> Result<String, LifecycleError> {
        let session = session_key(ctx.name.as_str(), ws.name.as_str());
        if !self.session_running(&session) {
            return Err(LifecycleError::SessionNotRunning { session });
        }
        self.tools.sessions.stop(&session)?;
        tracing::info!(workspace = %ws.name, session = %session, "session stopped");
        Ok(session)
    }

    /// Most recent `lines` of session output.
    pub fn logs(
        &self,
        ctx: &RepoContext,
        ws: &Workspace,
        lines: usize,
    ) -> Result<String, LifecycleError> {
        let session = session_key(ctx.name.as_str(), ws.name.as_str());
        if !self.session_running(&session) {
            return Err(LifecycleError::SessionNotRunning { session });
        }
        Ok(self.tools.sessions.capture(&session, lines)?)
    }

    pub fn is_running(&self, ctx: &RepoContext, ws: &Workspace) -> bool {
        self.session_running(&session_key(ctx.name.as_str(), ws.name.as_str()))
    }

    /// A session manager that cannot be queried counts as "not running".
    pub(crate) fn session_running(&self, key: &str) -> bool {
        match self.tools.sessions.is_running(key) {
            Ok(running) => running,
            Err(err) => {
                tracing::debug!(session = key, error = %err, "session query failed");
                false
            }
        }
    }
}
