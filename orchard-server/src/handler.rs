//! Request dispatch. Every command resolves workspaces globally: the server
//! has no working directory of its own.

use serde::Serialize;
use serde_json::{json, Value};

use orchard_core::CoreError;
use orchard_lifecycle::{ArchiveOptions, ArchiveOutcome, CreateRequest, Lifecycle};

use crate::protocol::{ErrorBody, Request, Response};

/// Handle one request. Blocking: call from a worker thread.
pub fn dispatch(lifecycle: &Lifecycle, request: &Request) -> Response {
    let result = match request.cmd.as_str() {
        "list" => list(lifecycle, request),
        "repos" => repos(lifecycle),
        "resolve" => resolve(lifecycle, request),
        "create" => create(lifecycle, request),
        "archive" => archive(lifecycle, request),
        "rename" => rename(lifecycle, request),
        other => Err(ErrorBody::invalid_request(format!(
            "unknown command '{other}'"
        ))),
    };
    match result {
        Ok(data) => Response::ok(request.id.clone(), data),
        Err(error) => {
            tracing::debug!(cmd = %request.cmd, kind = %error.kind, "request failed");
            Response::error(request.id.clone(), error)
        }
    }
}

type Handled = Result<Value, ErrorBody>;

fn required<'r>(field: &'r Option<String>, key: &str) -> Result<&'r str, ErrorBody> {
    field
        .as_deref()
        .ok_or_else(|| ErrorBody::invalid_request(format!("missing field '{key}'")))
}

fn encode(data: &impl Serialize) -> Handled {
    Ok(serde_json::to_value(data)?)
}

fn list(lifecycle: &Lifecycle, request: &Request) -> Handled {
    let Some(repo) = request.repo.as_deref() else {
        return encode(&lifecycle.list_all()?);
    };
    let repos = lifecycle.load_repos()?;
    let repository = repos
        .find(repo)
        .ok_or_else(|| CoreError::RepoNotFound {
            name: repo.to_owned(),
        })?;
    let ctx = lifecycle.open_registered(repository)?;
    let workspaces = lifecycle.list(&ctx)?;
    Ok(json!({ "repo": ctx.name, "workspaces": workspaces }))
}

fn repos(lifecycle: &Lifecycle) -> Handled {
    encode(&lifecycle.load_repos()?.repositories)
}

fn resolve(lifecycle: &Lifecycle, request: &Request) -> Handled {
    let name = required(&request.name, "name")?;
    let resolved = lifecycle.resolve_global(name, request.repo.as_deref())?;
    Ok(json!({
        "repo": resolved.ctx.name,
        "root": resolved.ctx.root,
        "workspace": resolved.workspace,
    }))
}

fn create(lifecycle: &Lifecycle, request: &Request) -> Handled {
    let repo = required(&request.repo, "repo")?;
    let repos = lifecycle.load_repos()?;
    let repository = repos
        .find(repo)
        .ok_or_else(|| CoreError::RepoNotFound {
            name: repo.to_owned(),
        })?;
    let ctx = lifecycle.open_registered(repository)?;
    let outcome = lifecycle.create(
        &ctx,
        &CreateRequest {
            name: request.name.clone(),
            branch: request.branch.clone(),
            base: request.base.clone(),
            existing_ok: request.existing_ok,
        },
    )?;
    encode(&outcome)
}

fn archive(lifecycle: &Lifecycle, request: &Request) -> Handled {
    let name = required(&request.name, "name")?;
    let resolved = match lifecycle.resolve_global(name, request.repo.as_deref()) {
        Ok(resolved) => resolved,
        Err(err) if request.missing_ok && err.is_missing_workspace() => {
            return encode(&ArchiveOutcome::NotFound {
                name: name.to_owned(),
            });
        }
        Err(err) => return Err(err.into()),
    };
    let outcome = lifecycle.archive(
        &resolved.ctx,
        name,
        ArchiveOptions {
            force: request.force,
            missing_ok: request.missing_ok,
            delete_branch: request.delete_branch,
        },
    )?;
    encode(&outcome)
}

fn rename(lifecycle: &Lifecycle, request: &Request) -> Handled {
    let name = required(&request.name, "name")?;
    let new_name = required(&request.new_name, "new_name")?;
    let resolved = lifecycle.resolve_global(name, request.repo.as_deref())?;
    encode(&lifecycle.rename(&resolved.ctx, name, new_name)?)
}
