// Process exit codes for the orchard CLI.
//
//   0      = success
//   1      = general or I/O error
//   2      = usage/argument error (clap)
//   3, 10+ = one code per orchard_core::ErrorKind

use std::process::ExitCode;

use colored::Colorize;
use serde::Serialize;

use orchard_core::{CoreError, ErrorKind};
use orchard_lifecycle::LifecycleError;

const GENERAL_ERROR: i32 = 1;

/// Classify an error by walking its chain for a typed orchard error.
pub fn kind_of(err: &anyhow::Error) -> Option<ErrorKind> {
    err.chain().find_map(|cause| {
        if let Some(err) = cause.downcast_ref::<LifecycleError>() {
            return Some(err.kind());
        }
        if let Some(err) = cause.downcast_ref::<CoreError>() {
            return Some(err.kind());
        }
        None
    })
}

pub fn code_of(err: &anyhow::Error) -> i32 {
    kind_of(err).map_or(GENERAL_ERROR, ErrorKind::exit_code)
}

#[derive(Serialize)]
struct ErrorJson<'a> {
    error: ErrorDetail<'a>,
}

#[derive(Serialize)]
struct ErrorDetail<'a> {
    kind: &'a str,
    code: i32,
    message: String,
}

/// Print `err` (as JSON on stdout when `json`, otherwise on stderr) and
/// return the matching exit code.
pub fn report(err: &anyhow::Error, json: bool) -> ExitCode {
    let code = code_of(err);
    if json {
        let payload = ErrorJson {
            error: ErrorDetail {
                kind: kind_of(err).map_or("error", ErrorKind::as_str),
                code,
                message: format!("{err:#}"),
            },
        };
        match serde_json::to_string_pretty(&payload) {
            Ok(text) => println!("{text}"),
            Err(_) => eprintln!("{} {err:#}", "error:".red().bold()),
        }
    } else {
        eprintln!("{} {err:#}", "error:".red().bold());
    }
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}
