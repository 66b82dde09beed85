use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};

use orchard_lifecycle::Lifecycle;

use crate::error::{io_err, ServerError};
use crate::handler::dispatch;
use crate::protocol::{ErrorBody, Request, Response};

/// Serve stdin/stdout until stdin closes.
pub fn start_blocking(lifecycle: Lifecycle) -> Result<(), ServerError> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| io_err("tokio-runtime", e))?;
    runtime.block_on(serve(
        Arc::new(lifecycle),
        tokio::io::stdin(),
        tokio::io::stdout(),
    ))
}

/// Answer newline-delimited requests from `reader` on `writer`, one at a
/// time and in order, until `reader` reaches end of input.
pub async fn serve<R, W>(
    lifecycle: Arc<Lifecycle>,
    reader: R,
    mut writer: W,
) -> Result<(), ServerError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    tracing::info!("agent server ready");
    let mut lines = BufReader::new(reader).lines();

    while let Some(line) = lines
        .next_line()
        .await
        .map_err(|e| io_err("server input", e))?
    {
        if line.trim().is_empty() {
            continue;
        }

        let request: Request = match serde_json::from_str(&line) {
            Ok(request) => request,
            Err(err) => {
                let error = ErrorBody::invalid_request(format!("invalid request JSON: {err}"));
                write_response(&mut writer, &Response::error(None, error)).await?;
                continue;
            }
        };

        tracing::debug!(cmd = %request.cmd, "request received");
        let worker = lifecycle.clone();
        let response = tokio::task::spawn_blocking(move || dispatch(&worker, &request))
            .await
            .map_err(|e| ServerError::Join(e.to_string()))?;
        write_response(&mut writer, &response).await?;
    }

    tracing::info!("input closed; agent server exiting");
    Ok(())
}

async fn write_response<W>(writer: &mut W, response: &Response) -> Result<(), ServerError>
where
    W: AsyncWrite + Unpin,
{
    let payload = serde_json::to_string(response)?;
    writer
        .write_all(payload.as_bytes())
        .await
        .map_err(|e| io_err("server output", e))?;
    writer
        .write_all(b"\n")
        .await
        .map_err(|e| io_err("server output", e))?;
    writer
        .flush()
        .await
        .map_err(|e| io_err("server output", e))?;
    Ok(())
}
