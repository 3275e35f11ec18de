//! Stdin/stdout JSON bridge for the host command channel.
//!
//! Reads newline-delimited JSON `CommandEnvelope` messages, dispatches them
//! through the [`HostCommandServer`](crate::host::channel::HostCommandServer)
//! router, and writes one `ResponseEnvelope` per line back.
//!
//! Stdout is exclusively reserved for the JSON protocol; all diagnostic
//! output (tracing, logs) must be routed to stderr.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, BufWriter};

use crate::error::{Result, ScoutError};
use crate::host::channel::{HostCommandClient, command_channel};
use crate::host::contract::{
    CommandEnvelope, CommandName, PARSE_ERROR_REQUEST_ID, ResponseEnvelope,
};
use crate::service::RecipeService;

/// Default request channel capacity for the stdio bridge.
const REQUEST_CAPACITY: usize = 64;

/// Run the bridge on the process's stdin/stdout until stdin closes or a
/// `runtime.stop` command is answered.
pub async fn run_stdio_bridge(service: RecipeService) -> Result<()> {
    let reader = BufReader::new(tokio::io::stdin());
    let writer = BufWriter::new(tokio::io::stdout());
    run_bridge(service, reader, writer).await
}

/// Run the bridge over arbitrary line-oriented streams.
///
/// The router runs on its own task; this task reads lines and writes
/// responses. Dropping the client at the end lets the router exit.
pub async fn run_bridge<R, W>(service: RecipeService, reader: R, mut writer: W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let (client, server) = command_channel(REQUEST_CAPACITY, service);
    let server_handle = tokio::spawn(server.run());

    let result = run_reader(client, reader, &mut writer).await;

    let _ = server_handle.await;
    result
}

/// Read line-by-line, dispatch each command, and write responses.
async fn run_reader<R, W>(client: HostCommandClient, mut reader: R, writer: &mut W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut line = String::new();

    loop {
        line.clear();
        let bytes_read = reader
            .read_line(&mut line)
            .await
            .map_err(|e| ScoutError::Channel(format!("failed to read command line: {e}")))?;

        if bytes_read == 0 {
            tracing::info!("input closed (EOF); shutting down host bridge");
            break;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let envelope: CommandEnvelope = match serde_json::from_str(trimmed) {
            Ok(env) => env,
            Err(e) => {
                tracing::warn!(error = %e, "failed to parse command envelope");
                let response = ResponseEnvelope::error(
                    PARSE_ERROR_REQUEST_ID,
                    format!("failed to parse command envelope: {e}"),
                );
                write_response(writer, &response).await?;
                continue;
            }
        };

        let is_stop = envelope.command == CommandName::RuntimeStop;
        let request_id = envelope.request_id.clone();

        let response = match client.send(envelope).await {
            Ok(resp) => resp,
            Err(e) => {
                tracing::error!(error = %e, "host command dispatch failed");
                ResponseEnvelope::error(request_id, e.to_string())
            }
        };
        write_response(writer, &response).await?;

        if is_stop {
            tracing::info!("runtime.stop received; shutting down host bridge");
            break;
        }
    }

    Ok(())
}

/// Write a single JSON line and flush.
async fn write_response<W: AsyncWrite + Unpin>(
    writer: &mut W,
    response: &ResponseEnvelope,
) -> Result<()> {
    let json = serde_json::to_string(response)
        .map_err(|e| ScoutError::Channel(format!("failed to serialize response envelope: {e}")))?;
    writer
        .write_all(json.as_bytes())
        .await
        .map_err(|e| ScoutError::Channel(format!("failed to write response: {e}")))?;
    writer
        .write_all(b"\n")
        .await
        .map_err(|e| ScoutError::Channel(format!("failed to write newline: {e}")))?;
    writer
        .flush()
        .await
        .map_err(|e| ScoutError::Channel(format!("failed to flush output: {e}")))?;
    Ok(())
}
