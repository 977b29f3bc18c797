//! Transfer execution supervisor
//!
//! Runs azcopy as a child process without blocking the caller. Its stdout and
//! stderr are consumed line-by-line as they appear and forwarded over an
//! unbounded channel, so no output is dropped while the consumer is busy.
//! Once both streams close the child is waited on and a single terminal
//! [`TransferEvent::Completed`] carries the exit code. Every line event is
//! delivered strictly before the completion event.

use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use super::azcopy::{AzCopy, TransferRequest};
use crate::error::{Result, TransferError};

/// Event emitted by a running transfer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferEvent {
    /// One line of combined stdout/stderr output
    Line(String),

    /// Terminal event: the process exited with this code
    Completed(i32),
}

/// Start a transfer, returning the ordered event stream.
///
/// Preconditions are checked before anything is spawned: the source folder
/// must exist and the tool handle must point at a real binary. A non-zero
/// exit code is reported through the completion event, not retried.
pub fn start(tool: &AzCopy, request: &TransferRequest) -> Result<UnboundedReceiver<TransferEvent>> {
    if !request.source_folder.is_dir() {
        return Err(TransferError::SourceNotFound(request.source_folder.clone()).into());
    }
    if !tool.path().is_file() {
        return Err(TransferError::ToolNotInstalled.into());
    }

    log::debug!(
        "starting transfer of {} to {}",
        request.source_folder.display(),
        request.masked_destination()
    );

    let mut child = Command::new(tool.path())
        .args(tool.copy_args(request))
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| TransferError::Spawn(e.to_string()))?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| TransferError::Spawn("stdout not captured".to_string()))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| TransferError::Spawn("stderr not captured".to_string()))?;

    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        let out_task = tokio::spawn(forward_lines(stdout, tx.clone()));
        let err_task = tokio::spawn(forward_lines(stderr, tx.clone()));

        // Both streams must be drained before the terminal event
        let _ = out_task.await;
        let _ = err_task.await;

        let code = match child.wait().await {
            Ok(status) => status.code().unwrap_or(-1),
            Err(e) => {
                log::warn!("failed to wait on transfer process: {}", e);
                -1
            }
        };
        let _ = tx.send(TransferEvent::Completed(code));
    });

    Ok(rx)
}

async fn forward_lines<R: AsyncRead + Unpin>(reader: R, tx: UnboundedSender<TransferEvent>) {
    let mut lines = BufReader::new(reader).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        if tx.send(TransferEvent::Line(line)).is_err() {
            break;
        }
    }
}
