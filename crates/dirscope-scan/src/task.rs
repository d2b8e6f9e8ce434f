//! Background scans delivered over a channel.

use tokio::sync::{broadcast, mpsc};
use tokio_util::sync::CancellationToken;

use dirscope_core::{HandleRef, ScanError, ScanOptions, ScanResult};

use crate::progress::ProgressEvent;
use crate::scanner::Scanner;

/// Channel buffer size for scan messages.
pub const SCAN_CHANNEL_SIZE: usize = 100;

/// Message sent from a background scan.
#[derive(Debug)]
pub enum ScanMessage {
    /// Progress update.
    Progress(ProgressEvent),
    /// Scan finished.
    Complete(Box<ScanResult>),
    /// Scan failed.
    Failed(ScanError),
    /// Scan stopped by [`ScanTask::cancel`].
    Cancelled,
}

impl ScanMessage {
    /// Check if no further messages follow this one.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Progress(_))
    }
}

/// Handle to a scan running on a spawned task.
#[derive(Debug)]
pub struct ScanTask {
    rx: mpsc::Receiver<ScanMessage>,
    cancel: CancellationToken,
}

impl ScanTask {
    /// Receive the next message; `None` after the terminal message.
    pub async fn recv(&mut self) -> Option<ScanMessage> {
        self.rx.recv().await
    }

    /// Request cancellation. Takes effect at the next checkpoint.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Token observed by the running scan.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }
}

/// Start a background scan of `root`.
///
/// Progress updates arrive first, followed by exactly one of
/// [`ScanMessage::Complete`], [`ScanMessage::Failed`] or
/// [`ScanMessage::Cancelled`].
pub fn start_scan(root: HandleRef, options: ScanOptions) -> ScanTask {
    let (tx, rx) = mpsc::channel(SCAN_CHANNEL_SIZE);
    let cancel = CancellationToken::new();
    let token = cancel.clone();

    tokio::spawn(async move {
        let scanner = Scanner::with_options(options);
        let mut progress_rx = scanner.subscribe();

        // Forward progress updates until the scanner is dropped
        let tx_progress = tx.clone();
        let progress_task = tokio::spawn(async move {
            loop {
                match progress_rx.recv().await {
                    Ok(progress) => {
                        if tx_progress.send(ScanMessage::Progress(progress)).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        let outcome = scanner.scan(root, &token).await;
        drop(scanner);
        let _ = progress_task.await;

        let message = match outcome {
            Ok(result) => ScanMessage::Complete(Box::new(result)),
            Err(err) if err.is_cancelled() => ScanMessage::Cancelled,
            Err(err) => ScanMessage::Failed(err),
        };
        let _ = tx.send(message).await;
    });

    ScanTask { rx, cancel }
}
