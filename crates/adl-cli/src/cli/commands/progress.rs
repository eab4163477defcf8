//! Prints job updates for one-shot commands, fed by the same broadcaster the
//! WebSocket endpoint uses.

use adl_core::broadcast::{ConnectionId, UpdateBroadcaster, UpdateMessage};
use adl_core::job::{JobId, JobSnapshot};
use adl_core::pipeline::JobPipeline;
use std::sync::Arc;
use tokio::task::JoinHandle;

pub struct ProgressPrinter {
    conn: ConnectionId,
    broadcaster: Arc<UpdateBroadcaster>,
    printer: JoinHandle<()>,
    interrupt: JoinHandle<()>,
}

impl ProgressPrinter {
    /// Subscribes to `job`. Ctrl-C requests cancellation of the job.
    pub fn attach(pipeline: &JobPipeline, job: JobId) -> Self {
        let broadcaster = Arc::clone(pipeline.broadcaster());
        let (conn, mut rx) = broadcaster.register_connection();
        broadcaster.bind_owner(job, conn);

        let printer = tokio::spawn(async move {
            while let Some(msg) = rx.recv().await {
                if let UpdateMessage::JobUpdate { data, .. } = msg {
                    println!("  {}", render(&data));
                }
            }
        });

        let registry = Arc::clone(pipeline.registry());
        let interrupt = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                eprintln!("Cancelling...");
                if let Err(e) = registry.request_cancel(job) {
                    tracing::debug!(job_id = %job, "cancel ignored: {}", e);
                }
            }
        });

        Self {
            conn,
            broadcaster,
            printer,
            interrupt,
        }
    }

    /// Flushes queued updates and detaches.
    pub async fn finish(self) {
        self.interrupt.abort();
        self.broadcaster.unregister_connection(self.conn);
        let _ = self.printer.await;
    }
}

/// One status line: `[status] completed/total (failed) message`.
pub fn render(s: &JobSnapshot) -> String {
    match &s.progress {
        Some(p) if p.failed > 0 => format!(
            "[{}] {}/{} ({} failed) {}",
            s.status, p.completed, p.total, p.failed, s.message
        ),
        Some(p) => format!("[{}] {}/{} {}", s.status, p.completed, p.total, s.message),
        None => format!("[{}] {}", s.status, s.message),
    }
}
