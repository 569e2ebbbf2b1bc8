//! Autosave actor: one Tokio task per open editor.
//!
//! The editor reports every content change through an [`AutosaveHandle`].
//! The actor coalesces them: each change restarts the debounce countdown,
//! and when the countdown runs out the latest content is saved once,
//! unless it equals what was saved last. Saves run inside the actor, one
//! at a time, so a save never starts before the previous write finished.
//!
//! ```text
//! edit ──→ [Pending] ──(debounce elapses)──→ save ──→ [Idle]
//!   ↑          │  ↑                                     │
//!   │          │  └────────── edit (restart timer) ─────┘
//!   │          └──(flush)──→ save now
//!   └── drop / cancel: pending content discarded, task exits
//! ```

use std::sync::Arc;

use scriba_protocol::{Draft, DraftId};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{self, Duration, Instant};

use crate::{AutosaveConfig, AutosaveError, DraftContent, DraftSink};

/// What a flush did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushOutcome {
    /// Pending content was written.
    Saved,
    /// Nothing to write: no pending edit, or it matched the last save.
    Unchanged,
}

pub(crate) enum AutosaveCommand {
    Edit(DraftContent),
    Flush {
        reply: oneshot::Sender<Result<FlushOutcome, AutosaveError>>,
    },
}

/// Handle to the autosave task of one draft.
///
/// Dropping it tears the autosave down: a pending countdown is cancelled
/// and its content is not saved. Call [`flush`](Self::flush) first to
/// keep the last edit.
#[derive(Debug)]
pub struct AutosaveHandle {
    draft_id: DraftId,
    sender: mpsc::UnboundedSender<AutosaveCommand>,
    task: JoinHandle<()>,
}

impl AutosaveHandle {
    /// Starts autosaving `draft` into `sink`. The draft's current content
    /// counts as already saved.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn<S: DraftSink>(sink: Arc<S>, draft: &Draft, config: AutosaveConfig) -> Self {
        let config = config.validated();
        let (sender, receiver) = mpsc::unbounded_channel();

        let actor = AutosaveActor {
            draft_id: draft.id,
            sink,
            debounce: config.debounce,
            last_saved: DraftContent::new(draft.title.clone(), draft.body.clone()),
            pending: None,
            deadline: None,
            receiver,
        };
        let task = tokio::spawn(actor.run());

        Self {
            draft_id: draft.id,
            sender,
            task,
        }
    }

    pub fn draft_id(&self) -> DraftId {
        self.draft_id
    }

    /// Reports new editor content. Never blocks.
    pub fn edit(
        &self,
        title: impl Into<String>,
        body: impl Into<String>,
    ) -> Result<(), AutosaveError> {
        self.sender
            .send(AutosaveCommand::Edit(DraftContent::new(title, body)))
            .map_err(|_| AutosaveError::Closed)
    }

    /// Saves pending content now instead of waiting for the countdown.
    pub async fn flush(&self) -> Result<FlushOutcome, AutosaveError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(AutosaveCommand::Flush { reply: reply_tx })
            .map_err(|_| AutosaveError::Closed)?;
        reply_rx.await.map_err(|_| AutosaveError::Closed)?
    }

    /// Stops autosaving and discards any pending content.
    pub fn cancel(self) {}

    /// Returns `true` once the task has exited.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// The internal autosave state. Runs inside a Tokio task.
struct AutosaveActor<S> {
    draft_id: DraftId,
    sink: Arc<S>,
    debounce: Duration,
    /// Content of the last successful save.
    last_saved: DraftContent,
    /// Latest edit not yet saved.
    pending: Option<DraftContent>,
    /// When the pending edit is due. `None` = no countdown running.
    deadline: Option<Instant>,
    receiver: mpsc::UnboundedReceiver<AutosaveCommand>,
}

impl<S: DraftSink> AutosaveActor<S> {
    async fn run(mut self) {
        tracing::debug!(draft_id = %self.draft_id, "autosave started");

        loop {
            let deadline = self.deadline;
            tokio::select! {
                cmd = self.receiver.recv() => match cmd {
                    Some(AutosaveCommand::Edit(content)) => {
                        self.pending = Some(content);
                        self.deadline = Some(Instant::now() + self.debounce);
                    }
                    Some(AutosaveCommand::Flush { reply }) => {
                        self.deadline = None;
                        let _ = reply.send(self.save_pending());
                    }
                    None => break,
                },
                () = wait_until(deadline) => {
                    self.deadline = None;
                    if let Err(e) = self.save_pending() {
                        tracing::error!(draft_id = %self.draft_id, error = %e, "autosave failed");
                    }
                }
            }
        }

        if self.pending.is_some() {
            tracing::debug!(draft_id = %self.draft_id, "autosave cancelled, pending edit discarded");
        } else {
            tracing::debug!(draft_id = %self.draft_id, "autosave stopped");
        }
    }

    fn save_pending(&mut self) -> Result<FlushOutcome, AutosaveError> {
        let Some(content) = self.pending.take() else {
            return Ok(FlushOutcome::Unchanged);
        };

        if content == self.last_saved {
            tracing::trace!(draft_id = %self.draft_id, "content unchanged, save skipped");
            return Ok(FlushOutcome::Unchanged);
        }

        match self.sink.save_content(self.draft_id, &content) {
            Ok(()) => {
                tracing::debug!(draft_id = %self.draft_id, "autosaved");
                self.last_saved = content;
                Ok(FlushOutcome::Saved)
            }
            Err(e) => {
                // Keep it for the next edit or flush to retry.
                self.pending = Some(content);
                Err(e.into())
            }
        }
    }
}

/// Sleeps until `deadline`, or forever when there is none.
async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(at) => time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}
