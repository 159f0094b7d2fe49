use super::App;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::Instant;

use crate::ai::{AiError, build_request};
use crate::types::{AssistState, AssistTask, DialogKind};
use crate::util::text_to_lines;

/// An in-flight completion running on a worker thread.
pub(crate) struct AssistJob {
    pub(crate) task: AssistTask,
    pub(crate) cancel: Arc<AtomicBool>,
    pub(crate) rx: Receiver<Result<String, AiError>>,
    pub(crate) started: Instant,
}

impl App {
    pub(crate) fn assist_pending(&self) -> bool {
        matches!(self.assist_state, AssistState::Pending(_))
    }

    /// Sends the trimmed buffer to the completion backend. An empty buffer
    /// raises a warning and never reaches the backend.
    pub(crate) fn start_assist(&mut self, task: AssistTask) {
        if self.assist_pending() {
            self.set_status("AI request in progress. Press Esc to cancel it first.");
            return;
        }
        let text = self.buffer_text();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            self.show_dialog(DialogKind::Warning, "Warning", "Text area is empty.");
            return;
        }

        let request = build_request(&self.model, task, trimmed);
        let backend = Arc::clone(&self.backend);
        let cancel = Arc::new(AtomicBool::new(false));
        let worker_cancel = Arc::clone(&cancel);
        let (tx, rx) = mpsc::channel();
        let spawned = thread::Builder::new()
            .name("ainotepad-assist".to_string())
            .spawn(move || {
                let result = backend.complete(&request);
                if !worker_cancel.load(Ordering::Relaxed) {
                    let _ = tx.send(result);
                }
            });
        if let Err(err) = spawned {
            tracing::error!(%err, "failed to spawn AI worker");
            self.assist_state = AssistState::Failed(task);
            self.show_dialog(
                DialogKind::Error,
                "Error",
                format!("Could not start the AI request: {err}"),
            );
            return;
        }

        tracing::info!(?task, model = self.model.as_str(), chars = trimmed.len(), "AI request started");
        self.assist_job = Some(AssistJob {
            task,
            cancel,
            rx,
            started: Instant::now(),
        });
        self.assist_state = AssistState::Pending(task);
        self.set_status(format!("{}… (Esc to cancel)", task.progress_label()));
    }

    /// Called every tick. Applies a finished result to the buffer or reports
    /// the failure.
    pub(crate) fn poll_assist(&mut self) {
        let Some(job) = self.assist_job.as_ref() else {
            return;
        };
        let task = job.task;
        let elapsed = job.started.elapsed();
        let outcome = match job.rx.try_recv() {
            Ok(outcome) => outcome,
            Err(TryRecvError::Empty) => return,
            Err(TryRecvError::Disconnected) => Err(AiError::Network(
                "the request ended without a response".to_string(),
            )),
        };
        self.assist_job = None;
        match outcome {
            Ok(reply) => {
                tracing::info!(?task, ?elapsed, chars = reply.len(), "AI request finished");
                self.replace_buffer(text_to_lines(reply.trim()));
                self.assist_state = AssistState::Done(task);
                self.set_status(format!("{} done", task.progress_label()));
            }
            Err(err) => {
                tracing::warn!(?task, ?elapsed, %err, "AI request failed");
                self.assist_state = AssistState::Failed(task);
                self.show_dialog(DialogKind::Error, "Error", err.user_message());
                self.set_status("AI request failed");
            }
        }
    }

    /// Abandons the in-flight request; its result is discarded when it lands.
    pub(crate) fn cancel_assist(&mut self) {
        let Some(job) = self.assist_job.take() else {
            return;
        };
        job.cancel.store(true, Ordering::Relaxed);
        tracing::info!(task = ?job.task, "AI request canceled");
        self.assist_state = AssistState::Idle;
        self.set_status("AI request canceled");
    }
}
