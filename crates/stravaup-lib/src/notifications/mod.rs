//! Completion notification with pluggable handlers.
//!
//! The connector hands every finished upload to one [`CompletionNotifier`].
//! Built-in notifiers: [`LogNotifier`], [`ChannelNotifier`], [`FnNotifier`],
//! and [`NotifierSet`] to fan out to several of them.

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::mpsc;

use crate::cloud::model::{UploadHandle, UploadOutcome};
use crate::errors::{Result, UploadError};

/// One finished upload, delivered exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Completion {
    #[serde(skip)]
    pub handle: UploadHandle,
    pub remote_name: String,
    pub outcome: UploadOutcome,
}

impl Completion {
    /// The status message: `Completed.` or the failure reason.
    pub fn message(&self) -> &str {
        &self.outcome.message
    }
}

/// Receives upload completions.
#[async_trait]
pub trait CompletionNotifier: Send + Sync {
    /// Human-readable name of this notifier.
    fn name(&self) -> &str;

    async fn notify_write_complete(&self, completion: &Completion) -> Result<()>;
}

/// Logs every completion via `tracing`.
pub struct LogNotifier;

#[async_trait]
impl CompletionNotifier for LogNotifier {
    fn name(&self) -> &str {
        "log"
    }

    async fn notify_write_complete(&self, completion: &Completion) -> Result<()> {
        if completion.outcome.success {
            tracing::info!(
                handle = %completion.handle,
                remote_name = %completion.remote_name,
                upload_id = ?completion.outcome.upload_id,
                "Upload completed"
            );
        } else {
            tracing::warn!(
                handle = %completion.handle,
                remote_name = %completion.remote_name,
                "Upload failed: {}",
                completion.outcome.message
            );
        }
        Ok(())
    }
}

/// Forwards completions into an unbounded tokio channel.
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<Completion>,
}

impl ChannelNotifier {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Completion>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait]
impl CompletionNotifier for ChannelNotifier {
    fn name(&self) -> &str {
        "channel"
    }

    async fn notify_write_complete(&self, completion: &Completion) -> Result<()> {
        self.tx
            .send(completion.clone())
            .map_err(|_| UploadError::Application("completion receiver dropped".into()))
    }
}

/// Calls a plain `(remote_name, outcome)` closure.
pub struct FnNotifier<F> {
    f: F,
}

impl<F> FnNotifier<F>
where
    F: Fn(&str, &UploadOutcome) + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<F> CompletionNotifier for FnNotifier<F>
where
    F: Fn(&str, &UploadOutcome) + Send + Sync,
{
    fn name(&self) -> &str {
        "callback"
    }

    async fn notify_write_complete(&self, completion: &Completion) -> Result<()> {
        (self.f)(&completion.remote_name, &completion.outcome);
        Ok(())
    }
}

/// Dispatches each completion to every contained notifier.
///
/// Individual failures are logged and do not stop delivery to the others.
#[derive(Default)]
pub struct NotifierSet {
    notifiers: Vec<Box<dyn CompletionNotifier>>,
}

impl NotifierSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, notifier: impl CompletionNotifier + 'static) -> Self {
        self.notifiers.push(Box::new(notifier));
        self
    }

    pub fn len(&self) -> usize {
        self.notifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notifiers.is_empty()
    }
}

#[async_trait]
impl CompletionNotifier for NotifierSet {
    fn name(&self) -> &str {
        "set"
    }

    async fn notify_write_complete(&self, completion: &Completion) -> Result<()> {
        for notifier in &self.notifiers {
            if let Err(e) = notifier.notify_write_complete(completion).await {
                tracing::warn!(notifier = notifier.name(), "Completion notifier failed: {}", e);
            }
        }
        Ok(())
    }
}
