//! Strava upload connector.
//!
//! Posts one gzip-compressed TCX activity per call to Strava's upload
//! endpoint and reports the result asynchronously. Each submission is
//! tracked by its own [`UploadHandle`]; the completion for a handle fires
//! exactly once, whatever the network or the response body did.

use std::sync::Arc;

use async_trait::async_trait;

use super::model::{ActivityKind, PendingUpload, UploadHandle, UploadOutcome, UploadRequest};
use super::pending::PendingUploads;
use super::response::{classify, TransportReply};
use super::transport::{ReqwestTransport, UploadTransport};
use crate::cloud::CloudClient;
use crate::config::connector::ConnectorConfig;
use crate::config::settings::{SettingsStore, NO_TOKEN_MESSAGE};
use crate::errors::{Result, UploadError};
use crate::http_client::HttpClient;
use crate::notifications::{Completion, CompletionNotifier};

/// Asynchronous Strava uploader.
///
/// Cheap to clone; clones share the transport, the notifier and the table of
/// in-flight uploads.
#[derive(Clone)]
pub struct StravaUploader {
    transport: Arc<dyn UploadTransport>,
    notifier: Arc<dyn CompletionNotifier>,
    pending: Arc<PendingUploads>,
    settings: Option<Arc<SettingsStore>>,
}

impl StravaUploader {
    pub fn new(transport: Arc<dyn UploadTransport>, notifier: Arc<dyn CompletionNotifier>) -> Self {
        Self {
            transport,
            notifier,
            pending: Arc::new(PendingUploads::new()),
            settings: None,
        }
    }

    /// Uploader posting through `http` to `config.upload_url`.
    pub fn with_http(
        http: HttpClient,
        config: &ConnectorConfig,
        notifier: Arc<dyn CompletionNotifier>,
    ) -> Self {
        let transport = ReqwestTransport::new(http, config.upload_url.clone());
        Self::new(Arc::new(transport), notifier)
    }

    /// Attach the settings store the access token is read from.
    pub fn with_settings(mut self, settings: SettingsStore) -> Self {
        self.settings = Some(Arc::new(settings));
        self
    }

    /// Check that an access token is configured and return it.
    pub fn open(&self) -> Result<String> {
        match &self.settings {
            Some(settings) => settings.token(),
            None => Err(UploadError::Config(NO_TOKEN_MESSAGE.into())),
        }
    }

    /// Nothing is held open between uploads.
    pub fn close(&self) -> Result<()> {
        Ok(())
    }

    /// Upload using the token from the attached settings store.
    pub fn upload_activity(
        &self,
        payload: Vec<u8>,
        display_name: &str,
        activity_kind: ActivityKind,
    ) -> Result<PendingUpload> {
        let token = self.open()?;
        self.submit_upload(UploadRequest::new(token, payload, display_name, activity_kind))
    }

    /// Submit `request` and return immediately.
    ///
    /// Fails synchronously, before any network activity, when the token is
    /// empty or when called outside a Tokio runtime. Otherwise the POST runs
    /// on a spawned task and the outcome is delivered to the notifier under
    /// the request's display name.
    pub fn submit_upload(&self, request: UploadRequest) -> Result<PendingUpload> {
        if request.token().is_empty() {
            return Err(UploadError::Config(NO_TOKEN_MESSAGE.into()));
        }
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| UploadError::Application(format!("no async runtime for upload: {e}")))?;

        let pending = self.pending.register(request.display_name());
        tracing::debug!(
            handle = %pending.handle,
            remote_name = %pending.remote_name,
            activity_kind = %request.activity_kind(),
            bytes = request.payload().len(),
            "Submitting upload"
        );

        let form = request.into_form();
        let handle = pending.handle;
        let this = self.clone();
        runtime.spawn(async move {
            let transport = this.transport.clone();
            let post = tokio::spawn(async move { transport.post(form).await });
            let reply = match post.await {
                Ok(reply) => reply,
                Err(e) => TransportReply::failed(format!("upload task aborted: {e}")),
            };
            this.on_upload_response(handle, reply).await;
        });

        Ok(pending)
    }

    /// Complete the upload behind `handle` with `reply`.
    ///
    /// Classifies the reply, delivers the completion and forgets the handle.
    /// Returns `None` without notifying if the handle is unknown or was
    /// already completed.
    pub async fn on_upload_response(
        &self,
        handle: UploadHandle,
        reply: TransportReply,
    ) -> Option<UploadOutcome> {
        let Some(pending) = self.pending.complete(handle) else {
            tracing::warn!(%handle, "Ignoring response for unknown or completed upload");
            return None;
        };

        if let Some(error) = &reply.error {
            tracing::debug!(%handle, "Transport reported: {}", error);
        }
        let outcome = classify(&reply);

        let completion = Completion {
            handle,
            remote_name: pending.remote_name,
            outcome: outcome.clone(),
        };
        if let Err(e) = self.notifier.notify_write_complete(&completion).await {
            tracing::warn!(
                %handle,
                notifier = self.notifier.name(),
                "Completion notifier failed: {}",
                e
            );
        }
        Some(outcome)
    }

    /// Number of uploads submitted but not yet completed.
    pub fn in_flight(&self) -> usize {
        self.pending.len()
    }
}

#[async_trait]
impl CloudClient for StravaUploader {
    fn name(&self) -> &str {
        "Strava"
    }

    async fn authenticate(&self) -> Result<()> {
        self.open().map(|_| ())
    }
}
