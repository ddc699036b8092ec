use async_trait::async_trait;

use super::model::UploadForm;
use super::response::{first_line, TransportReply};
use crate::http_client::HttpClient;

/// Upper bound on bytes kept while looking for the end of the first line.
pub const MAX_FIRST_LINE: usize = 64 * 1024;

/// Sends one upload form and reports what came back.
///
/// Implementations never return an error: every failure is folded into
/// [`TransportReply::error`] so the completion path always fires.
#[async_trait]
pub trait UploadTransport: Send + Sync {
    async fn post(&self, form: UploadForm) -> TransportReply;
}

/// `reqwest`-backed transport posting to a fixed upload URL.
pub struct ReqwestTransport {
    http: HttpClient,
    upload_url: String,
}

impl ReqwestTransport {
    pub fn new(http: HttpClient, upload_url: impl Into<String>) -> Self {
        Self {
            http,
            upload_url: upload_url.into(),
        }
    }

    pub fn upload_url(&self) -> &str {
        &self.upload_url
    }
}

#[async_trait]
impl UploadTransport for ReqwestTransport {
    async fn post(&self, form: UploadForm) -> TransportReply {
        let form = match form.into_multipart() {
            Ok(form) => form,
            Err(e) => return TransportReply::failed(format!("failed to build upload form: {e}")),
        };

        let client = self.http.get_client().await;
        let resp = match client.post(&self.upload_url).multipart(form).send().await {
            Ok(resp) => resp,
            Err(e) => {
                tracing::warn!(url = %self.upload_url, "Upload request failed: {}", e);
                return TransportReply::failed(e.to_string());
            }
        };

        let status = resp.status();
        let (body, read_error) = match read_first_line(resp).await {
            Ok(body) => (Some(body), None),
            Err(e) => {
                tracing::warn!(%status, "Failed to read upload response body: {}", e);
                (None, Some(e.to_string()))
            }
        };
        tracing::debug!(%status, body = body.as_deref(), "Upload response");

        let error = if status.is_success() {
            read_error
        } else {
            Some(format!("HTTP {status}"))
        };

        TransportReply {
            first_line: body,
            error,
        }
    }
}

/// Stream the body until the first line break; the rest is never buffered.
async fn read_first_line(mut resp: reqwest::Response) -> reqwest::Result<String> {
    let mut buf = Vec::new();
    while let Some(chunk) = resp.chunk().await? {
        match chunk.iter().position(|&b| b == b'\n') {
            Some(end) => {
                buf.extend_from_slice(&chunk[..end]);
                break;
            }
            None => buf.extend_from_slice(&chunk),
        }
        if buf.len() >= MAX_FIRST_LINE {
            buf.truncate(MAX_FIRST_LINE);
            break;
        }
    }
    Ok(first_line(&String::from_utf8_lossy(&buf)).to_string())
}
