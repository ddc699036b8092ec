pub mod model;
pub mod pending;
pub mod response;
pub mod strava;
pub mod transport;

use async_trait::async_trait;

use crate::errors::Result;

pub use model::{ActivityKind, PendingUpload, UploadHandle, UploadOutcome, UploadRequest};
pub use strava::StravaUploader;

/// Common trait for cloud service integrations.
#[async_trait]
pub trait CloudClient: Send + Sync {
    /// Returns the display name of this cloud provider (e.g. "Strava").
    fn name(&self) -> &str;

    /// Verifies that the service is usable with the stored credentials.
    async fn authenticate(&self) -> Result<()>;
}
