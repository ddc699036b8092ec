//! Upload data model: request, handle, pending entry, outcome and the
//! inspectable multipart form sent to Strava.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, UploadError};

/// Payload format tag: gzip-compressed TCX.
pub const DATA_TYPE: &str = "tcx.gz";
/// Placeholder sent as `external_id`.
pub const EXTERNAL_ID: &str = "Ride";
pub const FILE_NAME: &str = "file.tcx.gz";
pub const FILE_CONTENT_TYPE: &str = "text/xml";

/// Activity classification sent as `activity_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    #[default]
    Ride,
    Run,
    Swim,
}

impl ActivityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityKind::Run => "run",
            ActivityKind::Swim => "swim",
            ActivityKind::Ride => "ride",
        }
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityKind {
    type Err = UploadError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "ride" | "bike" | "cycling" => Ok(ActivityKind::Ride),
            "run" | "running" => Ok(ActivityKind::Run),
            "swim" | "swimming" => Ok(ActivityKind::Swim),
            other => Err(UploadError::Command(format!(
                "unknown activity kind '{other}' (expected ride, run or swim)"
            ))),
        }
    }
}

/// One upload, built fresh per attempt and immutable afterwards.
#[derive(Clone)]
pub struct UploadRequest {
    token: String,
    payload: Vec<u8>,
    display_name: String,
    activity_kind: ActivityKind,
}

impl UploadRequest {
    pub fn new(
        token: impl Into<String>,
        payload: Vec<u8>,
        display_name: impl Into<String>,
        activity_kind: ActivityKind,
    ) -> Self {
        Self {
            token: token.into(),
            payload,
            display_name: display_name.into(),
            activity_kind,
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn activity_kind(&self) -> ActivityKind {
        self.activity_kind
    }

    /// Build the multipart body. Field order matches what Strava's uploader expects.
    pub fn into_form(self) -> UploadForm {
        UploadForm {
            fields: vec![
                FormField::text("access_token", self.token),
                FormField::text("activity_type", self.activity_kind.as_str()),
                FormField::text("activity_name", self.display_name),
                FormField::text("data_type", DATA_TYPE),
                FormField::text("external_id", EXTERNAL_ID),
                FormField::File {
                    name: "file".into(),
                    file_name: FILE_NAME.into(),
                    content_type: FILE_CONTENT_TYPE.into(),
                    data: self.payload,
                },
            ],
        }
    }
}

// The token never reaches logs through Debug.
impl fmt::Debug for UploadRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadRequest")
            .field("token", &"<redacted>")
            .field("payload_len", &self.payload.len())
            .field("display_name", &self.display_name)
            .field("activity_kind", &self.activity_kind)
            .finish()
    }
}

/// Opaque id of one in-flight upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UploadHandle(u64);

impl UploadHandle {
    pub(crate) fn from_raw(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for UploadHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "upload-{}", self.0)
    }
}

/// Correlates an in-flight operation with the caller's name for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingUpload {
    pub handle: UploadHandle,
    pub remote_name: String,
}

/// Result of one upload attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadOutcome {
    pub success: bool,
    pub message: String,
    /// Strava's upload id when the response carried one. Informational only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upload_id: Option<u64>,
}

/// A single multipart field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormField {
    Text {
        name: String,
        value: String,
    },
    File {
        name: String,
        file_name: String,
        content_type: String,
        data: Vec<u8>,
    },
}

impl FormField {
    fn text(name: &str, value: impl Into<String>) -> Self {
        FormField::Text {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            FormField::Text { name, .. } | FormField::File { name, .. } => name,
        }
    }
}

/// Multipart body in a form the transport can convert and tests can inspect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadForm {
    pub fields: Vec<FormField>,
}

impl UploadForm {
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(FormField::name).collect()
    }

    /// Value of a text field.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.iter().find_map(|f| match f {
            FormField::Text { name: n, value } if n == name => Some(value.as_str()),
            _ => None,
        })
    }

    /// The file field, if any.
    pub fn file(&self) -> Option<&FormField> {
        self.fields
            .iter()
            .find(|f| matches!(f, FormField::File { .. }))
    }

    /// Convert into a `reqwest` multipart form, preserving field order.
    pub fn into_multipart(self) -> Result<reqwest::multipart::Form> {
        let mut form = reqwest::multipart::Form::new();
        for field in self.fields {
            form = match field {
                FormField::Text { name, value } => form.text(name, value),
                FormField::File {
                    name,
                    file_name,
                    content_type,
                    data,
                } => {
                    let part = reqwest::multipart::Part::bytes(data)
                        .file_name(file_name)
                        .mime_str(&content_type)?;
                    form.part(name, part)
                }
            };
        }
        Ok(form)
    }
}
