use derivative::Derivative;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// A user-chosen image held by the client until it is uploaded.
#[derive(Derivative, Clone, PartialEq)]
#[derivative(Debug)]
pub struct SelectedFile {
    pub name: String,
    pub mime: String,
    #[derivative(Debug = "ignore")]
    pub bytes: Arc<[u8]>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, mime: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            bytes: bytes.into(),
        }
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// Server-issued reference to a stored upload. The client never looks inside,
/// it only hands the value back on the next call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UploadedFileRef(serde_json::Value);

impl UploadedFileRef {
    pub fn new(value: serde_json::Value) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Apng,
    Webp,
    Avif,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 3] = [OutputFormat::Apng, OutputFormat::Webp, OutputFormat::Avif];

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Apng => "apng",
            OutputFormat::Webp => "webp",
            OutputFormat::Avif => "avif",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            OutputFormat::Apng => "APNG",
            OutputFormat::Webp => "WebP (animated)",
            OutputFormat::Avif => "AVIF (animated)",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of `POST /process`.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessRequest {
    pub files: Vec<UploadedFileRef>,
    pub format: OutputFormat,
    pub duration: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProcessResult {
    pub file_path: String,
    pub file_name: String,
}

/// User-editable processing options.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessOptions {
    pub format: OutputFormat,
    pub duration: f64,
}

impl ProcessOptions {
    pub const DEFAULT_DURATION: f64 = 0.5;
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            duration: Self::DEFAULT_DURATION,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FramePreview {
    pub label: String,
    pub file: SelectedFile,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn process_request_serializes_opaque_refs_verbatim() {
        let request = ProcessRequest {
            files: vec![
                UploadedFileRef::new(json!("uploads/1.png")),
                UploadedFileRef::new(json!({"id": 7, "path": "uploads/2.png"})),
            ],
            format: OutputFormat::Webp,
            duration: 0.25,
        };

        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(
            body,
            json!({
                "files": ["uploads/1.png", {"id": 7, "path": "uploads/2.png"}],
                "format": "webp",
                "duration": 0.25,
            })
        );
    }

    #[test]
    fn default_options_are_apng_at_half_a_second() {
        let options = ProcessOptions::default();
        assert_eq!(options.format, OutputFormat::Apng);
        assert_eq!(options.duration, 0.5);
    }

    #[test]
    fn debug_output_skips_image_bytes() {
        let file = SelectedFile::new("cat.png", "image/png", vec![1u8; 4096]);
        let debug = format!("{:?}", file);
        assert!(debug.contains("cat.png"));
        assert!(!debug.contains("bytes"));
    }
}
