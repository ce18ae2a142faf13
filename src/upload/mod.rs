mod client;
pub mod selection;
mod types;

pub use client::{AnimationService, HttpAnimationService};
pub use types::{
    FramePreview, OutputFormat, ProcessOptions, ProcessRequest, ProcessResult, SelectedFile,
    UploadedFileRef,
};
