use crate::upload::{FramePreview, ProcessOptions, ProcessResult};
use std::path::PathBuf;
use std::sync::Arc;

/// Areas of the window the controller shows and hides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    UploadPrompt,
    Previews,
    Options,
    Result,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub text: String,
}

impl Notification {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Error,
            text: text.into(),
        }
    }
}

/// Presentation surface driven by the session controller.
pub trait SessionView: Send {
    fn show_previews(&mut self, previews: &[FramePreview]);
    fn set_region_visible(&mut self, region: Region, visible: bool);
    /// Replaces whatever notification is currently shown.
    fn notify(&mut self, notification: Notification);
    fn clear_notifications(&mut self);
    fn set_busy(&mut self, busy: bool);
    fn show_result(&mut self, result: &ProcessResult);
    fn show_result_preview(&mut self, bytes: Arc<[u8]>);
    fn show_saved(&mut self, path: Option<PathBuf>);
    fn reset_options(&mut self, options: ProcessOptions);
}
