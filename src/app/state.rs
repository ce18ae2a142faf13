use crate::session::{Notification, NotificationKind, Region, ViewUpdate};
use crate::upload::{FramePreview, OutputFormat, ProcessOptions, ProcessResult};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

pub const SUCCESS_NOTICE_TTL: Duration = Duration::from_secs(5);

pub struct ShownNotification {
    pub notification: Notification,
    pub shown_at: Instant,
}

/// Everything the window renders, rebuilt from the worker's view updates.
pub struct ViewModel {
    pub upload_prompt_visible: bool,
    pub previews_visible: bool,
    pub options_visible: bool,
    pub result_visible: bool,
    pub previews: Vec<FramePreview>,
    pub notification: Option<ShownNotification>,
    pub busy: bool,
    pub result: Option<ProcessResult>,
    pub result_preview: Option<Arc<[u8]>>,
    pub saved_to: Option<PathBuf>,
    pub format: OutputFormat,
    pub duration_text: String,
    pub drag_hover: bool,
    pub previews_changed: bool,
    pub result_preview_changed: bool,
}

impl Default for ViewModel {
    fn default() -> Self {
        let options = ProcessOptions::default();
        Self {
            upload_prompt_visible: true,
            previews_visible: false,
            options_visible: false,
            result_visible: false,
            previews: Vec::new(),
            notification: None,
            busy: false,
            result: None,
            result_preview: None,
            saved_to: None,
            format: options.format,
            duration_text: options.duration.to_string(),
            drag_hover: false,
            previews_changed: false,
            result_preview_changed: false,
        }
    }
}

impl ViewModel {
    pub fn apply(&mut self, update: ViewUpdate, now: Instant) {
        match update {
            ViewUpdate::Previews(previews) => {
                self.previews = previews;
                self.previews_changed = true;
            }
            ViewUpdate::Region { region, visible } => match region {
                Region::UploadPrompt => self.upload_prompt_visible = visible,
                Region::Previews => self.previews_visible = visible,
                Region::Options => self.options_visible = visible,
                Region::Result => {
                    self.result_visible = visible;
                    if !visible {
                        self.result = None;
                        self.result_preview = None;
                        self.result_preview_changed = true;
                    }
                }
            },
            ViewUpdate::Notify(notification) => {
                self.notification = Some(ShownNotification {
                    notification,
                    shown_at: now,
                });
            }
            ViewUpdate::ClearNotifications => self.notification = None,
            ViewUpdate::Busy(busy) => self.busy = busy,
            ViewUpdate::Result(result) => {
                self.result = Some(result);
                self.result_preview = None;
                self.result_preview_changed = true;
            }
            ViewUpdate::ResultPreview(bytes) => {
                self.result_preview = Some(bytes);
                self.result_preview_changed = true;
            }
            ViewUpdate::Saved(path) => self.saved_to = path,
            ViewUpdate::ResetOptions(options) => {
                self.format = options.format;
                self.duration_text = options.duration.to_string();
            }
        }
    }

    /// Success notices fade after [`SUCCESS_NOTICE_TTL`]; errors stay until replaced.
    pub fn expire_notifications(&mut self, now: Instant) {
        let expired = self.notification.as_ref().is_some_and(|shown| {
            shown.notification.kind == NotificationKind::Success
                && now.duration_since(shown.shown_at) >= SUCCESS_NOTICE_TTL
        });
        if expired {
            self.notification = None;
        }
    }

    /// Reads the duration field. Anything that is not a number becomes NaN so
    /// the controller rejects it.
    pub fn options(&self) -> ProcessOptions {
        ProcessOptions {
            format: self.format,
            duration: self.duration_text.trim().parse().unwrap_or(f64::NAN),
        }
    }

    pub fn can_select(&self) -> bool {
        self.upload_prompt_visible && !self.busy
    }

    pub fn can_process(&self) -> bool {
        self.options_visible && !self.busy
    }
}
