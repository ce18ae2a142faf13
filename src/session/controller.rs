use super::view::{Notification, Region, SessionView};
use crate::error::ServiceError;
use crate::upload::selection::{filter_selection, frame_previews};
use crate::upload::{
    AnimationService, ProcessOptions, ProcessRequest, ProcessResult, SelectedFile,
    UploadedFileRef,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

const MSG_NO_VALID_FILES: &str = "Please select a valid image file (JPG/PNG/WebP).";
const MSG_UPLOAD_OK: &str = "Files uploaded successfully!";
const MSG_UPLOAD_REJECTED: &str = "Upload failed.";
const MSG_UPLOAD_ERROR: &str = "An error occurred during upload.";
const MSG_NOTHING_UPLOADED: &str = "Upload images before generating an animation.";
const MSG_BAD_DURATION: &str = "Frame duration must be a positive number of seconds.";
const MSG_PROCESS_OK: &str = "Animation generated successfully!";
const MSG_PROCESS_REJECTED: &str = "Animation generation failed.";
const MSG_PROCESS_ERROR: &str = "A processing error occurred.";
const MSG_NOTHING_TO_SAVE: &str = "There is no animation to save yet.";
const MSG_SAVE_ERROR: &str = "Failed to save the animation.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    FilesStaged,
    ResultReady,
}

#[derive(Debug, Default)]
pub struct SessionState {
    pub phase: Phase,
    pub selected: Vec<SelectedFile>,
    pub uploaded: Vec<UploadedFileRef>,
    pub result: Option<ProcessResult>,
    pub saved_to: Option<PathBuf>,
}

impl SessionState {
    pub fn clear(&mut self) {
        *self = SessionState::default();
    }
}

pub struct SessionController<V: SessionView> {
    service: Arc<dyn AnimationService>,
    view: V,
    state: SessionState,
}

impl<V: SessionView> SessionController<V> {
    pub fn new(service: Arc<dyn AnimationService>, view: V) -> Self {
        Self {
            service,
            view,
            state: SessionState::default(),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub(super) fn set_busy(&mut self, busy: bool) {
        self.view.set_busy(busy);
    }

    /// Filters a raw selection and uploads whatever survives.
    pub async fn select_files(&mut self, files: Vec<SelectedFile>) {
        let offered = files.len();
        let valid = filter_selection(files);
        debug!(offered, accepted = valid.len(), "filtered file selection");

        if valid.is_empty() {
            self.view.notify(Notification::error(MSG_NO_VALID_FILES));
            return;
        }

        self.upload(valid).await;
    }

    async fn upload(&mut self, files: Vec<SelectedFile>) {
        info!(count = files.len(), "uploading images");

        self.set_busy(true);
        let outcome = self.service.upload(&files).await;
        self.set_busy(false);

        let uploaded = match outcome {
            Ok(uploaded) => uploaded,
            Err(e) => {
                error!(error = %e, "upload failed");
                let message = match e {
                    ServiceError::Rejected { .. } => MSG_UPLOAD_REJECTED,
                    _ => MSG_UPLOAD_ERROR,
                };
                self.view.notify(Notification::error(message));
                return;
            }
        };

        if uploaded.is_empty() {
            warn!("server accepted the upload but returned no file references");
        }

        self.state.uploaded = uploaded;
        self.state.selected = files;
        self.state.result = None;
        self.state.saved_to = None;
        self.state.phase = Phase::FilesStaged;

        self.view.show_previews(&frame_previews(&self.state.selected));
        self.view.set_region_visible(Region::Previews, true);
        self.view.set_region_visible(Region::UploadPrompt, false);
        self.view.set_region_visible(Region::Options, true);
        self.view.set_region_visible(Region::Result, false);
        self.view.notify(Notification::success(MSG_UPLOAD_OK));
    }

    pub async fn process(&mut self, options: ProcessOptions) {
        if self.state.uploaded.is_empty() {
            self.view.notify(Notification::error(MSG_NOTHING_UPLOADED));
            return;
        }
        if !(options.duration.is_finite() && options.duration > 0.0) {
            self.view.notify(Notification::error(MSG_BAD_DURATION));
            return;
        }

        let request = ProcessRequest {
            files: self.state.uploaded.clone(),
            format: options.format,
            duration: options.duration,
        };
        info!(format = %request.format, duration = request.duration, "requesting animation");

        self.set_busy(true);
        let outcome = self.service.process(&request).await;

        let result = match outcome {
            Ok(result) => result,
            Err(e) => {
                self.set_busy(false);
                error!(error = %e, "processing failed");
                let message = match &e {
                    ServiceError::Rejected { .. } => e
                        .server_message()
                        .unwrap_or(MSG_PROCESS_REJECTED)
                        .to_string(),
                    _ => MSG_PROCESS_ERROR.to_string(),
                };
                self.view.notify(Notification::error(message));
                return;
            }
        };

        self.state.result = Some(result.clone());
        self.state.saved_to = None;
        self.state.phase = Phase::ResultReady;
        self.view.show_result(&result);
        self.view.show_saved(None);
        self.view.set_region_visible(Region::Result, true);
        self.view.notify(Notification::success(MSG_PROCESS_OK));

        match self.service.fetch_asset(&result.file_path).await {
            Ok(bytes) => self.view.show_result_preview(bytes.into()),
            Err(e) => warn!(error = %e, file_path = %result.file_path, "could not load result preview"),
        }
        self.set_busy(false);
    }

    /// Downloads the generated asset and writes it to `dest`.
    pub async fn save_result(&mut self, dest: &Path) {
        let Some(result) = self.state.result.clone() else {
            self.view.notify(Notification::error(MSG_NOTHING_TO_SAVE));
            return;
        };

        self.set_busy(true);
        let written = match self.service.fetch_asset(&result.file_path).await {
            Ok(bytes) => tokio::fs::write(dest, bytes).await.map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };
        self.set_busy(false);

        match written {
            Ok(()) => {
                info!(dest = %dest.display(), "saved animation");
                self.state.saved_to = Some(dest.to_path_buf());
                self.view.show_saved(Some(dest.to_path_buf()));
                self.view
                    .notify(Notification::success(format!("Saved {}.", result.file_name)));
            }
            Err(e) => {
                error!(error = %e, dest = %dest.display(), "saving animation failed");
                self.view.notify(Notification::error(MSG_SAVE_ERROR));
            }
        }
    }

    pub fn reset(&mut self) {
        info!("resetting session");
        self.state.clear();

        self.view.show_previews(&[]);
        self.view.set_region_visible(Region::UploadPrompt, true);
        self.view.set_region_visible(Region::Previews, false);
        self.view.set_region_visible(Region::Options, false);
        self.view.set_region_visible(Region::Result, false);
        self.view.show_saved(None);
        self.view.clear_notifications();
        self.view.set_busy(false);
        self.view.reset_options(ProcessOptions::default());
    }
}
