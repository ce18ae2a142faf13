mod state;
mod ui;

use crate::session::{self, SessionCommand, SessionHandle};
use crate::upload::selection::{guess_mime, PickedFile};
use crate::upload::{AnimationService, SelectedFile};
use eframe::{egui, App};
use state::ViewModel;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

pub struct BlinkyApp {
    server_label: String,
    session: SessionHandle,
    view: ViewModel,
    preview_textures: Vec<Option<egui::TextureHandle>>,
    result_texture: Option<egui::TextureHandle>,
}

impl BlinkyApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        service: Arc<dyn AnimationService>,
        server_label: String,
    ) -> std::io::Result<Self> {
        info!(server = %server_label, "initializing animation uploader");
        let session = session::spawn(service, Some(cc.egui_ctx.clone()))?;
        Ok(Self {
            server_label,
            session,
            view: ViewModel::default(),
            preview_textures: Vec::new(),
            result_texture: None,
        })
    }

    /// Sends a command that talks to the server, locking the pick area and
    /// process button until the worker reports back.
    fn dispatch_busy(&mut self, command: SessionCommand) {
        self.view.busy = true;
        self.dispatch(command);
    }

    fn dispatch(&mut self, command: SessionCommand) {
        if self.session.commands.send(command).is_err() {
            error!("session worker is gone");
            self.view.busy = false;
            self.view.apply(
                session::ViewUpdate::Notify(session::Notification::error(
                    "The background worker stopped; restart the application.",
                )),
                Instant::now(),
            );
        }
    }

    pub fn pick_files(&mut self) {
        if let Some(paths) = rfd::FileDialog::new()
            .add_filter("Images", &["jpg", "jpeg", "png", "webp"])
            .pick_files()
        {
            self.select(paths.into_iter().map(PickedFile::Path).collect());
        }
    }

    fn select(&mut self, picked: Vec<PickedFile>) {
        if picked.is_empty() {
            return;
        }
        debug!(count = picked.len(), "files chosen");
        self.dispatch_busy(SessionCommand::Select(picked));
    }

    pub fn start_process(&mut self) {
        let options = self.view.options();
        self.dispatch_busy(SessionCommand::Process(options));
    }

    pub fn save_result(&mut self) {
        let Some(result) = &self.view.result else {
            return;
        };
        if let Some(dest) = rfd::FileDialog::new()
            .set_file_name(&result.file_name)
            .save_file()
        {
            self.dispatch_busy(SessionCommand::SaveResult(dest));
        }
    }

    pub fn reset(&mut self) {
        self.dispatch(SessionCommand::Reset);
    }

    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let (hovering, dropped) = ctx.input(|i| {
            (
                !i.raw.hovered_files.is_empty(),
                i.raw.dropped_files.clone(),
            )
        });
        self.view.drag_hover = hovering && self.view.can_select();

        if dropped.is_empty() || !self.view.can_select() {
            return;
        }

        self.select(picked_from_dropped(dropped));
    }

    pub fn update_state(&mut self, ctx: &egui::Context) {
        let now = Instant::now();
        while let Ok(update) = self.session.updates.try_recv() {
            self.view.apply(update, now);
        }
        self.view.expire_notifications(now);

        if self.view.previews_changed {
            self.view.previews_changed = false;
            self.preview_textures = self
                .view
                .previews
                .iter()
                .enumerate()
                .map(|(i, preview)| ui::decode_texture(ctx, &format!("frame-{i}"), &preview.file.bytes))
                .collect();
        }
        if self.view.result_preview_changed {
            self.view.result_preview_changed = false;
            self.result_texture = self
                .view
                .result_preview
                .as_ref()
                .and_then(|bytes| ui::decode_texture(ctx, "result", bytes));
        }

        if self.view.busy || self.view.notification.is_some() {
            ctx.request_repaint_after(std::time::Duration::from_millis(250));
        }
    }
}

/// Dropped entries in drop order: on-disk paths stay lazy, byte-only drops
/// carry their contents.
fn picked_from_dropped(dropped: Vec<egui::DroppedFile>) -> Vec<PickedFile> {
    dropped
        .into_iter()
        .filter_map(|file| match (file.path, file.bytes) {
            (Some(path), _) => Some(PickedFile::Path(path)),
            (None, Some(bytes)) => {
                let mime = guess_mime(&file.name);
                Some(PickedFile::InMemory(SelectedFile::new(file.name, mime, bytes)))
            }
            (None, None) => None,
        })
        .collect()
}

impl App for BlinkyApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_dropped_files(ctx);
        self.update_state(ctx);
        self.render(ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn on_disk(path: &str) -> egui::DroppedFile {
        egui::DroppedFile {
            path: Some(PathBuf::from(path)),
            ..Default::default()
        }
    }

    fn in_memory(name: &str) -> egui::DroppedFile {
        egui::DroppedFile {
            name: name.to_string(),
            bytes: Some(Arc::from(name.as_bytes())),
            ..Default::default()
        }
    }

    #[test]
    fn mixed_drop_keeps_every_file_in_order() {
        let picked = picked_from_dropped(vec![
            in_memory("first.png"),
            on_disk("/photos/second.jpg"),
            in_memory("third.webp"),
            egui::DroppedFile::default(),
        ]);

        assert_eq!(
            picked,
            vec![
                PickedFile::InMemory(SelectedFile::new("first.png", "image/png", b"first.png".to_vec())),
                PickedFile::Path(PathBuf::from("/photos/second.jpg")),
                PickedFile::InMemory(SelectedFile::new("third.webp", "image/webp", b"third.webp".to_vec())),
            ]
        );
    }
}
