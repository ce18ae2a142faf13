//! Background worker that owns the session controller and runs UI commands
//! one at a time on its own tokio runtime.

use super::controller::SessionController;
use super::view::{Notification, Region, SessionView};
use crate::upload::selection::{filter_picked, PickedFile};
use crate::upload::{AnimationService, FramePreview, ProcessOptions, ProcessResult};
use std::path::PathBuf;
use std::sync::mpsc as std_mpsc;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

pub enum SessionCommand {
    /// Files picked in a dialog or dropped on the window, in that order.
    Select(Vec<PickedFile>),
    Process(ProcessOptions),
    SaveResult(PathBuf),
    Reset,
}

impl SessionCommand {
    fn name(&self) -> &'static str {
        match self {
            SessionCommand::Select(_) => "select",
            SessionCommand::Process(_) => "process",
            SessionCommand::SaveResult(_) => "save_result",
            SessionCommand::Reset => "reset",
        }
    }
}

#[derive(Debug, Clone)]
pub enum ViewUpdate {
    Previews(Vec<FramePreview>),
    Region { region: Region, visible: bool },
    Notify(Notification),
    ClearNotifications,
    Busy(bool),
    Result(ProcessResult),
    ResultPreview(Arc<[u8]>),
    Saved(Option<PathBuf>),
    ResetOptions(ProcessOptions),
}

/// [`SessionView`] that forwards every change to the UI thread.
pub struct ChannelView {
    sender: std_mpsc::Sender<ViewUpdate>,
    repaint: Option<egui::Context>,
}

impl ChannelView {
    pub fn new(sender: std_mpsc::Sender<ViewUpdate>, repaint: Option<egui::Context>) -> Self {
        Self { sender, repaint }
    }

    fn send(&self, update: ViewUpdate) {
        if self.sender.send(update).is_err() {
            debug!("ui went away, dropping view update");
            return;
        }
        if let Some(ctx) = &self.repaint {
            ctx.request_repaint();
        }
    }
}

impl SessionView for ChannelView {
    fn show_previews(&mut self, previews: &[FramePreview]) {
        self.send(ViewUpdate::Previews(previews.to_vec()));
    }

    fn set_region_visible(&mut self, region: Region, visible: bool) {
        self.send(ViewUpdate::Region { region, visible });
    }

    fn notify(&mut self, notification: Notification) {
        self.send(ViewUpdate::Notify(notification));
    }

    fn clear_notifications(&mut self) {
        self.send(ViewUpdate::ClearNotifications);
    }

    fn set_busy(&mut self, busy: bool) {
        self.send(ViewUpdate::Busy(busy));
    }

    fn show_result(&mut self, result: &ProcessResult) {
        self.send(ViewUpdate::Result(result.clone()));
    }

    fn show_result_preview(&mut self, bytes: Arc<[u8]>) {
        self.send(ViewUpdate::ResultPreview(bytes));
    }

    fn show_saved(&mut self, path: Option<PathBuf>) {
        self.send(ViewUpdate::Saved(path));
    }

    fn reset_options(&mut self, options: ProcessOptions) {
        self.send(ViewUpdate::ResetOptions(options));
    }
}

pub struct SessionHandle {
    pub commands: mpsc::UnboundedSender<SessionCommand>,
    pub updates: std_mpsc::Receiver<ViewUpdate>,
}

/// Starts the worker thread. It exits once every command sender is dropped.
pub fn spawn(
    service: Arc<dyn AnimationService>,
    repaint: Option<egui::Context>,
) -> std::io::Result<SessionHandle> {
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (update_tx, update_rx) = std_mpsc::channel();
    let view = ChannelView::new(update_tx, repaint);

    std::thread::Builder::new()
        .name("session-worker".to_string())
        .spawn(move || {
            let rt = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(rt) => rt,
                Err(e) => {
                    error!(error = %e, "failed to build session runtime");
                    return;
                }
            };
            rt.block_on(run(SessionController::new(service, view), command_rx));
        })?;

    Ok(SessionHandle {
        commands: command_tx,
        updates: update_rx,
    })
}

pub async fn run<V: SessionView>(
    mut controller: SessionController<V>,
    mut commands: mpsc::UnboundedReceiver<SessionCommand>,
) {
    while let Some(command) = commands.recv().await {
        debug!(command = command.name(), "handling session command");
        handle(&mut controller, command).await;
    }
    debug!("session worker stopped");
}

async fn handle<V: SessionView>(controller: &mut SessionController<V>, command: SessionCommand) {
    match command {
        SessionCommand::Select(picked) => {
            let offered = picked.len();
            let survivors = filter_picked(picked);
            debug!(offered, reading = survivors.len(), "reading selected files");

            controller.set_busy(true);
            let mut files = Vec::with_capacity(survivors.len());
            for entry in survivors {
                match entry.load().await {
                    Ok(file) => files.push(file),
                    Err(e) => warn!(error = %e, "skipping unreadable selection"),
                }
            }
            controller.select_files(files).await;
        }
        SessionCommand::Process(options) => controller.process(options).await,
        SessionCommand::SaveResult(dest) => controller.save_result(&dest).await,
        SessionCommand::Reset => controller.reset(),
    }
    // The UI marks itself busy on dispatch; every command ends idle.
    controller.set_busy(false);
}
