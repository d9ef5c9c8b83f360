// app.rs
pub mod converter;
pub mod dialogs;
pub mod gui;
pub mod selection;

use eframe::egui;
use eframe::App as EframeApp;
use std::path::PathBuf;
use std::sync::Arc;
use parking_lot::Mutex;
use std::sync::mpsc::{Receiver, TryRecvError};

use crate::app::converter::{ConversionOutcome, ConversionReport, ExternalTool, PreconditionError};
use crate::app::selection::Selection;
use crate::utils::Logger;

pub struct App {
    pub selection: Selection,
    pub tool: ExternalTool,
    pub file_statuses: Vec<FileStatus>,
    pub conversion_progress: ConversionProgress,
    pub currently_processing: Option<usize>,
    pub log_messages: Arc<Mutex<Vec<String>>>,
    pub logger: Logger,
    pub conversion_receiver: Option<Receiver<ConversionUpdate>>,
    pub last_report: Option<ConversionReport>,
}

pub enum ConversionUpdate {
    FileStarted(usize, usize),  // (index, total)
    FileFinished(usize, ConversionOutcome),
    Completed(Result<ConversionReport, PreconditionError>),
}

#[derive(Default)]
pub struct ConversionProgress {
    pub total: usize,
    pub completed: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FileStatus {
    Pending,
    Converting,
    Converted,
    Failed(String),
}

impl FileStatus {
    pub fn label(&self) -> &str {
        match self {
            FileStatus::Pending => "Pending",
            FileStatus::Converting => "Converting...",
            FileStatus::Converted => "Converted",
            FileStatus::Failed(_) => "Failed",
        }
    }
}

impl Default for App {
    fn default() -> Self {
        let log_messages = Arc::new(Mutex::new(Vec::new()));
        Self {
            selection: Selection::default(),
            tool: ExternalTool::from_env(),
            file_statuses: Vec::new(),
            conversion_progress: ConversionProgress::default(),
            currently_processing: None,
            logger: Logger::new(log_messages.clone()),
            log_messages,
            conversion_receiver: None,
            last_report: None,
        }
    }
}

impl App {
    pub fn is_converting(&self) -> bool {
        self.conversion_receiver.is_some()
    }

    pub fn convert_enabled(&self) -> bool {
        self.selection.can_convert() && !self.is_converting()
    }

    /// Used by both the file picker and drag-and-drop.
    pub fn replace_input_files(&mut self, files: Vec<PathBuf>) {
        if self.is_converting() {
            self.logger.log("Selection ignored, a conversion is running");
            return;
        }
        self.selection.set_input_files(files);
        self.file_statuses = vec![FileStatus::Pending; self.selection.input_files().len()];
        self.conversion_progress = ConversionProgress::default();
        self.last_report = None;
        self.logger.log(format!(
            "{} file(s) selected: {}",
            self.selection.input_files().len(),
            self.selection.display_names().join(", ")
        ));
    }

    pub fn choose_destination(&mut self, folder: PathBuf) {
        if self.selection.set_destination(folder) {
            if let Some(dest) = self.selection.destination() {
                self.logger.log(format!("Destination folder: {}", dest.display()));
            }
        }
    }

    /// Drains the worker channel. Returns whether anything changed and the
    /// finished batch result, if any.
    pub fn poll_worker(&mut self) -> (bool, Option<Result<ConversionReport, PreconditionError>>) {
        let mut updates = Vec::new();
        let mut disconnected = false;
        if let Some(receiver) = &self.conversion_receiver {
            loop {
                match receiver.try_recv() {
                    Ok(update) => updates.push(update),
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        disconnected = true;
                        break;
                    }
                }
            }
        }

        let mut changed = !updates.is_empty();
        let mut finished = None;
        for update in updates {
            if let Some(result) = self.apply_update(update) {
                finished = Some(result);
            }
        }

        // Worker gone without a Completed message
        if disconnected && self.conversion_receiver.is_some() {
            self.conversion_receiver = None;
            self.currently_processing = None;
            self.logger.log("Conversion worker stopped unexpectedly, error: no result received");
            changed = true;
        }
        (changed, finished)
    }

    pub fn apply_update(
        &mut self,
        update: ConversionUpdate,
    ) -> Option<Result<ConversionReport, PreconditionError>> {
        match update {
            ConversionUpdate::FileStarted(index, total) => {
                self.currently_processing = Some(index);
                self.conversion_progress.total = total;
                if let Some(status) = self.file_statuses.get_mut(index) {
                    *status = FileStatus::Converting;
                }
                None
            }
            ConversionUpdate::FileFinished(index, outcome) => {
                self.conversion_progress.completed += 1;
                if let Some(status) = self.file_statuses.get_mut(index) {
                    *status = match outcome {
                        ConversionOutcome::Success { .. } => FileStatus::Converted,
                        ConversionOutcome::Failure(failure) => FileStatus::Failed(failure.detail),
                    };
                }
                None
            }
            ConversionUpdate::Completed(result) => {
                self.currently_processing = None;
                self.conversion_receiver = None;
                if let Ok(report) = &result {
                    self.last_report = Some(report.clone());
                }
                Some(result)
            }
        }
    }
}

impl EframeApp for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let (needs_redraw, finished) = self.poll_worker();

        let dropped: Vec<PathBuf> = ctx
            .input()
            .raw
            .dropped_files
            .iter()
            .filter_map(|file| file.path.clone())
            .collect();
        if !dropped.is_empty() {
            self.replace_input_files(dropped);
        }

        // Render the GUI
        gui::render(self, ctx);

        match finished {
            Some(Ok(report)) => dialogs::show_report(&report),
            Some(Err(error)) => dialogs::show_precondition_error(&error),
            None => {}
        }

        if needs_redraw {
            ctx.request_repaint();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::converter::ConversionFailure;
    use std::sync::mpsc::channel;

    fn app_with_files(names: &[&str]) -> App {
        let mut app = App::default();
        app.replace_input_files(names.iter().map(|name| PathBuf::from(*name)).collect());
        app
    }

    #[test]
    fn convert_waits_for_destination() {
        let mut app = app_with_files(&["a.avif"]);
        assert!(!app.convert_enabled());
        app.choose_destination(PathBuf::from("/out"));
        assert!(app.convert_enabled());
    }

    #[test]
    fn convert_disabled_while_batch_runs() {
        let mut app = app_with_files(&["a.avif"]);
        app.choose_destination(PathBuf::from("/out"));
        let (_sender, receiver) = channel();
        app.conversion_receiver = Some(receiver);
        assert!(!app.convert_enabled());
    }

    #[test]
    fn updates_drive_file_statuses() {
        let mut app = app_with_files(&["a.avif", "b.avif"]);

        app.apply_update(ConversionUpdate::FileStarted(0, 2));
        assert_eq!(app.file_statuses[0], FileStatus::Converting);
        assert_eq!(app.currently_processing, Some(0));

        app.apply_update(ConversionUpdate::FileFinished(
            0,
            ConversionOutcome::Success { output: PathBuf::from("/out/a.jpg") },
        ));
        app.apply_update(ConversionUpdate::FileStarted(1, 2));
        app.apply_update(ConversionUpdate::FileFinished(
            1,
            ConversionOutcome::Failure(ConversionFailure {
                file_name: "b.avif".to_string(),
                detail: "exited with code 1: broken".to_string(),
            }),
        ));

        assert_eq!(app.file_statuses[0], FileStatus::Converted);
        assert_eq!(app.file_statuses[1], FileStatus::Failed("exited with code 1: broken".to_string()));
        assert_eq!(app.conversion_progress.completed, 2);
        assert_eq!(app.conversion_progress.total, 2);
    }

    #[test]
    fn completion_releases_receiver() {
        let mut app = app_with_files(&["a.avif"]);
        let (_sender, receiver) = channel();
        app.conversion_receiver = Some(receiver);

        let result = app.apply_update(ConversionUpdate::Completed(Err(PreconditionError::NoDestination)));

        assert_eq!(result, Some(Err(PreconditionError::NoDestination)));
        assert!(!app.is_converting());
        assert!(app.last_report.is_none());
    }

    #[test]
    fn dead_worker_releases_buttons() {
        let mut app = app_with_files(&["a.avif"]);
        app.choose_destination(PathBuf::from("/out"));
        let (sender, receiver) = channel();
        app.conversion_receiver = Some(receiver);
        sender.send(ConversionUpdate::FileStarted(0, 1)).unwrap();
        drop(sender);

        let (changed, finished) = app.poll_worker();

        assert!(changed);
        assert!(finished.is_none());
        assert!(!app.is_converting());
        assert!(app.convert_enabled());
        assert_eq!(app.currently_processing, None);
    }

    #[test]
    fn completed_batch_is_returned_by_poll() {
        let mut app = app_with_files(&["a.avif"]);
        let (sender, receiver) = channel();
        app.conversion_receiver = Some(receiver);
        sender
            .send(ConversionUpdate::Completed(Err(PreconditionError::NoInputFiles)))
            .unwrap();

        let (_, finished) = app.poll_worker();

        assert_eq!(finished, Some(Err(PreconditionError::NoInputFiles)));
        assert!(!app.is_converting());
    }

    #[test]
    fn running_worker_keeps_receiver() {
        let mut app = app_with_files(&["a.avif"]);
        let (_sender, receiver) = channel();
        app.conversion_receiver = Some(receiver);

        let (changed, finished) = app.poll_worker();

        assert!(!changed);
        assert!(finished.is_none());
        assert!(app.is_converting());
    }

    #[test]
    fn new_selection_resets_statuses() {
        let mut app = app_with_files(&["a.avif", "b.avif"]);
        app.apply_update(ConversionUpdate::FileStarted(0, 2));
        app.replace_input_files(vec![PathBuf::from("c.avif")]);
        assert_eq!(app.file_statuses, vec![FileStatus::Pending]);
        assert_eq!(app.conversion_progress.total, 0);
    }
}
