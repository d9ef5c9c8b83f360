// dialogs.rs
use crate::app::converter::{ConversionReport, PreconditionError, ReportKind};
use rfd::{FileDialog, MessageButtons, MessageDialog, MessageLevel};
use std::path::PathBuf;

pub fn select_avif_files() -> Option<Vec<PathBuf>> {
    FileDialog::new()
        .set_title("Select AVIF files")
        .add_filter("AVIF images", &["avif"])
        .add_filter("All files", &["*"])
        .pick_files()
}

pub fn select_destination_folder() -> Option<PathBuf> {
    FileDialog::new()
        .set_title("Select destination folder")
        .pick_folder()
}

fn report_level(kind: ReportKind) -> MessageLevel {
    match kind {
        ReportKind::AllSucceeded => MessageLevel::Info,
        ReportKind::PartialSuccess => MessageLevel::Warning,
        ReportKind::AllFailed => MessageLevel::Error,
    }
}

fn report_title(kind: ReportKind) -> &'static str {
    match kind {
        ReportKind::AllSucceeded => "Conversion complete",
        ReportKind::PartialSuccess => "Conversion finished with errors",
        ReportKind::AllFailed => "Conversion failed",
    }
}

pub fn show_report(report: &ConversionReport) {
    let kind = report.kind();
    MessageDialog::new()
        .set_level(report_level(kind))
        .set_title(report_title(kind))
        .set_description(&report.summary())
        .set_buttons(MessageButtons::Ok)
        .show();
}

fn precondition_message(error: &PreconditionError) -> String {
    let mut message = error.to_string();
    if let Some(first) = message.get_mut(0..1) {
        first.make_ascii_uppercase();
    }
    message
}

pub fn show_precondition_error(error: &PreconditionError) {
    MessageDialog::new()
        .set_level(MessageLevel::Error)
        .set_title("Conversion not started")
        .set_description(&precondition_message(error))
        .set_buttons(MessageButtons::Ok)
        .show();
}
