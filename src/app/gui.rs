use std::sync::mpsc::channel;
use crate::app::converter::{BatchConverter, BatchEvent};
use crate::app::dialogs;
use crate::app::{App, ConversionUpdate, FileStatus};
use egui::{Color32, Frame, ProgressBar, Rounding, Stroke, RichText};

const ACCENT: Color32 = Color32::from_rgb(100, 200, 250);

pub fn render(app: &mut App, ctx: &egui::Context) {
    let frame = Frame {
        fill: Color32::from_rgb(30, 30, 40),
        rounding: Rounding::same(10.0),
        stroke: Stroke::new(1.0, ACCENT),
        inner_margin: egui::style::Margin::same(20.0),
        ..Default::default()
    };

    egui::CentralPanel::default().frame(frame).show(ctx, |ui| {
        ui.heading(RichText::new("AVIF to JPG Converter").size(28.0).color(ACCENT));
        ui.add_space(20.0);

        ui.horizontal(|ui| {
            ui.vertical(|ui| {
                let button_width = 220.0;
                let idle = !app.is_converting();

                let picked = ui.add_enabled_ui(idle, |ui| ui.add_sized([button_width, 30.0], egui::Button::new("Select AVIF Files")));
                if picked.inner.clicked() {
                    if let Some(files) = dialogs::select_avif_files() {
                        if !files.is_empty() {
                            app.replace_input_files(files);
                        }
                    }
                }
                ui.add_space(5.0);
                let picked = ui.add_enabled_ui(idle, |ui| ui.add_sized([button_width, 30.0], egui::Button::new("Select Destination Folder")));
                if picked.inner.clicked() {
                    if let Some(folder) = dialogs::select_destination_folder() {
                        app.choose_destination(folder);
                    }
                }

                ui.add_space(10.0);

                ui.group(|ui| {
                    ui.set_width(button_width);
                    ui.label(RichText::new("Destination:").size(16.0).color(ACCENT));
                    match app.selection.destination() {
                        Some(dir) => ui.label(dir.to_string_lossy()),
                        None => ui.label("No destination folder selected"),
                    };
                });

                ui.add_space(10.0);

                if let Some(report) = &app.last_report {
                    ui.group(|ui| {
                        ui.set_width(button_width);
                        ui.label(RichText::new("Results").size(16.0).color(ACCENT));
                        ui.label(RichText::new(format!("Converted: {}", report.successes())).color(Color32::from_rgb(200, 200, 200)));
                        ui.label(RichText::new(format!("Failed: {}", report.failures())).color(Color32::from_rgb(200, 200, 200)));
                    });
                    ui.add_space(10.0);
                }

                let convert = ui.add_enabled_ui(app.convert_enabled(), |ui| ui.add_sized([button_width, 30.0], egui::Button::new("Convert to JPG")));
                if convert.inner.clicked() {
                    start_conversion(app, ctx);
                }
            });

            ui.add_space(10.0);

            // Selected files, also the drop target
            ui.vertical(|ui| {
                ui.group(|ui| {
                    ui.set_min_width(ui.available_width());
                    ui.set_min_height(ui.available_height() - 250.0);
                    ui.label(RichText::new("Selected Files (drop AVIF files here):").size(16.0).color(ACCENT));

                    if !ctx.input().raw.hovered_files.is_empty() {
                        ui.label(RichText::new("Release to replace the selection").color(Color32::YELLOW));
                    }

                    egui::ScrollArea::vertical().auto_shrink([false; 2]).show(ui, |ui| {
                        egui::Grid::new("selected_files_grid")
                        .num_columns(3)
                        .striped(true)
                        .show(ui, |ui| {
                            ui.label(RichText::new("#").strong());
                            ui.label(RichText::new("Name").strong());
                            ui.label(RichText::new("Status").strong());
                            ui.end_row();

                            for (index, file) in app.selection.input_files().iter().enumerate() {
                                let text_color = if Some(index) == app.currently_processing {
                                    Color32::YELLOW
                                } else {
                                    Color32::WHITE
                                };
                                let status = app.file_statuses.get(index).unwrap_or(&FileStatus::Pending);
                                let status_color = match status {
                                    FileStatus::Pending => text_color,
                                    FileStatus::Converting => Color32::YELLOW,
                                    FileStatus::Converted => Color32::GREEN,
                                    FileStatus::Failed(_) => Color32::RED,
                                };

                                ui.label(RichText::new(format!("{}", index + 1)).color(text_color));
                                ui.label(RichText::new(file.display_name()).color(text_color));
                                let status_label = ui.label(RichText::new(status.label()).color(status_color));
                                if let FileStatus::Failed(detail) = status {
                                    status_label.on_hover_text(detail.as_str());
                                }
                                ui.end_row();
                            }
                        });
                    });
                });
            });
        });

        ui.add_space(20.0);

        // Conversion Log with Progress Bar
        ui.group(|ui| {
            ui.set_min_width(ui.available_width());
            ui.label(RichText::new("Conversion Log").size(16.0).color(ACCENT));

            let progress = &app.conversion_progress;
            if progress.total > 0 {
                let progress_ratio = progress.completed as f32 / progress.total as f32;
                ui.add(ProgressBar::new(progress_ratio).text(format!("{} / {}", progress.completed, progress.total)));
            }

            egui::ScrollArea::vertical()
                .max_height(200.0)
                .auto_shrink([false; 2])
                .show(ui, |ui| {
                let logs = app.log_messages.lock();
                for log in logs.iter() {
                    if log.contains("error") || log.contains("failed") {
                        ui.label(RichText::new(log).color(Color32::RED));
                    } else {
                        ui.label(log);
                    }
                }
            });
        });
    });
}

fn start_conversion(app: &mut App, ctx: &egui::Context) {
    let input_files = app.selection.input_files().to_vec();
    let destination = app.selection.destination().map(|d| d.to_path_buf()).unwrap_or_default();
    let converter = BatchConverter::new(app.tool.clone()).with_logger(app.logger.clone());
    let ctx = ctx.clone();

    for status in app.file_statuses.iter_mut() {
        *status = FileStatus::Pending;
    }
    app.conversion_progress.total = input_files.len();
    app.conversion_progress.completed = 0;
    app.last_report = None;
    app.logger.log(format!("Starting conversion with {}", converter.tool().program().display()));

    let (sender, receiver) = channel();
    app.conversion_receiver = Some(receiver);

    std::thread::spawn(move || {
        let result = converter.convert_with_progress(&input_files, &destination, |event| {
            let update = match event {
                BatchEvent::FileStarted { index, total, .. } => ConversionUpdate::FileStarted(index, total),
                BatchEvent::FileFinished { index, outcome, .. } => ConversionUpdate::FileFinished(index, outcome.clone()),
            };
            // The window may already be closed
            let _ = sender.send(update);
            ctx.request_repaint();
        });
        let _ = sender.send(ConversionUpdate::Completed(result));
        ctx.request_repaint();
    });
}
