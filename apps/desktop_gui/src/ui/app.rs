//! egui binder for the score tracker: file picker, process button, status
//! line and the score history table.

use std::time::Duration;

use client_core::{
    view::{local_rows, ScoreRow},
    Status, StatusSnapshot,
};
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;

use crate::{
    backend_bridge::commands::BackendCommand,
    controller::{
        events::{UiErrorCategory, UiEvent},
        orchestration::dispatch_backend_command,
    },
};

const IMAGE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

pub struct ScoreTrackerApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    status: StatusSnapshot,
    rows: Vec<ScoreRow>,
    selected_filename: Option<String>,
    notice: Option<String>,
    startup_error: Option<String>,
}

impl ScoreTrackerApp {
    pub fn new(cmd_tx: Sender<BackendCommand>, ui_rx: Receiver<UiEvent>) -> Self {
        let mut app = Self {
            cmd_tx,
            ui_rx,
            status: StatusSnapshot::default(),
            rows: Vec::new(),
            selected_filename: None,
            notice: None,
            startup_error: None,
        };
        app.dispatch(BackendCommand::Mount);
        app
    }

    fn dispatch(&mut self, cmd: BackendCommand) {
        dispatch_backend_command(&self.cmd_tx, cmd, &mut self.notice);
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                UiEvent::Info(message) => self.notice = Some(message),
                UiEvent::StatusChanged(snapshot) => self.status = snapshot,
                UiEvent::ScoresReplaced(records) => self.rows = local_rows(&records),
                UiEvent::FileSelected { filename } => self.selected_filename = Some(filename),
                UiEvent::Error(err) => {
                    tracing::warn!(
                        category = ?err.category(),
                        context = ?err.context(),
                        "{}",
                        err.message()
                    );
                    match err.category() {
                        UiErrorCategory::Busy => {
                            self.notice = Some("An upload is already in progress.".to_string())
                        }
                        _ => self.startup_error = Some(err.message().to_string()),
                    }
                }
            }
        }
    }

    fn pick_file(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Screenshots", &IMAGE_EXTENSIONS)
            .pick_file()
        {
            self.dispatch(BackendCommand::FileSelected { path });
        }
    }

    fn show_upload_controls(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            if ui.button("Choose file…").clicked() {
                self.pick_file();
            }
            match &self.selected_filename {
                Some(filename) => ui.label(filename.as_str()),
                None => ui.weak("No file chosen"),
            };
        });

        ui.add_space(6.0);
        let can_submit = self.status.status.is_ready();
        if ui
            .add_enabled(can_submit, egui::Button::new("Process Image"))
            .clicked()
        {
            self.dispatch(BackendCommand::SubmitRequested);
        }
    }

    fn show_status(&self, ui: &mut egui::Ui) {
        ui.label(format!("Status: {}", self.status.status.label()));
        if self.status.status == Status::Uploading || self.status.status == Status::Refreshing {
            ui.spinner();
        }
        if let Some(error) = &self.status.error {
            ui.colored_label(egui::Color32::from_rgb(220, 80, 80), error.as_str());
        }
        if let Some(error) = &self.startup_error {
            ui.colored_label(egui::Color32::from_rgb(220, 80, 80), error.as_str());
        }
        if let Some(notice) = &self.notice {
            ui.weak(notice.as_str());
        }
    }

    fn show_history(&self, ui: &mut egui::Ui) {
        if self.rows.is_empty() {
            ui.weak("No scores recorded yet.");
            return;
        }

        egui::ScrollArea::vertical().show(ui, |ui| {
            egui::Grid::new("score_history")
                .striped(true)
                .num_columns(3)
                .spacing([24.0, 6.0])
                .show(ui, |ui| {
                    ui.strong("Scenario");
                    ui.strong("Score");
                    ui.strong("Processed At");
                    ui.end_row();

                    for row in &self.rows {
                        ui.label(row.scenario.as_str());
                        ui.label(row.score.as_str());
                        ui.label(row.processed_at.as_str());
                        ui.end_row();
                    }
                });
        });
    }
}

impl eframe::App for ScoreTrackerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Score Tracker");
            ui.add_space(8.0);
            self.show_upload_controls(ui);
            ui.add_space(6.0);
            self.show_status(ui);

            ui.separator();
            ui.horizontal(|ui| {
                ui.heading("Score History");
                if ui.small_button("Reload").clicked() {
                    self.dispatch(BackendCommand::Reload);
                }
            });
            self.show_history(ui);
        });

        ctx.request_repaint_after(Duration::from_millis(100));
    }
}
