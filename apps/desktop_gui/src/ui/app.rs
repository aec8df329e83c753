use std::path::PathBuf;

use client_core::{AskState, Notice, NoticeSeverity, SelectedFileSummary, UploadState};
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use shared::domain::{FlowKind, FlowStatus};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{err_label, UiError, UiEvent};
use crate::controller::orchestration::dispatch_backend_command;

pub const APP_TITLE: &str = "Research Paper Q&A";

pub struct QaApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    service_url: String,
    selected: Option<SelectedFileSummary>,
    upload: UploadState,
    ask: AskState,
    query: String,
    // Set on click, cleared once the backend reports back for that flow.
    upload_requested: bool,
    ask_requested: bool,
    notice: Option<Notice>,
    error_banner: Option<UiError>,
    status: String,
}

impl QaApp {
    pub fn new(
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        service_url: impl Into<String>,
    ) -> Self {
        Self {
            cmd_tx,
            ui_rx,
            service_url: service_url.into(),
            selected: None,
            upload: UploadState::default(),
            ask: AskState::default(),
            query: String::new(),
            upload_requested: false,
            ask_requested: false,
            notice: None,
            error_banner: None,
            status: "Starting...".to_string(),
        }
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            self.apply_event(event);
        }
    }

    fn apply_event(&mut self, event: UiEvent) {
        match event {
            UiEvent::Info(message) => {
                self.upload_requested = false;
                self.ask_requested = false;
                self.status = message;
            }
            UiEvent::Error(err) => {
                self.status = format!(
                    "{} error during {}",
                    err_label(err.category()),
                    err.context().label()
                );
                self.error_banner = Some(err);
            }
            UiEvent::SelectionChanged(summary) => {
                self.status = match &summary {
                    Some(file) => format!("Selected {}", file.display_name),
                    None => "No file selected".to_string(),
                };
                self.error_banner = None;
                self.selected = summary;
            }
            UiEvent::Upload(state) => {
                self.upload_requested = false;
                self.status = match state.status {
                    FlowStatus::InFlight => "Uploading PDF...".to_string(),
                    FlowStatus::Succeeded => "PDF uploaded".to_string(),
                    FlowStatus::Failed => "Upload failed".to_string(),
                    FlowStatus::Idle => self.status.clone(),
                };
                self.upload = state;
            }
            UiEvent::Ask(state) => {
                self.ask_requested = false;
                self.status = match state.status {
                    FlowStatus::InFlight => "Waiting for answer...".to_string(),
                    FlowStatus::Succeeded => "Answer received".to_string(),
                    FlowStatus::Failed => "Question failed".to_string(),
                    FlowStatus::Idle => self.status.clone(),
                };
                self.ask = state;
            }
            UiEvent::Notice(notice) => {
                if notice.flow == FlowKind::Upload {
                    self.upload_requested = false;
                }
                self.notice = Some(notice);
            }
        }
    }

    fn upload_busy(&self) -> bool {
        self.upload_requested || self.upload.is_in_flight()
    }

    fn ask_busy(&self) -> bool {
        self.ask_requested || self.ask.is_in_flight()
    }

    fn queue(&mut self, cmd: BackendCommand) -> bool {
        dispatch_backend_command(&self.cmd_tx, cmd, &mut self.status)
    }

    fn pick_pdf(&mut self) {
        let mut dialog = rfd::FileDialog::new().add_filter("PDF", &["pdf"]);
        if let Some(dir) = default_document_dir() {
            dialog = dialog.set_directory(dir);
        }
        if let Some(path) = dialog.pick_file() {
            self.queue(BackendCommand::SelectFile { path });
        }
    }

    fn request_upload(&mut self) {
        if self.upload_busy() {
            return;
        }
        self.upload_requested = self.queue(BackendCommand::SubmitUpload);
    }

    fn request_ask(&mut self) {
        if self.ask_busy() || self.query.trim().is_empty() {
            return;
        }
        let text = self.query.clone();
        if !self.queue(BackendCommand::SetQuery { text }) {
            return;
        }
        self.ask_requested = self.queue(BackendCommand::SubmitAsk);
    }

    fn show_upload_section(&mut self, ui: &mut egui::Ui) {
        ui.heading("1. Upload a paper");
        ui.add_space(4.0);
        ui.horizontal(|ui| {
            if ui
                .add_enabled(!self.upload_busy(), egui::Button::new("Choose PDF..."))
                .clicked()
            {
                self.pick_pdf();
            }
            match &self.selected {
                Some(file) => {
                    ui.label(format!(
                        "{} ({})",
                        file.display_name,
                        human_readable_bytes(file.size_bytes)
                    ));
                    if ui
                        .add_enabled(!self.upload_busy(), egui::Button::new("Clear").small())
                        .clicked()
                    {
                        self.queue(BackendCommand::ClearSelection);
                    }
                }
                None => {
                    ui.weak("No file selected");
                }
            }
        });

        let label = if self.upload_busy() {
            "Uploading..."
        } else {
            "Upload"
        };
        if ui
            .add_enabled(!self.upload_busy(), egui::Button::new(label))
            .clicked()
        {
            self.request_upload();
        }
    }

    fn show_ask_section(&mut self, ui: &mut egui::Ui) {
        ui.heading("2. Ask a question");
        ui.add_space(4.0);
        let mut submit = false;
        ui.horizontal(|ui| {
            let width = (ui.available_width() - 110.0).max(120.0);
            let edit = ui.add(
                egui::TextEdit::singleline(&mut self.query)
                    .hint_text("Ask something about the paper")
                    .desired_width(width),
            );
            if edit.changed() {
                let text = self.query.clone();
                self.queue(BackendCommand::SetQuery { text });
            }
            if edit.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                submit = true;
            }

            let label = if self.ask_busy() { "Thinking..." } else { "Ask" };
            if ui
                .add_enabled(!self.ask_busy(), egui::Button::new(label))
                .clicked()
            {
                submit = true;
            }
        });
        if submit {
            self.request_ask();
        }

        let Some(text) = self.ask.display_text() else {
            return;
        };
        let color = if self.ask.error.is_some() {
            ui.visuals().error_fg_color
        } else {
            ui.visuals().text_color()
        };
        ui.add_space(8.0);
        ui.label(egui::RichText::new("Answer").strong());
        egui::Frame::group(ui.style()).show(ui, |ui| {
            egui::ScrollArea::vertical()
                .max_height(320.0)
                .show(ui, |ui| {
                    ui.colored_label(color, text);
                });
        });
    }

    fn show_notice(&mut self, ctx: &egui::Context) {
        let Some(notice) = &self.notice else {
            return;
        };
        let title = match notice.severity {
            NoticeSeverity::Info => "Upload",
            NoticeSeverity::Error => "Upload problem",
        };
        let mut dismissed = false;
        egui::Window::new(title)
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(&notice.message);
                ui.add_space(6.0);
                if ui.button("OK").clicked() {
                    dismissed = true;
                }
            });
        if dismissed {
            self.notice = None;
        }
    }

    fn show_status_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(&self.status);
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.weak(&self.service_url);
                });
            });
        });
    }
}

impl eframe::App for QaApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();

        self.show_status_bar(ctx);
        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(err) = &self.error_banner {
                let text = format!("{}: {}", err_label(err.category()), err.message());
                let color = ui.visuals().error_fg_color;
                ui.colored_label(color, text);
                ui.separator();
            }
            // Modal notice blocks interaction with the flows until dismissed.
            ui.add_enabled_ui(self.notice.is_none(), |ui| {
                self.show_upload_section(ui);
                ui.separator();
                self.show_ask_section(ui);
            });
        });
        self.show_notice(ctx);

        ctx.request_repaint_after(std::time::Duration::from_millis(100));
    }
}

fn default_document_dir() -> Option<PathBuf> {
    dirs::document_dir()
        .or_else(dirs::download_dir)
        .or_else(dirs::home_dir)
}

fn human_readable_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes < KB {
        return format!("{bytes} B");
    }
    if bytes < MB {
        return format_scaled_unit(bytes, KB, "KB");
    }
    if bytes < GB {
        return format_scaled_unit(bytes, MB, "MB");
    }
    format_scaled_unit(bytes, GB, "GB")
}

fn format_scaled_unit(bytes: u64, unit_size: u64, unit_label: &str) -> String {
    let value = bytes as f64 / unit_size as f64;
    let value_text = format!("{value:.1}");
    let compact_value = value_text.strip_suffix(".0").unwrap_or(&value_text);
    format!("{compact_value} {unit_label}")
}
