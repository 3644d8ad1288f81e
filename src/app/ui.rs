#![cfg(feature = "egui")]

use camino::Utf8PathBuf;
use eframe::egui::{self, Color32, RichText};
use tracing::Level;

use crate::canvas::EguiCanvas;
use crate::config::Theme;
use crate::logging::LogLine;
use crate::projection::NodeOwner;
use crate::samples::SAMPLE_NAMES;
use crate::structure::{EndpointRef, Structure};

use super::state::{EditorApp, EditorTab};

/// Deferred UI actions, applied after the panels are drawn.
enum Action {
    NewSample(&'static str),
    Open(Utf8PathBuf),
    OpenInstance(Vec<String>),
    CloseTab(usize),
    Save,
    Rescan,
    SetTheme(Theme),
}

impl eframe::App for EditorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.theme_applied != Some(self.config.theme) {
            ctx.set_visuals(match self.config.theme {
                Theme::Light => egui::Visuals::light(),
                Theme::Dark => egui::Visuals::dark(),
            });
            self.theme_applied = Some(self.config.theme);
        }

        let mut actions = Vec::new();
        if ctx.input_mut(|i| i.consume_key(egui::Modifiers::COMMAND, egui::Key::S)) {
            actions.push(Action::Save);
        }

        self.menu_bar(ctx, &mut actions);
        self.status_line(ctx);
        if self.panels.logs {
            self.logs_panel(ctx);
        }
        if self.panels.explorer || self.panels.inspector {
            self.side_panel(ctx, &mut actions);
        }
        self.central_panel(ctx, &mut actions);

        for action in actions {
            match action {
                Action::NewSample(name) => self.open_sample(name),
                Action::Open(path) => self.open_path(&path),
                Action::OpenInstance(path) => self.open_instance(&path),
                Action::CloseTab(i) => self.close_tab(i),
                Action::Save => self.save_active(),
                Action::Rescan => self.rescan(),
                Action::SetTheme(theme) => self.set_theme(theme),
            }
        }
    }
}

impl EditorApp {
    fn menu_bar(&mut self, ctx: &egui::Context, actions: &mut Vec<Action>) {
        egui::TopBottomPanel::top("menu").show(ctx, |ui| {
            egui::MenuBar::new().ui(ui, |ui| {
                ui.menu_button("File", |ui| {
                    ui.menu_button("New from sample", |ui| {
                        for name in SAMPLE_NAMES {
                            if ui.button(*name).clicked() {
                                actions.push(Action::NewSample(*name));
                                ui.close();
                            }
                        }
                    });
                    ui.menu_button("Open workspace entry", |ui| {
                        let mut any = false;
                        for entry in self.explorer.iter().filter(|e| e.is_ok()) {
                            any = true;
                            if ui.button(entry.path.as_str()).clicked() {
                                actions.push(Action::Open(entry.path.clone()));
                                ui.close();
                            }
                        }
                        if !any {
                            ui.weak("No documents in workspace");
                        }
                    });
                    ui.separator();
                    let can_save = !self.tabs.is_empty();
                    if ui.add_enabled(can_save, egui::Button::new("Save")).clicked() {
                        actions.push(Action::Save);
                        ui.close();
                    }
                    if ui.button("Rescan workspace").clicked() {
                        actions.push(Action::Rescan);
                        ui.close();
                    }
                });
                ui.menu_button("View", |ui| {
                    ui.checkbox(&mut self.panels.explorer, "Explorer");
                    ui.checkbox(&mut self.panels.inspector, "Inspector");
                    ui.checkbox(&mut self.panels.logs, "Logs");
                });
                ui.menu_button("Theme", |ui| {
                    let mut theme = self.config.theme;
                    ui.radio_value(&mut theme, Theme::Light, "Light");
                    ui.radio_value(&mut theme, Theme::Dark, "Dark");
                    if theme != self.config.theme {
                        actions.push(Action::SetTheme(theme));
                    }
                });
            });
        });
    }

    fn status_line(&mut self, ctx: &egui::Context) {
        let Some(message) = self.status.clone() else {
            return;
        };
        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.colored_label(Color32::RED, message);
                if ui.small_button("Dismiss").clicked() {
                    self.status = None;
                }
            });
        });
    }

    fn logs_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("logs")
            .resizable(true)
            .default_height(140.0)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label(RichText::new("Logs").strong());
                    if ui.small_button("Clear").clicked() {
                        self.logs.clear();
                    }
                });
                egui::ScrollArea::vertical()
                    .id_salt("logs")
                    .stick_to_bottom(true)
                    .auto_shrink([false; 2])
                    .show(ui, |ui| {
                        for line in self.logs.lines() {
                            ui.label(log_line_text(&line));
                        }
                    });
            });
    }

    fn side_panel(&mut self, ctx: &egui::Context, actions: &mut Vec<Action>) {
        let hierarchy = self.active_hierarchy();
        egui::SidePanel::left("side")
            .resizable(true)
            .default_width(280.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().id_salt("side").show(ui, |ui| {
                    if self.panels.explorer {
                        egui::CollapsingHeader::new("Explorer")
                            .default_open(true)
                            .show(ui, |ui| {
                                ui.horizontal(|ui| {
                                    ui.weak(self.config.workspace.as_str());
                                    if ui.small_button("Rescan").clicked() {
                                        actions.push(Action::Rescan);
                                    }
                                });
                                for entry in &self.explorer {
                                    match &entry.summary {
                                        Ok(summary) => {
                                            let text = format!("{}  ({})", entry.path, summary.name);
                                            if ui.selectable_label(false, text).clicked() {
                                                actions.push(Action::Open(entry.path.clone()));
                                            }
                                        }
                                        Err(e) => {
                                            ui.colored_label(Color32::RED, entry.path.as_str())
                                                .on_hover_text(e.as_str());
                                        }
                                    }
                                }
                            });
                        egui::CollapsingHeader::new("Hierarchy")
                            .default_open(true)
                            .show(ui, |ui| {
                                if hierarchy.is_empty() {
                                    ui.weak("No instances");
                                }
                                for path in &hierarchy {
                                    let Some(name) = path.last() else { continue };
                                    ui.horizontal(|ui| {
                                        ui.add_space(12.0 * (path.len() - 1) as f32);
                                        if ui.link(name.as_str()).on_hover_text("Open in new tab").clicked() {
                                            actions.push(Action::OpenInstance(path.clone()));
                                        }
                                    });
                                }
                            });
                    }
                    if self.panels.inspector {
                        egui::CollapsingHeader::new("Inspector")
                            .default_open(true)
                            .show(ui, |ui| match self.active_tab() {
                                Some(tab) => inspector(ui, tab),
                                None => {
                                    ui.weak("No structure open");
                                }
                            });
                    }
                });
            });
    }

    fn central_panel(&mut self, ctx: &egui::Context, actions: &mut Vec<Action>) {
        egui::CentralPanel::default().show(ctx, |ui| {
            if self.tabs.is_empty() {
                ui.centered_and_justified(|ui| {
                    ui.label("Open a document from the explorer or use File → New from sample");
                });
                return;
            }
            ui.horizontal(|ui| {
                for (i, tab) in self.tabs.iter().enumerate() {
                    ui.selectable_value(&mut self.active, i, tab.editor.title());
                    if ui.small_button("×").clicked() {
                        actions.push(Action::CloseTab(i));
                    }
                    ui.separator();
                }
            });
            ui.separator();

            let Some(EditorTab { editor, canvas }) = self.tabs.get_mut(self.active) else {
                return;
            };
            let mut surface = EguiCanvas::new(ui, canvas);
            let report = editor.gui(&mut surface);
            if !report.failed.is_empty() {
                self.status = Some(report.failed.join("; "));
            } else if surface.released() {
                if let Some(reason) = &report.refusal {
                    self.status = Some(reason.clone());
                }
            }
            if canvas.is_dragging_link() {
                ctx.request_repaint();
            }
        });
    }
}

fn log_line_text(line: &LogLine) -> RichText {
    let color = if line.level == Level::ERROR {
        Color32::from_rgb(220, 60, 60)
    } else if line.level == Level::WARN {
        Color32::from_rgb(210, 150, 40)
    } else if line.level == Level::INFO {
        Color32::GRAY
    } else {
        Color32::DARK_GRAY
    };
    RichText::new(format!("{:>5} {}", line.level, line.message))
        .monospace()
        .color(color)
}

fn inspector(ui: &mut egui::Ui, tab: &EditorTab) {
    let editor = &tab.editor;
    if let Some(path) = editor.path() {
        ui.weak(path.as_str());
    }
    let report = editor.last_report();
    ui.label(format!(
        "{} nodes, {} pins, {} links",
        report.nodes, report.pins, report.links
    ));
    if report.skipped_nets > 0 {
        ui.label(format!("{} nets without a visible driver", report.skipped_nets));
    }
    ui.separator();

    let Some(structure) = editor.structure() else {
        ui.weak("Editor has no structure");
        return;
    };
    if editor.selection().is_empty() {
        ui.weak("Select a node to inspect it");
    }
    for owner in editor.selection() {
        match owner {
            NodeOwner::Port(name) => inspect_port(ui, structure, name),
            NodeOwner::Instance(name) => inspect_instance(ui, structure, name),
        }
        ui.separator();
    }
}

fn inspect_port(ui: &mut egui::Ui, structure: &Structure, name: &str) {
    let Some(port) = structure.ports.get(name) else {
        return;
    };
    ui.label(RichText::new(format!("Port {}", name)).strong());
    ui.label(format!("Direction: {}", port.direction));
    ui.label(format!("Type: {}", port.signal));
    if port.latency != 0 {
        ui.label(format!("Latency: {}", port.latency));
    }
    let endpoint = EndpointRef::port(name);
    if let Some(net) = structure.net_of(&endpoint) {
        ui.label("Net:");
        for member in net.members.iter().filter(|m| **m != endpoint) {
            ui.monospace(member.to_string());
        }
    }
}

fn inspect_instance(ui: &mut egui::Ui, structure: &Structure, name: &str) {
    let Some(sub) = structure.substructures.get(name) else {
        return;
    };
    ui.label(RichText::new(format!("{}: {}", name, sub.structure.type_name())).strong());
    egui::Grid::new(("ports", name)).striped(true).show(ui, |ui| {
        for port in sub.structure.ports.values() {
            ui.monospace(port.name.as_str());
            ui.label(port.direction.to_string());
            ui.label(port.signal.to_string());
            ui.end_row();
        }
    });
}
