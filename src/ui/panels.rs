use eframe::egui::{self, Color32, DragValue, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::color::border_legend;
use crate::config::TimeCrop;
use crate::data::model::{WellId, PLATE_COLUMNS};
use crate::export::{default_output_path, export_to_path, ExportFormat};
use crate::state::{AppState, View};

// ---------------------------------------------------------------------------
// Left side panel – analysis settings and well picker
// ---------------------------------------------------------------------------

/// Render the left settings panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Analysis");
    ui.separator();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            if settings(ui, state) {
                state.reanalyze();
            }
            ui.separator();

            ui.strong("Border");
            for (label, color) in border_legend() {
                ui.label(RichText::new(format!("■ {label}")).color(color));
            }
            ui.separator();

            well_picker(ui, state);
        });
}

/// Settings widgets. Returns `true` when anything changed.
fn settings(ui: &mut Ui, state: &mut AppState) -> bool {
    let last_time = state
        .plate
        .as_ref()
        .and_then(|p| p.times.last().copied())
        .unwrap_or(60.0);
    let config = &mut state.config;
    let mut changed = false;

    changed |= ui
        .checkbox(&mut config.full_mode, "Full length (no trimming)")
        .changed();

    ui.add_enabled_ui(!config.full_mode, |ui: &mut Ui| {
        egui::Grid::new("range_settings")
            .num_columns(2)
            .show(ui, |ui: &mut Ui| {
                ui.label("Min r²");
                changed |= ui
                    .add(DragValue::new(&mut config.min_r_squared).speed(0.001).range(0.0..=1.0))
                    .changed();
                ui.end_row();

                ui.label("Min points");
                changed |= ui
                    .add(DragValue::new(&mut config.min_points).range(2..=1000))
                    .changed();
                ui.end_row();

                ui.label("Break threshold");
                changed |= ui
                    .add(DragValue::new(&mut config.break_threshold).speed(0.1).range(0.1..=100.0))
                    .changed();
                ui.end_row();
            });
    });

    changed |= ui.checkbox(&mut config.negative_mode, "Negative assay").changed();
    if config.negative_mode {
        ui.horizontal(|ui: &mut Ui| {
            ui.label("Reference");
            changed |= ui
                .add(DragValue::new(&mut config.reference_point).speed(0.01))
                .changed();
        });
    }

    ui.horizontal(|ui: &mut Ui| {
        ui.label("Slope ×");
        changed |= ui
            .add(DragValue::new(&mut config.scale_factor).speed(1.0))
            .changed();
    });

    let mut crop_on = config.time_crop.is_some();
    if ui.checkbox(&mut crop_on, "Crop time (min)").changed() {
        config.time_crop = crop_on.then(|| TimeCrop {
            start: 0.0,
            end: last_time,
        });
        changed = true;
    }
    if let Some(crop) = &mut config.time_crop {
        ui.horizontal(|ui: &mut Ui| {
            changed |= ui.add(DragValue::new(&mut crop.start).speed(0.1)).changed();
            ui.label("to");
            changed |= ui.add(DragValue::new(&mut crop.end).speed(0.1)).changed();
        });
    }

    changed
}

/// 8 × 12 toggle grid selecting wells for the detail view.
fn well_picker(ui: &mut Ui, state: &mut AppState) {
    ui.horizontal(|ui: &mut Ui| {
        ui.strong("Detail wells");
        if ui.small_button("Clear").clicked() {
            state.clear_selection();
        }
    });

    egui::Grid::new("well_picker")
        .spacing([2.0, 2.0])
        .show(ui, |ui: &mut Ui| {
            for id in WellId::all() {
                let present = state.plate.as_ref().is_some_and(|p| p.well(id).is_some());
                let selected = state.selected.contains(&id);
                let text = RichText::new(id.to_string()).small();
                let response = ui.add_enabled(present, egui::SelectableLabel::new(selected, text));
                if response.clicked() {
                    state.toggle_well(id);
                }
                if id.column() == PLATE_COLUMNS {
                    ui.end_row();
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            let can_export = state.analysis.is_some();
            if ui.add_enabled(can_export, egui::Button::new("Export slopes…")).clicked() {
                save_file_dialog(state);
                ui.close_menu();
            }
            if ui
                .add_enabled(can_export, egui::Button::new("Export plate image…"))
                .clicked()
            {
                save_image_dialog(state);
                ui.close_menu();
                ui.ctx().request_repaint();
            }
        });

        ui.separator();

        if ui
            .selectable_label(state.view == View::Plate, "Plate")
            .clicked()
        {
            state.view = View::Plate;
        }
        if ui
            .selectable_label(state.view == View::Detail, "Detail")
            .clicked()
        {
            state.view = View::Detail;
        }

        ui.separator();

        if let Some(analysis) = &state.analysis {
            ui.label(format!(
                "{}: {} wells, {} break-trimmed, {} range-trimmed",
                analysis.plate_name,
                analysis.wells.len(),
                analysis.break_trimmed_count(),
                analysis.range_trimmed_count()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Bottom panel – slope table
// ---------------------------------------------------------------------------

pub fn results_table(ui: &mut Ui, state: &AppState) {
    let Some(analysis) = &state.analysis else {
        ui.label("No plate analysed.");
        return;
    };
    let unit = format!("slope (×{})", analysis.config.scale_factor);

    TableBuilder::new(ui)
        .striped(true)
        .column(Column::auto().at_least(50.0))
        .column(Column::auto().at_least(90.0))
        .column(Column::auto().at_least(70.0))
        .column(Column::auto().at_least(60.0))
        .column(Column::remainder())
        .header(20.0, |mut header| {
            for title in ["well", unit.as_str(), "r²", "points", "adjustment"] {
                header.col(|ui: &mut Ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|mut body| {
            for well in &analysis.wells {
                body.row(18.0, |mut row| {
                    row.col(|ui: &mut Ui| {
                        ui.label(&well.label);
                    });
                    row.col(|ui: &mut Ui| {
                        match well.reporting_slope() {
                            Some(s) => ui.label(format!("{s:.3}")),
                            None => ui.label("–"),
                        };
                    });
                    row.col(|ui: &mut Ui| {
                        match &well.fit {
                            Ok(fit) => ui.label(format!("{:.4}", fit.r_squared)),
                            Err(e) => ui.label(RichText::new(e.to_string()).color(Color32::RED)),
                        };
                    });
                    row.col(|ui: &mut Ui| {
                        ui.label(format!("{}/{}", well.fitted.len(), well.raw.len()));
                    });
                    row.col(|ui: &mut Ui| {
                        ui.label(well.adjustment.label());
                    });
                });
            }
        });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open plate reader export")
        .add_filter("Plate exports", &["txt", "tsv", "csv"])
        .pick_file();

    if let Some(path) = file {
        match crate::data::loader::load_file(&path) {
            Ok(plate) => state.set_plate(plate, Some(path)),
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}

pub fn save_file_dialog(state: &mut AppState) {
    let Some(analysis) = &state.analysis else {
        return;
    };
    let suggested = state
        .source_path
        .as_deref()
        .map(|p| default_output_path(p, &analysis.plate_name, ExportFormat::Tsv))
        .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_else(|| format!("out_{}.txt", analysis.plate_name));

    let file = rfd::FileDialog::new()
        .set_title("Export slopes")
        .set_file_name(suggested)
        .add_filter("Tab-separated", &["txt", "tsv"])
        .add_filter("JSON", &["json"])
        .save_file();

    if let Some(path) = file {
        let format = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => ExportFormat::Json,
            _ => ExportFormat::Tsv,
        };
        if let Err(e) = export_to_path(analysis, &path, format) {
            log::error!("Export failed: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}

pub fn save_image_dialog(state: &mut AppState) {
    let Some(analysis) = &state.analysis else {
        return;
    };
    let suggested = format!("out_{}.png", analysis.plate_name);
    let mut dialog = rfd::FileDialog::new()
        .set_title("Export plate image")
        .set_file_name(suggested)
        .add_filter("PNG image", &["png"]);
    if let Some(dir) = state.source_path.as_deref().and_then(|p| p.parent()) {
        dialog = dialog.set_directory(dir);
    }

    if let Some(path) = dialog.save_file() {
        state.request_plate_image(path.with_extension("png"));
    }
}
