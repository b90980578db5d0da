use eframe::egui::{self, Color32, RichText, Stroke, Ui};
use egui_plot::{Legend, Line, Plot, PlotUi, Points};

use crate::analysis::pipeline::WellAnalysis;
use crate::color::{border_color, distinct_colors, SlopePalette};
use crate::data::model::{Series, WellId, PLATE_COLUMNS, PLATE_ROWS, ROW_LETTERS};
use crate::state::AppState;

const RAW_COLOR: Color32 = Color32::GRAY;
const FIT_POINT_COLOR: Color32 = Color32::from_rgb(0x2c, 0xa0, 0x2c);

fn series_points(series: &Series) -> Vec<[f64; 2]> {
    series
        .times
        .iter()
        .zip(series.values.iter())
        .filter(|(_, v)| v.is_finite())
        .map(|(&t, &v)| [t, v])
        .collect()
}

/// Straight fit line across the fitted range, if the well has a fit.
fn fit_line(well: &WellAnalysis) -> Option<Vec<[f64; 2]>> {
    let fit = well.fit.as_ref().ok()?;
    let (t0, t1) = (well.fitted.first_time()?, well.fitted.last_time()?);
    Some(vec![[t0, fit.predict(t0)], [t1, fit.predict(t1)]])
}

// ---------------------------------------------------------------------------
// Plate grid (central panel, plate view)
// ---------------------------------------------------------------------------

/// 8 × 12 mini plots: raw points gray, fitted points green, fit line black.
/// Background shows the slope, the border which trims were applied.
/// Clicking a well toggles it in the detail selection.
pub fn plate_grid(ui: &mut Ui, state: &mut AppState) {
    let Some(analysis) = &state.analysis else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a plate export to analyse it  (File → Open…)");
        });
        return;
    };

    let cell_w = ((ui.available_width() - 24.0) / PLATE_COLUMNS as f32 - 10.0).max(40.0);
    let cell_h = ((ui.available_height() - 24.0) / PLATE_ROWS as f32 - 28.0).max(24.0);
    let mut clicked: Option<WellId> = None;

    egui::ScrollArea::both().show(ui, |ui: &mut Ui| {
        egui::Grid::new("plate_grid")
            .spacing([4.0, 4.0])
            .show(ui, |ui: &mut Ui| {
                ui.label("");
                for column in 1..=PLATE_COLUMNS {
                    ui.vertical_centered(|ui: &mut Ui| {
                        ui.strong(column.to_string());
                    });
                }
                ui.end_row();

                for (row, letter) in ROW_LETTERS.chars().enumerate() {
                    ui.strong(letter.to_string());
                    for column in 1..=PLATE_COLUMNS {
                        let well = WellId::new(row, column)
                            .ok()
                            .and_then(|id| analysis.well(id));
                        match well {
                            Some(well) => {
                                let selected = state.selected.contains(&well.id);
                                if well_cell(ui, &state.palette, well, selected, [cell_w, cell_h]) {
                                    clicked = Some(well.id);
                                }
                            }
                            None => {
                                ui.allocate_space(egui::vec2(cell_w, cell_h));
                            }
                        }
                    }
                    ui.end_row();
                }
            });
    });

    if let Some(id) = clicked {
        state.toggle_well(id);
    }
}

/// One framed mini plot. Returns `true` when clicked.
fn well_cell(
    ui: &mut Ui,
    palette: &SlopePalette,
    well: &WellAnalysis,
    selected: bool,
    size: [f32; 2],
) -> bool {
    let background = palette.color_for(well.color_index());
    let border_width = if selected { 3.0 } else { 1.5 };
    let title = match well.reporting_slope() {
        Some(slope) => format!("{slope:.2}"),
        None => "n/a".to_string(),
    };

    let mut clicked = false;
    egui::Frame::default()
        .fill(background)
        .stroke(Stroke::new(border_width, border_color(well.adjustment)))
        .inner_margin(egui::Margin::same(2))
        .show(ui, |ui: &mut Ui| {
            ui.vertical_centered(|ui: &mut Ui| {
                ui.label(RichText::new(title).small().color(Color32::BLACK));
                let response = Plot::new(("well_plot", well.id.index()))
                    .width(size[0])
                    .height(size[1])
                    .show_axes(false)
                    .show_grid(false)
                    .show_background(false)
                    .show_x(false)
                    .show_y(false)
                    .allow_drag(false)
                    .allow_zoom(false)
                    .allow_scroll(false)
                    .allow_boxed_zoom(false)
                    .show(ui, |plot_ui| draw_well(plot_ui, well, 1.0, None))
                    .response;
                clicked = response.clicked();
            });
        });
    clicked
}

fn draw_well(plot_ui: &mut PlotUi, well: &WellAnalysis, scale: f32, color: Option<Color32>) {
    plot_ui.points(
        Points::new(series_points(&well.raw))
            .radius(0.8 * scale)
            .color(RAW_COLOR),
    );

    let mut fitted = Points::new(series_points(&well.fitted))
        .radius(1.5 * scale)
        .color(color.unwrap_or(FIT_POINT_COLOR));
    if color.is_some() {
        fitted = fitted.name(well.label.as_str());
    }
    plot_ui.points(fitted);

    if let Some(points) = fit_line(well) {
        let mut line = Line::new(points).color(Color32::BLACK).width(1.0);
        if color.is_some() {
            if let Ok(fit) = &well.fit {
                let slope = well.reporting_slope().unwrap_or(f64::NAN);
                line = line.name(format!("{slope:.1} / {:.3}", fit.r_squared));
            }
        }
        plot_ui.line(line);
    }
}

// ---------------------------------------------------------------------------
// Detail plot (central panel, detail view)
// ---------------------------------------------------------------------------

/// Selected wells overlaid with slope / r² in the legend.
pub fn detail_plot(ui: &mut Ui, state: &AppState) {
    let Some(analysis) = &state.analysis else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a plate export to analyse it  (File → Open…)");
        });
        return;
    };

    let wells: Vec<&WellAnalysis> = state
        .selected
        .iter()
        .filter_map(|id| analysis.well(*id))
        .collect();
    if wells.is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Pick wells in the side panel or click them in the plate view");
        });
        return;
    }

    let colors = distinct_colors(wells.len());

    Plot::new("detail_plot")
        .legend(Legend::default())
        .x_axis_label("Time [min]")
        .y_axis_label(if analysis.config.negative_mode {
            "Reference − reading"
        } else {
            "Absorbance"
        })
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for (well, color) in wells.iter().zip(colors) {
                draw_well(plot_ui, well, 2.5, Some(color));
            }
        });
}
