use std::sync::Arc;

use eframe::egui;

use crate::export;
use crate::state::{AppState, View};
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct KineticPlateApp {
    pub state: AppState,
    /// Where the plate grid was drawn last frame, for cropping screenshots.
    plate_rect: Option<egui::Rect>,
    screenshot_requested: bool,
}

impl KineticPlateApp {
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            plate_rect: None,
            screenshot_requested: false,
        }
    }

    /// Save a captured frame to the queued image path, cropped to the grid.
    fn save_screenshot(&mut self, frame: &egui::ColorImage, pixels_per_point: f32) {
        self.screenshot_requested = false;
        let Some(path) = self.state.pending_image.take() else {
            return;
        };
        let grid = match self.plate_rect {
            Some(rect) => frame.region(&rect, Some(pixels_per_point)),
            None => frame.clone(),
        };
        match export::write_plate_image(&grid, &path) {
            Ok(()) => self.state.status_message = None,
            Err(e) => {
                log::error!("Plate image export failed: {e:#}");
                self.state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}

impl eframe::App for KineticPlateApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Screenshots requested in an earlier frame ----
        let captured: Vec<Arc<egui::ColorImage>> = ctx.input(|i| {
            i.raw
                .events
                .iter()
                .filter_map(|e| match e {
                    egui::Event::Screenshot { image, .. } => Some(image.clone()),
                    _ => None,
                })
                .collect()
        });
        for frame in captured {
            self.save_screenshot(&frame, ctx.pixels_per_point());
        }

        // Request after the export menu has closed, so it isn't captured.
        if self.state.pending_image.is_some() && !self.screenshot_requested {
            ctx.send_viewport_cmd(egui::ViewportCommand::Screenshot(egui::UserData::default()));
            self.screenshot_requested = true;
        }

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: settings + well picker ----
        egui::SidePanel::left("settings_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Bottom panel: slope table ----
        egui::TopBottomPanel::bottom("results_panel")
            .default_height(180.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::results_table(ui, &self.state);
            });

        // ---- Central panel: plate grid or detail plot ----
        let view = self.state.view;
        let central = egui::CentralPanel::default().show(ctx, |ui| match view {
            View::Plate => plot::plate_grid(ui, &mut self.state),
            View::Detail => plot::detail_plot(ui, &self.state),
        });
        self.plate_rect = (view == View::Plate).then_some(central.response.rect);
    }
}
