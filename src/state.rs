use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::analysis::pipeline::{analyze_plate, PlateAnalysis};
use crate::color::SlopePalette;
use crate::config::AnalysisConfig;
use crate::data::model::{Plate, WellId};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    /// 8 × 12 grid of mini plots.
    #[default]
    Plate,
    /// Selected wells overlaid in one large plot.
    Detail,
}

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded plate (None until user loads a file).
    pub plate: Option<Plate>,

    /// File the plate was read from, used to place exports.
    pub source_path: Option<PathBuf>,

    /// Settings the current analysis was computed with.
    pub config: AnalysisConfig,

    /// Result of the last successful analysis.
    pub analysis: Option<PlateAnalysis>,

    /// Wells shown in the detail view.
    pub selected: BTreeSet<WellId>,

    pub view: View,

    pub palette: SlopePalette,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    /// Where the next captured frame of the plate grid should be saved.
    pub pending_image: Option<PathBuf>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            plate: None,
            source_path: None,
            config: AnalysisConfig::default(),
            analysis: None,
            selected: BTreeSet::new(),
            view: View::default(),
            palette: SlopePalette::default(),
            status_message: None,
            pending_image: None,
        }
    }
}

impl AppState {
    pub fn with_config(config: AnalysisConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Ingest a newly loaded plate and analyse it with the current settings.
    pub fn set_plate(&mut self, plate: Plate, source_path: Option<PathBuf>) {
        self.selected.retain(|id| plate.well(*id).is_some());
        self.plate = Some(plate);
        self.source_path = source_path;
        self.reanalyze();
    }

    /// Recompute the analysis after a settings change.
    ///
    /// Invalid settings keep the previous result on screen and report why.
    pub fn reanalyze(&mut self) {
        let Some(plate) = &self.plate else {
            return;
        };
        match analyze_plate(plate, &self.config) {
            Ok(analysis) => {
                self.analysis = Some(analysis);
                self.status_message = None;
            }
            Err(e) => {
                log::error!("Analysis failed: {e}");
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    /// Toggle a single well in the detail selection.
    pub fn toggle_well(&mut self, id: WellId) {
        if !self.selected.remove(&id) {
            self.selected.insert(id);
        }
    }

    /// Select wells (e.g. from `--single`) and switch to the detail view.
    pub fn select_wells(&mut self, wells: impl IntoIterator<Item = WellId>) {
        self.selected.extend(wells);
        if !self.selected.is_empty() {
            self.view = View::Detail;
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    /// Queue a plate image export. The grid must be on screen when the
    /// frame is captured, so this also switches to the plate view.
    pub fn request_plate_image(&mut self, path: PathBuf) {
        self.view = View::Plate;
        self.pending_image = Some(path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::WellColumn;

    fn plate() -> Plate {
        Plate {
            name: "p".into(),
            times: (0..6).map(|i| i as f64).collect(),
            wells: vec![WellColumn {
                id: "A1".parse().unwrap(),
                label: "A1".into(),
                values: (0..6).map(|i| i as f64 * 0.2).collect(),
            }],
        }
    }

    #[test]
    fn loading_a_plate_runs_the_analysis() {
        let mut state = AppState::default();
        state.set_plate(plate(), None);
        let analysis = state.analysis.as_ref().unwrap();
        assert_eq!(analysis.wells.len(), 1);
        assert!(state.status_message.is_none());
    }

    #[test]
    fn bad_settings_keep_previous_result() {
        let mut state = AppState::default();
        state.set_plate(plate(), None);
        state.config.min_points = 1;
        state.reanalyze();
        assert!(state.analysis.is_some());
        assert!(state.status_message.as_deref().unwrap().contains("min_points"));
    }

    #[test]
    fn selection_switches_to_detail_and_drops_missing_wells() {
        let mut state = AppState::default();
        let a1: WellId = "A1".parse().unwrap();
        let h12: WellId = "H12".parse().unwrap();
        state.select_wells([a1, h12]);
        assert_eq!(state.view, View::Detail);

        state.set_plate(plate(), None);
        assert_eq!(state.selected.len(), 1);

        state.toggle_well(a1);
        assert!(state.selected.is_empty());
    }

    #[test]
    fn plate_image_request_shows_the_grid() {
        let mut state = AppState::default();
        state.select_wells(["A1".parse::<WellId>().unwrap()]);
        assert_eq!(state.view, View::Detail);

        state.request_plate_image(PathBuf::from("out_p.png"));
        assert_eq!(state.view, View::Plate);
        assert_eq!(state.pending_image, Some(PathBuf::from("out_p.png")));
    }
}
