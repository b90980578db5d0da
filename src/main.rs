mod analysis;
mod app;
mod cli;
mod color;
mod config;
mod data;
mod export;
mod state;
mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use eframe::egui;

use analysis::pipeline::{analyze_plate, PlateAnalysis};
use app::KineticPlateApp;
use cli::Cli;
use state::AppState;

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = cli.analysis_config()?;

    if cli.headless {
        return run_headless(&cli, config);
    }

    let mut state = AppState::with_config(config);
    if let Some(path) = &cli.input {
        match data::loader::load_file(path) {
            Ok(plate) => state.set_plate(plate, Some(path.clone())),
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
    state.select_wells(cli.single.iter().copied());

    if cli.output {
        if let (Some(analysis), Some(path)) = (&state.analysis, &state.source_path) {
            let out = export::default_output_path(path, &analysis.plate_name, cli.format);
            export::export_to_path(analysis, &out, cli.format)?;
            let image = export::default_image_path(path, &analysis.plate_name);
            state.request_plate_image(image);
        }
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Kinetic Plate – 96-well analysis",
        options,
        Box::new(|_cc| Ok(Box::new(KineticPlateApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("viewer failed: {e}"))
}

/// Analyse, report and export without a window.
fn run_headless(cli: &Cli, config: config::AnalysisConfig) -> Result<()> {
    let path = cli
        .input
        .as_deref()
        .context("--headless needs an input file")?;
    let plate = data::loader::load_file(path)?;
    let analysis = analyze_plate(&plate, &config).context("analysing plate")?;

    print_singles(&analysis, cli);

    if cli.output {
        let out = export::default_output_path(path, &analysis.plate_name, cli.format);
        export::export_to_path(&analysis, &out, cli.format)?;
        log::info!("No window in headless mode, skipping the plate image");
    }
    Ok(())
}

fn print_singles(analysis: &PlateAnalysis, cli: &Cli) {
    for id in &cli.single {
        match analysis.well(*id) {
            Some(well) => match (&well.fit, well.reporting_slope()) {
                (Ok(fit), Some(slope)) => println!(
                    "{id}: slope {slope:.2}, r² {:.4} ({} of {} points, {})",
                    fit.r_squared,
                    well.fitted.len(),
                    well.raw.len(),
                    well.adjustment.label()
                ),
                (Err(e), _) => println!("{id}: {e}"),
                (Ok(_), None) => println!("{id}: no slope"),
            },
            None => println!("{id}: not on this plate"),
        }
    }
}
