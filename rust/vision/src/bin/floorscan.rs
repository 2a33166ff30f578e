// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CLI tool: recognize walls and rooms on a floor plan image
//!
//! Usage:
//!   floorscan <INPUT> [--config FILE] [--scale M_PER_PX] [--known-area M2]
//!             [--output FILE] [--scene FILE] [--project FILE]
//!             [--storey-height M] [--debug-image FILE] [--verbose]
//!
//! Prints the recognition result as JSON and exits with status 1 when
//! recognition fails.

use anyhow::Context;
use clap::Parser;
use floorscan_vision::image_ops::downscale_to_fit;
use floorscan_vision::{
    PlanningProjectInput, RecognitionConfig, RecognitionResult, RecognizedPlan, Recognizer,
    SceneInput, DEFAULT_STOREY_HEIGHT,
};
use image::{Rgb, RgbImage, RgbaImage};
use imageproc::drawing::draw_line_segment_mut;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "floorscan")]
#[command(about = "Recognize walls and rooms on a raster floor plan")]
#[command(version)]
struct Cli {
    /// Plan image (PNG/JPEG) or document
    input: PathBuf,

    /// JSON file with recognition parameters (partial files are fine)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Known meters per pixel; skips scale estimation
    #[arg(long)]
    scale: Option<f64>,

    /// Known total floor area in square meters
    #[arg(long)]
    known_area: Option<f64>,

    /// Write the result JSON here instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Write scene-builder input (vertices, edges, heights, thicknesses)
    #[arg(long)]
    scene: Option<PathBuf>,

    /// Write planning-project mutation variables
    #[arg(long)]
    project: Option<PathBuf>,

    /// Wall height for the scene; defaults to the plan's ceiling height
    #[arg(long)]
    storey_height: Option<f64>,

    /// Write an overlay of detected walls and rooms (PNG)
    #[arg(long)]
    debug_image: Option<PathBuf>,

    /// Debug-level logging for the recognizer
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "info,floorscan_vision=debug"
    } else {
        "warn"
    };
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.into());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if !run(cli).await? {
        std::process::exit(1);
    }
    Ok(())
}

fn load_config(cli: &Cli) -> anyhow::Result<RecognitionConfig> {
    let config = match &cli.config {
        Some(path) => RecognitionConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => RecognitionConfig::default(),
    };

    let mut config = config.with_env_overrides();
    if let Some(scale) = cli.scale {
        config.scale.explicit = Some(scale);
    }
    Ok(config)
}

/// Returns whether recognition succeeded
async fn run(cli: Cli) -> anyhow::Result<bool> {
    let config = load_config(&cli)?;
    let recognizer = Recognizer::new(config)?.with_known_area(cli.known_area);

    let outcome = match recognizer.load(&cli.input).await {
        Ok(source) => {
            let overlay_base = cli.debug_image.as_ref().map(|_| source.pixels.clone());
            let outcome = recognizer.recognize_source(source);
            let overlay = overlay_base.zip(cli.debug_image.as_ref());
            if let (Ok(plan), Some((base, path))) = (&outcome, overlay) {
                let base = downscale_to_fit(base, recognizer.config().max_dimension);
                save_debug_image(&base, plan, path)?;
            }
            outcome
        }
        Err(e) => Err(e),
    };

    if let Ok(plan) = &outcome {
        if let Some(path) = &cli.scene {
            let height = cli
                .storey_height
                .or(plan.metadata.ceiling_height)
                .unwrap_or(DEFAULT_STOREY_HEIGHT);
            let scene = SceneInput::from_walls(&plan.walls, plan.scale, height);
            write_json(path, &scene)?;
        }
        if let Some(path) = &cli.project {
            let source = cli
                .input
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let input = PlanningProjectInput::from_plan(plan, source);
            write_json(path, &input.to_variables())?;
        }
    }

    let result = RecognitionResult::from_outcome(outcome);
    match &cli.output {
        Some(path) => write_json(path, &result)?,
        None => println!("{}", serde_json::to_string_pretty(&result)?),
    }

    Ok(result.is_success())
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), "Wrote output");
    Ok(())
}

/// Walls in red (load-bearing) or orange (partition), rooms outlined in blue
fn save_debug_image(base: &RgbaImage, plan: &RecognizedPlan, path: &Path) -> anyhow::Result<()> {
    let mut overlay = RgbImage::new(base.width(), base.height());
    for (x, y, pixel) in base.enumerate_pixels() {
        let [r, g, b, _] = pixel.0;
        overlay.put_pixel(x, y, Rgb([r, g, b]));
    }

    for room in &plan.rooms {
        let n = room.vertices.len();
        for i in 0..n {
            let a = room.vertices[i];
            let b = room.vertices[(i + 1) % n];
            draw_line_segment_mut(
                &mut overlay,
                (a.x as f32, a.y as f32),
                (b.x as f32, b.y as f32),
                Rgb([0, 100, 255]),
            );
        }
    }

    for wall in &plan.walls {
        let color = if wall.load_bearing {
            Rgb([220, 0, 0])
        } else {
            Rgb([255, 150, 0])
        };
        draw_line_segment_mut(
            &mut overlay,
            (wall.start.x as f32, wall.start.y as f32),
            (wall.end.x as f32, wall.end.y as f32),
            color,
        );
    }

    overlay
        .save(path)
        .with_context(|| format!("Failed to save debug image {}", path.display()))?;
    tracing::info!(path = %path.display(), "Saved debug overlay");
    Ok(())
}
