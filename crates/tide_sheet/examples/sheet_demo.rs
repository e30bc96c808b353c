//! Sheet Demo
//!
//! Drives a sheet headlessly with synthetic pointer input and prints the
//! render state a host would draw each step:
//! - Present at the middle detent
//! - Drag up and release to the maximum detent
//! - Fling down to dismiss
//!
//! Run with: cargo run -p tide_sheet --example sheet_demo [config.toml]
//! Set RUST_LOG=tide_sheet=debug to see detent decisions.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tide_core::{EdgeInsets, Point, Size};
use tide_sheet::prelude::*;
use tracing_subscriber::EnvFilter;

const FRAME: f32 = 1.0 / 60.0;
const FRAME_MS: f64 = 1000.0 / 60.0;

struct ConsoleSurface;

impl PresentingSurface for ConsoleSurface {
    fn is_visible(&self) -> bool {
        true
    }

    fn set_presenting_transform(&mut self, transform: PresentingTransform) {
        tracing::trace!(
            "host transform: scale {:.3}, dy {:.1}, radius {:.1}",
            transform.scale,
            transform.translation_y,
            transform.corner_radius
        );
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match std::env::args().nth(1).map(PathBuf::from) {
        Some(path) => SheetConfig::load(&path)?,
        None => SheetConfig::default(),
    };

    let mut presenter = SheetPresenter::new(config);
    presenter.attach_scene(SceneGeometry::new(
        Size::new(390.0, 844.0),
        EdgeInsets::vertical(47.0, 34.0),
    ));

    presenter.present_sheet(
        Arc::new(Mutex::new(ConsoleSurface)),
        Box::new(FixedContent(600.0)),
        SheetPresentation::new().dismiss_when_flung_down(true),
    )?;
    run_until_rest(&mut presenter, "present");

    // Drag up from inside the sheet
    let mut point = Point::new(195.0, 600.0);
    let mut time = 0.0;
    if presenter.pointer_down(point, time) {
        for _ in 0..12 {
            point.y -= 25.0;
            time += FRAME_MS;
            presenter.pointer_move(point, time);
        }
        presenter.pointer_up(point);
    }
    run_until_rest(&mut presenter, "drag up");

    // Hard fling down
    let mut point = Point::new(195.0, 300.0);
    let mut time = 0.0;
    if presenter.pointer_down(point, time) {
        for _ in 0..6 {
            point.y += 90.0;
            time += FRAME_MS;
            presenter.pointer_move(point, time);
        }
        presenter.pointer_up(point);
    }
    run_until_rest(&mut presenter, "fling down");

    tracing::info!("presenting after fling: {}", presenter.is_presenting());
    Ok(())
}

fn run_until_rest(presenter: &mut SheetPresenter, label: &str) {
    for frame in 0..600 {
        let tick = presenter.tick(FRAME);
        if let Some(sheet) = presenter.container() {
            if frame % 6 == 0 {
                tracing::info!(
                    "[{label}] frame {frame:3}: offset {:7.1}  dimming {:.2}  progress {:.2}  status {:?}",
                    sheet.presented_offset(),
                    sheet.dimming_alpha(),
                    sheet.maximum_progress(),
                    sheet.status_bar_override(),
                );
            }
        }
        match tick {
            SheetTick::Animating => continue,
            SheetTick::Snapped(detent) => {
                tracing::info!("[{label}] snapped to {:?}", detent);
                return;
            }
            SheetTick::Dismissed => {
                tracing::info!("[{label}] dismissed");
                return;
            }
            SheetTick::Idle => return,
        }
    }
}
