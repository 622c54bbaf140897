//! Interactive Sierpinski triangle explorer.
//!
//! Keys: `D` / `A` show more / fewer levels, `W` / `S` rotate the palette,
//! `Escape` quits.

mod config;
mod explorer;
mod palette;
mod view;

use anyhow::{Context, Result};

use sierpinski_engine::logging::init_logging;
use sierpinski_engine::window::Runtime;

use crate::config::ExplorerConfig;
use crate::explorer::Explorer;
use crate::palette::Palette;

fn main() -> Result<()> {
    let config = ExplorerConfig::default();
    init_logging(config.logging.clone());

    let mesh = sierpinski_geometry::generate(config.depth, config.root)
        .context("failed to generate sierpinski mesh")?;
    log::info!(
        "generated depth {}: {} vertices, {} triangles",
        mesh.depth(),
        mesh.vertices().len(),
        mesh.triangle_total()
    );
    log::info!("keys: D/A levels, W/S colors, Esc quit");

    let explorer = Explorer::new(mesh, Palette::classic(), config.clear_color);
    let explorer = Runtime::run(config.runtime, config.gpu, explorer)?;

    log::info!(
        "exiting at {} of {} levels",
        explorer.view().visible_levels(),
        explorer.view().max_levels()
    );
    explorer.finish()
}
