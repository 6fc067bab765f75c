//! # Meme Canvas CLI
//!
//! Renders a meme scene and exports it to disk.

use std::time::Instant;

use clap::Parser;
use meme_core::{ExportButton, SceneStore, Template};
use meme_cli::{build_store, export_options, CliArgs, ExportJobConfig};
use meme_renderer::{DirectorySink, RenderSurface, SceneExporter, SurfaceConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "meme_cli=info,meme_renderer=info,meme_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = CliArgs::parse();
    if args.list_templates {
        for template in Template::builtin() {
            println!(
                "{}\t{}\t{}x{}\t{}",
                template.id, template.name, template.width, template.height, template.background_color
            );
        }
        return Ok(());
    }

    let config = ExportJobConfig::from(args);
    tracing::info!("Export job: {:?} -> {}", config.source, config.out_dir.display());

    let store = build_store(&config)?;
    let (width, height) = store.canvas_size();
    tracing::info!(
        "Scene {} ({width}x{height}): {} texts, {} images",
        store.template().id,
        store.texts().len(),
        store.images().len()
    );

    if let Some(path) = &config.save_scene {
        std::fs::write(path, store.document().to_json()?)?;
        tracing::info!("Saved scene to {}", path.display());
    }

    if !export(&config, &store) {
        anyhow::bail!("Export failed");
    }
    Ok(())
}

/// Render the store and download it into the output directory.
fn export(config: &ExportJobConfig, store: &SceneStore) -> bool {
    let mut surface = RenderSurface::new(SurfaceConfig {
        resources_dir: config.resources_dir.clone(),
        container_width: None,
    });
    surface.sync(store);

    let mut button = ExportButton::new();
    if !button.begin() {
        return false;
    }

    let exporter = SceneExporter::new(export_options(config, store));
    let mut sink = DirectorySink::new(&config.out_dir);
    let success = exporter.download(&surface, &config.prefix, &mut sink);
    button.finish(success, Instant::now());

    for path in sink.saved() {
        println!("{}", path.display());
    }
    tracing::debug!("Export button: {:?}", button.status());
    success
}
