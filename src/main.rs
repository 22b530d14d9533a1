//! zoompane - tile visibility planner for pyramid-tiled images.
//!
//! This binary loads a pyramid descriptor and either describes it or plans
//! which tiles a viewport of a given size and zoom would show.

use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use zoompane::{
    config::{Cli, Command, InspectConfig, OutputFormat, PlanConfig, SourceArgs},
    io::{DescriptorFetcher, RoutingFetcher},
    layer::{LayerState, RenderLayer},
    source::PyramidSource,
    tile::RecordingSurface,
    viewport::ViewportController,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.into_command() {
        Command::Inspect(config) => run_inspect(config).await,
        Command::Plan(config) => run_plan(config).await,
    }
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "zoompane=debug"
    } else {
        "zoompane=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Build an unconfigured source for the selected pyramid.
fn build_source(args: &SourceArgs) -> Result<PyramidSource, String> {
    let scheme = args.build_scheme().map_err(|e| e.to_string())?;
    let fetcher: Arc<dyn DescriptorFetcher> = Arc::new(RoutingFetcher::new());
    Ok(PyramidSource::new(args.source_id(), scheme, fetcher))
}

// =============================================================================
// Inspect Command
// =============================================================================

async fn run_inspect(config: InspectConfig) -> ExitCode {
    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let mut source = match build_source(&config.source) {
        Ok(source) => source,
        Err(e) => {
            error!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = source.configure().await {
        error!("{}", e);
        return ExitCode::FAILURE;
    }

    match config.format {
        OutputFormat::Text => print!("{}", source.describe()),
        OutputFormat::Json => {
            let levels = source.levels().unwrap_or_default();
            let json = serde_json::json!({
                "id": source.id().as_ref(),
                "name": source.name().unwrap_or_default(),
                "descriptor": source.config_url(),
                "width": source.abs_width().unwrap_or_default(),
                "height": source.abs_height().unwrap_or_default(),
                "thumbnail": source.thumbnail().ok().flatten(),
                "levels": levels
                    .iter()
                    .map(|level| serde_json::json!({
                        "ratio": level.ratio,
                        "width": level.width,
                        "height": level.height,
                        "tileWidth": level.tile_width,
                        "tileHeight": level.tile_height,
                        "numRows": level.num_rows,
                        "numCols": level.num_cols,
                    }))
                    .collect::<Vec<_>>(),
            });
            print_json(&json);
        }
    }

    ExitCode::SUCCESS
}

// =============================================================================
// Plan Command
// =============================================================================

async fn run_plan(config: PlanConfig) -> ExitCode {
    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let source = match build_source(&config.source) {
        Ok(source) => source,
        Err(e) => {
            error!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut viewport = match ViewportController::new(config.viewport_config()) {
        Ok(viewport) => viewport,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let surface = RecordingSurface::new();
    let layer = RenderLayer::new("main", source, Box::new(surface.clone()));
    let id = viewport.add_layer(layer).await;

    let Some(layer) = viewport.layer(id) else {
        error!("Layer {} disappeared", id);
        return ExitCode::FAILURE;
    };
    if layer.state() != LayerState::Ready {
        error!(
            "Failed to load pyramid: {}",
            layer.source().failure().unwrap_or("unknown error")
        );
        return ExitCode::FAILURE;
    }
    let level_ratio = config
        .level
        .and_then(|level| layer.source().levels().ok()?.get(level).map(|l| l.ratio));

    if config.fit {
        if let Err(e) = viewport.fit_layer(id) {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    } else if let Some(ratio) = config.ratio.or(level_ratio) {
        viewport.set_ratio(ratio);
    } else if config.level.is_some() {
        error!("Level {} does not exist", config.level.unwrap_or_default());
        return ExitCode::FAILURE;
    }

    match config.parse_center() {
        Ok(Some((x, y))) => viewport.set_center(x, y),
        Ok(None) => {}
        Err(e) => {
            error!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    }

    let state = viewport.state();
    let level = viewport
        .layer(id)
        .and_then(|layer| layer.source().level().ok())
        .unwrap_or_default();
    info!(
        ratio = state.ratio,
        level,
        tiles = surface.len(),
        "Plan complete"
    );

    let tiles = surface.tiles();
    match config.format {
        OutputFormat::Text => {
            println!(
                "ratio {} level {} pan {},{} content {}x{}",
                state.ratio,
                level,
                state.pan_x,
                state.pan_y,
                state.content_width,
                state.content_height
            );
            for tile in &tiles {
                println!(
                    "{} {} {} {} {}",
                    tile.id, tile.x, tile.y, tile.width, tile.height
                );
                println!("    {}", tile.url);
            }
        }
        OutputFormat::Json => {
            let json = serde_json::json!({
                "ratio": state.ratio,
                "level": level,
                "panX": state.pan_x,
                "panY": state.pan_y,
                "contentWidth": state.content_width,
                "contentHeight": state.content_height,
                "frame": {
                    "width": config.frame_width,
                    "height": config.frame_height,
                },
                "tiles": tiles
                    .iter()
                    .map(|tile| serde_json::json!({
                        "id": tile.id.to_string(),
                        "url": tile.url,
                        "x": tile.x,
                        "y": tile.y,
                        "width": tile.width,
                        "height": tile.height,
                    }))
                    .collect::<Vec<_>>(),
            });
            print_json(&json);
        }
    }

    viewport.destroy();
    ExitCode::SUCCESS
}

fn print_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(e) => error!("Failed to serialize output: {}", e),
    }
}
