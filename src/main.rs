// SPDX-License-Identifier: GPL-3.0-or-later
// src/main.rs
//
// Command-line driver: load two images, select a region, optionally fuse.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Parser;
use image::ImageFormat;

use imagefuse::app::view::crop::PointerEvent;
use imagefuse::app::{AppMessage, Notice, Session, Slot};
use imagefuse::config::AppConfig;
use imagefuse::domain::document::SourceFile;
use imagefuse::domain::fusion::{
    FusionParameter, FusionRequest, FusionResponse, FusionService,
};
use imagefuse::domain::viewport::{Point, SurfaceSize};
use imagefuse::error::RemoteCallError;

#[derive(Debug, Parser)]
#[command(name = "imagefuse", version, about = "Select a garment feature and fuse it into a base image")]
struct Cli {
    /// Garment that receives the feature
    #[arg(long, value_name = "FILE")]
    base: PathBuf,

    /// Image the feature is taken from
    #[arg(long, value_name = "FILE")]
    source: PathBuf,

    /// Drag on the source canvas, in display pixels
    #[arg(long, value_name = "X0,Y0,X1,Y1", value_parser = parse_drag)]
    drag: [f32; 4],

    /// Canvas size, overrides the config
    #[arg(long, value_name = "WxH", value_parser = parse_surface)]
    surface: Option<SurfaceSize>,

    /// Write the extracted region as PNG
    #[arg(long, value_name = "FILE")]
    crop_out: Option<PathBuf>,

    /// Write the source canvas with the selection drawn on it
    #[arg(long, value_name = "FILE")]
    overlay_out: Option<PathBuf>,

    /// Fusion instructions; submits when given
    #[arg(long)]
    prompt: Option<String>,

    /// Fusion endpoint, overrides the config
    #[arg(long, value_name = "URL")]
    endpoint: Option<String>,

    /// Where to write the fusion result
    #[arg(long, value_name = "FILE", requires = "prompt")]
    result_out: Option<PathBuf>,

    /// Query the endpoint's health check before submitting
    #[arg(long)]
    check_health: bool,

    #[arg(long, value_name = "0-100")]
    fabric_weight: Option<u8>,

    #[arg(long, value_name = "0-100")]
    drape_match: Option<u8>,

    #[arg(long, value_name = "0-100")]
    seamless_blend: Option<u8>,

    /// Path to YAML config file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

fn parse_drag(s: &str) -> Result<[f32; 4], String> {
    let values = s
        .split(',')
        .map(|v| v.trim().parse::<f32>().map_err(|e| format!("{v:?}: {e}")))
        .collect::<Result<Vec<_>, _>>()?;
    <[f32; 4]>::try_from(values).map_err(|_| "expected four numbers x0,y0,x1,y1".to_string())
}

fn parse_surface(s: &str) -> Result<SurfaceSize, String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| "expected WIDTHxHEIGHT".to_string())?;
    let w = w.trim().parse().map_err(|e| format!("width: {e}"))?;
    let h = h.trim().parse().map_err(|e| format!("height: {e}"))?;
    Ok(SurfaceSize::new(w, h))
}

fn mime_for(path: &Path) -> Option<&'static str> {
    ImageFormat::from_path(path).ok().map(|f| f.to_mime_type())
}

fn read_source(path: &Path) -> Result<SourceFile> {
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    Ok(SourceFile::new(bytes, mime_for(path)))
}

/// Stand-in when no endpoint is configured.
struct Offline;

impl FusionService for Offline {
    async fn fuse(&self, _request: FusionRequest) -> Result<FusionResponse, RemoteCallError> {
        Err(RemoteCallError::Transport(
            "no fusion endpoint configured".to_string(),
        ))
    }
}

/// Log info notices, turn error notices into failures.
fn drain_notice<S: FusionService + 'static>(session: &mut Session<S>) -> Result<()> {
    match session.model_mut().take_notice() {
        Some(Notice::Info(msg)) => {
            log::info!("{msg}");
            Ok(())
        }
        Some(Notice::Error(err)) => bail!(err),
        None => Ok(()),
    }
}

async fn run<S: FusionService + 'static>(cli: Cli, config: AppConfig, service: S) -> Result<()> {
    let mut session = Session::new(&config, service);
    let surface = config.surface_size();

    for (slot, path) in [(Slot::Base, &cli.base), (Slot::Source, &cli.source)] {
        session.dispatch(AppMessage::SurfaceResized { slot, size: surface });
        session.dispatch(AppMessage::Upload {
            slot,
            file: read_source(path)?,
        });
        session.run_until_idle().await;
        drain_notice(&mut session)?;
    }

    let [x0, y0, x1, y1] = cli.drag;
    for event in [
        PointerEvent::Down(Point::new(x0, y0)),
        PointerEvent::Move(Point::new(x1, y1)),
        PointerEvent::Up,
    ] {
        session.dispatch(AppMessage::Pointer {
            slot: Slot::Source,
            event,
        });
    }

    let Some(selection) = session.model().selection() else {
        bail!(
            "selection ({x0},{y0})-({x1},{y1}) is too small or outside the source image on a {}x{} canvas",
            surface.width,
            surface.height
        );
    };
    let region = selection.extracted.region;
    log::info!(
        "Selected {}x{} at ({}, {}) on the source image",
        region.width,
        region.height,
        region.x,
        region.y
    );

    if let Some(path) = &cli.crop_out {
        std::fs::write(path, &selection.extracted.payload.bytes)
            .with_context(|| format!("writing {}", path.display()))?;
        log::info!("Wrote crop to {}", path.display());
    }

    if let Some(path) = &cli.overlay_out
        && let Some(rendered) = session.model().render(Slot::Source)
    {
        rendered
            .save(path)
            .with_context(|| format!("writing {}", path.display()))?;
        log::info!("Wrote overlay to {}", path.display());
    }

    let Some(prompt) = cli.prompt else {
        return Ok(());
    };

    session.dispatch(AppMessage::SetPrompt(prompt));
    for (parameter, value) in [
        (FusionParameter::FabricWeight, cli.fabric_weight),
        (FusionParameter::DrapeMatch, cli.drape_match),
        (FusionParameter::SeamlessBlend, cli.seamless_blend),
    ] {
        if let Some(value) = value {
            session.dispatch(AppMessage::SetParameter { parameter, value });
        }
    }

    session.dispatch(AppMessage::Submit);
    drain_notice(&mut session)?;
    session.run_until_idle().await;
    drain_notice(&mut session)?;

    let model = session.model();
    let Some(preview) = model.preview() else {
        bail!("fusion finished without a result");
    };
    if preview.generated {
        println!("Fusion confidence: {}%", model.confidence());
    } else {
        println!("No image was generated; the base image is shown unchanged");
    }

    if let Some(path) = &cli.result_out {
        std::fs::write(path, &preview.payload.bytes)
            .with_context(|| format!("writing {}", path.display()))?;
        log::info!("Wrote result to {}", path.display());
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut config = AppConfig::load(cli.config.as_deref()).context("loading configuration")?;
    if let Some(surface) = cli.surface {
        config.surface_width = surface.width;
        config.surface_height = surface.height;
    }
    if cli.endpoint.is_some() {
        config.endpoint.clone_from(&cli.endpoint);
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("starting runtime")?;
    let local = tokio::task::LocalSet::new();
    launch(cli, config, &runtime, &local)
}

#[cfg(feature = "http")]
fn launch(
    cli: Cli,
    config: AppConfig,
    runtime: &tokio::runtime::Runtime,
    local: &tokio::task::LocalSet,
) -> Result<()> {
    let Some(endpoint) = config.endpoint.clone() else {
        return launch_offline(cli, config, runtime, local);
    };

    let client = imagefuse::service::HttpFusionClient::new(endpoint, config.request_timeout())?;
    if cli.check_health {
        let healthy = local.block_on(runtime, client.health())?;
        if healthy {
            log::info!("Fusion endpoint {} is healthy", client.endpoint());
        } else {
            log::warn!("Fusion endpoint {} reports unhealthy", client.endpoint());
        }
    }
    local.block_on(runtime, run(cli, config, client))
}

#[cfg(not(feature = "http"))]
fn launch(
    cli: Cli,
    config: AppConfig,
    runtime: &tokio::runtime::Runtime,
    local: &tokio::task::LocalSet,
) -> Result<()> {
    launch_offline(cli, config, runtime, local)
}

fn launch_offline(
    cli: Cli,
    config: AppConfig,
    runtime: &tokio::runtime::Runtime,
    local: &tokio::task::LocalSet,
) -> Result<()> {
    if cli.check_health {
        log::warn!("No fusion endpoint configured, skipping health check");
    }
    local.block_on(runtime, run(cli, config, Offline))
}
