//! # Booth Kiosk
//!
//! Headless kiosk driver: resolves routes, submits photos, watches jobs and
//! runs the gallery screen against a booth backend.

use std::sync::{Arc, Mutex};

use anyhow::Context;
use booth_client::{
    lock_feed, spawn_autoscroll, BoothClient, CliArgs, Command, KioskConfig, PhotoPayload,
    VirtualTrack, FRAME_INTERVAL,
};
use booth_core::{parse_style_id, ApiScope, GalleryFeed, JobReference, PublicRoute, ResultView};
use clap::Parser;
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize structured tracing with optional JSON format.
///
/// Set `RUST_LOG` to control log levels (default: info,booth_client=debug,booth_core=debug).
/// Set `RUST_LOG_FORMAT=json` for JSON output.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,booth_client=debug,booth_core=debug"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_writer(std::io::stderr);

    if std::env::var("RUST_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let args = CliArgs::parse();
    let config = KioskConfig::from(&args);
    tracing::debug!(api_base = %config.api_base, legacy = config.legacy, "Kiosk configured");

    match args.command {
        Command::Route { path } => {
            let route: PublicRoute = path.parse()?;
            println!("{}", serde_json::to_string_pretty(&route)?);
        }
        Command::Styles { room } => {
            let client = config.client()?;
            for style in client.list_styles(config.scope(&room)).await {
                println!("{:>4}  {}  {}", style.id, style.name, style.description);
            }
        }
        Command::Rooms => {
            let client = config.client()?;
            for room in client.list_rooms().await {
                println!("{:<20}  {}", room.slug.as_str(), room.display_name());
            }
        }
        Command::Submit {
            room,
            photo,
            style_id,
            watch,
        } => {
            let style_id = parse_style_id(&style_id)?;
            let photo = PhotoPayload::from_path(&photo)
                .await
                .with_context(|| format!("reading {}", photo.display()))?;
            let client = config.client()?;
            let scope = config.scope(&room);
            let created = client.submit(scope.clone(), photo, style_id).await?;
            println!("job {} {}", created.id, created.initial_state);
            if watch {
                watch_job(&client, &config, scope, created.reference()).await?;
            }
        }
        Command::Watch { room, job_ref } => {
            let client = config.client()?;
            let scope = config.scope(&room);
            watch_job(&client, &config, scope, JobReference::new(job_ref)).await?;
        }
        Command::Gallery {
            room,
            viewport,
            card_height,
        } => {
            let client = config.client()?;
            run_gallery(&client, &config, config.scope(&room), viewport, card_height).await?;
        }
    }

    Ok(())
}

/// Poll `job_ref` until its view is terminal or the user interrupts.
async fn watch_job(
    client: &BoothClient,
    config: &KioskConfig,
    scope: ApiScope,
    job_ref: JobReference,
) -> anyhow::Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let handle = client.start_polling(
        scope,
        job_ref,
        config.booth.poll_interval(),
        move |status| {
            let _ = tx.send(status.view());
        },
        |e| tracing::warn!(error = %e, "Status unavailable, still polling"),
    );

    let outcome = loop {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                signal.context("listening for interrupt")?;
                break None;
            }
            view = rx.recv() => match view {
                Some(view) if view.is_terminal() => break Some(view),
                Some(_) => println!("processing..."),
                None => break None,
            },
        }
    };
    handle.stop().await;

    match outcome {
        Some(ResultView::Completed {
            result_url,
            download_url,
            qr_url,
        }) => {
            println!("result:   {result_url}");
            println!("download: {download_url}");
            println!("qr:       {qr_url}");
        }
        Some(ResultView::Failed { message }) => anyhow::bail!("generation failed: {message}"),
        Some(ResultView::Loading) | None => tracing::info!("Stopped watching"),
    }
    Ok(())
}

/// Run the gallery refresh and auto-scroll loops until interrupted.
async fn run_gallery(
    client: &BoothClient,
    config: &KioskConfig,
    scope: ApiScope,
    viewport: f64,
    card_height: f64,
) -> anyhow::Result<()> {
    let feed = Arc::new(Mutex::new(GalleryFeed::new(&config.booth)));

    let refresh = client.start_gallery_refresh(
        scope,
        Arc::clone(&feed),
        config.booth.gallery_refresh_interval(),
        |e| tracing::debug!(retryable = e.is_retryable(), "Keeping previous gallery"),
    );
    let scroll = spawn_autoscroll(
        Arc::clone(&feed),
        VirtualTrack::new(card_height, viewport),
        FRAME_INTERVAL,
        |order| {
            let names: Vec<&str> = order.iter().map(|image| image.name.as_str()).collect();
            println!("cycle: {}", names.join(", "));
        },
    );

    tokio::signal::ctrl_c()
        .await
        .context("listening for interrupt")?;

    lock_feed(&feed).stop();
    scroll.stop().await;
    refresh.stop().await;
    Ok(())
}
