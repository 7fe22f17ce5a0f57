//! hud-demo - drive a HUD through its common scenarios
//!
//! There is no window here: each scenario logs the lifecycle events a host
//! would react to and the demo prints one rendered frame as JSON, which is
//! what a host would replay onto its canvas.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;

use progress_hud::display::draw::DrawList;
use progress_hud::display::geometry::{Rect, Size};
use progress_hud::{
    CustomView, HostView, Hud, HudDelegate, HudMode, HudSettings, OverlayView, WorkQueue,
};

/// Stand-in for a caller-provided checkmark image
struct Badge;

impl OverlayView for Badge {
    fn intrinsic_size(&self) -> Size {
        Size::square(37.0)
    }

    fn attached(&self) {
        info!("badge attached");
    }

    fn detached(&self) {
        info!("badge detached");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("progress_hud=info".parse()?),
        )
        .init();

    progress_hud::paths::log_paths();
    let settings = HudSettings::load_default().context("failed to load hud settings")?;
    let host = HostView::new(Size::new(375.0, 667.0));

    indeterminate(&host, &settings).await;
    determinate(&host, &settings).await?;
    custom_view(&host, &settings).await;
    text_only(&host, &settings).await?;

    info!("demo finished");
    Ok(())
}

fn delegate() -> HudDelegate {
    HudDelegate::new()
        .on_hidden(|hud| info!(hud = %hud.id(), "delegate: hidden"))
        .on_hidden_after_delay(|hud| info!(hud = %hud.id(), "delegate: hidden after delay"))
}

/// Spinner shown for a fixed stretch of work
async fn indeterminate(host: &HostView, settings: &HudSettings) {
    let hud = Hud::with_settings(host, settings.clone());
    hud.set_delegate(delegate());
    hud.set_title("Loading");
    hud.show(true);

    tokio::time::sleep(Duration::from_millis(600)).await;
    info!(spinning = hud.is_spinning(), repaints = hud.repaint_count(), "spinner running");

    hud.hide(true);
    hud.wait_hidden().await;
}

/// Annular progress reported from a worker thread
async fn determinate(host: &HostView, settings: &HudSettings) -> Result<()> {
    let hud = Hud::with_settings(host, settings.clone());
    hud.set_delegate(delegate());
    hud.set_mode(HudMode::DeterminateAnnular);
    hud.set_title("Downloading");

    let task = hud.run_while_showing(
        true,
        |reporter| {
            for step in 1..=10 {
                std::thread::sleep(Duration::from_millis(50));
                reporter.set_progress(step as f64 / 10.0);
            }
            reporter.set_message("verifying");
        },
        &WorkQueue::Blocking,
        Some(|| info!("download complete")),
    );
    if let Some(task) = task {
        task.await.context("download task panicked")?;
    }
    hud.wait_hidden().await;
    Ok(())
}

/// Caller-owned view that hides itself after a delay
async fn custom_view(host: &HostView, settings: &HudSettings) {
    let badge = Arc::new(Badge);
    let hud = Hud::with_settings(host, settings.clone());
    hud.set_delegate(delegate());
    hud.set_mode(HudMode::CustomView(CustomView::new(&badge)));
    hud.set_title("Completed");
    hud.show(true);
    hud.hide_after(true, Duration::from_secs(1));
    hud.wait_hidden().await;
}

/// Labels only, with one frame dumped for inspection
async fn text_only(host: &HostView, settings: &HudSettings) -> Result<()> {
    let hud = Hud::with_settings(host, settings.clone());
    hud.set_mode(HudMode::Text);
    hud.set_title("Saved");
    hud.set_message("3 files written to disk");
    hud.show(false);

    let frame: DrawList = hud.render();
    let panel: Rect = hud.layout().panel;
    info!(?panel, ops = frame.len(), "text frame");
    println!(
        "{}",
        serde_json::to_string_pretty(&frame).context("failed to encode frame")?
    );

    hud.hide(false);
    hud.wait_hidden().await;
    Ok(())
}
