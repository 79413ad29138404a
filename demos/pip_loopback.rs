//! Picture-in-picture loopback demo
//!
//! Run with: cargo run --example pip_loopback
//!
//! Drives a full overlay session against the in-memory capabilities:
//! - Prepares overlay content for a host view
//! - Enables the overlay on a synthetic remote track
//! - Pushes frames at 30 fps and watches them land on the overlay surface
//! - Starts, stops and finally disables the overlay
//!
//! ```text
//!   frame pump ──► LoopbackTrack ──► FrameConverter ──► OverlaySink ──► LoopbackSurface
//!                                          │
//!                                          └──► stats subscriber
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rtc_pip::media::{PixelBuffer, PixelFormat, Size, VideoFrame, VideoRotation};
use rtc_pip::pip::loopback::{LoopbackPlatform, LoopbackSurfaces, LoopbackTracks};
use rtc_pip::pip::{HostView, PipCapabilities, PipObserver, PipSessionManager, RestoreCompletion};
use rtc_pip::registry::subscriber_fn;

const STREAM_ID: &str = "remote-alice";
const FRAME_WIDTH: u32 = 320;
const FRAME_HEIGHT: u32 = 240;

/// Logs overlay events the way a host UI would react to them
struct HostObserver;

impl PipObserver for HostObserver {
    fn on_did_start(&self) {
        println!("host: overlay visible");
    }

    fn on_did_stop(&self) {
        println!("host: overlay hidden");
    }

    fn on_restore_ui(&self, completion: RestoreCompletion) {
        println!("host: restoring inline view");
        completion.complete(true);
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("rtc_pip=debug".parse()?)
                .add_directive("pip_loopback=info".parse()?),
        )
        .init();

    let tracks = Arc::new(LoopbackTracks::new());
    let track = tracks.insert(STREAM_ID);
    let platform = Arc::new(LoopbackPlatform::new());
    let surfaces = Arc::new(LoopbackSurfaces::new(4));

    let caps = PipCapabilities::new(tracks, platform.clone(), surfaces.clone())
        .observer(Arc::new(HostObserver));
    let manager = PipSessionManager::new(caps);

    manager.prepare(HostView::new(0x1000)).await?;
    manager.enable(STREAM_ID).await?;

    let converter = manager
        .converter()
        .await
        .ok_or("overlay converter missing after enable")?;
    converter.set_size(Size::new(FRAME_WIDTH, FRAME_HEIGHT));

    let delivered = Arc::new(AtomicU64::new(0));
    let counter = Arc::clone(&delivered);
    converter.subscribe(subscriber_fn(move |_buffer, _orientation, _scale| {
        counter.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }));

    // Pump frames while the overlay settles and shows
    let pump_track = Arc::clone(&track);
    let pump = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_millis(33));
        for i in 0..60u32 {
            ticker.tick().await;
            let frame = VideoFrame::new(
                PixelBuffer::zeroed(PixelFormat::Nv12, FRAME_WIDTH, FRAME_HEIGHT),
                VideoRotation::from_degrees(if i < 30 { 0 } else { 270 }),
                i as f64 / 30.0,
            );
            pump_track.deliver(&frame);
        }
    });

    tokio::time::sleep(Duration::from_millis(600)).await;
    tracing::info!(phase = ?manager.phase().await, "Session settled");

    manager.start().await?;
    pump.await?;
    manager.stop().await?;

    if let Some(surface) = surfaces.last() {
        for buffer in surface.drain() {
            tracing::info!(
                pts_ns = buffer.presentation_nanos(),
                orientation = ?buffer.attachments().orientation,
                "Queued on overlay surface"
            );
        }
        tracing::info!(replaced = surface.dropped(), "Surface backpressure");
    }

    let stats = converter.stats();
    tracing::info!(
        received = stats.frames_received,
        converted = stats.frames_converted,
        delivered = delivered.load(Ordering::Relaxed),
        scale = converter.scale_factor().value(),
        "Conversion stats"
    );

    manager.disable(STREAM_ID).await?;
    tokio::time::sleep(Duration::from_millis(600)).await;

    tracing::info!(
        sinks = track.sink_count(),
        controllers = platform.controllers().len(),
        phase = ?manager.phase().await,
        "Session torn down"
    );

    Ok(())
}
