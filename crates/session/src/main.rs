//! vPPG Engine - Demo Entry Point
//!
//! Runs a session on synthetic frames with mock oracles and prints every
//! Forecast Record as a JSON line. Usage: `vppg-engine [config.toml]`.

use anyhow::Context;
use session::synthetic::SyntheticCamera;
use session::{init_logging, now_ms, ChannelPublisher, EngineConfig, Session, SessionOracles};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let path = std::env::args().nth(1).map(PathBuf::from);
    let config = EngineConfig::load(path.as_deref()).context("loading configuration")?;
    init_logging(&config.logging)?;

    info!("=== vPPG Engine v{} ===", env!("CARGO_PKG_VERSION"));

    let windows = config.demo.windows.max(1);
    let (publisher, mut records) = ChannelPublisher::channel(windows as usize + 1);
    let session = Arc::new(Session::new(config.clone(), SessionOracles::mock(), Arc::new(publisher)));
    let mut emotion = session.emotion();

    let printer = tokio::spawn(async move {
        while let Some(published) = records.recv().await {
            match serde_json::to_string(&published.record) {
                Ok(json) => println!("{}", json),
                Err(e) => tracing::error!("Cannot serialize record: {}", e),
            }
        }
    });

    let fps = config.session.capture_fps;
    let window_ms = config.pipeline.window_ms();
    let lag_ms = config.session.window_lag_ms;

    if config.demo.realtime {
        info!("Running {} windows on the wall clock", windows);
        let handle = Arc::clone(&session).spawn();
        let camera = SyntheticCamera::from_demo(&config.demo, fps, now_ms());
        let total = (windows as i64 * window_ms + lag_ms) * fps as i64 / 1000;
        let mut ticker = tokio::time::interval(Duration::from_millis(1000 / fps.max(1) as u64));
        for (frame, _) in camera.take(total as usize) {
            ticker.tick().await;
            session.ingest(&frame, now_ms()).await;
        }
        handle.stop().await;
    } else {
        info!("Running {} windows on simulated time", windows);
        let start_ms = now_ms();
        let mut camera = SyntheticCamera::from_demo(&config.demo, fps, start_ms);
        for window in 1..=windows as i64 {
            let now = start_ms + window * window_ms + lag_ms;
            while camera.next_timestamp() < now {
                let Some((frame, at_ms)) = camera.next() else {
                    break;
                };
                session.ingest(&frame, at_ms).await;
            }
            session.run_window(now).await;
            if emotion.has_changed().unwrap_or(false) {
                println!("emotion: {:?}", *emotion.borrow_and_update());
            }
        }
    }

    println!("final emotion: {:?}", session.current_emotion());
    drop(session);
    printer.await?;
    Ok(())
}
