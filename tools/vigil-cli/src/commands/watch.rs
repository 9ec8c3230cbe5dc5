//! Watch (and optionally record) a live stream.

use std::path::PathBuf;

use tokio::sync::mpsc;
use vigil_common::config::AppConfig;
use vigil_engine::GstEngine;
use vigil_session::{drive, LifecycleSignal, StreamSession, StreamTarget};

pub async fn run(
    url: String,
    record: bool,
    recordings_dir: Option<PathBuf>,
) -> anyhow::Result<()> {
    let mut config = AppConfig::load();
    if let Some(dir) = recordings_dir {
        config.recordings_dir = dir;
    }

    let target = StreamTarget::parse(&url)?;
    let mut session = StreamSession::new(target, Box::new(GstEngine::new()), &config);
    let mut notices = session.subscribe_notices();

    println!("Watching {url}");
    println!("  Recordings: {}", config.recordings_dir.display());
    println!();

    session.start_stream()?;
    if record {
        session.start_record()?;
    }

    let (signals, rx) = mpsc::unbounded_channel();
    let driver = tokio::spawn(drive(session, rx));
    let printer = tokio::spawn(async move {
        while let Some(notice) = notices.recv().await {
            println!("{notice}");
        }
    });

    println!("Press Ctrl+C to stop...");
    tokio::signal::ctrl_c().await?;
    signals.send(LifecycleSignal::CloseRequested).ok();

    let session = driver.await?;
    let last_error = session.last_error().cloned();
    // dropping the session closes the notice channel and ends the printer
    drop(session);
    printer.await.ok();

    if let Some(err) = last_error {
        println!("Last stream error: {err}");
    }

    Ok(())
}
