//! GStreamer-backed media engine.
//!
//! Pipelines are built from launch strings: an rtspsrc/decodebin graph for
//! live display, and a tee that duplicates the depayloaded stream to both
//! display and an MP4 file sink for recording.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use gst::prelude::*;
use gstreamer as gst;
use vigil_common::error::{EngineError, EngineResult};

use crate::engine::{EngineEvent, EngineSession, MediaEngine};
use crate::options::{EngineOptions, HwDecode, RecordingSink, Transport};

/// The production engine. Stateless: each open builds a fresh pipeline.
#[derive(Debug, Default)]
pub struct GstEngine;

impl GstEngine {
    pub fn new() -> Self {
        Self
    }
}

impl MediaEngine for GstEngine {
    fn open(
        &mut self,
        target: &str,
        options: &EngineOptions,
    ) -> EngineResult<Box<dyn EngineSession>> {
        init_gstreamer()?;
        let (name, launch) = match &options.sink {
            Some(sink) => ("record", recording_launch(target, options, sink)),
            None => ("stream", streaming_launch(target, options)),
        };
        tracing::debug!(pipeline = name, %launch, "Building engine pipeline");
        let playback = GstPlayback::from_launch(name, &launch, options.is_recording())?;
        Ok(Box::new(playback))
    }
}

/// One open GStreamer pipeline behind the [`EngineSession`] boundary.
pub struct GstPlayback {
    name: String,
    pipeline: gst::Pipeline,
    playing: Arc<AtomicBool>,
    has_file_sink: bool,
    released: bool,
}

impl GstPlayback {
    fn from_launch(name: impl Into<String>, launch: &str, has_file_sink: bool) -> EngineResult<Self> {
        let element = gst::parse::launch(launch)
            .map_err(|e| EngineError::open(format!("Failed to build pipeline: {e}")))?;

        let pipeline = element
            .dynamic_cast::<gst::Pipeline>()
            .map_err(|_| EngineError::open("Launch string did not produce a pipeline"))?;

        Ok(Self {
            name: name.into(),
            pipeline,
            playing: Arc::new(AtomicBool::new(false)),
            has_file_sink,
            released: false,
        })
    }

    /// Send EOS and wait for it to propagate so encoders/muxers flush and
    /// finalize their output. Without this the MP4 moov atom is never
    /// written and the recording is unreadable.
    fn drain_to_eos(&self) {
        let eos_sent = self.pipeline.send_event(gst::event::Eos::new());
        if !eos_sent {
            tracing::warn!(pipeline = %self.name, "Failed to send EOS event; output may be truncated");
            return;
        }

        let Some(bus) = self.pipeline.bus() else {
            return;
        };
        let deadline = Duration::from_secs(10);
        let start = std::time::Instant::now();
        loop {
            let timeout_ns = {
                let elapsed = start.elapsed();
                if elapsed >= deadline {
                    break;
                }
                let remaining = deadline - elapsed;
                gst::ClockTime::from_nseconds(remaining.as_nanos() as u64)
            };
            match bus.timed_pop(timeout_ns) {
                Some(msg) => match msg.view() {
                    gst::MessageView::Eos(_) => {
                        tracing::debug!(pipeline = %self.name, "EOS received; sink finalized");
                        break;
                    }
                    gst::MessageView::Error(e) => {
                        tracing::warn!(
                            pipeline = %self.name,
                            error = %e.error(),
                            "Pipeline error during EOS drain"
                        );
                        break;
                    }
                    _ => {}
                },
                None => {
                    tracing::warn!(pipeline = %self.name, "EOS drain timed out after 10s");
                    break;
                }
            }
        }
    }
}

impl EngineSession for GstPlayback {
    fn play(&mut self) -> EngineResult<()> {
        self.pipeline.set_state(gst::State::Playing).map_err(|e| {
            EngineError::open(format!("Failed to start {} pipeline: {e:?}", self.name))
        })?;

        // GStreamer state changes are async; wait until the pipeline
        // actually reaches Playing so an unreachable server or codec init
        // failure surfaces here instead of as a silent black frame.
        let wait_result = self.pipeline.state(gst::ClockTime::from_seconds(10));
        match wait_result {
            (Ok(_), gst::State::Playing, _) => {}
            (Ok(_), state, _) => {
                tracing::warn!(
                    pipeline = %self.name,
                    ?state,
                    "Pipeline did not reach Playing state within timeout"
                );
            }
            (Err(e), _, _) => {
                self.pipeline.set_state(gst::State::Null).ok();
                return Err(EngineError::open(format!(
                    "{} pipeline failed to reach Playing state: {e:?}",
                    self.name
                )));
            }
        }

        self.playing.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn stop(&mut self) -> EngineResult<()> {
        if self.released {
            return Ok(());
        }
        if self.has_file_sink {
            self.drain_to_eos();
        }
        self.pipeline.set_state(gst::State::Null).map_err(|e| {
            EngineError::playback(format!("Failed to stop {} pipeline: {e:?}", self.name))
        })?;
        self.playing.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.pipeline.set_state(gst::State::Null).ok();
        self.playing.store(false, Ordering::SeqCst);
        self.released = true;
        tracing::debug!(pipeline = %self.name, "Pipeline released");
    }

    fn is_playing(&self) -> bool {
        !self.released && self.playing.load(Ordering::SeqCst)
    }

    fn take_event(&mut self) -> Option<EngineEvent> {
        if self.released {
            return None;
        }
        let bus = self.pipeline.bus()?;
        while let Some(msg) = bus.pop() {
            match msg.view() {
                gst::MessageView::Error(e) => {
                    let mut reason = e.error().to_string();
                    if let Some(debug) = e.debug() {
                        reason = format!("{reason} ({debug})");
                    }
                    return Some(EngineEvent::Error(EngineError::playback(reason)));
                }
                gst::MessageView::Eos(_) => return Some(EngineEvent::EndOfStream),
                _ => {}
            }
        }
        None
    }
}

impl Drop for GstPlayback {
    fn drop(&mut self) {
        self.release();
    }
}

/// Launch string for live display.
pub fn streaming_launch(target: &str, options: &EngineOptions) -> String {
    let url = escape_launch_value(target);
    let protocols = transport_fragment(options.transport);
    let decoder = decoder_fragment(options.hw_decode);
    // rtspsrc latency is the live jitterbuffer window; the queue bounds
    // network buffering ahead of the decoder. sync=false on the sink
    // disables clock synchronisation against the pipeline clock, matching
    // the live-view tuning (render as delivered).
    let sync = options.clock_sync;
    format!(
        "rtspsrc location=\"{url}\" {protocols} latency={live} drop-on-latency={drop} ! \
         queue max-size-time={net_ns} ! {decoder} ! videoconvert ! autovideosink sync={sync}",
        live = options.live_caching_ms,
        drop = options.drop_late_frames,
        net_ns = ms_to_ns(options.network_caching_ms),
    )
}

/// Launch string for simultaneous display and MP4 file output.
///
/// The depayloaded elementary stream is split with a tee: one branch is
/// decoded for display, the other is muxed untranscoded into the file so
/// recording costs no extra encode. Both branches use plain (non-leaky)
/// queues: a slow display must not cost the file any frames.
pub fn recording_launch(target: &str, options: &EngineOptions, sink: &RecordingSink) -> String {
    let url = escape_launch_value(target);
    let path = escape_launch_value(&sink.path.to_string_lossy());
    let protocols = transport_fragment(options.transport);
    let decoder = decoder_fragment(options.hw_decode);
    let sync = options.clock_sync;
    format!(
        "rtspsrc location=\"{url}\" {protocols} latency={live} drop-on-latency={drop} ! \
         rtph264depay ! h264parse ! tee name=split \
         split. ! queue max-size-time={net_ns} ! {decoder} ! videoconvert ! autovideosink sync={sync} \
         split. ! queue max-size-time={file_ns} ! mp4mux ! filesink location=\"{path}\"",
        live = options.live_caching_ms,
        drop = options.drop_late_frames,
        net_ns = ms_to_ns(options.network_caching_ms),
        file_ns = ms_to_ns(options.file_caching_ms),
    )
}

fn ms_to_ns(ms: u32) -> u64 {
    u64::from(ms) * 1_000_000
}

fn transport_fragment(transport: Transport) -> &'static str {
    match transport {
        Transport::Tcp => "protocols=tcp",
        Transport::Udp => "protocols=udp",
    }
}

fn decoder_fragment(hw_decode: HwDecode) -> &'static str {
    match hw_decode {
        HwDecode::Preferred => "decodebin",
        HwDecode::Disabled => "decodebin force-sw-decoders=true",
    }
}

fn escape_launch_value(value: &str) -> String {
    value.replace('"', "\\\"")
}

fn init_gstreamer() -> EngineResult<()> {
    static GST_INIT: OnceLock<Result<(), String>> = OnceLock::new();
    let init_res = GST_INIT.get_or_init(|| gst::init().map_err(|e| e.to_string()));
    match init_res {
        Ok(()) => Ok(()),
        Err(e) => Err(EngineError::open(format!(
            "Failed to initialize GStreamer: {e}"
        ))),
    }
}
