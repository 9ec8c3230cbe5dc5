//! Fixed per-mode engine option sets.

use std::path::PathBuf;

use vigil_common::config::StreamTuning;

/// RTSP transport selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Tcp,
    Udp,
}

/// Decoder selection policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwDecode {
    /// Hardware-accelerated decode with automatic software fallback.
    Preferred,
    /// Software decode only.
    Disabled,
}

/// Container format for the recording sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkFormat {
    Mp4,
}

/// The recording output target, duplicated alongside live display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingSink {
    /// Resolved output file path. The caller resolves the path before the
    /// engine is ever involved.
    pub path: PathBuf,

    /// Container format.
    pub format: SinkFormat,
}

/// The full option set applied to an engine open.
///
/// Option sets are fixed per mode and built through [`EngineOptions::streaming`]
/// or [`EngineOptions::recording`]; only the caching windows and decoder
/// preference vary, via [`StreamTuning`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOptions {
    pub transport: Transport,
    pub drop_late_frames: bool,
    pub skip_frames: bool,
    pub hw_decode: HwDecode,
    pub network_caching_ms: u32,
    pub live_caching_ms: u32,
    pub file_caching_ms: u32,
    pub clock_jitter_correction: bool,
    pub clock_sync: bool,

    /// Present only for recording opens: duplicate output to display and
    /// this file sink.
    pub sink: Option<RecordingSink>,
}

impl EngineOptions {
    /// Option set for low-latency live display.
    ///
    /// TCP transport, bounded caching windows, no frame dropping or
    /// skipping (smoothness over latency), clock jitter correction and
    /// clock synchronisation off.
    pub fn streaming(tuning: &StreamTuning) -> Self {
        Self {
            transport: Transport::Tcp,
            drop_late_frames: false,
            skip_frames: false,
            hw_decode: if tuning.hw_decode {
                HwDecode::Preferred
            } else {
                HwDecode::Disabled
            },
            network_caching_ms: tuning.network_caching_ms,
            live_caching_ms: tuning.live_caching_ms,
            file_caching_ms: tuning.file_caching_ms,
            clock_jitter_correction: false,
            clock_sync: false,
            sink: None,
        }
    }

    /// Option set for simultaneous display and MP4 file output.
    ///
    /// Frame dropping and skipping stay disabled so the file keeps every
    /// frame the stream delivers.
    pub fn recording(tuning: &StreamTuning, sink_path: PathBuf) -> Self {
        Self {
            sink: Some(RecordingSink {
                path: sink_path,
                format: SinkFormat::Mp4,
            }),
            ..Self::streaming(tuning)
        }
    }

    /// Whether this option set duplicates output to a file sink.
    pub fn is_recording(&self) -> bool {
        self.sink.is_some()
    }
}
