//! Check engine capabilities.

use gstreamer as gst;

/// Elements the streaming and recording pipelines are built from.
const REQUIRED_ELEMENTS: &[&str] = &[
    "rtspsrc",
    "rtph264depay",
    "h264parse",
    "tee",
    "decodebin",
    "videoconvert",
    "autovideosink",
    "mp4mux",
    "filesink",
    "queue",
];

pub fn run() -> anyhow::Result<()> {
    println!("Vigil Engine Check");
    println!("{}", "=".repeat(50));

    gst::init()?;
    println!("[OK] GStreamer: {}", gst::version_string());

    let mut all_ok = true;
    for name in REQUIRED_ELEMENTS {
        if gst::ElementFactory::find(name).is_some() {
            println!("[OK] Element: {name}");
        } else {
            println!("[MISSING] Element: {name}");
            all_ok = false;
        }
    }

    println!();
    if all_ok {
        println!("All required engine elements are available. Vigil is ready.");
    } else {
        println!("Some required engine elements are missing; install the GStreamer base/good plugin sets.");
    }

    Ok(())
}
