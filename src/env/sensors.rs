//! Sensor hub: callback-written episode state.
//!
//! The simulator publishes camera frames, collision events, and
//! lane-invasion events from its own event-delivery thread; the control
//! thread reads them once per tick after its fixed-interval wait. Each
//! field has a single writer (one callback source), so a lock or atomic per
//! field is sufficient for freshest-value visibility across the tick
//! boundary. Callbacks never block each other or the control thread for
//! longer than a field copy.

use crate::core::spec::{OBS_LEN, OBS_SHAPE};
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Lane-marking classification reported by a lane-invasion event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaneMarking {
    /// Unclassified marking; informational only.
    Other,
    /// Broken line; crossing is legal and informational only.
    Broken,
    /// Solid line; crossing terminates the episode.
    Solid,
    /// Unknown marking type; informational only.
    Unknown,
}

/// Raw camera frame kept for rendering, at the camera's native resolution.
#[derive(Debug, Clone, Default)]
pub struct RenderFrame {
    /// Frame width in pixels.
    pub width: usize,
    /// Frame height in pixels.
    pub height: usize,
    /// RGB bytes, `width * height * 3`.
    pub data: Vec<u8>,
}

/// Sensor-derived episode state, written by simulator callbacks.
pub struct SensorHub {
    /// Normalized 84x84x3 observation; all zeros before the first frame.
    frame: RwLock<Vec<f32>>,
    /// Unscaled RGB copy of the latest frame, for rendering.
    render_frame: RwLock<RenderFrame>,
    /// Magnitude of the most recent collision impulse.
    collision_intensity: Mutex<f64>,
    collided: AtomicBool,
    lane_crossed: AtomicBool,
}

/// Thread-safe shared sensor hub.
pub type SharedSensorHub = Arc<SensorHub>;

/// Create a new shared sensor hub.
pub fn sensor_hub() -> SharedSensorHub {
    Arc::new(SensorHub::new())
}

impl SensorHub {
    /// Create a hub with an all-zero initial frame.
    pub fn new() -> Self {
        Self {
            frame: RwLock::new(vec![0.0; OBS_LEN]),
            render_frame: RwLock::new(RenderFrame::default()),
            collision_intensity: Mutex::new(0.0),
            collided: AtomicBool::new(false),
            lane_crossed: AtomicBool::new(false),
        }
    }

    // ------------------------------------------------------------------
    // Callbacks (simulator event thread)
    // ------------------------------------------------------------------

    /// Camera callback: receives a raw RGBA frame at native resolution.
    ///
    /// Stores an unscaled RGB copy for rendering and a normalized,
    /// 84x84-resized copy as the latest observation. Frames with a
    /// malformed buffer length are dropped.
    pub fn on_image(&self, rgba: &[u8], width: usize, height: usize) {
        if width == 0 || height == 0 || rgba.len() != width * height * 4 {
            log::warn!(
                "dropping malformed camera frame: {} bytes for {}x{}",
                rgba.len(),
                width,
                height
            );
            return;
        }

        let mut rgb = Vec::with_capacity(width * height * 3);
        for px in rgba.chunks_exact(4) {
            rgb.extend_from_slice(&px[..3]);
        }

        let resized = resize_normalized(&rgb, width, height);

        *self.render_frame.write() = RenderFrame {
            width,
            height,
            data: rgb,
        };
        *self.frame.write() = resized;
    }

    /// Collision callback: receives the event's impulse vector.
    pub fn on_collision(&self, impulse: [f64; 3]) {
        let magnitude =
            (impulse[0] * impulse[0] + impulse[1] * impulse[1] + impulse[2] * impulse[2]).sqrt();
        *self.collision_intensity.lock() = magnitude;
        self.collided.store(magnitude > 0.0, Ordering::Release);
    }

    /// Lane-invasion callback: receives the crossed-marking classifications.
    ///
    /// Only a solid-line crossing sets the flag; other classifications are
    /// informational.
    pub fn on_lane_invasion(&self, markings: &[LaneMarking]) {
        if markings.contains(&LaneMarking::Solid) {
            self.lane_crossed.store(true, Ordering::Release);
        }
    }

    // ------------------------------------------------------------------
    // Control-thread reads
    // ------------------------------------------------------------------

    /// Clone the latest normalized observation.
    pub fn frame(&self) -> Vec<f32> {
        self.frame.read().clone()
    }

    /// Clone the latest raw frame for rendering.
    pub fn render_frame(&self) -> RenderFrame {
        self.render_frame.read().clone()
    }

    /// Magnitude of the most recent collision impulse.
    pub fn collision_intensity(&self) -> f64 {
        *self.collision_intensity.lock()
    }

    /// Whether a collision has been reported this episode.
    pub fn collided(&self) -> bool {
        self.collided.load(Ordering::Acquire)
    }

    /// Whether a solid lane marking has been crossed this episode.
    pub fn lane_crossed(&self) -> bool {
        self.lane_crossed.load(Ordering::Acquire)
    }

    /// Terminal condition: collision or solid-lane crossing.
    pub fn violation(&self) -> bool {
        self.collided() || self.lane_crossed()
    }

    /// Clear all sensor-derived state at the start of an episode.
    pub fn reset_episode(&self) {
        self.frame.write().fill(0.0);
        *self.render_frame.write() = RenderFrame::default();
        *self.collision_intensity.lock() = 0.0;
        self.collided.store(false, Ordering::Release);
        self.lane_crossed.store(false, Ordering::Release);
    }
}

impl Default for SensorHub {
    fn default() -> Self {
        Self::new()
    }
}

/// Resize an RGB byte frame to 84x84 and normalize to `[0, 1]`.
///
/// Nearest-neighbor sampling: deterministic and sufficient for a policy
/// input that is downsampled aggressively anyway.
fn resize_normalized(rgb: &[u8], width: usize, height: usize) -> Vec<f32> {
    let [out_h, out_w, channels] = OBS_SHAPE;
    let mut out = Vec::with_capacity(OBS_LEN);
    for oy in 0..out_h {
        let sy = oy * height / out_h;
        for ox in 0..out_w {
            let sx = ox * width / out_w;
            let base = (sy * width + sx) * channels;
            for c in 0..channels {
                out.push(rgb[base + c] as f32 / 255.0);
            }
        }
    }
    out
}
