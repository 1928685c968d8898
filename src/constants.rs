//! Centralised cell geometry, animation, and lighting constants.
//!
//! All tuneable values live here so they can be found and changed in one
//! place.  [`crate::config::CellConfig`] mirrors the runtime-relevant subset
//! and uses these as its defaults.
//!
//! Units are scene units: the glass box is 6 units long along Z, with the two
//! electrode plates facing each other at z = ±2.5.

// ── Bubble Migration ──────────────────────────────────────────────────────────

/// Distance a bubble travels toward its electrode per rendered frame.
///
/// Not scaled by frame time: at 60 Hz a bubble crosses the 2.5-unit half-cell
/// in roughly four seconds.  Must not exceed [`ARRIVAL_THRESHOLD`] or bubbles
/// can hop over their arrival sphere and oscillate.
pub const BUBBLE_STEP: f32 = 0.01;

/// A bubble whose distance to its electrode is at or below this is reclaimed.
pub const ARRIVAL_THRESHOLD: f32 = 0.1;

/// Slack added to [`ARRIVAL_THRESHOLD`] to absorb f32 drift accumulated over
/// hundreds of fixed steps.
pub const ARRIVAL_EPSILON: f32 = 1e-4;

/// Bubbles spawned for the manganese (MnO2OH) electrode.
pub const MANGANESE_BUBBLE_COUNT: u32 = 20;

/// Bubbles spawned for the iron (Fe2O3OH) electrode.
pub const IRON_BUBBLE_COUNT: u32 = 20;

/// Bubble sphere radius.
pub const BUBBLE_RADIUS: f32 = 0.2;

/// Bubble alpha; bubbles read as translucent against the electrolyte.
pub const BUBBLE_OPACITY: f32 = 0.5;

// ── Electrodes ────────────────────────────────────────────────────────────────

/// Centre of the MnO2OH plate; manganese bubbles migrate here.
pub const MANGANESE_PLATE_POS: [f32; 3] = [0.0, 0.0, -2.5];

/// Centre of the Fe2O3OH plate; iron bubbles migrate here.
pub const IRON_PLATE_POS: [f32; 3] = [0.0, 0.0, 2.5];

/// Plate dimensions before the quarter-turn about X stands it upright.
pub const PLATE_SIZE: [f32; 3] = [1.0, 0.1, 2.5];

pub const MANGANESE_COLOR: [f32; 3] = [0.0, 0.0, 1.0];
pub const IRON_COLOR: [f32; 3] = [1.0, 0.0, 0.0];

// ── Container ─────────────────────────────────────────────────────────────────

pub const GLASS_BOX_SIZE: [f32; 3] = [2.5, 3.5, 6.0];

/// Electrolyte liquid dimensions; also the bubble spawn volume.
pub const ELECTROLYTE_SIZE: [f32; 3] = [1.8, 2.8, 4.8];

pub const ELECTROLYTE_COLOR: [f32; 3] = [1.0, 0.41, 0.71];

/// Kept below 1 so bubbles stay visible through the liquid.
pub const ELECTROLYTE_OPACITY: f32 = 0.6;

pub const GLASS_OPACITY: f32 = 0.5;

/// Height of the shadow-catching floor.
pub const FLOOR_HEIGHT: f32 = -1.0;

// ── Wiring ────────────────────────────────────────────────────────────────────

pub const CONNECTOR_RADIUS: f32 = 0.1;
pub const CONNECTOR_HEIGHT: f32 = 1.2;

/// Height of the connector centres above the plates.
pub const CONNECTOR_Y: f32 = 1.25;

/// Height of the horizontal wire run, LED base, and push button.
pub const WIRE_Y: f32 = 2.0;

pub const COIL_RADIUS: f32 = 0.025;
pub const COIL_TURNS: f32 = 5.0;
pub const COIL_VERTICAL_LENGTH: f32 = 1.5;
pub const COIL_HORIZONTAL_LENGTH: f32 = 2.5;

/// Samples along the coil path.  High because the wire is thin and tightly wound.
pub const COIL_SEGMENTS: usize = 1000;

/// Sides of the tube cross-section.
pub const COIL_RADIAL_SEGMENTS: usize = 8;

pub const END_CAP_RADIUS: f32 = 0.05;

pub const METAL_GRAY: [f32; 3] = [0.6, 0.6, 0.6];

// ── LED ───────────────────────────────────────────────────────────────────────

pub const LED_POS: [f32; 3] = [0.0, 2.25, 0.0];
pub const LED_BULB_RADIUS: f32 = 0.2;
pub const LED_BASE_HEIGHT: f32 = 0.1;

/// Light range of the LED point light.
pub const LED_LIGHT_RANGE: f32 = 10.0;

pub const LED_DIM_COLOR: [f32; 3] = [1.0, 1.0, 0.0];
pub const LED_DIM_EMISSIVE: f32 = 0.5;
/// Point-light intensity (lumens) while dim.
pub const LED_DIM_INTENSITY: f32 = 40_000.0;

pub const LED_GLOW_COLOR: [f32; 3] = [1.0, 0.0, 0.0];
pub const LED_GLOW_EMISSIVE: f32 = 1.5;
/// Point-light intensity (lumens) while glowing; ten times the dim value.
pub const LED_GLOW_INTENSITY: f32 = 400_000.0;

// ── Push Button ───────────────────────────────────────────────────────────────

pub const BUTTON_POS: [f32; 3] = [0.0, 2.0, -1.0];
pub const BUTTON_BASE_RADIUS: f32 = 0.2;
pub const BUTTON_BASE_HEIGHT: f32 = 0.15;
pub const BUTTON_HEAD_RADIUS: f32 = 0.15;
pub const BUTTON_HEAD_HEIGHT: f32 = 0.15;

/// Local heights of the base and head centres above the button origin.
pub const BUTTON_BASE_OFFSET: f32 = 0.025;
pub const BUTTON_HEAD_OFFSET: f32 = 0.055;

// ── Camera ────────────────────────────────────────────────────────────────────

pub const CAMERA_START: [f32; 3] = [-3.0, 5.0, 0.0];

/// Closest the orbit camera may get to the cell centre.
pub const MIN_ORBIT_RADIUS: f32 = 2.0;

/// Farthest the orbit camera may get from the cell centre.
pub const MAX_ORBIT_RADIUS: f32 = 30.0;

/// Fractional radius change per scroll line.
pub const ZOOM_SPEED: f32 = 0.1;

/// Radians of yaw/pitch per pixel of mouse drag.
pub const ORBIT_SENSITIVITY: f32 = 0.005;

/// Length of each reference axis drawn at the origin.
pub const AXES_LENGTH: f32 = 5.0;
