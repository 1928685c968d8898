//! Perspective camera with orbit controls.
//!
//! Left-drag orbits around the cell centre, the scroll wheel zooms.  Window
//! resizing is handled by Bevy's camera projection update.

use bevy::input::mouse::{AccumulatedMouseMotion, AccumulatedMouseScroll, MouseScrollUnit};
use bevy::prelude::*;
use std::f32::consts::FRAC_PI_2;

use crate::config::CellConfig;
use crate::constants::CAMERA_START;

/// Keep pitch just short of the poles so `looking_at` never degenerates.
const PITCH_LIMIT: f32 = FRAC_PI_2 - 0.05;

/// Pixels per scroll "line" for touchpads reporting pixel deltas.
const PIXELS_PER_LINE: f32 = 100.0;

/// Spherical camera placement around `focus`.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct OrbitCamera {
    pub focus: Vec3,
    pub radius: f32,
    /// Rotation about +Y; zero looks down -Z from +Z.
    pub yaw: f32,
    /// Elevation above the XZ plane.
    pub pitch: f32,
}

impl OrbitCamera {
    /// Orbit that places the camera at `position`, looking at `focus`.
    pub fn from_position(position: Vec3, focus: Vec3) -> Self {
        let offset = position - focus;
        let radius = offset.length().max(f32::EPSILON);
        Self {
            focus,
            radius,
            yaw: offset.x.atan2(offset.z),
            pitch: (offset.y / radius).clamp(-1.0, 1.0).asin(),
        }
    }

    pub fn position(&self) -> Vec3 {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        self.focus + self.radius * Vec3::new(cos_pitch * sin_yaw, sin_pitch, cos_pitch * cos_yaw)
    }

    pub fn transform(&self) -> Transform {
        Transform::from_translation(self.position()).looking_at(self.focus, Vec3::Y)
    }

    /// Apply a drag (radians) and a zoom (scroll lines), clamping to limits.
    pub fn apply(&mut self, rotate: Vec2, zoom_lines: f32, config: &CellConfig) {
        self.yaw -= rotate.x;
        self.pitch = (self.pitch + rotate.y).clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.radius = (self.radius * (1.0 - zoom_lines * config.zoom_speed))
            .clamp(config.min_orbit_radius, config.max_orbit_radius);
    }
}

/// Setup the 3D camera at its starting viewpoint.
pub fn setup_camera(mut commands: Commands) {
    let orbit = OrbitCamera::from_position(Vec3::from_array(CAMERA_START), Vec3::ZERO);
    commands.spawn((
        Camera3d::default(),
        orbit.transform(),
        orbit,
        AmbientLight {
            color: Color::srgb(0.25, 0.25, 0.25),
            brightness: 400.0,
            ..default()
        },
        Name::new("main_camera"),
    ));
    debug!("Camera spawned at {:?}", orbit.position());
}

/// Orbit on left-drag, zoom on scroll.
pub fn orbit_camera_system(
    buttons: Res<ButtonInput<MouseButton>>,
    motion: Res<AccumulatedMouseMotion>,
    scroll: Res<AccumulatedMouseScroll>,
    config: Res<CellConfig>,
    mut cameras: Query<(&mut OrbitCamera, &mut Transform)>,
) {
    let rotate = if buttons.pressed(MouseButton::Left) {
        motion.delta * config.orbit_sensitivity
    } else {
        Vec2::ZERO
    };
    let zoom_lines = match scroll.unit {
        MouseScrollUnit::Line => scroll.delta.y,
        MouseScrollUnit::Pixel => scroll.delta.y / PIXELS_PER_LINE,
    };
    if rotate == Vec2::ZERO && zoom_lines == 0.0 {
        return;
    }

    for (mut orbit, mut transform) in cameras.iter_mut() {
        orbit.apply(rotate, zoom_lines, &config);
        *transform = orbit.transform();
    }
}
