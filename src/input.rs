//! Push-button click detection.
//!
//! A left click is turned into a world-space ray through the cursor and tested
//! against the button's bounding cylinder.  Each qualifying click writes
//! exactly one [`ButtonPressed`] message; the simulation never hit-tests.

use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::camera::OrbitCamera;
use crate::constants::{
    BUTTON_BASE_HEIGHT, BUTTON_BASE_OFFSET, BUTTON_BASE_RADIUS, BUTTON_HEAD_HEIGHT,
    BUTTON_HEAD_OFFSET, BUTTON_HEAD_RADIUS,
};
use crate::simulation::ButtonPressed;

/// Upright cylinder enclosing the push button.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct ButtonHitRegion {
    pub center: Vec3,
    pub radius: f32,
    pub half_height: f32,
}

impl ButtonHitRegion {
    /// Region covering base and head of a button whose origin is at `origin`.
    pub fn around_button(origin: Vec3) -> Self {
        let bottom = (BUTTON_BASE_OFFSET - BUTTON_BASE_HEIGHT * 0.5)
            .min(BUTTON_HEAD_OFFSET - BUTTON_HEAD_HEIGHT * 0.5);
        let top = (BUTTON_BASE_OFFSET + BUTTON_BASE_HEIGHT * 0.5)
            .max(BUTTON_HEAD_OFFSET + BUTTON_HEAD_HEIGHT * 0.5);
        Self {
            center: origin + Vec3::Y * (bottom + top) * 0.5,
            radius: BUTTON_BASE_RADIUS.max(BUTTON_HEAD_RADIUS),
            half_height: (top - bottom) * 0.5,
        }
    }
}

/// Ray parameter of the first point on or inside the region, if any.
pub fn ray_button_distance(ray: &Ray3d, region: &ButtonHitRegion) -> Option<f32> {
    let origin = ray.origin - region.center;
    let dir = *ray.direction;

    // Interval where the ray is within the radius (XZ plane).
    let a = dir.x * dir.x + dir.z * dir.z;
    let b = 2.0 * (origin.x * dir.x + origin.z * dir.z);
    let c = origin.x * origin.x + origin.z * origin.z - region.radius * region.radius;
    let (mut t_min, mut t_max) = if a < f32::EPSILON {
        if c > 0.0 {
            return None;
        }
        (f32::NEG_INFINITY, f32::INFINITY)
    } else {
        let disc = b * b - 4.0 * a * c;
        if disc < 0.0 {
            return None;
        }
        let root = disc.sqrt();
        ((-b - root) / (2.0 * a), (-b + root) / (2.0 * a))
    };

    // Clip against the caps.
    if dir.y.abs() < f32::EPSILON {
        if origin.y.abs() > region.half_height {
            return None;
        }
    } else {
        let t0 = (-region.half_height - origin.y) / dir.y;
        let t1 = (region.half_height - origin.y) / dir.y;
        t_min = t_min.max(t0.min(t1));
        t_max = t_max.min(t0.max(t1));
    }

    t_min = t_min.max(0.0);
    (t_min <= t_max).then_some(t_min)
}

#[inline]
pub fn ray_hits_button(ray: &Ray3d, region: &ButtonHitRegion) -> bool {
    ray_button_distance(ray, region).is_some()
}

/// Write a [`ButtonPressed`] for a left click whose cursor ray hits the button.
pub fn detect_button_press(
    buttons: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(&Camera, &GlobalTransform), With<OrbitCamera>>,
    region: Option<Res<ButtonHitRegion>>,
    mut presses: MessageWriter<ButtonPressed>,
) {
    if !buttons.just_pressed(MouseButton::Left) {
        return;
    }
    let Some(region) = region else {
        return;
    };
    let Ok(window) = windows.single() else {
        return;
    };
    let Some(cursor) = window.cursor_position() else {
        return;
    };
    let Ok((camera, camera_transform)) = cameras.single() else {
        return;
    };
    let ray = match camera.viewport_to_world(camera_transform, cursor) {
        Ok(ray) => ray,
        Err(e) => {
            debug!("Click at {cursor} has no world ray: {e:?}");
            return;
        }
    };

    if ray_hits_button(&ray, &region) {
        presses.write(ButtonPressed);
    }
}
