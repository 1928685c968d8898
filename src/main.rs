use bevy::prelude::*;
use bevy::window::WindowResolution;

use electrocell::config::{self, CellConfig};
use electrocell::simulation::{self, SimulationPlugin, SimulationSet};
use electrocell::{camera, input, scene};

fn main() {
    let mut app = App::new();

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "Electrochemical Cell".into(),
            resolution: WindowResolution::new(1200, 680),
            ..Default::default()
        }),
        ..Default::default()
    }))
    // Insert CellConfig with compiled defaults; load_cell_config will
    // overwrite it from assets/cell.toml (if present) in the Startup schedule.
    .insert_resource(CellConfig::default())
    .add_plugins((SimulationPlugin, scene::ScenePlugin))
    .add_systems(
        Startup,
        (
            // Load config first so every other startup system sees the final values.
            config::load_cell_config
                .before(simulation::setup_simulation)
                .before(scene::setup_scene),
            camera::setup_camera,
        ),
    )
    .add_systems(
        Update,
        (
            camera::orbit_camera_system,
            input::detect_button_press.before(SimulationSet),
        ),
    );

    app.run();
}
