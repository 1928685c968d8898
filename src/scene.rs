//! Static cell construction: container, electrodes, wiring, LED, push button,
//! lights, and reference axes.
//!
//! Everything here is spawned once at startup.  The only pieces the rest of
//! the app touches afterwards are the LED drawables (stored in the
//! [`Indicator`] resource) and the button's [`ButtonHitRegion`].

use bevy::prelude::*;
use bevy_asset::RenderAssetUsages;
use bevy_mesh::{Indices, PrimitiveTopology};
use std::f32::consts::{FRAC_PI_2, TAU};

use crate::config::{rgb, CellConfig};
use crate::constants::*;
use crate::indicator::LedState;
use crate::input::ButtonHitRegion;
use crate::simulation::Indicator;

/// Tags the push-button group.
#[derive(Component)]
pub struct PushButton;

/// Tags the LED group.
#[derive(Component)]
pub struct LedBulb;

/// Tags each electrode plate.
#[derive(Component)]
pub struct ElectrodePlate;

// ── Plugin ────────────────────────────────────────────────────────────────────

/// Builds the static scene and draws the reference axes each frame.
pub struct ScenePlugin;

impl Plugin for ScenePlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(ClearColor(Color::WHITE))
            .add_systems(Startup, setup_scene)
            .add_systems(Update, draw_axes_system);
    }
}

// ── Startup ───────────────────────────────────────────────────────────────────

/// Spawn the whole cell.  Must run after [`crate::config::load_cell_config`].
pub fn setup_scene(
    mut commands: Commands,
    config: Res<CellConfig>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let targets = config.targets();
    let metal = materials.add(StandardMaterial {
        base_color: rgb(METAL_GRAY),
        metallic: 1.0,
        perceptual_roughness: 0.3,
        ..default()
    });

    // Floor that only exists to catch shadows against the white background.
    commands.spawn((
        Mesh3d(meshes.add(Plane3d::default().mesh().size(100.0, 100.0))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::WHITE,
            perceptual_roughness: 1.0,
            ..default()
        })),
        Transform::from_xyz(0.0, FLOOR_HEIGHT, 0.0),
        Name::new("floor"),
    ));

    // ── Electrodes ────────────────────────────────────────────────────────────
    let plate_mesh = meshes.add(Cuboid::from_size(Vec3::from_array(PLATE_SIZE)));
    for (name, position, color) in [
        ("mno2oh_plate", targets.manganese, MANGANESE_COLOR),
        ("fe2o3oh_plate", targets.iron, IRON_COLOR),
    ] {
        commands.spawn((
            Mesh3d(plate_mesh.clone()),
            MeshMaterial3d(materials.add(StandardMaterial::from(rgb(color)))),
            Transform::from_translation(position).with_rotation(Quat::from_rotation_x(FRAC_PI_2)),
            ElectrodePlate,
            Name::new(name),
        ));
    }

    // ── Container ─────────────────────────────────────────────────────────────
    commands.spawn((
        Mesh3d(meshes.add(Cuboid::from_size(Vec3::from_array(GLASS_BOX_SIZE)))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb(0.67, 0.67, 0.67).with_alpha(GLASS_OPACITY),
            alpha_mode: AlphaMode::Blend,
            double_sided: true,
            cull_mode: None,
            perceptual_roughness: 0.1,
            metallic: 0.1,
            ..default()
        })),
        Transform::default(),
        Name::new("glass_box"),
    ));
    commands.spawn((
        Mesh3d(meshes.add(Cuboid::from_size(Vec3::from_array(config.electrolyte_size)))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: rgb(ELECTROLYTE_COLOR).with_alpha(ELECTROLYTE_OPACITY),
            alpha_mode: AlphaMode::Blend,
            double_sided: true,
            cull_mode: None,
            perceptual_roughness: 0.2,
            metallic: 0.1,
            ..default()
        })),
        Transform::default(),
        Name::new("electrolyte"),
    ));

    // ── Wiring ────────────────────────────────────────────────────────────────
    let connector_mesh = meshes.add(Cylinder::new(CONNECTOR_RADIUS, CONNECTOR_HEIGHT));
    let end_cap_mesh = meshes.add(Sphere::new(END_CAP_RADIUS));
    let vertical_coil = meshes.add(coil_mesh(
        COIL_VERTICAL_LENGTH,
        COIL_RADIUS,
        COIL_TURNS,
        COIL_SEGMENTS,
        COIL_RADIAL_SEGMENTS,
    ));
    let horizontal_coil = meshes.add(coil_mesh(
        COIL_HORIZONTAL_LENGTH,
        COIL_RADIUS,
        COIL_TURNS,
        COIL_SEGMENTS,
        COIL_RADIAL_SEGMENTS,
    ));

    for (label, plate, color) in [
        ("mno2oh", targets.manganese, MANGANESE_COLOR),
        ("fe2o3oh", targets.iron, IRON_COLOR),
    ] {
        let wire = materials.add(StandardMaterial {
            base_color: rgb(color),
            metallic: 1.0,
            perceptual_roughness: 0.5,
            ..default()
        });
        let riser = Vec3::new(plate.x, CONNECTOR_Y, plate.z);

        commands.spawn((
            Mesh3d(connector_mesh.clone()),
            MeshMaterial3d(metal.clone()),
            Transform::from_translation(riser),
            Name::new(format!("{label}_connector")),
        ));
        // Coil is built along X; a quarter turn about Z stands it up.
        commands.spawn((
            Mesh3d(vertical_coil.clone()),
            MeshMaterial3d(wire.clone()),
            Transform::from_translation(riser).with_rotation(Quat::from_rotation_z(FRAC_PI_2)),
            Name::new(format!("{label}_riser_wire")),
        ));
        // Horizontal run from above the plate to the LED at the centre.
        commands.spawn((
            Mesh3d(horizontal_coil.clone()),
            MeshMaterial3d(wire),
            Transform::from_xyz(plate.x, WIRE_Y, plate.z * 0.5)
                .with_rotation(Quat::from_rotation_y(FRAC_PI_2)),
            Name::new(format!("{label}_bridge_wire")),
        ));
        commands.spawn((
            Mesh3d(end_cap_mesh.clone()),
            MeshMaterial3d(metal.clone()),
            Transform::from_xyz(plate.x, WIRE_Y, plate.z),
            Name::new(format!("{label}_end_cap")),
        ));
    }

    // ── LED ───────────────────────────────────────────────────────────────────
    let dim = *config.indicator_looks().look(LedState::default());
    let bulb_material = materials.add(StandardMaterial {
        base_color: dim.color,
        emissive: dim.color.to_linear() * dim.emissive_intensity,
        ..default()
    });
    let led = commands
        .spawn((
            Transform::from_translation(Vec3::from_array(LED_POS)),
            Visibility::default(),
            LedBulb,
            Name::new("led"),
        ))
        .id();
    commands.spawn((
        Mesh3d(meshes.add(Sphere::new(LED_BULB_RADIUS))),
        MeshMaterial3d(bulb_material.clone()),
        Transform::default(),
        ChildOf(led),
    ));
    commands.spawn((
        Mesh3d(meshes.add(Cylinder::new(LED_BULB_RADIUS * 0.5, LED_BASE_HEIGHT))),
        MeshMaterial3d(materials.add(StandardMaterial::from(Color::srgb(
            0.33, 0.33, 0.33,
        )))),
        Transform::from_xyz(0.0, -LED_BULB_RADIUS - LED_BASE_HEIGHT * 0.5, 0.0),
        ChildOf(led),
    ));
    let light = commands
        .spawn((
            PointLight {
                color: dim.color,
                intensity: dim.light_intensity,
                range: LED_LIGHT_RANGE,
                ..default()
            },
            Transform::default(),
            ChildOf(led),
        ))
        .id();
    commands.insert_resource(Indicator {
        bulb_material,
        light,
    });

    // ── Push button ───────────────────────────────────────────────────────────
    let button_origin = Vec3::from_array(BUTTON_POS);
    let button = commands
        .spawn((
            Transform::from_translation(button_origin),
            Visibility::default(),
            PushButton,
            Name::new("push_button"),
        ))
        .id();
    commands.spawn((
        Mesh3d(meshes.add(Cylinder::new(BUTTON_BASE_RADIUS, BUTTON_BASE_HEIGHT))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb(0.67, 0.67, 0.67),
            perceptual_roughness: 0.3,
            metallic: 0.1,
            ..default()
        })),
        Transform::from_xyz(0.0, BUTTON_BASE_OFFSET, 0.0),
        ChildOf(button),
    ));
    commands.spawn((
        Mesh3d(meshes.add(Cylinder::new(BUTTON_HEAD_RADIUS, BUTTON_HEAD_HEIGHT))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb(1.0, 0.0, 0.0),
            perceptual_roughness: 0.4,
            metallic: 0.2,
            ..default()
        })),
        Transform::from_xyz(0.0, BUTTON_HEAD_OFFSET, 0.0),
        ChildOf(button),
    ));
    commands.insert_resource(ButtonHitRegion::around_button(button_origin));

    // ── Lights ────────────────────────────────────────────────────────────────
    commands.spawn((
        DirectionalLight {
            illuminance: 8_000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(5.0, 10.0, 7.0).looking_at(Vec3::ZERO, Vec3::Y),
        Name::new("sun"),
    ));

    info!("Cell scene built");
}

// ── Update ────────────────────────────────────────────────────────────────────

/// Draw red/green/blue reference axes at the origin.
pub fn draw_axes_system(mut gizmos: Gizmos) {
    gizmos.line(Vec3::ZERO, Vec3::X * AXES_LENGTH, Color::srgb(1.0, 0.0, 0.0));
    gizmos.line(Vec3::ZERO, Vec3::Y * AXES_LENGTH, Color::srgb(0.0, 1.0, 0.0));
    gizmos.line(Vec3::ZERO, Vec3::Z * AXES_LENGTH, Color::srgb(0.0, 0.0, 1.0));
}

// ── Mesh helper ───────────────────────────────────────────────────────────────

/// Build an open tube of `tube_radius` following a sine wave along X.
///
/// The path runs from `-length/2` to `length/2` and oscillates in Y with
/// amplitude `tube_radius`, completing `turns` periods.  Rings of
/// `radial_segments` vertices are placed at each of the `segments` samples.
pub fn coil_mesh(
    length: f32,
    tube_radius: f32,
    turns: f32,
    segments: usize,
    radial_segments: usize,
) -> Mesh {
    let segments = segments.max(2);
    let radial = radial_segments.max(3);
    let path = |t: f32| {
        Vec3::new(
            length * t - length * 0.5,
            (TAU * turns * t).sin() * tube_radius,
            0.0,
        )
    };

    let mut positions: Vec<[f32; 3]> = Vec::with_capacity(segments * radial);
    let mut normals: Vec<[f32; 3]> = Vec::with_capacity(segments * radial);
    let mut uvs: Vec<[f32; 2]> = Vec::with_capacity(segments * radial);

    let last = (segments - 1) as f32;
    for i in 0..segments {
        let t = i as f32 / last;
        let center = path(t);
        let ahead = path((i + 1).min(segments - 1) as f32 / last);
        let behind = path(i.saturating_sub(1) as f32 / last);
        let tangent = (ahead - behind).normalize_or(Vec3::X);
        // Path lies in the XY plane, so Z is always perpendicular to it.
        let normal = Vec3::new(-tangent.y, tangent.x, 0.0);
        let binormal = Vec3::Z;

        for j in 0..radial {
            let angle = TAU * j as f32 / radial as f32;
            let dir = normal * angle.cos() + binormal * angle.sin();
            positions.push((center + dir * tube_radius).to_array());
            normals.push(dir.to_array());
            uvs.push([t, j as f32 / radial as f32]);
        }
    }

    let mut indices: Vec<u32> = Vec::with_capacity((segments - 1) * radial * 6);
    for i in 0..segments - 1 {
        for j in 0..radial {
            let a = (i * radial + j) as u32;
            let b = (i * radial + (j + 1) % radial) as u32;
            let c = a + radial as u32;
            let d = b + radial as u32;
            indices.extend_from_slice(&[a, c, b, b, c, d]);
        }
    }

    let mut mesh = Mesh::new(
        PrimitiveTopology::TriangleList,
        RenderAssetUsages::RENDER_WORLD,
    );
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
    mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, normals);
    mesh.insert_attribute(Mesh::ATTRIBUTE_UV_0, uvs);
    mesh.insert_indices(Indices::U32(indices));
    mesh
}
