//! Simulation context, Bevy adapters, and the per-frame driving systems.
//!
//! ## Design
//!
//! [`Simulation`] owns all mutable cell state: the bubble engine, the LED
//! state, and the animation flag.  Nothing lives in globals.  In the app it is
//! wrapped in the [`CellSimulation`] resource and driven by two systems:
//!
//! | System           | Schedule | Purpose                                        |
//! |------------------|----------|------------------------------------------------|
//! | `setup_simulation` | Startup | Spawn both bubble batches                     |
//! | `press_system`   | Update   | Toggle the LED once per `ButtonPressed` message |
//! | `frame_system`   | Update   | Advance bubbles once per frame while animating |
//!
//! Both Update systems run in [`SimulationSet`], chained so a press is seen by
//! the tick in the same frame.  Bubble motion is a fixed step per frame, not
//! scaled by frame time.

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::bubbles::{BubbleEngine, BubbleRenderer, Electrode};
use crate::config::{rgb, CellConfig};
use crate::constants::{IRON_COLOR, MANGANESE_COLOR};
use crate::indicator::{IndicatorLook, IndicatorLooks, IndicatorRenderer, LedState};

// ── Context ───────────────────────────────────────────────────────────────────

/// All mutable cell state, owned by the driving loop.
#[derive(Debug, Clone)]
pub struct Simulation<H> {
    engine: BubbleEngine<H>,
    led: LedState,
    animating: bool,
    looks: IndicatorLooks,
}

impl<H> Simulation<H> {
    pub fn new(engine: BubbleEngine<H>, looks: IndicatorLooks) -> Self {
        Self {
            engine,
            led: LedState::default(),
            animating: false,
            looks,
        }
    }

    #[inline]
    pub fn engine(&self) -> &BubbleEngine<H> {
        &self.engine
    }

    #[inline]
    pub fn led_state(&self) -> LedState {
        self.led
    }

    /// Whether frames currently advance bubbles.  Once set it stays set.
    #[inline]
    pub fn is_animating(&self) -> bool {
        self.animating
    }

    /// Push-button press: flip the LED, start the animation, and push the new
    /// look to the renderer.  Returns the new state.
    pub fn press<R: IndicatorRenderer + ?Sized>(&mut self, renderer: &mut R) -> LedState {
        self.led = self.led.toggled();
        self.animating = true;
        renderer.set_indicator(self.looks.look(self.led));
        self.led
    }

    /// One rendered frame.  Ticks the engine only while animating; returns the
    /// number of bubbles reclaimed.
    pub fn frame<R>(&mut self, renderer: &mut R) -> usize
    where
        R: BubbleRenderer<Handle = H> + ?Sized,
    {
        if !self.animating {
            return 0;
        }
        self.engine.tick(renderer)
    }
}

// ── Resources, messages, sets ─────────────────────────────────────────────────

/// The app's single [`Simulation`], keyed by bubble entities.
#[derive(Resource, Debug)]
pub struct CellSimulation(pub Simulation<Entity>);

/// Shared drawables for every bubble: one sphere mesh, one material per electrode.
#[derive(Resource, Debug, Clone)]
pub struct BubbleAssets {
    pub mesh: Handle<Mesh>,
    pub manganese: Handle<StandardMaterial>,
    pub iron: Handle<StandardMaterial>,
}

impl BubbleAssets {
    #[inline]
    pub fn material(&self, electrode: Electrode) -> Handle<StandardMaterial> {
        match electrode {
            Electrode::Manganese => self.manganese.clone(),
            Electrode::Iron => self.iron.clone(),
        }
    }
}

/// Handles to the LED drawables, stored when the LED is built so the toggle
/// never has to search the scene for them.
#[derive(Resource, Debug, Clone)]
pub struct Indicator {
    pub bulb_material: Handle<StandardMaterial>,
    pub light: Entity,
}

/// One qualifying click on the push button.
#[derive(Message, Debug, Clone, Copy, Default)]
pub struct ButtonPressed;

/// Update systems that mutate the simulation.  Input detection runs before it.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct SimulationSet;

// ── ECS renderers ─────────────────────────────────────────────────────────────

/// Bubble renderer backed by entities: one entity per bubble.
pub struct EcsBubbleRenderer<'a, 'w, 's> {
    pub commands: &'a mut Commands<'w, 's>,
    pub assets: &'a BubbleAssets,
}

impl BubbleRenderer for EcsBubbleRenderer<'_, '_, '_> {
    type Handle = Entity;

    fn add_bubble(&mut self, position: Vec3, electrode: Electrode) -> Entity {
        self.commands
            .spawn((
                electrode,
                Mesh3d(self.assets.mesh.clone()),
                MeshMaterial3d(self.assets.material(electrode)),
                Transform::from_translation(position),
            ))
            .id()
    }

    fn update_bubble_position(&mut self, handle: &Entity, position: Vec3) {
        self.commands
            .entity(*handle)
            .insert(Transform::from_translation(position));
    }

    fn remove_bubble(&mut self, handle: Entity) {
        // Mesh and material are shared; despawning drops this bubble's references.
        self.commands.entity(handle).despawn();
    }
}

/// Indicator renderer that edits the bulb material and LED light in place.
pub struct EcsIndicatorRenderer<'a, 'w, 's> {
    pub materials: &'a mut Assets<StandardMaterial>,
    pub lights: &'a mut Query<'w, 's, &'static mut PointLight>,
    pub indicator: &'a Indicator,
}

impl IndicatorRenderer for EcsIndicatorRenderer<'_, '_, '_> {
    fn set_indicator(&mut self, look: &IndicatorLook) {
        match self.materials.get_mut(&self.indicator.bulb_material) {
            Some(material) => {
                material.base_color = look.color;
                material.emissive = look.color.to_linear() * look.emissive_intensity;
            }
            None => warn!("LED bulb material missing; bulb colour not updated"),
        }
        match self.lights.get_mut(self.indicator.light) {
            Ok(mut light) => {
                light.color = look.color;
                light.intensity = look.light_intensity;
            }
            Err(e) => warn!("LED light unavailable: {e}"),
        }
    }
}

// ── Plugin ────────────────────────────────────────────────────────────────────

pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CellConfig>()
            .add_message::<ButtonPressed>()
            .add_systems(Startup, setup_simulation)
            .add_systems(
                Update,
                (press_system, frame_system).chain().in_set(SimulationSet),
            );
    }
}

// ── Systems ───────────────────────────────────────────────────────────────────

/// Build the shared bubble drawables and spawn both batches inside the electrolyte.
///
/// Must run after [`crate::config::load_cell_config`] so the final config is used.
pub fn setup_simulation(
    mut commands: Commands,
    config: Res<CellConfig>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let bubble_material = |color: [f32; 3]| StandardMaterial {
        base_color: rgb(color).with_alpha(config.bubble_opacity),
        alpha_mode: AlphaMode::Blend,
        perceptual_roughness: 0.1,
        metallic: 0.1,
        ..default()
    };
    let assets = BubbleAssets {
        mesh: meshes.add(Sphere::new(config.bubble_radius)),
        manganese: materials.add(bubble_material(MANGANESE_COLOR)),
        iron: materials.add(bubble_material(IRON_COLOR)),
    };

    let mut engine = BubbleEngine::with_motion(
        config.targets(),
        config.bubble_step,
        config.arrival_threshold,
    );

    match config.spawn_volume() {
        Ok(volume) => {
            let mut rng = match config.seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            let mut renderer = EcsBubbleRenderer {
                commands: &mut commands,
                assets: &assets,
            };
            for (electrode, count) in [
                (Electrode::Manganese, config.manganese_bubble_count),
                (Electrode::Iron, config.iron_bubble_count),
            ] {
                engine.spawn_batch(electrode, count as usize, &volume, &mut rng, &mut renderer);
                debug!("Spawned {count} {} bubbles", electrode.label());
            }
        }
        Err(e) => error!("Cannot spawn bubbles: {e}"),
    }

    info!("Cell ready with {} bubbles", engine.len());
    commands.insert_resource(CellSimulation(Simulation::new(
        engine,
        config.indicator_looks(),
    )));
    commands.insert_resource(assets);
}

/// Toggle the LED once for every press received this frame.
pub fn press_system(
    mut presses: MessageReader<ButtonPressed>,
    mut sim: ResMut<CellSimulation>,
    indicator: Res<Indicator>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut lights: Query<&'static mut PointLight>,
) {
    for _ in presses.read() {
        let mut renderer = EcsIndicatorRenderer {
            materials: &mut *materials,
            lights: &mut lights,
            indicator: &*indicator,
        };
        let state = sim.0.press(&mut renderer);
        info!(
            "Push button pressed: LED {:?}, {} bubbles migrating",
            state,
            sim.0.engine().len()
        );
    }
}

/// Advance the bubbles by one fixed step.
pub fn frame_system(
    mut commands: Commands,
    mut sim: ResMut<CellSimulation>,
    assets: Res<BubbleAssets>,
) {
    let mut renderer = EcsBubbleRenderer {
        commands: &mut commands,
        assets: &*assets,
    };
    let reclaimed = sim.0.frame(&mut renderer);
    if reclaimed > 0 {
        debug!("{reclaimed} bubbles reached their electrodes");
        if sim.0.engine().is_empty() {
            info!("All bubbles have reached their electrodes");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bubbles::tests::{cell_targets, RecordingRenderer};
    use crate::bubbles::SpawnVolume;

    #[derive(Default)]
    struct RecordingIndicator {
        looks: Vec<IndicatorLook>,
    }

    impl IndicatorRenderer for RecordingIndicator {
        fn set_indicator(&mut self, look: &IndicatorLook) {
            self.looks.push(*look);
        }
    }

    fn simulation_with(bubbles: usize, renderer: &mut RecordingRenderer) -> Simulation<u32> {
        let mut engine = BubbleEngine::new(cell_targets());
        let volume = CellConfig::default().spawn_volume().unwrap();
        let mut rng = StdRng::seed_from_u64(17);
        engine.spawn_batch(Electrode::Manganese, bubbles, &volume, &mut rng, renderer);
        Simulation::new(engine, CellConfig::default().indicator_looks())
    }

    #[test]
    fn starts_dim_and_idle() {
        let mut renderer = RecordingRenderer::default();
        let sim = simulation_with(3, &mut renderer);
        assert_eq!(sim.led_state(), LedState::Dim);
        assert!(!sim.is_animating());
    }

    #[test]
    fn frames_before_first_press_do_nothing() {
        let mut renderer = RecordingRenderer::default();
        let mut sim = simulation_with(4, &mut renderer);
        for _ in 0..100 {
            assert_eq!(sim.frame(&mut renderer), 0);
        }
        assert!(renderer.updates.is_empty());
        assert_eq!(sim.engine().len(), 4);
    }

    #[test]
    fn press_toggles_led_and_latches_animation() {
        let mut renderer = RecordingRenderer::default();
        let mut sim = simulation_with(1, &mut renderer);
        let mut indicator = RecordingIndicator::default();
        let looks = CellConfig::default().indicator_looks();

        assert_eq!(sim.press(&mut indicator), LedState::Glowing);
        assert!(sim.is_animating());

        assert_eq!(sim.press(&mut indicator), LedState::Dim);
        assert!(sim.is_animating(), "a second press must not stop the animation");

        assert_eq!(indicator.looks, vec![looks.glowing, looks.dim]);
    }

    #[test]
    fn frames_after_press_move_bubbles() {
        let mut renderer = RecordingRenderer::default();
        let mut sim = simulation_with(6, &mut renderer);
        sim.press(&mut RecordingIndicator::default());

        sim.frame(&mut renderer);
        let moved: usize = renderer.updates.values().map(Vec::len).sum();
        assert_eq!(moved + renderer.removed.len(), 6);
    }

    #[test]
    fn animation_stays_on_after_all_bubbles_arrive() {
        let mut renderer = RecordingRenderer::default();
        let mut engine = BubbleEngine::new(cell_targets());
        let near = SpawnVolume::new(Vec3::new(0.0, 0.0, -2.45), Vec3::new(0.01, 0.01, -2.44))
            .unwrap();
        engine.spawn_batch(
            Electrode::Manganese,
            2,
            &near,
            &mut StdRng::seed_from_u64(1),
            &mut renderer,
        );
        let mut sim = Simulation::new(engine, CellConfig::default().indicator_looks());
        sim.press(&mut RecordingIndicator::default());

        assert_eq!(sim.frame(&mut renderer), 2);
        assert!(sim.engine().is_empty());
        assert!(sim.is_animating());
        assert_eq!(sim.frame(&mut renderer), 0);
    }
}
